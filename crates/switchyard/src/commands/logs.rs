//! Activity log and usage statistics.

use tabled::Tabled;

use switchyard_core::{AdminStats, LogEntry, LogFilter};

use crate::cli::LogsArgs;
use crate::context::Context;
use crate::error::CliError;
use crate::output;

#[derive(Tabled)]
struct LogRow {
    #[tabled(rename = "When")]
    when: String,
    #[tabled(rename = "User")]
    user: String,
    #[tabled(rename = "Switch")]
    switch: String,
    #[tabled(rename = "Interface")]
    interface: String,
    #[tabled(rename = "Action")]
    action: String,
    #[tabled(rename = "Type")]
    log_type: String,
    #[tabled(rename = "Description")]
    description: String,
}

#[derive(Tabled)]
struct CounterRow {
    #[tabled(rename = "Counter")]
    name: String,
    #[tabled(rename = "Value")]
    value: u64,
}

pub fn logs(ctx: &Context, args: &LogsArgs) -> Result<(), CliError> {
    let device = args
        .switch
        .as_deref()
        .map(|s| ctx.resolve_switch(s))
        .transpose()?;

    let entries = match device {
        // Device members see the recent changes of their own switches
        Some((group_id, device_id)) if !ctx.request.user.is_admin() => {
            ctx.controller
                .device_activity(&ctx.request, group_id, device_id)?
        }
        _ => {
            let filter = LogFilter {
                user: args.by.clone(),
                group_id: None,
                device_id: device.map(|(_, d)| d),
                action: args.action,
                min_type: args.min_type,
                limit: Some(args.limit),
            };
            ctx.controller.activity(&ctx.request, &filter)?
        }
    };

    let names = ctx.controller.inventory().devices();
    let switch_name = |e: &LogEntry| {
        e.device_id
            .and_then(|id| names.iter().find(|d| d.id == id))
            .map(|d| d.name.clone())
            .unwrap_or_default()
    };

    let out = output::render_list(
        ctx.output,
        &entries,
        |e| LogRow {
            when: e.timestamp.format("%Y-%m-%d %H:%M:%S").to_string(),
            user: e.user.clone(),
            switch: switch_name(e),
            interface: e.if_name.clone().unwrap_or_default(),
            action: e.action.to_string(),
            log_type: e.log_type.to_string(),
            description: e.description.clone(),
        },
        |e| e.id.to_string(),
    )?;
    output::print_output(&out, ctx.quiet);
    Ok(())
}

fn stats_detail(stats: &AdminStats) -> String {
    let summary = [
        format!("Groups:         {}", stats.groups),
        format!("Switches:       {}", stats.devices),
        format!("Active:         {}", stats.active_devices),
    ]
    .join("\n");
    let rows: Vec<CounterRow> = stats
        .counters
        .iter()
        .map(|c| CounterRow {
            name: c.name.clone(),
            value: c.value,
        })
        .collect();
    format!("{summary}\n\n{}", output::section("Usage", &rows))
}

pub fn stats(ctx: &Context) -> Result<(), CliError> {
    let stats = ctx.controller.admin_stats(&ctx.request)?;
    let out = output::render_single(ctx.output, &stats, stats_detail, |s| {
        s.counters
            .iter()
            .map(|c| format!("{}={}", c.name, c.value))
            .collect::<Vec<_>>()
            .join("\n")
    })?;
    output::print_output(&out, ctx.quiet);
    Ok(())
}
