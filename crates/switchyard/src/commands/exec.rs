//! Predefined commands and command templates.

use serde::Serialize;
use tabled::Tabled;

use switchyard_core::{
    Command as CoreCommand, CommandDefinition, CommandKind, CommandTemplate, RunCommandRequest,
    TemplateRequest,
};

use crate::cli::{ExecArgs, TemplateArgs};
use crate::context::Context;
use crate::error::CliError;
use crate::output;

use super::util;

#[derive(Tabled)]
struct CatalogRow {
    #[tabled(rename = "Kind")]
    kind: &'static str,
    #[tabled(rename = "ID")]
    id: u32,
    #[tabled(rename = "Name")]
    name: String,
    #[tabled(rename = "Runs")]
    runs: String,
}

#[derive(Serialize)]
struct Catalog<'a> {
    commands: Vec<&'a CommandDefinition>,
    templates: Vec<&'a CommandTemplate>,
}

fn list(ctx: &Context) -> Result<(), CliError> {
    let catalog = ctx.controller.catalog();
    let data = Catalog {
        commands: catalog.commands().collect(),
        templates: catalog.templates().collect(),
    };
    let out = output::render_single(
        ctx.output,
        &data,
        |c| {
            let rows: Vec<CatalogRow> = c
                .commands
                .iter()
                .map(|d| CatalogRow {
                    kind: if d.kind == CommandKind::Interface {
                        "interface"
                    } else {
                        "command"
                    },
                    id: d.id,
                    name: d.name.clone(),
                    runs: d.command.clone(),
                })
                .chain(c.templates.iter().map(|t| CatalogRow {
                    kind: "template",
                    id: t.id,
                    name: t.name.clone(),
                    runs: t.template.clone(),
                }))
                .collect();
            if rows.is_empty() {
                "No commands are configured.".into()
            } else {
                output::section("Commands", &rows)
            }
        },
        |c| {
            c.commands
                .iter()
                .map(|d| d.id.to_string())
                .collect::<Vec<_>>()
                .join("\n")
        },
    )?;
    output::print_output(&out, ctx.quiet);
    Ok(())
}

pub async fn run_command(ctx: &Context, args: ExecArgs) -> Result<(), CliError> {
    if args.list {
        // Make sure the switch exists before listing
        ctx.resolve_switch(&args.switch)?;
        return list(ctx);
    }

    let command = match (args.command, args.raw) {
        (Some(command_id), None) => CoreCommand::RunCommand(RunCommandRequest {
            command_id,
            interface: args.interface,
        }),
        (None, Some(command)) => CoreCommand::RunCommandString { command },
        _ => {
            return Err(CliError::Validation {
                field: "exec".into(),
                reason: "give a command id, --raw <command> or --list".into(),
            });
        }
    };
    let result = util::execute(ctx, &args.switch, command).await?;
    util::print_message(ctx, &result)
}

pub async fn run_template(ctx: &Context, args: TemplateArgs) -> Result<(), CliError> {
    let request = TemplateRequest {
        template_id: args.id,
        values: args.values.into_iter().collect(),
    };
    let result = util::execute(ctx, &args.switch, CoreCommand::RunTemplate(request)).await?;
    util::print_message(ctx, &result)
}
