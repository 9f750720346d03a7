//! Shared helpers for command handlers.

use std::io::IsTerminal;
use std::time::Duration;

use indicatif::{ProgressBar, ProgressStyle};

use switchyard_core::{Command as CoreCommand, CommandResult};

use crate::context::Context;
use crate::error::CliError;
use crate::output;

/// Prompt for confirmation, auto-approving if `--yes` was passed.
pub fn confirm(message: &str, yes_flag: bool) -> Result<bool, CliError> {
    if yes_flag {
        return Ok(true);
    }
    if !std::io::stdin().is_terminal() {
        return Err(CliError::NonInteractiveRequiresYes {
            action: message.to_owned(),
        });
    }
    let confirmed = dialoguer::Confirm::new()
        .with_prompt(message)
        .default(false)
        .interact()
        .map_err(|e| CliError::Io(std::io::Error::other(e)))?;
    Ok(confirmed)
}

/// Spinner on stderr while the switch is being talked to.
///
/// Hidden when stderr is not a terminal or `--quiet` is set.
pub fn spinner(ctx: &Context, message: &str) -> ProgressBar {
    if ctx.quiet || !std::io::stderr().is_terminal() {
        return ProgressBar::hidden();
    }
    let bar = ProgressBar::new_spinner();
    bar.set_style(
        ProgressStyle::with_template("{spinner} {msg} ({elapsed})")
            .unwrap_or_else(|_| ProgressStyle::default_spinner()),
    );
    bar.set_message(message.to_owned());
    bar.enable_steady_tick(Duration::from_millis(100));
    bar
}

/// Resolve the switch, run one command and report the outcome.
pub async fn execute(
    ctx: &Context,
    switch: &str,
    command: CoreCommand,
) -> Result<CommandResult, CliError> {
    let (group_id, device_id) = ctx.resolve_switch(switch)?;
    let bar = spinner(ctx, &format!("{} on {switch}", command.action()));
    let result = ctx
        .controller
        .execute(&ctx.request, group_id, device_id, command)
        .await;
    bar.finish_and_clear();
    Ok(result?)
}

/// Print a changed/ignored message in the chosen format.
pub fn print_message(ctx: &Context, result: &CommandResult) -> Result<(), CliError> {
    let color = ctx.color;
    let rendered = output::render_single(
        ctx.output,
        result,
        |r| match r {
            CommandResult::Changed { message } => output::changed(message, color),
            CommandResult::Ignored { message } => output::notice(message, color),
            CommandResult::Output(out) => out.output.clone(),
            CommandResult::BulkEdit(summary) => summary.outputs.join("\n"),
        },
        |r| r.message().unwrap_or_default().to_owned(),
    )?;
    output::print_output(&rendered, ctx.quiet);
    Ok(())
}
