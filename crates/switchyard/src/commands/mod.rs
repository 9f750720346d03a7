//! Command dispatch: bridges CLI args -> core Commands -> output formatting.

pub mod config_cmd;
pub mod exec;
pub mod interface;
pub mod logs;
pub mod switches;
pub mod util;
pub mod vlan;

use crate::cli::Command;
use crate::context::Context;
use crate::error::CliError;

/// Dispatch a switch-bound command to the appropriate handler.
pub async fn dispatch(cmd: Command, ctx: &Context) -> Result<(), CliError> {
    match cmd {
        Command::Groups => switches::groups(ctx),
        Command::Search { pattern } => switches::search(ctx, &pattern),
        Command::Show(args) => switches::show(ctx, args, false).await,
        Command::Reload(args) => switches::show(ctx, args, true).await,
        Command::Interface(args) => interface::handle(ctx, args).await,
        Command::BulkEdit(args) => interface::bulk_edit(ctx, args).await,
        Command::Vlan(args) => vlan::handle(ctx, args).await,
        Command::Save { switch } => vlan::save(ctx, &switch).await,
        Command::Exec(args) => exec::run_command(ctx, args).await,
        Command::Template(args) => exec::run_template(ctx, args).await,
        Command::Logs(args) => logs::logs(ctx, &args),
        Command::Stats => logs::stats(ctx),
        // Config and Completions are handled before dispatch
        Command::Config(_) | Command::Completions(_) => Ok(()),
    }
}
