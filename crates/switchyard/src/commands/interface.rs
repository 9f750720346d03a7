//! Interface changes: single interface and bulk edit.

use switchyard_core::{
    AdminAction, BulkEditRequest, ChangeSet, Command as CoreCommand, CommandResult,
    DescriptionChange, DescriptionMode, PoeAction, PoeStatus, PortStatus,
};

use crate::cli::{AdminArg, BulkEditArgs, BulkPoeArg, InterfaceArgs, InterfaceCommand, PoeArg};
use crate::context::Context;
use crate::error::CliError;
use crate::output;

use super::util;

fn interface_command(interface: String, command: InterfaceCommand) -> CoreCommand {
    match command {
        InterfaceCommand::Up => CoreCommand::SetAdminStatus {
            interface,
            status: PortStatus::Up,
        },
        InterfaceCommand::Down => CoreCommand::SetAdminStatus {
            interface,
            status: PortStatus::Down,
        },
        InterfaceCommand::Bounce => CoreCommand::InterfaceDownUp { interface },
        InterfaceCommand::Poe { state: PoeArg::On } => CoreCommand::SetPoe {
            interface,
            status: PoeStatus::Enabled,
        },
        InterfaceCommand::Poe { state: PoeArg::Off } => CoreCommand::SetPoe {
            interface,
            status: PoeStatus::Disabled,
        },
        InterfaceCommand::Poe {
            state: PoeArg::Cycle,
        } => CoreCommand::PoeDownUp { interface },
        InterfaceCommand::Vlan { vlan } => CoreCommand::SetUntaggedVlan { interface, vlan },
        InterfaceCommand::Describe { text } => CoreCommand::SetDescription {
            interface,
            description: text,
        },
    }
}

pub async fn handle(ctx: &Context, args: InterfaceArgs) -> Result<(), CliError> {
    let command = interface_command(args.interface, args.command);
    let result = util::execute(ctx, &args.switch, command).await?;
    util::print_message(ctx, &result)
}

// ── Bulk edit ───────────────────────────────────────────────────────

fn change_set(args: &BulkEditArgs) -> ChangeSet {
    ChangeSet {
        admin: args.admin.map(|a| match a {
            AdminArg::Up => AdminAction::Up,
            AdminArg::Down => AdminAction::Down,
            AdminArg::Toggle => AdminAction::Toggle,
        }),
        poe: args.poe.map(|p| match p {
            BulkPoeArg::On => PoeAction::Up,
            BulkPoeArg::Off => PoeAction::Down,
            BulkPoeArg::Toggle => PoeAction::Toggle,
            BulkPoeArg::Cycle => PoeAction::ToggleDownUp,
        }),
        vlan: args.vlan,
        description: args.description.clone().map(|text| DescriptionChange {
            text,
            mode: if args.append {
                DescriptionMode::Append
            } else {
                DescriptionMode::Replace
            },
        }),
    }
}

pub async fn bulk_edit(ctx: &Context, args: BulkEditArgs) -> Result<(), CliError> {
    let changes = change_set(&args);
    if changes.is_empty() {
        return Err(CliError::Validation {
            field: "bulk-edit".into(),
            reason: "nothing to change; pass --admin, --poe, --vlan or --description".into(),
        });
    }

    let request = BulkEditRequest {
        interfaces: args.interfaces,
        changes,
    };
    let result = util::execute(ctx, &args.switch, CoreCommand::BulkEdit(request)).await?;
    let CommandResult::BulkEdit(summary) = &result else {
        return util::print_message(ctx, &result);
    };

    let color = ctx.color;
    let rendered = output::render_single(
        ctx.output,
        summary,
        |s| {
            let mut lines = s.outputs.clone();
            if let Some(halt) = &s.halted {
                lines.push(output::failed(&halt.description, color));
                if !halt.details.is_empty() {
                    lines.push(halt.details.clone());
                }
            }
            lines.push(format!(
                "{} change(s), {} error(s)",
                s.success_count, s.error_count
            ));
            lines.join("\n")
        },
        |s| s.outputs.join("\n"),
    )?;
    output::print_output(&rendered, ctx.quiet);

    if summary.is_ok() {
        Ok(())
    } else {
        Err(CliError::BulkEditFailed {
            success: summary.success_count,
            errors: summary.error_count,
        })
    }
}
