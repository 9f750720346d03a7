//! VLAN management and config save.

use switchyard_core::{Command as CoreCommand, VlanRequest};

use crate::cli::{VlanArgs, VlanCommand};
use crate::context::Context;
use crate::error::CliError;

use super::util;

pub async fn handle(ctx: &Context, args: VlanArgs) -> Result<(), CliError> {
    let command = match args.command {
        VlanCommand::Create { id, name } => CoreCommand::CreateVlan(VlanRequest { id, name }),
        VlanCommand::Rename { id, name } => CoreCommand::EditVlan(VlanRequest { id, name }),
        VlanCommand::Delete { id } => {
            if !util::confirm(
                &format!("Delete VLAN {id} from {}? Ports in it lose connectivity.", args.switch),
                ctx.yes,
            )? {
                return Ok(());
            }
            CoreCommand::DeleteVlan { id }
        }
    };
    let result = util::execute(ctx, &args.switch, command).await?;
    util::print_message(ctx, &result)
}

pub async fn save(ctx: &Context, switch: &str) -> Result<(), CliError> {
    if !util::confirm(&format!("Save the running config of {switch}?"), ctx.yes)? {
        return Ok(());
    }
    let result = util::execute(ctx, switch, CoreCommand::SaveConfig).await?;
    util::print_message(ctx, &result)
}
