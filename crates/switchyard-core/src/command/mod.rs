// ── Device commands ──
//
// Everything a caller can ask of one device beyond viewing it. The
// controller checks access, opens the session and dispatches on these.

pub mod requests;

use serde::Serialize;

use crate::bulk::{BulkEditRequest, BulkEditSummary};
use crate::model::{LogAction, PoeStatus, PortStatus};

pub use requests::{RunCommandRequest, TemplateRequest, VlanRequest};

#[derive(Debug, Clone)]
pub enum Command {
    // ── Interface ────────────────────────────────────────────────────
    SetAdminStatus { interface: String, status: PortStatus },
    InterfaceDownUp { interface: String },
    SetPoe { interface: String, status: PoeStatus },
    PoeDownUp { interface: String },
    SetUntaggedVlan { interface: String, vlan: u16 },
    SetDescription { interface: String, description: String },

    // ── VLAN ─────────────────────────────────────────────────────────
    CreateVlan(VlanRequest),
    EditVlan(VlanRequest),
    DeleteVlan { id: u16 },

    // ── Device ───────────────────────────────────────────────────────
    SaveConfig,
    RunCommand(RunCommandRequest),
    RunCommandString { command: String },
    RunTemplate(TemplateRequest),

    BulkEdit(BulkEditRequest),
}

impl Command {
    /// The activity log action recorded for this command.
    pub fn action(&self) -> LogAction {
        match self {
            Self::SetAdminStatus { status, .. } => {
                if status.is_up() {
                    LogAction::InterfaceUp
                } else {
                    LogAction::InterfaceDown
                }
            }
            Self::InterfaceDownUp { .. } => LogAction::InterfaceDownUp,
            Self::SetPoe { status, .. } => {
                if status.is_enabled() {
                    LogAction::PoeUp
                } else {
                    LogAction::PoeDown
                }
            }
            Self::PoeDownUp { .. } => LogAction::PoeToggle,
            Self::SetUntaggedVlan { .. } => LogAction::PvidChange,
            Self::SetDescription { .. } => LogAction::AliasChange,
            Self::CreateVlan(_) => LogAction::VlanCreate,
            Self::EditVlan(_) => LogAction::VlanEdit,
            Self::DeleteVlan { .. } => LogAction::VlanDelete,
            Self::SaveConfig => LogAction::SaveSwitch,
            Self::RunCommand(_) | Self::RunCommandString { .. } | Self::RunTemplate(_) => {
                LogAction::ExecuteCommand
            }
            Self::BulkEdit(_) => LogAction::BulkEdit,
        }
    }

    /// Whether the command changes device configuration.
    pub fn is_change(&self) -> bool {
        !matches!(
            self,
            Self::RunCommand(_) | Self::RunCommandString { .. } | Self::RunTemplate(_)
        )
    }

    /// Interface key this command targets, if any.
    pub fn interface(&self) -> Option<&str> {
        match self {
            Self::SetAdminStatus { interface, .. }
            | Self::InterfaceDownUp { interface }
            | Self::SetPoe { interface, .. }
            | Self::PoeDownUp { interface }
            | Self::SetUntaggedVlan { interface, .. }
            | Self::SetDescription { interface, .. } => Some(interface),
            Self::RunCommand(req) => req.interface.as_deref(),
            _ => None,
        }
    }
}

/// Output of a command run on the device.
#[derive(Debug, Clone, PartialEq, Eq, Serialize)]
pub struct CommandOutput {
    pub command: String,
    pub output: String,
}

#[derive(Debug, Clone, PartialEq, Eq, Serialize)]
#[serde(tag = "result", rename_all = "kebab-case")]
pub enum CommandResult {
    /// The change was applied.
    Changed { message: String },
    /// Nothing to do; the device already matched the request.
    Ignored { message: String },
    Output(CommandOutput),
    BulkEdit(BulkEditSummary),
}

impl CommandResult {
    pub fn message(&self) -> Option<&str> {
        match self {
            Self::Changed { message } | Self::Ignored { message } => Some(message),
            _ => None,
        }
    }
}

#[cfg(test)]
mod tests {
    use super::*;

    #[test]
    fn actions_follow_the_requested_state() {
        let down = Command::SetAdminStatus {
            interface: "3".into(),
            status: PortStatus::Down,
        };
        assert_eq!(down.action(), LogAction::InterfaceDown);
        assert_eq!(down.interface(), Some("3"));
        assert!(down.is_change());

        let run = Command::RunCommandString {
            command: "show clock".into(),
        };
        assert_eq!(run.action(), LogAction::ExecuteCommand);
        assert!(!run.is_change());
    }
}
