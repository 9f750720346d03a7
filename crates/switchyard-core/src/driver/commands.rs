// ── Commands-only driver ──
//
// For devices that are reachable only for CLI commands. The basic read
// runs the version command, so an unreachable device fails when the
// session opens, and records the first line of its answer. There is no
// interface model.

use std::sync::Arc;

use switchyard_api::CommandTransport;
use tracing::debug;

use super::{Capabilities, DeviceDriver};
use crate::error::CoreError;
use crate::model::{ConnectorKind, Device, Interface, PoeStatus, PortStatus};
use crate::session::SwitchState;

const DEFAULT_VERSION_COMMAND: &str = "show version";

pub struct CommandDriver {
    cli: Arc<dyn CommandTransport>,
    name: String,
    hostname: String,
    description: Option<String>,
    version_command: String,
}

impl CommandDriver {
    pub fn new(device: &Device, cli: Arc<dyn CommandTransport>) -> Self {
        Self {
            cli,
            name: device.name.clone(),
            hostname: device.hostname.clone(),
            description: device.description.clone(),
            version_command: DEFAULT_VERSION_COMMAND.to_owned(),
        }
    }

    #[must_use]
    pub fn with_version_command(mut self, command: impl Into<String>) -> Self {
        self.version_command = command.into();
        self
    }

    fn unsupported(operation: &str) -> CoreError {
        CoreError::unsupported(operation, ConnectorKind::CommandsOnly)
    }
}

impl DeviceDriver for CommandDriver {
    fn connector(&self) -> ConnectorKind {
        ConnectorKind::CommandsOnly
    }

    fn capabilities(&self) -> Capabilities {
        Capabilities {
            can_run_commands: true,
            ..Capabilities::default()
        }
    }

    async fn read_basic(&mut self, state: &mut SwitchState) -> Result<(), CoreError> {
        let output = self.cli.execute(&self.version_command).await?;
        debug!(device = %self.name, bytes = output.len(), "version command answered");
        if let Some(line) = output.lines().map(str::trim).find(|l| !l.is_empty()) {
            state.facts.firmware = line.to_owned();
        }

        state.facts.name.clone_from(&self.name);
        state.facts.description = self
            .description
            .clone()
            .unwrap_or_else(|| format!("Commands-only device at {}", self.hostname));
        Ok(())
    }

    async fn read_hardware(&mut self, _state: &mut SwitchState) -> Result<(), CoreError> {
        Err(Self::unsupported("hardware details"))
    }

    async fn read_clients(&mut self, _state: &mut SwitchState) -> Result<(), CoreError> {
        Err(Self::unsupported("client data"))
    }

    async fn set_admin_status(&mut self, _: &Interface, _: PortStatus) -> Result<(), CoreError> {
        Err(Self::unsupported("interface admin status"))
    }

    async fn set_poe_status(&mut self, _: &Interface, _: PoeStatus) -> Result<(), CoreError> {
        Err(Self::unsupported("PoE status"))
    }

    async fn set_untagged_vlan(&mut self, _: &Interface, _: u16) -> Result<(), CoreError> {
        Err(Self::unsupported("untagged VLAN"))
    }

    async fn set_description(&mut self, _: &Interface, _: &str) -> Result<(), CoreError> {
        Err(Self::unsupported("interface description"))
    }

    async fn vlan_create(&mut self, _: u16, _: &str) -> Result<(), CoreError> {
        Err(Self::unsupported("VLAN create"))
    }

    async fn vlan_edit(&mut self, _: u16, _: &str) -> Result<(), CoreError> {
        Err(Self::unsupported("VLAN edit"))
    }

    async fn vlan_delete(&mut self, _: u16) -> Result<(), CoreError> {
        Err(Self::unsupported("VLAN delete"))
    }

    async fn save_running_config(&mut self) -> Result<(), CoreError> {
        Err(Self::unsupported("save configuration"))
    }

    async fn run_command(&mut self, command: &str) -> Result<String, CoreError> {
        Ok(self.cli.execute(command).await?)
    }
}

#[cfg(test)]
#[allow(clippy::unwrap_used)]
mod tests {
    use std::sync::Mutex;

    use async_trait::async_trait;
    use pretty_assertions::assert_eq;
    use switchyard_api::Error as ApiError;

    use super::*;
    use crate::model::DeviceStatus;

    fn device() -> Device {
        Device {
            id: 4,
            name: "edge-4".into(),
            hostname: "192.0.2.4".into(),
            group_id: 1,
            connector: ConnectorKind::CommandsOnly,
            status: DeviceStatus::Active,
            description: None,
            read_only: false,
            snmp_profile: None,
            ssh_profile: None,
            api_profile: None,
        }
    }

    #[derive(Default)]
    struct ScriptedCli {
        commands: Mutex<Vec<String>>,
        unreachable: bool,
    }

    #[async_trait]
    impl CommandTransport for ScriptedCli {
        async fn execute(&self, command: &str) -> Result<String, ApiError> {
            self.commands.lock().unwrap().push(command.to_owned());
            if self.unreachable {
                return Err(ApiError::Timeout { timeout_secs: 10 });
            }
            Ok("\nEdgeOS v2.0.9 build 5346\nuptime 3 days\n".into())
        }
    }

    #[tokio::test]
    async fn basic_read_runs_the_version_command() {
        let cli = Arc::new(ScriptedCli::default());
        let mut driver = CommandDriver::new(&device(), cli.clone());
        let mut state = SwitchState::default();

        driver.read_basic(&mut state).await.unwrap();

        assert_eq!(*cli.commands.lock().unwrap(), vec!["show version".to_owned()]);
        assert_eq!(state.facts.firmware, "EdgeOS v2.0.9 build 5346");
        assert_eq!(state.facts.description, "Commands-only device at 192.0.2.4");
    }

    #[tokio::test]
    async fn unreachable_device_fails_the_basic_read() {
        let cli = Arc::new(ScriptedCli {
            unreachable: true,
            ..ScriptedCli::default()
        });
        let mut driver =
            CommandDriver::new(&device(), cli.clone()).with_version_command("display version");
        let mut state = SwitchState::default();

        let err = driver.read_basic(&mut state).await.unwrap_err();

        assert!(matches!(err, CoreError::Timeout { timeout_secs: 10 }));
        assert_eq!(*cli.commands.lock().unwrap(), vec!["display version".to_owned()]);
        assert!(state.facts.name.is_empty());
    }
}
