// ── SNMP + SSH driver ──
//
// Reads and interface changes go over SNMP; saving the configuration and
// running CLI commands go over an SSH command session.

use std::sync::Arc;

use switchyard_api::CommandTransport;
use tracing::{debug, info};

use super::{Capabilities, DeviceDriver, SnmpDriver};
use crate::error::CoreError;
use crate::model::{ConnectorKind, Interface, PoeStatus, PortStatus};
use crate::session::SwitchState;

/// CLI command used to persist the running configuration.
pub const DEFAULT_SAVE_COMMAND: &str = "write memory";

pub struct HybridDriver {
    snmp: SnmpDriver,
    cli: Arc<dyn CommandTransport>,
    save_command: String,
}

impl HybridDriver {
    pub fn new(snmp: SnmpDriver, cli: Arc<dyn CommandTransport>) -> Self {
        Self {
            snmp,
            cli,
            save_command: DEFAULT_SAVE_COMMAND.into(),
        }
    }

    #[must_use]
    pub fn with_save_command(mut self, command: impl Into<String>) -> Self {
        self.save_command = command.into();
        self
    }
}

impl DeviceDriver for HybridDriver {
    fn connector(&self) -> ConnectorKind {
        ConnectorKind::SnmpSsh
    }

    fn capabilities(&self) -> Capabilities {
        Capabilities {
            can_save_config: true,
            can_run_commands: true,
            ..self.snmp.capabilities()
        }
    }

    async fn read_basic(&mut self, state: &mut SwitchState) -> Result<(), CoreError> {
        self.snmp.read_basic(state).await
    }

    async fn read_hardware(&mut self, state: &mut SwitchState) -> Result<(), CoreError> {
        self.snmp.read_hardware(state).await
    }

    async fn read_clients(&mut self, state: &mut SwitchState) -> Result<(), CoreError> {
        self.snmp.read_clients(state).await
    }

    async fn set_admin_status(
        &mut self,
        iface: &Interface,
        status: PortStatus,
    ) -> Result<(), CoreError> {
        self.snmp.set_admin_status(iface, status).await
    }

    async fn set_poe_status(
        &mut self,
        iface: &Interface,
        status: PoeStatus,
    ) -> Result<(), CoreError> {
        self.snmp.set_poe_status(iface, status).await
    }

    async fn set_untagged_vlan(&mut self, iface: &Interface, vlan: u16) -> Result<(), CoreError> {
        self.snmp.set_untagged_vlan(iface, vlan).await
    }

    async fn set_description(&mut self, iface: &Interface, text: &str) -> Result<(), CoreError> {
        self.snmp.set_description(iface, text).await
    }

    async fn vlan_create(&mut self, id: u16, name: &str) -> Result<(), CoreError> {
        self.snmp.vlan_create(id, name).await
    }

    async fn vlan_edit(&mut self, id: u16, name: &str) -> Result<(), CoreError> {
        self.snmp.vlan_edit(id, name).await
    }

    async fn vlan_delete(&mut self, id: u16) -> Result<(), CoreError> {
        self.snmp.vlan_delete(id).await
    }

    async fn save_running_config(&mut self) -> Result<(), CoreError> {
        info!(command = %self.save_command, "saving running configuration");
        let output = self.cli.execute(&self.save_command).await?;
        debug!(bytes = output.len(), "save command finished");
        Ok(())
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
    use switchyard_api::{Error as ApiError, Oid, SnmpTransport, SnmpValue};

    use super::*;

    struct NoAgent;

    #[async_trait]
    impl SnmpTransport for NoAgent {
        async fn get(&self, oid: &Oid) -> Result<SnmpValue, ApiError> {
            Err(ApiError::NoSuchObject {
                oid: oid.to_string(),
            })
        }
        async fn walk(&self, _base: &Oid) -> Result<Vec<(Oid, SnmpValue)>, ApiError> {
            Ok(Vec::new())
        }
        async fn set(&self, _oid: &Oid, _value: &SnmpValue) -> Result<(), ApiError> {
            Ok(())
        }
    }

    #[derive(Default)]
    struct RecordingCli {
        commands: Mutex<Vec<String>>,
    }

    #[async_trait]
    impl CommandTransport for RecordingCli {
        async fn execute(&self, command: &str) -> Result<String, ApiError> {
            self.commands.lock().unwrap().push(command.to_owned());
            Ok(format!("ran {command}"))
        }
    }

    #[tokio::test]
    async fn save_and_commands_go_over_cli() {
        let cli = Arc::new(RecordingCli::default());
        let mut driver = HybridDriver::new(SnmpDriver::new(Arc::new(NoAgent)), cli.clone())
            .with_save_command("copy run start");

        assert!(driver.capabilities().can_save_config);
        assert!(driver.capabilities().can_change_interfaces);
        driver.save_running_config().await.unwrap();
        let out = driver.run_command("show version").await.unwrap();

        assert_eq!(out, "ran show version");
        assert_eq!(
            *cli.commands.lock().unwrap(),
            vec!["copy run start".to_owned(), "show version".to_owned()]
        );
    }
}
