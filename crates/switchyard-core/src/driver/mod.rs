// ── Capability driver interface ──
//
// Every vendor driver implements `DeviceDriver`. Drivers only talk to
// the device: reads fill a `SwitchState`, writes apply one change and
// report success or failure. Cache bookkeeping (updating the cached
// interface, `save_needed`) is done by the session.

mod commands;
mod dummy;
mod factory;
mod hybrid;
mod rest;
pub mod snmp;

use serde::Serialize;

use crate::error::CoreError;
use crate::model::{ConnectorKind, Interface, PoeStatus, PortStatus};
use crate::session::SwitchState;

pub use commands::CommandDriver;
pub use dummy::{DummyCall, DummyDevice, DummyDriver, DummyLab, DummyOp};
pub use factory::{DEFAULT_PROFILE, DriverFactory, TransportFactory};
pub use hybrid::HybridDriver;
pub use rest::RestDriver;
pub use snmp::SnmpDriver;

/// What a driver can do beyond the basic read.
#[derive(Debug, Clone, Copy, PartialEq, Eq, Default, Serialize)]
pub struct Capabilities {
    pub can_change_interfaces: bool,
    pub can_edit_vlans: bool,
    pub can_save_config: bool,
    /// Changes persist on their own; no save step exists.
    pub auto_saves_config: bool,
    pub can_run_commands: bool,
    pub has_hardware_details: bool,
    pub has_client_data: bool,
}

/// Operations every vendor driver provides.
#[allow(async_fn_in_trait)]
pub trait DeviceDriver {
    fn connector(&self) -> ConnectorKind;

    fn capabilities(&self) -> Capabilities;

    /// System facts, interfaces and VLANs. All or nothing: on error the
    /// caller discards `state`.
    async fn read_basic(&mut self, state: &mut SwitchState) -> Result<(), CoreError>;

    /// Hardware inventory.
    async fn read_hardware(&mut self, state: &mut SwitchState) -> Result<(), CoreError>;

    /// Ethernet clients, ARP data and LLDP neighbors per interface.
    async fn read_clients(&mut self, state: &mut SwitchState) -> Result<(), CoreError>;

    async fn set_admin_status(
        &mut self,
        iface: &Interface,
        status: PortStatus,
    ) -> Result<(), CoreError>;

    async fn set_poe_status(&mut self, iface: &Interface, status: PoeStatus)
    -> Result<(), CoreError>;

    async fn set_untagged_vlan(&mut self, iface: &Interface, vlan: u16) -> Result<(), CoreError>;

    async fn set_description(&mut self, iface: &Interface, text: &str) -> Result<(), CoreError>;

    async fn vlan_create(&mut self, id: u16, name: &str) -> Result<(), CoreError>;

    async fn vlan_edit(&mut self, id: u16, name: &str) -> Result<(), CoreError>;

    async fn vlan_delete(&mut self, id: u16) -> Result<(), CoreError>;

    async fn save_running_config(&mut self) -> Result<(), CoreError>;

    async fn run_command(&mut self, command: &str) -> Result<String, CoreError>;

    /// Release device-side resources (e.g. a REST login session).
    async fn close(&mut self) {}
}

// ── Driver ───────────────────────────────────────────────────────────

/// The closed set of drivers, chosen from [`ConnectorKind`] when a
/// session is built.
pub enum Driver {
    Snmp(SnmpDriver),
    Hybrid(HybridDriver),
    Commands(CommandDriver),
    Rest(RestDriver),
    Dummy(DummyDriver),
}

macro_rules! dispatch {
    ($self:ident, $d:ident => $body:expr) => {
        match $self {
            Driver::Snmp($d) => $body,
            Driver::Hybrid($d) => $body,
            Driver::Commands($d) => $body,
            Driver::Rest($d) => $body,
            Driver::Dummy($d) => $body,
        }
    };
}

impl DeviceDriver for Driver {
    fn connector(&self) -> ConnectorKind {
        dispatch!(self, d => d.connector())
    }

    fn capabilities(&self) -> Capabilities {
        dispatch!(self, d => d.capabilities())
    }

    async fn read_basic(&mut self, state: &mut SwitchState) -> Result<(), CoreError> {
        dispatch!(self, d => d.read_basic(state).await)
    }

    async fn read_hardware(&mut self, state: &mut SwitchState) -> Result<(), CoreError> {
        dispatch!(self, d => d.read_hardware(state).await)
    }

    async fn read_clients(&mut self, state: &mut SwitchState) -> Result<(), CoreError> {
        dispatch!(self, d => d.read_clients(state).await)
    }

    async fn set_admin_status(
        &mut self,
        iface: &Interface,
        status: PortStatus,
    ) -> Result<(), CoreError> {
        dispatch!(self, d => d.set_admin_status(iface, status).await)
    }

    async fn set_poe_status(
        &mut self,
        iface: &Interface,
        status: PoeStatus,
    ) -> Result<(), CoreError> {
        dispatch!(self, d => d.set_poe_status(iface, status).await)
    }

    async fn set_untagged_vlan(&mut self, iface: &Interface, vlan: u16) -> Result<(), CoreError> {
        dispatch!(self, d => d.set_untagged_vlan(iface, vlan).await)
    }

    async fn set_description(&mut self, iface: &Interface, text: &str) -> Result<(), CoreError> {
        dispatch!(self, d => d.set_description(iface, text).await)
    }

    async fn vlan_create(&mut self, id: u16, name: &str) -> Result<(), CoreError> {
        dispatch!(self, d => d.vlan_create(id, name).await)
    }

    async fn vlan_edit(&mut self, id: u16, name: &str) -> Result<(), CoreError> {
        dispatch!(self, d => d.vlan_edit(id, name).await)
    }

    async fn vlan_delete(&mut self, id: u16) -> Result<(), CoreError> {
        dispatch!(self, d => d.vlan_delete(id).await)
    }

    async fn save_running_config(&mut self) -> Result<(), CoreError> {
        dispatch!(self, d => d.save_running_config().await)
    }

    async fn run_command(&mut self, command: &str) -> Result<String, CoreError> {
        dispatch!(self, d => d.run_command(command).await)
    }

    async fn close(&mut self) {
        dispatch!(self, d => d.close().await);
    }
}
