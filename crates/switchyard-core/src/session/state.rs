// ── Cached device state ──
//
// Everything read from a device during a session. This is what gets
// serialized into the session store between requests.

use std::collections::BTreeMap;

use chrono::{DateTime, Utc};
use indexmap::IndexMap;
use serde::{Deserialize, Serialize};

use crate::model::{HardwareEntry, Interface, SystemFacts, Vlan};

/// Read progress of a session. Detail and client reads are tracked by
/// timestamps on [`SwitchState`] and never move the phase backward.
#[derive(Debug, Clone, Copy, PartialEq, Eq, Default, Serialize, Deserialize)]
#[serde(rename_all = "kebab-case")]
pub enum ReadPhase {
    #[default]
    Uninitialized,
    BasicRead,
    Ready,
}

#[derive(Debug, Clone, Default, Serialize, Deserialize)]
pub struct SwitchState {
    pub phase: ReadPhase,
    pub facts: SystemFacts,
    /// Interfaces in device order.
    pub interfaces: IndexMap<String, Interface>,
    pub vlans: BTreeMap<u16, Vlan>,
    pub hardware: Vec<HardwareEntry>,
    pub basic_read_at: Option<DateTime<Utc>>,
    pub hardware_read_at: Option<DateTime<Utc>>,
    pub clients_read_at: Option<DateTime<Utc>>,
    /// A successful change has not yet been persisted on the device.
    pub save_needed: bool,
    pub warnings: Vec<String>,
}

impl SwitchState {
    /// Interface by bridge port number, falling back to the key.
    pub fn interface_by_port_mut(&mut self, port: u32) -> Option<&mut Interface> {
        let key = self
            .interfaces
            .values()
            .find(|i| i.port_index == Some(port))
            .map(|i| i.key.clone())
            .unwrap_or_else(|| port.to_string());
        self.interfaces.get_mut(&key)
    }

    /// Interface by its display name.
    pub fn interface_by_name_mut(&mut self, name: &str) -> Option<&mut Interface> {
        self.interfaces.values_mut().find(|i| i.name == name)
    }

    /// Drop previously discovered clients and neighbors before a fresh read.
    pub fn clear_clients(&mut self) {
        for iface in self.interfaces.values_mut() {
            iface.eth.clear();
            iface.lldp.clear();
        }
    }
}
