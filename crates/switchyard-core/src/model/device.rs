// ── Inventory domain types ──
//
// Devices, switch groups and users as handed to the core by the
// inventory collaborator. None of these carry secrets; credential
// profiles are referenced by name.

use std::collections::BTreeSet;

use serde::{Deserialize, Serialize};
use strum::{Display, EnumString};

/// How the device is managed. Selects the driver variant at session start.
#[derive(
    Debug, Clone, Copy, PartialEq, Eq, Hash, Default, Serialize, Deserialize, Display, EnumString,
)]
#[serde(rename_all = "kebab-case")]
#[strum(serialize_all = "kebab-case")]
pub enum ConnectorKind {
    /// Generic SNMP (MIB-II, Q-BRIDGE, POWER-ETHERNET, LLDP).
    #[default]
    Snmp,
    /// SNMP for reads and writes, SSH for config save and commands.
    SnmpSsh,
    /// Only CLI commands over SSH; no interface management.
    CommandsOnly,
    /// Vendor REST API.
    VendorApi,
    /// In-memory simulated switch.
    TestDummy,
}

impl ConnectorKind {
    pub fn uses_snmp(self) -> bool {
        matches!(self, Self::Snmp | Self::SnmpSsh)
    }

    pub fn uses_ssh(self) -> bool {
        matches!(self, Self::SnmpSsh | Self::CommandsOnly)
    }

    pub fn uses_api(self) -> bool {
        self == Self::VendorApi
    }
}

#[derive(Debug, Clone, Copy, PartialEq, Eq, Default, Serialize, Deserialize, Display)]
#[serde(rename_all = "lowercase")]
pub enum DeviceStatus {
    #[default]
    Active,
    Inactive,
}

/// A managed switch.
#[derive(Debug, Clone, PartialEq, Eq, Serialize, Deserialize)]
pub struct Device {
    pub id: u32,
    pub name: String,
    pub hostname: String,
    pub group_id: u32,
    #[serde(default)]
    pub connector: ConnectorKind,
    #[serde(default)]
    pub status: DeviceStatus,
    #[serde(default)]
    pub description: Option<String>,
    /// No changes allowed on this device, regardless of group or user.
    #[serde(default)]
    pub read_only: bool,
    #[serde(default)]
    pub snmp_profile: Option<String>,
    #[serde(default)]
    pub ssh_profile: Option<String>,
    #[serde(default)]
    pub api_profile: Option<String>,
}

impl Device {
    pub fn is_active(&self) -> bool {
        self.status == DeviceStatus::Active
    }
}

/// A group of switches sharing an access policy.
#[derive(Debug, Clone, PartialEq, Eq, Serialize, Deserialize)]
pub struct SwitchGroup {
    pub id: u32,
    pub name: String,
    #[serde(default)]
    pub description: Option<String>,
    /// Users granted access to the group.
    #[serde(default)]
    pub members: BTreeSet<String>,
    /// VLANs members may assign to interfaces.
    #[serde(default)]
    pub vlans: BTreeSet<u16>,
    #[serde(default)]
    pub allow_all_vlans: bool,
    #[serde(default)]
    pub read_only: bool,
    #[serde(default = "default_true")]
    pub bulk_edit: bool,
    #[serde(default)]
    pub edit_vlans: bool,
    /// Allow PoE toggling on interfaces that are otherwise not manageable.
    #[serde(default)]
    pub allow_poe_toggle: bool,
}

/// The person on whose behalf an operation runs.
#[derive(Debug, Clone, PartialEq, Eq, Serialize, Deserialize)]
pub struct User {
    pub name: String,
    #[serde(default)]
    pub is_superuser: bool,
    #[serde(default)]
    pub is_staff: bool,
    #[serde(default)]
    pub read_only: bool,
    #[serde(default = "default_true")]
    pub bulk_edit: bool,
    #[serde(default)]
    pub edit_vlans: bool,
    #[serde(default)]
    pub allow_poe_toggle: bool,
}

impl User {
    /// A regular user with default rights.
    pub fn new(name: impl Into<String>) -> Self {
        Self {
            name: name.into(),
            is_superuser: false,
            is_staff: false,
            read_only: false,
            bulk_edit: true,
            edit_vlans: false,
            allow_poe_toggle: false,
        }
    }

    pub fn superuser(name: impl Into<String>) -> Self {
        Self {
            is_superuser: true,
            is_staff: true,
            edit_vlans: true,
            ..Self::new(name)
        }
    }

    pub fn is_admin(&self) -> bool {
        self.is_superuser || self.is_staff
    }
}

fn default_true() -> bool {
    true
}

#[cfg(test)]
#[allow(clippy::unwrap_used)]
mod tests {
    use super::*;

    #[test]
    fn connector_kind_round_trips_kebab_case() {
        assert_eq!(ConnectorKind::SnmpSsh.to_string(), "snmp-ssh");
        assert_eq!(
            "vendor-api".parse::<ConnectorKind>().unwrap(),
            ConnectorKind::VendorApi
        );
        let json = serde_json::to_string(&ConnectorKind::TestDummy).unwrap();
        assert_eq!(json, "\"test-dummy\"");
    }

    #[test]
    fn group_defaults_allow_bulk_edit() {
        let group: SwitchGroup = serde_json::from_str(r#"{"id": 1, "name": "campus"}"#).unwrap();
        assert!(group.bulk_edit);
        assert!(!group.edit_vlans);
        assert!(group.vlans.is_empty());
    }
}
