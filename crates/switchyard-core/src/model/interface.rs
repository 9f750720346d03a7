// ── Interface domain types ──
//
// An interface is keyed by a driver-defined string (ifIndex for SNMP,
// port name for REST). Everything a view or a change needs about the
// port lives here, including discovered clients and LLDP neighbors.

use std::collections::BTreeSet;
use std::net::Ipv4Addr;

use indexmap::IndexMap;
use serde::{Deserialize, Serialize};
use strum::Display;

use super::mac::MacAddress;

/// Admin or operational state of a port.
#[derive(Debug, Clone, Copy, PartialEq, Eq, Hash, Default, Serialize, Deserialize, Display)]
pub enum PortStatus {
    Up,
    #[default]
    Down,
}

impl PortStatus {
    pub fn from_bool(up: bool) -> Self {
        if up { Self::Up } else { Self::Down }
    }

    pub fn is_up(self) -> bool {
        self == Self::Up
    }

    pub fn flipped(self) -> Self {
        match self {
            Self::Up => Self::Down,
            Self::Down => Self::Up,
        }
    }
}

#[derive(Debug, Clone, Copy, PartialEq, Eq, Default, Serialize, Deserialize, Display)]
#[serde(rename_all = "lowercase")]
#[strum(serialize_all = "lowercase")]
pub enum InterfaceKind {
    #[default]
    Ethernet,
    Lag,
    Other,
}

/// Power-over-Ethernet admin state.
#[derive(Debug, Clone, Copy, PartialEq, Eq, Serialize, Deserialize, Display)]
pub enum PoeStatus {
    Enabled,
    Disabled,
}

impl PoeStatus {
    pub fn is_enabled(self) -> bool {
        self == Self::Enabled
    }

    pub fn flipped(self) -> Self {
        match self {
            Self::Enabled => Self::Disabled,
            Self::Disabled => Self::Enabled,
        }
    }
}

/// PoE port data. `index` is the driver's address for the PSE port.
#[derive(Debug, Clone, PartialEq, Eq, Serialize, Deserialize)]
pub struct PoeEntry {
    pub index: String,
    pub admin_status: PoeStatus,
    #[serde(default)]
    pub detect_status: Option<String>,
    #[serde(default)]
    pub power_consumed_mw: Option<u32>,
}

/// A client seen on a port.
#[derive(Debug, Clone, PartialEq, Eq, Serialize, Deserialize)]
pub struct EthernetEntry {
    pub mac: MacAddress,
    #[serde(default)]
    pub vendor: Option<String>,
    #[serde(default)]
    pub ipv4: Option<Ipv4Addr>,
    #[serde(default)]
    pub vlan: Option<u16>,
}

impl EthernetEntry {
    pub fn new(mac: MacAddress) -> Self {
        let vendor = mac.vendor().map(String::from);
        Self {
            mac,
            vendor,
            ipv4: None,
            vlan: None,
        }
    }
}

/// LLDP chassis-id subtype (IEEE 802.1AB).
#[derive(Debug, Clone, Copy, PartialEq, Eq, Default, Serialize, Deserialize, Display)]
#[serde(rename_all = "kebab-case")]
#[strum(serialize_all = "kebab-case")]
pub enum LldpChassisType {
    ChassisComponent,
    InterfaceAlias,
    PortComponent,
    MacAddress,
    NetworkAddress,
    InterfaceName,
    Local,
    #[default]
    Unknown,
}

impl LldpChassisType {
    pub fn from_subtype(subtype: i64) -> Self {
        match subtype {
            1 => Self::ChassisComponent,
            2 => Self::InterfaceAlias,
            3 => Self::PortComponent,
            4 => Self::MacAddress,
            5 => Self::NetworkAddress,
            6 => Self::InterfaceName,
            7 => Self::Local,
            _ => Self::Unknown,
        }
    }
}

/// LLDP system capability bits, in LLDP-MIB bit order.
#[derive(Debug, Clone, Copy, PartialEq, Eq, Serialize, Deserialize, Display)]
#[serde(rename_all = "kebab-case")]
#[strum(serialize_all = "kebab-case")]
pub enum LldpCapability {
    Other,
    Repeater,
    Bridge,
    AccessPoint,
    Router,
    Telephone,
    DocsisCable,
    StationOnly,
}

impl LldpCapability {
    const ORDER: [Self; 8] = [
        Self::Other,
        Self::Repeater,
        Self::Bridge,
        Self::AccessPoint,
        Self::Router,
        Self::Telephone,
        Self::DocsisCable,
        Self::StationOnly,
    ];

    /// Decode an SNMP BITS value: bit 0 is the MSB of the first octet.
    pub fn from_bits(bits: &[u8]) -> Vec<Self> {
        let first = bits.first().copied().unwrap_or(0);
        Self::ORDER
            .iter()
            .enumerate()
            .filter(|(i, _)| first & (0x80 >> i) != 0)
            .map(|(_, cap)| *cap)
            .collect()
    }

    /// Parse a name as printed by vendor APIs ("Bridge", "WLAN Access Point").
    pub fn from_name(name: &str) -> Option<Self> {
        let lower = name.trim().to_ascii_lowercase();
        let cap = match lower.as_str() {
            "other" => Self::Other,
            "repeater" => Self::Repeater,
            "bridge" => Self::Bridge,
            "wlan access point" | "wlan-access-point" | "access point" => Self::AccessPoint,
            "router" => Self::Router,
            "telephone" => Self::Telephone,
            "docsis cable device" | "docsis" => Self::DocsisCable,
            "station only" | "station-only" => Self::StationOnly,
            _ => return None,
        };
        Some(cap)
    }
}

/// A device seen via LLDP on a port.
#[derive(Debug, Clone, PartialEq, Eq, Default, Serialize, Deserialize)]
pub struct LldpNeighbor {
    pub chassis_type: LldpChassisType,
    pub chassis_id: String,
    pub port_id: String,
    #[serde(default)]
    pub port_descr: String,
    #[serde(default)]
    pub system_name: String,
    #[serde(default)]
    pub system_description: String,
    #[serde(default)]
    pub capabilities: Vec<LldpCapability>,
}

/// One switch port (or LAG) as cached in a device session.
#[derive(Debug, Clone, PartialEq, Eq, Serialize, Deserialize)]
pub struct Interface {
    pub key: String,
    pub name: String,
    #[serde(default)]
    pub kind: InterfaceKind,
    pub admin_status: PortStatus,
    pub oper_status: PortStatus,
    #[serde(default)]
    pub description: String,
    /// Untagged (native / PVID) VLAN.
    pub untagged_vlan: u16,
    #[serde(default)]
    pub tagged_vlans: BTreeSet<u16>,
    #[serde(default)]
    pub speed_mbps: u64,
    /// Bridge port number, where the device exposes one.
    #[serde(default)]
    pub port_index: Option<u32>,
    /// Aggregate this port belongs to; 0 when not a LACP member.
    #[serde(default)]
    pub lacp_master_index: u32,
    #[serde(default)]
    pub lacp_master_name: Option<String>,
    #[serde(default)]
    pub poe: Option<PoeEntry>,
    #[serde(default)]
    pub eth: IndexMap<MacAddress, EthernetEntry>,
    #[serde(default)]
    pub lldp: Vec<LldpNeighbor>,
    /// Whether the current user may change this interface.
    #[serde(default = "default_true")]
    pub manageable: bool,
    #[serde(default)]
    pub unmanage_reason: Option<String>,
    #[serde(default = "default_true")]
    pub can_edit_description: bool,
}

impl Interface {
    pub fn new(key: impl Into<String>, name: impl Into<String>) -> Self {
        Self {
            key: key.into(),
            name: name.into(),
            kind: InterfaceKind::Ethernet,
            admin_status: PortStatus::Down,
            oper_status: PortStatus::Down,
            description: String::new(),
            untagged_vlan: 1,
            tagged_vlans: BTreeSet::new(),
            speed_mbps: 0,
            port_index: None,
            lacp_master_index: 0,
            lacp_master_name: None,
            poe: None,
            eth: IndexMap::new(),
            lldp: Vec::new(),
            manageable: true,
            unmanage_reason: None,
            can_edit_description: true,
        }
    }

    pub fn is_lacp_member(&self) -> bool {
        self.lacp_master_index > 0
    }

    pub fn poe_status(&self) -> Option<PoeStatus> {
        self.poe.as_ref().map(|p| p.admin_status)
    }

    /// Record a client, keeping an existing entry's richer data.
    pub fn add_client(&mut self, entry: EthernetEntry) {
        self.eth
            .entry(entry.mac.clone())
            .and_modify(|existing| {
                if existing.vlan.is_none() {
                    existing.vlan = entry.vlan;
                }
                if existing.ipv4.is_none() {
                    existing.ipv4 = entry.ipv4;
                }
            })
            .or_insert(entry);
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
    fn capability_bits_decode_msb_first() {
        let caps = LldpCapability::from_bits(&[0x28]);
        assert_eq!(caps, vec![LldpCapability::Bridge, LldpCapability::Router]);
    }

    #[test]
    fn add_client_merges_ip() {
        let mac = MacAddress::new("00:11:22:33:44:55");
        let mut iface = Interface::new("1", "Gi1/0/1");
        let mut first = EthernetEntry::new(mac.clone());
        first.vlan = Some(10);
        iface.add_client(first);

        let mut second = EthernetEntry::new(mac.clone());
        second.ipv4 = Some(Ipv4Addr::new(10, 0, 0, 5));
        iface.add_client(second);

        let entry = &iface.eth[&mac];
        assert_eq!(entry.vlan, Some(10));
        assert_eq!(entry.ipv4, Some(Ipv4Addr::new(10, 0, 0, 5)));
    }

    #[test]
    fn status_display_matches_messages() {
        assert_eq!(PortStatus::Down.to_string(), "Down");
        assert_eq!(PoeStatus::Enabled.to_string(), "Enabled");
        assert_eq!(PortStatus::Up.flipped(), PortStatus::Down);
    }
}
