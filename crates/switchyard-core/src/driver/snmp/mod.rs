// ── Generic SNMP driver ──
//
// Standards-only management: IF-MIB for ports, Q-BRIDGE for VLANs,
// POWER-ETHERNET for PoE, IEEE8023-LAG for LACP membership, LLDP-MIB
// and ENTITY-MIB for details. Interfaces are keyed by ifIndex.

mod mib;
mod portlist;

use std::collections::{BTreeMap, HashMap};
use std::net::Ipv4Addr;
use std::sync::Arc;

use switchyard_api::{Oid, SnmpTransport, SnmpValue};
use tracing::{debug, trace};

use super::{Capabilities, DeviceDriver};
use crate::error::CoreError;
use crate::model::{
    ConnectorKind, EthernetEntry, HardwareClass, HardwareEntry, Interface, InterfaceKind,
    LldpCapability, LldpChassisType, LldpNeighbor, MacAddress, PoeEntry, PoeStatus, PortStatus,
    Vlan,
};
use crate::session::SwitchState;

type Rows = Vec<(Vec<u32>, SnmpValue)>;

pub struct SnmpDriver {
    transport: Arc<dyn SnmpTransport>,
}

impl SnmpDriver {
    pub fn new(transport: Arc<dyn SnmpTransport>) -> Self {
        Self { transport }
    }

    // ── Helpers ──────────────────────────────────────────────────────

    /// Walk a column, returning index suffixes with their values.
    async fn walk(&self, column: &[u32]) -> Result<Rows, CoreError> {
        let base = Oid::new(column);
        let rows = self.transport.walk(&base).await?;
        Ok(rows
            .into_iter()
            .filter_map(|(oid, value)| oid.suffix_after(&base).map(|s| (s.to_vec(), value)))
            .collect())
    }

    /// Walk a column indexed by a single integer.
    async fn walk_indexed(&self, column: &[u32]) -> Result<BTreeMap<u32, SnmpValue>, CoreError> {
        Ok(self
            .walk(column)
            .await?
            .into_iter()
            .filter_map(|(idx, value)| match idx.as_slice() {
                [i] => Some((*i, value)),
                _ => None,
            })
            .collect())
    }

    async fn get(&self, column: &[u32], index: &[u32]) -> Result<SnmpValue, CoreError> {
        let oid = Oid::new(column).extend(index);
        Ok(self.transport.get(&oid).await?)
    }

    async fn set(&self, column: &[u32], index: &[u32], value: SnmpValue) -> Result<(), CoreError> {
        let oid = Oid::new(column).extend(index);
        trace!(%oid, "snmp set");
        Ok(self.transport.set(&oid, &value).await?)
    }

    // ── Basic read steps ─────────────────────────────────────────────

    async fn read_system(&self, state: &mut SwitchState) -> Result<(), CoreError> {
        let rows = self.walk(mib::SYSTEM).await?;
        if rows.is_empty() {
            return Err(CoreError::Transport {
                description: "Device returned no system information".into(),
                details: "empty SNMPv2-MIB system group".into(),
            });
        }
        let facts = &mut state.facts;
        for (idx, value) in rows {
            let text = || value.as_text().unwrap_or_default();
            match idx.as_slice() {
                [1, 0] => facts.description = text(),
                [2, 0] => facts.object_id = value.as_oid().map(Oid::to_string).unwrap_or_default(),
                [3, 0] => facts.uptime_ticks = value.as_u64(),
                [4, 0] => facts.contact = text(),
                [5, 0] => facts.name = text(),
                [6, 0] => facts.location = text(),
                _ => {}
            }
        }
        Ok(())
    }

    async fn read_interfaces(&self, state: &mut SwitchState) -> Result<(), CoreError> {
        let descr = self.walk_indexed(mib::IF_DESCR).await?;
        let types = self.walk_indexed(mib::IF_TYPE).await?;
        let speed = self.walk_indexed(mib::IF_SPEED).await?;
        let admin = self.walk_indexed(mib::IF_ADMIN_STATUS).await?;
        let oper = self.walk_indexed(mib::IF_OPER_STATUS).await?;
        let names = self.walk_indexed(mib::IF_NAME).await?;
        let high_speed = self.walk_indexed(mib::IF_HIGH_SPEED).await?;
        let alias = self.walk_indexed(mib::IF_ALIAS).await?;

        if descr.is_empty() {
            return Err(CoreError::Transport {
                description: "Device returned no interfaces".into(),
                details: "empty IF-MIB ifTable".into(),
            });
        }

        for (index, descr) in &descr {
            let if_type = types.get(index).and_then(SnmpValue::as_i64).unwrap_or(0);
            let kind = if mib::IF_TYPE_ETHERNET.contains(&if_type) {
                InterfaceKind::Ethernet
            } else if if_type == mib::IF_TYPE_LAG {
                InterfaceKind::Lag
            } else {
                continue;
            };

            let name = names
                .get(index)
                .and_then(SnmpValue::as_text)
                .filter(|n| !n.is_empty())
                .or_else(|| descr.as_text())
                .unwrap_or_else(|| index.to_string());

            let mut iface = Interface::new(index.to_string(), name);
            iface.kind = kind;
            iface.admin_status = status_of(admin.get(index));
            iface.oper_status = status_of(oper.get(index));
            iface.description = alias.get(index).and_then(SnmpValue::as_text).unwrap_or_default();
            iface.speed_mbps = high_speed
                .get(index)
                .and_then(SnmpValue::as_u64)
                .filter(|s| *s > 0)
                .or_else(|| speed.get(index).and_then(SnmpValue::as_u64).map(|bps| bps / 1_000_000))
                .unwrap_or(0);
            state.interfaces.insert(iface.key.clone(), iface);
        }
        Ok(())
    }

    async fn read_vlans(&self, state: &mut SwitchState) -> Result<(), CoreError> {
        for (port, value) in self.walk_indexed(mib::DOT1D_BASE_PORT_IF_INDEX).await? {
            let key = value.as_i64().unwrap_or(0).to_string();
            if let Some(iface) = state.interfaces.get_mut(&key) {
                iface.port_index = Some(port);
            }
        }

        for (port, value) in self.walk_indexed(mib::DOT1Q_PVID).await? {
            if let (Some(iface), Some(vlan)) = (
                state.interface_by_port_mut(port),
                value.as_u64().and_then(|v| u16::try_from(v).ok()),
            ) {
                iface.untagged_vlan = vlan;
            }
        }

        for (id, value) in self.walk_indexed(mib::DOT1Q_VLAN_STATIC_NAME).await? {
            if let Ok(id) = u16::try_from(id) {
                state
                    .vlans
                    .insert(id, Vlan::new(id, value.as_text().unwrap_or_default()));
            }
        }

        let egress = self.walk_indexed(mib::DOT1Q_VLAN_STATIC_EGRESS_PORTS).await?;
        let untagged = self.walk_indexed(mib::DOT1Q_VLAN_STATIC_UNTAGGED_PORTS).await?;
        for (vlan, members) in &egress {
            let Ok(vlan_id) = u16::try_from(*vlan) else {
                continue;
            };
            let untagged_list = untagged
                .get(vlan)
                .and_then(SnmpValue::as_bytes)
                .unwrap_or_default();
            for port in portlist::ports(members.as_bytes().unwrap_or_default()) {
                if portlist::has_port(untagged_list, port) {
                    continue;
                }
                if let Some(iface) = state.interface_by_port_mut(port) {
                    iface.tagged_vlans.insert(vlan_id);
                }
            }
        }
        Ok(())
    }

    async fn read_lacp(&self, state: &mut SwitchState) -> Result<(), CoreError> {
        let attached = self.walk_indexed(mib::DOT3AD_AGG_PORT_ATTACHED_AGG_ID).await?;
        for (index, value) in attached {
            let agg = value
                .as_i64()
                .and_then(|v| u32::try_from(v).ok())
                .unwrap_or(0);
            if agg == 0 || agg == index {
                continue;
            }
            let master_name = state.interfaces.get(&agg.to_string()).map(|i| i.name.clone());
            if let Some(iface) = state.interfaces.get_mut(&index.to_string()) {
                iface.lacp_master_index = agg;
                iface.lacp_master_name = master_name;
            }
        }
        Ok(())
    }

    async fn read_poe(&self, state: &mut SwitchState) -> Result<(), CoreError> {
        let admin = self.walk(mib::PETH_PSE_PORT_ADMIN_ENABLE).await?;
        let detect: HashMap<Vec<u32>, i64> = self
            .walk(mib::PETH_PSE_PORT_DETECTION_STATUS)
            .await?
            .into_iter()
            .filter_map(|(idx, v)| v.as_i64().map(|code| (idx, code)))
            .collect();

        for (idx, value) in admin {
            let [group, port] = idx.as_slice() else {
                continue;
            };
            if *group != 1 {
                trace!(group, port, "skipping PoE port outside first PSE group");
                continue;
            }
            let Some(iface) = state.interfaces.get_mut(&port.to_string()) else {
                continue;
            };
            iface.poe = Some(PoeEntry {
                index: format!("{group}.{port}"),
                admin_status: if value.as_i64() == Some(mib::PSE_ENABLED) {
                    PoeStatus::Enabled
                } else {
                    PoeStatus::Disabled
                },
                detect_status: detect
                    .get(&idx)
                    .map(|code| mib::pse_detection_name(*code).to_owned()),
                power_consumed_mw: None,
            });
        }
        Ok(())
    }

    // ── Client read steps ────────────────────────────────────────────

    async fn read_fdb(&self, state: &mut SwitchState) -> Result<(), CoreError> {
        let mut rows = self.walk(mib::DOT1Q_TP_FDB_PORT).await?;
        let qbridge = !rows.is_empty();
        if !qbridge {
            rows = self.walk(mib::DOT1D_TP_FDB_PORT).await?;
        }

        for (idx, value) in rows {
            let (vlan, mac_idx) = if qbridge {
                match idx.split_first() {
                    Some((fdb, rest)) => (u16::try_from(*fdb).ok(), rest),
                    None => continue,
                }
            } else {
                (None, idx.as_slice())
            };
            let Some(mac) = mac_from_index(mac_idx) else {
                continue;
            };
            let Some(port) = value.as_i64().and_then(|p| u32::try_from(p).ok()) else {
                continue;
            };
            if port == 0 {
                continue;
            }
            if let Some(iface) = state.interface_by_port_mut(port) {
                let mut entry = EthernetEntry::new(mac);
                entry.vlan = vlan;
                iface.add_client(entry);
            }
        }
        Ok(())
    }

    async fn read_arp(&self, state: &mut SwitchState) -> Result<(), CoreError> {
        let mut ip_by_mac: HashMap<MacAddress, Ipv4Addr> = HashMap::new();
        for (idx, value) in self.walk(mib::IP_NET_TO_MEDIA_PHYS_ADDRESS).await? {
            let [_, a, b, c, d] = idx.as_slice() else {
                continue;
            };
            let octets: Option<Vec<u8>> = [a, b, c, d]
                .iter()
                .map(|o| u8::try_from(**o).ok())
                .collect();
            let (Some(octets), Some(mac)) = (
                octets,
                value.as_bytes().and_then(MacAddress::from_bytes),
            ) else {
                continue;
            };
            ip_by_mac.insert(mac, Ipv4Addr::new(octets[0], octets[1], octets[2], octets[3]));
        }

        for iface in state.interfaces.values_mut() {
            for entry in iface.eth.values_mut() {
                if entry.ipv4.is_none() {
                    entry.ipv4 = ip_by_mac.get(&entry.mac).copied();
                }
            }
        }
        Ok(())
    }

    async fn read_lldp(&self, state: &mut SwitchState) -> Result<(), CoreError> {
        let mut neighbors: BTreeMap<(u32, u32), LldpNeighbor> = BTreeMap::new();
        for (idx, value) in self.walk(mib::LLDP_REM_ENTRY).await? {
            let [column, _time_mark, local_port, rem_index] = idx.as_slice() else {
                continue;
            };
            let n = neighbors.entry((*local_port, *rem_index)).or_default();
            let text = || value.as_text().unwrap_or_default();
            match *column {
                mib::LLDP_REM_CHASSIS_ID_SUBTYPE => {
                    n.chassis_type = LldpChassisType::from_subtype(value.as_i64().unwrap_or(0));
                }
                mib::LLDP_REM_CHASSIS_ID => {
                    n.chassis_id = match value.as_bytes().and_then(MacAddress::from_bytes) {
                        Some(mac) if n.chassis_type == LldpChassisType::MacAddress => {
                            mac.to_string()
                        }
                        _ => text(),
                    };
                }
                mib::LLDP_REM_PORT_ID => n.port_id = text(),
                mib::LLDP_REM_PORT_DESC => n.port_descr = text(),
                mib::LLDP_REM_SYS_NAME => n.system_name = text(),
                mib::LLDP_REM_SYS_DESC => n.system_description = text(),
                mib::LLDP_REM_SYS_CAP_ENABLED => {
                    n.capabilities = LldpCapability::from_bits(value.as_bytes().unwrap_or_default());
                }
                _ => {}
            }
        }

        for ((local_port, _), neighbor) in neighbors {
            if let Some(iface) = state.interface_by_port_mut(local_port) {
                iface.lldp.push(neighbor);
            }
        }
        Ok(())
    }
}

impl DeviceDriver for SnmpDriver {
    fn connector(&self) -> ConnectorKind {
        ConnectorKind::Snmp
    }

    fn capabilities(&self) -> Capabilities {
        Capabilities {
            can_change_interfaces: true,
            can_edit_vlans: true,
            can_save_config: false,
            auto_saves_config: false,
            can_run_commands: false,
            has_hardware_details: true,
            has_client_data: true,
        }
    }

    async fn read_basic(&mut self, state: &mut SwitchState) -> Result<(), CoreError> {
        self.read_system(state).await?;
        self.read_interfaces(state).await?;
        self.read_vlans(state).await?;
        self.read_lacp(state).await?;
        self.read_poe(state).await?;
        debug!(
            interfaces = state.interfaces.len(),
            vlans = state.vlans.len(),
            "snmp basic read complete"
        );
        Ok(())
    }

    async fn read_hardware(&mut self, state: &mut SwitchState) -> Result<(), CoreError> {
        let classes = self.walk_indexed(mib::ENT_PHYSICAL_CLASS).await?;
        let descr = self.walk_indexed(mib::ENT_PHYSICAL_DESCR).await?;
        let names = self.walk_indexed(mib::ENT_PHYSICAL_NAME).await?;
        let hw_rev = self.walk_indexed(mib::ENT_PHYSICAL_HARDWARE_REV).await?;
        let fw_rev = self.walk_indexed(mib::ENT_PHYSICAL_FIRMWARE_REV).await?;
        let sw_rev = self.walk_indexed(mib::ENT_PHYSICAL_SOFTWARE_REV).await?;
        let serial = self.walk_indexed(mib::ENT_PHYSICAL_SERIAL_NUM).await?;
        let model = self.walk_indexed(mib::ENT_PHYSICAL_MODEL_NAME).await?;

        let text = |map: &BTreeMap<u32, SnmpValue>, i: &u32| {
            map.get(i)
                .and_then(SnmpValue::as_text)
                .map(|s| s.trim().to_owned())
                .unwrap_or_default()
        };

        let mut entries = Vec::new();
        for (index, class) in &classes {
            let class = HardwareClass::from_code(class.as_i64().unwrap_or(0));
            if !matches!(
                class,
                HardwareClass::Chassis
                    | HardwareClass::Module
                    | HardwareClass::PowerSupply
                    | HardwareClass::Fan
                    | HardwareClass::Stack
            ) {
                continue;
            }
            entries.push(HardwareEntry {
                index: index.to_string(),
                class,
                name: text(&names, index),
                description: text(&descr, index),
                model: text(&model, index),
                serial: text(&serial, index),
                hardware_rev: text(&hw_rev, index),
                firmware_rev: text(&fw_rev, index),
                software_rev: text(&sw_rev, index),
            });
        }

        if let Some(chassis) = entries.iter().find(|e| e.class == HardwareClass::Chassis) {
            state.facts.model.clone_from(&chassis.model);
            state.facts.firmware.clone_from(&chassis.software_rev);
        }
        state.hardware = entries;
        Ok(())
    }

    async fn read_clients(&mut self, state: &mut SwitchState) -> Result<(), CoreError> {
        state.clear_clients();
        self.read_fdb(state).await?;
        self.read_arp(state).await?;
        self.read_lldp(state).await?;
        Ok(())
    }

    async fn set_admin_status(
        &mut self,
        iface: &Interface,
        status: PortStatus,
    ) -> Result<(), CoreError> {
        let value = if status.is_up() {
            mib::STATUS_UP
        } else {
            mib::STATUS_DOWN
        };
        self.set(mib::IF_ADMIN_STATUS, &[if_index(iface)?], SnmpValue::Integer(value))
            .await
    }

    async fn set_poe_status(
        &mut self,
        iface: &Interface,
        status: PoeStatus,
    ) -> Result<(), CoreError> {
        let poe = iface.poe.as_ref().ok_or_else(|| {
            CoreError::validation(format!("Interface {} is not PoE capable", iface.name))
        })?;
        let index = parse_index(&poe.index)?;
        let value = if status.is_enabled() {
            mib::PSE_ENABLED
        } else {
            mib::PSE_DISABLED
        };
        self.set(mib::PETH_PSE_PORT_ADMIN_ENABLE, &index, SnmpValue::Integer(value))
            .await
    }

    async fn set_untagged_vlan(&mut self, iface: &Interface, vlan: u16) -> Result<(), CoreError> {
        let port = iface.port_index.ok_or_else(|| {
            CoreError::unsupported(
                format!("VLAN change on {} (no bridge port)", iface.name),
                ConnectorKind::Snmp,
            )
        })?;
        let new_id = [u32::from(vlan)];

        // The port must be an untagged member of the new VLAN before the PVID moves.
        let egress = self.get(mib::DOT1Q_VLAN_STATIC_EGRESS_PORTS, &new_id).await?;
        let untagged = self.get(mib::DOT1Q_VLAN_STATIC_UNTAGGED_PORTS, &new_id).await?;
        self.set(
            mib::DOT1Q_VLAN_STATIC_EGRESS_PORTS,
            &new_id,
            SnmpValue::OctetString(portlist::with_port(egress.as_bytes().unwrap_or_default(), port, true)),
        )
        .await?;
        self.set(
            mib::DOT1Q_VLAN_STATIC_UNTAGGED_PORTS,
            &new_id,
            SnmpValue::OctetString(portlist::with_port(untagged.as_bytes().unwrap_or_default(), port, true)),
        )
        .await?;
        self.set(mib::DOT1Q_PVID, &[port], SnmpValue::Gauge32(u32::from(vlan)))
            .await?;

        let old = iface.untagged_vlan;
        if old == vlan {
            return Ok(());
        }
        let old_id = [u32::from(old)];
        let old_untagged = self.get(mib::DOT1Q_VLAN_STATIC_UNTAGGED_PORTS, &old_id).await?;
        self.set(
            mib::DOT1Q_VLAN_STATIC_UNTAGGED_PORTS,
            &old_id,
            SnmpValue::OctetString(portlist::with_port(old_untagged.as_bytes().unwrap_or_default(), port, false)),
        )
        .await?;
        if !iface.tagged_vlans.contains(&old) {
            let old_egress = self.get(mib::DOT1Q_VLAN_STATIC_EGRESS_PORTS, &old_id).await?;
            self.set(
                mib::DOT1Q_VLAN_STATIC_EGRESS_PORTS,
                &old_id,
                SnmpValue::OctetString(portlist::with_port(old_egress.as_bytes().unwrap_or_default(), port, false)),
            )
            .await?;
        }
        Ok(())
    }

    async fn set_description(&mut self, iface: &Interface, text: &str) -> Result<(), CoreError> {
        self.set(mib::IF_ALIAS, &[if_index(iface)?], SnmpValue::string(text))
            .await
    }

    async fn vlan_create(&mut self, id: u16, name: &str) -> Result<(), CoreError> {
        let index = [u32::from(id)];
        self.set(
            mib::DOT1Q_VLAN_STATIC_ROW_STATUS,
            &index,
            SnmpValue::Integer(mib::ROW_CREATE_AND_GO),
        )
        .await?;
        self.set(mib::DOT1Q_VLAN_STATIC_NAME, &index, SnmpValue::string(name))
            .await
    }

    async fn vlan_edit(&mut self, id: u16, name: &str) -> Result<(), CoreError> {
        self.set(mib::DOT1Q_VLAN_STATIC_NAME, &[u32::from(id)], SnmpValue::string(name))
            .await
    }

    async fn vlan_delete(&mut self, id: u16) -> Result<(), CoreError> {
        self.set(
            mib::DOT1Q_VLAN_STATIC_ROW_STATUS,
            &[u32::from(id)],
            SnmpValue::Integer(mib::ROW_DESTROY),
        )
        .await
    }

    async fn save_running_config(&mut self) -> Result<(), CoreError> {
        Err(CoreError::unsupported("save configuration", ConnectorKind::Snmp))
    }

    async fn run_command(&mut self, _command: &str) -> Result<String, CoreError> {
        Err(CoreError::unsupported("run command", ConnectorKind::Snmp))
    }
}

fn status_of(value: Option<&SnmpValue>) -> PortStatus {
    PortStatus::from_bool(value.and_then(SnmpValue::as_i64) == Some(mib::STATUS_UP))
}

fn if_index(iface: &Interface) -> Result<u32, CoreError> {
    iface
        .key
        .parse()
        .map_err(|_| CoreError::Internal(format!("interface key '{}' is not an ifIndex", iface.key)))
}

fn parse_index(index: &str) -> Result<Vec<u32>, CoreError> {
    index
        .split('.')
        .map(|p| p.parse::<u32>())
        .collect::<Result<Vec<_>, _>>()
        .map_err(|_| CoreError::Internal(format!("invalid table index '{index}'")))
}

fn mac_from_index(idx: &[u32]) -> Option<MacAddress> {
    let bytes: Option<Vec<u8>> = idx.iter().map(|b| u8::try_from(*b).ok()).collect();
    MacAddress::from_bytes(&bytes?)
}

#[cfg(test)]
#[allow(clippy::unwrap_used)]
mod tests {
    use std::sync::Mutex;

    use async_trait::async_trait;
    use pretty_assertions::assert_eq;
    use switchyard_api::Error as ApiError;

    use super::*;

    /// In-memory agent: a sorted OID table plus a journal of sets.
    #[derive(Default)]
    struct MemoryAgent {
        table: Mutex<BTreeMap<Oid, SnmpValue>>,
        sets: Mutex<Vec<(Oid, SnmpValue)>>,
    }

    impl MemoryAgent {
        fn with(mut self, column: &[u32], index: &[u32], value: SnmpValue) -> Self {
            self.table
                .get_mut()
                .unwrap()
                .insert(Oid::new(column).extend(index), value);
            self
        }
    }

    #[async_trait]
    impl SnmpTransport for MemoryAgent {
        async fn get(&self, oid: &Oid) -> Result<SnmpValue, ApiError> {
            self.table
                .lock()
                .unwrap()
                .get(oid)
                .cloned()
                .ok_or_else(|| ApiError::NoSuchObject {
                    oid: oid.to_string(),
                })
        }

        async fn walk(&self, base: &Oid) -> Result<Vec<(Oid, SnmpValue)>, ApiError> {
            Ok(self
                .table
                .lock()
                .unwrap()
                .iter()
                .filter(|(oid, _)| oid.starts_with(base))
                .map(|(o, v)| (o.clone(), v.clone()))
                .collect())
        }

        async fn set(&self, oid: &Oid, value: &SnmpValue) -> Result<(), ApiError> {
            self.table.lock().unwrap().insert(oid.clone(), value.clone());
            self.sets.lock().unwrap().push((oid.clone(), value.clone()));
            Ok(())
        }
    }

    fn two_port_agent() -> MemoryAgent {
        MemoryAgent::default()
            .with(mib::SYSTEM, &[1, 0], SnmpValue::string("Test switch"))
            .with(mib::SYSTEM, &[5, 0], SnmpValue::string("sw-lab-1"))
            .with(mib::IF_DESCR, &[1], SnmpValue::string("port 1"))
            .with(mib::IF_DESCR, &[2], SnmpValue::string("port 2"))
            .with(mib::IF_DESCR, &[50], SnmpValue::string("trunk 1"))
            .with(mib::IF_DESCR, &[99], SnmpValue::string("loopback"))
            .with(mib::IF_TYPE, &[1], SnmpValue::Integer(6))
            .with(mib::IF_TYPE, &[2], SnmpValue::Integer(6))
            .with(mib::IF_TYPE, &[50], SnmpValue::Integer(161))
            .with(mib::IF_TYPE, &[99], SnmpValue::Integer(24))
            .with(mib::IF_ADMIN_STATUS, &[1], SnmpValue::Integer(1))
            .with(mib::IF_ADMIN_STATUS, &[2], SnmpValue::Integer(2))
            .with(mib::IF_NAME, &[1], SnmpValue::string("1/1"))
            .with(mib::IF_NAME, &[2], SnmpValue::string("1/2"))
            .with(mib::IF_NAME, &[50], SnmpValue::string("Trk1"))
            .with(mib::IF_HIGH_SPEED, &[1], SnmpValue::Gauge32(1000))
            .with(mib::IF_ALIAS, &[1], SnmpValue::string("printer"))
            .with(mib::DOT1D_BASE_PORT_IF_INDEX, &[1], SnmpValue::Integer(1))
            .with(mib::DOT1D_BASE_PORT_IF_INDEX, &[2], SnmpValue::Integer(2))
            .with(mib::DOT1Q_PVID, &[1], SnmpValue::Gauge32(10))
            .with(mib::DOT1Q_PVID, &[2], SnmpValue::Gauge32(20))
            .with(mib::DOT1Q_VLAN_STATIC_NAME, &[10], SnmpValue::string("users"))
            .with(mib::DOT1Q_VLAN_STATIC_NAME, &[20], SnmpValue::string("voice"))
            .with(mib::DOT1Q_VLAN_STATIC_EGRESS_PORTS, &[10], SnmpValue::OctetString(vec![0xc0]))
            .with(mib::DOT1Q_VLAN_STATIC_UNTAGGED_PORTS, &[10], SnmpValue::OctetString(vec![0x80]))
            .with(mib::DOT1Q_VLAN_STATIC_EGRESS_PORTS, &[20], SnmpValue::OctetString(vec![0x40]))
            .with(mib::DOT1Q_VLAN_STATIC_UNTAGGED_PORTS, &[20], SnmpValue::OctetString(vec![0x40]))
            .with(mib::DOT3AD_AGG_PORT_ATTACHED_AGG_ID, &[2], SnmpValue::Integer(50))
            .with(mib::PETH_PSE_PORT_ADMIN_ENABLE, &[1, 1], SnmpValue::Integer(1))
            .with(mib::PETH_PSE_PORT_DETECTION_STATUS, &[1, 1], SnmpValue::Integer(3))
    }

    #[tokio::test]
    async fn basic_read_builds_interfaces() {
        let mut driver = SnmpDriver::new(Arc::new(two_port_agent()));
        let mut state = SwitchState::default();
        driver.read_basic(&mut state).await.unwrap();

        assert_eq!(state.facts.name, "sw-lab-1");
        let keys: Vec<&str> = state.interfaces.keys().map(String::as_str).collect();
        assert_eq!(keys, vec!["1", "2", "50"]);

        let p1 = &state.interfaces["1"];
        assert_eq!(p1.name, "1/1");
        assert_eq!(p1.admin_status, PortStatus::Up);
        assert_eq!(p1.description, "printer");
        assert_eq!(p1.speed_mbps, 1000);
        assert_eq!(p1.untagged_vlan, 10);
        assert_eq!(p1.poe.as_ref().unwrap().admin_status, PoeStatus::Enabled);
        assert_eq!(
            p1.poe.as_ref().unwrap().detect_status.as_deref(),
            Some("delivering-power")
        );

        let p2 = &state.interfaces["2"];
        assert_eq!(p2.admin_status, PortStatus::Down);
        assert_eq!(p2.untagged_vlan, 20);
        assert!(p2.tagged_vlans.contains(&10));
        assert_eq!(p2.lacp_master_index, 50);
        assert_eq!(p2.lacp_master_name.as_deref(), Some("Trk1"));
        assert!(p2.poe.is_none());

        assert_eq!(state.vlans[&20].name, "voice");
    }

    #[tokio::test]
    async fn empty_agent_fails_basic_read() {
        let mut driver = SnmpDriver::new(Arc::new(MemoryAgent::default()));
        let mut state = SwitchState::default();
        let err = driver.read_basic(&mut state).await.unwrap_err();
        assert!(matches!(err, CoreError::Transport { .. }));
    }

    #[tokio::test]
    async fn vlan_change_moves_port_between_portlists() {
        let agent = Arc::new(two_port_agent().with(
            mib::DOT1Q_VLAN_STATIC_EGRESS_PORTS,
            &[30],
            SnmpValue::OctetString(vec![0x00]),
        ).with(
            mib::DOT1Q_VLAN_STATIC_UNTAGGED_PORTS,
            &[30],
            SnmpValue::OctetString(vec![0x00]),
        ));
        let mut driver = SnmpDriver::new(agent.clone());
        let mut state = SwitchState::default();
        driver.read_basic(&mut state).await.unwrap();

        let p1 = state.interfaces["1"].clone();
        driver.set_untagged_vlan(&p1, 30).await.unwrap();

        let table = agent.table.lock().unwrap();
        let cell = |col: &[u32], idx: u32| table[&Oid::new(col).child(idx)].clone();
        assert_eq!(cell(mib::DOT1Q_PVID, 1), SnmpValue::Gauge32(30));
        assert_eq!(
            cell(mib::DOT1Q_VLAN_STATIC_UNTAGGED_PORTS, 30),
            SnmpValue::OctetString(vec![0x80])
        );
        assert_eq!(
            cell(mib::DOT1Q_VLAN_STATIC_UNTAGGED_PORTS, 10),
            SnmpValue::OctetString(vec![0x00])
        );
        assert_eq!(
            cell(mib::DOT1Q_VLAN_STATIC_EGRESS_PORTS, 10),
            SnmpValue::OctetString(vec![0x40])
        );
    }

    #[tokio::test]
    async fn admin_and_alias_sets_target_if_index() {
        let agent = Arc::new(two_port_agent());
        let mut driver = SnmpDriver::new(agent.clone());
        let iface = Interface::new("2", "1/2");

        driver.set_admin_status(&iface, PortStatus::Up).await.unwrap();
        driver.set_description(&iface, "desk 4").await.unwrap();

        let sets = agent.sets.lock().unwrap();
        assert_eq!(
            sets[0],
            (Oid::new(mib::IF_ADMIN_STATUS).child(2), SnmpValue::Integer(1))
        );
        assert_eq!(
            sets[1],
            (Oid::new(mib::IF_ALIAS).child(2), SnmpValue::string("desk 4"))
        );
    }

    #[tokio::test]
    async fn client_read_maps_fdb_arp_and_lldp() {
        let agent = two_port_agent()
            .with(
                mib::DOT1Q_TP_FDB_PORT,
                &[10, 0xb8, 0x27, 0xeb, 1, 2, 3],
                SnmpValue::Integer(1),
            )
            .with(
                mib::IP_NET_TO_MEDIA_PHYS_ADDRESS,
                &[100, 10, 0, 0, 7],
                SnmpValue::OctetString(vec![0xb8, 0x27, 0xeb, 1, 2, 3]),
            )
            .with(mib::LLDP_REM_ENTRY, &[9, 0, 1, 1], SnmpValue::string("core-sw"))
            .with(mib::LLDP_REM_ENTRY, &[12, 0, 1, 1], SnmpValue::OctetString(vec![0x20]));
        let mut driver = SnmpDriver::new(Arc::new(agent));
        let mut state = SwitchState::default();
        driver.read_basic(&mut state).await.unwrap();
        driver.read_clients(&mut state).await.unwrap();

        let p1 = &state.interfaces["1"];
        let entry = p1.eth.values().next().unwrap();
        assert_eq!(entry.mac.as_str(), "b8:27:eb:01:02:03");
        assert_eq!(entry.vlan, Some(10));
        assert_eq!(entry.ipv4, Some(Ipv4Addr::new(10, 0, 0, 7)));
        assert_eq!(entry.vendor.as_deref(), Some("Raspberry Pi"));

        assert_eq!(p1.lldp.len(), 1);
        assert_eq!(p1.lldp[0].system_name, "core-sw");
        assert_eq!(p1.lldp[0].capabilities, vec![LldpCapability::Bridge]);
    }
}
