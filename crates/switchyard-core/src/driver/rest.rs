// ── Vendor REST driver ──
//
// AOS-CX style REST API. Interfaces are keyed by their name ("1/1/1"),
// which is also what the API uses in resource paths. Configuration changes
// apply to the running config; `write_memory` persists them.

use std::cmp::Ordering;
use std::net::Ipv4Addr;

use chrono::{DateTime, Utc};
use secrecy::SecretString;
use switchyard_api::RestClient;
use switchyard_api::rest::RestInterface;
use tracing::{debug, warn};

use super::{Capabilities, DeviceDriver};
use crate::error::CoreError;
use crate::model::{
    ConnectorKind, EthernetEntry, InterfaceKind, Interface, LldpCapability, LldpChassisType,
    LldpNeighbor, MacAddress, PoeEntry, PoeStatus, PortStatus, Vlan,
};
use crate::session::SwitchState;

pub struct RestDriver {
    client: RestClient,
    username: String,
    password: SecretString,
    logged_in: bool,
}

impl RestDriver {
    pub fn new(client: RestClient, username: impl Into<String>, password: SecretString) -> Self {
        Self {
            client,
            username: username.into(),
            password,
            logged_in: false,
        }
    }

    async fn ensure_login(&mut self) -> Result<(), CoreError> {
        if !self.logged_in {
            self.client.login(&self.username, &self.password).await?;
            self.logged_in = true;
        }
        Ok(())
    }

    fn interface_from(raw: &RestInterface) -> Interface {
        let mut iface = Interface::new(raw.name.clone(), raw.name.clone());
        iface.kind = if raw.is_lag() {
            InterfaceKind::Lag
        } else {
            InterfaceKind::Ethernet
        };
        iface.admin_status = PortStatus::from_bool(raw.is_admin_up());
        iface.oper_status = PortStatus::from_bool(raw.is_link_up());
        iface.description = raw.description.clone().unwrap_or_default();
        iface.speed_mbps = raw.link_speed.unwrap_or(0) / 1_000_000;
        iface.port_index = raw.ifindex;
        iface.untagged_vlan = raw.untagged_vlan().unwrap_or(1);
        iface.tagged_vlans = raw.tagged_vlans().into_iter().collect();
        iface
    }
}

impl DeviceDriver for RestDriver {
    fn connector(&self) -> ConnectorKind {
        ConnectorKind::VendorApi
    }

    fn capabilities(&self) -> Capabilities {
        Capabilities {
            can_change_interfaces: true,
            can_edit_vlans: true,
            can_save_config: true,
            auto_saves_config: false,
            can_run_commands: true,
            has_hardware_details: false,
            has_client_data: true,
        }
    }

    async fn read_basic(&mut self, state: &mut SwitchState) -> Result<(), CoreError> {
        self.ensure_login().await?;

        let system = self.client.system().await?;
        state.facts.name = system.hostname.unwrap_or_default();
        state.facts.model = system.platform_name.unwrap_or_default();
        state.facts.firmware = system.software_version.unwrap_or_default();
        state.facts.description = format!("{} {}", state.facts.model, state.facts.firmware)
            .trim()
            .to_owned();
        state.facts.booted_at = system
            .boot_time
            .and_then(|secs| DateTime::<Utc>::from_timestamp(secs, 0));

        for (id, vlan) in self.client.vlans().await? {
            let vlan_id = id.parse().unwrap_or(vlan.id);
            state.vlans.insert(vlan_id, Vlan::new(vlan_id, vlan.name));
        }

        let mut raw: Vec<RestInterface> = self
            .client
            .interfaces()
            .await?
            .into_values()
            .filter(|i| matches!(i.kind.as_deref(), Some("system" | "lag")))
            .collect();
        raw.sort_by(|a, b| natural_cmp(&a.name, &b.name));

        for r in &raw {
            let iface = Self::interface_from(r);
            state.interfaces.insert(iface.key.clone(), iface);
        }

        // LAG members point back at their aggregate.
        for lag in raw.iter().filter(|r| r.is_lag()) {
            let lag_index = lag.ifindex.unwrap_or(0);
            for member in lag.member_names() {
                if let Some(iface) = state.interfaces.get_mut(&member) {
                    iface.lacp_master_index = lag_index.max(1);
                    iface.lacp_master_name = Some(lag.name.clone());
                }
            }
        }

        match self.client.poe_interfaces().await {
            Ok(poe) => {
                for (name, entry) in poe {
                    if let Some(iface) = state.interfaces.get_mut(&name) {
                        iface.poe = Some(PoeEntry {
                            index: name.clone(),
                            admin_status: if entry.config.admin_disable {
                                PoeStatus::Disabled
                            } else {
                                PoeStatus::Enabled
                            },
                            detect_status: entry.status.detection_status,
                            #[allow(clippy::cast_possible_truncation, clippy::cast_sign_loss)]
                            power_consumed_mw: entry
                                .measurements
                                .power_drawn
                                .map(|watts| (watts * 1000.0) as u32),
                        });
                    }
                }
            }
            // Switches without PoE hardware answer 404 here.
            Err(e) if e.is_not_found() => debug!("device has no PoE interfaces"),
            Err(e) => return Err(e.into()),
        }

        Ok(())
    }

    async fn read_hardware(&mut self, _state: &mut SwitchState) -> Result<(), CoreError> {
        Err(CoreError::unsupported(
            "hardware details",
            ConnectorKind::VendorApi,
        ))
    }

    async fn read_clients(&mut self, state: &mut SwitchState) -> Result<(), CoreError> {
        self.ensure_login().await?;
        state.clear_clients();

        let vlan_ids: Vec<u16> = state.vlans.keys().copied().collect();
        for vlan in vlan_ids {
            for entry in self.client.mac_table(vlan).await?.into_values() {
                let Some(port) = entry.port_name() else {
                    continue;
                };
                if let Some(iface) = state.interfaces.get_mut(&port) {
                    let mut client = EthernetEntry::new(MacAddress::new(&entry.mac_addr));
                    client.vlan = Some(vlan);
                    iface.add_client(client);
                }
            }
        }

        for entry in self.client.arp_neighbors().await?.into_values() {
            let (Some(port), Ok(ip)) = (entry.port_name(), entry.ip_address.parse::<Ipv4Addr>()) else {
                continue;
            };
            if let Some(iface) = state.interfaces.get_mut(&port) {
                let mut client = EthernetEntry::new(MacAddress::new(&entry.mac));
                client.ipv4 = Some(ip);
                iface.add_client(client);
            }
        }

        let up_ports: Vec<String> = state
            .interfaces
            .values()
            .filter(|i| i.kind == InterfaceKind::Ethernet && i.oper_status.is_up())
            .map(|i| i.key.clone())
            .collect();
        for port in up_ports {
            let neighbors = match self.client.lldp_neighbors(&port).await {
                Ok(n) => n,
                Err(e) => {
                    warn!(port = %port, error = %e, "LLDP read failed");
                    continue;
                }
            };
            let Some(iface) = state.interfaces.get_mut(&port) else {
                continue;
            };
            for n in neighbors.into_values() {
                let info = n.neighbor_info;
                iface.lldp.push(LldpNeighbor {
                    chassis_type: match info.chassis_id_subtype.as_deref() {
                        Some("mac_address") => LldpChassisType::MacAddress,
                        Some("interface_name") => LldpChassisType::InterfaceName,
                        Some("network_address") => LldpChassisType::NetworkAddress,
                        _ => LldpChassisType::Unknown,
                    },
                    chassis_id: n.chassis_id,
                    port_id: n.port_id,
                    port_descr: info.port_description.unwrap_or_default(),
                    system_name: info.chassis_name.unwrap_or_default(),
                    system_description: info.chassis_description.unwrap_or_default(),
                    capabilities: info
                        .chassis_capability_enabled
                        .as_deref()
                        .unwrap_or_default()
                        .split(',')
                        .filter_map(LldpCapability::from_name)
                        .collect(),
                });
            }
        }
        Ok(())
    }

    async fn set_admin_status(
        &mut self,
        iface: &Interface,
        status: PortStatus,
    ) -> Result<(), CoreError> {
        self.ensure_login().await?;
        Ok(self.client.set_admin_state(&iface.key, status.is_up()).await?)
    }

    async fn set_poe_status(
        &mut self,
        iface: &Interface,
        status: PoeStatus,
    ) -> Result<(), CoreError> {
        self.ensure_login().await?;
        Ok(self.client.set_poe(&iface.key, status.is_enabled()).await?)
    }

    async fn set_untagged_vlan(&mut self, iface: &Interface, vlan: u16) -> Result<(), CoreError> {
        self.ensure_login().await?;
        Ok(self.client.set_access_vlan(&iface.key, vlan).await?)
    }

    async fn set_description(&mut self, iface: &Interface, text: &str) -> Result<(), CoreError> {
        self.ensure_login().await?;
        Ok(self.client.set_description(&iface.key, text).await?)
    }

    async fn vlan_create(&mut self, id: u16, name: &str) -> Result<(), CoreError> {
        self.ensure_login().await?;
        Ok(self.client.create_vlan(id, name).await?)
    }

    async fn vlan_edit(&mut self, id: u16, name: &str) -> Result<(), CoreError> {
        self.ensure_login().await?;
        Ok(self.client.rename_vlan(id, name).await?)
    }

    async fn vlan_delete(&mut self, id: u16) -> Result<(), CoreError> {
        self.ensure_login().await?;
        Ok(self.client.delete_vlan(id).await?)
    }

    async fn save_running_config(&mut self) -> Result<(), CoreError> {
        self.ensure_login().await?;
        Ok(self.client.write_memory().await?)
    }

    async fn run_command(&mut self, command: &str) -> Result<String, CoreError> {
        self.ensure_login().await?;
        Ok(self.client.cli(command).await?)
    }

    async fn close(&mut self) {
        if self.logged_in {
            if let Err(e) = self.client.logout().await {
                debug!(error = %e, "logout failed");
            }
            self.logged_in = false;
        }
    }
}

/// Order interface names so that "1/1/2" sorts before "1/1/10".
fn natural_cmp(a: &str, b: &str) -> Ordering {
    fn chunks(s: &str) -> Vec<Result<u64, &str>> {
        let mut out = Vec::new();
        let mut rest = s;
        while !rest.is_empty() {
            let digits = rest.chars().take_while(char::is_ascii_digit).count();
            if digits > 0 {
                out.push(rest[..digits].parse().map_err(|_| &rest[..digits]));
                rest = &rest[digits..];
            } else {
                let text = rest
                    .char_indices()
                    .find(|(_, c)| c.is_ascii_digit())
                    .map_or(rest.len(), |(i, _)| i);
                out.push(Err(&rest[..text]));
                rest = &rest[text..];
            }
        }
        out
    }

    let (ca, cb) = (chunks(a), chunks(b));
    for (x, y) in ca.iter().zip(cb.iter()) {
        let ord = match (x, y) {
            (Ok(n), Ok(m)) => n.cmp(m),
            (Ok(_), Err(_)) => Ordering::Less,
            (Err(_), Ok(_)) => Ordering::Greater,
            (Err(s), Err(t)) => s.cmp(t),
        };
        if ord != Ordering::Equal {
            return ord;
        }
    }
    ca.len().cmp(&cb.len())
}

#[cfg(test)]
mod tests {
    use super::*;

    #[test]
    fn natural_order_of_port_names() {
        let mut names = vec!["1/1/10", "lag1", "1/1/2", "1/1/1", "1/2/1"];
        names.sort_by(|a, b| natural_cmp(a, b));
        assert_eq!(names, vec!["1/1/1", "1/1/2", "1/1/10", "1/2/1", "lag1"]);
    }
}
