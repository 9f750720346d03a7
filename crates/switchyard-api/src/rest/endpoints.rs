// REST endpoint methods
//
// Reads return maps keyed the way the API keys them (interface name,
// VLAN id); writes are partial PATCH updates.

use std::collections::HashMap;

use serde::Deserialize;
use serde_json::json;
use tracing::debug;

use super::client::{RestClient, encode_name};
use super::models::{
    RestArpEntry, RestInterface, RestLldpNeighbor, RestMacEntry, RestPoeInterface, RestSystem,
    RestVlan,
};
use crate::error::Error;

#[derive(Deserialize)]
struct CliResponse {
    #[serde(default)]
    result: String,
}

impl RestClient {
    // ── Reads ────────────────────────────────────────────────────────

    pub async fn system(&self) -> Result<RestSystem, Error> {
        let url = self.url(
            "system?attributes=hostname,platform_name,software_version,system_mac,boot_time,other_config",
        )?;
        self.get(url).await
    }

    pub async fn interfaces(&self) -> Result<HashMap<String, RestInterface>, Error> {
        let url = self.url("system/interfaces?depth=2")?;
        self.get(url).await
    }

    pub async fn vlans(&self) -> Result<HashMap<String, RestVlan>, Error> {
        let url = self.url("system/vlans?depth=2")?;
        self.get(url).await
    }

    pub async fn poe_interfaces(&self) -> Result<HashMap<String, RestPoeInterface>, Error> {
        let url = self.url("system/interfaces/*/poe_interface?depth=2")?;
        self.get(url).await
    }

    pub async fn lldp_neighbors(
        &self,
        interface: &str,
    ) -> Result<HashMap<String, RestLldpNeighbor>, Error> {
        let url = self.url(&format!(
            "system/interfaces/{}/lldp_neighbors?depth=2",
            encode_name(interface)
        ))?;
        self.get(url).await
    }

    pub async fn arp_neighbors(&self) -> Result<HashMap<String, RestArpEntry>, Error> {
        let url = self.url("system/vrfs/default/neighbors?depth=2")?;
        self.get(url).await
    }

    pub async fn mac_table(&self, vlan_id: u16) -> Result<HashMap<String, RestMacEntry>, Error> {
        let url = self.url(&format!("system/vlans/{vlan_id}/macs?depth=2"))?;
        self.get(url).await
    }

    // ── Interface writes ─────────────────────────────────────────────

    pub async fn set_admin_state(&self, interface: &str, up: bool) -> Result<(), Error> {
        let state = if up { "up" } else { "down" };
        debug!(interface, state, "setting admin state");
        let url = self.url(&format!("system/interfaces/{}", encode_name(interface)))?;
        self.patch(url, &json!({ "user_config": { "admin": state } }))
            .await
    }

    pub async fn set_description(&self, interface: &str, description: &str) -> Result<(), Error> {
        let url = self.url(&format!("system/interfaces/{}", encode_name(interface)))?;
        self.patch(url, &json!({ "description": description })).await
    }

    pub async fn set_access_vlan(&self, interface: &str, vlan_id: u16) -> Result<(), Error> {
        let url = self.url(&format!("system/interfaces/{}", encode_name(interface)))?;
        let vlan_ref = self.resource_ref(&format!("system/vlans/{vlan_id}"));
        self.patch(url, &json!({ "vlan_mode": "access", "vlan_tag": vlan_ref }))
            .await
    }

    pub async fn set_poe(&self, interface: &str, enabled: bool) -> Result<(), Error> {
        let url = self.url(&format!(
            "system/interfaces/{}/poe_interface",
            encode_name(interface)
        ))?;
        self.patch(url, &json!({ "config": { "admin_disable": !enabled } }))
            .await
    }

    // ── VLAN writes ──────────────────────────────────────────────────

    pub async fn create_vlan(&self, vlan_id: u16, name: &str) -> Result<(), Error> {
        let url = self.url("system/vlans")?;
        self.post(url, &json!({ "id": vlan_id, "name": name, "type": "static" }))
            .await
    }

    pub async fn rename_vlan(&self, vlan_id: u16, name: &str) -> Result<(), Error> {
        let url = self.url(&format!("system/vlans/{vlan_id}"))?;
        self.patch(url, &json!({ "name": name })).await
    }

    pub async fn delete_vlan(&self, vlan_id: u16) -> Result<(), Error> {
        let url = self.url(&format!("system/vlans/{vlan_id}"))?;
        self.delete(url).await
    }

    // ── Configuration ────────────────────────────────────────────────

    /// Copy running-config to startup-config.
    pub async fn write_memory(&self) -> Result<(), Error> {
        let from = self.resource_ref("fullconfigs/running-config");
        let mut url = self.url("fullconfigs/startup-config")?;
        url.query_pairs_mut().append_pair("from", &from);
        self.put_empty(url).await
    }

    /// Run a CLI command through the API and return its text output.
    pub async fn cli(&self, command: &str) -> Result<String, Error> {
        let url = self.url("cli")?;
        let resp: CliResponse = self.post_json(url, &json!({ "cmd": command })).await?;
        Ok(resp.result)
    }
}
