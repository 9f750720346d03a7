// REST API response types
//
// Only the attributes switchyard consumes are modelled. Resource
// references arrive either as URI strings or as `{key: uri}` maps
// depending on the requested depth; `ref_keys` normalizes both.

use std::collections::HashMap;

use serde::Deserialize;
use serde_json::Value;

/// `GET /system`
#[derive(Debug, Clone, Default, Deserialize)]
pub struct RestSystem {
    #[serde(default)]
    pub hostname: Option<String>,
    #[serde(default)]
    pub platform_name: Option<String>,
    #[serde(default)]
    pub software_version: Option<String>,
    #[serde(default)]
    pub system_mac: Option<String>,
    /// Seconds since the epoch.
    #[serde(default)]
    pub boot_time: Option<i64>,
    #[serde(default)]
    pub other_config: HashMap<String, String>,
}

/// One entry of `GET /system/interfaces?depth=2`.
#[derive(Debug, Clone, Deserialize)]
pub struct RestInterface {
    pub name: String,
    #[serde(default, rename = "type")]
    pub kind: Option<String>,
    #[serde(default)]
    pub ifindex: Option<u32>,
    #[serde(default)]
    pub admin_state: Option<String>,
    #[serde(default)]
    pub link_state: Option<String>,
    #[serde(default)]
    pub description: Option<String>,
    /// Bits per second.
    #[serde(default)]
    pub link_speed: Option<u64>,
    #[serde(default)]
    pub vlan_mode: Option<String>,
    #[serde(default)]
    pub vlan_tag: Option<Value>,
    #[serde(default)]
    pub vlan_trunks: Option<Value>,
    /// Member ports, present on LAG interfaces.
    #[serde(default)]
    pub interfaces: Option<Value>,
}

impl RestInterface {
    pub fn is_admin_up(&self) -> bool {
        self.admin_state.as_deref() == Some("up")
    }

    pub fn is_link_up(&self) -> bool {
        self.link_state.as_deref() == Some("up")
    }

    pub fn is_lag(&self) -> bool {
        self.kind.as_deref() == Some("lag")
    }

    pub fn untagged_vlan(&self) -> Option<u16> {
        self.vlan_tag
            .as_ref()
            .and_then(|v| ref_keys(v).into_iter().next())
            .and_then(|id| id.parse().ok())
    }

    pub fn tagged_vlans(&self) -> Vec<u16> {
        self.vlan_trunks
            .as_ref()
            .map(|v| ref_keys(v).iter().filter_map(|id| id.parse().ok()).collect())
            .unwrap_or_default()
    }

    pub fn member_names(&self) -> Vec<String> {
        self.interfaces.as_ref().map(ref_keys).unwrap_or_default()
    }
}

/// `GET /system/vlans?depth=2`
#[derive(Debug, Clone, Deserialize)]
pub struct RestVlan {
    pub id: u16,
    #[serde(default)]
    pub name: String,
}

#[derive(Debug, Clone, Default, Deserialize)]
pub struct RestPoeConfig {
    #[serde(default)]
    pub admin_disable: bool,
}

#[derive(Debug, Clone, Default, Deserialize)]
pub struct RestPoeMeasurements {
    /// Watts.
    #[serde(default)]
    pub power_drawn: Option<f64>,
}

#[derive(Debug, Clone, Default, Deserialize)]
pub struct RestPoeStatus {
    #[serde(default)]
    pub detection_status: Option<String>,
}

/// `GET /system/interfaces/*/poe_interface?depth=2`
#[derive(Debug, Clone, Default, Deserialize)]
pub struct RestPoeInterface {
    #[serde(default)]
    pub config: RestPoeConfig,
    #[serde(default)]
    pub status: RestPoeStatus,
    #[serde(default)]
    pub measurements: RestPoeMeasurements,
}

#[derive(Debug, Clone, Default, Deserialize)]
pub struct RestLldpInfo {
    #[serde(default)]
    pub chassis_name: Option<String>,
    #[serde(default)]
    pub chassis_description: Option<String>,
    #[serde(default)]
    pub port_description: Option<String>,
    /// Comma separated, e.g. `"Bridge, Router"`.
    #[serde(default)]
    pub chassis_capability_enabled: Option<String>,
    #[serde(default)]
    pub chassis_id_subtype: Option<String>,
}

/// `GET /system/interfaces/{name}/lldp_neighbors?depth=2`
#[derive(Debug, Clone, Deserialize)]
pub struct RestLldpNeighbor {
    pub chassis_id: String,
    pub port_id: String,
    #[serde(default)]
    pub neighbor_info: RestLldpInfo,
}

/// `GET /system/vrfs/default/neighbors?depth=2`
#[derive(Debug, Clone, Deserialize)]
pub struct RestArpEntry {
    pub ip_address: String,
    pub mac: String,
    #[serde(default)]
    pub port: Option<Value>,
}

impl RestArpEntry {
    pub fn port_name(&self) -> Option<String> {
        self.port.as_ref().and_then(|v| ref_keys(v).into_iter().next())
    }
}

/// `GET /system/vlans/{id}/macs?depth=2`
#[derive(Debug, Clone, Deserialize)]
pub struct RestMacEntry {
    pub mac_addr: String,
    #[serde(default)]
    pub port: Option<Value>,
}

impl RestMacEntry {
    pub fn port_name(&self) -> Option<String> {
        self.port.as_ref().and_then(|v| ref_keys(v).into_iter().next())
    }
}

/// Keys of a `{key: uri}` map, or last path segments of URI strings.
pub fn ref_keys(value: &Value) -> Vec<String> {
    fn last_segment(uri: &str) -> String {
        let segment = uri.rsplit('/').next().unwrap_or(uri);
        url::form_urlencoded::parse(format!("k={segment}").as_bytes())
            .next()
            .map_or_else(|| segment.to_owned(), |(_, v)| v.into_owned())
    }

    match value {
        Value::String(uri) => vec![last_segment(uri)],
        Value::Array(items) => items
            .iter()
            .filter_map(Value::as_str)
            .map(last_segment)
            .collect(),
        Value::Object(map) => map.keys().cloned().collect(),
        _ => Vec::new(),
    }
}

#[cfg(test)]
#[allow(clippy::unwrap_used)]
mod tests {
    use serde_json::json;

    use super::*;

    #[test]
    fn vlan_refs_from_map_and_uri() {
        let iface: RestInterface = serde_json::from_value(json!({
            "name": "1/1/3",
            "vlan_tag": {"20": "/rest/v10.08/system/vlans/20"},
            "vlan_trunks": ["/rest/v10.08/system/vlans/30", "/rest/v10.08/system/vlans/40"],
        }))
        .unwrap();
        assert_eq!(iface.untagged_vlan(), Some(20));
        assert_eq!(iface.tagged_vlans(), vec![30, 40]);
    }

    #[test]
    fn escaped_port_refs_are_decoded() {
        let entry: RestMacEntry = serde_json::from_value(json!({
            "mac_addr": "00:11:22:33:44:55",
            "port": "/rest/v10.08/system/interfaces/1%2F1%2F7",
        }))
        .unwrap();
        assert_eq!(entry.port_name().as_deref(), Some("1/1/7"));
    }
}
