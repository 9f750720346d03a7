// ── Typed request payloads for Command variants ──

use std::collections::BTreeMap;

use serde::{Deserialize, Serialize};

#[derive(Debug, Clone, PartialEq, Eq, Serialize, Deserialize)]
pub struct VlanRequest {
    pub id: u16,
    pub name: String,
}

/// Run a catalog command, optionally against one interface (by key).
#[derive(Debug, Clone, PartialEq, Eq, Serialize, Deserialize)]
pub struct RunCommandRequest {
    pub command_id: u32,
    #[serde(default, skip_serializing_if = "Option::is_none")]
    pub interface: Option<String>,
}

/// Expand a command template with user-supplied values and run it.
#[derive(Debug, Clone, PartialEq, Eq, Serialize, Deserialize)]
pub struct TemplateRequest {
    pub template_id: u32,
    #[serde(default)]
    pub values: BTreeMap<String, String>,
}
