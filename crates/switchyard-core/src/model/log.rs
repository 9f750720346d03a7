// ── Activity log records ──
//
// One append-only record per user-visible operation outcome. These are
// the audit trail; tracing output is diagnostics only.

use std::net::IpAddr;

use chrono::{DateTime, Utc};
use serde::{Deserialize, Serialize};
use strum::{Display, EnumString};
use uuid::Uuid;

/// What the user did.
#[derive(Debug, Clone, Copy, PartialEq, Eq, Hash, Serialize, Deserialize, Display, EnumString)]
#[serde(rename_all = "kebab-case")]
#[strum(serialize_all = "kebab-case")]
pub enum LogAction {
    ViewSwitchGroups,
    ViewSwitch,
    ViewSwitchSearch,
    ViewAllLogs,
    ViewAdminStats,
    ConnectionError,
    SaveSwitch,
    ReloadSwitch,
    ExecuteCommand,
    BulkEditStart,
    BulkEdit,
    InterfaceUp,
    InterfaceDown,
    InterfaceDownUp,
    PoeUp,
    PoeDown,
    PoeToggle,
    PvidChange,
    AliasChange,
    VlanCreate,
    VlanEdit,
    VlanDelete,
}

/// Severity / category, ordered from least to most notable.
#[derive(
    Debug, Clone, Copy, PartialEq, Eq, PartialOrd, Ord, Hash, Serialize, Deserialize, Display, EnumString,
)]
#[serde(rename_all = "lowercase")]
#[strum(serialize_all = "lowercase")]
pub enum LogType {
    View,
    Change,
    Command,
    Warning,
    Error,
}

#[derive(Debug, Clone, PartialEq, Eq, Serialize, Deserialize)]
pub struct LogEntry {
    pub id: Uuid,
    pub user: String,
    #[serde(default)]
    pub ip_address: Option<IpAddr>,
    pub timestamp: DateTime<Utc>,
    #[serde(default)]
    pub group_id: Option<u32>,
    #[serde(default)]
    pub device_id: Option<u32>,
    pub action: LogAction,
    pub log_type: LogType,
    pub description: String,
    #[serde(default)]
    pub if_name: Option<String>,
}

impl LogEntry {
    pub fn new(
        user: impl Into<String>,
        action: LogAction,
        log_type: LogType,
        description: impl Into<String>,
    ) -> Self {
        Self {
            id: Uuid::new_v4(),
            user: user.into(),
            ip_address: None,
            timestamp: Utc::now(),
            group_id: None,
            device_id: None,
            action,
            log_type,
            description: description.into(),
            if_name: None,
        }
    }
}

#[cfg(test)]
mod tests {
    use super::*;

    #[test]
    fn action_names_are_kebab_case() {
        assert_eq!(LogAction::ViewSwitchGroups.to_string(), "view-switch-groups");
        assert_eq!(LogAction::PvidChange.to_string(), "pvid-change");
    }

    #[test]
    fn views_sort_below_changes() {
        assert!(LogType::View < LogType::Change);
        assert!(LogType::Warning < LogType::Error);
    }
}
