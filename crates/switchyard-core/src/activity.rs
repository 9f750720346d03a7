// ── Activity log ──
//
// The audit trail. Every user-visible outcome becomes one `LogEntry`
// appended to an `ActivityLog`. Storage is a collaborator; the in-memory
// log here backs tests and one-shot use.

use std::net::IpAddr;
use std::sync::{Arc, PoisonError, RwLock};

use serde::{Deserialize, Serialize};
use tracing::{trace, warn};

use crate::error::CoreError;
use crate::model::{LogAction, LogEntry, LogType};

/// Append-only record storage.
pub trait ActivityLog: Send + Sync {
    fn append(&self, entry: LogEntry) -> Result<(), CoreError>;

    /// Matching entries, newest first.
    fn query(&self, filter: &LogFilter) -> Result<Vec<LogEntry>, CoreError>;
}

/// Selects log entries. Empty fields match everything.
#[derive(Debug, Clone, Default, PartialEq, Eq, Serialize, Deserialize)]
pub struct LogFilter {
    pub user: Option<String>,
    pub group_id: Option<u32>,
    pub device_id: Option<u32>,
    pub action: Option<LogAction>,
    /// Only entries at least this notable.
    pub min_type: Option<LogType>,
    pub limit: Option<usize>,
}

impl LogFilter {
    pub fn for_device(device_id: u32) -> Self {
        Self {
            device_id: Some(device_id),
            ..Self::default()
        }
    }

    #[must_use]
    pub fn limit(mut self, limit: usize) -> Self {
        self.limit = Some(limit);
        self
    }

    pub fn matches(&self, entry: &LogEntry) -> bool {
        self.user.as_ref().is_none_or(|u| *u == entry.user)
            && self.group_id.is_none_or(|g| entry.group_id == Some(g))
            && self.device_id.is_none_or(|d| entry.device_id == Some(d))
            && self.action.is_none_or(|a| entry.action == a)
            && self.min_type.is_none_or(|t| entry.log_type >= t)
    }
}

/// Process-local log.
#[derive(Debug, Default)]
pub struct MemoryActivityLog {
    entries: RwLock<Vec<LogEntry>>,
}

impl MemoryActivityLog {
    pub fn new() -> Self {
        Self::default()
    }

    /// Every entry, oldest first.
    pub fn entries(&self) -> Vec<LogEntry> {
        self.entries
            .read()
            .unwrap_or_else(PoisonError::into_inner)
            .clone()
    }
}

impl ActivityLog for MemoryActivityLog {
    fn append(&self, entry: LogEntry) -> Result<(), CoreError> {
        self.entries
            .write()
            .unwrap_or_else(PoisonError::into_inner)
            .push(entry);
        Ok(())
    }

    fn query(&self, filter: &LogFilter) -> Result<Vec<LogEntry>, CoreError> {
        let entries = self.entries.read().unwrap_or_else(PoisonError::into_inner);
        Ok(entries
            .iter()
            .rev()
            .filter(|e| filter.matches(e))
            .take(filter.limit.unwrap_or(usize::MAX))
            .cloned()
            .collect())
    }
}

/// Builds entries for one request: user, address, group and device are
/// filled in once.
#[derive(Clone)]
pub struct ActivityRecorder {
    log: Arc<dyn ActivityLog>,
    user: String,
    ip_address: Option<IpAddr>,
    group_id: Option<u32>,
    device_id: Option<u32>,
}

impl ActivityRecorder {
    pub fn new(log: Arc<dyn ActivityLog>, user: impl Into<String>, ip_address: Option<IpAddr>) -> Self {
        Self {
            log,
            user: user.into(),
            ip_address,
            group_id: None,
            device_id: None,
        }
    }

    #[must_use]
    pub fn for_device(mut self, group_id: u32, device_id: u32) -> Self {
        self.group_id = Some(group_id);
        self.device_id = Some(device_id);
        self
    }

    pub fn entry(&self, action: LogAction, log_type: LogType, description: impl Into<String>) -> LogEntry {
        let mut entry = LogEntry::new(self.user.clone(), action, log_type, description);
        entry.ip_address = self.ip_address;
        entry.group_id = self.group_id;
        entry.device_id = self.device_id;
        entry
    }

    pub fn record(&self, action: LogAction, log_type: LogType, description: impl Into<String>) {
        self.append(self.entry(action, log_type, description));
    }

    /// Record an outcome for a single interface.
    pub fn record_interface(
        &self,
        action: LogAction,
        log_type: LogType,
        if_name: &str,
        description: impl Into<String>,
    ) {
        let mut entry = self.entry(action, log_type, description);
        entry.if_name = Some(if_name.to_owned());
        self.append(entry);
    }

    /// Record a failed operation using its short description.
    pub fn record_error(&self, action: LogAction, err: &CoreError) {
        let log_type = if err.is_warning() {
            LogType::Warning
        } else {
            LogType::Error
        };
        self.record(action, log_type, err.description());
    }

    fn append(&self, entry: LogEntry) {
        trace!(action = %entry.action, log_type = %entry.log_type, "activity");
        // The audit trail must not turn a completed device change into a failure.
        if let Err(e) = self.log.append(entry) {
            warn!(error = %e, "failed to append activity log entry");
        }
    }
}

#[cfg(test)]
#[allow(clippy::unwrap_used)]
mod tests {
    use super::*;

    #[test]
    fn recorder_fills_context_and_query_filters() {
        let log = Arc::new(MemoryActivityLog::new());
        let alice = ActivityRecorder::new(log.clone(), "alice", None).for_device(2, 9);
        let bob = ActivityRecorder::new(log.clone(), "bob", None);

        alice.record(LogAction::ViewSwitch, LogType::View, "viewed");
        alice.record_interface(LogAction::InterfaceDown, LogType::Change, "Gi1/0/1", "down");
        bob.record(LogAction::ViewSwitchGroups, LogType::View, "groups");

        let device = log.query(&LogFilter::for_device(9)).unwrap();
        assert_eq!(device.len(), 2);
        assert_eq!(device[0].description, "down");
        assert_eq!(device[0].if_name.as_deref(), Some("Gi1/0/1"));

        let changes = log
            .query(&LogFilter {
                min_type: Some(LogType::Change),
                ..LogFilter::default()
            })
            .unwrap();
        assert_eq!(changes.len(), 1);

        let latest = log.query(&LogFilter::default().limit(1)).unwrap();
        assert_eq!(latest[0].user, "bob");
    }
}
