// ── Session store ──
//
// The store is an opaque key/value collaborator: one JSON blob per
// (user, device) plus a per-user permission map. What goes in the blob is
// decided here, in `CachedSession`.

use chrono::{DateTime, Utc};
use dashmap::DashMap;
use serde::{Deserialize, Serialize};

use super::{SessionKey, SwitchState};
use crate::error::CoreError;
use crate::model::ConnectorKind;

/// Persistence for cached sessions and permission maps.
///
/// Callers serialize requests per user, so a key has at most one writer
/// at a time.
pub trait SessionStore: Send + Sync {
    fn load(&self, key: &SessionKey) -> Result<Option<String>, CoreError>;

    fn store(&self, key: &SessionKey, blob: String) -> Result<(), CoreError>;

    fn remove(&self, key: &SessionKey) -> Result<(), CoreError>;

    /// Drop every session blob and the permission map of `user`.
    fn remove_user(&self, user: &str) -> Result<(), CoreError>;

    fn load_permissions(&self, user: &str) -> Result<Option<String>, CoreError>;

    fn store_permissions(&self, user: &str, blob: String) -> Result<(), CoreError>;
}

/// What is written into a session blob.
#[derive(Debug, Clone, Serialize, Deserialize)]
pub struct CachedSession {
    pub device_id: u32,
    pub connector: ConnectorKind,
    pub saved_at: DateTime<Utc>,
    pub state: SwitchState,
}

impl CachedSession {
    pub fn new(device_id: u32, connector: ConnectorKind, state: SwitchState) -> Self {
        Self {
            device_id,
            connector,
            saved_at: Utc::now(),
            state,
        }
    }

    /// Whether this entry may still be used for `device_id` and `connector`.
    pub fn is_fresh(
        &self,
        device_id: u32,
        connector: ConnectorKind,
        max_age: chrono::Duration,
    ) -> bool {
        self.device_id == device_id
            && self.connector == connector
            && Utc::now().signed_duration_since(self.saved_at) <= max_age
    }

    pub fn to_blob(&self) -> Result<String, CoreError> {
        serde_json::to_string(self)
            .map_err(|e| CoreError::Internal(format!("cannot serialize session: {e}")))
    }

    pub fn from_blob(blob: &str) -> Result<Self, serde_json::Error> {
        serde_json::from_str(blob)
    }
}

/// In-process store.
#[derive(Debug, Default)]
pub struct MemorySessionStore {
    sessions: DashMap<SessionKey, String>,
    permissions: DashMap<String, String>,
}

impl MemorySessionStore {
    pub fn new() -> Self {
        Self::default()
    }

    pub fn len(&self) -> usize {
        self.sessions.len()
    }

    pub fn is_empty(&self) -> bool {
        self.sessions.is_empty()
    }
}

impl SessionStore for MemorySessionStore {
    fn load(&self, key: &SessionKey) -> Result<Option<String>, CoreError> {
        Ok(self.sessions.get(key).map(|b| b.value().clone()))
    }

    fn store(&self, key: &SessionKey, blob: String) -> Result<(), CoreError> {
        self.sessions.insert(key.clone(), blob);
        Ok(())
    }

    fn remove(&self, key: &SessionKey) -> Result<(), CoreError> {
        self.sessions.remove(key);
        Ok(())
    }

    fn remove_user(&self, user: &str) -> Result<(), CoreError> {
        self.sessions.retain(|k, _| k.user != user);
        self.permissions.remove(user);
        Ok(())
    }

    fn load_permissions(&self, user: &str) -> Result<Option<String>, CoreError> {
        Ok(self.permissions.get(user).map(|b| b.value().clone()))
    }

    fn store_permissions(&self, user: &str, blob: String) -> Result<(), CoreError> {
        self.permissions.insert(user.to_owned(), blob);
        Ok(())
    }
}

#[cfg(test)]
#[allow(clippy::unwrap_used)]
mod tests {
    use super::*;

    #[test]
    fn stale_when_old_or_connector_changed() {
        let mut cached = CachedSession::new(3, ConnectorKind::Snmp, SwitchState::default());
        let max_age = chrono::Duration::minutes(30);
        assert!(cached.is_fresh(3, ConnectorKind::Snmp, max_age));
        assert!(!cached.is_fresh(3, ConnectorKind::SnmpSsh, max_age));
        assert!(!cached.is_fresh(4, ConnectorKind::Snmp, max_age));

        cached.saved_at = Utc::now() - chrono::Duration::minutes(31);
        assert!(!cached.is_fresh(3, ConnectorKind::Snmp, max_age));
    }

    #[test]
    fn remove_user_keeps_other_users() {
        let store = MemorySessionStore::new();
        store.store(&SessionKey::new("alice", 1), "{}".into()).unwrap();
        store.store(&SessionKey::new("alice", 2), "{}".into()).unwrap();
        store.store(&SessionKey::new("bob", 1), "{}".into()).unwrap();
        store.store_permissions("alice", "{}".into()).unwrap();

        store.remove_user("alice").unwrap();

        assert_eq!(store.len(), 1);
        assert!(store.load(&SessionKey::new("bob", 1)).unwrap().is_some());
        assert!(store.load_permissions("alice").unwrap().is_none());
    }
}
