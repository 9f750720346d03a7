// ── Session manager ──
//
// Resolves a session from the store when a fresh cached copy exists,
// otherwise builds a driver and runs the basic read. Writes the state back
// after successful reads and change sequences.

use std::sync::Arc;
use std::time::Duration;

use tracing::{debug, info};

use super::{CachedSession, DeviceSession, SessionKey, SessionPolicy, SessionStore, SwitchState};
use crate::driver::DriverFactory;
use crate::error::CoreError;
use crate::model::{ConnectorKind, Device};

pub struct SessionManager {
    store: Arc<dyn SessionStore>,
    factory: Arc<dyn DriverFactory>,
    max_age: chrono::Duration,
}

impl SessionManager {
    pub fn new(
        store: Arc<dyn SessionStore>,
        factory: Arc<dyn DriverFactory>,
        max_age: Duration,
    ) -> Self {
        Self {
            store,
            factory,
            max_age: chrono::Duration::from_std(max_age)
                .unwrap_or_else(|_| chrono::Duration::seconds(1800)),
        }
    }

    pub fn store(&self) -> &Arc<dyn SessionStore> {
        &self.store
    }

    /// Session for `user` on `device`, ready for use.
    ///
    /// A fresh cached state is reused without contacting the device;
    /// otherwise the basic read runs and the result is cached.
    pub async fn open(
        &self,
        user: &str,
        device: &Device,
        policy: SessionPolicy,
    ) -> Result<DeviceSession, CoreError> {
        if !device.is_active() {
            return Err(CoreError::validation(format!(
                "Device {} is not active",
                device.name
            )));
        }

        let key = SessionKey::new(user, device.id);
        let driver = self.factory.build(device)?;

        if let Some(state) = self.cached_state(&key, device.connector)? {
            debug!(session = %key, "restored session from cache");
            return Ok(DeviceSession::restore(
                key,
                device.clone(),
                driver,
                policy,
                state,
            ));
        }

        let mut session = DeviceSession::new(key, device.clone(), driver, policy);
        if let Err(e) = session.get_basic_info().await {
            session.close().await;
            return Err(e);
        }
        self.save_cache(&session)?;
        Ok(session)
    }

    /// Write the session state back to the store.
    pub fn save_cache(&self, session: &DeviceSession) -> Result<(), CoreError> {
        let cached = CachedSession::new(
            session.device().id,
            session.connector(),
            session.state().clone(),
        );
        self.store.store(session.key(), cached.to_blob()?)
    }

    /// Forget the cached state of one device; the next open re-reads it.
    pub fn clear_switch_cache(&self, user: &str, device_id: u32) -> Result<(), CoreError> {
        info!(user, device_id, "clearing switch cache");
        self.store.remove(&SessionKey::new(user, device_id))
    }

    /// Forget everything cached for `user`.
    pub fn clear_user(&self, user: &str) -> Result<(), CoreError> {
        info!(user, "clearing user sessions");
        self.store.remove_user(user)
    }

    fn cached_state(
        &self,
        key: &SessionKey,
        connector: ConnectorKind,
    ) -> Result<Option<SwitchState>, CoreError> {
        let Some(blob) = self.store.load(key)? else {
            return Ok(None);
        };
        match CachedSession::from_blob(&blob) {
            Ok(cached) if cached.is_fresh(key.device_id, connector, self.max_age) => {
                Ok(Some(cached.state))
            }
            Ok(_) => {
                debug!(session = %key, "cached session is stale");
                self.store.remove(key)?;
                Ok(None)
            }
            Err(e) => {
                debug!(session = %key, error = %e, "discarding unreadable cached session");
                self.store.remove(key)?;
                Ok(None)
            }
        }
    }
}

#[cfg(test)]
#[allow(clippy::unwrap_used)]
mod tests {
    use super::*;
    use crate::config::{CoreConfig, EditPolicy};
    use crate::driver::{DummyLab, DummyOp, TransportFactory};
    use crate::model::DeviceStatus;
    use crate::session::{MemorySessionStore, ReadPhase};

    fn device(status: DeviceStatus) -> Device {
        Device {
            id: 5,
            name: "lab-5".into(),
            hostname: "192.0.2.5".into(),
            group_id: 1,
            connector: ConnectorKind::TestDummy,
            status,
            description: None,
            read_only: false,
            snmp_profile: None,
            ssh_profile: None,
            api_profile: None,
        }
    }

    fn policy() -> SessionPolicy {
        SessionPolicy {
            allow_all_vlans: true,
            edit: Arc::new(EditPolicy::compile(&CoreConfig::default()).unwrap()),
            ..SessionPolicy::default()
        }
    }

    fn manager(lab: &DummyLab) -> (SessionManager, Arc<MemorySessionStore>) {
        let store = Arc::new(MemorySessionStore::new());
        let factory = TransportFactory::default().with_lab(lab.clone());
        let manager = SessionManager::new(
            store.clone(),
            Arc::new(factory),
            Duration::from_secs(1800),
        );
        (manager, store)
    }

    #[tokio::test]
    async fn second_open_is_served_from_cache() {
        let lab = DummyLab::new();
        let (manager, store) = manager(&lab);
        let dev = device(DeviceStatus::Active);

        let first = manager.open("alice", &dev, policy()).await.unwrap();
        assert_eq!(first.phase(), ReadPhase::Ready);
        assert_eq!(store.len(), 1);

        // A cache hit must not read the device again.
        lab.device(5, "lab-5").fail(DummyOp::ReadBasic, None);
        let second = manager.open("alice", &dev, policy()).await.unwrap();
        assert_eq!(second.state().interfaces.len(), 9);

        manager.clear_switch_cache("alice", 5).unwrap();
        assert!(manager.open("alice", &dev, policy()).await.is_err());
    }

    #[tokio::test]
    async fn unreadable_blob_is_a_cache_miss() {
        let lab = DummyLab::new();
        let (manager, store) = manager(&lab);
        store
            .store(&SessionKey::new("alice", 5), "not json".into())
            .unwrap();
        let session = manager
            .open("alice", &device(DeviceStatus::Active), policy())
            .await
            .unwrap();
        assert_eq!(session.phase(), ReadPhase::Ready);
    }

    #[tokio::test]
    async fn inactive_device_is_rejected() {
        let (manager, _) = manager(&DummyLab::new());
        let Err(err) = manager
            .open("alice", &device(DeviceStatus::Inactive), policy())
            .await
        else {
            panic!("inactive device opened");
        };
        assert!(err.to_string().contains("not active"));
    }
}
