// ── Device sessions ──
//
// A `DeviceSession` is one user's working view of one device: the driver,
// the cached `SwitchState` and the policy that decides what the user may
// touch. Reads move the session forward through `ReadPhase`; mutations
// go through the driver and then update the cache so the next request can
// be served without re-reading the device.

mod manager;
mod state;
mod store;

use std::collections::{BTreeMap, BTreeSet};
use std::fmt;
use std::sync::Arc;
use std::time::Duration;

use chrono::Utc;
use serde::{Deserialize, Serialize};
use tracing::{debug, info, warn};

use crate::config::EditPolicy;
use crate::driver::{Capabilities, DeviceDriver, Driver};
use crate::error::CoreError;
use crate::model::{
    ConnectorKind, Device, Interface, PoeStatus, PortStatus, Vlan, is_manageable_vlan_id,
};

pub use manager::SessionManager;
pub use state::{ReadPhase, SwitchState};
pub use store::{CachedSession, MemorySessionStore, SessionStore};

const HARDWARE_UNAVAILABLE: &str = "Hardware details are not available for this device";
const HARDWARE_FAILED: &str = "Error getting hardware details";
const CLIENTS_UNAVAILABLE: &str = "Client data is not available for this device";
const CLIENTS_FAILED: &str = "Error getting client data";

/// Identifies a session: one per (user, device).
#[derive(Debug, Clone, PartialEq, Eq, Hash, PartialOrd, Ord, Serialize, Deserialize)]
pub struct SessionKey {
    pub user: String,
    pub device_id: u32,
}

impl SessionKey {
    pub fn new(user: impl Into<String>, device_id: u32) -> Self {
        Self {
            user: user.into(),
            device_id,
        }
    }
}

impl fmt::Display for SessionKey {
    fn fmt(&self, f: &mut fmt::Formatter<'_>) -> fmt::Result {
        write!(f, "{}@{}", self.user, self.device_id)
    }
}

/// What the requesting user may change on this device.
#[derive(Debug, Clone, Default)]
pub struct SessionPolicy {
    /// Every VLAN on the device is allowed.
    pub allow_all_vlans: bool,
    /// VLANs the switch group allows, when not all are.
    pub group_vlans: BTreeSet<u16>,
    /// PoE may be changed on interfaces that are otherwise not manageable.
    pub poe_override: bool,
    pub edit: Arc<EditPolicy>,
}

/// Which half of a PoE down/up cycle failed.
#[derive(Debug)]
pub enum PoeCycleFailure {
    /// Disabling failed; enabling was not attempted.
    Disable(CoreError),
    /// Disabling worked, enabling failed. PoE is left disabled.
    Enable(CoreError),
}

impl fmt::Display for PoeCycleFailure {
    fn fmt(&self, f: &mut fmt::Formatter<'_>) -> fmt::Result {
        match self {
            Self::Disable(e) => write!(f, "PoE disable failed: {e}"),
            Self::Enable(e) => write!(f, "PoE enable failed: {e}"),
        }
    }
}

impl PoeCycleFailure {
    pub fn into_error(self) -> CoreError {
        match self {
            Self::Disable(e) | Self::Enable(e) => e,
        }
    }
}

pub struct DeviceSession {
    key: SessionKey,
    device: Device,
    driver: Driver,
    state: SwitchState,
    policy: SessionPolicy,
    allowed_vlans: BTreeMap<u16, Vlan>,
}

impl DeviceSession {
    pub fn new(key: SessionKey, device: Device, driver: Driver, policy: SessionPolicy) -> Self {
        Self::restore(key, device, driver, policy, SwitchState::default())
    }

    /// Rebuild a session around previously cached state.
    pub fn restore(
        key: SessionKey,
        device: Device,
        driver: Driver,
        policy: SessionPolicy,
        state: SwitchState,
    ) -> Self {
        let mut session = Self {
            key,
            device,
            driver,
            state,
            policy,
            allowed_vlans: BTreeMap::new(),
        };
        session.apply_policy();
        session
    }

    // ── Accessors ────────────────────────────────────────────────────

    pub fn key(&self) -> &SessionKey {
        &self.key
    }

    pub fn device(&self) -> &Device {
        &self.device
    }

    pub fn state(&self) -> &SwitchState {
        &self.state
    }

    pub fn phase(&self) -> ReadPhase {
        self.state.phase
    }

    pub fn capabilities(&self) -> Capabilities {
        self.driver.capabilities()
    }

    pub fn connector(&self) -> ConnectorKind {
        self.driver.connector()
    }

    pub fn save_needed(&self) -> bool {
        self.state.save_needed
    }

    /// Pure cache lookup; never touches the device.
    pub fn get_interface_by_key(&self, key: &str) -> Option<&Interface> {
        self.state.interfaces.get(key)
    }

    /// VLANs the user may assign, keyed by id.
    pub fn allowed_vlans(&self) -> &BTreeMap<u16, Vlan> {
        &self.allowed_vlans
    }

    pub fn vlan_allowed(&self, id: u16) -> bool {
        self.allowed_vlans.contains_key(&id)
    }

    pub fn edit_policy(&self) -> &EditPolicy {
        &self.policy.edit
    }

    pub fn poe_override(&self) -> bool {
        self.policy.poe_override
    }

    // ── Reads ────────────────────────────────────────────────────────

    /// Run the basic read unless the session is already ready.
    ///
    /// The read goes into a fresh state; the cached state is only replaced
    /// when the whole read succeeds.
    pub async fn get_basic_info(&mut self) -> Result<(), CoreError> {
        if self.state.phase == ReadPhase::Ready {
            debug!(session = %self.key, "basic info served from cache");
            return Ok(());
        }

        let mut fresh = SwitchState::default();
        self.driver.read_basic(&mut fresh).await?;
        fresh.phase = ReadPhase::BasicRead;
        fresh.basic_read_at = Some(Utc::now());
        self.state = fresh;
        self.apply_policy();
        self.state.phase = ReadPhase::Ready;

        info!(
            device = %self.device.name,
            interfaces = self.state.interfaces.len(),
            "basic read complete"
        );
        Ok(())
    }

    /// Hardware inventory. A failure keeps the basic state and is returned
    /// as a partial-read warning.
    pub async fn get_hardware_details(&mut self) -> Result<(), CoreError> {
        self.require_ready()?;
        self.clear_warnings(HARDWARE_UNAVAILABLE, HARDWARE_FAILED);
        if !self.capabilities().has_hardware_details {
            self.state.warnings.push(HARDWARE_UNAVAILABLE.into());
            return Ok(());
        }

        let mut next = self.state.clone();
        match self.driver.read_hardware(&mut next).await {
            Ok(()) => {
                next.hardware_read_at = Some(Utc::now());
                self.state = next;
                Ok(())
            }
            Err(e) => Err(self.partial_failure(e, HARDWARE_FAILED)),
        }
    }

    /// Ethernet, ARP and LLDP data. Same failure handling as hardware.
    pub async fn get_client_data(&mut self) -> Result<(), CoreError> {
        self.require_ready()?;
        self.clear_warnings(CLIENTS_UNAVAILABLE, CLIENTS_FAILED);
        if !self.capabilities().has_client_data {
            self.state.warnings.push(CLIENTS_UNAVAILABLE.into());
            return Ok(());
        }

        let mut next = self.state.clone();
        match self.driver.read_clients(&mut next).await {
            Ok(()) => {
                next.clients_read_at = Some(Utc::now());
                self.state = next;
                Ok(())
            }
            Err(e) => Err(self.partial_failure(e, CLIENTS_FAILED)),
        }
    }

    /// Each read step replaces the warnings its previous run left behind.
    fn clear_warnings(&mut self, unavailable: &str, failed: &str) {
        self.state
            .warnings
            .retain(|w| w != unavailable && !w.starts_with(failed));
    }

    fn partial_failure(&mut self, err: CoreError, what: &str) -> CoreError {
        let err = err.into_partial(what);
        warn!(device = %self.device.name, error = %err, details = %err.details(), "partial read failed");
        self.state
            .warnings
            .push(format!("{}: {}", err.description(), err.details()));
        err
    }

    // ── Interface mutations ──────────────────────────────────────────

    pub async fn set_admin_status(&mut self, key: &str, status: PortStatus) -> Result<(), CoreError> {
        let iface = self.changeable_interface(key)?;
        self.driver
            .set_admin_status(&iface, status)
            .await
            .map_err(|e| e.into_mutation("Error setting interface admin status"))?;
        self.update_interface(key, |i| i.admin_status = status);
        self.mark_save_needed();
        Ok(())
    }

    /// Admin down, wait, admin up.
    pub async fn interface_down_up(&mut self, key: &str, delay: Duration) -> Result<(), CoreError> {
        self.set_admin_status(key, PortStatus::Down).await?;
        tokio::time::sleep(delay).await;
        self.set_admin_status(key, PortStatus::Up).await
    }

    pub async fn set_poe_status(&mut self, key: &str, status: PoeStatus) -> Result<(), CoreError> {
        let iface = self.poe_interface(key)?;
        self.driver
            .set_poe_status(&iface, status)
            .await
            .map_err(|e| e.into_mutation("Error setting PoE status"))?;
        self.update_poe(key, status);
        self.mark_save_needed();
        Ok(())
    }

    /// Disable PoE, wait for the powered device to drop, enable again.
    ///
    /// A failed disable skips the enable. A cycle does not mark the
    /// configuration as needing a save.
    pub async fn poe_down_up(&mut self, key: &str, delay: Duration) -> Result<(), PoeCycleFailure> {
        let iface = self.poe_interface(key).map_err(PoeCycleFailure::Disable)?;

        self.driver
            .set_poe_status(&iface, PoeStatus::Disabled)
            .await
            .map_err(|e| PoeCycleFailure::Disable(e.into_mutation("Error disabling PoE")))?;
        self.update_poe(key, PoeStatus::Disabled);

        debug!(interface = %iface.name, delay_secs = delay.as_secs(), "waiting before PoE enable");
        tokio::time::sleep(delay).await;

        self.driver
            .set_poe_status(&iface, PoeStatus::Enabled)
            .await
            .map_err(|e| PoeCycleFailure::Enable(e.into_mutation("Error enabling PoE")))?;
        self.update_poe(key, PoeStatus::Enabled);
        Ok(())
    }

    pub async fn set_untagged_vlan(&mut self, key: &str, vlan: u16) -> Result<(), CoreError> {
        let iface = self.changeable_interface(key)?;
        if iface.is_lacp_member() {
            return Err(CoreError::validation(format!(
                "Interface {} is a LACP member, its VLAN cannot be changed",
                iface.name
            )));
        }
        self.driver
            .set_untagged_vlan(&iface, vlan)
            .await
            .map_err(|e| e.into_mutation("Error setting untagged VLAN"))?;
        self.update_interface(key, |i| i.untagged_vlan = vlan);
        self.mark_save_needed();
        Ok(())
    }

    pub async fn set_description(&mut self, key: &str, text: &str) -> Result<(), CoreError> {
        let iface = self.changeable_interface(key)?;
        self.driver
            .set_description(&iface, text)
            .await
            .map_err(|e| e.into_mutation("Error setting interface description"))?;
        self.update_interface(key, |i| text.clone_into(&mut i.description));
        self.apply_policy();
        self.mark_save_needed();
        Ok(())
    }

    // ── VLAN mutations ───────────────────────────────────────────────

    pub async fn vlan_create(&mut self, id: u16, name: &str) -> Result<(), CoreError> {
        self.check_vlan_request(id, Some(name))?;
        if self.state.vlans.contains_key(&id) {
            return Err(CoreError::validation(format!("VLAN {id} already exists!")));
        }
        self.driver
            .vlan_create(id, name)
            .await
            .map_err(|e| e.into_mutation("Error creating VLAN"))?;
        self.state.vlans.insert(id, Vlan::new(id, name));
        self.apply_policy();
        self.mark_save_needed();
        Ok(())
    }

    pub async fn vlan_edit(&mut self, id: u16, name: &str) -> Result<(), CoreError> {
        self.check_vlan_request(id, Some(name))?;
        self.driver
            .vlan_edit(id, name)
            .await
            .map_err(|e| e.into_mutation("Error updating VLAN"))?;
        self.state.vlans.insert(id, Vlan::new(id, name));
        self.apply_policy();
        self.mark_save_needed();
        Ok(())
    }

    pub async fn vlan_delete(&mut self, id: u16) -> Result<(), CoreError> {
        self.check_vlan_request(id, None)?;
        self.driver
            .vlan_delete(id)
            .await
            .map_err(|e| e.into_mutation("Error deleting VLAN"))?;
        self.state.vlans.remove(&id);
        self.apply_policy();
        self.mark_save_needed();
        Ok(())
    }

    fn check_vlan_request(&self, id: u16, name: Option<&str>) -> Result<(), CoreError> {
        self.require_ready()?;
        if !is_manageable_vlan_id(id) {
            return Err(CoreError::validation(format!(
                "Invalid VLAN id {id}, must be between 2 and 4094"
            )));
        }
        if name.is_some_and(|n| n.trim().is_empty()) {
            return Err(CoreError::validation("VLAN name cannot be empty"));
        }
        if !self.capabilities().can_edit_vlans {
            return Err(CoreError::unsupported("VLAN edit", self.driver.connector()));
        }
        Ok(())
    }

    // ── Configuration and commands ───────────────────────────────────

    /// Persist the running configuration. Only meaningful when a change
    /// is pending and the device can save; the flag is cleared either way.
    pub async fn save_running_config(&mut self) -> Result<(), CoreError> {
        self.require_ready()?;
        let caps = self.capabilities();
        if !(self.state.save_needed && caps.can_save_config) {
            self.state.save_needed = false;
            return Err(CoreError::validation(
                "This switch model cannot save or does not need to save the config",
            ));
        }
        self.driver
            .save_running_config()
            .await
            .map_err(|e| e.into_mutation("Error saving configuration"))?;
        self.state.save_needed = false;
        info!(device = %self.device.name, "running configuration saved");
        Ok(())
    }

    pub async fn run_command(&mut self, command: &str) -> Result<String, CoreError> {
        self.require_ready()?;
        if !self.capabilities().can_run_commands {
            return Err(CoreError::unsupported("run command", self.driver.connector()));
        }
        self.driver.run_command(command).await
    }

    /// Release driver resources. The session can still be cached.
    pub async fn close(&mut self) {
        self.driver.close().await;
    }

    /// Set the save flag after successful changes, per device capability.
    pub fn mark_save_needed(&mut self) {
        let caps = self.capabilities();
        if caps.can_save_config && !caps.auto_saves_config {
            self.state.save_needed = true;
        }
    }

    // ── Internals ────────────────────────────────────────────────────

    fn require_ready(&self) -> Result<(), CoreError> {
        if self.state.phase == ReadPhase::Ready {
            Ok(())
        } else {
            Err(CoreError::NotReady {
                message: format!("{} has not been read yet", self.device.name),
            })
        }
    }

    fn changeable_interface(&self, key: &str) -> Result<Interface, CoreError> {
        self.require_ready()?;
        if !self.capabilities().can_change_interfaces {
            return Err(CoreError::unsupported(
                "interface changes",
                self.driver.connector(),
            ));
        }
        self.state
            .interfaces
            .get(key)
            .cloned()
            .ok_or_else(|| CoreError::InterfaceNotFound { key: key.into() })
    }

    fn poe_interface(&self, key: &str) -> Result<Interface, CoreError> {
        let iface = self.changeable_interface(key)?;
        if iface.poe.is_none() {
            return Err(CoreError::validation(format!(
                "Interface {} is not PoE capable",
                iface.name
            )));
        }
        Ok(iface)
    }

    fn update_interface(&mut self, key: &str, change: impl FnOnce(&mut Interface)) {
        if let Some(iface) = self.state.interfaces.get_mut(key) {
            change(iface);
        }
    }

    fn update_poe(&mut self, key: &str, status: PoeStatus) {
        self.update_interface(key, |i| {
            if let Some(poe) = i.poe.as_mut() {
                poe.admin_status = status;
            }
        });
    }

    /// Recompute allowed VLANs and per-interface manageability.
    fn apply_policy(&mut self) {
        self.allowed_vlans = self
            .state
            .vlans
            .iter()
            .filter(|(id, _)| self.policy.allow_all_vlans || self.policy.group_vlans.contains(id))
            .map(|(id, v)| (*id, v.clone()))
            .collect();

        let read_only = self.device.read_only;
        for iface in self.state.interfaces.values_mut() {
            let (manageable, reason) = if read_only {
                (false, Some("Device is read-only".to_owned()))
            } else if !self.allowed_vlans.contains_key(&iface.untagged_vlan) {
                (
                    false,
                    Some(format!(
                        "Untagged VLAN {} is not allowed",
                        iface.untagged_vlan
                    )),
                )
            } else {
                (true, None)
            };
            iface.manageable = manageable;
            iface.unmanage_reason = reason;
            iface.can_edit_description = !self.policy.edit.is_denied(&iface.description);
        }
    }
}
