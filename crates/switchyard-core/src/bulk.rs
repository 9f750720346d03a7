// ── Bulk edit ──
//
// Applies one change set across a list of interfaces of a single device.
// Per interface the order is fixed: admin status, PoE, untagged VLAN,
// description. Every attempted change is logged and reported as one
// human-readable outcome line. Admin, PoE and VLAN failures are counted
// and the batch continues; a description failure halts the batch.

use std::time::Duration;

use serde::{Deserialize, Serialize};
use strum::Display;
use tracing::{debug, info};

use crate::activity::ActivityRecorder;
use crate::config::DescriptionMode;
use crate::counters::{Counter, Counters};
use crate::error::{CoreError, ErrorReport};
use crate::model::{Interface, LogAction, LogType, PoeStatus, PortStatus};
use crate::session::{DeviceSession, PoeCycleFailure};

// ── Request types ────────────────────────────────────────────────────

#[derive(Debug, Clone, Copy, PartialEq, Eq, Serialize, Deserialize, Display)]
#[serde(rename_all = "kebab-case")]
pub enum AdminAction {
    Toggle,
    Up,
    Down,
}

#[derive(Debug, Clone, Copy, PartialEq, Eq, Serialize, Deserialize, Display)]
#[serde(rename_all = "kebab-case")]
pub enum PoeAction {
    #[strum(serialize = "Down/Up")]
    ToggleDownUp,
    Toggle,
    #[strum(serialize = "Enable")]
    Up,
    #[strum(serialize = "Disable")]
    Down,
}

#[derive(Debug, Clone, PartialEq, Eq, Serialize, Deserialize)]
pub struct DescriptionChange {
    pub text: String,
    #[serde(default)]
    pub mode: DescriptionMode,
}

/// The changes to apply to every selected interface. `None` leaves that
/// aspect alone.
#[derive(Debug, Clone, Default, PartialEq, Eq, Serialize, Deserialize)]
pub struct ChangeSet {
    #[serde(default)]
    pub admin: Option<AdminAction>,
    #[serde(default)]
    pub poe: Option<PoeAction>,
    #[serde(default)]
    pub vlan: Option<u16>,
    #[serde(default)]
    pub description: Option<DescriptionChange>,
}

impl ChangeSet {
    fn description_text(&self) -> Option<&DescriptionChange> {
        self.description.as_ref().filter(|d| !d.text.is_empty())
    }

    pub fn is_empty(&self) -> bool {
        self.admin.is_none()
            && self.poe.is_none()
            && self.vlan.is_none()
            && self.description_text().is_none()
    }

    /// The arguments line logged when a batch starts.
    fn summary_line(&self) -> String {
        let none = || "None".to_owned();
        let descr = self.description_text();
        format!(
            "Interface Status={}, PoE Status={}, Vlan={}, Descr Type={}, Descr={}",
            self.admin.map_or_else(none, |a| a.to_string()),
            self.poe.map_or_else(none, |p| p.to_string()),
            self.vlan.map_or_else(none, |v| v.to_string()),
            descr.map_or_else(none, |d| d.mode.to_string()),
            descr.map(|d| d.text.as_str()).unwrap_or_default(),
        )
    }
}

#[derive(Debug, Clone, Default, PartialEq, Eq, Serialize, Deserialize)]
pub struct BulkEditRequest {
    /// Interface keys, processed in this order.
    pub interfaces: Vec<String>,
    pub changes: ChangeSet,
}

#[derive(Debug, Clone, Default, PartialEq, Eq, Serialize)]
pub struct BulkEditSummary {
    pub success_count: usize,
    pub error_count: usize,
    /// One line per attempted or skipped change, in processing order.
    pub outputs: Vec<String>,
    /// Set when a description failure stopped the batch early.
    pub halted: Option<ErrorReport>,
}

impl BulkEditSummary {
    pub fn is_ok(&self) -> bool {
        self.error_count == 0 && self.halted.is_none()
    }
}

// ── Orchestrator ─────────────────────────────────────────────────────

/// Runs one batch against an open session.
///
/// The caller persists the session cache afterwards; the editor only marks
/// `save_needed` when at least one change succeeded.
pub struct BulkEditor<'a> {
    session: &'a mut DeviceSession,
    recorder: &'a ActivityRecorder,
    counters: &'a Counters,
    poe_toggle_delay: Duration,
    summary: BulkEditSummary,
}

impl<'a> BulkEditor<'a> {
    pub fn new(
        session: &'a mut DeviceSession,
        recorder: &'a ActivityRecorder,
        counters: &'a Counters,
        poe_toggle_delay: Duration,
    ) -> Self {
        Self {
            session,
            recorder,
            counters,
            poe_toggle_delay,
            summary: BulkEditSummary::default(),
        }
    }

    pub async fn run(mut self, request: &BulkEditRequest) -> Result<BulkEditSummary, CoreError> {
        self.precheck(request)?;

        let changes = &request.changes;
        self.counters.increment(Counter::BulkEdits);
        self.recorder
            .record(LogAction::BulkEditStart, LogType::Change, changes.summary_line());
        info!(
            device = %self.session.device().name,
            interfaces = request.interfaces.len(),
            "bulk edit started"
        );

        for key in &request.interfaces {
            let Some(iface) = self.session.get_interface_by_key(key).cloned() else {
                self.summary.error_count += 1;
                self.summary
                    .outputs
                    .push(format!("ERROR: interface for index '{key}' not found!"));
                continue;
            };

            if !iface.manageable {
                self.unmanageable(&iface, changes).await;
                continue;
            }

            if let Some(action) = changes.admin {
                self.admin_step(&iface, action).await;
            }
            if let Some(action) = changes.poe {
                self.poe_step(&iface, action).await;
            }
            if let Some(vlan) = changes.vlan {
                self.vlan_step(&iface, vlan).await;
            }
            if let Some(descr) = changes.description_text() {
                if let Err(e) = self.description_step(&iface, descr).await {
                    self.summary.halted = Some(e.report());
                    break;
                }
            }
        }

        self.finish();
        Ok(self.summary)
    }

    /// Batch-level checks. Nothing is sent to the device when one fails.
    fn precheck(&self, request: &BulkEditRequest) -> Result<(), CoreError> {
        if request.interfaces.is_empty() {
            return Err(self.reject_warning("Please select at least 1 interface!"));
        }
        let changes = &request.changes;
        if changes.is_empty() {
            return Err(self.reject_warning("Please select at least 1 thing to change!"));
        }

        let mut errors = Vec::new();
        if let Some(descr) = changes.description_text() {
            if descr.mode == DescriptionMode::Replace
                && self.session.edit_policy().is_denied(&descr.text)
            {
                errors.push(format!("Description not allowed: {}", descr.text));
            }
        }
        if let Some(vlan) = changes.vlan {
            if !self.session.vlan_allowed(vlan) {
                errors.push(format!("New vlan '{vlan}' is not allowed!"));
            }
        }
        if errors.is_empty() {
            return Ok(());
        }

        for message in &errors {
            self.recorder
                .record(LogAction::BulkEdit, LogType::Error, message.clone());
            self.counters.increment(Counter::Errors);
        }
        Err(CoreError::InvalidRequest {
            description: "Some form values were invalid, please correct and resubmit!".into(),
            details: errors.join("\n"),
        })
    }

    fn reject_warning(&self, message: &str) -> CoreError {
        self.recorder
            .record(LogAction::BulkEdit, LogType::Warning, message);
        CoreError::warning(message)
    }

    // ── Steps ────────────────────────────────────────────────────────

    /// Only a PoE change can reach an unmanageable interface, and only
    /// when PoE changes are allowed everywhere.
    async fn unmanageable(&mut self, iface: &Interface, changes: &ChangeSet) {
        let mut blocked = changes.admin.is_some()
            || changes.vlan.is_some()
            || changes.description_text().is_some();
        match changes.poe {
            Some(action) if self.session.poe_override() => self.poe_step(iface, action).await,
            Some(_) => blocked = true,
            None => {}
        }
        if blocked {
            let reason = iface.unmanage_reason.as_deref().unwrap_or("not manageable");
            let line = format!("Interface {}: Ignored - {reason}", iface.name);
            self.recorder
                .record_interface(LogAction::BulkEdit, LogType::Warning, &iface.name, line.clone());
            self.summary.outputs.push(line);
        }
    }

    async fn admin_step(&mut self, iface: &Interface, action: AdminAction) {
        let target = match action {
            AdminAction::Toggle => iface.admin_status.flipped(),
            AdminAction::Up => PortStatus::Up,
            AdminAction::Down => PortStatus::Down,
        };
        let log_action = if target.is_up() {
            LogAction::InterfaceUp
        } else {
            LogAction::InterfaceDown
        };

        let (log_type, line) = if target == iface.admin_status {
            (
                LogType::Change,
                format!("Interface {}: Ignored - already {target}", iface.name),
            )
        } else {
            match self.session.set_admin_status(&iface.key, target).await {
                Ok(()) => {
                    self.success();
                    (
                        LogType::Change,
                        format!("Interface {}: Admin set to {target}", iface.name),
                    )
                }
                Err(e) => {
                    self.error();
                    (
                        LogType::Error,
                        format!("Interface {}: Admin {target} ERROR: {}", iface.name, e.description()),
                    )
                }
            }
        };
        self.recorder
            .record_interface(log_action, log_type, &iface.name, line.clone());
        self.summary.outputs.push(line);
    }

    async fn poe_step(&mut self, iface: &Interface, action: PoeAction) {
        let Some(current) = iface.poe_status() else {
            self.summary
                .outputs
                .push(format!("Interface {}: Ignored - not PoE capable", iface.name));
            return;
        };

        if action == PoeAction::ToggleDownUp {
            self.poe_cycle(iface, current).await;
            return;
        }

        let target = match action {
            PoeAction::Up => PoeStatus::Enabled,
            PoeAction::Down => PoeStatus::Disabled,
            PoeAction::Toggle | PoeAction::ToggleDownUp => current.flipped(),
        };
        if target == current {
            self.summary.outputs.push(format!(
                "Interface {}: Ignored, PoE already {target}",
                iface.name
            ));
            return;
        }

        let log_action = if target.is_enabled() {
            LogAction::PoeUp
        } else {
            LogAction::PoeDown
        };
        let (log_type, line) = match self.session.set_poe_status(&iface.key, target).await {
            Ok(()) => {
                self.success();
                (LogType::Change, format!("Interface {}: PoE {target}", iface.name))
            }
            Err(e) => {
                self.error();
                (
                    LogType::Error,
                    format!("Interface {}: PoE {target} ERROR: {}", iface.name, e.description()),
                )
            }
        };
        self.recorder
            .record_interface(log_action, log_type, &iface.name, line.clone());
        self.summary.outputs.push(line);
    }

    async fn poe_cycle(&mut self, iface: &Interface, current: PoeStatus) {
        if !current.is_enabled() {
            self.summary.outputs.push(format!(
                "Interface {}: PoE Down/Up IGNORED, PoE NOT enabled",
                iface.name
            ));
            return;
        }

        let (log_type, line) = match self
            .session
            .poe_down_up(&iface.key, self.poe_toggle_delay)
            .await
        {
            Ok(()) => {
                // one change per half
                self.counters.increment(Counter::Changes);
                self.success();
                (
                    LogType::Change,
                    format!("Interface {}: PoE Toggle Down/Up OK", iface.name),
                )
            }
            Err(PoeCycleFailure::Disable(e)) => {
                self.error();
                (
                    LogType::Error,
                    format!(
                        "ERROR: Toggle-Disable PoE on interface {} - {}",
                        iface.name,
                        e.description()
                    ),
                )
            }
            Err(PoeCycleFailure::Enable(e)) => {
                self.counters.increment(Counter::Changes);
                self.error();
                (
                    LogType::Error,
                    format!(
                        "ERROR: Toggle-Enable PoE on interface {} - {}",
                        iface.name,
                        e.description()
                    ),
                )
            }
        };
        self.recorder
            .record_interface(LogAction::PoeToggle, log_type, &iface.name, line.clone());
        self.summary.outputs.push(line);
    }

    async fn vlan_step(&mut self, iface: &Interface, vlan: u16) {
        if iface.is_lacp_member() {
            let line = format!(
                "Interface {}: LACP Member, Vlan set to {vlan} IGNORED!",
                iface.name
            );
            self.recorder
                .record_interface(LogAction::PvidChange, LogType::Warning, &iface.name, line.clone());
            self.summary.outputs.push(line);
            return;
        }
        if iface.untagged_vlan == vlan {
            self.summary
                .outputs
                .push(format!("Interface {}: Ignored, VLAN already {vlan}", iface.name));
            return;
        }

        let (log_type, line) = match self.session.set_untagged_vlan(&iface.key, vlan).await {
            Ok(()) => {
                self.success();
                (LogType::Change, format!("Interface {}: Vlan set to {vlan}", iface.name))
            }
            Err(e) => {
                self.error();
                // counted as an attempted change as well
                self.counters.increment(Counter::Changes);
                (
                    LogType::Error,
                    format!("Interface {}: Vlan change ERROR: {}", iface.name, e.description()),
                )
            }
        };
        self.recorder
            .record_interface(LogAction::PvidChange, log_type, &iface.name, line.clone());
        self.summary.outputs.push(line);
    }

    async fn description_step(
        &mut self,
        iface: &Interface,
        change: &DescriptionChange,
    ) -> Result<(), CoreError> {
        let text = self
            .session
            .edit_policy()
            .compose(&iface.description, &change.text, change.mode);
        if text == iface.description {
            self.summary
                .outputs
                .push(format!("Interface {}: Ignored, Descr already set", iface.name));
            return Ok(());
        }

        match self.session.set_description(&iface.key, &text).await {
            Ok(()) => {
                self.success();
                let line = format!("Interface {}: Descr set OK", iface.name);
                self.recorder
                    .record_interface(LogAction::AliasChange, LogType::Change, &iface.name, line.clone());
                self.summary.outputs.push(line);
                Ok(())
            }
            Err(e) => {
                self.error();
                let line = format!("Interface {}: Descr ERROR: {}", iface.name, e.description());
                self.recorder
                    .record_interface(LogAction::AliasChange, LogType::Error, &iface.name, line.clone());
                self.summary.outputs.push(line);
                Err(e)
            }
        }
    }

    // ── Bookkeeping ──────────────────────────────────────────────────

    fn success(&mut self) {
        self.summary.success_count += 1;
        self.counters.increment(Counter::Changes);
    }

    fn error(&mut self) {
        self.summary.error_count += 1;
        self.counters.increment(Counter::Errors);
    }

    fn finish(&mut self) {
        if self.summary.error_count > 0 || self.summary.halted.is_some() {
            self.recorder.record(
                LogAction::BulkEdit,
                LogType::Error,
                "Bulk Edits had errors! (see previous entries)",
            );
        } else {
            self.recorder
                .record(LogAction::BulkEdit, LogType::Change, "Bulk Edits OK!");
        }
        if self.summary.success_count > 0 {
            self.session.mark_save_needed();
        }
        debug!(
            success = self.summary.success_count,
            errors = self.summary.error_count,
            halted = self.summary.halted.is_some(),
            "bulk edit finished"
        );
    }
}

#[cfg(test)]
#[allow(clippy::unwrap_used)]
mod tests {
    use std::sync::Arc;

    use pretty_assertions::assert_eq;

    use super::*;
    use crate::activity::{ActivityLog, MemoryActivityLog};
    use crate::config::{CoreConfig, EditPolicy};
    use crate::driver::{DummyDevice, DummyDriver, DummyOp, Driver};
    use crate::model::{ConnectorKind, Device, DeviceStatus};
    use crate::session::{SessionKey, SessionPolicy};

    const DELAY: Duration = Duration::from_secs(5);

    struct Fixture {
        session: DeviceSession,
        device: DummyDevice,
        log: Arc<MemoryActivityLog>,
        recorder: ActivityRecorder,
        counters: Counters,
    }

    impl Fixture {
        async fn new(config: &CoreConfig) -> Self {
            Self::with_vlans(config, false).await
        }

        async fn with_vlans(config: &CoreConfig, allow_all_vlans: bool) -> Self {
            let device = DummyDevice::lab("lab-1");
            let policy = SessionPolicy {
                allow_all_vlans,
                group_vlans: [10, 30].into_iter().collect(),
                poe_override: false,
                edit: Arc::new(EditPolicy::compile(config).unwrap()),
            };
            let mut session = DeviceSession::new(
                SessionKey::new("alice", 1),
                Device {
                    id: 1,
                    name: "lab-1".into(),
                    hostname: "192.0.2.1".into(),
                    group_id: 1,
                    connector: ConnectorKind::TestDummy,
                    status: DeviceStatus::Active,
                    description: None,
                    read_only: false,
                    snmp_profile: None,
                    ssh_profile: None,
                    api_profile: None,
                },
                Driver::Dummy(DummyDriver::new(device.clone())),
                policy,
            );
            session.get_basic_info().await.unwrap();
            let log = Arc::new(MemoryActivityLog::new());
            let recorder =
                ActivityRecorder::new(log.clone() as Arc<dyn ActivityLog>, "alice", None).for_device(1, 1);
            Self {
                session,
                device,
                log,
                recorder,
                counters: Counters::new(),
            }
        }

        async fn run(&mut self, request: &BulkEditRequest) -> Result<BulkEditSummary, CoreError> {
            BulkEditor::new(&mut self.session, &self.recorder, &self.counters, DELAY)
                .run(request)
                .await
        }
    }

    fn request(keys: &[&str], changes: ChangeSet) -> BulkEditRequest {
        BulkEditRequest {
            interfaces: keys.iter().map(|k| (*k).to_owned()).collect(),
            changes,
        }
    }

    #[tokio::test]
    async fn admin_down_skips_interface_already_down() {
        let mut fx = Fixture::new(&CoreConfig::default()).await;
        let changes = ChangeSet {
            admin: Some(AdminAction::Down),
            ..ChangeSet::default()
        };

        let summary = fx.run(&request(&["1", "2", "3"], changes)).await.unwrap();

        assert_eq!(summary.success_count, 2);
        assert_eq!(summary.error_count, 0);
        assert_eq!(
            summary.outputs,
            vec![
                "Interface Gi1/0/1: Admin set to Down",
                "Interface Gi1/0/2: Ignored - already Down",
                "Interface Gi1/0/3: Admin set to Down",
            ]
        );
        assert_eq!(fx.device.calls().len(), 2);
        assert!(fx.session.save_needed());

        let entries = fx.log.entries();
        assert_eq!(entries.first().unwrap().action, LogAction::BulkEdit);
        assert_eq!(entries.first().unwrap().description, "Bulk Edits OK!");
        assert_eq!(entries.last().unwrap().action, LogAction::BulkEditStart);
        assert_eq!(fx.counters.get(Counter::Changes), 2);
    }

    #[tokio::test]
    async fn empty_batch_is_a_warning_without_device_calls() {
        let mut fx = Fixture::new(&CoreConfig::default()).await;
        let changes = ChangeSet {
            admin: Some(AdminAction::Up),
            ..ChangeSet::default()
        };
        let err = fx.run(&request(&[], changes)).await.unwrap_err();
        assert!(err.is_warning());
        assert_eq!(err.description(), "Please select at least 1 interface!");

        let err = fx.run(&request(&["1"], ChangeSet::default())).await.unwrap_err();
        assert_eq!(err.description(), "Please select at least 1 thing to change!");
        assert!(fx.device.calls().is_empty());
        assert_eq!(fx.log.entries().len(), 2);
    }

    #[tokio::test]
    async fn disallowed_vlan_rejects_the_batch() {
        let mut fx = Fixture::new(&CoreConfig::default()).await;
        let changes = ChangeSet {
            vlan: Some(20),
            ..ChangeSet::default()
        };
        let err = fx.run(&request(&["1", "3"], changes)).await.unwrap_err();
        assert!(matches!(err, CoreError::InvalidRequest { .. }));
        assert_eq!(err.details(), "New vlan '20' is not allowed!");
        assert!(fx.device.calls().is_empty());
        assert_eq!(fx.counters.get(Counter::Errors), 1);
    }

    #[tokio::test]
    async fn denied_description_rejects_the_batch() {
        let config = CoreConfig {
            description_deny_pattern: Some("uplink".into()),
            ..CoreConfig::default()
        };
        let mut fx = Fixture::new(&config).await;
        let changes = ChangeSet {
            description: Some(DescriptionChange {
                text: "uplink to core".into(),
                mode: DescriptionMode::Replace,
            }),
            ..ChangeSet::default()
        };
        let err = fx.run(&request(&["1"], changes)).await.unwrap_err();
        assert_eq!(err.details(), "Description not allowed: uplink to core");
        assert!(fx.device.calls().is_empty());
    }

    #[tokio::test]
    async fn lacp_member_vlan_change_is_ignored_with_warning() {
        // port 8 sits on VLAN 1, which the group does not allow
        let mut fx = Fixture::with_vlans(&CoreConfig::default(), true).await;
        let changes = ChangeSet {
            vlan: Some(30),
            ..ChangeSet::default()
        };

        let summary = fx.run(&request(&["8", "3"], changes)).await.unwrap();

        assert_eq!(summary.success_count, 1);
        assert_eq!(summary.error_count, 0);
        assert_eq!(
            summary.outputs,
            vec![
                "Interface Gi1/0/8: LACP Member, Vlan set to 30 IGNORED!",
                "Interface Gi1/0/3: Vlan set to 30",
            ]
        );
        assert_eq!(fx.device.calls().len(), 1);
        let warning = fx
            .log
            .entries()
            .into_iter()
            .find(|e| e.log_type == LogType::Warning)
            .unwrap();
        assert_eq!(warning.if_name.as_deref(), Some("Gi1/0/8"));
    }

    #[tokio::test(start_paused = true)]
    async fn poe_cycle_failure_on_disable_skips_enable() {
        let mut fx = Fixture::new(&CoreConfig::default()).await;
        fx.device.fail(DummyOp::PoeStatus, Some("3"));
        let changes = ChangeSet {
            poe: Some(PoeAction::ToggleDownUp),
            ..ChangeSet::default()
        };

        let summary = fx.run(&request(&["1", "3", "5", "8"], changes)).await.unwrap();

        assert_eq!(summary.success_count, 1);
        assert_eq!(summary.error_count, 1);
        assert_eq!(
            summary.outputs,
            vec![
                "Interface Gi1/0/1: PoE Toggle Down/Up OK",
                "ERROR: Toggle-Disable PoE on interface Gi1/0/3 - Error disabling PoE",
                "Interface Gi1/0/5: PoE Down/Up IGNORED, PoE NOT enabled",
                "Interface Gi1/0/8: Ignored - Untagged VLAN 1 is not allowed",
            ]
        );
        // the cycle on port 1 wrote twice, port 3 never reached the device
        assert_eq!(fx.device.calls().len(), 2);
        assert!(fx.session.save_needed());
    }

    #[tokio::test(start_paused = true)]
    async fn poe_cycle_failure_on_enable_leaves_poe_disabled() {
        let mut fx = Fixture::new(&CoreConfig::default()).await;
        fx.device
            .fail_value(DummyOp::PoeStatus, Some("4"), PoeStatus::Enabled);
        let changes = ChangeSet {
            poe: Some(PoeAction::ToggleDownUp),
            ..ChangeSet::default()
        };

        let summary = fx.run(&request(&["4"], changes)).await.unwrap();

        assert_eq!(summary.success_count, 0);
        assert_eq!(summary.error_count, 1);
        assert_eq!(
            summary.outputs,
            vec!["ERROR: Toggle-Enable PoE on interface Gi1/0/4 - Error enabling PoE"]
        );
        let cached = fx.session.get_interface_by_key("4").unwrap();
        assert_eq!(cached.poe.as_ref().unwrap().admin_status, PoeStatus::Disabled);
        assert_eq!(
            fx.device.interface("4").unwrap().poe.unwrap().admin_status,
            PoeStatus::Disabled
        );
        // the disable half reached the device
        assert_eq!(fx.counters.get(Counter::Changes), 1);
        assert_eq!(fx.counters.get(Counter::Errors), 1);
        let entry = fx
            .log
            .entries()
            .into_iter()
            .find(|e| e.action == LogAction::PoeToggle)
            .unwrap();
        assert_eq!(entry.log_type, LogType::Error);
    }

    #[tokio::test]
    async fn description_failure_halts_the_batch() {
        let mut fx = Fixture::new(&CoreConfig::default()).await;
        fx.device.fail(DummyOp::Description, Some("3"));
        let changes = ChangeSet {
            description: Some(DescriptionChange {
                text: "lab".into(),
                mode: DescriptionMode::Append,
            }),
            ..ChangeSet::default()
        };

        let summary = fx.run(&request(&["1", "3", "4"], changes)).await.unwrap();

        assert_eq!(summary.success_count, 1);
        assert_eq!(summary.error_count, 1);
        assert_eq!(
            summary.outputs,
            vec![
                "Interface Gi1/0/1: Descr set OK",
                "Interface Gi1/0/3: Descr ERROR: Error setting interface description",
            ]
        );
        assert_eq!(
            fx.device.interface("1").unwrap().description,
            "office 101 lab"
        );
        assert_eq!(fx.device.interface("4").unwrap().description, "");
        assert!(summary.halted.is_some());
        assert_eq!(
            fx.log.entries().first().unwrap().description,
            "Bulk Edits had errors! (see previous entries)"
        );
    }

    #[tokio::test]
    async fn poe_without_capability_is_ignored() {
        let mut fx = Fixture::with_vlans(&CoreConfig::default(), true).await;
        let changes = ChangeSet {
            poe: Some(PoeAction::Down),
            ..ChangeSet::default()
        };
        let summary = fx.run(&request(&["8", "5", "6"], changes)).await.unwrap();
        assert_eq!(
            summary.outputs,
            vec![
                "Interface Gi1/0/8: Ignored - not PoE capable",
                "Interface Gi1/0/5: Ignored, PoE already Disabled",
                "Interface Gi1/0/6: PoE Disabled",
            ]
        );
        assert_eq!(summary.success_count, 1);
    }

    #[tokio::test]
    async fn unknown_interface_counts_as_error() {
        let mut fx = Fixture::new(&CoreConfig::default()).await;
        let changes = ChangeSet {
            admin: Some(AdminAction::Up),
            ..ChangeSet::default()
        };
        let summary = fx.run(&request(&["99"], changes)).await.unwrap();
        assert_eq!(summary.error_count, 1);
        assert_eq!(summary.outputs, vec!["ERROR: interface for index '99' not found!"]);
    }

    #[test]
    fn start_line_names_every_choice() {
        let changes = ChangeSet {
            admin: Some(AdminAction::Toggle),
            poe: Some(PoeAction::ToggleDownUp),
            vlan: None,
            description: Some(DescriptionChange {
                text: "desk".into(),
                mode: DescriptionMode::Append,
            }),
        };
        assert_eq!(
            changes.summary_line(),
            "Interface Status=Toggle, PoE Status=Down/Up, Vlan=None, Descr Type=Append, Descr=desk"
        );
    }
}
