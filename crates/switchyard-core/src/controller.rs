// ── Controller facade ──
//
// The operations callers invoke. Each one checks access before any device
// is contacted, resolves the session, does its work and records exactly
// one activity entry for its outcome. Bulk edits additionally record one
// entry per interface change.

use std::net::IpAddr;
use std::sync::Arc;

use regex::RegexBuilder;
use serde::Serialize;
use strum::{Display, EnumString};
use tracing::{debug, info, warn};

use crate::access::{
    self, GroupPermission, PermissionMap, SwitchSummary, rights_to_group_and_switch,
};
use crate::activity::{ActivityLog, ActivityRecorder, LogFilter};
use crate::bulk::BulkEditor;
use crate::catalog::{CommandCatalog, CommandDefinition, CommandTemplate};
use crate::command::{
    Command, CommandOutput, CommandResult, RunCommandRequest, TemplateRequest, VlanRequest,
};
use crate::config::{CoreConfig, DescriptionMode, EditPolicy};
use crate::counters::{Counter, CounterValue, Counters};
use crate::driver::{Capabilities, DriverFactory};
use crate::error::CoreError;
use crate::inventory::Inventory;
use crate::model::{
    Device, Interface, LogAction, LogEntry, LogType, PoeStatus, SwitchGroup, User, Vlan,
};
use crate::session::{DeviceSession, PoeCycleFailure, SessionManager, SessionStore, SwitchState};

// ── Request context ──────────────────────────────────────────────────

/// Who is asking, and from where.
#[derive(Debug, Clone)]
pub struct RequestContext {
    pub user: User,
    pub ip_address: Option<IpAddr>,
}

impl RequestContext {
    pub fn new(user: User) -> Self {
        Self {
            user,
            ip_address: None,
        }
    }

    #[must_use]
    pub fn from_address(mut self, ip: IpAddr) -> Self {
        self.ip_address = Some(ip);
        self
    }
}

/// Which part of the device to show.
#[derive(Debug, Clone, Copy, PartialEq, Eq, Default, Serialize, Display, EnumString)]
#[serde(rename_all = "lowercase")]
#[strum(serialize_all = "lowercase")]
pub enum View {
    #[default]
    Basic,
    Hardware,
    Clients,
}

// ── Results ──────────────────────────────────────────────────────────

#[derive(Debug, Clone, Serialize)]
pub struct SearchHit {
    pub group_id: u32,
    pub group_name: String,
    pub switch: SwitchSummary,
}

/// Everything shown for one device.
#[derive(Debug, Clone, Serialize)]
pub struct SwitchView {
    pub group: SwitchGroup,
    pub device: Device,
    pub view: View,
    pub state: SwitchState,
    pub allowed_vlans: Vec<Vlan>,
    pub capabilities: Capabilities,
    pub can_bulk_edit: bool,
    pub can_edit_vlans: bool,
    /// Catalog commands offered for this device.
    pub commands: Vec<CommandDefinition>,
    pub templates: Vec<CommandTemplate>,
    /// Recent non-viewing activity on this device.
    pub recent_activity: Vec<LogEntry>,
}

#[derive(Debug, Clone, Serialize)]
pub struct AdminStats {
    pub groups: usize,
    pub devices: usize,
    pub active_devices: usize,
    pub counters: Vec<CounterValue>,
}

// ── Controller ───────────────────────────────────────────────────────

/// What the controller is built from.
pub struct ControllerParts {
    pub config: CoreConfig,
    pub inventory: Arc<dyn Inventory>,
    pub sessions: Arc<dyn SessionStore>,
    pub drivers: Arc<dyn DriverFactory>,
    pub activity: Arc<dyn ActivityLog>,
    pub catalog: CommandCatalog,
}

/// Cheaply cloneable handle to the core.
#[derive(Clone)]
pub struct Controller {
    inner: Arc<ControllerInner>,
}

struct ControllerInner {
    config: CoreConfig,
    edit: Arc<EditPolicy>,
    inventory: Arc<dyn Inventory>,
    sessions: SessionManager,
    activity: Arc<dyn ActivityLog>,
    counters: Counters,
    catalog: CommandCatalog,
}

/// A device the caller may work on, with the recorder for its outcomes.
struct Target {
    group: SwitchGroup,
    device: Device,
    recorder: ActivityRecorder,
}

impl Controller {
    pub fn new(parts: ControllerParts) -> Result<Self, CoreError> {
        let edit = Arc::new(EditPolicy::compile(&parts.config)?);
        let sessions = SessionManager::new(
            parts.sessions,
            parts.drivers,
            parts.config.session_max_age,
        );
        Ok(Self {
            inner: Arc::new(ControllerInner {
                config: parts.config,
                edit,
                inventory: parts.inventory,
                sessions,
                activity: parts.activity,
                counters: Counters::new(),
                catalog: parts.catalog,
            }),
        })
    }

    pub fn config(&self) -> &CoreConfig {
        &self.inner.config
    }

    pub fn counters(&self) -> &Counters {
        &self.inner.counters
    }

    pub fn catalog(&self) -> &CommandCatalog {
        &self.inner.catalog
    }

    pub fn inventory(&self) -> &Arc<dyn Inventory> {
        &self.inner.inventory
    }

    fn recorder(&self, ctx: &RequestContext) -> ActivityRecorder {
        ActivityRecorder::new(
            Arc::clone(&self.inner.activity),
            ctx.user.name.clone(),
            ctx.ip_address,
        )
    }

    // ── Navigation ───────────────────────────────────────────────────

    /// The groups and switches the user may open, ordered by group name.
    ///
    /// This is the "home" view: cached device sessions of the user are
    /// dropped and the permission map is rebuilt.
    pub fn switch_groups(&self, ctx: &RequestContext) -> Result<Vec<GroupPermission>, CoreError> {
        let recorder = self.recorder(ctx);
        let permissions = self.rebuild_permissions(ctx).inspect_err(|e| {
            recorder.record_error(LogAction::ViewSwitchGroups, e);
        })?;

        self.inner.counters.increment(Counter::Views);
        recorder.record(
            LogAction::ViewSwitchGroups,
            LogType::View,
            "Viewing switch groups",
        );
        Ok(permissions.groups_by_name().into_iter().cloned().collect())
    }

    /// Switches whose name, hostname or description matches `pattern`
    /// (case-insensitive regular expression).
    pub fn search_switches(
        &self,
        ctx: &RequestContext,
        pattern: &str,
    ) -> Result<Vec<SearchHit>, CoreError> {
        let recorder = self.recorder(ctx);
        let re = match RegexBuilder::new(pattern).case_insensitive(true).build() {
            Ok(re) => re,
            Err(e) => {
                let err = CoreError::validation(format!("Invalid search pattern '{pattern}': {e}"));
                recorder.record_error(LogAction::ViewSwitchSearch, &err);
                return Err(err);
            }
        };
        let permissions = self.permissions(ctx).inspect_err(|e| {
            recorder.record_error(LogAction::ViewSwitchSearch, e);
        })?;

        let hits: Vec<SearchHit> = permissions
            .search(&re)
            .into_iter()
            .map(|(group, switch)| SearchHit {
                group_id: group.id,
                group_name: group.name.clone(),
                switch: switch.clone(),
            })
            .collect();

        self.inner.counters.increment(Counter::Views);
        recorder.record(
            LogAction::ViewSwitchSearch,
            LogType::View,
            format!("Searching for '{pattern}' ({} found)", hits.len()),
        );
        Ok(hits)
    }

    // ── Device views ─────────────────────────────────────────────────

    pub async fn view_switch(
        &self,
        ctx: &RequestContext,
        group_id: u32,
        device_id: u32,
        view: View,
    ) -> Result<SwitchView, CoreError> {
        self.show(ctx, group_id, device_id, view, LogAction::ViewSwitch)
            .await
    }

    /// Drop the cached state of the device and read it again.
    pub async fn reload_switch(
        &self,
        ctx: &RequestContext,
        group_id: u32,
        device_id: u32,
        view: View,
    ) -> Result<SwitchView, CoreError> {
        self.inner
            .sessions
            .clear_switch_cache(&ctx.user.name, device_id)?;
        self.show(ctx, group_id, device_id, view, LogAction::ReloadSwitch)
            .await
    }

    async fn show(
        &self,
        ctx: &RequestContext,
        group_id: u32,
        device_id: u32,
        view: View,
        action: LogAction,
    ) -> Result<SwitchView, CoreError> {
        let target = self.authorize(ctx, group_id, device_id, action)?;
        let mut session = self.open(ctx, &target).await?;

        let counters = &self.inner.counters;
        counters.increment(Counter::Views);
        let detail = match view {
            View::Basic => Ok(()),
            View::Hardware => {
                counters.increment(Counter::HardwareViews);
                session.get_hardware_details().await
            }
            View::Clients => {
                counters.increment(Counter::DetailViews);
                session.get_client_data().await
            }
        };

        self.persist(&session);
        session.close().await;

        match &detail {
            // the basic data is still shown; the warning is in the state
            Err(e) => target.recorder.record(
                action,
                LogType::Error,
                format!("{}: {}", e.description(), e.details()),
            ),
            Ok(()) => target.recorder.record(
                action,
                LogType::View,
                format!("Viewing switch ({view})"),
            ),
        }

        let recent_activity = self.recent_activity(device_id);
        Ok(self.build_view(&ctx.user, &target, &session, view, recent_activity))
    }

    fn build_view(
        &self,
        user: &User,
        target: &Target,
        session: &DeviceSession,
        view: View,
        recent_activity: Vec<LogEntry>,
    ) -> SwitchView {
        let capabilities = session.capabilities();
        let (commands, templates) = if capabilities.can_run_commands {
            (
                self.inner.catalog.commands().cloned().collect(),
                self.inner.catalog.templates().cloned().collect(),
            )
        } else {
            (Vec::new(), Vec::new())
        };
        SwitchView {
            group: target.group.clone(),
            device: target.device.clone(),
            view,
            state: session.state().clone(),
            allowed_vlans: session.allowed_vlans().values().cloned().collect(),
            capabilities,
            can_bulk_edit: access::user_can_bulkedit(user, &target.group, &target.device),
            can_edit_vlans: capabilities.can_edit_vlans
                && access::user_can_edit_vlans(user, &target.group, &target.device),
            commands,
            templates,
            recent_activity,
        }
    }

    /// Recent change, command and error entries for a device.
    pub fn device_activity(
        &self,
        ctx: &RequestContext,
        group_id: u32,
        device_id: u32,
    ) -> Result<Vec<LogEntry>, CoreError> {
        self.authorize(ctx, group_id, device_id, LogAction::ViewSwitch)?;
        Ok(self.recent_activity(device_id))
    }

    fn recent_activity(&self, device_id: u32) -> Vec<LogEntry> {
        let filter = LogFilter {
            min_type: Some(LogType::Change),
            ..LogFilter::for_device(device_id).limit(self.inner.config.recent_log_count)
        };
        self.inner.activity.query(&filter).unwrap_or_else(|e| {
            warn!(error = %e, "failed to read device activity");
            Vec::new()
        })
    }

    // ── Commands ─────────────────────────────────────────────────────

    /// Run one command against a device.
    pub async fn execute(
        &self,
        ctx: &RequestContext,
        group_id: u32,
        device_id: u32,
        cmd: Command,
    ) -> Result<CommandResult, CoreError> {
        let action = cmd.action();
        let target = self.authorize(ctx, group_id, device_id, action)?;
        self.check_rights(ctx, &target, &cmd, action)?;

        let mut session = self.open(ctx, &target).await?;
        debug!(device = %target.device.name, ?action, "executing command");

        let result = self.dispatch(&mut session, &target, cmd).await;

        self.persist(&session);
        session.close().await;

        if let Err(e) = &result {
            // bulk edits and precheck failures have logged already
            if action != LogAction::BulkEdit {
                self.inner.counters.increment(Counter::Errors);
                target.recorder.record_error(action, e);
            }
        }
        result
    }

    /// Permission checks that depend on what the command does.
    fn check_rights(
        &self,
        ctx: &RequestContext,
        target: &Target,
        cmd: &Command,
        action: LogAction,
    ) -> Result<(), CoreError> {
        let user = &ctx.user;
        let (group, device) = (&target.group, &target.device);
        let allowed = match cmd {
            Command::BulkEdit(_) => access::user_can_bulkedit(user, group, device),
            Command::CreateVlan(_) | Command::EditVlan(_) => {
                access::user_can_edit_vlans(user, group, device)
            }
            Command::DeleteVlan { .. } => {
                access::user_can_edit_vlans(user, group, device)
                    && access::user_can_delete_vlan(user)
            }
            Command::RunCommandString { .. } => user.is_admin(),
            _ if cmd.is_change() => access::user_can_change(user, group, device),
            _ => true,
        };
        if allowed {
            Ok(())
        } else {
            Err(self.deny(&target.recorder, action, "You do not have the rights for this change!"))
        }
    }

    async fn dispatch(
        &self,
        session: &mut DeviceSession,
        target: &Target,
        cmd: Command,
    ) -> Result<CommandResult, CoreError> {
        let rec = &target.recorder;
        let config = &self.inner.config;
        let counters = &self.inner.counters;

        match cmd {
            Command::SetAdminStatus { interface, status } => {
                let iface = manageable(session, &interface)?;
                let action = if status.is_up() {
                    LogAction::InterfaceUp
                } else {
                    LogAction::InterfaceDown
                };
                if iface.admin_status == status {
                    let message = format!("Interface {}: Ignored - already {status}", iface.name);
                    rec.record_interface(action, LogType::Change, &iface.name, message.clone());
                    return Ok(CommandResult::Ignored { message });
                }
                session.set_admin_status(&interface, status).await?;
                let word = if status.is_up() { "Enabled" } else { "Disabled" };
                Ok(self.changed(rec, action, &iface, format!("Interface {}: {word}", iface.name)))
            }

            Command::InterfaceDownUp { interface } => {
                let iface = manageable(session, &interface)?;
                session
                    .interface_down_up(&interface, config.port_toggle_delay)
                    .await?;
                Ok(self.changed(
                    rec,
                    LogAction::InterfaceDownUp,
                    &iface,
                    format!("Interface {}: Down/Up OK", iface.name),
                ))
            }

            Command::SetPoe { interface, status } => {
                let iface = poe_capable(session, &interface)?;
                let action = if status.is_enabled() {
                    LogAction::PoeUp
                } else {
                    LogAction::PoeDown
                };
                if iface.poe_status() == Some(status) {
                    let message = format!("Interface {}: Ignored, PoE already {status}", iface.name);
                    rec.record_interface(action, LogType::Warning, &iface.name, message.clone());
                    return Ok(CommandResult::Ignored { message });
                }
                session.set_poe_status(&interface, status).await?;
                Ok(self.changed(rec, action, &iface, format!("Interface {}: PoE {status}", iface.name)))
            }

            Command::PoeDownUp { interface } => {
                let iface = poe_capable(session, &interface)?;
                if iface.poe_status() != Some(PoeStatus::Enabled) {
                    let message =
                        format!("Interface {}: PoE Down/Up IGNORED, PoE NOT enabled", iface.name);
                    rec.record_interface(LogAction::PoeToggle, LogType::Warning, &iface.name, message.clone());
                    return Ok(CommandResult::Ignored { message });
                }
                session
                    .poe_down_up(&interface, config.poe_toggle_delay)
                    .await
                    .map_err(PoeCycleFailure::into_error)?;
                counters.increment(Counter::Changes);
                let message = format!("Interface {}: PoE Toggle Down/Up OK", iface.name);
                rec.record_interface(LogAction::PoeToggle, LogType::Change, &iface.name, message.clone());
                Ok(CommandResult::Changed { message })
            }

            Command::SetUntaggedVlan { interface, vlan } => {
                let iface = manageable(session, &interface)?;
                if !session.vlan_allowed(vlan) {
                    return Err(CoreError::validation(format!("New vlan '{vlan}' is not allowed!")));
                }
                if iface.untagged_vlan == vlan {
                    let message = format!("Interface {}: Ignored, VLAN already {vlan}", iface.name);
                    rec.record_interface(LogAction::PvidChange, LogType::Warning, &iface.name, message.clone());
                    return Ok(CommandResult::Ignored { message });
                }
                session.set_untagged_vlan(&interface, vlan).await?;
                Ok(self.changed(
                    rec,
                    LogAction::PvidChange,
                    &iface,
                    format!("Interface {}: Vlan set to {vlan}", iface.name),
                ))
            }

            Command::SetDescription {
                interface,
                description,
            } => {
                let iface = manageable(session, &interface)?;
                let policy = session.edit_policy();
                if policy.is_denied(&description) {
                    return Err(CoreError::validation(format!(
                        "Description not allowed: {description}"
                    )));
                }
                if !iface.can_edit_description {
                    return Err(CoreError::validation(format!(
                        "The description of interface {} cannot be changed",
                        iface.name
                    )));
                }
                let text = policy.compose(&iface.description, &description, DescriptionMode::Replace);
                if text == iface.description {
                    let message = format!("Interface {}: Description is the same, nothing changed", iface.name);
                    rec.record_interface(LogAction::AliasChange, LogType::Warning, &iface.name, message.clone());
                    return Ok(CommandResult::Ignored { message });
                }
                session.set_description(&interface, &text).await?;
                Ok(self.changed(
                    rec,
                    LogAction::AliasChange,
                    &iface,
                    format!("Interface {}: Descr set to '{text}'", iface.name),
                ))
            }

            Command::CreateVlan(VlanRequest { id, name }) => {
                session.vlan_create(id, &name).await?;
                Ok(self.vlan_changed(rec, LogAction::VlanCreate, format!("VLAN {id} ({name}) created")))
            }

            Command::EditVlan(VlanRequest { id, name }) => {
                session.vlan_edit(id, &name).await?;
                Ok(self.vlan_changed(rec, LogAction::VlanEdit, format!("VLAN {id} renamed to '{name}'")))
            }

            Command::DeleteVlan { id } => {
                session.vlan_delete(id).await?;
                Ok(self.vlan_changed(rec, LogAction::VlanDelete, format!("VLAN {id} deleted")))
            }

            Command::SaveConfig => {
                session.save_running_config().await?;
                let message = "Configuration saved".to_owned();
                rec.record(LogAction::SaveSwitch, LogType::Change, message.clone());
                Ok(CommandResult::Changed { message })
            }

            Command::RunCommand(RunCommandRequest {
                command_id,
                interface,
            }) => {
                let definition = self.inner.catalog.command(command_id)?;
                let if_name = match interface.as_deref() {
                    Some(key) => Some(
                        session
                            .get_interface_by_key(key)
                            .map(|i| i.name.clone())
                            .ok_or_else(|| CoreError::InterfaceNotFound { key: key.into() })?,
                    ),
                    None => None,
                };
                let command = definition.render(if_name.as_deref())?;
                self.run(session, rec, command).await
            }

            Command::RunCommandString { command } => self.run(session, rec, command).await,

            Command::RunTemplate(TemplateRequest {
                template_id,
                values,
            }) => {
                let template = self.inner.catalog.template(template_id)?;
                let command = template.render(&values)?;
                let result = self.run(session, rec, command).await?;
                match result {
                    CommandResult::Output(CommandOutput { command, output }) => {
                        Ok(CommandResult::Output(CommandOutput {
                            output: template.interpret(&output)?,
                            command,
                        }))
                    }
                    other => Ok(other),
                }
            }

            Command::BulkEdit(request) => {
                let summary = BulkEditor::new(session, rec, counters, config.poe_toggle_delay)
                    .run(&request)
                    .await?;
                info!(
                    success = summary.success_count,
                    errors = summary.error_count,
                    "bulk edit done"
                );
                Ok(CommandResult::BulkEdit(summary))
            }
        }
    }

    fn changed(
        &self,
        rec: &ActivityRecorder,
        action: LogAction,
        iface: &Interface,
        message: String,
    ) -> CommandResult {
        self.inner.counters.increment(Counter::Changes);
        rec.record_interface(action, LogType::Change, &iface.name, message.clone());
        CommandResult::Changed { message }
    }

    fn vlan_changed(
        &self,
        rec: &ActivityRecorder,
        action: LogAction,
        message: String,
    ) -> CommandResult {
        self.inner.counters.increment(Counter::VlanManage);
        self.inner.counters.increment(Counter::Changes);
        rec.record(action, LogType::Change, message.clone());
        CommandResult::Changed { message }
    }

    async fn run(
        &self,
        session: &mut DeviceSession,
        rec: &ActivityRecorder,
        command: String,
    ) -> Result<CommandResult, CoreError> {
        self.inner.counters.increment(Counter::Commands);
        let output = session.run_command(&command).await?;
        rec.record(LogAction::ExecuteCommand, LogType::Command, command.clone());
        Ok(CommandResult::Output(CommandOutput { command, output }))
    }

    // ── Administration ───────────────────────────────────────────────

    /// The activity log. Staff only.
    pub fn activity(
        &self,
        ctx: &RequestContext,
        filter: &LogFilter,
    ) -> Result<Vec<LogEntry>, CoreError> {
        let recorder = self.recorder(ctx);
        if !ctx.user.is_admin() {
            return Err(self.deny(
                &recorder,
                LogAction::ViewAllLogs,
                "You do not have access to the logs!",
            ));
        }
        let entries = self.inner.activity.query(filter).inspect_err(|e| {
            recorder.record_error(LogAction::ViewAllLogs, e);
        })?;
        recorder.record(LogAction::ViewAllLogs, LogType::View, "Viewing activity logs");
        Ok(entries)
    }

    /// Usage counters and inventory totals. Staff only.
    pub fn admin_stats(&self, ctx: &RequestContext) -> Result<AdminStats, CoreError> {
        let recorder = self.recorder(ctx);
        if !ctx.user.is_admin() {
            return Err(self.deny(
                &recorder,
                LogAction::ViewAdminStats,
                "You do not have access to statistics!",
            ));
        }
        let devices = self.inner.inventory.devices();
        let stats = AdminStats {
            groups: self.inner.inventory.groups().len(),
            devices: devices.len(),
            active_devices: devices.iter().filter(|d| d.is_active()).count(),
            counters: self.inner.counters.snapshot(),
        };
        recorder.record(
            LogAction::ViewAdminStats,
            LogType::View,
            "Viewing usage statistics",
        );
        Ok(stats)
    }

    // ── Internals ────────────────────────────────────────────────────

    fn rebuild_permissions(&self, ctx: &RequestContext) -> Result<PermissionMap, CoreError> {
        let user = &ctx.user.name;
        self.inner.sessions.clear_user(user)?;
        let inventory = &self.inner.inventory;
        let map = PermissionMap::build(&ctx.user, &inventory.groups(), &inventory.devices());
        let blob = serde_json::to_string(&map)
            .map_err(|e| CoreError::Internal(format!("cannot serialize permissions: {e}")))?;
        self.inner.sessions.store().store_permissions(user, blob)?;
        Ok(map)
    }

    /// The cached permission map, rebuilt when missing or unreadable.
    fn permissions(&self, ctx: &RequestContext) -> Result<PermissionMap, CoreError> {
        let store = self.inner.sessions.store();
        if let Some(blob) = store.load_permissions(&ctx.user.name)? {
            match serde_json::from_str(&blob) {
                Ok(map) => return Ok(map),
                Err(e) => warn!(user = %ctx.user.name, error = %e, "discarding unreadable permissions"),
            }
        }
        self.rebuild_permissions(ctx)
    }

    fn authorize(
        &self,
        ctx: &RequestContext,
        group_id: u32,
        device_id: u32,
        action: LogAction,
    ) -> Result<Target, CoreError> {
        let recorder = self.recorder(ctx).for_device(group_id, device_id);
        let inventory = &self.inner.inventory;

        let lookup = inventory.group(group_id).and_then(|group| {
            let device = inventory.device(device_id)?;
            if device.group_id == group_id {
                Ok((group, device))
            } else {
                Err(CoreError::DeviceNotFound {
                    identifier: format!("{device_id} in group {group_id}"),
                })
            }
        });
        let (group, device) = lookup.inspect_err(|e| recorder.record_error(action, e))?;

        let permissions = self
            .permissions(ctx)
            .inspect_err(|e| recorder.record_error(action, e))?;
        if !rights_to_group_and_switch(&ctx.user, &permissions, group_id, device_id) {
            return Err(self.deny(&recorder, action, "You do not have access to this device!"));
        }

        Ok(Target {
            group,
            device,
            recorder,
        })
    }

    fn deny(&self, recorder: &ActivityRecorder, action: LogAction, message: &str) -> CoreError {
        self.inner.counters.increment(Counter::AccessDenied);
        self.inner.counters.increment(Counter::Errors);
        recorder.record(action, LogType::Error, format!("Access denied: {message}"));
        CoreError::AccessDenied {
            message: message.to_owned(),
        }
    }

    async fn open(
        &self,
        ctx: &RequestContext,
        target: &Target,
    ) -> Result<DeviceSession, CoreError> {
        let policy = access::session_policy(
            &ctx.user,
            &target.group,
            Arc::clone(&self.inner.edit),
            self.inner.config.always_allow_poe_toggle,
        );
        self.inner
            .sessions
            .open(&ctx.user.name, &target.device, policy)
            .await
            .inspect_err(|e| {
                self.inner.counters.increment(Counter::Errors);
                target.recorder.record(
                    LogAction::ConnectionError,
                    LogType::Error,
                    format!("Could not get connection: {}", e.description()),
                );
            })
    }

    fn persist(&self, session: &DeviceSession) {
        if let Err(e) = self.inner.sessions.save_cache(session) {
            warn!(session = %session.key(), error = %e, "failed to cache session");
        }
    }
}

/// Interface the user may change, by key.
fn manageable(session: &DeviceSession, key: &str) -> Result<Interface, CoreError> {
    let iface = session
        .get_interface_by_key(key)
        .cloned()
        .ok_or_else(|| CoreError::InterfaceNotFound { key: key.into() })?;
    if iface.manageable {
        Ok(iface)
    } else {
        Err(CoreError::validation(format!(
            "Interface {} is not manageable: {}",
            iface.name,
            iface.unmanage_reason.as_deref().unwrap_or("no reason given")
        )))
    }
}

/// PoE-capable interface; unmanageable ones pass when PoE changes are
/// allowed everywhere.
fn poe_capable(session: &DeviceSession, key: &str) -> Result<Interface, CoreError> {
    let iface = match manageable(session, key) {
        Ok(iface) => iface,
        Err(CoreError::Validation { .. }) if session.poe_override() => session
            .get_interface_by_key(key)
            .cloned()
            .ok_or_else(|| CoreError::InterfaceNotFound { key: key.into() })?,
        Err(e) => return Err(e),
    };
    if iface.poe.is_none() {
        return Err(CoreError::validation(format!(
            "Interface {} is not PoE capable",
            iface.name
        )));
    }
    Ok(iface)
}

#[cfg(test)]
#[allow(clippy::unwrap_used)]
mod tests {
    use super::*;

    #[test]
    fn view_names_parse() {
        assert_eq!("hardware".parse::<View>().unwrap(), View::Hardware);
        assert_eq!(View::Clients.to_string(), "clients");
    }
}
