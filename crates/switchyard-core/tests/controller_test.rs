#![allow(clippy::unwrap_used)]
// End-to-end tests for `Controller` against simulated lab switches.

use std::collections::{BTreeMap, BTreeSet};
use std::sync::Arc;

use pretty_assertions::assert_eq;

use switchyard_core::driver::{DummyLab, DummyOp};
use switchyard_core::{
    ActivityLog, AdminAction, BulkEditRequest, ChangeSet, Command, CommandCatalog,
    CommandDefinition, CommandKind, CommandResult, CommandTemplate, ConnectorKind, Controller,
    ControllerParts, CoreConfig, CoreError, Device, DeviceStatus, LogAction, LogFilter, LogType,
    MemoryActivityLog, MemorySessionStore, PoeStatus, PortStatus, RequestContext, RunCommandRequest,
    StaticInventory, SwitchGroup, TemplateRequest, TransportFactory, User, View, VlanRequest,
};
use switchyard_core::catalog::TemplateField;

// ── Helpers ─────────────────────────────────────────────────────────

struct Lab {
    controller: Controller,
    lab: DummyLab,
    log: Arc<MemoryActivityLog>,
}

fn group(id: u32, name: &str, members: &[&str], vlans: &[u16]) -> SwitchGroup {
    SwitchGroup {
        id,
        name: name.into(),
        description: None,
        members: members.iter().map(|m| (*m).to_owned()).collect(),
        vlans: vlans.iter().copied().collect::<BTreeSet<_>>(),
        allow_all_vlans: false,
        read_only: false,
        bulk_edit: true,
        edit_vlans: true,
        allow_poe_toggle: false,
    }
}

fn device(id: u32, group_id: u32, name: &str) -> Device {
    Device {
        id,
        name: name.into(),
        hostname: format!("{name}.lab.example"),
        group_id,
        connector: ConnectorKind::TestDummy,
        status: DeviceStatus::Active,
        description: Some(format!("{name} closet")),
        read_only: false,
        snmp_profile: None,
        ssh_profile: None,
        api_profile: None,
    }
}

fn alice() -> RequestContext {
    let mut user = User::new("alice");
    user.bulk_edit = true;
    user.edit_vlans = true;
    RequestContext::new(user)
}

fn setup_with(config: CoreConfig) -> Lab {
    let inventory = StaticInventory::new(
        vec![
            group(1, "Library", &["alice"], &[10, 30]),
            group(2, "Dorms", &["bob"], &[10]),
        ],
        vec![device(1, 1, "lib-sw1"), device(2, 2, "dorm-sw1")],
        vec![User::new("alice"), User::new("bob")],
    );
    let lab = DummyLab::new();
    let log = Arc::new(MemoryActivityLog::new());
    let catalog = CommandCatalog::new(
        [CommandDefinition {
            id: 1,
            name: "interface counters".into(),
            description: None,
            kind: CommandKind::Interface,
            command: "show interface {interface} counters".into(),
        }],
        [CommandTemplate {
            id: 1,
            name: "mac lookup".into(),
            description: None,
            template: "show mac address-table address {{mac}}".into(),
            fields: vec![TemplateField {
                name: "mac".into(),
                label: Some("MAC address".into()),
                regex: "[0-9a-f:]{17}".into(),
            }],
            lists: Vec::new(),
            output_match_regex: Some("dummy output".into()),
            output_match_text: Some("Found".into()),
            output_fail_text: None,
            output_lines_keep_regex: None,
        }],
    );
    let controller = Controller::new(ControllerParts {
        config,
        inventory: Arc::new(inventory),
        sessions: Arc::new(MemorySessionStore::new()),
        drivers: Arc::new(TransportFactory::default().with_lab(lab.clone())),
        activity: log.clone() as Arc<dyn ActivityLog>,
        catalog,
    })
    .unwrap();
    Lab {
        controller,
        lab,
        log,
    }
}

fn setup() -> Lab {
    setup_with(CoreConfig::default())
}

impl Lab {
    fn latest(&self) -> switchyard_core::LogEntry {
        self.log.entries().into_iter().next().unwrap()
    }
}

// ── Navigation ──────────────────────────────────────────────────────

#[tokio::test]
async fn groups_show_only_membership() {
    let t = setup();
    let groups = t.controller.switch_groups(&alice()).unwrap();

    assert_eq!(groups.len(), 1);
    assert_eq!(groups[0].name, "Library");
    assert_eq!(t.latest().action, LogAction::ViewSwitchGroups);
    assert_eq!(t.latest().description, "Viewing switch groups");
}

#[tokio::test]
async fn search_matches_hostnames_case_insensitively() {
    let t = setup();
    let hits = t.controller.search_switches(&alice(), "LIB-").unwrap();
    assert_eq!(hits.len(), 1);
    assert_eq!(hits[0].switch.name, "lib-sw1");

    let err = t.controller.search_switches(&alice(), "(").unwrap_err();
    assert!(matches!(err, CoreError::Validation { .. }));
    assert_eq!(t.latest().log_type, LogType::Error);
}

// ── Access ──────────────────────────────────────────────────────────

#[tokio::test]
async fn foreign_switch_is_denied_before_any_device_call() {
    let t = setup();
    let err = t
        .controller
        .view_switch(&alice(), 2, 2, View::Basic)
        .await
        .unwrap_err();

    assert!(matches!(err, CoreError::AccessDenied { .. }));
    assert_eq!(t.log.entries().len(), 1);
    assert_eq!(t.latest().log_type, LogType::Error);
    assert!(t.lab.device(2, "dorm-sw1").calls().is_empty());
    assert_eq!(
        t.controller
            .counters()
            .get(switchyard_core::Counter::AccessDenied),
        1
    );
}

#[tokio::test]
async fn read_only_user_cannot_change() {
    let t = setup();
    let mut ctx = alice();
    ctx.user.read_only = true;
    let err = t
        .controller
        .execute(
            &ctx,
            1,
            1,
            Command::SetAdminStatus {
                interface: "1".into(),
                status: PortStatus::Down,
            },
        )
        .await
        .unwrap_err();
    assert!(matches!(err, CoreError::AccessDenied { .. }));
    assert!(t.lab.device(1, "lib-sw1").calls().is_empty());
}

// ── Views ───────────────────────────────────────────────────────────

#[tokio::test]
async fn view_reads_once_and_then_serves_cache() {
    let t = setup();
    let view = t
        .controller
        .view_switch(&alice(), 1, 1, View::Basic)
        .await
        .unwrap();
    assert_eq!(view.state.interfaces.len(), 9);
    assert_eq!(
        view.allowed_vlans.iter().map(|v| v.id).collect::<Vec<_>>(),
        vec![10, 30]
    );
    assert!(view.can_bulk_edit);
    assert_eq!(view.commands.len(), 1);

    // break the device: a cached session does not notice
    t.lab.device(1, "lib-sw1").fail(DummyOp::ReadBasic, None);
    t.controller
        .view_switch(&alice(), 1, 1, View::Basic)
        .await
        .unwrap();

    // a reload does
    let err = t
        .controller
        .reload_switch(&alice(), 1, 1, View::Basic)
        .await
        .unwrap_err();
    assert_eq!(err.description(), "Simulated ReadBasic failure");
    assert_eq!(t.latest().action, LogAction::ConnectionError);
}

#[tokio::test]
async fn failed_client_read_keeps_basic_view() {
    let t = setup();
    t.lab.device(1, "lib-sw1").fail(DummyOp::ReadClients, None);
    let view = t
        .controller
        .view_switch(&alice(), 1, 1, View::Clients)
        .await
        .unwrap();
    assert_eq!(view.state.interfaces.len(), 9);
    assert_eq!(view.state.warnings.len(), 1);
    assert_eq!(t.latest().log_type, LogType::Error);
}

// ── Single changes ──────────────────────────────────────────────────

#[tokio::test]
async fn admin_change_is_applied_and_logged() {
    let t = setup();
    let result = t
        .controller
        .execute(
            &alice(),
            1,
            1,
            Command::SetAdminStatus {
                interface: "3".into(),
                status: PortStatus::Down,
            },
        )
        .await
        .unwrap();

    assert_eq!(result.message(), Some("Interface Gi1/0/3: Disabled"));
    assert_eq!(
        t.lab.device(1, "lib-sw1").interface("3").unwrap().admin_status,
        PortStatus::Down
    );
    let entry = t.latest();
    assert_eq!(entry.action, LogAction::InterfaceDown);
    assert_eq!(entry.if_name.as_deref(), Some("Gi1/0/3"));

    // the cached session reflects the change
    let view = t
        .controller
        .view_switch(&alice(), 1, 1, View::Basic)
        .await
        .unwrap();
    assert_eq!(view.state.interfaces["3"].admin_status, PortStatus::Down);
    assert!(view.state.save_needed);
}

#[tokio::test]
async fn admin_change_to_current_state_is_ignored() {
    let t = setup();
    let result = t
        .controller
        .execute(
            &alice(),
            1,
            1,
            Command::SetAdminStatus {
                interface: "2".into(),
                status: PortStatus::Down,
            },
        )
        .await
        .unwrap();
    assert!(matches!(result, CommandResult::Ignored { .. }));
    assert!(t.lab.device(1, "lib-sw1").calls().is_empty());
    assert_eq!(
        t.latest().description,
        "Interface Gi1/0/2: Ignored - already Down"
    );
}

#[tokio::test]
async fn poe_change_to_current_state_is_logged_as_warning() {
    let t = setup();
    let result = t
        .controller
        .execute(
            &alice(),
            1,
            1,
            Command::SetPoe {
                interface: "1".into(),
                status: PoeStatus::Enabled,
            },
        )
        .await
        .unwrap();
    assert!(matches!(result, CommandResult::Ignored { .. }));
    assert!(t.lab.device(1, "lib-sw1").calls().is_empty());

    let entry = t.latest();
    assert_eq!(entry.action, LogAction::PoeUp);
    assert_eq!(entry.log_type, LogType::Warning);
    assert_eq!(entry.description, "Interface Gi1/0/1: Ignored, PoE already Enabled");
}

#[tokio::test]
async fn same_description_twice_warns_without_device_call() {
    let t = setup();
    let set = || Command::SetDescription {
        interface: "4".into(),
        description: "printer".into(),
    };
    t.controller.execute(&alice(), 1, 1, set()).await.unwrap();
    let dev = t.lab.device(1, "lib-sw1");
    assert_eq!(dev.calls().len(), 1);

    let result = t.controller.execute(&alice(), 1, 1, set()).await.unwrap();
    assert!(matches!(result, CommandResult::Ignored { .. }));
    assert_eq!(dev.calls().len(), 1);
    assert_eq!(t.latest().log_type, LogType::Warning);
}

#[tokio::test]
async fn vlan_outside_group_is_rejected() {
    let t = setup();
    let err = t
        .controller
        .execute(
            &alice(),
            1,
            1,
            Command::SetUntaggedVlan {
                interface: "1".into(),
                vlan: 20,
            },
        )
        .await
        .unwrap_err();
    assert_eq!(err.description(), "New vlan '20' is not allowed!");
    assert_eq!(t.latest().log_type, LogType::Error);
}

#[tokio::test]
async fn vlan_ids_out_of_range_never_reach_the_device() {
    let t = setup();
    for id in [0, 1, 4095] {
        let err = t
            .controller
            .execute(
                &alice(),
                1,
                1,
                Command::CreateVlan(VlanRequest {
                    id,
                    name: "bad".into(),
                }),
            )
            .await
            .unwrap_err();
        assert!(matches!(err, CoreError::Validation { .. }), "vlan {id}");
    }
    assert!(t.lab.device(1, "lib-sw1").calls().is_empty());
}

#[tokio::test]
async fn vlan_delete_needs_superuser() {
    let t = setup();
    let err = t
        .controller
        .execute(&alice(), 1, 1, Command::DeleteVlan { id: 30 })
        .await
        .unwrap_err();
    assert!(matches!(err, CoreError::AccessDenied { .. }));

    let root = RequestContext::new(User::superuser("root"));
    t.controller
        .execute(&root, 1, 1, Command::DeleteVlan { id: 30 })
        .await
        .unwrap();
    assert!(t.lab.device(1, "lib-sw1").vlan(30).is_none());
    assert_eq!(t.latest().action, LogAction::VlanDelete);
}

#[tokio::test]
async fn save_clears_the_pending_flag() {
    let t = setup();
    let err = t
        .controller
        .execute(&alice(), 1, 1, Command::SaveConfig)
        .await
        .unwrap_err();
    assert_eq!(
        err.description(),
        "This switch model cannot save or does not need to save the config"
    );

    t.controller
        .execute(
            &alice(),
            1,
            1,
            Command::SetAdminStatus {
                interface: "3".into(),
                status: PortStatus::Down,
            },
        )
        .await
        .unwrap();
    t.controller
        .execute(&alice(), 1, 1, Command::SaveConfig)
        .await
        .unwrap();
    assert_eq!(t.latest().action, LogAction::SaveSwitch);
    let view = t
        .controller
        .view_switch(&alice(), 1, 1, View::Basic)
        .await
        .unwrap();
    assert!(!view.state.save_needed);
}

// ── Commands ────────────────────────────────────────────────────────

#[tokio::test]
async fn interface_command_uses_interface_name() {
    let t = setup();
    let result = t
        .controller
        .execute(
            &alice(),
            1,
            1,
            Command::RunCommand(RunCommandRequest {
                command_id: 1,
                interface: Some("4".into()),
            }),
        )
        .await
        .unwrap();
    let CommandResult::Output(out) = result else {
        panic!("expected output");
    };
    assert_eq!(out.command, "show interface Gi1/0/4 counters");
    assert!(out.output.contains("dummy output"));
    assert_eq!(t.latest().log_type, LogType::Command);
}

#[tokio::test]
async fn template_output_is_interpreted() {
    let t = setup();
    let request = TemplateRequest {
        template_id: 1,
        values: BTreeMap::from([("mac".to_owned(), "b8:27:eb:01:02:03".to_owned())]),
    };
    let result = t
        .controller
        .execute(&alice(), 1, 1, Command::RunTemplate(request))
        .await
        .unwrap();
    let CommandResult::Output(out) = result else {
        panic!("expected output");
    };
    assert_eq!(out.output, "Found");

    let bad = TemplateRequest {
        template_id: 1,
        values: BTreeMap::from([("mac".to_owned(), "nope".to_owned())]),
    };
    let err = t
        .controller
        .execute(&alice(), 1, 1, Command::RunTemplate(bad))
        .await
        .unwrap_err();
    assert_eq!(err.details(), "MAC address - Invalid entry: nope");
}

// ── Bulk edit ───────────────────────────────────────────────────────

#[tokio::test]
async fn bulk_edit_end_to_end() {
    let t = setup();
    let request = BulkEditRequest {
        interfaces: vec!["1".into(), "2".into(), "3".into()],
        changes: ChangeSet {
            admin: Some(AdminAction::Down),
            ..ChangeSet::default()
        },
    };
    let result = t
        .controller
        .execute(&alice(), 1, 1, Command::BulkEdit(request))
        .await
        .unwrap();
    let CommandResult::BulkEdit(summary) = result else {
        panic!("expected bulk summary");
    };
    assert_eq!(summary.success_count, 2);
    assert_eq!(summary.error_count, 0);
    assert_eq!(summary.outputs.len(), 3);
    assert!(summary.outputs[1].contains("already Down"));

    let bulk_logs = t
        .log
        .query(&LogFilter {
            action: Some(LogAction::BulkEdit),
            ..LogFilter::default()
        })
        .unwrap();
    assert_eq!(bulk_logs.len(), 1);
    assert_eq!(bulk_logs[0].description, "Bulk Edits OK!");

    let view = t
        .controller
        .view_switch(&alice(), 1, 1, View::Basic)
        .await
        .unwrap();
    assert!(view.state.save_needed);
}

// ── Administration ──────────────────────────────────────────────────

#[tokio::test]
async fn logs_and_stats_are_staff_only() {
    let t = setup();
    assert!(matches!(
        t.controller.activity(&alice(), &LogFilter::default()),
        Err(CoreError::AccessDenied { .. })
    ));

    let mut staff = User::new("carol");
    staff.is_staff = true;
    let ctx = RequestContext::new(staff);
    let entries = t.controller.activity(&ctx, &LogFilter::default()).unwrap();
    assert_eq!(entries.len(), 1);

    let stats = t.controller.admin_stats(&ctx).unwrap();
    assert_eq!(stats.devices, 2);
    assert_eq!(stats.groups, 2);
    assert_eq!(t.latest().action, LogAction::ViewAdminStats);
}
