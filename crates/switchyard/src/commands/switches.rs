//! Switch navigation and views: groups, search, show, reload.

use std::time::Duration;

use tabled::Tabled;

use switchyard_core::{GroupPermission, HardwareEntry, Interface, SearchHit, SwitchView, View};

use crate::cli::{ShowArgs, ViewArg};
use crate::context::Context;
use crate::error::CliError;
use crate::output;

use super::util;

// ── Table rows ──────────────────────────────────────────────────────

#[derive(Tabled)]
struct SwitchRow {
    #[tabled(rename = "Group")]
    group: String,
    #[tabled(rename = "ID")]
    id: u32,
    #[tabled(rename = "Name")]
    name: String,
    #[tabled(rename = "Hostname")]
    hostname: String,
    #[tabled(rename = "Connector")]
    connector: String,
    #[tabled(rename = "Description")]
    description: String,
}

#[derive(Tabled)]
struct InterfaceRow {
    #[tabled(rename = "Key")]
    key: String,
    #[tabled(rename = "Name")]
    name: String,
    #[tabled(rename = "Admin")]
    admin: String,
    #[tabled(rename = "Link")]
    link: String,
    #[tabled(rename = "Speed")]
    speed: String,
    #[tabled(rename = "VLAN")]
    vlan: String,
    #[tabled(rename = "PoE")]
    poe: String,
    #[tabled(rename = "Description")]
    description: String,
    #[tabled(rename = "Notes")]
    notes: String,
}

impl From<&Interface> for InterfaceRow {
    fn from(i: &Interface) -> Self {
        let mut vlan = i.untagged_vlan.to_string();
        if !i.tagged_vlans.is_empty() {
            vlan.push_str(" +T");
        }
        let mut notes = Vec::new();
        if let Some(master) = &i.lacp_master_name {
            notes.push(format!("member of {master}"));
        }
        if !i.manageable {
            notes.push(i.unmanage_reason.clone().unwrap_or_else(|| "read-only".into()));
        }
        Self {
            key: i.key.clone(),
            name: i.name.clone(),
            admin: i.admin_status.to_string(),
            link: i.oper_status.to_string(),
            speed: speed(i.speed_mbps),
            vlan,
            poe: i.poe.as_ref().map_or_else(String::new, |p| {
                p.power_consumed_mw.map_or_else(
                    || p.admin_status.to_string(),
                    |mw| format!("{} {:.1}W", p.admin_status, f64::from(mw) / 1000.0),
                )
            }),
            description: i.description.clone(),
            notes: notes.join("; "),
        }
    }
}

#[derive(Tabled)]
struct VlanRow {
    #[tabled(rename = "VLAN")]
    id: u16,
    #[tabled(rename = "Name")]
    name: String,
    #[tabled(rename = "Allowed")]
    allowed: String,
}

#[derive(Tabled)]
struct HardwareRow {
    #[tabled(rename = "Class")]
    class: String,
    #[tabled(rename = "Name")]
    name: String,
    #[tabled(rename = "Model")]
    model: String,
    #[tabled(rename = "Serial")]
    serial: String,
    #[tabled(rename = "HW")]
    hardware_rev: String,
    #[tabled(rename = "SW")]
    software_rev: String,
}

impl From<&HardwareEntry> for HardwareRow {
    fn from(h: &HardwareEntry) -> Self {
        Self {
            class: h.class.to_string(),
            name: if h.name.is_empty() {
                h.description.clone()
            } else {
                h.name.clone()
            },
            model: h.model.clone(),
            serial: h.serial.clone(),
            hardware_rev: h.hardware_rev.clone(),
            software_rev: if h.software_rev.is_empty() {
                h.firmware_rev.clone()
            } else {
                h.software_rev.clone()
            },
        }
    }
}

#[derive(Tabled)]
struct ClientRow {
    #[tabled(rename = "Interface")]
    interface: String,
    #[tabled(rename = "MAC")]
    mac: String,
    #[tabled(rename = "Vendor")]
    vendor: String,
    #[tabled(rename = "IPv4")]
    ipv4: String,
    #[tabled(rename = "VLAN")]
    vlan: String,
}

#[derive(Tabled)]
struct NeighborRow {
    #[tabled(rename = "Interface")]
    interface: String,
    #[tabled(rename = "System")]
    system: String,
    #[tabled(rename = "Port")]
    port: String,
    #[tabled(rename = "Chassis")]
    chassis: String,
    #[tabled(rename = "Capabilities")]
    capabilities: String,
}

#[derive(Tabled)]
struct ActivityRow {
    #[tabled(rename = "When")]
    when: String,
    #[tabled(rename = "User")]
    user: String,
    #[tabled(rename = "Type")]
    log_type: String,
    #[tabled(rename = "Description")]
    description: String,
}

fn speed(mbps: u64) -> String {
    match mbps {
        0 => String::new(),
        m if m >= 1000 && m % 1000 == 0 => format!("{}G", m / 1000),
        m => format!("{m}M"),
    }
}

// ── Groups & search ─────────────────────────────────────────────────

fn switch_rows(groups: &[GroupPermission]) -> Vec<SwitchRow> {
    groups
        .iter()
        .flat_map(|g| {
            let label = if g.read_only {
                format!("{} (read-only)", g.name)
            } else {
                g.name.clone()
            };
            g.switches.values().map(move |s| SwitchRow {
                group: label.clone(),
                id: s.id,
                name: s.name.clone(),
                hostname: s.hostname.clone(),
                connector: s.connector.to_string(),
                description: s.description.clone().unwrap_or_default(),
            })
        })
        .collect()
}

pub fn groups(ctx: &Context) -> Result<(), CliError> {
    let groups = ctx.controller.switch_groups(&ctx.request)?;
    let out = output::render_single(
        ctx.output,
        &groups,
        |g| {
            if g.is_empty() {
                "You are not a member of any switch group.".into()
            } else {
                output::section("Switches", &switch_rows(g))
            }
        },
        |g| {
            g.iter()
                .flat_map(|group| group.switches.values().map(|s| s.name.clone()))
                .collect::<Vec<_>>()
                .join("\n")
        },
    )?;
    output::print_output(&out, ctx.quiet);
    Ok(())
}

pub fn search(ctx: &Context, pattern: &str) -> Result<(), CliError> {
    let hits = ctx.controller.search_switches(&ctx.request, pattern)?;
    let out = output::render_list(
        ctx.output,
        &hits,
        |h: &SearchHit| SwitchRow {
            group: h.group_name.clone(),
            id: h.switch.id,
            name: h.switch.name.clone(),
            hostname: h.switch.hostname.clone(),
            connector: h.switch.connector.to_string(),
            description: h.switch.description.clone().unwrap_or_default(),
        },
        |h| h.switch.name.clone(),
    )?;
    output::print_output(&out, ctx.quiet);
    Ok(())
}

// ── Show / reload ───────────────────────────────────────────────────

fn view_of(arg: ViewArg) -> View {
    match arg {
        ViewArg::Basic => View::Basic,
        ViewArg::Hardware => View::Hardware,
        ViewArg::Clients => View::Clients,
    }
}

pub async fn show(ctx: &Context, args: ShowArgs, reload: bool) -> Result<(), CliError> {
    let (group_id, device_id) = ctx.resolve_switch(&args.switch)?;
    let view = view_of(args.view);
    let bar = util::spinner(ctx, &format!("Reading {}", args.switch));
    let result = if reload {
        ctx.controller
            .reload_switch(&ctx.request, group_id, device_id, view)
            .await
    } else {
        ctx.controller
            .view_switch(&ctx.request, group_id, device_id, view)
            .await
    };
    bar.finish_and_clear();
    let sv = result?;

    for warning in &sv.state.warnings {
        ctx.say(&output::notice(warning, ctx.color));
    }

    let out = output::render_single(
        ctx.output,
        &sv,
        |sv| match sv.view {
            View::Basic => basic_detail(sv),
            View::Hardware => hardware_detail(sv),
            View::Clients => clients_detail(sv),
        },
        |sv| sv.state.interfaces.keys().cloned().collect::<Vec<_>>().join("\n"),
    )?;
    output::print_output(&out, ctx.quiet);
    Ok(())
}

fn header(sv: &SwitchView) -> Vec<String> {
    let facts = &sv.state.facts;
    let mut lines = vec![
        format!("Switch:   {} ({})", sv.device.name, sv.device.hostname),
        format!("Group:    {}", sv.group.name),
        format!("Type:     {}", sv.device.connector),
    ];
    if !facts.model.is_empty() {
        lines.push(format!("Model:    {}", facts.model));
    }
    if !facts.firmware.is_empty() {
        lines.push(format!("Firmware: {}", facts.firmware));
    }
    if sv.state.save_needed {
        lines.push("Changes are not saved to startup config (run: switchyard save)".into());
    }
    lines
}

fn basic_detail(sv: &SwitchView) -> String {
    let mut parts = vec![header(sv).join("\n")];

    let interfaces: Vec<InterfaceRow> = sv.state.interfaces.values().map(Into::into).collect();
    parts.push(output::section("Interfaces", &interfaces));

    let vlans: Vec<VlanRow> = sv
        .state
        .vlans
        .values()
        .map(|v| VlanRow {
            id: v.id,
            name: v.name.clone(),
            allowed: if sv.allowed_vlans.iter().any(|a| a.id == v.id) {
                "yes".into()
            } else {
                String::new()
            },
        })
        .collect();
    parts.push(output::section("VLANs", &vlans));

    let activity: Vec<ActivityRow> = sv
        .recent_activity
        .iter()
        .map(|e| ActivityRow {
            when: e.timestamp.format("%Y-%m-%d %H:%M").to_string(),
            user: e.user.clone(),
            log_type: e.log_type.to_string(),
            description: e.description.clone(),
        })
        .collect();
    parts.push(output::section("Recent activity", &activity));

    join_parts(parts)
}

fn hardware_detail(sv: &SwitchView) -> String {
    let facts = &sv.state.facts;
    let mut lines = header(sv);
    for (label, value) in [
        ("Name:    ", &facts.name),
        ("Location:", &facts.location),
        ("Contact: ", &facts.contact),
        ("OID:     ", &facts.object_id),
    ] {
        if !value.is_empty() {
            lines.push(format!("{label} {value}"));
        }
    }
    if let Some(ticks) = facts.uptime_ticks {
        let uptime = Duration::from_secs(ticks / 100);
        lines.push(format!("Uptime:   {}", humantime::format_duration(uptime)));
    }
    if let Some(booted) = facts.booted_at {
        lines.push(format!("Booted:   {}", booted.format("%Y-%m-%d %H:%M:%S UTC")));
    }
    if !facts.description.is_empty() {
        lines.push(format!("System:   {}", facts.description));
    }

    let hardware: Vec<HardwareRow> = sv.state.hardware.iter().map(Into::into).collect();
    join_parts(vec![lines.join("\n"), output::section("Hardware", &hardware)])
}

fn clients_detail(sv: &SwitchView) -> String {
    let mut clients = Vec::new();
    let mut neighbors = Vec::new();
    for iface in sv.state.interfaces.values() {
        for entry in iface.eth.values() {
            clients.push(ClientRow {
                interface: iface.name.clone(),
                mac: entry.mac.to_string(),
                vendor: entry.vendor.clone().unwrap_or_default(),
                ipv4: entry.ipv4.map(|ip| ip.to_string()).unwrap_or_default(),
                vlan: entry.vlan.map(|v| v.to_string()).unwrap_or_default(),
            });
        }
        for n in &iface.lldp {
            neighbors.push(NeighborRow {
                interface: iface.name.clone(),
                system: n.system_name.clone(),
                port: if n.port_descr.is_empty() {
                    n.port_id.clone()
                } else {
                    n.port_descr.clone()
                },
                chassis: n.chassis_id.clone(),
                capabilities: n
                    .capabilities
                    .iter()
                    .map(ToString::to_string)
                    .collect::<Vec<_>>()
                    .join(","),
            });
        }
    }

    join_parts(vec![
        header(sv).join("\n"),
        output::section("Ethernet addresses", &clients),
        output::section("LLDP neighbors", &neighbors),
    ])
}

fn join_parts(parts: Vec<String>) -> String {
    parts
        .into_iter()
        .filter(|p| !p.is_empty())
        .collect::<Vec<_>>()
        .join("\n\n")
}

#[cfg(test)]
mod tests {
    use switchyard_core::PortStatus;

    use super::*;

    #[test]
    fn speeds_are_compact() {
        assert_eq!(speed(0), "");
        assert_eq!(speed(100), "100M");
        assert_eq!(speed(1000), "1G");
        assert_eq!(speed(2500), "2500M");
        assert_eq!(speed(10_000), "10G");
    }

    #[test]
    fn interface_row_notes_lag_membership() {
        let mut iface = Interface::new("7", "Gi1/0/7");
        iface.admin_status = PortStatus::Up;
        iface.untagged_vlan = 30;
        iface.tagged_vlans.insert(40);
        iface.lacp_master_name = Some("Po1".into());
        iface.manageable = false;
        iface.unmanage_reason = Some("Access denied: LACP member".into());

        let row = InterfaceRow::from(&iface);
        assert_eq!(row.admin, "Up");
        assert_eq!(row.vlan, "30 +T");
        assert_eq!(row.notes, "member of Po1; Access denied: LACP member");
    }
}
