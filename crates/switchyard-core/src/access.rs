// ── Access checks ──
//
// Regular users see the groups they are members of, and within those only
// active switches. The resulting `PermissionMap` is cached per user in the
// session store and consulted before any device is contacted. Staff and
// superusers see everything.

use std::collections::BTreeMap;
use std::sync::Arc;

use regex::Regex;
use serde::{Deserialize, Serialize};

use crate::config::EditPolicy;
use crate::model::{ConnectorKind, Device, SwitchGroup, User};
use crate::session::SessionPolicy;

/// Display data for one switch the user may open.
#[derive(Debug, Clone, PartialEq, Eq, Serialize, Deserialize)]
pub struct SwitchSummary {
    pub id: u32,
    pub name: String,
    pub hostname: String,
    #[serde(default)]
    pub description: Option<String>,
    pub connector: ConnectorKind,
}

#[derive(Debug, Clone, PartialEq, Eq, Serialize, Deserialize)]
pub struct GroupPermission {
    pub id: u32,
    pub name: String,
    #[serde(default)]
    pub description: Option<String>,
    pub read_only: bool,
    pub switches: BTreeMap<u32, SwitchSummary>,
}

/// Group → switch → display metadata for one user.
#[derive(Debug, Clone, Default, PartialEq, Eq, Serialize, Deserialize)]
pub struct PermissionMap {
    pub groups: BTreeMap<u32, GroupPermission>,
}

impl PermissionMap {
    /// Build the map from the full inventory.
    pub fn build(user: &User, groups: &[SwitchGroup], devices: &[Device]) -> Self {
        let mut map = Self::default();
        for group in groups {
            if !user.is_admin() && !group.members.contains(&user.name) {
                continue;
            }
            let members: Vec<&Device> = devices.iter().filter(|d| d.group_id == group.id).collect();
            if members.is_empty() {
                continue;
            }
            let switches = members
                .into_iter()
                .filter(|d| d.is_active())
                .map(|d| {
                    (
                        d.id,
                        SwitchSummary {
                            id: d.id,
                            name: d.name.clone(),
                            hostname: d.hostname.clone(),
                            description: d.description.clone(),
                            connector: d.connector,
                        },
                    )
                })
                .collect();
            map.groups.insert(
                group.id,
                GroupPermission {
                    id: group.id,
                    name: group.name.clone(),
                    description: group.description.clone(),
                    read_only: group.read_only,
                    switches,
                },
            );
        }
        map
    }

    pub fn allows(&self, group_id: u32, device_id: u32) -> bool {
        self.groups
            .get(&group_id)
            .is_some_and(|g| g.switches.contains_key(&device_id))
    }

    /// Groups ordered by name, as shown to the user.
    pub fn groups_by_name(&self) -> Vec<&GroupPermission> {
        let mut groups: Vec<&GroupPermission> = self.groups.values().collect();
        groups.sort_by(|a, b| a.name.cmp(&b.name));
        groups
    }

    /// Switches whose name, hostname or description matches `pattern`.
    pub fn search(&self, pattern: &Regex) -> Vec<(&GroupPermission, &SwitchSummary)> {
        self.groups_by_name()
            .into_iter()
            .flat_map(|g| g.switches.values().map(move |s| (g, s)))
            .filter(|(_, s)| {
                pattern.is_match(&s.name)
                    || pattern.is_match(&s.hostname)
                    || s.description.as_deref().is_some_and(|d| pattern.is_match(d))
            })
            .collect()
    }
}

/// Whether `user` may open `device_id` in `group_id`.
pub fn rights_to_group_and_switch(
    user: &User,
    permissions: &PermissionMap,
    group_id: u32,
    device_id: u32,
) -> bool {
    user.is_admin() || permissions.allows(group_id, device_id)
}

/// Whether any change is allowed.
pub fn user_can_change(user: &User, group: &SwitchGroup, device: &Device) -> bool {
    if device.read_only {
        return false;
    }
    user.is_superuser || !(user.read_only || group.read_only)
}

pub fn user_can_bulkedit(user: &User, group: &SwitchGroup, device: &Device) -> bool {
    user_can_change(user, group, device)
        && (user.is_superuser || (user.bulk_edit && group.bulk_edit))
}

pub fn user_can_edit_vlans(user: &User, group: &SwitchGroup, device: &Device) -> bool {
    user_can_change(user, group, device)
        && (user.is_superuser || (user.edit_vlans && group.edit_vlans))
}

/// Deleting a VLAN removes it from every port; only superusers may.
pub fn user_can_delete_vlan(user: &User) -> bool {
    user.is_superuser
}

/// The session policy for `user` working on a switch of `group`.
pub fn session_policy(
    user: &User,
    group: &SwitchGroup,
    edit: Arc<EditPolicy>,
    always_allow_poe_toggle: bool,
) -> SessionPolicy {
    SessionPolicy {
        allow_all_vlans: user.is_admin() || group.allow_all_vlans,
        group_vlans: group.vlans.clone(),
        poe_override: always_allow_poe_toggle || group.allow_poe_toggle || user.allow_poe_toggle,
        edit,
    }
}

#[cfg(test)]
#[allow(clippy::unwrap_used)]
mod tests {
    use std::collections::BTreeSet;

    use super::*;
    use crate::model::DeviceStatus;

    fn group(id: u32, name: &str, members: &[&str]) -> SwitchGroup {
        SwitchGroup {
            id,
            name: name.into(),
            description: None,
            members: members.iter().map(|m| (*m).to_owned()).collect(),
            vlans: BTreeSet::from([10]),
            allow_all_vlans: false,
            read_only: false,
            bulk_edit: true,
            edit_vlans: false,
            allow_poe_toggle: false,
        }
    }

    fn device(id: u32, group_id: u32, name: &str, status: DeviceStatus) -> Device {
        Device {
            id,
            name: name.into(),
            hostname: format!("{name}.example.net"),
            group_id,
            connector: ConnectorKind::Snmp,
            status,
            description: None,
            read_only: false,
            snmp_profile: None,
            ssh_profile: None,
            api_profile: None,
        }
    }

    fn inventory() -> (Vec<SwitchGroup>, Vec<Device>) {
        (
            vec![
                group(1, "Library", &["alice"]),
                group(2, "Dorms", &["bob"]),
                group(3, "Empty", &["alice"]),
            ],
            vec![
                device(10, 1, "lib-sw1", DeviceStatus::Active),
                device(11, 1, "lib-sw2", DeviceStatus::Inactive),
                device(20, 2, "dorm-sw1", DeviceStatus::Active),
            ],
        )
    }

    #[test]
    fn members_see_only_their_active_switches() {
        let (groups, devices) = inventory();
        let map = PermissionMap::build(&User::new("alice"), &groups, &devices);

        assert_eq!(map.groups.keys().copied().collect::<Vec<_>>(), vec![1]);
        assert!(map.allows(1, 10));
        assert!(!map.allows(1, 11));
        assert!(!map.allows(2, 20));
        assert!(!rights_to_group_and_switch(&User::new("alice"), &map, 2, 20));
    }

    #[test]
    fn admins_see_everything() {
        let (groups, devices) = inventory();
        let admin = User::superuser("root");
        let map = PermissionMap::build(&admin, &groups, &devices);
        assert_eq!(map.groups.len(), 2);
        assert!(rights_to_group_and_switch(&admin, &PermissionMap::default(), 2, 20));
    }

    #[test]
    fn search_matches_name_and_hostname() {
        let (groups, devices) = inventory();
        let map = PermissionMap::build(&User::superuser("root"), &groups, &devices);
        let hits = map.search(&Regex::new("dorm").unwrap());
        assert_eq!(hits.len(), 1);
        assert_eq!(hits[0].1.id, 20);
    }

    #[test]
    fn read_only_blocks_bulk_edit_and_vlans() {
        let (groups, devices) = inventory();
        let mut user = User::new("alice");
        assert!(user_can_bulkedit(&user, &groups[0], &devices[0]));
        assert!(!user_can_edit_vlans(&user, &groups[0], &devices[0]));

        user.read_only = true;
        assert!(!user_can_bulkedit(&user, &groups[0], &devices[0]));

        let mut locked = devices[0].clone();
        locked.read_only = true;
        assert!(!user_can_change(&User::superuser("root"), &groups[0], &locked));
    }
}
