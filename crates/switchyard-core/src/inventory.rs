// ── Inventory ──
//
// Read side of the persistence collaborator: the groups, devices and users
// the core works with. Lookups return owned values so implementations are
// free to load from files or a database on every call.

use crate::error::CoreError;
use crate::model::{Device, SwitchGroup, User};

pub trait Inventory: Send + Sync {
    fn groups(&self) -> Vec<SwitchGroup>;

    fn devices(&self) -> Vec<Device>;

    fn user(&self, name: &str) -> Option<User>;

    fn group(&self, id: u32) -> Result<SwitchGroup, CoreError> {
        self.groups()
            .into_iter()
            .find(|g| g.id == id)
            .ok_or_else(|| CoreError::GroupNotFound {
                identifier: id.to_string(),
            })
    }

    fn device(&self, id: u32) -> Result<Device, CoreError> {
        self.devices()
            .into_iter()
            .find(|d| d.id == id)
            .ok_or_else(|| CoreError::DeviceNotFound {
                identifier: id.to_string(),
            })
    }

    /// Resolve a device by id, name or hostname.
    fn find_device(&self, identifier: &str) -> Result<Device, CoreError> {
        let devices = self.devices();
        if let Ok(id) = identifier.parse::<u32>() {
            if let Some(device) = devices.iter().find(|d| d.id == id) {
                return Ok(device.clone());
            }
        }
        devices
            .into_iter()
            .find(|d| d.name.eq_ignore_ascii_case(identifier) || d.hostname == identifier)
            .ok_or_else(|| CoreError::DeviceNotFound {
                identifier: identifier.to_owned(),
            })
    }
}

/// Fixed inventory held in memory.
#[derive(Debug, Clone, Default)]
pub struct StaticInventory {
    pub groups: Vec<SwitchGroup>,
    pub devices: Vec<Device>,
    pub users: Vec<User>,
}

impl StaticInventory {
    pub fn new(groups: Vec<SwitchGroup>, devices: Vec<Device>, users: Vec<User>) -> Self {
        Self {
            groups,
            devices,
            users,
        }
    }
}

impl Inventory for StaticInventory {
    fn groups(&self) -> Vec<SwitchGroup> {
        self.groups.clone()
    }

    fn devices(&self) -> Vec<Device> {
        self.devices.clone()
    }

    fn user(&self, name: &str) -> Option<User> {
        self.users.iter().find(|u| u.name == name).cloned()
    }
}
