use serde::{Deserialize, Serialize};

/// A VLAN as configured on a device.
#[derive(Debug, Clone, PartialEq, Eq, Serialize, Deserialize)]
pub struct Vlan {
    pub id: u16,
    pub name: String,
}

impl Vlan {
    pub fn new(id: u16, name: impl Into<String>) -> Self {
        Self {
            id,
            name: name.into(),
        }
    }
}

/// VLANs that may be created, renamed or deleted: strictly between 1 and 4095.
pub fn is_manageable_vlan_id(id: u16) -> bool {
    id > 1 && id < 4095
}

#[cfg(test)]
mod tests {
    use super::*;

    #[test]
    fn manageable_range_excludes_default_and_reserved() {
        assert!(!is_manageable_vlan_id(0));
        assert!(!is_manageable_vlan_id(1));
        assert!(is_manageable_vlan_id(2));
        assert!(is_manageable_vlan_id(4094));
        assert!(!is_manageable_vlan_id(4095));
    }
}
