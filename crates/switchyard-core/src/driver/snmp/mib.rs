// Standard MIB columns used by the generic SNMP driver.

// ── SNMPv2-MIB system group ──
pub const SYSTEM: &[u32] = &[1, 3, 6, 1, 2, 1, 1];

// ── IF-MIB ──
pub const IF_DESCR: &[u32] = &[1, 3, 6, 1, 2, 1, 2, 2, 1, 2];
pub const IF_TYPE: &[u32] = &[1, 3, 6, 1, 2, 1, 2, 2, 1, 3];
pub const IF_SPEED: &[u32] = &[1, 3, 6, 1, 2, 1, 2, 2, 1, 5];
pub const IF_ADMIN_STATUS: &[u32] = &[1, 3, 6, 1, 2, 1, 2, 2, 1, 7];
pub const IF_OPER_STATUS: &[u32] = &[1, 3, 6, 1, 2, 1, 2, 2, 1, 8];
pub const IF_NAME: &[u32] = &[1, 3, 6, 1, 2, 1, 31, 1, 1, 1, 1];
pub const IF_HIGH_SPEED: &[u32] = &[1, 3, 6, 1, 2, 1, 31, 1, 1, 1, 15];
pub const IF_ALIAS: &[u32] = &[1, 3, 6, 1, 2, 1, 31, 1, 1, 1, 18];

// ── BRIDGE-MIB / Q-BRIDGE-MIB ──
pub const DOT1D_BASE_PORT_IF_INDEX: &[u32] = &[1, 3, 6, 1, 2, 1, 17, 1, 4, 1, 2];
pub const DOT1D_TP_FDB_PORT: &[u32] = &[1, 3, 6, 1, 2, 1, 17, 4, 3, 1, 2];
pub const DOT1Q_TP_FDB_PORT: &[u32] = &[1, 3, 6, 1, 2, 1, 17, 7, 1, 2, 2, 1, 2];
pub const DOT1Q_VLAN_STATIC_NAME: &[u32] = &[1, 3, 6, 1, 2, 1, 17, 7, 1, 4, 3, 1, 1];
pub const DOT1Q_VLAN_STATIC_EGRESS_PORTS: &[u32] = &[1, 3, 6, 1, 2, 1, 17, 7, 1, 4, 3, 1, 2];
pub const DOT1Q_VLAN_STATIC_UNTAGGED_PORTS: &[u32] = &[1, 3, 6, 1, 2, 1, 17, 7, 1, 4, 3, 1, 4];
pub const DOT1Q_VLAN_STATIC_ROW_STATUS: &[u32] = &[1, 3, 6, 1, 2, 1, 17, 7, 1, 4, 3, 1, 5];
pub const DOT1Q_PVID: &[u32] = &[1, 3, 6, 1, 2, 1, 17, 7, 1, 4, 5, 1, 1];

// ── IEEE8023-LAG-MIB ──
pub const DOT3AD_AGG_PORT_ATTACHED_AGG_ID: &[u32] = &[1, 2, 840, 10006, 300, 43, 1, 2, 1, 1, 13];

// ── POWER-ETHERNET-MIB ──
pub const PETH_PSE_PORT_ADMIN_ENABLE: &[u32] = &[1, 3, 6, 1, 2, 1, 105, 1, 1, 1, 3];
pub const PETH_PSE_PORT_DETECTION_STATUS: &[u32] = &[1, 3, 6, 1, 2, 1, 105, 1, 1, 1, 6];

// ── LLDP-MIB lldpRemEntry ──
pub const LLDP_REM_ENTRY: &[u32] = &[1, 0, 8802, 1, 1, 2, 1, 4, 1, 1];
pub const LLDP_REM_CHASSIS_ID_SUBTYPE: u32 = 4;
pub const LLDP_REM_CHASSIS_ID: u32 = 5;
pub const LLDP_REM_PORT_ID: u32 = 7;
pub const LLDP_REM_PORT_DESC: u32 = 8;
pub const LLDP_REM_SYS_NAME: u32 = 9;
pub const LLDP_REM_SYS_DESC: u32 = 10;
pub const LLDP_REM_SYS_CAP_ENABLED: u32 = 12;

// ── IP-MIB ──
pub const IP_NET_TO_MEDIA_PHYS_ADDRESS: &[u32] = &[1, 3, 6, 1, 2, 1, 4, 22, 1, 2];

// ── ENTITY-MIB entPhysicalEntry ──
pub const ENT_PHYSICAL_DESCR: &[u32] = &[1, 3, 6, 1, 2, 1, 47, 1, 1, 1, 1, 2];
pub const ENT_PHYSICAL_CLASS: &[u32] = &[1, 3, 6, 1, 2, 1, 47, 1, 1, 1, 1, 5];
pub const ENT_PHYSICAL_NAME: &[u32] = &[1, 3, 6, 1, 2, 1, 47, 1, 1, 1, 1, 7];
pub const ENT_PHYSICAL_HARDWARE_REV: &[u32] = &[1, 3, 6, 1, 2, 1, 47, 1, 1, 1, 1, 8];
pub const ENT_PHYSICAL_FIRMWARE_REV: &[u32] = &[1, 3, 6, 1, 2, 1, 47, 1, 1, 1, 1, 9];
pub const ENT_PHYSICAL_SOFTWARE_REV: &[u32] = &[1, 3, 6, 1, 2, 1, 47, 1, 1, 1, 1, 10];
pub const ENT_PHYSICAL_SERIAL_NUM: &[u32] = &[1, 3, 6, 1, 2, 1, 47, 1, 1, 1, 1, 11];
pub const ENT_PHYSICAL_MODEL_NAME: &[u32] = &[1, 3, 6, 1, 2, 1, 47, 1, 1, 1, 1, 13];

// ── Enumerations ──
pub const STATUS_UP: i64 = 1;
pub const STATUS_DOWN: i64 = 2;
pub const PSE_ENABLED: i64 = 1;
pub const PSE_DISABLED: i64 = 2;
pub const ROW_CREATE_AND_GO: i64 = 4;
pub const ROW_DESTROY: i64 = 6;

pub const IF_TYPE_ETHERNET: &[i64] = &[6, 62, 69, 117];
pub const IF_TYPE_LAG: i64 = 161;

/// pethPsePortDetectionStatus names.
pub fn pse_detection_name(code: i64) -> &'static str {
    match code {
        1 => "disabled",
        2 => "searching",
        3 => "delivering-power",
        4 => "fault",
        5 => "test",
        6 => "other-fault",
        _ => "unknown",
    }
}
