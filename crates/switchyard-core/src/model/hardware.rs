use chrono::{DateTime, Utc};
use serde::{Deserialize, Serialize};
use strum::Display;

/// ENTITY-MIB physical class.
#[derive(Debug, Clone, Copy, PartialEq, Eq, Default, Serialize, Deserialize, Display)]
#[serde(rename_all = "kebab-case")]
#[strum(serialize_all = "kebab-case")]
pub enum HardwareClass {
    Other,
    #[default]
    Unknown,
    Chassis,
    Backplane,
    Container,
    PowerSupply,
    Fan,
    Sensor,
    Module,
    Port,
    Stack,
    Cpu,
}

impl HardwareClass {
    pub fn from_code(code: i64) -> Self {
        match code {
            1 => Self::Other,
            3 => Self::Chassis,
            4 => Self::Backplane,
            5 => Self::Container,
            6 => Self::PowerSupply,
            7 => Self::Fan,
            8 => Self::Sensor,
            9 => Self::Module,
            10 => Self::Port,
            11 => Self::Stack,
            12 => Self::Cpu,
            _ => Self::Unknown,
        }
    }
}

/// One inventory item (chassis, module, PSU, ...).
#[derive(Debug, Clone, PartialEq, Eq, Default, Serialize, Deserialize)]
pub struct HardwareEntry {
    pub index: String,
    pub class: HardwareClass,
    pub name: String,
    pub description: String,
    pub model: String,
    pub serial: String,
    pub hardware_rev: String,
    pub firmware_rev: String,
    pub software_rev: String,
}

/// Device-wide facts gathered by the basic read.
#[derive(Debug, Clone, PartialEq, Eq, Default, Serialize, Deserialize)]
pub struct SystemFacts {
    pub name: String,
    pub description: String,
    pub object_id: String,
    pub contact: String,
    pub location: String,
    pub model: String,
    pub firmware: String,
    /// Hundredths of a second since the agent started.
    pub uptime_ticks: Option<u64>,
    pub booted_at: Option<DateTime<Utc>>,
}
