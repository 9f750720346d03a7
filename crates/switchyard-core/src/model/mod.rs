pub mod device;
pub mod hardware;
pub mod interface;
pub mod log;
pub mod mac;
pub mod vlan;

pub use device::{ConnectorKind, Device, DeviceStatus, SwitchGroup, User};
pub use hardware::{HardwareClass, HardwareEntry, SystemFacts};
pub use interface::{
    EthernetEntry, Interface, InterfaceKind, LldpCapability, LldpChassisType, LldpNeighbor,
    PoeEntry, PoeStatus, PortStatus,
};
pub use log::{LogAction, LogEntry, LogType};
pub use mac::MacAddress;
pub use vlan::{Vlan, is_manageable_vlan_id};
