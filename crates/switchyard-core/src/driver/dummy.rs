// ── In-memory lab driver ──
//
// `DummyDevice` is a simulated switch holding its own "device truth".
// Drivers built on it read from and write to that truth, journal every
// write, and fail on demand. `DummyLab` hands out one device per id so
// state survives across sessions, the way a real switch would.

use std::fmt;
use std::net::Ipv4Addr;
use std::sync::{Arc, Mutex, MutexGuard, PoisonError};

use chrono::Utc;
use dashmap::DashMap;
use serde::Serialize;
use tracing::debug;

use super::{Capabilities, DeviceDriver};
use crate::error::CoreError;
use crate::model::{
    ConnectorKind, EthernetEntry, HardwareClass, HardwareEntry, Interface, InterfaceKind,
    LldpCapability, LldpChassisType, LldpNeighbor, MacAddress, PoeEntry, PoeStatus, PortStatus,
    Vlan,
};
use crate::session::SwitchState;

/// Driver operations that can be journaled and made to fail.
#[derive(Debug, Clone, Copy, PartialEq, Eq, Hash, Serialize)]
#[serde(rename_all = "kebab-case")]
pub enum DummyOp {
    ReadBasic,
    ReadHardware,
    ReadClients,
    AdminStatus,
    PoeStatus,
    UntaggedVlan,
    Description,
    VlanCreate,
    VlanEdit,
    VlanDelete,
    SaveConfig,
    RunCommand,
}

impl fmt::Display for DummyOp {
    fn fmt(&self, f: &mut fmt::Formatter<'_>) -> fmt::Result {
        fmt::Debug::fmt(self, f)
    }
}

/// One journaled write.
#[derive(Debug, Clone, PartialEq, Eq, Serialize)]
pub struct DummyCall {
    pub op: DummyOp,
    /// Interface key or VLAN id; empty for device-wide operations.
    pub target: String,
    pub value: String,
}

impl DummyCall {
    fn new(op: DummyOp, target: impl ToString, value: impl ToString) -> Self {
        Self {
            op,
            target: target.to_string(),
            value: value.to_string(),
        }
    }
}

#[derive(Debug, Clone, PartialEq, Eq)]
struct Failure {
    op: DummyOp,
    /// Only fail for this interface key; `None` fails every call.
    key: Option<String>,
    /// Only fail writes of this value.
    value: Option<String>,
}

#[derive(Debug)]
struct DeviceTruth {
    state: SwitchState,
    calls: Vec<DummyCall>,
    failures: Vec<Failure>,
}

/// A simulated switch, cheaply cloneable and shared between drivers.
#[derive(Debug, Clone)]
pub struct DummyDevice(Arc<Mutex<DeviceTruth>>);

impl DummyDevice {
    /// An eight-port access switch with PoE and one LACP uplink member.
    ///
    /// | key | name     | vlan | PoE      | notes                  |
    /// |-----|----------|------|----------|------------------------|
    /// | 1-6 | Gi1/0/n  | 10   | 1-6      | port 2 admin down, port 5 PoE off |
    /// | 7   | Gi1/0/7  | 20   | -        | tagged 30, LLDP phone  |
    /// | 8   | Gi1/0/8  | 1    | -        | member of Po1          |
    /// | 100 | Po1      | 1    | -        | LAG                    |
    pub fn lab(name: impl Into<String>) -> Self {
        let mut state = SwitchState::default();
        state.facts.name = name.into();
        state.facts.description = "Switchyard lab switch".into();
        state.facts.model = "DUMMY-8P".into();
        state.facts.firmware = "1.0.0".into();
        state.facts.uptime_ticks = Some(8_640_000);

        for (id, name) in [(1, "default"), (10, "users"), (20, "voice"), (30, "printers")] {
            state.vlans.insert(id, Vlan::new(id, name));
        }

        for n in 1..=8_u32 {
            let mut iface = Interface::new(n.to_string(), format!("Gi1/0/{n}"));
            iface.port_index = Some(n);
            iface.admin_status = PortStatus::from_bool(n != 2);
            iface.oper_status = PortStatus::from_bool(n == 1 || n == 7 || n == 8);
            iface.speed_mbps = 1000;
            iface.untagged_vlan = match n {
                1..=6 => 10,
                7 => 20,
                _ => 1,
            };
            if n <= 6 {
                iface.poe = Some(PoeEntry {
                    index: format!("1.{n}"),
                    admin_status: if n == 5 {
                        PoeStatus::Disabled
                    } else {
                        PoeStatus::Enabled
                    },
                    detect_status: Some(if n == 1 { "delivering-power" } else { "searching" }.into()),
                    power_consumed_mw: (n == 1).then_some(4_200),
                });
            }
            if n == 1 {
                iface.description = "office 101".into();
                let mut client = EthernetEntry::new(MacAddress::new("b8:27:eb:01:02:03"));
                client.ipv4 = Some(Ipv4Addr::new(10, 0, 10, 7));
                client.vlan = Some(10);
                iface.add_client(client);
            }
            if n == 7 {
                iface.tagged_vlans.insert(30);
                iface.lldp.push(LldpNeighbor {
                    chassis_type: LldpChassisType::MacAddress,
                    chassis_id: "00:04:f2:aa:bb:cc".into(),
                    port_id: "WAN".into(),
                    port_descr: String::new(),
                    system_name: "phone-7".into(),
                    system_description: "VVX 450".into(),
                    capabilities: vec![LldpCapability::Bridge, LldpCapability::Telephone],
                });
            }
            if n == 8 {
                iface.lacp_master_index = 100;
                iface.lacp_master_name = Some("Po1".into());
            }
            state.interfaces.insert(iface.key.clone(), iface);
        }

        let mut lag = Interface::new("100", "Po1");
        lag.kind = InterfaceKind::Lag;
        lag.admin_status = PortStatus::Up;
        lag.oper_status = PortStatus::Up;
        lag.speed_mbps = 1000;
        state.interfaces.insert(lag.key.clone(), lag);

        state.hardware.push(HardwareEntry {
            index: "1".into(),
            class: HardwareClass::Chassis,
            name: "Chassis".into(),
            description: "Switchyard lab chassis".into(),
            model: "DUMMY-8P".into(),
            serial: "DUMMY0001".into(),
            hardware_rev: "A".into(),
            firmware_rev: "1.0".into(),
            software_rev: "1.0.0".into(),
        });

        Self(Arc::new(Mutex::new(DeviceTruth {
            state,
            calls: Vec::new(),
            failures: Vec::new(),
        })))
    }

    fn lock(&self) -> MutexGuard<'_, DeviceTruth> {
        self.0.lock().unwrap_or_else(PoisonError::into_inner)
    }

    /// Make `op` fail, for every interface or only for `key`.
    pub fn fail(&self, op: DummyOp, key: Option<&str>) {
        self.lock().failures.push(Failure {
            op,
            key: key.map(String::from),
            value: None,
        });
    }

    /// Make writes of `op` fail only when they set `value`, e.g. the enable
    /// half of a PoE toggle.
    pub fn fail_value(&self, op: DummyOp, key: Option<&str>, value: impl ToString) {
        self.lock().failures.push(Failure {
            op,
            key: key.map(String::from),
            value: Some(value.to_string()),
        });
    }

    pub fn clear_failures(&self) {
        self.lock().failures.clear();
    }

    /// Journal of writes, oldest first.
    pub fn calls(&self) -> Vec<DummyCall> {
        self.lock().calls.clone()
    }

    pub fn clear_calls(&self) {
        self.lock().calls.clear();
    }

    /// Current device-side view of an interface.
    pub fn interface(&self, key: &str) -> Option<Interface> {
        self.lock().state.interfaces.get(key).cloned()
    }

    pub fn vlan(&self, id: u16) -> Option<Vlan> {
        self.lock().state.vlans.get(&id).cloned()
    }

    fn check(
        truth: &DeviceTruth,
        op: DummyOp,
        key: Option<&str>,
        value: Option<&str>,
    ) -> Result<(), CoreError> {
        let hit = truth.failures.iter().any(|f| {
            f.op == op
                && (f.key.is_none() || f.key.as_deref() == key)
                && (f.value.is_none() || f.value.as_deref() == value)
        });
        if hit {
            return Err(CoreError::Transport {
                description: format!("Simulated {op} failure"),
                details: format!("injected failure on {}", key.unwrap_or("device")),
            });
        }
        Ok(())
    }

    /// Apply a write to the device truth after failure checks, journaling it.
    fn write(
        &self,
        call: DummyCall,
        key: Option<&str>,
        apply: impl FnOnce(&mut SwitchState) -> Result<(), CoreError>,
    ) -> Result<(), CoreError> {
        let mut truth = self.lock();
        Self::check(&truth, call.op, key, Some(&call.value))?;
        apply(&mut truth.state)?;
        debug!(op = %call.op, target = %call.target, value = %call.value, "dummy write");
        truth.calls.push(call);
        Ok(())
    }
}

/// Devices of a simulated lab, created on first use.
#[derive(Debug, Clone, Default)]
pub struct DummyLab {
    devices: Arc<DashMap<u32, DummyDevice>>,
}

impl DummyLab {
    pub fn new() -> Self {
        Self::default()
    }

    /// The device for `id`, created as a standard lab switch on first use.
    pub fn device(&self, id: u32, name: &str) -> DummyDevice {
        self.devices
            .entry(id)
            .or_insert_with(|| DummyDevice::lab(name))
            .clone()
    }
}

// ── Driver ───────────────────────────────────────────────────────────

pub struct DummyDriver {
    device: DummyDevice,
}

impl DummyDriver {
    pub fn new(device: DummyDevice) -> Self {
        Self { device }
    }
}

fn missing_interface(key: &str) -> CoreError {
    CoreError::InterfaceNotFound { key: key.into() }
}

impl DeviceDriver for DummyDriver {
    fn connector(&self) -> ConnectorKind {
        ConnectorKind::TestDummy
    }

    fn capabilities(&self) -> Capabilities {
        Capabilities {
            can_change_interfaces: true,
            can_edit_vlans: true,
            can_save_config: true,
            auto_saves_config: false,
            can_run_commands: true,
            has_hardware_details: true,
            has_client_data: true,
        }
    }

    async fn read_basic(&mut self, state: &mut SwitchState) -> Result<(), CoreError> {
        let truth = self.device.lock();
        DummyDevice::check(&truth, DummyOp::ReadBasic, None, None)?;
        state.facts = truth.state.facts.clone();
        state.vlans = truth.state.vlans.clone();
        state.interfaces = truth.state.interfaces.clone();
        for iface in state.interfaces.values_mut() {
            iface.eth.clear();
            iface.lldp.clear();
        }
        Ok(())
    }

    async fn read_hardware(&mut self, state: &mut SwitchState) -> Result<(), CoreError> {
        let truth = self.device.lock();
        DummyDevice::check(&truth, DummyOp::ReadHardware, None, None)?;
        state.hardware = truth.state.hardware.clone();
        Ok(())
    }

    async fn read_clients(&mut self, state: &mut SwitchState) -> Result<(), CoreError> {
        let truth = self.device.lock();
        DummyDevice::check(&truth, DummyOp::ReadClients, None, None)?;
        state.clear_clients();
        for (key, source) in &truth.state.interfaces {
            if let Some(iface) = state.interfaces.get_mut(key) {
                iface.eth = source.eth.clone();
                iface.lldp = source.lldp.clone();
            }
        }
        Ok(())
    }

    async fn set_admin_status(
        &mut self,
        iface: &Interface,
        status: PortStatus,
    ) -> Result<(), CoreError> {
        let key = iface.key.as_str();
        self.device.write(
            DummyCall::new(DummyOp::AdminStatus, key, status),
            Some(key),
            |s| {
                let target = s.interfaces.get_mut(key).ok_or_else(|| missing_interface(key))?;
                target.admin_status = status;
                Ok(())
            },
        )
    }

    async fn set_poe_status(
        &mut self,
        iface: &Interface,
        status: PoeStatus,
    ) -> Result<(), CoreError> {
        let key = iface.key.as_str();
        self.device.write(
            DummyCall::new(DummyOp::PoeStatus, key, status),
            Some(key),
            |s| {
                let target = s.interfaces.get_mut(key).ok_or_else(|| missing_interface(key))?;
                let poe = target.poe.as_mut().ok_or_else(|| {
                    CoreError::validation(format!("Interface {} is not PoE capable", target.name))
                })?;
                poe.admin_status = status;
                Ok(())
            },
        )
    }

    async fn set_untagged_vlan(&mut self, iface: &Interface, vlan: u16) -> Result<(), CoreError> {
        let key = iface.key.as_str();
        self.device.write(
            DummyCall::new(DummyOp::UntaggedVlan, key, vlan),
            Some(key),
            |s| {
                if !s.vlans.contains_key(&vlan) {
                    return Err(CoreError::Mutation {
                        description: format!("VLAN {vlan} does not exist on the device"),
                        details: String::new(),
                    });
                }
                let target = s.interfaces.get_mut(key).ok_or_else(|| missing_interface(key))?;
                target.untagged_vlan = vlan;
                Ok(())
            },
        )
    }

    async fn set_description(&mut self, iface: &Interface, text: &str) -> Result<(), CoreError> {
        let key = iface.key.as_str();
        self.device.write(
            DummyCall::new(DummyOp::Description, key, text),
            Some(key),
            |s| {
                let target = s.interfaces.get_mut(key).ok_or_else(|| missing_interface(key))?;
                text.clone_into(&mut target.description);
                Ok(())
            },
        )
    }

    async fn vlan_create(&mut self, id: u16, name: &str) -> Result<(), CoreError> {
        self.device
            .write(DummyCall::new(DummyOp::VlanCreate, id, name), None, |s| {
                if s.vlans.contains_key(&id) {
                    return Err(CoreError::Mutation {
                        description: format!("VLAN {id} already exists"),
                        details: String::new(),
                    });
                }
                s.vlans.insert(id, Vlan::new(id, name));
                Ok(())
            })
    }

    async fn vlan_edit(&mut self, id: u16, name: &str) -> Result<(), CoreError> {
        self.device
            .write(DummyCall::new(DummyOp::VlanEdit, id, name), None, |s| {
                let vlan = s.vlans.get_mut(&id).ok_or_else(|| CoreError::Mutation {
                    description: format!("VLAN {id} does not exist"),
                    details: String::new(),
                })?;
                name.clone_into(&mut vlan.name);
                Ok(())
            })
    }

    async fn vlan_delete(&mut self, id: u16) -> Result<(), CoreError> {
        self.device
            .write(DummyCall::new(DummyOp::VlanDelete, id, ""), None, |s| {
                s.vlans.remove(&id).map(|_| ()).ok_or_else(|| CoreError::Mutation {
                    description: format!("VLAN {id} does not exist"),
                    details: String::new(),
                })
            })
    }

    async fn save_running_config(&mut self) -> Result<(), CoreError> {
        self.device.write(
            DummyCall::new(DummyOp::SaveConfig, "", Utc::now().to_rfc3339()),
            None,
            |_| Ok(()),
        )
    }

    async fn run_command(&mut self, command: &str) -> Result<String, CoreError> {
        let name = self.device.lock().state.facts.name.clone();
        self.device
            .write(DummyCall::new(DummyOp::RunCommand, "", command), None, |_| Ok(()))?;
        Ok(format!("{name}# {command}\n% dummy output for '{command}'\n"))
    }
}

#[cfg(test)]
#[allow(clippy::unwrap_used)]
mod tests {
    use super::*;

    #[tokio::test]
    async fn writes_persist_in_device_truth() {
        let lab = DummyLab::new();
        let device = lab.device(7, "lab-7");
        let mut driver = DummyDriver::new(device.clone());

        let mut state = SwitchState::default();
        driver.read_basic(&mut state).await.unwrap();
        assert_eq!(state.interfaces.len(), 9);
        assert!(state.interfaces["1"].eth.is_empty());

        driver
            .set_description(&state.interfaces["3"], "lobby")
            .await
            .unwrap();

        let again = lab.device(7, "ignored");
        assert_eq!(again.interface("3").unwrap().description, "lobby");
        assert_eq!(
            again.calls(),
            vec![DummyCall::new(DummyOp::Description, "3", "lobby")]
        );
    }

    #[tokio::test]
    async fn injected_failure_is_scoped_to_interface() {
        let device = DummyDevice::lab("lab");
        device.fail(DummyOp::AdminStatus, Some("4"));
        let mut driver = DummyDriver::new(device.clone());
        let mut state = SwitchState::default();
        driver.read_basic(&mut state).await.unwrap();

        let err = driver
            .set_admin_status(&state.interfaces["4"], PortStatus::Down)
            .await
            .unwrap_err();
        assert!(err.to_string().contains("Simulated AdminStatus failure"));
        driver
            .set_admin_status(&state.interfaces["3"], PortStatus::Down)
            .await
            .unwrap();
        assert_eq!(device.calls().len(), 1);
    }

    #[tokio::test]
    async fn value_failure_only_hits_that_value() {
        let device = DummyDevice::lab("lab");
        device.fail_value(DummyOp::PoeStatus, None, PoeStatus::Enabled);
        let mut driver = DummyDriver::new(device.clone());
        let iface = device.interface("1").unwrap();

        driver.set_poe_status(&iface, PoeStatus::Disabled).await.unwrap();
        assert!(driver.set_poe_status(&iface, PoeStatus::Enabled).await.is_err());
        assert_eq!(
            device.interface("1").unwrap().poe.unwrap().admin_status,
            PoeStatus::Disabled
        );
    }

    #[tokio::test]
    async fn vlan_change_requires_existing_vlan() {
        let device = DummyDevice::lab("lab");
        let mut driver = DummyDriver::new(device.clone());
        let iface = device.interface("1").unwrap();
        assert!(driver.set_untagged_vlan(&iface, 99).await.is_err());
        driver.set_untagged_vlan(&iface, 30).await.unwrap();
        assert_eq!(device.interface("1").unwrap().untagged_vlan, 30);
    }
}
