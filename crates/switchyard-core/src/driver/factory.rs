// ── Driver construction ──
//
// Picks the driver for a device's connector and wires it to transports
// built from the device's credential profiles.

use std::sync::Arc;

use switchyard_api::{
    RestClient, SnmpTarget, SshConfig, SshTransport, TlsMode, TransportConfig, UdpSnmpTransport,
};
use tracing::debug;
use url::Url;

use super::{CommandDriver, Driver, DummyDriver, DummyLab, HybridDriver, RestDriver, SnmpDriver};
use crate::config::{CredentialProfiles, SnmpSettings, TlsVerification};
use crate::error::CoreError;
use crate::model::{ConnectorKind, Device};

/// Profile used when a device does not name one.
pub const DEFAULT_PROFILE: &str = "default";

/// Builds a driver for a device. The session manager owns one.
pub trait DriverFactory: Send + Sync {
    fn build(&self, device: &Device) -> Result<Driver, CoreError>;
}

/// Production factory: SNMP over UDP, SSH and HTTPS transports.
#[derive(Debug, Clone, Default)]
pub struct TransportFactory {
    profiles: CredentialProfiles,
    snmp: SnmpSettings,
    lab: DummyLab,
}

impl TransportFactory {
    pub fn new(profiles: CredentialProfiles, snmp: SnmpSettings) -> Self {
        Self {
            profiles,
            snmp,
            lab: DummyLab::new(),
        }
    }

    /// Share a lab with tests so they can inspect the simulated devices.
    #[must_use]
    pub fn with_lab(mut self, lab: DummyLab) -> Self {
        self.lab = lab;
        self
    }

    fn snmp_driver(&self, device: &Device) -> Result<SnmpDriver, CoreError> {
        let name = profile_name(device.snmp_profile.as_ref());
        let profile = self.profiles.snmp.get(name).ok_or_else(|| missing("SNMP", name))?;
        let target = SnmpTarget {
            host: device.hostname.clone(),
            port: profile.port,
            credentials: profile.credentials.clone(),
            timeout: self.snmp.timeout,
            retries: self.snmp.retries,
            max_repetitions: self.snmp.max_repetitions,
        };
        Ok(SnmpDriver::new(Arc::new(UdpSnmpTransport::new(target))))
    }

    fn ssh_transport(&self, device: &Device) -> Result<(SshTransport, String), CoreError> {
        let name = profile_name(device.ssh_profile.as_ref());
        let profile = self.profiles.ssh.get(name).ok_or_else(|| missing("SSH", name))?;
        let mut config = SshConfig::new(&device.hostname, &profile.username);
        config.port = profile.port;
        config.password.clone_from(&profile.password);
        config.identity_file.clone_from(&profile.identity_file);
        config.verify_host_key = profile.verify_host_key;
        config.command_timeout = profile.timeout;
        Ok((SshTransport::new(config), profile.save_command.clone()))
    }

    fn rest_driver(&self, device: &Device) -> Result<RestDriver, CoreError> {
        let name = profile_name(device.api_profile.as_ref());
        let profile = self.profiles.api.get(name).ok_or_else(|| missing("API", name))?;

        let host = if device.hostname.contains(':') {
            format!("[{}]", device.hostname)
        } else {
            device.hostname.clone()
        };
        let base = match profile.port {
            Some(port) => format!("https://{host}:{port}"),
            None => format!("https://{host}"),
        };
        let base_url = Url::parse(&base).map_err(|e| CoreError::Config {
            message: format!("invalid device address '{}': {e}", device.hostname),
        })?;

        let transport = TransportConfig {
            tls: match &profile.tls {
                TlsVerification::SystemDefaults => TlsMode::System,
                TlsVerification::CustomCa(path) => TlsMode::CustomCa(path.clone()),
                TlsVerification::DangerAcceptInvalid => TlsMode::DangerAcceptInvalid,
            },
            timeout: profile.timeout,
        };
        let mut client = RestClient::new(base_url, &transport)?;
        if let Some(version) = &profile.api_version {
            client = client.with_api_version(version.clone());
        }
        Ok(RestDriver::new(
            client,
            profile.username.clone(),
            profile.password.clone(),
        ))
    }
}

impl DriverFactory for TransportFactory {
    fn build(&self, device: &Device) -> Result<Driver, CoreError> {
        debug!(device = %device.name, connector = %device.connector, "building driver");
        Ok(match device.connector {
            ConnectorKind::Snmp => Driver::Snmp(self.snmp_driver(device)?),
            ConnectorKind::SnmpSsh => {
                let snmp = self.snmp_driver(device)?;
                let (ssh, save_command) = self.ssh_transport(device)?;
                Driver::Hybrid(
                    HybridDriver::new(snmp, Arc::new(ssh)).with_save_command(save_command),
                )
            }
            ConnectorKind::CommandsOnly => {
                let (ssh, _) = self.ssh_transport(device)?;
                Driver::Commands(CommandDriver::new(device, Arc::new(ssh)))
            }
            ConnectorKind::VendorApi => Driver::Rest(self.rest_driver(device)?),
            ConnectorKind::TestDummy => Driver::Dummy(DummyDriver::new(
                self.lab.device(device.id, &device.name),
            )),
        })
    }
}

fn profile_name(name: Option<&String>) -> &str {
    name.map_or(DEFAULT_PROFILE, String::as_str)
}

fn missing(kind: &str, name: &str) -> CoreError {
    CoreError::Config {
        message: format!("{kind} credential profile '{name}' is not configured"),
    }
}

#[cfg(test)]
#[allow(clippy::unwrap_used)]
mod tests {
    use super::*;
    use crate::driver::DeviceDriver;
    use crate::model::DeviceStatus;

    fn device(connector: ConnectorKind) -> Device {
        Device {
            id: 1,
            name: "sw1".into(),
            hostname: "10.0.0.2".into(),
            group_id: 1,
            connector,
            status: DeviceStatus::Active,
            description: None,
            read_only: false,
            snmp_profile: None,
            ssh_profile: None,
            api_profile: None,
        }
    }

    #[test]
    fn missing_profile_is_a_config_error() {
        let factory = TransportFactory::default();
        let Err(err) = factory.build(&device(ConnectorKind::Snmp)) else {
            panic!("expected a config error");
        };
        assert!(err.to_string().contains("SNMP credential profile 'default'"));
    }

    #[test]
    fn dummy_connector_needs_no_profiles() {
        let factory = TransportFactory::default();
        let driver = factory.build(&device(ConnectorKind::TestDummy)).unwrap();
        assert_eq!(driver.connector(), ConnectorKind::TestDummy);
    }
}
