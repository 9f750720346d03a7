//! Configuration for switchyard.
//!
//! One TOML file carries the tunables, named credential profiles and the
//! inventory (switch groups, devices, users, command definitions). Loading
//! layers built-in defaults, the file and `SWITCHYARD_`-prefixed
//! environment variables. Secrets resolve env var → system keyring →
//! plaintext and are handed to `switchyard_core` as `SecretString`s.

mod credentials;

use std::collections::{BTreeMap, BTreeSet};
use std::path::{Path, PathBuf};
use std::time::Duration;

use directories::ProjectDirs;
use figment::{
    Figment,
    providers::{Env, Format, Serialized, Toml},
};
use serde::{Deserialize, Serialize};
use thiserror::Error;

use switchyard_api::snmp::{AuthProtocol, PrivProtocol};
use switchyard_core::driver::DEFAULT_PROFILE;
use switchyard_core::{
    CommandCatalog, CommandDefinition, CommandTemplate, CoreConfig, Device,
    SnmpSettings, StaticInventory, SwitchGroup, User,
};

pub use credentials::{KEYRING_SERVICE, SecretResolver, delete_secret, keyring_key, store_secret};

/// Prefix of environment variables that override file values.
/// Nested keys are separated by `__`, e.g. `SWITCHYARD_SETTINGS__POE_TOGGLE_DELAY`.
pub const ENV_PREFIX: &str = "SWITCHYARD_";

// ── Error ───────────────────────────────────────────────────────────

#[derive(Debug, Error)]
pub enum ConfigError {
    #[error("invalid {field}: {reason}")]
    Validation { field: String, reason: String },

    #[error("no {secret} configured for {kind} profile '{profile}'")]
    NoCredentials {
        kind: &'static str,
        profile: String,
        secret: &'static str,
    },

    #[error("device '{device}' uses {kind} profile '{profile}', which is not configured")]
    UnknownProfile {
        device: String,
        kind: &'static str,
        profile: String,
    },

    #[error("keyring error: {0}")]
    Keyring(String),

    #[error("failed to serialize config: {0}")]
    Serialization(#[from] toml::ser::Error),

    #[error("config loading failed: {0}")]
    Figment(Box<figment::Error>),

    #[error("IO error: {0}")]
    Io(#[from] std::io::Error),
}

impl From<figment::Error> for ConfigError {
    fn from(err: figment::Error) -> Self {
        Self::Figment(Box::new(err))
    }
}

fn invalid(field: impl Into<String>, reason: impl Into<String>) -> ConfigError {
    ConfigError::Validation {
        field: field.into(),
        reason: reason.into(),
    }
}

// ── TOML config structs ─────────────────────────────────────────────

/// The whole configuration file.
#[derive(Debug, Clone, Default, Deserialize, Serialize)]
pub struct Config {
    #[serde(default)]
    pub defaults: Defaults,

    #[serde(default)]
    pub settings: Settings,

    /// SNMP credential profiles by name.
    #[serde(default)]
    pub snmp: BTreeMap<String, SnmpProfileConfig>,

    #[serde(default)]
    pub ssh: BTreeMap<String, SshProfileConfig>,

    /// Vendor REST API profiles by name.
    #[serde(default)]
    pub api: BTreeMap<String, ApiProfileConfig>,

    #[serde(default)]
    pub groups: Vec<SwitchGroup>,

    #[serde(default)]
    pub devices: Vec<Device>,

    #[serde(default)]
    pub users: Vec<User>,

    #[serde(default)]
    pub commands: Vec<CommandDefinition>,

    #[serde(default)]
    pub templates: Vec<CommandTemplate>,
}

/// Front-end defaults.
#[derive(Debug, Clone, Deserialize, Serialize)]
pub struct Defaults {
    #[serde(default = "default_output")]
    pub output: String,

    #[serde(default = "default_color")]
    pub color: String,

    /// Acting user when none is given on the command line.
    pub user: Option<String>,

    /// Where cached sessions and the activity log live.
    pub data_dir: Option<PathBuf>,

    /// Look secrets up in the system keyring.
    #[serde(default = "default_true")]
    pub keyring: bool,
}

impl Default for Defaults {
    fn default() -> Self {
        Self {
            output: default_output(),
            color: default_color(),
            user: None,
            data_dir: None,
            keyring: true,
        }
    }
}

fn default_output() -> String {
    "table".into()
}
fn default_color() -> String {
    "auto".into()
}
fn default_true() -> bool {
    true
}

/// Behavioral tunables. Durations are in seconds.
#[derive(Debug, Clone, PartialEq, Eq, Deserialize, Serialize)]
#[serde(default)]
pub struct Settings {
    pub poe_toggle_delay: u64,
    pub port_toggle_delay: u64,
    pub always_allow_poe_toggle: bool,
    /// Interface descriptions starting with a match cannot be set or changed.
    pub iface_alias_not_allow_regex: String,
    /// Leading part of a description kept when it is replaced.
    pub iface_alias_keep_beginning_regex: String,
    pub snmp_timeout: u64,
    pub snmp_retries: u32,
    pub snmp_max_repetitions: u32,
    pub session_max_age: u64,
    pub recent_log_count: usize,
}

impl Default for Settings {
    fn default() -> Self {
        Self {
            poe_toggle_delay: 5,
            port_toggle_delay: 5,
            always_allow_poe_toggle: false,
            iface_alias_not_allow_regex: String::new(),
            iface_alias_keep_beginning_regex: String::new(),
            snmp_timeout: 4,
            snmp_retries: 3,
            snmp_max_repetitions: 10,
            session_max_age: 1800,
            recent_log_count: 25,
        }
    }
}

impl Settings {
    pub fn to_core_config(&self) -> CoreConfig {
        let pattern = |s: &str| (!s.is_empty()).then(|| s.to_owned());
        CoreConfig {
            poe_toggle_delay: Duration::from_secs(self.poe_toggle_delay),
            port_toggle_delay: Duration::from_secs(self.port_toggle_delay),
            always_allow_poe_toggle: self.always_allow_poe_toggle,
            description_deny_pattern: pattern(&self.iface_alias_not_allow_regex),
            description_keep_prefix: pattern(&self.iface_alias_keep_beginning_regex),
            snmp: SnmpSettings {
                timeout: Duration::from_secs(self.snmp_timeout),
                retries: self.snmp_retries,
                max_repetitions: self.snmp_max_repetitions,
            },
            session_max_age: Duration::from_secs(self.session_max_age),
            recent_log_count: self.recent_log_count,
        }
    }
}

#[derive(Debug, Clone, Copy, PartialEq, Eq, Default, Deserialize, Serialize)]
#[serde(rename_all = "lowercase")]
pub enum SnmpVersion {
    #[default]
    V2c,
    V3,
}

/// SNMP credentials. Each secret may come from an env var named by the
/// `*_env` field, the keyring, or the plaintext field.
#[derive(Debug, Clone, Deserialize, Serialize)]
pub struct SnmpProfileConfig {
    #[serde(default)]
    pub version: SnmpVersion,
    pub community: Option<String>,
    pub community_env: Option<String>,
    /// v3 security name.
    pub username: Option<String>,
    pub auth_protocol: Option<AuthProtocol>,
    pub auth_passphrase: Option<String>,
    pub auth_passphrase_env: Option<String>,
    pub priv_protocol: Option<PrivProtocol>,
    pub priv_passphrase: Option<String>,
    pub priv_passphrase_env: Option<String>,
    #[serde(default = "default_snmp_port")]
    pub port: u16,
}

fn default_snmp_port() -> u16 {
    161
}

#[derive(Debug, Clone, Deserialize, Serialize)]
pub struct SshProfileConfig {
    pub username: String,
    /// Used when the switch offers password authentication.
    pub password: Option<String>,
    pub password_env: Option<String>,
    /// Private key for public-key authentication.
    pub identity_file: Option<PathBuf>,
    #[serde(default = "default_ssh_port")]
    pub port: u16,
    #[serde(default = "default_true")]
    pub verify_host_key: bool,
    #[serde(default = "default_ssh_timeout")]
    pub timeout: u64,
    #[serde(default = "default_save_command")]
    pub save_command: String,
}

fn default_ssh_port() -> u16 {
    22
}
fn default_ssh_timeout() -> u64 {
    15
}
fn default_save_command() -> String {
    "write memory".into()
}

#[derive(Debug, Clone, Deserialize, Serialize)]
pub struct ApiProfileConfig {
    pub username: String,
    /// Plaintext; prefer the keyring or `password_env`.
    pub password: Option<String>,
    pub password_env: Option<String>,
    /// Accept self-signed certificates.
    #[serde(default)]
    pub insecure: bool,
    pub ca_cert: Option<PathBuf>,
    pub port: Option<u16>,
    pub api_version: Option<String>,
    #[serde(default = "default_api_timeout")]
    pub timeout: u64,
}

fn default_api_timeout() -> u64 {
    30
}

// ── Config file path ────────────────────────────────────────────────

fn project_dirs() -> Option<ProjectDirs> {
    ProjectDirs::from("net", "switchyard", "switchyard")
}

/// Resolve the config file path via XDG / platform conventions.
pub fn config_path() -> PathBuf {
    project_dirs().map_or_else(
        || home_fallback().join("config.toml"),
        |dirs| dirs.config_dir().join("config.toml"),
    )
}

fn home_fallback() -> PathBuf {
    let mut p = PathBuf::from(std::env::var("HOME").unwrap_or_else(|_| ".".into()));
    p.push(".config");
    p.push("switchyard");
    p
}

// ── Config loading ──────────────────────────────────────────────────

/// Load the configuration from the canonical path and the environment.
pub fn load_config() -> Result<Config, ConfigError> {
    load_config_from(&config_path())
}

/// Load the configuration from `path` and the environment. A missing file
/// yields the defaults.
pub fn load_config_from(path: &Path) -> Result<Config, ConfigError> {
    let figment = Figment::new()
        .merge(Serialized::defaults(Config::default()))
        .merge(Toml::file(path))
        .merge(Env::prefixed(ENV_PREFIX).split("__"));

    let config: Config = figment.extract()?;
    tracing::debug!(
        path = %path.display(),
        groups = config.groups.len(),
        devices = config.devices.len(),
        "configuration loaded"
    );
    Ok(config)
}

// ── Config saving ───────────────────────────────────────────────────

pub fn save_config(cfg: &Config) -> Result<(), ConfigError> {
    save_config_to(cfg, &config_path())
}

/// Serialize config to TOML and write it to `path`, creating parent
/// directories as needed.
pub fn save_config_to(cfg: &Config, path: &Path) -> Result<(), ConfigError> {
    if let Some(parent) = path.parent() {
        std::fs::create_dir_all(parent)?;
    }
    let toml_str = toml::to_string_pretty(cfg)?;
    std::fs::write(path, toml_str)?;
    Ok(())
}

// ── Translation into core types ─────────────────────────────────────

impl Config {
    pub fn core_config(&self) -> CoreConfig {
        self.settings.to_core_config()
    }

    pub fn inventory(&self) -> StaticInventory {
        StaticInventory::new(self.groups.clone(), self.devices.clone(), self.users.clone())
    }

    pub fn catalog(&self) -> CommandCatalog {
        CommandCatalog::new(self.commands.clone(), self.templates.clone())
    }

    /// Directory for cached sessions and the activity log.
    pub fn data_dir(&self) -> PathBuf {
        self.defaults.data_dir.clone().unwrap_or_else(|| {
            project_dirs().map_or_else(
                || home_fallback().join("data"),
                |dirs| dirs.data_dir().to_path_buf(),
            )
        })
    }

    pub fn secret_resolver(&self) -> SecretResolver {
        SecretResolver::new(self.defaults.keyring)
    }

    /// Cross-reference checks the TOML schema cannot express.
    pub fn validate(&self) -> Result<(), ConfigError> {
        unique("groups", self.groups.iter().map(|g| g.id))?;
        unique("devices", self.devices.iter().map(|d| d.id))?;
        unique("commands", self.commands.iter().map(|c| c.id))?;
        unique("templates", self.templates.iter().map(|t| t.id))?;

        let mut names = BTreeSet::new();
        for user in &self.users {
            if !names.insert(user.name.as_str()) {
                return Err(invalid("users", format!("duplicate user '{}'", user.name)));
            }
        }

        let group_ids: BTreeSet<u32> = self.groups.iter().map(|g| g.id).collect();
        for device in &self.devices {
            if !group_ids.contains(&device.group_id) {
                return Err(invalid(
                    format!("devices.{}", device.name),
                    format!("group {} does not exist", device.group_id),
                ));
            }
            self.check_profiles(device)?;
        }
        Ok(())
    }

    fn check_profiles(&self, device: &Device) -> Result<(), ConfigError> {
        let connector = device.connector;
        let profile = |name: &Option<String>| name.as_deref().unwrap_or(DEFAULT_PROFILE).to_owned();
        let missing = |kind: &'static str, name: &Option<String>| ConfigError::UnknownProfile {
            device: device.name.clone(),
            kind,
            profile: profile(name),
        };

        if connector.uses_snmp() && !self.snmp.contains_key(&profile(&device.snmp_profile)) {
            return Err(missing("SNMP", &device.snmp_profile));
        }
        if connector.uses_ssh() && !self.ssh.contains_key(&profile(&device.ssh_profile)) {
            return Err(missing("SSH", &device.ssh_profile));
        }
        if connector.uses_api() && !self.api.contains_key(&profile(&device.api_profile)) {
            return Err(missing("API", &device.api_profile));
        }
        Ok(())
    }
}

fn unique(field: &str, ids: impl Iterator<Item = u32>) -> Result<(), ConfigError> {
    let mut seen = BTreeSet::new();
    for id in ids {
        if !seen.insert(id) {
            return Err(invalid(field, format!("duplicate id {id}")));
        }
    }
    Ok(())
}

#[cfg(test)]
#[allow(clippy::unwrap_used)]
mod tests {
    use figment::Jail;
    use pretty_assertions::assert_eq;
    use switchyard_core::ConnectorKind;

    use super::*;

    const LAB: &str = r#"
        [settings]
        poe_toggle_delay = 3
        iface_alias_not_allow_regex = "UPLINK"

        [snmp.default]
        community = "public"

        [[groups]]
        id = 1
        name = "Library"
        members = ["alice"]
        vlans = [10, 20]

        [[devices]]
        id = 1
        name = "lib-sw1"
        hostname = "10.1.0.2"
        group_id = 1

        [[devices]]
        id = 2
        name = "lib-lab"
        hostname = "lab"
        group_id = 1
        connector = "test-dummy"

        [[users]]
        name = "alice"
        edit_vlans = true

        [[commands]]
        id = 1
        name = "uptime"
        command = "show uptime"
    "#;

    #[test]
    fn missing_file_yields_defaults() {
        Jail::expect_with(|_| {
            let cfg = load_config_from(Path::new("absent.toml")).map_err(|e| e.to_string())?;
            assert_eq!(cfg.settings, Settings::default());
            assert_eq!(cfg.defaults.output, "table");
            assert!(cfg.devices.is_empty());
            Ok(())
        });
    }

    #[test]
    fn file_then_environment() {
        Jail::expect_with(|jail| {
            jail.create_file("switchyard.toml", LAB)?;
            jail.set_env("SWITCHYARD_SETTINGS__POE_TOGGLE_DELAY", "9");
            jail.set_env("SWITCHYARD_DEFAULTS__OUTPUT", "json");

            let cfg = load_config_from(Path::new("switchyard.toml")).map_err(|e| e.to_string())?;
            assert_eq!(cfg.settings.poe_toggle_delay, 9);
            assert_eq!(cfg.defaults.output, "json");
            assert_eq!(cfg.devices.len(), 2);
            assert_eq!(cfg.devices[1].connector, ConnectorKind::TestDummy);
            assert!(cfg.users[0].edit_vlans);
            assert!(cfg.users[0].bulk_edit);
            cfg.validate().map_err(|e| e.to_string())?;

            let core = cfg.core_config();
            assert_eq!(core.poe_toggle_delay, Duration::from_secs(9));
            assert_eq!(core.description_deny_pattern.as_deref(), Some("UPLINK"));
            assert_eq!(core.description_keep_prefix, None);
            Ok(())
        });
    }

    #[test]
    fn validation_catches_dangling_references() {
        let mut cfg: Config = toml::from_str(LAB).unwrap();
        cfg.devices[0].group_id = 7;
        assert!(matches!(
            cfg.validate(),
            Err(ConfigError::Validation { ref reason, .. }) if reason == "group 7 does not exist"
        ));

        let mut cfg: Config = toml::from_str(LAB).unwrap();
        cfg.devices[0].connector = ConnectorKind::SnmpSsh;
        let err = cfg.validate().unwrap_err();
        assert_eq!(
            err.to_string(),
            "device 'lib-sw1' uses SSH profile 'default', which is not configured"
        );

        let mut cfg: Config = toml::from_str(LAB).unwrap();
        cfg.devices[1].id = 1;
        assert!(cfg.validate().is_err());
    }

    #[test]
    fn saved_config_creates_directories() {
        let dir = tempfile::tempdir().unwrap();
        let path = dir.path().join("nested/config.toml");
        let cfg: Config = toml::from_str(LAB).unwrap();
        save_config_to(&cfg, &path).unwrap();

        let text = std::fs::read_to_string(&path).unwrap();
        assert!(text.contains("[settings]"));
        assert!(text.contains("lib-sw1"));
    }
}
