// ── Runtime configuration ──
//
// Tunables, credential profiles and the compiled description policy.
// The config crate builds these from files and environment and hands
// them in; core never reads config files.

use std::collections::HashMap;
use std::path::PathBuf;
use std::time::Duration;

use regex::Regex;
use secrecy::SecretString;
use switchyard_api::SnmpCredentials;

use crate::error::CoreError;

// ── Tunables ─────────────────────────────────────────────────────────

/// SNMP request tuning shared by every SNMP profile.
#[derive(Debug, Clone, PartialEq, Eq)]
pub struct SnmpSettings {
    pub timeout: Duration,
    pub retries: u32,
    pub max_repetitions: u32,
}

impl Default for SnmpSettings {
    fn default() -> Self {
        Self {
            timeout: Duration::from_secs(4),
            retries: 3,
            max_repetitions: 10,
        }
    }
}

/// Behavioral knobs consumed by sessions, the change orchestrator and
/// the controller.
#[derive(Debug, Clone)]
pub struct CoreConfig {
    /// Pause between the disable and enable halves of a PoE cycle.
    pub poe_toggle_delay: Duration,
    /// Pause between admin down and admin up of an interface bounce.
    pub port_toggle_delay: Duration,
    /// Allow PoE toggling on interfaces that are otherwise not manageable.
    pub always_allow_poe_toggle: bool,
    /// Descriptions matching this pattern (anchored at the start) are rejected.
    pub description_deny_pattern: Option<String>,
    /// Leading part of an existing description that must be preserved.
    pub description_keep_prefix: Option<String>,
    pub snmp: SnmpSettings,
    /// Cached sessions older than this are re-read from the device.
    pub session_max_age: Duration,
    /// Recent activity records shown with a switch view.
    pub recent_log_count: usize,
}

impl Default for CoreConfig {
    fn default() -> Self {
        Self {
            poe_toggle_delay: Duration::from_secs(5),
            port_toggle_delay: Duration::from_secs(5),
            always_allow_poe_toggle: false,
            description_deny_pattern: None,
            description_keep_prefix: None,
            snmp: SnmpSettings::default(),
            session_max_age: Duration::from_secs(1800),
            recent_log_count: 25,
        }
    }
}

// ── Credential profiles ──────────────────────────────────────────────

/// TLS verification strategy for REST-managed devices.
#[derive(Debug, Clone, Default, PartialEq, Eq)]
pub enum TlsVerification {
    /// System CA store (strict).
    #[default]
    SystemDefaults,
    /// Custom CA certificate file.
    CustomCa(PathBuf),
    /// Skip verification (self-signed certs).
    DangerAcceptInvalid,
}

#[derive(Debug, Clone)]
pub struct SnmpProfile {
    pub credentials: SnmpCredentials,
    pub port: u16,
}

#[derive(Debug, Clone)]
pub struct SshProfile {
    pub username: String,
    pub password: Option<SecretString>,
    pub identity_file: Option<PathBuf>,
    pub port: u16,
    pub verify_host_key: bool,
    pub timeout: Duration,
    /// Command that persists the running configuration.
    pub save_command: String,
}

#[derive(Debug, Clone)]
pub struct ApiProfile {
    pub username: String,
    pub password: SecretString,
    pub tls: TlsVerification,
    pub port: Option<u16>,
    pub api_version: Option<String>,
    pub timeout: Duration,
}

/// Named credential profiles referenced by devices.
#[derive(Debug, Clone, Default)]
pub struct CredentialProfiles {
    pub snmp: HashMap<String, SnmpProfile>,
    pub ssh: HashMap<String, SshProfile>,
    pub api: HashMap<String, ApiProfile>,
}

// ── Description policy ───────────────────────────────────────────────

/// How a new description combines with the current one.
#[derive(Debug, Clone, Copy, PartialEq, Eq, Default, serde::Serialize, serde::Deserialize, strum::Display)]
#[serde(rename_all = "lowercase")]
pub enum DescriptionMode {
    #[default]
    Replace,
    Append,
}

/// Compiled description rules.
#[derive(Debug, Clone, Default)]
pub struct EditPolicy {
    deny: Option<Regex>,
    keep: Option<Regex>,
}

impl EditPolicy {
    pub fn compile(config: &CoreConfig) -> Result<Self, CoreError> {
        Ok(Self {
            deny: anchored(config.description_deny_pattern.as_deref())?,
            keep: anchored(config.description_keep_prefix.as_deref())?,
        })
    }

    /// Whether `text` is rejected by the deny pattern.
    pub fn is_denied(&self, text: &str) -> bool {
        self.deny.as_ref().is_some_and(|re| re.is_match(text))
    }

    /// The description that results from applying `new` to `current`.
    ///
    /// Append joins with a space. Replace preserves the part of the
    /// current description matched by the keep pattern, unless the new
    /// text already starts with such a prefix.
    pub fn compose(&self, current: &str, new: &str, mode: DescriptionMode) -> String {
        match mode {
            DescriptionMode::Append => {
                if current.is_empty() {
                    new.to_owned()
                } else {
                    format!("{current} {new}")
                }
            }
            DescriptionMode::Replace => {
                let Some(keep) = &self.keep else {
                    return new.to_owned();
                };
                match keep.find(current) {
                    Some(m) if !keep.is_match(new) => format!("{} {new}", m.as_str()),
                    _ => new.to_owned(),
                }
            }
        }
    }
}

fn anchored(pattern: Option<&str>) -> Result<Option<Regex>, CoreError> {
    match pattern {
        None => Ok(None),
        Some(p) if p.is_empty() => Ok(None),
        Some(p) => Regex::new(&format!("^(?:{p})"))
            .map(Some)
            .map_err(|e| CoreError::Config {
                message: format!("invalid description pattern '{p}': {e}"),
            }),
    }
}
