// ── Credential resolution ──
//
// Every secret resolves in the same order: the env var named in the
// profile, the system keyring entry `<kind>/<profile>/<field>` under the
// `switchyard` service, then the plaintext value in the file.

use std::collections::BTreeSet;

use secrecy::SecretString;
use tracing::{debug, trace};

use switchyard_api::SnmpCredentials;
use switchyard_core::driver::DEFAULT_PROFILE;
use switchyard_core::{
    ApiProfile, ConnectorKind, CredentialProfiles, Device, SnmpProfile, SshProfile,
    TlsVerification,
};

use crate::{ApiProfileConfig, Config, ConfigError, SnmpProfileConfig, SnmpVersion, invalid};

pub const KEYRING_SERVICE: &str = "switchyard";

/// Keyring account name for one secret of one profile.
pub fn keyring_key(kind: &str, profile: &str, field: &str) -> String {
    format!("{kind}/{profile}/{field}")
}

/// Looks secrets up along the env → keyring → plaintext chain.
#[derive(Debug, Clone, Copy)]
pub struct SecretResolver {
    keyring: bool,
}

impl SecretResolver {
    pub fn new(keyring: bool) -> Self {
        Self { keyring }
    }

    pub fn resolve(
        &self,
        env_name: Option<&str>,
        keyring_key: &str,
        plaintext: Option<&str>,
    ) -> Option<SecretString> {
        // 1. Env var named by the profile
        if let Some(name) = env_name {
            if let Ok(value) = std::env::var(name) {
                trace!(env = name, "secret from environment");
                return Some(SecretString::from(value));
            }
        }

        // 2. System keyring
        if self.keyring {
            if let Ok(entry) = keyring::Entry::new(KEYRING_SERVICE, keyring_key) {
                if let Ok(secret) = entry.get_password() {
                    trace!(key = keyring_key, "secret from keyring");
                    return Some(SecretString::from(secret));
                }
            }
        }

        // 3. Plaintext in config
        plaintext.map(SecretString::from)
    }
}

/// Store a secret in the system keyring.
pub fn store_secret(key: &str, secret: &str) -> Result<(), ConfigError> {
    keyring::Entry::new(KEYRING_SERVICE, key)
        .and_then(|entry| entry.set_password(secret))
        .map_err(|e| ConfigError::Keyring(format!("cannot store '{key}': {e}")))
}

/// Remove a secret from the system keyring.
pub fn delete_secret(key: &str) -> Result<(), ConfigError> {
    keyring::Entry::new(KEYRING_SERVICE, key)
        .and_then(|entry| entry.delete_credential())
        .map_err(|e| ConfigError::Keyring(format!("cannot delete '{key}': {e}")))
}

// ── Profiles ────────────────────────────────────────────────────────

impl Config {
    /// Resolve every credential profile into its core form.
    ///
    /// Only profiles referenced by at least one device are resolved, so an
    /// unused profile with a missing secret is not an error.
    pub fn credential_profiles(&self) -> Result<CredentialProfiles, ConfigError> {
        let resolver = self.secret_resolver();
        let wanted = |uses: fn(ConnectorKind) -> bool, pick: fn(&Device) -> &Option<String>| {
            self.devices
                .iter()
                .filter(|d| uses(d.connector))
                .map(|d| pick(d).as_deref().unwrap_or(DEFAULT_PROFILE))
                .collect::<BTreeSet<&str>>()
        };
        let snmp_used = wanted(ConnectorKind::uses_snmp, |d| &d.snmp_profile);
        let api_used = wanted(ConnectorKind::uses_api, |d| &d.api_profile);

        let mut profiles = CredentialProfiles::default();
        for (name, cfg) in &self.snmp {
            if snmp_used.contains(name.as_str()) {
                profiles
                    .snmp
                    .insert(name.clone(), snmp_profile(&resolver, name, cfg)?);
            }
        }
        for (name, cfg) in &self.ssh {
            profiles.ssh.insert(
                name.clone(),
                SshProfile {
                    username: cfg.username.clone(),
                    password: resolver.resolve(
                        cfg.password_env.as_deref(),
                        &keyring_key("ssh", name, "password"),
                        cfg.password.as_deref(),
                    ),
                    identity_file: cfg.identity_file.clone(),
                    port: cfg.port,
                    verify_host_key: cfg.verify_host_key,
                    timeout: std::time::Duration::from_secs(cfg.timeout),
                    save_command: cfg.save_command.clone(),
                },
            );
        }
        for (name, cfg) in &self.api {
            if api_used.contains(name.as_str()) {
                profiles
                    .api
                    .insert(name.clone(), api_profile(&resolver, name, cfg)?);
            }
        }
        debug!(
            snmp = profiles.snmp.len(),
            ssh = profiles.ssh.len(),
            api = profiles.api.len(),
            "credential profiles resolved"
        );
        Ok(profiles)
    }
}

fn snmp_profile(
    resolver: &SecretResolver,
    name: &str,
    cfg: &SnmpProfileConfig,
) -> Result<SnmpProfile, ConfigError> {
    let missing = |secret| ConfigError::NoCredentials {
        kind: "SNMP",
        profile: name.to_owned(),
        secret,
    };

    let credentials = match cfg.version {
        SnmpVersion::V2c => {
            let community = resolver
                .resolve(
                    cfg.community_env.as_deref(),
                    &keyring_key("snmp", name, "community"),
                    cfg.community.as_deref(),
                )
                .ok_or_else(|| missing("community"))?;
            SnmpCredentials::V2c { community }
        }
        SnmpVersion::V3 => {
            let username = cfg
                .username
                .clone()
                .filter(|u| !u.is_empty())
                .ok_or_else(|| invalid(format!("snmp.{name}.username"), "required for SNMP v3"))?;
            let auth = match cfg.auth_protocol {
                Some(protocol) => {
                    let passphrase = resolver
                        .resolve(
                            cfg.auth_passphrase_env.as_deref(),
                            &keyring_key("snmp", name, "auth"),
                            cfg.auth_passphrase.as_deref(),
                        )
                        .ok_or_else(|| missing("auth passphrase"))?;
                    Some((protocol, passphrase))
                }
                None => None,
            };
            let privacy = match cfg.priv_protocol {
                Some(_) if auth.is_none() => {
                    return Err(invalid(
                        format!("snmp.{name}.priv_protocol"),
                        "privacy requires an auth protocol",
                    ));
                }
                Some(protocol) => {
                    let passphrase = resolver
                        .resolve(
                            cfg.priv_passphrase_env.as_deref(),
                            &keyring_key("snmp", name, "priv"),
                            cfg.priv_passphrase.as_deref(),
                        )
                        .ok_or_else(|| missing("privacy passphrase"))?;
                    Some((protocol, passphrase))
                }
                None => None,
            };
            SnmpCredentials::V3 {
                username,
                auth,
                privacy,
            }
        }
    };

    Ok(SnmpProfile {
        credentials,
        port: cfg.port,
    })
}

fn api_profile(
    resolver: &SecretResolver,
    name: &str,
    cfg: &ApiProfileConfig,
) -> Result<ApiProfile, ConfigError> {
    let password = resolver
        .resolve(
            cfg.password_env.as_deref(),
            &keyring_key("api", name, "password"),
            cfg.password.as_deref(),
        )
        .ok_or_else(|| ConfigError::NoCredentials {
            kind: "API",
            profile: name.to_owned(),
            secret: "password",
        })?;

    let tls = if cfg.insecure {
        TlsVerification::DangerAcceptInvalid
    } else if let Some(ref ca_path) = cfg.ca_cert {
        TlsVerification::CustomCa(ca_path.clone())
    } else {
        TlsVerification::SystemDefaults
    };

    Ok(ApiProfile {
        username: cfg.username.clone(),
        password,
        tls,
        port: cfg.port,
        api_version: cfg.api_version.clone(),
        timeout: std::time::Duration::from_secs(cfg.timeout),
    })
}
