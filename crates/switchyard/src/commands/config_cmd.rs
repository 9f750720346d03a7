//! Config subcommand handlers.

use dialoguer::Password;

use switchyard_config::{self as config, Config};

use crate::cli::{ConfigArgs, ConfigCommand, GlobalOpts, OutputFormat, SecretKind};
use crate::context;
use crate::error::CliError;
use crate::output;

const REDACTED: &str = "********";

/// Written by `config init`.
const STARTER: &str = r#"# switchyard configuration

[defaults]
output = "table"
# user = "netops"
# data_dir = "/var/lib/switchyard"

[settings]
poe_toggle_delay = 5
port_toggle_delay = 5
# Descriptions matching this are refused, e.g. "^(UPLINK|CORE)"
iface_alias_not_allow_regex = ""

# Secrets resolve from the env var, then the keyring
# (switchyard config set-secret community default), then plaintext.
[snmp.default]
version = "v2c"
community_env = "SWITCHYARD_COMMUNITY"

[[groups]]
id = 1
name = "Lab"
members = ["netops"]
vlans = [1, 10, 20]

[[devices]]
id = 1
name = "lab-sw1"
hostname = "lab-sw1.example.net"
group_id = 1
connector = "test-dummy"

[[users]]
name = "netops"
is_staff = true
edit_vlans = true
"#;

/// Map a dialoguer / interactive I/O failure into CliError.
fn prompt_err(e: impl std::fmt::Display) -> CliError {
    CliError::Validation {
        field: "interactive".into(),
        reason: format!("prompt failed: {e}"),
    }
}

/// Copy of the config with every plaintext secret masked.
fn redacted(cfg: &Config) -> Config {
    let mask = |s: &mut Option<String>| {
        if s.is_some() {
            *s = Some(REDACTED.into());
        }
    };
    let mut cfg = cfg.clone();
    for profile in cfg.snmp.values_mut() {
        mask(&mut profile.community);
        mask(&mut profile.auth_passphrase);
        mask(&mut profile.priv_passphrase);
    }
    for profile in cfg.ssh.values_mut() {
        mask(&mut profile.password);
    }
    for profile in cfg.api.values_mut() {
        mask(&mut profile.password);
    }
    cfg
}

pub fn handle(args: ConfigArgs, global: &GlobalOpts) -> Result<(), CliError> {
    let path = context::config_file(global);
    match args.command {
        ConfigCommand::Init => {
            if path.exists() {
                return Err(CliError::ConfigExists {
                    path: path.display().to_string(),
                });
            }
            if let Some(parent) = path.parent() {
                std::fs::create_dir_all(parent)?;
            }
            std::fs::write(&path, STARTER)?;
            if !global.quiet {
                eprintln!("Wrote {}", path.display());
            }
            Ok(())
        }

        ConfigCommand::Path => {
            output::print_output(&path.display().to_string(), global.quiet);
            Ok(())
        }

        ConfigCommand::Show => {
            let cfg = redacted(&config::load_config_from(&path)?);
            let format = context::output_format(global, &cfg);
            let out = if format == OutputFormat::Table {
                toml::to_string_pretty(&cfg).map_err(config::ConfigError::from)?
            } else {
                output::render_single(format, &cfg, |_| String::new(), |c| {
                    c.devices
                        .iter()
                        .map(|d| d.name.clone())
                        .collect::<Vec<_>>()
                        .join("\n")
                })?
            };
            output::print_output(&out, global.quiet);
            Ok(())
        }

        ConfigCommand::Validate => {
            let cfg = config::load_config_from(&path)?;
            cfg.validate()?;
            let profiles = cfg.credential_profiles()?;
            // Patterns are compiled by the core; catch bad ones here too
            switchyard_core::EditPolicy::compile(&cfg.core_config())?;
            if !global.quiet {
                eprintln!(
                    "{}: {} group(s), {} switch(es), {} user(s), {} SNMP / {} SSH / {} API profile(s) OK",
                    path.display(),
                    cfg.groups.len(),
                    cfg.devices.len(),
                    cfg.users.len(),
                    profiles.snmp.len(),
                    profiles.ssh.len(),
                    profiles.api.len(),
                );
            }
            Ok(())
        }

        ConfigCommand::SetSecret { kind, profile } => {
            let key = secret_key(kind, &profile);
            let secret = Password::new()
                .with_prompt(format!("Secret for {key}"))
                .interact()
                .map_err(prompt_err)?;
            if secret.is_empty() {
                return Err(CliError::Validation {
                    field: "secret".into(),
                    reason: "cannot be empty".into(),
                });
            }
            config::store_secret(&key, &secret)?;
            if !global.quiet {
                eprintln!("Stored {key} in the system keyring");
            }
            Ok(())
        }

        ConfigCommand::DeleteSecret { kind, profile } => {
            let key = secret_key(kind, &profile);
            config::delete_secret(&key)?;
            if !global.quiet {
                eprintln!("Removed {key} from the system keyring");
            }
            Ok(())
        }
    }
}

fn secret_key(kind: SecretKind, profile: &str) -> String {
    let (section, field) = kind.keyring_parts();
    config::keyring_key(section, profile, field)
}

#[cfg(test)]
#[allow(clippy::unwrap_used)]
mod tests {
    use super::*;

    #[test]
    fn starter_config_is_valid() {
        let cfg: Config = toml::from_str(STARTER).unwrap();
        cfg.validate().unwrap();
        assert_eq!(cfg.devices[0].name, "lab-sw1");
        assert!(cfg.users[0].is_staff);
    }

    #[test]
    fn secrets_are_masked() {
        let mut cfg: Config = toml::from_str(STARTER).unwrap();
        cfg.snmp.get_mut("default").unwrap().community = Some("public".into());
        let shown = redacted(&cfg);
        assert_eq!(shown.snmp["default"].community.as_deref(), Some(REDACTED));
        assert_eq!(shown.snmp["default"].auth_passphrase, None);
    }

    #[test]
    fn keyring_keys_follow_the_profile_layout() {
        assert_eq!(secret_key(SecretKind::SnmpPriv, "core"), "snmp/core/priv");
        assert_eq!(secret_key(SecretKind::ApiPassword, "default"), "api/default/password");
        assert_eq!(secret_key(SecretKind::SshPassword, "legacy"), "ssh/legacy/password");
    }
}
