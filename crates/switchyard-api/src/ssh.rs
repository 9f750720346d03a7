// ── CLI command transport ──
//
// Commands-only and hybrid drivers need to run CLI commands on the switch.
// `SshTransport` keeps one authenticated russh session per device and runs
// each command on its own exec channel.

use std::path::PathBuf;
use std::sync::Arc;
use std::time::Duration;

use async_trait::async_trait;
use russh::client::{AuthResult, Handle};
use russh::keys::{HashAlg, PrivateKeyWithHashAlg, PublicKey};
use russh::{ChannelMsg, Disconnect, MethodKind};
use secrecy::{ExposeSecret, SecretString};
use tokio::sync::Mutex;
use tracing::{debug, warn};

use crate::error::Error;

/// Run a command on a device and return its textual output.
#[async_trait]
pub trait CommandTransport: Send + Sync {
    async fn execute(&self, command: &str) -> Result<String, Error>;
}

/// Connection parameters for [`SshTransport`].
#[derive(Debug, Clone)]
pub struct SshConfig {
    pub host: String,
    pub port: u16,
    pub username: String,
    pub password: Option<SecretString>,
    pub identity_file: Option<PathBuf>,
    /// When false, unknown and changed host keys are accepted.
    pub verify_host_key: bool,
    pub connect_timeout: Duration,
    pub command_timeout: Duration,
}

impl SshConfig {
    pub fn new(host: impl Into<String>, username: impl Into<String>) -> Self {
        Self {
            host: host.into(),
            port: 22,
            username: username.into(),
            password: None,
            identity_file: None,
            verify_host_key: true,
            connect_timeout: Duration::from_secs(10),
            command_timeout: Duration::from_secs(30),
        }
    }
}

/// Host key policy for one connection.
struct HostKeys {
    host: String,
    port: u16,
    verify: bool,
}

impl russh::client::Handler for HostKeys {
    type Error = russh::Error;

    async fn check_server_key(&mut self, key: &PublicKey) -> Result<bool, Self::Error> {
        if !self.verify {
            return Ok(true);
        }
        match russh::keys::check_known_hosts(&self.host, self.port, key) {
            Ok(known) => {
                if !known {
                    warn!(host = %self.host, "host key is not in known_hosts");
                }
                Ok(known)
            }
            Err(e) => {
                warn!(host = %self.host, error = %e, "host key check failed");
                Ok(false)
            }
        }
    }
}

/// [`CommandTransport`] over SSH.
pub struct SshTransport {
    config: SshConfig,
    session: Mutex<Option<Handle<HostKeys>>>,
}

impl std::fmt::Debug for SshTransport {
    fn fmt(&self, f: &mut std::fmt::Formatter<'_>) -> std::fmt::Result {
        f.debug_struct("SshTransport")
            .field("host", &self.config.host)
            .field("username", &self.config.username)
            .finish_non_exhaustive()
    }
}

impl SshTransport {
    pub fn new(config: SshConfig) -> Self {
        Self {
            config,
            session: Mutex::new(None),
        }
    }

    pub fn config(&self) -> &SshConfig {
        &self.config
    }

    async fn connect(&self) -> Result<Handle<HostKeys>, Error> {
        let c = &self.config;
        debug!(host = %c.host, port = c.port, "opening ssh session");
        let client_config = Arc::new(russh::client::Config {
            inactivity_timeout: Some(c.command_timeout),
            ..Default::default()
        });
        let handler = HostKeys {
            host: c.host.clone(),
            port: c.port,
            verify: c.verify_host_key,
        };
        let mut handle = tokio::time::timeout(
            c.connect_timeout,
            russh::client::connect(client_config, (c.host.as_str(), c.port), handler),
        )
        .await
        .map_err(|_| Error::Timeout {
            timeout_secs: c.connect_timeout.as_secs(),
        })??;

        self.authenticate(&mut handle).await?;
        Ok(handle)
    }

    /// Try the methods the server offers, in its order of preference.
    async fn authenticate(&self, handle: &mut Handle<HostKeys>) -> Result<(), Error> {
        let c = &self.config;
        let methods = match handle.authenticate_none(&c.username).await? {
            AuthResult::Success => return Ok(()),
            AuthResult::Failure {
                remaining_methods, ..
            } => remaining_methods,
        };

        for method in methods.iter().copied() {
            let result = match method {
                MethodKind::PublicKey => {
                    let Some(path) = &c.identity_file else {
                        continue;
                    };
                    let key = russh::keys::load_secret_key(path, None).map_err(|e| {
                        Error::Authentication {
                            message: format!("cannot load key {}: {e}", path.display()),
                        }
                    })?;
                    let key = PrivateKeyWithHashAlg::new(Arc::new(key), Some(HashAlg::Sha512));
                    handle.authenticate_publickey(&c.username, key).await?
                }
                MethodKind::Password => {
                    let Some(password) = &c.password else {
                        continue;
                    };
                    handle
                        .authenticate_password(&c.username, password.expose_secret())
                        .await?
                }
                other => {
                    debug!(method = ?other, "skipping ssh auth method");
                    continue;
                }
            };
            if matches!(result, AuthResult::Success) {
                debug!(host = %c.host, method = ?method, "ssh authenticated");
                return Ok(());
            }
            warn!(host = %c.host, method = ?method, "ssh authentication rejected");
        }

        Err(Error::Authentication {
            message: format!("{}@{}: no accepted ssh credentials", c.username, c.host),
        })
    }

    async fn run(&self, handle: &Handle<HostKeys>, command: &str) -> Result<String, Error> {
        let mut channel = handle.channel_open_session().await?;
        channel.exec(true, command).await?;

        let mut stdout = Vec::new();
        let mut stderr = Vec::new();
        let mut exit_code = None;
        while let Some(msg) = channel.wait().await {
            match msg {
                ChannelMsg::Data { ref data } => stdout.extend_from_slice(data),
                ChannelMsg::ExtendedData { ref data, ext: 1 } => stderr.extend_from_slice(data),
                ChannelMsg::ExitStatus { exit_status } => exit_code = Some(exit_status),
                _ => {}
            }
        }

        let stdout = String::from_utf8_lossy(&stdout).into_owned();
        match exit_code {
            Some(0) | None => Ok(stdout),
            Some(code) => Err(Error::CommandFailed {
                command: command.to_owned(),
                exit_code: code,
                output: output_for_error(&stdout, &String::from_utf8_lossy(&stderr)),
            }),
        }
    }

    /// Close the session, if one is open.
    pub async fn close(&self) {
        if let Some(handle) = self.session.lock().await.take() {
            let _ = handle
                .disconnect(Disconnect::ByApplication, "", "en")
                .await;
        }
    }
}

#[async_trait]
impl CommandTransport for SshTransport {
    async fn execute(&self, command: &str) -> Result<String, Error> {
        debug!(host = %self.config.host, command, "ssh execute");
        let mut session = self.session.lock().await;
        if session.as_ref().is_none_or(Handle::is_closed) {
            *session = Some(self.connect().await?);
        }
        let Some(handle) = session.as_ref() else {
            return Err(Error::Authentication {
                message: "ssh session unavailable".into(),
            });
        };

        let result = tokio::time::timeout(self.config.command_timeout, self.run(handle, command))
            .await
            .map_err(|_| Error::Timeout {
                timeout_secs: self.config.command_timeout.as_secs(),
            })
            .and_then(|r| r);
        if result.is_err() {
            // Start from a fresh session next time
            *session = None;
        }
        result
    }
}

fn output_for_error(stdout: &str, stderr: &str) -> String {
    let stderr = stderr.trim();
    if stderr.is_empty() {
        stdout.trim().to_owned()
    } else {
        stderr.to_owned()
    }
}

#[cfg(test)]
mod tests {
    use super::*;

    #[test]
    fn defaults_verify_host_keys() {
        let config = SshConfig::new("sw1.example.net", "netops");
        assert!(config.verify_host_key);
        assert_eq!(config.port, 22);
        assert!(config.password.is_none());
    }

    #[test]
    fn debug_output_hides_credentials() {
        let mut config = SshConfig::new("sw1", "netops");
        config.password = Some(SecretString::from("hunter2"));
        let text = format!("{:?}", SshTransport::new(config));
        assert!(text.contains("sw1"));
        assert!(!text.contains("hunter2"));
    }

    #[test]
    fn failed_commands_prefer_stderr() {
        assert_eq!(output_for_error("% Invalid input\n", ""), "% Invalid input");
        assert_eq!(output_for_error("ignored", " denied \n"), "denied");
    }
}
