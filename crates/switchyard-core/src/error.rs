// ── Core error types ──
//
// Every fallible operation returns one of these. Each variant renders a
// short description for the user and carries longer details where the
// device or transport supplied any. The `From<switchyard_api::Error>`
// impl translates transport failures into this taxonomy.

use serde::Serialize;
use thiserror::Error;

/// The user-visible pair rendered for a failed operation.
#[derive(Debug, Clone, PartialEq, Eq, Serialize)]
pub struct ErrorReport {
    pub description: String,
    pub details: String,
}

/// Unified error type for the core crate.
#[derive(Debug, Error)]
pub enum CoreError {
    // ── Connection errors ────────────────────────────────────────────
    #[error("Cannot connect to {device}: {reason}")]
    ConnectionFailed { device: String, reason: String },

    #[error("Authentication failed: {message}")]
    AuthenticationFailed { message: String },

    #[error("Device timed out after {timeout_secs}s")]
    Timeout { timeout_secs: u64 },

    /// A read against the device failed.
    #[error("{description}")]
    Transport { description: String, details: String },

    /// A detail or client read failed after the basic read succeeded.
    #[error("{description}")]
    PartialRead { description: String, details: String },

    // ── Request errors ───────────────────────────────────────────────
    #[error("{message}")]
    Validation { message: String },

    /// Nothing to do; rendered as a warning rather than an error.
    #[error("{message}")]
    Warning { message: String },

    /// One or more request values were rejected before any device call.
    #[error("{description}")]
    InvalidRequest { description: String, details: String },

    #[error("Access denied: {message}")]
    AccessDenied { message: String },

    // ── Device write errors ──────────────────────────────────────────
    #[error("{description}")]
    Mutation { description: String, details: String },

    #[error("Operation not supported: {operation} ({connector})")]
    Unsupported { operation: String, connector: String },

    // ── Data errors ──────────────────────────────────────────────────
    #[error("Device not found: {identifier}")]
    DeviceNotFound { identifier: String },

    #[error("Group not found: {identifier}")]
    GroupNotFound { identifier: String },

    #[error("Interface not found: {key}")]
    InterfaceNotFound { key: String },

    #[error("Command not found: {identifier}")]
    CommandNotFound { identifier: String },

    #[error("Device session not ready: {message}")]
    NotReady { message: String },

    // ── Configuration / internal ─────────────────────────────────────
    #[error("Configuration error: {message}")]
    Config { message: String },

    #[error("Internal error: {0}")]
    Internal(String),
}

impl CoreError {
    pub fn validation(message: impl Into<String>) -> Self {
        Self::Validation {
            message: message.into(),
        }
    }

    pub fn warning(message: impl Into<String>) -> Self {
        Self::Warning {
            message: message.into(),
        }
    }

    pub fn unsupported(operation: impl Into<String>, connector: impl ToString) -> Self {
        Self::Unsupported {
            operation: operation.into(),
            connector: connector.to_string(),
        }
    }

    /// Short description shown to the user.
    pub fn description(&self) -> String {
        self.to_string()
    }

    /// Longer explanation, empty when there is nothing beyond the description.
    pub fn details(&self) -> String {
        match self {
            Self::Transport { details, .. }
            | Self::PartialRead { details, .. }
            | Self::Mutation { details, .. }
            | Self::InvalidRequest { details, .. } => details.clone(),
            Self::ConnectionFailed { reason, .. } => reason.clone(),
            _ => String::new(),
        }
    }

    pub fn report(&self) -> ErrorReport {
        ErrorReport {
            description: self.description(),
            details: self.details(),
        }
    }

    pub fn is_warning(&self) -> bool {
        matches!(self, Self::Warning { .. })
    }

    /// Re-frame a device failure as a failed write of `what`.
    ///
    /// Request-level errors (validation, access, unsupported) pass through.
    pub fn into_mutation(self, what: &str) -> Self {
        match self {
            Self::Mutation { .. }
            | Self::Validation { .. }
            | Self::InvalidRequest { .. }
            | Self::Warning { .. }
            | Self::AccessDenied { .. }
            | Self::Unsupported { .. }
            | Self::InterfaceNotFound { .. }
            | Self::NotReady { .. } => self,
            other => Self::Mutation {
                description: what.to_owned(),
                details: other.to_string(),
            },
        }
    }

    /// Re-frame a failed optional read as a partial-read warning.
    pub fn into_partial(self, what: &str) -> Self {
        match self {
            Self::PartialRead { .. } => self,
            other => Self::PartialRead {
                description: what.to_owned(),
                details: other.to_string(),
            },
        }
    }
}

// ── Conversion from transport-layer errors ───────────────────────────

impl From<switchyard_api::Error> for CoreError {
    fn from(err: switchyard_api::Error) -> Self {
        use switchyard_api::Error as Api;
        match err {
            Api::Authentication { message } => CoreError::AuthenticationFailed { message },
            Api::Transport(ref e) if e.is_connect() => CoreError::ConnectionFailed {
                device: e
                    .url()
                    .and_then(|u| u.host_str().map(String::from))
                    .unwrap_or_else(|| "<unknown>".into()),
                reason: e.to_string(),
            },
            Api::Transport(ref e) if e.is_timeout() => CoreError::Timeout { timeout_secs: 0 },
            Api::Transport(e) => CoreError::Transport {
                description: "HTTP request failed".into(),
                details: e.to_string(),
            },
            Api::InvalidUrl(e) => CoreError::Config {
                message: format!("Invalid URL: {e}"),
            },
            Api::Timeout { timeout_secs } => CoreError::Timeout { timeout_secs },
            Api::Tls(msg) => CoreError::ConnectionFailed {
                device: String::new(),
                reason: format!("TLS error: {msg}"),
            },
            Api::Ssh(e) => CoreError::Transport {
                description: "SSH session failed".into(),
                details: e.to_string(),
            },
            Api::CommandFailed {
                command, output, ..
            } => CoreError::Transport {
                description: format!("Command '{command}' failed"),
                details: output,
            },
            Api::Snmp { message } => CoreError::Transport {
                description: "SNMP error".into(),
                details: message,
            },
            Api::NoSuchObject { oid } => CoreError::Transport {
                description: "Object not available on device".into(),
                details: oid,
            },
            Api::InvalidOid(oid) => CoreError::Internal(format!("invalid OID {oid}")),
            Api::Api { status, message } => CoreError::Transport {
                description: format!("Device API error (HTTP {status})"),
                details: message,
            },
            Api::Deserialization { message, body: _ } => CoreError::Transport {
                description: "Invalid device response".into(),
                details: message,
            },
            Api::UnsupportedOperation(op) => CoreError::Unsupported {
                operation: op.to_owned(),
                connector: "transport".into(),
            },
        }
    }
}

#[cfg(test)]
#[allow(clippy::unwrap_used)]
mod tests {
    use super::*;

    #[test]
    fn snmp_failure_maps_to_transport_with_details() {
        let err: CoreError = switchyard_api::Error::Snmp {
            message: "Reason: notWritable".into(),
        }
        .into();
        assert_eq!(err.description(), "SNMP error");
        assert_eq!(err.details(), "Reason: notWritable");
    }

    #[test]
    fn failed_command_reports_device_output() {
        let err: CoreError = switchyard_api::Error::CommandFailed {
            command: "show version".into(),
            exit_code: 1,
            output: "% Invalid input".into(),
        }
        .into();
        assert_eq!(err.description(), "Command 'show version' failed");
        assert_eq!(err.details(), "% Invalid input");
    }

    #[test]
    fn into_mutation_keeps_request_errors() {
        let err = CoreError::validation("bad vlan").into_mutation("Error setting vlan");
        assert!(matches!(err, CoreError::Validation { .. }));

        let err = CoreError::Timeout { timeout_secs: 4 }.into_mutation("Error setting vlan");
        let report = err.report();
        assert_eq!(report.description, "Error setting vlan");
        assert_eq!(report.details, "Device timed out after 4s");
    }
}
