//! CLI error types with miette diagnostics.
//!
//! Maps `CoreError` and `ConfigError` variants into user-facing errors with
//! actionable help text.

use miette::Diagnostic;
use thiserror::Error;

use switchyard_config::ConfigError;
use switchyard_core::CoreError;

/// Process exit codes.
pub mod exit_code {
    pub const GENERAL: i32 = 1;
    pub const USAGE: i32 = 2;
    pub const AUTH: i32 = 3;
    pub const NOT_FOUND: i32 = 4;
    pub const PERMISSION: i32 = 5;
    pub const CONFLICT: i32 = 6;
    pub const CONNECTION: i32 = 7;
    pub const TIMEOUT: i32 = 8;
}

#[derive(Debug, Error, Diagnostic)]
pub enum CliError {
    // ── Connection ───────────────────────────────────────────────────
    #[error("Could not connect to {device}")]
    #[diagnostic(
        code(switchyard::connection_failed),
        help(
            "{reason}\n\
             Check that the switch is reachable and its credential profile is correct."
        )
    )]
    ConnectionFailed { device: String, reason: String },

    #[error("Authentication failed")]
    #[diagnostic(
        code(switchyard::auth_failed),
        help(
            "{message}\n\
             Store the secret with: switchyard config set-secret <kind> <profile>"
        )
    )]
    AuthFailed { message: String },

    #[error("Device timed out after {seconds}s")]
    #[diagnostic(
        code(switchyard::timeout),
        help("Raise settings.snmp_timeout or check the switch's load.")
    )]
    Timeout { seconds: u64 },

    // ── Resources ────────────────────────────────────────────────────
    #[error("{resource_type} '{identifier}' not found")]
    #[diagnostic(
        code(switchyard::not_found),
        help("Run: switchyard {list_command} to see available {resource_type}s")
    )]
    NotFound {
        resource_type: String,
        identifier: String,
        list_command: String,
    },

    #[error("User '{name}' is not configured")]
    #[diagnostic(
        code(switchyard::unknown_user),
        help(
            "Add a [[users]] entry for '{name}' to {path},\n\
             or act as another user with --user."
        )
    )]
    UnknownUser { name: String, path: String },

    // ── Access ───────────────────────────────────────────────────────
    #[error("Access denied: {message}")]
    #[diagnostic(
        code(switchyard::access_denied),
        help("Ask an administrator for access to the switch group.")
    )]
    AccessDenied { message: String },

    // ── Device results ───────────────────────────────────────────────
    #[error("{description}")]
    #[diagnostic(code(switchyard::device_error), help("{details}"))]
    Device {
        description: String,
        details: String,
    },

    #[error("{message}")]
    #[diagnostic(code(switchyard::warning))]
    Warning { message: String },

    #[error("Operation not supported: {operation}")]
    #[diagnostic(
        code(switchyard::unsupported),
        help("The {connector} connector cannot do this.")
    )]
    Unsupported { operation: String, connector: String },

    #[error("Bulk edit finished with {errors} error(s) and {success} change(s)")]
    #[diagnostic(
        code(switchyard::bulk_edit_failed),
        help("See the output above; run `switchyard logs --switch <switch>` for details.")
    )]
    BulkEditFailed { success: usize, errors: usize },

    // ── Validation ───────────────────────────────────────────────────
    #[error("Invalid value for {field}: {reason}")]
    #[diagnostic(code(switchyard::validation))]
    Validation { field: String, reason: String },

    // ── Configuration ────────────────────────────────────────────────
    #[error(transparent)]
    #[diagnostic(
        code(switchyard::config),
        help("Check the file with: switchyard config validate")
    )]
    Config(#[from] ConfigError),

    #[error("Configuration file already exists")]
    #[diagnostic(
        code(switchyard::config_exists),
        help("Remove or edit {path} instead.")
    )]
    ConfigExists { path: String },

    // ── Interactive ──────────────────────────────────────────────────
    #[error("Operation '{action}' requires confirmation")]
    #[diagnostic(
        code(switchyard::confirmation_required),
        help("Use --yes (-y) to skip confirmation in non-interactive contexts.")
    )]
    NonInteractiveRequiresYes { action: String },

    // ── IO / Serialization ───────────────────────────────────────────
    #[error(transparent)]
    Io(#[from] std::io::Error),

    #[error("Cannot render JSON: {0}")]
    #[diagnostic(code(switchyard::json))]
    Json(#[from] serde_json::Error),

    #[error("Cannot render YAML: {0}")]
    #[diagnostic(code(switchyard::yaml))]
    Yaml(#[from] serde_yaml::Error),
}

impl CliError {
    /// Map this error to an exit code for process termination.
    pub fn exit_code(&self) -> i32 {
        match self {
            Self::ConnectionFailed { .. } => exit_code::CONNECTION,
            Self::AuthFailed { .. } => exit_code::AUTH,
            Self::NotFound { .. } | Self::UnknownUser { .. } => exit_code::NOT_FOUND,
            Self::ConfigExists { .. } => exit_code::CONFLICT,
            Self::Timeout { .. } => exit_code::TIMEOUT,
            Self::Validation { .. } | Self::NonInteractiveRequiresYes { .. } => exit_code::USAGE,
            Self::AccessDenied { .. } | Self::Unsupported { .. } => exit_code::PERMISSION,
            Self::Config(ConfigError::NoCredentials { .. }) => exit_code::AUTH,
            _ => exit_code::GENERAL,
        }
    }
}

// ── CoreError → CliError mapping ─────────────────────────────────────

impl From<CoreError> for CliError {
    fn from(err: CoreError) -> Self {
        let details = err.details();
        match err {
            CoreError::ConnectionFailed { device, reason } => {
                CliError::ConnectionFailed { device, reason }
            }

            CoreError::AuthenticationFailed { message } => CliError::AuthFailed { message },

            CoreError::Timeout { timeout_secs } => CliError::Timeout {
                seconds: timeout_secs,
            },

            CoreError::DeviceNotFound { identifier } => CliError::NotFound {
                resource_type: "switch".into(),
                identifier,
                list_command: "groups".into(),
            },

            CoreError::GroupNotFound { identifier } => CliError::NotFound {
                resource_type: "group".into(),
                identifier,
                list_command: "groups".into(),
            },

            CoreError::InterfaceNotFound { key } => CliError::NotFound {
                resource_type: "interface".into(),
                identifier: key,
                list_command: "show <switch>".into(),
            },

            CoreError::CommandNotFound { identifier } => CliError::NotFound {
                resource_type: "command".into(),
                identifier,
                list_command: "exec <switch> --list".into(),
            },

            CoreError::AccessDenied { message } => CliError::AccessDenied { message },

            CoreError::Validation { message } => CliError::Validation {
                field: "request".into(),
                reason: message,
            },

            CoreError::Warning { message } => CliError::Warning { message },

            CoreError::Unsupported {
                operation,
                connector,
            } => CliError::Unsupported {
                operation,
                connector,
            },

            CoreError::Config { message } => CliError::Config(ConfigError::Validation {
                field: "config".into(),
                reason: message,
            }),

            other => CliError::Device {
                description: other.description(),
                details,
            },
        }
    }
}

#[cfg(test)]
mod tests {
    use super::*;

    #[test]
    fn core_errors_keep_their_exit_codes() {
        let denied: CliError = CoreError::AccessDenied {
            message: "not in group".into(),
        }
        .into();
        assert_eq!(denied.exit_code(), exit_code::PERMISSION);

        let missing: CliError = CoreError::DeviceNotFound {
            identifier: "sw9".into(),
        }
        .into();
        assert_eq!(missing.exit_code(), exit_code::NOT_FOUND);
        assert_eq!(missing.to_string(), "switch 'sw9' not found");

        let invalid: CliError = CoreError::InvalidRequest {
            description: "Invalid values".into(),
            details: "vlan - cannot be blank!".into(),
        }
        .into();
        assert!(matches!(
            invalid,
            CliError::Device { ref details, .. } if details == "vlan - cannot be blank!"
        ));
        assert_eq!(invalid.exit_code(), exit_code::GENERAL);
    }
}
