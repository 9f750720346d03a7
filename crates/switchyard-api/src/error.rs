use thiserror::Error;

/// Top-level error type for the `switchyard-api` crate.
///
/// Covers every transport failure mode: HTTP, SSH sessions, SNMP agent
/// responses and vendor REST payloads.
/// `switchyard-core` maps these into its error taxonomy.
#[derive(Debug, Error)]
pub enum Error {
    // ── Authentication ──────────────────────────────────────────────
    /// Login failed or the session was rejected.
    #[error("Login rejected: {message}")]
    Authentication { message: String },

    // ── Transport ───────────────────────────────────────────────────
    /// The switch could not be reached over HTTPS.
    #[error("HTTP request failed: {0}")]
    Transport(#[from] reqwest::Error),

    #[error("Bad switch URL: {0}")]
    InvalidUrl(#[from] url::ParseError),

    /// No answer from the switch within the configured timeout.
    #[error("No response within {timeout_secs}s")]
    Timeout { timeout_secs: u64 },

    /// Certificate setup or verification failed.
    #[error("TLS: {0}")]
    Tls(String),

    // ── SSH ─────────────────────────────────────────────────────────
    /// The SSH session could not be set up or broke mid-command.
    #[error("SSH: {0}")]
    Ssh(#[from] russh::Error),

    /// A CLI command exited with a non-zero status.
    #[error("`{command}` exited with status {exit_code}: {output}")]
    CommandFailed {
        command: String,
        exit_code: u32,
        output: String,
    },

    // ── SNMP ────────────────────────────────────────────────────────
    /// The agent reported an error for the request.
    #[error("SNMP error: {message}")]
    Snmp { message: String },

    /// The requested OID does not exist on the agent.
    #[error("No such object: {oid}")]
    NoSuchObject { oid: String },

    /// An OID string could not be parsed.
    #[error("Invalid OID: {0}")]
    InvalidOid(String),

    // ── REST ────────────────────────────────────────────────────────
    /// Non-success response from the switch REST API.
    #[error("API error (HTTP {status}): {message}")]
    Api { status: u16, message: String },

    /// The response body did not match the expected shape. `body` keeps the
    /// raw payload for debug logs.
    #[error("Unexpected response: {message}")]
    Deserialization { message: String, body: String },

    #[error("Not supported by this transport: {0}")]
    UnsupportedOperation(&'static str),
}

impl Error {
    /// Returns `true` if the device reported the target as absent.
    pub fn is_not_found(&self) -> bool {
        match self {
            Self::NoSuchObject { .. } | Self::Api { status: 404, .. } => true,
            Self::Transport(e) => e.status() == Some(reqwest::StatusCode::NOT_FOUND),
            _ => false,
        }
    }
}
