//! Device transports for switchyard.
//!
//! Three ways of talking to a managed switch live here, each behind a small
//! async contract so the drivers in `switchyard-core` can be exercised
//! against fakes:
//!
//! - **[`SnmpTransport`]**: `get` / `walk` / `set` over SNMP. The shipped
//!   [`UdpSnmpTransport`] speaks v2c and v3 through `async-snmp`.
//! - **[`CommandTransport`]**: run a CLI command and collect its output.
//!   [`SshTransport`] keeps one `russh` session per device.
//! - **[`RestClient`]**: cookie-session HTTP client for AOS-CX style
//!   switch REST APIs, built on `reqwest` via [`TransportConfig`].

pub mod error;
pub mod rest;
pub mod snmp;
pub mod ssh;
pub mod transport;

pub use error::Error;
pub use rest::RestClient;
pub use snmp::{Oid, SnmpCredentials, SnmpTarget, SnmpTransport, SnmpValue, UdpSnmpTransport};
pub use ssh::{CommandTransport, SshConfig, SshTransport};
pub use transport::{TlsMode, TransportConfig};
