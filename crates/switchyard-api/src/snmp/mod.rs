// ── SNMP transport ──
//
// `SnmpTransport` is the contract drivers program against. The shipped
// implementation speaks SNMP over UDP through `async-snmp`; tests
// substitute in-memory agents.

mod client;
mod oid;
mod value;

use async_trait::async_trait;

use crate::error::Error;

pub use client::{
    AuthProtocol, PrivProtocol, SnmpCredentials, SnmpTarget, UdpSnmpTransport, from_agent_value,
    to_agent_value,
};
pub use oid::Oid;
pub use value::SnmpValue;

/// A single `(oid, value)` pair returned by the agent.
pub type Varbind = (Oid, SnmpValue);

/// Minimal SNMP operations needed to manage a switch.
#[async_trait]
pub trait SnmpTransport: Send + Sync {
    /// Fetch a single scalar or table cell.
    async fn get(&self, oid: &Oid) -> Result<SnmpValue, Error>;

    /// Walk the subtree rooted at `base`. An absent subtree yields an empty list.
    async fn walk(&self, base: &Oid) -> Result<Vec<Varbind>, Error>;

    /// Write a single value.
    async fn set(&self, oid: &Oid, value: &SnmpValue) -> Result<(), Error>;
}
