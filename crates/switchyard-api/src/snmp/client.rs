// ── async-snmp backed transport ──
//
// BER encoding and USM security are handled by the `async-snmp` client.
// Values cross the boundary as raw varbinds, so octet strings such as
// PhysAddress keep their bytes regardless of any display hint.

use std::net::Ipv4Addr;
use std::time::Duration;

use async_snmp::{Auth, Client, ErrorStatus, UdpClient, Value};
use async_trait::async_trait;
use secrecy::{ExposeSecret, SecretString};
use serde::{Deserialize, Serialize};
use tokio::sync::OnceCell;
use tracing::{debug, trace};

use super::{Oid, SnmpTransport, SnmpValue, Varbind};
use crate::error::Error;

// ── Credentials ─────────────────────────────────────────────────────

#[derive(Debug, Clone, Copy, PartialEq, Eq, Serialize, Deserialize)]
#[serde(rename_all = "kebab-case")]
pub enum AuthProtocol {
    Md5,
    Sha,
    Sha224,
    Sha256,
    Sha384,
    Sha512,
}

impl From<AuthProtocol> for async_snmp::AuthProtocol {
    fn from(proto: AuthProtocol) -> Self {
        match proto {
            AuthProtocol::Md5 => Self::Md5,
            AuthProtocol::Sha => Self::Sha1,
            AuthProtocol::Sha224 => Self::Sha224,
            AuthProtocol::Sha256 => Self::Sha256,
            AuthProtocol::Sha384 => Self::Sha384,
            AuthProtocol::Sha512 => Self::Sha512,
        }
    }
}

#[derive(Debug, Clone, Copy, PartialEq, Eq, Serialize, Deserialize)]
#[serde(rename_all = "kebab-case")]
pub enum PrivProtocol {
    Des,
    Aes,
    Aes192,
    Aes256,
}

impl From<PrivProtocol> for async_snmp::PrivProtocol {
    fn from(proto: PrivProtocol) -> Self {
        match proto {
            PrivProtocol::Des => Self::Des,
            PrivProtocol::Aes => Self::Aes128,
            PrivProtocol::Aes192 => Self::Aes192,
            PrivProtocol::Aes256 => Self::Aes256,
        }
    }
}

/// SNMP security parameters for one device.
#[derive(Debug, Clone)]
pub enum SnmpCredentials {
    V2c {
        community: SecretString,
    },
    V3 {
        username: String,
        auth: Option<(AuthProtocol, SecretString)>,
        privacy: Option<(PrivProtocol, SecretString)>,
    },
}

impl SnmpCredentials {
    fn auth(&self) -> Auth {
        match self {
            Self::V2c { community } => Auth::v2c(community.expose_secret()),
            Self::V3 {
                username,
                auth,
                privacy,
            } => {
                let mut usm = Auth::usm(username.as_str());
                if let Some((proto, pass)) = auth {
                    usm = usm.auth((*proto).into(), pass.expose_secret());
                    // Privacy without authentication is not a valid USM level
                    if let Some((proto, pass)) = privacy {
                        usm = usm.privacy((*proto).into(), pass.expose_secret());
                    }
                }
                usm.into()
            }
        }
    }
}

/// Everything needed to address one agent.
#[derive(Debug, Clone)]
pub struct SnmpTarget {
    pub host: String,
    pub port: u16,
    pub credentials: SnmpCredentials,
    pub timeout: Duration,
    pub retries: u32,
    pub max_repetitions: u32,
}

impl SnmpTarget {
    fn address(&self) -> String {
        if self.host.contains(':') {
            format!("[{}]:{}", self.host, self.port)
        } else {
            format!("{}:{}", self.host, self.port)
        }
    }
}

// ── Transport ───────────────────────────────────────────────────────

/// [`SnmpTransport`] over UDP. The socket is opened on first use and
/// reused for the lifetime of the transport.
pub struct UdpSnmpTransport {
    target: SnmpTarget,
    client: OnceCell<UdpClient>,
}

impl std::fmt::Debug for UdpSnmpTransport {
    fn fmt(&self, f: &mut std::fmt::Formatter<'_>) -> std::fmt::Result {
        f.debug_struct("UdpSnmpTransport")
            .field("target", &self.target)
            .finish_non_exhaustive()
    }
}

impl UdpSnmpTransport {
    pub fn new(target: SnmpTarget) -> Self {
        Self {
            target,
            client: OnceCell::new(),
        }
    }

    pub fn target(&self) -> &SnmpTarget {
        &self.target
    }

    async fn client(&self) -> Result<&UdpClient, Error> {
        self.client
            .get_or_try_init(|| async {
                debug!(agent = %self.target.address(), "opening SNMP client");
                Client::builder(self.target.address(), self.target.credentials.auth())
                    .timeout(self.target.timeout)
                    .retries(self.target.retries.try_into().unwrap_or(1))
                    .connect()
                    .await
                    .map_err(|e| self.agent_error(e, None))
            })
            .await
    }

    fn agent_error(&self, err: async_snmp::Error, oid: Option<&Oid>) -> Error {
        match err {
            async_snmp::Error::Timeout { .. } => Error::Timeout {
                timeout_secs: self.target.timeout.as_secs(),
            },
            async_snmp::Error::Snmp {
                status: ErrorStatus::NoSuchName,
                ..
            } => Error::NoSuchObject {
                oid: oid.map(ToString::to_string).unwrap_or_default(),
            },
            other => Error::Snmp {
                message: other.to_string(),
            },
        }
    }
}

#[async_trait]
impl SnmpTransport for UdpSnmpTransport {
    async fn get(&self, oid: &Oid) -> Result<SnmpValue, Error> {
        debug!(host = %self.target.host, %oid, "snmp get");
        let client = self.client().await?;
        let varbind = client
            .get(&to_agent_oid(oid))
            .await
            .map_err(|e| self.agent_error(e, Some(oid)))?;
        let value = from_agent_value(varbind.value);
        if value.is_missing() {
            return Err(Error::NoSuchObject {
                oid: oid.to_string(),
            });
        }
        Ok(value)
    }

    async fn walk(&self, base: &Oid) -> Result<Vec<Varbind>, Error> {
        debug!(host = %self.target.host, %base, "snmp walk");
        let client = self.client().await?;
        let varbinds = client
            .bulk_walk(
                to_agent_oid(base),
                self.target.max_repetitions.max(1).try_into().unwrap_or(10),
            )
            .collect()
            .await
            .map_err(|e| self.agent_error(e, Some(base)))?;

        let rows: Vec<Varbind> = varbinds
            .into_iter()
            .map(|vb| (from_agent_oid(&vb.oid), from_agent_value(vb.value)))
            .filter(|(oid, value)| oid.starts_with(base) && !value.is_missing())
            .collect();
        trace!(%base, rows = rows.len(), "walk complete");
        Ok(rows)
    }

    async fn set(&self, oid: &Oid, value: &SnmpValue) -> Result<(), Error> {
        let value = to_agent_value(value)?;
        debug!(host = %self.target.host, %oid, "snmp set");
        let client = self.client().await?;
        client
            .set(&to_agent_oid(oid), value)
            .await
            .map(|_| ())
            .map_err(|e| self.agent_error(e, Some(oid)))
    }
}

// ── Value conversion ────────────────────────────────────────────────

fn to_agent_oid(oid: &Oid) -> async_snmp::Oid {
    async_snmp::Oid::from_slice(oid.parts())
}

fn from_agent_oid(oid: &async_snmp::Oid) -> Oid {
    Oid::new(oid.arcs().to_vec())
}

/// Map a decoded varbind value into the transport-neutral form.
pub fn from_agent_value(value: Value) -> SnmpValue {
    match value {
        Value::Integer(v) => SnmpValue::Integer(i64::from(v)),
        Value::OctetString(bytes) => SnmpValue::OctetString(bytes.to_vec()),
        Value::ObjectIdentifier(oid) => SnmpValue::ObjectId(from_agent_oid(&oid)),
        Value::IpAddress(octets) => SnmpValue::IpAddress(Ipv4Addr::from(octets)),
        Value::Counter32(v) => SnmpValue::Counter32(v),
        Value::Gauge32(v) => SnmpValue::Gauge32(v),
        Value::TimeTicks(v) => SnmpValue::TimeTicks(v),
        Value::Counter64(v) => SnmpValue::Counter64(v),
        Value::NoSuchObject => SnmpValue::NoSuchObject,
        Value::NoSuchInstance => SnmpValue::NoSuchInstance,
        Value::EndOfMibView => SnmpValue::EndOfMibView,
        other => {
            trace!(value = ?other, "unhandled SNMP type");
            SnmpValue::Null
        }
    }
}

/// Map a value to write into its wire form. Counters and exception
/// markers are read-only.
pub fn to_agent_value(value: &SnmpValue) -> Result<Value, Error> {
    Ok(match value {
        SnmpValue::Integer(v) => Value::Integer(
            i32::try_from(*v).map_err(|_| Error::UnsupportedOperation("integer out of range"))?,
        ),
        SnmpValue::OctetString(bytes) => Value::OctetString(bytes.clone().into()),
        SnmpValue::ObjectId(oid) => Value::ObjectIdentifier(to_agent_oid(oid)),
        SnmpValue::IpAddress(ip) => Value::IpAddress(ip.octets()),
        SnmpValue::Gauge32(v) => Value::Gauge32(*v),
        SnmpValue::TimeTicks(v) => Value::TimeTicks(*v),
        SnmpValue::Null => Value::Null,
        _ => return Err(Error::UnsupportedOperation("SNMP set of a read-only type")),
    })
}

#[cfg(test)]
#[allow(clippy::unwrap_used)]
mod tests {
    use pretty_assertions::assert_eq;

    use super::*;

    #[test]
    fn physical_addresses_keep_raw_bytes() {
        let mac = [0xb8, 0x27, 0xeb, 0x01, 0x02, 0x03];
        let value = from_agent_value(Value::OctetString(mac.to_vec().into()));
        assert_eq!(value.as_bytes().unwrap(), &mac);
    }

    #[test]
    fn scalar_types_map_across() {
        assert_eq!(from_agent_value(Value::Integer(2)), SnmpValue::Integer(2));
        assert_eq!(
            from_agent_value(Value::IpAddress([10, 0, 0, 7])),
            SnmpValue::IpAddress(Ipv4Addr::new(10, 0, 0, 7))
        );
        assert_eq!(
            from_agent_value(Value::Counter64(99)),
            SnmpValue::Counter64(99)
        );
        assert!(from_agent_value(Value::NoSuchInstance).is_missing());
    }

    #[test]
    fn oids_convert_both_ways() {
        let oid = Oid::from([1, 3, 6, 1, 2, 1, 17, 7, 1, 4, 5, 1, 1, 12]);
        assert_eq!(from_agent_oid(&to_agent_oid(&oid)), oid);
    }

    #[test]
    fn writable_values() {
        let Value::OctetString(bytes) = to_agent_value(&SnmpValue::string("uplink")).unwrap()
        else {
            panic!("expected an octet string");
        };
        assert_eq!(&bytes[..], b"uplink");
        assert!(matches!(
            to_agent_value(&SnmpValue::Integer(2)).unwrap(),
            Value::Integer(2)
        ));
    }

    #[test]
    fn counters_are_not_writable() {
        assert!(to_agent_value(&SnmpValue::Counter32(1)).is_err());
        assert!(to_agent_value(&SnmpValue::Integer(i64::from(u32::MAX))).is_err());
    }

    #[test]
    fn ipv6_hosts_are_bracketed() {
        let target = SnmpTarget {
            host: "2001:db8::2".into(),
            port: 161,
            credentials: SnmpCredentials::V2c {
                community: SecretString::from("public"),
            },
            timeout: Duration::from_secs(2),
            retries: 1,
            max_repetitions: 10,
        };
        assert_eq!(target.address(), "[2001:db8::2]:161");
    }
}
