use std::net::Ipv4Addr;

use serde::{Deserialize, Serialize};

use super::oid::Oid;

/// A decoded SNMP value.
#[derive(Debug, Clone, PartialEq, Eq, Serialize, Deserialize)]
#[serde(tag = "type", content = "value", rename_all = "snake_case")]
pub enum SnmpValue {
    Integer(i64),
    OctetString(Vec<u8>),
    ObjectId(Oid),
    IpAddress(Ipv4Addr),
    Counter32(u32),
    Counter64(u64),
    Gauge32(u32),
    TimeTicks(u32),
    Null,
    NoSuchObject,
    NoSuchInstance,
    EndOfMibView,
}

impl SnmpValue {
    /// Convenience constructor for string values.
    pub fn string(text: impl Into<String>) -> Self {
        Self::OctetString(text.into().into_bytes())
    }

    /// `true` for the three "nothing here" exception markers.
    pub fn is_missing(&self) -> bool {
        matches!(
            self,
            Self::NoSuchObject | Self::NoSuchInstance | Self::EndOfMibView
        )
    }

    pub fn as_i64(&self) -> Option<i64> {
        match self {
            Self::Integer(v) => Some(*v),
            Self::Counter32(v) | Self::Gauge32(v) | Self::TimeTicks(v) => Some(i64::from(*v)),
            Self::Counter64(v) => i64::try_from(*v).ok(),
            _ => None,
        }
    }

    pub fn as_u64(&self) -> Option<u64> {
        match self {
            Self::Integer(v) => u64::try_from(*v).ok(),
            Self::Counter32(v) | Self::Gauge32(v) | Self::TimeTicks(v) => Some(u64::from(*v)),
            Self::Counter64(v) => Some(*v),
            _ => None,
        }
    }

    pub fn as_bytes(&self) -> Option<&[u8]> {
        match self {
            Self::OctetString(bytes) => Some(bytes),
            _ => None,
        }
    }

    /// Octet string as text, with trailing NULs stripped.
    pub fn as_text(&self) -> Option<String> {
        self.as_bytes().map(|b| {
            String::from_utf8_lossy(b)
                .trim_end_matches('\0')
                .to_owned()
        })
    }

    pub fn as_oid(&self) -> Option<&Oid> {
        match self {
            Self::ObjectId(oid) => Some(oid),
            _ => None,
        }
    }

    pub fn as_ip(&self) -> Option<Ipv4Addr> {
        match self {
            Self::IpAddress(ip) => Some(*ip),
            Self::OctetString(b) if b.len() == 4 => Some(Ipv4Addr::new(b[0], b[1], b[2], b[3])),
            _ => None,
        }
    }
}

#[cfg(test)]
#[allow(clippy::unwrap_used)]
mod tests {
    use super::*;

    #[test]
    fn text_strips_trailing_nuls() {
        let v = SnmpValue::OctetString(b"Gi1/0/1\0\0".to_vec());
        assert_eq!(v.as_text().unwrap(), "Gi1/0/1");
    }

    #[test]
    fn four_byte_strings_read_as_addresses() {
        let v = SnmpValue::OctetString(vec![10, 0, 0, 1]);
        assert_eq!(v.as_ip(), Some(Ipv4Addr::new(10, 0, 0, 1)));
        assert_eq!(SnmpValue::Counter32(1).as_u64(), Some(1));
        assert!(SnmpValue::NoSuchInstance.is_missing());
    }
}
