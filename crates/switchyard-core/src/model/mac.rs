// ── MacAddress ──
//
// Devices report MACs as raw octets (SNMP), colon or dash strings (REST)
// or Cisco-style dotted quads (CLI). All normalize to aa:bb:cc:dd:ee:ff.

use std::fmt;
use std::str::FromStr;

use serde::{Deserialize, Serialize};

/// MAC address, normalized to lowercase colon-separated format.
#[derive(Debug, Clone, PartialEq, Eq, Hash, PartialOrd, Ord, Serialize, Deserialize)]
pub struct MacAddress(String);

impl MacAddress {
    /// Create a normalized MAC address from any common format.
    /// Accepts colon-separated, dash-separated, dotted or bare hex.
    pub fn new(raw: impl AsRef<str>) -> Self {
        let hex: String = raw
            .as_ref()
            .chars()
            .filter(char::is_ascii_hexdigit)
            .map(|c| c.to_ascii_lowercase())
            .collect();
        if hex.len() != 12 {
            return Self(raw.as_ref().to_lowercase().replace('-', ":"));
        }
        let pairs: Vec<&str> = (0..6).map(|i| &hex[i * 2..i * 2 + 2]).collect();
        Self(pairs.join(":"))
    }

    /// From six raw octets, as found in SNMP table indexes and values.
    pub fn from_bytes(bytes: &[u8]) -> Option<Self> {
        if bytes.len() != 6 {
            return None;
        }
        let parts: Vec<String> = bytes.iter().map(|b| format!("{b:02x}")).collect();
        Some(Self(parts.join(":")))
    }

    pub fn as_str(&self) -> &str {
        &self.0
    }

    /// Organizationally unique identifier, e.g. `00:1a:2b`.
    pub fn oui(&self) -> &str {
        self.0.get(..8).unwrap_or(&self.0)
    }

    /// Vendor name from the built-in OUI table, if known.
    pub fn vendor(&self) -> Option<&'static str> {
        let oui = self.oui();
        OUI_VENDORS
            .iter()
            .find(|(prefix, _)| *prefix == oui)
            .map(|(_, vendor)| *vendor)
    }
}

impl fmt::Display for MacAddress {
    fn fmt(&self, f: &mut fmt::Formatter<'_>) -> fmt::Result {
        write!(f, "{}", self.0)
    }
}

impl FromStr for MacAddress {
    type Err = std::convert::Infallible;

    fn from_str(s: &str) -> Result<Self, Self::Err> {
        Ok(Self::new(s))
    }
}

/// Common vendors seen on campus access ports.
const OUI_VENDORS: &[(&str, &str)] = &[
    ("00:00:0c", "Cisco"),
    ("00:1a:a1", "Cisco"),
    ("00:0b:86", "Aruba"),
    ("94:b4:0f", "Aruba"),
    ("00:1a:1e", "Aruba"),
    ("3c:4a:92", "HP"),
    ("98:e7:f4", "HP"),
    ("00:04:f2", "Polycom"),
    ("64:16:7f", "Polycom"),
    ("00:1b:17", "Palo Alto Networks"),
    ("00:50:56", "VMware"),
    ("00:0c:29", "VMware"),
    ("b8:27:eb", "Raspberry Pi"),
    ("dc:a6:32", "Raspberry Pi"),
    ("00:14:22", "Dell"),
    ("f8:bc:12", "Dell"),
    ("ac:de:48", "Apple"),
    ("f0:18:98", "Apple"),
    ("00:1b:21", "Intel"),
    ("3c:fd:fe", "Intel"),
    ("00:0e:58", "Sonos"),
    ("00:04:13", "Snom"),
    ("00:15:65", "Yealink"),
    ("80:5e:c0", "Yealink"),
    ("00:80:77", "Brother"),
    ("00:26:73", "Ricoh"),
    ("00:1e:8f", "Canon"),
    ("00:40:8c", "Axis"),
];

#[cfg(test)]
#[allow(clippy::unwrap_used)]
mod tests {
    use super::*;

    #[test]
    fn normalizes_common_formats() {
        let expected = "00:1a:2b:3c:4d:5e";
        assert_eq!(MacAddress::new("00-1A-2B-3C-4D-5E").as_str(), expected);
        assert_eq!(MacAddress::new("001a.2b3c.4d5e").as_str(), expected);
        assert_eq!(MacAddress::new("001A2B3C4D5E").as_str(), expected);
    }

    #[test]
    fn from_bytes_requires_six_octets() {
        let mac = MacAddress::from_bytes(&[0xb8, 0x27, 0xeb, 0x01, 0x02, 0x03]).unwrap();
        assert_eq!(mac.as_str(), "b8:27:eb:01:02:03");
        assert_eq!(mac.vendor(), Some("Raspberry Pi"));
        assert!(MacAddress::from_bytes(&[1, 2, 3]).is_none());
    }
}
