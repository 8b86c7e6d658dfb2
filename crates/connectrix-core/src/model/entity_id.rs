// ── Core identity types ──
//
// ClientId and MacAddress are the keys everything else hangs off. A
// ClientId is opaque: the backend decides its shape, the core only
// compares and displays it.

use serde::{Deserialize, Serialize};
use std::fmt;
use std::str::FromStr;

// ── ClientId ────────────────────────────────────────────────────────

/// Opaque identifier of a subscriber record.
#[derive(Debug, Clone, PartialEq, Eq, Hash, PartialOrd, Ord, Serialize, Deserialize)]
#[serde(transparent)]
pub struct ClientId(String);

impl ClientId {
    pub fn new(raw: impl Into<String>) -> Self {
        Self(raw.into())
    }

    pub fn as_str(&self) -> &str {
        &self.0
    }
}

impl fmt::Display for ClientId {
    fn fmt(&self, f: &mut fmt::Formatter<'_>) -> fmt::Result {
        write!(f, "{}", self.0)
    }
}

impl FromStr for ClientId {
    type Err = std::convert::Infallible;

    fn from_str(s: &str) -> Result<Self, Self::Err> {
        Ok(Self::new(s.trim()))
    }
}

impl From<&str> for ClientId {
    fn from(s: &str) -> Self {
        Self::new(s)
    }
}

impl From<String> for ClientId {
    fn from(s: String) -> Self {
        Self(s)
    }
}

impl From<u64> for ClientId {
    fn from(n: u64) -> Self {
        Self(n.to_string())
    }
}

// ── MacAddress ──────────────────────────────────────────────────────

/// MAC address, normalized to lowercase colon-separated format (aa:bb:cc:dd:ee:ff).
#[derive(Debug, Clone, PartialEq, Eq, Hash, Serialize, Deserialize)]
pub struct MacAddress(String);

impl MacAddress {
    /// Create a normalized MAC address from any common format.
    /// Accepts colon-separated, dash-separated, or bare hex.
    pub fn new(raw: impl AsRef<str>) -> Self {
        let lowered = raw.as_ref().trim().to_lowercase().replace('-', ":");
        if lowered.len() == 12 && lowered.chars().all(|c| c.is_ascii_hexdigit()) {
            let pairs: Vec<&str> = (0..6)
                .filter_map(|i| lowered.get(i * 2..i * 2 + 2))
                .collect();
            return Self(pairs.join(":"));
        }
        Self(lowered)
    }

    pub fn as_str(&self) -> &str {
        &self.0
    }

    /// Whether this looks like six colon-separated hex octets.
    pub fn is_well_formed(&self) -> bool {
        let octets: Vec<&str> = self.0.split(':').collect();
        octets.len() == 6
            && octets
                .iter()
                .all(|o| o.len() == 2 && o.chars().all(|c| c.is_ascii_hexdigit()))
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
