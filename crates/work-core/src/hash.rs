//! The 32-byte work hash value object.

use crate::errors::ParseError;
use serde::{Deserialize, Deserializer, Serialize, Serializer};
use std::fmt;
use std::str::FromStr;

/// A 256-bit block hash a caller wants a proof-of-work nonce for.
///
/// Canonical text form: 64 upper-case hex characters. Parsing accepts
/// either case; everything length- or charset-malformed is rejected here,
/// before a request can touch the bus.
#[derive(Clone, Copy, PartialEq, Eq, Hash)]
pub struct WorkHash([u8; 32]);

impl WorkHash {
    /// Byte length of a work hash.
    pub const LEN: usize = 32;

    /// Wrap raw bytes as a work hash.
    #[must_use]
    pub const fn from_bytes(bytes: [u8; Self::LEN]) -> Self {
        Self(bytes)
    }

    /// Borrow the underlying bytes.
    #[must_use]
    pub const fn as_bytes(&self) -> &[u8; Self::LEN] {
        &self.0
    }

    /// Canonical upper-case hex form. This string is also the name of the
    /// reply topic for this hash, so it must be derived here and nowhere
    /// else.
    #[must_use]
    pub fn to_hex(&self) -> String {
        hex::encode_upper(self.0)
    }
}

impl FromStr for WorkHash {
    type Err = ParseError;

    fn from_str(s: &str) -> Result<Self, Self::Err> {
        if s.len() != Self::LEN * 2 {
            return Err(ParseError::InvalidLength {
                expected: Self::LEN,
                actual: s.len() / 2,
            });
        }
        let raw = hex::decode(s)?;
        let mut bytes = [0u8; Self::LEN];
        bytes.copy_from_slice(&raw);
        Ok(Self(bytes))
    }
}

impl fmt::Display for WorkHash {
    fn fmt(&self, f: &mut fmt::Formatter<'_>) -> fmt::Result {
        f.write_str(&self.to_hex())
    }
}

impl fmt::Debug for WorkHash {
    fn fmt(&self, f: &mut fmt::Formatter<'_>) -> fmt::Result {
        write!(f, "WorkHash({})", self.to_hex())
    }
}

impl AsRef<[u8]> for WorkHash {
    fn as_ref(&self) -> &[u8] {
        &self.0
    }
}

impl Serialize for WorkHash {
    fn serialize<S: Serializer>(&self, serializer: S) -> Result<S::Ok, S::Error> {
        serializer.serialize_str(&self.to_hex())
    }
}

impl<'de> Deserialize<'de> for WorkHash {
    fn deserialize<D: Deserializer<'de>>(deserializer: D) -> Result<Self, D::Error> {
        let s = String::deserialize(deserializer)?;
        s.parse().map_err(serde::de::Error::custom)
    }
}
