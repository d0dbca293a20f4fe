//! The 8-byte solution nonce value object.

use crate::errors::ParseError;
use serde::{Deserialize, Deserializer, Serialize, Serializer};
use std::fmt;
use std::str::FromStr;

/// An 8-byte proof-of-work nonce, stored in the order it is displayed
/// (big-endian hex).
///
/// The validator and some device firmware work on the byte-reversed form;
/// [`Nonce::reversed`] is the one place that flip happens.
#[derive(Clone, Copy, PartialEq, Eq, Hash)]
pub struct Nonce([u8; 8]);

impl Nonce {
    /// Byte length of a nonce.
    pub const LEN: usize = 8;

    /// Wrap raw bytes as a nonce.
    #[must_use]
    pub const fn from_bytes(bytes: [u8; Self::LEN]) -> Self {
        Self(bytes)
    }

    /// Build a nonce from a slice, rejecting anything but exactly 8 bytes.
    pub fn from_slice(bytes: &[u8]) -> Result<Self, ParseError> {
        let arr: [u8; Self::LEN] = bytes.try_into().map_err(|_| ParseError::InvalidLength {
            expected: Self::LEN,
            actual: bytes.len(),
        })?;
        Ok(Self(arr))
    }

    /// Borrow the underlying bytes.
    #[must_use]
    pub const fn as_bytes(&self) -> &[u8; Self::LEN] {
        &self.0
    }

    /// A byte-reversed copy (the device/digest ordering).
    #[must_use]
    pub fn reversed(&self) -> Self {
        let mut bytes = self.0;
        bytes.reverse();
        Self(bytes)
    }
}

impl FromStr for Nonce {
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

impl fmt::Display for Nonce {
    /// Lower-case hex, 16 characters - the form returned to HTTP callers.
    fn fmt(&self, f: &mut fmt::Formatter<'_>) -> fmt::Result {
        f.write_str(&hex::encode(self.0))
    }
}

impl fmt::Debug for Nonce {
    fn fmt(&self, f: &mut fmt::Formatter<'_>) -> fmt::Result {
        write!(f, "Nonce({})", hex::encode(self.0))
    }
}

impl AsRef<[u8]> for Nonce {
    fn as_ref(&self) -> &[u8] {
        &self.0
    }
}

impl Serialize for Nonce {
    fn serialize<S: Serializer>(&self, serializer: S) -> Result<S::Ok, S::Error> {
        serializer.serialize_str(&self.to_string())
    }
}

impl<'de> Deserialize<'de> for Nonce {
    fn deserialize<D: Deserializer<'de>>(deserializer: D) -> Result<Self, D::Error> {
        let s = String::deserialize(deserializer)?;
        s.parse().map_err(serde::de::Error::custom)
    }
}

#[cfg(test)]
mod tests {
    use super::*;

    #[test]
    fn display_is_lower_hex() {
        let nonce: Nonce = "00000000005F9505".parse().unwrap();
        assert_eq!(nonce.to_string(), "00000000005f9505");
    }

    #[test]
    fn from_slice_enforces_width() {
        assert!(Nonce::from_slice(&[1, 2, 3]).is_err());
        assert!(Nonce::from_slice(&[0u8; 9]).is_err());
        let nonce = Nonce::from_slice(&[1, 2, 3, 4, 5, 6, 7, 8]).unwrap();
        assert_eq!(nonce.as_bytes(), &[1, 2, 3, 4, 5, 6, 7, 8]);
    }

    #[test]
    fn reversed_flips_byte_order() {
        let nonce = Nonce::from_bytes([1, 2, 3, 4, 5, 6, 7, 8]);
        assert_eq!(nonce.reversed().as_bytes(), &[8, 7, 6, 5, 4, 3, 2, 1]);
        assert_eq!(nonce.reversed().reversed(), nonce);
    }
}
