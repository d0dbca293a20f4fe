//! Error types shared by the domain value objects.

use thiserror::Error;

/// Errors from parsing a hash or nonce out of its text or byte form.
#[derive(Debug, Error, Clone, PartialEq, Eq)]
pub enum ParseError {
    /// The input had the wrong length for the target type.
    #[error("expected {expected} bytes, got {actual}")]
    InvalidLength {
        /// Required byte length.
        expected: usize,
        /// Length actually supplied.
        actual: usize,
    },

    /// The input contained a character outside `[0-9a-fA-F]`.
    #[error("invalid hex character {character:?} at position {position}")]
    InvalidHex {
        /// The offending character.
        character: char,
        /// Zero-based position within the input string.
        position: usize,
    },
}

impl From<hex::FromHexError> for ParseError {
    fn from(err: hex::FromHexError) -> Self {
        match err {
            hex::FromHexError::InvalidHexCharacter { c, index } => Self::InvalidHex {
                character: c,
                position: index,
            },
            // Length mismatches are reported by the callers with the real
            // expected/actual byte counts; this arm only fires for odd-length
            // input that slipped past them.
            hex::FromHexError::OddLength | hex::FromHexError::InvalidStringLength => {
                Self::InvalidLength {
                    expected: 0,
                    actual: 0,
                }
            }
        }
    }
}

/// Error from extracting a nonce out of a backend's raw output buffer.
#[derive(Debug, Error, Clone, PartialEq, Eq)]
pub enum ExtractError {
    /// The raw buffer ended before the nonce window.
    #[error("raw output too short: nonce window ends at byte {needed}, device returned {actual}")]
    ShortOutput {
        /// Byte offset one past the nonce window.
        needed: usize,
        /// Actual buffer length.
        actual: usize,
    },
}
