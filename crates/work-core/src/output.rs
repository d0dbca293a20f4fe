//! Backend-native output buffers and the per-backend nonce extraction rule.

use crate::errors::ExtractError;
use crate::nonce::Nonce;
use std::fmt;

/// Byte offset where the nonce window starts in every known device's
/// output buffer.
pub const DEFAULT_NONCE_OFFSET: usize = 8;

/// The raw bytes a backend produced for one request, exactly as the device
/// returned them. Width is device-dependent (the serial co-processor
/// answers with 20 bytes; an accelerator card may differ).
#[derive(Clone, PartialEq, Eq)]
pub struct RawOutput(Vec<u8>);

impl RawOutput {
    /// Wrap a device buffer.
    #[must_use]
    pub fn new(bytes: Vec<u8>) -> Self {
        Self(bytes)
    }

    /// Borrow the buffer.
    #[must_use]
    pub fn as_slice(&self) -> &[u8] {
        &self.0
    }

    /// Buffer length in bytes.
    #[must_use]
    pub fn len(&self) -> usize {
        self.0.len()
    }

    /// Whether the device returned nothing at all.
    #[must_use]
    pub fn is_empty(&self) -> bool {
        self.0.is_empty()
    }
}

impl fmt::Debug for RawOutput {
    fn fmt(&self, f: &mut fmt::Formatter<'_>) -> fmt::Result {
        write!(f, "RawOutput({})", hex::encode(&self.0))
    }
}

impl From<Vec<u8>> for RawOutput {
    fn from(bytes: Vec<u8>) -> Self {
        Self::new(bytes)
    }
}

/// Where the 8 nonce bytes live inside a backend's raw output, and whether
/// they arrive byte-reversed.
///
/// The reversal is firmware-dependent: historical serial firmware emitted
/// the nonce reversed, the accelerator card does not. It is configuration,
/// never a hardcoded guess - the wrong choice silently accepts invalid work.
#[derive(Clone, Copy, Debug, PartialEq, Eq)]
pub struct NonceLayout {
    /// Byte offset of the nonce window within the raw output.
    pub offset: usize,
    /// Whether the extracted window must be byte-reversed to reach the
    /// canonical (display) order.
    pub reverse: bool,
}

impl NonceLayout {
    /// The common layout: nonce at bytes `[8, 16)`, canonical order.
    #[must_use]
    pub const fn standard() -> Self {
        Self {
            offset: DEFAULT_NONCE_OFFSET,
            reverse: false,
        }
    }

    /// The common layout with firmware byte reversal.
    #[must_use]
    pub const fn reversed() -> Self {
        Self {
            offset: DEFAULT_NONCE_OFFSET,
            reverse: true,
        }
    }

    /// Pull the nonce out of a raw output buffer according to this rule.
    pub fn extract(&self, raw: &RawOutput) -> Result<Nonce, ExtractError> {
        let end = self.offset + Nonce::LEN;
        let window = raw
            .as_slice()
            .get(self.offset..end)
            .ok_or(ExtractError::ShortOutput {
                needed: end,
                actual: raw.len(),
            })?;
        let mut bytes = [0u8; Nonce::LEN];
        bytes.copy_from_slice(window);
        if self.reverse {
            bytes.reverse();
        }
        Ok(Nonce::from_bytes(bytes))
    }
}
