//! Serial co-processor backend.
//!
//! Wire protocol, binary mode: write an 8-byte preamble, write the 32 raw
//! hash bytes, read exactly 20 response bytes. The nonce sits at bytes
//! `[8, 16)` of the response; whether those arrive byte-reversed depends on
//! the firmware revision, so it is a constructor flag validated against
//! reference vectors rather than a constant.
//!
//! Text mode (the direct-call path): write the hash as ASCII hex, read one
//! line-terminated ASCII-hex nonce back.

use crate::ports::SerialLink;
use crate::{BackendDescriptor, BackendError, BackendKind, Result, Solver};
use async_trait::async_trait;
use std::sync::Mutex;
use work_core::{Nonce, NonceLayout, RawOutput, WorkHash};

/// Preamble the firmware expects before the hash bytes.
pub const SERIAL_PREAMBLE: [u8; 8] = *b"12345678";

/// Fixed width of the device's binary-mode response.
pub const SERIAL_RESPONSE_LEN: usize = 20;

/// Backend driving a serial-attached PoW co-processor.
///
/// Owns its [`SerialLink`] exclusively; the link is moved in at
/// construction and every exchange holds the internal lock for the whole
/// write-then-read round trip, so request and response bytes can never
/// interleave between concurrent callers.
pub struct SerialSolver {
    descriptor: BackendDescriptor,
    link: Mutex<Box<dyn SerialLink>>,
    layout: NonceLayout,
}

impl SerialSolver {
    /// Take ownership of a serial link.
    ///
    /// `reverse_nonce` selects the firmware's nonce byte order; the wrong
    /// value does not error anywhere, it silently produces invalid work,
    /// so it must be confirmed against reference vectors for the attached
    /// device.
    #[must_use]
    pub fn new(name: impl Into<String>, link: Box<dyn SerialLink>, reverse_nonce: bool) -> Self {
        Self {
            descriptor: BackendDescriptor {
                kind: BackendKind::Serial,
                name: name.into(),
            },
            link: Mutex::new(link),
            layout: if reverse_nonce {
                NonceLayout::reversed()
            } else {
                NonceLayout::standard()
            },
        }
    }

    fn lock_link(&self) -> std::sync::MutexGuard<'_, Box<dyn SerialLink>> {
        // A poisoned lock means a previous exchange panicked mid-protocol;
        // the device state is unknown either way, so keep going with the
        // same link rather than wedging every future request.
        self.link.lock().unwrap_or_else(std::sync::PoisonError::into_inner)
    }
}

#[async_trait]
impl Solver for SerialSolver {
    fn descriptor(&self) -> &BackendDescriptor {
        &self.descriptor
    }

    fn layout(&self) -> NonceLayout {
        self.layout
    }

    async fn solve_raw(&self, hash: &WorkHash) -> Result<RawOutput> {
        let mut link = self.lock_link();
        link.write_all(&SERIAL_PREAMBLE)?;
        link.write_all(hash.as_bytes())?;

        let mut response = [0u8; SERIAL_RESPONSE_LEN];
        link.read_exact(&mut response)?;
        Ok(RawOutput::new(response.to_vec()))
    }

    /// Text-mode exchange: ASCII hash out, one ASCII-hex nonce line back.
    /// The firmware byte-order flag applies here exactly as in binary mode.
    async fn solve_direct(&self, hash: &WorkHash) -> Result<Nonce> {
        let line = {
            let mut link = self.lock_link();
            link.write_all(hash.to_hex().as_bytes())?;
            link.read_line()?
        };

        let nonce: Nonce = line
            .trim()
            .parse()
            .map_err(|err| BackendError::Malformed(format!("{err} in line {line:?}")))?;
        Ok(if self.layout.reverse {
            nonce.reversed()
        } else {
            nonce
        })
    }
}
