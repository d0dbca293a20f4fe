//! # Work Backends - Interchangeable PoW Compute Units
//!
//! A backend owns one compute resource (a serial co-processor, an
//! accelerator card, or nothing at all for the simulated stand-in) and
//! turns work hashes into raw solution buffers. Which variant runs is a
//! construction-time configuration decision behind one capability trait -
//! callers never know, or care, what is on the other end.
//!
//! ## Contract
//!
//! - A solver is constructed once at process start and exclusively owns its
//!   device from then on. Exclusivity is by construction (the device
//!   collaborator is moved in), not by runtime locking conventions.
//! - `solve_raw` may block for the hardware's natural solve latency; it is
//!   not expected to return instantly.
//! - Each variant carries its own [`NonceLayout`]: where the 8 nonce bytes
//!   sit in the raw buffer and whether the firmware emits them reversed.
//!   The layouts are not interchangeable bit-for-bit.
//!
//! ## The worker loop
//!
//! [`BackendWorker`] connects a solver to the bus: subscribe to the shared
//! work topic, solve each item, publish the extracted nonce to the
//! hash-named reply topic. One bad item is logged and skipped; the loop
//! itself only stops on the shutdown signal.

// Allow in tests
#![cfg_attr(test, allow(clippy::unwrap_used))]
#![cfg_attr(test, allow(clippy::expect_used))]

pub mod accelerator;
pub mod ports;
pub mod serial;
pub mod simulated;
pub mod worker;

#[cfg(feature = "fpga-driver")]
pub mod ffi;

pub use accelerator::AcceleratorSolver;
pub use ports::{AcceleratorDevice, SerialLink};
pub use serial::SerialSolver;
pub use simulated::SimulatedSolver;
pub use worker::BackendWorker;

use async_trait::async_trait;
use std::fmt;
use thiserror::Error;
use work_core::{ExtractError, Nonce, NonceLayout, RawOutput, WorkHash};

/// Result type alias for backend operations.
pub type Result<T> = std::result::Result<T, BackendError>;

/// Errors a backend can hit while serving one request.
///
/// All of these fail the request they occurred on; none of them may take
/// down the processing loop.
#[derive(Debug, Error)]
pub enum BackendError {
    /// Device I/O failed (serial read/write, bus transfer).
    #[error("device I/O error: {0}")]
    Io(#[from] std::io::Error),

    /// The device or its driver reported a fault.
    #[error("device fault: {0}")]
    Device(String),

    /// The device answered with fewer bytes than the nonce window needs.
    #[error(transparent)]
    ShortOutput(#[from] ExtractError),

    /// The device's text-mode answer was not a nonce.
    #[error("malformed device response: {0}")]
    Malformed(String),
}

/// Which kind of backend a solver is.
#[derive(Clone, Copy, Debug, PartialEq, Eq)]
pub enum BackendKind {
    /// Software stand-in, no real computation.
    Simulated,
    /// Serial-attached co-processor.
    Serial,
    /// Accelerator card behind a vendor driver.
    Accelerator,
}

impl fmt::Display for BackendKind {
    fn fmt(&self, f: &mut fmt::Formatter<'_>) -> fmt::Result {
        match self {
            Self::Simulated => write!(f, "simulated"),
            Self::Serial => write!(f, "serial"),
            Self::Accelerator => write!(f, "accelerator"),
        }
    }
}

impl std::str::FromStr for BackendKind {
    type Err = String;

    fn from_str(s: &str) -> std::result::Result<Self, Self::Err> {
        match s.to_ascii_lowercase().as_str() {
            "simulated" => Ok(Self::Simulated),
            "serial" => Ok(Self::Serial),
            "accelerator" => Ok(Self::Accelerator),
            other => Err(format!(
                "unknown backend kind {other:?} (expected simulated, serial, or accelerator)"
            )),
        }
    }
}

/// Identity of one constructed solver, for logs and the health endpoint.
#[derive(Clone, Debug)]
pub struct BackendDescriptor {
    /// Variant kind.
    pub kind: BackendKind,
    /// Human-readable device name (path, card model, fixture label).
    pub name: String,
}

impl fmt::Display for BackendDescriptor {
    fn fmt(&self, f: &mut fmt::Formatter<'_>) -> fmt::Result {
        write!(f, "{} ({})", self.kind, self.name)
    }
}

/// Capability trait every backend variant implements.
#[async_trait]
pub trait Solver: Send + Sync {
    /// Identity of this solver.
    fn descriptor(&self) -> &BackendDescriptor;

    /// This variant's nonce extraction rule.
    fn layout(&self) -> NonceLayout;

    /// Compute the raw solution buffer for one hash. May block for the
    /// device's natural solve latency.
    async fn solve_raw(&self, hash: &WorkHash) -> Result<RawOutput>;

    /// Direct-call path bypassing the bus, for co-located deployments.
    ///
    /// Must honor the same extraction and ordering rules as the
    /// asynchronous path; the default does exactly that. Variants with a
    /// native direct protocol (the serial device's ASCII mode) override it.
    async fn solve_direct(&self, hash: &WorkHash) -> Result<Nonce> {
        let raw = self.solve_raw(hash).await?;
        Ok(self.layout().extract(&raw)?)
    }
}
