//! Error types for the dispatch coordinator.

use std::time::Duration;
use thiserror::Error;
use work_core::{Nonce, ParseError};

/// Result type alias for dispatch operations.
pub type Result<T> = std::result::Result<T, DispatchError>;

/// Errors a solve call can return to its caller.
#[derive(Debug, Error)]
pub enum DispatchError {
    /// The request's hash was malformed. Raised before anything touches
    /// the bus.
    #[error("invalid work hash: {0}")]
    InvalidInput(#[from] ParseError),

    /// No backend produced a solution within the configured window.
    #[error("no solution within {waited:?}")]
    Timeout {
        /// How long the coordinator waited.
        waited: Duration,
    },

    /// The backend path failed: device fault, closed bus, or a reply that
    /// was not a nonce.
    #[error("backend fault: {0}")]
    BackendFault(String),

    /// A backend returned work that fails the threshold check. Logged as a
    /// correctness anomaly; never passed through as success.
    #[error("solution {nonce} failed threshold validation")]
    ValidationFailure {
        /// The sub-threshold nonce the backend produced.
        nonce: Nonce,
    },
}

impl DispatchError {
    /// Whether the caller, not the service, is at fault.
    #[must_use]
    pub fn is_client_error(&self) -> bool {
        matches!(self, Self::InvalidInput(_))
    }

    /// Whether waiting longer could plausibly have helped.
    #[must_use]
    pub fn is_timeout(&self) -> bool {
        matches!(self, Self::Timeout { .. })
    }
}

impl From<work_backends::BackendError> for DispatchError {
    fn from(err: work_backends::BackendError) -> Self {
        Self::BackendFault(err.to_string())
    }
}
