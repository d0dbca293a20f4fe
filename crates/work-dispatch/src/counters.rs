//! Dispatch statistics.

use serde::Serialize;
use std::sync::atomic::{AtomicU64, Ordering};

/// Lifetime counters for one dispatcher, shared with the health endpoint.
#[derive(Debug, Default)]
pub struct DispatchCounters {
    /// Solve calls accepted (valid hash, dispatched to a backend path).
    pub dispatched: AtomicU64,
    /// Solve calls that returned a validated nonce.
    pub completed: AtomicU64,
    /// Solve calls that hit the reply timeout.
    pub timeouts: AtomicU64,
    /// Backend-path failures (device faults, malformed replies).
    pub backend_faults: AtomicU64,
    /// Replies that failed the threshold re-check.
    pub validation_failures: AtomicU64,
}

impl DispatchCounters {
    /// Point-in-time copy for serialization.
    #[must_use]
    pub fn snapshot(&self) -> CounterSnapshot {
        CounterSnapshot {
            dispatched: self.dispatched.load(Ordering::Relaxed),
            completed: self.completed.load(Ordering::Relaxed),
            timeouts: self.timeouts.load(Ordering::Relaxed),
            backend_faults: self.backend_faults.load(Ordering::Relaxed),
            validation_failures: self.validation_failures.load(Ordering::Relaxed),
        }
    }

    pub(crate) fn bump(counter: &AtomicU64) {
        counter.fetch_add(1, Ordering::Relaxed);
    }
}

/// Serializable view of [`DispatchCounters`].
#[derive(Clone, Copy, Debug, Serialize, PartialEq, Eq)]
pub struct CounterSnapshot {
    /// Solve calls accepted.
    pub dispatched: u64,
    /// Solve calls completed with a validated nonce.
    pub completed: u64,
    /// Reply-window timeouts.
    pub timeouts: u64,
    /// Backend-path failures.
    pub backend_faults: u64,
    /// Threshold re-check failures.
    pub validation_failures: u64,
}
