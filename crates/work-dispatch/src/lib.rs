//! # Work Dispatch - The Request/Response Coordinator
//!
//! This crate is the bridge between a synchronous caller ("give me the
//! nonce for this hash") and backends that compute on their own schedule.
//! The correlation protocol is the whole point:
//!
//! ```text
//! caller ──▶ solve(hash)
//!              │ 1. subscribe reply topic <hash hex>   (FIRST - always)
//!              │ 2. publish hash on "requests"
//!              │ 3. await one reply, bounded by the timeout
//!              │ 4. re-validate the nonce against the threshold
//!              ▼
//!            nonce / typed error
//! ```
//!
//! Subscribe-before-publish is a hard invariant. A backend can answer in
//! microseconds; publishing first opens a window where the reply arrives
//! before anyone is listening and the caller waits out the full timeout
//! for an answer that already came and went.
//!
//! The reply subscription is a guard object: every exit path - success,
//! timeout, malformed reply, caller cancellation - drops it, which releases
//! the per-hash topic on the bus. Nothing leaks under sustained load.

// Allow in tests
#![cfg_attr(test, allow(clippy::unwrap_used))]
#![cfg_attr(test, allow(clippy::expect_used))]

pub mod config;
pub mod counters;
pub mod direct;
pub mod dispatcher;
pub mod error;
pub mod ports;

pub use config::DispatchConfig;
pub use counters::{CounterSnapshot, DispatchCounters};
pub use direct::DirectDispatcher;
pub use dispatcher::BusDispatcher;
pub use error::{DispatchError, Result};
pub use ports::WorkDispatcher;
