//! # Work Bus - Publish/Subscribe Transport for Solve Requests
//!
//! The coordinator and the backends never call each other directly; every
//! request and every result crosses this bus.
//!
//! ## Topic Conventions
//!
//! - One shared work topic ([`WORK_TOPIC`]) carries solve requests as the
//!   ASCII hex of the target hash.
//! - One reply topic **per in-flight hash**, named by the hash's canonical
//!   hex form ([`reply_topic`]), carries the raw 8 nonce bytes back. The
//!   hash is the correlation key; there is no envelope and no generated ID.
//!
//! ## Delivery Contract
//!
//! Reliable within the process lifetime, for subscribers that exist at
//! publish time. A publish with no subscribers drops the payload (and says
//! so in the logs); it is the coordinator's subscribe-before-publish
//! ordering that turns this into a no-loss protocol.
//!
//! ```text
//! ┌─────────────┐   publish("requests", hash)    ┌─────────────┐
//! │ Coordinator │ ─────────────────────────────▶ │   Backend   │
//! │             │ ◀───────────────────────────── │   worker    │
//! └─────────────┘   publish(<hash hex>, nonce)   └─────────────┘
//! ```

// Allow in tests
#![cfg_attr(test, allow(clippy::unwrap_used))]
#![cfg_attr(test, allow(clippy::expect_used))]

pub mod bus;
pub mod subscription;

pub use bus::{InMemoryWorkBus, WorkBus};
pub use subscription::{Subscription, SubscriptionError};

use work_core::WorkHash;

/// The shared topic every backend worker consumes solve requests from.
pub const WORK_TOPIC: &str = "requests";

/// Maximum payloads buffered per subscriber before older ones are dropped.
pub const DEFAULT_CHANNEL_CAPACITY: usize = 1000;

/// Name of the reply topic for one hash.
///
/// Deterministic and unique per hash value: two concurrent requests for the
/// same hash share the topic (and may observe either result, which is fine
/// because requests are idempotent), while distinct hashes can never
/// cross-deliver.
#[must_use]
pub fn reply_topic(hash: &WorkHash) -> String {
    hash.to_hex()
}
