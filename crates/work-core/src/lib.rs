//! # Work Core - Domain Types and PoW Validation
//!
//! Single source of truth for the types that cross crate boundaries in
//! Hashworks, plus the pure threshold-check algorithm every backend's
//! output must satisfy.
//!
//! ## Components
//!
//! | Module | Contents |
//! |--------|----------|
//! | `hash` | [`WorkHash`] - the 32-byte target a caller wants solved |
//! | `nonce` | [`Nonce`] - an 8-byte solution candidate |
//! | `output` | [`RawOutput`] / [`NonceLayout`] - backend-native buffers and extraction rules |
//! | `validate` | [`validate`] - BLAKE2b threshold check |
//! | `errors` | [`ParseError`] / [`ExtractError`] |
//!
//! ## Invariants
//!
//! - A `WorkHash` is always exactly 32 bytes; a `Nonce` exactly 8. Width
//!   checks happen at the parse boundary, never inside the validator.
//! - The canonical text form of a hash (upper-case hex) is also the reply
//!   topic name, so every component must derive it through [`WorkHash`]
//!   rather than re-encoding bytes itself.

// Allow in tests
#![cfg_attr(test, allow(clippy::unwrap_used))]
#![cfg_attr(test, allow(clippy::expect_used))]

pub mod errors;
pub mod hash;
pub mod nonce;
pub mod output;
pub mod validate;

pub use errors::{ExtractError, ParseError};
pub use hash::WorkHash;
pub use nonce::Nonce;
pub use output::{NonceLayout, RawOutput, DEFAULT_NONCE_OFFSET};
pub use validate::{validate, work_value, POW_DIGEST_LEN, POW_THRESHOLD};
