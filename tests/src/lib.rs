//! # Hashworks Test Suite
//!
//! Cross-crate integration tests. Per-crate behavior lives in each crate's
//! own `#[cfg(test)]` modules; everything here exercises the real stack:
//!
//! ```text
//! HTTP request ──▶ gateway ──▶ coordinator ──▶ bus ──▶ backend worker
//!       ▲                                                   │
//!       └────────────── reply topic ◀───────────────────────┘
//! ```
//!
//! ## Running
//!
//! ```bash
//! cargo test -p work-tests
//! cargo test -p work-tests integration::
//! ```

pub mod integration;
