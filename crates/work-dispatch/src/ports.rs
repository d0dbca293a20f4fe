//! Inbound port: what a front door can ask of the coordinator.

use crate::error::Result;
use async_trait::async_trait;
use work_core::{Nonce, WorkHash};

/// The coordinator's caller-facing contract.
///
/// Implementations differ only in how the answer is produced (over the
/// bus, or a direct call into a co-located backend); the validation and
/// error semantics are identical.
#[async_trait]
pub trait WorkDispatcher: Send + Sync {
    /// Obtain a validated proof-of-work nonce for `hash`.
    async fn solve(&self, hash: WorkHash) -> Result<Nonce>;

    /// Parse-then-solve convenience for callers holding the text form.
    ///
    /// Malformed input fails here with `InvalidInput`; nothing reaches the
    /// bus or the backend for a hash that never existed.
    async fn solve_hex(&self, hash: &str) -> Result<Nonce> {
        let hash: WorkHash = hash.parse()?;
        self.solve(hash).await
    }
}
