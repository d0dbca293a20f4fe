//! Proof-of-work threshold validation.
//!
//! The check is a BLAKE2b digest with 8-byte output over the byte-reversed
//! nonce followed by the 32-byte hash. The digest is byte-reversed again and
//! read as a big-endian integer; work is valid iff that integer clears
//! [`POW_THRESHOLD`].
//!
//! Both reversals are load-bearing. The device and the digest operate on the
//! little-endian nonce while callers exchange the big-endian form; dropping
//! either flip makes the check accept garbage and reject real work.

use crate::hash::WorkHash;
use crate::nonce::Nonce;
use blake2::digest::consts::U8;
use blake2::{Blake2b, Digest};

/// Minimum digest value (exclusive) for a valid solution.
pub const POW_THRESHOLD: u64 = 0xFFFF_FFC0_0000_0000;

/// Digest output width in bytes.
pub const POW_DIGEST_LEN: usize = 8;

/// BLAKE2b fixed to the 8-byte output the threshold check operates on.
type Blake2bWork = Blake2b<U8>;

/// The integer a (nonce, hash) pair scores under the threshold check.
///
/// Exposed separately from [`validate`] so anomalies can be logged with the
/// actual value that fell short.
#[must_use]
pub fn work_value(nonce: &Nonce, hash: &WorkHash) -> u64 {
    let mut hasher = Blake2bWork::new();
    hasher.update(nonce.reversed().as_bytes());
    hasher.update(hash.as_bytes());
    let mut digest = [0u8; POW_DIGEST_LEN];
    digest.copy_from_slice(&hasher.finalize());
    digest.reverse();
    u64::from_be_bytes(digest)
}

/// Whether `nonce` is a valid proof-of-work solution for `hash`.
#[must_use]
pub fn validate(nonce: &Nonce, hash: &WorkHash) -> bool {
    work_value(nonce, hash) > POW_THRESHOLD
}
