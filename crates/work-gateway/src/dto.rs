//! Request and response bodies for the HTTP surface.

use serde::{Deserialize, Serialize};
use work_dispatch::CounterSnapshot;

/// Body of `POST /`.
#[derive(Debug, Deserialize)]
pub struct SolveRequest {
    /// The target hash, 64 hex characters.
    pub hash: String,
}

/// Successful response to `POST /`.
#[derive(Debug, Serialize)]
pub struct SolveResponse {
    /// The solving nonce, 16 hex characters.
    pub work: String,
}

/// Error body for every non-2xx response.
#[derive(Debug, Serialize)]
pub struct ErrorResponse {
    /// Human-readable failure description.
    pub error: String,
}

/// Response to `GET /health`.
#[derive(Debug, Serialize)]
pub struct HealthResponse {
    /// Always `"ok"` while the process serves requests.
    pub status: &'static str,
    /// The configured backend, e.g. `"serial (/dev/ttyUSB0)"`.
    pub backend: String,
    /// Lifetime dispatch counters.
    pub counters: CounterSnapshot,
}
