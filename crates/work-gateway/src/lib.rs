//! # Work Gateway - HTTP Front Door
//!
//! Adapts the service's one inbound operation to coordinator calls:
//!
//! - `POST /` with `{"hash": "<64 hex>"}` answers `{"work": "<16 hex>"}`.
//! - `GET /health` reports the backend identity and dispatch counters.
//!
//! The gateway knows nothing about buses or devices; it sees only the
//! [`WorkDispatcher`] port and maps its typed errors onto HTTP statuses:
//!
//! | Error | Status |
//! |-------|--------|
//! | `InvalidInput` | 400 Bad Request |
//! | `Timeout` | 504 Gateway Timeout |
//! | `BackendFault` / `ValidationFailure` | 502 Bad Gateway |

// Allow in tests
#![cfg_attr(test, allow(clippy::unwrap_used))]
#![cfg_attr(test, allow(clippy::expect_used))]

pub mod dto;
pub mod handlers;

pub use dto::{ErrorResponse, HealthResponse, SolveRequest, SolveResponse};

use axum::routing::{get, post};
use axum::Router;
use std::sync::Arc;
use work_backends::BackendDescriptor;
use work_dispatch::{DispatchCounters, WorkDispatcher};

/// Shared state behind every handler.
#[derive(Clone)]
pub struct AppState {
    /// The coordinator, behind its inbound port.
    pub dispatcher: Arc<dyn WorkDispatcher>,
    /// Identity of the backend serving this process.
    pub backend: Arc<BackendDescriptor>,
    /// The dispatcher's counters, for the health endpoint.
    pub counters: Arc<DispatchCounters>,
}

/// Build the service router.
#[must_use]
pub fn router(state: AppState) -> Router {
    Router::new()
        .route("/", post(handlers::solve))
        .route("/health", get(handlers::health))
        .with_state(state)
}
