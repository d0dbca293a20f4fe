//! HTTP handlers and the error-to-status mapping.

use crate::dto::{ErrorResponse, HealthResponse, SolveRequest, SolveResponse};
use crate::AppState;
use axum::extract::State;
use axum::http::StatusCode;
use axum::response::{IntoResponse, Response};
use axum::Json;
use tracing::info;
use work_dispatch::DispatchError;

/// `POST /` - solve one hash.
pub async fn solve(
    State(state): State<AppState>,
    Json(request): Json<SolveRequest>,
) -> Result<Json<SolveResponse>, ApiError> {
    let nonce = state.dispatcher.solve_hex(&request.hash).await?;
    info!(hash = %request.hash, work = %nonce, "request served");
    Ok(Json(SolveResponse {
        work: nonce.to_string(),
    }))
}

/// `GET /health` - liveness plus dispatch counters.
pub async fn health(State(state): State<AppState>) -> Json<HealthResponse> {
    Json(HealthResponse {
        status: "ok",
        backend: state.backend.to_string(),
        counters: state.counters.snapshot(),
    })
}

/// A dispatch failure on its way out as an HTTP response.
#[derive(Debug)]
pub struct ApiError(DispatchError);

impl From<DispatchError> for ApiError {
    fn from(err: DispatchError) -> Self {
        Self(err)
    }
}

impl IntoResponse for ApiError {
    fn into_response(self) -> Response {
        let status = match &self.0 {
            DispatchError::InvalidInput(_) => StatusCode::BAD_REQUEST,
            DispatchError::Timeout { .. } => StatusCode::GATEWAY_TIMEOUT,
            DispatchError::BackendFault(_) | DispatchError::ValidationFailure { .. } => {
                StatusCode::BAD_GATEWAY
            }
        };
        let body = Json(ErrorResponse {
            error: self.0.to_string(),
        });
        (status, body).into_response()
    }
}
