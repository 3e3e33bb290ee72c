//! Handlers for the v1 health endpoints.

use axum::debug_handler;
use axum::extract::State;
use axum::http::{Method, Uri};
use sayan_health::Failure;

use crate::error::{ApiError, OutcomeResponse};
use crate::state::AppState;

/// GET /v1/health/alive: 200 `{"message": "OK"}` whenever the process is scheduling requests.
#[debug_handler]
pub async fn get_alive(State(state): State<AppState>) -> OutcomeResponse {
    OutcomeResponse(state.readiness.check_liveness())
}

/// GET /v1/health/ready: one boolean per dependency; 200 when all are up, 500 otherwise.
#[debug_handler]
pub async fn get_ready(State(state): State<AppState>) -> OutcomeResponse {
    OutcomeResponse(state.readiness.check_readiness().await)
}

pub async fn not_found(method: Method, uri: Uri) -> ApiError {
    Failure::not_found(anyhow::anyhow!("no route for {method} {uri}")).into()
}
