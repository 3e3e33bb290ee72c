//! Global error interception.
//!
//! Every failure that escapes a handler ends up here exactly once: as an
//! [`ApiError`] returned from the handler, or as a caught panic. Both are
//! classified and rendered as a JSON `{"message": ...}` body. A returned error
//! is logged by [`resolve`]; a panic was already logged by the panic hook
//! installed in [`crate::logging::install_panic_hook`].

use std::any::Any;

use axum::Json;
use axum::http::StatusCode;
use axum::response::{IntoResponse, Response};
use sayan_health::{Failure, FailureKind, HttpOutcome, http_response, resolve};

/// Renders an [`HttpOutcome`] as a JSON response.
#[derive(Debug)]
pub struct OutcomeResponse(pub HttpOutcome);

impl IntoResponse for OutcomeResponse {
    fn into_response(self) -> Response {
        let status =
            StatusCode::from_u16(self.0.status).unwrap_or(StatusCode::INTERNAL_SERVER_ERROR);
        (status, Json(self.0.body)).into_response()
    }
}

/// Handler error type. Converting into a response classifies the failure.
#[derive(Debug)]
pub struct ApiError(Failure);

impl ApiError {
    pub fn failure(&self) -> &Failure {
        &self.0
    }
}

impl<E> From<E> for ApiError
where
    E: Into<Failure>,
{
    fn from(err: E) -> Self {
        ApiError(err.into())
    }
}

impl IntoResponse for ApiError {
    fn into_response(self) -> Response {
        OutcomeResponse(resolve(&self.0)).into_response()
    }
}

/// Text of a panic payload, for `panic!` with a literal or a formatted message.
pub fn panic_message(payload: &(dyn Any + Send)) -> String {
    if let Some(s) = payload.downcast_ref::<String>() {
        s.clone()
    } else if let Some(s) = payload.downcast_ref::<&str>() {
        s.to_string()
    } else {
        "unknown panic payload".to_string()
    }
}

/// Response for a handler that panicked: an unclassified failure.
///
/// Nothing is logged here; the panic hook has already reported it.
pub fn panic_response(_err: Box<dyn Any + Send + 'static>) -> Response {
    OutcomeResponse(http_response(FailureKind::Unclassified.status())).into_response()
}
