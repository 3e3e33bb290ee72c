//! Status-code helpers shared by the health endpoints and the error classifier.

use http::StatusCode;

use crate::HttpOutcome;

/// Canonical reason phrase for `status`, or `""` when the code has none.
pub fn reason_phrase(status: u16) -> &'static str {
    StatusCode::from_u16(status)
        .ok()
        .and_then(|code| code.canonical_reason())
        .unwrap_or("")
}

/// Build a `{"message": <reason phrase>}` outcome for `status`.
pub fn http_response(status: u16) -> HttpOutcome {
    HttpOutcome::message(status, reason_phrase(status))
}
