//! Metric names and recording helpers.
//!
//! Everything goes through the `metrics` facade; with no recorder installed the
//! calls are no-ops, which keeps unit tests free of global state.

pub const READINESS_PROBE_TOTAL: &str = "readiness_probe_total";
pub const HTTP_REQUESTS_TOTAL: &str = "http_requests_total";
pub const HTTP_REQUEST_DURATION_SECONDS: &str = "http_request_duration_seconds";

pub fn record_probe(probe: &str, ready: bool) {
    let result = if ready { "ready" } else { "not_ready" };
    metrics::counter!(
        READINESS_PROBE_TOTAL,
        "probe" => probe.to_string(),
        "result" => result
    )
    .increment(1);
}

pub fn record_request(method: &str, path: &str, status: u16, elapsed_secs: f64) {
    let labels = [
        ("method", method.to_string()),
        ("path", path.to_string()),
        ("status", status.to_string()),
    ];
    metrics::counter!(HTTP_REQUESTS_TOTAL, &labels).increment(1);
    metrics::histogram!(HTTP_REQUEST_DURATION_SECONDS, &labels).record(elapsed_secs);
}

#[cfg(test)]
mod tests {
    use super::*;

    #[test]
    fn recording_without_recorder_is_noop() {
        record_probe("postgres", false);
        record_request("GET", "/v1/health/ready", 500, 0.002);
    }
}
