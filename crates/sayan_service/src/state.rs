use std::sync::Arc;

use metrics_exporter_prometheus::PrometheusHandle;
use sayan_health::ReadinessAggregator;

/// Shared, read-only state handed to every handler.
#[derive(Clone)]
pub struct AppState {
    pub readiness: Arc<ReadinessAggregator>,
    pub metrics: PrometheusHandle,
}

impl AppState {
    pub fn new(readiness: ReadinessAggregator, metrics: PrometheusHandle) -> Self {
        Self {
            readiness: Arc::new(readiness),
            metrics,
        }
    }
}
