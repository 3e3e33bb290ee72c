//! Liveness and readiness evaluation.
//!
//! Liveness only proves the process is scheduling requests and never touches a
//! dependency. Readiness runs every registered [`Probe`] and reports each one,
//! so an outage in one dependency never hides the state of the others.

use std::panic::AssertUnwindSafe;
use std::sync::Arc;
use std::time::Duration;

use futures_util::FutureExt;
use futures_util::future::join_all;
use tracing::{debug, warn};

use crate::observability;
use crate::{HttpOutcome, Probe, ReadinessReport, http_response};

pub const DEFAULT_PROBE_TIMEOUT: Duration = Duration::from_secs(2);

/// Runs the registered dependency probes and aggregates their results.
#[derive(Clone)]
pub struct ReadinessAggregator {
    probes: Vec<Arc<dyn Probe>>,
    timeout: Duration,
}

impl Default for ReadinessAggregator {
    fn default() -> Self {
        Self::new(DEFAULT_PROBE_TIMEOUT)
    }
}

impl ReadinessAggregator {
    /// Create an aggregator whose probes are each bounded by `timeout`.
    pub fn new(timeout: Duration) -> Self {
        Self {
            probes: Vec::new(),
            timeout,
        }
    }

    /// Register a probe. A probe with an already registered name replaces it.
    pub fn register(mut self, probe: impl Probe) -> Self {
        self.register_arc(Arc::new(probe));
        self
    }

    pub fn register_arc(&mut self, probe: Arc<dyn Probe>) {
        self.probes.retain(|p| p.name() != probe.name());
        self.probes.push(probe);
    }

    pub fn probe_names(&self) -> impl Iterator<Item = &str> {
        self.probes.iter().map(|p| p.name())
    }

    pub fn check_liveness(&self) -> HttpOutcome {
        http_response(200)
    }

    /// Probe every dependency; 200 when all are ready, 500 otherwise.
    pub async fn check_readiness(&self) -> HttpOutcome {
        let report = self.report().await;
        let status = if report.all_ready() { 200 } else { 500 };
        debug!(status, dependencies = report.len(), "readiness evaluated");
        HttpOutcome::readiness(status, report)
    }

    /// Run all probes concurrently and collect one entry per probe.
    pub async fn report(&self) -> ReadinessReport {
        let checks = self.probes.iter().map(|probe| self.run_probe(probe.clone()));
        join_all(checks).await.into_iter().collect()
    }

    async fn run_probe(&self, probe: Arc<dyn Probe>) -> (String, bool) {
        let name = probe.name().to_string();
        let ping = AssertUnwindSafe(probe.ping()).catch_unwind();
        let ready = match tokio::time::timeout(self.timeout, ping).await {
            Ok(Ok(ready)) => ready,
            Ok(Err(_)) => {
                warn!(probe = %name, "readiness probe panicked");
                false
            }
            Err(_) => {
                warn!(
                    probe = %name,
                    timeout_ms = self.timeout.as_millis() as u64,
                    "readiness probe timed out"
                );
                false
            }
        };
        observability::record_probe(&name, ready);
        (name, ready)
    }
}
