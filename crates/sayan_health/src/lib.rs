//! Health, readiness and error-classification core for the sayan service.
//!
//! The crate owns the two pieces of decision logic the HTTP layer delegates to:
//! the [`readiness::ReadinessAggregator`], which turns a set of dependency
//! [`Probe`]s into a pass/fail report, and [`errors::resolve`], which maps an
//! escaped [`errors::Failure`] to a uniform status/body pair.

use std::collections::BTreeMap;

use async_trait::async_trait;
use serde::Serialize;
use thiserror::Error;

pub mod config;
pub mod errors;
pub mod response;
pub mod migrations;
pub mod observability;
pub mod postgres;
pub mod readiness;
pub mod retry;
mod test_utils;

// Panics in readiness checks and handlers are recovered from, never fatal to the process.
#[cfg(not(panic = "unwind"))]
compile_error!("sayan_health requires panic = \"unwind\"");

pub use config::Config;
pub use errors::{Failure, FailureKind, resolve};
pub use response::http_response;
pub use readiness::ReadinessAggregator;

#[derive(Debug, Error)]
pub enum SayanError {
    #[error("configuration error: {0}")]
    Config(String),
    #[error("database error: {0}")]
    Database(#[from] sqlx::Error),
    #[error("migration error: {0}")]
    Migration(#[from] sqlx::migrate::MigrateError),
}

/// Per-dependency health, keyed by probe identifier.
///
/// Serializes as a flat JSON object, e.g. `{"postgres": true}`.
#[derive(Clone, Debug, Default, PartialEq, Eq, Serialize)]
#[serde(transparent)]
pub struct ReadinessReport(BTreeMap<String, bool>);

impl ReadinessReport {
    pub fn new() -> Self {
        Self::default()
    }

    /// Record a probe result. A repeated identifier overwrites the earlier value.
    pub fn record(&mut self, dependency: impl Into<String>, ready: bool) {
        self.0.insert(dependency.into(), ready);
    }

    pub fn get(&self, dependency: &str) -> Option<bool> {
        self.0.get(dependency).copied()
    }

    /// True when every recorded dependency is healthy (vacuously true when empty).
    pub fn all_ready(&self) -> bool {
        self.0.values().all(|ready| *ready)
    }

    pub fn len(&self) -> usize {
        self.0.len()
    }

    pub fn is_empty(&self) -> bool {
        self.0.is_empty()
    }
}

impl<S: Into<String>> FromIterator<(S, bool)> for ReadinessReport {
    fn from_iter<I: IntoIterator<Item = (S, bool)>>(iter: I) -> Self {
        let mut report = Self::new();
        for (name, ready) in iter {
            report.record(name, ready);
        }
        report
    }
}

#[derive(Clone, Debug, PartialEq, Eq, Serialize)]
#[serde(untagged)]
pub enum OutcomeBody {
    Message { message: String },
    Readiness(ReadinessReport),
}

/// A status code plus the JSON body to render for it.
#[derive(Clone, Debug, PartialEq, Eq, Serialize)]
pub struct HttpOutcome {
    pub status: u16,
    pub body: OutcomeBody,
}

impl HttpOutcome {
    pub fn message(status: u16, message: impl Into<String>) -> Self {
        Self {
            status,
            body: OutcomeBody::Message {
                message: message.into(),
            },
        }
    }

    pub fn readiness(status: u16, report: ReadinessReport) -> Self {
        Self {
            status,
            body: OutcomeBody::Readiness(report),
        }
    }

    pub fn is_success(&self) -> bool {
        (200..300).contains(&self.status)
    }

    pub fn to_json(&self) -> serde_json::Value {
        serde_json::to_value(&self.body).unwrap_or(serde_json::Value::Null)
    }
}

/// A dependency check that reduces to a boolean.
///
/// Implementations must not fail: every error is logged and reported as `false`.
#[async_trait]
pub trait Probe: Send + Sync + 'static {
    /// Identifier the result is reported under, e.g. `"postgres"`.
    fn name(&self) -> &str;

    async fn ping(&self) -> bool;
}

#[cfg(test)]
mod tests {
    use super::*;

    #[test]
    fn workspace_profiles_keep_unwinding() {
        let manifest = include_str!("../../../Cargo.toml");
        assert!(!manifest.lines().any(|l| l.trim_start().starts_with("panic")));
    }

    #[test]
    fn readiness_report_serializes_flat() {
        let report: ReadinessReport = [("postgres", true), ("redis", false)].into_iter().collect();
        let json = serde_json::to_value(&report).unwrap();
        assert_eq!(json, serde_json::json!({"postgres": true, "redis": false}));
        assert!(!report.all_ready());
    }

    #[test]
    fn empty_report_is_ready() {
        let report = ReadinessReport::new();
        assert!(report.is_empty());
        assert!(report.all_ready());
    }

    #[test]
    fn record_overwrites_same_dependency() {
        let mut report = ReadinessReport::new();
        report.record("postgres", false);
        report.record("postgres", true);
        assert_eq!(report.len(), 1);
        assert_eq!(report.get("postgres"), Some(true));
    }

    #[test]
    fn message_outcome_renders_message_field() {
        let outcome = HttpOutcome::message(200, "OK");
        assert_eq!(outcome.to_json(), serde_json::json!({"message": "OK"}));
        assert!(outcome.is_success());
    }
}
