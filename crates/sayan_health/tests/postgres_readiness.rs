use std::time::Duration;

use sayan_health::postgres::{PostgresProbe, lazy_pool};
use sayan_health::{Config, Probe, ReadinessAggregator};
use secrecy::SecretString;

fn config_for(uri: &str) -> Config {
    let mut cfg = Config::from_env_with(|_| None).expect("cfg");
    cfg.database_uri = SecretString::new(uri.into());
    cfg.readiness_timeout = Duration::from_millis(500);
    cfg
}

#[tokio::test]
async fn unreachable_postgres_reports_500_with_entry() {
    let cfg = config_for("postgres://postgres@127.0.0.1:1/sayan_service");
    let probe = PostgresProbe::new(lazy_pool(&cfg).unwrap());
    let aggregator = ReadinessAggregator::new(cfg.readiness_timeout).register(probe);

    let outcome = aggregator.check_readiness().await;
    assert_eq!(outcome.status, 500);
    assert_eq!(outcome.to_json(), serde_json::json!({"postgres": false}));
}

#[tokio::test]
async fn liveness_ignores_database_state() {
    let cfg = config_for("postgres://postgres@127.0.0.1:1/sayan_service");
    let probe = PostgresProbe::new(lazy_pool(&cfg).unwrap());
    let aggregator = ReadinessAggregator::default().register(probe);

    let outcome = aggregator.check_liveness();
    assert_eq!(outcome.status, 200);
    assert_eq!(outcome.to_json(), serde_json::json!({"message": "OK"}));
}

/// Runs only when `TEST_DATABASE_URI` points at a live PostgreSQL.
#[tokio::test]
async fn live_postgres_is_ready() {
    let Ok(uri) = std::env::var("TEST_DATABASE_URI") else {
        eprintln!("TEST_DATABASE_URI not set; skipping");
        return;
    };
    let cfg = config_for(&uri);
    let probe = PostgresProbe::new(lazy_pool(&cfg).unwrap());
    assert!(probe.ping().await);

    let outcome = ReadinessAggregator::default().register(probe).check_readiness().await;
    assert_eq!(outcome.status, 200);
    assert_eq!(outcome.to_json(), serde_json::json!({"postgres": true}));
}
