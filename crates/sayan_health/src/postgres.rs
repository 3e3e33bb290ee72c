//! PostgreSQL connectivity: pool construction and the readiness probe.

use async_trait::async_trait;
use secrecy::ExposeSecret;
use sqlx::ConnectOptions;
use sqlx::PgPool;
use sqlx::postgres::{PgConnectOptions, PgPoolOptions};
use tracing::{error, info, warn};

use crate::retry::RetryPolicy;
use crate::{Config, Probe, SayanError};

pub const POSTGRES_PROBE: &str = "postgres";

fn connect_options(config: &Config) -> Result<PgConnectOptions, SayanError> {
    let options: PgConnectOptions = config
        .database_uri
        .expose_secret()
        .parse()
        .map_err(|e| SayanError::Config(format!("DATABASE_URI: {e}")))?;
    Ok(if config.database_echo {
        options
    } else {
        options.disable_statement_logging()
    })
}

fn pool_options(config: &Config) -> PgPoolOptions {
    PgPoolOptions::new()
        .max_connections(config.database_max_connections)
        .acquire_timeout(config.readiness_timeout)
}

/// Build a pool without connecting. The first query opens a connection, so the
/// process starts (and stays live) while the database is still unreachable.
pub fn lazy_pool(config: &Config) -> Result<PgPool, SayanError> {
    Ok(pool_options(config).connect_lazy_with(connect_options(config)?))
}

/// Connect eagerly, retrying with backoff per `policy`.
pub async fn connect_pool(config: &Config, policy: &RetryPolicy) -> Result<PgPool, SayanError> {
    let options = connect_options(config)?;
    let pool = policy
        .retry_async(|| {
            let options = options.clone();
            async move { pool_options(config).connect_with(options).await }
        })
        .await?;
    info!(
        max_connections = config.database_max_connections,
        "connected to database"
    );
    Ok(pool)
}

/// `SELECT 1` must come back as exactly one row holding the integer 1.
pub(crate) fn is_expected_scalar(value: Option<i32>) -> bool {
    value == Some(1)
}

/// Readiness probe that round-trips `SELECT 1` through the pool.
#[derive(Clone, Debug)]
pub struct PostgresProbe {
    pool: PgPool,
}

impl PostgresProbe {
    pub fn new(pool: PgPool) -> Self {
        Self { pool }
    }

    async fn select_one(&self) -> Result<Option<i32>, sqlx::Error> {
        let row: Option<Option<i32>> = sqlx::query_scalar("SELECT 1")
            .fetch_optional(&self.pool)
            .await?;
        Ok(row.flatten())
    }
}

#[async_trait]
impl Probe for PostgresProbe {
    fn name(&self) -> &str {
        POSTGRES_PROBE
    }

    async fn ping(&self) -> bool {
        match self.select_one().await {
            Ok(value) if is_expected_scalar(value) => true,
            Ok(value) => {
                warn!(?value, "The database returned an unexpected result for SELECT 1");
                false
            }
            Err(e) => {
                error!("The database is not available: {e}");
                false
            }
        }
    }
}
