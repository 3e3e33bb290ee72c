use std::net::SocketAddr;
use std::path::PathBuf;
use std::time::Duration;

use secrecy::SecretString;

use crate::SayanError;

pub const DEFAULT_DATABASE_URI: &str = "postgresql://postgres@postgres:5432/sayan_service";
pub const DEFAULT_CORS_METHODS: &str = "GET,HEAD,POST,OPTIONS,PUT,PATCH,DELETE";

/// Process configuration, read from the environment.
///
/// Defaults are production-safe; anything that has no safe default is an error
/// when malformed rather than silently ignored.
#[derive(Clone, Debug)]
pub struct Config {
    /// Environment label (local, development, staging, production).
    pub env: String,
    pub debug: bool,
    /// Upper-cased level name: TRACE, DEBUG, INFO, WARNING, ERROR, CRITICAL, NOTSET.
    pub log_level: String,
    /// Human-readable logs instead of JSON lines.
    pub log_pretty: bool,
    pub database_uri: SecretString,
    pub database_max_connections: u32,
    /// Log every SQL statement at debug level.
    pub database_echo: bool,
    pub readiness_timeout: Duration,
    pub migrations_dir: PathBuf,
    pub cors_origins: Vec<String>,
    pub cors_methods: Vec<String>,
    pub cors_allow_headers: Vec<String>,
    pub address: SocketAddr,
}

impl Config {
    pub fn from_env() -> Result<Self, SayanError> {
        Self::from_env_with(|k| std::env::var(k).ok())
    }

    /// Read configuration through `get` so tests never touch the process env.
    pub fn from_env_with<F>(mut get: F) -> Result<Self, SayanError>
    where
        F: FnMut(&str) -> Option<String>,
    {
        let env = get("ENV").unwrap_or_else(|| "production".into());
        let debug = parse_bool("DEBUG", get("DEBUG"))?.unwrap_or(false);
        let log_level = get("LOG_LEVEL")
            .map(|v| v.trim().to_uppercase())
            .unwrap_or_else(|| if debug { "DEBUG" } else { "INFO" }.into());
        level_directive(&log_level)?;
        let log_pretty = parse_bool("LOG_PRETTY", get("LOG_PRETTY"))?.unwrap_or(false);

        let database_uri = get("DATABASE_URI").unwrap_or_else(|| DEFAULT_DATABASE_URI.into());
        let database_max_connections =
            parse_num("DATABASE_MAX_CONNECTIONS", get("DATABASE_MAX_CONNECTIONS"))?.unwrap_or(10);
        if database_max_connections == 0 {
            return Err(SayanError::Config(
                "DATABASE_MAX_CONNECTIONS must be at least 1".into(),
            ));
        }
        let database_echo = match get("DATABASE_ECHO") {
            Some(v) => parse_bool("DATABASE_ECHO", Some(v))?,
            None => parse_bool("SQLALCHEMY_ECHO", get("SQLALCHEMY_ECHO"))?,
        }
        .unwrap_or(false);
        let readiness_timeout_ms: u64 =
            parse_num("READINESS_TIMEOUT_MS", get("READINESS_TIMEOUT_MS"))?.unwrap_or(2000);

        let migrations_dir = get("MIGRATIONS_DIR")
            .map(PathBuf::from)
            .unwrap_or_else(|| PathBuf::from("migrations"));

        let cors_origins = parse_csv(get("CORS_ORIGINS").as_deref().unwrap_or("*"));
        let cors_methods =
            parse_csv(get("CORS_METHODS").as_deref().unwrap_or(DEFAULT_CORS_METHODS));
        let cors_allow_headers = parse_csv(get("CORS_ALLOW_HEADERS").as_deref().unwrap_or("*"));

        let address = match get("ADDRESS") {
            Some(raw) => raw
                .parse()
                .map_err(|e| SayanError::Config(format!("ADDRESS {raw:?}: {e}")))?,
            None => SocketAddr::from(([0, 0, 0, 0], 8000)),
        };

        Ok(Self {
            env,
            debug,
            log_level,
            log_pretty,
            database_uri: SecretString::new(database_uri.into()),
            database_max_connections,
            database_echo,
            readiness_timeout: Duration::from_millis(readiness_timeout_ms),
            migrations_dir,
            cors_origins,
            cors_methods,
            cors_allow_headers,
            address,
        })
    }

    /// `tracing` filter directive for the configured level.
    pub fn log_filter(&self) -> &'static str {
        // validated in from_env_with
        level_directive(&self.log_level).unwrap_or("info")
    }
}

fn level_directive(level: &str) -> Result<&'static str, SayanError> {
    match level {
        "NOTSET" | "TRACE" => Ok("trace"),
        "DEBUG" => Ok("debug"),
        "INFO" => Ok("info"),
        "WARN" | "WARNING" => Ok("warn"),
        "ERROR" | "CRITICAL" => Ok("error"),
        other => Err(SayanError::Config(format!("LOG_LEVEL {other:?} is not a level"))),
    }
}

fn parse_bool(key: &str, raw: Option<String>) -> Result<Option<bool>, SayanError> {
    let Some(raw) = raw else { return Ok(None) };
    match raw.trim().to_ascii_lowercase().as_str() {
        "1" | "true" | "yes" | "on" | "y" | "t" => Ok(Some(true)),
        "0" | "false" | "no" | "off" | "n" | "f" | "" => Ok(Some(false)),
        _ => Err(SayanError::Config(format!("{key} {raw:?} is not a boolean"))),
    }
}

fn parse_num<T>(key: &str, raw: Option<String>) -> Result<Option<T>, SayanError>
where
    T: std::str::FromStr,
    T::Err: std::fmt::Display,
{
    raw.map(|v| {
        v.trim()
            .parse::<T>()
            .map_err(|e| SayanError::Config(format!("{key} {v:?}: {e}")))
    })
    .transpose()
}

fn parse_csv(raw: &str) -> Vec<String> {
    raw.split(',')
        .map(str::trim)
        .filter(|s| !s.is_empty())
        .map(String::from)
        .collect()
}
