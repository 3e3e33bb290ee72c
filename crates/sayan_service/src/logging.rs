//! Structured logging setup.
//!
//! Initialized once by the binary before anything else runs; every component
//! then logs through the `tracing` macros.

use sayan_health::Config;
use tracing_subscriber::EnvFilter;

use crate::error::panic_message;

/// Filter directive: `RUST_LOG` when set, else the configured level with
/// noisy transport crates held at warn.
pub fn filter_directive(config: &Config, rust_log: Option<String>) -> String {
    match rust_log.filter(|v| !v.trim().is_empty()) {
        Some(explicit) => explicit,
        None => format!("{},hyper=warn,h2=warn", config.log_filter()),
    }
}

/// JSON lines to stdout, or compact human-readable output when `LOG_PRETTY` is set.
pub fn init(config: &Config) -> anyhow::Result<()> {
    let directive = filter_directive(config, std::env::var("RUST_LOG").ok());
    let env_filter = EnvFilter::try_new(&directive)
        .unwrap_or_else(|_| EnvFilter::new(format!("{},hyper=warn,h2=warn", config.log_filter())));

    let builder = tracing_subscriber::fmt()
        .with_env_filter(env_filter)
        .with_writer(std::io::stdout);

    let result = if config.log_pretty {
        builder.compact().with_target(false).try_init()
    } else {
        builder
            .json()
            .flatten_event(true)
            .with_current_span(false)
            .with_ansi(false)
            .try_init()
    };
    result.map_err(|e| anyhow::anyhow!("failed to initialize logging: {e}"))?;

    tracing::info!(
        env = %config.env,
        filter = %directive,
        pretty = config.log_pretty,
        "logging initialized"
    );
    Ok(())
}

/// Report panics as a single `tracing` error event instead of the default
/// stderr message. Handler panics caught by the interception layer are not
/// logged a second time.
pub fn install_panic_hook() {
    std::panic::set_hook(Box::new(|info| {
        let location = info
            .location()
            .map(|l| format!("{}:{}", l.file(), l.line()))
            .unwrap_or_else(|| "unknown".to_string());
        tracing::error!(
            panic.location = %location,
            "panic: {}",
            panic_message(info.payload())
        );
    }));
}

#[cfg(test)]
mod tests {
    use super::*;

    fn config(level: Option<&str>) -> Config {
        let level = level.map(str::to_string);
        Config::from_env_with(|k| if k == "LOG_LEVEL" { level.clone() } else { None })
            .expect("cfg")
    }

    #[test]
    fn uses_configured_level_by_default() {
        assert_eq!(
            filter_directive(&config(Some("error")), None),
            "error,hyper=warn,h2=warn"
        );
    }

    #[test]
    fn rust_log_wins_when_set() {
        assert_eq!(
            filter_directive(&config(None), Some("sayan_service=trace".into())),
            "sayan_service=trace"
        );
    }

    #[test]
    fn blank_rust_log_is_ignored() {
        assert_eq!(
            filter_directive(&config(None), Some("  ".into())),
            "info,hyper=warn,h2=warn"
        );
    }

    #[test]
    fn default_directive_parses() {
        let directive = filter_directive(&config(Some("critical")), None);
        assert!(EnvFilter::try_new(directive).is_ok());
    }
}
