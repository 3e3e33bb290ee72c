//! HTTP application for the sayan service.
//!
//! [`create_app`] is the application factory: it mounts the versioned health
//! routes and `/metrics`, and wraps everything in the global error interception
//! (unknown routes and handler panics both go through the error classifier),
//! request metrics and CORS.

use anyhow::Context;
use axum::http::{HeaderName, HeaderValue, Method};
use axum::routing::get;
use axum::{Router, middleware};
use sayan_health::Config;
use tower_http::catch_panic::CatchPanicLayer;
use tower_http::cors::{AllowHeaders, AllowOrigin, CorsLayer};

pub mod error;
pub mod handlers;
pub mod logging;
pub mod metrics;
pub mod state;
mod test_utils;

pub use error::ApiError;
pub use state::AppState;

/// Versioned API routes, without middleware.
pub fn api_routes() -> Router<AppState> {
    Router::new()
        .route("/v1/health/alive", get(handlers::get_alive))
        .route("/v1/health/ready", get(handlers::get_ready))
        .route("/metrics", get(metrics::render))
}

/// Wrap `router` with request metrics, error interception and CORS.
pub fn with_middleware(router: Router<AppState>, cors: CorsLayer) -> Router<AppState> {
    router
        .route_layer(middleware::from_fn(metrics::track_requests))
        .fallback(handlers::not_found)
        .layer(CatchPanicLayer::custom(error::panic_response))
        .layer(cors)
}

pub fn create_app(state: AppState, config: &Config) -> anyhow::Result<Router> {
    let cors = cors_layer(config)?;
    Ok(with_middleware(api_routes(), cors).with_state(state))
}

/// CORS policy from the configured origin/method/header lists. `*` means any.
pub fn cors_layer(config: &Config) -> anyhow::Result<CorsLayer> {
    let origins = if config.cors_origins.iter().any(|o| o == "*") {
        AllowOrigin::any()
    } else {
        let values = config
            .cors_origins
            .iter()
            .map(|o| HeaderValue::from_str(o).with_context(|| format!("CORS origin {o:?}")))
            .collect::<anyhow::Result<Vec<_>>>()?;
        AllowOrigin::list(values)
    };

    let methods = config
        .cors_methods
        .iter()
        .map(|m| {
            Method::from_bytes(m.to_ascii_uppercase().as_bytes())
                .with_context(|| format!("CORS method {m:?}"))
        })
        .collect::<anyhow::Result<Vec<_>>>()?;

    let headers = if config.cors_allow_headers.iter().any(|h| h == "*") {
        AllowHeaders::any()
    } else {
        let names = config
            .cors_allow_headers
            .iter()
            .map(|h| HeaderName::from_bytes(h.as_bytes()).with_context(|| format!("CORS header {h:?}")))
            .collect::<anyhow::Result<Vec<_>>>()?;
        AllowHeaders::list(names)
    };

    Ok(CorsLayer::new()
        .allow_origin(origins)
        .allow_methods(methods)
        .allow_headers(headers))
}

#[cfg(test)]
mod tests {
    use super::*;

    fn config(pairs: &[(&str, &str)]) -> Config {
        let pairs: Vec<(String, String)> = pairs
            .iter()
            .map(|(k, v)| (k.to_string(), v.to_string()))
            .collect();
        Config::from_env_with(|k| pairs.iter().find(|(key, _)| key == k).map(|(_, v)| v.clone()))
            .expect("cfg")
    }

    #[test]
    fn default_cors_is_permissive() {
        assert!(cors_layer(&config(&[])).is_ok());
    }

    #[test]
    fn explicit_cors_lists_are_accepted() {
        let cfg = config(&[
            ("CORS_ORIGINS", "https://app.example,https://admin.example"),
            ("CORS_METHODS", "get,post"),
            ("CORS_ALLOW_HEADERS", "content-type,authorization"),
        ]);
        assert!(cors_layer(&cfg).is_ok());
    }

    #[test]
    fn invalid_cors_origin_is_rejected() {
        let cfg = config(&[("CORS_ORIGINS", "https://bad\norigin")]);
        assert!(cors_layer(&cfg).is_err());
    }
}
