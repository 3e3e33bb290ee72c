use anyhow::Context;
use clap::{Parser, Subcommand};
use sayan_health::postgres::{PostgresProbe, connect_pool, lazy_pool};
use sayan_health::retry::RetryPolicy;
use sayan_health::{Config, ReadinessAggregator, migrations};
use sayan_service::{AppState, create_app, logging, metrics};
use tokio::signal;
use tracing::info;

#[derive(Debug, Parser)]
#[command(name = "sayan-service", version, about = "sayan service HTTP API")]
struct Cli {
    #[command(subcommand)]
    command: Option<Command>,
}

#[derive(Debug, Subcommand)]
enum Command {
    /// Serve the HTTP API (default).
    Serve,
    /// Apply pending database migrations and exit.
    Migrate,
}

#[tokio::main]
async fn main() -> anyhow::Result<()> {
    let cli = Cli::parse();
    let config = Config::from_env().context("loading configuration")?;
    logging::init(&config)?;
    logging::install_panic_hook();

    match cli.command.unwrap_or(Command::Serve) {
        Command::Serve => serve(config).await,
        Command::Migrate => migrate(config).await,
    }
}

async fn serve(config: Config) -> anyhow::Result<()> {
    let handle = metrics::install_recorder().context("installing prometheus recorder")?;

    let pool = lazy_pool(&config)?;
    let readiness =
        ReadinessAggregator::new(config.readiness_timeout).register(PostgresProbe::new(pool));
    let state = AppState::new(readiness, handle);
    let app = create_app(state, &config)?;

    let listener = tokio::net::TcpListener::bind(config.address)
        .await
        .with_context(|| format!("binding {}", config.address))?;
    info!(addr = %config.address, env = %config.env, "starting HTTP server");

    axum::serve(listener, app.into_make_service())
        .with_graceful_shutdown(shutdown_signal())
        .await
        .context("HTTP server error")?;

    info!("HTTP server stopped");
    Ok(())
}

async fn migrate(config: Config) -> anyhow::Result<()> {
    let pool = connect_pool(&config, &RetryPolicy::default()).await?;
    let known = migrations::run(&pool, &config.migrations_dir).await?;
    pool.close().await;
    info!(known, "migrate finished");
    Ok(())
}

async fn shutdown_signal() {
    if let Err(e) = signal::ctrl_c().await {
        tracing::error!("failed to install ctrl+c handler: {e}");
        std::future::pending::<()>().await;
    }
    info!("shutdown signal received");
}
