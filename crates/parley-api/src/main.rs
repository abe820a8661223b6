//! Parley REST API entry point.
//!
//! Binary name: `parley`
//!
//! Loads configuration, initializes tracing and the database, then either
//! applies migrations and exits or starts the REST API server.

mod cli;
mod http;
mod state;

use std::future::IntoFuture;
use std::time::Duration;

use anyhow::Context;
use clap::Parser;
use tokio_util::sync::CancellationToken;

use cli::{Cli, Commands};
use parley_infra::config::{load_config, load_dotenv};
use parley_infra::sqlite::DatabasePool;
use parley_observe::tracing_setup::{init_tracing, shutdown_tracing};
use state::AppState;

#[tokio::main]
async fn main() -> anyhow::Result<()> {
    // .env may supply PARLEY_CONFIG, so it is loaded before argument parsing.
    let dotenv_path = load_dotenv();
    let cli = Cli::parse();

    let mut config = load_config(cli.config.as_deref())
        .await
        .context("failed to load configuration")?;

    init_tracing(&config.logging).map_err(|e| anyhow::anyhow!("failed to initialize tracing: {e}"))?;
    if let Some(path) = dotenv_path {
        tracing::debug!(path = %path.display(), "loaded .env");
    }

    let result = match cli.resolved_command() {
        Commands::Migrate => migrate(&config).await,
        Commands::Serve { host, port } => {
            if let Some(host) = host {
                config.server.host = host;
            }
            if let Some(port) = port {
                config.server.port = port;
            }
            serve(config).await
        }
    };

    if let Err(e) = &result {
        tracing::error!(error = %format!("{e:#}"), "parley exited with an error");
    }
    shutdown_tracing();
    result
}

/// Apply pending migrations and exit.
async fn migrate(config: &parley_types::config::AppConfig) -> anyhow::Result<()> {
    tracing::info!(url = %config.database.url, "running migrations");
    let pool = DatabasePool::new(&config.database)
        .await
        .context("failed to migrate database")?;
    pool.close().await;
    tracing::info!("migrations completed successfully");
    Ok(())
}

/// Run the HTTP server until a shutdown signal, then drain in-flight requests
/// for at most `shutdown_timeout_secs`.
async fn serve(config: parley_types::config::AppConfig) -> anyhow::Result<()> {
    let addr = config.server.bind_addr();
    let grace = Duration::from_secs(config.server.shutdown_timeout_secs);

    let state = AppState::init(config)
        .await
        .context("failed to initialize application state")?;
    let db_pool = state.db_pool.clone();

    let listener = tokio::net::TcpListener::bind(&addr)
        .await
        .with_context(|| format!("failed to bind {addr}"))?;
    tracing::info!(
        address = %addr,
        request_timeout_secs = state.config.server.request_timeout_secs,
        "HTTP server starting"
    );

    let router = http::router::build_router(state);

    let shutdown = CancellationToken::new();
    let trigger = shutdown.clone();
    tokio::spawn(async move {
        shutdown_signal().await;
        tracing::info!("shutdown signal received, draining requests");
        trigger.cancel();
    });

    let server = axum::serve(listener, router)
        .with_graceful_shutdown(shutdown.clone().cancelled_owned())
        .into_future();

    tokio::select! {
        result = server => result.context("HTTP server error")?,
        _ = async {
            shutdown.cancelled().await;
            tokio::time::sleep(grace).await;
        } => {
            tracing::warn!(grace_secs = grace.as_secs(), "graceful shutdown timed out, forcing close");
        }
    }

    db_pool.close().await;
    tracing::info!("HTTP server stopped");
    Ok(())
}

/// Wait for Ctrl+C or SIGTERM for graceful shutdown.
async fn shutdown_signal() {
    let ctrl_c = async {
        if let Err(e) = tokio::signal::ctrl_c().await {
            tracing::error!("failed to install Ctrl+C handler: {e}");
            std::future::pending::<()>().await;
        }
    };

    #[cfg(unix)]
    let terminate = async {
        match tokio::signal::unix::signal(tokio::signal::unix::SignalKind::terminate()) {
            Ok(mut signal) => {
                signal.recv().await;
            }
            Err(e) => {
                tracing::error!("failed to install SIGTERM handler: {e}");
                std::future::pending::<()>().await;
            }
        }
    };

    #[cfg(not(unix))]
    let terminate = std::future::pending::<()>();

    tokio::select! {
        _ = ctrl_c => {},
        _ = terminate => {},
    }
}
