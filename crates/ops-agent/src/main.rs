//! # Flight Operations Desk Server
//!
//! Binary entry point for the operations desk HTTP service.

use std::sync::Arc;

use tracing_subscriber::{layer::SubscriberExt, util::SubscriberInitExt};

use ops_agent::{AgentContext, Config, build_router};
use ops_store::JsonFileStore;

#[tokio::main]
async fn main() -> anyhow::Result<()> {
    // Load environment variables
    dotenvy::dotenv().ok();

    // Initialize tracing before reading config so bad values get logged
    let log_level = std::env::var("LOG_LEVEL").unwrap_or_else(|_| "info".to_string());
    tracing_subscriber::registry()
        .with(
            tracing_subscriber::EnvFilter::try_from_default_env()
                .unwrap_or_else(|_| log_level.into()),
        )
        .with(tracing_subscriber::fmt::layer().json())
        .init();

    let config = Config::from_env();

    tracing::info!(
        version = ops_agent::VERSION,
        log_level = %config.log_level,
        "Starting flight operations desk"
    );

    if !config.data_file.exists() {
        anyhow::bail!("roster file {} does not exist", config.data_file.display());
    }
    tracing::info!(path = %config.data_file.display(), "Using JSON roster store");

    let store = Arc::new(JsonFileStore::new(&config.data_file));
    let ctx = AgentContext::over_store(store, config.severity);

    tracing::info!(policy = ?config.severity, "Severity policy loaded");

    let app = build_router(ctx, &config.cors_origins);

    let addr = config.server_addr;
    tracing::info!(%addr, "Starting HTTP server");

    let listener = tokio::net::TcpListener::bind(addr).await?;

    axum::serve(listener, app)
        .with_graceful_shutdown(shutdown_signal())
        .await?;

    tracing::info!("Server shut down gracefully");
    Ok(())
}

/// Graceful shutdown signal handler
async fn shutdown_signal() {
    let ctrl_c = async {
        tokio::signal::ctrl_c()
            .await
            .expect("Failed to install Ctrl+C handler");
    };

    #[cfg(unix)]
    let terminate = async {
        tokio::signal::unix::signal(tokio::signal::unix::SignalKind::terminate())
            .expect("Failed to install signal handler")
            .recv()
            .await;
    };

    #[cfg(not(unix))]
    let terminate = std::future::pending::<()>();

    tokio::select! {
        () = ctrl_c => {
            tracing::info!("Received Ctrl+C, shutting down");
        }
        () = terminate => {
            tracing::info!("Received SIGTERM, shutting down");
        }
    }
}
