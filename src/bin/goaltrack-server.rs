//! # Goaltrack Server
//!
//! Runs the HTTP API with the in-process document store and the configured
//! cache backend.
//!
//! ## Usage
//!
//! ```bash
//! # Defaults plus config/goaltrack.toml
//! cargo run --bin goaltrack-server
//!
//! # Production logging against a local Redis
//! GOALTRACK_ENV=production REDIS_URL=redis://127.0.0.1:6379 cargo run --bin goaltrack-server
//! ```

use std::sync::Arc;

use anyhow::Context;
use tokio::signal;
use tracing::{error, info};

use goaltrack_core::config::ConfigManager;
use goaltrack_core::logging;
use goaltrack_core::store::InMemoryStore;
use goaltrack_core::web::{create_app, state::AppState};

#[tokio::main]
async fn main() -> anyhow::Result<()> {
    logging::init_structured_logging();

    info!(
        version = env!("CARGO_PKG_VERSION"),
        build_mode = if cfg!(debug_assertions) { "debug" } else { "release" },
        "Starting Goaltrack server"
    );

    let manager = ConfigManager::load().context("failed to load configuration")?;
    let config = manager.config().clone();
    let bind_address = config.web.bind_address.clone();

    let state = AppState::from_config(config, Arc::new(InMemoryStore::new())).await;
    let cache = state.cache.clone();
    let app = create_app(state);

    let listener = tokio::net::TcpListener::bind(&bind_address)
        .await
        .with_context(|| format!("failed to bind {bind_address}"))?;

    info!(
        bind_address = %bind_address,
        environment = manager.environment(),
        cache_provider = cache.provider_name(),
        "Goaltrack server listening"
    );

    let served = axum::serve(listener, app)
        .with_graceful_shutdown(shutdown_signal())
        .await;

    cache.shutdown();
    if let Err(e) = &served {
        error!(error = %e, "Server terminated with an error");
    }
    served.context("server error")?;

    info!("Goaltrack server shutdown complete");
    Ok(())
}

/// Wait for Ctrl+C or SIGTERM
async fn shutdown_signal() {
    let ctrl_c = async {
        if let Err(e) = signal::ctrl_c().await {
            error!(error = %e, "Failed to install Ctrl+C handler");
            std::future::pending::<()>().await;
        }
    };

    #[cfg(unix)]
    let terminate = async {
        match signal::unix::signal(signal::unix::SignalKind::terminate()) {
            Ok(mut stream) => {
                stream.recv().await;
            }
            Err(e) => {
                error!(error = %e, "Failed to install SIGTERM handler");
                std::future::pending::<()>().await;
            }
        }
    };

    #[cfg(not(unix))]
    let terminate = std::future::pending::<()>();

    tokio::select! {
        _ = ctrl_c => info!("Received Ctrl+C"),
        _ = terminate => info!("Received SIGTERM"),
    }
}
