//! hr-server: HTTP surface for the home-page row engine.
//!
//! Exposes the row summary and row paging endpoints plus config and health
//! routes over Axum, backed by the SQLite library in `hr-db`.

pub mod context;
pub mod dto;
pub mod error;
pub mod middleware;
pub mod presenter;
pub mod router;
pub mod routes;

use std::net::SocketAddr;
use std::path::PathBuf;

use hr_core::config::Config;
use tokio_util::sync::CancellationToken;

use crate::context::AppContext;

/// Start the homerows server.
///
/// Opens the library database, builds the [`AppContext`] and serves HTTP
/// until a shutdown signal arrives.
pub async fn start(config: Config, config_path: Option<PathBuf>) -> hr_core::Result<()> {
    for warning in config.validate() {
        tracing::warn!("Config warning: {warning}");
    }

    let db_path = &config.server.db_path;
    if let Some(parent) = db_path.parent() {
        if !parent.as_os_str().is_empty() && !parent.exists() {
            std::fs::create_dir_all(parent)?;
            tracing::info!("Created database directory {}", parent.display());
        }
    }
    let db = hr_db::init_pool(db_path)?;

    let ctx = AppContext::new(db, &config, config_path);
    let shutdown = ctx.shutdown.clone();

    let addr: SocketAddr = format!("{}:{}", config.server.host, config.server.port)
        .parse()
        .map_err(|e| hr_core::Error::Internal(format!("Invalid server address: {e}")))?;

    let app = router::build_router(ctx);

    let listener = tokio::net::TcpListener::bind(addr)
        .await
        .map_err(|e| hr_core::Error::Internal(format!("Failed to bind to {addr}: {e}")))?;
    tracing::info!("Starting server on {addr}");

    axum::serve(listener, app)
        .with_graceful_shutdown(shutdown_signal(shutdown.clone()))
        .await
        .map_err(|e| hr_core::Error::Internal(format!("Server error: {e}")))?;

    shutdown.cancel();
    tracing::info!("Server shutdown complete");
    Ok(())
}

/// Wait for SIGINT, SIGTERM or `cancel`, then cancel in-flight requests.
async fn shutdown_signal(cancel: CancellationToken) {
    let ctrl_c = async {
        if let Err(e) = tokio::signal::ctrl_c().await {
            tracing::warn!("Failed to listen for Ctrl+C: {e}");
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
                tracing::warn!("Failed to install SIGTERM handler: {e}");
                std::future::pending::<()>().await;
            }
        }
    };

    #[cfg(not(unix))]
    let terminate = std::future::pending::<()>();

    tokio::select! {
        _ = ctrl_c => {}
        _ = terminate => {}
        _ = cancel.cancelled() => {}
    }

    tracing::info!("Shutdown signal received");
    cancel.cancel();
}
