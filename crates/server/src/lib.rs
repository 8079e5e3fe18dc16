//! HTTP server runtime for the Teller banking assistant.
//!
//! Wires configuration, database, and the conversational engine into an
//! axum application and drives it until a shutdown signal arrives.

pub mod bootstrap;
pub mod health;
pub mod portal;

use std::future::IntoFuture;
use std::pin::pin;
use std::sync::Arc;
use std::time::Duration;

use anyhow::Result;
use tokio::net::TcpListener;
use tokio::sync::oneshot;
use tracing::{error, info, warn};

use teller_core::config::{AppConfig, LoadOptions};

pub fn init_logging(config: &AppConfig) {
    use teller_core::config::LogFormat::*;
    use tracing::Level;

    let log_level = config.logging.level.parse::<Level>().unwrap_or(Level::INFO);

    match config.logging.format {
        Compact => {
            tracing_subscriber::fmt().with_target(false).with_max_level(log_level).compact().init();
        }
        Pretty => {
            tracing_subscriber::fmt().with_target(false).with_max_level(log_level).pretty().init();
        }
        Json => {
            tracing_subscriber::fmt().with_target(false).with_max_level(log_level).json().init();
        }
    }
}

pub async fn run() -> Result<()> {
    // Load config and initialize logging before any other operations
    let config = AppConfig::load(LoadOptions::default())?;
    init_logging(&config);

    serve(config).await
}

/// Serve the portal until interrupted, then drain within the configured window.
pub async fn serve(config: AppConfig) -> Result<()> {
    let drain_limit = Duration::from_secs(config.server.graceful_shutdown_secs);
    let address = format!("{}:{}", config.server.bind_address, config.server.port);

    let app = bootstrap::bootstrap_with_config(config).await?;
    let router = portal::router(Arc::new(app));

    let listener = TcpListener::bind(&address).await?;
    info!(
        event_name = "system.server.started",
        correlation_id = "bootstrap",
        bind_address = %address,
        "teller-server listening"
    );

    let (drain_tx, drain_rx) = oneshot::channel();
    let server = axum::serve(listener, router).with_graceful_shutdown(async move {
        shutdown_signal().await;
        info!(
            event_name = "system.server.stopping",
            correlation_id = "shutdown",
            "shutdown signal received, draining connections"
        );
        let _ = drain_tx.send(());
    });

    // Open connections get one drain window after the signal, then we stop anyway.
    let mut serving = pin!(server.into_future());
    tokio::select! {
        result = &mut serving => result?,
        _ = drain_deadline(drain_rx, drain_limit) => {
            warn!(
                event_name = "system.server.drain_timeout",
                correlation_id = "shutdown",
                timeout_secs = drain_limit.as_secs(),
                "connections did not drain in time, stopping anyway"
            );
        }
    }

    info!(
        event_name = "system.server.stopped",
        correlation_id = "shutdown",
        "teller-server stopped"
    );
    Ok(())
}

async fn drain_deadline(drain_rx: oneshot::Receiver<()>, limit: Duration) {
    if drain_rx.await.is_ok() {
        tokio::time::sleep(limit).await;
    } else {
        // Sender dropped without signalling; the serve future finishes on its own.
        std::future::pending::<()>().await;
    }
}

async fn shutdown_signal() {
    if let Err(e) = tokio::signal::ctrl_c().await {
        error!(error = %e, "shutdown signal handler unavailable");
        std::future::pending::<()>().await;
    }
}
