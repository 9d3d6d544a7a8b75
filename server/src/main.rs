//! srxsync server: HTTP API and periodic monitoring around the srxsync engine.

mod error;
mod routes;
mod state;

use std::net::SocketAddr;
use std::sync::Arc;
use std::time::Duration;

use anyhow::{Context, Result};
use srxsync::{config, logging, SyncScheduler};
use tracing::{info, warn};

use state::AppState;

#[tokio::main]
async fn main() -> Result<()> {
    if let Err(e) = dotenvy::dotenv() {
        if !e.not_found() {
            eprintln!("Failed to read .env file: {}", e);
        }
    }

    let config = config::load_from_env().context("Failed to load configuration")?;
    logging::init(config.log_format)
        .map_err(|e| anyhow::anyhow!("Failed to initialize logging: {}", e))?;

    info!("Starting srxsync server v{}", env!("CARGO_PKG_VERSION"));
    info!(
        "Target group {} ({}), rules file {}",
        config.project_group_label, config.project_group_id, config.rules_file
    );

    let state = Arc::new(AppState::from_config(config)?);

    match state.rules.load().await {
        Ok(document) if document.is_valid() => {
            info!("Rules file {} loaded", document.source_path().display())
        }
        Ok(document) => warn!(
            "Rules file {} failed validation; passes will fail until it is fixed",
            document.source_path().display()
        ),
        Err(e) => warn!("{}; passes will fail until it is available", e),
    }

    let scheduler = if state.config.enable_auto_configuration {
        let scheduler = SyncScheduler::new(
            Arc::clone(&state.monitoring),
            Duration::from_secs(state.config.check_interval_secs),
        );
        let handle = scheduler.start(state.trigger_tx.subscribe());
        Some((scheduler, handle))
    } else {
        info!("Automatic configuration disabled; passes run only on request");
        None
    };

    let app = routes::router(Arc::clone(&state));
    let addr = SocketAddr::from(([0, 0, 0, 0], state.config.port));
    info!("Listening on http://{}", addr);

    let listener = tokio::net::TcpListener::bind(addr)
        .await
        .with_context(|| format!("Failed to bind {}", addr))?;
    axum::serve(listener, app)
        .with_graceful_shutdown(shutdown_signal())
        .await?;

    if let Some((scheduler, handle)) = scheduler {
        scheduler.stop();
        if let Err(e) = handle.await {
            warn!("Scheduler task ended abnormally: {}", e);
        }
    }

    info!("Server stopped");
    Ok(())
}

async fn shutdown_signal() {
    if let Err(e) = tokio::signal::ctrl_c().await {
        warn!("Failed to listen for shutdown signal: {}", e);
        std::future::pending::<()>().await;
    }
    info!("Shutdown signal received");
}
