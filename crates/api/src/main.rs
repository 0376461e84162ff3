//! RepoPulse - GitHub event window service
//!
//! Main entry point: load configuration, start polling, serve queries.

use std::sync::Arc;

use anyhow::Context;
use repopulse_api::utils::logging::init_tracing;
use repopulse_api::{router, AppContext};
use tracing::{info, warn};

#[tokio::main]
async fn main() -> anyhow::Result<()> {
    // Load .env before the config loader reads the environment
    let dotenv = dotenvy::dotenv();

    let config = repopulse_infra::config::load().context("invalid configuration")?;
    init_tracing(&config.logging).context("failed to initialise logging")?;

    match dotenv {
        Ok(path) => info!(path = %path.display(), "loaded .env"),
        Err(err) if err.not_found() => {}
        Err(err) => warn!(error = %err, "could not load .env file"),
    }

    info!(
        interval_secs = config.poller.interval_seconds,
        horizon_minutes = config.retention.horizon_minutes,
        source = %config.source.base_url,
        "RepoPulse starting"
    );
    if config.source.token.is_none() {
        warn!("GITHUB_TOKEN not set; polling with the unauthenticated rate limit");
    }

    let bind_address = config.server.bind_address.clone();
    let context = Arc::new(AppContext::new(config).context("failed to build application context")?);
    context.start().await.context("failed to start poll scheduler")?;

    let listener = tokio::net::TcpListener::bind(&bind_address)
        .await
        .with_context(|| format!("failed to bind {bind_address}"))?;
    info!(address = %bind_address, "RepoPulse listening");

    let served = axum::serve(listener, router(context.clone()))
        .with_graceful_shutdown(shutdown_signal())
        .await;

    context.shutdown().await.context("poll scheduler did not stop cleanly")?;
    served.context("HTTP server error")?;
    Ok(())
}

async fn shutdown_signal() {
    let ctrl_c = async {
        if let Err(err) = tokio::signal::ctrl_c().await {
            warn!(error = %err, "failed to listen for ctrl-c");
            std::future::pending::<()>().await;
        }
    };

    #[cfg(unix)]
    let terminate = async {
        match tokio::signal::unix::signal(tokio::signal::unix::SignalKind::terminate()) {
            Ok(mut signal) => {
                signal.recv().await;
            }
            Err(err) => {
                warn!(error = %err, "failed to listen for SIGTERM");
                std::future::pending::<()>().await;
            }
        }
    };

    #[cfg(not(unix))]
    let terminate = std::future::pending::<()>();

    tokio::select! {
        () = ctrl_c => {}
        () = terminate => {}
    }
    info!("shutdown signal received");
}
