//! Storefront Edge - caching and update detection for a storefront
//!
//! Serves the version endpoint, cache diagnostics and memoized backend reads,
//! and proxies everything else through the service worker policy.

use std::net::SocketAddr;
use std::sync::Arc;

use anyhow::Context;
use tokio::signal;
use tokio::task::JoinHandle;
use tracing::{info, warn};
use tracing_subscriber::{layer::SubscriberExt, util::SubscriberInitExt};

use storefront_edge::api::{create_router, AppState};
use storefront_edge::platform::LogReloader;
use storefront_edge::version::{HttpVersionSource, PollerConfig, VersionPoller};
use storefront_edge::{spawn_cleanup_task, spawn_version_poller, Config};

/// Main entry point for the storefront edge server.
///
/// # Startup Sequence
/// 1. Initialize tracing subscriber for logging
/// 2. Load configuration from environment variables
/// 3. Build application state (cache, worker, upstream client)
/// 4. Install and activate the service worker policy
/// 5. Start the expiry sweep and, if configured, the version poller
/// 6. Serve HTTP until SIGINT/SIGTERM
#[tokio::main]
async fn main() -> anyhow::Result<()> {
    // Defaults to "info" level, can be overridden with RUST_LOG env var
    tracing_subscriber::registry()
        .with(
            tracing_subscriber::EnvFilter::try_from_default_env()
                .unwrap_or_else(|_| "storefront_edge=info,tower_http=info".into()),
        )
        .with(tracing_subscriber::fmt::layer())
        .init();

    info!("Starting Storefront Edge");

    let config = Config::from_env();
    info!(
        "Configuration loaded: max_entries={}, port={}, upstream={}, version_endpoint={:?}",
        config.max_entries, config.server_port, config.upstream_origin, config.version_endpoint
    );

    let mut state = AppState::from_config(&config);
    info!(version = %state.build.version, built = %state.build.build_time, "Build stamp");

    // Precache failures only cost offline coverage
    if let Err(err) = state.worker.install().await {
        warn!(error = %err, "Service worker install incomplete");
    }
    state.worker.activate().await;

    let mut handles: Vec<JoinHandle<()>> = Vec::new();
    handles.push(spawn_cleanup_task(state.cache.clone(), config.cleanup_period()));

    if let Some(endpoint) = &config.version_endpoint {
        let poller = Arc::new(VersionPoller::new(
            state.build.version.clone(),
            Arc::new(HttpVersionSource::new(endpoint.clone())),
            Arc::new(LogReloader::new()),
            PollerConfig {
                interval: config.poll_interval(),
                auto_reload: config.auto_reload,
                ..PollerConfig::default()
            },
        ));
        handles.push(spawn_version_poller(Arc::clone(&poller), None));
        state = state.with_poller(poller);
    }

    let app = create_router(state);

    let addr = SocketAddr::from(([0, 0, 0, 0], config.server_port));
    let listener = tokio::net::TcpListener::bind(addr)
        .await
        .with_context(|| format!("failed to bind {}", addr))?;
    info!("Server listening on http://{}", addr);

    axum::serve(listener, app)
        .with_graceful_shutdown(shutdown_signal(handles))
        .await
        .context("server error")?;

    info!("Server shutdown complete");
    Ok(())
}

/// Waits for shutdown signal (Ctrl+C or SIGTERM), then aborts background tasks.
async fn shutdown_signal(handles: Vec<JoinHandle<()>>) {
    let ctrl_c = async {
        if let Err(err) = signal::ctrl_c().await {
            warn!(error = %err, "Failed to listen for Ctrl+C");
            std::future::pending::<()>().await;
        }
    };

    #[cfg(unix)]
    let terminate = async {
        match signal::unix::signal(signal::unix::SignalKind::terminate()) {
            Ok(mut sigterm) => {
                sigterm.recv().await;
            }
            Err(err) => {
                warn!(error = %err, "Failed to install SIGTERM handler");
                std::future::pending::<()>().await;
            }
        }
    };

    #[cfg(not(unix))]
    let terminate = std::future::pending::<()>();

    tokio::select! {
        _ = ctrl_c => {
            info!("Received Ctrl+C, initiating shutdown...");
        }
        _ = terminate => {
            info!("Received SIGTERM, initiating shutdown...");
        }
    }

    for handle in handles {
        handle.abort();
    }
    warn!("Background tasks aborted");
}
