//! AdminGuard Server: administrative authentication and session security
//!
//! Main entry point that wires the auth stack to the HTTP API and starts the server.

use std::sync::Arc;
use std::time::Duration;

use anyhow::Context;
use tokio::sync::watch;
use tracing_subscriber::{EnvFilter, fmt};

use adminguard_api::{AppState, serve};
use adminguard_auth::{AccountStore, AuthComponents, AuthOrchestrator, MemoryAccountStore};
use adminguard_core::config::AppConfig;
use adminguard_core::types::{Clock, SystemClock};

#[tokio::main]
async fn main() {
    let config = match load_configuration() {
        Ok(c) => c,
        Err(e) => {
            eprintln!("Failed to load configuration: {e:#}");
            std::process::exit(1);
        }
    };

    init_logging(&config);

    if let Err(e) = run(config).await {
        tracing::error!("Server error: {e:#}");
        std::process::exit(1);
    }
}

/// Load configuration for the environment named by `ADMINGUARD_ENV`.
fn load_configuration() -> anyhow::Result<AppConfig> {
    let env = std::env::var("ADMINGUARD_ENV").unwrap_or_else(|_| "development".to_string());
    AppConfig::load(&env).with_context(|| format!("loading configuration for env '{env}'"))
}

/// Initialize tracing/logging
fn init_logging(config: &AppConfig) {
    let filter =
        EnvFilter::try_from_default_env().unwrap_or_else(|_| EnvFilter::new(&config.logging.level));

    match config.logging.format.as_str() {
        "json" => {
            fmt()
                .json()
                .with_env_filter(filter)
                .with_target(true)
                .with_thread_ids(true)
                .init();
        }
        _ => {
            fmt()
                .pretty()
                .with_env_filter(filter)
                .with_target(true)
                .init();
        }
    }
}

/// Main server run function
async fn run(config: AppConfig) -> anyhow::Result<()> {
    tracing::info!("Starting AdminGuard v{}", env!("CARGO_PKG_VERSION"));

    // ── Step 1: Account store ────────────────────────────────────
    let accounts = MemoryAccountStore::from_bootstrap(&config.bootstrap)
        .context("seeding bootstrap accounts")?;
    if accounts.is_empty() {
        tracing::warn!("No bootstrap accounts configured; every login will fail");
    } else {
        tracing::info!(accounts = accounts.len(), "Bootstrap accounts loaded");
    }
    let accounts: Arc<dyn AccountStore> = Arc::new(accounts);

    // ── Step 2: Auth orchestrator ────────────────────────────────
    let clock: Arc<dyn Clock> = Arc::new(SystemClock);
    let components = AuthComponents::in_memory(&config, accounts, clock);
    let auth = AuthOrchestrator::new(&config, components);

    // ── Step 3: Session cleanup ──────────────────────────────────
    let (shutdown_tx, shutdown_rx) = watch::channel(false);
    let cleanup_handle = auth.cleanup_task().spawn(
        Duration::from_secs(config.session.cleanup_interval_seconds),
        shutdown_rx,
    );

    // ── Step 4: HTTP server with graceful shutdown ───────────────
    let grace = Duration::from_secs(config.server.shutdown_grace_seconds);
    let state = AppState::new(Arc::new(config), auth);

    serve(state, async move {
        shutdown_signal().await;
        tracing::info!("Shutdown signal received, starting graceful shutdown...");
        let _ = shutdown_tx.send(true);
    })
    .await
    .context("HTTP server failed")?;

    // ── Step 5: Wait for background tasks ────────────────────────
    tracing::info!("Waiting for session cleanup to stop...");
    if tokio::time::timeout(grace, cleanup_handle).await.is_err() {
        tracing::warn!("Session cleanup did not stop within the grace period");
    }

    tracing::info!("AdminGuard server shut down gracefully");
    Ok(())
}

/// Wait for shutdown signal (Ctrl+C or SIGTERM)
async fn shutdown_signal() {
    let ctrl_c = async {
        if let Err(e) = tokio::signal::ctrl_c().await {
            tracing::error!("Failed to listen for Ctrl+C: {e}");
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
                tracing::error!("Failed to install SIGTERM handler: {e}");
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
