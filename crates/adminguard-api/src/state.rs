//! Application state shared across all handlers and middleware.

use std::sync::Arc;

use adminguard_auth::AuthOrchestrator;
use adminguard_core::config::AppConfig;

/// Passed to every Axum handler via `State<AppState>`.
#[derive(Debug, Clone)]
pub struct AppState {
    /// Application configuration.
    pub config: Arc<AppConfig>,
    /// Authentication, session, monitor and audit operations.
    pub auth: AuthOrchestrator,
}

impl AppState {
    /// Creates the state from a configured orchestrator.
    pub fn new(config: Arc<AppConfig>, auth: AuthOrchestrator) -> Self {
        Self { config, auth }
    }
}
