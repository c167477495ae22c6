//! Periodic sweep of expired sessions and stale counters.

use std::sync::Arc;
use std::time::Duration;

use tokio::sync::watch;
use tokio::task::JoinHandle;
use tokio::time::{self, MissedTickBehavior};
use tracing::{error, info};

use adminguard_core::error::AppError;

use crate::monitor::SecurityMonitor;
use crate::rate_limit::RateLimiter;

use super::registry::SessionRegistry;

/// What one sweep removed.
#[derive(Debug, Clone, Copy, Default, PartialEq, Eq)]
pub struct CleanupReport {
    /// Expired sessions evicted.
    pub sessions: usize,
    /// Rate-limit keys whose windows had fully elapsed.
    pub rate_limit_keys: usize,
    /// Login attempts past metrics retention.
    pub login_attempts: usize,
}

/// Evicts expired state independent of lookups so memory stays bounded
/// without traffic.
#[derive(Debug, Clone)]
pub struct SessionCleanup {
    registry: SessionRegistry,
    rate_limiter: RateLimiter,
    monitor: Arc<SecurityMonitor>,
}

impl SessionCleanup {
    /// Creates a new cleanup handler.
    pub fn new(
        registry: SessionRegistry,
        rate_limiter: RateLimiter,
        monitor: Arc<SecurityMonitor>,
    ) -> Self {
        Self {
            registry,
            rate_limiter,
            monitor,
        }
    }

    /// Runs one sweep.
    pub async fn run_cleanup(&self) -> Result<CleanupReport, AppError> {
        let report = CleanupReport {
            sessions: self.registry.purge_expired().await?,
            rate_limit_keys: self.rate_limiter.prune().await?,
            login_attempts: self.monitor.prune().await,
        };

        if report != CleanupReport::default() {
            info!(
                sessions = report.sessions,
                rate_limit_keys = report.rate_limit_keys,
                login_attempts = report.login_attempts,
                "Cleanup sweep completed"
            );
        }
        Ok(report)
    }

    /// Runs a sweep every `period` until `shutdown` flips to `true` or its
    /// sender is dropped.
    pub async fn run(&self, period: Duration, mut shutdown: watch::Receiver<bool>) {
        info!(period_secs = period.as_secs(), "Session cleanup started");

        let mut ticker = time::interval(period);
        ticker.set_missed_tick_behavior(MissedTickBehavior::Delay);
        // The first tick completes immediately.
        ticker.tick().await;

        loop {
            tokio::select! {
                changed = shutdown.changed() => {
                    if changed.is_err() || *shutdown.borrow() {
                        break;
                    }
                }
                _ = ticker.tick() => {
                    if let Err(e) = self.run_cleanup().await {
                        error!(error = %e, "Cleanup sweep failed");
                    }
                }
            }
        }

        info!("Session cleanup stopped");
    }

    /// Spawns [`SessionCleanup::run`] on the runtime.
    pub fn spawn(self, period: Duration, shutdown: watch::Receiver<bool>) -> JoinHandle<()> {
        tokio::spawn(async move { self.run(period, shutdown).await })
    }
}
