//! Sliding-log rate limiter.
//!
//! Every call to [`RateLimiter::is_allowed`] both checks and records the
//! attempt. A key admits at most `max_attempts` attempts in any trailing
//! window of `window` length; the key is admitted again once its oldest
//! counted attempt leaves the window. Denied attempts are never counted, so
//! a client hammering a limited key does not extend its own lockout.

use std::sync::Arc;

use chrono::{DateTime, Duration, Utc};
use tracing::{debug, warn};

use adminguard_core::config::rate_limit::RateLimitConfig;
use adminguard_core::result::AppResult;
use adminguard_core::traits::CounterStore;
use adminguard_core::types::Clock;

/// An attempt the limiter admitted and recorded.
#[derive(Debug, Clone, PartialEq, Eq)]
pub struct Admission {
    key: String,
    recorded_at: DateTime<Utc>,
}

impl Admission {
    /// The limited key.
    pub fn key(&self) -> &str {
        &self.key
    }

    /// When the attempt was recorded.
    pub fn recorded_at(&self) -> DateTime<Utc> {
        self.recorded_at
    }
}

/// Per-key attempt limiter over a pluggable [`CounterStore`].
#[derive(Debug, Clone)]
pub struct RateLimiter {
    store: Arc<dyn CounterStore>,
    clock: Arc<dyn Clock>,
    window: Duration,
    max_attempts: u32,
    skip_successful: bool,
}

impl RateLimiter {
    /// Creates a limiter from configuration.
    pub fn new(
        config: &RateLimitConfig,
        store: Arc<dyn CounterStore>,
        clock: Arc<dyn Clock>,
    ) -> Self {
        Self {
            store,
            clock,
            window: Duration::seconds(config.window_seconds as i64),
            max_attempts: config.max_attempts,
            skip_successful: config.skip_successful,
        }
    }

    /// Builds the composite login key.
    pub fn login_key(email: &str, ip: &str) -> String {
        format!("login:{}|{}", email.trim().to_lowercase(), ip)
    }

    /// Checks and records one attempt for `key`. Never blocks.
    pub async fn is_allowed(&self, key: &str) -> AppResult<bool> {
        Ok(self.admit(key).await?.is_some())
    }

    /// Like [`RateLimiter::is_allowed`], returning the recorded attempt so a
    /// later success can withdraw exactly that one.
    pub async fn admit(&self, key: &str) -> AppResult<Option<Admission>> {
        let now = self.clock.now();
        let decision = self
            .store
            .try_record(key, now, now - self.window, self.max_attempts)
            .await?;

        if decision.allowed {
            debug!(key = %key, count = decision.count, "Rate limit attempt recorded");
            Ok(Some(Admission {
                key: key.to_string(),
                recorded_at: now,
            }))
        } else {
            warn!(key = %key, count = decision.count, "Rate limit exceeded");
            Ok(None)
        }
    }

    /// Signals that an admitted attempt succeeded. When successful requests
    /// are skipped, it no longer counts.
    pub async fn record_success(&self, admission: &Admission) -> AppResult<()> {
        if self.skip_successful {
            self.store.forget(&admission.key, admission.recorded_at).await?;
        }
        Ok(())
    }

    /// Clears every counted attempt for `key`.
    pub async fn reset(&self, key: &str) -> AppResult<()> {
        self.store.reset(key).await
    }

    /// Drops keys whose windows have fully elapsed.
    pub async fn prune(&self) -> AppResult<usize> {
        let now = self.clock.now();
        self.store.prune(now - self.window).await
    }
}

#[cfg(test)]
mod tests {
    use super::*;
    use crate::rate_limit::MemoryCounterStore;
    use adminguard_core::types::ManualClock;

    fn limiter(clock: &ManualClock, max: u32, skip_successful: bool) -> RateLimiter {
        let config = RateLimitConfig {
            window_seconds: 60,
            max_attempts: max,
            skip_successful,
        };
        RateLimiter::new(&config, Arc::new(MemoryCounterStore::new()), Arc::new(clock.clone()))
    }

    #[tokio::test]
    async fn test_unseen_key_is_allowed() {
        let clock = ManualClock::starting_now();
        assert!(limiter(&clock, 1, false).is_allowed("fresh").await.unwrap());
    }

    #[tokio::test]
    async fn test_window_is_sliding() {
        let clock = ManualClock::starting_now();
        let limiter = limiter(&clock, 2, false);

        assert!(limiter.is_allowed("k").await.unwrap());
        clock.advance(Duration::seconds(30));
        assert!(limiter.is_allowed("k").await.unwrap());
        assert!(!limiter.is_allowed("k").await.unwrap());

        // First attempt leaves the window; one slot opens.
        clock.advance(Duration::seconds(31));
        assert!(limiter.is_allowed("k").await.unwrap());
        assert!(!limiter.is_allowed("k").await.unwrap());
    }

    #[tokio::test]
    async fn test_successful_attempts_are_skipped() {
        let clock = ManualClock::starting_now();
        let limiter = limiter(&clock, 1, true);

        let admitted = limiter.admit("k").await.unwrap().expect("admitted");
        limiter.record_success(&admitted).await.unwrap();
        assert!(limiter.is_allowed("k").await.unwrap());
    }

    #[tokio::test]
    async fn test_success_withdraws_its_own_attempt_not_a_later_one() {
        let clock = ManualClock::starting_now();
        let limiter = limiter(&clock, 2, true);

        let succeeded = limiter.admit("k").await.unwrap().expect("admitted");
        clock.advance(Duration::seconds(10));
        assert!(limiter.is_allowed("k").await.unwrap());
        limiter.record_success(&succeeded).await.unwrap();

        // Only the failed attempt at +10s remains, and it is still in the
        // window at +65s.
        clock.advance(Duration::seconds(55));
        assert!(limiter.is_allowed("k").await.unwrap());
        assert!(!limiter.is_allowed("k").await.unwrap());
    }

    #[tokio::test]
    async fn test_success_is_counted_when_not_skipped() {
        let clock = ManualClock::starting_now();
        let limiter = limiter(&clock, 1, false);

        let admitted = limiter.admit("k").await.unwrap().expect("admitted");
        limiter.record_success(&admitted).await.unwrap();
        assert!(!limiter.is_allowed("k").await.unwrap());
    }

    #[tokio::test]
    async fn test_keys_are_independent_and_resettable() {
        let clock = ManualClock::starting_now();
        let limiter = limiter(&clock, 1, false);

        assert!(limiter.is_allowed("a").await.unwrap());
        assert!(limiter.is_allowed("b").await.unwrap());
        assert!(!limiter.is_allowed("a").await.unwrap());
        limiter.reset("a").await.unwrap();
        assert!(limiter.is_allowed("a").await.unwrap());
    }

    #[test]
    fn test_login_key_normalises_email() {
        assert_eq!(
            RateLimiter::login_key(" A@X.com ", "10.0.0.1"),
            "login:a@x.com|10.0.0.1"
        );
    }
}
