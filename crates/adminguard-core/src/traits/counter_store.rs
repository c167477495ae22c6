//! Sliding-window attempt counter storage.

use async_trait::async_trait;
use chrono::{DateTime, Utc};

use crate::result::AppResult;

/// Result of evaluating one attempt against a key's window.
#[derive(Debug, Clone, Copy, PartialEq, Eq)]
pub struct WindowDecision {
    /// Whether the attempt was admitted (and recorded).
    pub allowed: bool,
    /// Attempts counted in the window after this evaluation.
    pub count: u32,
    /// Timestamp of the oldest attempt still inside the window.
    pub oldest: Option<DateTime<Utc>>,
}

/// Per-key attempt log used by the rate limiter.
///
/// `try_record` must be atomic per key: the count-and-append of one caller
/// can never interleave with another caller's on the same key. A single-node
/// implementation uses a locked map; a multi-node deployment backs this with
/// an atomic key-value store.
#[async_trait]
pub trait CounterStore: Send + Sync + std::fmt::Debug + 'static {
    /// Drops attempts for `key` older than `window_start`, then records `now`
    /// if fewer than `max` attempts remain. Denied attempts are not recorded.
    async fn try_record(
        &self,
        key: &str,
        now: DateTime<Utc>,
        window_start: DateTime<Utc>,
        max: u32,
    ) -> AppResult<WindowDecision>;

    /// Removes the attempt recorded at `at` for `key`, if still present.
    async fn forget(&self, key: &str, at: DateTime<Utc>) -> AppResult<()>;

    /// Clears all attempts for `key`.
    async fn reset(&self, key: &str) -> AppResult<()>;

    /// Removes every key whose attempts all predate `window_start`.
    /// Returns the number of keys removed.
    async fn prune(&self, window_start: DateTime<Utc>) -> AppResult<usize>;
}
