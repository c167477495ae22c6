//! In-process [`CounterStore`] backed by a sharded concurrent map.

use std::collections::VecDeque;

use async_trait::async_trait;
use chrono::{DateTime, Utc};
use dashmap::DashMap;

use adminguard_core::result::AppResult;
use adminguard_core::traits::{CounterStore, WindowDecision};

/// Sliding-log counter store. Each key holds the timestamps of its admitted
/// attempts, oldest first; the map shard lock makes every operation on one
/// key atomic while leaving other keys independent.
#[derive(Debug, Default)]
pub struct MemoryCounterStore {
    attempts: DashMap<String, VecDeque<DateTime<Utc>>>,
}

impl MemoryCounterStore {
    /// Creates an empty store.
    pub fn new() -> Self {
        Self::default()
    }

    /// Number of tracked keys.
    pub fn key_count(&self) -> usize {
        self.attempts.len()
    }
}

#[async_trait]
impl CounterStore for MemoryCounterStore {
    async fn try_record(
        &self,
        key: &str,
        now: DateTime<Utc>,
        window_start: DateTime<Utc>,
        max: u32,
    ) -> AppResult<WindowDecision> {
        let mut log = self.attempts.entry(key.to_string()).or_default();
        while log.front().is_some_and(|t| *t <= window_start) {
            log.pop_front();
        }

        let allowed = (log.len() as u32) < max;
        if allowed {
            log.push_back(now);
        }

        Ok(WindowDecision {
            allowed,
            count: log.len() as u32,
            oldest: log.front().copied(),
        })
    }

    async fn forget(&self, key: &str, at: DateTime<Utc>) -> AppResult<()> {
        if let Some(mut log) = self.attempts.get_mut(key) {
            if let Some(pos) = log.iter().rposition(|t| *t == at) {
                log.remove(pos);
            }
        }
        Ok(())
    }

    async fn reset(&self, key: &str) -> AppResult<()> {
        self.attempts.remove(key);
        Ok(())
    }

    async fn prune(&self, window_start: DateTime<Utc>) -> AppResult<usize> {
        let mut pruned = 0;
        self.attempts.retain(|_, log| {
            let live = log.back().is_some_and(|latest| *latest > window_start);
            if !live {
                pruned += 1;
            }
            live
        });
        Ok(pruned)
    }
}
