//! In-memory audit log.

use std::collections::{HashSet, VecDeque};
use std::sync::Arc;
use std::time::Duration;

use tokio::sync::RwLock;
use tracing::{error, warn};

use adminguard_core::config::audit::AuditConfig;
use adminguard_core::error::AppError;
use adminguard_core::types::{AuditEntryId, Clock};
use adminguard_entity::audit::{AuditFilter, AuditLogEntry, AuditStats, NewAuditEntry};

use super::export::{self, ExportFormat};
use super::sink::AuditSink;

/// Upper bound on one sink write.
const SINK_TIMEOUT: Duration = Duration::from_secs(2);

/// Append-only audit log.
///
/// The in-memory log is authoritative for queries; every appended entry is
/// also offered to the configured [`AuditSink`] outside the log lock.
#[derive(Debug)]
pub struct AuditLogger {
    entries: RwLock<VecDeque<AuditLogEntry>>,
    sink: Arc<dyn AuditSink>,
    clock: Arc<dyn Clock>,
    max_entries: usize,
}

impl AuditLogger {
    /// Creates an empty logger.
    pub fn new(config: &AuditConfig, sink: Arc<dyn AuditSink>, clock: Arc<dyn Clock>) -> Self {
        Self {
            entries: RwLock::new(VecDeque::new()),
            sink,
            clock,
            max_entries: config.max_entries,
        }
    }

    /// Appends an entry, assigning its id and (if absent) its timestamp.
    pub async fn log(&self, entry: NewAuditEntry) -> AuditLogEntry {
        let entry = entry.into_entry(AuditEntryId::new(), self.clock.now());

        {
            let mut entries = self.entries.write().await;
            entries.push_back(entry.clone());
            if self.max_entries > 0 {
                while entries.len() > self.max_entries {
                    entries.pop_front();
                }
            }
        }

        match tokio::time::timeout(SINK_TIMEOUT, self.sink.persist(&entry)).await {
            Ok(Ok(())) => {}
            Ok(Err(e)) => error!(
                sink = self.sink.name(),
                audit_id = %entry.id,
                error = %e,
                "Audit sink rejected entry"
            ),
            Err(_) => warn!(
                sink = self.sink.name(),
                audit_id = %entry.id,
                "Audit sink timed out"
            ),
        }

        entry
    }

    /// Entries matching every predicate of `filter`, newest first, truncated
    /// to `filter.limit`.
    pub async fn get_logs(&self, filter: &AuditFilter) -> Vec<AuditLogEntry> {
        let entries = self.entries.read().await;
        let mut matched: Vec<AuditLogEntry> = entries
            .iter()
            .rev()
            .filter(|e| filter.matches(e))
            .cloned()
            .collect();
        drop(entries);

        sort_newest_first(&mut matched);
        if let Some(limit) = filter.limit {
            matched.truncate(limit);
        }
        matched
    }

    /// All entries, newest first.
    pub async fn all(&self) -> Vec<AuditLogEntry> {
        self.get_logs(&AuditFilter::default()).await
    }

    /// Exact aggregate counts over the current log.
    pub async fn get_stats(&self) -> AuditStats {
        let entries = self.entries.read().await;
        let successful = entries.iter().filter(|e| e.success).count();
        let admins: HashSet<_> = entries.iter().filter_map(|e| e.admin_id).collect();

        AuditStats {
            total_logs: entries.len(),
            successful_actions: successful,
            failed_actions: entries.len() - successful,
            unique_admins: admins.len(),
        }
    }

    /// Case-insensitive substring search over action, resource, admin email,
    /// error and the serialized details. Newest first.
    pub async fn search_logs(&self, term: &str) -> Vec<AuditLogEntry> {
        let needle = term.to_lowercase();
        let entries = self.entries.read().await;
        let mut matched: Vec<AuditLogEntry> = entries
            .iter()
            .rev()
            .filter(|e| entry_contains(e, &needle))
            .cloned()
            .collect();
        drop(entries);

        sort_newest_first(&mut matched);
        matched
    }

    /// Encodes the whole log, newest first.
    pub async fn export_logs(&self, format: ExportFormat) -> Result<String, AppError> {
        let entries = self.all().await;
        export::encode(&entries, format)
    }

    /// Number of retained entries.
    pub async fn len(&self) -> usize {
        self.entries.read().await.len()
    }

    /// Whether the log is empty.
    pub async fn is_empty(&self) -> bool {
        self.entries.read().await.is_empty()
    }
}

/// Stable sort so equal timestamps keep their newest-appended-first order.
fn sort_newest_first(entries: &mut [AuditLogEntry]) {
    entries.sort_by(|a, b| b.timestamp.cmp(&a.timestamp));
}

fn entry_contains(entry: &AuditLogEntry, needle: &str) -> bool {
    let hit = |s: &str| s.to_lowercase().contains(needle);
    hit(&entry.action)
        || hit(&entry.resource)
        || hit(&entry.admin_email)
        || entry.error.as_deref().is_some_and(hit)
        || serde_json::to_string(&entry.details).is_ok_and(|d| hit(&d))
}

#[cfg(test)]
mod tests {
    use super::*;
    use crate::audit::NoopAuditSink;
    use adminguard_core::types::{AdminId, ManualClock};
    use adminguard_entity::audit::AuditAction;
    use async_trait::async_trait;
    use chrono::Duration as ChronoDuration;

    fn logger(clock: &ManualClock, max_entries: usize) -> AuditLogger {
        AuditLogger::new(
            &AuditConfig {
                max_entries,
                ..AuditConfig::default()
            },
            Arc::new(NoopAuditSink),
            Arc::new(clock.clone()),
        )
    }

    #[tokio::test]
    async fn test_logs_are_newest_first_even_when_appended_out_of_order() {
        let clock = ManualClock::starting_now();
        let logger = logger(&clock, 0);
        let now = clock.now();

        logger
            .log(NewAuditEntry::new(AuditAction::Logout).at(now - ChronoDuration::minutes(5)))
            .await;
        logger.log(NewAuditEntry::new(AuditAction::LoginSuccess)).await;
        logger
            .log(NewAuditEntry::new(AuditAction::TokenRefresh).at(now - ChronoDuration::minutes(1)))
            .await;

        let actions: Vec<String> = logger.all().await.into_iter().map(|e| e.action).collect();
        assert_eq!(actions, ["LOGIN_SUCCESS", "TOKEN_REFRESH", "LOGOUT"]);
    }

    #[tokio::test]
    async fn test_stats_are_exact() {
        let clock = ManualClock::starting_now();
        let logger = logger(&clock, 0);
        let admin = AdminId::new();

        logger
            .log(NewAuditEntry::new(AuditAction::LoginSuccess).admin(Some(admin), "a@x.com"))
            .await;
        logger
            .log(NewAuditEntry::new(AuditAction::Logout).admin(Some(admin), "a@x.com"))
            .await;
        logger
            .log(NewAuditEntry::new(AuditAction::FailedLogin).admin(None, "b@x.com").failed("x"))
            .await;

        let stats = logger.get_stats().await;
        assert_eq!(stats.total_logs, 3);
        assert_eq!(stats.successful_actions, 2);
        assert_eq!(stats.failed_actions, 1);
        assert_eq!(stats.unique_admins, 1);
    }

    #[tokio::test]
    async fn test_search_is_case_insensitive_and_covers_details() {
        let clock = ManualClock::starting_now();
        let logger = logger(&clock, 0);
        logger
            .log(NewAuditEntry::new(AuditAction::BlockIp).detail("reason", "Scanner Traffic"))
            .await;
        logger.log(NewAuditEntry::new(AuditAction::Logout).admin(None, "Ops@X.com")).await;

        assert_eq!(logger.search_logs("scanner").await.len(), 1);
        assert_eq!(logger.search_logs("ops@x").await.len(), 1);
        assert_eq!(logger.search_logs("SESSION").await.len(), 1);
        assert!(logger.search_logs("nothing-here").await.is_empty());
    }

    #[tokio::test]
    async fn test_retention_evicts_oldest() {
        let clock = ManualClock::starting_now();
        let logger = logger(&clock, 2);
        for action in [AuditAction::LoginSuccess, AuditAction::Logout, AuditAction::TokenRefresh] {
            logger.log(NewAuditEntry::new(action)).await;
            clock.advance(ChronoDuration::seconds(1));
        }
        let actions: Vec<String> = logger.all().await.into_iter().map(|e| e.action).collect();
        assert_eq!(actions, ["TOKEN_REFRESH", "LOGOUT"]);
    }

    #[derive(Debug)]
    struct FailingSink;

    #[async_trait]
    impl AuditSink for FailingSink {
        fn name(&self) -> &'static str {
            "failing"
        }

        async fn persist(&self, _entry: &AuditLogEntry) -> adminguard_core::AppResult<()> {
            Err(AppError::external("database unavailable"))
        }
    }

    #[tokio::test]
    async fn test_sink_failure_keeps_entry() {
        let clock = ManualClock::starting_now();
        let logger = AuditLogger::new(
            &AuditConfig::default(),
            Arc::new(FailingSink),
            Arc::new(clock),
        );
        logger.log(NewAuditEntry::new(AuditAction::LoginSuccess)).await;
        assert_eq!(logger.len().await, 1);
    }
}
