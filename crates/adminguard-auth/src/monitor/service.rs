//! The security monitor.

use std::collections::{HashMap, HashSet, VecDeque};
use std::sync::Arc;

use chrono::{DateTime, Duration, Utc};
use dashmap::DashMap;
use tokio::sync::Mutex;
use tracing::{info, warn};

use adminguard_core::config::monitor::MonitorConfig;
use adminguard_core::error::AppError;
use adminguard_core::types::{AlertId, Clock};
use adminguard_entity::audit::{AuditAction, NewAuditEntry};
use adminguard_entity::security::{
    AlertCategory, AlertSeverity, AlertStatus, BlockedIp, IpFailureCount, LoginAttempt,
    SecurityAlert, SecurityMetrics, SeverityCounts, TimeRange,
};

use crate::audit::AuditLogger;
use crate::context::Actor;

use super::rules::{self, RuleThresholds};

/// Number of IPs listed in `top_failing_ips`.
const TOP_FAILING_IPS: usize = 10;

/// Retention of login attempts for metrics: the longest bounded range.
fn attempt_retention() -> Duration {
    Duration::weeks(1)
}

#[derive(Debug, Default)]
struct MonitorState {
    attempts: VecDeque<LoginAttempt>,
    alerts: Vec<SecurityAlert>,
}

/// Aggregates login outcomes across accounts and IPs, raises alerts when a
/// rule fires, and owns the IP block list.
///
/// Blocks have no TTL: once present, an IP stays blocked until an admin
/// unblocks it, even if the attempt counters are reset.
#[derive(Debug)]
pub struct SecurityMonitor {
    thresholds: RuleThresholds,
    auto_block: bool,
    max_tracked_attempts: usize,
    state: Mutex<MonitorState>,
    blocked: DashMap<String, BlockedIp>,
    audit: Arc<AuditLogger>,
    clock: Arc<dyn Clock>,
}

impl SecurityMonitor {
    /// Creates a monitor with no history and an empty block list.
    pub fn new(config: &MonitorConfig, audit: Arc<AuditLogger>, clock: Arc<dyn Clock>) -> Self {
        Self {
            thresholds: RuleThresholds::from(config),
            auto_block: config.auto_block,
            max_tracked_attempts: config.max_tracked_attempts.max(1),
            state: Mutex::new(MonitorState::default()),
            blocked: DashMap::new(),
            audit,
            clock,
        }
    }

    /// Records one login outcome and evaluates the rules for failures.
    ///
    /// Returns the alerts newly raised by this observation.
    pub async fn record_login_attempt(
        &self,
        email: &str,
        ip: &str,
        user_agent: &str,
        success: bool,
        metadata: serde_json::Value,
    ) -> Vec<SecurityAlert> {
        let now = self.clock.now();
        let email = email.trim().to_lowercase();

        let raised = {
            let mut state = self.state.lock().await;
            state.attempts.push_back(LoginAttempt {
                email: email.clone(),
                ip_address: ip.to_string(),
                user_agent: user_agent.to_string(),
                success,
                timestamp: now,
                metadata,
            });
            while state.attempts.len() > self.max_tracked_attempts {
                state.attempts.pop_front();
            }

            if success {
                Vec::new()
            } else {
                let hits = rules::evaluate(state.attempts.iter(), &email, ip, now, &self.thresholds);
                let mut raised = Vec::new();
                for hit in hits {
                    let duplicate = state.alerts.iter().any(|a| {
                        a.status.is_open() && a.category == hit.category && a.subject() == hit.subject()
                    });
                    if duplicate {
                        continue;
                    }
                    let alert = SecurityAlert {
                        id: AlertId::new(),
                        category: hit.category,
                        severity: hit.category.severity(),
                        subject_email: hit.subject_email,
                        ip_address: hit.ip_address,
                        message: hit.message,
                        details: hit.details,
                        timestamp: now,
                        status: AlertStatus::Active,
                        acknowledged_by: None,
                        acknowledged_at: None,
                        resolved_by: None,
                        resolved_at: None,
                    };
                    state.alerts.push(alert.clone());
                    raised.push(alert);
                }
                raised
            }
        };

        for alert in &raised {
            warn!(
                alert_id = %alert.id,
                category = %alert.category,
                severity = %alert.severity,
                subject = %alert.subject(),
                "Security alert raised"
            );
            let blocks = matches!(
                alert.category,
                AlertCategory::BruteForceIp | AlertCategory::CredentialStuffing
            );
            if self.auto_block && blocks {
                if let Some(ip) = &alert.ip_address {
                    self.insert_block(ip, &alert.message, None, now);
                }
            }
        }

        raised
    }

    /// Whether `ip` is on the block list.
    pub fn is_ip_blocked(&self, ip: &str) -> bool {
        self.blocked.contains_key(ip)
    }

    /// Blocks `ip` on behalf of `actor`. Re-blocking replaces the reason.
    pub async fn block_ip(&self, ip: &str, reason: &str, actor: &Actor) -> Result<BlockedIp, AppError> {
        let ip = ip.trim();
        if ip.is_empty() {
            return Err(AppError::validation("IP address must not be empty"));
        }

        let now = self.clock.now();
        let record = self.insert_block(ip, reason, Some(actor), now);

        self.audit
            .log(
                NewAuditEntry::new(AuditAction::BlockIp)
                    .admin(Some(actor.admin_id), actor.email.clone())
                    .client(actor.client.ip_address.clone(), actor.client.user_agent.clone())
                    .resource_id(ip)
                    .detail("reason", reason),
            )
            .await;

        Ok(record)
    }

    /// Removes `ip` from the block list. Returns whether it was blocked.
    pub async fn unblock_ip(&self, ip: &str, actor: &Actor) -> bool {
        let ip = ip.trim();
        let removed = self.blocked.remove(ip).is_some();
        info!(ip = %ip, admin_id = %actor.admin_id, removed, "IP unblocked");

        self.audit
            .log(
                NewAuditEntry::new(AuditAction::UnblockIp)
                    .admin(Some(actor.admin_id), actor.email.clone())
                    .client(actor.client.ip_address.clone(), actor.client.user_agent.clone())
                    .resource_id(ip)
                    .detail("wasBlocked", removed),
            )
            .await;

        removed
    }

    /// Current block list, most recent first.
    pub fn list_blocked_ips(&self) -> Vec<BlockedIp> {
        let mut list: Vec<BlockedIp> = self.blocked.iter().map(|r| r.value().clone()).collect();
        list.sort_by(|a, b| b.blocked_at.cmp(&a.blocked_at));
        list
    }

    /// Alerts in the active state, newest first.
    pub async fn get_active_alerts(&self) -> Vec<SecurityAlert> {
        self.get_alerts(Some(AlertStatus::Active)).await
    }

    /// Alerts with the given status (all when `None`), newest first.
    pub async fn get_alerts(&self, status: Option<AlertStatus>) -> Vec<SecurityAlert> {
        let state = self.state.lock().await;
        let mut alerts: Vec<SecurityAlert> = state
            .alerts
            .iter()
            .filter(|a| status.is_none_or(|s| a.status == s))
            .cloned()
            .collect();
        drop(state);
        alerts.sort_by(|a, b| b.timestamp.cmp(&a.timestamp));
        alerts
    }

    /// Moves an active alert to acknowledged.
    pub async fn acknowledge_alert(&self, id: AlertId, actor: &Actor) -> Result<SecurityAlert, AppError> {
        self.transition_alert(id, actor, AuditAction::AcknowledgeAlert, |alert, now| {
            if alert.status != AlertStatus::Active {
                return Err(AppError::validation(format!(
                    "Alert is already {}",
                    alert.status
                )));
            }
            alert.status = AlertStatus::Acknowledged;
            alert.acknowledged_by = Some(actor.admin_id);
            alert.acknowledged_at = Some(now);
            Ok(())
        })
        .await
    }

    /// Moves an active or acknowledged alert to resolved.
    pub async fn resolve_alert(&self, id: AlertId, actor: &Actor) -> Result<SecurityAlert, AppError> {
        self.transition_alert(id, actor, AuditAction::ResolveAlert, |alert, now| {
            if alert.status == AlertStatus::Resolved {
                return Err(AppError::validation("Alert is already resolved"));
            }
            alert.status = AlertStatus::Resolved;
            alert.resolved_by = Some(actor.admin_id);
            alert.resolved_at = Some(now);
            Ok(())
        })
        .await
    }

    async fn transition_alert<F>(
        &self,
        id: AlertId,
        actor: &Actor,
        action: AuditAction,
        apply: F,
    ) -> Result<SecurityAlert, AppError>
    where
        F: FnOnce(&mut SecurityAlert, DateTime<Utc>) -> Result<(), AppError>,
    {
        let now = self.clock.now();
        let result = {
            let mut state = self.state.lock().await;
            match state.alerts.iter_mut().find(|a| a.id == id) {
                Some(alert) => apply(&mut *alert, now).map(|()| alert.clone()),
                None => Err(AppError::not_found(format!("Alert {id} not found"))),
            }
        };

        let mut entry = NewAuditEntry::new(action)
            .admin(Some(actor.admin_id), actor.email.clone())
            .client(actor.client.ip_address.clone(), actor.client.user_agent.clone())
            .resource_id(id.to_string());
        if let Err(e) = &result {
            entry = entry.failed(e.message.clone());
        }
        self.audit.log(entry).await;

        result
    }

    /// Aggregates attempts and alerts over `range`.
    pub async fn get_security_metrics(&self, range: TimeRange) -> SecurityMetrics {
        let now = self.clock.now();
        let since = range.since(now);
        let in_range = |t: DateTime<Utc>| since.is_none_or(|s| t >= s);

        let state = self.state.lock().await;

        let mut total = 0usize;
        let mut failed = 0usize;
        let mut ips: HashSet<&str> = HashSet::new();
        let mut emails: HashSet<&str> = HashSet::new();
        let mut failures_by_ip: HashMap<&str, usize> = HashMap::new();

        for attempt in state.attempts.iter().filter(|a| in_range(a.timestamp)) {
            total += 1;
            ips.insert(attempt.ip_address.as_str());
            emails.insert(attempt.email.as_str());
            if !attempt.success {
                failed += 1;
                *failures_by_ip.entry(attempt.ip_address.as_str()).or_default() += 1;
            }
        }

        let mut top_failing_ips: Vec<IpFailureCount> = failures_by_ip
            .into_iter()
            .map(|(ip, failures)| IpFailureCount {
                ip_address: ip.to_string(),
                failures,
            })
            .collect();
        top_failing_ips.sort_by(|a, b| {
            b.failures
                .cmp(&a.failures)
                .then_with(|| a.ip_address.cmp(&b.ip_address))
        });
        top_failing_ips.truncate(TOP_FAILING_IPS);

        let mut alerts_by_severity = SeverityCounts::default();
        for alert in state.alerts.iter().filter(|a| in_range(a.timestamp)) {
            match alert.severity {
                AlertSeverity::Low => alerts_by_severity.low += 1,
                AlertSeverity::Medium => alerts_by_severity.medium += 1,
                AlertSeverity::High => alerts_by_severity.high += 1,
                AlertSeverity::Critical => alerts_by_severity.critical += 1,
            }
        }
        let active_alerts = state
            .alerts
            .iter()
            .filter(|a| a.status == AlertStatus::Active)
            .count();

        SecurityMetrics {
            time_range: range,
            generated_at: now,
            total_attempts: total,
            successful_attempts: total - failed,
            failed_attempts: failed,
            unique_ips: ips.len(),
            unique_emails: emails.len(),
            blocked_ips: self.blocked.len(),
            active_alerts,
            alerts_by_severity,
            top_failing_ips,
        }
    }

    /// Forgets every recorded attempt. Rules start from zero (fail-open);
    /// existing blocks and alerts are kept.
    pub async fn reset_counters(&self) {
        self.state.lock().await.attempts.clear();
        info!("Security monitor counters reset");
    }

    /// Drops attempts older than the longest metrics range.
    pub async fn prune(&self) -> usize {
        let cutoff = self.clock.now() - attempt_retention();
        let mut state = self.state.lock().await;
        let before = state.attempts.len();
        while state.attempts.front().is_some_and(|a| a.timestamp < cutoff) {
            state.attempts.pop_front();
        }
        before - state.attempts.len()
    }

    fn insert_block(
        &self,
        ip: &str,
        reason: &str,
        actor: Option<&Actor>,
        now: DateTime<Utc>,
    ) -> BlockedIp {
        let record = BlockedIp {
            ip_address: ip.to_string(),
            reason: reason.to_string(),
            blocked_by: actor.map(|a| a.admin_id),
            blocked_by_email: actor.map(|a| a.email.clone()),
            blocked_at: now,
            automatic: actor.is_none(),
        };
        self.blocked.insert(ip.to_string(), record.clone());
        warn!(ip = %ip, reason = %reason, automatic = record.automatic, "IP blocked");
        record
    }
}

#[cfg(test)]
mod tests {
    use super::*;
    use crate::audit::NoopAuditSink;
    use crate::context::ClientInfo;
    use adminguard_core::config::audit::AuditConfig;
    use adminguard_core::types::{AdminId, ManualClock};
    use adminguard_entity::audit::AuditFilter;
    use serde_json::Value;

    fn setup(clock: &ManualClock) -> (SecurityMonitor, Arc<AuditLogger>) {
        let audit = Arc::new(AuditLogger::new(
            &AuditConfig::default(),
            Arc::new(NoopAuditSink),
            Arc::new(clock.clone()),
        ));
        let monitor = SecurityMonitor::new(&MonitorConfig::default(), audit.clone(), Arc::new(clock.clone()));
        (monitor, audit)
    }

    fn actor() -> Actor {
        Actor::new(AdminId::new(), "ops@x.com", ClientInfo::new("10.0.0.9", "console"))
    }

    #[tokio::test]
    async fn test_brute_force_blocks_ip_once() {
        let clock = ManualClock::starting_now();
        let (monitor, audit) = setup(&clock);

        for _ in 0..9 {
            monitor.record_login_attempt("a@x.com", "6.6.6.6", "bot", false, Value::Null).await;
        }
        assert!(!monitor.is_ip_blocked("6.6.6.6"));
        monitor.record_login_attempt("a@x.com", "6.6.6.6", "bot", false, Value::Null).await;
        assert!(monitor.is_ip_blocked("6.6.6.6"));
        monitor.record_login_attempt("a@x.com", "6.6.6.6", "bot", false, Value::Null).await;

        let brute: Vec<_> = monitor
            .get_active_alerts()
            .await
            .into_iter()
            .filter(|a| a.category == AlertCategory::BruteForceIp)
            .collect();
        assert_eq!(brute.len(), 1);
        assert_eq!(brute[0].severity, AlertSeverity::High);
        // Rule-driven blocks are not audited.
        assert!(audit.is_empty().await);
    }

    #[tokio::test]
    async fn test_block_survives_counter_reset_until_unblocked() {
        let clock = ManualClock::starting_now();
        let (monitor, audit) = setup(&clock);
        let actor = actor();

        monitor.block_ip("7.7.7.7", "manual", &actor).await.unwrap();
        monitor.reset_counters().await;
        assert!(monitor.is_ip_blocked("7.7.7.7"));

        clock.advance(Duration::days(30));
        assert!(monitor.is_ip_blocked("7.7.7.7"));

        assert!(monitor.unblock_ip("7.7.7.7", &actor).await);
        assert!(!monitor.is_ip_blocked("7.7.7.7"));
        assert!(!monitor.unblock_ip("7.7.7.7", &actor).await);

        let unblocks = audit
            .get_logs(&AuditFilter {
                action: Some("UNBLOCK_IP".into()),
                ..Default::default()
            })
            .await;
        assert_eq!(unblocks.len(), 2);
        assert_eq!(unblocks[0].admin_email, "ops@x.com");
    }

    #[tokio::test]
    async fn test_alert_lifecycle() {
        let clock = ManualClock::starting_now();
        let (monitor, _audit) = setup(&clock);
        let actor = actor();

        for ip in ["1.0.0.1", "1.0.0.2", "1.0.0.3", "1.0.0.4", "1.0.0.5"] {
            monitor.record_login_attempt("victim@x.com", ip, "ua", false, Value::Null).await;
        }
        let alerts = monitor.get_active_alerts().await;
        assert_eq!(alerts.len(), 1);
        let id = alerts[0].id;
        assert_eq!(alerts[0].category, AlertCategory::AccountAttack);

        let acked = monitor.acknowledge_alert(id, &actor).await.unwrap();
        assert_eq!(acked.status, AlertStatus::Acknowledged);
        assert!(monitor.acknowledge_alert(id, &actor).await.is_err());

        // An acknowledged alert still suppresses duplicates.
        monitor.record_login_attempt("victim@x.com", "1.0.0.6", "ua", false, Value::Null).await;
        assert_eq!(monitor.get_alerts(None).await.len(), 1);

        let resolved = monitor.resolve_alert(id, &actor).await.unwrap();
        assert_eq!(resolved.status, AlertStatus::Resolved);
        assert!(monitor.get_active_alerts().await.is_empty());

        let missing = monitor.resolve_alert(AlertId::new(), &actor).await.unwrap_err();
        assert_eq!(missing.kind, adminguard_core::ErrorKind::NotFound);
    }

    #[tokio::test]
    async fn test_metrics_respect_time_range() {
        let clock = ManualClock::starting_now();
        let (monitor, _audit) = setup(&clock);

        monitor.record_login_attempt("a@x.com", "1.1.1.1", "ua", false, Value::Null).await;
        clock.advance(Duration::hours(2));
        monitor.record_login_attempt("b@x.com", "2.2.2.2", "ua", true, Value::Null).await;
        monitor.record_login_attempt("b@x.com", "2.2.2.2", "ua", false, Value::Null).await;

        let hour = monitor.get_security_metrics(TimeRange::Hour).await;
        assert_eq!(hour.total_attempts, 2);
        assert_eq!(hour.failed_attempts, 1);
        assert_eq!(hour.unique_ips, 1);

        let day = monitor.get_security_metrics(TimeRange::Day).await;
        assert_eq!(day.total_attempts, 3);
        assert_eq!(day.unique_emails, 2);
        assert_eq!(day.top_failing_ips.len(), 2);
    }
}
