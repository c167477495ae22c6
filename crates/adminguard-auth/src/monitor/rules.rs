//! Threshold rules evaluated after every failed login.

use std::collections::HashSet;

use chrono::{DateTime, Duration, Utc};
use serde_json::json;

use adminguard_core::config::monitor::MonitorConfig;
use adminguard_entity::security::{AlertCategory, LoginAttempt};

/// Rule thresholds resolved from configuration.
#[derive(Debug, Clone)]
pub struct RuleThresholds {
    /// Trailing window the rules look at.
    pub window: Duration,
    /// Failures from one IP.
    pub ip_failures: usize,
    /// Failures against one email.
    pub email_failures: usize,
    /// Distinct failing emails from one IP.
    pub distinct_emails: usize,
}

impl From<&MonitorConfig> for RuleThresholds {
    fn from(config: &MonitorConfig) -> Self {
        Self {
            window: Duration::minutes(config.window_minutes as i64),
            ip_failures: config.ip_failure_threshold as usize,
            email_failures: config.email_failure_threshold as usize,
            distinct_emails: config.stuffing_distinct_emails as usize,
        }
    }
}

/// A rule that crossed its threshold.
#[derive(Debug, Clone, PartialEq)]
pub struct RuleHit {
    /// Rule category.
    pub category: AlertCategory,
    /// Targeted email, for account rules.
    pub subject_email: Option<String>,
    /// Source IP, for IP rules.
    pub ip_address: Option<String>,
    /// Summary line.
    pub message: String,
    /// Counts behind the hit.
    pub details: serde_json::Value,
}

impl RuleHit {
    /// Key used to suppress duplicate open alerts.
    pub fn subject(&self) -> &str {
        self.ip_address
            .as_deref()
            .or(self.subject_email.as_deref())
            .unwrap_or_default()
    }
}

/// Evaluates every rule for the failure just recorded from `email` at `ip`.
pub fn evaluate(
    attempts: impl IntoIterator<Item = impl std::borrow::Borrow<LoginAttempt>>,
    email: &str,
    ip: &str,
    now: DateTime<Utc>,
    thresholds: &RuleThresholds,
) -> Vec<RuleHit> {
    let window_start = now - thresholds.window;
    let mut ip_failures = 0usize;
    let mut email_failures = 0usize;
    let mut emails_from_ip: HashSet<String> = HashSet::new();

    for attempt in attempts {
        let attempt = attempt.borrow();
        if attempt.success || attempt.timestamp <= window_start {
            continue;
        }
        if attempt.ip_address == ip {
            ip_failures += 1;
            emails_from_ip.insert(attempt.email.clone());
        }
        if attempt.email == email {
            email_failures += 1;
        }
    }

    let window_minutes = thresholds.window.num_minutes();
    let mut hits = Vec::new();

    if ip_failures >= thresholds.ip_failures {
        hits.push(RuleHit {
            category: AlertCategory::BruteForceIp,
            subject_email: None,
            ip_address: Some(ip.to_string()),
            message: format!(
                "{ip_failures} failed logins from {ip} in the last {window_minutes} minutes"
            ),
            details: json!({ "failures": ip_failures, "windowMinutes": window_minutes }),
        });
    }
    if email_failures >= thresholds.email_failures {
        hits.push(RuleHit {
            category: AlertCategory::AccountAttack,
            subject_email: Some(email.to_string()),
            ip_address: None,
            message: format!(
                "{email_failures} failed logins for {email} in the last {window_minutes} minutes"
            ),
            details: json!({ "failures": email_failures, "windowMinutes": window_minutes }),
        });
    }
    if emails_from_ip.len() >= thresholds.distinct_emails {
        let mut emails: Vec<String> = emails_from_ip.into_iter().collect();
        emails.sort();
        hits.push(RuleHit {
            category: AlertCategory::CredentialStuffing,
            subject_email: None,
            ip_address: Some(ip.to_string()),
            message: format!(
                "{} distinct accounts failed from {ip} in the last {window_minutes} minutes",
                emails.len()
            ),
            details: json!({ "distinctEmails": emails.len(), "emails": emails, "windowMinutes": window_minutes }),
        });
    }

    hits
}

#[cfg(test)]
mod tests {
    use super::*;

    fn thresholds() -> RuleThresholds {
        RuleThresholds {
            window: Duration::minutes(15),
            ip_failures: 3,
            email_failures: 2,
            distinct_emails: 2,
        }
    }

    fn failure(email: &str, ip: &str, at: DateTime<Utc>) -> LoginAttempt {
        LoginAttempt {
            email: email.into(),
            ip_address: ip.into(),
            user_agent: String::new(),
            success: false,
            timestamp: at,
            metadata: serde_json::Value::Null,
        }
    }

    #[test]
    fn test_below_thresholds_is_quiet() {
        let now = Utc::now();
        let attempts = vec![failure("a@x.com", "1.1.1.1", now)];
        assert!(evaluate(&attempts, "a@x.com", "1.1.1.1", now, &thresholds()).is_empty());
    }

    #[test]
    fn test_account_attack_across_ips() {
        let now = Utc::now();
        let attempts = vec![
            failure("a@x.com", "1.1.1.1", now),
            failure("a@x.com", "2.2.2.2", now),
        ];
        let hits = evaluate(&attempts, "a@x.com", "2.2.2.2", now, &thresholds());
        assert_eq!(hits.len(), 1);
        assert_eq!(hits[0].category, AlertCategory::AccountAttack);
        assert_eq!(hits[0].subject(), "a@x.com");
    }

    #[test]
    fn test_stuffing_and_brute_force_from_one_ip() {
        let now = Utc::now();
        let attempts = vec![
            failure("a@x.com", "1.1.1.1", now),
            failure("b@x.com", "1.1.1.1", now),
            failure("c@x.com", "1.1.1.1", now),
        ];
        let categories: Vec<_> = evaluate(&attempts, "c@x.com", "1.1.1.1", now, &thresholds())
            .into_iter()
            .map(|h| h.category)
            .collect();
        assert!(categories.contains(&AlertCategory::BruteForceIp));
        assert!(categories.contains(&AlertCategory::CredentialStuffing));
        assert!(!categories.contains(&AlertCategory::AccountAttack));
    }

    #[test]
    fn test_failures_outside_window_are_ignored() {
        let now = Utc::now();
        let old = now - Duration::minutes(20);
        let attempts = vec![
            failure("a@x.com", "1.1.1.1", old),
            failure("a@x.com", "1.1.1.1", now),
        ];
        assert!(evaluate(&attempts, "a@x.com", "1.1.1.1", now, &thresholds()).is_empty());
    }
}
