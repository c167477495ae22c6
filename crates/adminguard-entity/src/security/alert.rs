//! Security alert entity and its enumerations.

use std::fmt;
use std::str::FromStr;

use adminguard_core::AppError;
use adminguard_core::types::{AdminId, AlertId};
use chrono::{DateTime, Utc};
use serde::{Deserialize, Serialize};

/// Alert severity, ordered from least to most severe.
#[derive(Debug, Clone, Copy, PartialEq, Eq, Hash, PartialOrd, Ord, Serialize, Deserialize)]
#[serde(rename_all = "lowercase")]
pub enum AlertSeverity {
    /// Informational.
    Low,
    /// Needs attention.
    Medium,
    /// Likely attack.
    High,
    /// Active attack.
    Critical,
}

impl AlertSeverity {
    /// Return the severity as a lowercase string.
    pub fn as_str(&self) -> &'static str {
        match self {
            Self::Low => "low",
            Self::Medium => "medium",
            Self::High => "high",
            Self::Critical => "critical",
        }
    }
}

impl fmt::Display for AlertSeverity {
    fn fmt(&self, f: &mut fmt::Formatter<'_>) -> fmt::Result {
        f.write_str(self.as_str())
    }
}

/// Alert lifecycle state: active, then acknowledged, then resolved.
#[derive(Debug, Clone, Copy, PartialEq, Eq, Hash, Serialize, Deserialize)]
#[serde(rename_all = "lowercase")]
pub enum AlertStatus {
    /// Raised and not yet handled.
    Active,
    /// Seen by an operator.
    Acknowledged,
    /// Closed.
    Resolved,
}

impl AlertStatus {
    /// Return the status as a lowercase string.
    pub fn as_str(&self) -> &'static str {
        match self {
            Self::Active => "active",
            Self::Acknowledged => "acknowledged",
            Self::Resolved => "resolved",
        }
    }

    /// Open alerts suppress duplicates of the same category and subject.
    pub fn is_open(&self) -> bool {
        !matches!(self, Self::Resolved)
    }
}

impl fmt::Display for AlertStatus {
    fn fmt(&self, f: &mut fmt::Formatter<'_>) -> fmt::Result {
        f.write_str(self.as_str())
    }
}

impl FromStr for AlertStatus {
    type Err = AppError;

    fn from_str(s: &str) -> Result<Self, Self::Err> {
        match s.to_lowercase().as_str() {
            "active" => Ok(Self::Active),
            "acknowledged" => Ok(Self::Acknowledged),
            "resolved" => Ok(Self::Resolved),
            _ => Err(AppError::validation(format!(
                "Invalid alert status: '{s}'. Expected one of: active, acknowledged, resolved"
            ))),
        }
    }
}

/// The rule that raised an alert.
#[derive(Debug, Clone, Copy, PartialEq, Eq, Hash, Serialize, Deserialize)]
#[serde(rename_all = "SCREAMING_SNAKE_CASE")]
pub enum AlertCategory {
    /// Many failures from one IP.
    BruteForceIp,
    /// Many failures against one account.
    AccountAttack,
    /// Many distinct accounts failing from one IP.
    CredentialStuffing,
}

impl AlertCategory {
    /// Return the category tag.
    pub fn as_str(&self) -> &'static str {
        match self {
            Self::BruteForceIp => "BRUTE_FORCE_IP",
            Self::AccountAttack => "ACCOUNT_ATTACK",
            Self::CredentialStuffing => "CREDENTIAL_STUFFING",
        }
    }

    /// Severity assigned when the rule fires.
    pub fn severity(&self) -> AlertSeverity {
        match self {
            Self::BruteForceIp => AlertSeverity::High,
            Self::AccountAttack => AlertSeverity::Medium,
            Self::CredentialStuffing => AlertSeverity::Critical,
        }
    }
}

impl fmt::Display for AlertCategory {
    fn fmt(&self, f: &mut fmt::Formatter<'_>) -> fmt::Result {
        f.write_str(self.as_str())
    }
}

/// A monitor-raised record of a detected abusive pattern.
#[derive(Debug, Clone, Serialize, Deserialize)]
#[serde(rename_all = "camelCase")]
pub struct SecurityAlert {
    /// Unique alert identifier.
    pub id: AlertId,
    /// Rule that fired.
    pub category: AlertCategory,
    /// Severity of the rule.
    pub severity: AlertSeverity,
    /// Targeted email, for account rules.
    pub subject_email: Option<String>,
    /// Source IP, for IP rules.
    pub ip_address: Option<String>,
    /// Human-readable summary.
    pub message: String,
    /// Counts that triggered the rule.
    pub details: serde_json::Value,
    /// When the alert was raised.
    pub timestamp: DateTime<Utc>,
    /// Lifecycle state.
    pub status: AlertStatus,
    /// Operator who acknowledged the alert.
    pub acknowledged_by: Option<AdminId>,
    /// When the alert was acknowledged.
    pub acknowledged_at: Option<DateTime<Utc>>,
    /// Operator who resolved the alert.
    pub resolved_by: Option<AdminId>,
    /// When the alert was resolved.
    pub resolved_at: Option<DateTime<Utc>>,
}

impl SecurityAlert {
    /// Subject the rule keys on: the IP for IP rules, the email otherwise.
    pub fn subject(&self) -> &str {
        self.ip_address
            .as_deref()
            .or(self.subject_email.as_deref())
            .unwrap_or_default()
    }
}
