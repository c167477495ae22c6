//! Aggregate security metrics.

use std::fmt;
use std::str::FromStr;

use adminguard_core::AppError;
use chrono::{DateTime, Duration, Utc};
use serde::{Deserialize, Serialize};

/// Trailing range the metrics are computed over.
#[derive(Debug, Clone, Copy, PartialEq, Eq, Default, Serialize, Deserialize)]
#[serde(rename_all = "lowercase")]
pub enum TimeRange {
    /// Last 60 minutes.
    Hour,
    /// Last 24 hours.
    #[default]
    Day,
    /// Last 7 days.
    Week,
    /// Everything retained.
    All,
}

impl TimeRange {
    /// Length of the range; `None` for [`TimeRange::All`].
    pub fn duration(&self) -> Option<Duration> {
        match self {
            Self::Hour => Some(Duration::hours(1)),
            Self::Day => Some(Duration::days(1)),
            Self::Week => Some(Duration::weeks(1)),
            Self::All => None,
        }
    }

    /// Inclusive lower bound of the range ending at `now`.
    pub fn since(&self, now: DateTime<Utc>) -> Option<DateTime<Utc>> {
        self.duration().map(|d| now - d)
    }

    /// Return the range as a lowercase string.
    pub fn as_str(&self) -> &'static str {
        match self {
            Self::Hour => "hour",
            Self::Day => "day",
            Self::Week => "week",
            Self::All => "all",
        }
    }
}

impl fmt::Display for TimeRange {
    fn fmt(&self, f: &mut fmt::Formatter<'_>) -> fmt::Result {
        f.write_str(self.as_str())
    }
}

impl FromStr for TimeRange {
    type Err = AppError;

    fn from_str(s: &str) -> Result<Self, Self::Err> {
        match s.to_lowercase().as_str() {
            "hour" | "1h" => Ok(Self::Hour),
            "day" | "24h" => Ok(Self::Day),
            "week" | "7d" => Ok(Self::Week),
            "all" => Ok(Self::All),
            _ => Err(AppError::validation(format!(
                "Invalid time range: '{s}'. Expected one of: hour, day, week, all"
            ))),
        }
    }
}

/// Per-severity alert counts.
#[derive(Debug, Clone, Default, PartialEq, Eq, Serialize, Deserialize)]
pub struct SeverityCounts {
    /// Low severity alerts.
    pub low: usize,
    /// Medium severity alerts.
    pub medium: usize,
    /// High severity alerts.
    pub high: usize,
    /// Critical severity alerts.
    pub critical: usize,
}

/// Failure count for one source IP.
#[derive(Debug, Clone, PartialEq, Eq, Serialize, Deserialize)]
#[serde(rename_all = "camelCase")]
pub struct IpFailureCount {
    /// Source IP address.
    pub ip_address: String,
    /// Failed attempts in range.
    pub failures: usize,
}

/// Snapshot of login activity and monitor state.
#[derive(Debug, Clone, Serialize, Deserialize)]
#[serde(rename_all = "camelCase")]
pub struct SecurityMetrics {
    /// Range the attempt counts cover.
    pub time_range: TimeRange,
    /// When the snapshot was taken.
    pub generated_at: DateTime<Utc>,
    /// Attempts in range.
    pub total_attempts: usize,
    /// Successful attempts in range.
    pub successful_attempts: usize,
    /// Failed attempts in range.
    pub failed_attempts: usize,
    /// Distinct source IPs in range.
    pub unique_ips: usize,
    /// Distinct emails in range.
    pub unique_emails: usize,
    /// Currently blocked IPs.
    pub blocked_ips: usize,
    /// Alerts currently in the active state.
    pub active_alerts: usize,
    /// Alerts raised in range, by severity.
    pub alerts_by_severity: SeverityCounts,
    /// IPs with the most failures in range, most first.
    pub top_failing_ips: Vec<IpFailureCount>,
}
