//! Security monitor thresholds.

use serde::{Deserialize, Serialize};

/// Rule thresholds for the security monitor.
#[derive(Debug, Clone, Serialize, Deserialize)]
pub struct MonitorConfig {
    /// Trailing window the rules evaluate, in minutes.
    #[serde(default = "default_window")]
    pub window_minutes: u64,
    /// Failures from one IP that raise a brute-force alert.
    #[serde(default = "default_ip_threshold")]
    pub ip_failure_threshold: u32,
    /// Failures against one email that raise an account-attack alert.
    #[serde(default = "default_email_threshold")]
    pub email_failure_threshold: u32,
    /// Distinct failing emails from one IP that raise a credential-stuffing alert.
    #[serde(default = "default_stuffing_threshold")]
    pub stuffing_distinct_emails: u32,
    /// Whether brute-force and stuffing alerts block the source IP.
    #[serde(default = "default_true")]
    pub auto_block: bool,
    /// Upper bound on retained login attempts used for metrics.
    #[serde(default = "default_max_tracked")]
    pub max_tracked_attempts: usize,
}

impl Default for MonitorConfig {
    fn default() -> Self {
        Self {
            window_minutes: default_window(),
            ip_failure_threshold: default_ip_threshold(),
            email_failure_threshold: default_email_threshold(),
            stuffing_distinct_emails: default_stuffing_threshold(),
            auto_block: true,
            max_tracked_attempts: default_max_tracked(),
        }
    }
}

fn default_window() -> u64 {
    15
}

fn default_ip_threshold() -> u32 {
    10
}

fn default_email_threshold() -> u32 {
    5
}

fn default_stuffing_threshold() -> u32 {
    5
}

fn default_true() -> bool {
    true
}

fn default_max_tracked() -> usize {
    10_000
}
