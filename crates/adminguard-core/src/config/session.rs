//! Session management configuration.

use serde::{Deserialize, Serialize};

/// Session lifetime and sweep configuration.
#[derive(Debug, Clone, Serialize, Deserialize)]
pub struct SessionConfig {
    /// Lifetime of a session from login or refresh, in minutes.
    #[serde(default = "default_ttl")]
    pub ttl_minutes: u64,
    /// Period of the expired-session sweep, in seconds.
    #[serde(default = "default_cleanup_interval")]
    pub cleanup_interval_seconds: u64,
}

impl Default for SessionConfig {
    fn default() -> Self {
        Self {
            ttl_minutes: default_ttl(),
            cleanup_interval_seconds: default_cleanup_interval(),
        }
    }
}

fn default_ttl() -> u64 {
    15
}

fn default_cleanup_interval() -> u64 {
    3600
}
