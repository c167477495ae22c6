//! Login rate-limit configuration.

use serde::{Deserialize, Serialize};

/// Sliding-window rate limit applied to every `email + ip` login key.
#[derive(Debug, Clone, Serialize, Deserialize)]
pub struct RateLimitConfig {
    /// Length of the trailing window, in seconds.
    #[serde(default = "default_window")]
    pub window_seconds: u64,
    /// Attempts admitted per key within one window.
    #[serde(default = "default_max_attempts")]
    pub max_attempts: u32,
    /// Whether successful logins are removed from the count.
    #[serde(default = "default_true")]
    pub skip_successful: bool,
}

impl Default for RateLimitConfig {
    fn default() -> Self {
        Self {
            window_seconds: default_window(),
            max_attempts: default_max_attempts(),
            skip_successful: true,
        }
    }
}

fn default_window() -> u64 {
    900
}

fn default_max_attempts() -> u32 {
    10
}

fn default_true() -> bool {
    true
}
