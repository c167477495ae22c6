//! Authentication configuration.

use serde::{Deserialize, Serialize};

/// Minimum accepted length of the token signing secret, in bytes.
pub const MIN_SECRET_LENGTH: usize = 32;

/// Authentication, token and lockout configuration.
#[derive(Clone, Serialize, Deserialize)]
pub struct AuthConfig {
    /// Secret key for JWT signing (HMAC-SHA256). Must be supplied.
    #[serde(default)]
    pub jwt_secret: String,
    /// `iss` claim written into and required on every token.
    #[serde(default = "default_issuer")]
    pub jwt_issuer: String,
    /// Access token TTL in minutes.
    #[serde(default = "default_access_ttl")]
    pub access_token_ttl_minutes: u64,
    /// Refresh token TTL in hours.
    #[serde(default = "default_refresh_ttl")]
    pub refresh_token_ttl_hours: u64,
    /// Consecutive failed logins before the account is locked.
    #[serde(default = "default_max_attempts")]
    pub max_login_attempts: u32,
    /// Account lockout duration in minutes.
    #[serde(default = "default_lockout")]
    pub lockout_duration_minutes: u64,
    /// Upper bound on one account-store call, in milliseconds.
    #[serde(default = "default_lookup_timeout")]
    pub account_lookup_timeout_ms: u64,
    /// Accepted TOTP clock skew, in 30-second steps.
    #[serde(default = "default_mfa_skew")]
    pub mfa_skew_steps: u8,
}

impl std::fmt::Debug for AuthConfig {
    fn fmt(&self, f: &mut std::fmt::Formatter<'_>) -> std::fmt::Result {
        f.debug_struct("AuthConfig")
            .field("jwt_secret", &"<redacted>")
            .field("jwt_issuer", &self.jwt_issuer)
            .field("access_token_ttl_minutes", &self.access_token_ttl_minutes)
            .field("refresh_token_ttl_hours", &self.refresh_token_ttl_hours)
            .field("max_login_attempts", &self.max_login_attempts)
            .field("lockout_duration_minutes", &self.lockout_duration_minutes)
            .field("account_lookup_timeout_ms", &self.account_lookup_timeout_ms)
            .field("mfa_skew_steps", &self.mfa_skew_steps)
            .finish()
    }
}

impl Default for AuthConfig {
    fn default() -> Self {
        Self {
            jwt_secret: String::new(),
            jwt_issuer: default_issuer(),
            access_token_ttl_minutes: default_access_ttl(),
            refresh_token_ttl_hours: default_refresh_ttl(),
            max_login_attempts: default_max_attempts(),
            lockout_duration_minutes: default_lockout(),
            account_lookup_timeout_ms: default_lookup_timeout(),
            mfa_skew_steps: default_mfa_skew(),
        }
    }
}

fn default_issuer() -> String {
    "adminguard".to_string()
}

fn default_access_ttl() -> u64 {
    15
}

fn default_refresh_ttl() -> u64 {
    24
}

fn default_max_attempts() -> u32 {
    5
}

fn default_lockout() -> u64 {
    15
}

fn default_lookup_timeout() -> u64 {
    5000
}

fn default_mfa_skew() -> u8 {
    1
}
