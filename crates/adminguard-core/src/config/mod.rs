//! Application configuration schemas.
//!
//! All configuration structs are deserialized via the `config` crate from
//! `config/default.toml`, an environment overlay, and `ADMINGUARD__*`
//! environment variables. Each sub-module is one configuration section.

pub mod app;
pub mod audit;
pub mod auth;
pub mod bootstrap;
pub mod logging;
pub mod monitor;
pub mod rate_limit;
pub mod session;

use serde::{Deserialize, Serialize};

use self::app::ServerConfig;
use self::audit::AuditConfig;
use self::auth::{AuthConfig, MIN_SECRET_LENGTH};
use self::bootstrap::BootstrapAccount;
use self::logging::LoggingConfig;
use self::monitor::MonitorConfig;
use self::rate_limit::RateLimitConfig;
use self::session::SessionConfig;

use crate::error::AppError;

/// Root application configuration.
#[derive(Debug, Clone, Default, Serialize, Deserialize)]
pub struct AppConfig {
    /// HTTP server settings.
    #[serde(default)]
    pub server: ServerConfig,
    /// Token and lockout settings.
    #[serde(default)]
    pub auth: AuthConfig,
    /// Session lifetime settings.
    #[serde(default)]
    pub session: SessionConfig,
    /// Login rate-limit settings.
    #[serde(default)]
    pub rate_limit: RateLimitConfig,
    /// Security monitor thresholds.
    #[serde(default)]
    pub monitor: MonitorConfig,
    /// Audit log settings.
    #[serde(default)]
    pub audit: AuditConfig,
    /// Logging settings.
    #[serde(default)]
    pub logging: LoggingConfig,
    /// Accounts seeded into the in-memory account store.
    #[serde(default)]
    pub bootstrap: Vec<BootstrapAccount>,
}

impl AppConfig {
    /// Load configuration from TOML files and the environment.
    ///
    /// Merges the default configuration with an environment-specific overlay
    /// and environment variables prefixed with `ADMINGUARD__`, then validates
    /// the result.
    pub fn load(env: &str) -> Result<Self, AppError> {
        let config = config::Config::builder()
            .add_source(config::File::with_name("config/default").required(false))
            .add_source(config::File::with_name(&format!("config/{env}")).required(false))
            .add_source(
                config::Environment::with_prefix("ADMINGUARD")
                    .prefix_separator("__")
                    .separator("__")
                    .try_parsing(true),
            )
            .build()
            .map_err(|e| AppError::configuration(format!("Failed to build config: {e}")))?;

        let loaded: Self = config
            .try_deserialize()
            .map_err(|e| AppError::configuration(format!("Failed to deserialize config: {e}")))?;
        loaded.validate()?;
        Ok(loaded)
    }

    /// Reject configurations the services cannot run with.
    pub fn validate(&self) -> Result<(), AppError> {
        if self.auth.jwt_secret.len() < MIN_SECRET_LENGTH {
            return Err(AppError::configuration(format!(
                "auth.jwt_secret must be at least {MIN_SECRET_LENGTH} bytes"
            )));
        }
        if self.auth.jwt_issuer.trim().is_empty() {
            return Err(AppError::configuration("auth.jwt_issuer must not be empty"));
        }
        if self.auth.access_token_ttl_minutes == 0 || self.auth.refresh_token_ttl_hours == 0 {
            return Err(AppError::configuration("token TTLs must be positive"));
        }
        if self.auth.max_login_attempts == 0 {
            return Err(AppError::configuration("auth.max_login_attempts must be positive"));
        }
        if self.auth.lockout_duration_minutes == 0 {
            return Err(AppError::configuration(
                "auth.lockout_duration_minutes must be positive",
            ));
        }
        if self.session.ttl_minutes == 0 || self.session.cleanup_interval_seconds == 0 {
            return Err(AppError::configuration(
                "session.ttl_minutes and session.cleanup_interval_seconds must be positive",
            ));
        }
        if self.rate_limit.window_seconds == 0 || self.rate_limit.max_attempts == 0 {
            return Err(AppError::configuration(
                "rate_limit.window_seconds and rate_limit.max_attempts must be positive",
            ));
        }
        if self.monitor.window_minutes == 0
            || self.monitor.ip_failure_threshold == 0
            || self.monitor.email_failure_threshold == 0
            || self.monitor.stuffing_distinct_emails == 0
        {
            return Err(AppError::configuration("monitor thresholds must be positive"));
        }
        if !matches!(self.logging.format.as_str(), "json" | "pretty") {
            return Err(AppError::configuration(format!(
                "logging.format must be \"json\" or \"pretty\", got \"{}\"",
                self.logging.format
            )));
        }
        for account in &self.bootstrap {
            if !account.email.contains('@') {
                return Err(AppError::configuration(format!(
                    "bootstrap account email \"{}\" is not an address",
                    account.email
                )));
            }
            if !account.password_hash.starts_with("$argon2") {
                return Err(AppError::configuration(format!(
                    "bootstrap account {} must carry an Argon2 password hash",
                    account.email
                )));
            }
        }
        Ok(())
    }
}

#[cfg(test)]
mod tests {
    use super::*;

    fn valid() -> AppConfig {
        let mut config = AppConfig::default();
        config.auth.jwt_secret = "0123456789abcdef0123456789abcdef".to_string();
        config
    }

    #[test]
    fn test_defaults_match_documented_values() {
        let config = AppConfig::default();
        assert_eq!(config.auth.access_token_ttl_minutes, 15);
        assert_eq!(config.auth.refresh_token_ttl_hours, 24);
        assert_eq!(config.auth.max_login_attempts, 5);
        assert_eq!(config.auth.lockout_duration_minutes, 15);
        assert_eq!(config.session.ttl_minutes, 15);
        assert_eq!(config.session.cleanup_interval_seconds, 3600);
        assert_eq!(config.rate_limit.window_seconds, 900);
        assert_eq!(config.rate_limit.max_attempts, 10);
        assert!(config.rate_limit.skip_successful);
    }

    #[test]
    fn test_validate_requires_secret() {
        assert!(AppConfig::default().validate().is_err());
        assert!(valid().validate().is_ok());
    }

    #[test]
    fn test_validate_rejects_unknown_log_format() {
        let mut config = valid();
        config.logging.format = "xml".into();
        assert!(config.validate().is_err());
    }

    #[test]
    fn test_validate_rejects_plaintext_bootstrap_password() {
        let mut config = valid();
        config.bootstrap.push(BootstrapAccount {
            email: "root@example.com".into(),
            password_hash: "hunter2".into(),
            roles: Vec::new(),
            mfa_secret: None,
            active: true,
        });
        assert!(config.validate().is_err());
    }

    #[test]
    fn test_auth_debug_redacts_secret() {
        let rendered = format!("{:?}", valid().auth);
        assert!(!rendered.contains("0123456789abcdef"));
    }
}
