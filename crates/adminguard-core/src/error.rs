//! Unified application error types for AdminGuard.
//!
//! Every component maps its failures into [`AppError`]. The error carries a
//! stable machine-readable code, an HTTP status hint, and optional structured
//! details (for example the `lockedUntil` timestamp of a locked account), so
//! callers branch on the kind instead of parsing messages.

use std::fmt;
use thiserror::Error;

/// Categorisation of every failure AdminGuard can report.
#[derive(Debug, Clone, Copy, PartialEq, Eq, Hash, serde::Serialize, serde::Deserialize)]
#[serde(rename_all = "SCREAMING_SNAKE_CASE")]
pub enum ErrorKind {
    /// The caller's IP address is on the block list.
    IpBlocked,
    /// Too many attempts for the key within the rate-limit window.
    RateLimited,
    /// Unknown email or wrong password (never distinguished).
    InvalidCredentials,
    /// The account is temporarily locked after repeated failures.
    AccountLocked,
    /// The account has been deactivated.
    AccountInactive,
    /// The supplied second factor was rejected.
    InvalidMfa,
    /// No live session exists for the presented id.
    SessionNotFound,
    /// The session existed but has expired.
    SessionExpired,
    /// The account behind a session no longer exists or is inactive.
    AdminNotFound,
    /// A refresh token could not be exchanged.
    RefreshFailed,
    /// A token failed signature or structural validation.
    TokenInvalid,
    /// A token is well-formed but past its expiry.
    TokenExpired,
    /// The authenticated admin lacks the required permission.
    Forbidden,
    /// A requested record (alert, block entry) does not exist.
    NotFound,
    /// Input validation failed.
    Validation,
    /// A configuration error occurred.
    Configuration,
    /// A serialization/deserialization error occurred.
    Serialization,
    /// An external collaborator timed out or failed.
    ExternalService,
    /// An unexpected internal error.
    Internal,
}

impl ErrorKind {
    /// Stable code exposed to callers.
    pub fn code(&self) -> &'static str {
        match self {
            Self::IpBlocked => "IP_BLOCKED",
            Self::RateLimited => "RATE_LIMITED",
            Self::InvalidCredentials => "INVALID_CREDENTIALS",
            Self::AccountLocked => "ACCOUNT_LOCKED",
            Self::AccountInactive => "ACCOUNT_INACTIVE",
            Self::InvalidMfa => "INVALID_MFA",
            Self::SessionNotFound => "SESSION_NOT_FOUND",
            Self::SessionExpired => "SESSION_EXPIRED",
            Self::AdminNotFound => "ADMIN_NOT_FOUND",
            Self::RefreshFailed => "REFRESH_FAILED",
            Self::TokenInvalid => "TOKEN_INVALID",
            Self::TokenExpired => "TOKEN_EXPIRED",
            Self::Forbidden => "FORBIDDEN",
            Self::NotFound => "NOT_FOUND",
            Self::Validation => "VALIDATION_ERROR",
            Self::Configuration => "CONFIGURATION_ERROR",
            Self::Serialization => "SERIALIZATION_ERROR",
            Self::ExternalService => "EXTERNAL_SERVICE_ERROR",
            Self::Internal => "INTERNAL_ERROR",
        }
    }

    /// HTTP status hint for transports.
    pub fn status(&self) -> u16 {
        match self {
            Self::IpBlocked | Self::AccountInactive | Self::Forbidden => 403,
            Self::RateLimited => 429,
            Self::InvalidCredentials
            | Self::InvalidMfa
            | Self::SessionNotFound
            | Self::SessionExpired
            | Self::AdminNotFound
            | Self::RefreshFailed
            | Self::TokenInvalid
            | Self::TokenExpired => 401,
            Self::AccountLocked => 423,
            Self::NotFound => 404,
            Self::Validation => 400,
            Self::ExternalService => 502,
            Self::Configuration | Self::Serialization | Self::Internal => 500,
        }
    }

    /// Whether this kind must be hidden behind a generic message at the boundary.
    pub fn is_internal(&self) -> bool {
        matches!(
            self,
            Self::Configuration | Self::Serialization | Self::ExternalService | Self::Internal
        )
    }
}

impl fmt::Display for ErrorKind {
    fn fmt(&self, f: &mut fmt::Formatter<'_>) -> fmt::Result {
        f.write_str(self.code())
    }
}

/// The unified application error used throughout AdminGuard.
#[derive(Debug, Error)]
#[error("{kind}: {message}")]
pub struct AppError {
    /// The category of error.
    pub kind: ErrorKind,
    /// A human-readable error message.
    pub message: String,
    /// Structured payload returned alongside the error.
    pub details: Option<serde_json::Value>,
    /// Optional underlying cause.
    #[source]
    pub source: Option<Box<dyn std::error::Error + Send + Sync>>,
}

impl AppError {
    /// Create a new application error.
    pub fn new(kind: ErrorKind, message: impl Into<String>) -> Self {
        Self {
            kind,
            message: message.into(),
            details: None,
            source: None,
        }
    }

    /// Create a new application error with an underlying cause.
    pub fn with_source(
        kind: ErrorKind,
        message: impl Into<String>,
        source: impl std::error::Error + Send + Sync + 'static,
    ) -> Self {
        Self {
            kind,
            message: message.into(),
            details: None,
            source: Some(Box::new(source)),
        }
    }

    /// Attach a structured details payload.
    pub fn with_details(mut self, details: serde_json::Value) -> Self {
        self.details = Some(details);
        self
    }

    /// Stable code of this error's kind.
    pub fn code(&self) -> &'static str {
        self.kind.code()
    }

    /// HTTP status hint of this error's kind.
    pub fn status(&self) -> u16 {
        self.kind.status()
    }

    /// Create an IP-blocked error.
    pub fn ip_blocked(message: impl Into<String>) -> Self {
        Self::new(ErrorKind::IpBlocked, message)
    }

    /// Create a rate-limited error.
    pub fn rate_limited(message: impl Into<String>) -> Self {
        Self::new(ErrorKind::RateLimited, message)
    }

    /// Create an invalid-credentials error. The message is fixed so that an
    /// unknown email and a wrong password are indistinguishable.
    pub fn invalid_credentials() -> Self {
        Self::new(ErrorKind::InvalidCredentials, "Invalid email or password")
    }

    /// Create an account-locked error.
    pub fn account_locked(message: impl Into<String>) -> Self {
        Self::new(ErrorKind::AccountLocked, message)
    }

    /// Create an account-inactive error.
    pub fn account_inactive(message: impl Into<String>) -> Self {
        Self::new(ErrorKind::AccountInactive, message)
    }

    /// Create an invalid-MFA error.
    pub fn invalid_mfa(message: impl Into<String>) -> Self {
        Self::new(ErrorKind::InvalidMfa, message)
    }

    /// Create a session-not-found error.
    pub fn session_not_found(message: impl Into<String>) -> Self {
        Self::new(ErrorKind::SessionNotFound, message)
    }

    /// Create a session-expired error.
    pub fn session_expired(message: impl Into<String>) -> Self {
        Self::new(ErrorKind::SessionExpired, message)
    }

    /// Create an admin-not-found error.
    pub fn admin_not_found(message: impl Into<String>) -> Self {
        Self::new(ErrorKind::AdminNotFound, message)
    }

    /// Create a refresh-failed error.
    pub fn refresh_failed(message: impl Into<String>) -> Self {
        Self::new(ErrorKind::RefreshFailed, message)
    }

    /// Create a token-invalid error.
    pub fn token_invalid(message: impl Into<String>) -> Self {
        Self::new(ErrorKind::TokenInvalid, message)
    }

    /// Create a token-expired error.
    pub fn token_expired(message: impl Into<String>) -> Self {
        Self::new(ErrorKind::TokenExpired, message)
    }

    /// Create a forbidden error.
    pub fn forbidden(message: impl Into<String>) -> Self {
        Self::new(ErrorKind::Forbidden, message)
    }

    /// Create a not-found error.
    pub fn not_found(message: impl Into<String>) -> Self {
        Self::new(ErrorKind::NotFound, message)
    }

    /// Create a validation error.
    pub fn validation(message: impl Into<String>) -> Self {
        Self::new(ErrorKind::Validation, message)
    }

    /// Create a configuration error.
    pub fn configuration(message: impl Into<String>) -> Self {
        Self::new(ErrorKind::Configuration, message)
    }

    /// Create an external-service error.
    pub fn external(message: impl Into<String>) -> Self {
        Self::new(ErrorKind::ExternalService, message)
    }

    /// Create an internal error.
    pub fn internal(message: impl Into<String>) -> Self {
        Self::new(ErrorKind::Internal, message)
    }
}

impl Clone for AppError {
    fn clone(&self) -> Self {
        Self {
            kind: self.kind,
            message: self.message.clone(),
            details: self.details.clone(),
            source: None,
        }
    }
}

impl From<serde_json::Error> for AppError {
    fn from(err: serde_json::Error) -> Self {
        Self::with_source(
            ErrorKind::Serialization,
            format!("JSON serialization error: {err}"),
            err,
        )
    }
}

impl From<config::ConfigError> for AppError {
    fn from(err: config::ConfigError) -> Self {
        Self::with_source(
            ErrorKind::Configuration,
            format!("Configuration error: {err}"),
            err,
        )
    }
}
