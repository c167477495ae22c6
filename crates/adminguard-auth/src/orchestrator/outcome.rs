//! Inputs and results of the authentication operations.

use chrono::{DateTime, Utc};
use serde::{Deserialize, Serialize};

use adminguard_core::types::SessionId;
use adminguard_entity::account::AdminProfile;

/// Credentials presented at login.
#[derive(Clone, Serialize, Deserialize)]
#[serde(rename_all = "camelCase")]
pub struct LoginRequest {
    /// Account email.
    pub email: String,
    /// Plaintext password.
    pub password: String,
    /// One-time second-factor code, when the account requires one.
    #[serde(default)]
    pub mfa_token: Option<String>,
}

impl LoginRequest {
    /// Credentials without a second factor.
    pub fn new(email: impl Into<String>, password: impl Into<String>) -> Self {
        Self {
            email: email.into(),
            password: password.into(),
            mfa_token: None,
        }
    }

    /// Attaches a second-factor code.
    pub fn with_mfa(mut self, code: impl Into<String>) -> Self {
        self.mfa_token = Some(code.into());
        self
    }
}

impl std::fmt::Debug for LoginRequest {
    fn fmt(&self, f: &mut std::fmt::Formatter<'_>) -> std::fmt::Result {
        f.debug_struct("LoginRequest")
            .field("email", &self.email)
            .field("password", &"<redacted>")
            .field("mfa_token", &self.mfa_token.as_ref().map(|_| "<redacted>"))
            .finish()
    }
}

/// Tokens and profile returned by a complete login.
#[derive(Debug, Clone, Serialize, Deserialize)]
#[serde(rename_all = "camelCase")]
pub struct LoginSuccess {
    /// Access token.
    pub token: String,
    /// Refresh token.
    pub refresh_token: String,
    /// The new session.
    pub session_id: SessionId,
    /// When the session expires.
    pub expires_at: DateTime<Utc>,
    /// Sanitized account.
    pub admin: AdminProfile,
}

/// Result of a login that did not fail.
#[derive(Debug, Clone)]
pub enum LoginOutcome {
    /// Session issued.
    Authenticated(LoginSuccess),
    /// Password verified; a second factor must be supplied. No session
    /// exists yet.
    MfaRequired,
}

impl LoginOutcome {
    /// Whether a session was issued.
    pub fn is_authenticated(&self) -> bool {
        matches!(self, Self::Authenticated(_))
    }
}

/// New token pair after a refresh.
#[derive(Debug, Clone, Serialize, Deserialize)]
#[serde(rename_all = "camelCase")]
pub struct RefreshedTokens {
    /// Access token for the new session.
    pub access_token: String,
    /// Refresh token for the new session.
    pub refresh_token: String,
    /// The replacement session.
    pub session_id: SessionId,
    /// When the replacement session expires.
    pub expires_at: DateTime<Utc>,
}
