//! Response DTOs.

use chrono::{DateTime, Utc};
use serde::{Deserialize, Serialize};

use adminguard_auth::{LoginOutcome, RefreshedTokens};
use adminguard_core::types::SessionId;
use adminguard_entity::account::AdminProfile;

/// Standard success response wrapper.
#[derive(Debug, Clone, Serialize, Deserialize)]
pub struct ApiResponse<T: Serialize> {
    /// Whether the request was successful.
    pub success: bool,
    /// Response data.
    pub data: T,
}

impl<T: Serialize> ApiResponse<T> {
    /// Creates a successful response.
    pub fn ok(data: T) -> Self {
        Self {
            success: true,
            data,
        }
    }
}

/// Login result. A pending second factor is `success: false` with
/// `requiresMfa: true` and carries no tokens.
#[derive(Debug, Clone, Serialize, Deserialize)]
#[serde(rename_all = "camelCase")]
pub struct LoginResponse {
    /// Whether a session was issued.
    pub success: bool,
    /// Whether a second factor must be supplied.
    pub requires_mfa: bool,
    /// Access token.
    #[serde(skip_serializing_if = "Option::is_none")]
    pub token: Option<String>,
    /// Refresh token.
    #[serde(skip_serializing_if = "Option::is_none")]
    pub refresh_token: Option<String>,
    /// New session id.
    #[serde(skip_serializing_if = "Option::is_none")]
    pub session_id: Option<SessionId>,
    /// Session expiry.
    #[serde(skip_serializing_if = "Option::is_none")]
    pub expires_at: Option<DateTime<Utc>>,
    /// Sanitized account.
    #[serde(skip_serializing_if = "Option::is_none")]
    pub admin: Option<AdminProfile>,
}

impl From<LoginOutcome> for LoginResponse {
    fn from(outcome: LoginOutcome) -> Self {
        match outcome {
            LoginOutcome::Authenticated(s) => Self {
                success: true,
                requires_mfa: false,
                token: Some(s.token),
                refresh_token: Some(s.refresh_token),
                session_id: Some(s.session_id),
                expires_at: Some(s.expires_at),
                admin: Some(s.admin),
            },
            LoginOutcome::MfaRequired => Self {
                success: false,
                requires_mfa: true,
                token: None,
                refresh_token: None,
                session_id: None,
                expires_at: None,
                admin: None,
            },
        }
    }
}

/// Refresh result.
pub type RefreshResponse = RefreshedTokens;

/// Simple message body.
#[derive(Debug, Clone, Serialize, Deserialize)]
pub struct MessageResponse {
    /// Message.
    pub message: String,
}

impl MessageResponse {
    /// Wraps a message.
    pub fn new(message: impl Into<String>) -> Self {
        Self {
            message: message.into(),
        }
    }
}

/// Session revocation result.
#[derive(Debug, Clone, Serialize, Deserialize)]
pub struct RevokeResponse {
    /// Number of sessions removed.
    pub revoked: usize,
}

/// Health check response.
#[derive(Debug, Clone, Serialize, Deserialize)]
#[serde(rename_all = "camelCase")]
pub struct HealthResponse {
    /// Overall status.
    pub status: String,
    /// Server version.
    pub version: String,
    /// Live sessions.
    pub active_sessions: usize,
    /// Blocked addresses.
    pub blocked_ips: usize,
}
