//! JWT claims carried by access and refresh tokens.

use std::collections::BTreeSet;

use chrono::{DateTime, Utc};
use serde::{Deserialize, Serialize};
use uuid::Uuid;

use adminguard_core::types::{AdminId, SessionId};

/// Distinguishes access tokens from refresh tokens.
#[derive(Debug, Clone, Copy, Serialize, Deserialize, PartialEq, Eq)]
#[serde(rename_all = "snake_case")]
pub enum TokenType {
    /// Short-lived token presented on every request.
    Access,
    /// Longer-lived token exchanged for a new session.
    Refresh,
}

/// Claims embedded in every access token.
#[derive(Debug, Clone, Serialize, Deserialize)]
pub struct AccessClaims {
    /// Subject: the admin id.
    pub sub: AdminId,
    /// Session this token is bound to.
    pub sid: SessionId,
    /// Admin email at issuance.
    pub email: String,
    /// Role names at issuance.
    pub roles: Vec<String>,
    /// Permission snapshot at issuance.
    pub permissions: BTreeSet<String>,
    /// Issuer.
    pub iss: String,
    /// Issued-at (seconds since epoch).
    pub iat: i64,
    /// Expiration (seconds since epoch).
    pub exp: i64,
    /// Unique token id.
    pub jti: Uuid,
    /// Always [`TokenType::Access`].
    pub token_type: TokenType,
}

/// Claims embedded in a refresh token: only the admin and the session.
#[derive(Debug, Clone, Serialize, Deserialize)]
pub struct RefreshClaims {
    /// Subject: the admin id.
    pub sub: AdminId,
    /// Session this token is bound to.
    pub sid: SessionId,
    /// Issuer.
    pub iss: String,
    /// Issued-at (seconds since epoch).
    pub iat: i64,
    /// Expiration (seconds since epoch).
    pub exp: i64,
    /// Unique token id.
    pub jti: Uuid,
    /// Always [`TokenType::Refresh`].
    pub token_type: TokenType,
}

impl AccessClaims {
    /// Returns the expiration as a `DateTime<Utc>`.
    pub fn expires_at(&self) -> Option<DateTime<Utc>> {
        DateTime::from_timestamp(self.exp, 0)
    }
}

impl RefreshClaims {
    /// Returns the expiration as a `DateTime<Utc>`.
    pub fn expires_at(&self) -> Option<DateTime<Utc>> {
        DateTime::from_timestamp(self.exp, 0)
    }
}
