//! JWT token creation with configurable signing and TTL.

use base64::Engine;
use base64::engine::general_purpose::URL_SAFE_NO_PAD;
use chrono::{DateTime, Duration, Utc};
use jsonwebtoken::{EncodingKey, Header, encode};
use rand::RngCore;
use serde::{Deserialize, Serialize};
use uuid::Uuid;

use adminguard_core::config::auth::AuthConfig;
use adminguard_core::error::AppError;
use adminguard_core::types::{AdminId, SessionId};
use adminguard_entity::account::AdminAccount;

use super::claims::{AccessClaims, RefreshClaims, TokenType};

/// Random bytes behind every session id.
const SESSION_ID_BYTES: usize = 32;

/// Creates signed JWT access and refresh tokens.
#[derive(Clone)]
pub struct JwtEncoder {
    /// HMAC secret key for signing.
    encoding_key: EncodingKey,
    /// Issuer written into every token.
    issuer: String,
    /// Access token TTL.
    access_ttl: Duration,
    /// Refresh token TTL.
    refresh_ttl: Duration,
}

impl std::fmt::Debug for JwtEncoder {
    fn fmt(&self, f: &mut std::fmt::Formatter<'_>) -> std::fmt::Result {
        f.debug_struct("JwtEncoder")
            .field("issuer", &self.issuer)
            .field("access_ttl", &self.access_ttl)
            .field("refresh_ttl", &self.refresh_ttl)
            .finish()
    }
}

/// Access and refresh tokens issued together for one session.
#[derive(Debug, Clone, Serialize, Deserialize)]
#[serde(rename_all = "camelCase")]
pub struct TokenPair {
    /// Short-lived access token.
    pub access_token: String,
    /// Long-lived refresh token.
    pub refresh_token: String,
    /// Access token expiration timestamp.
    pub access_expires_at: DateTime<Utc>,
    /// Refresh token expiration timestamp.
    pub refresh_expires_at: DateTime<Utc>,
}

impl JwtEncoder {
    /// Creates a new encoder from auth configuration.
    pub fn new(config: &AuthConfig) -> Self {
        Self {
            encoding_key: EncodingKey::from_secret(config.jwt_secret.as_bytes()),
            issuer: config.jwt_issuer.clone(),
            access_ttl: Duration::minutes(config.access_token_ttl_minutes as i64),
            refresh_ttl: Duration::hours(config.refresh_token_ttl_hours as i64),
        }
    }

    /// Signs an access token for `account` bound to `session_id`.
    pub fn generate_access_token(
        &self,
        account: &AdminAccount,
        session_id: &SessionId,
        now: DateTime<Utc>,
    ) -> Result<(String, DateTime<Utc>), AppError> {
        let exp = now + self.access_ttl;
        let claims = AccessClaims {
            sub: account.id,
            sid: session_id.clone(),
            email: account.email.clone(),
            roles: account.role_names(),
            permissions: account.permissions(),
            iss: self.issuer.clone(),
            iat: now.timestamp(),
            exp: exp.timestamp(),
            jti: Uuid::new_v4(),
            token_type: TokenType::Access,
        };

        let token = encode(&Header::default(), &claims, &self.encoding_key)
            .map_err(|e| AppError::internal(format!("Failed to encode access token: {e}")))?;

        Ok((token, exp))
    }

    /// Signs a refresh token carrying only the admin id and session id.
    pub fn generate_refresh_token(
        &self,
        admin_id: AdminId,
        session_id: &SessionId,
        now: DateTime<Utc>,
    ) -> Result<(String, DateTime<Utc>), AppError> {
        let exp = now + self.refresh_ttl;
        let claims = RefreshClaims {
            sub: admin_id,
            sid: session_id.clone(),
            iss: self.issuer.clone(),
            iat: now.timestamp(),
            exp: exp.timestamp(),
            jti: Uuid::new_v4(),
            token_type: TokenType::Refresh,
        };

        let token = encode(&Header::default(), &claims, &self.encoding_key)
            .map_err(|e| AppError::internal(format!("Failed to encode refresh token: {e}")))?;

        Ok((token, exp))
    }

    /// Generates a new access + refresh token pair for one session.
    pub fn generate_token_pair(
        &self,
        account: &AdminAccount,
        session_id: &SessionId,
        now: DateTime<Utc>,
    ) -> Result<TokenPair, AppError> {
        let (access_token, access_expires_at) =
            self.generate_access_token(account, session_id, now)?;
        let (refresh_token, refresh_expires_at) =
            self.generate_refresh_token(account.id, session_id, now)?;

        Ok(TokenPair {
            access_token,
            refresh_token,
            access_expires_at,
            refresh_expires_at,
        })
    }

    /// Draws a fresh session id from the thread-local CSPRNG.
    pub fn generate_session_id(&self) -> SessionId {
        let mut bytes = [0u8; SESSION_ID_BYTES];
        rand::rng().fill_bytes(&mut bytes);
        SessionId::from_string(URL_SAFE_NO_PAD.encode(bytes))
    }
}
