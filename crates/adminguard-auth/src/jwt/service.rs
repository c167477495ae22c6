//! Token issuance and verification against the injected clock.

use std::sync::Arc;

use adminguard_core::config::auth::AuthConfig;
use adminguard_core::error::AppError;
use adminguard_core::types::{AdminId, Clock, SessionId};
use adminguard_entity::account::AdminAccount;

use super::claims::{AccessClaims, RefreshClaims};
use super::decoder::JwtDecoder;
use super::encoder::{JwtEncoder, TokenPair};

/// Issues and verifies the signed tokens bound to a session.
///
/// Tokens are stateless. A token is only honoured while the session it
/// names is still present in the session registry.
#[derive(Debug, Clone)]
pub struct TokenService {
    encoder: JwtEncoder,
    decoder: JwtDecoder,
    clock: Arc<dyn Clock>,
}

impl TokenService {
    /// Creates a token service from auth configuration.
    pub fn new(config: &AuthConfig, clock: Arc<dyn Clock>) -> Self {
        Self {
            encoder: JwtEncoder::new(config),
            decoder: JwtDecoder::new(config),
            clock,
        }
    }

    /// Opaque, unguessable session id.
    pub fn generate_session_id(&self) -> SessionId {
        self.encoder.generate_session_id()
    }

    /// Signs an access token embedding the account's identity, roles and permissions.
    pub fn generate_access_token(
        &self,
        account: &AdminAccount,
        session_id: &SessionId,
    ) -> Result<String, AppError> {
        self.encoder
            .generate_access_token(account, session_id, self.clock.now())
            .map(|(token, _)| token)
    }

    /// Signs a refresh token carrying only the admin id and session id.
    pub fn generate_refresh_token(
        &self,
        admin_id: AdminId,
        session_id: &SessionId,
    ) -> Result<String, AppError> {
        self.encoder
            .generate_refresh_token(admin_id, session_id, self.clock.now())
            .map(|(token, _)| token)
    }

    /// Issues both tokens for a session.
    pub fn issue_pair(
        &self,
        account: &AdminAccount,
        session_id: &SessionId,
    ) -> Result<TokenPair, AppError> {
        self.encoder
            .generate_token_pair(account, session_id, self.clock.now())
    }

    /// Verifies an access token: `TOKEN_INVALID` or `TOKEN_EXPIRED` on failure.
    pub fn verify_access_token(&self, token: &str) -> Result<AccessClaims, AppError> {
        self.decoder.decode_access_token(token, self.clock.now())
    }

    /// Identifies the session an access token was issued for, accepting
    /// expired tokens. Only for ending that session.
    pub fn identify_access_token(&self, token: &str) -> Result<AccessClaims, AppError> {
        self.decoder.decode_access_claims(token)
    }

    /// Verifies a refresh token: `TOKEN_INVALID` or `TOKEN_EXPIRED` on failure.
    pub fn verify_refresh_token(&self, token: &str) -> Result<RefreshClaims, AppError> {
        self.decoder.decode_refresh_token(token, self.clock.now())
    }
}
