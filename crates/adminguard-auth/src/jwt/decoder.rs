//! JWT token validation.
//!
//! Expiry is checked against the caller-supplied instant rather than the
//! library's wall clock so that expired and forged tokens stay
//! distinguishable and tests can drive time.

use chrono::{DateTime, Utc};
use jsonwebtoken::{Algorithm, DecodingKey, Validation, decode};
use serde::de::DeserializeOwned;

use adminguard_core::config::auth::AuthConfig;
use adminguard_core::error::AppError;

use super::claims::{AccessClaims, RefreshClaims, TokenType};

/// Validates JWT signatures, issuer, type and expiry.
#[derive(Clone)]
pub struct JwtDecoder {
    /// HMAC secret key for verification.
    decoding_key: DecodingKey,
    /// Validation configuration.
    validation: Validation,
}

impl std::fmt::Debug for JwtDecoder {
    fn fmt(&self, f: &mut std::fmt::Formatter<'_>) -> std::fmt::Result {
        f.debug_struct("JwtDecoder")
            .field("validation", &self.validation)
            .finish()
    }
}

impl JwtDecoder {
    /// Creates a new decoder from auth configuration.
    pub fn new(config: &AuthConfig) -> Self {
        let mut validation = Validation::new(Algorithm::HS256);
        validation.validate_exp = false;
        validation.set_issuer(&[config.jwt_issuer.as_str()]);

        Self {
            decoding_key: DecodingKey::from_secret(config.jwt_secret.as_bytes()),
            validation,
        }
    }

    /// Decodes and validates an access token at `now`.
    pub fn decode_access_token(
        &self,
        token: &str,
        now: DateTime<Utc>,
    ) -> Result<AccessClaims, AppError> {
        let claims = self.decode_access_claims(token)?;
        check_expiry(claims.exp, now)?;
        Ok(claims)
    }

    /// Decodes an access token checking signature, issuer and type, but not
    /// expiry.
    pub fn decode_access_claims(
        &self,
        token: &str,
    ) -> Result<AccessClaims, AppError> {
        let claims: AccessClaims = self.decode_token(token)?;

        if claims.token_type != TokenType::Access {
            return Err(AppError::token_invalid(
                "Invalid token type: expected access token",
            ));
        }
        Ok(claims)
    }

    /// Decodes and validates a refresh token at `now`.
    pub fn decode_refresh_token(
        &self,
        token: &str,
        now: DateTime<Utc>,
    ) -> Result<RefreshClaims, AppError> {
        let claims: RefreshClaims = self.decode_token(token)?;

        if claims.token_type != TokenType::Refresh {
            return Err(AppError::token_invalid(
                "Invalid token type: expected refresh token",
            ));
        }
        check_expiry(claims.exp, now)?;

        Ok(claims)
    }

    fn decode_token<T: DeserializeOwned>(&self, token: &str) -> Result<T, AppError> {
        let token_data = decode::<T>(token, &self.decoding_key, &self.validation).map_err(|e| {
            match e.kind() {
                jsonwebtoken::errors::ErrorKind::InvalidSignature => {
                    AppError::token_invalid("Invalid token signature")
                }
                jsonwebtoken::errors::ErrorKind::InvalidIssuer => {
                    AppError::token_invalid("Invalid token issuer")
                }
                jsonwebtoken::errors::ErrorKind::InvalidToken => {
                    AppError::token_invalid("Invalid token format")
                }
                _ => AppError::token_invalid(format!("Token validation failed: {e}")),
            }
        })?;

        Ok(token_data.claims)
    }
}

fn check_expiry(exp: i64, now: DateTime<Utc>) -> Result<(), AppError> {
    if now.timestamp() >= exp {
        return Err(AppError::token_expired("Token has expired"));
    }
    Ok(())
}
