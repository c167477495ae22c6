//! `AdminAuth` extractor: pulls the bearer token, authenticates it against
//! the session table, and injects the session snapshot.

use axum::extract::FromRequestParts;
use axum::http::request::Parts;

use adminguard_auth::{Actor, ClientInfo};
use adminguard_core::error::AppError;
use adminguard_entity::session::Session;

use crate::error::ApiError;
use crate::extractors::client::ClientMeta;
use crate::state::AppState;

/// Raw bearer token from the `Authorization` header.
#[derive(Debug, Clone)]
pub struct BearerToken(pub String);

impl<S: Send + Sync> FromRequestParts<S> for BearerToken {
    type Rejection = ApiError;

    async fn from_request_parts(parts: &mut Parts, _state: &S) -> Result<Self, Self::Rejection> {
        let header = parts
            .headers
            .get("authorization")
            .and_then(|v| v.to_str().ok())
            .ok_or_else(|| AppError::token_invalid("Missing Authorization header"))?;

        let token = header
            .strip_prefix("Bearer ")
            .map(str::trim)
            .filter(|t| !t.is_empty())
            .ok_or_else(|| AppError::token_invalid("Invalid Authorization header format"))?;

        Ok(Self(token.to_string()))
    }
}

/// Authenticated admin with a live session.
#[derive(Debug, Clone)]
pub struct AdminAuth {
    /// Session snapshot taken at login or refresh.
    pub session: Session,
    /// Caller metadata of this request.
    pub client: ClientInfo,
    /// Method and path of this request, recorded on refusals.
    pub operation: String,
}

impl AdminAuth {
    /// The admin as the actor of an administrative operation.
    pub fn actor(&self) -> Actor {
        Actor::from_session(&self.session, self.client.clone())
    }

    /// Fails with `FORBIDDEN` unless the session grants `permission`.
    /// Refusals land in the audit trail.
    pub async fn require(&self, state: &AppState, permission: &str) -> Result<(), ApiError> {
        state
            .auth
            .authorize(&self.session, &self.actor(), permission, &self.operation)
            .await?;
        Ok(())
    }
}

impl FromRequestParts<AppState> for AdminAuth {
    type Rejection = ApiError;

    async fn from_request_parts(
        parts: &mut Parts,
        state: &AppState,
    ) -> Result<Self, Self::Rejection> {
        let BearerToken(token) = BearerToken::from_request_parts(parts, state).await?;
        let session = state.auth.authenticate(&token).await?;
        let ClientMeta(client) = match ClientMeta::from_request_parts(parts, state).await {
            Ok(meta) => meta,
            Err(never) => match never {},
        };

        let operation = format!("{} {}", parts.method, parts.uri.path());

        Ok(Self {
            session,
            client,
            operation,
        })
    }
}
