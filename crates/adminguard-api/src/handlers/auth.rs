//! Auth handlers: login, logout, refresh, current session.

use axum::Json;
use axum::extract::State;

use adminguard_auth::LoginRequest;
use adminguard_entity::session::Session;

use crate::dto::ValidatedJson;
use crate::dto::request::{LoginBody, RefreshBody};
use crate::dto::response::{ApiResponse, LoginResponse, MessageResponse, RefreshResponse};
use crate::error::ApiError;
use crate::extractors::{AdminAuth, BearerToken, ClientMeta};
use crate::state::AppState;

/// POST /api/auth/login
pub async fn login(
    State(state): State<AppState>,
    ClientMeta(client): ClientMeta,
    ValidatedJson(body): ValidatedJson<LoginBody>,
) -> Result<Json<LoginResponse>, ApiError> {
    let request = LoginRequest {
        email: body.email,
        password: body.password,
        mfa_token: body.mfa_token,
    };
    let outcome = state.auth.login(request, &client).await?;
    Ok(Json(outcome.into()))
}

/// POST /api/auth/logout
///
/// Only the token signature is checked, so logging out of an ended or
/// expired session succeeds.
pub async fn logout(
    State(state): State<AppState>,
    ClientMeta(client): ClientMeta,
    BearerToken(token): BearerToken,
) -> Result<Json<ApiResponse<MessageResponse>>, ApiError> {
    let claims = state.auth.tokens().identify_access_token(&token)?;
    state.auth.logout(&claims.sid, &client).await?;
    Ok(Json(ApiResponse::ok(MessageResponse::new(
        "Logged out successfully",
    ))))
}

/// POST /api/auth/refresh
pub async fn refresh(
    State(state): State<AppState>,
    ClientMeta(client): ClientMeta,
    ValidatedJson(body): ValidatedJson<RefreshBody>,
) -> Result<Json<ApiResponse<RefreshResponse>>, ApiError> {
    let tokens = state.auth.refresh_token(&body.refresh_token, &client).await?;
    Ok(Json(ApiResponse::ok(tokens)))
}

/// GET /api/auth/session
pub async fn session(auth: AdminAuth) -> Json<ApiResponse<Session>> {
    Json(ApiResponse::ok(auth.session))
}
