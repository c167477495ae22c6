//! Admin session management handlers.

use axum::Json;
use axum::extract::State;

use adminguard_entity::account::role::permissions;
use adminguard_entity::session::Session;

use crate::dto::ValidatedJson;
use crate::dto::request::RevokeSessionsBody;
use crate::dto::response::{ApiResponse, RevokeResponse};
use crate::error::ApiError;
use crate::extractors::AdminAuth;
use crate::state::AppState;

/// GET /api/admin/sessions
///
/// Live sessions of the caller.
pub async fn list_sessions(
    State(state): State<AppState>,
    auth: AdminAuth,
) -> Result<Json<ApiResponse<Vec<Session>>>, ApiError> {
    let sessions = state.auth.list_sessions(auth.session.admin_id).await?;
    Ok(Json(ApiResponse::ok(sessions)))
}

/// POST /api/admin/sessions/revoke
///
/// Revoking another admin's sessions requires `security:manage`.
pub async fn revoke_sessions(
    State(state): State<AppState>,
    auth: AdminAuth,
    ValidatedJson(body): ValidatedJson<RevokeSessionsBody>,
) -> Result<Json<ApiResponse<RevokeResponse>>, ApiError> {
    let target = body.admin_id.unwrap_or(auth.session.admin_id);
    if target != auth.session.admin_id {
        auth.require(&state, permissions::SECURITY_MANAGE).await?;
    }

    let revoked = state.auth.revoke_all_sessions(target, &auth.actor()).await?;
    Ok(Json(ApiResponse::ok(RevokeResponse { revoked })))
}
