//! Audit trail query, search, statistics and export.

use axum::extract::State;
use axum::http::header;
use axum::response::{IntoResponse, Response};
use axum::Json;

use adminguard_auth::ExportFormat;
use adminguard_entity::account::role::permissions;
use adminguard_entity::audit::{AuditLogEntry, AuditStats};

use crate::dto::ValidatedQuery;
use crate::dto::request::{AuditQuery, ExportQuery, SearchQuery};
use crate::dto::response::ApiResponse;
use crate::error::ApiError;
use crate::extractors::AdminAuth;
use crate::state::AppState;

/// GET /api/admin/audit
pub async fn list_audit(
    State(state): State<AppState>,
    auth: AdminAuth,
    ValidatedQuery(query): ValidatedQuery<AuditQuery>,
) -> Result<Json<ApiResponse<Vec<AuditLogEntry>>>, ApiError> {
    auth.require(&state, permissions::AUDIT_READ).await?;
    let entries = state.auth.get_audit_logs(&query.into()).await;
    Ok(Json(ApiResponse::ok(entries)))
}

/// GET /api/admin/audit/search?q=
pub async fn search_audit(
    State(state): State<AppState>,
    auth: AdminAuth,
    ValidatedQuery(query): ValidatedQuery<SearchQuery>,
) -> Result<Json<ApiResponse<Vec<AuditLogEntry>>>, ApiError> {
    auth.require(&state, permissions::AUDIT_READ).await?;
    let entries = state.auth.audit().search_logs(&query.q).await;
    Ok(Json(ApiResponse::ok(entries)))
}

/// GET /api/admin/audit/stats
pub async fn audit_stats(
    State(state): State<AppState>,
    auth: AdminAuth,
) -> Result<Json<ApiResponse<AuditStats>>, ApiError> {
    auth.require(&state, permissions::AUDIT_READ).await?;
    Ok(Json(ApiResponse::ok(state.auth.audit().get_stats().await)))
}

/// GET /api/admin/audit/export?format=json|csv
pub async fn export_audit(
    State(state): State<AppState>,
    auth: AdminAuth,
    ValidatedQuery(query): ValidatedQuery<ExportQuery>,
) -> Result<Response, ApiError> {
    auth.require(&state, permissions::AUDIT_READ).await?;
    let format = match query.format.as_deref() {
        Some(raw) => raw.parse::<ExportFormat>()?,
        None => ExportFormat::Json,
    };

    let body = state.auth.export_audit_logs(format).await?;
    let disposition = format!(
        "attachment; filename=\"audit-logs.{}\"",
        format.extension()
    );

    Ok((
        [
            (header::CONTENT_TYPE, format.content_type().to_string()),
            (header::CONTENT_DISPOSITION, disposition),
        ],
        body,
    )
        .into_response())
}
