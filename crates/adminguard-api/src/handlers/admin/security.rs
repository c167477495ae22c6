//! IP blocks, alerts and security metrics.

use axum::Json;
use axum::extract::{Path, State};

use adminguard_core::error::AppError;
use adminguard_core::types::AlertId;
use adminguard_entity::account::role::permissions;
use adminguard_entity::security::{AlertStatus, BlockedIp, SecurityAlert, SecurityMetrics, TimeRange};

use crate::dto::request::{AlertsQuery, BlockIpBody, MetricsQuery};
use crate::dto::response::{ApiResponse, MessageResponse};
use crate::dto::{ValidatedJson, ValidatedQuery};
use crate::error::ApiError;
use crate::extractors::AdminAuth;
use crate::state::AppState;

/// GET /api/admin/ip-blocks
pub async fn list_blocked_ips(
    State(state): State<AppState>,
    auth: AdminAuth,
) -> Result<Json<ApiResponse<Vec<BlockedIp>>>, ApiError> {
    auth.require(&state, permissions::SECURITY_MANAGE).await?;
    Ok(Json(ApiResponse::ok(state.auth.monitor().list_blocked_ips())))
}

/// POST /api/admin/ip-blocks
pub async fn block_ip(
    State(state): State<AppState>,
    auth: AdminAuth,
    ValidatedJson(body): ValidatedJson<BlockIpBody>,
) -> Result<Json<ApiResponse<BlockedIp>>, ApiError> {
    auth.require(&state, permissions::SECURITY_MANAGE).await?;
    let blocked = state
        .auth
        .block_ip(&body.ip_address, &body.reason, &auth.actor())
        .await?;
    Ok(Json(ApiResponse::ok(blocked)))
}

/// DELETE /api/admin/ip-blocks/{ip}
pub async fn unblock_ip(
    State(state): State<AppState>,
    auth: AdminAuth,
    Path(ip): Path<String>,
) -> Result<Json<ApiResponse<MessageResponse>>, ApiError> {
    auth.require(&state, permissions::SECURITY_MANAGE).await?;
    if !state.auth.unblock_ip(&ip, &auth.actor()).await {
        return Err(AppError::not_found(format!("IP {ip} is not blocked")).into());
    }
    Ok(Json(ApiResponse::ok(MessageResponse::new(format!(
        "IP {ip} unblocked"
    )))))
}

/// GET /api/admin/alerts?status=
pub async fn list_alerts(
    State(state): State<AppState>,
    auth: AdminAuth,
    ValidatedQuery(query): ValidatedQuery<AlertsQuery>,
) -> Result<Json<ApiResponse<Vec<SecurityAlert>>>, ApiError> {
    auth.require(&state, permissions::SECURITY_MANAGE).await?;
    let status = query
        .status
        .as_deref()
        .map(str::parse::<AlertStatus>)
        .transpose()?;
    Ok(Json(ApiResponse::ok(state.auth.monitor().get_alerts(status).await)))
}

/// POST /api/admin/alerts/{id}/acknowledge
pub async fn acknowledge_alert(
    State(state): State<AppState>,
    auth: AdminAuth,
    Path(id): Path<String>,
) -> Result<Json<ApiResponse<SecurityAlert>>, ApiError> {
    auth.require(&state, permissions::SECURITY_MANAGE).await?;
    let alert = state
        .auth
        .monitor()
        .acknowledge_alert(parse_alert_id(&id)?, &auth.actor())
        .await?;
    Ok(Json(ApiResponse::ok(alert)))
}

/// POST /api/admin/alerts/{id}/resolve
pub async fn resolve_alert(
    State(state): State<AppState>,
    auth: AdminAuth,
    Path(id): Path<String>,
) -> Result<Json<ApiResponse<SecurityAlert>>, ApiError> {
    auth.require(&state, permissions::SECURITY_MANAGE).await?;
    let alert = state
        .auth
        .monitor()
        .resolve_alert(parse_alert_id(&id)?, &auth.actor())
        .await?;
    Ok(Json(ApiResponse::ok(alert)))
}

/// GET /api/admin/security/metrics?range=
pub async fn security_metrics(
    State(state): State<AppState>,
    auth: AdminAuth,
    ValidatedQuery(query): ValidatedQuery<MetricsQuery>,
) -> Result<Json<ApiResponse<SecurityMetrics>>, ApiError> {
    auth.require(&state, permissions::SECURITY_MANAGE).await?;
    let range = match query.range.as_deref() {
        Some(raw) => raw.parse::<TimeRange>()?,
        None => TimeRange::default(),
    };
    Ok(Json(ApiResponse::ok(state.auth.get_security_metrics(range).await)))
}

fn parse_alert_id(raw: &str) -> Result<AlertId, AppError> {
    raw.parse()
        .map_err(|_| AppError::validation(format!("Invalid alert id: {raw}")))
}
