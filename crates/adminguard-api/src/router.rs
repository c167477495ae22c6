//! Route definitions for the AdminGuard HTTP API.
//!
//! All routes are organized by domain and mounted under `/api`.

use axum::{
    Router,
    routing::{delete, get, post},
};

use crate::handlers;
use crate::state::AppState;

/// Build the API router with all routes.
pub fn build_router(state: AppState) -> Router {
    let api_routes = Router::new()
        .merge(auth_routes())
        .merge(admin_routes())
        .merge(health_routes());

    Router::new().nest("/api", api_routes).with_state(state)
}

/// Auth endpoints: login, logout, refresh, session
fn auth_routes() -> Router<AppState> {
    Router::new()
        .route("/auth/login", post(handlers::auth::login))
        .route("/auth/logout", post(handlers::auth::logout))
        .route("/auth/refresh", post(handlers::auth::refresh))
        .route("/auth/session", get(handlers::auth::session))
}

/// Admin-only endpoints
fn admin_routes() -> Router<AppState> {
    Router::new()
        // Sessions
        .route(
            "/admin/sessions",
            get(handlers::admin::sessions::list_sessions),
        )
        .route(
            "/admin/sessions/revoke",
            post(handlers::admin::sessions::revoke_sessions),
        )
        // IP blocks
        .route(
            "/admin/ip-blocks",
            get(handlers::admin::security::list_blocked_ips)
                .post(handlers::admin::security::block_ip),
        )
        .route(
            "/admin/ip-blocks/{ip}",
            delete(handlers::admin::security::unblock_ip),
        )
        // Alerts
        .route("/admin/alerts", get(handlers::admin::security::list_alerts))
        .route(
            "/admin/alerts/{id}/acknowledge",
            post(handlers::admin::security::acknowledge_alert),
        )
        .route(
            "/admin/alerts/{id}/resolve",
            post(handlers::admin::security::resolve_alert),
        )
        .route(
            "/admin/security/metrics",
            get(handlers::admin::security::security_metrics),
        )
        // Audit
        .route("/admin/audit", get(handlers::admin::audit::list_audit))
        .route(
            "/admin/audit/search",
            get(handlers::admin::audit::search_audit),
        )
        .route(
            "/admin/audit/stats",
            get(handlers::admin::audit::audit_stats),
        )
        .route(
            "/admin/audit/export",
            get(handlers::admin::audit::export_audit),
        )
}

/// Health check endpoint (no auth required)
fn health_routes() -> Router<AppState> {
    Router::new().route("/health", get(handlers::health::health))
}
