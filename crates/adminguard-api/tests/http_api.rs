//! End-to-end HTTP tests driving the router in-process.

use std::sync::Arc;

use axum::Router;
use axum::body::Body;
use axum::http::{Request, StatusCode, header};
use http_body_util::BodyExt;
use serde_json::{Value, json};
use tower::ServiceExt;

use adminguard_api::{AppState, build_app};
use adminguard_auth::{AuthComponents, AuthOrchestrator, MemoryAccountStore, PasswordHasher};
use adminguard_core::config::AppConfig;
use adminguard_core::config::audit::AuditSinkKind;
use adminguard_core::types::{Clock, ManualClock, SystemClock};
use adminguard_entity::account::{AdminAccount, Role, role::permissions};

const PASSWORD: &str = "correct horse battery staple";
const ROOT: &str = "root@example.com";
const VIEWER: &str = "viewer@example.com";

fn app() -> Router {
    app_with_forwarding(true)
}

fn app_with_forwarding(trust_forwarded_for: bool) -> Router {
    build(trust_forwarded_for, Arc::new(SystemClock))
}

fn build(trust_forwarded_for: bool, clock: Arc<dyn Clock>) -> Router {
    let mut config = AppConfig::default();
    config.auth.jwt_secret = "http-test-secret-that-is-long-enough-for-hs256".to_string();
    config.audit.sink = AuditSinkKind::None;
    config.server.trust_forwarded_for = trust_forwarded_for;

    let hash = PasswordHasher::new().hash_password(PASSWORD).unwrap();
    let accounts = Arc::new(MemoryAccountStore::new());
    accounts
        .insert(AdminAccount::new(
            ROOT,
            hash.clone(),
            vec![Role::new(
                "super_admin",
                [permissions::SECURITY_MANAGE, permissions::AUDIT_READ],
            )],
        ))
        .unwrap();
    accounts
        .insert(AdminAccount::new(
            VIEWER,
            hash,
            vec![Role::new("viewer", Vec::<String>::new())],
        ))
        .unwrap();

    let components = AuthComponents::in_memory(&config, accounts, clock);
    let orchestrator = AuthOrchestrator::new(&config, components);
    build_app(AppState::new(Arc::new(config), orchestrator))
}

async fn send(app: &Router, request: Request<Body>) -> (StatusCode, Value) {
    let response = app.clone().oneshot(request).await.unwrap();
    let status = response.status();
    let bytes = response.into_body().collect().await.unwrap().to_bytes();
    let body = serde_json::from_slice(&bytes).unwrap_or(Value::Null);
    (status, body)
}

fn post_json(uri: &str, body: Value) -> Request<Body> {
    Request::post(uri)
        .header(header::CONTENT_TYPE, "application/json")
        .header("x-forwarded-for", "198.51.100.20")
        .header(header::USER_AGENT, "http-test")
        .body(Body::from(body.to_string()))
        .unwrap()
}

fn authed(method: &str, uri: &str, token: &str, body: Option<Value>) -> Request<Body> {
    let builder = Request::builder()
        .method(method)
        .uri(uri)
        .header(header::AUTHORIZATION, format!("Bearer {token}"))
        .header("x-forwarded-for", "198.51.100.20");
    match body {
        Some(body) => builder
            .header(header::CONTENT_TYPE, "application/json")
            .body(Body::from(body.to_string()))
            .unwrap(),
        None => builder.body(Body::empty()).unwrap(),
    }
}

async fn login(app: &Router, email: &str) -> String {
    let (status, body) = send(
        app,
        post_json("/api/auth/login", json!({ "email": email, "password": PASSWORD })),
    )
    .await;
    assert_eq!(status, StatusCode::OK, "{body}");
    body["token"].as_str().unwrap().to_string()
}

#[tokio::test]
async fn test_health() {
    let app = app();
    let (status, body) = send(
        &app,
        Request::get("/api/health").body(Body::empty()).unwrap(),
    )
    .await;
    assert_eq!(status, StatusCode::OK);
    assert_eq!(body["data"]["status"], "ok");
}

#[tokio::test]
async fn test_login_session_logout() {
    let app = app();
    let (status, body) = send(
        &app,
        post_json("/api/auth/login", json!({ "email": ROOT, "password": PASSWORD })),
    )
    .await;
    assert_eq!(status, StatusCode::OK);
    assert_eq!(body["success"], true);
    assert_eq!(body["requiresMfa"], false);
    assert_eq!(body["admin"]["email"], ROOT);
    assert!(body["admin"].get("passwordHash").is_none());
    let token = body["token"].as_str().unwrap().to_string();

    let (status, body) = send(&app, authed("GET", "/api/auth/session", &token, None)).await;
    assert_eq!(status, StatusCode::OK);
    assert_eq!(body["data"]["ipAddress"], "198.51.100.20");

    let (status, _) = send(&app, authed("POST", "/api/auth/logout", &token, None)).await;
    assert_eq!(status, StatusCode::OK);

    let (status, body) = send(&app, authed("GET", "/api/auth/session", &token, None)).await;
    assert_eq!(status, StatusCode::UNAUTHORIZED);
    assert_eq!(body["error"], "SESSION_NOT_FOUND");

    // Logout stays idempotent.
    let (status, _) = send(&app, authed("POST", "/api/auth/logout", &token, None)).await;
    assert_eq!(status, StatusCode::OK);
}

#[tokio::test]
async fn test_logout_after_expiry_is_audited() {
    let clock = ManualClock::starting_now();
    let app = build(true, Arc::new(clock.clone()));
    let stale = login(&app, ROOT).await;

    clock.advance(chrono::Duration::minutes(16));
    let (status, body) = send(&app, authed("GET", "/api/auth/session", &stale, None)).await;
    assert_eq!(status, StatusCode::UNAUTHORIZED);
    assert_eq!(body["error"], "TOKEN_EXPIRED");

    let (status, _) = send(&app, authed("POST", "/api/auth/logout", &stale, None)).await;
    assert_eq!(status, StatusCode::OK);

    let token = login(&app, ROOT).await;
    let (status, body) = send(
        &app,
        authed("GET", "/api/admin/audit?action=LOGOUT", &token, None),
    )
    .await;
    assert_eq!(status, StatusCode::OK);
    assert_eq!(body["data"].as_array().unwrap().len(), 1);
}

#[tokio::test]
async fn test_wrong_password_is_401() {
    let app = app();
    let (status, body) = send(
        &app,
        post_json("/api/auth/login", json!({ "email": ROOT, "password": "nope" })),
    )
    .await;
    assert_eq!(status, StatusCode::UNAUTHORIZED);
    assert_eq!(body["error"], "INVALID_CREDENTIALS");
}

#[tokio::test]
async fn test_malformed_login_is_rejected() {
    let app = app();
    let (status, body) = send(
        &app,
        post_json("/api/auth/login", json!({ "email": "not-an-email", "password": "" })),
    )
    .await;
    assert_eq!(status, StatusCode::BAD_REQUEST);
    assert_eq!(body["error"], "VALIDATION_ERROR");
    assert!(body["details"]["fields"]["email"].is_array());
}

#[tokio::test]
async fn test_refresh_returns_new_pair() {
    let app = app();
    let (_, body) = send(
        &app,
        post_json("/api/auth/login", json!({ "email": ROOT, "password": PASSWORD })),
    )
    .await;
    let refresh = body["refreshToken"].as_str().unwrap().to_string();

    let (status, body) = send(
        &app,
        post_json("/api/auth/refresh", json!({ "refreshToken": refresh })),
    )
    .await;
    assert_eq!(status, StatusCode::OK);
    assert!(body["data"]["accessToken"].is_string());

    let (status, body) = send(
        &app,
        post_json("/api/auth/refresh", json!({ "refreshToken": refresh })),
    )
    .await;
    assert_eq!(status, StatusCode::UNAUTHORIZED);
    assert_eq!(body["error"], "SESSION_EXPIRED");
}

#[tokio::test]
async fn test_missing_token_is_401() {
    let app = app();
    let (status, body) = send(
        &app,
        Request::get("/api/admin/audit").body(Body::empty()).unwrap(),
    )
    .await;
    assert_eq!(status, StatusCode::UNAUTHORIZED);
    assert_eq!(body["error"], "TOKEN_INVALID");
}

#[tokio::test]
async fn test_admin_routes_require_permission() {
    let app = app();
    let token = login(&app, VIEWER).await;

    let (status, body) = send(&app, authed("GET", "/api/admin/audit", &token, None)).await;
    assert_eq!(status, StatusCode::FORBIDDEN);
    assert_eq!(body["error"], "FORBIDDEN");

    let (status, _) = send(&app, authed("GET", "/api/admin/ip-blocks", &token, None)).await;
    assert_eq!(status, StatusCode::FORBIDDEN);

    let root = login(&app, ROOT).await;
    let (status, body) = send(
        &app,
        authed("GET", "/api/admin/audit?action=ACCESS_DENIED", &root, None),
    )
    .await;
    assert_eq!(status, StatusCode::OK);
    let denied = body["data"].as_array().unwrap();
    assert_eq!(denied.len(), 2);
    assert!(denied.iter().all(|e| e["adminEmail"] == VIEWER && e["success"] == false));
    let mut operations: Vec<&str> = denied.iter().map(|e| e["resourceId"].as_str().unwrap()).collect();
    operations.sort();
    assert_eq!(operations, ["GET /api/admin/audit", "GET /api/admin/ip-blocks"]);

    // Own sessions never need a permission.
    let (status, body) = send(
        &app,
        authed("POST", "/api/admin/sessions/revoke", &token, Some(json!({}))),
    )
    .await;
    assert_eq!(status, StatusCode::OK);
    assert_eq!(body["data"]["revoked"], 1);
}

#[tokio::test]
async fn test_audit_query_records_forwarded_ip() {
    let app = app();
    let token = login(&app, ROOT).await;

    let (status, body) = send(
        &app,
        authed("GET", "/api/admin/audit?action=LOGIN_SUCCESS&limit=5", &token, None),
    )
    .await;
    assert_eq!(status, StatusCode::OK);
    let entries = body["data"].as_array().unwrap();
    assert_eq!(entries.len(), 1);
    assert_eq!(entries[0]["ipAddress"], "198.51.100.20");
    assert_eq!(entries[0]["userAgent"], "http-test");
    assert_eq!(entries[0]["adminEmail"], ROOT);
}

#[tokio::test]
async fn test_block_ip_denies_login_from_address() {
    let app = app();
    let token = login(&app, ROOT).await;

    let (status, body) = send(
        &app,
        authed(
            "POST",
            "/api/admin/ip-blocks",
            &token,
            Some(json!({ "ipAddress": "203.0.113.9", "reason": "scanner" })),
        ),
    )
    .await;
    assert_eq!(status, StatusCode::OK, "{body}");
    assert_eq!(body["data"]["automatic"], false);

    let request = Request::post("/api/auth/login")
        .header(header::CONTENT_TYPE, "application/json")
        .header("x-forwarded-for", "203.0.113.9, 10.0.0.1")
        .body(Body::from(
            json!({ "email": ROOT, "password": PASSWORD }).to_string(),
        ))
        .unwrap();
    let (status, body) = send(&app, request).await;
    assert_eq!(status, StatusCode::FORBIDDEN);
    assert_eq!(body["error"], "IP_BLOCKED");

    let (status, _) = send(
        &app,
        authed("DELETE", "/api/admin/ip-blocks/203.0.113.9", &token, None),
    )
    .await;
    assert_eq!(status, StatusCode::OK);

    let (status, body) = send(
        &app,
        authed("DELETE", "/api/admin/ip-blocks/203.0.113.9", &token, None),
    )
    .await;
    assert_eq!(status, StatusCode::NOT_FOUND);
    assert_eq!(body["error"], "NOT_FOUND");
}

#[tokio::test]
async fn test_untrusted_forwarded_header_does_not_split_counters() {
    let app = app_with_forwarding(false);
    let token = login(&app, ROOT).await;

    // In-process requests carry no socket address, so every caller is "unknown".
    let (status, body) = send(
        &app,
        authed("GET", "/api/admin/audit?action=LOGIN_SUCCESS&limit=5", &token, None),
    )
    .await;
    assert_eq!(status, StatusCode::OK);
    assert_eq!(body["data"][0]["ipAddress"], "unknown");

    let attempt = |n: u8| {
        Request::post("/api/auth/login")
            .header(header::CONTENT_TYPE, "application/json")
            .header("x-forwarded-for", format!("198.51.100.{n}"))
            .body(Body::from(
                json!({ "email": "ghost@example.com", "password": PASSWORD }).to_string(),
            ))
            .unwrap()
    };

    for n in 0..10 {
        let (status, _) = send(&app, attempt(n)).await;
        assert_eq!(status, StatusCode::UNAUTHORIZED);
    }

    // Ten failures from one real address trip the brute-force block.
    let (status, body) = send(&app, attempt(10)).await;
    assert_eq!(status, StatusCode::FORBIDDEN);
    assert_eq!(body["error"], "IP_BLOCKED");
}

#[tokio::test]
async fn test_csv_export() {
    let app = app();
    let token = login(&app, ROOT).await;

    let response = app
        .clone()
        .oneshot(authed("GET", "/api/admin/audit/export?format=csv", &token, None))
        .await
        .unwrap();
    assert_eq!(response.status(), StatusCode::OK);
    let content_type = response
        .headers()
        .get(header::CONTENT_TYPE)
        .and_then(|v| v.to_str().ok())
        .unwrap_or_default()
        .to_string();
    assert!(content_type.starts_with("text/csv"));

    let bytes = response.into_body().collect().await.unwrap().to_bytes();
    let csv = String::from_utf8(bytes.to_vec()).unwrap();
    assert!(csv.lines().next().unwrap().contains("Admin Email"));
    assert!(csv.contains("LOGIN_SUCCESS"));

    let (status, body) = send(
        &app,
        authed("GET", "/api/admin/audit/export?format=xml", &token, None),
    )
    .await;
    assert_eq!(status, StatusCode::BAD_REQUEST);
    assert_eq!(body["error"], "VALIDATION_ERROR");
}

#[tokio::test]
async fn test_metrics_and_alerts() {
    let app = app();
    let token = login(&app, ROOT).await;

    let (status, body) = send(
        &app,
        authed("GET", "/api/admin/security/metrics?range=hour", &token, None),
    )
    .await;
    assert_eq!(status, StatusCode::OK);
    assert_eq!(body["data"]["totalAttempts"], 1);

    let (status, body) = send(
        &app,
        authed("GET", "/api/admin/alerts?status=active", &token, None),
    )
    .await;
    assert_eq!(status, StatusCode::OK);
    assert_eq!(body["data"].as_array().map(Vec::len), Some(0));

    let (status, body) = send(
        &app,
        authed("POST", "/api/admin/alerts/not-a-uuid/resolve", &token, None),
    )
    .await;
    assert_eq!(status, StatusCode::BAD_REQUEST);
    assert_eq!(body["error"], "VALIDATION_ERROR");
}
