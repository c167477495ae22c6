//! Session expiry, refresh rotation, logout and revocation.

mod common;

use std::time::Duration as StdDuration;

use chrono::Duration;
use tokio::sync::watch;

use adminguard_auth::Actor;
use adminguard_core::ErrorKind;
use adminguard_core::types::SessionId;

use common::*;

#[tokio::test]
async fn test_session_and_access_token_expire_together() {
    let h = Harness::new();
    let login = h.login_ok().await;

    h.clock.advance(Duration::minutes(14));
    let session = h.orchestrator.authenticate(&login.token).await.unwrap();
    assert_eq!(session.session_id, login.session_id);

    h.clock.advance(Duration::minutes(1));
    let err = h.orchestrator.authenticate(&login.token).await.unwrap_err();
    assert_eq!(err.kind, ErrorKind::TokenExpired);
    assert!(
        h.orchestrator
            .validate_session(&login.session_id)
            .await
            .unwrap()
            .is_none()
    );
}

#[tokio::test]
async fn test_tampered_token_is_invalid() {
    let h = Harness::new();
    let login = h.login_ok().await;
    let tampered = format!("{}x", login.token);

    let err = h.orchestrator.authenticate(&tampered).await.unwrap_err();
    assert_eq!(err.kind, ErrorKind::TokenInvalid);

    // A refresh token is not accepted as an access token.
    let err = h
        .orchestrator
        .authenticate(&login.refresh_token)
        .await
        .unwrap_err();
    assert_eq!(err.kind, ErrorKind::TokenInvalid);
}

#[tokio::test]
async fn test_refresh_rotates_session() {
    let h = Harness::new();
    let login = h.login_ok().await;

    h.clock.advance(Duration::minutes(5));
    let refreshed = h
        .orchestrator
        .refresh_token(&login.refresh_token, &client())
        .await
        .unwrap();

    assert_ne!(refreshed.session_id, login.session_id);
    assert!(refreshed.expires_at > login.expires_at);
    assert!(
        h.orchestrator
            .validate_session(&login.session_id)
            .await
            .unwrap()
            .is_none()
    );
    let session = h.orchestrator.authenticate(&refreshed.access_token).await.unwrap();
    assert_eq!(session.session_id, refreshed.session_id);

    // The old access token no longer maps to a live session.
    let err = h.orchestrator.authenticate(&login.token).await.unwrap_err();
    assert_eq!(err.kind, ErrorKind::SessionNotFound);

    // Replaying the old refresh token fails.
    let err = h
        .orchestrator
        .refresh_token(&login.refresh_token, &client())
        .await
        .unwrap_err();
    assert_eq!(err.kind, ErrorKind::SessionExpired);
}

#[tokio::test]
async fn test_concurrent_refresh_has_single_winner() {
    let h = Harness::new();
    let login = h.login_ok().await;

    let caller = client();
    let (a, b) = tokio::join!(
        h.orchestrator.refresh_token(&login.refresh_token, &caller),
        h.orchestrator.refresh_token(&login.refresh_token, &caller),
    );
    assert_eq!([a.is_ok(), b.is_ok()].iter().filter(|ok| **ok).count(), 1);
    assert_eq!(h.orchestrator.sessions().active_session_count().await.unwrap(), 1);
}

#[tokio::test]
async fn test_refresh_after_session_expiry_fails() {
    let h = Harness::new();
    let login = h.login_ok().await;

    h.clock.advance(Duration::minutes(16));
    let err = h
        .orchestrator
        .refresh_token(&login.refresh_token, &client())
        .await
        .unwrap_err();
    assert_eq!(err.kind, ErrorKind::SessionExpired);
}

#[tokio::test]
async fn test_expired_refresh_token_reports_reason() {
    let h = Harness::new();
    let login = h.login_ok().await;

    h.clock.advance(Duration::hours(25));
    let err = h
        .orchestrator
        .refresh_token(&login.refresh_token, &client())
        .await
        .unwrap_err();
    assert_eq!(err.kind, ErrorKind::RefreshFailed);
    let reason = err.details.as_ref().and_then(|d| d.get("reason")).cloned();
    assert_eq!(reason, Some(serde_json::json!("TOKEN_EXPIRED")));

    let garbage = h
        .orchestrator
        .refresh_token("not-a-token", &client())
        .await
        .unwrap_err();
    assert_eq!(garbage.kind, ErrorKind::RefreshFailed);
    let reason = garbage.details.as_ref().and_then(|d| d.get("reason")).cloned();
    assert_eq!(reason, Some(serde_json::json!("TOKEN_INVALID")));
}

#[tokio::test]
async fn test_refresh_for_deactivated_admin_ends_session() {
    let h = Harness::new();
    let login = h.login_ok().await;
    h.accounts.set_active(h.admin.id, false).unwrap();

    let err = h
        .orchestrator
        .refresh_token(&login.refresh_token, &client())
        .await
        .unwrap_err();
    assert_eq!(err.kind, ErrorKind::AdminNotFound);
    assert!(
        h.orchestrator
            .validate_session(&login.session_id)
            .await
            .unwrap()
            .is_none()
    );
}

#[tokio::test]
async fn test_logout_removes_session_and_is_idempotent() {
    let h = Harness::new();
    let login = h.login_ok().await;

    h.orchestrator.logout(&login.session_id, &client()).await.unwrap();
    assert!(
        h.orchestrator
            .validate_session(&login.session_id)
            .await
            .unwrap()
            .is_none()
    );

    h.orchestrator.logout(&login.session_id, &client()).await.unwrap();
    h.orchestrator
        .logout(&SessionId::from_string("never-issued"), &client())
        .await
        .unwrap();

    let logouts = h.entries("LOGOUT").await;
    assert_eq!(logouts.len(), 3);
    assert!(logouts.iter().all(|e| e.success));
    assert_eq!(
        logouts
            .iter()
            .filter(|e| e.details.get("sessionFound") == Some(&serde_json::json!(true)))
            .count(),
        1
    );
}

#[tokio::test]
async fn test_revoke_all_sessions() {
    let h = Harness::new();
    let first = h.login_ok().await;
    let second = h.login_ok().await;
    assert_eq!(h.orchestrator.list_sessions(h.admin.id).await.unwrap().len(), 2);

    let actor = Actor::new(h.admin.id, EMAIL, client());
    let revoked = h
        .orchestrator
        .revoke_all_sessions(h.admin.id, &actor)
        .await
        .unwrap();
    assert_eq!(revoked, 2);

    for token in [&first.token, &second.token] {
        let err = h.orchestrator.authenticate(token).await.unwrap_err();
        assert_eq!(err.kind, ErrorKind::SessionNotFound);
    }

    let entries = h.entries("REVOKE_ALL_SESSIONS").await;
    assert_eq!(entries.len(), 1);
    assert_eq!(entries[0].resource_id.as_deref(), Some(h.admin.id.to_string().as_str()));
}

#[tokio::test]
async fn test_cleanup_sweeps_expired_state() {
    let h = Harness::new();
    h.login_ok().await;
    h.login_ok().await;

    h.clock.advance(Duration::minutes(20));
    let report = h.orchestrator.cleanup_task().run_cleanup().await.unwrap();
    assert_eq!(report.sessions, 2);
    assert_eq!(h.orchestrator.sessions().active_session_count().await.unwrap(), 0);
}

#[tokio::test(start_paused = true)]
async fn test_background_sweep_runs_each_period_and_stops_on_shutdown() {
    let h = Harness::new();
    h.login_ok().await;
    h.login_ok().await;
    h.clock.advance(Duration::minutes(20));

    let (shutdown_tx, shutdown_rx) = watch::channel(false);
    let handle = h
        .orchestrator
        .cleanup_task()
        .spawn(StdDuration::from_secs(60), shutdown_rx);

    tokio::time::sleep(StdDuration::from_secs(61)).await;

    // The background sweep already evicted both sessions.
    let report = h.orchestrator.cleanup_task().run_cleanup().await.unwrap();
    assert_eq!(report.sessions, 0);

    shutdown_tx.send(true).unwrap();
    tokio::time::timeout(StdDuration::from_secs(1), handle)
        .await
        .expect("sweep stops after shutdown")
        .unwrap();
}

#[tokio::test(start_paused = true)]
async fn test_background_sweep_stops_when_sender_dropped() {
    let h = Harness::new();
    let (shutdown_tx, shutdown_rx) = watch::channel(false);
    let handle = h
        .orchestrator
        .cleanup_task()
        .spawn(StdDuration::from_secs(60), shutdown_rx);

    drop(shutdown_tx);
    tokio::time::timeout(StdDuration::from_secs(1), handle)
        .await
        .expect("sweep stops without a sender")
        .unwrap();
}
