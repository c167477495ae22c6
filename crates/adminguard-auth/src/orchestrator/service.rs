//! Authentication orchestrator.
//!
//! Every call to [`AuthOrchestrator::login`], [`AuthOrchestrator::logout`]
//! and [`AuthOrchestrator::refresh_token`] writes exactly one audit entry,
//! whichever branch it ends in. Failed logins additionally produce exactly
//! one security-monitor observation; successful logins produce one as well.
//! Unexpected failures are logged with their cause and surface to the caller
//! as a generic `INTERNAL_ERROR`.

use std::future::Future;
use std::sync::Arc;
use std::time::Duration as StdDuration;

use chrono::Duration;
use serde_json::{Map, Value, json};
use tracing::{error, info, warn};

use adminguard_core::config::AppConfig;
use adminguard_core::error::{AppError, ErrorKind};
use adminguard_core::result::AppResult;
use adminguard_core::traits::{CredentialVerifier, MfaVerifier};
use adminguard_core::types::{AdminId, Clock, SessionId};
use adminguard_entity::account::AdminAccount;
use adminguard_entity::audit::{AuditAction, AuditFilter, AuditLogEntry, NewAuditEntry};
use adminguard_entity::security::{BlockedIp, SecurityMetrics, TimeRange};
use adminguard_entity::session::Session;

use crate::account::AccountStore;
use crate::audit::{AuditLogger, ExportFormat};
use crate::context::{Actor, ClientInfo};
use crate::jwt::TokenService;
use crate::monitor::SecurityMonitor;
use crate::rate_limit::RateLimiter;
use crate::session::{SessionCleanup, SessionRegistry};

use super::components::AuthComponents;
use super::outcome::{LoginOutcome, LoginRequest, LoginSuccess, RefreshedTokens};

/// Message returned for every unexpected failure.
const INTERNAL_MESSAGE: &str = "An internal error occurred";

/// Terminal failure of a flow.
enum FlowError {
    /// The branch already wrote its audit entry.
    Audited(AppError),
    /// Raised by a collaborator; the caller must audit it.
    Unaudited(AppError),
}

impl From<AppError> for FlowError {
    fn from(err: AppError) -> Self {
        Self::Unaudited(err)
    }
}

/// Composes rate limiting, IP blocking, account checks, credential and MFA
/// verification, token issuance, the session table and the audit trail.
#[derive(Debug, Clone)]
pub struct AuthOrchestrator {
    accounts: Arc<dyn AccountStore>,
    credentials: Arc<dyn CredentialVerifier>,
    mfa: Arc<dyn MfaVerifier>,
    tokens: TokenService,
    sessions: SessionRegistry,
    rate_limiter: RateLimiter,
    monitor: Arc<SecurityMonitor>,
    audit: Arc<AuditLogger>,
    clock: Arc<dyn Clock>,
    max_login_attempts: u32,
    lockout: Duration,
    lookup_timeout: StdDuration,
}

impl AuthOrchestrator {
    /// Wires every component from configuration.
    pub fn new(config: &AppConfig, components: AuthComponents) -> Self {
        let clock = components.clock;
        let audit = Arc::new(AuditLogger::new(
            &config.audit,
            components.audit_sink,
            clock.clone(),
        ));
        let monitor = Arc::new(SecurityMonitor::new(
            &config.monitor,
            audit.clone(),
            clock.clone(),
        ));

        Self {
            accounts: components.accounts,
            credentials: components.credentials,
            mfa: components.mfa,
            tokens: TokenService::new(&config.auth, clock.clone()),
            sessions: SessionRegistry::new(&config.session, components.session_store, clock.clone()),
            rate_limiter: RateLimiter::new(&config.rate_limit, components.counter_store, clock.clone()),
            monitor,
            audit,
            clock,
            max_login_attempts: config.auth.max_login_attempts,
            lockout: Duration::minutes(config.auth.lockout_duration_minutes as i64),
            lookup_timeout: StdDuration::from_millis(config.auth.account_lookup_timeout_ms),
        }
    }

    /// The audit trail.
    pub fn audit(&self) -> &Arc<AuditLogger> {
        &self.audit
    }

    /// The security monitor.
    pub fn monitor(&self) -> &Arc<SecurityMonitor> {
        &self.monitor
    }

    /// The session registry.
    pub fn sessions(&self) -> &SessionRegistry {
        &self.sessions
    }

    /// The rate limiter.
    pub fn rate_limiter(&self) -> &RateLimiter {
        &self.rate_limiter
    }

    /// The token service.
    pub fn tokens(&self) -> &TokenService {
        &self.tokens
    }

    /// Background sweep over this orchestrator's state.
    pub fn cleanup_task(&self) -> SessionCleanup {
        SessionCleanup::new(
            self.sessions.clone(),
            self.rate_limiter.clone(),
            self.monitor.clone(),
        )
    }

    // ── Login ───────────────────────────────────────────────────────────

    /// Authenticates an admin.
    ///
    /// Checks run in order: IP block, rate limit, account lookup, lock,
    /// active flag, password, second factor. A verified password on an
    /// MFA-enabled account without a code yields [`LoginOutcome::MfaRequired`].
    pub async fn login(&self, request: LoginRequest, client: &ClientInfo) -> AppResult<LoginOutcome> {
        let email = request.email.trim().to_lowercase();

        match self.login_flow(&email, &request, client).await {
            Ok(outcome) => Ok(outcome),
            Err(FlowError::Audited(err)) => Err(err),
            Err(FlowError::Unaudited(err)) => {
                error!(email = %email, ip = %client.ip_address, error = %err, "Login failed internally");
                self.audit
                    .log(
                        NewAuditEntry::new(AuditAction::LoginError)
                            .admin(None, email.clone())
                            .client(client.ip_address.clone(), client.user_agent.clone())
                            .failed(err.message.clone()),
                    )
                    .await;
                self.monitor
                    .record_login_attempt(
                        &email,
                        &client.ip_address,
                        &client.user_agent,
                        false,
                        json!({ "reason": ErrorKind::Internal.code() }),
                    )
                    .await;
                Err(AppError::internal(INTERNAL_MESSAGE))
            }
        }
    }

    async fn login_flow(
        &self,
        email: &str,
        request: &LoginRequest,
        client: &ClientInfo,
    ) -> Result<LoginOutcome, FlowError> {
        if self.monitor.is_ip_blocked(&client.ip_address) {
            let err = AppError::ip_blocked("Access from this IP address is blocked");
            return Err(self
                .deny_login(err, AuditAction::LoginIpBlocked, email, None, client, Map::new())
                .await);
        }

        let rate_key = RateLimiter::login_key(email, &client.ip_address);
        let Some(admission) = self.rate_limiter.admit(&rate_key).await? else {
            let err = AppError::rate_limited("Too many login attempts, try again later");
            return Err(self
                .deny_login(err, AuditAction::LoginRateLimited, email, None, client, Map::new())
                .await);
        };

        let Some(account) = self.bounded(self.accounts.find_by_email(email)).await? else {
            self.credentials.verify_absent(&request.password)?;
            let mut details = Map::new();
            details.insert("reason".into(), json!("unknown_account"));
            return Err(self
                .deny_login(
                    AppError::invalid_credentials(),
                    AuditAction::FailedLogin,
                    email,
                    None,
                    client,
                    details,
                )
                .await);
        };

        let now = self.clock.now();
        if let Some(locked_until) = account.locked_until.filter(|until| now < *until) {
            return Err(self.deny_locked(&account, locked_until, client).await);
        }

        if !account.is_active {
            let err = AppError::account_inactive("Account is inactive");
            return Err(self
                .deny_login(
                    err,
                    AuditAction::LoginDeniedInactive,
                    email,
                    Some(account.id),
                    client,
                    Map::new(),
                )
                .await);
        }

        if !self.credentials.verify(&request.password, &account.password_hash)? {
            return Err(self.handle_failed_password(&account, client).await?);
        }

        if account.mfa_enabled {
            match request.mfa_token.as_deref().map(str::trim).filter(|t| !t.is_empty()) {
                None => {
                    self.audit
                        .log(
                            NewAuditEntry::new(AuditAction::MfaRequired)
                                .admin(Some(account.id), account.email.clone())
                                .client(client.ip_address.clone(), client.user_agent.clone())
                                .failed("Second factor required"),
                        )
                        .await;
                    return Ok(LoginOutcome::MfaRequired);
                }
                Some(code) => {
                    let Some(secret) = account
                        .mfa_secret
                        .as_deref()
                        .map(str::trim)
                        .filter(|s| !s.is_empty())
                    else {
                        error!(admin_id = %account.id, "MFA enabled without a secret, denying login");
                        let mut details = Map::new();
                        details.insert("reason".into(), json!("mfa_secret_missing"));
                        let err = AppError::invalid_mfa("Invalid second-factor code");
                        return Err(self
                            .deny_login(
                                err,
                                AuditAction::InvalidMfa,
                                email,
                                Some(account.id),
                                client,
                                details,
                            )
                            .await);
                    };
                    if !self.mfa.verify(secret, code, now)? {
                        let err = AppError::invalid_mfa("Invalid second-factor code");
                        return Err(self
                            .deny_login(
                                err,
                                AuditAction::InvalidMfa,
                                email,
                                Some(account.id),
                                client,
                                Map::new(),
                            )
                            .await);
                    }
                }
            }
        }

        let now = self.clock.now();
        if !self.bounded(self.accounts.record_successful_login(account.id, now)).await? {
            // A concurrent failure locked the account after it was read.
            let locked_until = self
                .bounded(self.accounts.find_by_id(account.id))
                .await?
                .and_then(|a| a.locked_until)
                .unwrap_or(now + self.lockout);
            return Err(self.deny_locked(&account, locked_until, client).await);
        }

        let session_id = self.tokens.generate_session_id();
        let pair = self.tokens.issue_pair(&account, &session_id)?;
        let session = self.sessions.create(session_id, &account, client).await?;

        self.rate_limiter.record_success(&admission).await?;
        self.monitor
            .record_login_attempt(email, &client.ip_address, &client.user_agent, true, Value::Null)
            .await;
        self.audit
            .log(
                NewAuditEntry::new(AuditAction::LoginSuccess)
                    .admin(Some(account.id), account.email.clone())
                    .client(client.ip_address.clone(), client.user_agent.clone())
                    .detail("expiresAt", session.expires_at.to_rfc3339())
                    .detail("mfa", account.mfa_enabled),
            )
            .await;

        info!(admin_id = %account.id, ip = %client.ip_address, "Admin logged in");

        Ok(LoginOutcome::Authenticated(LoginSuccess {
            token: pair.access_token,
            refresh_token: pair.refresh_token,
            session_id: session.session_id,
            expires_at: session.expires_at,
            admin: account.profile(),
        }))
    }

    /// Counts a wrong password and locks the account on the threshold.
    async fn handle_failed_password(
        &self,
        account: &AdminAccount,
        client: &ClientInfo,
    ) -> Result<FlowError, FlowError> {
        let now = self.clock.now();
        let outcome = self
            .bounded(self.accounts.record_failed_login(
                account.id,
                self.max_login_attempts,
                now + self.lockout,
                now,
            ))
            .await?;

        let mut details = Map::new();
        details.insert("failedAttempts".into(), json!(outcome.attempts));

        let action = if outcome.newly_locked {
            if let Some(until) = outcome.locked_until {
                details.insert("lockedUntil".into(), json!(until.to_rfc3339()));
            }
            warn!(admin_id = %account.id, attempts = outcome.attempts, "Account locked after failed logins");
            AuditAction::AccountLocked
        } else {
            let remaining = self.max_login_attempts.saturating_sub(outcome.attempts);
            details.insert("remainingAttempts".into(), json!(remaining));
            AuditAction::FailedLogin
        };

        Ok(self
            .deny_login(
                AppError::invalid_credentials(),
                action,
                &account.email,
                Some(account.id),
                client,
                details,
            )
            .await)
    }

    async fn deny_locked(
        &self,
        account: &AdminAccount,
        locked_until: chrono::DateTime<chrono::Utc>,
        client: &ClientInfo,
    ) -> FlowError {
        let until = locked_until.to_rfc3339();
        let err = AppError::account_locked("Account is temporarily locked")
            .with_details(json!({ "lockedUntil": until }));
        let mut details = Map::new();
        details.insert("lockedUntil".into(), json!(until));
        self.deny_login(
            err,
            AuditAction::LoginDeniedLocked,
            &account.email,
            Some(account.id),
            client,
            details,
        )
        .await
    }

    /// Writes the audit entry and monitor observation of a failed login.
    async fn deny_login(
        &self,
        err: AppError,
        action: AuditAction,
        email: &str,
        admin_id: Option<AdminId>,
        client: &ClientInfo,
        details: Map<String, Value>,
    ) -> FlowError {
        let mut entry = NewAuditEntry::new(action)
            .admin(admin_id, email)
            .client(client.ip_address.clone(), client.user_agent.clone())
            .failed(err.message.clone());
        entry.details.extend(details);
        self.audit.log(entry).await;

        self.monitor
            .record_login_attempt(
                email,
                &client.ip_address,
                &client.user_agent,
                false,
                json!({ "reason": err.code() }),
            )
            .await;

        FlowError::Audited(err)
    }

    // ── Logout ──────────────────────────────────────────────────────────

    /// Ends a session. Logging out an unknown session is a no-op.
    pub async fn logout(&self, session_id: &SessionId, client: &ClientInfo) -> AppResult<()> {
        let removed = self.sessions.remove(session_id).await;
        let entry = NewAuditEntry::new(AuditAction::Logout)
            .client(client.ip_address.clone(), client.user_agent.clone());

        match removed {
            Ok(session) => {
                let entry = match &session {
                    Some(s) => entry.admin(Some(s.admin_id), s.email.clone()),
                    None => entry,
                };
                self.audit
                    .log(entry.detail("sessionFound", session.is_some()))
                    .await;
                Ok(())
            }
            Err(err) => {
                error!(error = %err, "Logout failed internally");
                self.audit.log(entry.failed(err.message.clone())).await;
                Err(AppError::internal(INTERNAL_MESSAGE))
            }
        }
    }

    // ── Refresh ─────────────────────────────────────────────────────────

    /// Exchanges a refresh token for a new session and token pair. The old
    /// session id stops validating before the new one starts.
    pub async fn refresh_token(
        &self,
        refresh_token: &str,
        client: &ClientInfo,
    ) -> AppResult<RefreshedTokens> {
        match self.refresh_flow(refresh_token, client).await {
            Ok(tokens) => Ok(tokens),
            Err(FlowError::Audited(err)) => Err(err),
            Err(FlowError::Unaudited(err)) => {
                error!(ip = %client.ip_address, error = %err, "Token refresh failed internally");
                self.audit
                    .log(
                        NewAuditEntry::new(AuditAction::TokenRefreshFailed)
                            .client(client.ip_address.clone(), client.user_agent.clone())
                            .failed(err.message.clone()),
                    )
                    .await;
                Err(AppError::internal(INTERNAL_MESSAGE))
            }
        }
    }

    async fn refresh_flow(
        &self,
        refresh_token: &str,
        client: &ClientInfo,
    ) -> Result<RefreshedTokens, FlowError> {
        let claims = match self.tokens.verify_refresh_token(refresh_token) {
            Ok(claims) => claims,
            Err(e) => {
                let err = AppError::refresh_failed("Invalid or expired refresh token")
                    .with_details(json!({ "reason": e.code() }));
                return Err(self.deny_refresh(err, None, "", client).await);
            }
        };

        let session = match self.sessions.validate_session(&claims.sid).await? {
            Some(session) if session.admin_id == claims.sub => session,
            _ => {
                let err = AppError::session_expired("Session has expired");
                return Err(self.deny_refresh(err, Some(claims.sub), "", client).await);
            }
        };

        let account = self
            .bounded(self.accounts.find_by_id(claims.sub))
            .await?
            .filter(|a| a.is_active);
        let Some(account) = account else {
            self.sessions.remove(&session.session_id).await?;
            let err = AppError::admin_not_found("Admin account not found or inactive");
            return Err(self
                .deny_refresh(err, Some(session.admin_id), &session.email, client)
                .await);
        };

        let new_id = self.tokens.generate_session_id();
        let pair = self.tokens.issue_pair(&account, &new_id)?;
        let Some(rotated) = self
            .sessions
            .rotate(&session, new_id, &account, client)
            .await?
        else {
            let err = AppError::session_expired("Session has expired");
            return Err(self
                .deny_refresh(err, Some(account.id), &account.email, client)
                .await);
        };

        self.audit
            .log(
                NewAuditEntry::new(AuditAction::TokenRefresh)
                    .admin(Some(account.id), account.email.clone())
                    .client(client.ip_address.clone(), client.user_agent.clone())
                    .detail("expiresAt", rotated.expires_at.to_rfc3339()),
            )
            .await;

        Ok(RefreshedTokens {
            access_token: pair.access_token,
            refresh_token: pair.refresh_token,
            session_id: rotated.session_id,
            expires_at: rotated.expires_at,
        })
    }

    async fn deny_refresh(
        &self,
        err: AppError,
        admin_id: Option<AdminId>,
        email: &str,
        client: &ClientInfo,
    ) -> FlowError {
        let mut entry = NewAuditEntry::new(AuditAction::TokenRefreshFailed)
            .admin(admin_id, email)
            .client(client.ip_address.clone(), client.user_agent.clone())
            .detail("code", err.code())
            .failed(err.message.clone());
        if let Some(Value::Object(details)) = &err.details {
            entry.details.extend(details.clone());
        }
        self.audit.log(entry).await;
        FlowError::Audited(err)
    }

    // ── Sessions ────────────────────────────────────────────────────────

    /// The live session for `session_id`, or `None`.
    pub async fn validate_session(&self, session_id: &SessionId) -> AppResult<Option<Session>> {
        self.sessions.validate_session(session_id).await
    }

    /// Verifies an access token and requires its session to be live.
    pub async fn authenticate(&self, access_token: &str) -> AppResult<Session> {
        let claims = self.tokens.verify_access_token(access_token)?;
        match self.sessions.validate_session(&claims.sid).await? {
            Some(session) if session.admin_id == claims.sub => Ok(session),
            _ => Err(AppError::session_not_found("Session not found or expired")),
        }
    }

    /// Fails with `FORBIDDEN` unless `session` grants `permission`. A refusal
    /// is audited with the attempted `operation`.
    pub async fn authorize(
        &self,
        session: &Session,
        actor: &Actor,
        permission: &str,
        operation: &str,
    ) -> AppResult<()> {
        if session.has_permission(permission) {
            return Ok(());
        }

        let err = AppError::forbidden(format!("Permission '{permission}' required"));
        warn!(admin_id = %actor.admin_id, permission, operation, "Administrative access denied");
        self.audit
            .log(
                NewAuditEntry::new(AuditAction::AccessDenied)
                    .admin(Some(actor.admin_id), actor.email.clone())
                    .client(actor.client.ip_address.clone(), actor.client.user_agent.clone())
                    .resource_id(operation)
                    .detail("permission", permission)
                    .failed(err.message.clone()),
            )
            .await;
        Err(err)
    }

    /// Removes every session of `admin_id` and writes one summary entry.
    pub async fn revoke_all_sessions(&self, admin_id: AdminId, actor: &Actor) -> AppResult<usize> {
        let revoked = self.sessions.revoke_all(admin_id).await?;
        self.audit
            .log(
                NewAuditEntry::new(AuditAction::RevokeAllSessions)
                    .admin(Some(actor.admin_id), actor.email.clone())
                    .client(actor.client.ip_address.clone(), actor.client.user_agent.clone())
                    .resource_id(admin_id.to_string())
                    .detail("revokedSessions", revoked),
            )
            .await;
        Ok(revoked)
    }

    /// Live sessions of one admin.
    pub async fn list_sessions(&self, admin_id: AdminId) -> AppResult<Vec<Session>> {
        self.sessions.list_sessions(admin_id).await
    }

    // ── Security and audit surface ──────────────────────────────────────

    /// Blocks an IP on behalf of `actor`.
    pub async fn block_ip(&self, ip: &str, reason: &str, actor: &Actor) -> AppResult<BlockedIp> {
        self.monitor.block_ip(ip, reason, actor).await
    }

    /// Unblocks an IP on behalf of `actor`. Returns whether it was blocked.
    pub async fn unblock_ip(&self, ip: &str, actor: &Actor) -> bool {
        self.monitor.unblock_ip(ip, actor).await
    }

    /// Filtered audit entries, newest first.
    pub async fn get_audit_logs(&self, filter: &AuditFilter) -> Vec<AuditLogEntry> {
        self.audit.get_logs(filter).await
    }

    /// The audit trail encoded as `format`.
    pub async fn export_audit_logs(&self, format: ExportFormat) -> AppResult<String> {
        self.audit.export_logs(format).await
    }

    /// Monitor metrics over `range`.
    pub async fn get_security_metrics(&self, range: TimeRange) -> SecurityMetrics {
        self.monitor.get_security_metrics(range).await
    }

    /// Bounds an account-store call. No in-memory lock is held while it runs.
    async fn bounded<T>(&self, call: impl Future<Output = AppResult<T>>) -> AppResult<T> {
        tokio::time::timeout(self.lookup_timeout, call)
            .await
            .map_err(|_| AppError::external("Account store timed out"))?
    }
}
