//! Session lifecycle on top of a [`SessionStore`].

use std::sync::Arc;

use chrono::Duration;
use tracing::{debug, info};

use adminguard_core::config::session::SessionConfig;
use adminguard_core::result::AppResult;
use adminguard_core::types::{AdminId, Clock, SessionId};
use adminguard_entity::account::AdminAccount;
use adminguard_entity::session::Session;

use crate::context::ClientInfo;

use super::store::SessionStore;

/// Creates, validates, rotates and revokes sessions.
///
/// A session moves from active to one of expired, revoked or rotated, and
/// each of those is terminal: the id is gone from the table and never comes
/// back.
#[derive(Debug, Clone)]
pub struct SessionRegistry {
    store: Arc<dyn SessionStore>,
    clock: Arc<dyn Clock>,
    ttl: Duration,
}

impl SessionRegistry {
    /// Creates a registry with the configured session lifetime.
    pub fn new(config: &SessionConfig, store: Arc<dyn SessionStore>, clock: Arc<dyn Clock>) -> Self {
        Self {
            store,
            clock,
            ttl: Duration::minutes(config.ttl_minutes as i64),
        }
    }

    /// Session lifetime.
    pub fn ttl(&self) -> Duration {
        self.ttl
    }

    /// Inserts a fresh session for `account` under `session_id`.
    pub async fn create(
        &self,
        session_id: SessionId,
        account: &AdminAccount,
        client: &ClientInfo,
    ) -> AppResult<Session> {
        let now = self.clock.now();
        let session = Session {
            session_id,
            admin_id: account.id,
            email: account.email.clone(),
            roles: account.role_names(),
            permissions: account.permissions(),
            created_at: now,
            expires_at: now + self.ttl,
            ip_address: client.ip_address.clone(),
            user_agent: client.user_agent.clone(),
        };
        self.store.insert(session.clone()).await?;
        debug!(admin_id = %session.admin_id, expires_at = %session.expires_at, "Session created");
        Ok(session)
    }

    /// Returns the session while `now < expires_at`; evicts it otherwise.
    pub async fn validate_session(&self, session_id: &SessionId) -> AppResult<Option<Session>> {
        self.store.get_valid(session_id, self.clock.now()).await
    }

    /// Removes a session if present.
    pub async fn remove(&self, session_id: &SessionId) -> AppResult<Option<Session>> {
        self.store.remove(session_id).await
    }

    /// Replaces `previous` by a session under `new_id` with a re-snapshotted
    /// account and a strictly later expiry. `None` when `previous` is no
    /// longer live or a concurrent rotation won.
    pub async fn rotate(
        &self,
        previous: &Session,
        new_id: SessionId,
        account: &AdminAccount,
        client: &ClientInfo,
    ) -> AppResult<Option<Session>> {
        let now = self.clock.now();
        let expires_at = (now + self.ttl).max(previous.expires_at + Duration::milliseconds(1));
        let session = Session {
            session_id: new_id,
            admin_id: account.id,
            email: account.email.clone(),
            roles: account.role_names(),
            permissions: account.permissions(),
            created_at: now,
            expires_at,
            ip_address: client.ip_address.clone(),
            user_agent: client.user_agent.clone(),
        };

        let rotated = self
            .store
            .rotate(&previous.session_id, session.clone(), now)
            .await?;
        Ok(rotated.map(|_| session))
    }

    /// Removes every session of `admin_id`. Returns how many were removed.
    pub async fn revoke_all(&self, admin_id: AdminId) -> AppResult<usize> {
        let removed = self.store.remove_for_admin(admin_id).await?;
        info!(admin_id = %admin_id, count = removed.len(), "Sessions revoked");
        Ok(removed.len())
    }

    /// Live sessions of `admin_id`, newest first.
    pub async fn list_sessions(&self, admin_id: AdminId) -> AppResult<Vec<Session>> {
        self.store.list_for_admin(admin_id, self.clock.now()).await
    }

    /// Number of live sessions.
    pub async fn active_session_count(&self) -> AppResult<usize> {
        self.store.count_live(self.clock.now()).await
    }

    /// Evicts every expired session.
    pub async fn purge_expired(&self) -> AppResult<usize> {
        self.store.purge_expired(self.clock.now()).await
    }
}
