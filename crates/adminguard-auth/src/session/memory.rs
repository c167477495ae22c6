//! In-process session table.

use async_trait::async_trait;
use chrono::{DateTime, Utc};
use dashmap::DashMap;
use dashmap::mapref::entry::Entry;

use adminguard_core::error::AppError;
use adminguard_core::result::AppResult;
use adminguard_core::types::{AdminId, SessionId};
use adminguard_entity::session::Session;

use super::store::SessionStore;

/// [`SessionStore`] over a sharded concurrent map. Each operation holds
/// only the shard lock of the ids it touches; the sweep holds each shard
/// lock only while scanning that shard.
#[derive(Debug, Default)]
pub struct MemorySessionStore {
    sessions: DashMap<SessionId, Session>,
}

impl MemorySessionStore {
    /// Creates an empty table.
    pub fn new() -> Self {
        Self::default()
    }
}

#[async_trait]
impl SessionStore for MemorySessionStore {
    async fn insert(&self, session: Session) -> AppResult<()> {
        match self.sessions.entry(session.session_id.clone()) {
            Entry::Occupied(_) => Err(AppError::internal("Session id collision")),
            Entry::Vacant(slot) => {
                slot.insert(session);
                Ok(())
            }
        }
    }

    async fn get_valid(&self, id: &SessionId, now: DateTime<Utc>) -> AppResult<Option<Session>> {
        match self.sessions.entry(id.clone()) {
            Entry::Occupied(slot) if slot.get().is_expired_at(now) => {
                slot.remove();
                Ok(None)
            }
            Entry::Occupied(slot) => Ok(Some(slot.get().clone())),
            Entry::Vacant(_) => Ok(None),
        }
    }

    async fn remove(&self, id: &SessionId) -> AppResult<Option<Session>> {
        Ok(self.sessions.remove(id).map(|(_, session)| session))
    }

    async fn rotate(
        &self,
        old: &SessionId,
        new: Session,
        now: DateTime<Utc>,
    ) -> AppResult<Option<Session>> {
        let Some((_, previous)) = self.sessions.remove_if(old, |_, s| !s.is_expired_at(now)) else {
            self.sessions.remove_if(old, |_, s| s.is_expired_at(now));
            return Ok(None);
        };
        self.insert(new).await?;
        Ok(Some(previous))
    }

    async fn remove_for_admin(&self, admin_id: AdminId) -> AppResult<Vec<Session>> {
        let mut removed = Vec::new();
        self.sessions.retain(|_, session| {
            if session.admin_id == admin_id {
                removed.push(session.clone());
                false
            } else {
                true
            }
        });
        Ok(removed)
    }

    async fn list_for_admin(&self, admin_id: AdminId, now: DateTime<Utc>) -> AppResult<Vec<Session>> {
        let mut sessions: Vec<Session> = self
            .sessions
            .iter()
            .filter(|r| r.admin_id == admin_id && !r.is_expired_at(now))
            .map(|r| r.value().clone())
            .collect();
        sessions.sort_by(|a, b| b.created_at.cmp(&a.created_at));
        Ok(sessions)
    }

    async fn count_live(&self, now: DateTime<Utc>) -> AppResult<usize> {
        Ok(self.sessions.iter().filter(|r| !r.is_expired_at(now)).count())
    }

    async fn purge_expired(&self, now: DateTime<Utc>) -> AppResult<usize> {
        let mut evicted = 0;
        self.sessions.retain(|_, session| {
            let live = !session.is_expired_at(now);
            if !live {
                evicted += 1;
            }
            live
        });
        Ok(evicted)
    }
}
