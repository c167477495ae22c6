//! Session storage capability.

use async_trait::async_trait;
use chrono::{DateTime, Utc};

use adminguard_core::result::AppResult;
use adminguard_core::types::{AdminId, SessionId};
use adminguard_entity::session::Session;

/// Storage for live sessions.
///
/// Every method is atomic per session id. In particular a lookup that
/// finds an expired session and the sweep that evicts it never both see the
/// session as live, and a rotation removes the old id before the new one
/// becomes visible. A distributed implementation provides the same
/// guarantees with insert-if-absent and compare-and-delete primitives.
#[async_trait]
pub trait SessionStore: Send + Sync + std::fmt::Debug + 'static {
    /// Inserts a session whose id must not already exist.
    async fn insert(&self, session: Session) -> AppResult<()>;

    /// Returns the session if it is live at `now`. An expired session is
    /// evicted and `None` is returned.
    async fn get_valid(&self, id: &SessionId, now: DateTime<Utc>) -> AppResult<Option<Session>>;

    /// Removes a session regardless of expiry.
    async fn remove(&self, id: &SessionId) -> AppResult<Option<Session>>;

    /// Replaces `old` with `new` if `old` is still live at `now`. Returns the
    /// removed session, or `None` (and inserts nothing) when `old` was gone,
    /// expired, or already rotated by a concurrent caller.
    async fn rotate(
        &self,
        old: &SessionId,
        new: Session,
        now: DateTime<Utc>,
    ) -> AppResult<Option<Session>>;

    /// Removes every session of `admin_id`, returning them.
    async fn remove_for_admin(&self, admin_id: AdminId) -> AppResult<Vec<Session>>;

    /// Live sessions of `admin_id`.
    async fn list_for_admin(&self, admin_id: AdminId, now: DateTime<Utc>) -> AppResult<Vec<Session>>;

    /// Number of live sessions.
    async fn count_live(&self, now: DateTime<Utc>) -> AppResult<usize>;

    /// Evicts every session expired at `now`, returning how many.
    async fn purge_expired(&self, now: DateTime<Utc>) -> AppResult<usize>;
}
