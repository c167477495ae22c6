//! Account store capability consumed by the login flow.

use async_trait::async_trait;
use chrono::{DateTime, Utc};

use adminguard_core::result::AppResult;
use adminguard_core::types::AdminId;
use adminguard_entity::account::AdminAccount;

/// State of an account after one more failed login was counted.
#[derive(Debug, Clone, Copy, PartialEq, Eq)]
pub struct FailedLogin {
    /// Consecutive failures including this one.
    pub attempts: u32,
    /// Lock deadline, if the account is locked.
    pub locked_until: Option<DateTime<Utc>>,
    /// Whether this failure is the one that locked the account.
    pub newly_locked: bool,
}

/// The external credential store.
///
/// Lookups may be slow and are bounded by the caller's timeout. The two
/// `record_*` methods are read-modify-write operations and must be atomic
/// per account.
#[async_trait]
pub trait AccountStore: Send + Sync + std::fmt::Debug + 'static {
    /// Finds an account by email (case-insensitive).
    async fn find_by_email(&self, email: &str) -> AppResult<Option<AdminAccount>>;

    /// Finds an account by id.
    async fn find_by_id(&self, id: AdminId) -> AppResult<Option<AdminAccount>>;

    /// Counts one failed login at `now`. A lock that has already elapsed
    /// is cleared and the count restarts before this failure is added. When
    /// the count reaches `max_attempts` the account is locked until
    /// `lock_until`.
    async fn record_failed_login(
        &self,
        id: AdminId,
        max_attempts: u32,
        lock_until: DateTime<Utc>,
        now: DateTime<Utc>,
    ) -> AppResult<FailedLogin>;

    /// Resets the failure count and lock after a successful login.
    /// Returns `false`, changing nothing, if the account is locked at `now`.
    async fn record_successful_login(&self, id: AdminId, now: DateTime<Utc>) -> AppResult<bool>;
}
