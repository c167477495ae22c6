//! In-process account store seeded from configuration.

use async_trait::async_trait;
use chrono::{DateTime, Utc};
use dashmap::DashMap;

use adminguard_core::config::bootstrap::BootstrapAccount;
use adminguard_core::error::AppError;
use adminguard_core::result::AppResult;
use adminguard_core::types::AdminId;
use adminguard_entity::account::{AdminAccount, Role};

use super::store::{AccountStore, FailedLogin};

/// [`AccountStore`] over concurrent maps keyed by id and by email.
#[derive(Debug, Default)]
pub struct MemoryAccountStore {
    accounts: DashMap<AdminId, AdminAccount>,
    by_email: DashMap<String, AdminId>,
}

impl MemoryAccountStore {
    /// Creates an empty store.
    pub fn new() -> Self {
        Self::default()
    }

    /// Creates a store holding the configured bootstrap accounts.
    pub fn from_bootstrap(accounts: &[BootstrapAccount]) -> AppResult<Self> {
        let store = Self::new();
        for seed in accounts {
            let roles = seed
                .roles
                .iter()
                .map(|r| Role::new(r.name.clone(), r.permissions.iter().cloned()))
                .collect();
            let mut account = AdminAccount::new(seed.email.clone(), seed.password_hash.clone(), roles);
            if let Some(secret) = &seed.mfa_secret {
                if secret.trim().is_empty() {
                    return Err(AppError::configuration(format!(
                        "Bootstrap account {} has an empty MFA secret",
                        seed.email
                    )));
                }
                account = account.with_mfa(secret.clone());
            }
            account.is_active = seed.active;
            store.insert(account)?;
        }
        Ok(store)
    }

    /// Adds an account. Emails must be unique.
    pub fn insert(&self, account: AdminAccount) -> AppResult<()> {
        let email = account.email.to_lowercase();
        if self.by_email.contains_key(&email) {
            return Err(AppError::validation(format!(
                "Account with email {email} already exists"
            )));
        }
        self.by_email.insert(email, account.id);
        self.accounts.insert(account.id, account);
        Ok(())
    }

    /// Activates or deactivates an account.
    pub fn set_active(&self, id: AdminId, active: bool) -> AppResult<()> {
        let mut account = self
            .accounts
            .get_mut(&id)
            .ok_or_else(|| AppError::not_found(format!("Account {id} not found")))?;
        account.is_active = active;
        Ok(())
    }

    /// Number of accounts.
    pub fn len(&self) -> usize {
        self.accounts.len()
    }

    /// Whether the store holds no accounts.
    pub fn is_empty(&self) -> bool {
        self.accounts.is_empty()
    }
}

#[async_trait]
impl AccountStore for MemoryAccountStore {
    async fn find_by_email(&self, email: &str) -> AppResult<Option<AdminAccount>> {
        let Some(id) = self.by_email.get(&email.trim().to_lowercase()).map(|r| *r) else {
            return Ok(None);
        };
        Ok(self.accounts.get(&id).map(|r| r.value().clone()))
    }

    async fn find_by_id(&self, id: AdminId) -> AppResult<Option<AdminAccount>> {
        Ok(self.accounts.get(&id).map(|r| r.value().clone()))
    }

    async fn record_failed_login(
        &self,
        id: AdminId,
        max_attempts: u32,
        lock_until: DateTime<Utc>,
        now: DateTime<Utc>,
    ) -> AppResult<FailedLogin> {
        let mut account = self
            .accounts
            .get_mut(&id)
            .ok_or_else(|| AppError::not_found(format!("Account {id} not found")))?;

        if account.locked_until.is_some_and(|until| until <= now) {
            account.locked_until = None;
            account.failed_login_attempts = 0;
        }

        let was_locked = account.is_locked_at(now);
        account.failed_login_attempts = account.failed_login_attempts.saturating_add(1);

        let newly_locked = !was_locked && account.failed_login_attempts >= max_attempts;
        if newly_locked {
            account.locked_until = Some(lock_until);
        }

        Ok(FailedLogin {
            attempts: account.failed_login_attempts,
            locked_until: account.locked_until,
            newly_locked,
        })
    }

    async fn record_successful_login(&self, id: AdminId, now: DateTime<Utc>) -> AppResult<bool> {
        let mut account = self
            .accounts
            .get_mut(&id)
            .ok_or_else(|| AppError::not_found(format!("Account {id} not found")))?;

        if account.is_locked_at(now) {
            return Ok(false);
        }
        account.failed_login_attempts = 0;
        account.locked_until = None;
        account.last_login_at = Some(now);
        Ok(true)
    }
}

#[cfg(test)]
mod tests {
    use super::*;
    use chrono::Duration;

    fn store_with(email: &str) -> (MemoryAccountStore, AdminId) {
        let store = MemoryAccountStore::new();
        let account = AdminAccount::new(email, "$argon2id$stub", Vec::new());
        let id = account.id;
        store.insert(account).unwrap();
        (store, id)
    }

    #[tokio::test]
    async fn test_lookup_is_case_insensitive() {
        let (store, id) = store_with("a@x.com");
        let found = store.find_by_email("A@X.COM").await.unwrap().unwrap();
        assert_eq!(found.id, id);
        assert!(store.find_by_email("b@x.com").await.unwrap().is_none());
    }

    #[tokio::test]
    async fn test_lock_on_threshold_and_restart_after_expiry() {
        let (store, id) = store_with("a@x.com");
        let now = Utc::now();
        let until = now + Duration::minutes(15);

        for n in 1..5 {
            let outcome = store.record_failed_login(id, 5, until, now).await.unwrap();
            assert_eq!(outcome.attempts, n);
            assert!(!outcome.newly_locked);
        }
        let fifth = store.record_failed_login(id, 5, until, now).await.unwrap();
        assert!(fifth.newly_locked);
        assert_eq!(fifth.locked_until, Some(until));
        assert!(!store.record_successful_login(id, now).await.unwrap());

        let later = until + Duration::seconds(1);
        let restarted = store
            .record_failed_login(id, 5, later + Duration::minutes(15), later)
            .await
            .unwrap();
        assert_eq!(restarted.attempts, 1);
        assert_eq!(restarted.locked_until, None);
    }

    #[test]
    fn test_bootstrap_rejects_blank_mfa_secret() {
        let seed = BootstrapAccount {
            email: "a@x.com".to_string(),
            password_hash: "$argon2id$stub".to_string(),
            roles: Vec::new(),
            mfa_secret: Some("  ".to_string()),
            active: true,
        };
        let err = MemoryAccountStore::from_bootstrap(&[seed]).unwrap_err();
        assert_eq!(err.kind, adminguard_core::ErrorKind::Configuration);
    }

    #[tokio::test]
    async fn test_duplicate_email_rejected() {
        let (store, _) = store_with("a@x.com");
        assert!(store.insert(AdminAccount::new("A@x.com", "h", Vec::new())).is_err());
    }
}
