//! Administrator account entity model.

use std::collections::BTreeSet;

use adminguard_core::types::AdminId;
use chrono::{DateTime, Utc};
use serde::{Deserialize, Serialize};

use super::role::Role;

/// A privileged operator account.
///
/// Accounts are owned by the account store. The authentication flow only
/// reads them and updates the lockout fields through the store.
#[derive(Debug, Clone, Serialize, Deserialize)]
#[serde(rename_all = "camelCase")]
pub struct AdminAccount {
    /// Unique account identifier.
    pub id: AdminId,
    /// Login email (stored lowercase).
    pub email: String,
    /// Argon2 password hash.
    #[serde(skip_serializing)]
    pub password_hash: String,
    /// Roles in priority order.
    pub roles: Vec<Role>,
    /// Whether a second factor is required at login.
    pub mfa_enabled: bool,
    /// Base32 TOTP secret.
    #[serde(skip_serializing, default)]
    pub mfa_secret: Option<String>,
    /// Number of consecutive failed login attempts.
    pub failed_login_attempts: u32,
    /// Account locked until this time (if locked).
    pub locked_until: Option<DateTime<Utc>>,
    /// Whether the account may log in at all.
    pub is_active: bool,
    /// When the account was created.
    pub created_at: DateTime<Utc>,
    /// Last successful login time.
    pub last_login_at: Option<DateTime<Utc>>,
}

impl AdminAccount {
    /// Create an active account with no failures recorded.
    pub fn new(email: impl Into<String>, password_hash: impl Into<String>, roles: Vec<Role>) -> Self {
        Self {
            id: AdminId::new(),
            email: email.into().to_lowercase(),
            password_hash: password_hash.into(),
            roles,
            mfa_enabled: false,
            mfa_secret: None,
            failed_login_attempts: 0,
            locked_until: None,
            is_active: true,
            created_at: Utc::now(),
            last_login_at: None,
        }
    }

    /// Enable TOTP with the given base32 secret.
    pub fn with_mfa(mut self, secret: impl Into<String>) -> Self {
        self.mfa_enabled = true;
        self.mfa_secret = Some(secret.into());
        self
    }

    /// Check whether the account is locked at `now`.
    pub fn is_locked_at(&self, now: DateTime<Utc>) -> bool {
        self.locked_until.is_some_and(|until| now < until)
    }

    /// Flattened permission set across all roles.
    pub fn permissions(&self) -> BTreeSet<String> {
        self.roles
            .iter()
            .flat_map(|role| role.permissions.iter().cloned())
            .collect()
    }

    /// Role names in priority order.
    pub fn role_names(&self) -> Vec<String> {
        self.roles.iter().map(|role| role.name.clone()).collect()
    }

    /// Sanitized view returned to callers after login.
    pub fn profile(&self) -> AdminProfile {
        AdminProfile {
            id: self.id,
            email: self.email.clone(),
            roles: self.role_names(),
            permissions: self.permissions(),
            mfa_enabled: self.mfa_enabled,
            last_login_at: self.last_login_at,
        }
    }
}

/// Account data safe to hand to clients: no hash, no secret, no lockout state.
#[derive(Debug, Clone, PartialEq, Eq, Serialize, Deserialize)]
#[serde(rename_all = "camelCase")]
pub struct AdminProfile {
    /// Account identifier.
    pub id: AdminId,
    /// Login email.
    pub email: String,
    /// Role names.
    pub roles: Vec<String>,
    /// Flattened permissions.
    pub permissions: BTreeSet<String>,
    /// Whether MFA is enabled.
    pub mfa_enabled: bool,
    /// Previous successful login time.
    pub last_login_at: Option<DateTime<Utc>>,
}

#[cfg(test)]
mod tests {
    use super::*;
    use chrono::Duration;

    fn account() -> AdminAccount {
        AdminAccount::new(
            "Ops@Example.com",
            "$argon2id$stub",
            vec![
                Role::new("security-admin", ["security:manage", "audit:read"]),
                Role::new("auditor", ["audit:read"]),
            ],
        )
    }

    #[test]
    fn test_email_is_lowercased() {
        assert_eq!(account().email, "ops@example.com");
    }

    #[test]
    fn test_permissions_are_flattened_without_duplicates() {
        let perms = account().permissions();
        assert_eq!(perms.len(), 2);
        assert!(perms.contains("security:manage"));
    }

    #[test]
    fn test_lock_boundary() {
        let now = Utc::now();
        let mut acc = account();
        acc.locked_until = Some(now + Duration::minutes(15));
        assert!(acc.is_locked_at(now));
        assert!(!acc.is_locked_at(now + Duration::minutes(15)));
    }

    #[test]
    fn test_serialization_hides_secrets() {
        let json = serde_json::to_value(account().with_mfa("JBSWY3DPEHPK3PXP")).unwrap();
        assert!(json.get("passwordHash").is_none());
        assert!(json.get("mfaSecret").is_none());
        assert_eq!(json["mfaEnabled"], true);
    }
}
