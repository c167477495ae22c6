//! Bootstrap administrator accounts for the in-memory account store.

use serde::{Deserialize, Serialize};

/// A role granted to a bootstrap account.
#[derive(Debug, Clone, Serialize, Deserialize)]
pub struct BootstrapRole {
    /// Role name.
    pub name: String,
    /// Permissions the role grants.
    #[serde(default)]
    pub permissions: Vec<String>,
}

/// An administrator seeded at startup.
#[derive(Clone, Serialize, Deserialize)]
pub struct BootstrapAccount {
    /// Login email.
    pub email: String,
    /// Argon2id PHC string (see `adminguard-cli hash-password`).
    pub password_hash: String,
    /// Roles in priority order.
    #[serde(default)]
    pub roles: Vec<BootstrapRole>,
    /// Base32 TOTP secret; enables MFA when present.
    #[serde(default)]
    pub mfa_secret: Option<String>,
    /// Whether the account may log in.
    #[serde(default = "default_true")]
    pub active: bool,
}

impl std::fmt::Debug for BootstrapAccount {
    fn fmt(&self, f: &mut std::fmt::Formatter<'_>) -> std::fmt::Result {
        f.debug_struct("BootstrapAccount")
            .field("email", &self.email)
            .field("roles", &self.roles)
            .field("mfa", &self.mfa_secret.is_some())
            .field("active", &self.active)
            .finish()
    }
}

fn default_true() -> bool {
    true
}
