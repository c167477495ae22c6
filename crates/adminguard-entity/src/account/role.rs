//! Administrative role with its granted permissions.

use std::collections::BTreeSet;

use serde::{Deserialize, Serialize};

/// Well-known permission names checked by the admin surface.
pub mod permissions {
    /// Manage IP blocks, alerts and other admins' sessions.
    pub const SECURITY_MANAGE: &str = "security:manage";
    /// Read, search and export the audit trail.
    pub const AUDIT_READ: &str = "audit:read";
}

/// A named role granting a set of permissions.
#[derive(Debug, Clone, PartialEq, Eq, Serialize, Deserialize)]
#[serde(rename_all = "camelCase")]
pub struct Role {
    /// Role name (e.g. `"security-admin"`).
    pub name: String,
    /// Permissions granted by the role.
    pub permissions: BTreeSet<String>,
}

impl Role {
    /// Create a role from a name and permission list.
    pub fn new<I, S>(name: impl Into<String>, permissions: I) -> Self
    where
        I: IntoIterator<Item = S>,
        S: Into<String>,
    {
        Self {
            name: name.into(),
            permissions: permissions.into_iter().map(Into::into).collect(),
        }
    }

    /// Check whether this role grants `permission`.
    pub fn grants(&self, permission: &str) -> bool {
        self.permissions.contains(permission)
    }
}
