//! Session entity model.

use std::collections::BTreeSet;

use adminguard_core::types::{AdminId, SessionId};
use chrono::{DateTime, Utc};
use serde::{Deserialize, Serialize};

/// A live administrative session.
///
/// Sessions are created on login or refresh and destroyed on logout,
/// expiry, rotation or revocation. The role and permission snapshot is
/// copied at issuance and never re-derived.
#[derive(Debug, Clone, PartialEq, Eq, Serialize, Deserialize)]
#[serde(rename_all = "camelCase")]
pub struct Session {
    /// Opaque session identifier.
    pub session_id: SessionId,
    /// The account this session belongs to.
    pub admin_id: AdminId,
    /// Account email at issuance.
    pub email: String,
    /// Role names at issuance.
    pub roles: Vec<String>,
    /// Permission snapshot at issuance.
    pub permissions: BTreeSet<String>,
    /// When the session was created.
    pub created_at: DateTime<Utc>,
    /// When the session stops being valid. Always after `created_at`.
    pub expires_at: DateTime<Utc>,
    /// Client IP address at issuance.
    pub ip_address: String,
    /// Client User-Agent at issuance.
    pub user_agent: String,
}

impl Session {
    /// A session is expired from `expires_at` onward.
    pub fn is_expired_at(&self, now: DateTime<Utc>) -> bool {
        now >= self.expires_at
    }

    /// Check the permission snapshot.
    pub fn has_permission(&self, permission: &str) -> bool {
        self.permissions.contains(permission)
    }

    /// Check the role snapshot.
    pub fn has_role(&self, role: &str) -> bool {
        self.roles.iter().any(|r| r == role)
    }
}

#[cfg(test)]
mod tests {
    use super::*;
    use chrono::Duration;

    #[test]
    fn test_expiry_is_inclusive_of_expires_at() {
        let now = Utc::now();
        let session = Session {
            session_id: SessionId::from("s1"),
            admin_id: AdminId::new(),
            email: "a@x.com".into(),
            roles: vec!["auditor".into()],
            permissions: ["audit:read".to_string()].into_iter().collect(),
            created_at: now,
            expires_at: now + Duration::minutes(15),
            ip_address: "10.0.0.1".into(),
            user_agent: "test".into(),
        };
        assert!(!session.is_expired_at(now + Duration::minutes(14)));
        assert!(session.is_expired_at(now + Duration::minutes(15)));
        assert!(session.has_permission("audit:read"));
        assert!(!session.has_permission("security:manage"));
        assert!(session.has_role("auditor"));
    }
}
