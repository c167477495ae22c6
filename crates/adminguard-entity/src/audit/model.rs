//! Audit log entry entity model.

use adminguard_core::types::{AdminId, AuditEntryId};
use chrono::{DateTime, Utc};
use serde::{Deserialize, Serialize};
use serde_json::{Map, Value};

use super::action::AuditAction;

/// An immutable audit log entry.
#[derive(Debug, Clone, PartialEq, Serialize, Deserialize)]
#[serde(rename_all = "camelCase")]
pub struct AuditLogEntry {
    /// Unique audit entry identifier.
    pub id: AuditEntryId,
    /// The admin the action is attributed to, when known.
    pub admin_id: Option<AdminId>,
    /// Email of the admin (or the email a login attempted).
    pub admin_email: String,
    /// Action tag (e.g. `"LOGIN_SUCCESS"`).
    pub action: String,
    /// Resource type (e.g. `"auth"`, `"session"`).
    pub resource: String,
    /// Target resource identifier, if any.
    pub resource_id: Option<String>,
    /// Structured details.
    pub details: Map<String, Value>,
    /// Client IP address.
    pub ip_address: String,
    /// Client User-Agent.
    pub user_agent: String,
    /// When the action occurred.
    pub timestamp: DateTime<Utc>,
    /// Whether the action succeeded.
    pub success: bool,
    /// Failure description.
    pub error: Option<String>,
}

/// Data required to append an audit log entry.
///
/// The logger assigns the id, and the timestamp when none is given.
#[derive(Debug, Clone, Default, Serialize, Deserialize)]
#[serde(rename_all = "camelCase")]
pub struct NewAuditEntry {
    /// The admin the action is attributed to.
    pub admin_id: Option<AdminId>,
    /// Email of the admin.
    pub admin_email: String,
    /// Action tag.
    pub action: String,
    /// Resource type.
    pub resource: String,
    /// Target resource identifier.
    pub resource_id: Option<String>,
    /// Structured details.
    pub details: Map<String, Value>,
    /// Client IP address.
    pub ip_address: String,
    /// Client User-Agent.
    pub user_agent: String,
    /// Explicit timestamp; defaults to the logger's clock.
    pub timestamp: Option<DateTime<Utc>>,
    /// Whether the action succeeded.
    pub success: bool,
    /// Failure description.
    pub error: Option<String>,
}

impl NewAuditEntry {
    /// Start a successful entry for `action`, on the action's resource.
    pub fn new(action: AuditAction) -> Self {
        Self {
            action: action.as_str().to_string(),
            resource: action.resource().to_string(),
            success: true,
            ..Self::default()
        }
    }

    /// Attribute the entry to an admin.
    pub fn admin(mut self, admin_id: Option<AdminId>, email: impl Into<String>) -> Self {
        self.admin_id = admin_id;
        self.admin_email = email.into();
        self
    }

    /// Record the client address and agent.
    pub fn client(mut self, ip_address: impl Into<String>, user_agent: impl Into<String>) -> Self {
        self.ip_address = ip_address.into();
        self.user_agent = user_agent.into();
        self
    }

    /// Set the target resource id.
    pub fn resource_id(mut self, id: impl Into<String>) -> Self {
        self.resource_id = Some(id.into());
        self
    }

    /// Add one detail field.
    pub fn detail(mut self, key: &str, value: impl Into<Value>) -> Self {
        self.details.insert(key.to_string(), value.into());
        self
    }

    /// Mark the entry as a failure with the given error text.
    pub fn failed(mut self, error: impl Into<String>) -> Self {
        self.success = false;
        self.error = Some(error.into());
        self
    }

    /// Pin the timestamp.
    pub fn at(mut self, timestamp: DateTime<Utc>) -> Self {
        self.timestamp = Some(timestamp);
        self
    }

    /// Materialize the entry.
    pub fn into_entry(self, id: AuditEntryId, now: DateTime<Utc>) -> AuditLogEntry {
        AuditLogEntry {
            id,
            admin_id: self.admin_id,
            admin_email: self.admin_email,
            action: self.action,
            resource: self.resource,
            resource_id: self.resource_id,
            details: self.details,
            ip_address: self.ip_address,
            user_agent: self.user_agent,
            timestamp: self.timestamp.unwrap_or(now),
            success: self.success,
            error: self.error,
        }
    }
}

#[cfg(test)]
mod tests {
    use super::*;

    #[test]
    fn test_builder_sets_failure() {
        let entry = NewAuditEntry::new(AuditAction::FailedLogin)
            .admin(None, "a@x.com")
            .client("10.0.0.1", "curl")
            .detail("remainingAttempts", 3)
            .failed("Invalid email or password")
            .into_entry(AuditEntryId::new(), Utc::now());
        assert!(!entry.success);
        assert_eq!(entry.action, "FAILED_LOGIN");
        assert_eq!(entry.resource, "auth");
        assert_eq!(entry.details["remainingAttempts"], 3);
    }

    #[test]
    fn test_explicit_timestamp_wins() {
        let pinned = Utc::now() - chrono::Duration::days(1);
        let entry = NewAuditEntry::new(AuditAction::Logout)
            .at(pinned)
            .into_entry(AuditEntryId::new(), Utc::now());
        assert_eq!(entry.timestamp, pinned);
    }
}
