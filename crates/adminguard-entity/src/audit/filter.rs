//! Audit query filter and aggregate statistics.

use adminguard_core::types::AdminId;
use chrono::{DateTime, Utc};
use serde::{Deserialize, Serialize};

use super::model::AuditLogEntry;

/// Conjunctive filter over the audit log. Unset fields match everything.
#[derive(Debug, Clone, Default, Serialize, Deserialize)]
#[serde(rename_all = "camelCase")]
pub struct AuditFilter {
    /// Exact admin id.
    pub admin_id: Option<AdminId>,
    /// Case-sensitive substring of the action tag.
    pub action: Option<String>,
    /// Exact resource.
    pub resource: Option<String>,
    /// Outcome.
    pub success: Option<bool>,
    /// Inclusive lower bound on the timestamp.
    pub start_date: Option<DateTime<Utc>>,
    /// Inclusive upper bound on the timestamp.
    pub end_date: Option<DateTime<Utc>>,
    /// Maximum number of entries returned, newest first.
    pub limit: Option<usize>,
}

impl AuditFilter {
    /// Check every predicate against `entry`. `limit` is applied by the caller.
    pub fn matches(&self, entry: &AuditLogEntry) -> bool {
        if self.admin_id.is_some_and(|id| entry.admin_id != Some(id)) {
            return false;
        }
        if self
            .action
            .as_deref()
            .is_some_and(|action| !entry.action.contains(action))
        {
            return false;
        }
        if self
            .resource
            .as_deref()
            .is_some_and(|resource| entry.resource != resource)
        {
            return false;
        }
        if self.success.is_some_and(|s| entry.success != s) {
            return false;
        }
        if self.start_date.is_some_and(|start| entry.timestamp < start) {
            return false;
        }
        if self.end_date.is_some_and(|end| entry.timestamp > end) {
            return false;
        }
        true
    }
}

/// Exact aggregate counts over the audit log.
#[derive(Debug, Clone, Default, PartialEq, Eq, Serialize, Deserialize)]
#[serde(rename_all = "camelCase")]
pub struct AuditStats {
    /// Number of entries.
    pub total_logs: usize,
    /// Entries with `success == true`.
    pub successful_actions: usize,
    /// Entries with `success == false`.
    pub failed_actions: usize,
    /// Distinct admin ids across attributed entries.
    pub unique_admins: usize,
}
