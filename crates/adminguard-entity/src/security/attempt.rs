//! Login attempt observations and IP block records.

use adminguard_core::types::AdminId;
use chrono::{DateTime, Utc};
use serde::{Deserialize, Serialize};

/// One login outcome observed by the security monitor.
#[derive(Debug, Clone, Serialize, Deserialize)]
#[serde(rename_all = "camelCase")]
pub struct LoginAttempt {
    /// Email the attempt used (lowercased).
    pub email: String,
    /// Source IP address.
    pub ip_address: String,
    /// Client User-Agent.
    pub user_agent: String,
    /// Whether the login fully succeeded.
    pub success: bool,
    /// When the attempt happened.
    pub timestamp: DateTime<Utc>,
    /// Free-form context (failure reason and the like).
    pub metadata: serde_json::Value,
}

/// An entry on the IP block list. Blocks never expire on their own.
#[derive(Debug, Clone, Serialize, Deserialize)]
#[serde(rename_all = "camelCase")]
pub struct BlockedIp {
    /// Blocked address.
    pub ip_address: String,
    /// Why the address was blocked.
    pub reason: String,
    /// Operator who blocked it; `None` for rule-driven blocks.
    pub blocked_by: Option<AdminId>,
    /// Email of the blocking operator.
    pub blocked_by_email: Option<String>,
    /// When the block was created.
    pub blocked_at: DateTime<Utc>,
    /// Whether a monitor rule created the block.
    pub automatic: bool,
}
