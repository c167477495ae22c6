//! Request DTOs with validation.

use chrono::{DateTime, Utc};
use serde::Deserialize;
use validator::Validate;

use adminguard_core::types::AdminId;
use adminguard_entity::audit::AuditFilter;

/// Largest page an audit query may request.
pub const MAX_AUDIT_LIMIT: usize = 10_000;

/// Login request body.
#[derive(Clone, Deserialize, Validate)]
#[serde(rename_all = "camelCase")]
pub struct LoginBody {
    /// Account email.
    #[validate(email(message = "A valid email is required"))]
    pub email: String,
    /// Password.
    #[validate(length(min = 1, message = "Password is required"))]
    pub password: String,
    /// Second-factor code.
    #[serde(default)]
    #[validate(length(min = 6, max = 8, message = "MFA code must be 6 digits"))]
    pub mfa_token: Option<String>,
}

/// Token refresh request body.
#[derive(Clone, Deserialize, Validate)]
#[serde(rename_all = "camelCase")]
pub struct RefreshBody {
    /// Refresh token.
    #[validate(length(min = 1, message = "Refresh token is required"))]
    pub refresh_token: String,
}

/// Session revocation request. Defaults to the caller's own sessions.
#[derive(Debug, Clone, Default, Deserialize, Validate)]
#[serde(rename_all = "camelCase")]
pub struct RevokeSessionsBody {
    /// Admin whose sessions are revoked.
    #[serde(default)]
    pub admin_id: Option<AdminId>,
}

/// Manual IP block request.
#[derive(Debug, Clone, Deserialize, Validate)]
#[serde(rename_all = "camelCase")]
pub struct BlockIpBody {
    /// Address to block.
    #[validate(ip(message = "A valid IP address is required"))]
    pub ip_address: String,
    /// Why the address is blocked.
    #[validate(length(min = 1, max = 500, message = "Reason must be 1-500 characters"))]
    pub reason: String,
}

/// Audit log query string.
#[derive(Debug, Clone, Default, Deserialize, Validate)]
#[serde(rename_all = "camelCase")]
pub struct AuditQuery {
    /// Exact admin id.
    pub admin_id: Option<AdminId>,
    /// Action substring.
    pub action: Option<String>,
    /// Exact resource.
    pub resource: Option<String>,
    /// Outcome.
    pub success: Option<bool>,
    /// Inclusive lower bound.
    pub start_date: Option<DateTime<Utc>>,
    /// Inclusive upper bound.
    pub end_date: Option<DateTime<Utc>>,
    /// Maximum entries returned.
    #[validate(range(min = 1, max = 10000, message = "Limit must be between 1 and 10000"))]
    pub limit: Option<usize>,
}

impl From<AuditQuery> for AuditFilter {
    fn from(query: AuditQuery) -> Self {
        Self {
            admin_id: query.admin_id,
            action: query.action,
            resource: query.resource,
            success: query.success,
            start_date: query.start_date,
            end_date: query.end_date,
            limit: query.limit.map(|l| l.min(MAX_AUDIT_LIMIT)),
        }
    }
}

/// Free-text audit search.
#[derive(Debug, Clone, Deserialize, Validate)]
pub struct SearchQuery {
    /// Search term.
    #[validate(length(min = 1, max = 200, message = "Search term must be 1-200 characters"))]
    pub q: String,
}

/// Export format selector; defaults to JSON.
#[derive(Debug, Clone, Default, Deserialize, Validate)]
pub struct ExportQuery {
    /// `json` or `csv`.
    pub format: Option<String>,
}

/// Metrics time range selector; defaults to one day.
#[derive(Debug, Clone, Default, Deserialize, Validate)]
pub struct MetricsQuery {
    /// `hour`, `day`, `week` or `all`.
    pub range: Option<String>,
}

/// Alert status filter.
#[derive(Debug, Clone, Default, Deserialize, Validate)]
pub struct AlertsQuery {
    /// `active`, `acknowledged` or `resolved`.
    pub status: Option<String>,
}
