//! Audit action tags and resource names.

use std::fmt;

use serde::{Deserialize, Serialize};

/// Resource names written into audit entries.
pub mod resources {
    /// Login attempts and credentials.
    pub const AUTH: &str = "auth";
    /// Session lifecycle.
    pub const SESSION: &str = "session";
    /// IP block list.
    pub const IP_BLOCK: &str = "ip_block";
    /// Security alerts.
    pub const SECURITY_ALERT: &str = "security_alert";
}

/// Every action tag this service writes.
#[derive(Debug, Clone, Copy, PartialEq, Eq, Hash, Serialize, Deserialize)]
#[serde(rename_all = "SCREAMING_SNAKE_CASE")]
pub enum AuditAction {
    /// Full login success.
    LoginSuccess,
    /// Wrong password or unknown email, account not yet locked.
    FailedLogin,
    /// Wrong password that reached the lockout threshold.
    AccountLocked,
    /// Login refused because the source IP is blocked.
    LoginIpBlocked,
    /// Login refused by the rate limiter.
    LoginRateLimited,
    /// Login refused because the account is locked.
    LoginDeniedLocked,
    /// Login refused because the account is inactive.
    LoginDeniedInactive,
    /// Password verified, second factor still required.
    MfaRequired,
    /// Second factor rejected.
    InvalidMfa,
    /// Login aborted by an internal failure.
    LoginError,
    /// Session logout (idempotent).
    Logout,
    /// Session rotated by a refresh token.
    TokenRefresh,
    /// Refresh rejected.
    TokenRefreshFailed,
    /// Every session of one admin revoked.
    RevokeAllSessions,
    /// IP added to the block list.
    BlockIp,
    /// IP removed from the block list.
    UnblockIp,
    /// Alert acknowledged.
    AcknowledgeAlert,
    /// Alert resolved.
    ResolveAlert,
    /// Administrative operation refused for lack of a permission.
    AccessDenied,
}

impl AuditAction {
    /// Tag stored on the entry.
    pub fn as_str(&self) -> &'static str {
        match self {
            Self::LoginSuccess => "LOGIN_SUCCESS",
            Self::FailedLogin => "FAILED_LOGIN",
            Self::AccountLocked => "ACCOUNT_LOCKED",
            Self::LoginIpBlocked => "LOGIN_IP_BLOCKED",
            Self::LoginRateLimited => "LOGIN_RATE_LIMITED",
            Self::LoginDeniedLocked => "LOGIN_DENIED_LOCKED",
            Self::LoginDeniedInactive => "LOGIN_DENIED_INACTIVE",
            Self::MfaRequired => "MFA_REQUIRED",
            Self::InvalidMfa => "INVALID_MFA",
            Self::LoginError => "LOGIN_ERROR",
            Self::Logout => "LOGOUT",
            Self::TokenRefresh => "TOKEN_REFRESH",
            Self::TokenRefreshFailed => "TOKEN_REFRESH_FAILED",
            Self::RevokeAllSessions => "REVOKE_ALL_SESSIONS",
            Self::BlockIp => "BLOCK_IP",
            Self::UnblockIp => "UNBLOCK_IP",
            Self::AcknowledgeAlert => "ACKNOWLEDGE_ALERT",
            Self::ResolveAlert => "RESOLVE_ALERT",
            Self::AccessDenied => "ACCESS_DENIED",
        }
    }

    /// Resource the action applies to.
    pub fn resource(&self) -> &'static str {
        match self {
            Self::Logout | Self::TokenRefresh | Self::TokenRefreshFailed | Self::RevokeAllSessions => {
                resources::SESSION
            }
            Self::BlockIp | Self::UnblockIp => resources::IP_BLOCK,
            Self::AcknowledgeAlert | Self::ResolveAlert => resources::SECURITY_ALERT,
            _ => resources::AUTH,
        }
    }
}

impl fmt::Display for AuditAction {
    fn fmt(&self, f: &mut fmt::Formatter<'_>) -> fmt::Result {
        f.write_str(self.as_str())
    }
}
