//! # adminguard-auth
//!
//! Authentication and session security for administrative accounts.
//!
//! ## Modules
//!
//! - `orchestrator`: login, logout and refresh flows composing every component
//! - `jwt`: signed access and refresh tokens
//! - `password`: Argon2id password hashing and verification
//! - `mfa`: TOTP second-factor verification
//! - `session`: session table, rotation and background sweep
//! - `rate_limit`: sliding-window login attempt limiting
//! - `account`: account lookup and lockout bookkeeping
//! - `monitor`: cross-account alerting and IP blocking
//! - `audit`: append-only audit trail, queries and export

pub mod account;
pub mod audit;
pub mod context;
pub mod jwt;
pub mod mfa;
pub mod monitor;
pub mod orchestrator;
pub mod password;
pub mod rate_limit;
pub mod session;

pub use account::{AccountStore, FailedLogin, MemoryAccountStore};
pub use audit::{AuditLogger, AuditSink, ExportFormat, NoopAuditSink, TracingAuditSink};
pub use context::{Actor, ClientInfo};
pub use jwt::{AccessClaims, RefreshClaims, TokenPair, TokenService};
pub use mfa::TotpVerifier;
pub use monitor::SecurityMonitor;
pub use orchestrator::{
    AuthComponents, AuthOrchestrator, LoginOutcome, LoginRequest, LoginSuccess, RefreshedTokens,
};
pub use password::PasswordHasher;
pub use rate_limit::{MemoryCounterStore, RateLimiter};
pub use session::{CleanupReport, MemorySessionStore, SessionCleanup, SessionRegistry, SessionStore};
