//! Pluggable collaborators of the orchestrator.

use std::sync::Arc;

use adminguard_core::config::AppConfig;
use adminguard_core::config::audit::AuditSinkKind;
use adminguard_core::traits::{CounterStore, CredentialVerifier, MfaVerifier};
use adminguard_core::types::Clock;

use crate::account::AccountStore;
use crate::audit::{AuditSink, NoopAuditSink, TracingAuditSink};
use crate::mfa::TotpVerifier;
use crate::password::PasswordHasher;
use crate::rate_limit::MemoryCounterStore;
use crate::session::{MemorySessionStore, SessionStore};

/// Issuer name passed to the TOTP verifier.
const MFA_ISSUER: &str = "AdminGuard";

/// Every capability the orchestrator consumes.
#[derive(Debug, Clone)]
pub struct AuthComponents {
    /// External credential store.
    pub accounts: Arc<dyn AccountStore>,
    /// Password verification.
    pub credentials: Arc<dyn CredentialVerifier>,
    /// Second-factor verification.
    pub mfa: Arc<dyn MfaVerifier>,
    /// Session table.
    pub session_store: Arc<dyn SessionStore>,
    /// Rate-limit counters.
    pub counter_store: Arc<dyn CounterStore>,
    /// Audit mirror.
    pub audit_sink: Arc<dyn AuditSink>,
    /// Time source.
    pub clock: Arc<dyn Clock>,
}

impl AuthComponents {
    /// Single-process components: in-memory session table and counters,
    /// Argon2 passwords, TOTP second factor, and the configured audit sink.
    pub fn in_memory(config: &AppConfig, accounts: Arc<dyn AccountStore>, clock: Arc<dyn Clock>) -> Self {
        let audit_sink: Arc<dyn AuditSink> = match config.audit.sink {
            AuditSinkKind::None => Arc::new(NoopAuditSink),
            AuditSinkKind::Tracing => Arc::new(TracingAuditSink),
        };

        Self {
            accounts,
            credentials: Arc::new(PasswordHasher::new()),
            mfa: Arc::new(TotpVerifier::new(MFA_ISSUER, config.auth.mfa_skew_steps)),
            session_store: Arc::new(MemorySessionStore::new()),
            counter_store: Arc::new(MemoryCounterStore::new()),
            audit_sink,
            clock,
        }
    }
}
