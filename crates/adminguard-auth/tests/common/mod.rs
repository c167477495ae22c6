//! Shared fixture for orchestrator integration tests.

#![allow(dead_code)]

use std::sync::Arc;
use std::sync::atomic::{AtomicUsize, Ordering};

use chrono::{DateTime, TimeZone, Utc};
use totp_rs::{Algorithm, Secret, TOTP};

use adminguard_auth::{
    AuthComponents, AuthOrchestrator, ClientInfo, LoginOutcome, LoginRequest, LoginSuccess,
    MemoryAccountStore, PasswordHasher,
};
use adminguard_core::traits::CredentialVerifier;
use adminguard_core::{AppError, AppResult};
use adminguard_core::config::AppConfig;
use adminguard_core::config::audit::AuditSinkKind;
use adminguard_core::types::{Clock, ManualClock};
use adminguard_entity::account::{AdminAccount, Role, role::permissions};
use adminguard_entity::audit::AuditLogEntry;

pub const EMAIL: &str = "ops@example.com";
pub const PASSWORD: &str = "correct horse battery staple";
pub const MFA_SECRET: &str = "JBSWY3DPEHPK3PXPJBSWY3DPEHPK3PXP";

pub struct Harness {
    pub orchestrator: AuthOrchestrator,
    pub accounts: Arc<MemoryAccountStore>,
    pub clock: ManualClock,
    pub admin: AdminAccount,
}

pub fn start() -> DateTime<Utc> {
    Utc.with_ymd_and_hms(2030, 1, 1, 9, 0, 0).unwrap()
}

pub fn config() -> AppConfig {
    let mut config = AppConfig::default();
    config.auth.jwt_secret = "integration-secret-that-is-long-enough-for-hs256".to_string();
    config.audit.sink = AuditSinkKind::None;
    config
}

pub fn client() -> ClientInfo {
    ClientInfo::new("198.51.100.10", "integration-test/1.0")
}

pub fn client_from(ip: &str) -> ClientInfo {
    ClientInfo::new(ip, "integration-test/1.0")
}

pub fn superadmin(email: &str) -> AdminAccount {
    let hash = PasswordHasher::new().hash_password(PASSWORD).unwrap();
    AdminAccount::new(
        email,
        hash,
        vec![Role::new(
            "super_admin",
            [permissions::SECURITY_MANAGE, permissions::AUDIT_READ],
        )],
    )
}

impl Harness {
    pub fn new() -> Self {
        Self::with_config(config())
    }

    pub fn with_config(config: AppConfig) -> Self {
        Self::with_account(config, superadmin(EMAIL))
    }

    pub fn with_account(config: AppConfig, admin: AdminAccount) -> Self {
        Self::with_components(config, admin, |_| {})
    }

    pub fn with_components(
        config: AppConfig,
        admin: AdminAccount,
        customize: impl FnOnce(&mut AuthComponents),
    ) -> Self {
        let clock = ManualClock::new(start());
        let accounts = Arc::new(MemoryAccountStore::new());
        accounts.insert(admin.clone()).unwrap();

        let shared_clock: Arc<dyn Clock> = Arc::new(clock.clone());
        let mut components = AuthComponents::in_memory(&config, accounts.clone(), shared_clock);
        customize(&mut components);
        let orchestrator = AuthOrchestrator::new(&config, components);

        Self {
            orchestrator,
            accounts,
            clock,
            admin,
        }
    }

    pub async fn login_ok(&self) -> LoginSuccess {
        match self
            .orchestrator
            .login(LoginRequest::new(EMAIL, PASSWORD), &client())
            .await
            .unwrap()
        {
            LoginOutcome::Authenticated(success) => success,
            LoginOutcome::MfaRequired => panic!("unexpected MFA challenge"),
        }
    }

    pub async fn login_wrong(&self) -> AppError {
        self.orchestrator
            .login(LoginRequest::new(EMAIL, "wrong password"), &client())
            .await
            .unwrap_err()
    }

    pub async fn entries(&self, action: &str) -> Vec<AuditLogEntry> {
        self.orchestrator
            .audit()
            .all()
            .await
            .into_iter()
            .filter(|e| e.action == action)
            .collect()
    }
}

pub fn totp_code(at: DateTime<Utc>) -> String {
    let bytes = Secret::Encoded(MFA_SECRET.to_string()).to_bytes().unwrap();
    TOTP::new_unchecked(
        Algorithm::SHA1,
        6,
        1,
        30,
        bytes,
        Some("AdminGuard".to_string()),
        "admin".to_string(),
    )
    .generate(at.timestamp() as u64)
}

/// Argon2 verifier that counts how often each check runs.
#[derive(Debug, Default)]
pub struct CountingVerifier {
    inner: PasswordHasher,
    pub verified: AtomicUsize,
    pub absent: AtomicUsize,
}

impl CountingVerifier {
    pub fn verified(&self) -> usize {
        self.verified.load(Ordering::SeqCst)
    }

    pub fn absent(&self) -> usize {
        self.absent.load(Ordering::SeqCst)
    }
}

impl CredentialVerifier for CountingVerifier {
    fn verify(&self, plaintext: &str, hash: &str) -> AppResult<bool> {
        self.verified.fetch_add(1, Ordering::SeqCst);
        self.inner.verify(plaintext, hash)
    }

    fn verify_absent(&self, plaintext: &str) -> AppResult<()> {
        self.absent.fetch_add(1, Ordering::SeqCst);
        self.inner.verify_absent(plaintext)
    }
}
