//! Argon2id password hashing and verification.

use std::sync::OnceLock;

use argon2::{
    Argon2,
    password_hash::{
        PasswordHash, PasswordHasher as ArgonHasher, PasswordVerifier, SaltString, rand_core::OsRng,
    },
};

use adminguard_core::error::AppError;
use adminguard_core::traits::CredentialVerifier;

/// Hash checked for logins that name no account.
static ABSENT_ACCOUNT_HASH: OnceLock<String> = OnceLock::new();

/// Handles password hashing and verification using Argon2id.
#[derive(Debug, Clone, Default)]
pub struct PasswordHasher;

impl PasswordHasher {
    /// Creates a new password hasher instance.
    pub fn new() -> Self {
        Self
    }

    /// Hashes a plaintext password using Argon2id with a random salt.
    pub fn hash_password(&self, password: &str) -> Result<String, AppError> {
        let salt = SaltString::generate(&mut OsRng);

        let hash = Argon2::default()
            .hash_password(password.as_bytes(), &salt)
            .map_err(|e| AppError::internal(format!("Password hashing failed: {e}")))?;

        Ok(hash.to_string())
    }

    fn absent_account_hash(&self) -> Result<&'static str, AppError> {
        if let Some(hash) = ABSENT_ACCOUNT_HASH.get() {
            return Ok(hash.as_str());
        }
        let hash = self.hash_password("adminguard-absent-account")?;
        Ok(ABSENT_ACCOUNT_HASH.get_or_init(|| hash).as_str())
    }
}

impl CredentialVerifier for PasswordHasher {
    /// Returns `Ok(true)` on a match, `Ok(false)` on a mismatch, and an
    /// internal error only when the stored hash cannot be parsed.
    fn verify(&self, plaintext: &str, hash: &str) -> Result<bool, AppError> {
        let parsed_hash = PasswordHash::new(hash)
            .map_err(|e| AppError::internal(format!("Invalid password hash format: {e}")))?;

        match Argon2::default().verify_password(plaintext.as_bytes(), &parsed_hash) {
            Ok(()) => Ok(true),
            Err(argon2::password_hash::Error::Password) => Ok(false),
            Err(e) => Err(AppError::internal(format!(
                "Password verification failed: {e}"
            ))),
        }
    }

    fn verify_absent(&self, plaintext: &str) -> Result<(), AppError> {
        let hash = self.absent_account_hash()?;
        self.verify(plaintext, hash).map(|_| ())
    }
}
