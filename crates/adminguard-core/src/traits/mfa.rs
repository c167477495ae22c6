//! Second-factor verification capability.

use chrono::{DateTime, Utc};

use crate::result::AppResult;

/// Verifies a one-time second-factor code for an account secret.
///
/// Only verification is in scope; enrolment and code generation belong to
/// the credential store.
pub trait MfaVerifier: Send + Sync + std::fmt::Debug + 'static {
    /// Returns `true` when `code` is valid for `secret` at instant `at`.
    fn verify(&self, secret: &str, code: &str, at: DateTime<Utc>) -> AppResult<bool>;
}
