//! Password verification capability.

use crate::result::AppResult;

/// Verifies a plaintext credential against a stored hash.
///
/// Implementations must be constant-time with respect to the plaintext and
/// must return `Ok(false)` (not an error) for a well-formed hash that does
/// not match.
pub trait CredentialVerifier: Send + Sync + std::fmt::Debug + 'static {
    /// Returns `true` when `plaintext` matches `hash`.
    fn verify(&self, plaintext: &str, hash: &str) -> AppResult<bool>;

    /// Performs the same work as one `verify` against a fixed hash. Called
    /// when a login names no account, so that branch costs as much as a
    /// wrong password.
    fn verify_absent(&self, plaintext: &str) -> AppResult<()>;
}
