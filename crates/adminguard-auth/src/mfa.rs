//! TOTP (RFC 6238) second-factor verification.

use chrono::{DateTime, Utc};
use totp_rs::{Algorithm, Secret, TOTP};

use adminguard_core::error::AppError;
use adminguard_core::traits::MfaVerifier;

/// Digits per code.
const DIGITS: usize = 6;
/// Seconds per step.
const STEP_SECONDS: u64 = 30;

/// Verifies six-digit SHA-1 TOTP codes against a base32 account secret.
#[derive(Debug, Clone)]
pub struct TotpVerifier {
    issuer: String,
    skew: u8,
}

impl TotpVerifier {
    /// Creates a verifier accepting codes up to `skew` steps away from `at`.
    pub fn new(issuer: impl Into<String>, skew: u8) -> Self {
        Self {
            issuer: issuer.into(),
            skew,
        }
    }

    fn totp(&self, secret: &str) -> Result<TOTP, AppError> {
        let bytes = Secret::Encoded(secret.trim().to_uppercase())
            .to_bytes()
            .map_err(|e| AppError::internal(format!("Invalid TOTP secret: {e:?}")))?;
        if bytes.is_empty() {
            return Err(AppError::internal("TOTP secret is empty"));
        }

        // Label is only used for otpauth URLs, never for checking.
        Ok(TOTP::new_unchecked(
            Algorithm::SHA1,
            DIGITS,
            self.skew,
            STEP_SECONDS,
            bytes,
            Some(self.issuer.clone()),
            "admin".to_string(),
        ))
    }
}

impl MfaVerifier for TotpVerifier {
    fn verify(&self, secret: &str, code: &str, at: DateTime<Utc>) -> Result<bool, AppError> {
        let code = code.trim();
        if code.len() != DIGITS || !code.bytes().all(|b| b.is_ascii_digit()) {
            return Ok(false);
        }
        let Ok(time) = u64::try_from(at.timestamp()) else {
            return Ok(false);
        };
        Ok(self.totp(secret)?.check(code, time))
    }
}

#[cfg(test)]
mod tests {
    use super::*;
    use chrono::Duration;

    const SECRET: &str = "JBSWY3DPEHPK3PXPJBSWY3DPEHPK3PXP";

    fn code_at(at: DateTime<Utc>) -> String {
        let verifier = TotpVerifier::new("AdminGuard", 1);
        verifier
            .totp(SECRET)
            .unwrap()
            .generate(at.timestamp() as u64)
    }

    #[test]
    fn test_current_code_is_accepted() {
        let now = Utc::now();
        let verifier = TotpVerifier::new("AdminGuard", 1);
        assert!(verifier.verify(SECRET, &code_at(now), now).unwrap());
    }

    #[test]
    fn test_code_outside_skew_is_rejected() {
        let now = Utc::now();
        let verifier = TotpVerifier::new("AdminGuard", 1);
        let stale = code_at(now - Duration::minutes(5));
        assert!(!verifier.verify(SECRET, &stale, now).unwrap());
    }

    #[test]
    fn test_empty_secret_is_an_error() {
        let verifier = TotpVerifier::new("AdminGuard", 1);
        let empty_key_code = TOTP::new_unchecked(
            Algorithm::SHA1,
            DIGITS,
            1,
            STEP_SECONDS,
            Vec::new(),
            None,
            "admin".to_string(),
        )
        .generate(Utc::now().timestamp() as u64);

        assert!(verifier.verify("", &empty_key_code, Utc::now()).is_err());
        assert!(verifier.verify("   ", &empty_key_code, Utc::now()).is_err());
    }

    #[test]
    fn test_malformed_codes_are_rejected_without_error() {
        let verifier = TotpVerifier::new("AdminGuard", 1);
        assert!(!verifier.verify(SECRET, "12ab56", Utc::now()).unwrap());
        assert!(!verifier.verify(SECRET, "1234567", Utc::now()).unwrap());
    }
}
