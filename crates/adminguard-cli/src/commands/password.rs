//! Password hashing for bootstrap accounts.

use clap::Args;
use dialoguer::Password;

use adminguard_auth::PasswordHasher;
use adminguard_core::error::AppError;

/// Shortest password accepted for an admin account.
const MIN_PASSWORD_LENGTH: usize = 12;

/// Arguments for `hash-password`
#[derive(Debug, Args)]
pub struct HashPasswordArgs {
    /// Read the password from this argument instead of prompting
    #[arg(long)]
    pub password: Option<String>,
}

/// Prompts twice (unless given) and prints an Argon2id PHC string.
pub fn execute(args: &HashPasswordArgs) -> Result<(), AppError> {
    let password = match &args.password {
        Some(p) => p.clone(),
        None => Password::new()
            .with_prompt("Password")
            .with_confirmation("Confirm password", "Passwords do not match")
            .interact()
            .map_err(|e| AppError::internal(format!("Input error: {e}")))?,
    };

    if password.chars().count() < MIN_PASSWORD_LENGTH {
        return Err(AppError::validation(format!(
            "Password must be at least {MIN_PASSWORD_LENGTH} characters"
        )));
    }

    let hash = PasswordHasher::new().hash_password(&password)?;
    println!("{hash}");
    Ok(())
}
