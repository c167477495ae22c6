//! Configuration inspection commands.

use clap::{Args, Subcommand};
use serde_json::Value;

use adminguard_core::config::AppConfig;
use adminguard_core::error::AppError;

use crate::output::{self, OutputFormat};

/// Placeholder printed in place of secrets.
const REDACTED: &str = "<redacted>";

/// Arguments for config commands
#[derive(Debug, Args)]
pub struct ConfigArgs {
    /// Config subcommand
    #[command(subcommand)]
    pub command: ConfigCommand,
}

/// Config subcommands
#[derive(Debug, Subcommand)]
pub enum ConfigCommand {
    /// Show the effective configuration with secrets redacted
    Show,
    /// Validate the configuration
    Validate,
}

/// Execute config commands
pub fn execute(args: &ConfigArgs, env: &str, format: OutputFormat) -> Result<(), AppError> {
    match &args.command {
        ConfigCommand::Show => {
            let config = super::load_config(env)?;
            output::print_item(&redacted(&config)?, format);
        }
        ConfigCommand::Validate => match super::load_config(env) {
            Ok(config) => {
                output::print_success(&format!("Configuration for '{env}' is valid"));
                output::print_kv(
                    "Server",
                    &format!("{}:{}", config.server.host, config.server.port),
                );
                output::print_kv(
                    "Session TTL",
                    &format!("{} min", config.session.ttl_minutes),
                );
                output::print_kv(
                    "Lockout",
                    &format!(
                        "{} attempts / {} min",
                        config.auth.max_login_attempts, config.auth.lockout_duration_minutes
                    ),
                );
                output::print_kv("Bootstrap accounts", &config.bootstrap.len().to_string());
            }
            Err(e) => {
                output::print_error(&format!("Configuration invalid: {e}"));
                return Err(e);
            }
        },
    }

    Ok(())
}

/// Serializes `config` with the signing secret and account credentials masked.
fn redacted(config: &AppConfig) -> Result<Value, AppError> {
    let mut value = serde_json::to_value(config)?;

    if let Some(secret) = value.pointer_mut("/auth/jwt_secret") {
        *secret = Value::String(REDACTED.to_string());
    }
    if let Some(Value::Array(accounts)) = value.get_mut("bootstrap") {
        for account in accounts {
            for field in ["password_hash", "mfa_secret"] {
                if let Some(v) = account.get_mut(field).filter(|v| !v.is_null()) {
                    *v = Value::String(REDACTED.to_string());
                }
            }
        }
    }

    Ok(value)
}
