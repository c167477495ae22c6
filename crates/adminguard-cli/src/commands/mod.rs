//! CLI command definitions and dispatch.

pub mod config;
pub mod password;

use clap::{Parser, Subcommand};

use adminguard_core::config::AppConfig;
use adminguard_core::error::AppError;

use crate::output::OutputFormat;

/// AdminGuard operator tools
#[derive(Debug, Parser)]
#[command(name = "adminguard", version, about, long_about = None)]
pub struct Cli {
    /// Configuration overlay loaded on top of `config/default.toml`
    #[arg(short, long, default_value = "development")]
    pub env: String,

    /// Output format
    #[arg(short, long, value_enum, default_value = "text")]
    pub format: OutputFormat,

    /// Subcommand to execute
    #[command(subcommand)]
    pub command: Commands,
}

/// Top-level commands
#[derive(Debug, Subcommand)]
pub enum Commands {
    /// Hash a password for a bootstrap account
    HashPassword(password::HashPasswordArgs),
    /// Configuration inspection
    Config(config::ConfigArgs),
}

impl Cli {
    /// Execute the CLI command
    pub fn execute(&self) -> Result<(), AppError> {
        match &self.command {
            Commands::HashPassword(args) => password::execute(args),
            Commands::Config(args) => config::execute(args, &self.env, self.format),
        }
    }
}

/// Helper: load and validate configuration for `env`
pub fn load_config(env: &str) -> Result<AppConfig, AppError> {
    tracing::debug!(env = %env, "Loading configuration");
    AppConfig::load(env)
}
