//! Text and JSON output formatting for CLI commands.

use serde::Serialize;

/// Output format selection
#[derive(Debug, Clone, Copy, Default, PartialEq, Eq, clap::ValueEnum)]
pub enum OutputFormat {
    /// Human-readable pretty JSON
    #[default]
    Text,
    /// Compact JSON
    Json,
}

/// Print a single item in the selected format
pub fn print_item<T: Serialize>(item: &T, format: OutputFormat) {
    let rendered = match format {
        OutputFormat::Text => serde_json::to_string_pretty(item),
        OutputFormat::Json => serde_json::to_string(item),
    };
    println!("{}", rendered.unwrap_or_else(|_| "{}".to_string()));
}

/// Print a success message
pub fn print_success(msg: &str) {
    println!("✓ {}", msg);
}

/// Print an error message
pub fn print_error(msg: &str) {
    eprintln!("✗ {}", msg);
}

/// Print a key-value pair
pub fn print_kv(key: &str, value: &str) {
    println!("  {:<24} {}", format!("{}:", key), value);
}
