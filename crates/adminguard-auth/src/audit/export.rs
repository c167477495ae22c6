//! Audit export formats.

use std::fmt;
use std::str::FromStr;

use adminguard_core::error::AppError;
use adminguard_entity::audit::AuditLogEntry;

/// Supported export encodings.
#[derive(Debug, Clone, Copy, PartialEq, Eq)]
pub enum ExportFormat {
    /// JSON array of entries.
    Json,
    /// Header row plus one row per entry.
    Csv,
}

impl ExportFormat {
    /// MIME type of the encoded output.
    pub fn content_type(&self) -> &'static str {
        match self {
            Self::Json => "application/json",
            Self::Csv => "text/csv; charset=utf-8",
        }
    }

    /// File extension for downloads.
    pub fn extension(&self) -> &'static str {
        match self {
            Self::Json => "json",
            Self::Csv => "csv",
        }
    }
}

impl fmt::Display for ExportFormat {
    fn fmt(&self, f: &mut fmt::Formatter<'_>) -> fmt::Result {
        f.write_str(self.extension())
    }
}

impl FromStr for ExportFormat {
    type Err = AppError;

    fn from_str(s: &str) -> Result<Self, Self::Err> {
        match s.to_lowercase().as_str() {
            "json" => Ok(Self::Json),
            "csv" => Ok(Self::Csv),
            _ => Err(AppError::validation(format!(
                "Invalid export format: '{s}'. Expected one of: json, csv"
            ))),
        }
    }
}

const CSV_HEADER: [&str; 12] = [
    "ID",
    "Timestamp",
    "Admin ID",
    "Admin Email",
    "Action",
    "Resource",
    "Resource ID",
    "Success",
    "IP Address",
    "User Agent",
    "Error",
    "Details",
];

/// Encodes entries (already ordered) in `format`.
pub fn encode(entries: &[AuditLogEntry], format: ExportFormat) -> Result<String, AppError> {
    match format {
        ExportFormat::Json => Ok(serde_json::to_string_pretty(entries)?),
        ExportFormat::Csv => encode_csv(entries),
    }
}

fn encode_csv(entries: &[AuditLogEntry]) -> Result<String, AppError> {
    let mut out = String::new();
    push_row(&mut out, CSV_HEADER.iter().map(|h| h.to_string()));

    for entry in entries {
        let details = serde_json::to_string(&entry.details)?;
        push_row(
            &mut out,
            [
                entry.id.to_string(),
                entry.timestamp.to_rfc3339(),
                entry.admin_id.map(|id| id.to_string()).unwrap_or_default(),
                entry.admin_email.clone(),
                entry.action.clone(),
                entry.resource.clone(),
                entry.resource_id.clone().unwrap_or_default(),
                entry.success.to_string(),
                entry.ip_address.clone(),
                entry.user_agent.clone(),
                entry.error.clone().unwrap_or_default(),
                details,
            ],
        );
    }
    Ok(out)
}

fn push_row(out: &mut String, fields: impl IntoIterator<Item = String>) {
    let row: Vec<String> = fields.into_iter().map(|f| escape(&f)).collect();
    out.push_str(&row.join(","));
    out.push_str("\r\n");
}

/// RFC 4180 quoting: fields with a comma, quote or line break are wrapped
/// in quotes with inner quotes doubled.
fn escape(field: &str) -> String {
    if field.contains([',', '"', '\n', '\r']) {
        format!("\"{}\"", field.replace('"', "\"\""))
    } else {
        field.to_string()
    }
}
