//! Audit log configuration.

use serde::{Deserialize, Serialize};

/// Where audit entries are mirrored besides the in-memory log.
#[derive(Debug, Clone, Copy, PartialEq, Eq, Default, Serialize, Deserialize)]
#[serde(rename_all = "lowercase")]
pub enum AuditSinkKind {
    /// In-memory log only.
    None,
    /// Mirror every entry to the tracing subscriber.
    #[default]
    Tracing,
}

/// Audit log configuration.
#[derive(Debug, Clone, Default, Serialize, Deserialize)]
pub struct AuditConfig {
    /// Maximum retained entries; `0` keeps everything.
    #[serde(default)]
    pub max_entries: usize,
    /// External sink selection.
    #[serde(default)]
    pub sink: AuditSinkKind,
}
