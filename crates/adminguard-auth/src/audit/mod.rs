//! Append-only audit trail with query, search and export.

pub mod export;
pub mod logger;
pub mod sink;

pub use export::ExportFormat;
pub use logger::AuditLogger;
pub use sink::{AuditSink, NoopAuditSink, TracingAuditSink};
