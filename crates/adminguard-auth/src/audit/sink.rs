//! External destinations audit entries are mirrored to.

use async_trait::async_trait;
use tracing::{info, warn};

use adminguard_core::result::AppResult;
use adminguard_entity::audit::AuditLogEntry;

/// Optional durable destination for audit entries.
///
/// A sink failure never fails the operation being audited; the logger
/// reports it and keeps the entry in its in-memory log.
#[async_trait]
pub trait AuditSink: Send + Sync + std::fmt::Debug + 'static {
    /// Short name used in diagnostics.
    fn name(&self) -> &'static str;

    /// Persists one entry.
    async fn persist(&self, entry: &AuditLogEntry) -> AppResult<()>;
}

/// Sink that discards everything.
#[derive(Debug, Clone, Copy, Default)]
pub struct NoopAuditSink;

#[async_trait]
impl AuditSink for NoopAuditSink {
    fn name(&self) -> &'static str {
        "none"
    }

    async fn persist(&self, _entry: &AuditLogEntry) -> AppResult<()> {
        Ok(())
    }
}

/// Sink that writes each entry as a structured tracing event.
#[derive(Debug, Clone, Copy, Default)]
pub struct TracingAuditSink;

#[async_trait]
impl AuditSink for TracingAuditSink {
    fn name(&self) -> &'static str {
        "tracing"
    }

    async fn persist(&self, entry: &AuditLogEntry) -> AppResult<()> {
        let admin_id = entry.admin_id.map(|id| id.to_string()).unwrap_or_default();
        if entry.success {
            info!(
                target: "adminguard::audit",
                audit_id = %entry.id,
                admin_id = %admin_id,
                admin_email = %entry.admin_email,
                action = %entry.action,
                resource = %entry.resource,
                ip = %entry.ip_address,
                "Audit"
            );
        } else {
            warn!(
                target: "adminguard::audit",
                audit_id = %entry.id,
                admin_id = %admin_id,
                admin_email = %entry.admin_email,
                action = %entry.action,
                resource = %entry.resource,
                ip = %entry.ip_address,
                error = entry.error.as_deref().unwrap_or_default(),
                "Audit failure"
            );
        }
        Ok(())
    }
}
