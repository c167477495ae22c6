//! Security monitoring entities.

pub mod alert;
pub mod attempt;
pub mod metrics;

pub use alert::{AlertCategory, AlertSeverity, AlertStatus, SecurityAlert};
pub use attempt::{BlockedIp, LoginAttempt};
pub use metrics::{IpFailureCount, SecurityMetrics, SeverityCounts, TimeRange};
