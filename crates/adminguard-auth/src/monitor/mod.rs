//! Cross-account login monitoring, alerting and IP blocking.

pub mod rules;
pub mod service;

pub use rules::RuleThresholds;
pub use service::SecurityMonitor;
