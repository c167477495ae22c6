//! Capability traits defined in `adminguard-core` and implemented by other crates.

pub mod counter_store;
pub mod credential;
pub mod mfa;

pub use counter_store::{CounterStore, WindowDecision};
pub use credential::CredentialVerifier;
pub use mfa::MfaVerifier;
