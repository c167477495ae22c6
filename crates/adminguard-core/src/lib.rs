//! # adminguard-core
//!
//! Core crate for AdminGuard. Contains the unified error system,
//! configuration schemas, typed identifiers, the clock abstraction, and the
//! capability traits (credential verification, MFA verification, attempt
//! counters) implemented by other crates.
//!
//! This crate has **no** internal dependencies on other AdminGuard crates.

pub mod config;
pub mod error;
pub mod result;
pub mod traits;
pub mod types;

pub use error::{AppError, ErrorKind};
pub use result::AppResult;
