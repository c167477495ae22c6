//! # adminguard-entity
//!
//! Domain entity models for AdminGuard. Every struct in this crate is a
//! record held by one of the security components or a value object passed
//! across their boundaries. All entities derive `Debug`, `Clone`,
//! `Serialize` and `Deserialize`, and serialize with camelCase field names.

pub mod account;
pub mod audit;
pub mod security;
pub mod session;
