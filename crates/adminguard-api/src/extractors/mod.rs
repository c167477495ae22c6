//! Custom Axum extractors.

pub mod auth;
pub mod client;

pub use auth::{AdminAuth, BearerToken};
pub use client::ClientMeta;
