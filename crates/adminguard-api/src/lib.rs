//! # adminguard-api
//!
//! HTTP transport for AdminGuard built on Axum.
//!
//! Exposes login, logout, refresh and session introspection under
//! `/api/auth`, and the security and audit surface under `/api/admin`.
//! Provides middleware (request logging, CORS), extractors (client
//! metadata, authenticated admin), DTOs and error mapping.

pub mod app;
pub mod dto;
pub mod error;
pub mod extractors;
pub mod handlers;
pub mod middleware;
pub mod router;
pub mod state;

pub use app::{build_app, serve};
pub use error::ApiError;
pub use state::AppState;
