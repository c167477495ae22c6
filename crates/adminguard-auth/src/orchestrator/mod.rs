//! The login, logout and refresh state machine composing every component.

pub mod components;
pub mod outcome;
pub mod service;

pub use components::AuthComponents;
pub use outcome::{LoginOutcome, LoginRequest, LoginSuccess, RefreshedTokens};
pub use service::AuthOrchestrator;
