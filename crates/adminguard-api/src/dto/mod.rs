//! Request and response bodies.

pub mod request;
pub mod response;
pub mod validation;

pub use validation::{ValidatedJson, ValidatedQuery};
