//! Convenience result type alias for AdminGuard.

use crate::error::AppError;

/// A specialized `Result` type for AdminGuard operations.
pub type AppResult<T> = Result<T, AppError>;
