//! Convenience result type alias for GrowthWatch.

use crate::error::AppError;

/// A specialized `Result` type for GrowthWatch operations.
pub type AppResult<T> = Result<T, AppError>;
