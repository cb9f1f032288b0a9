//! Convenience result type alias for VaultFlow.

use crate::error::AppError;

/// A specialized `Result` type for VaultFlow operations.
pub type AppResult<T> = Result<T, AppError>;
