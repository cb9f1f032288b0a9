//! Rename input handling shared by files and folders.

use vault_core::error::AppError;
use vault_core::result::AppResult;

/// Normalizes a rename draft against the current name.
///
/// Returns `None` when the trimmed draft equals the current name, so no
/// write is needed. A blank draft is a validation error.
pub fn normalize_rename(current: &str, draft: &str) -> AppResult<Option<String>> {
    let trimmed = draft.trim();
    if trimmed.is_empty() {
        return Err(AppError::validation("Name cannot be empty"));
    }
    if trimmed == current {
        return Ok(None);
    }
    Ok(Some(trimmed.to_string()))
}
