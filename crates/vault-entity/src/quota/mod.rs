//! Upload quota gate value object.

use serde::{Deserialize, Serialize};

use vault_core::error::AppError;
use vault_core::result::AppResult;

/// Advisory, client-side file-count ceiling evaluated before an upload
/// touches any store. Not a security boundary.
#[derive(Debug, Clone, Copy, PartialEq, Eq, Serialize, Deserialize)]
pub struct QuotaGate {
    /// Maximum number of files (`None` = unlimited).
    pub max_files: Option<u64>,
}

/// Snapshot of quota usage for display next to the upload action.
#[derive(Debug, Clone, Copy, PartialEq, Eq, Serialize, Deserialize)]
pub struct QuotaStatus {
    /// Files currently stored.
    pub used: u64,
    /// Ceiling (`None` = unlimited).
    pub limit: Option<u64>,
    /// Files that can still be uploaded (`None` = unlimited).
    pub remaining: Option<u64>,
    /// Whether the ceiling has been reached.
    pub reached: bool,
}

impl QuotaGate {
    /// Create a gate with the given ceiling.
    pub fn new(max_files: Option<u64>) -> Self {
        Self { max_files }
    }

    /// A gate that never rejects.
    pub fn unlimited() -> Self {
        Self { max_files: None }
    }

    /// Check if the ceiling is reached for `current_count` files.
    pub fn is_reached(&self, current_count: u64) -> bool {
        match self.max_files {
            Some(max) => current_count >= max,
            None => false,
        }
    }

    /// Reject with `QuotaExceeded` when the ceiling is reached.
    pub fn check(&self, current_count: u64) -> AppResult<()> {
        match self.max_files {
            Some(max) if current_count >= max => Err(AppError::quota_exceeded(format!(
                "File limit reached ({current_count}/{max}); upgrade to upload more files"
            ))),
            _ => Ok(()),
        }
    }

    /// Usage report for `current_count` files.
    pub fn status(&self, current_count: u64) -> QuotaStatus {
        QuotaStatus {
            used: current_count,
            limit: self.max_files,
            remaining: self.max_files.map(|max| max.saturating_sub(current_count)),
            reached: self.is_reached(current_count),
        }
    }
}

#[cfg(test)]
mod tests {
    use super::*;
    use vault_core::error::ErrorKind;

    #[test]
    fn test_at_ceiling_is_rejected() {
        let gate = QuotaGate::new(Some(5));
        assert!(gate.check(4).is_ok());
        let err = gate.check(5).unwrap_err();
        assert!(err.is(ErrorKind::QuotaExceeded));
        assert!(gate.check(6).is_err());
    }

    #[test]
    fn test_unlimited_never_rejects() {
        assert!(QuotaGate::unlimited().check(u64::MAX).is_ok());
    }

    #[test]
    fn test_status() {
        let status = QuotaGate::new(Some(5)).status(3);
        assert_eq!(status.remaining, Some(2));
        assert!(!status.reached);
        assert!(QuotaGate::new(Some(5)).status(7).reached);
        assert_eq!(QuotaGate::new(Some(5)).status(7).remaining, Some(0));
    }
}
