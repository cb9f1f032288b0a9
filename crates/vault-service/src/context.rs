//! The authenticated principal a vault is opened for.

use chrono::{DateTime, Utc};
use serde::{Deserialize, Serialize};

use vault_core::error::AppError;
use vault_core::result::AppResult;
use vault_core::types::id::AccountId;

/// Principal handed over by the identity provider.
///
/// The vault only needs a stable account identifier to namespace catalog
/// collections and blob keys; sign-in itself happens upstream.
#[derive(Debug, Clone, Serialize, Deserialize)]
pub struct AccountContext {
    /// Stable account identifier.
    pub account: AccountId,
    /// Whether the identity provider has verified the principal.
    pub verified: bool,
    /// When the principal was handed over.
    pub signed_in_at: DateTime<Utc>,
}

impl AccountContext {
    /// Creates a context for a verified principal.
    pub fn verified(account: impl Into<String>) -> Self {
        Self {
            account: AccountId::new(account),
            verified: true,
            signed_in_at: Utc::now(),
        }
    }

    /// Creates a context for a principal still awaiting verification.
    pub fn unverified(account: impl Into<String>) -> Self {
        Self {
            verified: false,
            ..Self::verified(account)
        }
    }

    /// Returns the account id, or `VerificationRequired` if the principal
    /// has not been verified yet.
    pub fn require_verified(&self) -> AppResult<&AccountId> {
        if self.verified {
            Ok(&self.account)
        } else {
            Err(AppError::verification_required(format!(
                "Account {} must be verified before opening the vault",
                self.account
            )))
        }
    }
}
