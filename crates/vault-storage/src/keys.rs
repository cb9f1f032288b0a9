//! Blob key layout: `{prefix}/{account}/{unique}_{original_name}`.

use uuid::Uuid;

use vault_core::types::blob::BlobKey;
use vault_core::types::id::AccountId;

/// Generates account-namespaced blob keys.
#[derive(Debug, Clone)]
pub struct BlobKeyGenerator {
    /// Optional leading path segment.
    prefix: String,
}

impl BlobKeyGenerator {
    /// Create a generator. An empty prefix yields `{account}/...` keys.
    pub fn new(prefix: impl Into<String>) -> Self {
        Self {
            prefix: prefix.into().trim_matches('/').to_string(),
        }
    }

    /// Key prefix under which every blob of `account` lives.
    pub fn account_prefix(&self, account: &AccountId) -> String {
        if self.prefix.is_empty() {
            format!("{account}/")
        } else {
            format!("{}/{account}/", self.prefix)
        }
    }

    /// Generate a fresh key for an upload of `original_name`.
    pub fn generate(&self, account: &AccountId, original_name: &str) -> BlobKey {
        let unique = Uuid::now_v7().simple();
        let name = sanitize(original_name);
        BlobKey::new(format!("{}{unique}_{name}", self.account_prefix(account)))
    }
}

/// Keep the key a single path segment below the account.
fn sanitize(name: &str) -> String {
    let cleaned: String = name
        .trim()
        .chars()
        .map(|c| if c == '/' || c == '\\' { '_' } else { c })
        .collect();
    if cleaned.is_empty() {
        "unnamed".to_string()
    } else {
        cleaned
    }
}
