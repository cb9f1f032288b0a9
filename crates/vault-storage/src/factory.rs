//! Builds the configured blob store.

use std::sync::Arc;

use chrono::Duration;
use tracing::info;

use vault_core::config::blob::BlobConfig;
use vault_core::error::AppError;
use vault_core::result::AppResult;
use vault_core::traits::blob::BlobStore;

use crate::providers::MemoryBlobStore;

/// Content reference lifetime from config (`0` = never expires).
pub fn ref_ttl(config: &BlobConfig) -> Option<Duration> {
    match config.content_ref_ttl_seconds {
        0 => None,
        secs => Some(Duration::seconds(secs as i64)),
    }
}

/// Instantiate the blob store named by `config.provider`.
pub async fn build_blob_store(config: &BlobConfig) -> AppResult<Arc<dyn BlobStore>> {
    let ttl = ref_ttl(config);
    let store: Arc<dyn BlobStore> = match config.provider.as_str() {
        "memory" => Arc::new(MemoryBlobStore::new(ttl)),
        #[cfg(feature = "local")]
        "local" => Arc::new(
            crate::providers::LocalBlobStore::new(&config.local.root_path, ttl).await?,
        ),
        other => {
            return Err(AppError::configuration(format!(
                "Unknown blob store provider '{other}'"
            )));
        }
    };

    info!(provider = store.provider_type(), "Blob store initialized");
    Ok(store)
}
