//! In-memory blob store.
//!
//! Used for in-process vaults and tests. Faults can be armed to exercise
//! the partial-failure paths of the mutation protocols.

use std::collections::BTreeMap;
use std::sync::Arc;
use std::sync::atomic::{AtomicU64, Ordering};

use async_trait::async_trait;
use bytes::{Bytes, BytesMut};
use chrono::{Duration, Utc};
use futures::stream::StreamExt;
use tokio::sync::RwLock;
use tracing::debug;

use vault_core::error::{AppError, ErrorKind};
use vault_core::result::AppResult;
use vault_core::traits::blob::{BlobStore, ByteStream};
use vault_core::types::blob::{BlobKey, ContentRef};

/// Faults armed on a [`MemoryBlobStore`].
#[derive(Debug, Default, Clone, Copy)]
struct Faults {
    /// Fail every write with a transport error.
    fail_writes: bool,
    /// Fail every delete with a transient backend error.
    fail_deletes: bool,
    /// Fail every content reference request.
    fail_content_refs: bool,
}

/// Counters of calls that reached the store.
#[derive(Debug, Default)]
pub struct BlobCallCounts {
    /// Calls to `write_stream`.
    pub writes: AtomicU64,
    /// Calls to `delete`.
    pub deletes: AtomicU64,
}

/// Blob store holding blobs in a sorted in-memory map.
#[derive(Debug, Clone)]
pub struct MemoryBlobStore {
    /// Key → content.
    blobs: Arc<RwLock<BTreeMap<BlobKey, Bytes>>>,
    /// Armed faults.
    faults: Arc<RwLock<Faults>>,
    /// Call counters.
    calls: Arc<BlobCallCounts>,
    /// Lifetime of issued content references.
    ref_ttl: Option<Duration>,
}

impl MemoryBlobStore {
    /// Create an empty store.
    pub fn new(ref_ttl: Option<Duration>) -> Self {
        Self {
            blobs: Arc::new(RwLock::new(BTreeMap::new())),
            faults: Arc::new(RwLock::new(Faults::default())),
            calls: Arc::new(BlobCallCounts::default()),
            ref_ttl,
        }
    }

    /// Make every subsequent write fail (or succeed again).
    pub async fn set_fail_writes(&self, fail: bool) {
        self.faults.write().await.fail_writes = fail;
    }

    /// Make every subsequent delete fail with a transient error (or succeed again).
    pub async fn set_fail_deletes(&self, fail: bool) {
        self.faults.write().await.fail_deletes = fail;
    }

    /// Make every subsequent content reference request fail (or succeed again).
    pub async fn set_fail_content_refs(&self, fail: bool) {
        self.faults.write().await.fail_content_refs = fail;
    }

    /// Remove a blob without going through the vault, as another client
    /// or an operator would.
    pub async fn remove_out_of_band(&self, key: &BlobKey) -> bool {
        self.blobs.write().await.remove(key).is_some()
    }

    /// Number of stored blobs.
    pub async fn len(&self) -> usize {
        self.blobs.read().await.len()
    }

    /// Whether the store holds no blobs.
    pub async fn is_empty(&self) -> bool {
        self.blobs.read().await.is_empty()
    }

    /// Calls that reached the store so far.
    pub fn calls(&self) -> &BlobCallCounts {
        &self.calls
    }
}

impl Default for MemoryBlobStore {
    fn default() -> Self {
        Self::new(None)
    }
}

#[async_trait]
impl BlobStore for MemoryBlobStore {
    fn provider_type(&self) -> &str {
        "memory"
    }

    async fn write_stream(&self, key: &BlobKey, mut stream: ByteStream) -> AppResult<u64> {
        self.calls.writes.fetch_add(1, Ordering::SeqCst);

        if self.faults.read().await.fail_writes {
            return Err(AppError::blob_store(format!(
                "Connection reset while writing {key}"
            )));
        }

        // Nothing becomes visible until the whole stream has been received.
        let mut buffer = BytesMut::new();
        while let Some(chunk) = stream.next().await {
            let chunk = chunk.map_err(|e| {
                AppError::with_source(ErrorKind::BlobStoreFailure, "Stream read error", e)
            })?;
            buffer.extend_from_slice(&chunk);
        }

        let total_bytes = buffer.len() as u64;
        self.blobs.write().await.insert(key.clone(), buffer.freeze());

        debug!(blob_key = %key, bytes = total_bytes, "Stored blob in memory");
        Ok(total_bytes)
    }

    async fn content_ref(&self, key: &BlobKey) -> AppResult<ContentRef> {
        if self.faults.read().await.fail_content_refs {
            return Err(AppError::blob_store(format!(
                "Blob store unavailable while signing {key}"
            )));
        }
        if !self.blobs.read().await.contains_key(key) {
            return Err(AppError::blob_missing(format!("Blob not found: {key}")));
        }

        let expires_at = self.ref_ttl.map(|ttl| Utc::now() + ttl);
        let url = match expires_at {
            Some(at) => format!("memory://{key}?expires={}", at.timestamp()),
            None => format!("memory://{key}"),
        };
        Ok(ContentRef { url, expires_at })
    }

    async fn delete(&self, key: &BlobKey) -> AppResult<()> {
        self.calls.deletes.fetch_add(1, Ordering::SeqCst);

        if self.faults.read().await.fail_deletes {
            return Err(AppError::blob_store(format!(
                "Blob store unavailable while deleting {key}"
            )));
        }

        match self.blobs.write().await.remove(key) {
            Some(_) => {
                debug!(blob_key = %key, "Deleted blob from memory");
                Ok(())
            }
            None => Err(AppError::blob_missing(format!("Blob not found: {key}"))),
        }
    }

    async fn exists(&self, key: &BlobKey) -> AppResult<bool> {
        Ok(self.blobs.read().await.contains_key(key))
    }

    async fn list(&self, prefix: &str) -> AppResult<Vec<BlobKey>> {
        Ok(self
            .blobs
            .read()
            .await
            .keys()
            .filter(|k| k.as_str().starts_with(prefix))
            .cloned()
            .collect())
    }
}
