//! Local filesystem blob store.

use std::path::{Path, PathBuf};

use async_trait::async_trait;
use chrono::{Duration, Utc};
use futures::stream::StreamExt;
use tokio::fs;
use tokio::io::AsyncWriteExt;
use tracing::{debug, warn};

use vault_core::error::{AppError, ErrorKind};
use vault_core::result::AppResult;
use vault_core::traits::blob::{BlobStore, ByteStream};
use vault_core::types::blob::{BlobKey, ContentRef};

/// Blob store keeping every blob as a file below a root directory.
#[derive(Debug, Clone)]
pub struct LocalBlobStore {
    /// Root directory for all stored blobs.
    root: PathBuf,
    /// Lifetime of issued content references.
    ref_ttl: Option<Duration>,
}

impl LocalBlobStore {
    /// Create a new local blob store rooted at the given path.
    pub async fn new(root_path: &str, ref_ttl: Option<Duration>) -> AppResult<Self> {
        let root = PathBuf::from(root_path);
        fs::create_dir_all(&root).await.map_err(|e| {
            AppError::with_source(
                ErrorKind::Configuration,
                format!("Failed to create blob root: {}", root.display()),
                e,
            )
        })?;
        Ok(Self { root, ref_ttl })
    }

    /// Resolve a key to an absolute path within the root.
    fn resolve(&self, key: &str) -> PathBuf {
        let clean = key.trim_start_matches('/');
        self.root.join(clean)
    }

    /// Ensure the parent directory of a path exists.
    async fn ensure_parent(&self, path: &Path) -> AppResult<()> {
        if let Some(parent) = path.parent() {
            fs::create_dir_all(parent).await.map_err(|e| {
                AppError::with_source(
                    ErrorKind::BlobStoreFailure,
                    format!("Failed to create parent directory: {}", parent.display()),
                    e,
                )
            })?;
        }
        Ok(())
    }

    /// Copy `stream` into the file at `path`.
    async fn copy_stream(&self, path: &Path, mut stream: ByteStream) -> AppResult<u64> {
        let mut file = fs::File::create(path).await.map_err(|e| {
            AppError::with_source(ErrorKind::BlobStoreFailure, "Failed to create blob file", e)
        })?;

        let mut total_bytes = 0u64;
        while let Some(chunk) = stream.next().await {
            let chunk = chunk.map_err(|e| {
                AppError::with_source(ErrorKind::BlobStoreFailure, "Stream read error", e)
            })?;
            total_bytes += chunk.len() as u64;
            file.write_all(&chunk).await.map_err(|e| {
                AppError::with_source(ErrorKind::BlobStoreFailure, "Failed to write chunk", e)
            })?;
        }

        file.flush().await.map_err(|e| {
            AppError::with_source(ErrorKind::BlobStoreFailure, "Failed to flush blob file", e)
        })?;

        Ok(total_bytes)
    }

    /// Collect every file below `dir` as a key relative to the root.
    async fn walk(&self, dir: PathBuf, keys: &mut Vec<BlobKey>) -> AppResult<()> {
        let mut pending = vec![dir];
        while let Some(current) = pending.pop() {
            let mut entries = fs::read_dir(&current).await?;
            while let Some(entry) = entries.next_entry().await? {
                let path = entry.path();
                if entry.file_type().await?.is_dir() {
                    pending.push(path);
                } else if let Ok(relative) = path.strip_prefix(&self.root) {
                    let key = relative
                        .components()
                        .map(|c| c.as_os_str().to_string_lossy())
                        .collect::<Vec<_>>()
                        .join("/");
                    keys.push(BlobKey::new(key));
                }
            }
        }
        Ok(())
    }
}

#[async_trait]
impl BlobStore for LocalBlobStore {
    fn provider_type(&self) -> &str {
        "local"
    }

    async fn write_stream(&self, key: &BlobKey, stream: ByteStream) -> AppResult<u64> {
        let full_path = self.resolve(key.as_str());
        self.ensure_parent(&full_path).await?;

        match self.copy_stream(&full_path, stream).await {
            Ok(total_bytes) => {
                debug!(blob_key = %key, bytes = total_bytes, "Wrote blob from stream");
                Ok(total_bytes)
            }
            Err(err) => {
                if let Err(cleanup) = fs::remove_file(&full_path).await {
                    if cleanup.kind() != std::io::ErrorKind::NotFound {
                        warn!(blob_key = %key, error = %cleanup, "Failed to remove partial blob");
                    }
                }
                Err(err)
            }
        }
    }

    async fn content_ref(&self, key: &BlobKey) -> AppResult<ContentRef> {
        let full_path = self.resolve(key.as_str());
        if !full_path.is_file() {
            return Err(AppError::blob_missing(format!("Blob not found: {key}")));
        }

        Ok(ContentRef {
            url: format!("file://{}", full_path.display()),
            expires_at: self.ref_ttl.map(|ttl| Utc::now() + ttl),
        })
    }

    async fn delete(&self, key: &BlobKey) -> AppResult<()> {
        let full_path = self.resolve(key.as_str());
        fs::remove_file(&full_path).await.map_err(|e| {
            if e.kind() == std::io::ErrorKind::NotFound {
                AppError::blob_missing(format!("Blob not found: {key}"))
            } else {
                AppError::with_source(
                    ErrorKind::BlobStoreFailure,
                    format!("Failed to delete blob: {key}"),
                    e,
                )
            }
        })?;

        debug!(blob_key = %key, "Deleted blob");
        Ok(())
    }

    async fn exists(&self, key: &BlobKey) -> AppResult<bool> {
        Ok(self.resolve(key.as_str()).is_file())
    }

    async fn list(&self, prefix: &str) -> AppResult<Vec<BlobKey>> {
        let mut keys = Vec::new();
        if self.root.exists() {
            self.walk(self.root.clone(), &mut keys).await?;
        }
        keys.retain(|k| k.as_str().starts_with(prefix));
        keys.sort();
        Ok(keys)
    }
}
