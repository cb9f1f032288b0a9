//! Upload protocol: quota gate, blob stream, then catalog record.

use std::fmt;
use std::sync::Arc;

use bytes::Bytes;
use chrono::Utc;
use futures::StreamExt;
use tracing::{info, warn};

use vault_catalog::CatalogStore;
use vault_core::error::{AppError, ErrorKind};
use vault_core::result::AppResult;
use vault_core::traits::blob::{BlobStore, ByteStream};
use vault_core::types::blob::{BlobKey, ContentRef};
use vault_core::types::id::{AccountId, FileId, FolderId};
use vault_entity::file::{ContentKind, FileRecord};
use vault_entity::quota::{QuotaGate, QuotaStatus};
use vault_storage::BlobKeyGenerator;
use vault_storage::mime::resolve_mime_type;

use crate::intent::{IntentKind, IntentLog};

/// Size of the chunks content is streamed to the blob store in.
pub const UPLOAD_CHUNK_SIZE: usize = 64 * 1024;

/// Receives upload progress as a fraction in `[0, 1]`.
#[derive(Clone)]
pub struct ProgressSink(Arc<dyn Fn(f64) + Send + Sync>);

impl ProgressSink {
    /// Wraps a progress callback.
    pub fn new(callback: impl Fn(f64) + Send + Sync + 'static) -> Self {
        Self(Arc::new(callback))
    }

    /// A sink that drops every report.
    pub fn noop() -> Self {
        Self::new(|_| {})
    }

    /// Reports progress, clamped to `[0, 1]`.
    pub fn report(&self, fraction: f64) {
        (self.0)(fraction.clamp(0.0, 1.0));
    }
}

impl Default for ProgressSink {
    fn default() -> Self {
        Self::noop()
    }
}

impl fmt::Debug for ProgressSink {
    fn fmt(&self, f: &mut fmt::Formatter<'_>) -> fmt::Result {
        f.debug_struct("ProgressSink").finish_non_exhaustive()
    }
}

/// A file to upload.
#[derive(Debug, Clone)]
pub struct UploadRequest {
    /// Name of the source file. Always used in the blob key.
    pub original_name: String,
    /// Name shown in the catalog, if different from the original.
    pub display_name: Option<String>,
    /// Declared MIME type; guessed from the name when absent.
    pub mime_type: Option<String>,
    /// Target folder (`None` for the root).
    pub folder_id: Option<FolderId>,
    /// File content.
    pub data: Bytes,
}

impl UploadRequest {
    /// Creates a request for a root-level upload.
    pub fn new(original_name: impl Into<String>, data: impl Into<Bytes>) -> Self {
        Self {
            original_name: original_name.into(),
            display_name: None,
            mime_type: None,
            folder_id: None,
            data: data.into(),
        }
    }

    /// Places the upload in a folder.
    pub fn in_folder(mut self, folder_id: FolderId) -> Self {
        self.folder_id = Some(folder_id);
        self
    }

    /// Overrides the catalog name.
    pub fn with_display_name(mut self, name: impl Into<String>) -> Self {
        self.display_name = Some(name.into());
        self
    }

    /// Declares the MIME type.
    pub fn with_mime_type(mut self, mime_type: impl Into<String>) -> Self {
        self.mime_type = Some(mime_type.into());
        self
    }

    /// The name the catalog record will carry.
    pub fn catalog_name(&self) -> String {
        self.display_name
            .as_deref()
            .map(str::trim)
            .filter(|n| !n.is_empty())
            .unwrap_or(self.original_name.trim())
            .to_string()
    }
}

/// Runs the upload protocol for one account.
#[derive(Debug, Clone)]
pub struct UploadService {
    /// Owning account.
    account: AccountId,
    /// Metadata catalog.
    catalog: Arc<dyn CatalogStore>,
    /// Blob store.
    blobs: Arc<dyn BlobStore>,
    /// Blob key layout.
    keys: BlobKeyGenerator,
    /// File-count ceiling.
    quota: QuotaGate,
    /// Intent log.
    intents: IntentLog,
}

impl UploadService {
    /// Creates a new upload service.
    pub fn new(
        account: AccountId,
        catalog: Arc<dyn CatalogStore>,
        blobs: Arc<dyn BlobStore>,
        keys: BlobKeyGenerator,
        quota: QuotaGate,
        intents: IntentLog,
    ) -> Self {
        Self {
            account,
            catalog,
            blobs,
            keys,
            quota,
            intents,
        }
    }

    /// Current usage against the file-count ceiling.
    pub async fn quota_status(&self) -> AppResult<QuotaStatus> {
        let count = self.catalog.count_files().await?;
        Ok(self.quota.status(count))
    }

    /// Uploads a file.
    ///
    /// Fails with `QuotaExceeded` before any blob store call when the
    /// ceiling is reached, with `UploadFailure` when streaming fails (no
    /// record is written), and with `MetadataWriteFailure` when the record
    /// cannot be written after the blob was stored. The blob is orphaned
    /// in the last case and the upload intent stays pending.
    pub async fn upload(
        &self,
        request: UploadRequest,
        progress: &ProgressSink,
    ) -> AppResult<FileRecord> {
        if request.original_name.trim().is_empty() {
            return Err(AppError::validation("File name cannot be empty"));
        }

        let count = self.catalog.count_files().await?;
        self.quota.check(count)?;

        if let Some(folder_id) = request.folder_id {
            self.catalog
                .find_folder(folder_id)
                .await?
                .ok_or_else(|| AppError::not_found(format!("Folder {folder_id} not found")))?;
        }

        let mime_type = resolve_mime_type(request.mime_type.as_deref(), &request.original_name);
        let kind = ContentKind::from_mime_type(&mime_type);
        let name = request.catalog_name();

        let file_id = FileId::new();
        let blob_key = self.keys.generate(&self.account, &request.original_name);
        let intent = self
            .intents
            .record(IntentKind::Upload {
                file_id,
                blob_key: blob_key.clone(),
            })
            .await;

        let size_bytes =
            match write_content(self.blobs.as_ref(), &blob_key, request.data, progress).await {
                Ok(size) => size,
                Err(err) => {
                    warn!(account = %self.account, blob_key = %blob_key, error = %err, "Upload stream failed");
                    self.intents.abort(intent, err.to_string()).await;
                    return Err(err);
                }
            };
        let content_ref = match resolve_content_ref(self.blobs.as_ref(), &blob_key).await {
            Ok(content_ref) => content_ref,
            Err(err) => {
                warn!(
                    account = %self.account,
                    file_id = %file_id,
                    blob_key = %blob_key,
                    error = %err,
                    "Content reference failed after upload; blob is orphaned"
                );
                return Err(err);
            }
        };

        let now = Utc::now();
        let record = FileRecord {
            id: file_id,
            name,
            size_bytes,
            kind,
            mime_type,
            folder_id: request.folder_id,
            blob_key,
            content_ref,
            created_at: now,
            updated_at: now,
        };

        if let Err(err) = self.catalog.insert_file(&record).await {
            warn!(
                account = %self.account,
                file_id = %record.id,
                blob_key = %record.blob_key,
                error = %err,
                "File record write failed; blob is orphaned"
            );
            return Err(as_metadata_failure(err));
        }

        self.intents.complete(intent).await;
        info!(
            account = %self.account,
            file_id = %record.id,
            name = %record.name,
            size = record.size_bytes,
            "Upload completed"
        );
        Ok(record)
    }
}

/// Streams `data` to `key`, reporting progress per chunk.
///
/// Any blob store failure surfaces as `UploadFailure`.
pub(crate) async fn write_content(
    blobs: &dyn BlobStore,
    key: &BlobKey,
    data: Bytes,
    progress: &ProgressSink,
) -> AppResult<u64> {
    let written = blobs
        .write_stream(key, progress_stream(data, progress.clone()))
        .await
        .map_err(|e| e.into_kind(ErrorKind::UploadFailure))?;
    progress.report(1.0);
    Ok(written)
}

/// Resolves a retrieval reference for freshly written content.
pub(crate) async fn resolve_content_ref(
    blobs: &dyn BlobStore,
    key: &BlobKey,
) -> AppResult<ContentRef> {
    blobs
        .content_ref(key)
        .await
        .map_err(|e| e.into_kind(ErrorKind::UploadFailure))
}

/// Labels a catalog write error as `MetadataWriteFailure` unless it is
/// already more specific.
pub(crate) fn as_metadata_failure(err: AppError) -> AppError {
    if err.is(ErrorKind::NotFound) || err.is(ErrorKind::MetadataWriteFailure) {
        err
    } else {
        err.into_kind(ErrorKind::MetadataWriteFailure)
    }
}

fn progress_stream(data: Bytes, progress: ProgressSink) -> ByteStream {
    let total = data.len();
    let chunks: Vec<Bytes> = (0..total)
        .step_by(UPLOAD_CHUNK_SIZE)
        .map(|start| data.slice(start..(start + UPLOAD_CHUNK_SIZE).min(total)))
        .collect();

    let mut sent = 0usize;
    Box::pin(futures::stream::iter(chunks).map(move |chunk| {
        sent += chunk.len();
        progress.report(sent as f64 / total as f64);
        Ok::<_, std::io::Error>(chunk)
    }))
}

#[cfg(test)]
mod tests {
    use std::sync::Mutex;
    use std::sync::atomic::Ordering;

    use crate::intent::IntentStatus;
    use crate::testing::Fixture;

    use super::*;

    #[tokio::test]
    async fn test_upload_writes_blob_then_record() {
        let fx = Fixture::new();
        let file = fx
            .uploads
            .upload(
                UploadRequest::new("photo.png", vec![1u8; 10]),
                &ProgressSink::noop(),
            )
            .await
            .unwrap();

        assert_eq!(file.size_bytes, 10);
        assert_eq!(file.kind, ContentKind::Image);
        assert_eq!(file.mime_type, "image/png");
        assert!(file.blob_key.as_str().starts_with("user_uploads/acct-1/"));
        assert!(file.blob_key.as_str().ends_with("_photo.png"));
        assert!(fx.blobs.exists(&file.blob_key).await.unwrap());
        assert_eq!(fx.catalog.find_file(file.id).await.unwrap(), Some(file));
        assert!(fx.intents.pending().await.is_empty());
    }

    #[tokio::test]
    async fn test_progress_is_monotonic_and_ends_at_one() {
        let fx = Fixture::new();
        let seen = Arc::new(Mutex::new(Vec::new()));
        let sink = {
            let seen = seen.clone();
            ProgressSink::new(move |p| seen.lock().unwrap().push(p))
        };

        let data = vec![0u8; UPLOAD_CHUNK_SIZE * 2 + 10];
        fx.uploads
            .upload(UploadRequest::new("big.bin", data), &sink)
            .await
            .unwrap();

        let seen = seen.lock().unwrap();
        assert!(seen.len() >= 3);
        assert!(seen.windows(2).all(|w| w[0] <= w[1]));
        assert!(seen.iter().all(|p| (0.0..=1.0).contains(p)));
        assert_eq!(seen.last().copied(), Some(1.0));
    }

    #[tokio::test]
    async fn test_display_name_does_not_change_blob_key() {
        let fx = Fixture::new();
        let file = fx
            .uploads
            .upload(
                UploadRequest::new("scan_0001.pdf", vec![1u8; 4]).with_display_name("Contract"),
                &ProgressSink::noop(),
            )
            .await
            .unwrap();

        assert_eq!(file.name, "Contract");
        assert_eq!(file.kind, ContentKind::Pdf);
        assert!(file.blob_key.as_str().ends_with("_scan_0001.pdf"));
    }

    #[tokio::test]
    async fn test_quota_rejects_before_blob_store() {
        let fx = Fixture::with_quota(Some(1));
        fx.upload("a.txt", 1).await;

        let err = fx
            .uploads
            .upload(UploadRequest::new("b.txt", "b"), &ProgressSink::noop())
            .await
            .unwrap_err();
        assert!(err.is(ErrorKind::QuotaExceeded));
        assert_eq!(fx.blobs.calls().writes.load(Ordering::SeqCst), 1);

        let status = fx.uploads.quota_status().await.unwrap();
        assert!(status.reached);
        assert_eq!(status.remaining, Some(0));
    }

    #[tokio::test]
    async fn test_stream_failure_leaves_nothing() {
        let fx = Fixture::new();
        fx.blobs.set_fail_writes(true).await;

        let err = fx
            .uploads
            .upload(UploadRequest::new("a.txt", "abc"), &ProgressSink::noop())
            .await
            .unwrap_err();
        assert!(err.is(ErrorKind::UploadFailure));
        assert!(fx.catalog.list_files().await.unwrap().is_empty());
        assert!(fx.blobs.is_empty().await);

        let intents = fx.intents.all().await;
        assert_eq!(intents[0].status, IntentStatus::Aborted);
    }

    #[tokio::test]
    async fn test_record_failure_orphans_blob_and_keeps_intent_pending() {
        let fx = Fixture::new();
        fx.catalog.set_fail_writes(true).await;

        let err = fx
            .uploads
            .upload(UploadRequest::new("a.txt", "abc"), &ProgressSink::noop())
            .await
            .unwrap_err();
        assert!(err.is(ErrorKind::MetadataWriteFailure));
        assert_eq!(fx.blobs.len().await, 1);
        assert_eq!(fx.intents.pending().await.len(), 1);
    }

    #[tokio::test]
    async fn test_content_ref_failure_keeps_intent_pending() {
        let fx = Fixture::new();
        fx.blobs.set_fail_content_refs(true).await;

        let err = fx
            .uploads
            .upload(UploadRequest::new("a.txt", "abc"), &ProgressSink::noop())
            .await
            .unwrap_err();
        assert!(err.is(ErrorKind::UploadFailure));
        assert!(fx.catalog.list_files().await.unwrap().is_empty());
        assert_eq!(fx.blobs.len().await, 1);
        assert_eq!(fx.intents.pending().await.len(), 1);

        fx.blobs.set_fail_content_refs(false).await;
        let report = fx.reconciler.run().await;
        assert_eq!(report.orphans_deleted(), 1);
        assert!(fx.blobs.is_empty().await);
    }

    #[tokio::test]
    async fn test_missing_folder_is_rejected() {
        let fx = Fixture::new();
        let err = fx
            .uploads
            .upload(
                UploadRequest::new("a.txt", "abc").in_folder(FolderId::new()),
                &ProgressSink::noop(),
            )
            .await
            .unwrap_err();
        assert!(err.is(ErrorKind::NotFound));
        assert!(fx.blobs.is_empty().await);
    }
}
