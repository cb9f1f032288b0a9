//! File reads, two-phase delete, rename, and content reference refresh.

use std::sync::Arc;

use chrono::Utc;
use tracing::{info, warn};

use vault_catalog::CatalogStore;
use vault_core::error::AppError;
use vault_core::result::AppResult;
use vault_core::traits::blob::BlobStore;
use vault_core::types::blob::ContentRef;
use vault_core::types::id::{AccountId, FileId};
use vault_entity::file::FileRecord;

use crate::file::upload::as_metadata_failure;
use crate::intent::{IntentKind, IntentLog};
use crate::naming::normalize_rename;

/// File operations other than upload and versioning.
#[derive(Debug, Clone)]
pub struct FileService {
    /// Owning account.
    account: AccountId,
    /// Metadata catalog.
    catalog: Arc<dyn CatalogStore>,
    /// Blob store.
    blobs: Arc<dyn BlobStore>,
    /// Intent log.
    intents: IntentLog,
}

impl FileService {
    /// Creates a new file service.
    pub fn new(
        account: AccountId,
        catalog: Arc<dyn CatalogStore>,
        blobs: Arc<dyn BlobStore>,
        intents: IntentLog,
    ) -> Self {
        Self {
            account,
            catalog,
            blobs,
            intents,
        }
    }

    /// Gets a file by ID.
    pub async fn get_file(&self, file_id: FileId) -> AppResult<FileRecord> {
        self.catalog
            .find_file(file_id)
            .await?
            .ok_or_else(|| AppError::not_found(format!("File {file_id} not found")))
    }

    /// Lists every file, newest first.
    pub async fn list_files(&self) -> AppResult<Vec<FileRecord>> {
        self.catalog.list_files().await
    }

    /// Deletes a file: blob first, then the record.
    ///
    /// If the blob is already absent (`BlobMissing`) or the blob store
    /// fails (`BlobStoreFailure`) the record is left untouched. A record
    /// delete failure after the blob is gone surfaces as
    /// `MetadataWriteFailure` with the delete intent left pending.
    pub async fn delete_file(&self, file_id: FileId) -> AppResult<()> {
        let file = self.get_file(file_id).await?;
        let intent = self
            .intents
            .record(IntentKind::Delete {
                file_id,
                blob_key: file.blob_key.clone(),
            })
            .await;

        if let Err(err) = self.blobs.delete(&file.blob_key).await {
            warn!(
                account = %self.account,
                file_id = %file_id,
                blob_key = %file.blob_key,
                error = %err,
                "Blob delete failed; keeping file record"
            );
            self.intents.abort(intent, err.to_string()).await;
            return Err(err);
        }

        if let Err(err) = self.catalog.delete_file(file_id).await {
            warn!(
                account = %self.account,
                file_id = %file_id,
                error = %err,
                "File record delete failed after blob was removed"
            );
            return Err(as_metadata_failure(err));
        }

        self.intents.complete(intent).await;
        info!(account = %self.account, file_id = %file_id, name = %file.name, "File deleted");
        Ok(())
    }

    /// Renames a file. Returns the record as stored afterwards.
    ///
    /// A draft equal to the current name performs no write. Only the name
    /// and `updated_at` are written, so a concurrent version commit or
    /// restore keeps its content fields. Concurrent renames resolve
    /// last-write-wins.
    pub async fn rename_file(&self, file_id: FileId, draft: &str) -> AppResult<FileRecord> {
        let file = self.get_file(file_id).await?;
        let Some(name) = normalize_rename(&file.name, draft)? else {
            return Ok(file);
        };

        let stored = self
            .catalog
            .update_file_name(file_id, &name, Utc::now())
            .await
            .map_err(as_metadata_failure)?;

        info!(account = %self.account, file_id = %file_id, name = %stored.name, "File renamed");
        Ok(stored)
    }

    /// Returns a usable content reference for a file, deriving a fresh one
    /// from its blob key when the cached reference has expired.
    pub async fn resolve_content_ref(&self, file_id: FileId) -> AppResult<ContentRef> {
        let file = self.get_file(file_id).await?;
        if !file.content_ref.is_expired_at(Utc::now()) {
            return Ok(file.content_ref);
        }
        self.blobs.content_ref(&file.blob_key).await
    }
}
