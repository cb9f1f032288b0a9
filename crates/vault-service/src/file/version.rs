//! Versioning: archive-before-overwrite commits and restores.
//!
//! Every commit and every restore appends exactly one version holding the
//! state being replaced, so a file's history only ever grows.

use std::sync::Arc;

use bytes::Bytes;
use chrono::Utc;
use tracing::{info, warn};

use vault_catalog::CatalogStore;
use vault_core::error::AppError;
use vault_core::result::AppResult;
use vault_core::traits::blob::BlobStore;
use vault_core::types::id::{AccountId, FileId, VersionId};
use vault_entity::file::{ContentKind, ContentUpdate, FileRecord, VersionRecord};
use vault_storage::BlobKeyGenerator;
use vault_storage::mime::resolve_mime_type;

use crate::file::upload::{ProgressSink, as_metadata_failure, resolve_content_ref, write_content};
use crate::intent::{IntentKind, IntentLog};

/// New content for an existing file.
#[derive(Debug, Clone)]
pub struct NewVersion {
    /// Name of the source file. Used in the blob key only; the catalog
    /// name of the file is kept.
    pub original_name: String,
    /// Declared MIME type; guessed from the name when absent.
    pub mime_type: Option<String>,
    /// File content.
    pub data: Bytes,
}

impl NewVersion {
    /// Creates new content from a source name and its bytes.
    pub fn new(original_name: impl Into<String>, data: impl Into<Bytes>) -> Self {
        Self {
            original_name: original_name.into(),
            mime_type: None,
            data: data.into(),
        }
    }

    /// Declares the MIME type.
    pub fn with_mime_type(mut self, mime_type: impl Into<String>) -> Self {
        self.mime_type = Some(mime_type.into());
        self
    }
}

/// Result of a successful commit or restore.
#[derive(Debug, Clone)]
pub struct VersionOutcome {
    /// The file as stored afterwards.
    pub file: FileRecord,
    /// The version that captured the replaced state.
    pub archived: VersionRecord,
}

/// Manages file version history.
#[derive(Debug, Clone)]
pub struct VersionService {
    /// Owning account.
    account: AccountId,
    /// Metadata catalog.
    catalog: Arc<dyn CatalogStore>,
    /// Blob store.
    blobs: Arc<dyn BlobStore>,
    /// Blob key layout.
    keys: BlobKeyGenerator,
    /// Intent log.
    intents: IntentLog,
}

impl VersionService {
    /// Creates a new version service.
    pub fn new(
        account: AccountId,
        catalog: Arc<dyn CatalogStore>,
        blobs: Arc<dyn BlobStore>,
        keys: BlobKeyGenerator,
        intents: IntentLog,
    ) -> Self {
        Self {
            account,
            catalog,
            blobs,
            keys,
            intents,
        }
    }

    /// Lists the version history of a file, most recent first.
    ///
    /// History outlives the file, so this does not require the file to
    /// still exist.
    pub async fn list_versions(&self, file_id: FileId) -> AppResult<Vec<VersionRecord>> {
        self.catalog.list_versions(file_id).await
    }

    /// Replaces a file's content, archiving its current state first.
    ///
    /// The archive is written before any content is streamed. If the
    /// stream or the record update fails afterwards, the archive stays in
    /// the history even though the file did not change.
    pub async fn commit_new_version(
        &self,
        file_id: FileId,
        content: NewVersion,
        progress: &ProgressSink,
    ) -> AppResult<VersionOutcome> {
        let file = self.find_file(file_id).await?;

        let blob_key = self.keys.generate(&self.account, &content.original_name);
        let intent = self
            .intents
            .record(IntentKind::VersionCommit {
                file_id,
                blob_key: blob_key.clone(),
            })
            .await;

        let archived = VersionRecord::archive(&file, Utc::now());
        if let Err(err) = self.catalog.append_version(&archived).await {
            self.intents.abort(intent, err.to_string()).await;
            return Err(as_metadata_failure(err));
        }

        let size_bytes =
            match write_content(self.blobs.as_ref(), &blob_key, content.data, progress).await {
                Ok(size) => size,
                Err(err) => {
                    warn!(
                        account = %self.account,
                        file_id = %file_id,
                        version_id = %archived.id,
                        error = %err,
                        "New version upload failed after archiving"
                    );
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
                    "Content reference failed after new version upload; blob is orphaned"
                );
                return Err(err);
            }
        };

        let mime_type = resolve_mime_type(content.mime_type.as_deref(), &content.original_name);
        let update = ContentUpdate {
            name: None,
            size_bytes,
            kind: ContentKind::from_mime_type(&mime_type),
            mime_type,
            blob_key,
            content_ref,
            updated_at: Utc::now(),
        };

        let file = match self.catalog.update_file_content(file_id, &update).await {
            Ok(stored) => stored,
            Err(err) => {
                warn!(
                    account = %self.account,
                    file_id = %file_id,
                    blob_key = %update.blob_key,
                    error = %err,
                    "File update failed after new version upload; blob is orphaned"
                );
                return Err(as_metadata_failure(err));
            }
        };

        self.intents.complete(intent).await;
        info!(
            account = %self.account,
            file_id = %file_id,
            version_id = %archived.id,
            size = file.size_bytes,
            "New version committed"
        );
        Ok(VersionOutcome { file, archived })
    }

    /// Restores a file to a version from its history.
    ///
    /// The current state is archived first. The restored version stays in
    /// the history, and the blob the file pointed to before the restore is
    /// kept (it is still referenced by the new archive entry).
    pub async fn restore_version(
        &self,
        file_id: FileId,
        version_id: VersionId,
    ) -> AppResult<VersionOutcome> {
        let file = self.find_file(file_id).await?;
        let version = self
            .catalog
            .list_versions(file_id)
            .await?
            .into_iter()
            .find(|v| v.id == version_id)
            .ok_or_else(|| {
                AppError::not_found(format!("Version {version_id} of file {file_id} not found"))
            })?;

        let intent = self
            .intents
            .record(IntentKind::Restore {
                file_id,
                version_id,
            })
            .await;

        let archived = VersionRecord::archive(&file, Utc::now());
        if let Err(err) = self.catalog.append_version(&archived).await {
            self.intents.abort(intent, err.to_string()).await;
            return Err(as_metadata_failure(err));
        }

        let file = match self
            .catalog
            .update_file_content(file_id, &version.restore_update(Utc::now()))
            .await
        {
            Ok(stored) => stored,
            Err(err) => {
                warn!(
                    account = %self.account,
                    file_id = %file_id,
                    version_id = %version_id,
                    error = %err,
                    "File update failed after archiving for restore"
                );
                return Err(as_metadata_failure(err));
            }
        };

        self.intents.complete(intent).await;
        info!(
            account = %self.account,
            file_id = %file_id,
            version_id = %version_id,
            "File restored to version"
        );
        Ok(VersionOutcome { file, archived })
    }

    async fn find_file(&self, file_id: FileId) -> AppResult<FileRecord> {
        self.catalog
            .find_file(file_id)
            .await?
            .ok_or_else(|| AppError::not_found(format!("File {file_id} not found")))
    }
}
