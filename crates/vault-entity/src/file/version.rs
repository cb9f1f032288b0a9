//! Archived file version entity.

use chrono::{DateTime, Utc};
use serde::{Deserialize, Serialize};

use vault_core::types::blob::{BlobKey, ContentRef};
use vault_core::types::id::{FileId, VersionId};

use super::kind::ContentKind;
use super::model::{ContentUpdate, FileRecord};

/// A prior state of a file, appended to its version chain.
///
/// Version chains are append-only and outlive later overwrites of the
/// parent file.
#[derive(Debug, Clone, PartialEq, Serialize, Deserialize)]
#[serde(rename_all = "camelCase")]
pub struct VersionRecord {
    /// Unique version identifier.
    pub id: VersionId,
    /// The file this version belongs to.
    pub parent_file_id: FileId,
    /// Name at the time of archiving.
    pub name: String,
    /// Size in bytes.
    pub size_bytes: u64,
    /// Content classification.
    pub kind: ContentKind,
    /// MIME type.
    pub mime_type: String,
    /// Address of the archived content.
    pub blob_key: BlobKey,
    /// Retrieval reference captured when archived.
    pub content_ref: ContentRef,
    /// When this version was archived.
    pub archived_at: DateTime<Utc>,
}

impl VersionRecord {
    /// Capture the current state of `file` as a new version.
    pub fn archive(file: &FileRecord, archived_at: DateTime<Utc>) -> Self {
        Self {
            id: VersionId::new(),
            parent_file_id: file.id,
            name: file.name.clone(),
            size_bytes: file.size_bytes,
            kind: file.kind,
            mime_type: file.mime_type.clone(),
            blob_key: file.blob_key.clone(),
            content_ref: file.content_ref.clone(),
            archived_at,
        }
    }

    /// The update that puts this version's name and content back on its file.
    pub fn restore_update(&self, updated_at: DateTime<Utc>) -> ContentUpdate {
        ContentUpdate {
            name: Some(self.name.clone()),
            size_bytes: self.size_bytes,
            kind: self.kind,
            mime_type: self.mime_type.clone(),
            blob_key: self.blob_key.clone(),
            content_ref: self.content_ref.clone(),
            updated_at,
        }
    }

    /// Whether this version holds the same content fields as `file`.
    pub fn matches_content(&self, file: &FileRecord) -> bool {
        self.name == file.name
            && self.size_bytes == file.size_bytes
            && self.mime_type == file.mime_type
            && self.blob_key == file.blob_key
            && self.content_ref == file.content_ref
    }
}
