//! File entity model.

use chrono::{DateTime, Utc};
use serde::{Deserialize, Serialize};

use vault_core::types::blob::{BlobKey, ContentRef};
use vault_core::types::id::{FileId, FolderId};

use super::kind::ContentKind;

/// A file stored in the vault.
///
/// `blob_key` uniquely identifies the current content; `content_ref` is a
/// cache derived from it.
#[derive(Debug, Clone, PartialEq, Serialize, Deserialize)]
#[serde(rename_all = "camelCase")]
pub struct FileRecord {
    /// Unique file identifier.
    pub id: FileId,
    /// Display name.
    pub name: String,
    /// Size of the current content in bytes.
    pub size_bytes: u64,
    /// Content classification.
    pub kind: ContentKind,
    /// MIME type of the current content.
    pub mime_type: String,
    /// Containing folder (`None` for the root).
    pub folder_id: Option<FolderId>,
    /// Address of the current content.
    pub blob_key: BlobKey,
    /// Cached retrieval reference for the current content.
    pub content_ref: ContentRef,
    /// When the file was created.
    pub created_at: DateTime<Utc>,
    /// When the content or name last changed.
    pub updated_at: DateTime<Utc>,
}

/// Content fields replaced by a version commit or a restore.
///
/// `name` is only set by restores; a commit keeps the catalog name.
#[derive(Debug, Clone, PartialEq)]
pub struct ContentUpdate {
    pub name: Option<String>,
    pub size_bytes: u64,
    pub kind: ContentKind,
    pub mime_type: String,
    pub blob_key: BlobKey,
    pub content_ref: ContentRef,
    pub updated_at: DateTime<Utc>,
}

impl FileRecord {
    /// Overwrite the content fields, leaving identity, placement and
    /// (unless the update carries one) the name untouched.
    pub fn apply_content(&mut self, update: &ContentUpdate) {
        if let Some(name) = &update.name {
            self.name = name.clone();
        }
        self.size_bytes = update.size_bytes;
        self.kind = update.kind;
        self.mime_type = update.mime_type.clone();
        self.blob_key = update.blob_key.clone();
        self.content_ref = update.content_ref.clone();
        self.updated_at = update.updated_at;
    }

    /// Get the file extension (lowercase), if any.
    pub fn extension(&self) -> Option<String> {
        self.name
            .rsplit('.')
            .next()
            .filter(|ext| *ext != self.name)
            .map(|ext| ext.to_lowercase())
    }

    /// Human-readable size of the current content.
    pub fn display_size(&self) -> String {
        format_size(self.size_bytes)
    }
}

/// Format a byte count with 1024-based units and up to two decimals.
pub fn format_size(bytes: u64) -> String {
    const UNITS: [&str; 5] = ["Bytes", "KB", "MB", "GB", "TB"];

    if bytes == 0 {
        return "0 Bytes".to_string();
    }

    let mut value = bytes as f64;
    let mut unit = 0;
    while value >= 1024.0 && unit < UNITS.len() - 1 {
        value /= 1024.0;
        unit += 1;
    }

    let rounded = format!("{value:.2}");
    let trimmed = rounded.trim_end_matches('0').trim_end_matches('.');
    format!("{trimmed} {}", UNITS[unit])
}
