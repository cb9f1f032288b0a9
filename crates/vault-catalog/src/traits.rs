//! The catalog store trait.

use async_trait::async_trait;
use chrono::{DateTime, Utc};

use vault_core::feed::{Collection, Subscription};
use vault_core::result::AppResult;
use vault_core::types::id::{DocumentId, FileId, FolderId};
use vault_entity::document::OpaqueDocument;
use vault_entity::file::{ContentUpdate, FileRecord, VersionRecord};
use vault_entity::folder::FolderNode;

/// Per-account metadata catalog.
///
/// Every write is atomic per document. Every rejected write surfaces as
/// [`ErrorKind::MetadataWriteFailure`](vault_core::error::ErrorKind); a
/// missing target surfaces as `NotFound`. Listings and feeds are ordered
/// by creation (or archive) time, newest first.
#[async_trait]
pub trait CatalogStore: Send + Sync + std::fmt::Debug + 'static {
    // ── Folders ──────────────────────────────────────────────────

    /// Insert a new folder document.
    async fn insert_folder(&self, folder: &FolderNode) -> AppResult<()>;

    /// Find a folder by ID.
    async fn find_folder(&self, id: FolderId) -> AppResult<Option<FolderNode>>;

    /// List every folder of the account.
    async fn list_folders(&self) -> AppResult<Vec<FolderNode>>;

    /// Replace an existing folder document.
    async fn update_folder(&self, folder: &FolderNode) -> AppResult<()>;

    /// Delete a folder document. Returns whether it existed.
    async fn delete_folder(&self, id: FolderId) -> AppResult<bool>;

    // ── Files ────────────────────────────────────────────────────

    /// Insert a new file document.
    async fn insert_file(&self, file: &FileRecord) -> AppResult<()>;

    /// Find a file by ID.
    async fn find_file(&self, id: FileId) -> AppResult<Option<FileRecord>>;

    /// List every file of the account.
    async fn list_files(&self) -> AppResult<Vec<FileRecord>>;

    /// Count the files of the account.
    async fn count_files(&self) -> AppResult<u64>;

    /// Set a file's name, leaving every other field as stored.
    /// Returns the document after the write.
    async fn update_file_name(
        &self,
        id: FileId,
        name: &str,
        updated_at: DateTime<Utc>,
    ) -> AppResult<FileRecord>;

    /// Replace a file's content fields, leaving identity, placement and
    /// (unless `update.name` is set) the name as stored. Returns the
    /// document after the write.
    async fn update_file_content(&self, id: FileId, update: &ContentUpdate)
    -> AppResult<FileRecord>;

    /// Delete a file document. Returns whether it existed.
    ///
    /// The version chain below the file is left in place.
    async fn delete_file(&self, id: FileId) -> AppResult<bool>;

    // ── Versions ─────────────────────────────────────────────────

    /// Append a version to its parent file's chain.
    async fn append_version(&self, version: &VersionRecord) -> AppResult<()>;

    /// List the version chain of a file.
    async fn list_versions(&self, file_id: FileId) -> AppResult<Vec<VersionRecord>>;

    /// List every version of every file, including chains whose file was
    /// deleted.
    async fn list_all_versions(&self) -> AppResult<Vec<VersionRecord>>;

    // ── Mirrored documents ───────────────────────────────────────

    /// Insert a document into `Members` or `Notes`.
    async fn insert_document(&self, collection: Collection, doc: &OpaqueDocument) -> AppResult<()>;

    /// List the documents of `Members` or `Notes`.
    async fn list_documents(&self, collection: Collection) -> AppResult<Vec<OpaqueDocument>>;

    /// Delete a document from `Members` or `Notes`. Returns whether it existed.
    async fn delete_document(&self, collection: Collection, id: DocumentId) -> AppResult<bool>;

    // ── Feeds ────────────────────────────────────────────────────

    /// Subscribe to the folder collection.
    async fn subscribe_folders(&self) -> AppResult<Subscription<FolderNode>>;

    /// Subscribe to the file collection.
    async fn subscribe_files(&self) -> AppResult<Subscription<FileRecord>>;

    /// Subscribe to one file's version chain.
    async fn subscribe_versions(&self, file_id: FileId) -> AppResult<Subscription<VersionRecord>>;

    /// Subscribe to `Members` or `Notes`.
    async fn subscribe_documents(
        &self,
        collection: Collection,
    ) -> AppResult<Subscription<OpaqueDocument>>;
}
