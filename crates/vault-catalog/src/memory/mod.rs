//! In-memory catalog backend.
//!
//! Holds one account's collections behind a single lock. Every accepted
//! mutation publishes a fresh snapshot of the touched collection while the
//! lock is still held, so subscribers observe mutations in commit order.

mod state;

use std::sync::Arc;

use async_trait::async_trait;
use chrono::{DateTime, Utc};
use tokio::sync::RwLock;
use tracing::debug;

use vault_core::error::AppError;
use vault_core::feed::{Collection, Subscription};
use vault_core::result::AppResult;
use vault_core::types::id::{AccountId, DocumentId, FileId, FolderId};
use vault_entity::document::OpaqueDocument;
use vault_entity::file::{ContentUpdate, FileRecord, VersionRecord};
use vault_entity::folder::FolderNode;

use crate::feed::FeedHub;
use crate::traits::CatalogStore;

use self::state::{CatalogState, newest_first};

/// Catalog keeping one account's documents in memory.
#[derive(Debug, Clone)]
pub struct MemoryCatalog {
    /// Owning account.
    account: AccountId,
    /// Collections, faults and feeds.
    state: Arc<RwLock<CatalogState>>,
}

impl MemoryCatalog {
    /// Create an empty catalog for `account`.
    pub fn new(account: AccountId) -> Self {
        Self {
            account,
            state: Arc::new(RwLock::new(CatalogState::new())),
        }
    }

    /// The account this catalog belongs to.
    pub fn account(&self) -> &AccountId {
        &self.account
    }

    /// Reject every subsequent write (or accept them again).
    pub async fn set_fail_writes(&self, fail: bool) {
        let mut state = self.state.write().await;
        state.faults.fail_all = fail;
        if !fail {
            state.faults.remaining_before_failure = None;
        }
    }

    /// Accept `count` more writes, then reject the rest.
    pub async fn fail_writes_after(&self, count: u32) {
        self.state.write().await.faults.remaining_before_failure = Some(count);
    }

    /// Number of writes accepted so far.
    pub async fn write_count(&self) -> u64 {
        self.state.read().await.writes
    }
}

#[async_trait]
impl CatalogStore for MemoryCatalog {
    async fn insert_folder(&self, folder: &FolderNode) -> AppResult<()> {
        let mut state = self.state.write().await;
        state.admit_write("insert folder")?;
        state.folders.push(folder.clone());
        state.publish_folders();

        debug!(account = %self.account, folder_id = %folder.id, "Inserted folder");
        Ok(())
    }

    async fn find_folder(&self, id: FolderId) -> AppResult<Option<FolderNode>> {
        let state = self.state.read().await;
        Ok(state.folders.iter().find(|f| f.id == id).cloned())
    }

    async fn list_folders(&self) -> AppResult<Vec<FolderNode>> {
        Ok(self.state.read().await.folder_snapshot())
    }

    async fn update_folder(&self, folder: &FolderNode) -> AppResult<()> {
        let mut state = self.state.write().await;
        let index = state
            .folders
            .iter()
            .position(|f| f.id == folder.id)
            .ok_or_else(|| AppError::not_found(format!("Folder {} not found", folder.id)))?;
        state.admit_write("update folder")?;
        state.folders[index] = folder.clone();
        state.publish_folders();

        debug!(account = %self.account, folder_id = %folder.id, "Updated folder");
        Ok(())
    }

    async fn delete_folder(&self, id: FolderId) -> AppResult<bool> {
        let mut state = self.state.write().await;
        let Some(index) = state.folders.iter().position(|f| f.id == id) else {
            return Ok(false);
        };
        state.admit_write("delete folder")?;
        state.folders.remove(index);
        state.publish_folders();

        debug!(account = %self.account, folder_id = %id, "Deleted folder");
        Ok(true)
    }

    async fn insert_file(&self, file: &FileRecord) -> AppResult<()> {
        let mut state = self.state.write().await;
        state.admit_write("insert file")?;
        state.files.push(file.clone());
        state.publish_files();

        debug!(account = %self.account, file_id = %file.id, "Inserted file");
        Ok(())
    }

    async fn find_file(&self, id: FileId) -> AppResult<Option<FileRecord>> {
        let state = self.state.read().await;
        Ok(state.files.iter().find(|f| f.id == id).cloned())
    }

    async fn list_files(&self) -> AppResult<Vec<FileRecord>> {
        Ok(self.state.read().await.file_snapshot())
    }

    async fn count_files(&self) -> AppResult<u64> {
        Ok(self.state.read().await.files.len() as u64)
    }

    async fn update_file_name(
        &self,
        id: FileId,
        name: &str,
        updated_at: DateTime<Utc>,
    ) -> AppResult<FileRecord> {
        let mut state = self.state.write().await;
        let index = state.file_index(id)?;
        state.admit_write("rename file")?;
        let file = &mut state.files[index];
        file.name = name.to_string();
        file.updated_at = updated_at;
        let stored = file.clone();
        state.publish_files();

        debug!(account = %self.account, file_id = %id, "Updated file name");
        Ok(stored)
    }

    async fn update_file_content(
        &self,
        id: FileId,
        update: &ContentUpdate,
    ) -> AppResult<FileRecord> {
        let mut state = self.state.write().await;
        let index = state.file_index(id)?;
        state.admit_write("update file content")?;
        let file = &mut state.files[index];
        file.apply_content(update);
        let stored = file.clone();
        state.publish_files();

        debug!(account = %self.account, file_id = %id, blob_key = %stored.blob_key, "Updated file content");
        Ok(stored)
    }

    async fn delete_file(&self, id: FileId) -> AppResult<bool> {
        let mut state = self.state.write().await;
        let Some(index) = state.files.iter().position(|f| f.id == id) else {
            return Ok(false);
        };
        state.admit_write("delete file")?;
        state.files.remove(index);
        state.publish_files();

        debug!(account = %self.account, file_id = %id, "Deleted file");
        Ok(true)
    }

    async fn append_version(&self, version: &VersionRecord) -> AppResult<()> {
        let mut state = self.state.write().await;
        state.admit_write("append version")?;
        state
            .versions
            .entry(version.parent_file_id)
            .or_default()
            .push(version.clone());
        state.publish_versions(version.parent_file_id);

        debug!(
            account = %self.account,
            file_id = %version.parent_file_id,
            version_id = %version.id,
            "Appended version"
        );
        Ok(())
    }

    async fn list_versions(&self, file_id: FileId) -> AppResult<Vec<VersionRecord>> {
        Ok(self.state.read().await.version_snapshot(file_id))
    }

    async fn list_all_versions(&self) -> AppResult<Vec<VersionRecord>> {
        let state = self.state.read().await;
        let all: Vec<VersionRecord> = state.versions.values().flatten().cloned().collect();
        Ok(newest_first(&all, |v| v.archived_at))
    }

    async fn insert_document(&self, collection: Collection, doc: &OpaqueDocument) -> AppResult<()> {
        let mut guard = self.state.write().await;
        let state = &mut *guard;
        state.documents(collection)?;
        state.admit_write("insert document")?;

        let (docs, feed) = state.documents_mut(collection)?;
        docs.push(doc.clone());
        publish_documents(docs, feed);

        debug!(account = %self.account, collection = %collection, document_id = %doc.id, "Inserted document");
        Ok(())
    }

    async fn list_documents(&self, collection: Collection) -> AppResult<Vec<OpaqueDocument>> {
        let state = self.state.read().await;
        let docs = state.documents(collection)?;
        Ok(newest_first(docs, |d| d.created_at))
    }

    async fn delete_document(&self, collection: Collection, id: DocumentId) -> AppResult<bool> {
        let mut guard = self.state.write().await;
        let state = &mut *guard;
        let Some(index) = state.documents(collection)?.iter().position(|d| d.id == id) else {
            return Ok(false);
        };
        state.admit_write("delete document")?;

        let (docs, feed) = state.documents_mut(collection)?;
        docs.remove(index);
        publish_documents(docs, feed);
        Ok(true)
    }

    async fn subscribe_folders(&self) -> AppResult<Subscription<FolderNode>> {
        let mut state = self.state.write().await;
        let current = state.folder_snapshot();
        Ok(state.folder_feed.subscribe(current))
    }

    async fn subscribe_files(&self) -> AppResult<Subscription<FileRecord>> {
        let mut state = self.state.write().await;
        let current = state.file_snapshot();
        Ok(state.file_feed.subscribe(current))
    }

    async fn subscribe_versions(&self, file_id: FileId) -> AppResult<Subscription<VersionRecord>> {
        let mut state = self.state.write().await;
        state.prune_version_feeds();
        let current = state.version_snapshot(file_id);
        Ok(state
            .version_feeds
            .entry(file_id)
            .or_insert_with(|| FeedHub::new(Collection::Versions(file_id)))
            .subscribe(current))
    }

    async fn subscribe_documents(
        &self,
        collection: Collection,
    ) -> AppResult<Subscription<OpaqueDocument>> {
        let mut guard = self.state.write().await;
        let (docs, feed) = guard.documents_mut(collection)?;
        let current = newest_first(docs.as_slice(), |d| d.created_at);
        Ok(feed.subscribe(current))
    }
}

fn publish_documents(docs: &[OpaqueDocument], feed: &mut FeedHub<OpaqueDocument>) {
    feed.publish(newest_first(docs, |d| d.created_at));
}
