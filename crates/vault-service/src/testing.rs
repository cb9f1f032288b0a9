//! Shared fixtures for unit tests.

use std::sync::Arc;
use std::sync::atomic::{AtomicBool, Ordering};

use async_trait::async_trait;
use chrono::{DateTime, Utc};
use tokio::sync::Notify;

use vault_catalog::{CatalogStore, MemoryCatalog};
use vault_core::feed::{Collection, Subscription};
use vault_core::result::AppResult;
use vault_core::traits::blob::BlobStore;
use vault_core::types::blob::{BlobKey, ContentRef};
use vault_core::types::id::{AccountId, DocumentId, FileId, FolderId};
use vault_entity::document::OpaqueDocument;
use vault_entity::file::{ContentKind, ContentUpdate, FileRecord, VersionRecord};
use vault_entity::folder::{CreateFolder, FolderNode};
use vault_entity::quota::QuotaGate;
use vault_storage::BlobKeyGenerator;
use vault_storage::providers::memory::MemoryBlobStore;

use crate::file::{FileService, ProgressSink, UploadRequest, UploadService, VersionService};
use crate::folder::{FolderService, TreeService};
use crate::intent::{IntentLog, Reconciler};

/// Every service wired over in-memory stores with fault injection.
pub(crate) struct Fixture {
    pub catalog: MemoryCatalog,
    pub blobs: MemoryBlobStore,
    pub intents: IntentLog,
    pub uploads: UploadService,
    pub files: FileService,
    pub versions: VersionService,
    pub folders: FolderService,
    pub tree: TreeService,
    pub reconciler: Reconciler,
}

impl Fixture {
    pub fn new() -> Self {
        Self::with_quota(None)
    }

    pub fn with_quota(max_files: Option<u64>) -> Self {
        let account = AccountId::new("acct-1");
        let catalog = MemoryCatalog::new(account.clone());
        let blobs = MemoryBlobStore::default();
        let intents = IntentLog::new();
        let keys = BlobKeyGenerator::new("user_uploads");

        let catalog_dyn: Arc<dyn CatalogStore> = Arc::new(catalog.clone());
        let blobs_dyn: Arc<dyn BlobStore> = Arc::new(blobs.clone());

        Self {
            uploads: UploadService::new(
                account.clone(),
                catalog_dyn.clone(),
                blobs_dyn.clone(),
                keys.clone(),
                QuotaGate::new(max_files),
                intents.clone(),
            ),
            files: FileService::new(
                account.clone(),
                catalog_dyn.clone(),
                blobs_dyn.clone(),
                intents.clone(),
            ),
            versions: VersionService::new(
                account.clone(),
                catalog_dyn.clone(),
                blobs_dyn.clone(),
                keys.clone(),
                intents.clone(),
            ),
            folders: FolderService::new(account.clone(), catalog_dyn.clone()),
            tree: TreeService::new(catalog_dyn.clone(), 20),
            reconciler: Reconciler::new(account, catalog_dyn, blobs_dyn, keys, intents.clone()),
            catalog,
            blobs,
            intents,
        }
    }

    /// Uploads `size` zero bytes to the root.
    pub async fn upload(&self, name: &str, size: usize) -> FileRecord {
        self.uploads
            .upload(UploadRequest::new(name, vec![0u8; size]), &ProgressSink::noop())
            .await
            .unwrap()
    }

    /// Uploads `size` zero bytes into a folder.
    pub async fn upload_into(&self, name: &str, size: usize, folder_id: FolderId) -> FileRecord {
        self.uploads
            .upload(
                UploadRequest::new(name, vec![0u8; size]).in_folder(folder_id),
                &ProgressSink::noop(),
            )
            .await
            .unwrap()
    }

    /// A file service sharing this fixture's blobs and intents over `catalog`.
    pub fn files_over(&self, catalog: Arc<dyn CatalogStore>) -> FileService {
        FileService::new(
            AccountId::new("acct-1"),
            catalog,
            Arc::new(self.blobs.clone()),
            self.intents.clone(),
        )
    }

    /// A version service sharing this fixture's blobs and intents over `catalog`.
    pub fn versions_over(&self, catalog: Arc<dyn CatalogStore>) -> VersionService {
        VersionService::new(
            AccountId::new("acct-1"),
            catalog,
            Arc::new(self.blobs.clone()),
            BlobKeyGenerator::new("user_uploads"),
            self.intents.clone(),
        )
    }

    pub async fn folder(&self, name: &str, parent_id: Option<FolderId>) -> FolderNode {
        self.folders
            .create_folder(CreateFolder {
                name: Some(name.to_string()),
                parent_id,
            })
            .await
            .unwrap()
    }
}

/// A file record that exists only in memory, for pure projection tests.
pub(crate) fn file_record(name: &str, size_bytes: u64, folder_id: Option<FolderId>) -> FileRecord {
    let now = Utc::now();
    FileRecord {
        id: FileId::new(),
        name: name.to_string(),
        size_bytes,
        kind: ContentKind::Document,
        mime_type: "application/octet-stream".to_string(),
        folder_id,
        blob_key: BlobKey::new(format!("acct-1/1_{name}")),
        content_ref: ContentRef::permanent(format!("memory://acct-1/1_{name}")),
        created_at: now,
        updated_at: now,
    }
}

/// Catalog that can hold the next `find_file` until released, to interleave
/// two operations on the same file.
#[derive(Debug, Clone)]
pub(crate) struct GatedCatalog {
    inner: MemoryCatalog,
    armed: Arc<AtomicBool>,
    reached: Arc<Notify>,
    release: Arc<Notify>,
}

impl GatedCatalog {
    pub fn new(inner: MemoryCatalog) -> Self {
        Self {
            inner,
            armed: Arc::new(AtomicBool::new(false)),
            reached: Arc::new(Notify::new()),
            release: Arc::new(Notify::new()),
        }
    }

    /// Hold the next `find_file` after it has read the document.
    pub fn hold_next_find(&self) {
        self.armed.store(true, Ordering::SeqCst);
    }

    /// Wait until a held `find_file` has read the document.
    pub async fn held(&self) {
        self.reached.notified().await;
    }

    /// Let the held `find_file` return.
    pub fn release(&self) {
        self.release.notify_one();
    }
}

#[async_trait]
impl CatalogStore for GatedCatalog {
    async fn insert_folder(&self, folder: &FolderNode) -> AppResult<()> {
        self.inner.insert_folder(folder).await
    }

    async fn find_folder(&self, id: FolderId) -> AppResult<Option<FolderNode>> {
        self.inner.find_folder(id).await
    }

    async fn list_folders(&self) -> AppResult<Vec<FolderNode>> {
        self.inner.list_folders().await
    }

    async fn update_folder(&self, folder: &FolderNode) -> AppResult<()> {
        self.inner.update_folder(folder).await
    }

    async fn delete_folder(&self, id: FolderId) -> AppResult<bool> {
        self.inner.delete_folder(id).await
    }

    async fn insert_file(&self, file: &FileRecord) -> AppResult<()> {
        self.inner.insert_file(file).await
    }

    async fn find_file(&self, id: FileId) -> AppResult<Option<FileRecord>> {
        let found = self.inner.find_file(id).await;
        if self.armed.swap(false, Ordering::SeqCst) {
            self.reached.notify_one();
            self.release.notified().await;
        }
        found
    }

    async fn list_files(&self) -> AppResult<Vec<FileRecord>> {
        self.inner.list_files().await
    }

    async fn count_files(&self) -> AppResult<u64> {
        self.inner.count_files().await
    }

    async fn update_file_name(
        &self,
        id: FileId,
        name: &str,
        updated_at: DateTime<Utc>,
    ) -> AppResult<FileRecord> {
        self.inner.update_file_name(id, name, updated_at).await
    }

    async fn update_file_content(
        &self,
        id: FileId,
        update: &ContentUpdate,
    ) -> AppResult<FileRecord> {
        self.inner.update_file_content(id, update).await
    }

    async fn delete_file(&self, id: FileId) -> AppResult<bool> {
        self.inner.delete_file(id).await
    }

    async fn append_version(&self, version: &VersionRecord) -> AppResult<()> {
        self.inner.append_version(version).await
    }

    async fn list_versions(&self, file_id: FileId) -> AppResult<Vec<VersionRecord>> {
        self.inner.list_versions(file_id).await
    }

    async fn list_all_versions(&self) -> AppResult<Vec<VersionRecord>> {
        self.inner.list_all_versions().await
    }

    async fn insert_document(&self, collection: Collection, doc: &OpaqueDocument) -> AppResult<()> {
        self.inner.insert_document(collection, doc).await
    }

    async fn list_documents(&self, collection: Collection) -> AppResult<Vec<OpaqueDocument>> {
        self.inner.list_documents(collection).await
    }

    async fn delete_document(&self, collection: Collection, id: DocumentId) -> AppResult<bool> {
        self.inner.delete_document(collection, id).await
    }

    async fn subscribe_folders(&self) -> AppResult<Subscription<FolderNode>> {
        self.inner.subscribe_folders().await
    }

    async fn subscribe_files(&self) -> AppResult<Subscription<FileRecord>> {
        self.inner.subscribe_files().await
    }

    async fn subscribe_versions(&self, file_id: FileId) -> AppResult<Subscription<VersionRecord>> {
        self.inner.subscribe_versions(file_id).await
    }

    async fn subscribe_documents(
        &self,
        collection: Collection,
    ) -> AppResult<Subscription<OpaqueDocument>> {
        self.inner.subscribe_documents(collection).await
    }
}
