//! Shared test helpers for integration tests.

#![allow(dead_code)]

use std::sync::Arc;
use std::sync::atomic::Ordering;

use vault_catalog::MemoryCatalog;
use vault_core::types::id::{AccountId, FolderId};
use vault_entity::file::FileRecord;
use vault_entity::folder::{CreateFolder, FolderNode};
use vault_storage::providers::memory::MemoryBlobStore;

use vaultflow::{AccountContext, ProgressSink, UploadRequest, Vault, VaultConfig};

/// A vault over in-memory stores whose faults the test can arm.
pub struct TestVault {
    /// The vault under test.
    pub vault: Vault,
    /// Catalog handle shared with the vault.
    pub catalog: MemoryCatalog,
    /// Blob store handle shared with the vault.
    pub blobs: MemoryBlobStore,
}

impl TestVault {
    /// Create a vault with the default configuration.
    pub fn new() -> Self {
        Self::with_config(VaultConfig::default())
    }

    /// Create a vault with a custom configuration.
    pub fn with_config(config: VaultConfig) -> Self {
        let ctx = AccountContext::verified("acct-it");
        let catalog = MemoryCatalog::new(AccountId::new("acct-it"));
        let blobs = MemoryBlobStore::default();

        let vault = Vault::with_stores(
            &ctx,
            config,
            Arc::new(catalog.clone()),
            Arc::new(blobs.clone()),
        )
        .expect("open vault");

        Self {
            vault,
            catalog,
            blobs,
        }
    }

    /// Create a folder.
    pub async fn folder(&self, name: &str, parent_id: Option<FolderId>) -> FolderNode {
        self.vault
            .folders()
            .create_folder(CreateFolder {
                name: Some(name.to_string()),
                parent_id,
            })
            .await
            .expect("create folder")
    }

    /// Upload `size` bytes to the root.
    pub async fn upload(&self, name: &str, size: usize) -> FileRecord {
        self.vault
            .uploads()
            .upload(UploadRequest::new(name, vec![7u8; size]), &ProgressSink::noop())
            .await
            .expect("upload")
    }

    /// Upload `size` bytes into a folder.
    pub async fn upload_into(&self, name: &str, size: usize, folder_id: FolderId) -> FileRecord {
        self.vault
            .uploads()
            .upload(
                UploadRequest::new(name, vec![7u8; size]).in_folder(folder_id),
                &ProgressSink::noop(),
            )
            .await
            .expect("upload")
    }

    /// Blob store writes attempted so far.
    pub fn blob_writes(&self) -> u64 {
        self.blobs.calls().writes.load(Ordering::SeqCst)
    }
}
