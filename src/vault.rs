//! Per-account vault wiring.

use std::sync::Arc;

use tracing::info;

use vault_catalog::{CatalogStore, MemoryCatalog};
use vault_core::config::VaultConfig;
use vault_core::result::AppResult;
use vault_core::traits::blob::BlobStore;
use vault_core::types::id::AccountId;
use vault_entity::quota::QuotaGate;
use vault_realtime::ProjectionSync;
use vault_service::{
    AccountContext, BrowseSession, FileService, FolderService, IntentLog, Listing,
    ReconcileReport, Reconciler, TreeService, UploadService, VersionService,
};
use vault_storage::{BlobKeyGenerator, build_blob_store};

/// Every vault service bound to one verified account.
#[derive(Debug, Clone)]
pub struct Vault {
    account: AccountId,
    config: VaultConfig,
    catalog: Arc<dyn CatalogStore>,
    intents: IntentLog,
    uploads: UploadService,
    files: FileService,
    versions: VersionService,
    folders: FolderService,
    tree: TreeService,
    reconciler: Reconciler,
}

impl Vault {
    /// Opens the vault for a signed-in account.
    ///
    /// The catalog is in-process; the blob store is built from
    /// `config.blob`. Unverified accounts are rejected before anything is
    /// constructed.
    pub async fn open(ctx: &AccountContext, config: VaultConfig) -> AppResult<Self> {
        let account = ctx.require_verified()?.clone();
        let catalog: Arc<dyn CatalogStore> = Arc::new(MemoryCatalog::new(account.clone()));
        let blobs = build_blob_store(&config.blob).await?;
        Self::assemble(account, config, catalog, blobs)
    }

    /// Opens the vault over caller-supplied stores.
    pub fn with_stores(
        ctx: &AccountContext,
        config: VaultConfig,
        catalog: Arc<dyn CatalogStore>,
        blobs: Arc<dyn BlobStore>,
    ) -> AppResult<Self> {
        let account = ctx.require_verified()?.clone();
        Self::assemble(account, config, catalog, blobs)
    }

    fn assemble(
        account: AccountId,
        config: VaultConfig,
        catalog: Arc<dyn CatalogStore>,
        blobs: Arc<dyn BlobStore>,
    ) -> AppResult<Self> {
        let intents = IntentLog::with_history(config.intents.settled_history);
        let keys = BlobKeyGenerator::new(config.blob.key_prefix.clone());
        let quota = QuotaGate::new(config.quota.max_files);

        info!(
            account = %account,
            provider = blobs.provider_type(),
            max_files = ?config.quota.max_files,
            "Vault opened"
        );

        Ok(Self {
            uploads: UploadService::new(
                account.clone(),
                Arc::clone(&catalog),
                Arc::clone(&blobs),
                keys.clone(),
                quota,
                intents.clone(),
            ),
            files: FileService::new(
                account.clone(),
                Arc::clone(&catalog),
                Arc::clone(&blobs),
                intents.clone(),
            ),
            versions: VersionService::new(
                account.clone(),
                Arc::clone(&catalog),
                Arc::clone(&blobs),
                keys.clone(),
                intents.clone(),
            ),
            folders: FolderService::new(account.clone(), Arc::clone(&catalog)),
            tree: TreeService::new(Arc::clone(&catalog), config.tree.max_breadcrumb_depth),
            reconciler: Reconciler::new(
                account.clone(),
                Arc::clone(&catalog),
                blobs,
                keys,
                intents.clone(),
            ),
            account,
            config,
            catalog,
            intents,
        })
    }

    pub fn account(&self) -> &AccountId {
        &self.account
    }

    pub fn config(&self) -> &VaultConfig {
        &self.config
    }

    /// Upload protocol and quota status.
    pub fn uploads(&self) -> &UploadService {
        &self.uploads
    }

    /// File reads, deletes and renames.
    pub fn files(&self) -> &FileService {
        &self.files
    }

    /// Version history, new versions and restores.
    pub fn versions(&self) -> &VersionService {
        &self.versions
    }

    pub fn folders(&self) -> &FolderService {
        &self.folders
    }

    /// Breadcrumb resolution.
    pub fn tree(&self) -> &TreeService {
        &self.tree
    }

    /// Every multi-step mutation attempted through this vault.
    pub fn intents(&self) -> &IntentLog {
        &self.intents
    }

    /// Resolves intents left pending by partial failures and deletes
    /// blobs nothing references.
    pub async fn reconcile(&self) -> ReconcileReport {
        self.reconciler.run().await
    }

    /// Builds the visible listing for `session` from a fresh catalog read.
    pub async fn listing(&self, session: &BrowseSession) -> AppResult<Listing> {
        let folders = self.catalog.list_folders().await?;
        let files = self.catalog.list_files().await?;
        Ok(session.render(&folders, &files, self.config.tree.max_breadcrumb_depth))
    }

    /// Starts a live projection over the configured collections.
    pub async fn start_sync(&self) -> AppResult<ProjectionSync> {
        ProjectionSync::start(
            Arc::clone(&self.catalog),
            &self.config.sync.enabled_collections,
        )
        .await
    }
}
