//! Projection sync: one subscription task per collection.

use std::sync::Arc;

use dashmap::DashMap;
use tokio::sync::{RwLock, watch};
use tokio::task::JoinHandle;
use tracing::{debug, info, warn};

use vault_catalog::CatalogStore;
use vault_core::error::AppError;
use vault_core::feed::{Collection, Subscription};
use vault_core::result::AppResult;
use vault_core::types::id::FileId;
use vault_service::browse::BrowseSession;
use vault_service::query::Listing;

use crate::projection::LocalProjection;
use crate::tracker::{LoadState, LoadTracker};

/// Applies one collection's snapshot to the projection.
type Apply<T> = fn(&mut LocalProjection, Collection, Vec<T>);

/// Keeps a [`LocalProjection`] in sync with the catalog feeds.
#[derive(Debug)]
pub struct ProjectionSync {
    /// Source of the feeds.
    catalog: Arc<dyn CatalogStore>,
    /// Materialized view.
    projection: Arc<RwLock<LocalProjection>>,
    /// First-snapshot flags.
    tracker: Arc<LoadTracker>,
    /// Bumped after every applied snapshot.
    revision: Arc<watch::Sender<u64>>,
    /// Collection → subscription task.
    tasks: DashMap<Collection, JoinHandle<()>>,
}

impl ProjectionSync {
    /// Subscribes to every collection in `collections`.
    ///
    /// All subscriptions are registered with the load tracker before the
    /// first one is opened, so the projection only reports loaded once
    /// each of them has delivered.
    pub async fn start(
        catalog: Arc<dyn CatalogStore>,
        collections: &[Collection],
    ) -> AppResult<Self> {
        let sync = Self {
            catalog,
            projection: Arc::new(RwLock::new(LocalProjection::default())),
            tracker: Arc::new(LoadTracker::new()),
            revision: Arc::new(watch::Sender::new(0)),
            tasks: DashMap::new(),
        };

        for collection in collections {
            sync.tracker.register(*collection);
        }
        for collection in collections {
            if let Err(err) = sync.attach(*collection).await {
                warn!(collection = %collection, error = %err, "Failed to subscribe");
                sync.stop();
                return Err(err);
            }
        }

        info!(subscriptions = collections.len(), "Projection sync started");
        Ok(sync)
    }

    /// Whether every registered subscription has delivered its first snapshot.
    pub fn is_loaded(&self) -> bool {
        self.tracker.is_loaded()
    }

    /// Current first-snapshot flags.
    pub fn load_state(&self) -> LoadState {
        self.tracker.snapshot()
    }

    /// Waits until every registered subscription has delivered.
    pub async fn wait_until_loaded(&self) -> AppResult<()> {
        let mut rx = self.tracker.subscribe();
        rx.wait_for(LoadState::is_loaded)
            .await
            .map(|_| ())
            .map_err(|_| AppError::internal("Load tracker closed"))
    }

    /// Receiver of the projection revision, bumped after every snapshot.
    pub fn changes(&self) -> watch::Receiver<u64> {
        self.revision.subscribe()
    }

    /// Copy of the current projection.
    pub async fn projection(&self) -> LocalProjection {
        self.projection.read().await.clone()
    }

    /// Renders `session` over the current projection.
    pub async fn listing(&self, session: &BrowseSession, max_hops: usize) -> Listing {
        self.projection.read().await.listing(session, max_hops)
    }

    /// Starts following a file's version chain. No-op if already watched.
    pub async fn watch_versions(&self, file_id: FileId) -> AppResult<()> {
        let collection = Collection::Versions(file_id);
        if self.tasks.contains_key(&collection) {
            return Ok(());
        }

        self.tracker.register(collection);
        if let Err(err) = self.attach(collection).await {
            self.tracker.unregister(collection);
            return Err(err);
        }
        Ok(())
    }

    /// Stops following a file's version chain and forgets it.
    pub async fn unwatch_versions(&self, file_id: FileId) {
        let collection = Collection::Versions(file_id);
        if let Some((_, task)) = self.tasks.remove(&collection) {
            task.abort();
        }
        self.tracker.unregister(collection);
        self.projection.write().await.versions.remove(&file_id);
    }

    /// Aborts every subscription task.
    pub fn stop(&self) {
        for entry in self.tasks.iter() {
            entry.value().abort();
        }
        self.tasks.clear();
        debug!("Projection sync stopped");
    }

    async fn attach(&self, collection: Collection) -> AppResult<()> {
        let task = match collection {
            Collection::Folders => {
                let feed = self.catalog.subscribe_folders().await?;
                self.spawn(collection, feed, LocalProjection::apply_folders)
            }
            Collection::Files => {
                let feed = self.catalog.subscribe_files().await?;
                self.spawn(collection, feed, LocalProjection::apply_files)
            }
            Collection::Versions(file_id) => {
                let feed = self.catalog.subscribe_versions(file_id).await?;
                self.spawn(collection, feed, LocalProjection::apply_versions)
            }
            Collection::Members | Collection::Notes => {
                let feed = self.catalog.subscribe_documents(collection).await?;
                self.spawn(collection, feed, LocalProjection::apply_documents)
            }
        };

        if let Some(previous) = self.tasks.insert(collection, task) {
            previous.abort();
        }
        Ok(())
    }

    fn spawn<T: Send + 'static>(
        &self,
        collection: Collection,
        mut feed: Subscription<T>,
        apply: Apply<T>,
    ) -> JoinHandle<()> {
        let projection = self.projection.clone();
        let tracker = self.tracker.clone();
        let revision = self.revision.clone();

        tokio::spawn(async move {
            while let Some(snapshot) = feed.recv().await {
                let count = snapshot.docs.len();
                {
                    let mut view = projection.write().await;
                    apply(&mut *view, snapshot.collection, snapshot.docs);
                }
                tracker.mark_loaded(collection);
                revision.send_modify(|r| *r += 1);
                debug!(collection = %collection, docs = count, "Applied snapshot");
            }
            debug!(collection = %collection, "Feed closed");
        })
    }
}

impl Drop for ProjectionSync {
    fn drop(&mut self) {
        self.stop();
    }
}

#[cfg(test)]
mod tests {
    use std::time::Duration;

    use chrono::Utc;
    use vault_catalog::MemoryCatalog;
    use vault_core::types::id::{AccountId, FolderId};
    use vault_entity::document::OpaqueDocument;
    use vault_entity::folder::FolderNode;

    use super::*;

    const ALL: [Collection; 4] = [
        Collection::Folders,
        Collection::Files,
        Collection::Members,
        Collection::Notes,
    ];

    fn folder(name: &str) -> FolderNode {
        FolderNode {
            id: FolderId::new(),
            name: name.into(),
            parent_id: None,
            created_at: Utc::now(),
        }
    }

    async fn wait_for_revision(sync: &ProjectionSync, at_least: u64) {
        let mut rx = sync.changes();
        tokio::time::timeout(Duration::from_secs(5), rx.wait_for(|r| *r >= at_least))
            .await
            .unwrap()
            .unwrap();
    }

    #[tokio::test]
    async fn test_loaded_after_every_first_snapshot() {
        let catalog = MemoryCatalog::new(AccountId::new("acct-1"));
        catalog.insert_folder(&folder("Reports")).await.unwrap();
        catalog
            .insert_document(Collection::Members, &OpaqueDocument::new(serde_json::json!({})))
            .await
            .unwrap();

        let sync = ProjectionSync::start(Arc::new(catalog), &ALL).await.unwrap();
        tokio::time::timeout(Duration::from_secs(5), sync.wait_until_loaded())
            .await
            .unwrap()
            .unwrap();

        assert!(sync.is_loaded());
        let view = sync.projection().await;
        assert_eq!(view.folders.len(), 1);
        assert_eq!(view.members.len(), 1);
    }

    #[tokio::test]
    async fn test_mutations_reach_projection() {
        let catalog = MemoryCatalog::new(AccountId::new("acct-1"));
        let sync = ProjectionSync::start(Arc::new(catalog.clone()), &ALL)
            .await
            .unwrap();
        sync.wait_until_loaded().await.unwrap();
        let before = *sync.changes().borrow();

        catalog.insert_folder(&folder("Reports")).await.unwrap();
        wait_for_revision(&sync, before + 1).await;

        assert_eq!(sync.projection().await.folders[0].name, "Reports");
        let listing = sync.listing(&BrowseSession::new(), 20).await;
        assert_eq!(listing.folders.len(), 1);
    }

    #[tokio::test]
    async fn test_watching_versions_adds_a_subscription() {
        let catalog = MemoryCatalog::new(AccountId::new("acct-1"));
        let sync = ProjectionSync::start(Arc::new(catalog), &ALL).await.unwrap();
        sync.wait_until_loaded().await.unwrap();

        let file_id = FileId::new();
        sync.watch_versions(file_id).await.unwrap();
        assert_eq!(sync.load_state().registered(), 5);
        sync.wait_until_loaded().await.unwrap();
        assert!(sync.projection().await.versions.contains_key(&file_id));

        sync.unwatch_versions(file_id).await;
        assert_eq!(sync.load_state().registered(), 4);
        assert!(sync.projection().await.versions.is_empty());
    }

    #[tokio::test]
    async fn test_stop_halts_updates() {
        let catalog = MemoryCatalog::new(AccountId::new("acct-1"));
        let sync = ProjectionSync::start(Arc::new(catalog.clone()), &[Collection::Folders])
            .await
            .unwrap();
        sync.wait_until_loaded().await.unwrap();
        sync.stop();
        tokio::task::yield_now().await;

        catalog.insert_folder(&folder("late")).await.unwrap();
        tokio::time::sleep(Duration::from_millis(50)).await;
        assert!(sync.projection().await.folders.is_empty());
    }
}
