//! Reconciliation of intents left pending by partial failures, and a
//! sweep for blobs nothing references.
//!
//! Nothing here runs implicitly: the mutation protocols keep failing
//! exactly as documented, and a caller or operator decides when to run a
//! pass. Run it while no mutation is in flight for the account, since an
//! in-flight operation is indistinguishable from an interrupted one.

use std::collections::HashSet;
use std::sync::Arc;

use serde::Serialize;
use tracing::{info, warn};

use vault_catalog::CatalogStore;
use vault_core::error::ErrorKind;
use vault_core::result::AppResult;
use vault_core::traits::blob::BlobStore;
use vault_core::types::blob::BlobKey;
use vault_core::types::id::{AccountId, FileId, IntentId, VersionId};
use vault_storage::BlobKeyGenerator;

use super::log::{IntentKind, IntentLog, IntentRecord};

/// What a pass did about one pending intent.
#[derive(Debug, Clone, PartialEq, Eq, Serialize)]
#[serde(tag = "action", rename_all = "snake_case")]
pub enum ReconcileAction {
    /// The operation had actually finished; nothing to repair.
    Confirmed { intent: IntentId },
    /// A blob no record points to was deleted.
    DeletedOrphanBlob { intent: IntentId, blob_key: BlobKey },
    /// A record whose blob was already deleted was removed.
    RemovedStaleRecord { intent: IntentId, file_id: FileId },
    /// Nothing could or should be repaired.
    Abandoned { intent: IntentId, reason: String },
    /// A blob under the account that no file, version or pending intent
    /// references was deleted.
    DeletedUnreferencedBlob { blob_key: BlobKey },
}

/// Outcome of a reconciliation pass.
#[derive(Debug, Clone, Default, Serialize)]
pub struct ReconcileReport {
    /// Intents resolved by this pass.
    pub actions: Vec<ReconcileAction>,
    /// Intents that could not be resolved now and stay pending.
    pub failures: Vec<(IntentId, String)>,
    /// Unreferenced blobs the sweep could not delete, or the reason the
    /// sweep could not run.
    pub sweep_failures: Vec<(Option<BlobKey>, String)>,
}

impl ReconcileReport {
    /// Number of orphaned blobs deleted.
    pub fn orphans_deleted(&self) -> usize {
        self.actions
            .iter()
            .filter(|a| {
                matches!(
                    a,
                    ReconcileAction::DeletedOrphanBlob { .. }
                        | ReconcileAction::DeletedUnreferencedBlob { .. }
                )
            })
            .count()
    }
}

/// Resolves pending intents of one account.
#[derive(Debug, Clone)]
pub struct Reconciler {
    /// Owning account.
    account: AccountId,
    /// Metadata catalog.
    catalog: Arc<dyn CatalogStore>,
    /// Blob store.
    blobs: Arc<dyn BlobStore>,
    /// Blob key layout, for the account prefix.
    keys: BlobKeyGenerator,
    /// Intent log.
    intents: IntentLog,
}

impl Reconciler {
    /// Creates a new reconciler.
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

    /// Runs one pass over every pending intent, then sweeps the account's
    /// blobs for ones nothing references.
    ///
    /// A store failure while resolving one intent is recorded in the
    /// report and leaves that intent pending for the next pass.
    pub async fn run(&self) -> ReconcileReport {
        let mut report = ReconcileReport::default();

        for intent in self.intents.pending().await {
            match self.resolve(&intent).await {
                Ok(action) => {
                    let note = format!("{action:?}");
                    self.intents.mark_reconciled(intent.id, note).await;
                    report.actions.push(action);
                }
                Err(err) => {
                    warn!(
                        account = %self.account,
                        intent_id = %intent.id,
                        kind = intent.kind.label(),
                        error = %err,
                        "Could not reconcile intent"
                    );
                    report.failures.push((intent.id, err.to_string()));
                }
            }
        }

        self.sweep(&mut report).await;

        info!(
            account = %self.account,
            resolved = report.actions.len(),
            orphans_deleted = report.orphans_deleted(),
            failed = report.failures.len(),
            "Reconciliation pass finished"
        );
        report
    }

    async fn sweep(&self, report: &mut ReconcileReport) {
        let unreferenced = match self.unreferenced_blobs().await {
            Ok(keys) => keys,
            Err(err) => {
                warn!(account = %self.account, error = %err, "Blob sweep skipped");
                report.sweep_failures.push((None, err.to_string()));
                return;
            }
        };

        for blob_key in unreferenced {
            match self.blobs.delete(&blob_key).await {
                Ok(()) => {
                    info!(account = %self.account, blob_key = %blob_key, "Deleted unreferenced blob");
                    report
                        .actions
                        .push(ReconcileAction::DeletedUnreferencedBlob { blob_key });
                }
                Err(err) if err.is(ErrorKind::BlobMissing) => {}
                Err(err) => {
                    warn!(
                        account = %self.account,
                        blob_key = %blob_key,
                        error = %err,
                        "Could not delete unreferenced blob"
                    );
                    report.sweep_failures.push((Some(blob_key), err.to_string()));
                }
            }
        }
    }

    /// Blobs under the account prefix that no file, version or pending
    /// intent points to.
    async fn unreferenced_blobs(&self) -> AppResult<Vec<BlobKey>> {
        // Listed first: a blob written by an operation still in flight is
        // then covered either by its pending intent or by its record.
        let stored = self
            .blobs
            .list(&self.keys.account_prefix(&self.account))
            .await?;

        let mut referenced: HashSet<BlobKey> = self
            .intents
            .pending()
            .await
            .iter()
            .filter_map(|intent| intent.kind.blob_key().cloned())
            .collect();
        referenced.extend(
            self.catalog
                .list_files()
                .await?
                .into_iter()
                .map(|f| f.blob_key),
        );
        referenced.extend(
            self.catalog
                .list_all_versions()
                .await?
                .into_iter()
                .map(|v| v.blob_key),
        );

        Ok(stored
            .into_iter()
            .filter(|key| !referenced.contains(key))
            .collect())
    }

    async fn resolve(&self, intent: &IntentRecord) -> AppResult<ReconcileAction> {
        let id = intent.id;
        match &intent.kind {
            IntentKind::Upload { file_id, blob_key } => {
                if self.catalog.find_file(*file_id).await?.is_some() {
                    return Ok(ReconcileAction::Confirmed { intent: id });
                }
                self.delete_orphan(id, blob_key).await
            }
            IntentKind::Delete { file_id, blob_key } => {
                self.finish_delete(id, *file_id, blob_key).await
            }
            IntentKind::VersionCommit { file_id, blob_key } => {
                let current = self.catalog.find_file(*file_id).await?;
                if current.is_some_and(|f| &f.blob_key == blob_key) {
                    return Ok(ReconcileAction::Confirmed { intent: id });
                }
                self.delete_orphan(id, blob_key).await
            }
            IntentKind::Restore {
                file_id,
                version_id,
            } => self.check_restore(id, *file_id, *version_id).await,
        }
    }

    async fn delete_orphan(&self, id: IntentId, blob_key: &BlobKey) -> AppResult<ReconcileAction> {
        if !self.blobs.exists(blob_key).await? {
            return Ok(ReconcileAction::Abandoned {
                intent: id,
                reason: "no blob was stored".to_string(),
            });
        }

        self.blobs.delete(blob_key).await?;
        info!(account = %self.account, intent_id = %id, blob_key = %blob_key, "Deleted orphaned blob");
        Ok(ReconcileAction::DeletedOrphanBlob {
            intent: id,
            blob_key: blob_key.clone(),
        })
    }

    async fn finish_delete(
        &self,
        id: IntentId,
        file_id: FileId,
        blob_key: &BlobKey,
    ) -> AppResult<ReconcileAction> {
        let Some(file) = self.catalog.find_file(file_id).await? else {
            return Ok(ReconcileAction::Confirmed { intent: id });
        };
        if &file.blob_key != blob_key {
            return Ok(ReconcileAction::Abandoned {
                intent: id,
                reason: "file content changed since the delete".to_string(),
            });
        }
        if self.blobs.exists(blob_key).await? {
            return Ok(ReconcileAction::Abandoned {
                intent: id,
                reason: "blob is still present".to_string(),
            });
        }

        self.catalog.delete_file(file_id).await?;
        info!(account = %self.account, intent_id = %id, file_id = %file_id, "Removed record of deleted blob");
        Ok(ReconcileAction::RemovedStaleRecord {
            intent: id,
            file_id,
        })
    }

    async fn check_restore(
        &self,
        id: IntentId,
        file_id: FileId,
        version_id: VersionId,
    ) -> AppResult<ReconcileAction> {
        let file = self.catalog.find_file(file_id).await?;
        let version = self
            .catalog
            .list_versions(file_id)
            .await?
            .into_iter()
            .find(|v| v.id == version_id);

        match (file, version) {
            (Some(file), Some(version)) if version.matches_content(&file) => {
                Ok(ReconcileAction::Confirmed { intent: id })
            }
            _ => Ok(ReconcileAction::Abandoned {
                intent: id,
                reason: "archive kept; file was not restored".to_string(),
            }),
        }
    }
}
