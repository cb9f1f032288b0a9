//! Record of multi-store operations.
//!
//! An intent is recorded before either store is touched and settled once
//! the operation finishes. Intents still pending afterwards mark exactly
//! the partial-failure states the protocols leave behind.

use std::collections::VecDeque;
use std::sync::Arc;

use chrono::{DateTime, Utc};
use serde::{Deserialize, Serialize};
use tokio::sync::RwLock;
use tracing::{debug, warn};

use vault_core::types::blob::BlobKey;
use vault_core::types::id::{FileId, IntentId, VersionId};

/// The operation an intent announces.
#[derive(Debug, Clone, PartialEq, Eq, Serialize, Deserialize)]
#[serde(tag = "type", rename_all = "snake_case")]
pub enum IntentKind {
    /// Write a new blob, then create the file record.
    Upload {
        /// Id the new record will carry.
        file_id: FileId,
        /// Key the blob is written under.
        blob_key: BlobKey,
    },
    /// Delete the blob, then the file record.
    Delete {
        /// File being deleted.
        file_id: FileId,
        /// Key of the blob being deleted.
        blob_key: BlobKey,
    },
    /// Archive the current state, write a new blob, then repoint the file.
    VersionCommit {
        /// File receiving new content.
        file_id: FileId,
        /// Key of the new content.
        blob_key: BlobKey,
    },
    /// Archive the current state, then copy a version into the file.
    Restore {
        /// File being restored.
        file_id: FileId,
        /// Version being restored.
        version_id: VersionId,
    },
}

impl IntentKind {
    /// The file this intent concerns.
    pub fn file_id(&self) -> FileId {
        match self {
            Self::Upload { file_id, .. }
            | Self::Delete { file_id, .. }
            | Self::VersionCommit { file_id, .. }
            | Self::Restore { file_id, .. } => *file_id,
        }
    }

    /// The blob this intent writes or deletes, if any.
    pub fn blob_key(&self) -> Option<&BlobKey> {
        match self {
            Self::Upload { blob_key, .. }
            | Self::Delete { blob_key, .. }
            | Self::VersionCommit { blob_key, .. } => Some(blob_key),
            Self::Restore { .. } => None,
        }
    }

    /// Short label for logs.
    pub fn label(&self) -> &'static str {
        match self {
            Self::Upload { .. } => "upload",
            Self::Delete { .. } => "delete",
            Self::VersionCommit { .. } => "version_commit",
            Self::Restore { .. } => "restore",
        }
    }
}

/// Lifecycle of an intent.
#[derive(Debug, Clone, Copy, PartialEq, Eq, Serialize, Deserialize)]
#[serde(rename_all = "snake_case")]
pub enum IntentStatus {
    /// Recorded; the operation has not settled.
    Pending,
    /// Every step succeeded.
    Completed,
    /// Failed before leaving any state behind.
    Aborted,
    /// Left pending by a partial failure and later resolved by a reconciler.
    Reconciled,
}

/// One logged intent.
#[derive(Debug, Clone, Serialize, Deserialize)]
pub struct IntentRecord {
    /// Intent identifier.
    pub id: IntentId,
    /// The announced operation.
    pub kind: IntentKind,
    /// Current status.
    pub status: IntentStatus,
    /// Failure reason or reconciliation note.
    pub note: Option<String>,
    /// When the intent was recorded.
    pub recorded_at: DateTime<Utc>,
    /// When the intent left `Pending`.
    pub settled_at: Option<DateTime<Utc>>,
}

/// Settled intents kept for inspection when no limit is configured.
pub const DEFAULT_SETTLED_HISTORY: usize = 256;

/// Pending intents plus a bounded tail of settled ones.
#[derive(Debug, Default)]
struct Entries {
    /// Intents not yet settled, in recording order.
    pending: Vec<IntentRecord>,
    /// Most recently settled intents, oldest first.
    settled: VecDeque<IntentRecord>,
}

/// Shared intent log of one account.
///
/// Pending intents are kept until they settle. Settled intents are kept
/// only up to the configured history length, oldest evicted first.
#[derive(Debug, Clone)]
pub struct IntentLog {
    entries: Arc<RwLock<Entries>>,
    /// Maximum number of settled intents retained.
    history: usize,
}

impl Default for IntentLog {
    fn default() -> Self {
        Self::with_history(DEFAULT_SETTLED_HISTORY)
    }
}

impl IntentLog {
    /// Creates an empty log with the default settled history.
    pub fn new() -> Self {
        Self::default()
    }

    /// Creates an empty log retaining at most `history` settled intents.
    pub fn with_history(history: usize) -> Self {
        Self {
            entries: Arc::new(RwLock::new(Entries::default())),
            history,
        }
    }

    /// Records a pending intent.
    pub async fn record(&self, kind: IntentKind) -> IntentId {
        let id = IntentId::new();
        debug!(intent_id = %id, kind = kind.label(), file_id = %kind.file_id(), "Recorded intent");

        self.entries.write().await.pending.push(IntentRecord {
            id,
            kind,
            status: IntentStatus::Pending,
            note: None,
            recorded_at: Utc::now(),
            settled_at: None,
        });
        id
    }

    /// Marks an intent completed.
    pub async fn complete(&self, id: IntentId) {
        self.settle(id, IntentStatus::Completed, None).await;
    }

    /// Marks an intent aborted with the failure that stopped it.
    pub async fn abort(&self, id: IntentId, reason: impl Into<String>) {
        self.settle(id, IntentStatus::Aborted, Some(reason.into()))
            .await;
    }

    /// Marks a pending intent resolved by reconciliation.
    pub async fn mark_reconciled(&self, id: IntentId, note: impl Into<String>) {
        self.settle(id, IntentStatus::Reconciled, Some(note.into()))
            .await;
    }

    async fn settle(&self, id: IntentId, status: IntentStatus, note: Option<String>) {
        let mut entries = self.entries.write().await;
        let Some(index) = entries.pending.iter().position(|e| e.id == id) else {
            match entries.settled.iter().find(|e| e.id == id) {
                Some(entry) => {
                    warn!(intent_id = %id, status = ?entry.status, "Intent already settled")
                }
                None => warn!(intent_id = %id, "Settling unknown intent"),
            }
            return;
        };

        let mut entry = entries.pending.remove(index);
        entry.status = status;
        entry.note = note;
        entry.settled_at = Some(Utc::now());
        entries.settled.push_back(entry);
        while entries.settled.len() > self.history {
            entries.settled.pop_front();
        }
        debug!(intent_id = %id, status = ?status, "Settled intent");
    }

    /// Looks up an intent that is pending or still in the settled history.
    pub async fn get(&self, id: IntentId) -> Option<IntentRecord> {
        let entries = self.entries.read().await;
        entries
            .pending
            .iter()
            .chain(entries.settled.iter())
            .find(|e| e.id == id)
            .cloned()
    }

    /// Every intent still pending, oldest first.
    pub async fn pending(&self) -> Vec<IntentRecord> {
        self.entries.read().await.pending.clone()
    }

    /// Every retained intent, oldest first.
    pub async fn all(&self) -> Vec<IntentRecord> {
        let entries = self.entries.read().await;
        let mut all: Vec<IntentRecord> = entries
            .settled
            .iter()
            .chain(entries.pending.iter())
            .cloned()
            .collect();
        all.sort_by_key(|e| e.recorded_at);
        all
    }

    /// Number of retained intents, pending and settled.
    pub async fn len(&self) -> usize {
        let entries = self.entries.read().await;
        entries.pending.len() + entries.settled.len()
    }

    /// Whether the log retains no intents.
    pub async fn is_empty(&self) -> bool {
        self.len().await == 0
    }
}
