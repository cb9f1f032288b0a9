//! Mutable state behind a [`MemoryCatalog`](super::MemoryCatalog).

use std::collections::HashMap;

use vault_core::error::AppError;
use vault_core::feed::Collection;
use vault_core::result::AppResult;
use vault_core::types::id::FileId;
use vault_entity::document::OpaqueDocument;
use vault_entity::file::{FileRecord, VersionRecord};
use vault_entity::folder::FolderNode;

use crate::feed::FeedHub;

/// Write faults armed on the catalog.
#[derive(Debug, Default, Clone, Copy)]
pub(crate) struct WriteFaults {
    /// Reject every write.
    pub fail_all: bool,
    /// Let this many more writes through, then reject the rest.
    pub remaining_before_failure: Option<u32>,
}

impl WriteFaults {
    /// Consume one write, failing if a fault is armed.
    pub fn admit(&mut self, operation: &str) -> AppResult<()> {
        if self.fail_all {
            return Err(AppError::metadata_write(format!(
                "Catalog rejected write: {operation}"
            )));
        }
        match self.remaining_before_failure {
            Some(0) => Err(AppError::metadata_write(format!(
                "Catalog rejected write: {operation}"
            ))),
            Some(n) => {
                self.remaining_before_failure = Some(n - 1);
                Ok(())
            }
            None => Ok(()),
        }
    }
}

/// Documents and feeds of one account.
#[derive(Debug)]
pub(crate) struct CatalogState {
    pub folders: Vec<FolderNode>,
    pub files: Vec<FileRecord>,
    pub versions: HashMap<FileId, Vec<VersionRecord>>,
    pub members: Vec<OpaqueDocument>,
    pub notes: Vec<OpaqueDocument>,

    pub faults: WriteFaults,
    /// Writes accepted so far.
    pub writes: u64,

    pub folder_feed: FeedHub<FolderNode>,
    pub file_feed: FeedHub<FileRecord>,
    pub version_feeds: HashMap<FileId, FeedHub<VersionRecord>>,
    pub member_feed: FeedHub<OpaqueDocument>,
    pub note_feed: FeedHub<OpaqueDocument>,
}

impl CatalogState {
    pub fn new() -> Self {
        Self {
            folders: Vec::new(),
            files: Vec::new(),
            versions: HashMap::new(),
            members: Vec::new(),
            notes: Vec::new(),
            faults: WriteFaults::default(),
            writes: 0,
            folder_feed: FeedHub::new(Collection::Folders),
            file_feed: FeedHub::new(Collection::Files),
            version_feeds: HashMap::new(),
            member_feed: FeedHub::new(Collection::Members),
            note_feed: FeedHub::new(Collection::Notes),
        }
    }

    /// Run the fault gate for a write and count it.
    pub fn admit_write(&mut self, operation: &str) -> AppResult<()> {
        self.faults.admit(operation)?;
        self.writes += 1;
        Ok(())
    }

    /// Position of a file, or `NotFound`.
    pub fn file_index(&self, id: FileId) -> AppResult<usize> {
        self.files
            .iter()
            .position(|f| f.id == id)
            .ok_or_else(|| AppError::not_found(format!("File {id} not found")))
    }

    pub fn folder_snapshot(&self) -> Vec<FolderNode> {
        newest_first(&self.folders, |f| f.created_at)
    }

    pub fn file_snapshot(&self) -> Vec<FileRecord> {
        newest_first(&self.files, |f| f.created_at)
    }

    pub fn version_snapshot(&self, file_id: FileId) -> Vec<VersionRecord> {
        self.versions
            .get(&file_id)
            .map(|chain| newest_first(chain, |v| v.archived_at))
            .unwrap_or_default()
    }

    pub fn publish_folders(&mut self) {
        let docs = self.folder_snapshot();
        self.folder_feed.publish(docs);
    }

    pub fn publish_files(&mut self) {
        let docs = self.file_snapshot();
        self.file_feed.publish(docs);
    }

    /// Publishes a file's chain. A hub left without subscribers is dropped.
    pub fn publish_versions(&mut self, file_id: FileId) {
        let docs = self.version_snapshot(file_id);
        let Some(feed) = self.version_feeds.get_mut(&file_id) else {
            return;
        };
        feed.publish(docs);
        if feed.subscriber_count() == 0 {
            self.version_feeds.remove(&file_id);
        }
    }

    /// Drops every version hub whose subscribers have all gone away.
    pub fn prune_version_feeds(&mut self) {
        self.version_feeds.retain(|_, feed| feed.subscriber_count() > 0);
    }

    /// Documents and feed of a mirrored collection.
    pub fn documents_mut(
        &mut self,
        collection: Collection,
    ) -> AppResult<(&mut Vec<OpaqueDocument>, &mut FeedHub<OpaqueDocument>)> {
        match collection {
            Collection::Members => Ok((&mut self.members, &mut self.member_feed)),
            Collection::Notes => Ok((&mut self.notes, &mut self.note_feed)),
            other => Err(AppError::validation(format!(
                "Collection {other} does not hold opaque documents"
            ))),
        }
    }

    pub fn documents(&self, collection: Collection) -> AppResult<&[OpaqueDocument]> {
        match collection {
            Collection::Members => Ok(&self.members),
            Collection::Notes => Ok(&self.notes),
            other => Err(AppError::validation(format!(
                "Collection {other} does not hold opaque documents"
            ))),
        }
    }
}

/// Newest first by `key`; equal keys keep the most recent insertion first.
pub(crate) fn newest_first<T: Clone, K: Ord>(docs: &[T], key: impl Fn(&T) -> K) -> Vec<T> {
    let mut out: Vec<T> = docs.iter().rev().cloned().collect();
    out.sort_by(|a, b| key(b).cmp(&key(a)));
    out
}
