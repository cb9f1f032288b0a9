//! The locally materialized view of an account's collections.

use std::collections::HashMap;

use vault_core::feed::Collection;
use vault_core::types::id::FileId;
use vault_entity::document::OpaqueDocument;
use vault_entity::file::{FileRecord, VersionRecord};
use vault_entity::folder::FolderNode;
use vault_service::browse::BrowseSession;
use vault_service::query::Listing;

/// Latest snapshot of every subscribed collection, in feed order.
#[derive(Debug, Clone, Default)]
pub struct LocalProjection {
    pub folders: Vec<FolderNode>,
    pub files: Vec<FileRecord>,
    /// Version chains of the files being watched.
    pub versions: HashMap<FileId, Vec<VersionRecord>>,
    pub members: Vec<OpaqueDocument>,
    pub notes: Vec<OpaqueDocument>,
}

impl LocalProjection {
    pub fn apply_folders(&mut self, _collection: Collection, docs: Vec<FolderNode>) {
        self.folders = docs;
    }

    pub fn apply_files(&mut self, _collection: Collection, docs: Vec<FileRecord>) {
        self.files = docs;
    }

    pub fn apply_versions(&mut self, collection: Collection, docs: Vec<VersionRecord>) {
        if let Collection::Versions(file_id) = collection {
            self.versions.insert(file_id, docs);
        }
    }

    pub fn apply_documents(&mut self, collection: Collection, docs: Vec<OpaqueDocument>) {
        match collection {
            Collection::Members => self.members = docs,
            Collection::Notes => self.notes = docs,
            _ => {}
        }
    }

    /// Version chain of a watched file, most recent first.
    pub fn versions_of(&self, file_id: FileId) -> &[VersionRecord] {
        self.versions.get(&file_id).map(Vec::as_slice).unwrap_or_default()
    }

    /// Renders `session` over the projected folders and files.
    pub fn listing(&self, session: &BrowseSession, max_hops: usize) -> Listing {
        session.render(&self.folders, &self.files, max_hops)
    }
}
