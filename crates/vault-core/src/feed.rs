//! Collection feed types.
//!
//! The catalog publishes a full, ordered snapshot of a collection on
//! subscribe and after every mutation of that collection. Consumers never
//! see partial diffs.

use std::fmt;

use chrono::{DateTime, Utc};
use serde::{Deserialize, Serialize};
use tokio::sync::mpsc;

use crate::types::id::FileId;

/// A logical per-account collection.
#[derive(Debug, Clone, Copy, PartialEq, Eq, Hash, Serialize, Deserialize)]
#[serde(tag = "type", content = "file_id", rename_all = "snake_case")]
pub enum Collection {
    /// `folders`, ordered by `createdAt` descending.
    Folders,
    /// `files`, ordered by `createdAt` descending.
    Files,
    /// `files/{id}/versions`, ordered by `archivedAt` descending.
    Versions(FileId),
    /// `teamMembers`, ordered by `createdAt` descending.
    Members,
    /// `notes`, ordered by `createdAt` descending.
    Notes,
}

impl Collection {
    /// Path of the collection relative to the account root.
    pub fn path(&self) -> String {
        match self {
            Self::Folders => "folders".to_string(),
            Self::Files => "files".to_string(),
            Self::Versions(file_id) => format!("files/{file_id}/versions"),
            Self::Members => "teamMembers".to_string(),
            Self::Notes => "notes".to_string(),
        }
    }
}

impl fmt::Display for Collection {
    fn fmt(&self, f: &mut fmt::Formatter<'_>) -> fmt::Result {
        f.write_str(&self.path())
    }
}

/// One delivery of a collection feed.
#[derive(Debug, Clone)]
pub struct Snapshot<T> {
    /// Which collection this snapshot belongs to.
    pub collection: Collection,
    /// Every document in the collection, in feed order.
    pub docs: Vec<T>,
    /// When the snapshot was taken.
    pub taken_at: DateTime<Utc>,
}

impl<T> Snapshot<T> {
    /// Create a snapshot taken now.
    pub fn new(collection: Collection, docs: Vec<T>) -> Self {
        Self {
            collection,
            docs,
            taken_at: Utc::now(),
        }
    }
}

/// Receiving half of a collection subscription.
pub type Subscription<T> = mpsc::UnboundedReceiver<Snapshot<T>>;
