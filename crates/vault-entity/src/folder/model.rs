//! Folder entity model.

use chrono::{DateTime, Utc};
use serde::{Deserialize, Serialize};

use vault_core::types::id::FolderId;

/// Name given to folders created without one.
pub const DEFAULT_FOLDER_NAME: &str = "Untitled Folder";

/// A folder in the vault hierarchy.
///
/// The parent chain must be acyclic; readers still bound every upward
/// walk because a corrupted record could point back into its own chain.
#[derive(Debug, Clone, PartialEq, Serialize, Deserialize)]
#[serde(rename_all = "camelCase")]
pub struct FolderNode {
    /// Unique folder identifier.
    pub id: FolderId,
    /// Folder name.
    pub name: String,
    /// Parent folder (`None` for root-level folders).
    pub parent_id: Option<FolderId>,
    /// When the folder was created.
    pub created_at: DateTime<Utc>,
}

impl FolderNode {
    /// Check if this is a root-level folder (no parent).
    pub fn is_root(&self) -> bool {
        self.parent_id.is_none()
    }
}

/// Data required to create a new folder.
#[derive(Debug, Clone, Default, Serialize, Deserialize)]
pub struct CreateFolder {
    /// Folder name; blank names become [`DEFAULT_FOLDER_NAME`].
    pub name: Option<String>,
    /// Parent folder (None for root).
    pub parent_id: Option<FolderId>,
}

impl CreateFolder {
    /// Build the folder node this request describes.
    pub fn into_node(self, created_at: DateTime<Utc>) -> FolderNode {
        let name = self
            .name
            .map(|n| n.trim().to_string())
            .filter(|n| !n.is_empty())
            .unwrap_or_else(|| DEFAULT_FOLDER_NAME.to_string());

        FolderNode {
            id: FolderId::new(),
            name,
            parent_id: self.parent_id,
            created_at,
        }
    }
}
