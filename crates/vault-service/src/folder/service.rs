//! Folder CRUD. Metadata only: no folder operation touches the blob store.

use std::sync::Arc;

use chrono::Utc;
use tracing::info;

use vault_catalog::CatalogStore;
use vault_core::error::AppError;
use vault_core::result::AppResult;
use vault_core::types::id::{AccountId, FolderId};
use vault_entity::folder::{CreateFolder, FolderNode};

use crate::file::upload::as_metadata_failure;
use crate::naming::normalize_rename;

/// Manages folder CRUD operations.
#[derive(Debug, Clone)]
pub struct FolderService {
    /// Owning account.
    account: AccountId,
    /// Metadata catalog.
    catalog: Arc<dyn CatalogStore>,
}

impl FolderService {
    /// Creates a new folder service.
    pub fn new(account: AccountId, catalog: Arc<dyn CatalogStore>) -> Self {
        Self { account, catalog }
    }

    /// Gets a folder by ID.
    pub async fn get_folder(&self, folder_id: FolderId) -> AppResult<FolderNode> {
        self.catalog
            .find_folder(folder_id)
            .await?
            .ok_or_else(|| AppError::not_found(format!("Folder {folder_id} not found")))
    }

    /// Lists every folder, newest first.
    pub async fn list_folders(&self) -> AppResult<Vec<FolderNode>> {
        self.catalog.list_folders().await
    }

    /// Lists the direct children of `parent_id` (`None` for the root).
    pub async fn list_children(&self, parent_id: Option<FolderId>) -> AppResult<Vec<FolderNode>> {
        let mut folders = self.catalog.list_folders().await?;
        folders.retain(|f| f.parent_id == parent_id);
        Ok(folders)
    }

    /// Creates a new folder. A blank name becomes "Untitled Folder".
    ///
    /// The parent, when given, must exist.
    pub async fn create_folder(&self, req: CreateFolder) -> AppResult<FolderNode> {
        if let Some(parent_id) = req.parent_id {
            self.get_folder(parent_id).await?;
        }

        let folder = req.into_node(Utc::now());
        self.catalog
            .insert_folder(&folder)
            .await
            .map_err(as_metadata_failure)?;

        info!(
            account = %self.account,
            folder_id = %folder.id,
            name = %folder.name,
            parent_id = ?folder.parent_id,
            "Folder created"
        );
        Ok(folder)
    }

    /// Renames a folder. A draft equal to the current name performs no write.
    pub async fn rename_folder(&self, folder_id: FolderId, draft: &str) -> AppResult<FolderNode> {
        let mut folder = self.get_folder(folder_id).await?;
        let Some(name) = normalize_rename(&folder.name, draft)? else {
            return Ok(folder);
        };

        folder.name = name;
        self.catalog
            .update_folder(&folder)
            .await
            .map_err(as_metadata_failure)?;

        info!(account = %self.account, folder_id = %folder_id, name = %folder.name, "Folder renamed");
        Ok(folder)
    }

    /// Deletes a folder record.
    ///
    /// Contained files and subfolders are left in place; they keep
    /// pointing at the deleted folder.
    pub async fn delete_folder(&self, folder_id: FolderId) -> AppResult<()> {
        let removed = self
            .catalog
            .delete_folder(folder_id)
            .await
            .map_err(as_metadata_failure)?;
        if !removed {
            return Err(AppError::not_found(format!("Folder {folder_id} not found")));
        }

        info!(account = %self.account, folder_id = %folder_id, "Folder deleted");
        Ok(())
    }
}
