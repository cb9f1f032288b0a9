//! Breadcrumb resolution over the flat folder set.

use std::collections::HashMap;
use std::sync::Arc;

use vault_catalog::CatalogStore;
use vault_core::error::AppError;
use vault_core::result::AppResult;
use vault_core::types::id::FolderId;
use vault_entity::folder::FolderNode;

/// Resolves the path from the root down to `folder_id`.
///
/// Starts at the folder itself and follows parent references upward,
/// prepending each resolved parent, for at most `max_hops` hops. A parent
/// that does not resolve ends the walk silently, so a dangling reference
/// truncates the path instead of failing. An unknown `folder_id` yields
/// an empty path.
pub fn resolve_breadcrumbs(
    folder_id: FolderId,
    folders: &[FolderNode],
    max_hops: usize,
) -> Vec<FolderNode> {
    let by_id: HashMap<FolderId, &FolderNode> = folders.iter().map(|f| (f.id, f)).collect();

    let Some(start) = by_id.get(&folder_id).copied() else {
        return Vec::new();
    };

    let mut path = vec![start.clone()];
    let mut current = start;
    while path.len() <= max_hops {
        let Some(parent) = current.parent_id.and_then(|id| by_id.get(&id).copied()) else {
            break;
        };
        path.push(parent.clone());
        current = parent;
    }

    path.reverse();
    path
}

/// Resolves breadcrumbs against the catalog.
#[derive(Debug, Clone)]
pub struct TreeService {
    /// Metadata catalog.
    catalog: Arc<dyn CatalogStore>,
    /// Parent hop cap.
    max_hops: usize,
}

impl TreeService {
    /// Creates a new tree service.
    pub fn new(catalog: Arc<dyn CatalogStore>, max_hops: usize) -> Self {
        Self { catalog, max_hops }
    }

    /// Gets the breadcrumb trail from the root to the given folder.
    pub async fn get_breadcrumbs(&self, folder_id: FolderId) -> AppResult<Vec<FolderNode>> {
        let folders = self.catalog.list_folders().await?;
        if !folders.iter().any(|f| f.id == folder_id) {
            return Err(AppError::not_found(format!("Folder {folder_id} not found")));
        }
        Ok(resolve_breadcrumbs(folder_id, &folders, self.max_hops))
    }
}

#[cfg(test)]
mod tests {
    use chrono::Utc;

    use crate::testing::Fixture;

    use super::*;

    fn node(name: &str, parent_id: Option<FolderId>) -> FolderNode {
        FolderNode {
            id: FolderId::new(),
            name: name.into(),
            parent_id,
            created_at: Utc::now(),
        }
    }

    fn names(path: &[FolderNode]) -> Vec<&str> {
        path.iter().map(|f| f.name.as_str()).collect()
    }

    #[test]
    fn test_chain_depth_equals_path_length() {
        let mut folders = vec![node("f0", None)];
        for i in 1..6 {
            let parent = folders[i - 1].id;
            folders.push(node(&format!("f{i}"), Some(parent)));
        }

        let path = resolve_breadcrumbs(folders[5].id, &folders, 20);
        assert_eq!(path.len(), 6);
        assert!(path[0].parent_id.is_none());
        assert_eq!(names(&path), vec!["f0", "f1", "f2", "f3", "f4", "f5"]);
    }

    #[test]
    fn test_dangling_parent_truncates() {
        let orphan = node("orphan", Some(FolderId::new()));
        let child = node("child", Some(orphan.id));
        let folders = vec![orphan, child.clone()];

        let path = resolve_breadcrumbs(child.id, &folders, 20);
        assert_eq!(names(&path), vec!["orphan", "child"]);
    }

    #[test]
    fn test_cycle_is_bounded() {
        let mut a = node("a", None);
        let b = node("b", Some(a.id));
        a.parent_id = Some(b.id);
        let folders = vec![a.clone(), b];

        let path = resolve_breadcrumbs(a.id, &folders, 20);
        assert_eq!(path.len(), 21);
        assert_eq!(path.last().unwrap().id, a.id);
    }

    #[test]
    fn test_unknown_folder_has_no_path() {
        assert!(resolve_breadcrumbs(FolderId::new(), &[], 20).is_empty());
    }

    #[tokio::test]
    async fn test_service_resolves_from_catalog() {
        let fx = Fixture::new();
        let reports = fx.folder("Reports", None).await;
        let year = fx.folder("2024", Some(reports.id)).await;

        let path = fx.tree.get_breadcrumbs(year.id).await.unwrap();
        assert_eq!(names(&path), vec!["Reports", "2024"]);

        assert!(fx.tree.get_breadcrumbs(FolderId::new()).await.is_err());
    }
}
