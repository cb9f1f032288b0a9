//! Folder scope, search query and sort of one browsing session.

use serde::{Deserialize, Serialize};

use vault_core::types::id::FolderId;
use vault_core::types::sorting::{SortKey, SortState};
use vault_entity::file::FileRecord;
use vault_entity::folder::FolderNode;

use crate::query::listing::{Listing, build_listing};

/// Where the user is and how the listing is ordered.
#[derive(Debug, Clone, Default, PartialEq, Serialize, Deserialize)]
pub struct BrowseSession {
    /// Folder in scope (`None` for the root).
    current_folder: Option<FolderId>,
    /// Search query; non-empty switches to global search.
    query: String,
    /// Active sort.
    sort: SortState,
}

impl BrowseSession {
    /// Starts at the root, newest first, no query.
    pub fn new() -> Self {
        Self::default()
    }

    pub fn current_folder(&self) -> Option<FolderId> {
        self.current_folder
    }

    pub fn query(&self) -> &str {
        &self.query
    }

    pub fn sort(&self) -> SortState {
        self.sort
    }

    /// Enters a folder. Clears the search query.
    pub fn open_folder(&mut self, folder_id: FolderId) {
        self.current_folder = Some(folder_id);
        self.query.clear();
    }

    /// Returns to the root. Clears the search query.
    pub fn go_to_root(&mut self) {
        self.current_folder = None;
        self.query.clear();
    }

    /// Moves to the parent of the current folder, or to the root when the
    /// parent is absent or does not resolve. Keeps the search query.
    pub fn go_up(&mut self, folders: &[FolderNode]) {
        let Some(current) = self.current_folder else {
            return;
        };
        self.current_folder = folders
            .iter()
            .find(|f| f.id == current)
            .and_then(|f| f.parent_id)
            .filter(|parent| folders.iter().any(|f| f.id == *parent));
    }

    pub fn set_query(&mut self, query: impl Into<String>) {
        self.query = query.into();
    }

    /// Clears the query, restoring the scoped listing.
    pub fn clear_query(&mut self) {
        self.query.clear();
    }

    /// Selects a sort column (same column flips, new column starts descending).
    pub fn toggle_sort(&mut self, key: SortKey) {
        self.sort = self.sort.toggle(key);
    }

    /// Renders the listing for the current state.
    pub fn render(&self, folders: &[FolderNode], files: &[FileRecord], max_hops: usize) -> Listing {
        build_listing(
            self.current_folder,
            &self.query,
            self.sort,
            folders,
            files,
            max_hops,
        )
    }
}

#[cfg(test)]
mod tests {
    use chrono::Utc;
    use vault_core::types::sorting::SortDirection;

    use crate::query::listing::ListingMode;

    use super::*;

    fn folder(name: &str, parent_id: Option<FolderId>) -> FolderNode {
        FolderNode {
            id: FolderId::new(),
            name: name.into(),
            parent_id,
            created_at: Utc::now(),
        }
    }

    #[test]
    fn test_navigation() {
        let reports = folder("Reports", None);
        let year = folder("2024", Some(reports.id));
        let folders = vec![reports.clone(), year.clone()];

        let mut session = BrowseSession::new();
        session.set_query("draft");
        session.open_folder(year.id);
        assert_eq!(session.query(), "");

        session.set_query("draft");
        session.go_up(&folders);
        assert_eq!(session.current_folder(), Some(reports.id));
        assert_eq!(session.query(), "draft");

        session.go_up(&folders);
        assert_eq!(session.current_folder(), None);
    }

    #[test]
    fn test_go_up_from_orphan_lands_on_root() {
        let orphan = folder("orphan", Some(FolderId::new()));
        let mut session = BrowseSession::new();
        session.open_folder(orphan.id);
        session.go_up(&[orphan]);
        assert_eq!(session.current_folder(), None);
    }

    #[test]
    fn test_sort_toggling() {
        let mut session = BrowseSession::new();
        assert_eq!(session.sort(), SortState::default());

        session.toggle_sort(SortKey::Name);
        assert_eq!(session.sort(), SortState::new(SortKey::Name, SortDirection::Desc));
        session.toggle_sort(SortKey::Name);
        assert_eq!(session.sort(), SortState::new(SortKey::Name, SortDirection::Asc));
        session.toggle_sort(SortKey::Size);
        assert_eq!(session.sort(), SortState::new(SortKey::Size, SortDirection::Desc));
    }

    #[test]
    fn test_clearing_query_restores_scope() {
        let reports = folder("Reports", None);
        let folders = vec![reports.clone()];

        let mut session = BrowseSession::new();
        session.open_folder(reports.id);
        session.set_query("rep");
        assert!(session.render(&folders, &[], 20).is_search());

        session.clear_query();
        let listing = session.render(&folders, &[], 20);
        assert_eq!(
            listing.mode,
            ListingMode::Scoped {
                folder_id: Some(reports.id)
            }
        );
    }
}
