//! Rendered listings: folders first, then files.

use serde::Serialize;

use vault_core::types::id::FolderId;
use vault_core::types::sorting::SortState;
use vault_entity::file::FileRecord;
use vault_entity::folder::FolderNode;

use crate::folder::tree::resolve_breadcrumbs;

use super::search::{is_search_query, search};
use super::sort::{sort_files, sort_folders};

/// How a listing was produced.
#[derive(Debug, Clone, PartialEq, Eq, Serialize)]
#[serde(tag = "mode", rename_all = "snake_case")]
pub enum ListingMode {
    /// Direct children of a folder (`None` for the root).
    Scoped {
        /// The folder in scope.
        folder_id: Option<FolderId>,
    },
    /// Global search across every folder and file.
    Search {
        /// The active query.
        query: String,
    },
}

/// One row of a listing.
#[derive(Debug, Clone, Copy, PartialEq)]
pub enum Entry<'a> {
    /// A folder row.
    Folder(&'a FolderNode),
    /// A file row.
    File(&'a FileRecord),
}

/// A sorted view of the catalog.
#[derive(Debug, Clone, Serialize)]
pub struct Listing {
    /// How the listing was produced.
    pub mode: ListingMode,
    /// Path from the root to the folder in scope. `None` while searching.
    pub breadcrumbs: Option<Vec<FolderNode>>,
    /// Sorted folders.
    pub folders: Vec<FolderNode>,
    /// Sorted files.
    pub files: Vec<FileRecord>,
}

impl Listing {
    /// All rows in render order: every folder before any file.
    pub fn entries(&self) -> Vec<Entry<'_>> {
        self.folders
            .iter()
            .map(Entry::Folder)
            .chain(self.files.iter().map(Entry::File))
            .collect()
    }

    /// Whether the listing has no rows.
    pub fn is_empty(&self) -> bool {
        self.folders.is_empty() && self.files.is_empty()
    }

    /// Whether the listing is a search result.
    pub fn is_search(&self) -> bool {
        matches!(self.mode, ListingMode::Search { .. })
    }
}

/// Builds the listing for a folder scope, query and sort.
///
/// A non-empty query replaces the scoped listing with a global search and
/// hides breadcrumbs. Otherwise only the direct children of `scope` are
/// listed. Folders and files are sorted independently.
pub fn build_listing(
    scope: Option<FolderId>,
    query: &str,
    sort: SortState,
    folders: &[FolderNode],
    files: &[FileRecord],
    max_hops: usize,
) -> Listing {
    let (mode, breadcrumbs, mut shown_folders, mut shown_files) = if is_search_query(query) {
        let (hit_folders, hit_files) = search(query, folders, files);
        let mode = ListingMode::Search {
            query: query.to_string(),
        };
        (mode, None, hit_folders, hit_files)
    } else {
        let children: Vec<FolderNode> = folders
            .iter()
            .filter(|f| f.parent_id == scope)
            .cloned()
            .collect();
        let contained: Vec<FileRecord> = files
            .iter()
            .filter(|f| f.folder_id == scope)
            .cloned()
            .collect();
        let breadcrumbs = scope
            .map(|id| resolve_breadcrumbs(id, folders, max_hops))
            .unwrap_or_default();
        let mode = ListingMode::Scoped { folder_id: scope };
        (mode, Some(breadcrumbs), children, contained)
    };

    sort_folders(&mut shown_folders, sort);
    sort_files(&mut shown_files, sort);

    Listing {
        mode,
        breadcrumbs,
        folders: shown_folders,
        files: shown_files,
    }
}
