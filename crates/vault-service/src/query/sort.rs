//! Stable ordering of folder and file lists.

use std::cmp::Ordering;

use vault_core::types::sorting::{SortDirection, SortKey, SortState};
use vault_entity::file::FileRecord;
use vault_entity::folder::FolderNode;

/// Sorts folders in place. Folders have no size, so `Size` sorts by name.
pub fn sort_folders(folders: &mut [FolderNode], sort: SortState) {
    folders.sort_by(|a, b| {
        let ord = match sort.key {
            SortKey::Name | SortKey::Size => compare_names(&a.name, &b.name),
            SortKey::CreatedAt => a.created_at.cmp(&b.created_at),
        };
        directed(ord, sort.direction)
    });
}

/// Sorts files in place.
pub fn sort_files(files: &mut [FileRecord], sort: SortState) {
    files.sort_by(|a, b| {
        let ord = match sort.key {
            SortKey::Name => compare_names(&a.name, &b.name),
            SortKey::Size => a.size_bytes.cmp(&b.size_bytes),
            SortKey::CreatedAt => a.created_at.cmp(&b.created_at),
        };
        directed(ord, sort.direction)
    });
}

fn compare_names(a: &str, b: &str) -> Ordering {
    a.to_lowercase().cmp(&b.to_lowercase())
}

fn directed(ord: Ordering, direction: SortDirection) -> Ordering {
    match direction {
        SortDirection::Asc => ord,
        SortDirection::Desc => ord.reverse(),
    }
}
