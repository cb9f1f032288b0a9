//! Global, scope-independent name search.

use vault_entity::file::FileRecord;
use vault_entity::folder::FolderNode;

/// Whether `query` switches a listing into search mode.
pub fn is_search_query(query: &str) -> bool {
    !query.is_empty()
}

/// Case-insensitive substring match over every folder and file,
/// regardless of which folder they live in. Input order is kept.
pub fn search(
    query: &str,
    folders: &[FolderNode],
    files: &[FileRecord],
) -> (Vec<FolderNode>, Vec<FileRecord>) {
    let needle = query.to_lowercase();
    let hit = |name: &str| name.to_lowercase().contains(&needle);

    let folders = folders.iter().filter(|f| hit(f.name.as_str())).cloned().collect();
    let files = files.iter().filter(|f| hit(f.name.as_str())).cloned().collect();
    (folders, files)
}
