//! Core type definitions used across the VaultFlow workspace.

pub mod blob;
pub mod id;
pub mod sorting;

pub use blob::{BlobKey, ContentRef};
pub use id::*;
pub use sorting::{SortDirection, SortKey, SortState};
