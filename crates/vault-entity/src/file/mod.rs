//! File domain entities.

pub mod kind;
pub mod model;
pub mod version;

pub use kind::ContentKind;
pub use model::{ContentUpdate, FileRecord, format_size};
pub use version::VersionRecord;
