//! File services: upload, delete, rename, and versioning.

pub mod service;
pub mod upload;
pub mod version;

pub use service::FileService;
pub use upload::{ProgressSink, UploadRequest, UploadService};
pub use version::{NewVersion, VersionOutcome, VersionService};
