//! # vault-service
//!
//! Business logic for VaultFlow. Services coordinate the metadata catalog
//! and the blob store, which fail independently and share no transaction:
//!
//! - [`UploadService`]: quota gate, blob stream, then the file record.
//! - [`FileService`]: two-phase delete (blob first), rename, content refs.
//! - [`VersionService`]: archive-before-overwrite commits and restores.
//! - [`FolderService`] / [`TreeService`]: metadata-only folders, breadcrumbs.
//! - [`query`]: scoped listings, global search, sorting.
//! - [`browse`]: browse session and dashboard state machine.
//! - [`intent`]: intent log and the explicit reconciliation pass.
//!
//! Services follow constructor injection: all dependencies are provided
//! at construction time via `Arc` references.

pub mod browse;
pub mod context;
pub mod file;
pub mod folder;
pub mod intent;
pub mod naming;
pub mod query;

#[cfg(test)]
pub(crate) mod testing;

pub use browse::{BrowseSession, DashboardState, ItemRef};
pub use context::AccountContext;
pub use file::{
    FileService, NewVersion, ProgressSink, UploadRequest, UploadService, VersionOutcome,
    VersionService,
};
pub use folder::{FolderService, TreeService};
pub use intent::{IntentLog, ReconcileReport, Reconciler};
pub use query::{Listing, ListingMode};
