//! # VaultFlow
//!
//! A per-account file vault. Metadata lives in a realtime catalog and
//! content lives in a blob store; the services in `vault-service` keep the
//! two consistent across uploads, deletes, renames and version changes,
//! and `vault-realtime` keeps a local projection of the catalog in sync.
//!
//! [`Vault`] wires every piece together for one signed-in account.

pub mod logging;
pub mod vault;

pub use logging::init_logging;
pub use vault::Vault;

pub use vault_core::config::VaultConfig;
pub use vault_core::{AppError, AppResult, ErrorKind};
pub use vault_realtime::ProjectionSync;
pub use vault_service::{
    AccountContext, BrowseSession, DashboardState, ItemRef, Listing, ListingMode, NewVersion,
    ProgressSink, UploadRequest,
};
