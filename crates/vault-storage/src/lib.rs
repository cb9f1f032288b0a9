//! # vault-storage
//!
//! Blob store implementations for VaultFlow: an in-memory store with
//! injectable faults and a local filesystem store. Also owns the blob key
//! layout and MIME type guessing.

pub mod factory;
pub mod keys;
pub mod mime;
pub mod providers;

pub use factory::build_blob_store;
pub use keys::BlobKeyGenerator;
