//! # vault-catalog
//!
//! The metadata catalog: the only component allowed to mutate folders,
//! files, and version records. Defines the [`CatalogStore`] trait every
//! document store backend implements, plus an in-memory backend that
//! publishes full per-collection snapshots to subscribers.
//!
//! The catalog validates structure only. Cross-entity invariants
//! (acyclic parent chains, referential presence) belong to its callers.

pub mod feed;
pub mod memory;
pub mod traits;

pub use memory::MemoryCatalog;
pub use traits::CatalogStore;
