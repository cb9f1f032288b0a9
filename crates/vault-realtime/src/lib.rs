//! # vault-realtime
//!
//! Realtime projection sync for VaultFlow. Provides:
//!
//! - One push subscription (and one task) per catalog collection
//! - A [`LocalProjection`] materialized from full collection snapshots
//! - A [`LoadTracker`] whose "loaded" signal is the conjunction of every
//!   registered subscription's first-snapshot flag

pub mod projection;
pub mod sync;
pub mod tracker;

pub use projection::LocalProjection;
pub use sync::ProjectionSync;
pub use tracker::{LoadState, LoadTracker};
