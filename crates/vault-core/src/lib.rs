//! # vault-core
//!
//! Core crate for VaultFlow. Contains the blob store trait, configuration
//! schemas, typed identifiers, collection feed types, sorting types,
//! and the unified error system.
//!
//! This crate has **no** internal dependencies on other VaultFlow crates.

pub mod config;
pub mod error;
pub mod feed;
pub mod result;
pub mod traits;
pub mod types;

pub use error::{AppError, ErrorKind};
pub use result::AppResult;
