//! # vault-entity
//!
//! Catalog entity models for VaultFlow. Every struct in this crate is a
//! document stored in one of the per-account collections (`folders`,
//! `files`, `files/{id}/versions`, `notes`, `teamMembers`) or a value
//! object derived from them. All entities derive `Debug`, `Clone`,
//! `Serialize` and `Deserialize`.

pub mod document;
pub mod file;
pub mod folder;
pub mod quota;
