//! Blob store trait for the external binary content service.

use std::pin::Pin;

use async_trait::async_trait;
use bytes::Bytes;
use futures::Stream;

use crate::result::AppResult;
use crate::types::blob::{BlobKey, ContentRef};

/// A byte stream used for uploading content.
pub type ByteStream = Pin<Box<dyn Stream<Item = Result<Bytes, std::io::Error>> + Send>>;

/// Trait for blob store backends.
///
/// Failures are reported with the vault error taxonomy: an absent object is
/// [`ErrorKind::BlobMissing`](crate::error::ErrorKind::BlobMissing), every
/// other backend failure is
/// [`ErrorKind::BlobStoreFailure`](crate::error::ErrorKind::BlobStoreFailure).
/// A failed `write_stream` leaves nothing behind at `key`.
#[async_trait]
pub trait BlobStore: Send + Sync + std::fmt::Debug + 'static {
    /// Return the provider type name (e.g. "memory", "local").
    fn provider_type(&self) -> &str;

    /// Write a byte stream to `key`, returning the number of bytes stored.
    async fn write_stream(&self, key: &BlobKey, stream: ByteStream) -> AppResult<u64>;

    /// Derive a retrieval reference for an existing blob.
    async fn content_ref(&self, key: &BlobKey) -> AppResult<ContentRef>;

    /// Delete the blob at `key`.
    async fn delete(&self, key: &BlobKey) -> AppResult<()>;

    /// Check whether a blob exists at `key`.
    async fn exists(&self, key: &BlobKey) -> AppResult<bool>;

    /// List every key under `prefix`.
    async fn list(&self, prefix: &str) -> AppResult<Vec<BlobKey>>;
}
