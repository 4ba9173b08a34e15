//! Object store abstraction.
//!
//! The resolver needs exactly two things from a storage backend: open a read
//! on a key, and enumerate prefixes. The `TileStore` trait captures that seam
//! so the resolver and the HTTP layer can be exercised against an in-memory
//! store in tests, with the S3 implementation injected at startup.

mod s3;

pub use s3::{create_s3_client, S3ObjectReader, S3TileStore};

use async_trait::async_trait;
use bytes::Bytes;

use crate::error::StoreError;

/// A successfully opened object, ready to be read out.
///
/// Opening and reading are distinct phases: an open failure means the object
/// is missing or inaccessible, while a read failure happens after the backend
/// has already committed to serving it. The HTTP layer maps the two phases to
/// different status codes, so the split must be preserved by implementations.
#[async_trait]
pub trait ObjectReader: Send {
    /// Read the body to the end, consuming the reader.
    async fn read_to_end(self) -> Result<Bytes, StoreError>;

    /// The storage key this reader was opened on.
    fn key(&self) -> &str;
}

/// Trait for key → byte-stream lookup backends.
#[async_trait]
pub trait TileStore: Send + Sync {
    /// The type of reader this store produces.
    type Reader: ObjectReader + 'static;

    /// Open a read on the object at `key`.
    async fn open(&self, key: &str) -> Result<Self::Reader, StoreError>;

    /// List the distinct prefixes under `prefix`, grouped by `delimiter`,
    /// non-recursive. Entries keep their trailing delimiter.
    async fn list_prefixes(&self, delimiter: &str, prefix: &str)
        -> Result<Vec<String>, StoreError>;
}
