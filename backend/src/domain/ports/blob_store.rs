//! Port for lesson asset storage.

use async_trait::async_trait;

use super::define_port_error;

define_port_error! {
    /// Errors raised by blob store adapters.
    pub enum BlobStoreError {
        /// The path is malformed or escapes the store root.
        InvalidPath { path: String } => "invalid blob path: {path}",
        /// A blob already exists at the path.
        AlreadyExists { path: String } => "blob already exists: {path}",
        /// Writing the blob failed.
        Write { message: String } => "blob write failed: {message}",
    }
}

/// Opaque namespace of uploaded files.
#[cfg_attr(test, mockall::automock)]
#[async_trait]
pub trait BlobStore: Send + Sync {
    /// Store `bytes` at `path`; existing blobs are never overwritten.
    async fn upload(&self, path: &str, bytes: Vec<u8>) -> Result<(), BlobStoreError>;

    /// Public URL for the blob at `path`.
    fn public_url(&self, path: &str) -> String;
}
