//! Filesystem blob store rooted in a capability-scoped directory.
//!
//! All writes go through a `cap_std::fs::Dir`, so a path can never resolve
//! outside the root even if validation were bypassed. Files are opened with
//! `create_new`; an existing blob is never overwritten.

use std::io::{self, Write};
use std::path::{Path, PathBuf};
use std::sync::Arc;

use async_trait::async_trait;
use cap_std::ambient_authority;
use cap_std::fs::{Dir, OpenOptions};
use tracing::debug;

use crate::domain::ports::{BlobStore, BlobStoreError};

/// Reject empty, absolute, and parent-relative paths.
pub(crate) fn validate_blob_path(path: &str) -> Result<(), BlobStoreError> {
    let malformed = path.is_empty()
        || path.starts_with('/')
        || path.contains('\\')
        || path
            .split('/')
            .any(|part| part.is_empty() || part == "." || part == "..");
    if malformed {
        Err(BlobStoreError::invalid_path(path))
    } else {
        Ok(())
    }
}

/// Blob store writing beneath a local directory.
#[derive(Clone)]
pub struct FsBlobStore {
    root: Arc<Dir>,
    base_url: String,
}

impl FsBlobStore {
    /// Open (creating if needed) `root` and serve blobs under `base_url`.
    ///
    /// # Errors
    ///
    /// Returns an I/O error when the directory cannot be created or opened.
    pub fn open(root: impl AsRef<Path>, base_url: impl Into<String>) -> io::Result<Self> {
        let root = root.as_ref();
        Dir::create_ambient_dir_all(root, ambient_authority())?;
        let dir = Dir::open_ambient_dir(root, ambient_authority())?;
        Ok(Self {
            root: Arc::new(dir),
            base_url: base_url.into().trim_end_matches('/').to_owned(),
        })
    }
}

fn write_new(root: &Dir, path: &str, bytes: &[u8]) -> Result<(), BlobStoreError> {
    let relative = PathBuf::from(path);
    if let Some(parent) = relative.parent().filter(|p| !p.as_os_str().is_empty()) {
        root.create_dir_all(parent)
            .map_err(|err| BlobStoreError::write(err.to_string()))?;
    }
    let mut options = OpenOptions::new();
    options.write(true).create_new(true);
    let mut file = root.open_with(&relative, &options).map_err(|err| {
        if err.kind() == io::ErrorKind::AlreadyExists {
            BlobStoreError::already_exists(path)
        } else {
            BlobStoreError::write(err.to_string())
        }
    })?;
    file.write_all(bytes)
        .and_then(|()| file.sync_all())
        .map_err(|err| BlobStoreError::write(err.to_string()))
}

#[async_trait]
impl BlobStore for FsBlobStore {
    async fn upload(&self, path: &str, bytes: Vec<u8>) -> Result<(), BlobStoreError> {
        validate_blob_path(path)?;
        let root = Arc::clone(&self.root);
        let owned = path.to_owned();
        let size = bytes.len();
        tokio::task::spawn_blocking(move || write_new(&root, &owned, &bytes))
            .await
            .map_err(|err| BlobStoreError::write(err.to_string()))??;
        debug!(%path, size, "blob written");
        Ok(())
    }

    fn public_url(&self, path: &str) -> String {
        format!("{}/{path}", self.base_url)
    }
}
