//! The durable blob-store collaborator.
//!
//! The pipeline reads its source footage from, and writes its outputs to, a
//! [`BlobStore`]: durable put/get of named byte blobs addressed by an opaque
//! slash-separated name. [`DirectoryStore`] is the stock filesystem-rooted
//! implementation used by the CLI and tests; cloud backends live with the
//! routing layer, behind the same trait.

use std::path::{Path, PathBuf};

use async_trait::async_trait;

use crate::error::SidelineError;

/// Durable put/get of named byte blobs.
#[async_trait]
pub trait BlobStore: Send + Sync {
    /// Store the file at `local` under `name`, returning a reference the
    /// caller can hand out (for [`DirectoryStore`], the name itself).
    async fn put(&self, name: &str, local: &Path) -> Result<String, SidelineError>;

    /// Fetch the blob `name` into the file at `local`.
    async fn get(&self, name: &str, local: &Path) -> Result<(), SidelineError>;
}

/// Filesystem-rooted blob store.
///
/// Blob names are slash-separated relative paths under the root directory.
///
/// # Example
///
/// ```no_run
/// use sideline::DirectoryStore;
///
/// let store = DirectoryStore::new("/var/lib/sideline")?;
/// # Ok::<(), sideline::SidelineError>(())
/// ```
#[derive(Debug, Clone)]
pub struct DirectoryStore {
    root: PathBuf,
}

impl DirectoryStore {
    /// Create a store rooted at `root`, creating the directory if needed.
    pub fn new<P: AsRef<Path>>(root: P) -> Result<Self, SidelineError> {
        let root = root.as_ref().to_path_buf();
        std::fs::create_dir_all(&root)?;
        Ok(Self { root })
    }

    /// Resolve a blob name to a path under the root.
    ///
    /// Rejects names that would escape the root.
    fn resolve(&self, name: &str) -> Result<PathBuf, SidelineError> {
        if name.is_empty()
            || name.starts_with('/')
            || name.split('/').any(|part| part == ".." || part.is_empty())
        {
            return Err(SidelineError::Storage {
                name: name.to_string(),
                reason: "invalid blob name".to_string(),
            });
        }
        Ok(self.root.join(name))
    }
}

#[async_trait]
impl BlobStore for DirectoryStore {
    async fn put(&self, name: &str, local: &Path) -> Result<String, SidelineError> {
        let destination = self.resolve(name)?;
        if let Some(parent) = destination.parent() {
            tokio::fs::create_dir_all(parent)
                .await
                .map_err(|error| SidelineError::Storage {
                    name: name.to_string(),
                    reason: error.to_string(),
                })?;
        }
        tokio::fs::copy(local, &destination)
            .await
            .map_err(|error| SidelineError::Storage {
                name: name.to_string(),
                reason: error.to_string(),
            })?;
        log::debug!("Stored blob '{name}' at {destination:?}");
        Ok(name.to_string())
    }

    async fn get(&self, name: &str, local: &Path) -> Result<(), SidelineError> {
        let source = self.resolve(name)?;
        tokio::fs::copy(&source, local)
            .await
            .map_err(|error| SidelineError::Storage {
                name: name.to_string(),
                reason: error.to_string(),
            })?;
        Ok(())
    }
}
