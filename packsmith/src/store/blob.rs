//! Blob storage for asset payloads.
//!
//! Texture bytes, companion metadata, block-state bytes and bundle
//! archives are kept out of the document store and addressed by
//! deterministic names (see the `*_blob_name` helpers in the parent
//! module).

use std::path::{Path, PathBuf};

use dashmap::DashMap;
use tokio::fs;

use super::{BoxFuture, StoreError, StoreResult};

/// Name-addressed byte storage.
pub trait BlobStore: Send + Sync {
    /// Store bytes under a name. Without `overwrite`, uploading over an
    /// existing blob is a constraint violation.
    fn upload(&self, name: &str, bytes: Vec<u8>, overwrite: bool) -> BoxFuture<'_, StoreResult<()>>;

    /// Fetch a blob; absent blobs are [`StoreError::BlobNotFound`].
    fn download(&self, name: &str) -> BoxFuture<'_, StoreResult<Vec<u8>>>;

    /// Existence check.
    fn exists(&self, name: &str) -> BoxFuture<'_, StoreResult<bool>>;

    /// Delete a blob; deleting an absent blob is a no-op.
    fn delete(&self, name: &str) -> BoxFuture<'_, StoreResult<()>>;
}

/// Filesystem-backed blob store: one file per blob under a root
/// directory.
#[derive(Debug)]
pub struct FsBlobStore {
    root: PathBuf,
}

impl FsBlobStore {
    /// Create a store rooted at the given directory.
    pub fn new(root: impl Into<PathBuf>) -> Self {
        Self { root: root.into() }
    }

    fn blob_path(&self, name: &str) -> PathBuf {
        self.root.join(name)
    }
}

impl BlobStore for FsBlobStore {
    fn upload(
        &self,
        name: &str,
        bytes: Vec<u8>,
        overwrite: bool,
    ) -> BoxFuture<'_, StoreResult<()>> {
        let path = self.blob_path(name);
        let name = name.to_string();
        Box::pin(async move {
            if !overwrite && path_exists(&path).await {
                return Err(StoreError::Constraint(format!(
                    "blob {} already exists",
                    name
                )));
            }
            fs::create_dir_all(&self.root).await?;
            fs::write(&path, bytes).await?;
            Ok(())
        })
    }

    fn download(&self, name: &str) -> BoxFuture<'_, StoreResult<Vec<u8>>> {
        let path = self.blob_path(name);
        let name = name.to_string();
        Box::pin(async move {
            match fs::read(&path).await {
                Ok(bytes) => Ok(bytes),
                Err(e) if e.kind() == std::io::ErrorKind::NotFound => {
                    Err(StoreError::BlobNotFound(name))
                }
                Err(e) => Err(e.into()),
            }
        })
    }

    fn exists(&self, name: &str) -> BoxFuture<'_, StoreResult<bool>> {
        let path = self.blob_path(name);
        Box::pin(async move { Ok(path_exists(&path).await) })
    }

    fn delete(&self, name: &str) -> BoxFuture<'_, StoreResult<()>> {
        let path = self.blob_path(name);
        Box::pin(async move {
            match fs::remove_file(&path).await {
                Ok(()) => Ok(()),
                Err(e) if e.kind() == std::io::ErrorKind::NotFound => Ok(()),
                Err(e) => Err(e.into()),
            }
        })
    }
}

async fn path_exists(path: &Path) -> bool {
    fs::metadata(path).await.is_ok()
}

/// In-memory blob store for tests.
#[derive(Debug, Default)]
pub struct MemoryBlobStore {
    blobs: DashMap<String, Vec<u8>>,
}

impl MemoryBlobStore {
    /// Create an empty store.
    pub fn new() -> Self {
        Self::default()
    }
}

impl BlobStore for MemoryBlobStore {
    fn upload(
        &self,
        name: &str,
        bytes: Vec<u8>,
        overwrite: bool,
    ) -> BoxFuture<'_, StoreResult<()>> {
        let name = name.to_string();
        Box::pin(async move {
            if !overwrite && self.blobs.contains_key(&name) {
                return Err(StoreError::Constraint(format!(
                    "blob {} already exists",
                    name
                )));
            }
            self.blobs.insert(name, bytes);
            Ok(())
        })
    }

    fn download(&self, name: &str) -> BoxFuture<'_, StoreResult<Vec<u8>>> {
        let name = name.to_string();
        Box::pin(async move {
            self.blobs
                .get(&name)
                .map(|b| b.clone())
                .ok_or(StoreError::BlobNotFound(name))
        })
    }

    fn exists(&self, name: &str) -> BoxFuture<'_, StoreResult<bool>> {
        let name = name.to_string();
        Box::pin(async move { Ok(self.blobs.contains_key(&name)) })
    }

    fn delete(&self, name: &str) -> BoxFuture<'_, StoreResult<()>> {
        let name = name.to_string();
        Box::pin(async move {
            self.blobs.remove(&name);
            Ok(())
        })
    }
}

#[cfg(test)]
mod tests {
    use super::*;
    use tempfile::TempDir;

    #[tokio::test]
    async fn test_fs_upload_download_round_trip() {
        let dir = TempDir::new().unwrap();
        let store = FsBlobStore::new(dir.path());
        store
            .upload("texture-1.png", vec![1, 2, 3], false)
            .await
            .unwrap();
        assert_eq!(store.download("texture-1.png").await.unwrap(), vec![1, 2, 3]);
    }

    #[tokio::test]
    async fn test_fs_upload_without_overwrite_rejects_existing() {
        let dir = TempDir::new().unwrap();
        let store = FsBlobStore::new(dir.path());
        store.upload("a", vec![1], false).await.unwrap();
        assert!(matches!(
            store.upload("a", vec![2], false).await,
            Err(StoreError::Constraint(_))
        ));
        store.upload("a", vec![2], true).await.unwrap();
        assert_eq!(store.download("a").await.unwrap(), vec![2]);
    }

    #[tokio::test]
    async fn test_fs_download_missing_blob() {
        let dir = TempDir::new().unwrap();
        let store = FsBlobStore::new(dir.path());
        assert!(matches!(
            store.download("missing").await,
            Err(StoreError::BlobNotFound(_))
        ));
    }

    #[tokio::test]
    async fn test_fs_delete_is_idempotent() {
        let dir = TempDir::new().unwrap();
        let store = FsBlobStore::new(dir.path());
        store.upload("a", vec![1], false).await.unwrap();
        store.delete("a").await.unwrap();
        store.delete("a").await.unwrap();
        assert!(!store.exists("a").await.unwrap());
    }

    #[tokio::test]
    async fn test_memory_store_mirrors_fs_semantics() {
        let store = MemoryBlobStore::new();
        store.upload("a", vec![1], false).await.unwrap();
        assert!(store.exists("a").await.unwrap());
        assert!(store.upload("a", vec![2], false).await.is_err());
        store.delete("a").await.unwrap();
        assert!(matches!(
            store.download("a").await,
            Err(StoreError::BlobNotFound(_))
        ));
    }
}
