//! File storage for attachments.
//!
//! Paths are relative to the storage root and always `{media_id}/{file_name}`.

use async_trait::async_trait;
use std::path::{Component, Path, PathBuf};
use thiserror::Error;
use tokio::fs;
use tracing::debug;

#[derive(Debug, Error)]
pub enum StorageError {
    #[error("Invalid storage path: {0}")]
    InvalidPath(String),

    #[error("Storage I/O error at {path}: {source}")]
    Io {
        path: String,
        #[source]
        source: std::io::Error,
    },
}

#[async_trait]
pub trait FileStorage: Send + Sync {
    /// Writes `bytes` at `path`, creating parent directories.
    async fn put(&self, path: &str, bytes: &[u8]) -> Result<(), StorageError>;

    /// Removes the file at `path` and its directory once empty. Missing
    /// files are not an error.
    async fn delete(&self, path: &str) -> Result<(), StorageError>;

    async fn exists(&self, path: &str) -> bool;
}

/// Stores files under a local directory.
pub struct LocalStorage {
    root: PathBuf,
}

impl LocalStorage {
    pub fn new(root: impl Into<PathBuf>) -> Self {
        Self { root: root.into() }
    }

    #[must_use]
    pub fn root(&self) -> &Path {
        &self.root
    }

    fn resolve(&self, path: &str) -> Result<PathBuf, StorageError> {
        let relative = Path::new(path);
        let is_plain = !path.is_empty()
            && relative
                .components()
                .all(|c| matches!(c, Component::Normal(_)));

        if is_plain {
            Ok(self.root.join(relative))
        } else {
            Err(StorageError::InvalidPath(path.to_string()))
        }
    }
}

fn io_error(path: &Path, source: std::io::Error) -> StorageError {
    StorageError::Io {
        path: path.display().to_string(),
        source,
    }
}

#[async_trait]
impl FileStorage for LocalStorage {
    async fn put(&self, path: &str, bytes: &[u8]) -> Result<(), StorageError> {
        let target = self.resolve(path)?;

        if let Some(parent) = target.parent() {
            fs::create_dir_all(parent)
                .await
                .map_err(|e| io_error(parent, e))?;
        }

        fs::write(&target, bytes)
            .await
            .map_err(|e| io_error(&target, e))?;

        debug!(path = %target.display(), size = bytes.len(), "Stored file");
        Ok(())
    }

    async fn delete(&self, path: &str) -> Result<(), StorageError> {
        let target = self.resolve(path)?;

        match fs::remove_file(&target).await {
            Ok(()) => {}
            Err(e) if e.kind() == std::io::ErrorKind::NotFound => {}
            Err(e) => return Err(io_error(&target, e)),
        }

        // Only succeeds when the directory is empty.
        if let Some(parent) = target.parent()
            && parent != self.root
        {
            let _ = fs::remove_dir(parent).await;
        }

        debug!(path = %target.display(), "Deleted file");
        Ok(())
    }

    async fn exists(&self, path: &str) -> bool {
        match self.resolve(path) {
            Ok(target) => fs::try_exists(target).await.unwrap_or(false),
            Err(_) => false,
        }
    }
}

#[cfg(test)]
mod tests {
    use super::*;

    fn temp_root() -> PathBuf {
        std::env::temp_dir().join(format!("atelier-storage-{}", uuid::Uuid::new_v4()))
    }

    #[tokio::test]
    async fn put_then_delete_removes_directory() {
        let root = temp_root();
        let storage = LocalStorage::new(&root);

        storage.put("7/photo.png", b"png").await.unwrap();
        assert!(storage.exists("7/photo.png").await);
        assert!(root.join("7").is_dir());

        storage.delete("7/photo.png").await.unwrap();
        assert!(!storage.exists("7/photo.png").await);
        assert!(!root.join("7").exists());

        storage.delete("7/photo.png").await.unwrap();
        let _ = std::fs::remove_dir_all(root);
    }

    #[tokio::test]
    async fn rejects_escaping_paths() {
        let storage = LocalStorage::new(temp_root());

        for path in ["../x.png", "/etc/passwd", "", "a/../../b"] {
            assert!(matches!(
                storage.put(path, b"x").await,
                Err(StorageError::InvalidPath(_))
            ));
        }
    }
}
