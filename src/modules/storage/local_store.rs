//! Local-disk image store
//!
//! Images are written into a managed directory and served by the HTTP layer
//! under a public path prefix (e.g. `/uploads/1700000000000-1a2b3c4d-phone.png`).

use async_trait::async_trait;
use std::io::ErrorKind;
use std::path::PathBuf;
use tracing::{debug, info};

use crate::core::config::LocalStorageConfig;
use crate::core::error::{AppError, Result};
use crate::modules::storage::{is_absolute_url, unique_file_name, AssetStore};

pub struct LocalDiskStore {
    root: PathBuf,
    public_path: String,
    base_url: String,
}

impl LocalDiskStore {
    pub fn new(root: impl Into<PathBuf>, public_path: &str, base_url: &str) -> Self {
        Self {
            root: root.into(),
            public_path: format!("/{}", public_path.trim_matches('/')),
            base_url: base_url.trim_end_matches('/').to_string(),
        }
    }

    /// Build the store from config and make sure the upload directory exists
    pub async fn from_config(config: &LocalStorageConfig, base_url: &str) -> Result<Self> {
        let store = Self::new(config.upload_dir.clone(), &config.public_path, base_url);
        store.ensure_dir().await?;

        info!(
            "Local image store ready: dir={}, public_path={}",
            store.root.display(),
            store.public_path
        );
        Ok(store)
    }

    async fn ensure_dir(&self) -> Result<()> {
        tokio::fs::create_dir_all(&self.root).await.map_err(|e| {
            AppError::Storage(format!(
                "Failed to create upload directory '{}': {}",
                self.root.display(),
                e
            ))
        })
    }

    /// Map an asset path like `/uploads/name.png` back to a file in the upload directory
    fn file_path_for(&self, asset_path: &str) -> Result<PathBuf> {
        let prefix = format!("{}/", self.public_path);
        let file_name = asset_path
            .strip_prefix(&prefix)
            .or_else(|| asset_path.strip_prefix(&prefix[1..]))
            .ok_or_else(|| {
                AppError::Storage(format!(
                    "Asset path '{}' is outside '{}'",
                    asset_path, self.public_path
                ))
            })?;

        if file_name.is_empty()
            || file_name.contains('/')
            || file_name.contains('\\')
            || file_name.starts_with('.')
        {
            return Err(AppError::Storage(format!(
                "Invalid asset file name '{}'",
                file_name
            )));
        }

        Ok(self.root.join(file_name))
    }
}

#[async_trait]
impl AssetStore for LocalDiskStore {
    async fn store(&self, data: Vec<u8>, original_name: &str) -> Result<String> {
        let file_name = unique_file_name(original_name);
        let target = self.root.join(&file_name);

        tokio::fs::write(&target, &data).await.map_err(|e| {
            AppError::Storage(format!(
                "Failed to write image '{}': {}",
                target.display(),
                e
            ))
        })?;

        debug!("Stored image '{}' ({} bytes)", target.display(), data.len());
        Ok(format!("{}/{}", self.public_path, file_name))
    }

    async fn delete(&self, asset_path: &str) -> Result<()> {
        let target = self.file_path_for(asset_path)?;

        match tokio::fs::remove_file(&target).await {
            Ok(()) => {
                debug!("Deleted image '{}'", target.display());
                Ok(())
            }
            Err(e) if e.kind() == ErrorKind::NotFound => {
                debug!("Image '{}' already absent", target.display());
                Ok(())
            }
            Err(e) => Err(AppError::Storage(format!(
                "Failed to delete image '{}': {}",
                target.display(),
                e
            ))),
        }
    }

    fn resolve_url(&self, asset_path: &str) -> String {
        if is_absolute_url(asset_path) {
            return asset_path.to_string();
        }

        if asset_path.starts_with('/') {
            format!("{}{}", self.base_url, asset_path)
        } else {
            format!("{}/{}", self.base_url, asset_path)
        }
    }

    fn backend_name(&self) -> &'static str {
        "local"
    }
}

#[cfg(test)]
mod tests {
    use super::*;
    use tempfile::TempDir;

    fn store_in(dir: &TempDir) -> LocalDiskStore {
        LocalDiskStore::new(dir.path(), "/uploads", "http://localhost:5000/")
    }

    #[tokio::test]
    async fn test_store_writes_file_under_public_path() {
        let dir = TempDir::new().unwrap();
        let store = store_in(&dir);

        let path = store
            .store(b"png-bytes".to_vec(), "phone x.png")
            .await
            .unwrap();

        assert!(path.starts_with("/uploads/"));
        assert!(path.ends_with("-phone_x.png"));

        let file_name = path.trim_start_matches("/uploads/");
        let written = std::fs::read(dir.path().join(file_name)).unwrap();
        assert_eq!(written, b"png-bytes");
    }

    #[tokio::test]
    async fn test_delete_removes_file_and_tolerates_missing() {
        let dir = TempDir::new().unwrap();
        let store = store_in(&dir);

        let path = store.store(b"x".to_vec(), "a.jpg").await.unwrap();
        let file = dir.path().join(path.trim_start_matches("/uploads/"));
        assert!(file.exists());

        store.delete(&path).await.unwrap();
        assert!(!file.exists());

        // Second delete is a no-op
        store.delete(&path).await.unwrap();
    }

    #[tokio::test]
    async fn test_delete_rejects_paths_outside_upload_dir() {
        let dir = TempDir::new().unwrap();
        let store = store_in(&dir);

        assert!(store.delete("/etc/passwd").await.is_err());
        assert!(store.delete("/uploads/../secret.png").await.is_err());
        assert!(store.delete("/uploads/").await.is_err());
    }

    #[test]
    fn test_resolve_url() {
        let dir = TempDir::new().unwrap();
        let store = store_in(&dir);

        assert_eq!(
            store.resolve_url("/uploads/1-a-b.png"),
            "http://localhost:5000/uploads/1-a-b.png"
        );
        assert_eq!(
            store.resolve_url("uploads/1-a-b.png"),
            "http://localhost:5000/uploads/1-a-b.png"
        );
        assert_eq!(
            store.resolve_url("https://cdn.example.com/p.png"),
            "https://cdn.example.com/p.png"
        );
    }
}
