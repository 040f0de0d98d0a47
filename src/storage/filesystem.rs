//! Filesystem-backed disk for local development and tests
//!
//! Mirrors the remote disk contract over a plain directory:
//! ```text
//! {root}/
//!   a.txt        # resource "a.txt"
//!   notes/b.md   # resource "notes/b.md"
//! ```

use super::traits::{DiskClient, StorageError};
use crate::paths::to_api_path;
use crate::types::RemoteFile;
use async_trait::async_trait;
use chrono::{DateTime, Utc};
use std::path::{Component, Path, PathBuf};
use tokio::fs;
use tracing::{debug, instrument};

/// Async-safe path existence check (avoids blocking the Tokio runtime)
async fn path_exists(path: &Path) -> bool {
    fs::try_exists(path).await.unwrap_or(false)
}

/// Recursively copy a directory tree. Runs on a blocking thread.
fn copy_tree(from: &Path, to: &Path) -> std::io::Result<()> {
    std::fs::create_dir(to)?;
    for entry in std::fs::read_dir(from)? {
        let entry = entry?;
        let target = to.join(entry.file_name());
        if entry.file_type()?.is_dir() {
            copy_tree(&entry.path(), &target)?;
        } else {
            std::fs::copy(entry.path(), &target)?;
        }
    }
    Ok(())
}

/// Filesystem disk rooted at a directory
pub struct FilesystemDisk {
    root: PathBuf,
}

impl FilesystemDisk {
    /// Create the disk, creating the root directory if needed.
    pub async fn new(root: PathBuf) -> Result<Self, StorageError> {
        fs::create_dir_all(&root).await?;
        debug!("FilesystemDisk initialized at {:?}", root);
        Ok(Self { root })
    }

    /// Map a relative resource path onto the root, refusing anything that
    /// would land outside of it.
    fn resolve(&self, path: &str) -> Result<PathBuf, StorageError> {
        let rel = Path::new(path);
        if path.is_empty()
            || rel
                .components()
                .any(|c| !matches!(c, Component::Normal(_) | Component::CurDir))
        {
            return Err(StorageError::InvalidPath(path.to_string()));
        }
        Ok(self.root.join(rel))
    }

    async fn project(&self, full: &Path, rel: String) -> Result<RemoteFile, StorageError> {
        let meta = match fs::metadata(full).await {
            Ok(m) => m,
            Err(e) if e.kind() == std::io::ErrorKind::NotFound => {
                return Err(StorageError::NotFound(rel))
            }
            Err(e) => return Err(e.into()),
        };
        let name = full
            .file_name()
            .map(|n| n.to_string_lossy().into_owned())
            .unwrap_or_default();
        Ok(RemoteFile {
            name,
            path: rel,
            size: if meta.is_dir() { 0 } else { meta.len() },
            is_directory: meta.is_dir(),
            modified: meta.modified().ok().map(DateTime::<Utc>::from),
        })
    }
}

#[async_trait]
impl DiskClient for FilesystemDisk {
    /// Local directories have no quota; report an unbounded capacity.
    async fn total_space(&self) -> Result<u64, StorageError> {
        if !fs::metadata(&self.root).await?.is_dir() {
            return Err(StorageError::Other(format!(
                "{} is not a directory",
                self.root.display()
            )));
        }
        Ok(u64::MAX)
    }

    #[instrument(skip(self))]
    async fn list_resources(
        &self,
        limit: u32,
        offset: u32,
    ) -> Result<Vec<RemoteFile>, StorageError> {
        let mut names = Vec::new();
        let mut entries = fs::read_dir(&self.root).await?;
        while let Some(entry) = entries.next_entry().await? {
            names.push(entry.file_name().to_string_lossy().into_owned());
        }
        names.sort();

        let mut files = Vec::new();
        for name in names
            .into_iter()
            .skip(offset as usize)
            .take(limit as usize)
        {
            let full = self.root.join(&name);
            files.push(self.project(&full, name).await?);
        }
        Ok(files)
    }

    async fn resource(&self, path: &str) -> Result<RemoteFile, StorageError> {
        let full = self.resolve(path)?;
        self.project(&full, path.to_string()).await
    }

    async fn exists(&self, path: &str) -> Result<bool, StorageError> {
        Ok(path_exists(&self.resolve(path)?).await)
    }

    #[instrument(skip(self))]
    async fn upload(&self, path: &str, local_file: &Path) -> Result<String, StorageError> {
        let target = self.resolve(path)?;
        if path_exists(&target).await {
            return Err(StorageError::AlreadyExists(path.to_string()));
        }
        if let Some(parent) = target.parent() {
            fs::create_dir_all(parent).await?;
        }
        let written = fs::copy(local_file, &target).await?;
        debug!("Stored {} bytes at {:?}", written, target);
        Ok(to_api_path(path))
    }

    #[instrument(skip(self))]
    async fn delete(&self, path: &str) -> Result<(), StorageError> {
        let target = self.resolve(path)?;
        let meta = match fs::metadata(&target).await {
            Ok(m) => m,
            Err(e) if e.kind() == std::io::ErrorKind::NotFound => {
                return Err(StorageError::NotFound(path.to_string()))
            }
            Err(e) => return Err(e.into()),
        };
        if meta.is_dir() {
            fs::remove_dir_all(&target).await?;
        } else {
            fs::remove_file(&target).await?;
        }
        Ok(())
    }

    #[instrument(skip(self))]
    async fn copy(&self, from: &str, to: &str) -> Result<(), StorageError> {
        let source = self.resolve(from)?;
        let target = self.resolve(to)?;
        if !path_exists(&source).await {
            return Err(StorageError::NotFound(from.to_string()));
        }
        if path_exists(&target).await {
            return Err(StorageError::AlreadyExists(to.to_string()));
        }

        if fs::metadata(&source).await?.is_dir() {
            tokio::task::spawn_blocking(move || copy_tree(&source, &target))
                .await
                .map_err(|e| StorageError::Other(format!("spawn_blocking join failed: {}", e)))??;
        } else {
            fs::copy(&source, &target).await?;
        }
        Ok(())
    }
}

#[cfg(test)]
mod tests {
    use super::*;
    use tempfile::TempDir;

    async fn disk() -> (TempDir, FilesystemDisk) {
        let dir = TempDir::new().unwrap();
        let disk = FilesystemDisk::new(dir.path().to_path_buf()).await.unwrap();
        (dir, disk)
    }

    async fn local_file(dir: &TempDir, name: &str, data: &[u8]) -> PathBuf {
        let path = dir.path().join(name);
        fs::write(&path, data).await.unwrap();
        path
    }

    #[tokio::test]
    async fn test_upload_list_and_resource() {
        let (_root, disk) = disk().await;
        let scratch = TempDir::new().unwrap();
        let src = local_file(&scratch, "upload.bin", b"0123456789").await;

        let remote = disk.upload("a.txt", &src).await.unwrap();
        assert_eq!(remote, "disk:/a.txt");

        let listed = disk.list_resources(100, 0).await.unwrap();
        assert_eq!(listed.len(), 1);
        assert_eq!(listed[0].name, "a.txt");
        assert_eq!(listed[0].size, 10);
        assert!(!listed[0].is_directory);

        let res = disk.resource("a.txt").await.unwrap();
        assert_eq!(res.path, "a.txt");
    }

    #[tokio::test]
    async fn test_upload_refuses_overwrite() {
        let (_root, disk) = disk().await;
        let scratch = TempDir::new().unwrap();
        let src = local_file(&scratch, "f", b"x").await;

        disk.upload("a.txt", &src).await.unwrap();
        let err = disk.upload("a.txt", &src).await.unwrap_err();
        assert!(matches!(err, StorageError::AlreadyExists(_)));
    }

    #[tokio::test]
    async fn test_copy_and_delete() {
        let (_root, disk) = disk().await;
        let scratch = TempDir::new().unwrap();
        let src = local_file(&scratch, "f", b"hello").await;
        disk.upload("notes/a.txt", &src).await.unwrap();

        disk.copy("notes/a.txt", "notes/b.txt").await.unwrap();
        assert!(disk.exists("notes/b.txt").await.unwrap());

        disk.delete("notes/a.txt").await.unwrap();
        assert!(!disk.exists("notes/a.txt").await.unwrap());
        assert!(matches!(
            disk.delete("notes/a.txt").await,
            Err(StorageError::NotFound(_))
        ));
    }

    #[tokio::test]
    async fn test_copy_directory_tree() {
        let (_root, disk) = disk().await;
        let scratch = TempDir::new().unwrap();
        let src = local_file(&scratch, "f", b"hello").await;
        disk.upload("sub/inner/x.txt", &src).await.unwrap();

        disk.copy("sub", "sub2").await.unwrap();
        assert!(disk.exists("sub2/inner/x.txt").await.unwrap());

        let listed = disk.list_resources(100, 0).await.unwrap();
        let kinds: Vec<_> = listed.iter().map(|f| (f.name.as_str(), f.kind())).collect();
        assert_eq!(kinds, vec![("sub", "directory"), ("sub2", "directory")]);
    }

    #[tokio::test]
    async fn test_rejects_escaping_paths() {
        let (_root, disk) = disk().await;
        assert!(matches!(
            disk.exists("../outside.txt").await,
            Err(StorageError::InvalidPath(_))
        ));
        assert!(matches!(
            disk.resource("/etc/passwd").await,
            Err(StorageError::InvalidPath(_))
        ));
    }

    #[tokio::test]
    async fn test_list_respects_limit_and_offset() {
        let (_root, disk) = disk().await;
        let scratch = TempDir::new().unwrap();
        let src = local_file(&scratch, "f", b"x").await;
        for name in ["a.txt", "b.txt", "c.txt"] {
            disk.upload(name, &src).await.unwrap();
        }

        let page = disk.list_resources(1, 1).await.unwrap();
        assert_eq!(page.len(), 1);
        assert_eq!(page[0].name, "b.txt");
    }
}
