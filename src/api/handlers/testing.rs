//! In-memory `DiskClient` that records every call, for handler tests.

use crate::paths::{base_name, to_api_path};
use crate::storage::{DiskClient, StorageError};
use crate::types::RemoteFile;
use async_trait::async_trait;
use parking_lot::Mutex;
use std::collections::BTreeMap;
use std::path::Path;

#[derive(Default)]
pub struct RecordingDisk {
    files: Mutex<BTreeMap<String, RemoteFile>>,
    calls: Mutex<Vec<String>>,
    fail_list: bool,
    fail_delete: bool,
}

impl RecordingDisk {
    pub fn with_files(files: &[(&str, u64)]) -> Self {
        let disk = Self::default();
        for (path, size) in files {
            disk.insert(path, *size, false);
        }
        disk
    }

    pub fn with_dir(self, path: &str) -> Self {
        self.insert(path, 0, true);
        self
    }

    pub fn failing_list(mut self) -> Self {
        self.fail_list = true;
        self
    }

    pub fn failing_delete(mut self) -> Self {
        self.fail_delete = true;
        self
    }

    pub fn calls(&self) -> Vec<String> {
        self.calls.lock().clone()
    }

    pub fn contains(&self, path: &str) -> bool {
        self.files.lock().contains_key(path)
    }

    fn insert(&self, path: &str, size: u64, is_directory: bool) {
        self.files.lock().insert(
            path.to_string(),
            RemoteFile {
                name: base_name(path).to_string(),
                path: path.to_string(),
                size,
                is_directory,
                modified: None,
            },
        );
    }

    fn record(&self, call: String) {
        self.calls.lock().push(call);
    }
}

#[async_trait]
impl DiskClient for RecordingDisk {
    async fn total_space(&self) -> Result<u64, StorageError> {
        self.record("total_space".into());
        Ok(10 * 1024 * 1024 * 1024)
    }

    async fn list_resources(
        &self,
        limit: u32,
        offset: u32,
    ) -> Result<Vec<RemoteFile>, StorageError> {
        self.record(format!("list {} {}", limit, offset));
        if self.fail_list {
            return Err(StorageError::Other("API unreachable".into()));
        }
        Ok(self
            .files
            .lock()
            .values()
            .filter(|f| !f.path.contains('/'))
            .skip(offset as usize)
            .take(limit as usize)
            .cloned()
            .collect())
    }

    async fn resource(&self, path: &str) -> Result<RemoteFile, StorageError> {
        self.record(format!("resource {}", path));
        self.files
            .lock()
            .get(path)
            .cloned()
            .ok_or_else(|| StorageError::NotFound(path.to_string()))
    }

    async fn exists(&self, path: &str) -> Result<bool, StorageError> {
        self.record(format!("exists {}", path));
        Ok(self.contains(path))
    }

    async fn upload(&self, path: &str, local_file: &Path) -> Result<String, StorageError> {
        self.record(format!("upload {}", path));
        if self.contains(path) {
            return Err(StorageError::AlreadyExists(path.to_string()));
        }
        let size = std::fs::metadata(local_file)?.len();
        self.insert(path, size, false);
        Ok(to_api_path(path))
    }

    async fn delete(&self, path: &str) -> Result<(), StorageError> {
        self.record(format!("delete {}", path));
        if self.fail_delete {
            return Err(StorageError::Api {
                status: 423,
                message: "Resource is locked".into(),
            });
        }
        self.files
            .lock()
            .remove(path)
            .map(|_| ())
            .ok_or_else(|| StorageError::NotFound(path.to_string()))
    }

    async fn copy(&self, from: &str, to: &str) -> Result<(), StorageError> {
        self.record(format!("copy {} {}", from, to));
        let source = self
            .files
            .lock()
            .get(from)
            .cloned()
            .ok_or_else(|| StorageError::NotFound(from.to_string()))?;
        if self.contains(to) {
            return Err(StorageError::AlreadyExists(to.to_string()));
        }
        self.insert(to, source.size, source.is_directory);
        Ok(())
    }
}
