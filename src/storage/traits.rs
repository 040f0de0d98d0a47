//! Storage client trait definitions

use crate::types::RemoteFile;
use async_trait::async_trait;
use std::path::Path;
use thiserror::Error;

/// Errors that can occur talking to remote storage
#[derive(Debug, Error)]
pub enum StorageError {
    #[error("Resource not found: {0}")]
    NotFound(String),

    #[error("Resource already exists: {0}")]
    AlreadyExists(String),

    #[error("Invalid path: {0}")]
    InvalidPath(String),

    #[error("IO error: {0}")]
    Io(#[from] std::io::Error),

    #[error("HTTP error: {0}")]
    Http(#[from] reqwest::Error),

    /// Error reported by the storage API itself
    #[error("{message}")]
    Api { status: u16, message: String },

    #[error("Storage error: {0}")]
    Other(String),
}

/// Capability set of a remote disk account.
///
/// Paths passed in are canonical relative paths (see [`crate::paths::normalize`]).
/// Handlers hold it as `Box<dyn DiskClient>` and call through `as_ref()`.
#[async_trait]
pub trait DiskClient: Send + Sync {
    /// Total capacity of the account in bytes
    async fn total_space(&self) -> Result<u64, StorageError>;

    /// List top-level resources
    async fn list_resources(
        &self,
        limit: u32,
        offset: u32,
    ) -> Result<Vec<RemoteFile>, StorageError>;

    /// Metadata of one resource
    async fn resource(&self, path: &str) -> Result<RemoteFile, StorageError>;

    /// Check if a resource exists
    async fn exists(&self, path: &str) -> Result<bool, StorageError>;

    /// Upload a local file to `path`, returning the resulting remote path
    async fn upload(&self, path: &str, local_file: &Path) -> Result<String, StorageError>;

    /// Delete a resource
    async fn delete(&self, path: &str) -> Result<(), StorageError>;

    /// Copy a resource to a new path
    async fn copy(&self, from: &str, to: &str) -> Result<(), StorageError>;
}
