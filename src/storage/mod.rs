//! Remote storage abstraction

mod filesystem;
mod traits;
mod yandex;

pub use filesystem::FilesystemDisk;
pub use traits::{DiskClient, StorageError};
pub use yandex::YandexDisk;

use crate::config::{BackendConfig, Config};
use std::time::Duration;

/// Build the configured storage client.
pub async fn from_config(config: &Config) -> Result<Box<dyn DiskClient>, StorageError> {
    match &config.backend {
        BackendConfig::Yandex {
            token,
            api_base,
            overwrite_uploads,
        } => {
            let disk = YandexDisk::new(
                token,
                api_base,
                *overwrite_uploads,
                Duration::from_secs(config.request_timeout_secs),
                Duration::from_secs(config.connect_timeout_secs),
            )?;
            Ok(Box::new(disk))
        }
        BackendConfig::Filesystem { path } => {
            Ok(Box::new(FilesystemDisk::new(path.clone()).await?))
        }
    }
}
