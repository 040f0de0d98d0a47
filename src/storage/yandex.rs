//! Yandex Disk storage client using the REST API
//!
//! API base: `https://cloud-api.yandex.net/v1/disk`. Authentication is a
//! pre-issued OAuth token sent as `Authorization: OAuth <token>`.
//!
//! Copy and delete may answer `202 Accepted` with a link to an asynchronous
//! operation; those are polled to completion so callers see a finished state.

use super::traits::{DiskClient, StorageError};
use crate::paths::{from_api_path, to_api_path};
use crate::types::RemoteFile;
use async_trait::async_trait;
use chrono::{DateTime, Utc};
use reqwest::header::{HeaderMap, HeaderValue, AUTHORIZATION, CONTENT_LENGTH, CONTENT_TYPE};
use reqwest::{Client, Response, StatusCode};
use serde::Deserialize;
use std::path::Path;
use std::time::Duration;
use tokio_util::io::ReaderStream;
use tracing::{debug, instrument, warn};

/// Interval between polls of an asynchronous operation.
const OPERATION_POLL_INTERVAL: Duration = Duration::from_millis(500);

/// Give up waiting on an asynchronous operation after this many polls.
const OPERATION_MAX_POLLS: u32 = 120;

// API response bodies

#[derive(Debug, Deserialize)]
struct DiskInfo {
    total_space: u64,
}

#[derive(Debug, Deserialize)]
struct ApiResource {
    name: String,
    path: String,
    #[serde(rename = "type")]
    resource_type: String,
    #[serde(default)]
    size: Option<u64>,
    #[serde(default)]
    modified: Option<DateTime<Utc>>,
    #[serde(rename = "_embedded", default)]
    embedded: Option<ResourceList>,
}

#[derive(Debug, Deserialize)]
struct ResourceList {
    #[serde(default)]
    items: Vec<ApiResource>,
}

#[derive(Debug, Deserialize)]
struct Link {
    href: String,
}

#[derive(Debug, Deserialize)]
struct OperationStatus {
    status: String,
}

#[derive(Debug, Deserialize)]
struct ApiErrorBody {
    #[serde(default)]
    message: Option<String>,
    #[serde(default)]
    description: Option<String>,
    #[serde(default)]
    error: Option<String>,
}

impl From<ApiResource> for RemoteFile {
    fn from(res: ApiResource) -> Self {
        let is_directory = res.resource_type == "dir";
        RemoteFile {
            name: res.name,
            path: from_api_path(&res.path),
            size: if is_directory { 0 } else { res.size.unwrap_or(0) },
            is_directory,
            modified: res.modified,
        }
    }
}

/// Yandex Disk account client
pub struct YandexDisk {
    client: Client,
    api_base: String,
    overwrite_uploads: bool,
}

impl YandexDisk {
    /// Build a client for the given OAuth token.
    pub fn new(
        token: &str,
        api_base: &str,
        overwrite_uploads: bool,
        timeout: Duration,
        connect_timeout: Duration,
    ) -> Result<Self, StorageError> {
        let mut auth = HeaderValue::from_str(&format!("OAuth {}", token))
            .map_err(|_| StorageError::Other("OAuth token contains invalid characters".into()))?;
        auth.set_sensitive(true);

        let mut headers = HeaderMap::new();
        headers.insert(AUTHORIZATION, auth);
        headers.insert("Accept", HeaderValue::from_static("application/json"));

        let client = Client::builder()
            .default_headers(headers)
            .timeout(timeout)
            .connect_timeout(connect_timeout)
            .build()?;

        Ok(Self {
            client,
            api_base: api_base.trim_end_matches('/').to_string(),
            overwrite_uploads,
        })
    }

    fn url(&self, endpoint: &str) -> String {
        format!("{}{}", self.api_base, endpoint)
    }

    /// Turn a non-success response into a `StorageError`, using the API's
    /// error body when there is one.
    async fn check(resp: Response, path: &str) -> Result<Response, StorageError> {
        let status = resp.status();
        if status.is_success() {
            return Ok(resp);
        }

        let body = resp.text().await.unwrap_or_default();
        let parsed: Option<ApiErrorBody> = serde_json::from_str(&body).ok();
        debug!("Yandex Disk API error {}: {}", status, body);

        match status {
            StatusCode::NOT_FOUND => Err(StorageError::NotFound(path.to_string())),
            StatusCode::CONFLICT => Err(StorageError::AlreadyExists(path.to_string())),
            _ => {
                let message = parsed
                    .and_then(|b| b.description.or(b.message).or(b.error))
                    .unwrap_or_else(|| format!("HTTP {}", status.as_u16()));
                Err(StorageError::Api {
                    status: status.as_u16(),
                    message,
                })
            }
        }
    }

    /// Wait for an asynchronous operation started by copy/delete.
    async fn wait_operation(&self, href: &str) -> Result<(), StorageError> {
        for _ in 0..OPERATION_MAX_POLLS {
            let resp = self.client.get(href).send().await?;
            let op: OperationStatus = Self::check(resp, href).await?.json().await?;
            match op.status.as_str() {
                "success" => return Ok(()),
                "failed" => {
                    return Err(StorageError::Other(
                        "Asynchronous operation failed on the storage side".into(),
                    ))
                }
                _ => tokio::time::sleep(OPERATION_POLL_INTERVAL).await,
            }
        }
        warn!("Gave up waiting for operation {}", href);
        Err(StorageError::Other(
            "Timed out waiting for the storage operation to finish".into(),
        ))
    }

    /// Handle `201`/`204` (done) versus `202` (poll the returned operation link).
    async fn finish(&self, resp: Response) -> Result<(), StorageError> {
        if resp.status() == StatusCode::ACCEPTED {
            let link: Link = resp.json().await?;
            self.wait_operation(&link.href).await?;
        }
        Ok(())
    }
}

#[async_trait]
impl DiskClient for YandexDisk {
    #[instrument(skip(self))]
    async fn total_space(&self) -> Result<u64, StorageError> {
        let resp = self.client.get(self.url("/")).send().await?;
        let info: DiskInfo = Self::check(resp, "/").await?.json().await?;
        Ok(info.total_space)
    }

    #[instrument(skip(self))]
    async fn list_resources(
        &self,
        limit: u32,
        offset: u32,
    ) -> Result<Vec<RemoteFile>, StorageError> {
        let resp = self
            .client
            .get(self.url("/resources"))
            .query(&[
                ("path", "disk:/".to_string()),
                ("limit", limit.to_string()),
                ("offset", offset.to_string()),
            ])
            .send()
            .await?;
        let root: ApiResource = Self::check(resp, "disk:/").await?.json().await?;
        let items = root.embedded.map(|e| e.items).unwrap_or_default();
        debug!("Listed {} resources", items.len());
        Ok(items.into_iter().map(RemoteFile::from).collect())
    }

    #[instrument(skip(self))]
    async fn resource(&self, path: &str) -> Result<RemoteFile, StorageError> {
        let resp = self
            .client
            .get(self.url("/resources"))
            .query(&[("path", to_api_path(path)), ("limit", "0".to_string())])
            .send()
            .await?;
        let res: ApiResource = Self::check(resp, path).await?.json().await?;
        Ok(res.into())
    }

    async fn exists(&self, path: &str) -> Result<bool, StorageError> {
        match self.resource(path).await {
            Ok(_) => Ok(true),
            Err(StorageError::NotFound(_)) => Ok(false),
            Err(e) => Err(e),
        }
    }

    #[instrument(skip(self))]
    async fn upload(&self, path: &str, local_file: &Path) -> Result<String, StorageError> {
        let api_path = to_api_path(path);

        let resp = self
            .client
            .get(self.url("/resources/upload"))
            .query(&[
                ("path", api_path.clone()),
                ("overwrite", self.overwrite_uploads.to_string()),
            ])
            .send()
            .await?;
        let link: Link = Self::check(resp, path).await?.json().await?;

        let file = tokio::fs::File::open(local_file).await?;
        let len = file.metadata().await?.len();
        let mime = mime_guess::from_path(path).first_or_octet_stream();
        debug!("Uploading {} bytes to {}", len, api_path);

        let resp = self
            .client
            .put(&link.href)
            .header(CONTENT_LENGTH, len)
            .header(CONTENT_TYPE, mime.as_ref())
            .body(reqwest::Body::wrap_stream(ReaderStream::new(file)))
            .send()
            .await?;
        Self::check(resp, path).await?;

        Ok(api_path)
    }

    #[instrument(skip(self))]
    async fn delete(&self, path: &str) -> Result<(), StorageError> {
        let resp = self
            .client
            .delete(self.url("/resources"))
            .query(&[("path", to_api_path(path))])
            .send()
            .await?;
        let resp = Self::check(resp, path).await?;
        self.finish(resp).await
    }

    #[instrument(skip(self))]
    async fn copy(&self, from: &str, to: &str) -> Result<(), StorageError> {
        let resp = self
            .client
            .post(self.url("/resources/copy"))
            .query(&[
                ("from", to_api_path(from)),
                ("path", to_api_path(to)),
                ("overwrite", "false".to_string()),
            ])
            .send()
            .await?;
        let resp = Self::check(resp, to).await?;
        self.finish(resp).await
    }
}
