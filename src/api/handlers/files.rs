//! Listing, upload, and delete handlers.

use super::{finish_action, ActionError, AppState};
use crate::api::extractors::Flash;
use crate::api::views;
use crate::paths::{base_name, normalize};
use crate::storage::DiskClient;
use crate::types::{FlashMessage, RemoteFile};
use axum::extract::multipart::{Multipart, MultipartRejection};
use axum::extract::{Form, State};
use axum::http::StatusCode;
use axum::response::{Html, IntoResponse, Response};
use serde::Deserialize;
use std::path::Path;
use std::sync::Arc;
use tempfile::NamedTempFile;
use tokio::io::AsyncWriteExt;
use tracing::{debug, instrument, warn};

/// Maximum number of entries fetched for the file list.
pub const LIST_LIMIT: u32 = 100;

/// Multipart field carrying the uploaded file.
const UPLOAD_FIELD: &str = "file";

/// Fetch the top-level entries shown in the file list.
pub async fn list_files(disk: &dyn DiskClient) -> Result<Vec<RemoteFile>, ActionError> {
    Ok(disk.list_resources(LIST_LIMIT, 0).await?)
}

/// File list handler
/// GET /files
///
/// A storage failure is rendered inline rather than redirecting back here,
/// which would loop for as long as the API stays unreachable.
#[instrument(skip_all)]
pub async fn list_handler(State(state): State<Arc<AppState>>, flash: Flash) -> Response {
    let mut messages = flash.drain();
    match list_files(state.disk.as_ref()).await {
        Ok(files) => {
            debug!("Rendering {} entries", files.len());
            (flash, Html(views::file_list(&files, &messages))).into_response()
        }
        Err(e) => {
            warn!("Listing failed: {}", e);
            messages.push(FlashMessage::error(format!("Error: {}", e)));
            (
                StatusCode::BAD_GATEWAY,
                flash,
                Html(views::file_list(&[], &messages)),
            )
                .into_response()
        }
    }
}

/// An uploaded file spooled to local disk.
pub struct SpooledUpload {
    pub client_name: String,
    pub file: NamedTempFile,
}

/// Read the `file` field of the multipart body into a temporary file.
async fn spool_upload(mut multipart: Multipart) -> Result<SpooledUpload, ActionError> {
    loop {
        let field = match multipart.next_field().await {
            Ok(Some(field)) => field,
            Ok(None) => return Err(ActionError::NotUploaded),
            Err(e) => {
                warn!("Multipart read failed: {}", e);
                return Err(ActionError::UploadFailed);
            }
        };

        if field.name() != Some(UPLOAD_FIELD) {
            continue;
        }

        let client_name = match field.file_name() {
            Some(name) if !name.is_empty() => name.to_string(),
            _ => return Err(ActionError::NotUploaded),
        };

        let spool = |e: std::io::Error| {
            warn!("Spooling upload failed: {}", e);
            ActionError::UploadFailed
        };
        let file = NamedTempFile::new().map_err(spool)?;
        let mut out = tokio::fs::File::create(file.path()).await.map_err(spool)?;

        let mut field = field;
        loop {
            match field.chunk().await {
                Ok(Some(chunk)) => out.write_all(&chunk).await.map_err(spool)?,
                Ok(None) => break,
                Err(e) => {
                    warn!("Upload interrupted: {}", e);
                    return Err(ActionError::UploadFailed);
                }
            }
        }
        out.flush().await.map_err(spool)?;

        return Ok(SpooledUpload { client_name, file });
    }
}

/// Store a spooled upload under the base name of the client-supplied filename.
///
/// Directory components are dropped, so `../../evil.txt` lands at `evil.txt`.
pub async fn store_upload(
    disk: &dyn DiskClient,
    client_name: &str,
    local_file: &Path,
) -> Result<String, ActionError> {
    let name = base_name(client_name);
    if name.is_empty() || name == "." || name == ".." {
        return Err(ActionError::NotUploaded);
    }

    let remote = disk
        .upload(name, local_file)
        .await
        .map_err(|e| ActionError::from(e).during("Upload error"))?;
    Ok(format!("File uploaded successfully: {}", remote))
}

/// Upload handler
/// POST /files/upload (multipart field `file`)
#[instrument(skip_all)]
pub async fn upload_handler(
    State(state): State<Arc<AppState>>,
    flash: Flash,
    multipart: Result<Multipart, MultipartRejection>,
) -> Response {
    let outcome = match multipart {
        Ok(multipart) => match spool_upload(multipart).await {
            Ok(upload) => {
                store_upload(state.disk.as_ref(), &upload.client_name, upload.file.path()).await
            }
            Err(e) => Err(e),
        },
        Err(e) => {
            debug!("Upload without a multipart body: {}", e);
            Err(ActionError::NotUploaded)
        }
    };
    finish_action(flash, "Upload", outcome)
}

/// Form body for POST /files/delete
#[derive(Debug, Deserialize, Default)]
pub struct DeleteForm {
    #[serde(default)]
    pub path: String,
}

/// Delete the resource a raw user-supplied path points at.
pub async fn delete_file(disk: &dyn DiskClient, raw_path: &str) -> Result<String, ActionError> {
    if raw_path.is_empty() {
        return Err(ActionError::MissingPath);
    }

    let path = normalize(raw_path);
    remove_existing(disk, &path)
        .await
        .map_err(|e| e.during("Delete error"))?;
    Ok("File deleted successfully".to_string())
}

async fn remove_existing(disk: &dyn DiskClient, path: &str) -> Result<(), ActionError> {
    if !disk.exists(path).await? {
        return Err(ActionError::NotFound(path.to_string()));
    }
    disk.delete(path).await?;
    Ok(())
}

/// Delete handler
/// POST /files/delete (form field `path`)
#[instrument(skip_all)]
pub async fn delete_handler(
    State(state): State<Arc<AppState>>,
    flash: Flash,
    form: Option<Form<DeleteForm>>,
) -> Response {
    let form = form.map(|Form(f)| f).unwrap_or_default();
    let outcome = delete_file(state.disk.as_ref(), &form.path).await;
    finish_action(flash, "Delete", outcome)
}
