//! Rename handlers.
//!
//! The storage API has no rename primitive, so a rename is a copy to the new
//! path followed by a delete of the original. The pair is not atomic: when the
//! delete fails after a successful copy both paths exist, and that case is
//! reported as [`ActionError::PartialRename`].

use super::{finish_action, redirect_to_files, ActionError, AppState};
use crate::api::extractors::Flash;
use crate::api::views;
use crate::paths::{base_name, extension, has_separator, normalize, sibling_path};
use crate::storage::DiskClient;
use axum::extract::{Form, Query, State};
use axum::response::{Html, IntoResponse, Response};
use serde::Deserialize;
use std::sync::Arc;
use tracing::{debug, instrument, warn};

/// Query for GET /files/rename
#[derive(Debug, Deserialize, Default)]
pub struct RenameQuery {
    #[serde(default)]
    pub path: String,
}

/// Form body for POST /files/rename
#[derive(Debug, Deserialize, Default)]
pub struct RenameForm {
    #[serde(default)]
    pub current_path: String,
    #[serde(default)]
    pub new_name: String,
}

/// Destination of renaming `current` to `new_name` within its directory.
///
/// Fails when the extension would change.
pub fn rename_target(current: &str, new_name: &str) -> Result<String, ActionError> {
    if extension(current) != extension(new_name) {
        return Err(ActionError::ExtensionChanged);
    }
    Ok(sibling_path(current, new_name))
}

/// Rename the resource at a raw user-supplied path to `raw_new_name`.
pub async fn rename_file(
    disk: &dyn DiskClient,
    raw_current: &str,
    raw_new_name: &str,
) -> Result<String, ActionError> {
    let new_name = raw_new_name.trim();
    if raw_current.is_empty() || new_name.is_empty() {
        return Err(ActionError::MissingRenameFields);
    }

    let current = normalize(raw_current);
    move_within_dir(disk, &current, new_name)
        .await
        .map_err(|e| e.during("Error"))?;
    Ok("File renamed successfully".to_string())
}

async fn move_within_dir(
    disk: &dyn DiskClient,
    current: &str,
    new_name: &str,
) -> Result<(), ActionError> {
    if has_separator(new_name) {
        return Err(ActionError::InvalidName);
    }
    if !disk.exists(current).await? {
        return Err(ActionError::NotFound(current.to_string()));
    }

    let target = rename_target(current, new_name)?;
    debug!("Renaming {} -> {}", current, target);

    disk.copy(current, &target).await?;
    if let Err(source) = disk.delete(current).await {
        warn!("Copied {} to {} but could not delete the original", current, target);
        return Err(ActionError::PartialRename {
            from: current.to_string(),
            to: target,
            source,
        });
    }
    Ok(())
}

/// Rename form handler
/// GET /files/rename?path=...
#[instrument(skip_all)]
pub async fn rename_form_handler(flash: Flash, query: Option<Query<RenameQuery>>) -> Response {
    let query = query.map(|Query(q)| q).unwrap_or_default();
    if query.path.is_empty() {
        flash.error(ActionError::MissingPath.to_string());
        return redirect_to_files(flash);
    }

    let path = normalize(&query.path);
    let messages = flash.drain();
    let html = views::rename_form(&path, base_name(&path), &messages);
    (flash, Html(html)).into_response()
}

/// Rename submit handler
/// POST /files/rename (form fields `current_path`, `new_name`)
#[instrument(skip_all)]
pub async fn rename_handler(
    State(state): State<Arc<AppState>>,
    flash: Flash,
    form: Option<Form<RenameForm>>,
) -> Response {
    let form = form.map(|Form(f)| f).unwrap_or_default();
    let outcome = rename_file(state.disk.as_ref(), &form.current_path, &form.new_name).await;
    finish_action(flash, "Rename", outcome)
}
