//! File browser request handlers
//!
//! Split into submodules by domain:
//! - `files`: listing, upload, delete
//! - `rename`: rename form and rename submit (copy + delete)
//! - `status`: connectivity page and health check

mod files;
mod rename;
mod status;

#[cfg(test)]
mod testing;

use super::errors::ActionError;
use super::extractors::Flash;
use crate::session::SessionStore;
use crate::storage::DiskClient;
use axum::http::{header, StatusCode};
use axum::response::{IntoResponse, Response};
use std::sync::Arc;
use tracing::{info, warn};

pub use files::{
    delete_file, delete_handler, list_files, list_handler, store_upload, upload_handler,
    DeleteForm, LIST_LIMIT,
};
pub use rename::{
    rename_file, rename_form_handler, rename_handler, rename_target, RenameForm, RenameQuery,
};
pub use status::{health_check, index_handler, HealthResponse};

/// Application state shared across handlers
pub struct AppState {
    pub disk: Box<dyn DiskClient>,
    pub sessions: Arc<SessionStore>,
}

/// Route every mutating handler returns to.
pub const FILES_ROUTE: &str = "/files";

/// `302 Found` back to the file list, carrying the session cookie if new.
fn redirect_to_files(flash: Flash) -> Response {
    (
        StatusCode::FOUND,
        flash,
        [(header::LOCATION, FILES_ROUTE)],
    )
        .into_response()
}

/// Record the outcome of a mutating operation and redirect to the file list.
fn finish_action(flash: Flash, action: &str, outcome: Result<String, ActionError>) -> Response {
    match outcome {
        Ok(message) => {
            info!("{} succeeded: {}", action, message);
            flash.success(message);
        }
        Err(e) => {
            warn!("{} failed: {}", action, e);
            flash.error(e.to_string());
        }
    }
    redirect_to_files(flash)
}
