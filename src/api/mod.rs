//! HTTP surface of the file browser

mod errors;
mod extractors;
pub mod handlers;
mod views;

pub use errors::ActionError;
pub use extractors::Flash;

use axum::extract::DefaultBodyLimit;
use axum::routing::{get, post};
use axum::Router;
use handlers::{
    delete_handler, health_check, index_handler, list_handler, rename_form_handler,
    rename_handler, upload_handler, AppState,
};
use std::sync::Arc;
use tower_http::trace::TraceLayer;

/// Build the application router.
///
/// Routes:
///   GET  /              - connectivity status page
///   GET  /health        - JSON health check
///   GET  /files         - file list
///   POST /files/upload  - upload one file (multipart field `file`)
///   POST /files/delete  - delete (form field `path`)
///   GET  /files/rename  - rename form (query `path`)
///   POST /files/rename  - rename (`current_path`, `new_name`)
pub fn router(state: Arc<AppState>, max_upload_size: u64) -> Router {
    Router::new()
        .route("/", get(index_handler))
        .route("/health", get(health_check))
        .route("/files", get(list_handler))
        .route("/files/upload", post(upload_handler))
        .route("/files/delete", post(delete_handler))
        .route(
            "/files/rename",
            get(rename_form_handler).post(rename_handler),
        )
        .layer(TraceLayer::new_for_http())
        // Default 2MB limit is too small for uploads
        .layer(DefaultBodyLimit::max(max_upload_size as usize))
        .with_state(state)
}
