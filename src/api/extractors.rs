//! Custom Axum extractors
//!
//! [`Flash`] binds a request to its browser session and exposes that
//! session's one-shot message queue.

use super::handlers::AppState;
use crate::session::{SessionStore, SESSION_COOKIE};
use crate::types::{FlashCategory, FlashMessage};
use axum::{
    async_trait,
    extract::{FromRef, FromRequestParts},
    http::{header, request::Parts, HeaderMap, HeaderValue},
    response::{IntoResponseParts, ResponseParts},
};
use std::convert::Infallible;
use std::sync::atomic::{AtomicBool, Ordering};
use std::sync::Arc;

/// Session-scoped flash message channel.
///
/// Resolves the session from the `ydw_session` cookie, minting a new token
/// when the cookie is missing or stale. A new token is only stored, and only
/// sent back as `Set-Cookie`, once a message is pushed to it, so return the
/// extractor as part of the response.
///
/// # Example
/// ```ignore
/// async fn delete(flash: Flash, Form(form): Form<DeleteForm>) -> impl IntoResponse {
///     flash.error("No file path specified");
///     (StatusCode::FOUND, flash, [(header::LOCATION, "/files")])
/// }
/// ```
pub struct Flash {
    store: Arc<SessionStore>,
    token: String,
    is_new: bool,
    stored: AtomicBool,
}

impl Flash {
    /// Bind to the session named by the request's cookie, if it is live.
    fn resolve(store: Arc<SessionStore>, headers: &HeaderMap) -> Self {
        let (token, is_new) = match extract_session_token(headers) {
            Some(token) if store.validate(&token) => (token, false),
            _ => (store.mint_token(), true),
        };
        Flash {
            store,
            token,
            is_new,
            stored: AtomicBool::new(false),
        }
    }

    pub fn push(&self, category: FlashCategory, text: impl Into<String>) {
        self.store.push(&self.token, category, text);
        self.stored.store(true, Ordering::Relaxed);
    }

    pub fn success(&self, text: impl Into<String>) {
        self.push(FlashCategory::Success, text);
    }

    pub fn error(&self, text: impl Into<String>) {
        self.push(FlashCategory::Error, text);
    }

    /// Take all pending messages for rendering.
    pub fn drain(&self) -> Vec<FlashMessage> {
        self.store.drain(&self.token)
    }
}

#[async_trait]
impl<S> FromRequestParts<S> for Flash
where
    S: Send + Sync,
    Arc<AppState>: FromRef<S>,
{
    type Rejection = Infallible;

    async fn from_request_parts(parts: &mut Parts, state: &S) -> Result<Self, Self::Rejection> {
        let app_state = Arc::<AppState>::from_ref(state);
        Ok(Flash::resolve(app_state.sessions.clone(), &parts.headers))
    }
}

impl IntoResponseParts for Flash {
    type Error = Infallible;

    fn into_response_parts(self, mut res: ResponseParts) -> Result<ResponseParts, Self::Error> {
        if self.is_new && self.stored.load(Ordering::Relaxed) {
            let cookie = format!(
                "{}={}; HttpOnly; SameSite=Lax; Path=/",
                SESSION_COOKIE, self.token
            );
            // The token is hex, so this always parses.
            if let Ok(value) = HeaderValue::from_str(&cookie) {
                res.headers_mut().append(header::SET_COOKIE, value);
            }
        }
        Ok(res)
    }
}

/// Extract the session token from the Cookie header.
fn extract_session_token(headers: &HeaderMap) -> Option<String> {
    headers
        .get_all(header::COOKIE)
        .iter()
        .filter_map(|v| v.to_str().ok())
        .flat_map(|v| v.split(';'))
        .find_map(|pair| {
            let (name, value) = pair.trim().split_once('=')?;
            (name == SESSION_COOKIE).then(|| value.to_string())
        })
}
