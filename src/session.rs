//! In-memory session store carrying one-shot flash messages.
//!
//! A session only occupies the store once something is queued for it, so
//! requests that merely read (and find nothing) leave no trace.

use crate::types::{FlashCategory, FlashMessage};
use parking_lot::RwLock;
use rand::Rng;
use std::collections::HashMap;
use std::time::{Duration, Instant};

/// Session TTL: 24 hours.
const SESSION_TTL: Duration = Duration::from_secs(24 * 60 * 60);

/// Name of the session cookie.
pub const SESSION_COOKIE: &str = "ydw_session";

struct SessionInfo {
    touched_at: Instant,
    flash: Vec<FlashMessage>,
}

impl SessionInfo {
    fn new() -> Self {
        Self {
            touched_at: Instant::now(),
            flash: Vec::new(),
        }
    }

    fn expired(&self) -> bool {
        self.touched_at.elapsed() >= SESSION_TTL
    }
}

/// Thread-safe in-memory session store.
pub struct SessionStore {
    sessions: RwLock<HashMap<String, SessionInfo>>,
}

impl Default for SessionStore {
    fn default() -> Self {
        Self::new()
    }
}

impl SessionStore {
    pub fn new() -> Self {
        Self {
            sessions: RwLock::new(HashMap::new()),
        }
    }

    /// Generate a fresh session token (64-char hex string).
    ///
    /// The session is not stored until the first [`push`](Self::push).
    pub fn mint_token(&self) -> String {
        let mut rng = rand::thread_rng();
        let mut bytes = [0u8; 32];
        rng.fill(&mut bytes);
        hex::encode(bytes)
    }

    /// Check if a session token is valid (exists and not expired).
    pub fn validate(&self, token: &str) -> bool {
        let sessions = self.sessions.read();
        sessions
            .get(token)
            .map(|info| !info.expired())
            .unwrap_or(false)
    }

    /// Queue a flash message for the session's next render.
    pub fn push(&self, token: &str, category: FlashCategory, text: impl Into<String>) {
        let mut sessions = self.sessions.write();
        let info = sessions
            .entry(token.to_string())
            .or_insert_with(SessionInfo::new);
        info.touched_at = Instant::now();
        info.flash.push(FlashMessage {
            category,
            text: text.into(),
        });
    }

    /// Take every queued flash message, leaving the queue empty.
    pub fn drain(&self, token: &str) -> Vec<FlashMessage> {
        let mut sessions = self.sessions.write();
        match sessions.get_mut(token) {
            Some(info) => {
                info.touched_at = Instant::now();
                std::mem::take(&mut info.flash)
            }
            None => Vec::new(),
        }
    }

    /// Remove all expired sessions.
    pub fn cleanup_expired(&self) {
        self.sessions.write().retain(|_, info| !info.expired());
    }

    /// Number of live sessions.
    pub fn len(&self) -> usize {
        self.sessions.read().len()
    }

    pub fn is_empty(&self) -> bool {
        self.len() == 0
    }
}
