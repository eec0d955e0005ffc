//! Shared application state

use crate::session::SessionStore;
use act_docx::DocumentRenderer;
use act_sheets::ReferenceCache;
use std::fmt;
use std::sync::Arc;
use std::time::Duration;

/// State handed to every handler
#[derive(Clone)]
pub struct AppState {
    /// Process-wide reference snapshot cache
    pub cache: ReferenceCache,
    /// Act renderer
    pub renderer: Arc<dyn DocumentRenderer>,
    /// Browser sessions
    pub sessions: Arc<SessionStore>,
}

impl AppState {
    /// Create state
    #[must_use]
    pub fn new(
        cache: ReferenceCache,
        renderer: Arc<dyn DocumentRenderer>,
        session_idle: Duration,
    ) -> Self {
        Self {
            cache,
            renderer,
            sessions: Arc::new(SessionStore::new(session_idle)),
        }
    }
}

impl fmt::Debug for AppState {
    fn fmt(&self, f: &mut fmt::Formatter<'_>) -> fmt::Result {
        f.debug_struct("AppState")
            .field("cache", &self.cache)
            .field("sessions", &self.sessions.len())
            .finish_non_exhaustive()
    }
}
