//! Browser sessions
//!
//! Form state lives server-side, keyed by a random id carried in a cookie.
//! Sessions idle for longer than the configured limit are dropped on the
//! next request; there is no background sweeper.

use act_form::{Artifact, SessionInput, Workflow};
use axum::http::header::COOKIE;
use axum::http::HeaderMap;
use dashmap::DashMap;
use std::time::{Duration, Instant};
use uuid::Uuid;

/// Session cookie name
pub const SESSION_COOKIE: &str = "act_session";

/// State of one browser session
#[derive(Debug)]
pub struct Session {
    /// Form input, created with the first snapshot seen
    pub input: Option<SessionInput>,
    /// Submit workflow
    pub workflow: Workflow,
    /// Last interaction
    pub last_seen: Instant,
}

impl Session {
    fn new() -> Self {
        Self {
            input: None,
            workflow: Workflow::new(),
            last_seen: Instant::now(),
        }
    }
}

/// Concurrent session map
#[derive(Debug)]
pub struct SessionStore {
    sessions: DashMap<Uuid, Session>,
    idle: Duration,
}

impl SessionStore {
    /// Create store with idle expiry
    #[must_use]
    pub fn new(idle: Duration) -> Self {
        Self {
            sessions: DashMap::new(),
            idle,
        }
    }

    /// Number of live sessions
    #[must_use]
    pub fn len(&self) -> usize {
        self.sessions.len()
    }

    /// Whether no session is live
    #[must_use]
    pub fn is_empty(&self) -> bool {
        self.sessions.is_empty()
    }

    /// Drop sessions idle for longer than the limit
    pub fn purge_expired(&self) {
        let before = self.sessions.len();
        let idle = self.idle;
        self.sessions.retain(|_, s| s.last_seen.elapsed() <= idle);
        let dropped = before.saturating_sub(self.sessions.len());
        if dropped > 0 {
            tracing::debug!("Dropped {} idle sessions", dropped);
        }
    }

    /// Resolve the request's session, creating one when the cookie is
    /// missing or names an expired session
    ///
    /// Returns the id and whether it is new (and needs a cookie).
    pub fn resolve(&self, headers: &HeaderMap) -> (Uuid, bool) {
        self.purge_expired();
        if let Some(id) = session_id(headers) {
            if let Some(mut session) = self.sessions.get_mut(&id) {
                session.last_seen = Instant::now();
                return (id, false);
            }
        }
        let id = Uuid::new_v4();
        self.sessions.insert(id, Session::new());
        tracing::debug!("New session {}", id);
        (id, true)
    }

    /// Run `f` on a session
    ///
    /// The session map shard stays locked while `f` runs, so `f` must not
    /// block on other sessions.
    pub fn with<R>(&self, id: Uuid, f: impl FnOnce(&mut Session) -> R) -> R {
        let mut session = self.sessions.entry(id).or_insert_with(Session::new);
        session.last_seen = Instant::now();
        f(&mut session)
    }

    /// Take the session's generated document, if any
    ///
    /// Unknown sessions are not created.
    pub fn take_artifact(&self, id: Uuid) -> Option<Artifact> {
        let mut session = self.sessions.get_mut(&id)?;
        session.last_seen = Instant::now();
        session.workflow.take_artifact()
    }
}

/// Session id from the `Cookie` header
#[must_use]
pub fn session_id(headers: &HeaderMap) -> Option<Uuid> {
    headers
        .get_all(COOKIE)
        .iter()
        .filter_map(|v| v.to_str().ok())
        .flat_map(|v| v.split(';'))
        .filter_map(|pair| pair.trim().split_once('='))
        .find(|(name, _)| *name == SESSION_COOKIE)
        .and_then(|(_, value)| Uuid::parse_str(value.trim()).ok())
}

/// `Set-Cookie` value for a session id
#[must_use]
pub fn session_cookie(id: Uuid) -> String {
    format!("{SESSION_COOKIE}={id}; Path=/; HttpOnly; SameSite=Lax")
}

#[cfg(test)]
mod tests {
    use super::*;
    use axum::http::HeaderValue;

    fn headers_with(cookie: &str) -> HeaderMap {
        let mut headers = HeaderMap::new();
        headers.insert(COOKIE, HeaderValue::from_str(cookie).unwrap());
        headers
    }

    #[test]
    fn cookie_parsing() {
        let id = Uuid::new_v4();
        let headers = headers_with(&format!("theme=dark; {SESSION_COOKIE}={id}"));
        assert_eq!(session_id(&headers), Some(id));
        assert_eq!(session_id(&headers_with("act_session=garbage")), None);
        assert_eq!(session_id(&HeaderMap::new()), None);
    }

    #[test]
    fn resolve_reuses_known_session() {
        let store = SessionStore::new(Duration::from_secs(60));
        let (id, created) = store.resolve(&HeaderMap::new());
        assert!(created);

        let cookie = session_cookie(id);
        let value = cookie.split(';').next().unwrap();
        let (again, created) = store.resolve(&headers_with(value));
        assert_eq!(again, id);
        assert!(!created);
        assert_eq!(store.len(), 1);
    }

    #[test]
    fn idle_sessions_expire() {
        let store = SessionStore::new(Duration::from_millis(10));
        let (id, _) = store.resolve(&HeaderMap::new());
        std::thread::sleep(Duration::from_millis(30));

        let (fresh, created) =
            store.resolve(&headers_with(&format!("{SESSION_COOKIE}={id}")));
        assert!(created);
        assert_ne!(fresh, id);
        assert_eq!(store.len(), 1);
    }
}
