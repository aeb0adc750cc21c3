//! Server-side session storage.

use dashmap::DashMap;
use serde::Serialize;
use std::fmt;
use std::str::FromStr;
use std::sync::Arc;
use std::time::{Duration, Instant};
use uuid::Uuid;

use crate::observability::metrics;

/// Opaque token identifying a session. Sent to the client as the cookie value.
#[derive(Debug, Clone, Copy, PartialEq, Eq, Hash)]
pub struct SessionId(Uuid);

impl SessionId {
    pub fn generate() -> Self {
        Self(Uuid::new_v4())
    }
}

impl fmt::Display for SessionId {
    fn fmt(&self, f: &mut fmt::Formatter<'_>) -> fmt::Result {
        write!(f, "{}", self.0.simple())
    }
}

impl FromStr for SessionId {
    type Err = uuid::Error;

    fn from_str(s: &str) -> Result<Self, Self::Err> {
        Uuid::parse_str(s).map(Self)
    }
}

#[derive(Debug, Clone, Copy, PartialEq, Eq, Serialize)]
#[serde(rename_all = "snake_case")]
pub enum FlashCategory {
    Success,
    Error,
}

/// A one-shot notice shown by the next rendered view.
#[derive(Debug, Clone, PartialEq, Eq, Serialize)]
pub struct Flash {
    pub category: FlashCategory,
    pub message: String,
}

impl Flash {
    pub fn success(message: impl Into<String>) -> Self {
        Self {
            category: FlashCategory::Success,
            message: message.into(),
        }
    }

    pub fn error(message: impl Into<String>) -> Self {
        Self {
            category: FlashCategory::Error,
            message: message.into(),
        }
    }
}

#[derive(Debug)]
struct SessionData {
    authenticated: bool,
    flashes: Vec<Flash>,
    last_seen: Instant,
}

impl SessionData {
    fn new(now: Instant) -> Self {
        Self {
            authenticated: false,
            flashes: Vec::new(),
            last_seen: now,
        }
    }
}

/// A thread-safe map of live sessions with idle expiry.
#[derive(Clone)]
pub struct SessionStore {
    inner: Arc<DashMap<SessionId, SessionData>>,
    ttl: Duration,
}

impl SessionStore {
    pub fn new(ttl: Duration) -> Self {
        Self {
            inner: Arc::new(DashMap::new()),
            ttl,
        }
    }

    /// Start a new anonymous session.
    pub fn create(&self) -> SessionId {
        let id = SessionId::generate();
        self.inner.insert(id, SessionData::new(Instant::now()));
        metrics::record_active_sessions(self.inner.len());
        id
    }

    /// Mark a session as used now. Returns false if it is unknown or has been
    /// idle longer than the TTL, in which case it is dropped.
    pub fn resume(&self, id: SessionId) -> bool {
        let now = Instant::now();
        let expired = match self.inner.get_mut(&id) {
            Some(mut data) => {
                if now.duration_since(data.last_seen) > self.ttl {
                    true
                } else {
                    data.last_seen = now;
                    false
                }
            }
            None => return false,
        };

        if expired {
            self.inner.remove(&id);
            tracing::debug!(session = %id, "Session expired");
            return false;
        }
        true
    }

    /// Replace `id` with a fresh token, carrying pending flashes over. The old
    /// token stops resolving. The new session starts unauthenticated.
    pub fn rotate(&self, id: SessionId) -> SessionId {
        let flashes = self
            .inner
            .remove(&id)
            .map(|(_, data)| data.flashes)
            .unwrap_or_default();

        let fresh = SessionId::generate();
        let mut data = SessionData::new(Instant::now());
        data.flashes = flashes;
        self.inner.insert(fresh, data);
        metrics::record_active_sessions(self.inner.len());
        fresh
    }

    pub fn is_authenticated(&self, id: SessionId) -> bool {
        self.inner
            .get(&id)
            .map(|data| data.authenticated)
            .unwrap_or(false)
    }

    pub fn set_authenticated(&self, id: SessionId, authenticated: bool) {
        if let Some(mut data) = self.inner.get_mut(&id) {
            data.authenticated = authenticated;
        }
    }

    pub fn push_flash(&self, id: SessionId, flash: Flash) {
        if let Some(mut data) = self.inner.get_mut(&id) {
            data.flashes.push(flash);
        }
    }

    /// Remove and return all pending notices.
    pub fn take_flashes(&self, id: SessionId) -> Vec<Flash> {
        self.inner
            .get_mut(&id)
            .map(|mut data| std::mem::take(&mut data.flashes))
            .unwrap_or_default()
    }

    /// Drop every session idle longer than the TTL. Returns how many went.
    pub fn purge_expired(&self) -> usize {
        let now = Instant::now();
        let before = self.inner.len();
        self.inner
            .retain(|_, data| now.duration_since(data.last_seen) <= self.ttl);
        let remaining = self.inner.len();
        metrics::record_active_sessions(remaining);
        before.saturating_sub(remaining)
    }

    pub fn len(&self) -> usize {
        self.inner.len()
    }

    pub fn is_empty(&self) -> bool {
        self.inner.is_empty()
    }
}

#[cfg(test)]
mod tests {
    use super::*;

    #[test]
    fn test_new_session_is_anonymous() {
        let store = SessionStore::new(Duration::from_secs(60));
        let id = store.create();
        assert!(store.resume(id));
        assert!(!store.is_authenticated(id));
    }

    #[test]
    fn test_login_logout_transitions() {
        let store = SessionStore::new(Duration::from_secs(60));
        let id = store.create();

        store.set_authenticated(id, true);
        assert!(store.is_authenticated(id));

        store.set_authenticated(id, false);
        assert!(!store.is_authenticated(id));
    }

    #[test]
    fn test_unknown_session() {
        let store = SessionStore::new(Duration::from_secs(60));
        let id = SessionId::generate();
        assert!(!store.resume(id));
        assert!(!store.is_authenticated(id));
        store.set_authenticated(id, true);
        assert!(!store.is_authenticated(id));
        assert!(store.is_empty());
    }

    #[test]
    fn test_flashes_are_drained_once() {
        let store = SessionStore::new(Duration::from_secs(60));
        let id = store.create();
        store.push_flash(id, Flash::error("Please log in first"));
        store.push_flash(id, Flash::success("You were logged in"));

        let flashes = store.take_flashes(id);
        assert_eq!(flashes.len(), 2);
        assert_eq!(flashes[0].category, FlashCategory::Error);
        assert!(store.take_flashes(id).is_empty());
    }

    #[test]
    fn test_rotate_retires_old_token() {
        let store = SessionStore::new(Duration::from_secs(60));
        let old = store.create();
        store.push_flash(old, Flash::error("Please log in first"));
        store.set_authenticated(old, true);

        let fresh = store.rotate(old);
        assert_ne!(fresh, old);
        assert!(!store.resume(old));
        assert!(!store.is_authenticated(fresh));
        assert_eq!(store.take_flashes(fresh).len(), 1);
        assert_eq!(store.len(), 1);
    }

    #[test]
    fn test_idle_sessions_expire() {
        let store = SessionStore::new(Duration::from_millis(20));
        let id = store.create();
        store.set_authenticated(id, true);

        std::thread::sleep(Duration::from_millis(50));
        assert!(!store.resume(id));
        assert!(!store.is_authenticated(id));
        assert_eq!(store.len(), 0);
    }

    #[test]
    fn test_purge_expired() {
        let store = SessionStore::new(Duration::from_millis(20));
        store.create();
        store.create();
        std::thread::sleep(Duration::from_millis(50));
        let fresh = store.create();

        assert_eq!(store.purge_expired(), 2);
        assert_eq!(store.len(), 1);
        assert!(store.resume(fresh));
    }

    #[test]
    fn test_id_round_trips_through_cookie_text() {
        let id = SessionId::generate();
        let parsed: SessionId = id.to_string().parse().unwrap();
        assert_eq!(parsed, id);
        assert!("not-a-token".parse::<SessionId>().is_err());
    }
}
