//! Session subsystem.
//!
//! # Data Flow
//! ```text
//! Cookie header
//!     → middleware.rs (resume or issue session, Set-Cookie on issue)
//!     → Session handle in request extensions
//!     → handlers / auth guard read the flag and queue flashes
//!     → store.rs (DashMap keyed by random token)
//! ```
//!
//! # Design Decisions
//! - Only the random token leaves the server
//! - Expired sessions behave exactly like a missing cookie
//! - A background sweeper purges idle sessions

pub mod middleware;
pub mod store;

use arc_swap::ArcSwapOption;
use axum::{extract::FromRequestParts, http::request::Parts, http::StatusCode};
use std::sync::atomic::{AtomicBool, Ordering};
use std::sync::Arc;

pub use middleware::session_middleware;
pub use store::{Flash, FlashCategory, SessionId, SessionStore};

/// The current request's session.
///
/// A request without a live cookie starts with no stored session at all. One
/// is created only when something is written to it (a flash or a login), and
/// the middleware then sends the new token back.
#[derive(Clone)]
pub struct Session {
    store: SessionStore,
    slot: Arc<Slot>,
}

struct Slot {
    id: ArcSwapOption<SessionId>,
    issued: AtomicBool,
}

impl Session {
    pub fn new(id: Option<SessionId>, store: SessionStore) -> Self {
        Self {
            store,
            slot: Arc::new(Slot {
                id: ArcSwapOption::new(id.map(Arc::new)),
                issued: AtomicBool::new(false),
            }),
        }
    }

    pub fn id(&self) -> Option<SessionId> {
        self.slot.id.load().as_deref().copied()
    }

    /// Token to send back if this request created or replaced the session.
    pub fn issued_id(&self) -> Option<SessionId> {
        if self.slot.issued.load(Ordering::Acquire) {
            self.id()
        } else {
            None
        }
    }

    fn issue(&self, id: SessionId) {
        self.slot.id.store(Some(Arc::new(id)));
        self.slot.issued.store(true, Ordering::Release);
    }

    fn ensure(&self) -> SessionId {
        match self.id() {
            Some(id) => id,
            None => {
                let id = self.store.create();
                self.issue(id);
                id
            }
        }
    }

    pub fn is_authenticated(&self) -> bool {
        self.id()
            .map(|id| self.store.is_authenticated(id))
            .unwrap_or(false)
    }

    /// Authenticate under a fresh token so a token seen before login is
    /// never promoted.
    pub fn log_in(&self) {
        let id = match self.id() {
            Some(old) => self.store.rotate(old),
            None => self.store.create(),
        };
        self.issue(id);
        self.store.set_authenticated(id, true);
    }

    pub fn log_out(&self) {
        if let Some(id) = self.id() {
            self.store.set_authenticated(id, false);
        }
    }

    pub fn flash(&self, flash: Flash) {
        let id = self.ensure();
        self.store.push_flash(id, flash);
    }

    pub fn take_flashes(&self) -> Vec<Flash> {
        self.id()
            .map(|id| self.store.take_flashes(id))
            .unwrap_or_default()
    }
}

impl<S> FromRequestParts<S> for Session
where
    S: Send + Sync,
{
    type Rejection = (StatusCode, &'static str);

    async fn from_request_parts(parts: &mut Parts, _state: &S) -> Result<Self, Self::Rejection> {
        parts.extensions.get::<Session>().cloned().ok_or_else(|| {
            tracing::error!("Session middleware is not installed on this route");
            (StatusCode::INTERNAL_SERVER_ERROR, "Session unavailable")
        })
    }
}

#[cfg(test)]
mod tests {
    use super::*;
    use std::time::Duration;

    fn store() -> SessionStore {
        SessionStore::new(Duration::from_secs(60))
    }

    #[test]
    fn test_reads_do_not_create_sessions() {
        let store = store();
        let session = Session::new(None, store.clone());

        assert!(!session.is_authenticated());
        assert!(session.take_flashes().is_empty());
        session.log_out();
        assert!(store.is_empty());
        assert_eq!(session.issued_id(), None);
    }

    #[test]
    fn test_flash_creates_and_issues() {
        let store = store();
        let session = Session::new(None, store.clone());

        session.flash(Flash::error("Please log in first"));
        let id = session.issued_id().unwrap();
        assert_eq!(store.len(), 1);
        assert_eq!(store.take_flashes(id).len(), 1);
    }

    #[test]
    fn test_existing_session_is_not_reissued() {
        let store = store();
        let id = store.create();
        let session = Session::new(Some(id), store.clone());

        session.flash(Flash::success("You were logged out"));
        assert_eq!(session.issued_id(), None);
        assert_eq!(session.id(), Some(id));
    }

    #[test]
    fn test_login_rotates_token() {
        let store = store();
        let before = store.create();
        let session = Session::new(Some(before), store.clone());

        session.log_in();
        let after = session.issued_id().unwrap();
        assert_ne!(after, before);
        assert!(session.is_authenticated());
        assert!(!store.is_authenticated(before));
        assert!(!store.resume(before));
    }
}
