//! Teacher authentication.
//!
//! One configured credential pair, checked at login; the session remembers the
//! outcome. [`guard::require_teacher`] wraps every teacher-only route.
//!
//! ```text
//! Anonymous ──login ok──▶ Authenticated
//!     ▲                        │
//!     └──logout / expiry───────┘
//! ```

pub mod guard;
pub mod handlers;

use axum::{routing::get, Router};

use crate::http::server::AppState;
use self::handlers::{index, login, login_page, logout};

pub use guard::{require_teacher, Teacher};

pub fn routes() -> Router<AppState> {
    Router::new()
        .route("/", get(index))
        .route("/login", get(login_page).post(login))
        .route("/logout", get(logout))
}
