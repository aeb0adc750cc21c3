use axum::{
    body::Body,
    extract::FromRequestParts,
    http::{request::Parts, Request},
    middleware::Next,
    response::{IntoResponse, Redirect, Response},
};

use crate::http::response::LOGIN_PATH;
use crate::observability::metrics;
use crate::session::{Flash, Session};

/// Authentication context for the logged-in teacher.
///
/// Only [`require_teacher`] inserts it, so taking it as a handler argument
/// proves the guard ran and passed.
#[derive(Debug, Clone, Copy, PartialEq, Eq)]
pub struct Teacher;

/// Let the request through only for an authenticated session. Otherwise queue
/// a notice and redirect to the login page without running the handler.
pub async fn require_teacher(session: Session, mut request: Request<Body>, next: Next) -> Response {
    if !session.is_authenticated() {
        tracing::debug!(path = %request.uri().path(), "Protected route requested without login");
        metrics::record_guard_rejection();
        session.flash(Flash::error("Please log in first"));
        return Redirect::to(LOGIN_PATH).into_response();
    }

    request.extensions_mut().insert(Teacher);
    next.run(request).await
}

impl<S> FromRequestParts<S> for Teacher
where
    S: Send + Sync,
{
    type Rejection = Redirect;

    async fn from_request_parts(parts: &mut Parts, _state: &S) -> Result<Self, Self::Rejection> {
        parts
            .extensions
            .get::<Teacher>()
            .copied()
            .ok_or_else(|| Redirect::to(LOGIN_PATH))
    }
}
