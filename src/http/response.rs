//! Response helpers shared by route handlers.

use axum::{
    http::StatusCode,
    response::{IntoResponse, Redirect, Response},
    Json,
};
use serde::Serialize;

use crate::config::NotFoundPolicy;
use crate::http::views::ErrorPage;
use crate::session::{Flash, Session};

pub const INDEX_PATH: &str = "/";
pub const LOGIN_PATH: &str = "/login";
pub const DASHBOARD_PATH: &str = "/dashboard";

/// Render a view model.
pub fn render<T: Serialize>(page: T) -> Response {
    Json(page).into_response()
}

/// Report a missing student or quiz according to the configured policy.
pub fn not_found(policy: NotFoundPolicy, session: &Session, message: &str) -> Response {
    match policy {
        NotFoundPolicy::Status => {
            let page = ErrorPage {
                error: message.to_string(),
                flashes: session.take_flashes(),
            };
            (StatusCode::NOT_FOUND, Json(page)).into_response()
        }
        NotFoundPolicy::Redirect => {
            session.flash(Flash::error(message));
            Redirect::to(INDEX_PATH).into_response()
        }
    }
}
