use axum::{
    extract::State,
    response::{IntoResponse, Redirect, Response},
    Form,
};
use serde::Deserialize;

use crate::http::response::{render, DASHBOARD_PATH, LOGIN_PATH};
use crate::http::server::AppState;
use crate::http::views::LoginPage;
use crate::observability::metrics;
use crate::session::{Flash, Session};

pub const INVALID_CREDENTIALS: &str = "Invalid username or password";

#[derive(Debug, Default, Deserialize)]
pub struct LoginForm {
    #[serde(default)]
    pub username: String,
    #[serde(default)]
    pub password: String,
}

pub async fn index(session: Session) -> Redirect {
    if session.is_authenticated() {
        Redirect::to(DASHBOARD_PATH)
    } else {
        Redirect::to(LOGIN_PATH)
    }
}

pub async fn login_page(session: Session) -> Response {
    render(LoginPage {
        error: None,
        flashes: session.take_flashes(),
    })
}

pub async fn login(
    State(state): State<AppState>,
    session: Session,
    Form(form): Form<LoginForm>,
) -> Response {
    let config = state.config();
    let valid = form.username == config.auth.username && form.password == config.auth.password;

    if !valid {
        tracing::warn!(username = %form.username, "Rejected login");
        metrics::record_login("failure");
        return render(LoginPage {
            error: Some(INVALID_CREDENTIALS.to_string()),
            flashes: session.take_flashes(),
        });
    }

    session.log_in();
    tracing::info!(session = ?session.id(), "Teacher logged in");
    metrics::record_login("success");
    session.flash(Flash::success("You were logged in"));
    Redirect::to(DASHBOARD_PATH).into_response()
}

pub async fn logout(session: Session) -> Redirect {
    session.log_out();
    tracing::info!(session = ?session.id(), "Logged out");
    session.flash(Flash::success("You were logged out"));
    Redirect::to(LOGIN_PATH)
}
