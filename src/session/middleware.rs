//! Session cookie middleware.
//!
//! Loads the session named by the request cookie and attaches a [`Session`]
//! handle to the request extensions. A cookie is only set when the handler
//! created or rotated the session.

use axum::{
    body::Body,
    extract::State,
    http::{
        header::{COOKIE, SET_COOKIE},
        HeaderMap, HeaderValue, Request,
    },
    middleware::Next,
    response::Response,
};

use super::store::SessionId;
use super::Session;
use crate::http::server::AppState;

pub async fn session_middleware(
    State(state): State<AppState>,
    mut request: Request<Body>,
    next: Next,
) -> Response {
    let config = state.config();
    let cookie_name = config.session.cookie_name.as_str();

    let resumed = read_cookie(request.headers(), cookie_name)
        .and_then(|value| value.parse::<SessionId>().ok())
        .filter(|id| state.sessions.resume(*id));

    let session = Session::new(resumed, state.sessions.clone());
    request.extensions_mut().insert(session.clone());

    let mut response = next.run(request).await;

    if let Some(id) = session.issued_id() {
        let secure = config.session.secure_cookie || config.listener.tls.is_some();
        match HeaderValue::from_str(&format_set_cookie(cookie_name, id, secure)) {
            Ok(value) => {
                response.headers_mut().append(SET_COOKIE, value);
            }
            Err(e) => tracing::error!(error = %e, "Could not encode session cookie"),
        }
    }
    response
}

/// Find the value of cookie `name` across all `Cookie` headers.
pub fn read_cookie<'a>(headers: &'a HeaderMap, name: &str) -> Option<&'a str> {
    headers
        .get_all(COOKIE)
        .iter()
        .filter_map(|value| value.to_str().ok())
        .flat_map(|value| value.split(';'))
        .filter_map(|pair| pair.trim().split_once('='))
        .find(|(key, _)| key.trim() == name)
        .map(|(_, value)| value.trim().trim_matches('"'))
}

pub fn format_set_cookie(name: &str, id: SessionId, secure: bool) -> String {
    let mut cookie = format!("{name}={id}; Path=/; HttpOnly; SameSite=Lax");
    if secure {
        cookie.push_str("; Secure");
    }
    cookie
}

#[cfg(test)]
mod tests {
    use super::*;

    #[test]
    fn test_read_cookie_among_others() {
        let mut headers = HeaderMap::new();
        headers.append(COOKIE, HeaderValue::from_static("theme=dark; gradebook_session=abc123"));
        headers.append(COOKIE, HeaderValue::from_static("other=1"));

        assert_eq!(read_cookie(&headers, "gradebook_session"), Some("abc123"));
        assert_eq!(read_cookie(&headers, "other"), Some("1"));
        assert_eq!(read_cookie(&headers, "missing"), None);
    }

    #[test]
    fn test_read_cookie_prefix_is_not_a_match() {
        let mut headers = HeaderMap::new();
        headers.insert(COOKIE, HeaderValue::from_static("gradebook_session_old=x"));
        assert_eq!(read_cookie(&headers, "gradebook_session"), None);
    }

    #[test]
    fn test_set_cookie_attributes() {
        let id = SessionId::generate();
        let plain = format_set_cookie("sid", id, false);
        assert_eq!(plain, format!("sid={id}; Path=/; HttpOnly; SameSite=Lax"));
        assert!(format_set_cookie("sid", id, true).ends_with("; Secure"));
    }
}
