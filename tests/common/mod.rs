//! Shared utilities for integration testing.

#![allow(dead_code)]

use reqwest::{header, redirect, Response, StatusCode};
use serde_json::Value;
use std::net::SocketAddr;
use std::sync::Mutex;
use tempfile::TempDir;
use tokio::net::TcpListener;
use tokio::sync::mpsc;

use gradebook::config::GradebookConfig;
use gradebook::http::{AppState, HttpServer};
use gradebook::lifecycle::Shutdown;

pub const USERNAME: &str = "admin";
pub const PASSWORD: &str = "password";

/// A gradebook server on an ephemeral port with its own database file.
///
/// Dropping it stops the server.
pub struct TestServer {
    pub addr: SocketAddr,
    pub state: AppState,
    _shutdown: Shutdown,
    _dir: TempDir,
}

impl TestServer {
    pub async fn start() -> Self {
        Self::start_with(|_| {}).await
    }

    pub async fn start_with(configure: impl FnOnce(&mut GradebookConfig)) -> Self {
        let dir = TempDir::new().unwrap();
        let mut config = GradebookConfig::default();
        config.database.path = dir.path().join("gradebook.db").to_string_lossy().into_owned();
        config.database.pool_size = 2;
        configure(&mut config);

        let listener = TcpListener::bind("127.0.0.1:0").await.unwrap();
        let addr = listener.local_addr().unwrap();

        let shutdown = Shutdown::new();
        let (_, config_updates) = mpsc::unbounded_channel();
        let server = HttpServer::new(config).unwrap();
        let state = server.state().clone();
        let server_shutdown = shutdown.subscribe();
        tokio::spawn(async move {
            let _ = server.run(listener, config_updates, server_shutdown).await;
        });

        Self {
            addr,
            state,
            _shutdown: shutdown,
            _dir: dir,
        }
    }

    /// A fresh browser with no cookies.
    pub fn client(&self) -> Browser {
        Browser::new(self.addr)
    }
}

/// HTTP client that keeps the session cookie between requests and never
/// follows redirects.
pub struct Browser {
    base: String,
    http: reqwest::Client,
    cookie: Mutex<Option<String>>,
}

impl Browser {
    fn new(addr: SocketAddr) -> Self {
        let http = reqwest::Client::builder()
            .redirect(redirect::Policy::none())
            .build()
            .unwrap();
        Self {
            base: format!("http://{addr}"),
            http,
            cookie: Mutex::new(None),
        }
    }

    /// The `name=value` pair currently sent as the session cookie.
    pub fn cookie(&self) -> Option<String> {
        self.cookie.lock().unwrap().clone()
    }

    pub fn set_cookie(&self, pair: &str) {
        *self.cookie.lock().unwrap() = Some(pair.to_string());
    }

    pub async fn get(&self, path: &str) -> Response {
        let request = self.http.get(format!("{}{path}", self.base));
        self.send(request).await
    }

    pub async fn post(&self, path: &str, form: &[(&str, &str)]) -> Response {
        let request = self.http.post(format!("{}{path}", self.base)).form(form);
        self.send(request).await
    }

    async fn send(&self, mut request: reqwest::RequestBuilder) -> Response {
        if let Some(cookie) = self.cookie.lock().unwrap().clone() {
            request = request.header(header::COOKIE, cookie);
        }
        let response = request.send().await.unwrap();
        if let Some(set) = response.headers().get(header::SET_COOKIE) {
            let pair = set.to_str().unwrap().split(';').next().unwrap().to_string();
            *self.cookie.lock().unwrap() = Some(pair);
        }
        response
    }

    pub async fn login(&self) {
        let response = self
            .post("/login", &[("username", USERNAME), ("password", PASSWORD)])
            .await;
        assert_eq!(response.status(), StatusCode::SEE_OTHER);
        assert_eq!(location(&response), "/dashboard");
    }

    pub async fn add_student(&self, first_name: &str, last_name: &str) {
        let response = self
            .post(
                "/student/add",
                &[("first_name", first_name), ("last_name", last_name)],
            )
            .await;
        assert_eq!(response.status(), StatusCode::SEE_OTHER);
    }

    pub async fn add_quiz(&self, subject: &str, num_questions: &str, quiz_date: &str) {
        let response = self
            .post(
                "/quiz/add",
                &[
                    ("subject", subject),
                    ("num_questions", num_questions),
                    ("quiz_date", quiz_date),
                ],
            )
            .await;
        assert_eq!(response.status(), StatusCode::SEE_OTHER);
    }

    pub async fn add_result(&self, student_id: &str, quiz_id: &str, score: &str) -> Response {
        self.post(
            "/results/add",
            &[("student_id", student_id), ("quiz_id", quiz_id), ("score", score)],
        )
        .await
    }
}

pub fn location(response: &Response) -> &str {
    response
        .headers()
        .get(header::LOCATION)
        .unwrap()
        .to_str()
        .unwrap()
}

pub async fn json(response: Response) -> Value {
    response.json().await.unwrap()
}

/// Messages of every flash on a page.
pub fn flash_messages(page: &Value) -> Vec<String> {
    page["flashes"]
        .as_array()
        .unwrap()
        .iter()
        .map(|flash| flash["message"].as_str().unwrap().to_string())
        .collect()
}
