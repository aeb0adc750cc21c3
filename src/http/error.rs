//! Infrastructure failures surfaced by handlers.

use axum::{
    http::StatusCode,
    response::{IntoResponse, Response},
    Json,
};
use thiserror::Error;

use crate::http::views::ErrorPage;
use crate::storage::StorageError;

/// Failures that are not the user's fault. Rendered as a 500 view.
#[derive(Debug, Error)]
pub enum AppError {
    #[error(transparent)]
    Storage(#[from] StorageError),
}

impl IntoResponse for AppError {
    fn into_response(self) -> Response {
        tracing::error!(error = %self, "Request failed");
        let page = ErrorPage {
            error: "Internal server error".to_string(),
            flashes: Vec::new(),
        };
        (StatusCode::INTERNAL_SERVER_ERROR, Json(page)).into_response()
    }
}
