//! Roster, quizzes and scores.
//!
//! # Data Flow
//! ```text
//! POST form
//!     → forms.rs (presence / type / range checks)
//!     → handlers.rs (existence + duplicate check through the gateway)
//!     → storage gateway (one committed write)
//!     → flash + redirect, or the form view with its error
//! ```

pub mod forms;
pub mod handlers;

use axum::{middleware, routing::get, Router};

use crate::auth::require_teacher;
use crate::http::server::AppState;
use self::handlers::*;

/// Teacher-only routes, wrapped by the session guard.
pub fn teacher_routes() -> Router<AppState> {
    Router::new()
        .route("/dashboard", get(dashboard))
        .route("/student/add", get(add_student_page).post(add_student))
        .route("/quiz/add", get(add_quiz_page).post(add_quiz))
        .route("/student/{id}", get(student_results))
        .route("/results/add", get(add_result_page).post(add_result))
        .route_layer(middleware::from_fn(require_teacher))
}

/// Routes anyone may call.
pub fn public_routes() -> Router<AppState> {
    Router::new().route("/quiz/{id}/results", get(quiz_results))
}
