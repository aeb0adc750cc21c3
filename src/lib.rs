//! Classroom gradebook server library.
//!
//! A single teacher logs in with configured credentials, keeps a roster of
//! students, records quizzes and their scores, and can share per-quiz results
//! that anonymous visitors see with student names withheld.

// Core subsystems
pub mod config;
pub mod http;
pub mod net;
pub mod storage;

// Domain
pub mod auth;
pub mod gradebook;
pub mod session;

// Cross-cutting concerns
pub mod lifecycle;
pub mod observability;
pub mod security;

pub use config::schema::GradebookConfig;
pub use http::HttpServer;
pub use lifecycle::Shutdown;
