//! HTTP protocol handling subsystem.
//!
//! # Data Flow
//! ```text
//! TCP/TLS connection
//!     → server.rs (Axum setup, middleware stack)
//!     → request.rs (request ID, tracing span)
//!     → session middleware + guard
//!     → auth / gradebook handlers
//!     → views.rs (page payloads) via response.rs
//!     → Send to client
//! ```

pub mod error;
pub mod request;
pub mod response;
pub mod server;
pub mod views;

pub use error::AppError;
pub use request::X_REQUEST_ID;
pub use server::{AppState, HttpServer};
