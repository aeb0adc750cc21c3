//! SQLite storage layer for the gradebook.
//!
//! Provides:
//! - Schema initialization and connection pragmas
//! - Pooled connections (r2d2)
//! - A request-scoped gateway exposing every query the routes need

pub mod gateway;
pub mod models;
pub mod pool;
pub mod schema;

use thiserror::Error;

pub use gateway::Gateway;
pub use models::{
    NamedQuizScore, NewQuiz, NewResult, NewStudent, Quiz, QuizOrder, QuizScore, ResultWrite,
    Student, StudentOrder, StudentResult,
};
pub use pool::DbPool;

pub type StorageResult<T> = Result<T, StorageError>;

/// Error type for storage operations.
#[derive(Debug, Error)]
pub enum StorageError {
    #[error("Connection pool error: {0}")]
    Pool(#[from] r2d2::Error),

    #[error("Database error: {0}")]
    Database(#[from] rusqlite::Error),

    #[error("Blocking database task failed: {0}")]
    Task(#[source] tokio::task::JoinError),
}
