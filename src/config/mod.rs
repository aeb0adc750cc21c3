//! Configuration management subsystem.
//!
//! # Data Flow
//! ```text
//! config file (TOML) + CLI overrides
//!     → loader.rs (parse & deserialize)
//!     → validation.rs (semantic checks)
//!     → GradebookConfig (validated)
//!     → shared via ArcSwap in AppState
//!
//! On file change:
//!     watcher.rs detects change
//!     → loader.rs loads + validates
//!     → auth and policy sections swapped in atomically
//!     → other changed sections logged as needing a restart
//! ```
//!
//! # Design Decisions
//! - All fields have defaults so an empty file is a valid config
//! - Validation separates syntactic (serde) from semantic checks

pub mod loader;
pub mod schema;
pub mod validation;
pub mod watcher;

pub use loader::{load_config, load_config_with, ConfigError, Overrides};
pub use schema::{
    AuthConfig, DatabaseConfig, DuplicateResultPolicy, GradebookConfig, ListenerConfig,
    LogFormat, NotFoundPolicy, ObservabilityConfig, PolicyConfig, SecurityConfig,
    SessionConfig, TimeoutConfig, TlsConfig,
};
