//! Configuration schema definitions.
//!
//! This module defines the complete configuration structure for the gradebook.
//! All types derive Serde traits for deserialization from config files.

use serde::{Deserialize, Serialize};

/// Root configuration for the gradebook service.
#[derive(Debug, Clone, PartialEq, Deserialize, Serialize, Default)]
#[serde(default)]
pub struct GradebookConfig {
    /// Listener configuration (bind address, TLS).
    pub listener: ListenerConfig,

    /// SQLite database location and pool sizing.
    pub database: DatabaseConfig,

    /// The single teacher credential pair.
    pub auth: AuthConfig,

    /// Session cookie and expiry settings.
    pub session: SessionConfig,

    /// Behavior where the two historical route modules disagreed.
    pub policy: PolicyConfig,

    /// Timeout configuration.
    pub timeouts: TimeoutConfig,

    /// Observability settings.
    pub observability: ObservabilityConfig,

    /// Security hardening settings.
    pub security: SecurityConfig,
}

impl GradebookConfig {
    /// Apply the sections that may change while the server is running.
    ///
    /// Returns the names of sections that differ but need a restart to take
    /// effect; those keep their current values.
    pub fn merge_reloadable(
        &self,
        incoming: &GradebookConfig,
    ) -> (GradebookConfig, Vec<&'static str>) {
        let mut merged = self.clone();
        merged.auth = incoming.auth.clone();
        merged.policy = incoming.policy.clone();

        let mut restart_required = Vec::new();
        if self.listener != incoming.listener {
            restart_required.push("listener");
        }
        if self.database != incoming.database {
            restart_required.push("database");
        }
        if self.session != incoming.session {
            restart_required.push("session");
        }
        if self.timeouts != incoming.timeouts {
            restart_required.push("timeouts");
        }
        if self.observability != incoming.observability {
            restart_required.push("observability");
        }
        if self.security != incoming.security {
            restart_required.push("security");
        }
        (merged, restart_required)
    }
}

/// Listener configuration.
#[derive(Debug, Clone, PartialEq, Deserialize, Serialize)]
#[serde(default)]
pub struct ListenerConfig {
    /// Bind address (e.g., "127.0.0.1:5000").
    pub bind_address: String,

    /// Optional TLS configuration.
    pub tls: Option<TlsConfig>,
}

impl Default for ListenerConfig {
    fn default() -> Self {
        Self {
            bind_address: "127.0.0.1:5000".to_string(),
            tls: None,
        }
    }
}

/// TLS configuration for the listener.
#[derive(Debug, Clone, PartialEq, Deserialize, Serialize)]
pub struct TlsConfig {
    /// Path to certificate file (PEM).
    pub cert_path: String,

    /// Path to private key file (PEM).
    pub key_path: String,
}

/// Database configuration.
#[derive(Debug, Clone, PartialEq, Deserialize, Serialize)]
#[serde(default)]
pub struct DatabaseConfig {
    /// Path to the SQLite file. Created on first start.
    pub path: String,

    /// Maximum pooled connections.
    pub pool_size: u32,

    /// How long a connection waits on a locked database, in milliseconds.
    pub busy_timeout_ms: u64,
}

impl Default for DatabaseConfig {
    fn default() -> Self {
        Self {
            path: "gradebook.db".to_string(),
            pool_size: 8,
            busy_timeout_ms: 5000,
        }
    }
}

/// Teacher credentials.
#[derive(Debug, Clone, PartialEq, Deserialize, Serialize)]
#[serde(default)]
pub struct AuthConfig {
    pub username: String,
    pub password: String,
}

impl Default for AuthConfig {
    fn default() -> Self {
        Self {
            // WARNING: placeholders. Override in the config file.
            username: "admin".to_string(),
            password: "password".to_string(),
        }
    }
}

/// Session cookie configuration.
#[derive(Debug, Clone, PartialEq, Deserialize, Serialize)]
#[serde(default)]
pub struct SessionConfig {
    /// Name of the cookie carrying the session token.
    pub cookie_name: String,

    /// Idle lifetime of a session in seconds.
    pub ttl_secs: u64,

    /// How often expired sessions are purged, in seconds.
    pub sweep_interval_secs: u64,

    /// Mark the cookie `Secure`. Always set when TLS is enabled.
    pub secure_cookie: bool,
}

impl Default for SessionConfig {
    fn default() -> Self {
        Self {
            cookie_name: "gradebook_session".to_string(),
            ttl_secs: 24 * 60 * 60,
            sweep_interval_secs: 300,
            secure_cookie: false,
        }
    }
}

/// What happens when a result already exists for a student/quiz pair.
#[derive(Debug, Clone, Copy, PartialEq, Eq, Deserialize, Serialize, Default)]
#[serde(rename_all = "snake_case")]
pub enum DuplicateResultPolicy {
    /// Redisplay the form with an error.
    #[default]
    Reject,
    /// Overwrite the stored score.
    Update,
}

/// How a missing student or quiz is reported.
#[derive(Debug, Clone, Copy, PartialEq, Eq, Deserialize, Serialize, Default)]
#[serde(rename_all = "snake_case")]
pub enum NotFoundPolicy {
    /// 404 view.
    #[default]
    Status,
    /// Redirect to the index with an error notice.
    Redirect,
}

#[derive(Debug, Clone, PartialEq, Deserialize, Serialize, Default)]
#[serde(default)]
pub struct PolicyConfig {
    pub duplicate_result: DuplicateResultPolicy,
    pub not_found: NotFoundPolicy,
}

/// Timeout configuration.
#[derive(Debug, Clone, PartialEq, Deserialize, Serialize)]
#[serde(default)]
pub struct TimeoutConfig {
    /// Request timeout (total time for request/response) in seconds.
    pub request_secs: u64,
}

impl Default for TimeoutConfig {
    fn default() -> Self {
        Self { request_secs: 30 }
    }
}

/// Log output format.
#[derive(Debug, Clone, Copy, PartialEq, Eq, Deserialize, Serialize, Default)]
#[serde(rename_all = "snake_case")]
pub enum LogFormat {
    #[default]
    Pretty,
    Json,
}

/// Observability configuration.
#[derive(Debug, Clone, PartialEq, Deserialize, Serialize)]
#[serde(default)]
pub struct ObservabilityConfig {
    /// Log level (trace, debug, info, warn, error).
    pub log_level: String,

    pub log_format: LogFormat,

    /// Enable metrics endpoint.
    pub metrics_enabled: bool,

    /// Metrics endpoint bind address.
    pub metrics_address: String,
}

impl Default for ObservabilityConfig {
    fn default() -> Self {
        Self {
            log_level: "info".to_string(),
            log_format: LogFormat::Pretty,
            metrics_enabled: false,
            metrics_address: "127.0.0.1:9090".to_string(),
        }
    }
}

/// Security hardening configuration.
#[derive(Debug, Clone, PartialEq, Deserialize, Serialize)]
#[serde(default)]
pub struct SecurityConfig {
    /// Enable security headers.
    pub enable_headers: bool,
    /// Maximum body size in bytes.
    pub max_body_size: usize,
}

impl Default for SecurityConfig {
    fn default() -> Self {
        Self {
            enable_headers: true,
            max_body_size: 64 * 1024,
        }
    }
}
