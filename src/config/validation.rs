//! Configuration validation.
//!
//! # Responsibilities
//! - Semantic validation (serde handles syntactic)
//! - Validate value ranges (timeouts > 0, pool size >= 1)
//! - Check that addresses parse and credentials are set
//!
//! # Design Decisions
//! - Returns all validation errors, not just first
//! - Validation is pure function: GradebookConfig → Result<(), Vec<ValidationError>>
//! - Runs before config is accepted into the system, including on reload

use std::net::SocketAddr;
use thiserror::Error;

use crate::config::schema::GradebookConfig;

/// A single semantic problem with a configuration.
#[derive(Debug, Clone, PartialEq, Eq, Error)]
pub enum ValidationError {
    #[error("{field}: '{value}' is not a valid socket address")]
    InvalidAddress { field: &'static str, value: String },

    #[error("{0} must not be empty")]
    Empty(&'static str),

    #[error("{0} must be greater than zero")]
    NotPositive(&'static str),

    #[error("session.cookie_name '{0}' contains characters not allowed in a cookie name")]
    InvalidCookieName(String),

    #[error("observability.log_level '{0}' must be one of trace, debug, info, warn, error")]
    InvalidLogLevel(String),
}

const LOG_LEVELS: [&str; 5] = ["trace", "debug", "info", "warn", "error"];

/// Validate a configuration, collecting every problem found.
pub fn validate_config(config: &GradebookConfig) -> Result<(), Vec<ValidationError>> {
    let mut errors = Vec::new();

    if config.listener.bind_address.parse::<SocketAddr>().is_err() {
        errors.push(ValidationError::InvalidAddress {
            field: "listener.bind_address",
            value: config.listener.bind_address.clone(),
        });
    }
    if let Some(tls) = &config.listener.tls {
        if tls.cert_path.trim().is_empty() {
            errors.push(ValidationError::Empty("listener.tls.cert_path"));
        }
        if tls.key_path.trim().is_empty() {
            errors.push(ValidationError::Empty("listener.tls.key_path"));
        }
    }

    if config.database.path.trim().is_empty() {
        errors.push(ValidationError::Empty("database.path"));
    }
    if config.database.pool_size == 0 {
        errors.push(ValidationError::NotPositive("database.pool_size"));
    }

    if config.auth.username.is_empty() {
        errors.push(ValidationError::Empty("auth.username"));
    }
    if config.auth.password.is_empty() {
        errors.push(ValidationError::Empty("auth.password"));
    }

    let cookie_name = &config.session.cookie_name;
    if cookie_name.is_empty() {
        errors.push(ValidationError::Empty("session.cookie_name"));
    } else if !cookie_name
        .chars()
        .all(|c| c.is_ascii_alphanumeric() || c == '_' || c == '-' || c == '.')
    {
        errors.push(ValidationError::InvalidCookieName(cookie_name.clone()));
    }
    if config.session.ttl_secs == 0 {
        errors.push(ValidationError::NotPositive("session.ttl_secs"));
    }
    if config.session.sweep_interval_secs == 0 {
        errors.push(ValidationError::NotPositive("session.sweep_interval_secs"));
    }

    if config.timeouts.request_secs == 0 {
        errors.push(ValidationError::NotPositive("timeouts.request_secs"));
    }

    if !LOG_LEVELS.contains(&config.observability.log_level.to_ascii_lowercase().as_str()) {
        errors.push(ValidationError::InvalidLogLevel(
            config.observability.log_level.clone(),
        ));
    }
    if config.observability.metrics_enabled
        && config.observability.metrics_address.parse::<SocketAddr>().is_err()
    {
        errors.push(ValidationError::InvalidAddress {
            field: "observability.metrics_address",
            value: config.observability.metrics_address.clone(),
        });
    }

    if config.security.max_body_size == 0 {
        errors.push(ValidationError::NotPositive("security.max_body_size"));
    }

    if errors.is_empty() {
        Ok(())
    } else {
        Err(errors)
    }
}
