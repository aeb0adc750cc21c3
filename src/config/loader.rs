//! Configuration loading from disk.

use std::fs;
use std::path::Path;
use thiserror::Error;

use crate::config::schema::GradebookConfig;
use crate::config::validation::{validate_config, ValidationError};

/// Error type for configuration loading.
#[derive(Debug, Error)]
pub enum ConfigError {
    #[error("IO error: {0}")]
    Io(#[from] std::io::Error),

    #[error("Parse error: {0}")]
    Parse(#[from] toml::de::Error),

    #[error("Validation failed: {}", join_errors(.0))]
    Validation(Vec<ValidationError>),
}

fn join_errors(errors: &[ValidationError]) -> String {
    errors
        .iter()
        .map(ToString::to_string)
        .collect::<Vec<_>>()
        .join(", ")
}

/// Command-line values that take precedence over the file, on startup and on
/// every reload.
#[derive(Debug, Clone, Default, PartialEq, Eq)]
pub struct Overrides {
    pub bind_address: Option<String>,
    pub database_path: Option<String>,
}

impl Overrides {
    pub fn apply(&self, config: &mut GradebookConfig) {
        if let Some(bind) = &self.bind_address {
            config.listener.bind_address = bind.clone();
        }
        if let Some(path) = &self.database_path {
            config.database.path = path.clone();
        }
    }
}

/// Load and validate configuration from a TOML file.
pub fn load_config(path: &Path) -> Result<GradebookConfig, ConfigError> {
    load_config_with(Some(path), &Overrides::default())
}

/// Load the file (or defaults without one), apply `overrides`, then validate.
pub fn load_config_with(
    path: Option<&Path>,
    overrides: &Overrides,
) -> Result<GradebookConfig, ConfigError> {
    let mut config: GradebookConfig = match path {
        Some(path) => toml::from_str(&fs::read_to_string(path)?)?,
        None => GradebookConfig::default(),
    };
    overrides.apply(&mut config);
    validate_config(&config).map_err(ConfigError::Validation)?;
    Ok(config)
}

/// Parse and validate configuration from TOML text.
pub fn parse_config(content: &str) -> Result<GradebookConfig, ConfigError> {
    let config: GradebookConfig = toml::from_str(content)?;
    validate_config(&config).map_err(ConfigError::Validation)?;
    Ok(config)
}

#[cfg(test)]
mod tests {
    use super::*;
    use std::io::Write;

    #[test]
    fn test_load_from_file() {
        let mut file = tempfile::NamedTempFile::new().unwrap();
        writeln!(
            file,
            r#"
            [listener]
            bind_address = "127.0.0.1:8088"

            [auth]
            username = "teacher"
            password = "chalk"
            "#
        )
        .unwrap();

        let config = load_config(file.path()).unwrap();
        assert_eq!(config.listener.bind_address, "127.0.0.1:8088");
        assert_eq!(config.auth.username, "teacher");
        assert_eq!(config.database.pool_size, 8);
    }

    #[test]
    fn test_invalid_values_are_reported() {
        let err = parse_config("[database]\npool_size = 0\n").unwrap_err();
        assert!(matches!(err, ConfigError::Validation(ref errors) if errors.len() == 1));
        assert_eq!(
            err.to_string(),
            "Validation failed: database.pool_size must be greater than zero"
        );
    }

    #[test]
    fn test_syntax_error() {
        assert!(matches!(parse_config("[listener"), Err(ConfigError::Parse(_))));
    }

    #[test]
    fn test_missing_file() {
        let err = load_config(Path::new("/definitely/not/here.toml")).unwrap_err();
        assert!(matches!(err, ConfigError::Io(_)));
    }

    #[test]
    fn test_overrides_win_over_file() {
        let mut file = tempfile::NamedTempFile::new().unwrap();
        writeln!(
            file,
            r#"
            [listener]
            bind_address = "127.0.0.1:8088"

            [database]
            path = "from-file.db"
            "#
        )
        .unwrap();

        let overrides = Overrides {
            bind_address: Some("0.0.0.0:8000".into()),
            database_path: None,
        };
        let config = load_config_with(Some(file.path()), &overrides).unwrap();
        assert_eq!(config.listener.bind_address, "0.0.0.0:8000");
        assert_eq!(config.database.path, "from-file.db");

        let reloaded = load_config_with(Some(file.path()), &overrides).unwrap();
        assert!(config.merge_reloadable(&reloaded).1.is_empty());
    }

    #[test]
    fn test_overrides_are_validated() {
        let overrides = Overrides {
            bind_address: Some("nowhere".into()),
            database_path: None,
        };
        assert!(matches!(
            load_config_with(None, &overrides),
            Err(ConfigError::Validation(_))
        ));
    }
}
