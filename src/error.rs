use std::path::PathBuf;
use thiserror::Error;

#[derive(Debug, Error)]
pub enum SchemafigError {
    #[error("Config file not found: {path}")]
    NotFound { path: PathBuf },

    #[error("Failed to read {path}: {source}")]
    IoError {
        path: PathBuf,
        source: std::io::Error,
    },

    #[error("Failed to parse {path}: {reason}")]
    ParseError { path: PathBuf, reason: String },

    #[error("No parser registered for extension '{extension}' ({path})")]
    UnsupportedFormat { extension: String, path: PathBuf },

    #[error("Unknown key '{key}' in {path} (line {line})")]
    UnknownKey {
        key: String,
        path: PathBuf,
        line: usize,
    },

    #[error("Unknown keys in config file: {}", join(.0))]
    UnknownKeys(Vec<SchemafigError>),

    #[error("Missing required field '{key}'")]
    MissingField { key: String },

    #[error("Invalid value for '{key}': {reason}")]
    InvalidValue { key: String, reason: String },

    #[error("Invalid schema: {0}")]
    InvalidSchema(String),

    #[error("Schema validation failed: {}", join(.0))]
    SchemaValidation(Vec<SchemafigError>),

    #[error("Configuration error: {0}")]
    ConfigError(#[from] confique::Error),
}

/// Coarse classification of a [`SchemafigError`].
#[derive(Debug, Clone, Copy, PartialEq, Eq)]
pub enum ErrorKind {
    /// The config file does not exist.
    NotFound,
    /// The file could not be parsed, or its values do not satisfy the schema.
    Invalid,
    /// The file exists but reading it failed.
    Io,
}

impl SchemafigError {
    pub fn kind(&self) -> ErrorKind {
        match self {
            SchemafigError::NotFound { .. } => ErrorKind::NotFound,
            SchemafigError::IoError { .. } => ErrorKind::Io,
            _ => ErrorKind::Invalid,
        }
    }

    /// Keys named by a validation failure, in report order.
    pub fn field_keys(&self) -> Vec<&str> {
        match self {
            SchemafigError::MissingField { key }
            | SchemafigError::InvalidValue { key, .. }
            | SchemafigError::UnknownKey { key, .. } => vec![key.as_str()],
            SchemafigError::SchemaValidation(errors) | SchemafigError::UnknownKeys(errors) => {
                errors.iter().flat_map(|e| e.field_keys()).collect()
            }
            _ => vec![],
        }
    }
}

fn join(errors: &[SchemafigError]) -> String {
    errors
        .iter()
        .map(|e| e.to_string())
        .collect::<Vec<_>>()
        .join("; ")
}

#[cfg(test)]
mod tests {
    use super::*;

    #[test]
    fn not_found_includes_path() {
        let err = SchemafigError::NotFound {
            path: "/srv/app/environments/local.toml".into(),
        };
        let msg = err.to_string();
        assert!(msg.contains("/srv/app/environments/local.toml"));
        assert_eq!(err.kind(), ErrorKind::NotFound);
    }

    #[test]
    fn unknown_key_formats_correctly() {
        let err = SchemafigError::UnknownKey {
            key: "typo_key".into(),
            path: "/home/user/app/config.toml".into(),
            line: 42,
        };
        let msg = err.to_string();
        assert!(msg.contains("typo_key"));
        assert!(msg.contains("config.toml"));
        assert!(msg.contains("42"));
    }

    #[test]
    fn schema_validation_lists_every_field() {
        let err = SchemafigError::SchemaValidation(vec![
            SchemafigError::MissingField {
                key: "metrics.host".into(),
            },
            SchemafigError::InvalidValue {
                key: "metrics.port".into(),
                reason: "must be a number".into(),
            },
        ]);
        let msg = err.to_string();
        assert!(msg.contains("metrics.host"));
        assert!(msg.contains("metrics.port"));
        assert_eq!(err.kind(), ErrorKind::Invalid);
        assert_eq!(err.field_keys(), vec!["metrics.host", "metrics.port"]);
    }

    #[test]
    fn io_error_kind() {
        let err = SchemafigError::IoError {
            path: "/x".into(),
            source: std::io::Error::other("boom"),
        };
        assert_eq!(err.kind(), ErrorKind::Io);
    }
}
