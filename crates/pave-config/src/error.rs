//! Configuration errors.

use crate::validate::ValidationError;
use std::path::PathBuf;
use thiserror::Error;

/// Errors from loading or resolving configuration.
#[derive(Debug, Error)]
pub enum ConfigError {
    #[error("I/O error at {path}: {source}")]
    Io {
        path: PathBuf,
        #[source]
        source: std::io::Error,
    },

    #[error("config file not found: {0}")]
    NotFound(PathBuf),

    #[error("unsupported config format (expected .toml or .json): {0}")]
    UnsupportedFormat(PathBuf),

    #[error("TOML parse error: {0}")]
    Toml(#[from] toml::de::Error),

    #[error("JSON parse error: {0}")]
    Json(#[from] serde_json::Error),

    #[error("invalid configuration: {}", join_errors(.0))]
    Invalid(Vec<ValidationError>),
}

fn join_errors(errors: &[ValidationError]) -> String {
    errors
        .iter()
        .map(ToString::to_string)
        .collect::<Vec<_>>()
        .join("; ")
}

impl From<ConfigError> for pave_common::Error {
    fn from(err: ConfigError) -> Self {
        match err {
            ConfigError::Invalid(_) => pave_common::Error::Validation(err.to_string()),
            other => pave_common::Error::Config(other.to_string()),
        }
    }
}
