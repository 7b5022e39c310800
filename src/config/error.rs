use std::path::PathBuf;
use thiserror::Error;

use crate::schema::ValidationReport;

#[derive(Debug, Error)]
#[non_exhaustive]
pub enum ConfigError {
    #[error("required config file not found: {0}")]
    FileNotFound(PathBuf),

    #[error("failed to read config file '{path}': {source}")]
    ReadError {
        path: PathBuf,
        source: std::io::Error,
    },

    #[error("failed to parse config file '{path}': {source}")]
    ParseError {
        path: PathBuf,
        source: toml::de::Error,
    },

    #[error("invalid configuration: {0}")]
    ValidationError(ValidationReport),

    #[error("failed to deserialize config: {0}")]
    DeserializeError(#[from] toml::de::Error),
}

impl ConfigError {
    /// The validation report, if loading failed validation.
    pub fn report(&self) -> Option<&ValidationReport> {
        match self {
            ConfigError::ValidationError(report) => Some(report),
            _ => None,
        }
    }
}
