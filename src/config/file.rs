//! File-based configuration source.

use std::path::{Path, PathBuf};

use tracing::debug;

use super::source::{ConfigEntry, ConfigSource};
use super::ConfigError;
use crate::schema::Schema;

/// A configuration source that loads from a TOML file.
///
/// Files can be marked as required or optional. Required files that don't exist
/// cause an error; optional files that don't exist are silently skipped.
#[derive(Debug, Clone)]
pub struct FileSource {
    path: PathBuf,
    required: bool,
}

impl FileSource {
    /// Creates a new file source.
    ///
    /// If `required` is true, loading will fail if the file doesn't exist.
    pub fn new(path: impl AsRef<Path>, required: bool) -> Self {
        Self {
            path: path.as_ref().to_path_buf(),
            required,
        }
    }
}

impl ConfigSource for FileSource {
    fn entries(&self, _schema: &Schema) -> Result<Vec<ConfigEntry>, ConfigError> {
        match load_config_file(&self.path, self.required)? {
            Some(table) => Ok(vec![ConfigEntry::root(table)]),
            None => Ok(vec![]),
        }
    }
}

/// Loads and parses a TOML config file. The file is only read, never modified.
///
/// Returns `Ok(None)` if the file doesn't exist and `required` is false.
fn load_config_file(path: &Path, required: bool) -> Result<Option<toml::Table>, ConfigError> {
    match std::fs::read_to_string(path) {
        Ok(contents) => {
            let table = parse_source(&contents, path)?;
            debug!(path = %path.display(), keys = table.len(), "Loaded config file");
            Ok(Some(table))
        }
        Err(e) if e.kind() == std::io::ErrorKind::NotFound => {
            if required {
                Err(ConfigError::FileNotFound(path.to_path_buf()))
            } else {
                debug!(path = %path.display(), "Optional config file not found, skipping");
                Ok(None)
            }
        }
        Err(e) => Err(ConfigError::ReadError {
            path: path.to_path_buf(),
            source: e,
        }),
    }
}

/// Parses TOML text, attributing syntax errors to `path`.
pub(crate) fn parse_source(contents: &str, path: &Path) -> Result<toml::Table, ConfigError> {
    toml::from_str(contents).map_err(|e| ConfigError::ParseError {
        path: path.to_path_buf(),
        source: e,
    })
}
