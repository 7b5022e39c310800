use std::path::{Path, PathBuf};

use serde::de::DeserializeOwned;
use tracing::debug;

use super::env::EnvSource;
use super::file::{parse_source, FileSource};
use super::source::{merge_at_path, ConfigSource};
use super::ConfigError;
use crate::schema::{Schema, ValidatedConfig};

/// Builder for loading configuration against a [`Schema`].
///
/// Sources are merged in registration order, with later sources overriding
/// earlier ones. Nested tables are merged recursively; other values
/// (including arrays) are replaced entirely. The merged data is validated
/// once, after every source has been applied.
///
/// ## Example
///
/// ```no_run
/// use dragon_schema::config::Loader;
/// use dragon_schema::schema::{reference_schema, AppSettings};
///
/// let schema = reference_schema();
/// let settings: AppSettings = Loader::new(&schema)
///     .with_file("config/default.toml", true)
///     .with_file("config/local.toml", false)
///     .with_env("MYAPP", "__")
///     .build()?;
/// # Ok::<(), dragon_schema::ConfigError>(())
/// ```
#[derive(Debug)]
#[must_use = "loaders do nothing until .load() is called"]
pub struct Loader<'s> {
    schema: &'s Schema,
    sources: Vec<Box<dyn ConfigSource>>,
}

impl<'s> Loader<'s> {
    /// Creates a loader with no sources.
    pub fn new(schema: &'s Schema) -> Self {
        Self {
            schema,
            sources: Vec::new(),
        }
    }

    /// Adds a TOML file to be loaded.
    ///
    /// If `required` is `true`, loading fails with [`ConfigError::FileNotFound`]
    /// if the file doesn't exist. Optional files that are missing are skipped.
    pub fn with_file(self, path: impl AsRef<Path>, required: bool) -> Self {
        self.with_source(FileSource::new(path, required))
    }

    /// Loads overrides from environment variables with the given prefix.
    ///
    /// With prefix `MYAPP` and separator `__`, `MYAPP__APP__REFRESH_RATE=30`
    /// sets `app.refresh_rate`. Values are parsed according to the field's
    /// schema type; list fields take comma-separated values.
    pub fn with_env(self, prefix: impl Into<String>, separator: impl Into<String>) -> Self {
        self.with_source(EnvSource::new(prefix, separator))
    }

    /// Adds a custom source.
    pub fn with_source(mut self, source: impl ConfigSource + 'static) -> Self {
        self.sources.push(Box::new(source));
        self
    }

    /// Merges every source and validates the result.
    ///
    /// Fails with [`ConfigError::ValidationError`] carrying the full report if
    /// any field is invalid; a partial config is never returned.
    pub fn load(self) -> Result<ValidatedConfig, ConfigError> {
        let mut merged = toml::Table::new();

        for source in &self.sources {
            for entry in source.entries(self.schema)? {
                merge_at_path(&mut merged, &entry.path, entry.value);
            }
        }
        debug!(sources = self.sources.len(), "Merged configuration sources");

        self.schema
            .validate(&merged)
            .map_err(ConfigError::ValidationError)
    }

    /// Loads, validates, and deserializes into the target type.
    pub fn build<T: DeserializeOwned>(self) -> Result<T, ConfigError> {
        let config = self.load()?;
        config.deserialize().map_err(ConfigError::DeserializeError)
    }
}

/// Loads and validates a single required TOML file.
///
/// Fails with [`ConfigError::FileNotFound`], [`ConfigError::ParseError`]
/// (before any validation), or [`ConfigError::ValidationError`].
pub fn load(schema: &Schema, path: impl AsRef<Path>) -> Result<ValidatedConfig, ConfigError> {
    Loader::new(schema).with_file(path, true).load()
}

/// Parses and validates TOML text held in memory.
pub fn load_str(schema: &Schema, contents: &str) -> Result<ValidatedConfig, ConfigError> {
    let table = parse_source(contents, &PathBuf::from("<string>"))?;
    schema.validate(&table).map_err(ConfigError::ValidationError)
}
