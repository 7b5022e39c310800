//! Keeps a documentation block in sync with a configuration.
//!
//! Loads (or receives) a validated config, renders it canonically, and patches
//! the result into a host document between sentinel markers. Every step runs
//! in memory before the single write, so a failure leaves the document as it was.
//!
//! ## Example
//!
//! ```no_run
//! use dragon_schema::docs::{sync_from_file, SyncOptions};
//! use dragon_schema::schema::reference_schema;
//!
//! let outcome = sync_from_file(
//!     &reference_schema(),
//!     "config.toml",
//!     "README.md",
//!     &SyncOptions::default(),
//! )?;
//! println!("{outcome:?}");
//! # Ok::<(), dragon_schema::Error>(())
//! ```

use std::path::Path;

use crate::config::load;
use crate::patch::{check_file, patch_file, Markers, PatchOutcome};
use crate::render::render;
use crate::schema::{Schema, ValidatedConfig};
use crate::Error;

/// How the rendered block is placed in the document.
#[derive(Debug, Clone, PartialEq, Eq)]
pub struct SyncOptions {
    markers: Markers,
    fence: Option<String>,
}

impl Default for SyncOptions {
    fn default() -> Self {
        Self {
            markers: Markers::default(),
            fence: Some("toml".to_string()),
        }
    }
}

impl SyncOptions {
    pub fn with_markers(mut self, markers: Markers) -> Self {
        self.markers = markers;
        self
    }

    /// Wraps the block in a fenced code block tagged with `lang`.
    pub fn with_fence(mut self, lang: impl Into<String>) -> Self {
        self.fence = Some(lang.into());
        self
    }

    /// Inserts the rendered text without a code fence.
    pub fn without_fence(mut self) -> Self {
        self.fence = None;
        self
    }

    pub fn markers(&self) -> &Markers {
        &self.markers
    }
}

/// Renders the text placed between the markers.
pub fn render_block(schema: &Schema, config: &ValidatedConfig, options: &SyncOptions) -> String {
    let rendered = render(schema, config);
    match &options.fence {
        Some(lang) => format!("```{lang}\n{rendered}\n```"),
        None => rendered,
    }
}

/// Patches the managed block of `document` with `config`.
pub fn sync_document(
    schema: &Schema,
    config: &ValidatedConfig,
    document: impl AsRef<Path>,
    options: &SyncOptions,
) -> Result<PatchOutcome, Error> {
    let block = render_block(schema, config, options);
    Ok(patch_file(document, &options.markers, &block)?)
}

/// Loads `config_path`, then patches `document` with its rendered values.
///
/// Nothing is written if loading or validation fails.
pub fn sync_from_file(
    schema: &Schema,
    config_path: impl AsRef<Path>,
    document: impl AsRef<Path>,
    options: &SyncOptions,
) -> Result<PatchOutcome, Error> {
    let config = load(schema, config_path)?;
    sync_document(schema, &config, document, options)
}

/// Patches the managed block of `document` with the schema's defaults.
pub fn sync_defaults(
    schema: &Schema,
    document: impl AsRef<Path>,
    options: &SyncOptions,
) -> Result<PatchOutcome, Error> {
    let config = schema
        .defaults()
        .map_err(crate::ConfigError::ValidationError)?;
    sync_document(schema, &config, document, options)
}

/// Fails with a drift error if the block in `document` doesn't match `config`.
pub fn check_document(
    schema: &Schema,
    config: &ValidatedConfig,
    document: impl AsRef<Path>,
    options: &SyncOptions,
) -> Result<(), Error> {
    let block = render_block(schema, config, options);
    Ok(check_file(document, &options.markers, &block)?)
}
