use crate::config::ConfigError;
use crate::patch::PatchError;
use crate::render::TemplateError;
use crate::schema::SchemaError;
use thiserror::Error;

/// Top-level error type for the dragon-schema library.
#[derive(Debug, Error)]
#[non_exhaustive]
pub enum Error {
    #[error("schema error: {0}")]
    Schema(#[from] SchemaError),

    #[error("configuration error: {0}")]
    Config(#[from] ConfigError),

    #[error("template error: {0}")]
    Template(#[from] TemplateError),

    #[error("document patch error: {0}")]
    Patch(#[from] PatchError),
}
