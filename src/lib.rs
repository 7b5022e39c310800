pub mod config;
pub mod docs;
mod error;
pub mod patch;
pub mod render;
pub mod schema;

pub use config::{load, ConfigError, Loader};
pub use error::Error;
pub use patch::{patch, PatchError};
pub use render::render;
pub use schema::{Schema, ValidatedConfig, ValidationReport};
