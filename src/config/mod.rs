//! Configuration loading and validation.

mod builder;
mod env;
mod error;
mod file;
mod source;

pub use builder::{load, load_str, Loader};
pub use env::EnvSource;
pub use error::ConfigError;
pub use file::FileSource;
pub use source::{ConfigEntry, ConfigSource};

pub(crate) use source::deep_merge;

/// Serializes tests that mutate the process environment.
#[cfg(test)]
pub(crate) static ENV_LOCK: std::sync::Mutex<()> = std::sync::Mutex::new(());
