//! The reference application configuration.

use serde::{Deserialize, Serialize};

use super::field::FieldDescriptor;
use super::value::FieldType;
use super::{Schema, Section};

/// Typed view of a config validated against [`reference_schema`].
#[derive(Debug, Clone, PartialEq, Eq, Serialize, Deserialize)]
pub struct AppSettings {
    pub app: AppSection,
}

#[derive(Debug, Clone, PartialEq, Eq, Serialize, Deserialize)]
pub struct AppSection {
    pub theme: String,
    pub refresh_rate: i64,
    pub plugins: Vec<String>,
}

/// Schema for the `[app]` section: `theme`, `refresh_rate`, and `plugins`.
pub fn reference_schema() -> Schema {
    let app = Section::new("app")
        .with_description("Application settings.")
        .field(
            FieldDescriptor::string("theme")
                .with_default("light")
                .with_description("UI color theme."),
        )
        .field(
            FieldDescriptor::integer("refresh_rate")
                .min(1)
                .with_description("Refresh interval in seconds."),
        )
        .field(
            FieldDescriptor::list_of("plugins", FieldType::String)
                .with_default(Vec::<String>::new())
                .with_description("Plugins to load at startup."),
        );

    Schema::builder()
        .section(app)
        .build()
        .expect("reference schema is statically valid")
}
