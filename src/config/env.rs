use toml::Value;
use tracing::debug;

use super::source::{ConfigEntry, ConfigSource};
use super::ConfigError;
use crate::schema::{Constraint, FieldDescriptor, FieldPath, FieldType, Schema};

/// Overrides read from environment variables.
///
/// `PREFIX<sep>SECTION<sep>FIELD` maps to `section.field`, lowercased. Values
/// are shaped by the schema type of the targeted field; strings that don't
/// parse as that type are passed through unchanged so validation reports them.
#[derive(Debug, Clone)]
pub struct EnvSource {
    prefix: String,
    separator: String,
}

impl EnvSource {
    pub fn new(prefix: impl Into<String>, separator: impl Into<String>) -> Self {
        let separator = separator.into();
        assert!(!separator.is_empty(), "separator must not be empty");
        Self {
            prefix: prefix.into(),
            separator,
        }
    }
}

impl ConfigSource for EnvSource {
    fn entries(&self, schema: &Schema) -> Result<Vec<ConfigEntry>, ConfigError> {
        let prefix_with_sep = format!("{}{}", self.prefix, self.separator);
        let mut entries = Vec::new();

        for (key, value) in std::env::vars_os() {
            let (Ok(key), Ok(value)) = (key.into_string(), value.into_string()) else {
                debug!("Skipping environment variable that is not valid Unicode");
                continue;
            };
            if let Some(path_str) = key.strip_prefix(&prefix_with_sep) {
                if path_str.is_empty() {
                    continue;
                }

                let path: Vec<String> = path_str
                    .split(&self.separator)
                    .map(|s| s.to_lowercase())
                    .collect();

                let field = FieldPath::parse(&path.join(".")).and_then(|p| schema.field(&p));
                let coerced_value = match field {
                    Some(field) => coerce_for_field(&value, field),
                    None => Value::String(value),
                };
                entries.push(ConfigEntry::at_path(path, coerced_value));
            }
        }

        Ok(entries)
    }
}

fn coerce_for_field(s: &str, field: &FieldDescriptor) -> Value {
    match field.field_type() {
        FieldType::List => {
            let element = field.constraints().iter().find_map(|c| match c {
                Constraint::ElementType(ty) => Some(ty),
                _ => None,
            });
            let items = s
                .split(',')
                .map(str::trim)
                .filter(|item| !item.is_empty())
                .map(|item| match element {
                    Some(ty) => coerce_scalar(item, ty),
                    None => Value::String(item.to_string()),
                })
                .collect();
            Value::Array(items)
        }
        ty => coerce_scalar(s, ty),
    }
}

fn coerce_scalar(s: &str, ty: &FieldType) -> Value {
    let parsed = match ty {
        FieldType::Integer => s.parse::<i64>().ok().map(Value::Integer),
        FieldType::Float => s.parse::<f64>().ok().map(Value::Float),
        FieldType::Boolean => {
            if s.eq_ignore_ascii_case("true") {
                Some(Value::Boolean(true))
            } else if s.eq_ignore_ascii_case("false") {
                Some(Value::Boolean(false))
            } else {
                None
            }
        }
        FieldType::String | FieldType::List => None,
    };

    parsed.unwrap_or_else(|| Value::String(s.to_string()))
}
