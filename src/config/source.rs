use toml::{Table, Value};

use super::ConfigError;
use crate::schema::Schema;

/// Raw data contributed by a source, rooted at `path`.
#[derive(Debug, Clone)]
pub struct ConfigEntry {
    pub path: Vec<String>,
    pub value: Value,
}

impl ConfigEntry {
    pub fn root(table: Table) -> Self {
        Self {
            path: Vec::new(),
            value: Value::Table(table),
        }
    }

    pub fn at_path(path: Vec<String>, value: Value) -> Self {
        Self { path, value }
    }
}

/// A provider of raw configuration data.
///
/// Sources receive the schema so they can shape untyped input (such as
/// environment strings) to the declared field types.
pub trait ConfigSource: Send + Sync + std::fmt::Debug {
    fn entries(&self, schema: &Schema) -> Result<Vec<ConfigEntry>, ConfigError>;
}

pub fn merge_at_path(table: &mut Table, path: &[String], value: Value) {
    if path.is_empty() {
        if let Value::Table(overlay) = value {
            deep_merge(table, overlay);
        }
        return;
    }

    let (first, rest) = path.split_first().expect("path is non-empty");

    if rest.is_empty() {
        match (table.get_mut(first), value) {
            (Some(Value::Table(base)), Value::Table(overlay)) => {
                deep_merge(base, overlay);
            }
            (_, value) => {
                table.insert(first.clone(), value);
            }
        }
        return;
    }

    if !matches!(table.get(first), Some(Value::Table(_))) {
        table.insert(first.clone(), Value::Table(Table::new()));
    }

    if let Some(Value::Table(nested)) = table.get_mut(first) {
        merge_at_path(nested, rest, value);
    }
}

/// Merges `overlay` into `base`. Nested tables merge recursively; other
/// values, including arrays, are replaced.
pub fn deep_merge(base: &mut Table, overlay: Table) {
    for (key, value) in overlay {
        match (base.get_mut(&key), value) {
            (Some(Value::Table(base_table)), Value::Table(overlay_table)) => {
                deep_merge(base_table, overlay_table);
            }
            (_, value) => {
                base.insert(key, value);
            }
        }
    }
}

#[cfg(test)]
mod tests {
    use super::*;

    fn table(toml_str: &str) -> Table {
        toml::from_str(toml_str).unwrap()
    }

    #[test]
    fn test_deep_merge_nested_tables() {
        let mut base = table("[app]\ntheme = \"light\"\nrefresh_rate = 5");
        deep_merge(&mut base, table("[app]\ntheme = \"dark\""));

        assert_eq!(base["app"]["theme"].as_str(), Some("dark"));
        assert_eq!(base["app"]["refresh_rate"].as_integer(), Some(5));
    }

    #[test]
    fn test_deep_merge_replaces_arrays() {
        let mut base = table("plugins = [\"a\", \"b\"]");
        deep_merge(&mut base, table("plugins = [\"c\"]"));

        assert_eq!(base["plugins"].as_array().map(Vec::len), Some(1));
    }

    #[test]
    fn test_merge_at_path_creates_tables() {
        let mut base = Table::new();
        merge_at_path(
            &mut base,
            &["app".to_string(), "theme".to_string()],
            Value::String("dark".into()),
        );
        assert_eq!(base["app"]["theme"].as_str(), Some("dark"));
    }

    #[test]
    fn test_merge_at_path_replaces_scalar_parent() {
        let mut base = table("app = 1");
        merge_at_path(
            &mut base,
            &["app".to_string(), "refresh_rate".to_string()],
            Value::Integer(3),
        );
        assert_eq!(base["app"]["refresh_rate"].as_integer(), Some(3));
    }
}
