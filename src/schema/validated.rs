use serde::de::DeserializeOwned;
use toml::{Table, Value};

use super::field::FieldPath;
use super::validate::{validate_all, ValidationReport};
use super::value::FieldValue;
use super::Schema;

/// A fully validated configuration.
///
/// Every field declared by the schema it was validated against holds a
/// concrete value, in declaration order. Only [`validate_all`] constructs one.
#[derive(Debug, Clone, PartialEq)]
pub struct ValidatedConfig {
    values: Vec<(FieldPath, FieldValue)>,
}

impl ValidatedConfig {
    pub(crate) fn new(values: Vec<(FieldPath, FieldValue)>) -> Self {
        Self { values }
    }

    /// Looks up a value by dotted path, e.g. `app.theme`.
    pub fn get(&self, path: &str) -> Option<&FieldValue> {
        FieldPath::parse(path).and_then(|p| self.get_path(&p))
    }

    pub fn get_path(&self, path: &FieldPath) -> Option<&FieldValue> {
        self.values.iter().find(|(p, _)| p == path).map(|(_, v)| v)
    }

    pub fn iter(&self) -> impl Iterator<Item = (&FieldPath, &FieldValue)> {
        self.values.iter().map(|(p, v)| (p, v))
    }

    pub fn len(&self) -> usize {
        self.values.len()
    }

    pub fn is_empty(&self) -> bool {
        self.values.is_empty()
    }

    /// Converts back into raw TOML data, sections as nested tables.
    pub fn to_table(&self) -> Table {
        let mut table = Table::new();
        for (path, value) in &self.values {
            let target = match &path.section {
                Some(section) => {
                    let entry = table
                        .entry(section.clone())
                        .or_insert(Value::Table(Table::new()));
                    match entry {
                        Value::Table(t) => t,
                        _ => continue,
                    }
                }
                None => &mut table,
            };
            target.insert(path.name.clone(), value.to_toml());
        }
        table
    }

    /// Deserializes the checked values into a typed struct.
    pub fn deserialize<T: DeserializeOwned>(&self) -> Result<T, toml::de::Error> {
        Value::Table(self.to_table()).try_into()
    }

    /// Applies raw overrides on top of these values and revalidates the result.
    pub fn with_overrides(
        &self,
        schema: &Schema,
        overrides: Table,
    ) -> Result<ValidatedConfig, ValidationReport> {
        let mut merged = self.to_table();
        crate::config::deep_merge(&mut merged, overrides);
        validate_all(schema, &merged)
    }
}

#[cfg(test)]
mod tests {
    use super::*;
    use crate::schema::{reference_schema, AppSettings};

    fn sample() -> ValidatedConfig {
        let raw: Table = toml::from_str(
            r#"
            [app]
            theme = "dark"
            refresh_rate = 30
            plugins = ["git", "lint"]
            "#,
        )
        .unwrap();
        reference_schema().validate(&raw).unwrap()
    }

    #[test]
    fn test_get_by_path() {
        let config = sample();
        assert_eq!(config.get("app.theme").and_then(FieldValue::as_str), Some("dark"));
        assert_eq!(config.get("app.refresh_rate").and_then(FieldValue::as_integer), Some(30));
        assert!(config.get("theme").is_none());
        assert!(config.get("app..theme").is_none());
    }

    #[test]
    fn test_deserialize_into_struct() {
        let settings: AppSettings = sample().deserialize().unwrap();
        assert_eq!(settings.app.theme, "dark");
        assert_eq!(settings.app.refresh_rate, 30);
        assert_eq!(settings.app.plugins, vec!["git", "lint"]);
    }

    #[test]
    fn test_with_overrides_revalidates() {
        let schema = reference_schema();
        let config = sample();

        let overrides: Table = toml::from_str("[app]\nrefresh_rate = 60").unwrap();
        let updated = config.with_overrides(&schema, overrides).unwrap();
        assert_eq!(updated.get("app.refresh_rate"), Some(&FieldValue::Integer(60)));
        assert_eq!(updated.get("app.theme"), Some(&FieldValue::from("dark")));

        let bad: Table = toml::from_str("[app]\nrefresh_rate = 0").unwrap();
        assert!(config.with_overrides(&schema, bad).is_err());
    }
}
