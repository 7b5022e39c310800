//! Typed values held by a validated configuration.

use std::fmt;

use toml::Value;

/// The declared type of a schema field.
#[derive(Debug, Clone, PartialEq, Eq)]
pub enum FieldType {
    String,
    Integer,
    Float,
    Boolean,
    List,
}

impl FieldType {
    /// Returns true for the numeric types that accept bound constraints.
    pub fn is_numeric(&self) -> bool {
        matches!(self, FieldType::Integer | FieldType::Float)
    }

    /// Returns true if a value of type `actual` is accepted for this type.
    ///
    /// Integers widen into float fields; everything else must match exactly.
    pub fn accepts(&self, actual: &FieldType) -> bool {
        self == actual || (*self == FieldType::Float && *actual == FieldType::Integer)
    }
}

impl fmt::Display for FieldType {
    fn fmt(&self, f: &mut fmt::Formatter<'_>) -> fmt::Result {
        let name = match self {
            FieldType::String => "string",
            FieldType::Integer => "integer",
            FieldType::Float => "float",
            FieldType::Boolean => "boolean",
            FieldType::List => "list",
        };
        f.write_str(name)
    }
}

/// A concrete, type-checked field value.
#[derive(Debug, Clone, PartialEq)]
pub enum FieldValue {
    String(String),
    Integer(i64),
    Float(f64),
    Boolean(bool),
    List(Vec<FieldValue>),
}

impl FieldValue {
    pub fn field_type(&self) -> FieldType {
        match self {
            FieldValue::String(_) => FieldType::String,
            FieldValue::Integer(_) => FieldType::Integer,
            FieldValue::Float(_) => FieldType::Float,
            FieldValue::Boolean(_) => FieldType::Boolean,
            FieldValue::List(_) => FieldType::List,
        }
    }

    pub fn as_str(&self) -> Option<&str> {
        match self {
            FieldValue::String(s) => Some(s),
            _ => None,
        }
    }

    pub fn as_integer(&self) -> Option<i64> {
        match self {
            FieldValue::Integer(i) => Some(*i),
            _ => None,
        }
    }

    pub fn as_float(&self) -> Option<f64> {
        match self {
            FieldValue::Float(f) => Some(*f),
            FieldValue::Integer(i) => Some(*i as f64),
            _ => None,
        }
    }

    pub fn as_bool(&self) -> Option<bool> {
        match self {
            FieldValue::Boolean(b) => Some(*b),
            _ => None,
        }
    }

    pub fn as_list(&self) -> Option<&[FieldValue]> {
        match self {
            FieldValue::List(items) => Some(items),
            _ => None,
        }
    }

    /// Returns true if this value is NaN or a list containing one.
    pub fn contains_nan(&self) -> bool {
        match self {
            FieldValue::Float(f) => f.is_nan(),
            FieldValue::List(items) => items.iter().any(FieldValue::contains_nan),
            _ => false,
        }
    }

    /// Converts the value into the shape required by `ty`, widening integers
    /// into floats. Returns `None` if the types are incompatible.
    ///
    /// NaN is never accepted: it compares unequal to itself, so a config
    /// holding one could not reload to an equal config.
    pub(crate) fn coerce_to(self, ty: &FieldType) -> Option<FieldValue> {
        if self.contains_nan() {
            return None;
        }
        match (self, ty) {
            (FieldValue::Integer(i), FieldType::Float) => Some(FieldValue::Float(i as f64)),
            (value, ty) if value.field_type() == *ty => Some(value),
            _ => None,
        }
    }

    /// Converts a raw TOML value. Datetimes, tables, and arrays containing
    /// them have no field representation and yield `None`.
    pub fn from_toml(value: &Value) -> Option<FieldValue> {
        match value {
            Value::String(s) => Some(FieldValue::String(s.clone())),
            Value::Integer(i) => Some(FieldValue::Integer(*i)),
            Value::Float(f) => Some(FieldValue::Float(*f)),
            Value::Boolean(b) => Some(FieldValue::Boolean(*b)),
            Value::Array(items) => items
                .iter()
                .map(FieldValue::from_toml)
                .collect::<Option<Vec<_>>>()
                .map(FieldValue::List),
            Value::Datetime(_) | Value::Table(_) => None,
        }
    }

    pub fn to_toml(&self) -> Value {
        match self {
            FieldValue::String(s) => Value::String(s.clone()),
            FieldValue::Integer(i) => Value::Integer(*i),
            FieldValue::Float(f) => Value::Float(*f),
            FieldValue::Boolean(b) => Value::Boolean(*b),
            FieldValue::List(items) => Value::Array(items.iter().map(FieldValue::to_toml).collect()),
        }
    }
}

impl fmt::Display for FieldValue {
    fn fmt(&self, f: &mut fmt::Formatter<'_>) -> fmt::Result {
        f.write_str(&crate::render::format_value(self))
    }
}

impl From<&str> for FieldValue {
    fn from(s: &str) -> Self {
        FieldValue::String(s.to_string())
    }
}

impl From<String> for FieldValue {
    fn from(s: String) -> Self {
        FieldValue::String(s)
    }
}

impl From<i64> for FieldValue {
    fn from(i: i64) -> Self {
        FieldValue::Integer(i)
    }
}

impl From<f64> for FieldValue {
    fn from(f: f64) -> Self {
        FieldValue::Float(f)
    }
}

impl From<bool> for FieldValue {
    fn from(b: bool) -> Self {
        FieldValue::Boolean(b)
    }
}

impl<T: Into<FieldValue>> From<Vec<T>> for FieldValue {
    fn from(items: Vec<T>) -> Self {
        FieldValue::List(items.into_iter().map(Into::into).collect())
    }
}

#[cfg(test)]
mod tests {
    use super::*;

    #[test]
    fn test_from_toml_scalars_and_lists() {
        let table: toml::Table = toml::from_str(
            r#"
            name = "x"
            count = 3
            ratio = 0.5
            on = true
            tags = ["a", "b"]
            "#,
        )
        .unwrap();

        assert_eq!(FieldValue::from_toml(&table["name"]), Some("x".into()));
        assert_eq!(FieldValue::from_toml(&table["count"]), Some(3i64.into()));
        assert_eq!(FieldValue::from_toml(&table["ratio"]), Some(0.5f64.into()));
        assert_eq!(FieldValue::from_toml(&table["on"]), Some(true.into()));
        assert_eq!(
            FieldValue::from_toml(&table["tags"]),
            Some(vec!["a", "b"].into())
        );
    }

    #[test]
    fn test_from_toml_rejects_tables_and_datetimes() {
        let table: toml::Table = toml::from_str(
            r#"
            when = 1979-05-27T07:32:00Z
            nested = [{ a = 1 }]
            [inner]
            x = 1
            "#,
        )
        .unwrap();

        assert_eq!(FieldValue::from_toml(&table["when"]), None);
        assert_eq!(FieldValue::from_toml(&table["nested"]), None);
        assert_eq!(FieldValue::from_toml(&table["inner"]), None);
    }

    #[test]
    fn test_integer_widens_to_float() {
        assert!(FieldType::Float.accepts(&FieldType::Integer));
        assert!(!FieldType::Integer.accepts(&FieldType::Float));
        assert_eq!(
            FieldValue::Integer(2).coerce_to(&FieldType::Float),
            Some(FieldValue::Float(2.0))
        );
        assert_eq!(FieldValue::Boolean(true).coerce_to(&FieldType::String), None);
    }

    #[test]
    fn test_nan_never_coerces() {
        assert_eq!(FieldValue::Float(f64::NAN).coerce_to(&FieldType::Float), None);
        assert_eq!(
            FieldValue::List(vec![FieldValue::Float(f64::NAN)]).coerce_to(&FieldType::List),
            None
        );
        assert_eq!(
            FieldValue::Float(f64::INFINITY).coerce_to(&FieldType::Float),
            Some(FieldValue::Float(f64::INFINITY))
        );
    }
}
