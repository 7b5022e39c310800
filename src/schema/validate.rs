//! Exhaustive validation of raw TOML data against a [`Schema`].
//!
//! Every field is evaluated even when earlier fields fail, so a single report
//! lists every problem. Violations appear in schema declaration order.

use std::fmt;

use thiserror::Error;
use toml::{Table, Value};
use tracing::{debug, warn};

use super::field::{Constraint, FieldDescriptor, FieldPath};
use super::validated::ValidatedConfig;
use super::value::FieldValue;
use super::Schema;

/// A single reason a field was rejected.
#[derive(Debug, Clone, PartialEq, Error)]
#[non_exhaustive]
pub enum Violation {
    #[error("{path}: missing required field")]
    MissingField { path: FieldPath },

    #[error("{path}: expected {expected}, found {actual} {value}")]
    TypeMismatch {
        path: FieldPath,
        expected: String,
        actual: String,
        value: String,
    },

    #[error("{path}: value {actual} violates constraint '{constraint}'")]
    ConstraintViolation {
        path: FieldPath,
        constraint: Constraint,
        actual: FieldValue,
    },
}

impl Violation {
    /// The field (or section) the violation refers to.
    pub fn path(&self) -> &FieldPath {
        match self {
            Violation::MissingField { path }
            | Violation::TypeMismatch { path, .. }
            | Violation::ConstraintViolation { path, .. } => path,
        }
    }

    fn type_mismatch(path: &FieldPath, expected: impl ToString, raw: &Value) -> Self {
        Violation::TypeMismatch {
            path: path.clone(),
            expected: expected.to_string(),
            actual: match raw {
                Value::Float(f) if f.is_nan() => "NaN".to_string(),
                Value::Array(items) if FieldValue::from_toml(raw).is_some_and(|v| v.contains_nan()) => {
                    format!("array of {} with NaN", items.len())
                }
                _ => raw.type_str().to_string(),
            },
            value: raw.to_string(),
        }
    }
}

/// Ordered list of every violation found in one validation pass.
///
/// Never empty when returned from [`validate_all`].
#[derive(Debug, Clone, PartialEq, Default)]
pub struct ValidationReport {
    violations: Vec<Violation>,
}

impl ValidationReport {
    pub fn violations(&self) -> &[Violation] {
        &self.violations
    }

    pub fn len(&self) -> usize {
        self.violations.len()
    }

    pub fn is_empty(&self) -> bool {
        self.violations.is_empty()
    }

    pub fn iter(&self) -> std::slice::Iter<'_, Violation> {
        self.violations.iter()
    }
}

impl<'a> IntoIterator for &'a ValidationReport {
    type Item = &'a Violation;
    type IntoIter = std::slice::Iter<'a, Violation>;

    fn into_iter(self) -> Self::IntoIter {
        self.iter()
    }
}

impl fmt::Display for ValidationReport {
    fn fmt(&self, f: &mut fmt::Formatter<'_>) -> fmt::Result {
        write!(f, "{} violation(s)", self.violations.len())?;
        for violation in &self.violations {
            write!(f, "\n  - {violation}")?;
        }
        Ok(())
    }
}

/// Validates one field's raw value.
///
/// A missing value falls back to the field's default. A type mismatch stops
/// evaluation of this field; otherwise every failing constraint is reported.
pub fn validate_field(
    path: &FieldPath,
    field: &FieldDescriptor,
    raw: Option<&Value>,
) -> Result<FieldValue, Vec<Violation>> {
    let Some(raw) = raw else {
        return match &field.default {
            Some(default) => Ok(default.clone()),
            None => Err(vec![Violation::MissingField { path: path.clone() }]),
        };
    };

    let value = FieldValue::from_toml(raw)
        .and_then(|v| v.coerce_to(&field.ty))
        .ok_or_else(|| vec![Violation::type_mismatch(path, &field.ty, raw)])?;

    let failed: Vec<Violation> = field
        .constraints
        .iter()
        .filter(|c| !c.check(&value))
        .map(|c| Violation::ConstraintViolation {
            path: path.clone(),
            constraint: c.clone(),
            actual: value.clone(),
        })
        .collect();

    if failed.is_empty() {
        Ok(value)
    } else {
        Err(failed)
    }
}

/// Validates a whole raw mapping, producing either a complete config or a
/// report of every violation. Never both, never a partial config.
pub fn validate_all(schema: &Schema, raw: &Table) -> Result<ValidatedConfig, ValidationReport> {
    let mut values = Vec::new();
    let mut violations = Vec::new();

    let mut collect = |path: FieldPath, result: Result<FieldValue, Vec<Violation>>| match result {
        Ok(value) => values.push((path, value)),
        Err(errs) => violations.extend(errs),
    };

    for field in schema.root_fields() {
        let path = FieldPath::new(None, &field.name);
        let result = validate_field(&path, field, raw.get(&field.name));
        collect(path, result);
    }

    for section in schema.sections() {
        let table = match raw.get(section.name()) {
            None => None,
            Some(Value::Table(table)) => Some(table),
            Some(other) => {
                let path = FieldPath::new(None, section.name());
                collect(path.clone(), Err(vec![Violation::type_mismatch(&path, "table", other)]));
                continue;
            }
        };

        for field in section.fields() {
            let path = FieldPath::new(Some(section.name()), &field.name);
            let result = validate_field(&path, field, table.and_then(|t| t.get(&field.name)));
            collect(path, result);
        }

        if let Some(table) = table {
            warn_unknown_keys(table, Some(section.name()), |key| {
                section.fields().iter().any(|f| f.name == key)
            });
        }
    }

    warn_unknown_keys(raw, None, |key| {
        schema.root_fields().iter().any(|f| f.name == key) || schema.section(key).is_some()
    });

    if violations.is_empty() {
        Ok(ValidatedConfig::new(values))
    } else {
        debug!(violations = violations.len(), "Configuration failed validation");
        Err(ValidationReport { violations })
    }
}

fn warn_unknown_keys(table: &Table, section: Option<&str>, known: impl Fn(&str) -> bool) {
    for key in table.keys().filter(|k| !known(k)) {
        let path = FieldPath::new(section, key.as_str());
        warn!(key = %path, "Ignoring unknown configuration key");
    }
}
