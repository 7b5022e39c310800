use std::cmp::Ordering;
use std::fmt;

use super::value::{FieldType, FieldValue};

/// A numeric bound, kept in the precision it was declared with.
#[derive(Debug, Clone, Copy, PartialEq)]
pub enum Bound {
    Integer(i64),
    Float(f64),
}

impl Bound {
    /// Compares a numeric field value against this bound.
    ///
    /// Returns `None` for non-numeric values and NaN.
    fn compare(&self, value: &FieldValue) -> Option<Ordering> {
        match (value, self) {
            (FieldValue::Integer(v), Bound::Integer(b)) => Some(v.cmp(b)),
            (FieldValue::Integer(v), Bound::Float(b)) => (*v as f64).partial_cmp(b),
            (FieldValue::Float(v), Bound::Integer(b)) => v.partial_cmp(&(*b as f64)),
            (FieldValue::Float(v), Bound::Float(b)) => v.partial_cmp(b),
            _ => None,
        }
    }
}

impl fmt::Display for Bound {
    fn fmt(&self, f: &mut fmt::Formatter<'_>) -> fmt::Result {
        match self {
            Bound::Integer(i) => write!(f, "{i}"),
            Bound::Float(x) => write!(f, "{x}"),
        }
    }
}

impl From<i64> for Bound {
    fn from(i: i64) -> Self {
        Bound::Integer(i)
    }
}

impl From<f64> for Bound {
    fn from(f: f64) -> Self {
        Bound::Float(f)
    }
}

/// A predicate a field value must satisfy once its type is known to match.
#[derive(Debug, Clone, PartialEq)]
pub enum Constraint {
    /// Inclusive lower bound for numeric fields.
    Min(Bound),
    /// Inclusive upper bound for numeric fields.
    Max(Bound),
    /// The value must equal one of the listed values.
    OneOf(Vec<FieldValue>),
    /// Strings and lists must not be empty.
    NonEmpty,
    /// Every element of a list must have the given type.
    ElementType(FieldType),
}

impl Constraint {
    /// Returns true if this constraint can be declared on a field of type `ty`.
    pub fn applies_to(&self, ty: &FieldType) -> bool {
        match self {
            Constraint::Min(_) | Constraint::Max(_) => ty.is_numeric(),
            Constraint::OneOf(allowed) => {
                *ty != FieldType::List
                    && !allowed.is_empty()
                    && allowed.iter().all(|v| ty.accepts(&v.field_type()))
            }
            Constraint::NonEmpty => matches!(ty, FieldType::String | FieldType::List),
            Constraint::ElementType(_) => *ty == FieldType::List,
        }
    }

    /// Checks an already type-checked value.
    pub fn check(&self, value: &FieldValue) -> bool {
        match self {
            Constraint::Min(bound) => {
                matches!(bound.compare(value), Some(Ordering::Greater | Ordering::Equal))
            }
            Constraint::Max(bound) => {
                matches!(bound.compare(value), Some(Ordering::Less | Ordering::Equal))
            }
            Constraint::OneOf(allowed) => allowed.iter().any(|a| numeric_eq(a, value)),
            Constraint::NonEmpty => match value {
                FieldValue::String(s) => !s.is_empty(),
                FieldValue::List(items) => !items.is_empty(),
                _ => true,
            },
            Constraint::ElementType(ty) => value
                .as_list()
                .map(|items| items.iter().all(|item| *ty == item.field_type()))
                .unwrap_or(false),
        }
    }
}

/// Equality that treats an integer allowed value as matching a widened float.
fn numeric_eq(allowed: &FieldValue, value: &FieldValue) -> bool {
    match (allowed, value) {
        (FieldValue::Integer(a), FieldValue::Float(v)) => (*a as f64) == *v,
        _ => allowed == value,
    }
}

impl fmt::Display for Constraint {
    fn fmt(&self, f: &mut fmt::Formatter<'_>) -> fmt::Result {
        match self {
            Constraint::Min(b) => write!(f, ">= {b}"),
            Constraint::Max(b) => write!(f, "<= {b}"),
            Constraint::OneOf(allowed) => {
                let items: Vec<String> = allowed.iter().map(ToString::to_string).collect();
                write!(f, "one of [{}]", items.join(", "))
            }
            Constraint::NonEmpty => f.write_str("non-empty"),
            Constraint::ElementType(ty) => write!(f, "elements of type {ty}"),
        }
    }
}

/// Declaration of a single configuration field.
///
/// A field without a default is required.
#[derive(Debug, Clone, PartialEq)]
pub struct FieldDescriptor {
    pub(crate) name: String,
    pub(crate) ty: FieldType,
    pub(crate) default: Option<FieldValue>,
    pub(crate) constraints: Vec<Constraint>,
    pub(crate) description: String,
}

impl FieldDescriptor {
    pub fn new(name: impl Into<String>, ty: FieldType) -> Self {
        Self {
            name: name.into(),
            ty,
            default: None,
            constraints: Vec::new(),
            description: String::new(),
        }
    }

    pub fn string(name: impl Into<String>) -> Self {
        Self::new(name, FieldType::String)
    }

    pub fn integer(name: impl Into<String>) -> Self {
        Self::new(name, FieldType::Integer)
    }

    pub fn float(name: impl Into<String>) -> Self {
        Self::new(name, FieldType::Float)
    }

    pub fn boolean(name: impl Into<String>) -> Self {
        Self::new(name, FieldType::Boolean)
    }

    /// A list field whose elements must all be of type `element`.
    pub fn list_of(name: impl Into<String>, element: FieldType) -> Self {
        Self::new(name, FieldType::List).with_constraint(Constraint::ElementType(element))
    }

    pub fn with_default(mut self, value: impl Into<FieldValue>) -> Self {
        self.default = Some(value.into());
        self
    }

    pub fn with_constraint(mut self, constraint: Constraint) -> Self {
        self.constraints.push(constraint);
        self
    }

    pub fn min(self, bound: impl Into<Bound>) -> Self {
        self.with_constraint(Constraint::Min(bound.into()))
    }

    pub fn max(self, bound: impl Into<Bound>) -> Self {
        self.with_constraint(Constraint::Max(bound.into()))
    }

    pub fn one_of<V: Into<FieldValue>>(self, allowed: impl IntoIterator<Item = V>) -> Self {
        self.with_constraint(Constraint::OneOf(
            allowed.into_iter().map(Into::into).collect(),
        ))
    }

    pub fn non_empty(self) -> Self {
        self.with_constraint(Constraint::NonEmpty)
    }

    pub fn with_description(mut self, description: impl Into<String>) -> Self {
        self.description = description.into();
        self
    }

    pub fn name(&self) -> &str {
        &self.name
    }

    pub fn field_type(&self) -> &FieldType {
        &self.ty
    }

    pub fn default_value(&self) -> Option<&FieldValue> {
        self.default.as_ref()
    }

    pub fn constraints(&self) -> &[Constraint] {
        &self.constraints
    }

    pub fn description(&self) -> &str {
        &self.description
    }

    pub fn is_required(&self) -> bool {
        self.default.is_none()
    }
}

/// Location of a field: an optional section name plus the field name.
#[derive(Debug, Clone, PartialEq, Eq, Hash, PartialOrd, Ord)]
pub struct FieldPath {
    pub section: Option<String>,
    pub name: String,
}

impl FieldPath {
    pub fn new(section: Option<&str>, name: impl Into<String>) -> Self {
        Self {
            section: section.map(str::to_string),
            name: name.into(),
        }
    }

    /// Parses a dotted path such as `app.theme` or a bare root field `theme`.
    ///
    /// Returns `None` for empty segments or more than one dot.
    pub fn parse(path: &str) -> Option<Self> {
        let parts: Vec<&str> = path.split('.').collect();
        match parts.as_slice() {
            [name] if !name.is_empty() => Some(Self::new(None, *name)),
            [section, name] if !section.is_empty() && !name.is_empty() => {
                Some(Self::new(Some(section), *name))
            }
            _ => None,
        }
    }
}

impl fmt::Display for FieldPath {
    fn fmt(&self, f: &mut fmt::Formatter<'_>) -> fmt::Result {
        match &self.section {
            Some(section) => write!(f, "{section}.{}", self.name),
            None => f.write_str(&self.name),
        }
    }
}
