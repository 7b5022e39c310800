use thiserror::Error;

use super::value::{FieldType, FieldValue};
use super::Constraint;

/// Errors raised while constructing a [`Schema`](super::Schema).
#[derive(Debug, Error, PartialEq)]
#[non_exhaustive]
pub enum SchemaError {
    #[error("invalid name '{0}': names must be non-empty and use only A-Z, a-z, 0-9, '_' or '-'")]
    InvalidName(String),

    #[error("description of '{0}' contains a control character other than tab or newline")]
    InvalidDescription(String),

    #[error("duplicate section: {0}")]
    DuplicateSection(String),

    #[error("duplicate field: {0}")]
    DuplicateField(String),

    #[error("field '{field}': section name collides with a root field")]
    SectionFieldCollision { field: String },

    #[error("field '{field}': constraint '{constraint}' does not apply to type {ty}")]
    InapplicableConstraint {
        field: String,
        constraint: Constraint,
        ty: FieldType,
    },

    #[error("field '{field}': default {value} is not of type {expected}")]
    DefaultTypeMismatch {
        field: String,
        expected: FieldType,
        value: FieldValue,
    },

    #[error("field '{field}': default {value} violates constraint '{constraint}'")]
    DefaultViolatesConstraint {
        field: String,
        constraint: Constraint,
        value: FieldValue,
    },
}
