//! Declarative configuration schemas.
//!
//! A [`Schema`] is an ordered set of [`FieldDescriptor`]s, either at the root
//! or grouped into named [`Section`]s that map to TOML tables. Schemas are
//! checked once at construction and immutable afterwards, so every default is
//! known to satisfy its own field's type and constraints.
//!
//! ## Example
//!
//! ```
//! use dragon_schema::schema::{FieldDescriptor, FieldType, Schema, Section};
//!
//! let schema = Schema::builder()
//!     .section(
//!         Section::new("server")
//!             .field(FieldDescriptor::string("host").with_default("localhost"))
//!             .field(FieldDescriptor::integer("port").min(1).max(65535)),
//!     )
//!     .build()?;
//!
//! let raw: toml::Table = toml::from_str("[server]\nport = 8080")?;
//! let config = schema.validate(&raw).unwrap();
//! assert_eq!(config.get("server.host").and_then(|v| v.as_str()), Some("localhost"));
//! # Ok::<(), Box<dyn std::error::Error>>(())
//! ```

mod error;
mod field;
mod reference;
mod validate;
mod validated;
mod value;

use std::collections::HashSet;

pub use error::SchemaError;
pub use field::{Bound, Constraint, FieldDescriptor, FieldPath};
pub use reference::{reference_schema, AppSection, AppSettings};
pub use validate::{validate_all, validate_field, ValidationReport, Violation};
pub use validated::ValidatedConfig;
pub use value::{FieldType, FieldValue};

/// A named group of fields, rendered and parsed as a TOML table.
#[derive(Debug, Clone, PartialEq)]
pub struct Section {
    name: String,
    description: String,
    fields: Vec<FieldDescriptor>,
}

impl Section {
    pub fn new(name: impl Into<String>) -> Self {
        Self {
            name: name.into(),
            description: String::new(),
            fields: Vec::new(),
        }
    }

    pub fn with_description(mut self, description: impl Into<String>) -> Self {
        self.description = description.into();
        self
    }

    pub fn field(mut self, field: FieldDescriptor) -> Self {
        self.fields.push(field);
        self
    }

    pub fn name(&self) -> &str {
        &self.name
    }

    pub fn description(&self) -> &str {
        &self.description
    }

    pub fn fields(&self) -> &[FieldDescriptor] {
        &self.fields
    }
}

/// An immutable, validated configuration schema.
#[derive(Debug, Clone, PartialEq)]
pub struct Schema {
    root: Vec<FieldDescriptor>,
    sections: Vec<Section>,
}

impl Schema {
    /// Creates a new schema builder.
    pub fn builder() -> SchemaBuilder {
        SchemaBuilder::default()
    }

    /// Fields declared outside any section.
    pub fn root_fields(&self) -> &[FieldDescriptor] {
        &self.root
    }

    pub fn sections(&self) -> &[Section] {
        &self.sections
    }

    pub fn section(&self, name: &str) -> Option<&Section> {
        self.sections.iter().find(|s| s.name == name)
    }

    /// Iterates every field in declaration order: root fields, then each
    /// section's fields.
    pub fn fields(&self) -> impl Iterator<Item = (FieldPath, &FieldDescriptor)> + '_ {
        let root = self.root.iter().map(|f| (FieldPath::new(None, &f.name), f));
        let nested = self.sections.iter().flat_map(|s| {
            s.fields
                .iter()
                .map(move |f| (FieldPath::new(Some(s.name.as_str()), &f.name), f))
        });
        root.chain(nested)
    }

    /// Looks up a field by its path.
    pub fn field(&self, path: &FieldPath) -> Option<&FieldDescriptor> {
        let fields = match &path.section {
            Some(section) => &self.section(section)?.fields,
            None => &self.root,
        };
        fields.iter().find(|f| f.name == path.name)
    }

    /// Validates raw data against this schema.
    pub fn validate(&self, raw: &toml::Table) -> Result<ValidatedConfig, ValidationReport> {
        validate_all(self, raw)
    }

    /// Builds a config from defaults alone.
    ///
    /// Fails with a report naming every required field, since those have no
    /// default to fall back on.
    pub fn defaults(&self) -> Result<ValidatedConfig, ValidationReport> {
        validate_all(self, &toml::Table::new())
    }
}

/// Builder for [`Schema`]; all invariants are checked in [`build`](Self::build).
#[derive(Debug, Default)]
#[must_use = "builders do nothing until .build() is called"]
pub struct SchemaBuilder {
    root: Vec<FieldDescriptor>,
    sections: Vec<Section>,
}

impl SchemaBuilder {
    /// Adds a root-level field.
    pub fn field(mut self, field: FieldDescriptor) -> Self {
        self.root.push(field);
        self
    }

    pub fn section(mut self, section: Section) -> Self {
        self.sections.push(section);
        self
    }

    /// Checks names, constraint applicability, and defaults, then freezes the schema.
    pub fn build(self) -> Result<Schema, SchemaError> {
        let mut root = Vec::with_capacity(self.root.len());
        let mut root_names = HashSet::new();
        for field in self.root {
            if !root_names.insert(field.name.clone()) {
                return Err(SchemaError::DuplicateField(field.name));
            }
            root.push(check_field(None, field)?);
        }

        let mut sections = Vec::with_capacity(self.sections.len());
        let mut section_names = HashSet::new();
        for section in self.sections {
            check_name(&section.name)?;
            check_description(&section.name, &section.description)?;
            if root_names.contains(&section.name) {
                return Err(SchemaError::SectionFieldCollision {
                    field: section.name,
                });
            }
            if !section_names.insert(section.name.clone()) {
                return Err(SchemaError::DuplicateSection(section.name));
            }

            let mut names = HashSet::new();
            let mut fields = Vec::with_capacity(section.fields.len());
            for field in section.fields {
                if !names.insert(field.name.clone()) {
                    return Err(SchemaError::DuplicateField(
                        FieldPath::new(Some(section.name.as_str()), field.name).to_string(),
                    ));
                }
                fields.push(check_field(Some(section.name.as_str()), field)?);
            }

            sections.push(Section { fields, ..section });
        }

        Ok(Schema { root, sections })
    }
}

/// Names double as TOML bare keys so rendered output never needs quoting.
fn check_name(name: &str) -> Result<(), SchemaError> {
    let valid = !name.is_empty()
        && name
            .chars()
            .all(|c| c.is_ascii_alphanumeric() || c == '_' || c == '-');
    if valid {
        Ok(())
    } else {
        Err(SchemaError::InvalidName(name.to_string()))
    }
}

/// Descriptions are rendered as `#` comments, which TOML ends at a newline
/// and which may not hold other control characters.
fn check_description(owner: &str, description: &str) -> Result<(), SchemaError> {
    let invalid = description
        .replace("\r\n", "\n")
        .chars()
        .any(|c| c.is_control() && c != '\n' && c != '\t');
    if invalid {
        Err(SchemaError::InvalidDescription(owner.to_string()))
    } else {
        Ok(())
    }
}

fn check_field(section: Option<&str>, mut field: FieldDescriptor) -> Result<FieldDescriptor, SchemaError> {
    check_name(&field.name)?;
    let path = FieldPath::new(section, &field.name).to_string();
    check_description(&path, &field.description)?;

    if let Some(constraint) = field.constraints.iter().find(|c| !c.applies_to(&field.ty)) {
        return Err(SchemaError::InapplicableConstraint {
            field: path,
            constraint: constraint.clone(),
            ty: field.ty.clone(),
        });
    }

    if let Some(default) = field.default.take() {
        let value = default
            .clone()
            .coerce_to(&field.ty)
            .ok_or_else(|| SchemaError::DefaultTypeMismatch {
                field: path.clone(),
                expected: field.ty.clone(),
                value: default,
            })?;

        if let Some(constraint) = field.constraints.iter().find(|c| !c.check(&value)) {
            return Err(SchemaError::DefaultViolatesConstraint {
                field: path,
                constraint: constraint.clone(),
                value,
            });
        }
        field.default = Some(value);
    }

    Ok(field)
}
