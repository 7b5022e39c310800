//! Placeholder templates bound to schema field paths.
//!
//! Supports `${section.field}` placeholders (or `${field}` for root fields).
//! Use `$${...}` to escape and produce a literal `${...}`. There are no loops,
//! conditionals, or filters: each placeholder is replaced by the formatted value.

use thiserror::Error;

use super::format::format_value;
use crate::schema::{FieldPath, Schema, ValidatedConfig};

#[derive(Debug, Error, PartialEq, Eq)]
#[non_exhaustive]
pub enum TemplateError {
    #[error("unclosed placeholder (missing '}}')")]
    UnclosedPlaceholder,

    #[error("invalid placeholder path: '{0}'")]
    InvalidPath(String),

    #[error("placeholder refers to unknown field: {0}")]
    UnknownField(String),

    #[error("config has no value for field: {0}")]
    MissingValue(String),
}

#[derive(Debug, Clone, PartialEq, Eq)]
enum Segment {
    Text(String),
    Placeholder(FieldPath),
}

/// A parsed template skeleton.
#[derive(Debug, Clone, PartialEq, Eq)]
pub struct Template {
    segments: Vec<Segment>,
}

impl Template {
    /// Parses template text into literal runs and placeholders.
    pub fn parse(text: &str) -> Result<Self, TemplateError> {
        let mut segments = Vec::new();
        let mut literal = String::with_capacity(text.len());
        let mut chars = text.chars().peekable();

        while let Some(ch) = chars.next() {
            if ch != '$' {
                literal.push(ch);
                continue;
            }
            match chars.peek() {
                Some('$') => {
                    // Escape sequence: $$ -> $
                    chars.next();
                    literal.push('$');
                }
                Some('{') => {
                    chars.next(); // consume '{'
                    let raw = consume_until(&mut chars, '}').ok_or(TemplateError::UnclosedPlaceholder)?;
                    let path = FieldPath::parse(raw.trim())
                        .ok_or_else(|| TemplateError::InvalidPath(raw.clone()))?;

                    if !literal.is_empty() {
                        segments.push(Segment::Text(std::mem::take(&mut literal)));
                    }
                    segments.push(Segment::Placeholder(path));
                }
                _ => literal.push('$'),
            }
        }

        if !literal.is_empty() {
            segments.push(Segment::Text(literal));
        }
        Ok(Self { segments })
    }

    /// Field paths referenced by this template, in order of appearance.
    pub fn placeholders(&self) -> impl Iterator<Item = &FieldPath> {
        self.segments.iter().filter_map(|s| match s {
            Segment::Placeholder(path) => Some(path),
            Segment::Text(_) => None,
        })
    }

    /// Checks every placeholder against `schema`.
    pub fn bind<'s>(self, schema: &'s Schema) -> Result<BoundTemplate<'s>, TemplateError> {
        if let Some(unknown) = self.placeholders().find(|p| schema.field(p).is_none()) {
            return Err(TemplateError::UnknownField(unknown.to_string()));
        }
        Ok(BoundTemplate {
            template: self,
            schema,
        })
    }
}

/// A template whose placeholders all name fields of `schema`.
#[derive(Debug, Clone)]
pub struct BoundTemplate<'s> {
    template: Template,
    schema: &'s Schema,
}

impl BoundTemplate<'_> {
    pub fn schema(&self) -> &Schema {
        self.schema
    }

    /// Substitutes each placeholder with the formatted config value.
    ///
    /// Only fails if `config` was validated against a different schema and
    /// lacks a referenced field.
    pub fn render(&self, config: &ValidatedConfig) -> Result<String, TemplateError> {
        let mut out = String::new();
        for segment in &self.template.segments {
            match segment {
                Segment::Text(text) => out.push_str(text),
                Segment::Placeholder(path) => {
                    let value = config
                        .get_path(path)
                        .ok_or_else(|| TemplateError::MissingValue(path.to_string()))?;
                    out.push_str(&format_value(value));
                }
            }
        }
        Ok(out)
    }
}

/// Consumes characters until the delimiter, returning the collected string.
fn consume_until(chars: &mut std::iter::Peekable<std::str::Chars>, delim: char) -> Option<String> {
    let mut result = String::new();
    for ch in chars.by_ref() {
        if ch == delim {
            return Some(result);
        }
        result.push(ch);
    }
    None // Delimiter not found
}
