//! Rendering validated configs back into canonical TOML text.
//!
//! The canonical layout lists root fields first, then one `[section]` table
//! per section, each field preceded by its description as a `#` comment.
//! Rendered text re-loads to an equal [`ValidatedConfig`].

mod format;
mod template;

use crate::schema::{FieldDescriptor, FieldPath, Schema, ValidatedConfig};

pub use format::format_value;
pub use template::{BoundTemplate, Template, TemplateError};

/// Renders `config` in the canonical layout for `schema`.
///
/// Output has no trailing newline. A field missing from `config` falls back
/// to its schema default and is omitted if it has none.
pub fn render(schema: &Schema, config: &ValidatedConfig) -> String {
    layout(schema, false, |path, field| {
        config
            .get_path(path)
            .or(field.default_value())
            .map(format_value)
    })
}

/// Returns the canonical layout as template text, with a `${path}`
/// placeholder in place of each value. Useful as a starting point for a
/// custom [`Template`].
pub fn canonical_template(schema: &Schema) -> String {
    layout(schema, true, |path, _| Some(format!("${{{path}}}")))
}

fn layout(
    schema: &Schema,
    escape: bool,
    mut value_of: impl FnMut(&FieldPath, &FieldDescriptor) -> Option<String>,
) -> String {
    let mut blocks: Vec<String> = Vec::new();

    let mut root = Vec::new();
    for field in schema.root_fields() {
        let path = FieldPath::new(None, field.name());
        if let Some(value) = value_of(&path, field) {
            push_field(&mut root, field, &value, escape);
        }
    }
    if !root.is_empty() {
        blocks.push(root.join("\n"));
    }

    for section in schema.sections() {
        let mut lines = Vec::new();
        push_comment(&mut lines, section.description(), escape);
        lines.push(format!("[{}]", section.name()));
        for field in section.fields() {
            let path = FieldPath::new(Some(section.name()), field.name());
            if let Some(value) = value_of(&path, field) {
                push_field(&mut lines, field, &value, escape);
            }
        }
        blocks.push(lines.join("\n"));
    }

    blocks.join("\n\n")
}

fn push_field(lines: &mut Vec<String>, field: &FieldDescriptor, value: &str, escape: bool) {
    push_comment(lines, field.description(), escape);
    lines.push(format!("{} = {value}", field.name()));
}

fn push_comment(lines: &mut Vec<String>, text: &str, escape: bool) {
    for line in text.lines() {
        let line = if escape { line.replace('$', "$$") } else { line.to_string() };
        lines.push(format!("# {line}").trim_end().to_string());
    }
}

#[cfg(test)]
mod tests {
    use super::*;
    use crate::config::load_str;
    use crate::schema::{reference_schema, FieldDescriptor, Section};

    #[test]
    fn test_render_reference_config() {
        let schema = reference_schema();
        let config = load_str(
            &schema,
            "[app]\nrefresh_rate = 30\nplugins = [\"git\", \"lint\"]",
        )
        .unwrap();

        assert_eq!(
            render(&schema, &config),
            "# Application settings.\n\
             [app]\n\
             # UI color theme.\n\
             theme = \"light\"\n\
             # Refresh interval in seconds.\n\
             refresh_rate = 30\n\
             # Plugins to load at startup.\n\
             plugins = [\"git\", \"lint\"]"
        );
    }

    #[test]
    fn test_round_trip() {
        let schema = Schema::builder()
            .field(FieldDescriptor::boolean("debug").with_default(false))
            .field(FieldDescriptor::float("ratio").with_default(0.5))
            .section(
                Section::new("app")
                    .field(FieldDescriptor::string("name").non_empty())
                    .field(FieldDescriptor::integer("refresh_rate").min(1))
                    .field(FieldDescriptor::list_of("tags", crate::schema::FieldType::String)),
            )
            .section(Section::new("empty"))
            .build()
            .unwrap();

        let source = r#"
            debug = true
            ratio = 3
            [app]
            name = "quote \" and backslash \\ and $ {x}"
            refresh_rate = 9999
            tags = ["a", "b, c", ""]
        "#;
        let config = load_str(&schema, source).unwrap();
        let rendered = render(&schema, &config);
        let reloaded = load_str(&schema, &rendered).unwrap();

        assert_eq!(reloaded, config);
    }

    #[test]
    fn test_canonical_template_matches_render() {
        let schema = reference_schema();
        let config = load_str(&schema, "[app]\nrefresh_rate = 7\ntheme = \"cost $5\"").unwrap();

        let template = Template::parse(&canonical_template(&schema))
            .unwrap()
            .bind(&schema)
            .unwrap();

        assert_eq!(template.render(&config).unwrap(), render(&schema, &config));
    }

    #[test]
    fn test_descriptions_with_dollar_signs_survive_templating() {
        let schema = Schema::builder()
            .field(
                FieldDescriptor::integer("price")
                    .with_default(5)
                    .with_description("Cost in $ per ${unit}."),
            )
            .build()
            .unwrap();
        let config = schema.defaults().unwrap();

        let template = Template::parse(&canonical_template(&schema))
            .unwrap()
            .bind(&schema)
            .unwrap();
        assert_eq!(
            template.render(&config).unwrap(),
            "# Cost in $ per ${unit}.\nprice = 5"
        );
    }
}
