//! Property tests for the render round-trip and patch idempotence.

use dragon_schema::config::load_str;
use dragon_schema::patch::{patch, PatchError};
use dragon_schema::render::render;
use dragon_schema::schema::{FieldDescriptor, FieldType, Schema, Section};
use proptest::prelude::*;
use toml::{Table, Value};

fn mixed_schema() -> Schema {
    Schema::builder()
        .field(FieldDescriptor::boolean("debug").with_description("Verbose output.\r\nCosts $ and\ttime."))
        .field(FieldDescriptor::float("ratio"))
        .section(
            Section::new("app")
                .with_description("Application # settings.")
                .field(FieldDescriptor::string("name"))
                .field(FieldDescriptor::integer("count"))
                .field(FieldDescriptor::list_of("tags", FieldType::String))
                .field(FieldDescriptor::list_of("weights", FieldType::Float)),
        )
        .build()
        .unwrap()
}

fn text() -> impl Strategy<Value = String> {
    prop_oneof![
        any::<String>(),
        "[\"\\\\\\t\\r\\n\\x00\\x7F a-z$#{}=\\[\\]]{0,12}",
    ]
}

fn float() -> impl Strategy<Value = f64> {
    prop::num::f64::POSITIVE
        | prop::num::f64::NEGATIVE
        | prop::num::f64::NORMAL
        | prop::num::f64::SUBNORMAL
        | prop::num::f64::ZERO
        | prop::num::f64::INFINITE
}

prop_compose! {
    fn raw_config()(
        debug in any::<bool>(),
        ratio in float(),
        name in text(),
        count in any::<i64>(),
        tags in prop::collection::vec(text(), 0..4),
        weights in prop::collection::vec(float(), 0..4),
    ) -> Table {
        let mut app = Table::new();
        app.insert("name".into(), Value::String(name));
        app.insert("count".into(), Value::Integer(count));
        app.insert("tags".into(), Value::Array(tags.into_iter().map(Value::String).collect()));
        app.insert("weights".into(), Value::Array(weights.into_iter().map(Value::Float).collect()));

        let mut raw = Table::new();
        raw.insert("debug".into(), Value::Boolean(debug));
        raw.insert("ratio".into(), Value::Float(ratio));
        raw.insert("app".into(), Value::Table(app));
        raw
    }
}

fn marker() -> impl Strategy<Value = String> {
    "[ab\n-]{1,3}"
}

fn fragment() -> impl Strategy<Value = String> {
    prop_oneof!["[ab\n-]{0,8}", any::<String>()]
}

proptest! {
    #[test]
    fn rendered_config_reloads_equal(raw in raw_config()) {
        let schema = mixed_schema();
        let config = schema.validate(&raw).unwrap();

        let rendered = render(&schema, &config);
        let reloaded = load_str(&schema, &rendered);

        prop_assert!(reloaded.is_ok(), "failed to reload:\n{}", rendered);
        prop_assert_eq!(reloaded.unwrap(), config);
    }

    #[test]
    fn patch_is_idempotent(
        begin in marker(),
        end in marker(),
        prefix in fragment(),
        inner in fragment(),
        suffix in fragment(),
        replacement in fragment(),
    ) {
        let document = format!("{prefix}{begin}{inner}{end}{suffix}");

        let once = match patch(&document, &begin, &end, &replacement) {
            Err(PatchError::MarkerInReplacement(_)) => return Ok(()),
            result => result.unwrap(),
        };
        let twice = patch(&once, &begin, &end, &replacement).unwrap();

        prop_assert_eq!(&twice, &once);

        let start = document.find(begin.as_str()).unwrap();
        prop_assert!(once.starts_with(&document[..start]));
        prop_assert!(once[start..].starts_with(begin.as_str()));
        prop_assert!(once.contains(&replacement));
    }
}
