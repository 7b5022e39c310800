//! Canonical TOML formatting of field values.

use crate::schema::FieldValue;

/// Formats a value as a TOML literal that parses back to an equal value.
pub fn format_value(value: &FieldValue) -> String {
    match value {
        FieldValue::String(s) => quote(s),
        FieldValue::Integer(i) => i.to_string(),
        FieldValue::Float(f) => format_float(*f),
        FieldValue::Boolean(b) => b.to_string(),
        FieldValue::List(items) => {
            let items: Vec<String> = items.iter().map(format_value).collect();
            format!("[{}]", items.join(", "))
        }
    }
}

/// Quotes a string as a TOML basic string.
fn quote(s: &str) -> String {
    let mut out = String::with_capacity(s.len() + 2);
    out.push('"');
    for ch in s.chars() {
        match ch {
            '"' => out.push_str("\\\""),
            '\\' => out.push_str("\\\\"),
            '\n' => out.push_str("\\n"),
            '\r' => out.push_str("\\r"),
            '\t' => out.push_str("\\t"),
            '\u{8}' => out.push_str("\\b"),
            '\u{c}' => out.push_str("\\f"),
            c if c.is_control() => out.push_str(&format!("\\u{:04X}", c as u32)),
            c => out.push(c),
        }
    }
    out.push('"');
    out
}

/// `Debug` keeps a fractional part or exponent, so floats never re-parse as
/// integers. TOML spells the special values in lowercase.
fn format_float(f: f64) -> String {
    if f.is_nan() {
        "nan".to_string()
    } else if f == f64::INFINITY {
        "inf".to_string()
    } else if f == f64::NEG_INFINITY {
        "-inf".to_string()
    } else {
        format!("{f:?}")
    }
}
