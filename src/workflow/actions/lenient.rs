//! Tolerant readers for authored node data.
//!
//! The editor stores numbers as strings, toggles as `"true"`, and leaves
//! fields as `null` or `""` when the author clears them. These helpers are
//! used with `#[serde(deserialize_with = ...)]` and the schema fragments
//! below describe exactly what they accept.

use serde::{Deserialize, Deserializer};
use serde_json::{Value, json};

use crate::workflow::coerce;

/// Blank or whitespace-only numeric strings, or a plain decimal.
const NUMERIC_STRING_PATTERN: &str = r"^\s*(-?[0-9]+(\.[0-9]+)?)?\s*$";

pub fn text<'de, D>(deserializer: D) -> std::result::Result<Option<String>, D::Error>
where
    D: Deserializer<'de>,
{
    Ok(match Option::<Value>::deserialize(deserializer)? {
        None | Some(Value::Null) => None,
        Some(Value::String(s)) => Some(s),
        Some(other) => Some(coerce::to_text(&other)),
    })
}

pub fn number<'de, D>(deserializer: D) -> std::result::Result<Option<f64>, D::Error>
where
    D: Deserializer<'de>,
{
    Ok(match Option::<Value>::deserialize(deserializer)? {
        None | Some(Value::Null) => None,
        Some(v) => Some(coerce::to_number(Some(&v))).filter(|n| n.is_finite()),
    })
}

/// Non-negative whole milliseconds.
pub fn millis<'de, D>(deserializer: D) -> std::result::Result<Option<u64>, D::Error>
where
    D: Deserializer<'de>,
{
    Ok(number(deserializer)?.filter(|n| *n >= 0.0).map(|n| n as u64))
}

pub fn flag<'de, D>(deserializer: D) -> std::result::Result<Option<bool>, D::Error>
where
    D: Deserializer<'de>,
{
    Ok(match Option::<Value>::deserialize(deserializer)? {
        Some(Value::Bool(b)) => Some(b),
        Some(Value::String(s)) => match s.trim() {
            "true" => Some(true),
            "false" => Some(false),
            _ => None,
        },
        Some(Value::Number(n)) => n.as_f64().map(|n| n != 0.0),
        _ => None,
    })
}

/// Treat an empty string like a missing one.
pub fn non_blank(value: &Option<String>) -> Option<&str> {
    value.as_deref().filter(|s| !s.is_empty())
}

/// Any scalar; rendered as text.
pub fn text_schema() -> Value {
    json!({ "type": ["string", "number", "boolean", "null"] })
}

/// A number, or a string holding one.
pub fn number_schema() -> Value {
    json!({
        "anyOf": [
            { "type": ["number", "null"] },
            { "type": "string", "pattern": NUMERIC_STRING_PATTERN }
        ]
    })
}

pub fn flag_schema() -> Value {
    json!({
        "anyOf": [
            { "type": ["boolean", "number", "null"] },
            { "type": "string", "enum": ["true", "false", ""] }
        ]
    })
}
