use std::sync::LazyLock;

use regex::{Captures, Regex};
use serde_json::Value;

use crate::{common::Vars, workflow::coerce};

/// Regex pattern for session variable placeholders
/// Format: `{{name}}`
const VARIABLE_TEMPLATE_PATTERN: &str = r"\{\{(\w+)\}\}";

static VARIABLE_TEMPLATE: LazyLock<Regex> = LazyLock::new(|| Regex::new(VARIABLE_TEMPLATE_PATTERN).expect("valid placeholder pattern"));

/// Resolve `{{name}}` placeholders against the session variables.
///
/// Placeholders naming an unbound (or null) variable stay verbatim, so a
/// half-configured flow still renders readable text. Substituted values are
/// not scanned again.
pub fn interpolate(
    vars: &Vars,
    template: &str,
) -> String {
    if !template.contains("{{") {
        return template.to_string();
    }

    VARIABLE_TEMPLATE
        .replace_all(template, |caps: &Captures| match vars.get_value(&caps[1]) {
            Some(Value::Null) | None => caps[0].to_string(),
            Some(value) => coerce::to_text(value),
        })
        .into_owned()
}

/// Resolve placeholders in every string of a JSON value recursively
pub fn interpolate_json(
    vars: &Vars,
    value: &Value,
) -> Value {
    match value {
        Value::String(s) => Value::String(interpolate(vars, s)),
        Value::Array(arr) => Value::Array(arr.iter().map(|v| interpolate_json(vars, v)).collect()),
        Value::Object(obj) => Value::Object(obj.iter().map(|(k, v)| (k.clone(), interpolate_json(vars, v))).collect()),
        _ => value.clone(),
    }
}
