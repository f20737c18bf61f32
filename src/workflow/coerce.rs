//! Loose value coercions used by conditionals, variable operations and
//! interpolation.
//!
//! Authored flows carry whatever the editor stored: numbers typed as strings,
//! booleans as `"true"`, missing fields. These helpers give every value a
//! number and a text form with predictable rules.

use serde_json::{Number, Value};

/// Numeric form of a value; `NaN` when it has none.
///
/// Blank strings and `null` count as zero, booleans as 0/1.
pub fn to_number(value: Option<&Value>) -> f64 {
    match value {
        None => f64::NAN,
        Some(Value::Null) => 0.0,
        Some(Value::Bool(b)) => {
            if *b {
                1.0
            } else {
                0.0
            }
        }
        Some(Value::Number(n)) => n.as_f64().unwrap_or(f64::NAN),
        Some(Value::String(s)) => {
            let s = s.trim();
            if s.is_empty() { 0.0 } else { s.parse::<f64>().unwrap_or(f64::NAN) }
        }
        Some(Value::Array(_)) | Some(Value::Object(_)) => f64::NAN,
    }
}

/// Text form of a value: strings raw, scalars canonical, containers as JSON.
pub fn to_text(value: &Value) -> String {
    match value {
        Value::String(s) => s.clone(),
        Value::Null => String::new(),
        other => other.to_string(),
    }
}

/// JSON number for `n`, integral when it has no fractional part.
pub fn number_value(n: f64) -> Value {
    if n.is_finite() && n.fract() == 0.0 && n.abs() < i64::MAX as f64 {
        Value::Number(Number::from(n as i64))
    } else {
        Number::from_f64(n).map(Value::Number).unwrap_or(Value::Null)
    }
}

/// Equality across loosely typed operands.
///
/// Missing or null on either side only equals missing or null. Numbers
/// compare numerically against numeric strings, booleans against
/// `"true"`/`"false"`; anything else compares by text form.
pub fn loose_eq(
    actual: Option<&Value>,
    expected: Option<&Value>,
) -> bool {
    let actual = actual.filter(|v| !v.is_null());
    let expected = expected.filter(|v| !v.is_null());

    match (actual, expected) {
        (None, None) => true,
        (None, _) | (_, None) => false,
        (Some(Value::Number(_)), Some(other)) | (Some(other), Some(Value::Number(_))) if !other.is_number() => {
            let a = to_number(actual);
            let b = to_number(expected);
            a == b
        }
        (Some(Value::Number(a)), Some(Value::Number(b))) => a.as_f64() == b.as_f64(),
        (Some(a), Some(b)) => to_text(a) == to_text(b),
    }
}

#[cfg(test)]
mod tests {
    use serde_json::json;

    use super::*;

    #[test]
    fn test_to_number() {
        assert_eq!(to_number(Some(&json!(10))), 10.0);
        assert_eq!(to_number(Some(&json!(" 2.5 "))), 2.5);
        assert_eq!(to_number(Some(&json!(""))), 0.0);
        assert_eq!(to_number(Some(&json!(true))), 1.0);
        assert!(to_number(Some(&json!("abc"))).is_nan());
        assert!(to_number(None).is_nan());
        assert!(to_number(Some(&json!([1]))).is_nan());
    }

    #[test]
    fn test_to_text() {
        assert_eq!(to_text(&json!("Ada")), "Ada");
        assert_eq!(to_text(&json!(3)), "3");
        assert_eq!(to_text(&json!(false)), "false");
        assert_eq!(to_text(&json!({"a": 1})), r#"{"a":1}"#);
    }

    #[test]
    fn test_number_value_keeps_integers() {
        assert_eq!(number_value(3.0), json!(3));
        assert_eq!(number_value(-1.0), json!(-1));
        assert_eq!(number_value(1.5), json!(1.5));
        assert_eq!(number_value(f64::NAN), Value::Null);
    }

    #[test]
    fn test_loose_eq() {
        assert!(loose_eq(Some(&json!(5)), Some(&json!("5"))));
        assert!(loose_eq(Some(&json!("5")), Some(&json!(5.0))));
        assert!(loose_eq(Some(&json!("yes")), Some(&json!("yes"))));
        assert!(loose_eq(Some(&json!(true)), Some(&json!("true"))));
        assert!(!loose_eq(None, Some(&json!("x"))));
        assert!(loose_eq(None, Some(&Value::Null)));
        assert!(!loose_eq(Some(&json!("abc")), Some(&json!(1))));
    }
}
