use serde_json::Value;

use crate::workflow::coerce;

/// Operators a conditional node can apply to `variable` and `value`.
#[derive(Debug, Clone, Copy, PartialEq, Eq, strum::AsRefStr, strum::EnumString)]
pub enum ComparisonOperator {
    #[strum(serialize = "==")]
    Eq,
    #[strum(serialize = "!=")]
    Ne,
    #[strum(serialize = ">")]
    Gt,
    #[strum(serialize = "<")]
    Lt,
    #[strum(serialize = ">=")]
    Ge,
    #[strum(serialize = "<=")]
    Le,
    #[strum(serialize = "contains")]
    Contains,
}

impl ComparisonOperator {
    /// Apply the operator. Ordering operators compare numerically, so a
    /// side without a numeric form makes them false.
    pub fn evaluate(
        &self,
        actual: Option<&Value>,
        expected: Option<&Value>,
    ) -> bool {
        match self {
            ComparisonOperator::Eq => coerce::loose_eq(actual, expected),
            ComparisonOperator::Ne => !coerce::loose_eq(actual, expected),
            ComparisonOperator::Gt => coerce::to_number(actual) > coerce::to_number(expected),
            ComparisonOperator::Lt => coerce::to_number(actual) < coerce::to_number(expected),
            ComparisonOperator::Ge => coerce::to_number(actual) >= coerce::to_number(expected),
            ComparisonOperator::Le => coerce::to_number(actual) <= coerce::to_number(expected),
            ComparisonOperator::Contains => match actual {
                Some(actual) => coerce::to_text(actual).contains(&expected.map(coerce::to_text).unwrap_or_default()),
                None => false,
            },
        }
    }
}

#[cfg(test)]
mod tests {
    use serde_json::json;

    use super::*;

    #[test]
    fn test_parse_operators() {
        assert_eq!(">=".parse::<ComparisonOperator>().unwrap(), ComparisonOperator::Ge);
        assert_eq!("contains".parse::<ComparisonOperator>().unwrap(), ComparisonOperator::Contains);
        assert!("~=".parse::<ComparisonOperator>().is_err());
    }

    #[test]
    fn test_numeric_comparisons() {
        let gt = ComparisonOperator::Gt;
        assert!(gt.evaluate(Some(&json!(10)), Some(&json!("5"))));
        assert!(!gt.evaluate(Some(&json!("abc")), Some(&json!("5"))));
        assert!(!gt.evaluate(None, Some(&json!("5"))));
        assert!(ComparisonOperator::Le.evaluate(Some(&json!("5")), Some(&json!(5))));
        assert!(!ComparisonOperator::Lt.evaluate(Some(&json!(1)), None));
    }

    #[test]
    fn test_equality_and_contains() {
        assert!(ComparisonOperator::Eq.evaluate(Some(&json!("yes")), Some(&json!("yes"))));
        assert!(ComparisonOperator::Ne.evaluate(Some(&json!("yes")), Some(&json!("no"))));
        assert!(ComparisonOperator::Contains.evaluate(Some(&json!("hello world")), Some(&json!("world"))));
        assert!(ComparisonOperator::Contains.evaluate(Some(&json!(12345)), Some(&json!(234))));
        assert!(!ComparisonOperator::Contains.evaluate(None, Some(&json!("x"))));
    }
}
