//! Literal coercion for numbers and flags arriving from form-driven clients.

use serde_json::Value;

/// Coerces a required numeric field. Anything unusable becomes `0.0`.
pub fn number_or_zero(value: Option<&Value>) -> f64 {
    optional_number(value).unwrap_or(0.0)
}

/// Coerces an optional numeric field, keeping "not provided" distinct from 0.
///
/// Strings accept a decimal comma. Negative results are returned as-is.
pub fn optional_number(value: Option<&Value>) -> Option<f64> {
    match value? {
        Value::Number(number) => number.as_f64().filter(|parsed| parsed.is_finite()),
        Value::String(raw) => parse_decimal(raw),
        _ => None,
    }
}

pub fn flag(value: Option<&Value>) -> bool {
    match value {
        Some(Value::Bool(flag)) => *flag,
        Some(Value::String(raw)) => raw.trim().eq_ignore_ascii_case("true"),
        _ => false,
    }
}

fn parse_decimal(raw: &str) -> Option<f64> {
    let normalized = raw.trim().replace(',', ".");
    if normalized.is_empty() {
        return None;
    }

    normalized
        .parse::<f64>()
        .ok()
        .filter(|parsed| parsed.is_finite())
}

#[cfg(test)]
mod tests {
    use super::*;
    use serde_json::json;

    #[test]
    fn native_numbers_pass_through() {
        assert_eq!(number_or_zero(Some(&json!(0.7))), 0.7);
        assert_eq!(number_or_zero(Some(&json!(750000))), 750000.0);
    }

    #[test]
    fn decimal_comma_strings_are_normalized() {
        assert_eq!(number_or_zero(Some(&json!("0,004"))), 0.004);
        assert_eq!(number_or_zero(Some(&json!(" 2.9 "))), 2.9);
    }

    #[test]
    fn unusable_required_values_become_zero() {
        assert_eq!(number_or_zero(None), 0.0);
        assert_eq!(number_or_zero(Some(&Value::Null)), 0.0);
        assert_eq!(number_or_zero(Some(&json!("abc"))), 0.0);
        assert_eq!(number_or_zero(Some(&json!("inf"))), 0.0);
        assert_eq!(number_or_zero(Some(&json!("NaN"))), 0.0);
        assert_eq!(number_or_zero(Some(&json!(true))), 0.0);
        assert_eq!(number_or_zero(Some(&json!([1]))), 0.0);
    }

    #[test]
    fn optional_values_keep_absence() {
        assert_eq!(optional_number(None), None);
        assert_eq!(optional_number(Some(&json!(""))), None);
        assert_eq!(optional_number(Some(&json!("0"))), Some(0.0));
        assert_eq!(optional_number(Some(&json!("x"))), None);
    }

    #[test]
    fn negatives_are_not_clamped() {
        assert_eq!(number_or_zero(Some(&json!(-5))), -5.0);
        assert_eq!(number_or_zero(Some(&json!("-1,5"))), -1.5);
    }

    #[test]
    fn flags_accept_literal_strings() {
        assert!(flag(Some(&json!(true))));
        assert!(flag(Some(&json!("TRUE"))));
        assert!(!flag(Some(&json!("false"))));
        assert!(!flag(Some(&json!("yes"))));
        assert!(!flag(None));
    }
}
