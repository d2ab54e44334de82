//! Loose value coercion shared by visibility rules and field checks.
//!
//! Form inputs arrive as whatever the presentation layer holds (strings,
//! numbers, booleans, arrays for multi-choice inputs), so comparisons coerce
//! both sides instead of rejecting mismatched kinds.

use serde_json::{Number, Value};

/// Live input values keyed by field id.
pub type FormValues = serde_json::Map<String, Value>;

/// Coerces a value to its display string.
///
/// Absent and null become the empty string; arrays join their items with commas.
pub(crate) fn coerce_to_string(value: Option<&Value>) -> String {
    match value {
        None | Some(Value::Null) => String::new(),
        Some(Value::String(text)) => text.clone(),
        Some(Value::Bool(flag)) => flag.to_string(),
        Some(Value::Number(number)) => number_to_string(number),
        Some(Value::Array(items)) => items
            .iter()
            .map(|item| coerce_to_string(Some(item)))
            .collect::<Vec<_>>()
            .join(","),
        Some(Value::Object(_)) => value.map(Value::to_string).unwrap_or_default(),
    }
}

/// Coerces a value to a number, yielding `NaN` when it is not numeric.
pub(crate) fn coerce_to_number(value: Option<&Value>) -> f64 {
    match value {
        Some(Value::Number(number)) => number.as_f64().unwrap_or(f64::NAN),
        Some(Value::String(text)) => {
            let trimmed = text.trim();
            if trimmed.is_empty() {
                return f64::NAN;
            }
            trimmed.parse::<f64>().unwrap_or(f64::NAN)
        }
        Some(Value::Bool(flag)) => {
            if *flag {
                1.0
            } else {
                0.0
            }
        }
        None | Some(Value::Null) | Some(Value::Array(_)) | Some(Value::Object(_)) => f64::NAN,
    }
}

/// Returns whether a value is absent or blank once coerced and trimmed.
pub(crate) fn is_blank(value: Option<&Value>) -> bool {
    coerce_to_string(value).trim().is_empty()
}

/// Returns whether a value counts as "not provided" for a required input.
///
/// Unlike [`is_blank`], an unchecked checkbox (`false`) is not provided.
pub(crate) fn is_missing(value: Option<&Value>) -> bool {
    match value {
        None | Some(Value::Null) => true,
        Some(Value::String(text)) => text.trim().is_empty(),
        Some(Value::Array(items)) => items.is_empty(),
        Some(Value::Bool(flag)) => !flag,
        Some(Value::Number(_)) | Some(Value::Object(_)) => false,
    }
}

/// Converts a parsed number to JSON, preferring an integer when exact.
pub(crate) fn number_to_value(number: f64) -> Option<Value> {
    if number.fract() == 0.0 && number.abs() < 9_007_199_254_740_992.0 {
        return Some(Value::from(number as i64));
    }

    Number::from_f64(number).map(Value::Number)
}

fn number_to_string(number: &Number) -> String {
    if let Some(integer) = number.as_i64() {
        return integer.to_string();
    }
    if let Some(integer) = number.as_u64() {
        return integer.to_string();
    }

    number
        .as_f64()
        .map(|float| float.to_string())
        .unwrap_or_else(|| number.to_string())
}
