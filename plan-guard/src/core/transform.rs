//! Normalization of raw plan values.

use super::rules::{ColumnRule, ValueType};
use serde::ser::SerializeSeq;
use serde::{Serialize, Serializer};
use serde_json::Value;
use std::fmt;

/// The literal a missing or `null` plan value normalizes to.
pub const ABSENT: &str = "absent";

/// A plan value after normalization, ready for tag matching.
#[derive(Debug, Clone, PartialEq)]
pub enum CanonicalValue {
    /// The plan had no value (missing column or `null`)
    Absent,
    /// A single value, matched as one tag
    Scalar(String),
    /// A list of values, each matched as its own tag
    List(Vec<String>),
}

impl CanonicalValue {
    /// The tag names this value matches against: one per element.
    pub fn tags(&self) -> Vec<&str> {
        match self {
            CanonicalValue::Absent => vec![ABSENT],
            CanonicalValue::Scalar(value) => vec![value.as_str()],
            CanonicalValue::List(values) => values.iter().map(String::as_str).collect(),
        }
    }

    pub fn is_absent(&self) -> bool {
        matches!(self, CanonicalValue::Absent)
    }
}

impl fmt::Display for CanonicalValue {
    fn fmt(&self, f: &mut fmt::Formatter<'_>) -> fmt::Result {
        match self {
            CanonicalValue::Absent => f.write_str(ABSENT),
            CanonicalValue::Scalar(value) => f.write_str(value),
            CanonicalValue::List(values) => f.write_str(&values.join(", ")),
        }
    }
}

impl Serialize for CanonicalValue {
    fn serialize<S: Serializer>(&self, serializer: S) -> Result<S::Ok, S::Error> {
        match self {
            CanonicalValue::Absent => serializer.serialize_str(ABSENT),
            CanonicalValue::Scalar(value) => serializer.serialize_str(value),
            CanonicalValue::List(values) => {
                let mut seq = serializer.serialize_seq(Some(values.len()))?;
                for value in values {
                    seq.serialize_element(value)?;
                }
                seq.end()
            }
        }
    }
}

/// Normalizes a raw plan value according to its column rule.
///
/// Missing and `null` values become [`CanonicalValue::Absent`]. Array columns
/// with a delimiter are split and each element trimmed; everything else passes
/// through as text.
pub fn normalize(raw: Option<&Value>, rule: &ColumnRule) -> CanonicalValue {
    let raw = match raw {
        None | Some(Value::Null) => return CanonicalValue::Absent,
        Some(raw) => raw,
    };

    if rule.value_type == ValueType::Array {
        if let Value::Array(items) = raw {
            return CanonicalValue::List(items.iter().map(value_text).collect());
        }
        if let Some(delimiter) = rule.delimiter() {
            return CanonicalValue::List(split_trimmed(&value_text(raw), delimiter));
        }
    }

    CanonicalValue::Scalar(value_text(raw))
}

/// Computes the numeric amount of a canonical value used for thresholds and
/// relative debt.
pub fn amount_of(value: &CanonicalValue, rule: &ColumnRule) -> f64 {
    match (value, rule.value_type) {
        (CanonicalValue::Absent, _) => 0.0,
        (CanonicalValue::Scalar(text), ValueType::Number) => parse_float(text),
        (CanonicalValue::List(_), ValueType::Number) => 0.0,
        (CanonicalValue::Scalar(text), _) => text.chars().count() as f64,
        (CanonicalValue::List(values), _) => values.len() as f64,
    }
}

/// Renders a JSON scalar as plain text. Integral numbers carry no `.0`.
pub fn value_text(value: &Value) -> String {
    match value {
        Value::Null => ABSENT.to_string(),
        Value::String(text) => text.clone(),
        Value::Number(n) if n.is_i64() || n.is_u64() => n.to_string(),
        Value::Number(n) => n.as_f64().map_or_else(|| n.to_string(), |f| f.to_string()),
        other => other.to_string(),
    }
}

/// Parses the leading float of `text`, ignoring surrounding junk.
///
/// Text without a numeric prefix parses as `0.0`, so `"12 rows"` is `12.0`
/// and `"n/a"` is `0.0`.
pub fn parse_float(text: &str) -> f64 {
    let text = text.trim_start();
    let bytes = text.as_bytes();
    let mut end = 0;

    if matches!(bytes.first(), Some(b'+') | Some(b'-')) {
        end += 1;
    }
    let int_start = end;
    while end < bytes.len() && bytes[end].is_ascii_digit() {
        end += 1;
    }
    let mut digits = end - int_start;

    if end < bytes.len() && bytes[end] == b'.' {
        let frac_start = end + 1;
        let mut frac_end = frac_start;
        while frac_end < bytes.len() && bytes[frac_end].is_ascii_digit() {
            frac_end += 1;
        }
        if frac_end > frac_start {
            digits += frac_end - frac_start;
            end = frac_end;
        }
    }

    if digits == 0 {
        return 0.0;
    }

    if end < bytes.len() && (bytes[end] == b'e' || bytes[end] == b'E') {
        let mut exp_end = end + 1;
        if matches!(bytes.get(exp_end), Some(b'+') | Some(b'-')) {
            exp_end += 1;
        }
        let exp_digits_start = exp_end;
        while exp_end < bytes.len() && bytes[exp_end].is_ascii_digit() {
            exp_end += 1;
        }
        if exp_end > exp_digits_start {
            end = exp_end;
        }
    }

    text[..end].parse().unwrap_or(0.0)
}

// Trailing empty pieces are dropped before trimming, so "a,b," is two elements.
fn split_trimmed(text: &str, delimiter: &str) -> Vec<String> {
    let mut pieces: Vec<&str> = text.split(delimiter).collect();
    while pieces.last().is_some_and(|piece| piece.is_empty()) {
        pieces.pop();
    }
    pieces
        .into_iter()
        .map(|piece| piece.trim().to_string())
        .collect()
}

#[cfg(test)]
mod tests {
    use super::*;
    use serde_json::json;

    fn array_rule() -> ColumnRule {
        ColumnRule::new(ValueType::Array).with_delimiter(",")
    }

    #[test]
    fn test_absent_values() {
        let rule = ColumnRule::new(ValueType::Number);
        assert_eq!(normalize(None, &rule), CanonicalValue::Absent);
        assert_eq!(normalize(Some(&Value::Null), &rule), CanonicalValue::Absent);
        assert_eq!(amount_of(&CanonicalValue::Absent, &rule), 0.0);
        assert_eq!(CanonicalValue::Absent.tags(), vec!["absent"]);
    }

    #[test]
    fn test_array_split_and_trim() {
        let rule = array_rule();
        let value = normalize(Some(&json!("a, b,c")), &rule);
        assert_eq!(
            value,
            CanonicalValue::List(vec!["a".into(), "b".into(), "c".into()])
        );
        assert_eq!(amount_of(&value, &rule), 3.0);
    }

    #[test]
    fn test_array_drops_trailing_empty_pieces() {
        let value = normalize(Some(&json!("a,b,,")), &array_rule());
        assert_eq!(value, CanonicalValue::List(vec!["a".into(), "b".into()]));

        let empty = normalize(Some(&json!("")), &array_rule());
        assert_eq!(empty, CanonicalValue::List(vec![]));
    }

    #[test]
    fn test_array_without_delimiter_passes_through() {
        let rule = ColumnRule::new(ValueType::Array);
        let value = normalize(Some(&json!("a,b")), &rule);
        assert_eq!(value, CanonicalValue::Scalar("a,b".into()));

        let list = normalize(Some(&json!(["x", "y"])), &rule);
        assert_eq!(list, CanonicalValue::List(vec!["x".into(), "y".into()]));
        assert_eq!(amount_of(&list, &rule), 2.0);
    }

    #[test]
    fn test_string_amount_is_length() {
        let rule = ColumnRule::default();
        let value = normalize(Some(&json!("PRIMARY")), &rule);
        assert_eq!(amount_of(&value, &rule), 7.0);
    }

    #[test]
    fn test_number_amount() {
        let rule = ColumnRule::new(ValueType::Number);
        assert_eq!(amount_of(&normalize(Some(&json!("1000")), &rule), &rule), 1000.0);
        assert_eq!(amount_of(&normalize(Some(&json!(42)), &rule), &rule), 42.0);
        assert_eq!(amount_of(&normalize(Some(&json!("n/a")), &rule), &rule), 0.0);
    }

    #[test]
    fn test_number_text_has_no_trailing_zero() {
        assert_eq!(value_text(&json!(1000)), "1000");
        assert_eq!(value_text(&json!(1000.0)), "1000");
        assert_eq!(value_text(&json!(12.5)), "12.5");
    }

    #[test]
    fn test_parse_float_prefixes() {
        assert_eq!(parse_float("12.5"), 12.5);
        assert_eq!(parse_float("  7 rows"), 7.0);
        assert_eq!(parse_float("-3"), -3.0);
        assert_eq!(parse_float("1e3"), 1000.0);
        assert_eq!(parse_float("1e"), 1.0);
        assert_eq!(parse_float("5."), 5.0);
        assert_eq!(parse_float(".5"), 0.5);
        assert_eq!(parse_float("abc"), 0.0);
        assert_eq!(parse_float(""), 0.0);
        assert_eq!(parse_float("-"), 0.0);
    }

    #[test]
    fn test_display_and_serialize() {
        let list = CanonicalValue::List(vec!["Using where".into(), "Using index".into()]);
        assert_eq!(list.to_string(), "Using where, Using index");
        assert_eq!(
            serde_json::to_string(&list).unwrap(),
            r#"["Using where","Using index"]"#
        );
        assert_eq!(
            serde_json::to_string(&CanonicalValue::Absent).unwrap(),
            r#""absent""#
        );
    }
}
