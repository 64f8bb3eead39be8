//! Read-only views over the documents queries are matched against.
//!
//! Documents are plain `serde_json::Value` trees produced by the caller.
//! Numbers are compared through [`BigDecimal`] so `9` and `9.0` are equal.

use std::{borrow::Cow, str::FromStr};

use bigdecimal::BigDecimal;
use serde_json::{Number, Value};

use crate::ast::AttributePath;

/// Walks `path` from the document root. A missing key anywhere along the way,
/// or a segment applied to something that is not an object, yields `None`.
pub fn resolve<'a>(document: &'a Value, path: &AttributePath) -> Option<&'a Value> {
    path.segments()
        .try_fold(document, |current, segment| current.get(segment))
}

/// Missing attributes and JSON `null` are treated alike by most operators.
pub fn is_absent(value: Option<&Value>) -> bool {
    matches!(value, None | Some(Value::Null))
}

/// Exact decimal value of a JSON number, taken from its textual form
/// (which may be in exponent notation).
pub fn as_decimal(number: &Number) -> Option<BigDecimal> {
    BigDecimal::from_str(&number.to_string()).ok()
}

/// Textual form of a scalar: strings as-is, numbers and booleans rendered.
pub fn as_text(value: &Value) -> Option<Cow<'_, str>> {
    match value {
        Value::String(s) => Some(Cow::Borrowed(s.as_str())),
        Value::Number(n) => Some(Cow::Owned(n.to_string())),
        Value::Bool(b) => Some(Cow::Owned(b.to_string())),
        _ => None,
    }
}

/// Structural equality where numbers compare by decimal value.
pub fn json_eq(a: &Value, b: &Value) -> bool {
    match (a, b) {
        (Value::Number(x), Value::Number(y)) => match (as_decimal(x), as_decimal(y)) {
            (Some(x), Some(y)) => x == y,
            _ => x == y,
        },
        (Value::Array(xs), Value::Array(ys)) => {
            xs.len() == ys.len() && xs.iter().zip(ys).all(|(x, y)| json_eq(x, y))
        }
        (Value::Object(xs), Value::Object(ys)) => {
            xs.len() == ys.len()
                && xs
                    .iter()
                    .all(|(k, x)| ys.get(k).is_some_and(|y| json_eq(x, y)))
        }
        _ => a == b,
    }
}

/// Human-readable type name for error messages.
pub fn type_name(value: &Value) -> &'static str {
    match value {
        Value::Null => "null",
        Value::Bool(_) => "boolean",
        Value::Number(_) => "number",
        Value::String(_) => "string",
        Value::Array(_) => "array",
        Value::Object(_) => "object",
    }
}
