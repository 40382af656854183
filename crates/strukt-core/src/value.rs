//! # Value Categories: Single Source of Truth
//!
//! Defines `ValueKind`, the category of a possibly-absent JSON value. Every
//! built-in scalar type in the registry is expressed in terms of this enum,
//! so "is this an array?" has exactly one answer across the workspace.
//!
//! ## Absent vs. Null
//!
//! Validation distinguishes a missing value from an explicit `null`.
//! A missing value is modelled as `None` and reports as
//! [`ValueKind::Undefined`]; `Some(Value::Null)` reports as
//! [`ValueKind::Null`].

use std::fmt;
use std::str::FromStr;

use chrono::DateTime;
use serde::{Deserialize, Serialize};
use serde_json::Value;

use crate::error::SchemaError;

/// Category of a possibly-absent JSON value.
///
/// | Kind | Matches |
/// |------|---------|
/// | `undefined` | absent value (`None`) |
/// | `null` | `null` |
/// | `boolean` | `true` / `false` |
/// | `number` | any JSON number |
/// | `string` | any JSON string |
/// | `array` | any JSON array |
/// | `object` | any JSON object |
#[derive(Debug, Clone, Copy, PartialEq, Eq, Hash, Serialize, Deserialize)]
#[serde(rename_all = "snake_case")]
pub enum ValueKind {
    /// Absent value.
    Undefined,
    /// Explicit `null`.
    Null,
    /// Boolean.
    Boolean,
    /// Number (integer or float).
    Number,
    /// String.
    String,
    /// Array.
    Array,
    /// Object (map with string keys).
    Object,
}

impl ValueKind {
    /// Returns all value kinds in canonical order.
    pub fn all() -> &'static [ValueKind] {
        &[
            Self::Undefined,
            Self::Null,
            Self::Boolean,
            Self::Number,
            Self::String,
            Self::Array,
            Self::Object,
        ]
    }

    /// Returns the snake_case name used as the built-in type tag.
    pub fn as_str(&self) -> &'static str {
        match self {
            Self::Undefined => "undefined",
            Self::Null => "null",
            Self::Boolean => "boolean",
            Self::Number => "number",
            Self::String => "string",
            Self::Array => "array",
            Self::Object => "object",
        }
    }
}

impl fmt::Display for ValueKind {
    fn fmt(&self, f: &mut fmt::Formatter<'_>) -> fmt::Result {
        f.write_str(self.as_str())
    }
}

impl FromStr for ValueKind {
    type Err = SchemaError;

    fn from_str(s: &str) -> Result<Self, Self::Err> {
        Self::all()
            .iter()
            .copied()
            .find(|k| k.as_str() == s)
            .ok_or_else(|| SchemaError::UnknownType {
                name: s.to_string(),
            })
    }
}

/// Categorise a possibly-absent value.
pub fn kind_of(value: Option<&Value>) -> ValueKind {
    match value {
        None => ValueKind::Undefined,
        Some(Value::Null) => ValueKind::Null,
        Some(Value::Bool(_)) => ValueKind::Boolean,
        Some(Value::Number(_)) => ValueKind::Number,
        Some(Value::String(_)) => ValueKind::String,
        Some(Value::Array(_)) => ValueKind::Array,
        Some(Value::Object(_)) => ValueKind::Object,
    }
}

/// Render a possibly-absent value for error messages.
///
/// Defined values render as compact JSON; an absent value renders as
/// `undefined`.
pub fn render(value: Option<&Value>) -> String {
    match value {
        None => "undefined".to_string(),
        Some(v) => serde_json::to_string(v).unwrap_or_else(|_| v.to_string()),
    }
}

/// Returns true if `value` is a string holding an RFC 3339 timestamp.
pub fn is_date(value: Option<&Value>) -> bool {
    match value {
        Some(Value::String(s)) => DateTime::parse_from_rfc3339(s).is_ok(),
        _ => false,
    }
}

/// Returns true if `value` is a number without a fractional part.
pub fn is_integer(value: Option<&Value>) -> bool {
    match value {
        Some(Value::Number(n)) => {
            n.is_i64() || n.is_u64() || n.as_f64().is_some_and(|f| f.fract() == 0.0)
        }
        _ => false,
    }
}

/// By-value equality where numbers compare numerically, so `1` and `1.0`
/// are the same value. Arrays and objects compare element-wise.
pub fn same_value(a: &Value, b: &Value) -> bool {
    match (a, b) {
        (Value::Number(x), Value::Number(y)) => match (x.as_i64(), y.as_i64()) {
            (Some(x), Some(y)) => x == y,
            _ => match (x.as_u64(), y.as_u64()) {
                (Some(x), Some(y)) => x == y,
                _ => x.as_f64() == y.as_f64(),
            },
        },
        (Value::Array(xs), Value::Array(ys)) => {
            xs.len() == ys.len() && xs.iter().zip(ys).all(|(x, y)| same_value(x, y))
        }
        (Value::Object(xs), Value::Object(ys)) => {
            xs.len() == ys.len()
                && xs
                    .iter()
                    .all(|(k, x)| ys.get(k).is_some_and(|y| same_value(x, y)))
        }
        _ => a == b,
    }
}
