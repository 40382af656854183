//! # Schema Descriptions
//!
//! A [`Schema`] is the declarative, uncompiled description of an expected
//! shape. It is a sum type so that every shape the parser understands is
//! spelled out, and the compiler matches on it exhaustively.
//!
//! Schemas can be authored in Rust (`Schema::fields([...])`) or converted
//! from a JSON/YAML document with [`Schema::from_json`], where a string is a
//! type name, an array is a list or tuple, and an object is a field map.
//!
//! [`Defaults`] describes the values substituted for absent input.

use std::fmt;
use std::sync::Arc;

use serde_json::{Map, Value};
use strukt_core::SchemaError;

use crate::kind::Kind;
use crate::registry::Predicate;

/// Declarative description of an expected shape.
#[derive(Clone, Debug)]
pub enum Schema {
    /// A type name such as `"string"`, `"string?"`, `"string | number"` or
    /// `"object & entity"`.
    Name(String),
    /// One element: a list of that schema. Two or more: a fixed tuple.
    Array(Vec<Schema>),
    /// Field name → schema, in declaration order.
    Fields(Vec<(String, Schema)>),
    /// A custom check.
    Predicate(Predicate),
    /// An already compiled kind, reused as-is.
    Kind(Kind),
}

impl Schema {
    /// A list whose elements all satisfy `element`.
    pub fn list(element: impl Into<Schema>) -> Self {
        Self::Array(vec![element.into()])
    }

    /// A positional tuple.
    pub fn tuple<I, S>(elements: I) -> Self
    where
        I: IntoIterator<Item = S>,
        S: Into<Schema>,
    {
        Self::Array(elements.into_iter().map(Into::into).collect())
    }

    /// A field map.
    pub fn fields<I, K, S>(fields: I) -> Self
    where
        I: IntoIterator<Item = (K, S)>,
        K: Into<String>,
        S: Into<Schema>,
    {
        Self::Fields(
            fields
                .into_iter()
                .map(|(k, s)| (k.into(), s.into()))
                .collect(),
        )
    }

    /// Convert a schema authored as JSON.
    ///
    /// Strings become [`Schema::Name`], arrays become [`Schema::Array`] and
    /// objects become [`Schema::Fields`] (in the map's iteration order).
    /// Any other JSON value is rejected.
    pub fn from_json(value: &Value) -> Result<Self, SchemaError> {
        match value {
            Value::String(name) => Ok(Self::Name(name.clone())),
            Value::Array(items) => Ok(Self::Array(
                items
                    .iter()
                    .map(Self::from_json)
                    .collect::<Result<_, _>>()?,
            )),
            Value::Object(map) => Ok(Self::Fields(
                map.iter()
                    .map(|(k, v)| Ok((k.clone(), Self::from_json(v)?)))
                    .collect::<Result<_, SchemaError>>()?,
            )),
            other => Err(SchemaError::invalid(format!(
                "expected a type name, array or object, got `{other}`"
            ))),
        }
    }
}

impl From<&str> for Schema {
    fn from(name: &str) -> Self {
        Self::Name(name.to_string())
    }
}

impl From<String> for Schema {
    fn from(name: String) -> Self {
        Self::Name(name)
    }
}

impl From<Vec<Schema>> for Schema {
    fn from(items: Vec<Schema>) -> Self {
        Self::Array(items)
    }
}

impl From<Predicate> for Schema {
    fn from(predicate: Predicate) -> Self {
        Self::Predicate(predicate)
    }
}

impl From<Kind> for Schema {
    fn from(kind: Kind) -> Self {
        Self::Kind(kind)
    }
}

type ComputeFn = dyn Fn(Option<&Value>) -> Value + Send + Sync;

/// Values substituted for absent input.
#[derive(Clone)]
pub enum Defaults {
    /// A fixed value.
    Value(Value),
    /// Computed from the enclosing value.
    Compute(Arc<ComputeFn>),
    /// Per-field defaults for object-shaped kinds.
    Fields(Vec<(String, Defaults)>),
}

impl Defaults {
    /// A computed default.
    pub fn compute<F>(f: F) -> Self
    where
        F: Fn(Option<&Value>) -> Value + Send + Sync + 'static,
    {
        Self::Compute(Arc::new(f))
    }

    /// Per-field defaults.
    pub fn fields<I, K, D>(fields: I) -> Self
    where
        I: IntoIterator<Item = (K, D)>,
        K: Into<String>,
        D: Into<Defaults>,
    {
        Self::Fields(
            fields
                .into_iter()
                .map(|(k, d)| (k.into(), d.into()))
                .collect(),
        )
    }

    /// Resolve the default for a whole absent value.
    ///
    /// Field defaults resolve to an object holding every field whose default
    /// is fixed; computed field defaults are left for per-field resolution
    /// against the enclosing object.
    pub fn resolve(&self, context: Option<&Value>) -> Option<Value> {
        match self {
            Self::Value(v) => Some(v.clone()),
            Self::Compute(f) => Some(f(context)),
            Self::Fields(fields) => {
                let mut map = Map::new();
                for (key, d) in fields {
                    if matches!(d, Self::Compute(_)) {
                        continue;
                    }
                    if let Some(v) = d.resolve(context) {
                        map.insert(key.clone(), v);
                    }
                }
                Some(Value::Object(map))
            }
        }
    }

    /// Resolve the default of one absent field of `enclosing`.
    pub fn resolve_field(&self, key: &str, enclosing: &Value) -> Option<Value> {
        match self {
            Self::Value(Value::Object(map)) => map.get(key).cloned(),
            Self::Value(_) | Self::Compute(_) => None,
            Self::Fields(fields) => fields
                .iter()
                .find(|(k, _)| k == key)
                .and_then(|(_, d)| d.resolve(Some(enclosing))),
        }
    }
}

impl From<Value> for Defaults {
    fn from(value: Value) -> Self {
        Self::Value(value)
    }
}

impl fmt::Debug for Defaults {
    fn fmt(&self, f: &mut fmt::Formatter<'_>) -> fmt::Result {
        match self {
            Self::Value(v) => f.debug_tuple("Value").field(v).finish(),
            Self::Compute(_) => f.write_str("Compute(<fn>)"),
            Self::Fields(fields) => f.debug_tuple("Fields").field(fields).finish(),
        }
    }
}
