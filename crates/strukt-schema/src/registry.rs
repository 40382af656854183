//! # Type Registry
//!
//! Maps primitive type names to predicates. Every scalar name in a schema
//! (`"string"`, `"entity-id"`, ...) is resolved against a registry when the
//! schema is compiled; an unregistered name is a [`SchemaError`], never a
//! validation failure.
//!
//! ## Built-in Types
//!
//! | Name | Accepts |
//! |------|---------|
//! | `any` | any defined value |
//! | `undefined` | an absent value |
//! | `null`, `boolean`, `number`, `string`, `array`, `object` | that JSON category |
//! | `integer` | a number without a fractional part |
//! | `date` | an RFC 3339 timestamp string |
//! | `function` | nothing; JSON data carries no callables |
//!
//! Caller-registered predicates are added through [`TypeRegistryBuilder`]
//! and override built-ins of the same name.

use std::collections::BTreeMap;
use std::fmt;
use std::sync::Arc;

use serde_json::Value;
use strukt_core::{is_date, is_integer, kind_of, PathSegment, SchemaError, ValueKind};

/// Outcome of a single predicate check.
#[derive(Debug, Clone, PartialEq, Eq)]
pub enum Check {
    /// The value is accepted.
    Pass,
    /// Generic type mismatch.
    Fail,
    /// Mismatch with a specific reason.
    Reason(String),
    /// Mismatch located below the checked value.
    Detail {
        /// Path relative to the checked value.
        path: Vec<PathSegment>,
        /// Optional reason.
        reason: Option<String>,
    },
}

impl Check {
    /// Returns true for [`Check::Pass`].
    pub fn is_pass(&self) -> bool {
        matches!(self, Self::Pass)
    }
}

impl From<bool> for Check {
    fn from(ok: bool) -> Self {
        if ok {
            Self::Pass
        } else {
            Self::Fail
        }
    }
}

impl From<Result<(), String>> for Check {
    fn from(result: Result<(), String>) -> Self {
        match result {
            Ok(()) => Self::Pass,
            Err(reason) => Self::Reason(reason),
        }
    }
}

type PredicateFn = dyn Fn(Option<&Value>, Option<&Value>) -> Check + Send + Sync;

/// A shareable check over a possibly-absent value and its enclosing value.
#[derive(Clone)]
pub struct Predicate(Arc<PredicateFn>);

impl Predicate {
    /// Wrap a check that also sees the enclosing value.
    pub fn new<F>(f: F) -> Self
    where
        F: Fn(Option<&Value>, Option<&Value>) -> Check + Send + Sync + 'static,
    {
        Self(Arc::new(f))
    }

    /// Wrap a check over the value alone.
    pub fn from_fn<F, C>(f: F) -> Self
    where
        F: Fn(Option<&Value>) -> C + Send + Sync + 'static,
        C: Into<Check>,
    {
        Self(Arc::new(move |value, _| f(value).into()))
    }

    /// Run the check.
    pub fn check(&self, value: Option<&Value>, context: Option<&Value>) -> Check {
        (self.0)(value, context)
    }
}

impl fmt::Debug for Predicate {
    fn fmt(&self, f: &mut fmt::Formatter<'_>) -> fmt::Result {
        f.write_str("Predicate(<fn>)")
    }
}

/// Name → predicate table consulted by the scalar kind.
#[derive(Clone, Debug)]
pub struct TypeRegistry {
    types: BTreeMap<String, Predicate>,
}

impl TypeRegistry {
    /// The built-in types only.
    pub fn builtin() -> Self {
        Self::builder().build()
    }

    /// Start from the built-ins and register custom types.
    pub fn builder() -> TypeRegistryBuilder {
        let mut types = BTreeMap::new();
        for kind in ValueKind::all() {
            let kind = *kind;
            types.insert(
                kind.as_str().to_string(),
                Predicate::from_fn(move |v| kind_of(v) == kind),
            );
        }
        types.insert(
            "any".to_string(),
            Predicate::from_fn(|v: Option<&Value>| v.is_some()),
        );
        types.insert("integer".to_string(), Predicate::from_fn(is_integer));
        types.insert("date".to_string(), Predicate::from_fn(is_date));
        types.insert("function".to_string(), Predicate::from_fn(|_| false));
        TypeRegistryBuilder { types }
    }

    /// Look up a predicate.
    pub fn get(&self, name: &str) -> Option<&Predicate> {
        self.types.get(name)
    }

    /// Look up a predicate, failing with [`SchemaError::UnknownType`].
    pub fn require(&self, name: &str) -> Result<&Predicate, SchemaError> {
        self.get(name).ok_or_else(|| SchemaError::UnknownType {
            name: name.to_string(),
        })
    }

    /// Returns true if `name` is registered.
    pub fn contains(&self, name: &str) -> bool {
        self.types.contains_key(name)
    }

    /// Registered names, sorted.
    pub fn names(&self) -> Vec<&str> {
        self.types.keys().map(String::as_str).collect()
    }

    /// Number of registered types.
    pub fn len(&self) -> usize {
        self.types.len()
    }

    /// Returns true if nothing is registered.
    pub fn is_empty(&self) -> bool {
        self.types.is_empty()
    }
}

impl Default for TypeRegistry {
    fn default() -> Self {
        Self::builtin()
    }
}

/// Builder for a [`TypeRegistry`] with custom predicates.
#[derive(Debug)]
pub struct TypeRegistryBuilder {
    types: BTreeMap<String, Predicate>,
}

impl TypeRegistryBuilder {
    /// Register a predicate over the value alone.
    pub fn register<F, C>(self, name: impl Into<String>, f: F) -> Self
    where
        F: Fn(Option<&Value>) -> C + Send + Sync + 'static,
        C: Into<Check>,
    {
        self.register_predicate(name, Predicate::from_fn(f))
    }

    /// Register a prepared predicate.
    pub fn register_predicate(mut self, name: impl Into<String>, predicate: Predicate) -> Self {
        self.types.insert(name.into(), predicate);
        self
    }

    /// Look up a predicate registered so far.
    pub fn get(&self, name: &str) -> Option<&Predicate> {
        self.types.get(name)
    }

    /// Finish the registry.
    pub fn build(self) -> TypeRegistry {
        TypeRegistry { types: self.types }
    }
}
