//! # Error Types: Structured Error Hierarchy
//!
//! Two families of errors, never mixed:
//!
//! - **Configuration errors** ([`SchemaError`]): unknown type names and
//!   malformed schema shapes. These are authoring mistakes, returned from
//!   compile operations before any value is validated.
//! - **Validation errors** ([`Failure`], [`Failures`], [`StructError`]):
//!   expected, data-driven outcomes. A validation pass threads them as
//!   return values through every recursive call and reports all of them.
//!
//! ## Design
//!
//! - Every failure carries the failing value, its path from the root, the
//!   expected type label, and an optional reason.
//! - [`Failures`] is non-empty by construction; its first element is the
//!   representative failure surfaced in messages.

use std::fmt;

use serde::{Deserialize, Serialize};
use serde_json::Value;
use thiserror::Error;

use crate::path::{join_path, PathSegment};
use crate::value::render;

/// Type label used for values that no schema position accepts, such as an
/// unknown object key or a tuple position past the declared length.
pub const NEVER: &str = "never";

/// Schema authoring error, raised at compile time.
#[derive(Error, Debug)]
pub enum SchemaError {
    /// The schema shape cannot be compiled.
    #[error("invalid schema: {reason}")]
    InvalidSchema {
        /// What is wrong with the shape.
        reason: String,
    },

    /// A scalar name is not registered.
    #[error("invalid type: {name}")]
    UnknownType {
        /// The unregistered type name.
        name: String,
    },

    /// A schema document could not be read or parsed.
    #[error("schema document error for '{source_name}': {reason}")]
    Document {
        /// File path or other identifier of the document.
        source_name: String,
        /// Reason the document was rejected.
        reason: String,
    },

    /// IO error reading a schema document.
    #[error("io error: {0}")]
    Io(#[from] std::io::Error),
}

impl SchemaError {
    /// Shorthand for [`SchemaError::InvalidSchema`].
    pub fn invalid(reason: impl Into<String>) -> Self {
        Self::InvalidSchema {
            reason: reason.into(),
        }
    }
}

/// A single validation failure.
#[derive(Debug, Clone, PartialEq, Serialize, Deserialize)]
pub struct Failure {
    /// The value enclosing the failing node (the failing value itself for
    /// root-level failures).
    pub data: Option<Value>,
    /// Keys and indices from the root to the failing node.
    pub path: Vec<PathSegment>,
    /// The failing value; `None` if it was absent.
    pub value: Option<Value>,
    /// Specific mismatch reason, when the check produced one.
    pub reason: Option<String>,
    /// Expected type label.
    #[serde(rename = "type")]
    pub type_label: String,
}

impl Failure {
    /// A root-level failure for `value` against `type_label`.
    pub fn new(value: Option<&Value>, type_label: impl Into<String>) -> Self {
        Self {
            data: value.cloned(),
            path: Vec::new(),
            value: value.cloned(),
            reason: None,
            type_label: type_label.into(),
        }
    }

    /// Attach a reason.
    pub fn with_reason(mut self, reason: impl Into<String>) -> Self {
        self.reason = Some(reason.into());
        self
    }

    /// Human-readable message built from type, path and value.
    pub fn message(&self) -> String {
        expected_message(&self.type_label, &self.path, &self.value)
    }
}

impl fmt::Display for Failure {
    fn fmt(&self, f: &mut fmt::Formatter<'_>) -> fmt::Result {
        f.write_str(&self.message())
    }
}

/// Every failure found in one validation pass. Never empty.
#[derive(Debug, Clone, PartialEq)]
pub struct Failures(Vec<Failure>);

impl Failures {
    /// A batch holding one failure.
    pub fn single(failure: Failure) -> Self {
        Self(vec![failure])
    }

    /// Wrap a batch; returns `None` if `failures` is empty.
    pub fn from_vec(failures: Vec<Failure>) -> Option<Self> {
        if failures.is_empty() {
            None
        } else {
            Some(Self(failures))
        }
    }

    /// The representative failure.
    pub fn first(&self) -> &Failure {
        &self.0[0]
    }

    /// Mutable access to the representative failure.
    pub fn first_mut(&mut self) -> &mut Failure {
        &mut self.0[0]
    }

    /// Number of failures in the batch (at least one).
    pub fn len(&self) -> usize {
        self.0.len()
    }

    /// Always false; present for API symmetry with collections.
    pub fn is_empty(&self) -> bool {
        self.0.is_empty()
    }

    /// Iterate over all failures in discovery order.
    pub fn iter(&self) -> std::slice::Iter<'_, Failure> {
        self.0.iter()
    }

    /// Consume the batch.
    pub fn into_vec(self) -> Vec<Failure> {
        self.0
    }

    /// Relabel the representative failure if it sits at the current level.
    pub fn relabel_at_root(&mut self, type_label: &str) {
        let first = self.first_mut();
        if first.path.is_empty() {
            first.type_label = type_label.to_string();
        }
    }

    /// Prepend `segment` to every path and record `data` as the enclosing
    /// value.
    pub fn prefixed(self, segment: &PathSegment, data: &Value) -> Vec<Failure> {
        self.0
            .into_iter()
            .map(|mut f| {
                f.path.insert(0, segment.clone());
                f.data = Some(data.clone());
                f
            })
            .collect()
    }
}

impl IntoIterator for Failures {
    type Item = Failure;
    type IntoIter = std::vec::IntoIter<Failure>;

    fn into_iter(self) -> Self::IntoIter {
        self.0.into_iter()
    }
}

/// The public validation error returned by `assert` and `validate`.
///
/// Carries the representative failure's fields plus every failure found
/// in the same pass, so callers can highlight all invalid fields at once.
#[derive(Error, Debug, Clone, PartialEq, Serialize)]
#[error("{}", expected_message(.type_label, .path, .value))]
pub struct StructError {
    /// Enclosing value of the representative failure.
    pub data: Option<Value>,
    /// Path of the representative failure.
    pub path: Vec<PathSegment>,
    /// Failing value of the representative failure.
    pub value: Option<Value>,
    /// Reason of the representative failure.
    pub reason: Option<String>,
    /// Expected type label of the representative failure.
    #[serde(rename = "type")]
    pub type_label: String,
    /// Every failure of the pass, representative first.
    pub errors: Vec<Failure>,
}

impl From<Failures> for StructError {
    fn from(failures: Failures) -> Self {
        let first = failures.first().clone();
        Self {
            data: first.data,
            path: first.path,
            value: first.value,
            reason: first.reason,
            type_label: first.type_label,
            errors: failures.into_vec(),
        }
    }
}

impl StructError {
    /// Dotted path of the representative failure.
    pub fn path_string(&self) -> String {
        join_path(&self.path)
    }
}

fn expected_message(type_label: &str, path: &[PathSegment], value: &Option<Value>) -> String {
    let location = if path.is_empty() {
        String::new()
    } else {
        format!(" for `{}`", join_path(path))
    };
    format!(
        "Expected a value of type `{type_label}`{location} but received `{}`.",
        render(value.as_ref())
    )
}

#[cfg(test)]
mod tests {
    use super::*;
    use serde_json::json;

    #[test]
    fn test_failure_message_without_path() {
        let f = Failure::new(Some(&json!("jump")), r#""navigate" | "none""#);
        assert_eq!(
            f.to_string(),
            r#"Expected a value of type `"navigate" | "none"` but received `"jump"`."#
        );
    }

    #[test]
    fn test_failure_message_with_path_and_undefined() {
        let mut f = Failure::new(None, "string");
        f.path = vec![PathSegment::from("entities"), PathSegment::from(0)];
        assert_eq!(
            f.to_string(),
            "Expected a value of type `string` for `entities.0` but received `undefined`."
        );
    }

    #[test]
    fn test_failures_from_empty_vec_is_none() {
        assert!(Failures::from_vec(Vec::new()).is_none());
        let batch = Failures::from_vec(vec![Failure::new(None, "string")]).unwrap();
        assert_eq!(batch.len(), 1);
        assert!(!batch.is_empty());
    }

    #[test]
    fn test_prefixed_prepends_and_sets_data() {
        let mut inner = Failure::new(Some(&json!(1)), "string");
        inner.path = vec![PathSegment::from("name")];
        let parent = json!([{"name": 1}]);
        let out = Failures::single(inner).prefixed(&PathSegment::from(0), &parent);
        assert_eq!(out[0].path, vec![PathSegment::from(0), PathSegment::from("name")]);
        assert_eq!(out[0].data, Some(parent));
    }

    #[test]
    fn test_relabel_only_at_root() {
        let mut deep = Failure::new(None, "string");
        deep.path = vec![PathSegment::from("a")];
        let mut batch = Failures::single(deep);
        batch.relabel_at_root("x | y");
        assert_eq!(batch.first().type_label, "string");

        let mut batch = Failures::single(Failure::new(None, "string"));
        batch.relabel_at_root("x | y");
        assert_eq!(batch.first().type_label, "x | y");
    }

    #[test]
    fn test_struct_error_carries_all_failures() {
        let a = Failure::new(Some(&json!(1)), "string");
        let b = Failure::new(Some(&json!(true)), "number");
        let err = StructError::from(Failures::from_vec(vec![a.clone(), b.clone()]).unwrap());
        assert_eq!(err.type_label, "string");
        assert_eq!(err.errors, vec![a, b]);
        assert_eq!(
            err.to_string(),
            "Expected a value of type `string` but received `1`."
        );
    }

    #[test]
    fn test_struct_error_serializes_type_field() {
        let err = StructError::from(Failures::single(Failure::new(Some(&json!(1)), "string")));
        let v = serde_json::to_value(&err).unwrap();
        assert_eq!(v["type"], "string");
        assert_eq!(v["errors"][0]["type"], "string");
        assert_eq!(v["path"], json!([]));
    }
}
