//! # Failure Paths
//!
//! A path locates a failure inside a nested value: an ordered list of
//! object keys and array indices from the root to the failing node.
//! Paths are built innermost-first; each nesting level prepends its own
//! segment while the failure propagates outward.

use std::fmt;

use serde::{Deserialize, Serialize};

/// One step of a failure path.
///
/// Serializes as a bare string (object key) or integer (array index).
#[derive(Debug, Clone, PartialEq, Eq, Hash, PartialOrd, Ord, Serialize, Deserialize)]
#[serde(untagged)]
pub enum PathSegment {
    /// Position in an array or tuple.
    Index(usize),
    /// Key in an object or dict.
    Key(String),
}

impl PathSegment {
    /// Returns the key if this segment addresses an object field.
    pub fn as_key(&self) -> Option<&str> {
        match self {
            Self::Key(k) => Some(k),
            Self::Index(_) => None,
        }
    }

    /// Returns the index if this segment addresses an array position.
    pub fn as_index(&self) -> Option<usize> {
        match self {
            Self::Index(i) => Some(*i),
            Self::Key(_) => None,
        }
    }
}

impl fmt::Display for PathSegment {
    fn fmt(&self, f: &mut fmt::Formatter<'_>) -> fmt::Result {
        match self {
            Self::Index(i) => write!(f, "{i}"),
            Self::Key(k) => f.write_str(k),
        }
    }
}

impl From<usize> for PathSegment {
    fn from(i: usize) -> Self {
        Self::Index(i)
    }
}

impl From<&str> for PathSegment {
    fn from(k: &str) -> Self {
        Self::Key(k.to_string())
    }
}

impl From<String> for PathSegment {
    fn from(k: String) -> Self {
        Self::Key(k)
    }
}

/// Join a path with `.` separators, e.g. `entities.1.name`.
pub fn join_path(path: &[PathSegment]) -> String {
    path.iter()
        .map(ToString::to_string)
        .collect::<Vec<_>>()
        .join(".")
}
