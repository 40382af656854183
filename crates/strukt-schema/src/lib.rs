//! # strukt-schema: Schema Compilation & Validation
//!
//! Compiles declarative schemas into validators and runs them over
//! `serde_json::Value` data, collecting every failure with its path.
//!
//! ## Pipeline
//!
//! 1. A [`Schema`] describes an expected shape: a type name (`"string?"`,
//!    `"string | number"`), a list or tuple, a field map, a predicate, or
//!    an already compiled kind.
//! 2. The [`compile`] module turns it into a [`Kind`] tree, resolving
//!    scalar names against a [`TypeRegistry`]. Unknown names and
//!    malformed shapes are a [`SchemaError`] here, never later.
//! 3. A [`Struct`] wraps the kind and exposes `validate`, `assert` and
//!    `test`. Failures surface as a [`StructError`] whose representative
//!    failure carries the path, value and expected type; the full list is
//!    in `errors`.
//!
//! [`Superstruct`] is the factory tying a registry to the constructors.
//!
//! ## Configuration
//!
//! - [`TypesConfig`] declares custom scalar types in YAML.
//! - [`SchemaDocument`] loads a schema (and its defaults) from a file.
//! - [`dashboard`] provides ready-made dashboard configuration schemas.
//!
//! ## Crate Policy
//!
//! - Depends only on `strukt-core` internally.
//! - Validation is total: it returns a value or failures and never panics.
//! - Compiled kinds are immutable and `Send + Sync`; the only interior
//!   state is the memoisation slot of lazy kinds.

pub mod compile;
pub mod dashboard;
pub mod document;
pub mod kind;
pub mod registry;
pub mod schema;
pub mod structs;
pub mod types_config;

pub use document::{load_value, parse_value, DocumentKind, SchemaDocument};
pub use kind::{FieldPolicy, Kind, Outcome};
pub use registry::{Check, Predicate, TypeRegistry, TypeRegistryBuilder};
pub use schema::{Defaults, Schema};
pub use structs::{Struct, Superstruct};
pub use types_config::{TypeRule, TypesConfig, TypesConfigError};

pub use strukt_core::{Failure, Failures, PathSegment, SchemaError, StructError};
