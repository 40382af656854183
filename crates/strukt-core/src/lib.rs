//! # strukt-core: Foundational Types for strukt
//!
//! The leaf crate of the workspace. It defines the vocabulary every other
//! crate speaks: how a JSON value is categorised, how a failure is located,
//! and how validation failures and schema authoring errors are reported.
//!
//! ## Key Design Principles
//!
//! 1. **Absent is not null.** A missing value is `None`; an explicit JSON
//!    `null` is `Some(Value::Null)`. [`kind_of`] reports them as different
//!    categories.
//!
//! 2. **Failures are data.** Type mismatches travel as [`Failures`] return
//!    values and surface as [`StructError`]; they are never panics.
//!
//! 3. **Authoring mistakes fail fast.** Unknown type names and malformed
//!    schema shapes are [`SchemaError`]s, returned at compile time.
//!
//! ## Crate Policy
//!
//! - No dependencies on other `strukt-*` crates.
//! - No `unsafe` code.
//! - No `panic!()` or `.unwrap()` outside tests.

pub mod error;
pub mod path;
pub mod value;

// Re-export primary types for ergonomic imports.
pub use error::{Failure, Failures, SchemaError, StructError, NEVER};
pub use path::{join_path, PathSegment};
pub use value::{is_date, is_integer, kind_of, render, same_value, ValueKind};
