//! # Schema Compiler
//!
//! Turns [`Schema`] descriptions into [`Kind`] trees. [`any`] is the
//! dispatcher every composite kind calls on its children; the remaining
//! functions build one kind each.
//!
//! Children are always compiled without defaults: defaults attach to the
//! kind being built and, for object-shaped kinds, are looked up per field
//! at validation time.
//!
//! Every function here fails fast with a [`SchemaError`] on an authoring
//! mistake. None of them touch a value.

use serde::de::DeserializeOwned;
use serde::Deserialize;
use serde_json::Value;
use strukt_core::{render, SchemaError};

use crate::kind::{FieldPolicy, Kind, LazySlot, Node};
use crate::registry::{Predicate, TypeRegistry};
use crate::schema::{Defaults, Schema};

const OPTIONAL_MARKER: char = '?';
const UNION_SEPARATOR: char = '|';
const INTERSECTION_SEPARATOR: char = '&';

/// Compile any schema shape.
///
/// - a compiled kind is returned unchanged;
/// - a one-element array compiles as a list, a longer one as a tuple;
/// - a field map compiles as a closed object;
/// - a predicate compiles as a function kind;
/// - a name with a trailing `?` compiles as optional, a name containing `|`
///   as a union of scalars, one containing `&` as an intersection of
///   scalars, anything else as a scalar.
pub fn any(
    schema: &Schema,
    defaults: Option<Defaults>,
    registry: &TypeRegistry,
) -> Result<Kind, SchemaError> {
    match schema {
        Schema::Kind(kind) => Ok(kind.clone()),
        Schema::Array(items) if items.len() == 1 => list(&items[0], defaults, registry),
        Schema::Array(items) if items.len() > 1 => tuple(items, defaults, registry),
        Schema::Array(_) => Err(SchemaError::invalid("an array schema needs at least one element")),
        Schema::Fields(fields) => object(fields, defaults, registry),
        Schema::Predicate(predicate) => Ok(function(predicate.clone(), defaults)),
        Schema::Name(name) => name_kind(name, defaults, registry),
    }
}

fn name_kind(
    name: &str,
    defaults: Option<Defaults>,
    registry: &TypeRegistry,
) -> Result<Kind, SchemaError> {
    let trimmed = name.trim();
    let (body, required) = match trimmed.strip_suffix(OPTIONAL_MARKER) {
        Some(body) => (body.trim(), false),
        None => (trimmed, true),
    };
    if body.is_empty() {
        return Err(SchemaError::invalid(format!("empty type name in `{name}`")));
    }

    let split = |sep: char| -> Vec<Schema> {
        body.split(sep).map(|s| Schema::Name(s.trim().to_string())).collect()
    };

    if !required {
        let inner = name_kind(body, None, registry)?;
        return optional(inner, defaults, registry);
    }
    if body.contains(UNION_SEPARATOR) {
        union(&split(UNION_SEPARATOR), defaults, registry)
    } else if body.contains(INTERSECTION_SEPARATOR) {
        intersection(&split(INTERSECTION_SEPARATOR), defaults, registry)
    } else {
        scalar(body, defaults, registry)
    }
}

/// A registered primitive type.
pub fn scalar(
    name: &str,
    defaults: Option<Defaults>,
    registry: &TypeRegistry,
) -> Result<Kind, SchemaError> {
    let predicate = registry.require(name)?.clone();
    Ok(Kind::new("scalar", name, defaults, Node::Scalar(predicate)))
}

/// A custom predicate.
pub fn function(predicate: Predicate, defaults: Option<Defaults>) -> Kind {
    Kind::new("function", "<function>", defaults, Node::Function(predicate))
}

/// An array whose every element satisfies `element`.
pub fn list(
    element: &Schema,
    defaults: Option<Defaults>,
    registry: &TypeRegistry,
) -> Result<Kind, SchemaError> {
    let element = any(element, None, registry)?;
    let label = format!("[{}]", element.type_label());
    Ok(Kind::new("list", label, defaults, Node::List(element)))
}

/// A fixed-length positional array.
pub fn tuple(
    elements: &[Schema],
    defaults: Option<Defaults>,
    registry: &TypeRegistry,
) -> Result<Kind, SchemaError> {
    if elements.is_empty() {
        return Err(SchemaError::invalid("a tuple schema needs at least one element"));
    }
    let kinds = compile_all(elements, registry)?;
    let label = format!("[{}]", join_labels(&kinds, ","));
    Ok(Kind::new("tuple", label, defaults, Node::Tuple(kinds)))
}

/// An object whose every key satisfies `keys` and every value `values`.
pub fn dict(
    keys: &Schema,
    values: &Schema,
    defaults: Option<Defaults>,
    registry: &TypeRegistry,
) -> Result<Kind, SchemaError> {
    let keys = any(keys, None, registry)?;
    let values = any(values, None, registry)?;
    let label = format!("dict<{},{}>", keys.type_label(), values.type_label());
    Ok(Kind::new("dict", label, defaults, Node::Dict { keys, values }))
}

/// A closed object: unknown keys fail.
pub fn object(
    fields: &[(String, Schema)],
    defaults: Option<Defaults>,
    registry: &TypeRegistry,
) -> Result<Kind, SchemaError> {
    fields_kind("object", fields, FieldPolicy::Closed, defaults, registry)
}

/// An open object: declared fields are checked, unknown keys pass through.
pub fn interface(
    fields: &[(String, Schema)],
    defaults: Option<Defaults>,
    registry: &TypeRegistry,
) -> Result<Kind, SchemaError> {
    fields_kind("interface", fields, FieldPolicy::Open, defaults, registry)
}

/// A sparse object: declared fields are checked when present.
pub fn partial(
    fields: &[(String, Schema)],
    defaults: Option<Defaults>,
    registry: &TypeRegistry,
) -> Result<Kind, SchemaError> {
    fields_kind("partial", fields, FieldPolicy::Sparse, defaults, registry)
}

fn fields_kind(
    name: &'static str,
    fields: &[(String, Schema)],
    policy: FieldPolicy,
    defaults: Option<Defaults>,
    registry: &TypeRegistry,
) -> Result<Kind, SchemaError> {
    let mut compiled: Vec<(String, Kind)> = Vec::with_capacity(fields.len());
    for (key, schema) in fields {
        if compiled.iter().any(|(k, _)| k == key) {
            return Err(SchemaError::invalid(format!("duplicate field `{key}`")));
        }
        compiled.push((key.clone(), any(schema, None, registry)?));
    }
    let keys = compiled
        .iter()
        .map(|(k, _)| k.as_str())
        .collect::<Vec<_>>()
        .join(",");
    let label = match policy {
        FieldPolicy::Sparse => format!("{{{keys},...}}"),
        FieldPolicy::Closed | FieldPolicy::Open => format!("{{{keys}}}"),
    };
    tracing::debug!(kind = name, fields = compiled.len(), "compiled field kind");
    Ok(Kind::new(
        name,
        label,
        defaults,
        Node::Fields {
            fields: compiled,
            policy,
        },
    ))
}

/// The first alternative that accepts the value wins.
pub fn union(
    alternatives: &[Schema],
    defaults: Option<Defaults>,
    registry: &TypeRegistry,
) -> Result<Kind, SchemaError> {
    if alternatives.is_empty() {
        return Err(SchemaError::invalid("a union needs at least one alternative"));
    }
    let kinds = compile_all(alternatives, registry)?;
    let label = join_labels(&kinds, " | ");
    Ok(Kind::new("union", label, defaults, Node::Union(kinds)))
}

/// Every stage must accept the output of the previous one.
pub fn intersection(
    stages: &[Schema],
    defaults: Option<Defaults>,
    registry: &TypeRegistry,
) -> Result<Kind, SchemaError> {
    if stages.is_empty() {
        return Err(SchemaError::invalid("an intersection needs at least one stage"));
    }
    let kinds = compile_all(stages, registry)?;
    let label = join_labels(&kinds, " & ");
    Ok(Kind::new("intersection", label, defaults, Node::Intersection(kinds)))
}

/// `union([T, "undefined"])`.
pub fn optional(
    inner: impl Into<Schema>,
    defaults: Option<Defaults>,
    registry: &TypeRegistry,
) -> Result<Kind, SchemaError> {
    union(&[inner.into(), Schema::from("undefined")], defaults, registry)
}

/// One of a fixed set of literals.
pub fn enumeration(values: Vec<Value>, defaults: Option<Defaults>) -> Result<Kind, SchemaError> {
    if values.is_empty() {
        return Err(SchemaError::invalid("an enum needs at least one literal"));
    }
    let label = values
        .iter()
        .map(|v| render(Some(v)))
        .collect::<Vec<_>>()
        .join(" | ");
    Ok(Kind::new("enum", label, defaults, Node::Enum(values)))
}

/// An array of literals from a fixed set.
pub fn enums(
    values: Vec<Value>,
    defaults: Option<Defaults>,
    registry: &TypeRegistry,
) -> Result<Kind, SchemaError> {
    let element = enumeration(values, None)?;
    list(&Schema::Kind(element), defaults, registry)
}

/// Exactly one value.
pub fn literal(value: Value, defaults: Option<Defaults>) -> Kind {
    let label = format!("literal: {}", render(Some(&value)));
    Kind::new("literal", label, defaults, Node::Literal(value))
}

/// A value that deserializes into the Rust type `T`.
pub fn instance<T>(defaults: Option<Defaults>) -> Kind
where
    T: DeserializeOwned + 'static,
{
    let short = short_type_name(std::any::type_name::<T>());
    let predicate = Predicate::from_fn(|value: Option<&Value>| -> Result<(), String> {
        match value {
            Some(v) => T::deserialize(v).map(|_| ()).map_err(|e| e.to_string()),
            None => Err("value is absent".to_string()),
        }
    });
    Kind::new(
        "instance",
        format!("instance<{short}>"),
        defaults,
        Node::Function(predicate),
    )
}

/// `alloc::vec::Vec<app::Point>` becomes `Vec<Point>`.
fn short_type_name(full: &str) -> String {
    let mut out = String::with_capacity(full.len());
    let mut segment = String::new();
    for c in full.chars() {
        if c.is_alphanumeric() || c == '_' || c == ':' {
            segment.push(c);
        } else {
            out.push_str(segment.rsplit("::").next().unwrap_or(&segment));
            segment.clear();
            out.push(c);
        }
    }
    out.push_str(segment.rsplit("::").next().unwrap_or(&segment));
    out
}

/// A kind compiled on first use and memoised, for recursive schemas.
pub fn lazy<F>(thunk: F) -> Kind
where
    F: Fn() -> Result<Kind, SchemaError> + Send + Sync + 'static,
{
    Kind::new("lazy", "lazy...", None, Node::Lazy(LazySlot::new(thunk)))
}

fn compile_all(schemas: &[Schema], registry: &TypeRegistry) -> Result<Vec<Kind>, SchemaError> {
    schemas.iter().map(|s| any(s, None, registry)).collect()
}

fn join_labels(kinds: &[Kind], separator: &str) -> String {
    kinds
        .iter()
        .map(Kind::type_label)
        .collect::<Vec<_>>()
        .join(separator)
}
