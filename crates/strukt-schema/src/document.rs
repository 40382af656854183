//! # Schema Documents
//!
//! Schemas and the values they validate can live in files. A schema
//! document is YAML or JSON of the form:
//!
//! ```yaml
//! kind: object        # optional; see DocumentKind
//! schema:
//!   type: string
//!   title: string | number?
//!   entities: [string]
//! defaults:           # optional
//!   title: Home
//! ```
//!
//! Both formats are decoded through `serde_yaml` (JSON is valid YAML) and
//! normalised to `serde_json::Value` before compilation.

use std::fmt;
use std::path::Path;
use std::str::FromStr;

use serde::{Deserialize, Serialize};
use serde_json::Value;
use strukt_core::{join_path, PathSegment, SchemaError};

use crate::schema::{Defaults, Schema};
use crate::structs::{Struct, Superstruct};

/// Which constructor a document's `schema` is compiled with.
#[derive(Debug, Clone, Copy, Default, PartialEq, Eq, Serialize, Deserialize)]
#[serde(rename_all = "snake_case")]
pub enum DocumentKind {
    /// Dispatch on the schema's shape.
    #[default]
    Any,
    /// Closed object (field map).
    Object,
    /// Open object (field map).
    Interface,
    /// Sparse object (field map).
    Partial,
    /// `[key, value]` pair.
    Dict,
    /// Array of literals: one of them.
    Enum,
    /// Array of literals: an array of them.
    Enums,
    /// Exactly the given value.
    Literal,
}

impl DocumentKind {
    /// Returns all document kinds.
    pub fn all() -> &'static [DocumentKind] {
        &[
            Self::Any,
            Self::Object,
            Self::Interface,
            Self::Partial,
            Self::Dict,
            Self::Enum,
            Self::Enums,
            Self::Literal,
        ]
    }

    /// Returns the snake_case name.
    pub fn as_str(&self) -> &'static str {
        match self {
            Self::Any => "any",
            Self::Object => "object",
            Self::Interface => "interface",
            Self::Partial => "partial",
            Self::Dict => "dict",
            Self::Enum => "enum",
            Self::Enums => "enums",
            Self::Literal => "literal",
        }
    }
}

impl fmt::Display for DocumentKind {
    fn fmt(&self, f: &mut fmt::Formatter<'_>) -> fmt::Result {
        f.write_str(self.as_str())
    }
}

impl FromStr for DocumentKind {
    type Err = SchemaError;

    fn from_str(s: &str) -> Result<Self, Self::Err> {
        Self::all()
            .iter()
            .copied()
            .find(|k| k.as_str() == s)
            .ok_or_else(|| SchemaError::invalid(format!("unknown document kind `{s}`")))
    }
}

/// A schema loaded from a file.
#[derive(Debug, Clone, PartialEq, Serialize, Deserialize)]
#[serde(deny_unknown_fields)]
pub struct SchemaDocument {
    /// Constructor to compile with.
    #[serde(default)]
    pub kind: DocumentKind,
    /// The schema body.
    pub schema: Value,
    /// Fixed defaults for absent values.
    #[serde(default, skip_serializing_if = "Option::is_none")]
    pub defaults: Option<Value>,
}

impl SchemaDocument {
    /// Parse a YAML or JSON document.
    pub fn from_str(content: &str, source_name: &str) -> Result<Self, SchemaError> {
        let value = parse_value(content, source_name)?;
        serde_json::from_value(value).map_err(|e| SchemaError::Document {
            source_name: source_name.to_string(),
            reason: e.to_string(),
        })
    }

    /// Read and parse a document file.
    pub fn load(path: &Path) -> Result<Self, SchemaError> {
        let content = std::fs::read_to_string(path)?;
        Self::from_str(&content, &path.display().to_string())
    }

    /// Compile against `factory`'s registry.
    pub fn compile(&self, factory: &Superstruct) -> Result<Struct, SchemaError> {
        let defaults = self.defaults.clone().map(Defaults::Value);
        match self.kind {
            DocumentKind::Any => {
                let schema = Schema::from_json(&self.schema)?;
                match defaults {
                    Some(d) => factory.compile_with(schema, d),
                    None => factory.compile(schema),
                }
            }
            DocumentKind::Object => factory.object_with(self.field_schema()?, defaults),
            DocumentKind::Interface => factory.interface_with(self.field_schema()?, defaults),
            DocumentKind::Partial => factory.partial_with(self.field_schema()?, defaults),
            DocumentKind::Dict => match &self.schema {
                Value::Array(pair) if pair.len() == 2 => factory.dict_with(
                    Schema::from_json(&pair[0])?,
                    Schema::from_json(&pair[1])?,
                    defaults,
                ),
                _ => Err(SchemaError::invalid("a dict schema must be a [key, value] pair")),
            },
            DocumentKind::Enum => factory.enumeration_with(self.literals()?, defaults),
            DocumentKind::Enums => factory.enums_with(self.literals()?, defaults),
            DocumentKind::Literal => Ok(factory.literal(self.schema.clone())),
        }
    }

    fn field_schema(&self) -> Result<Schema, SchemaError> {
        match &self.schema {
            Value::Object(_) => Schema::from_json(&self.schema),
            _ => Err(SchemaError::invalid(format!(
                "a {} schema must be a field map",
                self.kind
            ))),
        }
    }

    fn literals(&self) -> Result<Vec<Value>, SchemaError> {
        match &self.schema {
            Value::Array(items) => Ok(items.clone()),
            _ => Err(SchemaError::invalid(format!(
                "an {} schema must be an array of literals",
                self.kind
            ))),
        }
    }
}

/// Parse YAML or JSON text into a JSON value.
///
/// Only the JSON-compatible subset of YAML is accepted. A value outside it
/// (a sequence used as a map key, a `.nan` float) is reported with the
/// document path where it occurs.
pub fn parse_value(content: &str, source_name: &str) -> Result<Value, SchemaError> {
    let yaml: serde_yaml::Value =
        serde_yaml::from_str(content).map_err(|e| SchemaError::Document {
            source_name: source_name.to_string(),
            reason: format!("invalid YAML: {e}"),
        })?;
    let mut at = Vec::new();
    to_json(&yaml, &mut at).map_err(|reason| SchemaError::Document {
        source_name: source_name.to_string(),
        reason,
    })
}

/// Read a YAML or JSON file into a JSON value.
pub fn load_value(path: &Path) -> Result<Value, SchemaError> {
    let content = std::fs::read_to_string(path)?;
    parse_value(&content, &path.display().to_string())
}

fn location(at: &[PathSegment]) -> String {
    match join_path(at) {
        path if path.is_empty() => "the document root".to_string(),
        path => format!("`{path}`"),
    }
}

fn to_json(yaml: &serde_yaml::Value, at: &mut Vec<PathSegment>) -> Result<Value, String> {
    use serde_yaml::Value as Yaml;

    Ok(match yaml {
        Yaml::Null => Value::Null,
        Yaml::Bool(b) => Value::Bool(*b),
        Yaml::String(s) => Value::String(s.clone()),
        Yaml::Number(n) => match (n.as_u64(), n.as_i64(), n.as_f64()) {
            (Some(u), _, _) => Value::from(u),
            (_, Some(i), _) => Value::from(i),
            (_, _, Some(f)) => serde_json::Number::from_f64(f)
                .map(Value::Number)
                .ok_or_else(|| format!("{f} at {} has no JSON form", location(at)))?,
            _ => return Err(format!("unreadable number at {}", location(at))),
        },
        Yaml::Sequence(items) => {
            let mut out = Vec::with_capacity(items.len());
            for (i, item) in items.iter().enumerate() {
                at.push(PathSegment::Index(i));
                out.push(to_json(item, at)?);
                at.pop();
            }
            Value::Array(out)
        }
        Yaml::Mapping(map) => {
            let mut out = serde_json::Map::with_capacity(map.len());
            for (k, v) in map {
                let key = match k {
                    Yaml::String(s) => s.clone(),
                    Yaml::Number(n) => n.to_string(),
                    Yaml::Bool(b) => b.to_string(),
                    _ => return Err(format!("map key at {} is not a scalar", location(at))),
                };
                at.push(PathSegment::Key(key.clone()));
                out.insert(key, to_json(v, at)?);
                at.pop();
            }
            Value::Object(out)
        }
        Yaml::Tagged(tagged) => to_json(&tagged.value, at)?,
    })
}
