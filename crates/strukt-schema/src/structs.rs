//! # Structs: Public Validation Handles
//!
//! A [`Struct`] binds a compiled [`Kind`] to the schema and defaults it was
//! built from and exposes the three entry points callers use:
//!
//! - [`Struct::validate`]: canonical, `Ok(normalized)` or `Err(StructError)`
//!   for a possibly-absent value. Never panics.
//! - [`Struct::assert`]: the same for a defined value, shaped for `?`.
//! - [`Struct::test`]: a boolean.
//!
//! [`Superstruct`] is the factory: it owns a [`TypeRegistry`] and builds
//! structs of every kind against it.

use std::sync::Arc;

use serde::de::DeserializeOwned;
use serde_json::Value;
use strukt_core::{SchemaError, StructError};

use crate::compile;
use crate::kind::Kind;
use crate::registry::{Predicate, TypeRegistry};
use crate::schema::{Defaults, Schema};

/// A compiled schema with its validation entry points.
#[derive(Clone, Debug)]
pub struct Struct {
    kind: Kind,
    schema: Schema,
    defaults: Option<Defaults>,
}

impl Struct {
    fn new(kind: Kind, schema: Schema, defaults: Option<Defaults>) -> Self {
        Self {
            kind,
            schema,
            defaults,
        }
    }

    /// The compiled kind.
    pub fn kind(&self) -> &Kind {
        &self.kind
    }

    /// Category name of the compiled kind.
    pub fn name(&self) -> &str {
        self.kind.name()
    }

    /// Type label of the compiled kind.
    pub fn type_label(&self) -> &str {
        self.kind.type_label()
    }

    /// The schema this struct was compiled from.
    pub fn schema(&self) -> &Schema {
        &self.schema
    }

    /// Defaults attached at compile time.
    pub fn defaults(&self) -> Option<&Defaults> {
        self.defaults.as_ref()
    }

    /// Validate a possibly-absent value.
    pub fn validate(&self, value: Option<&Value>) -> Result<Option<Value>, StructError> {
        self.kind.validate(value, None).map_err(StructError::from)
    }

    /// Validate a defined value, returning the normalized value.
    pub fn assert(&self, value: &Value) -> Result<Value, StructError> {
        // A defined input never validates to an absent result.
        self.validate(Some(value))
            .map(|result| result.unwrap_or_else(|| value.clone()))
    }

    /// Returns true if `value` is valid.
    pub fn test(&self, value: &Value) -> bool {
        self.kind.validate(Some(value), None).is_ok()
    }
}

impl From<Struct> for Kind {
    fn from(s: Struct) -> Self {
        s.kind
    }
}

impl From<Struct> for Schema {
    fn from(s: Struct) -> Self {
        Schema::Kind(s.kind)
    }
}

impl From<&Struct> for Schema {
    fn from(s: &Struct) -> Self {
        Schema::Kind(s.kind.clone())
    }
}

/// Factory binding a type registry to the kind constructors.
#[derive(Clone, Debug, Default)]
pub struct Superstruct {
    registry: Arc<TypeRegistry>,
}

impl Superstruct {
    /// A factory over the built-in types.
    pub fn new() -> Self {
        Self::default()
    }

    /// A factory over a custom registry.
    pub fn with_registry(registry: TypeRegistry) -> Self {
        Self {
            registry: Arc::new(registry),
        }
    }

    /// The registry scalar names resolve against.
    pub fn registry(&self) -> &TypeRegistry {
        &self.registry
    }

    /// Compile any schema shape.
    pub fn compile(&self, schema: impl Into<Schema>) -> Result<Struct, SchemaError> {
        self.build(schema.into(), None, compile::any)
    }

    /// Compile any schema shape with defaults.
    pub fn compile_with(
        &self,
        schema: impl Into<Schema>,
        defaults: impl Into<Defaults>,
    ) -> Result<Struct, SchemaError> {
        self.build(schema.into(), Some(defaults.into()), compile::any)
    }

    /// A registered primitive type.
    pub fn scalar(&self, name: &str) -> Result<Struct, SchemaError> {
        let kind = compile::scalar(name, None, &self.registry)?;
        Ok(Struct::new(kind, Schema::from(name), None))
    }

    /// An array of `element`.
    pub fn list(&self, element: impl Into<Schema>) -> Result<Struct, SchemaError> {
        self.compile(Schema::list(element))
    }

    /// A positional tuple.
    pub fn tuple<I, S>(&self, elements: I) -> Result<Struct, SchemaError>
    where
        I: IntoIterator<Item = S>,
        S: Into<Schema>,
    {
        let elements: Vec<Schema> = elements.into_iter().map(Into::into).collect();
        let kind = compile::tuple(&elements, None, &self.registry)?;
        Ok(Struct::new(kind, Schema::Array(elements), None))
    }

    /// An object with key schema `keys` and value schema `values`.
    pub fn dict(
        &self,
        keys: impl Into<Schema>,
        values: impl Into<Schema>,
    ) -> Result<Struct, SchemaError> {
        self.dict_with(keys, values, None)
    }

    /// [`Superstruct::dict`] with an optional whole-value default.
    pub fn dict_with(
        &self,
        keys: impl Into<Schema>,
        values: impl Into<Schema>,
        defaults: Option<Defaults>,
    ) -> Result<Struct, SchemaError> {
        let (keys, values) = (keys.into(), values.into());
        let kind = compile::dict(&keys, &values, defaults.clone(), &self.registry)?;
        Ok(Struct::new(kind, Schema::Array(vec![keys, values]), defaults))
    }

    /// A closed object.
    pub fn object(&self, fields: impl Into<Schema>) -> Result<Struct, SchemaError> {
        self.object_with(fields, None)
    }

    /// A closed object with optional defaults.
    pub fn object_with(
        &self,
        fields: impl Into<Schema>,
        defaults: Option<Defaults>,
    ) -> Result<Struct, SchemaError> {
        self.build_fields(fields.into(), defaults, compile::object)
    }

    /// An open object.
    pub fn interface(&self, fields: impl Into<Schema>) -> Result<Struct, SchemaError> {
        self.interface_with(fields, None)
    }

    /// An open object with optional defaults.
    pub fn interface_with(
        &self,
        fields: impl Into<Schema>,
        defaults: Option<Defaults>,
    ) -> Result<Struct, SchemaError> {
        self.build_fields(fields.into(), defaults, compile::interface)
    }

    /// A sparse object.
    pub fn partial(&self, fields: impl Into<Schema>) -> Result<Struct, SchemaError> {
        self.partial_with(fields, None)
    }

    /// A sparse object with optional defaults.
    pub fn partial_with(
        &self,
        fields: impl Into<Schema>,
        defaults: Option<Defaults>,
    ) -> Result<Struct, SchemaError> {
        self.build_fields(fields.into(), defaults, compile::partial)
    }

    /// First accepting alternative wins.
    pub fn union<I, S>(&self, alternatives: I) -> Result<Struct, SchemaError>
    where
        I: IntoIterator<Item = S>,
        S: Into<Schema>,
    {
        let alternatives: Vec<Schema> = alternatives.into_iter().map(Into::into).collect();
        let kind = compile::union(&alternatives, None, &self.registry)?;
        Ok(Struct::new(kind.clone(), Schema::Kind(kind), None))
    }

    /// Every stage must accept, in order.
    pub fn intersection<I, S>(&self, stages: I) -> Result<Struct, SchemaError>
    where
        I: IntoIterator<Item = S>,
        S: Into<Schema>,
    {
        let stages: Vec<Schema> = stages.into_iter().map(Into::into).collect();
        let kind = compile::intersection(&stages, None, &self.registry)?;
        Ok(Struct::new(kind.clone(), Schema::Kind(kind), None))
    }

    /// Absent, or accepted by `inner`.
    pub fn optional(&self, inner: impl Into<Schema>) -> Result<Struct, SchemaError> {
        let kind = compile::optional(inner, None, &self.registry)?;
        Ok(Struct::new(kind.clone(), Schema::Kind(kind), None))
    }

    /// One of `values`.
    pub fn enumeration<I>(&self, values: I) -> Result<Struct, SchemaError>
    where
        I: IntoIterator<Item = Value>,
    {
        self.enumeration_with(values, None)
    }

    /// One of `values`, with an optional default.
    pub fn enumeration_with<I>(
        &self,
        values: I,
        defaults: Option<Defaults>,
    ) -> Result<Struct, SchemaError>
    where
        I: IntoIterator<Item = Value>,
    {
        let kind = compile::enumeration(values.into_iter().collect(), defaults.clone())?;
        Ok(Struct::new(kind.clone(), Schema::Kind(kind), defaults))
    }

    /// An array of values from `values`.
    pub fn enums<I>(&self, values: I) -> Result<Struct, SchemaError>
    where
        I: IntoIterator<Item = Value>,
    {
        self.enums_with(values, None)
    }

    /// An array of values from `values`, with an optional default.
    pub fn enums_with<I>(&self, values: I, defaults: Option<Defaults>) -> Result<Struct, SchemaError>
    where
        I: IntoIterator<Item = Value>,
    {
        let kind = compile::enums(values.into_iter().collect(), defaults.clone(), &self.registry)?;
        Ok(Struct::new(kind.clone(), Schema::Kind(kind), defaults))
    }

    /// Exactly `value`.
    pub fn literal(&self, value: Value) -> Struct {
        let kind = compile::literal(value, None);
        Struct::new(kind.clone(), Schema::Kind(kind), None)
    }

    /// A value that deserializes into `T`.
    pub fn instance<T>(&self) -> Struct
    where
        T: DeserializeOwned + 'static,
    {
        let kind = compile::instance::<T>(None);
        Struct::new(kind.clone(), Schema::Kind(kind), None)
    }

    /// A custom predicate.
    pub fn function(&self, predicate: Predicate) -> Struct {
        let kind = compile::function(predicate.clone(), None);
        Struct::new(kind, Schema::Predicate(predicate), None)
    }

    /// A struct compiled on first validation, for recursive schemas.
    ///
    /// ```
    /// use serde_json::json;
    /// use strukt_schema::{Schema, SchemaError, Struct, Superstruct};
    ///
    /// fn node(f: &Superstruct) -> Result<Struct, SchemaError> {
    ///     let again = f.clone();
    ///     let child = f.lazy(move || node(&again));
    ///     f.object(Schema::fields([
    ///         ("value", Schema::from("string")),
    ///         ("children", Schema::list(child)),
    ///     ]))
    /// }
    ///
    /// let tree = node(&Superstruct::new()).unwrap();
    /// assert!(tree.test(&json!({"value": "root", "children": []})));
    /// ```
    pub fn lazy<F>(&self, thunk: F) -> Struct
    where
        F: Fn() -> Result<Struct, SchemaError> + Send + Sync + 'static,
    {
        let kind = compile::lazy(move || thunk().map(Kind::from));
        Struct::new(kind.clone(), Schema::Kind(kind), None)
    }

    fn build<F>(&self, schema: Schema, defaults: Option<Defaults>, f: F) -> Result<Struct, SchemaError>
    where
        F: FnOnce(&Schema, Option<Defaults>, &TypeRegistry) -> Result<Kind, SchemaError>,
    {
        let kind = f(&schema, defaults.clone(), &self.registry)?;
        tracing::debug!(kind = kind.name(), type_label = kind.type_label(), "compiled struct");
        Ok(Struct::new(kind, schema, defaults))
    }

    fn build_fields<F>(
        &self,
        schema: Schema,
        defaults: Option<Defaults>,
        f: F,
    ) -> Result<Struct, SchemaError>
    where
        F: FnOnce(&[(String, Schema)], Option<Defaults>, &TypeRegistry) -> Result<Kind, SchemaError>,
    {
        self.build(schema, defaults, |s, d, r| match s {
            Schema::Fields(fields) => f(fields, d, r),
            _ => Err(SchemaError::invalid("expected a field map schema")),
        })
    }
}

#[cfg(test)]
mod tests {
    use super::*;
    use crate::registry::Check;
    use serde_json::json;

    #[test]
    fn test_entry_points_agree() {
        let number = Superstruct::new().scalar("number").unwrap();
        assert!(number.test(&json!(1)));
        assert_eq!(number.assert(&json!(1)).unwrap(), json!(1));
        assert_eq!(number.validate(Some(&json!(1))).unwrap(), Some(json!(1)));

        assert!(!number.test(&json!("1")));
        let err = number.assert(&json!("1")).unwrap_err();
        assert_eq!(number.validate(Some(&json!("1"))).unwrap_err(), err);
    }

    #[test]
    fn test_assert_on_optional_returns_input() {
        let maybe = Superstruct::new().compile("string?").unwrap();
        assert_eq!(maybe.assert(&json!("x")).unwrap(), json!("x"));
        assert_eq!(maybe.validate(None).unwrap(), None);
    }

    #[test]
    fn test_struct_keeps_schema_and_defaults() {
        let limit = Superstruct::new().compile_with("number", json!(3)).unwrap();
        assert!(matches!(limit.schema(), Schema::Name(n) if n == "number"));
        assert!(matches!(limit.defaults(), Some(Defaults::Value(v)) if *v == json!(3)));
        assert_eq!(limit.name(), "scalar");
    }

    #[test]
    fn test_struct_reused_as_child_schema() {
        let f = Superstruct::new();
        let entity = f.scalar("string").unwrap();
        let row = f.object(Schema::fields([("entity", Schema::from(&entity))])).unwrap();
        assert_eq!(row.type_label(), "{entity}");
        assert!(row.test(&json!({"entity": "light.a"})));
    }

    #[test]
    fn test_custom_registry_types() {
        let registry = TypeRegistry::builder()
            .register("even", |v: Option<&Value>| {
                v.and_then(Value::as_i64).is_some_and(|n| n % 2 == 0)
            })
            .build();
        let f = Superstruct::with_registry(registry);
        let evens = f.list("even").unwrap();
        assert!(evens.test(&json!([2, 4])));
        assert_eq!(evens.assert(&json!([2, 3])).unwrap_err().path_string(), "1");
        assert!(Superstruct::new().scalar("even").is_err());
    }

    #[test]
    fn test_function_struct_reason() {
        let short = Superstruct::new().function(Predicate::new(|v, _| {
            match v.and_then(Value::as_str) {
                Some(s) if s.len() <= 3 => Check::Pass,
                _ => Check::Reason("too long".to_string()),
            }
        }));
        assert_eq!(short.type_label(), "<function>");
        assert_eq!(
            short.assert(&json!("abcd")).unwrap_err().reason.as_deref(),
            Some("too long")
        );
    }

    #[test]
    fn test_field_constructors_reject_non_field_schemas() {
        let f = Superstruct::new();
        assert!(f.object("string").is_err());
        assert!(f.interface(Schema::list("string")).is_err());
        assert!(f.partial("string").is_err());
    }
}
