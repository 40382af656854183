//! # Kinds: Compiled Validators
//!
//! A [`Kind`] is the executable form of a [`Schema`](crate::Schema): a
//! category name, a human-readable type label used in failure messages,
//! and a validation node. Kinds are immutable once built and cheap to
//! clone (`Arc`), so one compiled tree can be shared across threads.
//!
//! ## Validation Contract
//!
//! [`Kind::validate`] takes a possibly-absent value plus the enclosing value
//! (for computed defaults and context-aware predicates) and returns an
//! [`Outcome`]: either the normalized value or every failure of the pass.
//! Composite kinds never stop at the first bad child; they collect all child
//! failures, prefix each with the child's key or index, and report them
//! together.
//!
//! ## Lazy Kinds
//!
//! The only mutable state in a compiled tree is the memoisation slot of a
//! `lazy` kind, a `OnceLock` filled on first validation. A lazy kind reports
//! the name and label of its referent once resolved.

use std::collections::BTreeSet;
use std::fmt;
use std::sync::{Arc, OnceLock};

use serde_json::{Map, Value};
use strukt_core::{same_value, Failure, Failures, PathSegment, SchemaError, NEVER};

use crate::registry::{Check, Predicate};
use crate::schema::Defaults;

/// Result of validating one value: the normalized value (`None` when the
/// value is absent and stays absent) or every failure found.
pub type Outcome = Result<Option<Value>, Failures>;

type Thunk = dyn Fn() -> Result<Kind, SchemaError> + Send + Sync;

/// How an object-shaped kind treats keys outside its declaration.
#[derive(Debug, Clone, Copy, PartialEq, Eq)]
pub enum FieldPolicy {
    /// Unknown keys fail; every declared field is validated.
    Closed,
    /// Unknown keys pass through; every declared field is validated.
    Open,
    /// Unknown keys pass through; absent fields without a default are
    /// skipped.
    Sparse,
}

pub(crate) enum Node {
    Scalar(Predicate),
    Function(Predicate),
    List(Kind),
    Tuple(Vec<Kind>),
    Dict { keys: Kind, values: Kind },
    Fields { fields: Vec<(String, Kind)>, policy: FieldPolicy },
    Union(Vec<Kind>),
    Intersection(Vec<Kind>),
    Enum(Vec<Value>),
    Literal(Value),
    Lazy(LazySlot),
}

pub(crate) struct LazySlot {
    thunk: Box<Thunk>,
    resolved: OnceLock<Result<Kind, String>>,
}

impl LazySlot {
    pub(crate) fn new<F>(thunk: F) -> Self
    where
        F: Fn() -> Result<Kind, SchemaError> + Send + Sync + 'static,
    {
        Self {
            thunk: Box::new(thunk),
            resolved: OnceLock::new(),
        }
    }

    fn get(&self) -> &Result<Kind, String> {
        self.resolved.get_or_init(|| {
            tracing::debug!("resolving lazy schema");
            (self.thunk)().map_err(|e| {
                tracing::warn!(error = %e, "lazy schema failed to compile");
                e.to_string()
            })
        })
    }

    fn peek(&self) -> Option<&Kind> {
        self.resolved.get().and_then(|r| r.as_ref().ok())
    }
}

struct KindInner {
    name: &'static str,
    type_label: String,
    defaults: Option<Defaults>,
    node: Node,
}

/// A compiled validator.
#[derive(Clone)]
pub struct Kind(Arc<KindInner>);

impl Kind {
    pub(crate) fn new(
        name: &'static str,
        type_label: impl Into<String>,
        defaults: Option<Defaults>,
        node: Node,
    ) -> Self {
        Self(Arc::new(KindInner {
            name,
            type_label: type_label.into(),
            defaults,
            node,
        }))
    }

    /// Category name: `scalar`, `list`, `object`, `union`, ...
    pub fn name(&self) -> &str {
        match &self.0.node {
            Node::Lazy(slot) => slot.peek().map_or(self.0.name, Kind::name),
            _ => self.0.name,
        }
    }

    /// Human-readable type label used in failure messages.
    pub fn type_label(&self) -> &str {
        match &self.0.node {
            Node::Lazy(slot) => slot.peek().map_or(self.0.type_label.as_str(), Kind::type_label),
            _ => &self.0.type_label,
        }
    }

    /// Defaults attached to this kind.
    pub fn defaults(&self) -> Option<&Defaults> {
        self.0.defaults.as_ref()
    }

    /// Validate a possibly-absent value.
    ///
    /// `context` is the value enclosing `value`, handed to computed defaults
    /// and predicates.
    pub fn validate(&self, value: Option<&Value>, context: Option<&Value>) -> Outcome {
        let inner = &*self.0;
        let fallback;
        let value = match (value, &inner.defaults) {
            (None, Some(defaults)) => {
                fallback = defaults.resolve(context);
                fallback.as_ref()
            }
            _ => value,
        };

        let outcome = match &inner.node {
            Node::Scalar(predicate) | Node::Function(predicate) => {
                self.run_predicate(predicate, value, context)
            }
            Node::List(element) => self.validate_list(element, value),
            Node::Tuple(elements) => self.validate_tuple(elements, value),
            Node::Dict { keys, values } => {
                let merged = self.merge_defaults(value, context);
                self.validate_dict(keys, values, merged.as_ref().or(value))
            }
            Node::Fields { fields, policy } => {
                let merged = match policy {
                    FieldPolicy::Open => self.merge_defaults(value, context),
                    _ => None,
                };
                self.validate_fields(fields, *policy, merged.as_ref().or(value))
            }
            Node::Union(kinds) => self.validate_union(kinds, value, context),
            Node::Intersection(kinds) => self.validate_intersection(kinds, value, context),
            Node::Enum(allowed) => match value {
                Some(v) if allowed.iter().any(|a| same_value(a, v)) => Ok(Some(v.clone())),
                _ => Err(Failures::single(Failure::new(value, self.type_label()))),
            },
            Node::Literal(expected) => match value {
                Some(v) if same_value(v, expected) => Ok(Some(v.clone())),
                _ => Err(Failures::single(Failure::new(value, self.type_label()))),
            },
            Node::Lazy(slot) => match slot.get() {
                Ok(kind) => kind.validate(value, context),
                Err(reason) => Err(Failures::single(
                    Failure::new(value, self.type_label()).with_reason(reason.clone()),
                )),
            },
        };

        if let Err(failures) = &outcome {
            tracing::trace!(
                kind = self.name(),
                failures = failures.len(),
                "validation failed"
            );
        }
        outcome
    }

    /// `{...defaults, ...value}` for kinds that merge a whole-value default
    /// underneath present input.
    fn merge_defaults(&self, value: Option<&Value>, context: Option<&Value>) -> Option<Value> {
        let resolved = self.0.defaults.as_ref()?.resolve(context)?;
        match (resolved, value) {
            (Value::Object(mut base), Some(Value::Object(over))) => {
                for (k, v) in over {
                    base.insert(k.clone(), v.clone());
                }
                Some(Value::Object(base))
            }
            _ => None,
        }
    }

    fn run_predicate(
        &self,
        predicate: &Predicate,
        value: Option<&Value>,
        context: Option<&Value>,
    ) -> Outcome {
        let failure = Failure::new(value, self.type_label());
        match predicate.check(value, context) {
            Check::Pass => Ok(value.cloned()),
            Check::Fail => Err(Failures::single(failure)),
            Check::Reason(reason) => Err(Failures::single(failure.with_reason(reason))),
            Check::Detail { path, reason } => Err(Failures::single(Failure {
                path,
                reason,
                ..failure
            })),
        }
    }

    fn validate_list(&self, element: &Kind, value: Option<&Value>) -> Outcome {
        let Some((enclosing, items)) = value.and_then(|v| v.as_array().map(|a| (v, a))) else {
            return Err(Failures::single(Failure::new(value, self.type_label())));
        };
        let mut errors = Vec::new();
        let mut ret = Vec::with_capacity(items.len());
        for (i, item) in items.iter().enumerate() {
            match element.validate(Some(item), Some(enclosing)) {
                Ok(r) => ret.push(r.unwrap_or_else(|| item.clone())),
                Err(f) => errors.extend(f.prefixed(&PathSegment::Index(i), enclosing)),
            }
        }
        finish(errors, Value::Array(ret))
    }

    fn validate_tuple(&self, elements: &[Kind], value: Option<&Value>) -> Outcome {
        let Some((enclosing, items)) = value.and_then(|v| v.as_array().map(|a| (v, a))) else {
            return Err(Failures::single(Failure::new(value, self.type_label())));
        };
        let mut errors = Vec::new();
        let mut ret = Vec::with_capacity(elements.len());
        for i in 0..items.len().max(elements.len()) {
            let item = items.get(i);
            let Some(kind) = elements.get(i) else {
                let mut extra = Failure::new(item, NEVER);
                extra.path = vec![PathSegment::Index(i)];
                extra.data = Some(enclosing.clone());
                errors.push(extra);
                continue;
            };
            match kind.validate(item, Some(enclosing)) {
                Ok(r) => ret.push(r),
                Err(f) => errors.extend(f.prefixed(&PathSegment::Index(i), enclosing)),
            }
        }
        // Absent trailing positions stay absent; a hole before a defaulted
        // position can only be written as null.
        while ret.last().is_some_and(Option::is_none) {
            ret.pop();
        }
        let ret = ret.into_iter().map(|r| r.unwrap_or(Value::Null)).collect();
        finish(errors, Value::Array(ret))
    }

    fn validate_dict(&self, keys: &Kind, values: &Kind, value: Option<&Value>) -> Outcome {
        let Some((enclosing, map)) = value.and_then(|v| v.as_object().map(|m| (v, m))) else {
            return Err(Failures::single(Failure::new(value, self.type_label())));
        };
        let mut errors = Vec::new();
        let mut ret = Map::new();
        for (k, v) in map {
            let key_value = Value::String(k.clone());
            let key = match keys.validate(Some(&key_value), Some(enclosing)) {
                Ok(Some(Value::String(coerced))) => coerced,
                Ok(Some(other)) => other.to_string(),
                Ok(None) => k.clone(),
                Err(f) => {
                    errors.extend(f.prefixed(&PathSegment::Key(k.clone()), enclosing));
                    continue;
                }
            };
            match values.validate(Some(v), Some(enclosing)) {
                Ok(Some(r)) => {
                    ret.insert(key, r);
                }
                Ok(None) => {}
                Err(f) => errors.extend(f.prefixed(&PathSegment::Key(key), enclosing)),
            }
        }
        finish(errors, Value::Object(ret))
    }

    fn validate_fields(
        &self,
        fields: &[(String, Kind)],
        policy: FieldPolicy,
        value: Option<&Value>,
    ) -> Outcome {
        let Some((enclosing, map)) = value.and_then(|v| v.as_object().map(|m| (v, m))) else {
            return Err(Failures::single(Failure::new(value, self.type_label())));
        };

        let mut ret = match policy {
            FieldPolicy::Closed => Map::new(),
            FieldPolicy::Open | FieldPolicy::Sparse => map.clone(),
        };

        // Closed objects visit input keys first, then declared keys the
        // input lacks.
        let mut keys: Vec<&str> = Vec::new();
        if policy == FieldPolicy::Closed {
            let mut seen = BTreeSet::new();
            for k in map.keys().map(String::as_str).chain(fields.iter().map(|(k, _)| k.as_str())) {
                if seen.insert(k) {
                    keys.push(k);
                }
            }
        } else {
            keys.extend(fields.iter().map(|(k, _)| k.as_str()));
        }

        let mut errors = Vec::new();
        for key in keys {
            let present = map.get(key);
            let defaulted;
            let v = match present {
                Some(v) => Some(v),
                None => {
                    defaulted = self
                        .0
                        .defaults
                        .as_ref()
                        .and_then(|d| d.resolve_field(key, enclosing));
                    defaulted.as_ref()
                }
            };
            let segment = PathSegment::Key(key.to_string());

            let Some((_, kind)) = fields.iter().find(|(k, _)| k == key) else {
                let mut unknown = Failure::new(v, NEVER);
                unknown.path = vec![segment];
                unknown.data = Some(enclosing.clone());
                errors.push(unknown);
                continue;
            };

            if v.is_none() && policy == FieldPolicy::Sparse {
                continue;
            }

            match kind.validate(v, Some(enclosing)) {
                Ok(Some(r)) => {
                    ret.insert(key.to_string(), r);
                }
                Ok(None) => {}
                Err(f) => errors.extend(f.prefixed(&segment, enclosing)),
            }
        }
        finish(errors, Value::Object(ret))
    }

    fn validate_union(&self, kinds: &[Kind], value: Option<&Value>, context: Option<&Value>) -> Outcome {
        let mut best: Option<Failures> = None;
        for kind in kinds {
            match kind.validate(value, context) {
                Ok(r) => return Ok(r),
                Err(f) => {
                    // The branch that got furthest into the value wins; ties
                    // keep the earliest declared branch.
                    let deeper = best
                        .as_ref()
                        .map_or(true, |b| f.first().path.len() > b.first().path.len());
                    if deeper {
                        best = Some(f);
                    }
                }
            }
        }
        let mut failures =
            best.unwrap_or_else(|| Failures::single(Failure::new(value, self.type_label())));
        failures.relabel_at_root(self.type_label());
        Err(failures)
    }

    fn validate_intersection(
        &self,
        kinds: &[Kind],
        value: Option<&Value>,
        context: Option<&Value>,
    ) -> Outcome {
        let mut current = value.cloned();
        for kind in kinds {
            match kind.validate(current.as_ref(), context) {
                Ok(r) => current = r,
                Err(mut f) => {
                    f.relabel_at_root(self.type_label());
                    return Err(f);
                }
            }
        }
        Ok(current)
    }
}

fn finish(errors: Vec<Failure>, result: Value) -> Outcome {
    match Failures::from_vec(errors) {
        Some(failures) => Err(failures),
        None => Ok(Some(result)),
    }
}

impl fmt::Debug for Kind {
    fn fmt(&self, f: &mut fmt::Formatter<'_>) -> fmt::Result {
        f.debug_struct("Kind")
            .field("name", &self.name())
            .field("type", &self.type_label())
            .finish()
    }
}
