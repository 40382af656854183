//! # Declarative Custom Types
//!
//! Loads additional scalar types from a YAML or JSON configuration so that
//! domain tags like `entity-id` or `icon` can be declared without Rust code:
//!
//! ```yaml
//! types:
//!   entity-id:
//!     base: string
//!     contains: "."
//!     reason: "entity id should be in the format 'domain.entity'"
//!   icon:
//!     base: string
//!     pattern: "^[a-z]+:[a-z0-9-]+$"
//!     reason: "icon should be in the format 'mdi:icon'"
//! ```
//!
//! Every rule narrows a built-in `base` type. A value failing the base check
//! reports `base_reason` (or "`<name>` should be a `<base>`"); a value
//! failing any other rule reports `reason` (or a description of the rule).

use std::collections::BTreeMap;
use std::path::Path;

use regex::Regex;
use serde::{Deserialize, Serialize};
use serde_json::Value;
use strukt_core::same_value;
use thiserror::Error;

use crate::registry::{Check, Predicate, TypeRegistryBuilder};

/// Error loading or applying a [`TypesConfig`].
#[derive(Error, Debug)]
pub enum TypesConfigError {
    /// The configuration file could not be parsed.
    #[error("types config parse error for '{source_name}': {reason}")]
    Parse {
        /// File path or other identifier.
        source_name: String,
        /// Parser message.
        reason: String,
    },

    /// A rule names a base type that is not registered.
    #[error("type '{name}' has unknown base type '{base}'")]
    UnknownBase {
        /// The declared type.
        name: String,
        /// The unregistered base.
        base: String,
    },

    /// A rule's pattern is not a valid regular expression.
    #[error("type '{name}' has an invalid pattern: {source}")]
    InvalidPattern {
        /// The declared type.
        name: String,
        /// Regex compiler error.
        source: regex::Error,
    },

    /// IO error reading the configuration.
    #[error("io error: {0}")]
    Io(#[from] std::io::Error),
}

/// A set of declared types.
#[derive(Debug, Clone, Default, PartialEq, Serialize, Deserialize)]
#[serde(deny_unknown_fields)]
pub struct TypesConfig {
    /// Type name → rule.
    #[serde(default)]
    pub types: BTreeMap<String, TypeRule>,
}

/// Constraints narrowing a built-in base type.
#[derive(Debug, Clone, PartialEq, Serialize, Deserialize)]
#[serde(deny_unknown_fields)]
pub struct TypeRule {
    /// Built-in (or earlier registered) type the value must satisfy first.
    #[serde(default = "default_base")]
    pub base: String,
    /// Substring a string value must contain.
    #[serde(default, skip_serializing_if = "Option::is_none")]
    pub contains: Option<String>,
    /// Regular expression a string value must match.
    #[serde(default, skip_serializing_if = "Option::is_none")]
    pub pattern: Option<String>,
    /// Literals the value must be one of.
    #[serde(default, skip_serializing_if = "Option::is_none")]
    pub one_of: Option<Vec<Value>>,
    /// Minimum length of a string (in chars) or array.
    #[serde(default, skip_serializing_if = "Option::is_none")]
    pub min_length: Option<usize>,
    /// Maximum length of a string (in chars) or array.
    #[serde(default, skip_serializing_if = "Option::is_none")]
    pub max_length: Option<usize>,
    /// Reason reported when the base check fails.
    #[serde(default, skip_serializing_if = "Option::is_none")]
    pub base_reason: Option<String>,
    /// Reason reported when any other rule fails.
    #[serde(default, skip_serializing_if = "Option::is_none")]
    pub reason: Option<String>,
}

fn default_base() -> String {
    "string".to_string()
}

impl TypesConfig {
    /// Parse a YAML document (JSON is valid YAML).
    pub fn from_yaml_str(content: &str, source_name: &str) -> Result<Self, TypesConfigError> {
        serde_yaml::from_str(content).map_err(|e| TypesConfigError::Parse {
            source_name: source_name.to_string(),
            reason: e.to_string(),
        })
    }

    /// Read and parse a configuration file.
    pub fn load(path: &Path) -> Result<Self, TypesConfigError> {
        let content = std::fs::read_to_string(path)?;
        Self::from_yaml_str(&content, &path.display().to_string())
    }

    /// Register every declared type on `builder`.
    ///
    /// Types are registered in name order; a rule may use an earlier
    /// declared type as its base.
    pub fn apply(&self, mut builder: TypeRegistryBuilder) -> Result<TypeRegistryBuilder, TypesConfigError> {
        for (name, rule) in &self.types {
            let predicate = rule.compile(name, &builder)?;
            tracing::debug!(name = %name, base = %rule.base, "registered declared type");
            builder = builder.register_predicate(name.clone(), predicate);
        }
        Ok(builder)
    }
}

impl TypeRule {
    fn compile(&self, name: &str, builder: &TypeRegistryBuilder) -> Result<Predicate, TypesConfigError> {
        let base = builder
            .get(&self.base)
            .cloned()
            .ok_or_else(|| TypesConfigError::UnknownBase {
                name: name.to_string(),
                base: self.base.clone(),
            })?;
        let pattern = self
            .pattern
            .as_deref()
            .map(Regex::new)
            .transpose()
            .map_err(|source| TypesConfigError::InvalidPattern {
                name: name.to_string(),
                source,
            })?;

        let rule = self.clone();
        let name = name.to_string();
        Ok(Predicate::new(move |value, context| {
            if !base.check(value, context).is_pass() {
                return Check::Reason(
                    rule.base_reason
                        .clone()
                        .unwrap_or_else(|| format!("{name} should be a {}", rule.base)),
                );
            }
            match rule.violation(value, pattern.as_ref()) {
                None => Check::Pass,
                Some(described) => Check::Reason(rule.reason.clone().unwrap_or(described)),
            }
        }))
    }

    /// Describe the first rule `value` breaks.
    fn violation(&self, value: Option<&Value>, pattern: Option<&Regex>) -> Option<String> {
        let text = value.and_then(Value::as_str);
        if let (Some(needle), Some(text)) = (&self.contains, text) {
            if !text.contains(needle.as_str()) {
                return Some(format!("should contain `{needle}`"));
            }
        }
        if let (Some(re), Some(text)) = (pattern, text) {
            if !re.is_match(text) {
                return Some(format!("should match `{}`", re.as_str()));
            }
        }
        if let Some(allowed) = &self.one_of {
            if !value.is_some_and(|v| allowed.iter().any(|a| same_value(a, v))) {
                return Some("should be one of the allowed values".to_string());
            }
        }
        let length = match value {
            Some(Value::String(s)) => Some(s.chars().count()),
            Some(Value::Array(items)) => Some(items.len()),
            _ => None,
        };
        if let Some(len) = length {
            if let Some(min) = self.min_length.filter(|min| len < *min) {
                return Some(format!("should be at least {min} long"));
            }
            if let Some(max) = self.max_length.filter(|max| len > *max) {
                return Some(format!("should be at most {max} long"));
            }
        }
        None
    }
}

#[cfg(test)]
mod tests {
    use super::*;
    use crate::registry::TypeRegistry;
    use serde_json::json;

    const CONFIG: &str = r#"
types:
  entity-id:
    contains: "."
    base_reason: "entity id should be a string"
    reason: "entity id should be in the format 'domain.entity'"
  icon:
    pattern: "^[a-z]+:[a-z0-9-]+$"
  short-list:
    base: array
    max_length: 2
"#;

    fn registry() -> TypeRegistry {
        let config = TypesConfig::from_yaml_str(CONFIG, "inline").unwrap();
        config.apply(TypeRegistry::builder()).unwrap().build()
    }

    #[test]
    fn test_declared_types_registered() {
        let registry = registry();
        assert!(registry.contains("entity-id"));
        assert!(registry.contains("icon"));
        assert!(registry.contains("short-list"));
    }

    #[test]
    fn test_contains_rule_with_custom_reasons() {
        let registry = registry();
        let p = registry.get("entity-id").unwrap();
        assert!(p.check(Some(&json!("light.kitchen")), None).is_pass());
        assert_eq!(
            p.check(Some(&json!("kitchen")), None),
            Check::Reason("entity id should be in the format 'domain.entity'".to_string())
        );
        assert_eq!(
            p.check(Some(&json!(3)), None),
            Check::Reason("entity id should be a string".to_string())
        );
    }

    #[test]
    fn test_pattern_rule_describes_itself() {
        let registry = registry();
        let p = registry.get("icon").unwrap();
        assert!(p.check(Some(&json!("mdi:lightbulb")), None).is_pass());
        match p.check(Some(&json!("lightbulb")), None) {
            Check::Reason(r) => assert!(r.contains("should match"), "got {r}"),
            other => panic!("expected reason, got {other:?}"),
        }
    }

    #[test]
    fn test_one_of_compares_numbers_by_value() {
        let config = TypesConfig::from_yaml_str(
            "types:\n  brightness:\n    base: number\n    one_of: [0, 50, 100]\n",
            "inline",
        )
        .unwrap();
        let registry = config.apply(TypeRegistry::builder()).unwrap().build();
        let p = registry.get("brightness").unwrap();
        assert!(p.check(Some(&json!(50)), None).is_pass());
        assert!(p.check(Some(&json!(50.0)), None).is_pass());
        assert!(!p.check(Some(&json!(75)), None).is_pass());
    }

    #[test]
    fn test_length_rule_on_arrays() {
        let registry = registry();
        let p = registry.get("short-list").unwrap();
        assert!(p.check(Some(&json!([1, 2])), None).is_pass());
        assert!(!p.check(Some(&json!([1, 2, 3])), None).is_pass());
    }

    #[test]
    fn test_invalid_pattern_rejected() {
        let config = TypesConfig::from_yaml_str("types:\n  bad:\n    pattern: \"(\"\n", "inline").unwrap();
        let err = config.apply(TypeRegistry::builder()).unwrap_err();
        assert!(matches!(err, TypesConfigError::InvalidPattern { .. }));
    }

    #[test]
    fn test_unknown_base_rejected() {
        let config = TypesConfig::from_yaml_str("types:\n  bad:\n    base: symbol\n", "inline").unwrap();
        let err = config.apply(TypeRegistry::builder()).unwrap_err();
        assert!(matches!(err, TypesConfigError::UnknownBase { ref base, .. } if base == "symbol"));
    }

    #[test]
    fn test_unknown_rule_field_rejected() {
        let err = TypesConfig::from_yaml_str("types:\n  t:\n    regex: x\n", "inline").unwrap_err();
        assert!(matches!(err, TypesConfigError::Parse { .. }));
    }
}
