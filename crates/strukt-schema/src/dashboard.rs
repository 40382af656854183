//! # Dashboard Presets
//!
//! Ready-made schemas for home-automation dashboard configuration: action
//! blocks, entities cards, picture cards and the top-level dashboard
//! document. They are built against [`registry`], which adds two domain
//! types to the built-ins:
//!
//! - `entity-id`: a string of the form `domain.entity`.
//! - `icon`: a string of the form `mdi:icon`.

use serde_json::Value;
use strukt_core::SchemaError;

use crate::registry::{Check, TypeRegistry, TypeRegistryBuilder};
use crate::schema::Schema;
use crate::structs::{Struct, Superstruct};

/// Built-in types plus `entity-id` and `icon`.
pub fn registry() -> TypeRegistry {
    register_types(TypeRegistry::builder()).build()
}

/// Add `entity-id` and `icon` to `builder`.
pub fn register_types(builder: TypeRegistryBuilder) -> TypeRegistryBuilder {
    builder
        .register("entity-id", |v: Option<&Value>| {
            shaped(v, '.', "entity id", "domain.entity")
        })
        .register("icon", |v: Option<&Value>| shaped(v, ':', "icon", "mdi:icon"))
}

fn shaped(value: Option<&Value>, separator: char, what: &str, format: &str) -> Check {
    match value.and_then(Value::as_str) {
        None => Check::Reason(format!("{what} should be a string")),
        Some(s) if !s.contains(separator) => {
            Check::Reason(format!("{what} should be in the format '{format}'"))
        }
        Some(_) => Check::Pass,
    }
}

/// A factory over [`registry`].
pub fn superstruct() -> Superstruct {
    Superstruct::with_registry(registry())
}

/// `{action, navigation_path?, service?, service_data?}`.
pub fn action_config() -> Result<Struct, SchemaError> {
    action_with(&superstruct())
}

fn action_with(f: &Superstruct) -> Result<Struct, SchemaError> {
    f.object(Schema::fields([
        ("action", "string"),
        ("navigation_path", "string?"),
        ("service", "string?"),
        ("service_data", "object?"),
    ]))
}

/// `{type, title?, entities}` where each entity is an id or an entity row.
pub fn entities_card_config() -> Result<Struct, SchemaError> {
    let f = superstruct();
    let row = f.object(Schema::fields([
        ("entity", "entity-id"),
        ("name", "string?"),
        ("icon", "icon?"),
    ]))?;
    let entity = f.union([Schema::from("entity-id"), Schema::from(row)])?;
    f.object(Schema::fields([
        ("type", Schema::from("string")),
        ("title", Schema::from("string | number?")),
        ("entities", Schema::list(entity)),
    ]))
}

/// `{type, image?, tap_action?, hold_action?}`.
pub fn picture_card_config() -> Result<Struct, SchemaError> {
    let f = superstruct();
    let action = action_with(&f)?;
    let optional_action = f.optional(&action)?;
    f.object(Schema::fields([
        ("type", Schema::from("string")),
        ("image", Schema::from("string?")),
        ("tap_action", Schema::from(&optional_action)),
        ("hold_action", Schema::from(optional_action)),
    ]))
}

/// The dashboard document: `{title?, views, resources?, ...}`.
pub fn lovelace_config() -> Result<Struct, SchemaError> {
    superstruct().interface(Schema::fields([
        ("title", Schema::from("string?")),
        ("views", Schema::list("object")),
        ("resources", Schema::from(superstruct().optional(Schema::list("object"))?)),
    ]))
}

/// Look up a preset by name, for the command line.
pub fn preset(name: &str) -> Result<Struct, SchemaError> {
    match name {
        "action" => action_config(),
        "entities-card" => entities_card_config(),
        "picture-card" => picture_card_config(),
        "lovelace" => lovelace_config(),
        other => Err(SchemaError::invalid(format!("unknown dashboard preset `{other}`"))),
    }
}

/// Names accepted by [`preset`].
pub const PRESETS: &[&str] = &["action", "entities-card", "picture-card", "lovelace"];

#[cfg(test)]
mod tests {
    use super::*;
    use serde_json::json;

    #[test]
    fn test_entity_id_reasons() {
        let registry = registry();
        let p = registry.get("entity-id").unwrap();
        assert!(p.check(Some(&json!("light.kitchen")), None).is_pass());
        assert_eq!(
            p.check(Some(&json!("kitchen")), None),
            Check::Reason("entity id should be in the format 'domain.entity'".into())
        );
        assert_eq!(
            p.check(Some(&json!(1)), None),
            Check::Reason("entity id should be a string".into())
        );
    }

    #[test]
    fn test_icon_reasons() {
        let registry = registry();
        let p = registry.get("icon").unwrap();
        assert!(p.check(Some(&json!("mdi:lightbulb")), None).is_pass());
        assert_eq!(
            p.check(Some(&json!("lightbulb")), None),
            Check::Reason("icon should be in the format 'mdi:icon'".into())
        );
    }

    #[test]
    fn test_action_config() {
        let action = action_config().unwrap();
        assert!(action.test(&json!({"action": "navigate", "navigation_path": "/lovelace/1"})));
        assert!(!action.test(&json!({"action": "navigate", "navigation_path": 1})));
        assert!(!action.test(&json!({"navigation_path": "/"})));
    }

    #[test]
    fn test_entities_card_accepts_ids_and_rows() {
        let card = entities_card_config().unwrap();
        let config = json!({
            "type": "entities",
            "title": "Kitchen",
            "entities": ["light.kitchen", {"entity": "switch.fan", "icon": "mdi:fan"}],
        });
        assert_eq!(card.assert(&config).unwrap(), config);
    }

    #[test]
    fn test_entities_card_reports_bad_entity() {
        let card = entities_card_config().unwrap();
        let err = card
            .validate(Some(&json!({"type": "entities", "entities": ["kitchen"]})))
            .unwrap_err();
        assert_eq!(err.path_string(), "entities.0");
        assert_eq!(
            err.reason.as_deref(),
            Some("entity id should be in the format 'domain.entity'")
        );
    }

    #[test]
    fn test_entities_card_reports_bad_icon_in_row() {
        let card = entities_card_config().unwrap();
        let err = card
            .validate(Some(&json!({
                "type": "entities",
                "entities": [{"entity": "light.porch", "icon": "lamp"}],
            })))
            .unwrap_err();
        assert_eq!(err.path_string(), "entities.0.icon");
    }

    #[test]
    fn test_picture_card_nested_action() {
        let card = picture_card_config().unwrap();
        assert!(card.test(&json!({"type": "picture", "image": "/local/a.png"})));
        let err = card
            .validate(Some(&json!({"type": "picture", "tap_action": {"action": 3}})))
            .unwrap_err();
        assert_eq!(err.path_string(), "tap_action.action");
        assert_eq!(err.type_label, "string");
    }

    #[test]
    fn test_lovelace_keeps_extra_keys() {
        let lovelace = lovelace_config().unwrap();
        let config = json!({"views": [{"title": "Home"}], "background": "#fff"});
        assert_eq!(lovelace.assert(&config).unwrap(), config);
        assert!(!lovelace.test(&json!({"views": ["home"]})));
    }

    #[test]
    fn test_every_preset_compiles() {
        for name in PRESETS {
            assert!(preset(name).is_ok(), "preset {name} failed to compile");
        }
        assert!(preset("unknown").is_err());
    }
}
