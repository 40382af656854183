//! Property tests: algebraic laws of the combinators and idempotence of
//! re-validation, over arbitrary JSON values.

use proptest::prelude::*;
use serde_json::{json, Value};
use strukt_schema::{Check, Predicate, Schema, Struct, Superstruct};

/// Strategy for arbitrary JSON values (finite floats only).
fn json_value() -> impl Strategy<Value = Value> {
    let leaf = prop_oneof![
        Just(Value::Null),
        any::<bool>().prop_map(Value::Bool),
        any::<i64>().prop_map(|n| json!(n)),
        (-1.0e6f64..1.0e6).prop_map(|f| json!(f)),
        "[a-z.:]{0,12}".prop_map(Value::String),
    ];
    leaf.prop_recursive(3, 32, 6, |inner| {
        prop_oneof![
            prop::collection::vec(inner.clone(), 0..6).prop_map(Value::Array),
            prop::collection::btree_map("[a-z]{1,6}", inner, 0..6)
                .prop_map(|m| Value::Object(m.into_iter().collect())),
        ]
    })
}

/// Strategy for card-shaped objects, sometimes carrying an extra key.
fn card_value() -> impl Strategy<Value = Value> {
    (
        "[a-z]{1,8}",
        prop::option::of(prop_oneof![
            "[A-Za-z ]{0,12}".prop_map(Value::String),
            any::<i32>().prop_map(|n| json!(n)),
        ]),
        prop::collection::vec("[a-z]{1,6}\\.[a-z]{1,6}", 0..5),
        prop::option::of(json_value()),
    )
        .prop_map(|(kind, title, entities, extra)| {
            let mut card = json!({"type": kind, "entities": entities});
            if let Some(title) = title {
                card["title"] = title;
            }
            if let Some(extra) = extra {
                card["extra"] = extra;
            }
            card
        })
}

fn card(f: &Superstruct, open: bool) -> Struct {
    let fields = Schema::fields([
        ("type", Schema::from("string")),
        ("title", Schema::from("string | number?")),
        ("entities", Schema::list("string")),
    ]);
    if open {
        f.interface(fields).unwrap()
    } else {
        f.object(fields).unwrap()
    }
}

fn scalar(name: &str) -> Struct {
    Superstruct::new().scalar(name).unwrap()
}

proptest! {
    /// A value accepted by a predicate comes back unchanged.
    #[test]
    fn accepted_values_are_returned_unchanged(value in json_value()) {
        let anything = Superstruct::new().function(Predicate::from_fn(|v: Option<&Value>| v.is_some()));
        prop_assert_eq!(anything.validate(Some(&value)).unwrap(), Some(value));
    }

    /// `union([A, B])` accepts iff A or B accepts.
    #[test]
    fn union_accepts_iff_either_accepts(value in json_value()) {
        let (a, b) = (scalar("string"), scalar("number"));
        let either = Superstruct::new().union([a.clone(), b.clone()]).unwrap();
        prop_assert_eq!(either.test(&value), a.test(&value) || b.test(&value));
    }

    /// `intersection([A, B])` accepts iff both accept.
    #[test]
    fn intersection_accepts_iff_both_accept(value in json_value()) {
        let (a, b) = (scalar("number"), scalar("integer"));
        let both = Superstruct::new().intersection([a.clone(), b.clone()]).unwrap();
        prop_assert_eq!(both.test(&value), a.test(&value) && b.test(&value));
    }

    /// `optional(T)` accepts exactly what T accepts, plus absence.
    #[test]
    fn optional_extends_inner_with_absence(value in json_value()) {
        let inner = scalar("string");
        let maybe = Superstruct::new().optional(inner.clone()).unwrap();
        prop_assert!(maybe.validate(None).is_ok());
        prop_assert_eq!(maybe.test(&value), inner.test(&value));
    }

    /// Re-validating a validated result yields the same result.
    #[test]
    fn revalidation_is_idempotent(value in card_value(), open in any::<bool>()) {
        let schema = card(&Superstruct::new(), open);
        if let Ok(first) = schema.validate(Some(&value)) {
            let again = schema.validate(first.as_ref()).unwrap();
            prop_assert_eq!(again, first);
        }
    }

    /// A tuple with an optional tail returns its input unchanged, so the
    /// result validates again.
    #[test]
    fn tuple_with_optional_tail_is_idempotent(
        head in "[a-z]{0,6}",
        tail in prop::option::of(any::<i32>()),
    ) {
        let pair = Superstruct::new().tuple(["string", "number?"]).unwrap();
        let mut items = vec![json!(head)];
        items.extend(tail.map(|n| json!(n)));
        let input = Value::Array(items);

        let first = pair.validate(Some(&input)).unwrap();
        prop_assert_eq!(first.as_ref(), Some(&input));
        prop_assert_eq!(pair.validate(first.as_ref()).unwrap(), first);
    }

    /// Closed objects reject exactly the inputs open ones accept with an
    /// extra key.
    #[test]
    fn closed_rejects_extra_keys_open_keeps_them(value in card_value()) {
        let f = Superstruct::new();
        let closed = card(&f, false).test(&value);
        let open = card(&f, true).validate(Some(&value));
        if value.get("extra").is_some() {
            prop_assert!(!closed);
            prop_assert_eq!(open.unwrap(), Some(value));
        } else {
            prop_assert_eq!(closed, open.is_ok());
        }
    }

    /// Failures never come back empty and always lead with the
    /// representative failure.
    #[test]
    fn failures_lead_with_representative(value in json_value()) {
        if let Err(err) = card(&Superstruct::new(), false).validate(Some(&value)) {
            prop_assert!(!err.errors.is_empty());
            prop_assert_eq!(&err.errors[0].path, &err.path);
            prop_assert_eq!(&err.errors[0].type_label, &err.type_label);
        }
    }
}

#[test]
fn union_surfaces_the_deepest_branch() {
    let f = Superstruct::new();
    let row = f.object(Schema::fields([("entity", "string"), ("name", "string?")])).unwrap();
    let entity = f.union([Schema::from("string"), Schema::from(row)]).unwrap();

    let err = entity.assert(&json!({"entity": "a.b", "name": 3})).unwrap_err();
    assert_eq!(err.path_string(), "name");
    assert_eq!(err.type_label, "string | undefined");

    let err = entity.assert(&json!(5)).unwrap_err();
    assert!(err.path.is_empty());
    assert_eq!(err.type_label, "string | {entity,name}");
}

#[test]
fn intersection_threads_coerced_value() {
    let f = Superstruct::new();
    let trim = Predicate::new(|value, _| match value.and_then(Value::as_str) {
        Some(s) if s == s.trim() => Check::Pass,
        Some(_) => Check::Reason("should be trimmed".to_string()),
        None => Check::Fail,
    });
    let trimmed = f.intersection([Schema::from("string"), Schema::from(trim)]).unwrap();

    assert!(trimmed.test(&json!("kitchen")));
    let err = trimmed.assert(&json!(" kitchen ")).unwrap_err();
    assert_eq!(err.type_label, "string & <function>");
    assert_eq!(err.reason.as_deref(), Some("should be trimmed"));
}

#[test]
fn enums_checks_every_element() {
    let modes = Superstruct::new()
        .enums([json!("heat"), json!("cool"), json!("off")])
        .unwrap();
    assert!(modes.test(&json!(["heat", "off"])));
    let err = modes.assert(&json!(["heat", "fan"])).unwrap_err();
    assert_eq!(err.path_string(), "1");
}

#[test]
fn literal_and_instance() {
    #[derive(serde::Deserialize)]
    #[allow(dead_code)]
    struct Point {
        x: f64,
        y: f64,
    }

    let f = Superstruct::new();
    let version = f.literal(json!(2));
    assert!(version.test(&json!(2)));
    assert!(!version.test(&json!("2")));

    let point = f.instance::<Point>();
    assert_eq!(point.type_label(), "instance<Point>");
    assert!(point.test(&json!({"x": 1.0, "y": 2.5})));
    let err = point.assert(&json!({"x": 1.0})).unwrap_err();
    assert!(err.reason.unwrap().contains("missing field `y`"));
}

#[test]
fn enum_and_literal_compare_numbers_by_value() {
    let f = Superstruct::new();
    let one_float: Value = serde_json::from_str("1.0").unwrap();

    let levels = f.enumeration([json!(1), json!(2)]).unwrap();
    assert!(levels.test(&one_float));
    assert!(!levels.test(&json!(1.5)));

    let version = f.literal(json!(2.0));
    assert!(version.test(&json!(2)));
    assert!(!version.test(&json!("2")));
}
