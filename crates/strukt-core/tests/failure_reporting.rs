//! Property tests for failure locations and messages: paths round-trip
//! through serde, and every message names the expected type and value.

use proptest::prelude::*;
use serde_json::{json, Value};
use strukt_core::{join_path, render, Failure, Failures, PathSegment, StructError};

fn segment() -> impl Strategy<Value = PathSegment> {
    prop_oneof![
        (0usize..64).prop_map(PathSegment::Index),
        "[a-z_]{1,8}".prop_map(PathSegment::Key),
    ]
}

fn leaf() -> impl Strategy<Value = Value> {
    prop_oneof![
        Just(Value::Null),
        any::<bool>().prop_map(Value::Bool),
        any::<i64>().prop_map(|n| json!(n)),
        "[a-zA-Z0-9 ]{0,16}".prop_map(Value::String),
    ]
}

proptest! {
    /// Paths serialize as plain keys and indices and read back unchanged.
    #[test]
    fn path_serde_roundtrip(path in prop::collection::vec(segment(), 0..6)) {
        let json = serde_json::to_value(&path).unwrap();
        for (seg, v) in path.iter().zip(json.as_array().unwrap()) {
            match seg {
                PathSegment::Index(i) => prop_assert_eq!(v, &json!(i)),
                PathSegment::Key(k) => prop_assert_eq!(v, &json!(k)),
            }
        }
        let back: Vec<PathSegment> = serde_json::from_value(json).unwrap();
        prop_assert_eq!(back, path);
    }

    /// The dotted path has one component per segment.
    #[test]
    fn joined_path_has_one_part_per_segment(path in prop::collection::vec(segment(), 1..6)) {
        prop_assert_eq!(join_path(&path).split('.').count(), path.len());
    }

    /// Messages name the type, the path when present, and the value.
    #[test]
    fn message_names_type_path_and_value(
        path in prop::collection::vec(segment(), 0..4),
        value in prop::option::of(leaf()),
    ) {
        let mut failure = Failure::new(value.as_ref(), "entity-id");
        failure.path = path.clone();
        let message = failure.message();

        prop_assert!(message.starts_with("Expected a value of type `entity-id`"));
        let expected_suffix = format!("but received `{}`.", render(value.as_ref()));
        prop_assert!(message.ends_with(&expected_suffix));
        prop_assert_eq!(
            message.contains(" for `"),
            !path.is_empty()
        );
    }

    /// Prefixing pushes a segment onto the front of every failure.
    #[test]
    fn prefixing_prepends_to_every_path(
        paths in prop::collection::vec(prop::collection::vec(segment(), 0..3), 1..5),
        outer in segment(),
    ) {
        let failures: Vec<Failure> = paths
            .iter()
            .map(|p| {
                let mut f = Failure::new(None, "string");
                f.path = p.clone();
                f
            })
            .collect();
        let data = json!({"outer": true});
        let prefixed = Failures::from_vec(failures).unwrap().prefixed(&outer, &data);

        prop_assert_eq!(prefixed.len(), paths.len());
        for (f, original) in prefixed.iter().zip(&paths) {
            prop_assert_eq!(&f.path[0], &outer);
            prop_assert_eq!(&f.path[1..], original.as_slice());
            prop_assert_eq!(f.data.as_ref(), Some(&data));
        }
    }
}

#[test]
fn struct_error_display_uses_representative_failure() {
    let mut first = Failure::new(Some(&json!(3)), "string");
    first.path = vec!["title".into()];
    let second = Failure::new(Some(&json!(true)), "number");
    let err = StructError::from(Failures::from_vec(vec![first, second]).unwrap());

    assert_eq!(
        err.to_string(),
        "Expected a value of type `string` for `title` but received `3`."
    );
    assert_eq!(err.errors.len(), 2);
    assert_eq!(err.path_string(), "title");
}

#[test]
fn undefined_value_serializes_as_null_field() {
    let failure = Failure::new(None, "number");
    let json = serde_json::to_value(&failure).unwrap();
    assert_eq!(json["type"], "number");
    assert_eq!(json["value"], Value::Null);
    assert_eq!(failure.message(), "Expected a value of type `number` but received `undefined`.");
}
