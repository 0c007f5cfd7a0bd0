// Copyright (c) The Warren Contributors
// SPDX-License-Identifier: MIT OR Apache-2.0

use super::sample_schema;
use crate::{Delta, Environment, Value};
use pretty_assertions::assert_eq;

#[test]
fn append_preserves_list_duplicates() {
    let schema = sample_schema();
    let env = Environment::make_empty(schema);
    let delta = Delta::new()
        .append("c_flags", ["-O2", "-O2"])
        .build();
    let env = env.apply(&delta).unwrap();
    assert_eq!(
        env.lookup("c_flags").unwrap(),
        Value::List(vec!["-O2".to_string(), "-O2".to_string()])
    );
}

#[test]
fn set_append_keeps_earlier_position() {
    let schema = sample_schema();
    let env = Environment::make_empty(schema);
    let delta = Delta::new()
        .append("libs", ["a", "b"])
        .append("libs", ["a", "c"])
        .build();
    let env = env.apply(&delta).unwrap();
    let Value::Set(libs) = env.lookup("libs").unwrap() else {
        panic!("expected a set");
    };
    assert_eq!(
        libs.into_iter().collect::<Vec<_>>(),
        vec!["a".to_string(), "b".to_string(), "c".to_string()]
    );
}

#[test]
fn set_prepend_moves_existing_to_front() {
    let schema = sample_schema();
    let env = Environment::make_empty(schema);
    let delta = Delta::new()
        .append("libs", ["a", "b", "c"])
        .prepend("libs", ["b"])
        .build();
    let env = env.apply(&delta).unwrap();
    let Value::Set(libs) = env.lookup("libs").unwrap() else {
        panic!("expected a set");
    };
    assert_eq!(
        libs.into_iter().collect::<Vec<_>>(),
        vec!["b".to_string(), "a".to_string(), "c".to_string()]
    );
}

#[test]
fn remove_is_noop_when_absent() {
    let schema = sample_schema();
    let env = Environment::make_empty(schema);
    let delta = Delta::new().remove("libs", ["nope"]).build();
    // Should not error even though "nope" was never present.
    env.apply(&delta).unwrap();
}

#[test]
fn remove_on_list_is_not_a_collection_error() {
    let schema = sample_schema();
    let env = Environment::make_empty(schema);
    let delta = Delta::new().remove("c_flags", ["-O2"]).build();
    let err = env.apply(&delta).unwrap_err();
    assert!(matches!(err, crate::Error::NotACollection { .. }));
}

#[test]
fn unknown_key_in_delta_is_an_error() {
    let schema = sample_schema();
    let env = Environment::make_empty(schema);
    let delta = Delta::new().set("nonexistent", Value::Bool(true)).build();
    let err = env.apply(&delta).unwrap_err();
    assert!(matches!(err, crate::Error::UnknownKey { .. }));
}

#[test]
fn type_mismatch_is_rejected() {
    let schema = sample_schema();
    let env = Environment::make_empty(schema);
    let delta = Delta::new().set("debug", Value::Int(1)).build();
    let err = env.apply(&delta).unwrap_err();
    assert!(matches!(err, crate::Error::TypeMismatch { .. }));
}

#[test]
fn enum_rejects_values_outside_choice_set() {
    let schema = sample_schema();
    let env = Environment::make_empty(schema);
    let delta = Delta::new()
        .set("opt_level", Value::Enum("9".into()))
        .build();
    let err = env.apply(&delta).unwrap_err();
    assert!(matches!(err, crate::Error::TypeMismatch { .. }));
}

#[test]
fn composition_associativity() {
    let schema = sample_schema();
    let env = Environment::make_empty(schema);
    let a = Delta::new().append("c_flags", ["-a"]).build();
    let b = Delta::new().append("c_flags", ["-b"]).build();
    let c = Delta::new().append("c_flags", ["-c"]).build();

    let left: Environment = env.apply_all(&[a.clone(), b.clone(), c.clone()]).unwrap();
    let right = env
        .apply(&a)
        .unwrap()
        .apply(&b)
        .unwrap()
        .apply(&c)
        .unwrap();

    assert_eq!(left.fingerprint().unwrap(), right.fingerprint().unwrap());
}
