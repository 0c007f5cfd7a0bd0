// Copyright (c) The Warren Contributors
// SPDX-License-Identifier: MIT OR Apache-2.0

use super::sample_schema;
use crate::diff::EnvironmentDiff;
use crate::{Delta, EnvSchema, Environment, Error, KeySchema, Value, ValueDomain};
use pretty_assertions::assert_eq;
use std::sync::Arc;

#[test]
fn lookup_returns_default_for_untouched_key() {
    let schema = sample_schema();
    let env = Environment::make_empty(schema);
    assert_eq!(env.lookup("target").unwrap(), Value::Str("host".into()));
}

#[test]
fn duplicate_identical_registration_is_a_noop() {
    let mut schema = EnvSchema::new();
    let key = KeySchema::new("flag", ValueDomain::Bool, Value::Bool(false));
    schema.register_key(key.clone()).unwrap();
    schema.register_key(key).unwrap();
}

#[test]
fn duplicate_conflicting_registration_errors() {
    let mut schema = EnvSchema::new();
    schema
        .register_key(KeySchema::new("flag", ValueDomain::Bool, Value::Bool(false)))
        .unwrap();
    let err = schema
        .register_key(KeySchema::new("flag", ValueDomain::Bool, Value::Bool(true)))
        .unwrap_err();
    assert!(matches!(err, Error::DuplicateKey { .. }));
}

#[test]
fn environment_diff_reports_only_changed_keys() {
    let schema = sample_schema();
    let env = Environment::make_empty(schema);
    let a = env
        .apply(&Delta::new().set("target", Value::Str("x86_64".into())).build())
        .unwrap();
    let b = a
        .apply(&Delta::new().set("debug", Value::Bool(false)).build())
        .unwrap();

    let diff = EnvironmentDiff::new(&a, &b).unwrap();
    assert!(!diff.is_unchanged());
    let changed: Vec<_> = diff.changed().map(|(k, _, _)| k).collect();
    assert_eq!(changed, vec!["debug"]);
}

#[test]
fn canonicalize_transform_applies_before_fingerprinting() {
    let mut schema = EnvSchema::new();
    schema
        .register_key(
            KeySchema::new("c_flags", ValueDomain::List, Value::List(vec![]))
                .with_canonicalize("dedup_adjacent"),
        )
        .unwrap();
    schema.register_transform(
        "dedup_adjacent",
        Arc::new(|value: &Value| match value {
            Value::List(items) => {
                let mut out: Vec<String> = Vec::new();
                for item in items {
                    if out.last() != Some(item) {
                        out.push(item.clone());
                    }
                }
                Ok(Value::List(out))
            }
            other => Ok(other.clone()),
        }),
    );
    let schema = Arc::new(schema);

    let env = Environment::make_empty(schema);
    let with_dupes = env
        .apply(&Delta::new().append("c_flags", ["-O2", "-O2", "-O3"]).build())
        .unwrap();
    let without_dupes = env
        .apply(&Delta::new().append("c_flags", ["-O2", "-O3"]).build())
        .unwrap();

    assert_eq!(
        with_dupes.fingerprint().unwrap(),
        without_dupes.fingerprint().unwrap()
    );
}
