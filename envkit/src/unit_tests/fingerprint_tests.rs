// Copyright (c) The Warren Contributors
// SPDX-License-Identifier: MIT OR Apache-2.0

use super::sample_schema;
use crate::{Delta, Environment, Value};
use pretty_assertions::assert_eq;

#[test]
fn empty_environment_fingerprint_is_deterministic() {
    let schema = sample_schema();
    let a = Environment::make_empty(schema.clone());
    let b = Environment::make_empty(schema);
    assert_eq!(a.fingerprint().unwrap(), b.fingerprint().unwrap());
}

#[test]
fn explicit_default_matches_implicit_default() {
    let schema = sample_schema();
    let implicit = Environment::make_empty(schema.clone());
    let explicit = implicit
        .apply(&Delta::new().set("debug", Value::Bool(true)).build())
        .unwrap();
    // "debug" defaults to true, so setting it to true explicitly changes nothing observable.
    assert_eq!(
        implicit.fingerprint().unwrap(),
        explicit.fingerprint().unwrap()
    );
}

#[test]
fn differing_values_produce_differing_fingerprints() {
    let schema = sample_schema();
    let env = Environment::make_empty(schema);
    let a = env
        .apply(&Delta::new().append("c_flags", ["-O2"]).build())
        .unwrap();
    let b = env
        .apply(&Delta::new().append("c_flags", ["-O3"]).build())
        .unwrap();
    assert_ne!(a.fingerprint().unwrap(), b.fingerprint().unwrap());
}

#[test]
fn subset_collapses_unrelated_keys() {
    let schema = sample_schema();
    let env = Environment::make_empty(schema);
    let a = env
        .apply(&Delta::new().set("target", Value::Str("x86_64".into())).build())
        .unwrap()
        .apply(&Delta::new().append("c_flags", ["-O2"]).build())
        .unwrap();
    let b = env
        .apply(&Delta::new().set("target", Value::Str("aarch64".into())).build())
        .unwrap()
        .apply(&Delta::new().append("c_flags", ["-O2"]).build())
        .unwrap();

    // Before subsetting, differing `target` means differing fingerprints.
    assert_ne!(a.fingerprint().unwrap(), b.fingerprint().unwrap());

    // After narrowing to just `c_flags`, both collapse to the same fingerprint.
    let narrow_a = a.subset(&["c_flags"]).unwrap();
    let narrow_b = b.subset(&["c_flags"]).unwrap();
    assert_eq!(
        narrow_a.fingerprint().unwrap(),
        narrow_b.fingerprint().unwrap()
    );
}

#[test]
fn fingerprint_short_is_a_prefix_of_full_hex() {
    let schema = sample_schema();
    let env = Environment::make_empty(schema);
    let fp = env.fingerprint().unwrap();
    assert!(fp.to_hex().starts_with(&fp.short()));
}
