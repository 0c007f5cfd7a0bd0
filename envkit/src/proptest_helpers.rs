// Copyright (c) The Warren Contributors
// SPDX-License-Identifier: MIT OR Apache-2.0

//! `proptest` strategies for the core value and delta types, feature-gated behind `proptest1`
//! exactly as the teacher crate names its equivalent feature.

use crate::Value;
use proptest::collection::vec;
use proptest::prelude::*;

/// A small alphabet keeps generated strings human-readable in proptest failure output.
fn short_string() -> impl Strategy<Value = String> {
    "[a-z]{1,6}"
}

/// Generates an arbitrary `Value::List`.
pub fn list_value() -> impl Strategy<Value = Value> {
    vec(short_string(), 0..5).prop_map(Value::List)
}

/// Generates an arbitrary `Value::Set`.
pub fn set_value() -> impl Strategy<Value = Value> {
    vec(short_string(), 0..5).prop_map(|items| {
        let mut set = indexmap::IndexSet::new();
        for item in items {
            set.insert(item);
        }
        Value::Set(set)
    })
}

/// Generates an arbitrary scalar `Value` (string, bool, or int).
pub fn scalar_value() -> impl Strategy<Value = Value> {
    prop_oneof![
        short_string().prop_map(Value::Str),
        any::<bool>().prop_map(Value::Bool),
        any::<i64>().prop_map(Value::Int),
    ]
}
