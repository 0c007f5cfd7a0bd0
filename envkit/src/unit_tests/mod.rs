// Copyright (c) The Warren Contributors
// SPDX-License-Identifier: MIT OR Apache-2.0

mod delta_tests;
mod fingerprint_tests;
mod store_tests;

#[cfg(feature = "proptest1")]
mod proptest_tests;

use crate::{EnvSchema, KeySchema, Value, ValueDomain};
use std::sync::Arc;

/// A schema with one of each domain, used across unit tests.
pub(crate) fn sample_schema() -> Arc<EnvSchema> {
    let mut schema = EnvSchema::new();
    schema
        .register_key(KeySchema::new(
            "c_flags",
            ValueDomain::List,
            Value::List(vec![]),
        ))
        .unwrap();
    schema
        .register_key(KeySchema::new(
            "libs",
            ValueDomain::Set,
            Value::Set(Default::default()),
        ))
        .unwrap();
    schema
        .register_key(KeySchema::new(
            "opt_level",
            ValueDomain::Enum(Arc::new(vec!["0".into(), "1".into(), "2".into(), "3".into()])),
            Value::Enum("0".into()),
        ))
        .unwrap();
    schema
        .register_key(KeySchema::new(
            "target",
            ValueDomain::Str,
            Value::Str("host".into()),
        ))
        .unwrap();
    schema
        .register_key(KeySchema::new("debug", ValueDomain::Bool, Value::Bool(true)))
        .unwrap();
    Arc::new(schema)
}
