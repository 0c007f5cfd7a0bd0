// Copyright (c) The Warren Contributors
// SPDX-License-Identifier: MIT OR Apache-2.0

use super::sample_schema;
use crate::proptest_helpers::list_value;
use crate::{Delta, Environment, Value};
use proptest::prelude::*;

proptest! {
    /// §8 delta composition associativity: applying a list of deltas in one call agrees with
    /// folding them in one at a time.
    #[test]
    fn apply_all_matches_sequential_apply(
        items_a in proptest::collection::vec("[a-z]{1,4}", 0..4),
        items_b in proptest::collection::vec("[a-z]{1,4}", 0..4),
        items_c in proptest::collection::vec("[a-z]{1,4}", 0..4),
    ) {
        let schema = sample_schema();
        let env = Environment::make_empty(schema);
        let a = Delta::new().append("c_flags", items_a).build();
        let b = Delta::new().append("c_flags", items_b).build();
        let c = Delta::new().append("c_flags", items_c).build();

        let folded = env.apply_all(&[a.clone(), b.clone(), c.clone()]).unwrap();
        let sequential = env.apply(&a).unwrap().apply(&b).unwrap().apply(&c).unwrap();

        prop_assert_eq!(folded.fingerprint().unwrap(), sequential.fingerprint().unwrap());
    }

    /// §8 fingerprint canonicality: setting the same list value twice through different
    /// sequences of appends that land on the same final list yields the same fingerprint.
    #[test]
    fn equal_effective_values_fingerprint_equal(value in list_value()) {
        let schema = sample_schema();
        let env = Environment::make_empty(schema);
        let Value::List(items) = value else { return Ok(()); };

        let a = env.apply(&Delta::new().set("c_flags", Value::List(items.clone())).build()).unwrap();
        let b = env.apply(&Delta::new().append("c_flags", items).build()).unwrap();

        prop_assert_eq!(a.fingerprint().unwrap(), b.fingerprint().unwrap());
    }

    /// §8 memoization fidelity groundwork: fingerprinting the same environment twice is stable.
    #[test]
    fn fingerprint_is_stable_under_repetition(value in list_value()) {
        let schema = sample_schema();
        let env = Environment::make_empty(schema);
        let Value::List(items) = value else { return Ok(()); };
        let derived = env.apply(&Delta::new().set("c_flags", Value::List(items)).build()).unwrap();

        prop_assert_eq!(derived.fingerprint().unwrap(), derived.fingerprint().unwrap());
    }
}
