// Copyright (c) The Warren Contributors
// SPDX-License-Identifier: MIT OR Apache-2.0

//! Structural diffing between environments, for diagnostics.
//!
//! Two fingerprints disagreeing is not, by itself, useful to a human debugging a build: they
//! want to know *which keys* differ. This mirrors the idiom in `guppy-summaries::SummaryDiff`,
//! which reports changed packages by key rather than by comparing opaque digests.

use crate::{Environment, Error, Value};
use std::collections::BTreeMap;
use std::fmt;

/// The per-key differences between two environments sharing the same schema.
#[derive(Clone, Debug, Default, PartialEq, Eq)]
pub struct EnvironmentDiff {
    changed: BTreeMap<String, (Value, Value)>,
}

impl EnvironmentDiff {
    /// Computes the diff between `old` and `new`, which must share the same schema registry.
    pub fn new(old: &Environment, new: &Environment) -> Result<Self, Error> {
        let mut changed = BTreeMap::new();
        for schema in old.schema().keys_sorted() {
            let old_value = old.lookup(schema.name())?;
            let new_value = new.lookup(schema.name())?;
            if old_value != new_value {
                changed.insert(schema.name().to_string(), (old_value, new_value));
            }
        }
        Ok(Self { changed })
    }

    /// Returns true if every key agreed.
    pub fn is_unchanged(&self) -> bool {
        self.changed.is_empty()
    }

    /// Returns the changed keys and their (old, new) values, in key order.
    pub fn changed(&self) -> impl Iterator<Item = (&str, &Value, &Value)> {
        self.changed
            .iter()
            .map(|(k, (old, new))| (k.as_str(), old, new))
    }
}

impl fmt::Display for EnvironmentDiff {
    fn fmt(&self, f: &mut fmt::Formatter<'_>) -> fmt::Result {
        if self.changed.is_empty() {
            return write!(f, "(no changes)");
        }
        for (key, (old, new)) in &self.changed {
            writeln!(f, "{}: {} -> {}", key, old, new)?;
        }
        Ok(())
    }
}
