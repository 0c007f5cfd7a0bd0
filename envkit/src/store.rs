// Copyright (c) The Warren Contributors
// SPDX-License-Identifier: MIT OR Apache-2.0

use crate::{Delta, EnvSchema, Error, Fingerprint, Op, Value};
use indexmap::{IndexMap, IndexSet};
use std::collections::BTreeSet;
use std::sync::Arc;

/// An immutable mapping from registered key names to values (§3, §4.B).
///
/// An `Environment` only stores the keys that have been explicitly touched by some delta; a key
/// that was never set reads as its schema's default via [`Environment::lookup`] and contributes
/// its default to the fingerprint, so "never set" and "set to the default" are indistinguishable
/// -- which is what makes [`Environment::subset`] work as a deduplication mechanism (§9).
#[derive(Clone)]
pub struct Environment {
    schema: Arc<EnvSchema>,
    values: IndexMap<Box<str>, Value>,
}

impl Environment {
    /// Returns the empty environment for a given schema registry: every key reads as its
    /// default, and its fingerprint is the fingerprint of the all-defaults map.
    pub fn make_empty(schema: Arc<EnvSchema>) -> Self {
        Self {
            schema,
            values: IndexMap::new(),
        }
    }

    /// The schema registry this environment was built against.
    pub fn schema(&self) -> &Arc<EnvSchema> {
        &self.schema
    }

    /// Returns the effective value for `key`: the explicit override if one has been applied, or
    /// the key's schema default otherwise.
    pub fn lookup(&self, key: &str) -> Result<Value, Error> {
        let schema = self.schema.key(key)?;
        Ok(self
            .values
            .get(key)
            .cloned()
            .unwrap_or_else(|| schema.default().clone()))
    }

    /// Applies a single delta, producing a new environment. Operations within the delta are
    /// applied in order; each is validated against the registered schema for its key.
    pub fn apply(&self, delta: &Delta) -> Result<Environment, Error> {
        let mut next = self.clone();
        for entry in delta.entries() {
            next.apply_one(&entry.key, &entry.op)?;
        }
        Ok(next)
    }

    /// Applies a sequence of deltas left-to-right: `apply_all(e, [a, b]) ==
    /// apply(apply(e, a), b)` (§4.C, §8).
    pub fn apply_all(&self, deltas: &[Delta]) -> Result<Environment, Error> {
        let mut current = self.clone();
        for delta in deltas {
            current = current.apply(delta)?;
        }
        Ok(current)
    }

    fn apply_one(&mut self, key: &str, op: &Op) -> Result<(), Error> {
        let schema = self.schema.key(key)?.clone();
        match op {
            Op::Set(value) => {
                schema.validate(value)?;
                self.values.insert(key.into(), value.clone());
            }
            Op::Append(items) => {
                self.mutate_collection(&schema, key, |current| match current {
                    Value::List(list) => {
                        list.extend(items.iter().cloned());
                        Ok(())
                    }
                    Value::Set(set) => {
                        for item in items {
                            set.insert(item.clone());
                        }
                        Ok(())
                    }
                    _ => unreachable!("mutate_collection only calls this for collections"),
                })?;
            }
            Op::Prepend(items) => {
                self.mutate_collection(&schema, key, |current| match current {
                    Value::List(list) => {
                        let mut combined: Vec<String> = items.clone();
                        combined.append(list);
                        *list = combined;
                        Ok(())
                    }
                    Value::Set(set) => {
                        let mut reordered = IndexSet::new();
                        for item in items {
                            reordered.insert(item.clone());
                        }
                        for item in set.iter() {
                            if !reordered.contains(item) {
                                reordered.insert(item.clone());
                            }
                        }
                        *set = reordered;
                        Ok(())
                    }
                    _ => unreachable!("mutate_collection only calls this for collections"),
                })?;
            }
            Op::Remove(items) => {
                if !matches!(schema.domain(), crate::ValueDomain::Set) {
                    return Err(Error::NotACollection { name: key.into() });
                }
                self.mutate_collection(&schema, key, |current| match current {
                    Value::Set(set) => {
                        for item in items {
                            set.shift_remove(item);
                        }
                        Ok(())
                    }
                    _ => unreachable!(),
                })?;
            }
            Op::Transform(name) => {
                let f = self.schema.transform(name)?;
                let current = self.lookup(key)?;
                let new_value = f(&current)?;
                schema.validate(&new_value)?;
                self.values.insert(key.into(), new_value);
            }
        }
        Ok(())
    }

    fn mutate_collection(
        &mut self,
        schema: &crate::KeySchema,
        key: &str,
        f: impl FnOnce(&mut Value) -> Result<(), Error>,
    ) -> Result<(), Error> {
        if !schema.domain().is_collection() {
            return Err(Error::NotACollection { name: key.into() });
        }
        let mut current = self.lookup(key)?;
        f(&mut current)?;
        self.values.insert(key.into(), current);
        Ok(())
    }

    /// Returns a new environment containing only the listed keys' explicit values; every other
    /// key reverts to its schema default. This is how targets shed irrelevant parameterization
    /// before producing a product, which is what makes the concrete graph converge (§4.B, §9).
    pub fn subset(&self, keys: &[impl AsRef<str>]) -> Result<Environment, Error> {
        let wanted: BTreeSet<&str> = keys.iter().map(|k| k.as_ref()).collect();
        for key in &wanted {
            self.schema.key(key)?;
        }
        let values = self
            .values
            .iter()
            .filter(|(k, _)| wanted.contains(k.as_ref()))
            .map(|(k, v)| (k.clone(), v.clone()))
            .collect();
        Ok(Environment {
            schema: self.schema.clone(),
            values,
        })
    }

    /// Computes this environment's fingerprint (§4.B).
    ///
    /// Every registered key contributes, in lexicographic order, using its explicit value if one
    /// was set or its schema default otherwise, after the key's `canonicalize` transform (if
    /// any) has been applied. This is what makes two environments that are "equal as maps"
    /// produce equal fingerprints regardless of which keys were ever touched.
    pub fn fingerprint(&self) -> Result<Fingerprint, Error> {
        let mut bytes = Vec::new();
        for schema in self.schema.keys_sorted() {
            let mut value = self
                .values
                .get(schema.name())
                .cloned()
                .unwrap_or_else(|| schema.default().clone());
            if let Some(transform_name) = schema.canonicalize_transform() {
                let f = self.schema.transform(transform_name)?;
                value = f(&value)?;
            }
            bytes.extend_from_slice(schema.name().as_bytes());
            bytes.push(0x1f); // unit separator between key and value
            value.canonical_bytes(&mut bytes);
            bytes.push(0x1e); // record separator between entries
        }
        Ok(Fingerprint::of_bytes(&bytes))
    }

    /// Iterates over the keys this environment has an explicit override for (not including keys
    /// that are merely at their default). Used by diagnostics and by [`crate::diff`].
    pub fn explicit_keys(&self) -> impl Iterator<Item = &str> {
        self.values.keys().map(|k| k.as_ref())
    }
}
