// Copyright (c) The Warren Contributors
// SPDX-License-Identifier: MIT OR Apache-2.0

use crate::{Error, KeySchema, Value};
use std::collections::BTreeMap;
use std::fmt;
use std::sync::Arc;

/// A named function from an old value to a new one, used by `transform` delta operations.
///
/// Transforms are registered once per project (analogous to [`KeySchema`] registration) and
/// referenced from deltas by name, keeping deltas themselves free of closures (§9).
pub type TransformFn = Arc<dyn Fn(&Value) -> Result<Value, Error> + Send + Sync>;

/// Holds every environment key schema and named transform known to a project.
///
/// Registration is append-only: once a project has finished loading, an `EnvSchema` is treated
/// as frozen and shared (via `Arc`) by every `Environment` built against it.
#[derive(Clone, Default)]
pub struct EnvSchema {
    keys: BTreeMap<Box<str>, KeySchema>,
    transforms: BTreeMap<Box<str>, TransformFn>,
}

impl fmt::Debug for EnvSchema {
    fn fmt(&self, f: &mut fmt::Formatter<'_>) -> fmt::Result {
        f.debug_struct("EnvSchema")
            .field("keys", &self.keys)
            .field("transforms", &self.transforms.keys().collect::<Vec<_>>())
            .finish()
    }
}

impl EnvSchema {
    /// Creates an empty schema registry.
    pub fn new() -> Self {
        Self::default()
    }

    /// Registers a key schema.
    ///
    /// An identical re-registration (same domain and default) is a no-op. Registering the same
    /// name with a different shape is a `DuplicateKey` error.
    pub fn register_key(&mut self, schema: KeySchema) -> Result<(), Error> {
        match self.keys.get(schema.name()) {
            Some(existing) if existing == &schema => Ok(()),
            Some(_) => Err(Error::DuplicateKey {
                name: schema.name().into(),
            }),
            None => {
                self.keys.insert(schema.name().into(), schema);
                Ok(())
            }
        }
    }

    /// Registers a named transform function.
    pub fn register_transform(&mut self, name: impl Into<Box<str>>, f: TransformFn) {
        self.transforms.insert(name.into(), f);
    }

    /// Looks up a key's schema.
    pub fn key(&self, name: &str) -> Result<&KeySchema, Error> {
        self.keys.get(name).ok_or_else(|| Error::UnknownKey {
            name: name.into(),
        })
    }

    /// Looks up a transform by name.
    pub fn transform(&self, name: &str) -> Result<&TransformFn, Error> {
        self.transforms
            .get(name)
            .ok_or_else(|| Error::UnknownTransform { name: name.into() })
    }

    /// Iterates over every registered key schema in lexicographic key order -- the order the
    /// fingerprint algorithm (§4.B) requires.
    pub fn keys_sorted(&self) -> impl Iterator<Item = &KeySchema> {
        self.keys.values()
    }

    /// Returns true if `name` has been registered.
    pub fn contains_key(&self, name: &str) -> bool {
        self.keys.contains_key(name)
    }
}
