// Copyright (c) The Warren Contributors
// SPDX-License-Identifier: MIT OR Apache-2.0

use crate::{Error, Value};
use std::sync::Arc;

/// The value domain a registered environment key is restricted to.
#[derive(Clone, Debug, PartialEq, Eq)]
pub enum ValueDomain {
    /// An ordered list of strings, duplicates preserved.
    List,
    /// A set of strings with unique, insertion-preserving order.
    Set,
    /// A single string drawn from a fixed set of choices.
    Enum(Arc<Vec<String>>),
    /// A single, unrestricted string.
    Str,
    /// A boolean flag.
    Bool,
    /// A signed integer.
    Int,
}

impl ValueDomain {
    /// A human-readable description of this domain, for `TypeMismatch` errors.
    pub fn describe(&self) -> &'static str {
        match self {
            ValueDomain::List => "an ordered list of strings",
            ValueDomain::Set => "a set of strings",
            ValueDomain::Enum(_) => "one of a fixed set of string choices",
            ValueDomain::Str => "a string",
            ValueDomain::Bool => "a boolean",
            ValueDomain::Int => "an integer",
        }
    }

    /// Returns true if a value's shape (and, for enums, its choice) matches this domain.
    pub fn accepts(&self, value: &Value) -> bool {
        match (self, value) {
            (ValueDomain::List, Value::List(_)) => true,
            (ValueDomain::Set, Value::Set(_)) => true,
            (ValueDomain::Enum(choices), Value::Enum(s)) => choices.iter().any(|c| c == s),
            (ValueDomain::Str, Value::Str(_)) => true,
            (ValueDomain::Bool, Value::Bool(_)) => true,
            (ValueDomain::Int, Value::Int(_)) => true,
            _ => false,
        }
    }

    /// Returns true if this domain is list- or set-shaped (the domains `append`/`prepend`/
    /// `remove` operate on).
    pub fn is_collection(&self) -> bool {
        matches!(self, ValueDomain::List | ValueDomain::Set)
    }
}

/// The declaration of a single environment key: its value domain, default, and (optionally) a
/// named normalization function applied at hash time.
///
/// Schemas are registered once per project, before any delta references the key (§4.B). Two
/// schemas are considered the same shape -- and so a re-registration is a no-op rather than a
/// `DuplicateKey` error -- when their domain and default agree. The `canonicalize` field names a
/// function in the project's [`crate::Transforms`] registry rather than holding a closure
/// directly, so that schemas stay comparable and dumpable like everything else in this crate.
#[derive(Clone, Debug, PartialEq, Eq)]
pub struct KeySchema {
    name: Box<str>,
    domain: ValueDomain,
    default: Value,
    canonicalize: Option<Box<str>>,
}

impl KeySchema {
    /// Constructs a new key schema.
    pub fn new(name: impl Into<Box<str>>, domain: ValueDomain, default: Value) -> Self {
        Self {
            name: name.into(),
            domain,
            default,
            canonicalize: None,
        }
    }

    /// Attaches a named normalization function, applied to this key's value before hashing (e.g.
    /// deduplicating adjacent equal entries in a list).
    pub fn with_canonicalize(mut self, transform_name: impl Into<Box<str>>) -> Self {
        self.canonicalize = Some(transform_name.into());
        self
    }

    /// The key's name.
    pub fn name(&self) -> &str {
        &self.name
    }

    /// The key's value domain.
    pub fn domain(&self) -> &ValueDomain {
        &self.domain
    }

    /// The key's default value, used by `lookup` when the key hasn't been touched by any delta.
    pub fn default(&self) -> &Value {
        &self.default
    }

    /// The name of the normalization transform applied at hash time, if any.
    pub fn canonicalize_transform(&self) -> Option<&str> {
        self.canonicalize.as_deref()
    }

    /// Validates that `value` fits this schema, returning a `TypeMismatch` otherwise.
    pub fn validate(&self, value: &Value) -> Result<(), Error> {
        if self.domain.accepts(value) {
            Ok(())
        } else {
            Err(Error::TypeMismatch {
                name: self.name.clone(),
                expected: self.domain.describe(),
                got: value.clone(),
            })
        }
    }
}
