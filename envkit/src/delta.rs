// Copyright (c) The Warren Contributors
// SPDX-License-Identifier: MIT OR Apache-2.0

use crate::Value;
use serde::{Deserialize, Serialize};
use std::fmt;

/// A single per-key operation making up a [`Delta`].
///
/// Operations are data, not closures (§4.C / §9): they can be serialized, dumped in diagnostics,
/// and composed without being executed, with the single escape hatch being `Transform`, which
/// names a function in a per-project registry rather than embedding one.
#[derive(Clone, Debug, PartialEq, Eq, Serialize, Deserialize)]
pub enum Op {
    /// Replace the key's value outright. Valid for any domain.
    Set(Value),
    /// Append items to a list or set. For sets, an item already present keeps its earlier
    /// position.
    Append(Vec<String>),
    /// Prepend items to a list or set. For sets, an item already present is moved to the front.
    Prepend(Vec<String>),
    /// Remove items from a set. Silently a no-op for items not present. Valid only for `Set`.
    Remove(Vec<String>),
    /// Apply a named transform (looked up in the project's transform registry) to the current
    /// value, producing a new one.
    Transform(Box<str>),
}

impl fmt::Display for Op {
    fn fmt(&self, f: &mut fmt::Formatter<'_>) -> fmt::Result {
        match self {
            Op::Set(value) => write!(f, "= {}", value),
            Op::Append(items) => write!(f, "+= [{}]", items.join(", ")),
            Op::Prepend(items) => write!(f, "=+ [{}]", items.join(", ")),
            Op::Remove(items) => write!(f, "-= [{}]", items.join(", ")),
            Op::Transform(name) => write!(f, "-> {}(...)", name),
        }
    }
}

/// One operation in a [`Delta`], naming the key it applies to.
#[derive(Clone, Debug, PartialEq, Eq, Serialize, Deserialize)]
pub struct DeltaEntry {
    /// The environment key this operation touches.
    pub key: Box<str>,
    /// The operation itself.
    pub op: Op,
}

/// A finite, ordered sequence of per-key operations deriving one environment from another.
///
/// Deltas are values: they can be built up, inspected, serialized, and composed without ever
/// being evaluated against a concrete environment. Composition of a list of deltas is strictly
/// left-to-right and is associative but not commutative (§4.C, §8).
#[derive(Clone, Debug, Default, PartialEq, Eq, Serialize, Deserialize)]
#[serde(transparent)]
pub struct Delta {
    entries: Vec<DeltaEntry>,
}

impl Delta {
    /// An empty delta -- applying it is the identity.
    pub fn empty() -> Self {
        Self::default()
    }

    /// Starts building a delta with a single operation.
    pub fn new() -> DeltaBuilder {
        DeltaBuilder {
            entries: Vec::new(),
        }
    }

    /// Builds a delta directly from a sequence of entries, bypassing [`Delta::new`]'s builder.
    pub fn from_entries(entries: Vec<DeltaEntry>) -> Self {
        Delta { entries }
    }

    /// Returns the operations making up this delta, in application order.
    pub fn entries(&self) -> &[DeltaEntry] {
        &self.entries
    }

    /// Returns true if this delta has no operations.
    pub fn is_empty(&self) -> bool {
        self.entries.is_empty()
    }

    /// Concatenates `self` followed by `other` into a single delta with the same effect as
    /// applying `self` and then `other` in sequence.
    pub fn then(mut self, other: Delta) -> Delta {
        self.entries.extend(other.entries);
        self
    }
}

impl fmt::Display for Delta {
    fn fmt(&self, f: &mut fmt::Formatter<'_>) -> fmt::Result {
        for entry in &self.entries {
            writeln!(f, "{} {}", entry.key, entry.op)?;
        }
        Ok(())
    }
}

/// Incrementally builds a [`Delta`] one operation at a time.
#[derive(Clone, Debug, Default)]
pub struct DeltaBuilder {
    entries: Vec<DeltaEntry>,
}

impl DeltaBuilder {
    /// Appends a `set` operation.
    pub fn set(mut self, key: impl Into<Box<str>>, value: Value) -> Self {
        self.entries.push(DeltaEntry {
            key: key.into(),
            op: Op::Set(value),
        });
        self
    }

    /// Appends an `append` operation.
    pub fn append(mut self, key: impl Into<Box<str>>, items: impl IntoIterator<Item = impl Into<String>>) -> Self {
        self.entries.push(DeltaEntry {
            key: key.into(),
            op: Op::Append(items.into_iter().map(Into::into).collect()),
        });
        self
    }

    /// Appends a `prepend` operation.
    pub fn prepend(mut self, key: impl Into<Box<str>>, items: impl IntoIterator<Item = impl Into<String>>) -> Self {
        self.entries.push(DeltaEntry {
            key: key.into(),
            op: Op::Prepend(items.into_iter().map(Into::into).collect()),
        });
        self
    }

    /// Appends a `remove` operation.
    pub fn remove(mut self, key: impl Into<Box<str>>, items: impl IntoIterator<Item = impl Into<String>>) -> Self {
        self.entries.push(DeltaEntry {
            key: key.into(),
            op: Op::Remove(items.into_iter().map(Into::into).collect()),
        });
        self
    }

    /// Appends a `transform` operation.
    pub fn transform(mut self, key: impl Into<Box<str>>, transform_name: impl Into<Box<str>>) -> Self {
        self.entries.push(DeltaEntry {
            key: key.into(),
            op: Op::Transform(transform_name.into()),
        });
        self
    }

    /// Finishes building, producing the [`Delta`].
    pub fn build(self) -> Delta {
        Delta {
            entries: self.entries,
        }
    }
}
