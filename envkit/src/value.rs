// Copyright (c) The Warren Contributors
// SPDX-License-Identifier: MIT OR Apache-2.0

use indexmap::IndexSet;
use itertools::Itertools;
use serde::{Deserialize, Serialize};
use std::fmt;

/// A value stored under a registered environment key.
///
/// Each variant corresponds to one of the value domains a [`KeySchema`](crate::KeySchema) can
/// declare. `Value` never carries its own schema; callers validate shape against the schema that
/// owns the key.
#[derive(Clone, Debug, PartialEq, Eq, Serialize, Deserialize)]
pub enum Value {
    /// An ordered list of strings. Duplicates are preserved.
    List(Vec<String>),
    /// A set of strings with unique, insertion-preserving order.
    Set(IndexSet<String>),
    /// A single string drawn from an enumerated choice set.
    Enum(String),
    /// A single, unrestricted string.
    Str(String),
    /// A boolean flag.
    Bool(bool),
    /// A signed integer.
    Int(i64),
}

impl Value {
    /// Returns a short, stable name for this value's shape, for error messages.
    pub fn kind_name(&self) -> &'static str {
        match self {
            Value::List(_) => "list",
            Value::Set(_) => "set",
            Value::Enum(_) => "enum",
            Value::Str(_) => "string",
            Value::Bool(_) => "bool",
            Value::Int(_) => "int",
        }
    }

    /// Returns the items of a `List` or `Set` value, or `None` for scalar values.
    pub fn as_items(&self) -> Option<&[String]> {
        match self {
            Value::List(items) => Some(items.as_slice()),
            Value::Set(items) => Some(items.as_slice()),
            _ => None,
        }
    }

    /// Serializes this value into its canonical byte form for fingerprinting.
    ///
    /// Sets are hashed in sorted order; lists are hashed in the order given; strings are hashed
    /// as UTF-8 bytes; booleans and integers get a fixed-width encoding. This function does not
    /// apply a key's `canonicalize` normalization -- callers do that before calling this.
    pub fn canonical_bytes(&self, out: &mut Vec<u8>) {
        match self {
            Value::List(items) => {
                for item in items {
                    out.extend_from_slice(item.as_bytes());
                    out.push(0);
                }
            }
            Value::Set(items) => {
                let mut sorted: Vec<&str> = items.iter().map(String::as_str).collect();
                sorted.sort_unstable();
                for item in sorted {
                    out.extend_from_slice(item.as_bytes());
                    out.push(0);
                }
            }
            Value::Enum(s) | Value::Str(s) => out.extend_from_slice(s.as_bytes()),
            Value::Bool(b) => out.push(if *b { 1 } else { 0 }),
            Value::Int(i) => out.extend_from_slice(&i.to_be_bytes()),
        }
    }
}

impl fmt::Display for Value {
    fn fmt(&self, f: &mut fmt::Formatter<'_>) -> fmt::Result {
        match self {
            Value::List(items) => write!(f, "[{}]", items.iter().join(", ")),
            Value::Set(items) => write!(f, "{{{}}}", items.iter().join(", ")),
            Value::Enum(s) | Value::Str(s) => write!(f, "{:?}", s),
            Value::Bool(b) => write!(f, "{}", b),
            Value::Int(i) => write!(f, "{}", i),
        }
    }
}
