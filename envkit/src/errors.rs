// Copyright (c) The Warren Contributors
// SPDX-License-Identifier: MIT OR Apache-2.0

//! Contains types that describe errors `envkit` methods can return.

use crate::Value;
use std::{error, fmt};

use Error::*;

/// Error type describing the sorts of errors `envkit` can return.
#[derive(Debug)]
#[non_exhaustive]
pub enum Error {
    /// A key schema was registered a second time with a different shape.
    DuplicateKey {
        /// The key name that was re-registered.
        name: Box<str>,
    },
    /// A delta (or a lookup) referenced a key that was never registered.
    UnknownKey {
        /// The unrecognized key name.
        name: Box<str>,
    },
    /// A delta tried to set a value that doesn't fit the key's schema.
    TypeMismatch {
        /// The key whose schema was violated.
        name: Box<str>,
        /// A description of the domain the key expects.
        expected: &'static str,
        /// The value that was supplied instead.
        got: Value,
    },
    /// A `transform` operation named a function not present in the transform
    /// registry.
    UnknownTransform {
        /// The unrecognized transform name.
        name: Box<str>,
    },
    /// An `append`/`prepend`/`remove` operation was applied to a key whose
    /// schema isn't list- or set-shaped.
    NotACollection {
        /// The key the operation was applied to.
        name: Box<str>,
    },
}

impl fmt::Display for Error {
    fn fmt(&self, f: &mut fmt::Formatter<'_>) -> fmt::Result {
        match self {
            DuplicateKey { name } => write!(
                f,
                "key '{}' was already registered with a different schema",
                name
            ),
            UnknownKey { name } => write!(f, "unknown environment key '{}'", name),
            TypeMismatch {
                name,
                expected,
                got,
            } => write!(
                f,
                "value for key '{}' doesn't match its schema: expected {}, got {:?}",
                name, expected, got
            ),
            UnknownTransform { name } => write!(f, "unknown transform '{}'", name),
            NotACollection { name } => {
                write!(f, "key '{}' is not list- or set-valued", name)
            }
        }
    }
}

impl error::Error for Error {
    fn source(&self) -> Option<&(dyn error::Error + 'static)> {
        None
    }
}
