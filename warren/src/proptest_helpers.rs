// Copyright (c) The Warren Contributors
// SPDX-License-Identifier: MIT OR Apache-2.0

//! Proptest strategies for property-based tests elsewhere in this crate and its dependents.

use crate::label::Identifier;
use camino::Utf8PathBuf;
use proptest::prelude::*;

fn component() -> impl Strategy<Value = String> {
    "[a-z][a-z0-9_]{0,6}"
}

/// Generates a plausible package path: a handful of path-safe components joined by `/`.
pub fn package_path() -> impl Strategy<Value = Utf8PathBuf> {
    proptest::collection::vec(component(), 1..4).prop_map(|parts| Utf8PathBuf::from(parts.join("/")))
}

/// Generates an absolute, colon-form identifier with no product reference.
pub fn identifier() -> impl Strategy<Value = Identifier> {
    (package_path(), component()).prop_map(|(pkg, name)| Identifier::new(pkg, name))
}
