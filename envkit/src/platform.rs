// Copyright (c) The Warren Contributors
// SPDX-License-Identifier: MIT OR Apache-2.0

//! A convenience layer for "the environment of the machine running the tool," so a minimal
//! project needs no description code at all to get a usable base environment.
//!
//! This is additive sugar over the core algebra in [`crate::store`] -- it registers two
//! well-known keys (`os`, `arch`) and a delta that sets them from `std::env::consts`, the way
//! `target_spec::Platform::current()` hands back the host triple without requiring the caller to
//! parse anything.

use crate::{Delta, EnvSchema, Environment, Error, KeySchema, Value, ValueDomain};
use std::sync::Arc;

/// The name of the registered key holding the host operating system (`"linux"`, `"macos"`,
/// `"windows"`, ...), as reported by `std::env::consts::OS`.
pub const OS_KEY: &str = "os";

/// The name of the registered key holding the host architecture (`"x86_64"`, `"aarch64"`, ...),
/// as reported by `std::env::consts::ARCH`.
pub const ARCH_KEY: &str = "arch";

/// Registers the `os` and `arch` keys on `schema`, each a free-form string defaulting to the
/// empty string. Safe to call more than once (registration is idempotent for identical shapes).
pub fn register_host_keys(schema: &mut EnvSchema) -> Result<(), Error> {
    schema.register_key(KeySchema::new(OS_KEY, ValueDomain::Str, Value::Str(String::new())))?;
    schema.register_key(KeySchema::new(
        ARCH_KEY,
        ValueDomain::Str,
        Value::Str(String::new()),
    ))?;
    Ok(())
}

/// A delta that sets `os` and `arch` to the values for the machine currently running the tool.
pub fn host_delta() -> Delta {
    Delta::new()
        .set(OS_KEY, Value::Str(std::env::consts::OS.to_string()))
        .set(ARCH_KEY, Value::Str(std::env::consts::ARCH.to_string()))
        .build()
}

/// Returns the empty environment for `schema` with `os`/`arch` set to the current host.
///
/// `schema` must already have the `os`/`arch` keys registered, e.g. via [`register_host_keys`].
pub fn current(schema: Arc<EnvSchema>) -> Result<Environment, Error> {
    let base = Environment::make_empty(schema);
    base.apply(&host_delta())
}
