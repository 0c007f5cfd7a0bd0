// Copyright (c) The Warren Contributors
// SPDX-License-Identifier: MIT OR Apache-2.0

//! Immutable, fingerprinted key/value environments and the deltas that transform them.
//!
//! `envkit` implements the environment algebra a parameterized build-graph flattener threads
//! through its dependency edges: a [`KeySchema`] registry declares what an environment key may
//! hold, an [`Environment`] is an immutable map of such keys, and a [`Delta`] is a serializable,
//! inspectable sequence of operations that derives one environment from another. Two
//! environments are interchangeable exactly when their [`Fingerprint`]s agree.
//!
//! # Examples
//!
//! ```
//! use envkit::{Delta, EnvSchema, Environment, KeySchema, Value, ValueDomain};
//! use std::sync::Arc;
//!
//! let mut schema = EnvSchema::new();
//! schema
//!     .register_key(KeySchema::new("c_flags", ValueDomain::List, Value::List(vec![])))
//!     .unwrap();
//! let schema = Arc::new(schema);
//!
//! let base = Environment::make_empty(schema);
//! let delta = Delta::new().append("c_flags", ["-O2"]).build();
//! let derived = base.apply(&delta).unwrap();
//!
//! assert_eq!(derived.lookup("c_flags").unwrap(), Value::List(vec!["-O2".to_string()]));
//! assert_ne!(base.fingerprint().unwrap(), derived.fingerprint().unwrap());
//! ```

#![warn(missing_docs)]

mod delta;
pub mod diff;
mod errors;
mod fingerprint;
pub mod platform;
mod registry;
mod schema;
mod store;

#[cfg(test)]
mod unit_tests;

pub use delta::{Delta, DeltaBuilder, DeltaEntry, Op};
pub use diff::EnvironmentDiff;
pub use errors::Error;
pub use fingerprint::Fingerprint;
pub use registry::{EnvSchema, TransformFn};
pub use schema::{KeySchema, ValueDomain};
pub use store::Environment;
pub use value::Value;

mod value;

#[cfg(feature = "proptest1")]
pub mod proptest_helpers;
