// Copyright (c) The Warren Contributors
// SPDX-License-Identifier: MIT OR Apache-2.0

//! Flattens parameterized build-description graphs into concrete, deduplicated build products.
//!
//! A project is a tree of packages, each holding targets parameterized by an [`envkit::Environment`].
//! [`loader::load`] discovers every package reachable from a set of entry targets; [`eval::Evaluator`]
//! then walks each entry target's dependency subtree, threading environments through `down`/
//! `using`/`local` deltas, to produce a deduplicated set of [`product::Product`]s ready for a
//! downstream build-file writer.
//!
//! ```
//! use warren::label::Identifier;
//! use camino::Utf8PathBuf;
//!
//! let id = Identifier::parse("//lib/greet:hello", &Utf8PathBuf::from("")).unwrap();
//! assert_eq!(id.to_string(), "//lib/greet:hello");
//! ```

#![warn(missing_docs)]

pub mod errors;
pub mod eval;
pub mod interpolate;
pub mod label;
pub mod loader;
pub mod package;
pub mod product;
pub mod project;
pub mod registry;
pub mod source;
pub mod target;

#[cfg(feature = "proptest1")]
pub mod proptest_helpers;

pub use errors::{ChainFrame, Error};
pub use eval::Evaluator;
pub use label::Identifier;
pub use loader::load;
pub use package::Package;
pub use product::{Command, GeneratedProducts, Product, ProductId};
pub use project::Project;
pub use registry::Registry;
pub use source::{DescriptionSource, JsonSource, PackageDecl, ProjectRoot, TargetDecl};
pub use target::{CommandTemplate, GenerateContext, ProductGenerator, Source, Target};
