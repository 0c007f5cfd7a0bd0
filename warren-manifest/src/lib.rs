// Copyright (c) The Warren Contributors
// SPDX-License-Identifier: MIT OR Apache-2.0

//! Consumes the deduplicated product set an evaluated [`warren`] project produces and writes a
//! Ninja-compatible build manifest (§4.G, §6).
//!
//! This crate owns the one invariant the evaluator itself cannot check, because it only sees one
//! target's products at a time: every input path listed on some product must either be the
//! output of some other product in the final set, or exist as a source file relative to the
//! project root. Dangling references are reported before any bytes are written, not discovered
//! partway through a downstream build.

#![warn(missing_docs)]

mod errors;
mod ninja;
mod validate;

pub use errors::Error;
pub use ninja::{write_manifest, ManifestOptions};
pub use validate::validate_inputs;
