// Copyright (c) The Warren Contributors
// SPDX-License-Identifier: MIT OR Apache-2.0

use crate::label::Identifier;
use camino::Utf8PathBuf;
use envkit::{Fingerprint, Value};
use std::collections::BTreeMap;

/// A fully-resolved command: a program, its arguments, a rule name for the downstream build
/// file, and any variable bindings the rule template needs (e.g. `restat`, `depfile`).
#[derive(Clone, Debug, PartialEq, Eq)]
pub struct Command {
    /// Name of the downstream build rule this command is an instance of.
    pub rule: String,
    /// The program to invoke.
    pub program: String,
    /// Arguments passed to `program`.
    pub args: Vec<String>,
    /// Extra rule-level variable bindings (restat, depfile, pool, ...).
    pub variables: BTreeMap<String, String>,
}

/// The unique key identifying a product. Two products with equal identity must carry equal
/// content -- enforced by the evaluator before insertion into the global product set.
#[derive(Clone, Debug, PartialEq, Eq, PartialOrd, Ord, Hash)]
pub struct ProductId {
    /// The target that produced this product.
    pub target: Identifier,
    /// The short fingerprint of the environment the product was produced in.
    pub fingerprint: String,
    /// The product's primary (first) output path.
    pub primary_output: Utf8PathBuf,
}

/// The fully-resolved output of evaluating a target in some environment.
#[derive(Clone, Debug, PartialEq, Eq)]
pub struct Product {
    /// The target identifier this product originated from.
    pub target: Identifier,
    /// The full fingerprint of the environment at the moment of production.
    pub fingerprint: Fingerprint,
    /// Resolved input file paths, project-root relative.
    pub inputs: Vec<Utf8PathBuf>,
    /// Resolved output file paths, build-directory relative. The first entry is primary.
    pub outputs: Vec<Utf8PathBuf>,
    /// The command that turns inputs into outputs.
    pub command: Command,
    /// The narrowed (`subset`) environment this product was produced in, explicit keys only, in
    /// key order. Carried so a diagnostic manifest dump can show the exact parameterization of a
    /// product without re-deriving it from the fingerprint.
    pub environment: Vec<(String, Value)>,
}

impl Product {
    /// The output path that anchors this product's identity.
    pub fn primary_output(&self) -> &Utf8PathBuf {
        &self.outputs[0]
    }

    /// Computes this product's global identity.
    pub fn id(&self) -> ProductId {
        ProductId {
            target: self.target.clone(),
            fingerprint: self.fingerprint.short().to_string(),
            primary_output: self.primary_output().clone(),
        }
    }
}

/// What a target's product generator hands back to the evaluator.
#[derive(Clone, Debug, Default)]
pub struct GeneratedProducts {
    /// The products this target produces in the environment it was invoked with.
    pub products: Vec<Product>,
    /// This target's own output paths, flattened across all products, in emission order.
    ///
    /// Exposed to the target's `using` delta as the reserved interpolation key `outputs`, since
    /// `using` is permitted to reference a target's own outputs (e.g. to build a link line).
    pub self_outputs: Vec<Utf8PathBuf>,
}
