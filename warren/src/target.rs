// Copyright (c) The Warren Contributors
// SPDX-License-Identifier: MIT OR Apache-2.0

//! Targets and the product-generator contract plugins satisfy.
//!
//! This crate does not implement target-kind plugins (library, binary, copy-file, ...) -- per
//! scope, only the contract they satisfy is specified here via [`ProductGenerator`]. One concrete,
//! data-driven generator, [`CommandTemplate`], is provided: it covers the common "run one command
//! over some inputs to produce some outputs" shape and is what the fixtures and the bundled
//! [`crate::source::JsonSource`] build targets out of.

use crate::errors::Error;
use crate::interpolate;
use crate::label::Identifier;
use crate::product::{Command, GeneratedProducts, Product};
use camino::{Utf8Path, Utf8PathBuf};
use envkit::{Delta, Environment, Value};
use serde::{Deserialize, Serialize};
use std::fmt;
use std::sync::Arc;

/// A source entry in a target's `sources` list: either a literal project-relative path, or a
/// reference to another target's product, resolved during evaluation.
#[derive(Clone, Debug, PartialEq, Eq)]
pub enum Source {
    /// A path resolved relative to the package that declared it.
    Path(Utf8PathBuf),
    /// A reference to another target's output, e.g. `//gen:codegen#tables.c`.
    Product(Identifier),
}

/// Everything a [`ProductGenerator`] needs to produce a target's products.
pub struct GenerateContext<'a> {
    /// The identifier of the target being evaluated.
    pub identifier: &'a Identifier,
    /// The environment this target's products are produced in.
    pub env_local: &'a Environment,
    /// This target's declared sources, with product references already resolved to concrete
    /// output paths by the evaluator.
    pub resolved_sources: &'a [Utf8PathBuf],
}

/// The contract a target-kind plugin satisfies: given an environment and resolved sources,
/// produce a set of products and this target's own output paths.
pub trait ProductGenerator: fmt::Debug + Send + Sync {
    /// Produces this target's products in `ctx.env_local`.
    fn generate(&self, ctx: &GenerateContext<'_>) -> Result<GeneratedProducts, Error>;
}

/// A data-driven [`ProductGenerator`]: runs one command template over the resolved sources to
/// produce one or more output paths, with `${key}` interpolation against `env_local` in the
/// program, arguments, and output path templates.
#[derive(Clone, Debug, Serialize, Deserialize)]
pub struct CommandTemplate {
    /// Downstream build rule name (e.g. `copy`, `cc`, `link`).
    pub rule: String,
    /// Program template, interpolated against `env_local`.
    pub program: String,
    /// Argument templates, interpolated against `env_local`.
    pub args: Vec<String>,
    /// Output path templates, relative to the build root, interpolated against `env_local`.
    pub outputs: Vec<String>,
    /// Environment keys narrowed via `subset` before the product's environment is recorded.
    pub subset_keys: Vec<String>,
}

impl ProductGenerator for CommandTemplate {
    fn generate(&self, ctx: &GenerateContext<'_>) -> Result<GeneratedProducts, Error> {
        let resolve = |key: &str| -> Option<String> {
            ctx.env_local.lookup(key).ok().map(|v| match v {
                Value::List(items) => items.join(" "),
                Value::Set(items) => items.into_iter().collect::<Vec<_>>().join(" "),
                Value::Enum(s) | Value::Str(s) => s,
                Value::Bool(b) => b.to_string(),
                Value::Int(i) => i.to_string(),
            })
        };

        let program = interpolate::interpolate(&self.program, "program", resolve)?;
        let args = self
            .args
            .iter()
            .map(|a| interpolate::interpolate(a, "args", resolve))
            .collect::<Result<Vec<_>, _>>()?;
        let outputs = self
            .outputs
            .iter()
            .map(|o| interpolate::interpolate(o, "outputs", resolve).map(Utf8PathBuf::from))
            .collect::<Result<Vec<_>, _>>()?;
        if outputs.is_empty() {
            return Err(Error::NoOutputs { identifier: ctx.identifier.clone() });
        }

        let product_env = ctx.env_local.subset(&self.subset_keys)?;
        let mut environment = Vec::with_capacity(self.subset_keys.len());
        for key in &self.subset_keys {
            environment.push((key.clone(), product_env.lookup(key)?));
        }
        let product = Product {
            target: ctx.identifier.clone(),
            fingerprint: product_env.fingerprint()?,
            inputs: ctx.resolved_sources.to_vec(),
            outputs: outputs.clone(),
            command: Command {
                rule: self.rule.clone(),
                program,
                args,
                variables: Default::default(),
            },
            environment,
        };

        Ok(GeneratedProducts { products: vec![product], self_outputs: outputs })
    }
}

/// A loaded target: its identity, static shape, and the deltas it applies while evaluating.
#[derive(Clone)]
pub struct Target {
    identifier: Identifier,
    kind: String,
    deps: Vec<String>,
    down: Delta,
    using: Delta,
    local: Delta,
    concrete: bool,
    generator: Arc<dyn ProductGenerator>,
    sources: Vec<Source>,
}

impl Target {
    /// Builds a new target. `deps` are unresolved identifier strings, as declared in the
    /// description file; the loader resolves them once the identifier's package context is known.
    #[allow(clippy::too_many_arguments)]
    pub fn new(
        identifier: Identifier,
        kind: impl Into<String>,
        deps: Vec<String>,
        sources: Vec<Source>,
        down: Delta,
        using: Delta,
        local: Delta,
        concrete: bool,
        generator: Arc<dyn ProductGenerator>,
    ) -> Self {
        Target {
            identifier,
            kind: kind.into(),
            deps,
            down,
            using,
            local,
            concrete,
            generator,
            sources,
        }
    }

    /// This target's canonical identifier.
    pub fn identifier(&self) -> &Identifier {
        &self.identifier
    }

    /// The opaque kind tag set by the plugin that built this target.
    pub fn kind(&self) -> &str {
        &self.kind
    }

    /// Unresolved dependency identifier strings, in declared order.
    pub fn deps(&self) -> &[String] {
        &self.deps
    }

    /// The target's declared sources (paths and product references).
    pub fn sources(&self) -> &[Source] {
        &self.sources
    }

    /// The delta applied to the environment flowing to transitive dependencies.
    pub fn down(&self) -> &Delta {
        &self.down
    }

    /// The delta applied to the environment folded back from dependencies, to produce the
    /// using-environment surfaced to this target's dependents.
    pub fn using(&self) -> &Delta {
        &self.using
    }

    /// The delta applied to produce the environment this target's own products are made in.
    pub fn local(&self) -> &Delta {
        &self.local
    }

    /// Whether this target was declared usable as an entry point.
    ///
    /// A declaration of `concrete = true` is necessary but not sufficient: evaluating the target
    /// against the project base environment can still fail for the ordinary reasons (an
    /// unregistered key, a type mismatch), which is how a target that claims concreteness but
    /// does not actually close over its free parameters is caught.
    pub fn is_concrete(&self) -> bool {
        self.concrete
    }

    /// Invokes this target's product generator.
    pub fn generate(&self, ctx: &GenerateContext<'_>) -> Result<GeneratedProducts, Error> {
        self.generator.generate(ctx)
    }

    /// Resolves a source path relative to `package`, leaving product references untouched.
    pub fn resolve_source_path(source: &Source, package: &Utf8Path) -> Option<Utf8PathBuf> {
        match source {
            Source::Path(p) => Some(package.join(p)),
            Source::Product(_) => None,
        }
    }
}

impl fmt::Debug for Target {
    fn fmt(&self, f: &mut fmt::Formatter<'_>) -> fmt::Result {
        f.debug_struct("Target")
            .field("identifier", &self.identifier)
            .field("kind", &self.kind)
            .field("deps", &self.deps)
            .field("concrete", &self.concrete)
            .finish_non_exhaustive()
    }
}
