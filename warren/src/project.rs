// Copyright (c) The Warren Contributors
// SPDX-License-Identifier: MIT OR Apache-2.0

use crate::errors::Error;
use camino::{Utf8Path, Utf8PathBuf};
use envkit::{EnvSchema, Environment};
use std::collections::BTreeMap;
use std::sync::Arc;

/// The root of a build description tree (§3).
///
/// Created once per invocation by the loader, which fills in the schema registry and named base
/// environments from the project root description before packages are discovered.
pub struct Project {
    root: Utf8PathBuf,
    schema: Arc<EnvSchema>,
    base_environments: BTreeMap<String, Environment>,
    genroot: Option<Utf8PathBuf>,
}

impl Project {
    /// Creates a project rooted at `root`, with `schema` already populated with every
    /// environment key the root description registered.
    pub fn new(root: Utf8PathBuf, schema: Arc<EnvSchema>) -> Self {
        Project { root, schema, base_environments: BTreeMap::new(), genroot: None }
    }

    /// The project's filesystem root.
    pub fn root(&self) -> &Utf8Path {
        &self.root
    }

    /// The registered environment-key schema.
    pub fn schema(&self) -> &Arc<EnvSchema> {
        &self.schema
    }

    /// Registers a named base environment, as declared by the project root description.
    pub fn add_base_environment(&mut self, name: impl Into<String>, env: Environment) {
        self.base_environments.insert(name.into(), env);
    }

    /// Looks up a named base environment. The project always has an implicit `"default"` base
    /// environment (the all-defaults environment) even if none was declared explicitly.
    pub fn base_environment(&self, name: &str) -> Environment {
        self.base_environments
            .get(name)
            .cloned()
            .unwrap_or_else(|| Environment::make_empty(self.schema.clone()))
    }

    /// Records a build/generation root designated by the project root description.
    ///
    /// Kept only for round-tripping the project root description; this spec deprecates the
    /// legacy genroot-prefix mechanism for naming generated outputs in favor of `#` product
    /// references (§9), so nothing in this crate resolves paths against it. Attempting to use it
    /// that way is rejected, not silently honored.
    pub fn set_genroot(&mut self, path: Utf8PathBuf) {
        self.genroot = Some(path);
    }

    /// Rejects a genroot-prefixed path reference, per §9's deprecation of the mechanism.
    pub fn reject_genroot_reference(&self, text: &str) -> Result<(), Error> {
        if let Some(genroot) = &self.genroot {
            if text.starts_with(genroot.as_str()) {
                return Err(Error::DescriptionEvaluationError {
                    file: self.root.clone(),
                    diagnostic: format!(
                        "genroot-prefixed output reference {:?} is deprecated; use a `#` product reference instead",
                        text
                    ),
                });
            }
        }
        Ok(())
    }
}
