// Copyright (c) The Warren Contributors
// SPDX-License-Identifier: MIT OR Apache-2.0

//! The package/target registry (§4.D): holds every package loaded so far and indexes the
//! forward dependency edges between their targets.

use crate::label::Identifier;
use crate::package::Package;
use crate::target::Target;
use camino::Utf8PathBuf;
use indexmap::IndexMap;
use std::sync::Arc;

/// Append-only while loading is in progress; call [`Registry::freeze`] once it completes to get
/// a read-only, sharable view for evaluation.
#[derive(Debug, Default)]
pub struct Registry {
    packages: IndexMap<Utf8PathBuf, Package>,
    /// target -> its resolved dependency identifiers, in declared order, duplicates collapsed.
    deps: IndexMap<Identifier, Vec<Identifier>>,
}

impl Registry {
    /// An empty registry, ready for loading.
    pub fn new() -> Self {
        Self::default()
    }

    /// Returns the package at `path`, creating it empty if it does not exist yet.
    pub fn package_mut(&mut self, path: &Utf8PathBuf) -> &mut Package {
        self.packages
            .entry(path.clone())
            .or_insert_with(|| Package::new(path.clone()))
    }

    /// Returns whether a package has already been loaded (as opposed to merely referenced).
    pub fn contains_package(&self, path: &Utf8PathBuf) -> bool {
        self.packages.contains_key(path)
    }

    /// Records the resolved dependency edges for a target, collapsing duplicates while
    /// preserving declared order.
    pub fn record_deps(&mut self, target: Identifier, resolved: Vec<Identifier>) {
        let mut seen = std::collections::HashSet::new();
        let deduped: Vec<Identifier> = resolved.into_iter().filter(|id| seen.insert(id.clone())).collect();
        self.deps.insert(target, deduped);
    }

    /// Looks up a target by identifier (ignoring any product-reference suffix).
    pub fn target(&self, identifier: &Identifier) -> Option<&Target> {
        let identifier = identifier.target_only();
        self.packages.get(identifier.package())?.target(identifier.target())
    }

    /// Returns the resolved dependency identifiers recorded for `target`.
    pub fn deps(&self, target: &Identifier) -> &[Identifier] {
        self.deps.get(&target.target_only()).map(Vec::as_slice).unwrap_or_default()
    }

    /// Iterates over every loaded package.
    pub fn packages(&self) -> impl Iterator<Item = &Package> {
        self.packages.values()
    }

    /// Freezes the registry for evaluation, returning a sharable handle.
    pub fn freeze(self) -> Arc<Registry> {
        Arc::new(self)
    }
}
