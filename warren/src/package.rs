// Copyright (c) The Warren Contributors
// SPDX-License-Identifier: MIT OR Apache-2.0

use crate::target::Target;
use camino::Utf8PathBuf;
use indexmap::IndexMap;

/// A package: a directory within the project holding a description file, identified by a
/// project-relative slash-delimited path. Created lazily when the loader first encounters a
/// reference into it; never mutated once loading completes.
#[derive(Debug)]
pub struct Package {
    path: Utf8PathBuf,
    targets: IndexMap<Box<str>, Target>,
}

impl Package {
    /// Creates an empty package at `path`, with no targets yet.
    pub fn new(path: Utf8PathBuf) -> Self {
        Package { path, targets: IndexMap::new() }
    }

    /// The package's project-relative path.
    pub fn path(&self) -> &Utf8PathBuf {
        &self.path
    }

    /// Inserts a target, failing with `Err` (the target name) if one is already present.
    pub fn insert(&mut self, target: Target) -> Result<(), Box<str>> {
        let name: Box<str> = Box::from(target.identifier().target());
        if self.targets.contains_key(&name) {
            return Err(name);
        }
        self.targets.insert(name, target);
        Ok(())
    }

    /// Looks up a target by name.
    pub fn target(&self, name: &str) -> Option<&Target> {
        self.targets.get(name)
    }

    /// Iterates over this package's targets in declaration order.
    pub fn targets(&self) -> impl Iterator<Item = &Target> {
        self.targets.values()
    }
}
