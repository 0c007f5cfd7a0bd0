// Copyright (c) The Warren Contributors
// SPDX-License-Identifier: MIT OR Apache-2.0

//! The loader driver (§4.E): iteratively discovers packages by following dependency and
//! product-reference edges out from a set of entry targets, until every reachable package has
//! been loaded once.

use crate::errors::Error;
use crate::interpolate;
use crate::label::Identifier;
use crate::project::Project;
use crate::registry::Registry;
use crate::source::DescriptionSource;
use crate::target::{Source, Target};
use camino::{Utf8Path, Utf8PathBuf};
use envkit::Environment;
use std::collections::{HashSet, VecDeque};
use std::sync::Arc;
use tracing::{debug, instrument};

/// Loads a project, starting from `entries` (raw identifier text for the requested entry
/// targets). An empty `entries` list falls back to discovering every package under
/// `project_root` and treating every target declared `concrete` as an entry point, per §4.E step
/// 2's "all packages reachable from any concrete target if none specified".
#[instrument(skip(source, entries))]
pub fn load(
    source: &dyn DescriptionSource,
    project_root: &Utf8Path,
    entries: &[String],
) -> Result<(Project, Arc<Registry>, Vec<Identifier>), Error> {
    let root = source.load_project_root(project_root)?;
    let schema = Arc::new(root.schema);
    let mut project = Project::new(project_root.to_path_buf(), schema.clone());
    for (name, delta) in root.base_environments {
        let env = Environment::make_empty(schema.clone()).apply(&delta)?;
        project.add_base_environment(name, env);
    }
    if let Some(genroot) = root.genroot {
        project.set_genroot(genroot);
    }

    let mut registry = Registry::new();
    let mut queue: VecDeque<Utf8PathBuf> = VecDeque::new();
    let mut queued: HashSet<Utf8PathBuf> = HashSet::new();

    let root_context = Utf8PathBuf::from("");
    let explicit_entries: Vec<Identifier> = entries
        .iter()
        .map(|text| Identifier::parse(text, &root_context))
        .collect::<Result<_, _>>()?;

    if explicit_entries.is_empty() {
        for package_path in discover_packages(project_root) {
            enqueue(&mut queue, &mut queued, package_path);
        }
    } else {
        for id in &explicit_entries {
            enqueue(&mut queue, &mut queued, id.package().to_path_buf());
        }
    }

    while let Some(package_path) = queue.pop_front() {
        if registry.contains_package(&package_path) {
            continue;
        }
        debug!(package = %package_path, "loading package");
        reject_structural_path("package path", &package_path)?;
        let decl = source.load_package(project_root, &package_path)?;
        registry.package_mut(&package_path);

        for target_decl in decl.targets {
            interpolate::reject_structural("target name", &target_decl.name)?;
            let identifier = Identifier::new(package_path.clone(), target_decl.name.as_str());

            let resolved_deps: Vec<Identifier> = target_decl
                .deps
                .iter()
                .map(|text| Identifier::parse(text, &package_path))
                .collect::<Result<_, _>>()?;
            for dep in &resolved_deps {
                reject_structural_path("dependency package path", dep.package())?;
            }

            let mut sources = Vec::with_capacity(target_decl.sources.len());
            let mut source_deps = Vec::new();
            for text in &target_decl.sources {
                if text.contains('#') {
                    let id = Identifier::parse(text, &package_path)?;
                    reject_structural_path("dependency package path", id.package())?;
                    source_deps.push(id.target_only());
                    sources.push(Source::Product(id));
                } else {
                    project.reject_genroot_reference(text)?;
                    sources.push(Source::Path(Utf8PathBuf::from(text)));
                }
            }

            for dep in resolved_deps.iter().chain(source_deps.iter()) {
                enqueue(&mut queue, &mut queued, dep.package().to_path_buf());
            }

            let mut all_deps = resolved_deps;
            all_deps.extend(source_deps);
            registry.record_deps(identifier.clone(), all_deps.clone());

            let target = Target::new(
                identifier.clone(),
                target_decl.kind,
                target_decl.deps,
                sources,
                target_decl.down,
                target_decl.using,
                target_decl.local,
                target_decl.concrete,
                target_decl.generator,
            );

            registry
                .package_mut(&package_path)
                .insert(target)
                .map_err(|name| Error::DuplicateTarget { package: package_path.clone(), name: name.to_string() })?;
        }
    }

    let registry = registry.freeze();

    let entries = if explicit_entries.is_empty() {
        registry
            .packages()
            .flat_map(|pkg| pkg.targets())
            .filter(|t| t.is_concrete())
            .map(|t| t.identifier().clone())
            .collect()
    } else {
        explicit_entries
    };

    Ok((project, registry, entries))
}

/// Rejects an interpolation expression in any slash-delimited component of a structural path
/// (a package path), since `Identifier::parse`/`Identifier::new` never check this themselves.
fn reject_structural_path(field: &str, path: &Utf8Path) -> Result<(), Error> {
    for component in path.as_str().split('/') {
        if !component.is_empty() {
            interpolate::reject_structural(field, component)?;
        }
    }
    Ok(())
}

fn enqueue(queue: &mut VecDeque<Utf8PathBuf>, queued: &mut HashSet<Utf8PathBuf>, package_path: Utf8PathBuf) {
    if queued.insert(package_path.clone()) {
        queue.push_back(package_path);
    }
}

/// Walks the project tree looking for package description files, returning their project-relative
/// directory paths. Used only as the fallback entry-discovery path when no explicit targets are
/// requested.
fn discover_packages(project_root: &Utf8Path) -> Vec<Utf8PathBuf> {
    let mut found = Vec::new();
    let mut stack = vec![project_root.to_path_buf()];
    while let Some(dir) = stack.pop() {
        let Ok(entries) = std::fs::read_dir(&dir) else { continue };
        for entry in entries.flatten() {
            let path = entry.path();
            let Ok(utf8) = Utf8PathBuf::try_from(path.clone()) else { continue };
            if path.is_dir() {
                stack.push(utf8);
            } else if utf8.file_name() == Some("WARREN.json") {
                if let Ok(rel) = utf8.parent().unwrap_or(project_root).strip_prefix(project_root) {
                    found.push(rel.to_path_buf());
                }
            }
        }
    }
    found
}

#[cfg(test)]
mod tests {
    use super::*;
    use crate::source::JsonSource;

    #[test]
    fn empty_project_has_no_entries() {
        let dir = tempfile::tempdir().unwrap();
        let root = Utf8Path::from_path(dir.path()).unwrap();
        std::fs::write(root.join("WARREN.root.json"), r#"{"keys": []}"#).unwrap();

        let (_, registry, entries) = load(&JsonSource::new(), root, &[]).unwrap();
        assert!(entries.is_empty());
        assert_eq!(registry.packages().count(), 0);
    }
}
