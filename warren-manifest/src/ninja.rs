// Copyright (c) The Warren Contributors
// SPDX-License-Identifier: MIT OR Apache-2.0

//! The Ninja-file writer (§6 "Downstream build manifest").
//!
//! One `rule` declaration per distinct rule name, each built to take its actual command line
//! from a per-statement `cmd` variable -- the same indirection generators like GN use, since a
//! rule's command line varies per product (different programs, different interpolated flags)
//! while its rule *name* (`cc`, `link`, `copy`, ...) stays fixed. A regeneration statement at the
//! top re-invokes the tool if any loaded description file changes, per §6.

use crate::{validate_inputs, Error};
use camino::Utf8PathBuf;
use std::collections::BTreeSet;
use std::fmt::Write as _;
use tracing::instrument;
use warren::{Product, Project, Registry};

/// Knobs controlling manifest emission.
#[derive(Clone, Debug)]
pub struct ManifestOptions {
    /// The argv that re-invokes this tool to regenerate the manifest, recorded verbatim in the
    /// regeneration build statement.
    pub regenerate_command: Vec<String>,
    /// The manifest's own output path, project-root relative, used as the regeneration rule's
    /// output so Ninja knows which file rebuilding the manifest produces.
    pub manifest_path: Utf8PathBuf,
    /// When set, every build statement also carries a comment block dumping the full narrowed
    /// environment the product was produced in (§6 "optionally dumps the full environment
    /// contents alongside each product").
    pub diagnostic: bool,
}

/// Validates every product's inputs (§4.G) and renders the Ninja-compatible manifest text.
///
/// `products` must already be deduplicated and in the evaluator's stable emission order; this
/// function does not re-sort or re-deduplicate, it only validates and serializes.
#[instrument(skip(products, project, registry, options))]
pub fn write_manifest<'a>(
    products: impl IntoIterator<Item = &'a Product>,
    project: &Project,
    registry: &Registry,
    options: &ManifestOptions,
) -> Result<String, Error> {
    let products: Vec<&Product> = products.into_iter().collect();
    validate_inputs(products.iter().copied(), project.root())?;

    let mut out = String::new();
    writeln!(out, "# generated by warren; do not edit by hand").unwrap();
    writeln!(out, "ninja_required_version = 1.8.2").unwrap();
    out.push('\n');

    write_regeneration(&mut out, project, registry, options);

    let rules: BTreeSet<&str> = products.iter().map(|p| p.command.rule.as_str()).collect();
    for rule in &rules {
        writeln!(out, "rule {}", rule).unwrap();
        writeln!(out, "  command = $cmd").unwrap();
        writeln!(out, "  description = {} $out", rule).unwrap();
        out.push('\n');
    }

    for product in &products {
        write_product(&mut out, product, options.diagnostic);
    }

    Ok(out)
}

fn write_regeneration(out: &mut String, project: &Project, registry: &Registry, options: &ManifestOptions) {
    writeln!(out, "rule warren_regenerate").unwrap();
    writeln!(out, "  command = {}", shell_join(&options.regenerate_command)).unwrap();
    writeln!(out, "  generator = 1").unwrap();
    writeln!(out, "  description = regenerating build manifest").unwrap();
    out.push('\n');

    let mut description_files: Vec<Utf8PathBuf> = vec![project.root().join("WARREN.root.json")];
    for package in registry.packages() {
        description_files.push(project.root().join(package.path()).join("WARREN.json"));
    }
    description_files.sort();

    write!(out, "build {}:", options.manifest_path).unwrap();
    write!(out, " warren_regenerate |").unwrap();
    for file in &description_files {
        write!(out, " {}", file).unwrap();
    }
    out.push('\n');
    out.push('\n');
}

fn write_product(out: &mut String, product: &Product, diagnostic: bool) {
    let outputs = product.outputs.iter().map(Utf8PathBuf::as_str).collect::<Vec<_>>().join(" ");
    let inputs = product.inputs.iter().map(Utf8PathBuf::as_str).collect::<Vec<_>>().join(" ");

    write!(out, "build {}: {}", outputs, product.command.rule).unwrap();
    if !inputs.is_empty() {
        write!(out, " {}", inputs).unwrap();
    }
    out.push('\n');

    let mut argv = vec![product.command.program.clone()];
    argv.extend(product.command.args.iter().cloned());
    writeln!(out, "  cmd = {}", shell_join(&argv)).unwrap();
    for (key, value) in &product.command.variables {
        writeln!(out, "  {} = {}", key, value).unwrap();
    }
    if diagnostic {
        writeln!(out, "  # target = {}", product.target).unwrap();
        writeln!(out, "  # fingerprint = {}", product.fingerprint).unwrap();
        for (key, value) in &product.environment {
            writeln!(out, "  # env {} = {}", key, value).unwrap();
        }
    }
    out.push('\n');
}

fn shell_join(argv: &[String]) -> String {
    argv.iter().map(|a| shell_quote(a)).collect::<Vec<_>>().join(" ")
}

fn shell_quote(arg: &str) -> String {
    if !arg.is_empty() && arg.chars().all(|c| c.is_ascii_alphanumeric() || matches!(c, '_' | '-' | '.' | '/' | ':' | '=')) {
        arg.to_string()
    } else {
        format!("'{}'", arg.replace('\'', "'\\''"))
    }
}

#[cfg(test)]
mod tests {
    use super::*;
    use fixtures::single_copy_file_project;
    use warren::{load, Evaluator, JsonSource};

    #[test]
    fn single_copy_file_manifest_contains_one_build_statement() {
        let dir = single_copy_file_project();
        let (project, registry, entries) = load(&JsonSource::new(), dir.path(), &["//greet:hello".to_string()]).unwrap();
        let mut evaluator = Evaluator::new(registry.clone());
        evaluator.evaluate_entries(&project, &entries).unwrap();

        let options = ManifestOptions {
            regenerate_command: vec!["warren".to_string(), "build".to_string()],
            manifest_path: Utf8PathBuf::from("build.ninja"),
            diagnostic: false,
        };
        let manifest = write_manifest(evaluator.products(), &project, &registry, &options).unwrap();
        assert!(manifest.contains("build greet/hello/a.txt: copy greet/a.txt"));
        assert!(manifest.contains("rule warren_regenerate"));
    }

    #[test]
    fn diagnostic_mode_dumps_environment() {
        let dir = single_copy_file_project();
        let (project, registry, entries) = load(&JsonSource::new(), dir.path(), &["//greet:hello".to_string()]).unwrap();
        let mut evaluator = Evaluator::new(registry.clone());
        evaluator.evaluate_entries(&project, &entries).unwrap();

        let options = ManifestOptions {
            regenerate_command: vec!["warren".to_string()],
            manifest_path: Utf8PathBuf::from("build.ninja"),
            diagnostic: true,
        };
        let manifest = write_manifest(evaluator.products(), &project, &registry, &options).unwrap();
        assert!(manifest.contains("# target = //greet:hello"));
    }
}
