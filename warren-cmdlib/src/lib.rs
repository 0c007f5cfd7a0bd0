// Copyright (c) The Warren Contributors
// SPDX-License-Identifier: MIT OR Apache-2.0

//! Support for CLI operations with warren: translates command-line arguments into calls against
//! the loader, evaluator, and manifest writer.

use camino::Utf8PathBuf;
use clap::Args;
use color_eyre::eyre::Result;
use std::sync::Arc;
use warren::{load, Evaluator, JsonSource};
use warren_manifest::{write_manifest, ManifestOptions};

/// Options describing what to build and where to write the manifest.
///
/// Mirrors the CLI surface in spec §5: a project root, an optional list of entry targets
/// (defaulting to every concrete target in the project), an output manifest path, and the
/// diagnostic dump flag from §6's optional environment-dump mode.
#[derive(Debug, Args)]
pub struct BuildOptions {
    /// Root directory of the project to build.
    pub project_root: Utf8PathBuf,

    /// Entry target identifiers to evaluate (default: every concrete target in the project).
    pub entries: Vec<String>,

    /// Path, relative to the project root, to write the generated Ninja manifest to.
    #[clap(long, default_value = "build.ninja")]
    pub manifest_path: Utf8PathBuf,

    /// Dump each product's full narrowed environment as comments alongside its build statement.
    #[clap(long, short = 'd')]
    pub diagnostic: bool,
}

/// Verbosity flags shared across subcommands, translated into a `tracing-subscriber` filter.
///
/// The options mirror the convention `cargo` tools use: `-v` for debug-level spans, `-vv` for
/// trace-level, nothing for warnings and above only.
#[derive(Debug, Args)]
pub struct Verbosity {
    /// Increase logging verbosity. May be repeated (-v, -vv).
    #[clap(short = 'v', long = "verbose", parse(from_occurrences), global = true)]
    pub verbose: u8,
}

impl Verbosity {
    /// Installs a `tracing-subscriber` `fmt` layer at the level implied by the flag count,
    /// honoring `RUST_LOG` if set (per the ambient logging convention: `-v`/`-vv` provide a
    /// floor, `RUST_LOG` can always override it).
    pub fn install_tracing_subscriber(&self) {
        let default_level = match self.verbose {
            0 => "warn",
            1 => "debug",
            _ => "trace",
        };
        let filter = tracing_subscriber::EnvFilter::try_from_default_env()
            .unwrap_or_else(|_| tracing_subscriber::EnvFilter::new(format!("warren={default_level}")));
        tracing_subscriber::fmt().with_env_filter(filter).init();
    }
}

/// Runs the full loader -> evaluator -> manifest pipeline described by `options`, returning the
/// generated manifest text. `regenerate_command` is recorded verbatim as the manifest's
/// regeneration build statement (§6), so callers should pass the argv that re-invokes the
/// binary's build subcommand.
pub fn run_build(options: &BuildOptions, regenerate_command: Vec<String>) -> Result<String> {
    let source = JsonSource::new();
    let (project, registry, entries) = load(&source, &options.project_root, &options.entries)?;

    let mut evaluator = Evaluator::new(Arc::clone(&registry));
    evaluator.evaluate_entries(&project, &entries)?;

    let manifest_options = ManifestOptions {
        regenerate_command,
        manifest_path: options.manifest_path.clone(),
        diagnostic: options.diagnostic,
    };
    let manifest = write_manifest(evaluator.products(), &project, &registry, &manifest_options)?;
    Ok(manifest)
}
