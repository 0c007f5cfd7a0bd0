// Copyright (c) The Warren Contributors
// SPDX-License-Identifier: MIT OR Apache-2.0

use clap::Parser;
use color_eyre::eyre::{eyre, Result};
use warren_cmdlib::{BuildOptions, Verbosity};

/// Flattens a parameterized build description tree into a Ninja manifest.
#[derive(Debug, Parser)]
#[clap(about = "Flattens a parameterized build description tree into a Ninja manifest")]
struct Args {
    #[clap(flatten)]
    verbosity: Verbosity,
    #[clap(flatten)]
    build: BuildOptions,
}

fn main() -> Result<()> {
    color_eyre::install()?;
    let args = Args::parse();
    args.verbosity.install_tracing_subscriber();

    // Recorded verbatim as the manifest's regeneration command (§6), so re-running the same
    // invocation regenerates the manifest if any loaded description file changes.
    let regenerate_command: Vec<String> = std::env::args().collect();

    let manifest = warren_cmdlib::run_build(&args.build, regenerate_command)?;

    let manifest_path = args.build.project_root.join(&args.build.manifest_path);
    std::fs::write(&manifest_path, manifest).map_err(|e| eyre!("writing {}: {}", manifest_path, e))?;

    println!("wrote {}", manifest_path);
    Ok(())
}
