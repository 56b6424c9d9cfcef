//! Main executable for hybriddock

use anyhow::{Context, Result};
use clap::Parser;
use std::path::PathBuf;

use hybriddock::orchestrator::{dock, LogProgress};
use hybriddock::toolkit::HybridToolkit;

/// Command-line arguments for the application
#[derive(Parser, Debug)]
#[clap(
    name = "hybriddock",
    version = hybriddock::VERSION,
    about = "Automated hybrid docking of small molecules to a receptor"
)]
struct Cli {
    /// Prepared receptor file, or a structure file containing a
    /// protein-ligand complex to derive the receptor from
    #[clap(value_parser)]
    receptor: PathBuf,

    /// File containing one or more molecules to dock (format by extension)
    #[clap(value_parser)]
    molecules: PathBuf,

    /// Output file for docked molecules (format by extension, e.g. .sdf)
    #[clap(value_parser)]
    output: PathBuf,

    /// Number of docked poses to generate per molecule
    #[clap(long, default_value_t = 1)]
    poses: usize,
}

fn main() -> Result<()> {
    // Initialize logger
    env_logger::init();

    // Parse command-line arguments
    let cli = Cli::parse();

    let report = dock(
        &HybridToolkit,
        &cli.receptor,
        &cli.molecules,
        &cli.output,
        cli.poses,
        &LogProgress,
    )
    .with_context(|| {
        format!(
            "docking {} against {} failed",
            cli.molecules.display(),
            cli.receptor.display()
        )
    })?;

    println!(
        "docked {} molecules to {}",
        report.molecules_docked,
        cli.output.display()
    );

    Ok(())
}
