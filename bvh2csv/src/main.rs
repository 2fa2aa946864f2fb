//! Main entry point for the bvh2csv CLI

mod cli;
mod convert;

use anyhow::Result;
use clap::Parser;

use crate::cli::Cli;
use crate::convert::ConvertOptions;

fn main() -> Result<()> {
    // Parse command line arguments
    let cli = Cli::parse();

    // Initialize logger, RUST_LOG still wins over the flags
    let default_filter = if cli.quiet {
        "error"
    } else {
        match cli.verbose {
            0 => "warn",
            1 => "info",
            2 => "debug",
            _ => "trace",
        }
    };
    env_logger::Builder::from_env(env_logger::Env::default().default_filter_or(default_filter))
        .init();

    let options = ConvertOptions {
        out_dir: cli.out_dir,
        scale: cli.scale,
        rotation: cli.rotation,
        location: cli.location,
        end_sites: cli.end_sites,
    };
    convert::convert(&cli.input, &options)
}
