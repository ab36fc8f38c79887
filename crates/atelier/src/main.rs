//! `atelier` - CLI for the studio site
//!
//! This binary serves the site and drives its content, catalog, cart and
//! order operations from the command line.

#![warn(missing_debug_implementations)]
#![deny(unsafe_code)]

use std::process::ExitCode;

use anyhow::Context;
use clap::Parser;

use atelier::cli::{run, Cli};
use atelier::{init_logging, Config};

fn main() -> anyhow::Result<ExitCode> {
    let cli = Cli::parse();

    // Initialize logging based on verbosity
    init_logging(cli.verbosity());

    // Load configuration
    let config = Config::load_from(cli.config.clone()).context("loading configuration")?;

    // Execute the command
    let mut stdout = std::io::stdout().lock();
    let status = run(cli.command, &config, &mut stdout);

    if status.is_error() || !cli.quiet {
        eprintln!("{status}");
    }
    Ok(if status.is_error() {
        ExitCode::FAILURE
    } else {
        ExitCode::SUCCESS
    })
}
