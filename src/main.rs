//! # ms2-summary
//!
//! A command-line tool that summarizes the MS2 spectra of every mzML file in a
//! directory into per-file CSV results.
//!
//! ## Usage
//!
//! ```bash
//! # Summarize all runs, results in /data/run1/Results
//! ms2-summary --input-dir /data/run1
//!
//! # Ten peaks per spectrum, settings from a config file
//! ms2-summary --config ms2-summary.toml --top-n 10
//! ```

use anyhow::Result;
use clap::Parser;

mod cli;

fn main() -> Result<()> {
    let cli = cli::Cli::parse();
    cli::init_logging(cli.verbosity());
    cli::run(cli)
}
