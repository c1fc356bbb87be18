use anyhow::{ensure, Context, Result};
use clap::builder::RangedU64ValueParser;
use clap::Parser;
use std::io::Write;
use std::path::PathBuf;

use ms2_summary::diagnostics::LogDiagnostics;
use ms2_summary::experiment::MzMLLoader;
use ms2_summary::pipeline::{BatchConfig, BatchProcessor};

mod config;

use config::Config;

/// Summarize the most intense MS2 fragment peaks of every mzML file in a directory
#[derive(Parser, Debug)]
#[command(name = "ms2-summary")]
#[command(author, version, about, long_about = None)]
pub struct Cli {
    /// Verbosity level (-v for debug, -vv for trace)
    #[arg(short, long, action = clap::ArgAction::Count)]
    verbose: u8,

    /// Directory containing the run files
    #[arg(long, value_name = "DIR", env = "MS2_SUMMARY_INPUT_DIR")]
    input_dir: Option<PathBuf>,

    /// Directory for the results files (defaults to <INPUT_DIR>/Results)
    #[arg(long, value_name = "DIR", env = "MS2_SUMMARY_OUTPUT_DIR")]
    output_dir: Option<PathBuf>,

    /// Run file extension, without the dot (default: mzML)
    #[arg(long, value_name = "EXT")]
    extension: Option<String>,

    /// Number of peaks reported per spectrum (default: 5)
    #[arg(short = 'n', long, value_name = "N", value_parser = RangedU64ValueParser::<usize>::new().range(1..))]
    top_n: Option<usize>,

    /// Load settings from a TOML config file
    #[arg(long, value_name = "FILE")]
    config: Option<PathBuf>,
}

impl Cli {
    pub fn verbosity(&self) -> u8 {
        self.verbose
    }

    /// Merge flags, environment and config file into batch settings.
    ///
    /// Flags and environment variables win over the config file.
    pub fn batch_config(&self) -> Result<BatchConfig> {
        let file_config = match &self.config {
            Some(path) => Config::from_file(path)?,
            None => Config::default(),
        };

        let input_dir = self
            .input_dir
            .clone()
            .or(file_config.paths.input_dir)
            .context("No input directory given (use --input-dir, MS2_SUMMARY_INPUT_DIR or [paths] input_dir)")?;

        let mut batch = BatchConfig::new(input_dir);
        if let Some(output_dir) = self.output_dir.clone().or(file_config.paths.output_dir) {
            batch = batch.with_output_dir(output_dir);
        }
        if let Some(extension) = self.extension.clone().or(file_config.summary.extension) {
            batch = batch.with_extension(extension.trim_start_matches('.'));
        }
        if let Some(top_n) = self.top_n.or(file_config.summary.top_n) {
            ensure!(top_n >= 1, "top_n must be at least 1");
            batch = batch.with_top_n(top_n);
        }
        Ok(batch)
    }
}

pub fn init_logging(verbosity: u8) {
    let log_level = match verbosity {
        0 => "info",
        1 => "debug",
        _ => "trace",
    };
    env_logger::Builder::from_env(env_logger::Env::default().default_filter_or(log_level))
        .format(|buf, record| {
            writeln!(
                buf,
                "{} - {} - {}",
                buf.timestamp(),
                record.level(),
                record.args()
            )
        })
        .init();
}

/// Run the batch.
///
/// A batch that cannot start (no input directory, no runs) has already been
/// logged and is not an error for the process.
pub fn run(cli: Cli) -> Result<()> {
    let config = cli.batch_config()?;
    let loader = MzMLLoader::new();
    let diagnostics = LogDiagnostics::default();

    if let Ok(report) = BatchProcessor::new(config, &loader, &diagnostics).run() {
        log::debug!("{report:?}");
    }
    Ok(())
}
