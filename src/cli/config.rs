//! TOML configuration file support.
//!
//! Every command-line setting can also come from a config file:
//!
//! ```toml
//! # ms2-summary.toml
//! [paths]
//! input_dir = "/data/16032024_POS_C18"
//! output_dir = "/data/16032024_POS_C18/Results"
//!
//! [summary]
//! extension = "mzML"
//! top_n = 5
//! ```

use anyhow::{Context, Result};
use serde::Deserialize;
use std::path::{Path, PathBuf};

/// Root configuration structure.
#[derive(Debug, Default, Deserialize)]
pub struct Config {
    /// Input and output locations.
    #[serde(default)]
    pub paths: PathsConfig,

    /// Summary settings.
    #[serde(default)]
    pub summary: SummaryConfig,
}

/// Input and output locations.
#[derive(Debug, Default, Deserialize)]
pub struct PathsConfig {
    /// Directory containing the run files.
    pub input_dir: Option<PathBuf>,

    /// Directory for the results files.
    pub output_dir: Option<PathBuf>,
}

/// Summary settings.
#[derive(Debug, Default, Deserialize)]
pub struct SummaryConfig {
    /// Run file extension, without the dot.
    pub extension: Option<String>,

    /// Number of peaks reported per spectrum.
    pub top_n: Option<usize>,
}

impl Config {
    /// Load configuration from a TOML file.
    pub fn from_file(path: &Path) -> Result<Self> {
        let content = std::fs::read_to_string(path)
            .with_context(|| format!("Failed to read config file: {}", path.display()))?;

        Self::from_str(&content)
    }

    /// Parse configuration from a TOML string.
    pub fn from_str(content: &str) -> Result<Self> {
        toml::from_str(content).context("Failed to parse TOML configuration")
    }
}
