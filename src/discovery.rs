//! Locating input runs.

use std::fs;
use std::path::{Path, PathBuf};

/// Extension of the files processed by default
pub const DEFAULT_EXTENSION: &str = "mzML";

/// One input file
#[derive(Debug, Clone, PartialEq, Eq, PartialOrd, Ord)]
pub struct Run {
    /// Path of the input file
    pub path: PathBuf,
    /// File stem, used to name the results file
    pub sample_name: String,
}

impl Run {
    /// Build a run from its path; the sample name is the file stem
    pub fn from_path(path: impl Into<PathBuf>) -> Self {
        let path = path.into();
        let sample_name = path
            .file_stem()
            .map(|s| s.to_string_lossy().into_owned())
            .unwrap_or_default();
        Self { path, sample_name }
    }

    /// File name for log messages
    pub fn file_name(&self) -> String {
        self.path
            .file_name()
            .map(|s| s.to_string_lossy().into_owned())
            .unwrap_or_else(|| self.path.display().to_string())
    }
}

/// Conditions that prevent a batch from starting
#[derive(Debug, thiserror::Error)]
pub enum DiscoveryError {
    /// Input directory is absent or not a directory
    #[error("Input directory not found: {}", .0.display())]
    MissingDirectory(PathBuf),

    /// Nothing in the directory matched
    #[error("No .{extension} files found in {}", dir.display())]
    NoRuns {
        /// Directory that was searched
        dir: PathBuf,
        /// Extension that was searched for
        extension: String,
    },

    /// Listing the directory failed
    #[error("Could not list {}: {source}", dir.display())]
    Io {
        /// Directory being listed
        dir: PathBuf,
        /// Underlying error
        #[source]
        source: std::io::Error,
    },
}

/// List the regular files in `dir` whose extension is exactly `extension`.
///
/// Runs are sorted by path.
pub fn discover_runs(dir: &Path, extension: &str) -> Result<Vec<Run>, DiscoveryError> {
    if !dir.is_dir() {
        return Err(DiscoveryError::MissingDirectory(dir.to_path_buf()));
    }

    let io_err = |source| DiscoveryError::Io {
        dir: dir.to_path_buf(),
        source,
    };

    let mut runs = Vec::new();
    for entry in fs::read_dir(dir).map_err(io_err)? {
        let path = entry.map_err(io_err)?.path();
        let matches = path
            .extension()
            .is_some_and(|ext| ext.to_string_lossy() == extension);
        if matches && path.is_file() {
            runs.push(Run::from_path(path));
        }
    }

    if runs.is_empty() {
        return Err(DiscoveryError::NoRuns {
            dir: dir.to_path_buf(),
            extension: extension.to_string(),
        });
    }

    runs.sort();
    Ok(runs)
}
