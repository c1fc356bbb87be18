//! CSV result files.
//!
//! One file per run, `{sample_name}_results.csv`, written to a temporary file
//! in the output directory and renamed into place once complete. A failed
//! write never leaves a partial results file behind.

use std::io::Write;
use std::path::PathBuf;

use tempfile::NamedTempFile;

use crate::summary::PeakSummary;

/// Suffix appended to the sample name
pub const RESULTS_SUFFIX: &str = "_results.csv";

/// Column order of every results file
pub const COLUMNS: [&str; 6] = [
    "precursor_mz",
    "rt",
    "num_peaks",
    "base_peak_mz",
    "base_peak_intensity",
    "top_peaks",
];

/// Errors that can occur while writing a results file
#[derive(Debug, thiserror::Error)]
pub enum WriterError {
    /// Error serializing a row
    #[error("CSV error: {0}")]
    Csv(#[from] csv::Error),

    /// I/O error creating or flushing the temporary file
    #[error("I/O error: {0}")]
    Io(#[from] std::io::Error),

    /// The finished file could not be moved into place
    #[error("Could not move results into {path}: {source}")]
    Persist {
        /// Destination path
        path: PathBuf,
        /// Underlying error
        #[source]
        source: std::io::Error,
    },

    /// Refused to write a file with no rows
    #[error("No rows to write for {0}")]
    Empty(String),
}

/// Writes per-run results into one directory
#[derive(Debug, Clone)]
pub struct ResultWriter {
    output_dir: PathBuf,
}

impl ResultWriter {
    /// Writer targeting `output_dir`, which must already exist
    pub fn new(output_dir: impl Into<PathBuf>) -> Self {
        Self {
            output_dir: output_dir.into(),
        }
    }

    /// Path of the results file for `sample_name`
    pub fn results_path(&self, sample_name: &str) -> PathBuf {
        self.output_dir
            .join(format!("{sample_name}{RESULTS_SUFFIX}"))
    }

    /// Write `rows` for `sample_name`, replacing any previous file
    pub fn write(&self, sample_name: &str, rows: &[PeakSummary]) -> Result<PathBuf, WriterError> {
        if rows.is_empty() {
            return Err(WriterError::Empty(sample_name.to_string()));
        }

        let path = self.results_path(sample_name);
        let mut temp = NamedTempFile::new_in(&self.output_dir)?;
        write_csv(temp.as_file_mut(), rows)?;
        temp.as_file_mut().sync_all()?;

        temp.persist(&path).map_err(|e| WriterError::Persist {
            path: path.clone(),
            source: e.error,
        })?;

        log::debug!("Wrote {} rows to {}", rows.len(), path.display());
        Ok(path)
    }
}

/// Serialize `rows` as CSV, header first.
///
/// With no rows only the header is written.
pub fn write_csv<W: Write>(out: W, rows: &[PeakSummary]) -> Result<(), WriterError> {
    let mut csv_writer = csv::WriterBuilder::new().has_headers(true).from_writer(out);
    if rows.is_empty() {
        csv_writer.write_record(COLUMNS)?;
    }
    for row in rows {
        csv_writer.serialize(row)?;
    }
    csv_writer.flush()?;
    Ok(())
}
