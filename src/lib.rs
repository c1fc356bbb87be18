//! # ms2-summary - Top fragment peaks of MS2 spectra
//!
//! `ms2_summary` reads every mzML run in a directory, keeps the MS2
//! (fragmentation) spectra and writes one CSV per run listing, for each
//! spectrum, its precursor m/z, retention time, peak count, base peak and most
//! intense fragment peaks.
//!
//! ## Quick Start
//!
//! ```rust,no_run
//! use ms2_summary::prelude::*;
//!
//! let config = BatchConfig::new("/data/16032024_POS_C18").with_top_n(5);
//! let loader = MzMLLoader::new();
//! let diagnostics = LogDiagnostics::default();
//!
//! let report = BatchProcessor::new(config, &loader, &diagnostics).run()?;
//! println!(
//!     "{} of {} runs written, {} rows",
//!     report.runs_written, report.runs_discovered, report.rows_written
//! );
//! # Ok::<(), ms2_summary::pipeline::BatchError>(())
//! ```
//!
//! This creates one file per run:
//! ```text
//! 16032024_POS_C18/
//! ├── QC_01.mzML
//! ├── QC_02.mzML
//! └── Results/
//!     ├── QC_01_results.csv
//!     └── QC_02_results.csv
//! ```
//!
//! ## Results Format
//!
//! | Column | Description |
//! |--------|-------------|
//! | precursor_mz | m/z of the first precursor (4 decimals) |
//! | rt | Retention time in seconds (4 decimals) |
//! | num_peaks | Number of peaks in the spectrum |
//! | base_peak_mz | m/z of the most intense peak (4 decimals) |
//! | base_peak_intensity | Intensity of the most intense peak (1 decimal) |
//! | top_peaks | Most intense peaks as `mz:intensity` joined by `;` |
//!
//! ## Architecture
//!
//! - [`discovery`]: finds the runs in the input directory
//! - [`mzml`]: streaming mzML reader with binary array decoding
//! - [`experiment`]: plain spectrum values and the [`experiment::RunLoader`] seam
//! - [`summary`]: MS2 filtering and top-peak summaries
//! - [`writer`]: atomic CSV results files
//! - [`pipeline`]: the batch driver
//! - [`diagnostics`]: the logging context passed through the pipeline

// Documentation lints - enforce complete documentation for publication
#![deny(missing_docs)]
#![deny(rustdoc::missing_crate_level_docs)]

pub mod diagnostics;
pub mod discovery;
pub mod experiment;
pub mod mzml;
pub mod pipeline;
pub mod summary;
pub mod writer;

/// Re-export commonly used types for convenience
pub mod prelude {
    pub use crate::diagnostics::{Diagnostics, LogDiagnostics, RecordingDiagnostics};
    pub use crate::discovery::{discover_runs, DiscoveryError, Run, DEFAULT_EXTENSION};
    pub use crate::experiment::{
        Experiment, LoadError, MzMLLoader, Precursor, RunLoader, Spectrum, SpectrumBuilder,
    };
    pub use crate::mzml::{MzMLError, MzMLStreamer};
    pub use crate::pipeline::{
        BatchConfig, BatchError, BatchProcessor, BatchReport, RunOutcome, SkipReason,
    };
    pub use crate::summary::{
        ms2_spectra, summarize_spectra, summarize_spectrum, PeakPair, PeakSummary, SummaryError,
        DEFAULT_TOP_N, MS2_LEVEL,
    };
    pub use crate::writer::{ResultWriter, WriterError};
}
