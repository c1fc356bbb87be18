//! Batch driver.
//!
//! [`BatchProcessor`] runs discovery, then for every run: load, keep the MS2
//! spectra, summarize them and write the results file. Problems with a single
//! spectrum or a single run are reported through [`Diagnostics`] and counted in
//! the [`BatchReport`]; only conditions that stop the batch from starting are
//! returned as [`BatchError`].

use std::fs;
use std::path::{Path, PathBuf};
use std::time::Instant;

use crate::diagnostics::Diagnostics;
use crate::discovery::{discover_runs, DiscoveryError, Run, DEFAULT_EXTENSION};
use crate::experiment::RunLoader;
use crate::summary::{ms2_spectra, summarize_spectra, DEFAULT_TOP_N};
use crate::writer::ResultWriter;

/// Name of the output directory created inside the input directory
pub const RESULTS_DIR_NAME: &str = "Results";

/// Settings for one batch
#[derive(Debug, Clone, PartialEq, Eq)]
pub struct BatchConfig {
    /// Directory searched for runs
    pub input_dir: PathBuf,
    /// Directory receiving the results files
    pub output_dir: PathBuf,
    /// Extension of the run files, without the dot
    pub extension: String,
    /// Peaks reported per spectrum
    pub top_n: usize,
}

impl BatchConfig {
    /// Defaults for `input_dir`: results go to `<input_dir>/Results`
    pub fn new(input_dir: impl Into<PathBuf>) -> Self {
        let input_dir = input_dir.into();
        let output_dir = default_output_dir(&input_dir);
        Self {
            input_dir,
            output_dir,
            extension: DEFAULT_EXTENSION.to_string(),
            top_n: DEFAULT_TOP_N,
        }
    }

    /// Set the output directory
    pub fn with_output_dir(mut self, output_dir: impl Into<PathBuf>) -> Self {
        self.output_dir = output_dir.into();
        self
    }

    /// Set the run file extension
    pub fn with_extension(mut self, extension: impl Into<String>) -> Self {
        self.extension = extension.into();
        self
    }

    /// Set the number of peaks per spectrum
    pub fn with_top_n(mut self, top_n: usize) -> Self {
        self.top_n = top_n;
        self
    }
}

/// Why a run produced no results file
#[derive(Debug, Clone, Copy, PartialEq, Eq)]
pub enum SkipReason {
    /// The loader rejected the file
    LoadFailed,
    /// The run has no MS2 spectra
    NoMs2,
    /// No MS2 spectrum yielded a row
    NoRows,
    /// The results file could not be written
    WriteFailed,
}

/// Result of processing one run
#[derive(Debug, Clone, PartialEq)]
pub enum RunOutcome {
    /// A results file was written
    Written {
        /// Path of the results file
        path: PathBuf,
        /// Rows in the file
        rows: usize,
    },
    /// The run was skipped
    Skipped(SkipReason),
}

/// Counts for a finished batch
#[derive(Debug, Clone, Default, PartialEq, Eq)]
pub struct BatchReport {
    /// Runs found by discovery
    pub runs_discovered: usize,
    /// Runs with a results file
    pub runs_written: usize,
    /// Runs the loader rejected
    pub load_failures: usize,
    /// Runs without MS2 spectra
    pub runs_without_ms2: usize,
    /// Runs whose MS2 spectra yielded no rows
    pub runs_without_rows: usize,
    /// Runs whose results could not be written
    pub write_failures: usize,
    /// Rows across all results files
    pub rows_written: usize,
    /// Results files, in processing order
    pub outputs: Vec<PathBuf>,
}

impl BatchReport {
    fn new(runs_discovered: usize) -> Self {
        Self {
            runs_discovered,
            ..Default::default()
        }
    }

    /// Runs that produced no results file
    pub fn runs_skipped(&self) -> usize {
        self.load_failures + self.runs_without_ms2 + self.runs_without_rows + self.write_failures
    }

    fn record(&mut self, outcome: RunOutcome) {
        match outcome {
            RunOutcome::Written { path, rows } => {
                self.runs_written += 1;
                self.rows_written += rows;
                self.outputs.push(path);
            }
            RunOutcome::Skipped(SkipReason::LoadFailed) => self.load_failures += 1,
            RunOutcome::Skipped(SkipReason::NoMs2) => self.runs_without_ms2 += 1,
            RunOutcome::Skipped(SkipReason::NoRows) => self.runs_without_rows += 1,
            RunOutcome::Skipped(SkipReason::WriteFailed) => self.write_failures += 1,
        }
    }
}

/// Conditions that stop a batch before any run is processed
#[derive(Debug, thiserror::Error)]
pub enum BatchError {
    /// No runs to process
    #[error(transparent)]
    Discovery(#[from] DiscoveryError),

    /// The output directory could not be created
    #[error("Could not create output directory {}: {source}", path.display())]
    OutputDir {
        /// Directory that was being created
        path: PathBuf,
        /// Underlying error
        #[source]
        source: std::io::Error,
    },

    /// Zero peaks per spectrum requested
    #[error("top peak count must be at least 1")]
    ZeroTopN,
}

/// Drives a batch of runs through load, summarize and write
pub struct BatchProcessor<'a> {
    config: BatchConfig,
    loader: &'a dyn RunLoader,
    diagnostics: &'a dyn Diagnostics,
}

impl<'a> BatchProcessor<'a> {
    /// Create a processor
    pub fn new(
        config: BatchConfig,
        loader: &'a dyn RunLoader,
        diagnostics: &'a dyn Diagnostics,
    ) -> Self {
        Self {
            config,
            loader,
            diagnostics,
        }
    }

    /// Process every run in the input directory.
    ///
    /// The output directory is created only once runs have been found.
    pub fn run(&self) -> Result<BatchReport, BatchError> {
        if self.config.top_n == 0 {
            self.diagnostics.error(&BatchError::ZeroTopN.to_string());
            return Err(BatchError::ZeroTopN);
        }

        let runs = discover_runs(&self.config.input_dir, &self.config.extension)
            .map_err(|e| self.fail(e.into()))?;

        let output_dir = &self.config.output_dir;
        fs::create_dir_all(output_dir).map_err(|source| {
            self.fail(BatchError::OutputDir {
                path: output_dir.clone(),
                source,
            })
        })?;
        self.diagnostics
            .info(&format!("Output will be saved to: {}", output_dir.display()));
        self.diagnostics.info(&format!(
            "Found {} .{} files to process",
            runs.len(),
            self.config.extension
        ));

        let writer = ResultWriter::new(output_dir);
        let mut report = BatchReport::new(runs.len());
        for run in &runs {
            report.record(self.process_run(run, &writer));
        }

        self.diagnostics.info(&format!(
            "Processing complete: {} of {} files written, {} skipped, {} rows",
            report.runs_written,
            report.runs_discovered,
            report.runs_skipped(),
            report.rows_written
        ));
        Ok(report)
    }

    /// Load, summarize and write one run
    pub fn process_run(&self, run: &Run, writer: &ResultWriter) -> RunOutcome {
        let name = run.file_name();
        self.diagnostics.info(&format!("Processing: {name}"));

        let start = Instant::now();
        let experiment = match self.loader.load(&run.path) {
            Ok(experiment) => experiment,
            Err(e) => {
                self.diagnostics
                    .error(&format!("Error processing {name}: {e}"));
                return RunOutcome::Skipped(SkipReason::LoadFailed);
            }
        };
        self.diagnostics.info(&format!(
            "Loaded {} spectra in {:.2}s",
            experiment.len(),
            start.elapsed().as_secs_f64()
        ));

        let ms2 = ms2_spectra(&experiment);
        if ms2.is_empty() {
            self.diagnostics
                .warn(&format!("No MS2 spectra found in {name}"));
            return RunOutcome::Skipped(SkipReason::NoMs2);
        }
        self.diagnostics
            .info(&format!("Found {} MS2 spectra", ms2.len()));

        let rows = summarize_spectra(ms2, self.config.top_n, self.diagnostics);
        if rows.is_empty() {
            self.diagnostics
                .warn(&format!("No valid spectra found for {name}"));
            return RunOutcome::Skipped(SkipReason::NoRows);
        }

        match writer.write(&run.sample_name, &rows) {
            Ok(path) => {
                self.diagnostics
                    .info(&format!("Saved detailed results to {}", path.display()));
                RunOutcome::Written {
                    path,
                    rows: rows.len(),
                }
            }
            Err(e) => {
                self.diagnostics
                    .error(&format!("Error processing {name}: {e}"));
                RunOutcome::Skipped(SkipReason::WriteFailed)
            }
        }
    }

    fn fail(&self, error: BatchError) -> BatchError {
        self.diagnostics.error(&error.to_string());
        error
    }
}

/// Output directory used when none is configured
pub fn default_output_dir(input_dir: &Path) -> PathBuf {
    input_dir.join(RESULTS_DIR_NAME)
}

#[cfg(test)]
mod tests {
    use super::*;
    use crate::diagnostics::RecordingDiagnostics;
    use crate::experiment::{Experiment, LoadError, SpectrumBuilder};
    use log::Level;
    use std::collections::HashMap;
    use tempfile::tempdir;

    /// Serves experiments keyed by file stem; unknown stems fail to load
    #[derive(Default)]
    struct FakeLoader {
        runs: HashMap<String, Experiment>,
    }

    impl FakeLoader {
        fn with(mut self, stem: &str, experiment: Experiment) -> Self {
            self.runs.insert(stem.to_string(), experiment);
            self
        }
    }

    impl RunLoader for FakeLoader {
        fn load(&self, path: &Path) -> Result<Experiment, LoadError> {
            let stem = Run::from_path(path).sample_name;
            self.runs
                .get(&stem)
                .cloned()
                .ok_or_else(|| LoadError::Other(format!("cannot parse {stem}")))
        }
    }

    fn good_run() -> Experiment {
        Experiment::new(vec![
            SpectrumBuilder::new("scan=1").ms_level(1).add_peak(100.0, 1.0).build(),
            SpectrumBuilder::new("scan=2")
                .ms_level(2)
                .retention_time(61.5)
                .precursor(445.12, Some(2))
                .peaks(vec![100.0, 200.0, 300.0], vec![5.0, 50.0, 10.0])
                .build(),
        ])
    }

    fn ms1_only_run() -> Experiment {
        Experiment::new(vec![SpectrumBuilder::new("scan=1")
            .ms_level(1)
            .add_peak(100.0, 1.0)
            .build()])
    }

    fn touch(dir: &Path, names: &[&str]) {
        for name in names {
            fs::write(dir.join(name), "").unwrap();
        }
    }

    #[test]
    fn test_config_defaults() {
        let config = BatchConfig::new("/data/run1");
        assert_eq!(config.output_dir, PathBuf::from("/data/run1/Results"));
        assert_eq!(config.output_dir, default_output_dir(Path::new("/data/run1")));
        assert_eq!(config.extension, "mzML");
        assert_eq!(config.top_n, 5);
    }

    #[test]
    fn test_mixed_batch_isolates_failures() {
        let dir = tempdir().unwrap();
        touch(dir.path(), &["a.mzML", "b.mzML", "c.mzML"]);
        let loader = FakeLoader::default()
            .with("a", good_run())
            .with("c", ms1_only_run());
        let diagnostics = RecordingDiagnostics::new();

        let report = BatchProcessor::new(BatchConfig::new(dir.path()), &loader, &diagnostics)
            .run()
            .unwrap();

        assert_eq!(report.runs_discovered, 3);
        assert_eq!(report.runs_written, 1);
        assert_eq!(report.load_failures, 1);
        assert_eq!(report.runs_without_ms2, 1);
        assert_eq!(report.runs_skipped(), 2);
        assert_eq!(report.rows_written, 1);

        let results = dir.path().join("Results");
        assert!(results.join("a_results.csv").exists());
        assert!(!results.join("b_results.csv").exists());
        assert!(!results.join("c_results.csv").exists());

        let errors = diagnostics.messages(Level::Error);
        assert_eq!(errors.len(), 1);
        assert!(errors[0].starts_with("Error processing b.mzML"));
        let warnings = diagnostics.messages(Level::Warn);
        assert_eq!(warnings, vec!["No MS2 spectra found in c.mzML"]);
    }

    #[test]
    fn test_run_without_rows_writes_nothing() {
        let dir = tempdir().unwrap();
        touch(dir.path(), &["x.mzML"]);
        let loader = FakeLoader::default().with(
            "x",
            Experiment::new(vec![SpectrumBuilder::new("scan=4")
                .ms_level(2)
                .add_peak(100.0, 1.0)
                .build()]),
        );
        let diagnostics = RecordingDiagnostics::new();

        let report = BatchProcessor::new(BatchConfig::new(dir.path()), &loader, &diagnostics)
            .run()
            .unwrap();

        assert_eq!(report.runs_without_rows, 1);
        assert!(!dir.path().join("Results/x_results.csv").exists());
        assert_eq!(
            diagnostics.messages(Level::Warn),
            vec!["No valid spectra found for x.mzML"]
        );
    }

    #[test]
    fn test_missing_input_dir_creates_nothing() {
        let dir = tempdir().unwrap();
        let input = dir.path().join("absent");
        let diagnostics = RecordingDiagnostics::new();
        let loader = FakeLoader::default();

        let err = BatchProcessor::new(BatchConfig::new(&input), &loader, &diagnostics)
            .run()
            .unwrap_err();

        assert!(matches!(
            err,
            BatchError::Discovery(DiscoveryError::MissingDirectory(_))
        ));
        assert!(!input.join("Results").exists());
        assert_eq!(diagnostics.count(Level::Error), 1);
    }

    #[test]
    fn test_empty_input_dir_creates_nothing() {
        let dir = tempdir().unwrap();
        let diagnostics = RecordingDiagnostics::new();
        let loader = FakeLoader::default();

        let err = BatchProcessor::new(BatchConfig::new(dir.path()), &loader, &diagnostics)
            .run()
            .unwrap_err();

        assert!(matches!(err, BatchError::Discovery(DiscoveryError::NoRuns { .. })));
        assert!(!dir.path().join("Results").exists());
    }

    #[test]
    fn test_zero_top_n_is_rejected() {
        let dir = tempdir().unwrap();
        touch(dir.path(), &["a.mzML"]);
        let loader = FakeLoader::default().with("a", good_run());
        let diagnostics = RecordingDiagnostics::new();

        let config = BatchConfig::new(dir.path()).with_top_n(0);
        let err = BatchProcessor::new(config, &loader, &diagnostics)
            .run()
            .unwrap_err();

        assert!(matches!(err, BatchError::ZeroTopN));
        assert!(!dir.path().join("Results").exists());
    }

    #[test]
    fn test_custom_output_dir_and_extension() {
        let dir = tempdir().unwrap();
        touch(dir.path(), &["a.xml", "b.mzML"]);
        let out = dir.path().join("nested/out");
        let loader = FakeLoader::default().with("a", good_run()).with("b", good_run());
        let diagnostics = RecordingDiagnostics::new();

        let config = BatchConfig::new(dir.path())
            .with_output_dir(&out)
            .with_extension("xml");
        let report = BatchProcessor::new(config, &loader, &diagnostics)
            .run()
            .unwrap();

        assert_eq!(report.outputs, vec![out.join("a_results.csv")]);
        assert!(diagnostics
            .messages(Level::Info)
            .contains(&"Found 1 .xml files to process".to_string()));
    }

    #[test]
    fn test_progress_messages() {
        let dir = tempdir().unwrap();
        touch(dir.path(), &["a.mzML"]);
        let loader = FakeLoader::default().with("a", good_run());
        let diagnostics = RecordingDiagnostics::new();

        BatchProcessor::new(BatchConfig::new(dir.path()), &loader, &diagnostics)
            .run()
            .unwrap();

        let info = diagnostics.messages(Level::Info);
        assert!(info[0].starts_with("Output will be saved to: "));
        assert_eq!(info[1], "Found 1 .mzML files to process");
        assert_eq!(info[2], "Processing: a.mzML");
        assert!(info[3].starts_with("Loaded 2 spectra in "));
        assert!(info[3].ends_with('s'));
        assert_eq!(info[4], "Found 1 MS2 spectra");
        assert!(info[5].starts_with("Saved detailed results to "));
        assert_eq!(
            info[6],
            "Processing complete: 1 of 1 files written, 0 skipped, 1 rows"
        );
    }
}
