//! Logging context passed through the pipeline.
//!
//! Pipeline components report progress and skip conditions through a
//! [`Diagnostics`] handle instead of calling the global logger, so the
//! messages a component emits can be observed in isolation.
//! [`LogDiagnostics`] forwards to the `log` facade; [`RecordingDiagnostics`]
//! keeps messages in memory.

use std::cell::RefCell;

use log::Level;

/// Sink for human-readable pipeline diagnostics
pub trait Diagnostics {
    /// Progress information
    fn info(&self, message: &str);

    /// A spectrum or run was skipped
    fn warn(&self, message: &str);

    /// A run failed or the batch could not start
    fn error(&self, message: &str);
}

/// Forwards diagnostics to the `log` crate under a fixed target
#[derive(Debug, Clone, Copy)]
pub struct LogDiagnostics {
    target: &'static str,
}

impl LogDiagnostics {
    /// Diagnostics logged under `target`
    pub fn new(target: &'static str) -> Self {
        Self { target }
    }
}

impl Default for LogDiagnostics {
    fn default() -> Self {
        Self::new(env!("CARGO_CRATE_NAME"))
    }
}

impl Diagnostics for LogDiagnostics {
    fn info(&self, message: &str) {
        log::info!(target: self.target, "{message}");
    }

    fn warn(&self, message: &str) {
        log::warn!(target: self.target, "{message}");
    }

    fn error(&self, message: &str) {
        log::error!(target: self.target, "{message}");
    }
}

/// Keeps every message in memory, in emission order
#[derive(Debug, Default)]
pub struct RecordingDiagnostics {
    entries: RefCell<Vec<(Level, String)>>,
}

impl RecordingDiagnostics {
    /// Create an empty recorder
    pub fn new() -> Self {
        Self::default()
    }

    /// All recorded messages with their level
    pub fn entries(&self) -> Vec<(Level, String)> {
        self.entries.borrow().clone()
    }

    /// Messages recorded at exactly `level`
    pub fn messages(&self, level: Level) -> Vec<String> {
        self.entries
            .borrow()
            .iter()
            .filter(|(l, _)| *l == level)
            .map(|(_, m)| m.clone())
            .collect()
    }

    /// Number of messages recorded at exactly `level`
    pub fn count(&self, level: Level) -> usize {
        self.entries.borrow().iter().filter(|(l, _)| *l == level).count()
    }

    fn record(&self, level: Level, message: &str) {
        self.entries.borrow_mut().push((level, message.to_string()));
    }
}

impl Diagnostics for RecordingDiagnostics {
    fn info(&self, message: &str) {
        self.record(Level::Info, message);
    }

    fn warn(&self, message: &str) {
        self.record(Level::Warn, message);
    }

    fn error(&self, message: &str) {
        self.record(Level::Error, message);
    }
}
