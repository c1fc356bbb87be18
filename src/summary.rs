//! MS2 filtering and per-spectrum peak summaries.

use std::fmt;

use serde::{Serialize, Serializer};

use crate::diagnostics::Diagnostics;
use crate::experiment::{Experiment, Spectrum};

/// MS level of fragmentation spectra
pub const MS2_LEVEL: u8 = 2;

/// Number of peaks reported per spectrum unless configured otherwise
pub const DEFAULT_TOP_N: usize = 5;

/// One (m/z, intensity) pair
#[derive(Debug, Clone, Copy, PartialEq)]
pub struct PeakPair {
    /// Peak m/z
    pub mz: f64,
    /// Peak intensity
    pub intensity: f64,
}

impl fmt::Display for PeakPair {
    fn fmt(&self, f: &mut fmt::Formatter<'_>) -> fmt::Result {
        write!(f, "{:.4}:{:.1}", self.mz, self.intensity)
    }
}

/// Summary row for one fragmentation spectrum.
///
/// Serializes to the CSV column layout
/// `precursor_mz,rt,num_peaks,base_peak_mz,base_peak_intensity,top_peaks`.
#[derive(Debug, Clone, PartialEq, Serialize)]
pub struct PeakSummary {
    /// m/z of the first precursor
    #[serde(serialize_with = "mz_4dp")]
    pub precursor_mz: f64,

    /// Retention time in seconds
    #[serde(rename = "rt", serialize_with = "mz_4dp")]
    pub retention_time: f64,

    /// Peak count before truncation
    #[serde(rename = "num_peaks")]
    pub peak_count: usize,

    /// m/z of the most intense peak
    #[serde(serialize_with = "mz_4dp")]
    pub base_peak_mz: f64,

    /// Intensity of the most intense peak
    #[serde(serialize_with = "intensity_1dp")]
    pub base_peak_intensity: f64,

    /// Most intense peaks, highest first
    #[serde(serialize_with = "joined_peaks")]
    pub top_peaks: Vec<PeakPair>,
}

impl PeakSummary {
    /// `top_peaks` rendered as `mz:intensity` pairs joined by `;`
    pub fn top_peaks_string(&self) -> String {
        join_peaks(&self.top_peaks)
    }
}

fn join_peaks(peaks: &[PeakPair]) -> String {
    peaks
        .iter()
        .map(ToString::to_string)
        .collect::<Vec<_>>()
        .join(";")
}

fn mz_4dp<S: Serializer>(value: &f64, serializer: S) -> Result<S::Ok, S::Error> {
    serializer.serialize_str(&format!("{value:.4}"))
}

fn intensity_1dp<S: Serializer>(value: &f64, serializer: S) -> Result<S::Ok, S::Error> {
    serializer.serialize_str(&format!("{value:.1}"))
}

fn joined_peaks<S: Serializer>(peaks: &[PeakPair], serializer: S) -> Result<S::Ok, S::Error> {
    serializer.serialize_str(&join_peaks(peaks))
}

/// A spectrum whose data cannot be summarized
#[derive(Debug, Clone, PartialEq, thiserror::Error)]
pub enum SummaryError {
    /// m/z and intensity arrays disagree in length
    #[error("spectrum {id} has {mz} m/z values but {intensity} intensities")]
    ArrayLengthMismatch {
        /// Native ID of the spectrum
        id: String,
        /// m/z array length
        mz: usize,
        /// Intensity array length
        intensity: usize,
    },

    /// Requested zero peaks per spectrum
    #[error("top peak count must be at least 1")]
    ZeroTopN,
}

/// Fragmentation spectra of an experiment, in file order
pub fn ms2_spectra(experiment: &Experiment) -> Vec<&Spectrum> {
    experiment
        .spectra
        .iter()
        .filter(|s| s.ms_level == MS2_LEVEL)
        .collect()
}

/// Summarize one spectrum.
///
/// Returns `Ok(None)` for spectra without a precursor or without peaks.
pub fn summarize_spectrum(
    spectrum: &Spectrum,
    top_n: usize,
) -> Result<Option<PeakSummary>, SummaryError> {
    if top_n == 0 {
        return Err(SummaryError::ZeroTopN);
    }

    let Some(precursor) = spectrum.first_precursor() else {
        return Ok(None);
    };

    if spectrum.mz_array.len() != spectrum.intensity_array.len() {
        return Err(SummaryError::ArrayLengthMismatch {
            id: spectrum.native_id.clone(),
            mz: spectrum.mz_array.len(),
            intensity: spectrum.intensity_array.len(),
        });
    }

    if spectrum.mz_array.is_empty() {
        return Ok(None);
    }

    let mut pairs: Vec<PeakPair> = spectrum
        .mz_array
        .iter()
        .zip(&spectrum.intensity_array)
        .map(|(&mz, &intensity)| PeakPair { mz, intensity })
        .collect();

    // Stable: equal intensities keep file order
    pairs.sort_by(|a, b| b.intensity.total_cmp(&a.intensity));
    pairs.truncate(top_n);

    let base = pairs[0];
    Ok(Some(PeakSummary {
        precursor_mz: precursor.mz,
        retention_time: spectrum.retention_time,
        peak_count: spectrum.peak_count(),
        base_peak_mz: base.mz,
        base_peak_intensity: base.intensity,
        top_peaks: pairs,
    }))
}

/// Summarize a sequence of spectra, skipping the ones that yield no row.
///
/// Spectra that fail to summarize are reported as warnings and left out.
/// A `top_n` of zero is reported once and yields no rows.
pub fn summarize_spectra<'a, I>(
    spectra: I,
    top_n: usize,
    diagnostics: &dyn Diagnostics,
) -> Vec<PeakSummary>
where
    I: IntoIterator<Item = &'a Spectrum>,
{
    if top_n == 0 {
        diagnostics.warn(&SummaryError::ZeroTopN.to_string());
        return Vec::new();
    }

    let mut rows = Vec::new();
    for spectrum in spectra {
        match summarize_spectrum(spectrum, top_n) {
            Ok(Some(row)) => rows.push(row),
            Ok(None) => {}
            Err(e) => {
                diagnostics.warn(&format!(
                    "Skipping spectrum {} due to error: {}",
                    spectrum.native_id, e
                ));
            }
        }
    }
    rows
}
