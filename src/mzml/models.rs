//! What the streamer extracts from a `<spectrum>` element.
//!
//! Fields stay optional where the file may omit them; [`crate::experiment`]
//! decides the defaults when converting to pipeline values.

use std::collections::HashMap;

use super::cv_params::CvParam;

/// One `<spectrum>` element
#[derive(Debug, Clone, Default)]
pub struct MzMLSpectrum {
    /// `id` attribute (native ID)
    pub id: String,

    /// `defaultArrayLength` attribute; every decoded array must match it
    pub default_array_length: usize,

    /// `ms level` term, 1 when absent
    pub ms_level: i16,

    /// `scan start time` in seconds
    pub retention_time: Option<f64>,

    /// `<precursor>` elements in document order
    pub precursors: Vec<Precursor>,

    /// Decoded `m/z array`
    pub mz_array: Vec<f64>,

    /// Decoded `intensity array`
    pub intensity_array: Vec<f64>,
}

impl MzMLSpectrum {
    /// Number of decoded m/z values
    pub fn peak_count(&self) -> usize {
        self.mz_array.len()
    }
}

/// One `<precursor>` element
#[derive(Debug, Clone, Default)]
pub struct Precursor {
    /// `isolation window target m/z`
    pub isolation_window_target: Option<f64>,

    /// `selected ion m/z`
    pub selected_ion_mz: Option<f64>,

    /// `charge state` of the selected ion
    pub selected_ion_charge: Option<i16>,
}

impl Precursor {
    /// Best available m/z for this precursor.
    ///
    /// Prefers the selected ion and falls back to the isolation window target.
    pub fn mz(&self) -> Option<f64> {
        self.selected_ion_mz.or(self.isolation_window_target)
    }
}

/// Run-level attributes seen before the spectrum list
#[derive(Debug, Clone, Default)]
pub struct MzMLRunInfo {
    /// `version` attribute of `<mzML>`
    pub version: Option<String>,

    /// `id` attribute of `<run>`
    pub run_id: Option<String>,

    /// Spectrum count declared on `<spectrumList>`
    pub declared_spectrum_count: Option<usize>,

    /// `<referenceableParamGroup>` params by group `id`
    pub param_groups: HashMap<String, Vec<CvParam>>,
}
