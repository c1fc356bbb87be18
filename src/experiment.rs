//! In-memory run data and the loader seam.
//!
//! [`Experiment`], [`Spectrum`] and [`Precursor`] are plain values: they carry
//! exactly what the summarizer needs and nothing of the file format they came
//! from. A [`RunLoader`] turns a file path into an [`Experiment`];
//! [`MzMLLoader`] is the implementation backed by the streaming mzML reader.

use std::path::Path;

use crate::mzml::{MzMLError, MzMLSpectrum, MzMLStreamer};

/// Precursor ion of a fragmentation spectrum
#[derive(Debug, Clone, Copy, PartialEq, Default)]
pub struct Precursor {
    /// Precursor m/z
    pub mz: f64,
    /// Charge state, when the file records one
    pub charge: Option<i16>,
}

/// One scan
#[derive(Debug, Clone, PartialEq, Default)]
pub struct Spectrum {
    /// Native ID from the source file
    pub native_id: String,
    /// MS level (1 for survey scans, 2 for fragmentation scans)
    pub ms_level: u8,
    /// Retention time in seconds
    pub retention_time: f64,
    /// Zero or more precursors; only the first is used downstream
    pub precursors: Vec<Precursor>,
    /// Peak m/z values, parallel to `intensity_array`
    pub mz_array: Vec<f64>,
    /// Peak intensities, parallel to `mz_array`
    pub intensity_array: Vec<f64>,
}

impl Spectrum {
    /// Number of peaks
    pub fn peak_count(&self) -> usize {
        self.mz_array.len()
    }

    /// First precursor, if any
    pub fn first_precursor(&self) -> Option<&Precursor> {
        self.precursors.first()
    }
}

/// Builder for [`Spectrum`] values, used by tests and benchmarks
#[derive(Debug, Clone)]
pub struct SpectrumBuilder {
    spectrum: Spectrum,
}

impl SpectrumBuilder {
    /// Start a spectrum with the given native ID (MS level 1, RT 0)
    pub fn new(native_id: impl Into<String>) -> Self {
        Self {
            spectrum: Spectrum {
                native_id: native_id.into(),
                ms_level: 1,
                ..Default::default()
            },
        }
    }

    /// Set the MS level
    pub fn ms_level(mut self, level: u8) -> Self {
        self.spectrum.ms_level = level;
        self
    }

    /// Set the retention time in seconds
    pub fn retention_time(mut self, rt: f64) -> Self {
        self.spectrum.retention_time = rt;
        self
    }

    /// Append a precursor
    pub fn precursor(mut self, mz: f64, charge: Option<i16>) -> Self {
        self.spectrum.precursors.push(Precursor { mz, charge });
        self
    }

    /// Append a single peak
    pub fn add_peak(mut self, mz: f64, intensity: f64) -> Self {
        self.spectrum.mz_array.push(mz);
        self.spectrum.intensity_array.push(intensity);
        self
    }

    /// Replace the peak arrays
    pub fn peaks(mut self, mz_array: Vec<f64>, intensity_array: Vec<f64>) -> Self {
        self.spectrum.mz_array = mz_array;
        self.spectrum.intensity_array = intensity_array;
        self
    }

    /// Finish building
    pub fn build(self) -> Spectrum {
        self.spectrum
    }
}

/// Ordered spectra loaded from one run
#[derive(Debug, Clone, PartialEq, Default)]
pub struct Experiment {
    /// Spectra in file order
    pub spectra: Vec<Spectrum>,
}

impl Experiment {
    /// Wrap a list of spectra
    pub fn new(spectra: Vec<Spectrum>) -> Self {
        Self { spectra }
    }

    /// Number of spectra
    pub fn len(&self) -> usize {
        self.spectra.len()
    }

    /// Whether the run has no spectra
    pub fn is_empty(&self) -> bool {
        self.spectra.is_empty()
    }
}

/// Errors raised while loading a run
#[derive(Debug, thiserror::Error)]
pub enum LoadError {
    /// The mzML reader rejected the file
    #[error("mzML parsing error: {0}")]
    MzML(#[from] MzMLError),

    /// Loader-specific failure (used by non-mzML loaders)
    #[error("{0}")]
    Other(String),
}

/// Materializes an [`Experiment`] from a file
pub trait RunLoader {
    /// Load every spectrum of the file at `path`
    fn load(&self, path: &Path) -> Result<Experiment, LoadError>;
}

/// [`RunLoader`] for mzML files
#[derive(Debug, Clone, Copy, Default)]
pub struct MzMLLoader;

impl MzMLLoader {
    /// Create a loader
    pub fn new() -> Self {
        Self
    }

    /// Convert a parsed mzML spectrum into a plain [`Spectrum`]
    pub fn convert_spectrum(spectrum: MzMLSpectrum) -> Spectrum {
        let retention_time = spectrum.retention_time.unwrap_or_else(|| {
            log::debug!("Spectrum {} has no scan start time, using 0", spectrum.id);
            0.0
        });

        let precursors = spectrum
            .precursors
            .iter()
            .map(|p| Precursor {
                mz: p.mz().unwrap_or(0.0),
                charge: p.selected_ion_charge,
            })
            .collect();

        Spectrum {
            native_id: spectrum.id,
            ms_level: u8::try_from(spectrum.ms_level).unwrap_or(0),
            retention_time,
            precursors,
            mz_array: spectrum.mz_array,
            intensity_array: spectrum.intensity_array,
        }
    }
}

impl RunLoader for MzMLLoader {
    fn load(&self, path: &Path) -> Result<Experiment, LoadError> {
        let mut streamer = MzMLStreamer::open(path)?;
        let run_info = streamer.read_run_info()?;
        log::debug!(
            "Reading run '{}' (mzML {}) from {}",
            run_info.run_id.as_deref().unwrap_or("unnamed"),
            run_info.version.as_deref().unwrap_or("unknown"),
            path.display()
        );
        let declared = run_info.declared_spectrum_count;

        let spectra = streamer
            .spectra()
            .map(|s| s.map(Self::convert_spectrum))
            .collect::<Result<Vec<_>, _>>()?;

        if let Some(declared) = declared.filter(|&n| n != spectra.len()) {
            log::warn!(
                "{} declares {} spectra but {} were read",
                path.display(),
                declared,
                spectra.len()
            );
        }

        Ok(Experiment::new(spectra))
    }
}

#[cfg(test)]
mod tests {
    use super::*;
    use crate::mzml::Precursor as MzMLPrecursor;

    #[test]
    fn test_convert_ms2_spectrum() {
        let mzml_spectrum = MzMLSpectrum {
            id: "scan=2".to_string(),
            default_array_length: 3,
            ms_level: 2,
            retention_time: Some(61.0),
            precursors: vec![MzMLPrecursor {
                selected_ion_mz: Some(500.25),
                selected_ion_charge: Some(2),
                isolation_window_target: Some(500.0),
            }],
            mz_array: vec![100.0, 200.0, 300.0],
            intensity_array: vec![5.0, 50.0, 10.0],
        };

        let spectrum = MzMLLoader::convert_spectrum(mzml_spectrum);

        assert_eq!(spectrum.native_id, "scan=2");
        assert_eq!(spectrum.ms_level, 2);
        assert_eq!(spectrum.retention_time, 61.0);
        assert_eq!(
            spectrum.precursors,
            vec![Precursor {
                mz: 500.25,
                charge: Some(2)
            }]
        );
        assert_eq!(spectrum.peak_count(), 3);
    }

    #[test]
    fn test_convert_fills_missing_values() {
        let mzml_spectrum = MzMLSpectrum {
            id: "scan=9".to_string(),
            ms_level: 2,
            precursors: vec![MzMLPrecursor::default()],
            ..Default::default()
        };

        let spectrum = MzMLLoader::convert_spectrum(mzml_spectrum);

        assert_eq!(spectrum.retention_time, 0.0);
        assert_eq!(spectrum.first_precursor().map(|p| p.mz), Some(0.0));
        assert_eq!(spectrum.peak_count(), 0);
    }

    #[test]
    fn test_load_missing_file() {
        let err = MzMLLoader::new()
            .load(Path::new("/definitely/not/here.mzML"))
            .unwrap_err();
        assert!(matches!(err, LoadError::MzML(MzMLError::IoError(_))));
    }

    #[test]
    fn test_builder() {
        let spectrum = SpectrumBuilder::new("scan=5")
            .ms_level(2)
            .retention_time(12.5)
            .precursor(421.7, None)
            .add_peak(100.0, 5.0)
            .add_peak(200.0, 50.0)
            .build();

        assert_eq!(spectrum.ms_level, 2);
        assert_eq!(spectrum.peak_count(), 2);
        assert_eq!(spectrum.intensity_array, vec![5.0, 50.0]);
        assert_eq!(spectrum.first_precursor().unwrap().mz, 421.7);
    }
}
