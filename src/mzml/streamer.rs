//! Streaming mzML parser using quick-xml
//!
//! A pull-based reader that walks the document once, skipping everything
//! before `<spectrumList>` and then yielding one decoded spectrum at a time.
//! Works for plain and `indexedmzML`-wrapped files alike; the trailing index
//! is never consulted.

use std::fs::File;
use std::io::{BufRead, BufReader};
use std::path::Path;

use quick_xml::events::{BytesStart, Event};
use quick_xml::Reader;

use super::binary::{decode_array, ArrayCompression, BinaryDecodeError, FloatWidth};
use super::cv_params::{accession, rt_in_seconds, CvParam};
use super::models::{MzMLRunInfo, MzMLSpectrum, Precursor};

type ParamGroups = std::collections::HashMap<String, Vec<CvParam>>;

/// Input buffer size used by [`MzMLStreamer::open`]
pub const DEFAULT_INPUT_BUFFER_SIZE: usize = 64 * 1024;

/// Errors that can occur during mzML parsing
#[derive(Debug, thiserror::Error)]
pub enum MzMLError {
    /// Malformed XML
    #[error("XML parsing error: {0}")]
    XmlError(#[from] quick_xml::Error),

    /// I/O error opening or reading the file
    #[error("I/O error: {0}")]
    IoError(#[from] std::io::Error),

    /// A binary array of a spectrum could not be decoded
    #[error("Binary decode error in spectrum {id}: {source}")]
    BinaryError {
        /// Native ID of the spectrum
        id: String,
        /// Underlying decode error
        #[source]
        source: BinaryDecodeError,
    },

    /// Well-formed XML that is not a complete mzML document
    #[error("Invalid mzML structure: {0}")]
    InvalidStructure(String),

    /// Attribute value is not UTF-8
    #[error("UTF-8 encoding error: {0}")]
    Utf8Error(#[from] std::str::Utf8Error),
}

/// Where the streamer is in the document
#[derive(Debug, Clone, Copy, PartialEq, Eq)]
enum Position {
    /// Before `<spectrumList>`
    Preamble,
    /// Between spectra
    SpectrumList,
    /// Past the spectrum list, or the run has none
    Done,
}

/// Streaming parser for mzML files
pub struct MzMLStreamer<R: BufRead> {
    reader: Reader<R>,
    run_info: MzMLRunInfo,
    position: Position,
}

impl MzMLStreamer<BufReader<File>> {
    /// Open an mzML file for streaming
    pub fn open<P: AsRef<Path>>(path: P) -> Result<Self, MzMLError> {
        let file = File::open(path.as_ref())?;
        Self::new(BufReader::with_capacity(DEFAULT_INPUT_BUFFER_SIZE, file))
    }
}

impl<R: BufRead> MzMLStreamer<R> {
    /// Create a new streamer from a BufRead source
    pub fn new(reader: R) -> Result<Self, MzMLError> {
        let mut reader = Reader::from_reader(reader);
        reader.config_mut().trim_text(true);

        Ok(Self {
            reader,
            run_info: MzMLRunInfo::default(),
            position: Position::Preamble,
        })
    }

    /// Advance to `<spectrumList>`, collecting run-level attributes and
    /// referenceable param groups on the way
    pub fn read_run_info(&mut self) -> Result<&MzMLRunInfo, MzMLError> {
        let mut buf = Vec::new();
        let mut group: Option<String> = None;
        while self.position == Position::Preamble {
            match self.reader.read_event_into(&mut buf)? {
                Event::Start(e) | Event::Empty(e) if e.name().as_ref() == b"cvParam" => {
                    if let Some(id) = group.as_ref() {
                        let cv = parse_cv_param(&e)?;
                        if let Some(params) = self.run_info.param_groups.get_mut(id) {
                            params.push(cv);
                        }
                    }
                }
                Event::Start(e) => match e.name().as_ref() {
                    b"mzML" => self.run_info.version = get_attribute(&e, "version")?,
                    b"run" => self.run_info.run_id = get_attribute(&e, "id")?,
                    b"referenceableParamGroup" => {
                        let id = get_attribute(&e, "id")?.unwrap_or_default();
                        self.run_info.param_groups.insert(id.clone(), Vec::new());
                        group = Some(id);
                    }
                    b"spectrumList" => {
                        self.run_info.declared_spectrum_count =
                            get_attribute(&e, "count")?.and_then(|s| s.parse().ok());
                        self.position = Position::SpectrumList;
                    }
                    _ => {}
                },
                Event::End(e) if e.name().as_ref() == b"referenceableParamGroup" => group = None,
                // A run without spectra has nothing more to offer
                Event::End(e) if e.name().as_ref() == b"run" => self.position = Position::Done,
                Event::Eof => self.position = Position::Done,
                _ => {}
            }
            buf.clear();
        }
        Ok(&self.run_info)
    }

    /// Run-level attributes read so far
    pub fn run_info(&self) -> &MzMLRunInfo {
        &self.run_info
    }

    /// Read the next spectrum, or `None` once the spectrum list is closed
    pub fn next_spectrum(&mut self) -> Result<Option<MzMLSpectrum>, MzMLError> {
        if self.position == Position::Preamble {
            self.read_run_info()?;
        }

        let mut buf = Vec::new();
        while self.position == Position::SpectrumList {
            match self.reader.read_event_into(&mut buf)? {
                Event::Start(e) if e.name().as_ref() == b"spectrum" => {
                    let parser = SpectrumParser::new(&e)?;
                    return self.read_spectrum_body(parser).map(Some);
                }
                Event::End(e) if e.name().as_ref() == b"spectrumList" => {
                    self.position = Position::Done;
                }
                Event::Eof => {
                    return Err(MzMLError::InvalidStructure(
                        "Unexpected EOF in spectrumList".to_string(),
                    ));
                }
                _ => {}
            }
            buf.clear();
        }
        Ok(None)
    }

    /// Iterate over all spectra
    pub fn spectra(self) -> SpectrumIterator<R> {
        SpectrumIterator { streamer: self }
    }

    /// Feed events to `parser` until the matching `</spectrum>`
    fn read_spectrum_body(&mut self, mut parser: SpectrumParser) -> Result<MzMLSpectrum, MzMLError> {
        let mut buf = Vec::new();
        let mut depth = 1usize;
        loop {
            match self.reader.read_event_into(&mut buf)? {
                Event::Start(e) => {
                    depth += 1;
                    parser.open(&e, &self.run_info.param_groups)?;
                }
                Event::Empty(e) => parser.empty(&e, &self.run_info.param_groups)?,
                Event::Text(t) => parser.text(&t.unescape()?),
                Event::End(e) => {
                    depth -= 1;
                    if depth == 0 {
                        return Ok(parser.finish());
                    }
                    parser.close(e.name().as_ref())?;
                }
                Event::Eof => {
                    return Err(MzMLError::InvalidStructure(format!(
                        "Unexpected EOF in spectrum {}",
                        parser.spectrum.id
                    )));
                }
                _ => {}
            }
            buf.clear();
        }
    }
}

/// Which child list of `<spectrum>` is open
#[derive(Debug, Clone, Copy, PartialEq, Eq)]
enum Section {
    Spectrum,
    ScanList,
    PrecursorList,
    BinaryDataArrayList,
}

#[derive(Debug, Clone, Copy, PartialEq, Eq)]
enum ArrayKind {
    Mz,
    Intensity,
}

/// A `<binaryDataArray>` whose closing tag has not been seen yet
#[derive(Debug, Default)]
struct PendingArray {
    kind: Option<ArrayKind>,
    width: FloatWidth,
    compression: ArrayCompression,
    text: String,
}

impl PendingArray {
    fn describe(&mut self, cv: &CvParam) {
        if let Some(width) = FloatWidth::from_accession(&cv.accession) {
            self.width = width;
        } else if let Some(compression) = ArrayCompression::from_accession(&cv.accession) {
            self.compression = compression;
        } else if cv.is(accession::MZ_ARRAY) {
            self.kind = Some(ArrayKind::Mz);
        } else if cv.is(accession::INTENSITY_ARRAY) {
            self.kind = Some(ArrayKind::Intensity);
        }
    }
}

/// Accumulates one `<spectrum>` element from its child events
struct SpectrumParser {
    spectrum: MzMLSpectrum,
    section: Section,
    precursor: Option<Precursor>,
    array: Option<PendingArray>,
}

impl SpectrumParser {
    fn new(start: &BytesStart) -> Result<Self, MzMLError> {
        let parsed = |name: &str| get_attribute(start, name);
        let spectrum = MzMLSpectrum {
            id: parsed("id")?.unwrap_or_default(),
            default_array_length: parsed("defaultArrayLength")?
                .and_then(|s| s.parse().ok())
                .unwrap_or(0),
            ms_level: 1,
            ..Default::default()
        };

        Ok(Self {
            spectrum,
            section: Section::Spectrum,
            precursor: None,
            array: None,
        })
    }

    fn open(&mut self, e: &BytesStart, groups: &ParamGroups) -> Result<(), MzMLError> {
        match e.name().as_ref() {
            b"cvParam" => self.cv_param(&parse_cv_param(e)?),
            b"referenceableParamGroupRef" => self.group_ref(e, groups)?,
            b"scanList" => self.section = Section::ScanList,
            b"precursorList" => self.section = Section::PrecursorList,
            b"precursor" => self.precursor = Some(Precursor::default()),
            b"binaryDataArrayList" => self.section = Section::BinaryDataArrayList,
            b"binaryDataArray" => self.array = Some(PendingArray::default()),
            _ => {}
        }
        Ok(())
    }

    fn empty(&mut self, e: &BytesStart, groups: &ParamGroups) -> Result<(), MzMLError> {
        match e.name().as_ref() {
            b"cvParam" => self.cv_param(&parse_cv_param(e)?),
            b"referenceableParamGroupRef" => self.group_ref(e, groups)?,
            _ => {}
        }
        Ok(())
    }

    /// Apply a referenced param group as if its params were written inline
    fn group_ref(&mut self, e: &BytesStart, groups: &ParamGroups) -> Result<(), MzMLError> {
        let id = get_attribute(e, "ref")?.unwrap_or_default();
        let params = groups.get(&id).ok_or_else(|| {
            MzMLError::InvalidStructure(format!(
                "Spectrum {} references undeclared param group '{}'",
                self.spectrum.id, id
            ))
        })?;
        for cv in params {
            self.cv_param(cv);
        }
        Ok(())
    }

    fn text(&mut self, text: &str) {
        if let Some(array) = self.array.as_mut() {
            array.text.push_str(text);
        }
    }

    fn close(&mut self, name: &[u8]) -> Result<(), MzMLError> {
        match name {
            b"scanList" | b"precursorList" | b"binaryDataArrayList" => {
                self.section = Section::Spectrum;
            }
            b"precursor" => {
                if let Some(precursor) = self.precursor.take() {
                    self.spectrum.precursors.push(precursor);
                }
            }
            b"binaryDataArray" => {
                if let Some(array) = self.array.take() {
                    self.decode(array)?;
                }
            }
            _ => {}
        }
        Ok(())
    }

    fn cv_param(&mut self, cv: &CvParam) {
        match self.section {
            Section::BinaryDataArrayList => {
                if let Some(array) = self.array.as_mut() {
                    array.describe(cv);
                }
            }
            Section::PrecursorList => {
                if let Some(precursor) = self.precursor.as_mut() {
                    match cv.accession.as_str() {
                        accession::SELECTED_ION_MZ => precursor.selected_ion_mz = cv.value_as_f64(),
                        accession::MZ if precursor.selected_ion_mz.is_none() => {
                            precursor.selected_ion_mz = cv.value_as_f64();
                        }
                        accession::ISOLATION_WINDOW_TARGET_MZ => {
                            precursor.isolation_window_target = cv.value_as_f64();
                        }
                        accession::CHARGE_STATE => {
                            precursor.selected_ion_charge =
                                cv.value_as_i64().and_then(|v| i16::try_from(v).ok());
                        }
                        _ => {}
                    }
                }
            }
            Section::ScanList if cv.is(accession::SCAN_START_TIME) => {
                if let Some(value) = cv.value_as_f64() {
                    self.spectrum.retention_time =
                        Some(rt_in_seconds(value, cv.unit_accession.as_deref()));
                }
            }
            Section::ScanList | Section::Spectrum => {
                if cv.is(accession::MS_LEVEL) {
                    self.spectrum.ms_level = cv
                        .value_as_i64()
                        .and_then(|v| i16::try_from(v).ok())
                        .unwrap_or(1);
                }
            }
        }
    }

    /// Decode a finished array; arrays other than m/z and intensity are dropped
    fn decode(&mut self, array: PendingArray) -> Result<(), MzMLError> {
        let Some(kind) = array.kind else {
            return Ok(());
        };

        let values = decode_array(
            &array.text,
            array.width,
            array.compression,
            Some(self.spectrum.default_array_length),
        )
        .map_err(|source| MzMLError::BinaryError {
            id: self.spectrum.id.clone(),
            source,
        })?;

        match kind {
            ArrayKind::Mz => self.spectrum.mz_array = values,
            ArrayKind::Intensity => self.spectrum.intensity_array = values,
        }
        Ok(())
    }

    fn finish(self) -> MzMLSpectrum {
        let spectrum = self.spectrum;
        if spectrum.mz_array.len() != spectrum.intensity_array.len() {
            log::debug!(
                "Spectrum {} has {} m/z values but {} intensities",
                spectrum.id,
                spectrum.peak_count(),
                spectrum.intensity_array.len()
            );
        }
        spectrum
    }
}

/// Iterator over spectra in an mzML file
pub struct SpectrumIterator<R: BufRead> {
    streamer: MzMLStreamer<R>,
}

impl<R: BufRead> Iterator for SpectrumIterator<R> {
    type Item = Result<MzMLSpectrum, MzMLError>;

    fn next(&mut self) -> Option<Self::Item> {
        self.streamer.next_spectrum().transpose()
    }
}

/// Value of attribute `name`, if present
fn get_attribute(e: &BytesStart, name: &str) -> Result<Option<String>, MzMLError> {
    for attr in e.attributes() {
        let attr = attr.map_err(quick_xml::Error::from)?;
        if attr.key.as_ref() == name.as_bytes() {
            return Ok(Some(std::str::from_utf8(&attr.value)?.to_string()));
        }
    }
    Ok(None)
}

fn parse_cv_param(e: &BytesStart) -> Result<CvParam, MzMLError> {
    Ok(CvParam {
        accession: get_attribute(e, "accession")?.unwrap_or_default(),
        value: get_attribute(e, "value")?,
        unit_accession: get_attribute(e, "unitAccession")?,
    })
}
