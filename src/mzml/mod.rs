//! # mzML Reader Module
//!
//! Streaming parsing of mzML files, the XML-based community standard for mass
//! spectrometry data defined by HUPO-PSI.
//!
//! Only the parts of the document needed to summarize fragmentation spectra
//! are interpreted: MS level, scan start time, precursor ions and the m/z and
//! intensity binary arrays. Everything else is skipped while streaming.
//!
//! ## mzML Structure
//!
//! ```text
//! indexedmzML (optional wrapper)
//! └── mzML
//!     ├── cvList, fileDescription, softwareList, ...   (skipped)
//!     └── run
//!         └── spectrumList
//!             └── spectrum* (many)
//!                 ├── cvParam*            (ms level)
//!                 ├── scanList            (scan start time)
//!                 ├── precursorList       (MS2+ only)
//!                 └── binaryDataArrayList
//!                     └── binaryDataArray*
//!                         ├── cvParam*    (encoding, compression, array type)
//!                         └── binary      (base64 data)
//! ```

mod binary;
mod cv_params;
mod models;
mod streamer;

pub use binary::{decode_array, ArrayCompression, BinaryDecodeError, FloatWidth};
pub use cv_params::{accession, rt_in_seconds, CvParam};
pub use models::{MzMLRunInfo, MzMLSpectrum, Precursor};
pub use streamer::{MzMLError, MzMLStreamer, SpectrumIterator, DEFAULT_INPUT_BUFFER_SIZE};
