//! `<binaryDataArray>` payloads.
//!
//! A payload is Base64 text, optionally zlib-deflated, holding little-endian
//! IEEE floats of one fixed width. Every array comes back as `f64` regardless
//! of the stored width.

use std::io::Read;

use base64::prelude::*;
use byteorder::{ByteOrder, LittleEndian};
use flate2::read::ZlibDecoder;

use super::cv_params::accession;

/// How a payload is compressed
#[derive(Debug, Clone, Copy, PartialEq, Eq, Default)]
pub enum ArrayCompression {
    /// Stored as-is
    #[default]
    None,
    /// zlib deflate
    Zlib,
    /// One of the MS-Numpress codecs, which are not decoded
    Numpress,
}

impl ArrayCompression {
    /// Compression named by a cvParam, if it names one
    pub fn from_accession(acc: &str) -> Option<Self> {
        match acc {
            accession::NO_COMPRESSION => Some(Self::None),
            accession::ZLIB_COMPRESSION => Some(Self::Zlib),
            accession::NUMPRESS_LINEAR | accession::NUMPRESS_PIC | accession::NUMPRESS_SLOF => {
                Some(Self::Numpress)
            }
            _ => None,
        }
    }
}

/// Width of the stored floats
#[derive(Debug, Clone, Copy, PartialEq, Eq, Default)]
pub enum FloatWidth {
    /// `MS:1000521`
    F32,
    /// `MS:1000523`
    #[default]
    F64,
}

impl FloatWidth {
    /// Width named by a cvParam, if it names one
    pub fn from_accession(acc: &str) -> Option<Self> {
        match acc {
            accession::FLOAT_32_BIT => Some(Self::F32),
            accession::FLOAT_64_BIT => Some(Self::F64),
            _ => None,
        }
    }

    /// Bytes per value
    pub fn bytes(self) -> usize {
        match self {
            Self::F32 => 4,
            Self::F64 => 8,
        }
    }
}

/// Ways a payload can fail to decode
#[derive(Debug, thiserror::Error)]
pub enum BinaryDecodeError {
    /// Not valid Base64
    #[error("invalid Base64: {0}")]
    Base64(#[from] base64::DecodeError),

    /// zlib stream is corrupt
    #[error("zlib inflate failed: {0}")]
    Inflate(#[from] std::io::Error),

    /// Byte count is not a multiple of the float width
    #[error("{len} bytes is not a whole number of {width}-byte floats")]
    TrailingBytes {
        /// Decoded byte count
        len: usize,
        /// Float width in bytes
        width: usize,
    },

    /// Value count differs from the spectrum's `defaultArrayLength`
    #[error("expected {declared} values, decoded {decoded}")]
    LengthMismatch {
        /// Length declared on the spectrum
        declared: usize,
        /// Values actually decoded
        decoded: usize,
    },

    /// MS-Numpress payloads are not supported
    #[error("MS-Numpress compressed arrays are not supported")]
    Numpress,
}

/// Decode the text of a `<binary>` element.
///
/// Whitespace inside the Base64 text is ignored. An empty payload decodes to
/// an empty array without checking `declared_len`.
pub fn decode_array(
    text: &str,
    width: FloatWidth,
    compression: ArrayCompression,
    declared_len: Option<usize>,
) -> Result<Vec<f64>, BinaryDecodeError> {
    let text: String = text.split_ascii_whitespace().collect();
    if text.is_empty() {
        return Ok(Vec::new());
    }

    let raw = BASE64_STANDARD.decode(text)?;
    let bytes = match compression {
        ArrayCompression::None => raw,
        ArrayCompression::Zlib => inflate(&raw)?,
        ArrayCompression::Numpress => return Err(BinaryDecodeError::Numpress),
    };

    let values = read_floats(&bytes, width)?;
    match declared_len {
        Some(declared) if declared != values.len() => Err(BinaryDecodeError::LengthMismatch {
            declared,
            decoded: values.len(),
        }),
        _ => Ok(values),
    }
}

fn inflate(compressed: &[u8]) -> Result<Vec<u8>, std::io::Error> {
    let mut out = Vec::with_capacity(compressed.len() * 4);
    ZlibDecoder::new(compressed).read_to_end(&mut out)?;
    Ok(out)
}

fn read_floats(bytes: &[u8], width: FloatWidth) -> Result<Vec<f64>, BinaryDecodeError> {
    let step = width.bytes();
    if bytes.len() % step != 0 {
        return Err(BinaryDecodeError::TrailingBytes {
            len: bytes.len(),
            width: step,
        });
    }

    let chunks = bytes.chunks_exact(step);
    Ok(match width {
        FloatWidth::F32 => chunks.map(|c| f64::from(LittleEndian::read_f32(c))).collect(),
        FloatWidth::F64 => chunks.map(LittleEndian::read_f64).collect(),
    })
}
