//! `<cvParam>` elements and the PSI-MS terms the reader understands.
//!
//! mzML annotates every element with ontology terms. Only the accessions
//! needed to recover MS level, retention time, precursor m/z and the peak
//! arrays are named here; anything else is ignored while streaming.

/// One `<cvParam>` element
#[derive(Debug, Clone, Default, PartialEq)]
pub struct CvParam {
    /// Term accession such as `MS:1000511`
    pub accession: String,
    /// `value` attribute, absent for flag terms
    pub value: Option<String>,
    /// `unitAccession` attribute
    pub unit_accession: Option<String>,
}

impl CvParam {
    /// Numeric value, if present and parseable
    pub fn value_as_f64(&self) -> Option<f64> {
        self.value.as_deref()?.trim().parse().ok()
    }

    /// Integer value, if present and parseable
    pub fn value_as_i64(&self) -> Option<i64> {
        self.value.as_deref()?.trim().parse().ok()
    }

    /// Whether this param is the term `acc`
    pub fn is(&self, acc: &str) -> bool {
        self.accession == acc
    }
}

/// Accessions of the PSI-MS and unit ontology terms consumed by the reader
pub mod accession {
    /// `ms level`
    pub const MS_LEVEL: &str = "MS:1000511";
    /// `scan start time`
    pub const SCAN_START_TIME: &str = "MS:1000016";

    /// `selected ion m/z`
    pub const SELECTED_ION_MZ: &str = "MS:1000744";
    /// `m/z`, used for the selected ion by mzML 1.0 writers
    pub const MZ: &str = "MS:1000040";
    /// `charge state`
    pub const CHARGE_STATE: &str = "MS:1000041";
    /// `isolation window target m/z`
    pub const ISOLATION_WINDOW_TARGET_MZ: &str = "MS:1000827";

    /// `32-bit float`
    pub const FLOAT_32_BIT: &str = "MS:1000521";
    /// `64-bit float`
    pub const FLOAT_64_BIT: &str = "MS:1000523";
    /// `zlib compression`
    pub const ZLIB_COMPRESSION: &str = "MS:1000574";
    /// `no compression`
    pub const NO_COMPRESSION: &str = "MS:1000576";
    /// `MS-Numpress linear prediction compression`
    pub const NUMPRESS_LINEAR: &str = "MS:1002312";
    /// `MS-Numpress positive integer compression`
    pub const NUMPRESS_PIC: &str = "MS:1002313";
    /// `MS-Numpress short logged float compression`
    pub const NUMPRESS_SLOF: &str = "MS:1002314";

    /// `m/z array`
    pub const MZ_ARRAY: &str = "MS:1000514";
    /// `intensity array`
    pub const INTENSITY_ARRAY: &str = "MS:1000515";

    /// `second` (UO)
    pub const UNIT_SECOND: &str = "UO:0000010";
    /// `minute` (UO)
    pub const UNIT_MINUTE: &str = "UO:0000031";
    /// `millisecond` (UO)
    pub const UNIT_MILLISECOND: &str = "UO:0000028";
}

/// Scan start time in seconds.
///
/// Minutes and milliseconds are converted; any other unit, or none, is taken
/// to be seconds already.
pub fn rt_in_seconds(value: f64, unit_accession: Option<&str>) -> f64 {
    match unit_accession {
        Some(accession::UNIT_MINUTE) => value * 60.0,
        Some(accession::UNIT_MILLISECOND) => value / 1000.0,
        _ => value,
    }
}
