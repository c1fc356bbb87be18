//! Synthetic mzML documents for integration tests.

#![allow(dead_code)]

use base64::Engine;
use flate2::write::ZlibEncoder;
use flate2::Compression;
use std::io::Write;
use std::path::{Path, PathBuf};

/// One spectrum of a synthetic run
#[derive(Debug, Clone)]
pub struct TestSpectrum {
    pub ms_level: u8,
    pub rt_seconds: f64,
    pub precursor_mz: Option<f64>,
    pub mz: Vec<f64>,
    pub intensity: Vec<f32>,
}

impl TestSpectrum {
    pub fn ms1(rt_seconds: f64) -> Self {
        Self {
            ms_level: 1,
            rt_seconds,
            precursor_mz: None,
            mz: vec![150.0, 250.0],
            intensity: vec![1000.0, 2000.0],
        }
    }

    pub fn ms2(rt_seconds: f64, precursor_mz: f64, mz: Vec<f64>, intensity: Vec<f32>) -> Self {
        Self {
            ms_level: 2,
            rt_seconds,
            precursor_mz: Some(precursor_mz),
            mz,
            intensity,
        }
    }
}

fn encode_f64(values: &[f64], zlib: bool) -> String {
    let bytes: Vec<u8> = values.iter().flat_map(|v| v.to_le_bytes()).collect();
    encode_bytes(bytes, zlib)
}

fn encode_f32(values: &[f32], zlib: bool) -> String {
    let bytes: Vec<u8> = values.iter().flat_map(|v| v.to_le_bytes()).collect();
    encode_bytes(bytes, zlib)
}

fn encode_bytes(bytes: Vec<u8>, zlib: bool) -> String {
    let bytes = if zlib {
        let mut encoder = ZlibEncoder::new(Vec::new(), Compression::default());
        encoder.write_all(&bytes).unwrap();
        encoder.finish().unwrap()
    } else {
        bytes
    };
    base64::engine::general_purpose::STANDARD.encode(bytes)
}

/// Render an indexedmzML document; `zlib` compresses both arrays
pub fn mzml_document(spectra: &[TestSpectrum], zlib: bool) -> String {
    let compression = if zlib {
        r#"<cvParam cvRef="MS" accession="MS:1000574" name="zlib compression"/>"#
    } else {
        r#"<cvParam cvRef="MS" accession="MS:1000576" name="no compression"/>"#
    };

    let mut doc = format!(
        r#"<?xml version="1.0" encoding="UTF-8"?>
<indexedmzML xmlns="http://psi.hupo.org/ms/mzml">
<mzML xmlns="http://psi.hupo.org/ms/mzml" version="1.1.0">
  <run id="test_run">
    <spectrumList count="{}">"#,
        spectra.len()
    );

    for (i, s) in spectra.iter().enumerate() {
        let precursor = s
            .precursor_mz
            .map(|mz| {
                format!(
                    r#"
        <precursorList count="1">
          <precursor>
            <selectedIonList count="1">
              <selectedIon>
                <cvParam cvRef="MS" accession="MS:1000744" name="selected ion m/z" value="{mz}"/>
              </selectedIon>
            </selectedIonList>
          </precursor>
        </precursorList>"#
                )
            })
            .unwrap_or_default();

        doc.push_str(&format!(
            r#"
      <spectrum index="{i}" id="scan={scan}" defaultArrayLength="{len}">
        <cvParam cvRef="MS" accession="MS:1000511" name="ms level" value="{level}"/>
        <scanList count="1">
          <scan>
            <cvParam cvRef="MS" accession="MS:1000016" name="scan start time" value="{rt}" unitCvRef="UO" unitAccession="UO:0000010" unitName="second"/>
          </scan>
        </scanList>{precursor}
        <binaryDataArrayList count="2">
          <binaryDataArray>
            <cvParam cvRef="MS" accession="MS:1000523" name="64-bit float"/>
            {compression}
            <cvParam cvRef="MS" accession="MS:1000514" name="m/z array"/>
            <binary>{mz}</binary>
          </binaryDataArray>
          <binaryDataArray>
            <cvParam cvRef="MS" accession="MS:1000521" name="32-bit float"/>
            {compression}
            <cvParam cvRef="MS" accession="MS:1000515" name="intensity array"/>
            <binary>{intensity}</binary>
          </binaryDataArray>
        </binaryDataArrayList>
      </spectrum>"#,
            scan = i + 1,
            len = s.mz.len(),
            level = s.ms_level,
            rt = s.rt_seconds,
            mz = encode_f64(&s.mz, zlib),
            intensity = encode_f32(&s.intensity, zlib),
        ));
    }

    doc.push_str(
        r#"
    </spectrumList>
  </run>
</mzML>
</indexedmzML>"#,
    );
    doc
}

/// Render the same run the way older converters do: array descriptions live
/// in referenceable param groups and the selected ion uses the plain `m/z` term
pub fn param_group_document(spectra: &[TestSpectrum]) -> String {
    let groups = r#"
  <referenceableParamGroupList count="2">
    <referenceableParamGroup id="mzArray">
      <cvParam cvRef="MS" accession="MS:1000514" name="m/z array"/>
      <cvParam cvRef="MS" accession="MS:1000523" name="64-bit float"/>
      <cvParam cvRef="MS" accession="MS:1000576" name="no compression"/>
    </referenceableParamGroup>
    <referenceableParamGroup id="intensityArray">
      <cvParam cvRef="MS" accession="MS:1000515" name="intensity array"/>
      <cvParam cvRef="MS" accession="MS:1000521" name="32-bit float"/>
      <cvParam cvRef="MS" accession="MS:1000576" name="no compression"/>
    </referenceableParamGroup>
  </referenceableParamGroupList>"#;

    mzml_document(spectra, false)
        .replace(r#"version="1.1.0">"#, &format!(r#"version="1.0.0">{groups}"#))
        .replace(
            r#"<cvParam cvRef="MS" accession="MS:1000514" name="m/z array"/>"#,
            r#"<referenceableParamGroupRef ref="mzArray"/>"#,
        )
        .replace(
            r#"<cvParam cvRef="MS" accession="MS:1000515" name="intensity array"/>"#,
            r#"<referenceableParamGroupRef ref="intensityArray"/>"#,
        )
        .replace(r#"<cvParam cvRef="MS" accession="MS:1000523" name="64-bit float"/>"#, "")
        .replace(r#"<cvParam cvRef="MS" accession="MS:1000521" name="32-bit float"/>"#, "")
        .replace(r#"<cvParam cvRef="MS" accession="MS:1000576" name="no compression"/>"#, "")
        .replace(
            r#"accession="MS:1000744" name="selected ion m/z""#,
            r#"accession="MS:1000040" name="m/z""#,
        )
}

/// Write a run file into `dir`
pub fn write_run(dir: &Path, file_name: &str, spectra: &[TestSpectrum]) -> PathBuf {
    let path = dir.join(file_name);
    std::fs::write(&path, mzml_document(spectra, false)).unwrap();
    path
}

/// The three-spectrum run used by several tests: one MS1, two MS2
pub fn three_spectrum_run() -> Vec<TestSpectrum> {
    vec![
        TestSpectrum::ms1(60.0),
        TestSpectrum::ms2(
            61.5,
            445.12,
            vec![100.0, 200.0, 300.0],
            vec![5.0, 50.0, 10.0],
        ),
        TestSpectrum::ms2(63.0, 512.3, vec![110.0, 220.0], vec![7.0, 3.0]),
    ]
}
