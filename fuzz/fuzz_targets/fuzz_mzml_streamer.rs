#![no_main]

use libfuzzer_sys::fuzz_target;
use ms2_summary::diagnostics::RecordingDiagnostics;
use ms2_summary::experiment::MzMLLoader;
use ms2_summary::mzml::MzMLStreamer;
use ms2_summary::summary::{summarize_spectra, DEFAULT_TOP_N};
use std::io::Cursor;

fuzz_target!(|data: &[u8]| {
    // Arbitrary input must either parse or fail, never panic
    let Ok(streamer) = MzMLStreamer::new(Cursor::new(data)) else {
        return;
    };

    let spectra: Vec<_> = streamer
        .spectra()
        .take(100)
        .map_while(Result::ok)
        .map(MzMLLoader::convert_spectrum)
        .collect();

    let diagnostics = RecordingDiagnostics::new();
    let _ = summarize_spectra(&spectra, DEFAULT_TOP_N, &diagnostics);
});
