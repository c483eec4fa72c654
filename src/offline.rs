//! Runs the same decimate/filter/frame/correlate path as the stream driver
//! over an entire WAV file in one pass, producing a per-frame text dump and
//! (optionally) a 3D correlation surface plot.
//!
//! Grounded in `receiver.py::receiver`; WAV reading uses `hound::WavReader`.

use hound::WavReader;
use plotly::{Plot, Surface};

use crate::config::DebugFormat;
use crate::correlate::Correlator;
use crate::error::SelcalError;
use crate::filter::{decimate, BandpassFilter};
use crate::frame::{analyze_frame, TonesRecord};
use crate::rate_profile::RateProfile;
use crate::stream::{print_frame_header, print_frame_trace};
use crate::template::ToneTemplates;
use crate::tone_table::TONE_COUNT;

/// Rectangular `log-correlation vs (tone_index, frame_index)` matrix, the
/// data behind the optional 3D plot. Row `frame_index`, column `tone_index`.
#[derive(Debug, Clone)]
pub struct CorrelationSurface {
    pub frames: usize,
    pub z: Vec<[f64; TONE_COUNT]>,
}

impl CorrelationSurface {
    /// Render the surface as a `plotly` 3D `Surface` trace and write it to
    /// `path` as a standalone HTML document.
    pub fn write_html(&self, path: &str) -> Result<(), SelcalError> {
        let z: Vec<Vec<f64>> = self.z.iter().map(|row| row.to_vec()).collect();
        let x: Vec<f64> = (0..TONE_COUNT).map(|i| i as f64).collect();
        let y: Vec<f64> = (0..self.frames).map(|i| i as f64).collect();

        let surface = Surface::new(z).x(x).y(y);
        let mut plot = Plot::new();
        plot.add_trace(surface);
        plot.write_html(path);
        Ok(())
    }
}

/// Result of analyzing one whole WAV file: the per-frame `TonesRecord`s in
/// order and the surface data derived from their `corr` vectors.
pub struct OfflineAnalysis {
    pub sample_rate: u32,
    pub records: Vec<TonesRecord>,
    pub surface: CorrelationSurface,
}

/// Read `path` as 16-bit mono PCM WAV, run the full DSP path over the
/// entire buffer as one chunk, and return every frame's `TonesRecord`
/// plus the correlation surface. Fails with `UnsupportedRate` if the
/// file's sample rate is not one of the four supported rates.
pub fn analyze_wav_file(path: &str) -> Result<OfflineAnalysis, SelcalError> {
    let mut reader = WavReader::open(path).map_err(|_| SelcalError::StreamReadFailed {
        source: std::io::Error::new(std::io::ErrorKind::NotFound, "failed to open WAV file"),
    })?;
    let spec = reader.spec();
    let profile = RateProfile::lookup(spec.sample_rate)?;

    let raw: Vec<f32> = reader
        .samples::<i16>()
        .map(|s| s.unwrap_or(0) as f32)
        .collect();

    let decimated = decimate(&raw, profile.input_rate, profile.decimate);
    let filter = BandpassFilter::design(profile.sig_rate);
    let filtered = filter.apply(&decimated);

    let templates = ToneTemplates::generate(profile.frame_len, profile.sig_rate);
    let correlator = Correlator::new(&templates);

    let frame_len = profile.frame_len;
    let n_frames = filtered.len() / frame_len;

    let mut records = Vec::with_capacity(n_frames);
    let mut z = Vec::with_capacity(n_frames);
    for f in 0..n_frames {
        let frame = &filtered[f * frame_len..(f + 1) * frame_len];
        let trec = analyze_frame(&correlator, frame).expect("non-empty frame");
        z.push(trec.corr);
        records.push(trec);
    }

    Ok(OfflineAnalysis {
        sample_rate: spec.sample_rate,
        records,
        surface: CorrelationSurface { frames: n_frames, z },
    })
}

/// Print the per-frame text dump, grounded in
/// `receiver.py::printHeader`/`printFrame`.
pub fn print_dump(analysis: &OfflineAnalysis, format: DebugFormat) {
    print_frame_header(format);
    for (idx, trec) in analysis.records.iter().enumerate() {
        print_frame_trace(idx as u64, trec, format);
    }
}

#[cfg(test)]
mod tests {
    use super::*;
    use crate::synth::{pcm_bytes, two_tone};
    use hound::{SampleFormat, WavSpec, WavWriter};

    fn write_test_wav(path: &str, samples: &[f32], sample_rate: u32) {
        let spec = WavSpec {
            channels: 1,
            sample_rate,
            bits_per_sample: 16,
            sample_format: SampleFormat::Int,
        };
        let mut writer = WavWriter::create(path, spec).unwrap();
        for chunk in pcm_bytes(samples).chunks_exact(2) {
            let sample = i16::from_le_bytes([chunk[0], chunk[1]]);
            writer.write_sample(sample).unwrap();
        }
        writer.finalize().unwrap();
    }

    #[test]
    fn analyzes_a_clean_selcal_wav() {
        let path = format!(
            "{}/selcal_offline_test_{}.wav",
            std::env::temp_dir().display(),
            std::process::id()
        );
        let ab = two_tone(312.6, 346.7, 10000.0, 1.0, 11025);
        let cd = two_tone(384.6, 426.6, 10000.0, 1.0, 11025);
        let signal: Vec<f32> = [ab, cd].concat();
        write_test_wav(&path, &signal, 11025);

        let analysis = analyze_wav_file(&path).unwrap();
        assert_eq!(analysis.sample_rate, 11025);
        assert_eq!(analysis.records.len(), analysis.surface.frames);
        assert!(analysis.records.len() >= 17);

        let first_half_gtc = &analysis.records[4].gtc;
        let second_half_gtc = &analysis.records[analysis.records.len() - 1].gtc;
        assert_eq!(first_half_gtc, "AB");
        assert_eq!(second_half_gtc, "CD");

        let _ = std::fs::remove_file(&path);
    }

    #[test]
    fn unsupported_rate_wav_errors() {
        let path = format!(
            "{}/selcal_offline_bad_rate_{}.wav",
            std::env::temp_dir().display(),
            std::process::id()
        );
        let tone = two_tone(440.0, 880.0, 1000.0, 0.1, 8000);
        write_test_wav(&path, &tone, 8000);

        let err = analyze_wav_file(&path).unwrap_err();
        assert!(matches!(err, SelcalError::UnsupportedRate { rate: 8000 }));

        let _ = std::fs::remove_file(&path);
    }
}
