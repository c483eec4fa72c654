//! Bandpass filter for the SELCAL tone band, and the decimation anti-alias
//! filter.
//!
//! An 8th-order Butterworth band-pass: two cascaded 4th-order Butterworth
//! sections (each itself two biquad stages at the Butterworth pole-pair Q
//! factors), one high-pass at the low cutoff and one low-pass at the high
//! cutoff.
//!
//! Each stream designs its coefficients once and reuses them for every PCM
//! chunk; the filter state itself is *not* carried across chunks, so a
//! fresh `DirectForm2Transposed` is constructed per chunk.

use biquad::{Biquad, Coefficients, DirectForm2Transposed, Hertz, Q_BUTTERWORTH_F32, Type};

pub const LOW_CUTOFF_HZ: f32 = 270.0;
pub const HIGH_CUTOFF_HZ: f32 = 1700.0;

/// Butterworth pole-pair Q factors for a 4th-order (two-biquad) section.
const BUTTERWORTH_Q_4TH_ORDER: [f32; 2] = [1.306_563, 0.541_196];

/// An 8th-order Butterworth band-pass, built once per stream from the
/// working sample rate and reused (by re-deriving fresh filter state) for
/// every chunk.
#[derive(Debug, Clone)]
pub struct BandpassFilter {
    low_cut_coeffs: [Coefficients<f32>; 2],
    high_cut_coeffs: [Coefficients<f32>; 2],
}

impl BandpassFilter {
    /// Design the filter for the given working sample rate (Hz).
    pub fn design(sig_rate: u32) -> BandpassFilter {
        let fs: Hertz<f32> = (sig_rate as f32).hz();
        let high_cut_coeffs = BUTTERWORTH_Q_4TH_ORDER.map(|q| {
            Coefficients::<f32>::from_params(Type::LowPass, fs, HIGH_CUTOFF_HZ.hz(), q)
                .expect("valid low-pass filter params")
        });
        let low_cut_coeffs = BUTTERWORTH_Q_4TH_ORDER.map(|q| {
            Coefficients::<f32>::from_params(Type::HighPass, fs, LOW_CUTOFF_HZ.hz(), q)
                .expect("valid high-pass filter params")
        });
        BandpassFilter {
            low_cut_coeffs,
            high_cut_coeffs,
        }
    }

    /// Apply the filter to a batch of samples, starting from zero initial
    /// conditions (no state carried across calls).
    pub fn apply(&self, samples: &[f32]) -> Vec<f32> {
        let mut stages: Vec<DirectForm2Transposed<f32>> = self
            .low_cut_coeffs
            .iter()
            .chain(self.high_cut_coeffs.iter())
            .map(|c| DirectForm2Transposed::<f32>::new(*c))
            .collect();

        samples
            .iter()
            .map(|&x| stages.iter_mut().fold(x, |acc, stage| stage.run(acc)))
            .collect()
    }
}

/// Anti-alias low-pass filter applied before discarding samples during
/// decimation, cutting at 0.8 of the decimated Nyquist frequency.
/// `scipy.signal.decimate` (used by the original implementation) applies
/// an equivalent low-pass ahead of the downsample; this reuses the same
/// cascaded Butterworth machinery rather than introducing a second filter
/// design.
pub fn decimate(samples: &[f32], input_rate: u32, factor: u32) -> Vec<f32> {
    if factor <= 1 {
        return samples.to_vec();
    }

    let nyquist = input_rate as f32 / (2.0 * factor as f32);
    let cutoff = 0.8 * nyquist;
    let fs: Hertz<f32> = (input_rate as f32).hz();
    let coeffs = BUTTERWORTH_Q_4TH_ORDER.map(|q| {
        Coefficients::<f32>::from_params(Type::LowPass, fs, cutoff.hz(), q)
            .expect("valid decimation low-pass params")
    });
    let mut stages: Vec<DirectForm2Transposed<f32>> =
        coeffs.iter().map(|c| DirectForm2Transposed::<f32>::new(*c)).collect();

    let filtered: Vec<f32> = samples
        .iter()
        .map(|&x| stages.iter_mut().fold(x, |acc, stage| stage.run(acc)))
        .collect();

    filtered
        .into_iter()
        .step_by(factor as usize)
        .collect()
}
