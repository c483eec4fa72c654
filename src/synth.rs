//! Synthesizes SELCAL test signals: two-tone pairs, white noise, and
//! SNR mixing. Not `#[cfg(test)]`-gated so both the test suite and the
//! offline/stream binaries can use it to generate fixtures.
//!
//! Grounded in `tones.py::note` (two-tone synthesis) and
//! `generate_white_noise`/`mix_waveform` (noise mixing, amplitude scaling).

use rand::prelude::*;
use rand_distr::{Distribution, Normal};

/// Sum of two sinusoids at `freq_a`/`freq_b`, `duration_s` seconds long at
/// `sample_rate`, each at amplitude `amp`. Grounded in `tones.py::note`,
/// which synthesizes one tone at a time; this sums two since a SELCAL tone
/// pair is transmitted as two simultaneous sinusoids.
pub fn two_tone(freq_a: f64, freq_b: f64, amp: f32, duration_s: f64, sample_rate: u32) -> Vec<f32> {
    let n = (duration_s * sample_rate as f64).round() as usize;
    (0..n)
        .map(|i| {
            let t = i as f64 / sample_rate as f64;
            let a = (2.0 * std::f64::consts::PI * freq_a * t).sin();
            let b = (2.0 * std::f64::consts::PI * freq_b * t).sin();
            ((a + b) * amp as f64) as f32
        })
        .collect()
}

/// Gaussian white noise at the given standard deviation.
pub fn white_noise(len: usize, sigma: f32) -> Vec<f32> {
    let mut rng = rand::rng();
    let normal = Normal::new(0.0, sigma).unwrap();
    (0..len).map(|_| normal.sample(&mut rng)).collect()
}

fn rms(samples: &[f32]) -> f32 {
    (samples.iter().map(|&x| x * x).sum::<f32>() / samples.len().max(1) as f32).sqrt()
}

/// Mix `noise` into `signal` (same length) so the result sits at `snr_db`,
/// scaling the noise by the ratio of RMS levels implied by the target SNR.
pub fn mix_at_snr(signal: &[f32], noise: &[f32], snr_db: f32) -> Vec<f32> {
    let signal_rms = rms(signal);
    let noise_rms = rms(noise);
    let snr_linear = 10.0_f32.powf(snr_db / 20.0);
    let scale = if noise_rms > 0.0 {
        signal_rms / (noise_rms * snr_linear)
    } else {
        0.0
    };

    signal
        .iter()
        .zip(noise.iter())
        .map(|(&s, &n)| s + n * scale)
        .collect()
}

/// Convert float samples in `[-1.0, 1.0]`-ish range to little-endian signed
/// 16-bit PCM bytes, the wire format the stream driver consumes.
pub fn pcm_bytes(samples: &[f32]) -> Vec<u8> {
    let mut bytes = Vec::with_capacity(samples.len() * 2);
    for &s in samples {
        let clamped = s.clamp(i16::MIN as f32, i16::MAX as f32);
        bytes.extend_from_slice(&(clamped as i16).to_le_bytes());
    }
    bytes
}

#[cfg(test)]
mod tests {
    use super::*;

    #[test]
    fn two_tone_has_expected_sample_count() {
        let sig = two_tone(312.6, 346.7, 10000.0, 1.0, 11025);
        assert_eq!(sig.len(), 11025);
    }

    #[test]
    fn pcm_bytes_round_trip_i16() {
        let samples = vec![1000.0f32, -1000.0, 0.0, 32767.0, -32768.0];
        let bytes = pcm_bytes(&samples);
        assert_eq!(bytes.len(), samples.len() * 2);
        let decoded: Vec<i16> = bytes
            .chunks_exact(2)
            .map(|c| i16::from_le_bytes([c[0], c[1]]))
            .collect();
        assert_eq!(decoded, vec![1000, -1000, 0, 32767, -32768]);
    }

    #[test]
    fn white_noise_has_requested_length() {
        let n = white_noise(500, 1.0);
        assert_eq!(n.len(), 500);
    }
}
