//! FFT-accelerated same-mode linear cross-correlation against the 16
//! reference tone templates.
//!
//! `same`-mode cross-correlation of two length-`N` sequences is O(N^2)
//! computed directly; this computes it in O(N log N) via the standard
//! correlation theorem (`corr(x, y) = IFFT(FFT(x) * conj(FFT(y)))`), zero
//! padding to `2N-1` so the circular correlation equals the linear one.
//! FFT plans are cached per size in a `Lazy<Mutex<HashMap<usize, Arc<dyn
//! Fft<f32>>>>>`, since the analyzer calls this with the same frame length
//! for the life of a stream.

use once_cell::sync::Lazy;
use rustfft::{num_complex::Complex, Fft, FftPlanner};
use std::collections::HashMap;
use std::sync::{Arc, Mutex};

use crate::template::ToneTemplates;
use crate::tone_table::TONE_COUNT;

static FORWARD_CACHE: Lazy<Mutex<HashMap<usize, Arc<dyn Fft<f32>>>>> =
    Lazy::new(|| Mutex::new(HashMap::new()));
static INVERSE_CACHE: Lazy<Mutex<HashMap<usize, Arc<dyn Fft<f32>>>>> =
    Lazy::new(|| Mutex::new(HashMap::new()));

fn forward_plan(n: usize) -> Arc<dyn Fft<f32>> {
    let mut cache = FORWARD_CACHE.lock().unwrap();
    cache
        .entry(n)
        .or_insert_with(|| FftPlanner::new().plan_fft_forward(n))
        .clone()
}

fn inverse_plan(n: usize) -> Arc<dyn Fft<f32>> {
    let mut cache = INVERSE_CACHE.lock().unwrap();
    cache
        .entry(n)
        .or_insert_with(|| FftPlanner::new().plan_fft_inverse(n))
        .clone()
}

/// Precomputed template FFTs for one frame length, reused across every
/// frame of a stream.
pub struct Correlator {
    frame_len: usize,
    fft_len: usize,
    forward: Arc<dyn Fft<f32>>,
    inverse: Arc<dyn Fft<f32>>,
    template_ffts: Vec<Vec<Complex<f32>>>,
}

impl Correlator {
    pub fn new(templates: &ToneTemplates) -> Correlator {
        let frame_len = templates.frame_len;
        let fft_len = 2 * frame_len - 1;
        let forward = forward_plan(fft_len);
        let inverse = inverse_plan(fft_len);

        let template_ffts = templates
            .iter()
            .map(|tone| {
                let mut buf: Vec<Complex<f32>> = tone
                    .iter()
                    .map(|&s| Complex::new(s as f32, 0.0))
                    .collect();
                buf.resize(fft_len, Complex::new(0.0, 0.0));
                forward.process(&mut buf);
                buf
            })
            .collect();

        Correlator {
            frame_len,
            fft_len,
            forward,
            inverse,
            template_ffts,
        }
    }

    /// Compute `log10(sum(|same-mode xcorr|))` against each of the 16 tone
    /// templates for one frame of working-rate samples.
    ///
    /// `frame.len()` must equal the frame length this correlator was built
    /// for (the driver never hands it a short final frame, see `stream.rs`).
    pub fn correlation_energies(&self, frame: &[f32]) -> [f64; TONE_COUNT] {
        debug_assert_eq!(frame.len(), self.frame_len);

        let n = self.frame_len;
        let l = self.fft_len;

        let mut x: Vec<Complex<f32>> = frame.iter().map(|&s| Complex::new(s, 0.0)).collect();
        x.resize(l, Complex::new(0.0, 0.0));
        self.forward.process(&mut x);

        let scale = 1.0 / l as f32;
        let offset = (n - 1) / 2;

        let mut energies = [0.0f64; TONE_COUNT];
        let mut product = vec![Complex::new(0.0, 0.0); l];
        for (tone_idx, tmpl_fft) in self.template_ffts.iter().enumerate() {
            for (p, (a, b)) in product.iter_mut().zip(x.iter().zip(tmpl_fft.iter())) {
                *p = a * b.conj();
            }
            self.inverse.process(&mut product);

            // Rotate the circular correlation into natural lag order
            // (lag -(n-1)..=n-1) and sum |.| over the centered `same` window.
            let mut sum = 0.0f64;
            for k in offset..offset + n {
                let circ_idx = (k + n) % l;
                sum += (product[circ_idx].re * scale).abs() as f64;
            }
            energies[tone_idx] = sum.max(f64::MIN_POSITIVE).log10();
        }
        energies
    }
}
