//! Generates the reference tone templates used for correlation.
//!
//! Produces the 16 reference sinusoids used for correlation, one per tone
//! in `tone_table::TONES_HZ`, each exactly `frame_len` samples at the
//! working rate. Grounded in `tones.py::note`/`generateToneTemplate`: the
//! Python computes `sin(2*pi*f*t) * amp` over `t` spanning `frame_len / rate`
//! seconds and truncates to `int`; this keeps the same truncation (not
//! rounding) to match reference behavior exactly.

use crate::tone_table::{TONE_COUNT, TONES_HZ};

pub const TEMPLATE_AMPLITUDE: f64 = 32767.0;

#[derive(Debug, Clone)]
pub struct ToneTemplates {
    pub frame_len: usize,
    pub sig_rate: u32,
    templates: [Vec<i32>; TONE_COUNT],
}

impl ToneTemplates {
    /// Generate all 16 reference templates for the given frame length and
    /// working sample rate.
    pub fn generate(frame_len: usize, sig_rate: u32) -> ToneTemplates {
        let templates = TONES_HZ.map(|freq| generate_tone(freq, frame_len, sig_rate));
        ToneTemplates {
            frame_len,
            sig_rate,
            templates,
        }
    }

    pub fn get(&self, tone_idx: usize) -> &[i32] {
        &self.templates[tone_idx]
    }

    pub fn iter(&self) -> impl Iterator<Item = &[i32]> {
        self.templates.iter().map(|v| v.as_slice())
    }
}

fn generate_tone(freq: f64, frame_len: usize, sig_rate: u32) -> Vec<i32> {
    if freq == 0.0 {
        return vec![0; frame_len];
    }
    (0..frame_len)
        .map(|i| {
            let t = i as f64 / sig_rate as f64;
            (2.0 * std::f64::consts::PI * freq * t).sin() * TEMPLATE_AMPLITUDE
        })
        .map(|sample| sample as i32)
        .collect()
}
