//! Sample-rate profile table.
//!
//! Pure lookup from an input sample rate to the decimation factor, working
//! rate, frame rate and frame length used for the rest of the pipeline.
//! Grounded in `receiver.py::SAMPLE_RATES`.

use crate::error::SelcalError;

#[derive(Debug, Clone, Copy, PartialEq, Eq)]
pub struct RateProfile {
    /// Input sample rate in Hz.
    pub input_rate: u32,
    /// Decimation factor applied to the input signal.
    pub decimate: u32,
    /// Working (post-decimation) sample rate in Hz.
    pub sig_rate: u32,
    /// Frames analyzed per second at the working rate.
    pub frame_rate: u32,
    /// Samples per frame at the working rate.
    pub frame_len: usize,
}

impl RateProfile {
    /// Look up the profile for a supported input sample rate.
    ///
    /// Fails with `SelcalError::UnsupportedRate` for anything outside the
    /// enumerated set `{11025, 22050, 44100, 48000}`.
    pub fn lookup(input_rate: u32) -> Result<RateProfile, SelcalError> {
        let profile = match input_rate {
            11025 => RateProfile {
                input_rate,
                decimate: 1,
                sig_rate: 11025,
                frame_rate: 9,
                frame_len: 1225,
            },
            22050 => RateProfile {
                input_rate,
                decimate: 2,
                sig_rate: 11025,
                frame_rate: 9,
                frame_len: 1225,
            },
            44100 => RateProfile {
                input_rate,
                decimate: 4,
                sig_rate: 11025,
                frame_rate: 9,
                frame_len: 1225,
            },
            48000 => RateProfile {
                input_rate,
                decimate: 4,
                sig_rate: 12000,
                frame_rate: 10,
                frame_len: 1200,
            },
            other => return Err(SelcalError::UnsupportedRate { rate: other }),
        };
        Ok(profile)
    }
}
