//! Pulls raw PCM from an input byte stream, decimates, band-passes, frames
//! it, and runs each frame through the correlator and sliding decoder.
//!
//! Grounded in `selcal_monitor.py::monitor_stream`/`read_s16le`.

use std::io::Read;

use tracing::{info, warn};

use crate::config::{DebugFormat, MonitorConfig};
use crate::decoder::{DecoderOutput, DecoderState};
use crate::error::SelcalError;
use crate::event_log::{DecodeMethod, EventLog};
use crate::filter::{decimate, BandpassFilter};
use crate::frame::{analyze_frame, TonesRecord};
use crate::correlate::Correlator;
use crate::rate_profile::RateProfile;
use crate::template::ToneTemplates;
use crate::tone_table::{ALPHABET, TONE_COUNT};

/// Bytes per PCM chunk read at a time: one second of input-rate i16 audio
/// (`input_sample_rate * 2` bytes).
fn chunk_bytes(input_rate: u32) -> usize {
    input_rate as usize * 2
}

/// Decode a little-endian i16 PCM byte slice to `f32` samples. A trailing
/// odd byte is discarded with a `BadPcmChunk` warning; the driver keeps
/// processing the truncated chunk rather than failing it.
fn decode_pcm_i16le(bytes: &[u8]) -> Vec<f32> {
    if bytes.len() % 2 != 0 {
        warn!(
            trailing_bytes = 1,
            "{}",
            SelcalError::BadPcmChunk { trailing_bytes: 1 }
        );
    }
    bytes
        .chunks_exact(2)
        .map(|c| i16::from_le_bytes([c[0], c[1]]) as f32)
        .collect()
}

/// Owns all per-stream pipeline state (templates, filter coefficients,
/// correlator FFT plans, `DecoderState`, event log) so a caller can feed it
/// PCM chunks one at a time without re-deriving anything per chunk.
pub struct StreamDriver {
    profile: RateProfile,
    filter: BandpassFilter,
    correlator: Correlator,
    decoder: DecoderState,
    log: EventLog,
    freq_hz: Option<u32>,
    min_group_cnt: u32,
    min_score: f64,
    frame_count: u64,
    max_tone_was_active: bool,
    by_score_was_active: bool,
}

impl StreamDriver {
    pub fn new(cfg: &MonitorConfig) -> Result<StreamDriver, SelcalError> {
        let profile = RateProfile::lookup(cfg.sig_rate)?;
        let filter = BandpassFilter::design(profile.sig_rate);
        let templates = ToneTemplates::generate(profile.frame_len, profile.sig_rate);
        let correlator = Correlator::new(&templates);

        Ok(StreamDriver {
            profile,
            filter,
            correlator,
            decoder: DecoderState::new(),
            log: EventLog::new(cfg.log_path.clone()),
            freq_hz: cfg.freq_hz,
            min_group_cnt: cfg.min_group_cnt,
            min_score: cfg.min_score,
            frame_count: 0,
            max_tone_was_active: false,
            by_score_was_active: false,
        })
    }

    pub fn rate_profile(&self) -> &RateProfile {
        &self.profile
    }

    /// Decimate, filter and frame-slice one PCM chunk (raw `i16` LE bytes),
    /// running each resulting frame through the Frame Analyzer and Sliding
    /// Decoder. `on_frame` is called once per frame with its index,
    /// `TonesRecord`, and the decoder output, for tracing/debug printing.
    pub fn process_chunk(
        &mut self,
        pcm_bytes: &[u8],
        mut on_frame: impl FnMut(u64, &TonesRecord, &DecoderOutput),
    ) {
        let raw = decode_pcm_i16le(pcm_bytes);
        let decimated = decimate(&raw, self.profile.input_rate, self.profile.decimate);
        let filtered = self.filter.apply(&decimated);

        let frame_len = self.profile.frame_len;
        let n_frames = filtered.len() / frame_len;
        for f in 0..n_frames {
            let frame = &filtered[f * frame_len..(f + 1) * frame_len];
            // frame_len is always > 0 (RateProfile never produces a zero
            // length), so DegenerateFrame cannot occur here.
            let trec = analyze_frame(&self.correlator, frame).expect("non-empty frame");

            let out = self.decoder.track(
                trec.clone(),
                self.profile.frame_rate as usize,
                self.min_group_cnt,
                self.min_score,
            );

            self.log_rising_edges(&out);
            on_frame(self.frame_count, &trec, &out);
            self.frame_count += 1;
        }
    }

    fn log_rising_edges(&mut self, out: &DecoderOutput) {
        if out.by_max_tone.is_active && !self.max_tone_was_active {
            if let Some(selcal) = &out.by_max_tone.selcal {
                if let Err(e) = self.log.append(self.freq_hz, selcal, DecodeMethod::ByMaxTone) {
                    warn!(error = %e, "failed to write SELCAL event to log");
                } else {
                    info!(selcal = %selcal, method = "by_max_tone", "SELCAL event logged");
                }
            }
        }
        self.max_tone_was_active = out.by_max_tone.is_active;

        if out.by_score.is_active && !self.by_score_was_active {
            if let Some(selcal) = &out.by_score.selcal {
                if let Err(e) = self.log.append(self.freq_hz, selcal, DecodeMethod::ByScore) {
                    warn!(error = %e, "failed to write SELCAL event to log");
                } else {
                    info!(selcal = %selcal, method = "by_score", "SELCAL event logged");
                }
            }
        }
        self.by_score_was_active = out.by_score.is_active;
    }

    /// Read PCM chunks from `reader` until a zero-length read signals EOF,
    /// running every resulting frame through the pipeline. `on_frame` is
    /// the same per-frame callback as `process_chunk`.
    pub fn run<R: Read>(
        &mut self,
        reader: &mut R,
        mut on_frame: impl FnMut(u64, &TonesRecord, &DecoderOutput),
    ) -> Result<(), SelcalError> {
        let bytes_per_chunk = chunk_bytes(self.profile.input_rate);
        let mut buf = vec![0u8; bytes_per_chunk];
        loop {
            let mut filled = 0;
            while filled < bytes_per_chunk {
                let n = reader
                    .read(&mut buf[filled..])
                    .map_err(|source| SelcalError::StreamReadFailed { source })?;
                if n == 0 {
                    break;
                }
                filled += n;
            }
            if filled == 0 {
                break;
            }
            self.process_chunk(&buf[..filled], &mut on_frame);
        }
        Ok(())
    }
}

/// Print the per-frame stdout trace header, grounded in
/// `tones.py::printFrame`/`printHeader`/`printValue`. `[MAX]` marks the two
/// dominant tones, `+` tones above average, `.` the rest. `Compact` gets a
/// narrow one-char-per-tone header; `MaxOnly`/`MaxAndAvg` get the wider
/// layout that leaves room for printed correlation values.
pub fn print_frame_header(format: DebugFormat) {
    match format {
        DebugFormat::Compact => {
            print!(" Index ");
            for c in ALPHABET {
                print!(" {c} ");
            }
            println!(" Avg");
        }
        DebugFormat::MaxOnly | DebugFormat::MaxAndAvg => {
            print!(" Index  ");
            for c in ALPHABET {
                print!("   {c}   ");
            }
            println!("   Avg");
        }
    }
}

pub fn print_frame_trace(frame_idx: u64, trec: &TonesRecord, format: DebugFormat) {
    print!("{frame_idx:06}: ");
    for i in 0..TONE_COUNT {
        let marker = if i == trec.max1idx || i == trec.max2idx {
            match format {
                DebugFormat::Compact => "|".to_string(),
                _ => format!("[{:5.2}]", trec.corr[i]),
            }
        } else if trec.corr[i] > trec.avg {
            match format {
                DebugFormat::MaxAndAvg => format!(" {:5.2} ", trec.corr[i]),
                _ => "+".to_string(),
            }
        } else {
            ".".to_string()
        };
        print!(" {marker} ");
    }
    println!(" {:5.2}", trec.avg);
}
