//! Error types for the SELCAL decode pipeline.
//!
//! Only `UnsupportedRate` is fatal (raised before the pipeline starts, see
//! `rate_profile::RateProfile::lookup`). The rest are recoverable: callers
//! log them with `tracing::warn!` and keep processing rather than aborting
//! the stream.

use snafu::Snafu;

#[derive(Debug, Snafu)]
pub enum SelcalError {
    #[snafu(display("unsupported input sample rate: {rate} Hz"))]
    UnsupportedRate { rate: u32 },

    #[snafu(display("PCM chunk had {trailing_bytes} trailing byte(s), discarded"))]
    BadPcmChunk { trailing_bytes: usize },

    #[snafu(display("event log write failed: {source}"))]
    LogWriteFailed { source: std::io::Error },

    #[snafu(display("degenerate frame: frame_len is zero"))]
    DegenerateFrame,

    #[snafu(display("input stream read failed: {source}"))]
    StreamReadFailed { source: std::io::Error },
}

pub type Result<T, E = SelcalError> = std::result::Result<T, E>;
