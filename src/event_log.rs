//! Append-only, UTC-timestamped decode event log.
//!
//! Grounded in `tones.py::writeStringToFile`/`getTimestamp`: the Python
//! opens the log path in append mode and writes one line per call. A write
//! failure (`LogWriteFailed`) is recoverable — the caller logs a
//! `tracing::warn!` and keeps decoding, it never aborts the stream.

use std::fs::OpenOptions;
use std::io::Write;

use chrono::Utc;

use crate::error::SelcalError;

/// Method tag appended to each log line.
#[derive(Debug, Clone, Copy, PartialEq, Eq)]
pub enum DecodeMethod {
    ByMaxTone,
    ByScore,
}

impl DecodeMethod {
    fn tag(self) -> &'static str {
        match self {
            DecodeMethod::ByMaxTone => "SELCAL_BYMAXTONE",
            DecodeMethod::ByScore => "SELCAL_BYSCORE",
        }
    }
}

/// Appends one line per detected SELCAL event to a log file opened fresh
/// in append mode for each write.
#[derive(Debug, Clone)]
pub struct EventLog {
    path: String,
}

impl EventLog {
    pub fn new(path: impl Into<String>) -> EventLog {
        EventLog { path: path.into() }
    }

    /// Format and append one event line:
    /// `YYYY/MM/DD-HH:MM:SS FF.F kHz XY-ZW ~ <tag>`.
    ///
    /// Returns `Err(SelcalError::LogWriteFailed)` on I/O failure; callers
    /// log the warning and continue, they never propagate it as fatal.
    pub fn append(&self, freq_hz: Option<u32>, selcal: &str, method: DecodeMethod) -> Result<(), SelcalError> {
        let timestamp = Utc::now().format("%Y/%m/%d-%H:%M:%S");
        let khz = freq_hz.unwrap_or(0) as f64 / 1000.0;
        let line = format!("{timestamp} {khz:.1} kHz {selcal} ~ {}\n", method.tag());

        let mut file = OpenOptions::new()
            .create(true)
            .append(true)
            .open(&self.path)
            .map_err(|source| SelcalError::LogWriteFailed { source })?;
        file.write_all(line.as_bytes())
            .map_err(|source| SelcalError::LogWriteFailed { source })
    }
}
