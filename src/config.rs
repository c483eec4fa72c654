//! CLI flag parsing for `selcalmon` and `selcalwav`.
//!
//! Hand-rolled `env::args()` loop rather than a declarative parser crate,
//! grounded in `selcal_monitor.py::processArgs`.

use crate::error::SelcalError;

/// Per-frame dump verbosity, mirrors `tones.py::DebugTonesFormat`.
#[derive(Debug, Clone, Copy, PartialEq, Eq, Default)]
pub enum DebugFormat {
    #[default]
    Compact,
    MaxOnly,
    MaxAndAvg,
}

impl DebugFormat {
    fn parse(s: &str) -> Option<DebugFormat> {
        match s {
            "compact" => Some(DebugFormat::Compact),
            "max-only" => Some(DebugFormat::MaxOnly),
            "max+avg" => Some(DebugFormat::MaxAndAvg),
            _ => None,
        }
    }
}

/// Settings for `selcalmon`, the stream monitor binary.
#[derive(Debug, Clone)]
pub struct MonitorConfig {
    pub freq_hz: Option<u32>,
    pub sig_rate: u32,
    pub log_path: String,
    pub debug_fmt: DebugFormat,
    pub min_group_cnt: u32,
    pub min_score: f64,
}

impl Default for MonitorConfig {
    fn default() -> Self {
        MonitorConfig {
            freq_hz: None,
            sig_rate: 11025,
            log_path: "./selcal.log".to_string(),
            debug_fmt: DebugFormat::Compact,
            min_group_cnt: 4,
            min_score: 4.5,
        }
    }
}

impl MonitorConfig {
    /// Parse `selcalmon`'s CLI flags. Unknown flags or bad values are
    /// reported as plain error strings for `main` to print and exit on;
    /// this is startup-time invalid config, not a `SelcalError` pipeline
    /// failure.
    pub fn from_args(args: &[String]) -> Result<MonitorConfig, String> {
        let mut cfg = MonitorConfig::default();
        let mut i = 0;
        while i < args.len() {
            let arg = args[i].as_str();
            let mut take_value = || -> Result<&str, String> {
                i += 1;
                args.get(i)
                    .map(|s| s.as_str())
                    .ok_or_else(|| format!("{arg} requires a value"))
            };
            match arg {
                "-f" | "--freq-hz" => {
                    let v = take_value()?;
                    cfg.freq_hz = Some(
                        v.parse()
                            .map_err(|_| format!("invalid --freq-hz value: {v}"))?,
                    );
                }
                "-sr" | "--sig-rate" => {
                    let v = take_value()?;
                    cfg.sig_rate = v
                        .parse()
                        .map_err(|_| format!("invalid --sig-rate value: {v}"))?;
                }
                "-l" | "--log" => {
                    cfg.log_path = take_value()?.to_string();
                }
                "-df" | "--debug_fmt" => {
                    let v = take_value()?;
                    cfg.debug_fmt = DebugFormat::parse(v)
                        .ok_or_else(|| format!("invalid --debug_fmt value: {v}"))?;
                }
                "-mgc" | "--min-group-cnt" => {
                    let v = take_value()?;
                    cfg.min_group_cnt = v
                        .parse()
                        .map_err(|_| format!("invalid --min-group-cnt value: {v}"))?;
                }
                "-mts" | "--min-tone-score" => {
                    let v = take_value()?;
                    cfg.min_score = v
                        .parse()
                        .map_err(|_| format!("invalid --min-tone-score value: {v}"))?;
                }
                other => return Err(format!("unknown option: {other}")),
            }
            i += 1;
        }
        Ok(cfg)
    }

    pub fn validate_rate(&self) -> Result<(), SelcalError> {
        crate::rate_profile::RateProfile::lookup(self.sig_rate).map(|_| ())
    }
}

/// Settings for `selcalwav`, the offline analyzer binary.
#[derive(Debug, Clone, Default)]
pub struct OfflineConfig {
    pub wav_path: String,
    pub surface_out: Option<String>,
}

impl OfflineConfig {
    pub fn from_args(args: &[String]) -> Result<OfflineConfig, String> {
        let mut wav_path: Option<String> = None;
        let mut surface_out: Option<String> = None;
        let mut i = 0;
        while i < args.len() {
            match args[i].as_str() {
                "-o" | "--surface-out" => {
                    i += 1;
                    let v = args
                        .get(i)
                        .ok_or_else(|| "--surface-out requires a value".to_string())?;
                    surface_out = Some(v.clone());
                }
                other if !other.starts_with('-') => {
                    wav_path = Some(other.to_string());
                }
                other => return Err(format!("unknown option: {other}")),
            }
            i += 1;
        }
        let wav_path = wav_path.ok_or_else(|| "missing WAV path argument".to_string())?;
        Ok(OfflineConfig {
            wav_path,
            surface_out,
        })
    }
}

#[cfg(test)]
mod tests {
    use super::*;

    fn args(v: &[&str]) -> Vec<String> {
        v.iter().map(|s| s.to_string()).collect()
    }

    #[test]
    fn monitor_config_has_expected_defaults() {
        let cfg = MonitorConfig::default();
        assert_eq!(cfg.sig_rate, 11025);
        assert_eq!(cfg.log_path, "./selcal.log");
        assert_eq!(cfg.debug_fmt, DebugFormat::Compact);
        assert_eq!(cfg.min_group_cnt, 4);
        assert_eq!(cfg.min_score, 4.5);
        assert_eq!(cfg.freq_hz, None);
    }

    #[test]
    fn parses_long_and_short_flags() {
        let cfg = MonitorConfig::from_args(&args(&[
            "-f", "118100000", "--sig-rate", "48000", "-l", "/tmp/out.log", "-df", "max+avg",
            "-mgc", "3", "-mts", "5.0",
        ]))
        .unwrap();
        assert_eq!(cfg.freq_hz, Some(118_100_000));
        assert_eq!(cfg.sig_rate, 48000);
        assert_eq!(cfg.log_path, "/tmp/out.log");
        assert_eq!(cfg.debug_fmt, DebugFormat::MaxAndAvg);
        assert_eq!(cfg.min_group_cnt, 3);
        assert_eq!(cfg.min_score, 5.0);
    }

    #[test]
    fn unknown_flag_errors() {
        assert!(MonitorConfig::from_args(&args(&["--bogus"])).is_err());
    }

    #[test]
    fn offline_config_parses_positional_and_output() {
        let cfg = OfflineConfig::from_args(&args(&["in.wav", "-o", "surface.html"])).unwrap();
        assert_eq!(cfg.wav_path, "in.wav");
        assert_eq!(cfg.surface_out.as_deref(), Some("surface.html"));
    }

    #[test]
    fn offline_config_requires_wav_path() {
        assert!(OfflineConfig::from_args(&args(&[])).is_err());
    }
}
