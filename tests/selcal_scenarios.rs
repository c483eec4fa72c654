//! End-to-end decode scenarios, driven through `StreamDriver` the way
//! `selcalmon` would feed it PCM chunks.

use selcaldec::config::{DebugFormat, MonitorConfig};
use selcaldec::stream::StreamDriver;
use selcaldec::synth::{pcm_bytes, two_tone};

fn monitor_cfg(sig_rate: u32) -> MonitorConfig {
    MonitorConfig {
        freq_hz: Some(3_479_000),
        sig_rate,
        log_path: format!(
            "{}/selcal_scenario_{}_{}.log",
            std::env::temp_dir().display(),
            sig_rate,
            std::process::id()
        ),
        debug_fmt: DebugFormat::Compact,
        min_group_cnt: 4,
        min_score: 4.5,
    }
}

struct Observed {
    max_tone_events: Vec<String>,
    by_score_events: Vec<String>,
}

fn feed(driver: &mut StreamDriver, samples: &[f32], chunk_seconds_bytes: usize) -> Observed {
    let bytes = pcm_bytes(samples);
    let mut observed = Observed {
        max_tone_events: Vec::new(),
        by_score_events: Vec::new(),
    };

    let mut prev_max_active = false;
    let mut prev_score_active = false;
    for chunk in bytes.chunks(chunk_seconds_bytes) {
        driver.process_chunk(chunk, |_, _, out| {
            if out.by_max_tone.is_active && !prev_max_active {
                observed
                    .max_tone_events
                    .push(out.by_max_tone.selcal.clone().unwrap());
            }
            prev_max_active = out.by_max_tone.is_active;

            if out.by_score.is_active && !prev_score_active {
                observed
                    .by_score_events
                    .push(out.by_score.selcal.clone().unwrap());
            }
            prev_score_active = out.by_score.is_active;
        });
    }
    observed
}

/// A clean "AB-CD" transmission fires both decode methods.
#[test]
fn clean_selcal_ab_cd() {
    let cfg = monitor_cfg(11025);
    let _ = std::fs::remove_file(&cfg.log_path);
    let mut driver = StreamDriver::new(&cfg).unwrap();

    let ab = two_tone(312.6, 346.7, 10000.0, 1.0, 11025);
    let cd = two_tone(384.6, 426.6, 10000.0, 1.0, 11025);
    let silence = vec![0.0f32; 11025 * 2];
    let signal: Vec<f32> = [ab, cd, silence].concat();

    let observed = feed(&mut driver, &signal, 11025 * 2);
    assert_eq!(observed.max_tone_events.first(), Some(&"AB-CD".to_string()));
    assert_eq!(observed.by_score_events.first(), Some(&"AB-CD".to_string()));

    let _ = std::fs::remove_file(&cfg.log_path);
}

/// Pairs transmitted in reverse order decode as "CD-AB".
#[test]
fn reversed_order_cd_ab() {
    let cfg = monitor_cfg(11025);
    let _ = std::fs::remove_file(&cfg.log_path);
    let mut driver = StreamDriver::new(&cfg).unwrap();

    let cd = two_tone(384.6, 426.6, 10000.0, 1.0, 11025);
    let ab = two_tone(312.6, 346.7, 10000.0, 1.0, 11025);
    let signal: Vec<f32> = [cd, ab].concat();

    let observed = feed(&mut driver, &signal, 11025 * 2);
    assert_eq!(observed.max_tone_events.first(), Some(&"CD-AB".to_string()));

    let _ = std::fs::remove_file(&cfg.log_path);
}

/// A single pair sustained indefinitely never fires either method — a
/// SELCAL code needs two distinct pairs.
#[test]
fn single_pair_never_fires() {
    let cfg = monitor_cfg(11025);
    let _ = std::fs::remove_file(&cfg.log_path);
    let mut driver = StreamDriver::new(&cfg).unwrap();

    let ab = two_tone(312.6, 346.7, 10000.0, 4.0, 11025);
    let observed = feed(&mut driver, &ab, 11025 * 2);
    assert!(observed.max_tone_events.is_empty());
    assert!(observed.by_score_events.is_empty());

    let _ = std::fs::remove_file(&cfg.log_path);
}

/// Adjacent tone pairs "AB-BC" fire the max-tone-count method, but not the
/// score method, since the halves share tone index B and the score method
/// requires disjoint tone sets.
#[test]
fn adjacent_tones_ab_bc() {
    let cfg = monitor_cfg(11025);
    let _ = std::fs::remove_file(&cfg.log_path);
    let mut driver = StreamDriver::new(&cfg).unwrap();

    let ab = two_tone(312.6, 346.7, 10000.0, 1.0, 11025);
    let bc = two_tone(346.7, 384.6, 10000.0, 1.0, 11025);
    let signal: Vec<f32> = [ab, bc].concat();

    let observed = feed(&mut driver, &signal, 11025 * 2);
    assert_eq!(observed.max_tone_events.first(), Some(&"AB-BC".to_string()));
    assert!(observed.by_score_events.is_empty());

    let _ = std::fs::remove_file(&cfg.log_path);
}

/// 48 kHz input is decimated by 4 to a 12 kHz working rate and still
/// decodes a clean SELCAL transmission.
#[test]
fn boundary_rate_48000() {
    let cfg = monitor_cfg(48000);
    let _ = std::fs::remove_file(&cfg.log_path);
    let mut driver = StreamDriver::new(&cfg).unwrap();
    assert_eq!(driver.rate_profile().decimate, 4);
    assert_eq!(driver.rate_profile().sig_rate, 12000);
    assert_eq!(driver.rate_profile().frame_len, 1200);
    assert_eq!(driver.rate_profile().frame_rate, 10);

    let ab = two_tone(312.6, 346.7, 10000.0, 1.0, 48000);
    let cd = two_tone(384.6, 426.6, 10000.0, 1.0, 48000);
    let signal: Vec<f32> = [ab, cd].concat();

    let observed = feed(&mut driver, &signal, 48000 * 2);
    assert_eq!(observed.max_tone_events.first(), Some(&"AB-CD".to_string()));

    let _ = std::fs::remove_file(&cfg.log_path);
}

/// After a clean decode, a period of silence, then a second distinct
/// decode: the falling edge must reset state so the second event fires.
#[test]
fn falling_edge_allows_a_second_distinct_event() {
    let cfg = monitor_cfg(11025);
    let _ = std::fs::remove_file(&cfg.log_path);
    let mut driver = StreamDriver::new(&cfg).unwrap();

    let ab = two_tone(312.6, 346.7, 10000.0, 1.0, 11025);
    let cd = two_tone(384.6, 426.6, 10000.0, 1.0, 11025);
    let silence = vec![0.0f32; 11025 * 2];
    let cd2 = two_tone(384.6, 426.6, 10000.0, 1.0, 11025);
    let ab2 = two_tone(312.6, 346.7, 10000.0, 1.0, 11025);

    let signal: Vec<f32> = [ab, cd, silence, cd2, ab2].concat();
    let observed = feed(&mut driver, &signal, 11025 * 2);

    assert!(observed.max_tone_events.len() >= 2);
    assert_eq!(observed.max_tone_events[0], "AB-CD");
    assert_eq!(observed.max_tone_events[1], "CD-AB");

    let _ = std::fs::remove_file(&cfg.log_path);
}
