//! SELCAL stream monitor — reads raw s16le PCM from stdin and reports
//! decoded SELCAL events as they cross the sliding decoder's thresholds.
//!
//! Grounded in `selcal_monitor.py`'s `__main__` block.

use std::env;
use std::io;

use selcaldec::config::MonitorConfig;
use selcaldec::stream::{print_frame_header, print_frame_trace, StreamDriver};
use selcaldec::tracing_init::init_tracing;

fn main() {
    init_tracing();

    let args: Vec<String> = env::args().skip(1).collect();
    let cfg = match MonitorConfig::from_args(&args) {
        Ok(cfg) => cfg,
        Err(e) => {
            eprintln!("{e}");
            eprintln!(
                "Usage: selcalmon [-f HZ] [-sr RATE] [-l LOGPATH] [-df FMT] [-mgc N] [-mts SCORE]"
            );
            std::process::exit(1);
        }
    };

    let mut driver = match StreamDriver::new(&cfg) {
        Ok(d) => d,
        Err(e) => {
            eprintln!("{e}");
            std::process::exit(1);
        }
    };

    println!(
        "Selcal detection sensitivity settings - Min Group Cnt: [{}], Min Tone Score: [{}].",
        cfg.min_group_cnt, cfg.min_score
    );
    let profile = driver.rate_profile();
    println!(
        "Input sample rate {}, decimate: [{}], working rate: [{}]. Logging events to: [{}].",
        profile.input_rate, profile.decimate, profile.sig_rate, cfg.log_path
    );

    print_frame_header(cfg.debug_fmt);

    let stdin = io::stdin();
    let mut handle = stdin.lock();

    let result = driver.run(&mut handle, |frame_idx, trec, out| {
        print_frame_trace(frame_idx, trec, cfg.debug_fmt);
        println!(
            " - Tone: {} - Selcal: [{:?}] (Act: {}, Q1: {:?}={}, Q2: {:?}={})",
            out.current_tgc,
            out.by_max_tone.selcal,
            out.by_max_tone.is_active,
            out.tg1,
            out.tg1_cnt,
            out.tg2,
            out.tg2_cnt
        );
    });

    match result {
        Ok(()) => std::process::exit(0),
        Err(e) => {
            eprintln!("{e}");
            std::process::exit(1);
        }
    }
}
