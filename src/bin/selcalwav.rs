//! Offline SELCAL analyzer — runs the decode pipeline over a whole WAV
//! file, dumping per-frame stats and (optionally) a 3D correlation surface
//! plot.
//!
//! Grounded in `receiver.py`'s `__main__` block.

use std::env;

use selcaldec::config::{DebugFormat, OfflineConfig};
use selcaldec::offline::{analyze_wav_file, print_dump};
use selcaldec::tracing_init::init_tracing;

fn main() {
    init_tracing();

    let args: Vec<String> = env::args().skip(1).collect();
    let cfg = match OfflineConfig::from_args(&args) {
        Ok(cfg) => cfg,
        Err(e) => {
            eprintln!("{e}");
            eprintln!("Usage: selcalwav <input.wav> [-o surface.html]");
            std::process::exit(1);
        }
    };

    let analysis = match analyze_wav_file(&cfg.wav_path) {
        Ok(a) => a,
        Err(e) => {
            eprintln!("{e}");
            std::process::exit(1);
        }
    };

    println!(
        "file: {}  rate: {}  frames: {}",
        cfg.wav_path,
        analysis.sample_rate,
        analysis.records.len()
    );

    print_dump(&analysis, DebugFormat::MaxAndAvg);

    if let Some(out_path) = &cfg.surface_out {
        if let Err(e) = analysis.surface.write_html(out_path) {
            eprintln!("failed to write surface plot: {e}");
            std::process::exit(1);
        }
        println!("Surface plot written to {out_path}");
    }
}
