//! Produces an immutable `TonesRecord` from one frame of filtered,
//! working-rate samples.
//!
//! Grounded in `tones.py::TonesRecord.computeStats`/`computeScores`.

use crate::correlate::Correlator;
use crate::error::SelcalError;
use crate::tone_table::{tgc, TONE_COUNT};

/// Per-frame correlation result. Immutable once constructed.
#[derive(Debug, Clone)]
pub struct TonesRecord {
    pub corr: [f64; TONE_COUNT],
    pub avg: f64,
    pub max: f64,
    pub max1idx: usize,
    pub max2idx: usize,
    pub scores: [f64; TONE_COUNT],
    pub gtc: String,
}

impl TonesRecord {
    /// Build a `TonesRecord` from the 16 correlation energies for one
    /// frame: find the dominant tone, gap-test for a runner-up, normalize
    /// their order, and derive the per-tone score vector.
    pub fn from_correlations(corr: [f64; TONE_COUNT]) -> TonesRecord {
        let avg = corr.iter().sum::<f64>() / TONE_COUNT as f64;
        let max1idx = argmax(&corr);
        let max = corr[max1idx];

        // Gap-tested runner-up search, ascending index order so the
        // tie-break ("stick with the first") is deterministic.
        let mut cand_idx: Option<usize> = None;
        let mut cand_val = f64::NEG_INFINITY;
        for i in 0..TONE_COUNT {
            if i == max1idx {
                continue;
            }
            let value = corr[i];
            let replace = match cand_idx {
                None => true,
                Some(_) => value - cand_val > (max - cand_val) / 4.0,
            };
            if replace {
                cand_idx = Some(i);
                cand_val = value;
            }
        }
        let max2idx_raw = cand_idx.expect("at least 15 other tones to search");

        // Normalize so max1idx < max2idx.
        let (max1idx, max2idx) = if max1idx <= max2idx_raw {
            (max1idx, max2idx_raw)
        } else {
            (max2idx_raw, max1idx)
        };

        // Score vector: the two dominant tones score 1.0, others bucketed
        // by how far above average they sit.
        let bin = (max - avg) / 5.0;
        let mut scores = [0.0f64; TONE_COUNT];
        for i in 0..TONE_COUNT {
            if i == max1idx || i == max2idx {
                scores[i] = 1.0;
            } else if corr[i] > avg && bin > 0.0 {
                let bin_idx = ((corr[i] - avg) / bin).floor();
                scores[i] = (bin_idx * 0.2 * 10.0).round() / 10.0;
            }
        }

        let gtc = tgc(max1idx, max2idx);

        TonesRecord {
            corr,
            avg,
            max,
            max1idx,
            max2idx,
            scores,
            gtc,
        }
    }
}

fn argmax(values: &[f64; TONE_COUNT]) -> usize {
    let mut best_idx = 0;
    let mut best_val = values[0];
    for (i, &v) in values.iter().enumerate().skip(1) {
        if v > best_val {
            best_val = v;
            best_idx = i;
        }
    }
    best_idx
}

/// Analyze one frame of filtered working-rate samples into a `TonesRecord`.
///
/// Fails with `SelcalError::DegenerateFrame` only when the frame is empty;
/// any non-empty frame (the driver always hands it `frame_len` samples)
/// always succeeds.
pub fn analyze_frame(correlator: &Correlator, frame: &[f32]) -> Result<TonesRecord, SelcalError> {
    if frame.is_empty() {
        return Err(SelcalError::DegenerateFrame);
    }
    let corr = correlator.correlation_energies(frame);
    Ok(TonesRecord::from_correlations(corr))
}

#[cfg(test)]
mod tests {
    use super::*;

    fn record(corr: [f64; TONE_COUNT]) -> TonesRecord {
        TonesRecord::from_correlations(corr)
    }

    #[test]
    fn max_indices_are_ordered_and_distinct() {
        let rec = record([
            9.0, 10.0, 8.0, 7.0, 6.0, 5.0, 4.0, 3.0, 2.0, 1.0, 0.5, 0.4, 0.3, 0.2, 0.1, 0.0,
        ]);
        assert_ne!(rec.max1idx, rec.max2idx);
        assert!(rec.max1idx < rec.max2idx);
        assert_eq!(rec.gtc, "AB");
    }

    #[test]
    fn max_tones_score_one() {
        let rec = record([
            9.0, 10.0, 8.0, 7.0, 6.0, 5.0, 4.0, 3.0, 2.0, 1.0, 0.5, 0.4, 0.3, 0.2, 0.1, 0.0,
        ]);
        assert_eq!(rec.scores[rec.max1idx], 1.0);
        assert_eq!(rec.scores[rec.max2idx], 1.0);
        for (i, &s) in rec.scores.iter().enumerate() {
            if i != rec.max1idx && i != rec.max2idx {
                assert!([0.0, 0.2, 0.4, 0.6, 0.8].contains(&s));
                if s == 0.0 {
                    assert!(rec.corr[i] <= rec.avg);
                }
            }
        }
    }

    #[test]
    fn gap_test_resists_near_tie_runner_up() {
        // max1 = 10.0 at index 1; two near-tied alternatives at indices 0
        // and 2 close to each other should not flip the runner-up pick
        // unless the gap condition is cleared.
        let rec = record([
            5.01, 10.0, 5.0, 1.0, 1.0, 1.0, 1.0, 1.0, 1.0, 1.0, 1.0, 1.0, 1.0, 1.0, 1.0, 1.0,
        ]);
        // index 0 (5.01) is scanned before index 2 (5.0): 5.0 - 5.01 is
        // negative, so index 0 remains the runner-up.
        assert_eq!(rec.max2idx.min(rec.max1idx), 0);
    }

    #[test]
    fn degenerate_frame_errors() {
        let templates = crate::template::ToneTemplates::generate(1225, 11025);
        let correlator = Correlator::new(&templates);
        let err = analyze_frame(&correlator, &[]).unwrap_err();
        assert!(matches!(err, SelcalError::DegenerateFrame));
    }
}
