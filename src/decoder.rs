//! Two tandem one-second sliding windows over `TonesRecord`s, with two
//! parallel decision methods (dominant-tone-count and summed-score) and
//! rising/falling edge hysteresis so each SELCAL decode is logged once.
//!
//! Grounded in `tones.py::TonesMonitor` (`trackByMaxTones`, `trackByScore`,
//! `top2`, `incCounter`/`decCounter`, `incScores`/`decScores`), with two
//! fixes over that reference: eviction *decrements* the running max-tone
//! counts (the Python increments them there, which double-counts evicted
//! frames), and falling-edge reset zeroes all four running arrays (the
//! Python zeroes `tonesQ1MaxCnt` twice and never touches `tonesQ2MaxCnt`).

use std::collections::VecDeque;

use crate::frame::TonesRecord;
use crate::tone_table::{tgc, TONE_COUNT};

/// Insertion-order-preserving TGC -> count map. The Python relies on
/// CPython 3.7+ dict insertion order for its "ties broken by first
/// insertion" tie-break; `std::collections::HashMap` iteration order is
/// unspecified, so this keeps an explicit `Vec` instead. At most
/// 16*15/2 = 120 possible codes, so a linear scan is cheap.
#[derive(Debug, Clone, Default)]
struct GroupCounter {
    entries: Vec<(String, u32)>,
}

impl GroupCounter {
    fn increment(&mut self, gtc: &str) {
        if let Some(entry) = self.entries.iter_mut().find(|(k, _)| k == gtc) {
            entry.1 += 1;
        } else {
            self.entries.push((gtc.to_string(), 1));
        }
    }

    fn decrement(&mut self, gtc: &str) {
        if let Some(entry) = self.entries.iter_mut().find(|(k, _)| k == gtc) {
            entry.1 = entry.1.saturating_sub(1);
        }
    }

    fn clear_counts(&mut self) {
        self.entries.clear();
    }

    fn sum(&self) -> u32 {
        self.entries.iter().map(|(_, c)| c).sum()
    }

    /// Highest count, excluding `exclude` if given; ties keep the first
    /// (earliest-inserted) entry encountered.
    fn argmax_excluding(&self, exclude: Option<&str>) -> (Option<String>, u32) {
        let mut best: Option<(&str, u32)> = None;
        for (gtc, count) in &self.entries {
            if exclude == Some(gtc.as_str()) {
                continue;
            }
            if *count > best.map_or(0, |(_, c)| c) {
                best = Some((gtc.as_str(), *count));
            }
        }
        match best {
            Some((gtc, count)) => (Some(gtc.to_string()), count),
            None => (None, 0),
        }
    }
}

/// Result of one method's decision for a single call to `track`.
#[derive(Debug, Clone, PartialEq)]
pub struct MethodResult {
    pub is_active: bool,
    pub selcal: Option<String>,
}

/// Output of one `DecoderState::track` call.
#[derive(Debug, Clone)]
pub struct DecoderOutput {
    pub current_tgc: String,
    pub by_max_tone: MethodResult,
    pub by_score: MethodResult,
    pub tg1: Option<String>,
    pub tg1_cnt: u32,
    pub tg2: Option<String>,
    pub tg2_cnt: u32,
}

/// Owned, per-stream decoder state. Created once per stream, mutated only
/// via `track`, discarded at end of stream.
#[derive(Debug, Clone)]
pub struct DecoderState {
    q1: VecDeque<TonesRecord>,
    q2: VecDeque<TonesRecord>,
    cnt1: GroupCounter,
    cnt2: GroupCounter,
    score_q1: [f64; TONE_COUNT],
    score_q2: [f64; TONE_COUNT],
    max_cnt_q1: [u32; TONE_COUNT],
    max_cnt_q2: [u32; TONE_COUNT],
    last_selcal_max_tone: Option<(String, String)>,
    last_selcal_by_score: Option<(String, String)>,
}

impl Default for DecoderState {
    fn default() -> Self {
        DecoderState {
            q1: VecDeque::new(),
            q2: VecDeque::new(),
            cnt1: GroupCounter::default(),
            cnt2: GroupCounter::default(),
            score_q1: [0.0; TONE_COUNT],
            score_q2: [0.0; TONE_COUNT],
            max_cnt_q1: [0; TONE_COUNT],
            max_cnt_q2: [0; TONE_COUNT],
            last_selcal_max_tone: None,
            last_selcal_by_score: None,
        }
    }
}

impl DecoderState {
    pub fn new() -> DecoderState {
        DecoderState::default()
    }

    fn add_scores(scores: &mut [f64; TONE_COUNT], max_cnt: &mut [u32; TONE_COUNT], rec: &TonesRecord) {
        for i in 0..TONE_COUNT {
            scores[i] += rec.scores[i];
        }
        max_cnt[rec.max1idx] += 1;
        max_cnt[rec.max2idx] += 1;
    }

    fn remove_scores(scores: &mut [f64; TONE_COUNT], max_cnt: &mut [u32; TONE_COUNT], rec: &TonesRecord) {
        for i in 0..TONE_COUNT {
            scores[i] = (scores[i] - rec.scores[i]).max(0.0);
        }
        max_cnt[rec.max1idx] = max_cnt[rec.max1idx].saturating_sub(1);
        max_cnt[rec.max2idx] = max_cnt[rec.max2idx].saturating_sub(1);
    }

    fn reset_scores(&mut self) {
        self.score_q1 = [0.0; TONE_COUNT];
        self.score_q2 = [0.0; TONE_COUNT];
        self.max_cnt_q1 = [0; TONE_COUNT];
        self.max_cnt_q2 = [0; TONE_COUNT];
    }

    /// Feed one new `TonesRecord` through the sliding windows and both
    /// decision methods, returning the combined decode output.
    pub fn track(
        &mut self,
        trec: TonesRecord,
        window_size: usize,
        min_group_cnt: u32,
        min_score: f64,
    ) -> DecoderOutput {
        let current_tgc = trec.gtc.clone();

        // --- Queue maintenance: push into Q2, evict the oldest into Q1,
        // evict Q1's oldest once it also overflows. ---
        self.cnt2.increment(&trec.gtc);
        Self::add_scores(&mut self.score_q2, &mut self.max_cnt_q2, &trec);
        self.q2.push_back(trec);

        if self.q2.len() > window_size {
            let old2 = self.q2.pop_front().expect("just checked len > window_size");
            self.cnt2.decrement(&old2.gtc);
            Self::remove_scores(&mut self.score_q2, &mut self.max_cnt_q2, &old2);

            self.cnt1.increment(&old2.gtc);
            Self::add_scores(&mut self.score_q1, &mut self.max_cnt_q1, &old2);
            self.q1.push_back(old2);

            if self.q1.len() > window_size {
                let old1 = self.q1.pop_front().expect("just checked len > window_size");
                self.cnt1.decrement(&old1.gtc);
                Self::remove_scores(&mut self.score_q1, &mut self.max_cnt_q1, &old1);
            }
        }

        let by_max_tone = self.track_by_max_tone(min_group_cnt);
        let by_score = self.track_by_score(min_score);

        DecoderOutput {
            current_tgc,
            tg1: by_max_tone.tg1.clone(),
            tg1_cnt: by_max_tone.tg1_cnt,
            tg2: by_max_tone.tg2.clone(),
            tg2_cnt: by_max_tone.tg2_cnt,
            by_max_tone: by_max_tone.result,
            by_score,
        }
    }

    fn track_by_max_tone(&mut self, min_group_cnt: u32) -> MaxToneOutcome {
        let (q2_max, q2_max_cnt) = self.cnt2.argmax_excluding(None);
        let (q1_max, q1_max_cnt) = self.cnt1.argmax_excluding(q2_max.as_deref());

        let active = q1_max_cnt >= min_group_cnt
            && q2_max_cnt >= min_group_cnt
            && q1_max != q2_max
            && q1_max.is_some()
            && q2_max.is_some();

        let result = if active {
            let selcal = tgc_pair(q1_max.as_deref().unwrap(), q2_max.as_deref().unwrap());
            if self.last_selcal_max_tone.is_none() {
                self.last_selcal_max_tone =
                    Some((q1_max.clone().unwrap(), q2_max.clone().unwrap()));
                tracing::info!(selcal = %selcal, method = "by_max_tone", "SELCAL detected");
            }
            MethodResult {
                is_active: true,
                selcal: Some(selcal),
            }
        } else {
            if self.last_selcal_max_tone.is_some() {
                self.cnt1.clear_counts();
                self.cnt2.clear_counts();
                self.last_selcal_max_tone = None;
            }
            MethodResult {
                is_active: false,
                selcal: None,
            }
        };

        MaxToneOutcome {
            result,
            tg1: q1_max,
            tg1_cnt: q1_max_cnt,
            tg2: q2_max,
            tg2_cnt: q2_max_cnt,
        }
    }

    fn track_by_score(&mut self, min_score: f64) -> MethodResult {
        let (q1_idx, q1_val) = top2(&self.score_q1, &[]);
        let (q2_idx, q2_val) = top2(&self.score_q2, &q1_idx);

        let all_above_threshold = q1_val.iter().chain(q2_val.iter()).all(|&v| v >= min_score);
        let disjoint = !q1_idx.contains(&q2_idx[0]) && !q1_idx.contains(&q2_idx[1]);

        if all_above_threshold && disjoint {
            let first_pair = tgc(q1_idx[0], q1_idx[1]);
            let second_pair = tgc(q2_idx[0], q2_idx[1]);
            let selcal = format!("{first_pair}-{second_pair}");

            if self.last_selcal_by_score.is_none() {
                self.last_selcal_by_score = Some((first_pair, second_pair));
                tracing::info!(selcal = %selcal, method = "by_score", "SELCAL detected");
            }
            MethodResult {
                is_active: true,
                selcal: Some(selcal),
            }
        } else {
            if self.last_selcal_by_score.is_some() {
                self.reset_scores();
                self.last_selcal_by_score = None;
            }
            MethodResult {
                is_active: false,
                selcal: None,
            }
        }
    }
}

struct MaxToneOutcome {
    result: MethodResult,
    tg1: Option<String>,
    tg1_cnt: u32,
    tg2: Option<String>,
    tg2_cnt: u32,
}

fn tgc_pair(a: &str, b: &str) -> String {
    format!("{a}-{b}")
}

/// Top-two tone indices by score value, ascending index order, excluding
/// any index already in `excluded`. Grounded in `tones.py::top2`.
fn top2(values: &[f64; TONE_COUNT], excluded: &[usize]) -> ([usize; 2], [f64; 2]) {
    let mut idx1: Option<usize> = None;
    let mut max1 = -1.0f64;
    let mut idx2: Option<usize> = None;
    let mut max2 = -1.0f64;

    for (tone, &value) in values.iter().enumerate() {
        if excluded.contains(&tone) {
            continue;
        }
        if value > max1 {
            if idx1.is_some() {
                max2 = max1;
                idx2 = idx1;
            }
            max1 = value;
            idx1 = Some(tone);
        } else if value > max2 {
            max2 = value;
            idx2 = Some(tone);
        }
    }

    let (mut i1, mut i2) = (idx1.unwrap_or(0), idx2.unwrap_or(0));
    if i1 > i2 {
        std::mem::swap(&mut i1, &mut i2);
    }
    ([i1, i2], [values[i1], values[i2]])
}
