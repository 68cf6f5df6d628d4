//! Score-threshold selection for induced word candidates.
//!
//! Mutual-information scores have no absolute meaning across corpora, so
//! the cutoff between "word" and "noise" is found empirically: candidates
//! are binned by score, each bin's precision is measured against a
//! reference lexicon, and the threshold is placed at the elbow where
//! precision first falls off.

use kanbun_segment::Lexicon;

use crate::collocation::ScoredNgram;

/// Precision of one score interval against the reference lexicon.
#[derive(Debug, Clone, PartialEq)]
pub struct IntervalStat {
    /// Inclusive lower score bound.
    pub lower: f64,
    /// Exclusive upper bound, except for the topmost interval.
    pub upper: f64,
    pub total: usize,
    pub attested: usize,
}

impl IntervalStat {
    pub fn precision(&self) -> f64 {
        if self.total == 0 {
            0.0
        } else {
            self.attested as f64 / self.total as f64
        }
    }
}

/// Bins candidates into `bins` equal-width score intervals, highest
/// scores first, counting how many in each interval the reference
/// lexicon attests.
pub fn coverage_profile(
    candidates: &[ScoredNgram],
    reference: &Lexicon,
    bins: usize,
) -> Vec<IntervalStat> {
    if candidates.is_empty() || bins == 0 {
        return Vec::new();
    }

    let lo = candidates.iter().map(|c| c.score).fold(f64::INFINITY, f64::min);
    let hi = candidates
        .iter()
        .map(|c| c.score)
        .fold(f64::NEG_INFINITY, f64::max);
    let width = (hi - lo) / bins as f64;

    let mut profile: Vec<IntervalStat> = (0..bins)
        .rev()
        .map(|i| IntervalStat {
            lower: lo + width * i as f64,
            upper: lo + width * (i + 1) as f64,
            total: 0,
            attested: 0,
        })
        .collect();

    for candidate in candidates {
        let idx = if width == 0.0 {
            0
        } else {
            let raw = ((candidate.score - lo) / width) as usize;
            // the top edge belongs to the top interval
            bins - 1 - raw.min(bins - 1)
        };
        profile[idx].total += 1;
        if !reference.lookup(&candidate.text).is_empty() {
            profile[idx].attested += 1;
        }
    }
    profile
}

/// Walks the profile from the highest interval down and returns the score
/// at which precision first drops by more than `drop_sensitivity` from
/// the running best. `None` means precision never falls off and every
/// candidate can be kept.
pub fn elbow_threshold(profile: &[IntervalStat], drop_sensitivity: f64) -> Option<f64> {
    let mut best: Option<f64> = None;
    for interval in profile {
        if interval.total == 0 {
            continue;
        }
        let precision = interval.precision();
        if let Some(best) = best {
            if best - precision > drop_sensitivity {
                tracing::debug!(
                    lower = interval.lower,
                    upper = interval.upper,
                    precision,
                    best,
                    "precision elbow found"
                );
                return Some(interval.upper);
            }
        }
        best = Some(best.map_or(precision, |b: f64| b.max(precision)));
    }
    None
}
