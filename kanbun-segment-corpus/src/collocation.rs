//! Mutual-information scoring of character n-grams.
//!
//! Word candidates are extracted from raw text by scoring how much more
//! often a character sequence occurs than its parts would predict.
//! Bigrams use plain pointwise mutual information; longer n-grams use the
//! minimum over all binary splits, so a sequence only scores high when
//! *every* way of cutting it apart loses information.

use std::collections::HashMap;

use kanbun_segment::lexicon::cells_of;
use serde::{Deserialize, Serialize};

/// An n-gram candidate with its corpus evidence.
#[derive(Debug, Clone, PartialEq, Serialize, Deserialize)]
pub struct ScoredNgram {
    pub text: String,
    pub frequency: u64,
    pub score: f64,
}

/// N-gram counts over a corpus, and the scores derived from them.
#[derive(Debug, Default)]
pub struct CollocationScorer {
    counts: HashMap<String, u64>,
    /// Number of length-k windows observed, keyed by k.
    windows: HashMap<usize, u64>,
    max_len: usize,
}

impl CollocationScorer {
    /// Counts every n-gram of length `1..=max_len` in the given texts.
    /// N-grams never cross a text boundary, so punctuation-split input
    /// keeps collocations within their clause.
    pub fn from_texts<'a>(texts: impl IntoIterator<Item = &'a str>, max_len: usize) -> Self {
        let mut scorer = Self {
            max_len,
            ..Self::default()
        };
        for text in texts {
            let cells = cells_of(text);
            for len in 1..=max_len.min(cells.len()) {
                for start in 0..=cells.len() - len {
                    let gram = cells[start..start + len].concat();
                    *scorer.counts.entry(gram).or_insert(0) += 1;
                    *scorer.windows.entry(len).or_insert(0) += 1;
                }
            }
        }
        scorer
    }

    pub fn frequency(&self, gram: &str) -> u64 {
        self.counts.get(gram).copied().unwrap_or(0)
    }

    /// Relative frequency of `gram` among windows of its own length.
    fn probability(&self, gram: &str) -> Option<f64> {
        let len = cells_of(gram).len();
        let count = self.frequency(gram);
        let windows = self.windows.get(&len).copied().unwrap_or(0);
        (count > 0 && windows > 0).then(|| count as f64 / windows as f64)
    }

    /// Pointwise mutual information of the pair, `None` when either side
    /// or the pair itself was never observed.
    pub fn mutual_information(&self, left: &str, right: &str) -> Option<f64> {
        let joint = self.probability(&format!("{left}{right}"))?;
        let p_left = self.probability(left)?;
        let p_right = self.probability(right)?;
        Some((joint / (p_left * p_right)).log2())
    }

    /// Minimum mutual information over every binary split of `gram`.
    /// For a bigram this degenerates to plain pointwise MI.
    pub fn min_mutual_information(&self, gram: &str) -> Option<f64> {
        let cells = cells_of(gram);
        if cells.len() < 2 {
            return None;
        }
        let mut worst: Option<f64> = None;
        for cut in 1..cells.len() {
            let mi = self.mutual_information(&cells[..cut].concat(), &cells[cut..].concat())?;
            worst = Some(match worst {
                Some(w) => w.min(mi),
                None => mi,
            });
        }
        worst
    }

    /// All n-grams of the given length at or above the frequency floor,
    /// scored and sorted best first.
    pub fn candidates(&self, len: usize, min_frequency: u64) -> Vec<ScoredNgram> {
        debug_assert!(len >= 2 && len <= self.max_len);
        let mut out: Vec<ScoredNgram> = self
            .counts
            .iter()
            .filter(|(gram, count)| {
                **count >= min_frequency && cells_of(gram).len() == len
            })
            .filter_map(|(gram, count)| {
                self.min_mutual_information(gram).map(|score| ScoredNgram {
                    text: gram.clone(),
                    frequency: *count,
                    score,
                })
            })
            .collect();
        out.sort_by(|a, b| {
            b.score
                .partial_cmp(&a.score)
                .unwrap_or(std::cmp::Ordering::Equal)
                .then_with(|| b.frequency.cmp(&a.frequency))
                .then_with(|| a.text.cmp(&b.text))
        });
        out
    }
}

#[cfg(test)]
mod tests {
    use super::*;

    #[test]
    fn frequent_pairs_outscore_chance_pairs() {
        // 天下 recurs as a unit; 下大 occurs once across a boundary
        let texts = ["天下大勢", "天下太平", "天下歸心", "大道廢"];
        let scorer = CollocationScorer::from_texts(texts, 2);

        assert_eq!(scorer.frequency("天下"), 3);
        let cohesive = scorer.mutual_information("天", "下").unwrap();
        let incidental = scorer.mutual_information("下", "大").unwrap();
        assert!(cohesive > incidental);
    }

    #[test]
    fn unseen_grams_score_none() {
        let scorer = CollocationScorer::from_texts(["天下"], 2);
        assert!(scorer.mutual_information("天", "地").is_none());
        assert!(scorer.min_mutual_information("天").is_none());
    }

    #[test]
    fn min_mutual_information_takes_the_weakest_split() {
        let texts = ["般若波羅蜜", "般若波羅蜜", "波羅有期"];
        let scorer = CollocationScorer::from_texts(texts, 5);

        let whole = scorer.min_mutual_information("般若波").unwrap();
        let split_a = scorer.mutual_information("般", "若波").unwrap();
        let split_b = scorer.mutual_information("般若", "波").unwrap();
        assert!((whole - split_a.min(split_b)).abs() < 1e-9);
    }

    #[test]
    fn candidates_respect_the_frequency_floor() {
        let texts = ["天下大勢", "天下太平", "天下歸心", "大道廢"];
        let scorer = CollocationScorer::from_texts(texts, 2);

        let frequent = scorer.candidates(2, 2);
        assert_eq!(frequent.len(), 1);
        assert_eq!(frequent[0].text, "天下");

        let all = scorer.candidates(2, 1);
        assert!(all.len() > 1);
        assert!(all.iter().any(|c| c.text == "天下"));
        assert!(all.windows(2).all(|pair| pair[0].score >= pair[1].score));
    }
}
