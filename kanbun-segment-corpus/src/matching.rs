//! Maximum-matching segmenters used to bootstrap a corpus.
//!
//! These produce a first-pass segmentation from a seed lexicon alone, with
//! no rule engine involved. Forward and backward greedy matching disagree
//! exactly where the text is ambiguous; [`BidirectionalMatcher`] arbitrates
//! those disagreements with a fixed cascade of tie-break rules.

use std::collections::HashMap;

use kanbun_segment::lexicon::{cells_of, Lexicon};

/// Greedy left-to-right longest match. Cells not covered by any entry
/// come out as single-character words.
pub fn forward_maximum_match(lexicon: &Lexicon, cells: &[String]) -> Vec<String> {
    let mut words = Vec::new();
    let mut pos = 0;
    while pos < cells.len() {
        let len = lexicon
            .matches_at(cells, pos)
            .first()
            .map(|(len, _)| *len)
            .unwrap_or(1);
        words.push(cells[pos..pos + len].concat());
        pos += len;
    }
    words
}

/// Greedy right-to-left longest match.
pub fn backward_maximum_match(lexicon: &Lexicon, cells: &[String]) -> Vec<String> {
    let max = lexicon.max_entry_len().max(1);
    let mut words = Vec::new();
    let mut end = cells.len();
    while end > 0 {
        let mut len = 1;
        for candidate in (2..=max.min(end)).rev() {
            let text = cells[end - candidate..end].concat();
            if !lexicon.lookup(&text).is_empty() {
                len = candidate;
                break;
            }
        }
        words.push(cells[end - len..end].concat());
        end -= len;
    }
    words.reverse();
    words
}

/// Word frequency counts, at document or corpus scope.
#[derive(Debug, Default, Clone)]
pub struct FrequencyTable {
    counts: HashMap<String, u64>,
}

impl FrequencyTable {
    pub fn new() -> Self {
        Self::default()
    }

    pub fn from_words<I, S>(words: I) -> Self
    where
        I: IntoIterator<Item = S>,
        S: Into<String>,
    {
        let mut table = Self::new();
        for word in words {
            table.observe(word.into());
        }
        table
    }

    pub fn observe(&mut self, word: impl Into<String>) {
        *self.counts.entry(word.into()).or_insert(0) += 1;
    }

    pub fn count(&self, word: &str) -> u64 {
        self.counts.get(word).copied().unwrap_or(0)
    }

    /// Summed frequency of the multi-character words in a segmentation.
    /// Single characters carry no evidence either way and are skipped.
    fn weight(&self, words: &[String]) -> u64 {
        words
            .iter()
            .filter(|w| cells_of(w).len() > 1)
            .map(|w| self.count(w))
            .sum()
    }
}

/// Arbitrates between forward and backward maximum matching.
///
/// When the two directions disagree, the first tie-break rule that
/// distinguishes them wins:
///
/// 1. fewer words,
/// 2. a longer longest word,
/// 3. higher document-frequency weight,
/// 4. higher corpus-frequency weight,
/// 5. otherwise the forward result.
pub struct BidirectionalMatcher<'a> {
    lexicon: &'a Lexicon,
    document_frequency: &'a FrequencyTable,
    corpus_frequency: &'a FrequencyTable,
}

impl<'a> BidirectionalMatcher<'a> {
    pub fn new(
        lexicon: &'a Lexicon,
        document_frequency: &'a FrequencyTable,
        corpus_frequency: &'a FrequencyTable,
    ) -> Self {
        Self {
            lexicon,
            document_frequency,
            corpus_frequency,
        }
    }

    pub fn segment(&self, cells: &[String]) -> Vec<String> {
        let forward = forward_maximum_match(self.lexicon, cells);
        let backward = backward_maximum_match(self.lexicon, cells);
        if forward == backward {
            return forward;
        }

        if forward.len() != backward.len() {
            tracing::debug!(
                forward = forward.len(),
                backward = backward.len(),
                "direction disagreement resolved by word count"
            );
            return if forward.len() < backward.len() {
                forward
            } else {
                backward
            };
        }

        let longest = |words: &[String]| {
            words.iter().map(|w| cells_of(w).len()).max().unwrap_or(0)
        };
        let (f_max, b_max) = (longest(&forward), longest(&backward));
        if f_max != b_max {
            return if f_max > b_max { forward } else { backward };
        }

        let f_doc = self.document_frequency.weight(&forward);
        let b_doc = self.document_frequency.weight(&backward);
        if f_doc != b_doc {
            return if f_doc > b_doc { forward } else { backward };
        }

        let f_corpus = self.corpus_frequency.weight(&forward);
        let b_corpus = self.corpus_frequency.weight(&backward);
        if f_corpus != b_corpus {
            return if f_corpus > b_corpus { forward } else { backward };
        }

        forward
    }
}
