//! Segmentation candidate generation.
//!
//! For a window of source cells, the generator proposes every
//! boundary-consistent segmentation: at each position, all lexicon-backed
//! merges that fit inside the window, plus the single-character fallback.
//! Overlapping lexicon matches (a substring that is itself a different
//! entry) are all emitted as separate candidates — this component never
//! picks a winner, that is the rule engine's job.
//!
//! The search is bounded: merges longer than the lexicon's longest entry
//! are never proposed, and the engine only hands the generator word-sized
//! windows, so the candidate set stays a small explicit collection rather
//! than a backtracking structure.

use crate::lexicon::{CohesionClass, Lexicon};
use crate::rules::RuleId;
use crate::span::CharSpan;

/// One proposed word: a span plus the cohesion class of the lexicon entry
/// backing it, or `None` for a bare single-character fallback.
#[derive(Debug, Clone, Copy, PartialEq, Eq)]
pub struct Segment {
    pub span: CharSpan,
    pub class: Option<CohesionClass>,
}

impl Segment {
    pub fn backed(span: CharSpan, class: CohesionClass) -> Self {
        Self {
            span,
            class: Some(class),
        }
    }

    pub fn fallback(span: CharSpan) -> Self {
        Self { span, class: None }
    }
}

/// An ordered, gap-free, overlap-free sequence of segments covering one
/// source window, with the rule trace and confidence filled in by the rule
/// engine.
#[derive(Debug, Clone, PartialEq)]
pub struct SegmentationCandidate {
    pub segments: Vec<Segment>,
    /// Rules that fired on this candidate, in priority order.
    pub trace: Vec<RuleId>,
    /// Count of rules endorsing minus rules rejecting; engine-assigned.
    pub confidence: i32,
}

impl SegmentationCandidate {
    pub fn new(segments: Vec<Segment>) -> Self {
        Self {
            segments,
            trace: Vec::new(),
            confidence: 0,
        }
    }

    /// True when the candidate is a single merged segment.
    pub fn is_merge(&self) -> bool {
        self.segments.len() == 1
    }

    /// True when every segment is a single character.
    pub fn is_full_split(&self) -> bool {
        self.segments.iter().all(|s| s.span.len() == 1)
    }

    pub fn spans(&self) -> Vec<CharSpan> {
        self.segments.iter().map(|s| s.span).collect()
    }
}

/// Generates all boundary-consistent segmentations of a window.
#[derive(Debug, Clone, Copy)]
pub struct CandidateGenerator<'a> {
    lexicon: &'a Lexicon,
}

impl<'a> CandidateGenerator<'a> {
    pub fn new(lexicon: &'a Lexicon) -> Self {
        Self { lexicon }
    }

    /// Enumerates every candidate covering `window` over `cells`,
    /// coarsest first (maximal lexicon merges before char-by-char).
    pub fn generate(&self, cells: &[String], window: CharSpan) -> Vec<SegmentationCandidate> {
        let mut out = Vec::new();
        let mut prefix = Vec::new();
        self.extend(cells, window, window.start, &mut prefix, &mut out);

        // Coarsest first: fewer segments, then longer leading segments.
        out.sort_by(|a, b| {
            a.segments
                .len()
                .cmp(&b.segments.len())
                .then_with(|| {
                    let a_lens: Vec<usize> = a.segments.iter().map(|s| s.span.len()).collect();
                    let b_lens: Vec<usize> = b.segments.iter().map(|s| s.span.len()).collect();
                    b_lens.cmp(&a_lens)
                })
        });
        out
    }

    fn extend(
        &self,
        cells: &[String],
        window: CharSpan,
        pos: usize,
        prefix: &mut Vec<Segment>,
        out: &mut Vec<SegmentationCandidate>,
    ) {
        if pos == window.end {
            out.push(SegmentationCandidate::new(prefix.clone()));
            return;
        }

        let matches = self.lexicon.matches_at(cells, pos);
        let mut single_covered = false;
        for (len, entry) in &matches {
            if pos + len > window.end {
                continue;
            }
            if *len == 1 {
                single_covered = true;
            }
            prefix.push(Segment::backed(CharSpan::new(pos, pos + len), entry.class));
            self.extend(cells, window, pos + len, prefix, out);
            prefix.pop();
        }

        // Single-character fallback, unless a one-cell entry already covers it.
        if !single_covered {
            prefix.push(Segment::fallback(CharSpan::new(pos, pos + 1)));
            self.extend(cells, window, pos + 1, prefix, out);
            prefix.pop();
        }
    }
}
