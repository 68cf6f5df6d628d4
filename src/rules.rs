//! The rule engine: converts segmentation candidates into decisions.
//!
//! Rules apply in fixed priority order; the numbering below is the
//! tie-break order, earlier wins:
//!
//! 1. **Fixed-collocation override** — whitelisted collocations and idioms
//!    merge whole.
//! 2. **Subject + saying-verb exception** — a verb of saying preceded by a
//!    subject always splits at the subject/verb boundary; only the
//!    whitelisted discourse-marker forms (rule 1) are exempt.
//! 3. **Proper-noun cohesion** — personal names, places/institutions, and
//!    time words merge.
//! 4. **Transliteration completeness** — transliterations merge when
//!    complete; truncated ones split to single characters as noise.
//! 5. **Syllable-count ceiling** — unlisted runs of four or more
//!    characters are forced apart into sub-spans shorter than four.
//! 6. **Loose-structure split** — verb + dynamic particle and verb +
//!    complement patterns split before the particle.
//! 7. **Consistency check** — a precedent conflicting with the rule-derived
//!    decision downgrades the span to uncertain with both options recorded.
//! 8. **Default** — nothing decisive: uncertain.
//!
//! A candidate's confidence score is the count of rules 1–6 endorsing it
//! minus the count rejecting it. Equal scores break ties by the priority of
//! the earliest endorsing rule, never by score magnitude.

use std::collections::HashSet;

use once_cell::sync::Lazy;
use serde::{Deserialize, Serialize};

use crate::candidate::{CandidateGenerator, SegmentationCandidate};
use crate::consistency::{ConsistencyIndex, StructuralPattern};
use crate::lexicon::{CohesionClass, Lexicon};
use crate::span::{CharSpan, DocId, SpanKey};

/// The literal marker annotators attach to spans awaiting adjudication.
pub const UNCERTAIN_MARKER: &str = "[?]";

/// Verbs of saying that trigger the subject/verb split (rule 2).
static SAYING_VERBS: Lazy<HashSet<&'static str>> =
    Lazy::new(|| ["曰", "云", "言", "謂", "道"].into_iter().collect());

/// Dynamic particles following a verb (rule 6).
static DYNAMIC_PARTICLES: Lazy<HashSet<&'static str>> =
    Lazy::new(|| ["了", "著", "着", "過", "过", "却"].into_iter().collect());

/// Complement morphemes following a verb (rule 6).
static COMPLEMENT_MORPHEMES: Lazy<HashSet<&'static str>> =
    Lazy::new(|| ["得", "來", "来", "去", "出", "入", "上", "下"].into_iter().collect());

/// Lacuna and corruption marks; a transliteration touching one is treated
/// as truncated (rule 4).
static CORRUPTION_MARKERS: Lazy<HashSet<&'static str>> =
    Lazy::new(|| ["□", "■", "○", "●", "〼"].into_iter().collect());

/// Longest sub-span the syllable ceiling tolerates for unlisted runs.
const SYLLABLE_CEILING: usize = 4;

/// Whether a cell attaches to the word before it for boundary purposes:
/// saying verbs (rule 2) and verb-attached function characters (rule 6).
/// The document scanner pulls such a cell into the preceding window so
/// the boundary rules can see the pair.
pub(crate) fn attaches_to_previous(cell: &str) -> bool {
    SAYING_VERBS.contains(cell)
        || DYNAMIC_PARTICLES.contains(cell)
        || COMPLEMENT_MORPHEMES.contains(cell)
}

/// Identifies which guideline rule produced or endorsed a decision.
#[derive(Debug, Clone, Copy, PartialEq, Eq, Hash, Serialize, Deserialize)]
pub enum RuleId {
    FixedCollocation,
    SubjectSaidSplit,
    ProperNounCohesion,
    TransliterationCompleteness,
    SyllableCeiling,
    LooseStructureSplit,
    ConsistencyCheck,
    Default,
}

impl RuleId {
    /// Position in the guideline's fixed priority order; lower wins ties.
    pub fn priority(&self) -> u8 {
        match self {
            RuleId::FixedCollocation => 1,
            RuleId::SubjectSaidSplit => 2,
            RuleId::ProperNounCohesion => 3,
            RuleId::TransliterationCompleteness => 4,
            RuleId::SyllableCeiling => 5,
            RuleId::LooseStructureSplit => 6,
            RuleId::ConsistencyCheck => 7,
            RuleId::Default => 8,
        }
    }

    pub fn description(&self) -> &'static str {
        match self {
            RuleId::FixedCollocation => "fixed-collocation override",
            RuleId::SubjectSaidSplit => "subject + saying-verb split",
            RuleId::ProperNounCohesion => "proper-noun cohesion",
            RuleId::TransliterationCompleteness => "transliteration completeness",
            RuleId::SyllableCeiling => "syllable-count ceiling",
            RuleId::LooseStructureSplit => "loose-structure split",
            RuleId::ConsistencyCheck => "consistency precedent",
            RuleId::Default => "no decisive rule",
        }
    }
}

/// The chosen boundary treatment for a span.
#[derive(Debug, Clone, Copy, PartialEq, Eq, Hash, Serialize, Deserialize)]
pub enum Ruling {
    Merge,
    Split,
}

/// Lifecycle of a decision.
#[derive(Debug, Clone, PartialEq, Serialize, Deserialize)]
pub enum DecisionStatus {
    Confident,
    /// Carries the literal marker used during independent annotation.
    Uncertain { marker: String },
    Adjudicated {
        adjudicator: String,
        rationale: String,
    },
}

impl DecisionStatus {
    pub fn uncertain() -> Self {
        DecisionStatus::Uncertain {
            marker: UNCERTAIN_MARKER.to_string(),
        }
    }

    pub fn is_uncertain(&self) -> bool {
        matches!(self, DecisionStatus::Uncertain { .. })
    }
}

/// One competing option recorded on an uncertain span.
#[derive(Debug, Clone, PartialEq, Serialize, Deserialize)]
pub struct RulingOption {
    pub ruling: Ruling,
    pub segments: Vec<CharSpan>,
    /// Where the option came from: a rule description or `"precedent"`.
    pub source: String,
}

/// One decision about one span. Append-only: corrections never mutate a
/// record, they append a superseding one in the ledger.
#[derive(Debug, Clone, PartialEq, Serialize, Deserialize)]
pub struct DecisionRecord {
    pub key: SpanKey,
    pub ruling: Ruling,
    /// The chosen sub-spans; a merge has exactly one.
    pub segments: Vec<CharSpan>,
    /// Cohesion class of the lexicon entry backing a merge, when any.
    pub class: Option<CohesionClass>,
    pub justification: RuleId,
    pub status: DecisionStatus,
    pub pattern: StructuralPattern,
    /// Competing options, populated on uncertain spans.
    pub alternatives: Vec<RulingOption>,
}

impl DecisionRecord {
    pub fn is_confident(&self) -> bool {
        matches!(self.status, DecisionStatus::Confident)
    }
}

#[derive(Debug, Clone, Copy, PartialEq, Eq)]
enum Vote {
    Endorse,
    Reject,
    Abstain,
}

/// Window-level facts shared by all rule votes on one span.
struct WindowContext {
    len: usize,
    /// Rule 1: exact FixedCollocation match (the rule-2 whitelist).
    fixed_collocation: bool,
    /// Rule 1 also keeps idioms whole, unless rule 2 context applies.
    idiom: bool,
    /// Rule 3: exact proper-noun match of the whole window.
    proper_noun: bool,
    /// Rule 4.
    transliteration: bool,
    truncated: bool,
    /// Rule 2: absolute index of a trailing saying verb, if any.
    saying_boundary: Option<usize>,
    /// Rule 6: absolute index of a trailing particle/complement, if any.
    loose_boundary: Option<usize>,
}

/// Applies the ordered rule set to one span at a time.
pub struct RuleEngine<'a> {
    lexicon: &'a Lexicon,
    index: &'a ConsistencyIndex,
}

impl<'a> RuleEngine<'a> {
    pub fn new(lexicon: &'a Lexicon, index: &'a ConsistencyIndex) -> Self {
        Self { lexicon, index }
    }

    /// Decides the segmentation of `window` within `cells`, producing
    /// exactly one decision record (confident or uncertain).
    ///
    /// Side effect: a confident decision that establishes a new structural
    /// pattern records a precedent in the consistency index.
    pub fn decide(&self, doc: &DocId, cells: &[String], window: CharSpan) -> DecisionRecord {
        // An empty window has nothing to decide; refuse it instead of
        // letting the candidate search underflow.
        if window.is_empty() {
            tracing::warn!(doc = %doc, %window, "empty decision window refused");
            return DecisionRecord {
                key: SpanKey::new(doc.clone(), window),
                ruling: Ruling::Merge,
                segments: Vec::new(),
                class: None,
                justification: RuleId::Default,
                status: DecisionStatus::uncertain(),
                pattern: StructuralPattern::new(""),
                alternatives: Vec::new(),
            };
        }

        let ctx = self.window_context(cells, window);
        let generator = CandidateGenerator::new(self.lexicon);
        let mut candidates = generator.generate(cells, window);

        for candidate in &mut candidates {
            for rule in [
                RuleId::FixedCollocation,
                RuleId::SubjectSaidSplit,
                RuleId::ProperNounCohesion,
                RuleId::TransliterationCompleteness,
                RuleId::SyllableCeiling,
                RuleId::LooseStructureSplit,
            ] {
                match self.vote(rule, candidate, &ctx) {
                    Vote::Endorse => {
                        candidate.confidence += 1;
                        candidate.trace.push(rule);
                    }
                    Vote::Reject => candidate.confidence -= 1,
                    Vote::Abstain => {}
                }
            }
        }

        let winner = Self::pick_winner(&candidates);
        let key = SpanKey::new(doc.clone(), window);
        let pattern = self.structural_pattern(cells, window);
        let ruling = if winner.is_merge() {
            Ruling::Merge
        } else {
            Ruling::Split
        };
        let endorsement = winner.trace.first().copied();
        let class = if winner.is_merge() {
            winner.segments.first().and_then(|s| s.class)
        } else {
            None
        };
        let precedent = self.index.lookup_precedent(&pattern);

        // Windows with a single boundary-consistent reading carry no
        // ambiguity; they are confident even without an endorsement, but a
        // conflicting precedent still downgrades them below.
        let decisive = endorsement.is_some() || candidates.len() == 1;

        match (decisive, precedent) {
            (true, Some(prec)) if prec == ruling => DecisionRecord {
                key,
                ruling,
                segments: winner.spans(),
                class,
                justification: endorsement.unwrap_or(RuleId::Default),
                status: DecisionStatus::Confident,
                pattern,
                alternatives: Vec::new(),
            },
            (true, Some(prec)) => {
                // Rule 7: never silently override either side.
                let derived_source = endorsement
                    .map(|r| r.description().to_string())
                    .unwrap_or_else(|| "sole candidate".to_string());
                tracing::info!(
                    key = %key,
                    pattern = %pattern,
                    derived = ?ruling,
                    precedent = ?prec,
                    "rule decision conflicts with precedent; span marked uncertain"
                );
                DecisionRecord {
                    key,
                    ruling,
                    segments: winner.spans(),
                    class: None,
                    justification: RuleId::ConsistencyCheck,
                    status: DecisionStatus::uncertain(),
                    pattern,
                    alternatives: vec![
                        RulingOption {
                            ruling,
                            segments: winner.spans(),
                            source: derived_source,
                        },
                        RulingOption {
                            ruling: prec,
                            segments: self.segments_for(prec, &candidates, window),
                            source: "precedent".to_string(),
                        },
                    ],
                }
            }
            (true, None) => {
                let record = DecisionRecord {
                    key: key.clone(),
                    ruling,
                    segments: winner.spans(),
                    class,
                    justification: endorsement.unwrap_or(RuleId::Default),
                    status: DecisionStatus::Confident,
                    pattern: pattern.clone(),
                    alternatives: Vec::new(),
                };
                self.index.record_precedent(pattern, ruling, key);
                record
            }
            (false, Some(prec)) => {
                // Rule 7, agreeing direction: no rule fired, precedent
                // carries the span on its own.
                let class = match prec {
                    Ruling::Merge => candidates
                        .iter()
                        .find(|c| c.is_merge())
                        .and_then(|c| c.segments.first().and_then(|s| s.class)),
                    Ruling::Split => None,
                };
                DecisionRecord {
                    key,
                    ruling: prec,
                    segments: self.segments_for(prec, &candidates, window),
                    class,
                    justification: RuleId::ConsistencyCheck,
                    status: DecisionStatus::Confident,
                    pattern,
                    alternatives: Vec::new(),
                }
            }
            (false, None) => {
                // Rule 8: surface every competing reading for review.
                let alternatives = candidates
                    .iter()
                    .take(2)
                    .map(|c| RulingOption {
                        ruling: if c.is_merge() { Ruling::Merge } else { Ruling::Split },
                        segments: c.spans(),
                        source: "candidate".to_string(),
                    })
                    .collect();
                DecisionRecord {
                    key,
                    ruling,
                    segments: winner.spans(),
                    class: None,
                    justification: RuleId::Default,
                    status: DecisionStatus::uncertain(),
                    pattern,
                    alternatives,
                }
            }
        }
    }

    /// Structural pattern of a window: greedy longest lexicon matches
    /// labeled by cohesion class, function characters by their list, and
    /// everything else as `Char`.
    pub fn structural_pattern(&self, cells: &[String], window: CharSpan) -> StructuralPattern {
        let mut labels = Vec::new();
        let mut pos = window.start;
        while pos < window.end {
            let matches = self.lexicon.matches_at(cells, pos);
            if let Some((len, entry)) = matches
                .into_iter()
                .find(|(len, _)| pos + len <= window.end)
            {
                labels.push(entry.class.label().to_string());
                pos += len;
                continue;
            }
            let cell = cells[pos].as_str();
            let label = if SAYING_VERBS.contains(cell) {
                "SayingVerb"
            } else if DYNAMIC_PARTICLES.contains(cell) {
                "Particle"
            } else if COMPLEMENT_MORPHEMES.contains(cell) {
                "Complement"
            } else if CORRUPTION_MARKERS.contains(cell) {
                "Corruption"
            } else {
                "Char"
            };
            labels.push(label.to_string());
            pos += 1;
        }
        StructuralPattern::new(labels.join("+"))
    }

    fn window_context(&self, cells: &[String], window: CharSpan) -> WindowContext {
        let text: String = cells[window.start..window.end].concat();
        let len = window.len();

        let fixed_collocation = self.lexicon.has_class(&text, CohesionClass::FixedCollocation);
        let proper_noun = self
            .lexicon
            .lookup(&text)
            .iter()
            .any(|e| e.class.is_proper_noun());
        let transliteration = self.lexicon.has_class(&text, CohesionClass::Transliteration);

        let last = cells[window.end - 1].as_str();
        let saying_boundary = (len >= 2 && SAYING_VERBS.contains(last) && !fixed_collocation)
            .then(|| window.end - 1);
        let loose_boundary = (len >= 2
            && (DYNAMIC_PARTICLES.contains(last) || COMPLEMENT_MORPHEMES.contains(last))
            && !fixed_collocation
            && !proper_noun)
            .then(|| window.end - 1);

        // Rule 1 also keeps idioms whole, but the saying-verb exception
        // (rule 2) outranks anything that is not on the FixedCollocation
        // whitelist.
        let idiom = self.lexicon.has_class(&text, CohesionClass::Idiom)
            && saying_boundary.is_none();

        let truncated = transliteration && self.is_truncated(cells, window, &text);

        WindowContext {
            len,
            fixed_collocation,
            idiom,
            proper_noun,
            transliteration,
            truncated,
            saying_boundary,
            loose_boundary,
        }
    }

    /// A transliteration is truncated when it touches a corruption marker
    /// or when a document boundary cuts it off while a longer entry would
    /// still fit, on either side: a prefix fragment at the document end,
    /// or a suffix fragment at the document start.
    fn is_truncated(&self, cells: &[String], window: CharSpan, text: &str) -> bool {
        let before = window
            .start
            .checked_sub(1)
            .and_then(|i| cells.get(i))
            .map(|c| CORRUPTION_MARKERS.contains(c.as_str()))
            .unwrap_or(false);
        let after = cells
            .get(window.end)
            .map(|c| CORRUPTION_MARKERS.contains(c.as_str()))
            .unwrap_or(false);
        let cut_by_document_end = window.end == cells.len()
            && self
                .lexicon
                .has_longer_with_prefix(text, CohesionClass::Transliteration);
        let cut_by_document_start = window.start == 0
            && self
                .lexicon
                .has_longer_with_suffix(text, CohesionClass::Transliteration);
        before || after || cut_by_document_end || cut_by_document_start
    }

    fn vote(&self, rule: RuleId, candidate: &SegmentationCandidate, ctx: &WindowContext) -> Vote {
        match rule {
            RuleId::FixedCollocation => {
                if !(ctx.fixed_collocation || ctx.idiom) {
                    return Vote::Abstain;
                }
                if candidate.is_merge() {
                    Vote::Endorse
                } else {
                    Vote::Reject
                }
            }
            RuleId::SubjectSaidSplit => {
                let Some(boundary) = ctx.saying_boundary else {
                    return Vote::Abstain;
                };
                if Self::has_boundary_at(candidate, boundary) {
                    Vote::Endorse
                } else {
                    Vote::Reject
                }
            }
            RuleId::ProperNounCohesion => {
                if !ctx.proper_noun {
                    return Vote::Abstain;
                }
                if candidate.is_merge() {
                    Vote::Endorse
                } else {
                    Vote::Reject
                }
            }
            RuleId::TransliterationCompleteness => {
                if !ctx.transliteration {
                    return Vote::Abstain;
                }
                if ctx.truncated {
                    // Noise: force character-by-character.
                    if candidate.is_full_split() {
                        Vote::Endorse
                    } else {
                        Vote::Reject
                    }
                } else if candidate.is_merge() {
                    Vote::Endorse
                } else {
                    Vote::Reject
                }
            }
            RuleId::SyllableCeiling => {
                let covered = ctx.fixed_collocation
                    || ctx.idiom
                    || ctx.proper_noun
                    || (ctx.transliteration && !ctx.truncated);
                if ctx.len < SYLLABLE_CEILING || covered {
                    return Vote::Abstain;
                }
                let oversized = candidate
                    .segments
                    .iter()
                    .any(|s| s.span.len() >= SYLLABLE_CEILING && s.class.is_none());
                if oversized {
                    Vote::Reject
                } else {
                    Vote::Endorse
                }
            }
            RuleId::LooseStructureSplit => {
                let Some(boundary) = ctx.loose_boundary else {
                    return Vote::Abstain;
                };
                if Self::has_boundary_at(candidate, boundary) {
                    Vote::Endorse
                } else {
                    Vote::Reject
                }
            }
            RuleId::ConsistencyCheck | RuleId::Default => Vote::Abstain,
        }
    }

    fn has_boundary_at(candidate: &SegmentationCandidate, position: usize) -> bool {
        candidate.segments.iter().any(|s| s.span.start == position)
    }

    /// Highest confidence wins; equal scores fall back to the priority of
    /// the earliest endorsing rule, then to candidate order (coarsest
    /// first).
    fn pick_winner(candidates: &[SegmentationCandidate]) -> &SegmentationCandidate {
        let mut best = &candidates[0];
        for candidate in &candidates[1..] {
            let better = candidate.confidence > best.confidence
                || (candidate.confidence == best.confidence
                    && Self::earliest_priority(candidate) < Self::earliest_priority(best));
            if better {
                best = candidate;
            }
        }
        best
    }

    fn earliest_priority(candidate: &SegmentationCandidate) -> u8 {
        candidate
            .trace
            .first()
            .map(|r| r.priority())
            .unwrap_or(u8::MAX)
    }

    /// Segment layout backing a precedent ruling: the whole window for a
    /// merge, the best available split otherwise.
    fn segments_for(
        &self,
        ruling: Ruling,
        candidates: &[SegmentationCandidate],
        window: CharSpan,
    ) -> Vec<CharSpan> {
        match ruling {
            Ruling::Merge => vec![window],
            Ruling::Split => candidates
                .iter()
                .find(|c| !c.is_merge())
                .map(|c| c.spans())
                .unwrap_or_else(|| {
                    (window.start..window.end)
                        .map(|i| CharSpan::new(i, i + 1))
                        .collect()
                }),
        }
    }
}

#[cfg(test)]
mod tests {
    use super::*;
    use crate::lexicon::cells_of;

    fn lexicon() -> Lexicon {
        let mut lex = Lexicon::new();
        lex.add("子曰", CohesionClass::FixedCollocation);
        lex.add("子", CohesionClass::PersonalName);
        lex.add("靖", CohesionClass::PersonalName);
        lex.add("長安", CohesionClass::PlaceOrInstitution);
        lex.add("貞觀", CohesionClass::TimeWord);
        lex.add("般若波羅蜜", CohesionClass::Transliteration);
        lex.add("刻舟求劍", CohesionClass::Idiom);
        lex
    }

    fn decide(lex: &Lexicon, index: &ConsistencyIndex, text: &str) -> DecisionRecord {
        let cells = cells_of(text);
        let window = CharSpan::new(0, cells.len());
        RuleEngine::new(lex, index).decide(&DocId::from("test"), &cells, window)
    }

    #[test]
    fn test_fixed_collocation_merges_confident() {
        let lex = lexicon();
        let index = ConsistencyIndex::new();
        let record = decide(&lex, &index, "子曰");

        assert_eq!(record.ruling, Ruling::Merge);
        assert_eq!(record.status, DecisionStatus::Confident);
        assert_eq!(record.justification, RuleId::FixedCollocation);
        assert_eq!(record.segments, vec![CharSpan::new(0, 2)]);
        assert_eq!(record.class, Some(CohesionClass::FixedCollocation));
    }

    #[test]
    fn test_subject_said_splits_confident() {
        // 靖 is a personal name, 曰 a saying verb; the pair is not on the
        // fixed-collocation whitelist, so it splits at the boundary.
        let lex = lexicon();
        let index = ConsistencyIndex::new();
        let record = decide(&lex, &index, "靖曰");

        assert_eq!(record.ruling, Ruling::Split);
        assert_eq!(record.status, DecisionStatus::Confident);
        assert_eq!(record.justification, RuleId::SubjectSaidSplit);
        assert_eq!(
            record.segments,
            vec![CharSpan::new(0, 1), CharSpan::new(1, 2)]
        );
    }

    #[test]
    fn test_subject_said_overrides_proper_noun_resemblance() {
        // A name that superficially ends in a saying verb still splits:
        // rule 2 outranks generic proper-noun merging.
        let mut lex = lexicon();
        lex.add("靖曰", CohesionClass::PersonalName);
        let index = ConsistencyIndex::new();
        let record = decide(&lex, &index, "靖曰");

        assert_eq!(record.ruling, Ruling::Split);
        assert_eq!(record.justification, RuleId::SubjectSaidSplit);
    }

    #[test]
    fn test_proper_noun_merges() {
        let lex = lexicon();
        let index = ConsistencyIndex::new();

        for text in ["長安", "貞觀"] {
            let record = decide(&lex, &index, text);
            assert_eq!(record.ruling, Ruling::Merge, "{text}");
            assert_eq!(record.status, DecisionStatus::Confident);
            assert_eq!(record.justification, RuleId::ProperNounCohesion);
        }
    }

    #[test]
    fn test_transliteration_complete_merges() {
        let lex = lexicon();
        let index = ConsistencyIndex::new();
        let cells = cells_of("夫般若波羅蜜者");
        let engine = RuleEngine::new(&lex, &index);
        let record = engine.decide(&DocId::from("test"), &cells, CharSpan::new(1, 6));

        assert_eq!(record.ruling, Ruling::Merge);
        assert_eq!(record.justification, RuleId::TransliterationCompleteness);
        assert_eq!(record.status, DecisionStatus::Confident);
    }

    #[test]
    fn test_transliteration_truncated_by_corruption_splits() {
        let lex = lexicon();
        let index = ConsistencyIndex::new();
        let cells = cells_of("般若波羅蜜□");
        let engine = RuleEngine::new(&lex, &index);
        let record = engine.decide(&DocId::from("test"), &cells, CharSpan::new(0, 5));

        assert_eq!(record.ruling, Ruling::Split);
        assert_eq!(record.justification, RuleId::TransliterationCompleteness);
        assert_eq!(record.status, DecisionStatus::Confident);
        assert!(record.segments.iter().all(|s| s.len() == 1));
    }

    #[test]
    fn test_transliteration_cut_by_document_end_splits() {
        // 般若 alone at the very end of a document, while the lexicon knows
        // the longer 般若波羅蜜: treated as truncated noise.
        let mut lex = lexicon();
        lex.add("般若", CohesionClass::Transliteration);
        let index = ConsistencyIndex::new();
        let cells = cells_of("般若");
        let engine = RuleEngine::new(&lex, &index);
        let record = engine.decide(&DocId::from("test"), &cells, CharSpan::new(0, 2));

        assert_eq!(record.ruling, Ruling::Split);
        assert_eq!(record.justification, RuleId::TransliterationCompleteness);
    }

    #[test]
    fn test_transliteration_cut_by_document_start_splits() {
        // 羅蜜 at the very start of a document is the tail of the longer
        // 般若波羅蜜: the leading characters were lost, so it is noise too.
        let mut lex = lexicon();
        lex.add("羅蜜", CohesionClass::Transliteration);
        let index = ConsistencyIndex::new();
        let cells = cells_of("羅蜜者");
        let engine = RuleEngine::new(&lex, &index);
        let record = engine.decide(&DocId::from("test"), &cells, CharSpan::new(0, 2));

        assert_eq!(record.ruling, Ruling::Split);
        assert_eq!(record.justification, RuleId::TransliterationCompleteness);
        assert!(record.segments.iter().all(|s| s.len() == 1));
    }

    #[test]
    fn test_empty_window_is_refused_without_panicking() {
        let lex = lexicon();
        let index = ConsistencyIndex::new();
        let cells = cells_of("子曰");
        let engine = RuleEngine::new(&lex, &index);
        let record = engine.decide(&DocId::from("test"), &cells, CharSpan::new(1, 1));

        assert!(record.status.is_uncertain());
        assert!(record.segments.is_empty());
        assert!(index.is_empty());
    }

    #[test]
    fn test_syllable_ceiling_forces_split() {
        let lex = lexicon();
        let index = ConsistencyIndex::new();
        let record = decide(&lex, &index, "天地玄黃宇");

        assert_eq!(record.ruling, Ruling::Split);
        assert_eq!(record.status, DecisionStatus::Confident);
        assert!(record.segments.iter().all(|s| s.len() < 4));
    }

    #[test]
    fn test_idiom_exempt_from_ceiling() {
        let lex = lexicon();
        let index = ConsistencyIndex::new();
        let record = decide(&lex, &index, "刻舟求劍");

        assert_eq!(record.ruling, Ruling::Merge);
        assert_eq!(record.status, DecisionStatus::Confident);
        assert_eq!(record.justification, RuleId::FixedCollocation);
    }

    #[test]
    fn test_loose_structure_splits_particle() {
        let lex = lexicon();
        let index = ConsistencyIndex::new();
        let record = decide(&lex, &index, "去了");

        assert_eq!(record.ruling, Ruling::Split);
        assert_eq!(record.justification, RuleId::LooseStructureSplit);
        assert_eq!(
            record.segments,
            vec![CharSpan::new(0, 1), CharSpan::new(1, 2)]
        );
    }

    #[test]
    fn test_ambiguous_overlap_is_uncertain() {
        // 長安城 with both 長安 and 安城 listed: mutually exclusive merges,
        // no rule prefers either, span surfaces for adjudication.
        let mut lex = lexicon();
        lex.add("安城", CohesionClass::PlaceOrInstitution);
        let index = ConsistencyIndex::new();
        let record = decide(&lex, &index, "長安城");

        assert!(record.status.is_uncertain());
        assert_eq!(record.justification, RuleId::Default);
        assert_eq!(record.alternatives.len(), 2);
        assert_eq!(
            record.status,
            DecisionStatus::Uncertain {
                marker: UNCERTAIN_MARKER.to_string()
            }
        );
    }

    #[test]
    fn test_confident_decision_records_precedent() {
        let lex = lexicon();
        let index = ConsistencyIndex::new();
        let record = decide(&lex, &index, "長安");

        assert_eq!(
            index.lookup_precedent(&record.pattern),
            Some(Ruling::Merge)
        );
    }

    #[test]
    fn test_precedent_carries_undetermined_span() {
        // First document adjudicated a surname + courtesy-name pattern as a
        // merge; a second, structurally identical span resolves confident
        // without any rule firing.
        let mut lex = lexicon();
        lex.add("李", CohesionClass::PersonalName);
        lex.add("藥師", CohesionClass::PersonalName);
        lex.add("孔", CohesionClass::PersonalName);
        lex.add("仲尼", CohesionClass::PersonalName);
        let index = ConsistencyIndex::new();
        let engine = RuleEngine::new(&lex, &index);

        index.record_precedent(
            StructuralPattern::new("PersonalName+PersonalName"),
            Ruling::Merge,
            SpanKey::new(DocId::from("doc-a"), CharSpan::new(0, 3)),
        );

        let cells = cells_of("孔仲尼");
        let record = engine.decide(&DocId::from("doc-b"), &cells, CharSpan::new(0, 3));

        assert_eq!(record.pattern.as_str(), "PersonalName+PersonalName");
        assert_eq!(record.ruling, Ruling::Merge);
        assert_eq!(record.status, DecisionStatus::Confident);
        assert_eq!(record.justification, RuleId::ConsistencyCheck);
    }

    #[test]
    fn test_precedent_conflict_is_uncertain_with_both_options() {
        let lex = lexicon();
        let index = ConsistencyIndex::new();
        let engine = RuleEngine::new(&lex, &index);

        // A prior panel split this pattern; the rules now derive a merge.
        let cells = cells_of("長安");
        let pattern = engine.structural_pattern(&cells, CharSpan::new(0, 2));
        index.record_precedent(
            pattern,
            Ruling::Split,
            SpanKey::new(DocId::from("doc-a"), CharSpan::new(3, 5)),
        );

        let record = engine.decide(&DocId::from("doc-b"), &cells, CharSpan::new(0, 2));

        assert!(record.status.is_uncertain());
        assert_eq!(record.justification, RuleId::ConsistencyCheck);
        assert_eq!(record.alternatives.len(), 2);
        assert!(record.alternatives.iter().any(|o| o.source == "precedent"));
        assert!(record
            .alternatives
            .iter()
            .any(|o| o.ruling == Ruling::Merge && o.source != "precedent"));
    }

    #[test]
    fn test_single_char_window_is_confident() {
        let lex = lexicon();
        let index = ConsistencyIndex::new();
        let record = decide(&lex, &index, "天");

        assert_eq!(record.status, DecisionStatus::Confident);
        assert_eq!(record.segments, vec![CharSpan::new(0, 1)]);
    }

    #[test]
    fn test_confidence_is_endorse_minus_reject() {
        let lex = lexicon();
        let index = ConsistencyIndex::new();
        let cells = cells_of("子曰");
        let generator = CandidateGenerator::new(&lex);
        let engine = RuleEngine::new(&lex, &index);
        let ctx = engine.window_context(&cells, CharSpan::new(0, 2));
        let mut candidates = generator.generate(&cells, CharSpan::new(0, 2));

        // Merged 子曰: endorsed by rule 1, rejected by rule 3?  No — the
        // window matches FixedCollocation only, so rule 3 abstains.
        let merge = &candidates[0];
        assert!(merge.is_merge());
        assert_eq!(engine.vote(RuleId::FixedCollocation, merge, &ctx), Vote::Endorse);
        assert_eq!(engine.vote(RuleId::ProperNounCohesion, merge, &ctx), Vote::Abstain);

        let split = &candidates[1];
        assert_eq!(engine.vote(RuleId::FixedCollocation, split, &ctx), Vote::Reject);
    }
}
