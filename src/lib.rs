//! Rule-assisted word segmentation for Classical Chinese and Kanbun text.
//!
//! The engine turns raw character sequences into adjudicated, gold-standard
//! word segmentations. Decision logic encodes an annotation guideline's
//! ordered rules: fixed collocations stay whole, proper nouns cohere,
//! transliterations merge only when complete, long unlisted runs are split,
//! and structurally similar spans are forced to agree across the corpus.
//!
//! Data flows left to right through the components:
//!
//! 1. [`Lexicon`] — proper nouns, idioms, fixed collocations, and
//!    transliterations, each tagged with a [`CohesionClass`].
//! 2. [`CandidateGenerator`] — proposes every boundary-consistent
//!    segmentation of a span, bounded by lexicon matches.
//! 3. [`RuleEngine`] — scores candidates against the ordered rule set and
//!    emits one [`DecisionRecord`] per span, or marks the span uncertain.
//! 4. [`AdjudicationLedger`] — append-only per-span decision history;
//!    humans resolve uncertain spans here.
//! 5. [`ConsistencyIndex`] — cross-document structural-pattern memory that
//!    keeps similar structures segmented alike.
//!
//! [`Segmenter`] wires the components together for whole documents.

pub mod candidate;
pub mod consistency;
pub mod document;
pub mod error;
pub mod export;
pub mod ledger;
pub mod lexicon;
pub mod rules;
pub mod span;

pub use candidate::{CandidateGenerator, Segment, SegmentationCandidate};
pub use consistency::{ConsistencyIndex, Precedent, StructuralPattern};
pub use document::{SegmentationOutcome, Segmenter, SourceDocument};
pub use error::SegmentError;
pub use export::{export_document, GoldDocument, GoldRecord};
pub use ledger::AdjudicationLedger;
pub use lexicon::{CohesionClass, Lexicon, LexiconEntry};
pub use rules::{DecisionRecord, DecisionStatus, RuleEngine, RuleId, Ruling, UNCERTAIN_MARKER};
pub use span::{CharSpan, DocId, SpanKey};
