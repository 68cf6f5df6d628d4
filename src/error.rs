//! Error types for the segmentation engine.
//!
//! Lexicon and precedent misses are *not* errors — they come back as empty
//! lookups and drive the rule engine's fallback branches. Errors here are
//! the genuinely exceptional cases: adjudicating a span the engine never
//! produced, and span sets that fail the partition invariant.

use thiserror::Error;

use crate::span::SpanKey;

/// Errors that can occur during segmentation processing.
#[derive(Debug, Error)]
pub enum SegmentError {
    /// Adjudication was requested for a span the rule engine never generated.
    /// Caller error; surfaced immediately, never retried.
    #[error("no decision recorded for span {key}")]
    SpanNotFound { key: SpanKey },

    /// A span set reaching the rule engine does not partition its source.
    /// Fatal for this document only; other documents are unaffected.
    #[error("document '{doc}': spans do not partition the source at cell {position} ({reason})")]
    MalformedInput {
        doc: String,
        position: usize,
        reason: String,
    },

    /// A final segmentation was requested while a span still awaits
    /// human adjudication.
    #[error("span {key} is still pending adjudication")]
    PendingAdjudication { key: SpanKey },

    /// The lexicon snapshot could not be parsed.
    #[error("failed to parse lexicon snapshot: {0}")]
    LexiconSnapshot(#[from] ron::error::SpannedError),

    /// The gold-standard export could not be serialized.
    #[error("failed to serialize gold-standard export: {0}")]
    Export(#[from] serde_json::Error),
}
