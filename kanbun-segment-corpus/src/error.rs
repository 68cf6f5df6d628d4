//! Error types for corpus processing.

use thiserror::Error;

#[derive(Debug, Error)]
pub enum CorpusError {
    /// Two annotators segmented different underlying texts; boundary
    /// positions cannot be compared.
    #[error("annotator {index} segments a different text: expected '{expected}', got '{got}'")]
    AnnotatorMisalignment {
        index: usize,
        expected: String,
        got: String,
    },

    /// Agreement statistics need at least two annotators.
    #[error("at least two annotators are required, got {0}")]
    TooFewAnnotators(usize),
}
