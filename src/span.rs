//! Character spans over source documents.
//!
//! All offsets are half-open character-cell indices (`start..end`) into a
//! document's grapheme sequence, never byte offsets. Spans are immutable
//! once created; the engine only ever produces new spans.

use serde::{Deserialize, Serialize};

/// Identifier of a source document.
#[derive(Debug, Clone, PartialEq, Eq, Hash, PartialOrd, Ord, Serialize, Deserialize)]
pub struct DocId(pub String);

impl DocId {
    pub fn new(id: impl Into<String>) -> Self {
        Self(id.into())
    }

    pub fn as_str(&self) -> &str {
        &self.0
    }
}

impl std::fmt::Display for DocId {
    fn fmt(&self, f: &mut std::fmt::Formatter<'_>) -> std::fmt::Result {
        f.write_str(&self.0)
    }
}

impl From<&str> for DocId {
    fn from(s: &str) -> Self {
        Self(s.to_string())
    }
}

/// A contiguous run of source characters, half-open.
#[derive(Debug, Clone, Copy, PartialEq, Eq, Hash, PartialOrd, Ord, Serialize, Deserialize)]
pub struct CharSpan {
    pub start: usize,
    pub end: usize,
}

impl CharSpan {
    pub fn new(start: usize, end: usize) -> Self {
        debug_assert!(start <= end, "span start must not exceed end");
        Self { start, end }
    }

    /// Number of character cells covered.
    pub fn len(&self) -> usize {
        self.end - self.start
    }

    pub fn is_empty(&self) -> bool {
        self.start == self.end
    }

    /// True if `other` starts exactly where this span ends.
    pub fn abuts(&self, other: &CharSpan) -> bool {
        self.end == other.start
    }

    pub fn overlaps(&self, other: &CharSpan) -> bool {
        self.start < other.end && other.start < self.end
    }

    /// Sub-span relative to the document, not to this span.
    pub fn slice(&self, start: usize, end: usize) -> CharSpan {
        debug_assert!(self.start <= start && end <= self.end);
        CharSpan::new(start, end)
    }
}

impl std::fmt::Display for CharSpan {
    fn fmt(&self, f: &mut std::fmt::Formatter<'_>) -> std::fmt::Result {
        write!(f, "{}..{}", self.start, self.end)
    }
}

/// A span pinned to its source document; the ledger keys decisions by this.
#[derive(Debug, Clone, PartialEq, Eq, Hash, Serialize, Deserialize)]
pub struct SpanKey {
    pub doc: DocId,
    pub span: CharSpan,
}

impl SpanKey {
    pub fn new(doc: DocId, span: CharSpan) -> Self {
        Self { doc, span }
    }
}

impl std::fmt::Display for SpanKey {
    fn fmt(&self, f: &mut std::fmt::Formatter<'_>) -> std::fmt::Result {
        write!(f, "{}:{}", self.doc, self.span)
    }
}

/// Checks that `spans` exactly tile `0..len` with no gap or overlap.
///
/// Returns the first offending position on failure. The spans must already
/// be in left-to-right order; out-of-order input is reported as a gap or
/// overlap at the point where ordering breaks.
pub fn partition_violation(spans: &[CharSpan], len: usize) -> Option<(usize, &'static str)> {
    let mut cursor = 0;
    for span in spans {
        if span.start > cursor {
            return Some((cursor, "gap"));
        }
        if span.start < cursor {
            return Some((span.start, "overlap"));
        }
        if span.is_empty() {
            return Some((span.start, "empty span"));
        }
        cursor = span.end;
    }
    if cursor != len {
        return Some((cursor, "gap"));
    }
    None
}

#[cfg(test)]
mod tests {
    use super::*;

    #[test]
    fn test_span_len_and_abut() {
        let a = CharSpan::new(0, 2);
        let b = CharSpan::new(2, 5);
        assert_eq!(a.len(), 2);
        assert!(a.abuts(&b));
        assert!(!b.abuts(&a));
        assert!(!a.overlaps(&b));
        assert!(a.overlaps(&CharSpan::new(1, 3)));
    }

    #[test]
    fn test_partition_exact_tiling() {
        let spans = vec![CharSpan::new(0, 2), CharSpan::new(2, 3), CharSpan::new(3, 6)];
        assert_eq!(partition_violation(&spans, 6), None);
    }

    #[test]
    fn test_partition_detects_gap() {
        let spans = vec![CharSpan::new(0, 2), CharSpan::new(3, 6)];
        assert_eq!(partition_violation(&spans, 6), Some((2, "gap")));
    }

    #[test]
    fn test_partition_detects_overlap() {
        let spans = vec![CharSpan::new(0, 3), CharSpan::new(2, 6)];
        assert_eq!(partition_violation(&spans, 6), Some((2, "overlap")));
    }

    #[test]
    fn test_partition_detects_short_coverage() {
        let spans = vec![CharSpan::new(0, 4)];
        assert_eq!(partition_violation(&spans, 6), Some((4, "gap")));
    }

    #[test]
    fn test_partition_empty_document() {
        assert_eq!(partition_violation(&[], 0), None);
    }
}
