//! Consistency index: cross-document structural-pattern memory.
//!
//! "Treat similar structures alike" is global mutable state shared by every
//! worker, so it lives behind one component with an explicit serialization
//! contract: all reads and writes go through a single interior mutex
//! (single-writer discipline), never ad hoc locking inside the rule engine.
//!
//! Once a precedent exists, new spans matching the same structural pattern
//! must receive the same ruling. Overriding a precedent requires an
//! adjudicated override with a recorded rationale and is always logged,
//! never silent.

use std::collections::HashMap;
use std::sync::Mutex;

use serde::{Deserialize, Serialize};

use crate::rules::Ruling;
use crate::span::SpanKey;

/// A structural pattern key, e.g. `PersonalName+SayingVerb`.
#[derive(Debug, Clone, PartialEq, Eq, Hash, Serialize, Deserialize)]
pub struct StructuralPattern(pub String);

impl StructuralPattern {
    pub fn new(pattern: impl Into<String>) -> Self {
        Self(pattern.into())
    }

    pub fn as_str(&self) -> &str {
        &self.0
    }
}

impl std::fmt::Display for StructuralPattern {
    fn fmt(&self, f: &mut std::fmt::Formatter<'_>) -> std::fmt::Result {
        f.write_str(&self.0)
    }
}

/// The ruling most recently applied to a structural pattern.
#[derive(Debug, Clone, PartialEq, Serialize, Deserialize)]
pub struct Precedent {
    pub ruling: Ruling,
    /// Span that established (or last overrode) this precedent.
    pub origin: SpanKey,
    /// Present only when the precedent was replaced by an adjudicated
    /// override; records who and why.
    pub override_rationale: Option<String>,
}

/// Single-writer precedent store, shareable across document workers via
/// `Arc<ConsistencyIndex>`.
#[derive(Debug, Default)]
pub struct ConsistencyIndex {
    precedents: Mutex<HashMap<StructuralPattern, Precedent>>,
}

impl ConsistencyIndex {
    pub fn new() -> Self {
        Self::default()
    }

    /// Records a precedent established by a confident rule decision.
    /// Last-write-wins per pattern.
    pub fn record_precedent(&self, pattern: StructuralPattern, ruling: Ruling, origin: SpanKey) {
        let mut precedents = self.precedents.lock().unwrap_or_else(std::sync::PoisonError::into_inner);
        tracing::debug!(pattern = %pattern, ?ruling, origin = %origin, "precedent recorded");
        precedents.insert(
            pattern,
            Precedent {
                ruling,
                origin,
                override_rationale: None,
            },
        );
    }

    /// Replaces a precedent through an explicit adjudicated override.
    /// The conflict is logged; silent replacement is not possible through
    /// this API.
    pub fn override_precedent(
        &self,
        pattern: StructuralPattern,
        ruling: Ruling,
        adjudicator: &str,
        rationale: &str,
        origin: SpanKey,
    ) {
        let mut precedents = self.precedents.lock().unwrap_or_else(std::sync::PoisonError::into_inner);
        if let Some(prior) = precedents.get(&pattern) {
            tracing::warn!(
                pattern = %pattern,
                prior = ?prior.ruling,
                new = ?ruling,
                adjudicator,
                rationale,
                "precedent overridden"
            );
        }
        precedents.insert(
            pattern,
            Precedent {
                ruling,
                origin,
                override_rationale: Some(format!("{adjudicator}: {rationale}")),
            },
        );
    }

    /// Looks up the current ruling for a pattern. A miss is a normal
    /// outcome and simply means no precedent constrains this span.
    pub fn lookup_precedent(&self, pattern: &StructuralPattern) -> Option<Ruling> {
        let precedents = self.precedents.lock().unwrap_or_else(std::sync::PoisonError::into_inner);
        precedents.get(pattern).map(|p| p.ruling)
    }

    /// Full precedent record, including origin and any override rationale.
    pub fn precedent(&self, pattern: &StructuralPattern) -> Option<Precedent> {
        let precedents = self.precedents.lock().unwrap_or_else(std::sync::PoisonError::into_inner);
        precedents.get(pattern).cloned()
    }

    pub fn len(&self) -> usize {
        self.precedents.lock().unwrap_or_else(std::sync::PoisonError::into_inner).len()
    }

    pub fn is_empty(&self) -> bool {
        self.len() == 0
    }
}

#[cfg(test)]
mod tests {
    use super::*;
    use crate::span::{CharSpan, DocId};

    fn key(doc: &str, start: usize, end: usize) -> SpanKey {
        SpanKey::new(DocId::from(doc), CharSpan::new(start, end))
    }

    #[test]
    fn test_lookup_miss_is_none() {
        let index = ConsistencyIndex::new();
        assert_eq!(
            index.lookup_precedent(&StructuralPattern::new("PersonalName+PersonalName")),
            None
        );
    }

    #[test]
    fn test_record_then_lookup() {
        let index = ConsistencyIndex::new();
        let pattern = StructuralPattern::new("PersonalName+PersonalName");
        index.record_precedent(pattern.clone(), Ruling::Merge, key("doc-a", 0, 2));

        assert_eq!(index.lookup_precedent(&pattern), Some(Ruling::Merge));
        let precedent = index.precedent(&pattern).unwrap();
        assert_eq!(precedent.origin.doc.as_str(), "doc-a");
        assert!(precedent.override_rationale.is_none());
    }

    #[test]
    fn test_last_write_wins() {
        let index = ConsistencyIndex::new();
        let pattern = StructuralPattern::new("TimeWord");
        index.record_precedent(pattern.clone(), Ruling::Merge, key("doc-a", 0, 2));
        index.record_precedent(pattern.clone(), Ruling::Split, key("doc-b", 4, 6));

        assert_eq!(index.lookup_precedent(&pattern), Some(Ruling::Split));
        assert_eq!(index.precedent(&pattern).unwrap().origin.doc.as_str(), "doc-b");
    }

    #[test]
    fn test_override_records_rationale() {
        let index = ConsistencyIndex::new();
        let pattern = StructuralPattern::new("PersonalName+SayingVerb");
        index.record_precedent(pattern.clone(), Ruling::Merge, key("doc-a", 0, 2));
        index.override_precedent(
            pattern.clone(),
            Ruling::Split,
            "annotator-2",
            "saying verb belongs to the following quotation",
            key("doc-b", 7, 9),
        );

        assert_eq!(index.lookup_precedent(&pattern), Some(Ruling::Split));
        let precedent = index.precedent(&pattern).unwrap();
        assert!(precedent
            .override_rationale
            .as_deref()
            .unwrap()
            .starts_with("annotator-2:"));
    }

    #[test]
    fn test_shared_across_threads() {
        use std::sync::Arc;

        let index = Arc::new(ConsistencyIndex::new());
        let mut handles = Vec::new();
        for i in 0..4 {
            let index = Arc::clone(&index);
            handles.push(std::thread::spawn(move || {
                let pattern = StructuralPattern::new(format!("Pattern{i}"));
                index.record_precedent(pattern.clone(), Ruling::Merge, key("doc", i, i + 1));
                assert_eq!(index.lookup_precedent(&pattern), Some(Ruling::Merge));
            }));
        }
        for handle in handles {
            handle.join().unwrap();
        }
        assert_eq!(index.len(), 4);
    }
}
