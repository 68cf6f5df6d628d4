//! Gold-standard export.
//!
//! Serializes a document's decision history into the JSON interchange
//! format downstream corpus builders consume. Every window appears once
//! with the decision currently in force; uncertain windows are exported
//! too, carrying their marker, so a partially reviewed corpus can still
//! be inspected.

use serde::{Deserialize, Serialize};

use crate::document::{Segmenter, SourceDocument};
use crate::error::SegmentError;
use crate::ledger::AdjudicationLedger;
use crate::lexicon::CohesionClass;
use crate::rules::{DecisionStatus, Ruling};
use crate::span::{CharSpan, SpanKey};

/// One exported decision window.
#[derive(Debug, Clone, PartialEq, Serialize, Deserialize)]
pub struct GoldRecord {
    pub span: CharSpan,
    pub text: String,
    /// The decided word forms, one per segment.
    pub words: Vec<String>,
    pub ruling: Ruling,
    /// Why a merge coheres; splits carry the rationale in `justification`.
    pub cohesion_class: Option<CohesionClass>,
    pub justification: String,
    pub status: DecisionStatus,
}

/// A whole document's gold-standard segmentation.
#[derive(Debug, Clone, PartialEq, Serialize, Deserialize)]
pub struct GoldDocument {
    pub doc: String,
    pub records: Vec<GoldRecord>,
}

impl GoldDocument {
    /// The flat word sequence, with uncertain windows skipped.
    pub fn words(&self) -> Vec<&str> {
        self.records
            .iter()
            .filter(|r| !r.status.is_uncertain())
            .flat_map(|r| r.words.iter().map(String::as_str))
            .collect()
    }
}

/// Serializes the decisions in force for `doc` as pretty-printed JSON.
///
/// Fails if any window of the document has no entry in the ledger at all.
pub fn export_document(
    segmenter: &Segmenter,
    doc: &SourceDocument,
    ledger: &AdjudicationLedger,
) -> Result<String, SegmentError> {
    let mut records = Vec::new();
    for window in segmenter.windows(doc.cells()) {
        let key = SpanKey::new(doc.id.clone(), window);
        let record = ledger
            .latest(&key)
            .ok_or_else(|| SegmentError::SpanNotFound { key: key.clone() })?;
        records.push(GoldRecord {
            span: window,
            text: doc.text_of(window),
            words: record.segments.iter().map(|s| doc.text_of(*s)).collect(),
            ruling: record.ruling,
            cohesion_class: record.class,
            justification: record.justification.description().to_string(),
            status: record.status.clone(),
        });
    }
    let gold = GoldDocument {
        doc: doc.id.as_str().to_string(),
        records,
    };
    Ok(serde_json::to_string_pretty(&gold)?)
}

#[cfg(test)]
mod tests {
    use std::sync::Arc;

    use super::*;
    use crate::consistency::ConsistencyIndex;
    use crate::lexicon::Lexicon;
    use crate::rules::UNCERTAIN_MARKER;

    fn segmenter() -> Segmenter {
        let mut lex = Lexicon::new();
        lex.add("子曰", CohesionClass::FixedCollocation);
        lex.add("長安", CohesionClass::PlaceOrInstitution);
        lex.add("安城", CohesionClass::PlaceOrInstitution);
        Segmenter::new(Arc::new(lex), Arc::new(ConsistencyIndex::new()))
    }

    #[test]
    fn export_round_trips_through_json() {
        let seg = segmenter();
        let doc = SourceDocument::new("tang-01", "子曰長安");
        let mut ledger = AdjudicationLedger::new();
        seg.process(&doc, &mut ledger).unwrap();

        let json = export_document(&seg, &doc, &ledger).unwrap();
        let gold: GoldDocument = serde_json::from_str(&json).unwrap();
        assert_eq!(gold.doc, "tang-01");
        assert_eq!(gold.records.len(), 2);
        assert_eq!(gold.words(), vec!["子曰", "長安"]);
        assert_eq!(gold.records[0].justification, "fixed-collocation override");
        assert_eq!(
            gold.records[0].cohesion_class,
            Some(CohesionClass::FixedCollocation)
        );
        assert_eq!(
            gold.records[1].cohesion_class,
            Some(CohesionClass::PlaceOrInstitution)
        );
    }

    #[test]
    fn uncertain_windows_export_with_their_marker() {
        let seg = segmenter();
        let doc = SourceDocument::new("tang-02", "長安城");
        let mut ledger = AdjudicationLedger::new();
        seg.process(&doc, &mut ledger).unwrap();

        let json = export_document(&seg, &doc, &ledger).unwrap();
        let gold: GoldDocument = serde_json::from_str(&json).unwrap();
        assert_eq!(gold.records.len(), 1);
        match &gold.records[0].status {
            DecisionStatus::Uncertain { marker } => assert_eq!(marker, UNCERTAIN_MARKER),
            other => panic!("unexpected status {other:?}"),
        }
        assert!(gold.words().is_empty());
    }

    #[test]
    fn export_fails_for_an_unprocessed_document() {
        let seg = segmenter();
        let doc = SourceDocument::new("tang-03", "子曰");
        let ledger = AdjudicationLedger::new();
        assert!(matches!(
            export_document(&seg, &doc, &ledger),
            Err(SegmentError::SpanNotFound { .. })
        ));
    }
}
