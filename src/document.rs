//! Document-level segmentation drive.
//!
//! [`Segmenter`] walks a document left to right, carving it into decision
//! windows and handing each window to the rule engine. Confident decisions
//! land in the ledger immediately; uncertain ones are recorded as pending
//! and the walk continues, so one hard span never blocks the rest of a
//! document. Re-running a document is idempotent: spans that already carry
//! a decision are skipped, which is how a run resumes after interruption.
//!
//! The lexicon and consistency index are shared behind [`Arc`] so several
//! documents can be processed from different threads against the same
//! precedent store.

use std::sync::Arc;

use crate::consistency::ConsistencyIndex;
use crate::error::SegmentError;
use crate::ledger::AdjudicationLedger;
use crate::lexicon::{cells_of, CohesionClass, Lexicon};
use crate::rules::{self, DecisionRecord, RuleEngine, Ruling};
use crate::span::{partition_violation, CharSpan, DocId, SpanKey};

/// A source text split into character cells.
#[derive(Debug, Clone)]
pub struct SourceDocument {
    pub id: DocId,
    raw: String,
    cells: Vec<String>,
}

impl SourceDocument {
    pub fn new(id: impl Into<DocId>, text: &str) -> Self {
        Self {
            id: id.into(),
            raw: text.to_string(),
            cells: cells_of(text),
        }
    }

    pub fn cells(&self) -> &[String] {
        &self.cells
    }

    pub fn text(&self) -> &str {
        &self.raw
    }

    /// Number of character cells, not bytes.
    pub fn len(&self) -> usize {
        self.cells.len()
    }

    pub fn is_empty(&self) -> bool {
        self.cells.is_empty()
    }

    /// The text covered by a cell span.
    pub fn text_of(&self, span: CharSpan) -> String {
        self.cells[span.start..span.end].concat()
    }
}

/// The result of one processing pass over a document.
#[derive(Debug)]
pub struct SegmentationOutcome {
    pub doc: DocId,
    /// Decision in force for every window, in document order.
    pub decisions: Vec<DecisionRecord>,
    /// Windows whose decision still awaits adjudication.
    pub pending: Vec<SpanKey>,
}

impl SegmentationOutcome {
    pub fn is_complete(&self) -> bool {
        self.pending.is_empty()
    }
}

/// Drives the rule engine across whole documents.
pub struct Segmenter {
    lexicon: Arc<Lexicon>,
    index: Arc<ConsistencyIndex>,
}

impl Segmenter {
    pub fn new(lexicon: Arc<Lexicon>, index: Arc<ConsistencyIndex>) -> Self {
        Self { lexicon, index }
    }

    pub fn lexicon(&self) -> &Lexicon {
        &self.lexicon
    }

    pub fn index(&self) -> &ConsistencyIndex {
        &self.index
    }

    /// Carves `cells` into decision windows.
    ///
    /// A window is the longest lexicon match at the cursor, grown three
    /// ways: a one-cell surname absorbs a following given-name entry, any
    /// inner lexicon match overrunning the window pulls its tail in (this
    /// is what makes 長安|城 vs 長|安城 one window instead of two), and a
    /// trailing saying verb or verb-attached function character joins the
    /// window when it does not start a word of its own.
    pub fn windows(&self, cells: &[String]) -> Vec<CharSpan> {
        let mut out = Vec::new();
        let mut pos = 0;
        while pos < cells.len() {
            let mut end = pos + self.longest_at(cells, pos).unwrap_or(1);

            if end - pos == 1 && self.lexicon.has_class(&cells[pos], CohesionClass::PersonalName)
            {
                let given = self
                    .lexicon
                    .matches_at(cells, end)
                    .into_iter()
                    .find(|(_, entry)| entry.class == CohesionClass::PersonalName);
                if let Some((len, _)) = given {
                    end += len;
                }
            }

            loop {
                let mut grew = false;
                for q in pos + 1..end {
                    if let Some(len) = self.longest_at(cells, q) {
                        if q + len > end {
                            end = q + len;
                            grew = true;
                        }
                    }
                }
                if !grew {
                    break;
                }
            }

            if end < cells.len()
                && rules::attaches_to_previous(&cells[end])
                && self.longest_at(cells, end).unwrap_or(1) == 1
            {
                end += 1;
            }

            out.push(CharSpan::new(pos, end));
            pos = end;
        }
        out
    }

    fn longest_at(&self, cells: &[String], pos: usize) -> Option<usize> {
        self.lexicon
            .matches_at(cells, pos)
            .first()
            .map(|(len, _)| *len)
    }

    /// Processes one document, appending every fresh decision to the
    /// ledger. Spans already decided in the ledger are skipped, so calling
    /// this again after an interruption or an adjudication pass neither
    /// duplicates records nor overturns existing ones.
    pub fn process(
        &self,
        doc: &SourceDocument,
        ledger: &mut AdjudicationLedger,
    ) -> Result<SegmentationOutcome, SegmentError> {
        if let Some(position) = doc.cells.iter().position(String::is_empty) {
            return Err(SegmentError::MalformedInput {
                doc: doc.id.as_str().to_string(),
                position,
                reason: "empty cell".to_string(),
            });
        }

        let engine = RuleEngine::new(&self.lexicon, &self.index);
        let mut decisions = Vec::new();
        for window in self.windows(&doc.cells) {
            let key = SpanKey::new(doc.id.clone(), window);
            if let Some(existing) = ledger.latest(&key) {
                tracing::trace!(span = %key, "span already decided, skipping");
                decisions.push(existing.clone());
                continue;
            }
            let record = engine.decide(&doc.id, &doc.cells, window);
            ledger.record(record.clone());
            decisions.push(record);
        }

        let pending = decisions
            .iter()
            .filter(|d| d.status.is_uncertain())
            .map(|d| d.key.clone())
            .collect();

        Ok(SegmentationOutcome {
            doc: doc.id.clone(),
            decisions,
            pending,
        })
    }

    /// Applies a human ruling to a pending (or already decided) span and
    /// aligns the consistency index with it. Passing empty `segments`
    /// derives them from the ruling: the whole span for a merge, single
    /// cells for a split.
    pub fn adjudicate(
        &self,
        ledger: &mut AdjudicationLedger,
        key: &SpanKey,
        ruling: Ruling,
        segments: Vec<CharSpan>,
        adjudicator: &str,
        rationale: &str,
    ) -> Result<DecisionRecord, SegmentError> {
        let segments = if segments.is_empty() {
            match ruling {
                Ruling::Merge => vec![key.span],
                Ruling::Split => (key.span.start..key.span.end)
                    .map(|i| CharSpan::new(i, i + 1))
                    .collect(),
            }
        } else {
            segments
        };

        let record = ledger.adjudicate(key, ruling, segments, adjudicator, rationale)?;
        if self.index.lookup_precedent(&record.pattern) != Some(ruling) {
            self.index.override_precedent(
                record.pattern.clone(),
                ruling,
                adjudicator,
                rationale,
                key.clone(),
            );
        }
        Ok(record)
    }

    /// The final word sequence of a fully decided document.
    ///
    /// Fails if any window is missing from the ledger or still pending,
    /// or if the decided segments do not tile the document exactly.
    pub fn finalize(
        &self,
        doc: &SourceDocument,
        ledger: &AdjudicationLedger,
    ) -> Result<Vec<String>, SegmentError> {
        let mut spans = Vec::new();
        for window in self.windows(&doc.cells) {
            let key = SpanKey::new(doc.id.clone(), window);
            let record = ledger
                .latest(&key)
                .ok_or_else(|| SegmentError::SpanNotFound { key: key.clone() })?;
            if record.status.is_uncertain() {
                return Err(SegmentError::PendingAdjudication { key });
            }
            spans.extend(record.segments.iter().copied());
        }

        if let Some((position, reason)) = partition_violation(&spans, doc.len()) {
            tracing::error!(doc = %doc.id, position, reason, "decided spans do not tile the document");
            return Err(SegmentError::MalformedInput {
                doc: doc.id.as_str().to_string(),
                position,
                reason: reason.to_string(),
            });
        }

        Ok(spans.into_iter().map(|s| doc.text_of(s)).collect())
    }
}
