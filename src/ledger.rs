//! Append-only record of every segmentation decision.
//!
//! The ledger keeps the full history per span rather than a single
//! mutable state. The engine appends automatic decisions as it walks a
//! document; a human reviewer appends adjudications on top of uncertain
//! ones. Nothing is ever rewritten in place, so the provenance of a
//! gold-standard segment stays reconstructible.

use std::collections::HashMap;

use crate::consistency::StructuralPattern;
use crate::error::SegmentError;
use crate::rules::{DecisionRecord, DecisionStatus, RuleId, Ruling};
use crate::span::{CharSpan, SpanKey};

/// Per-span decision history, newest entry last.
#[derive(Debug, Default)]
pub struct AdjudicationLedger {
    records: HashMap<SpanKey, Vec<DecisionRecord>>,
    order: Vec<SpanKey>,
}

impl AdjudicationLedger {
    pub fn new() -> Self {
        Self::default()
    }

    /// Appends an automatic decision from the rule engine.
    pub fn record(&mut self, record: DecisionRecord) {
        let history = self.records.entry(record.key.clone()).or_default();
        if history.is_empty() {
            self.order.push(record.key.clone());
        }
        history.push(record);
    }

    /// Marks a span uncertain directly, outside a rule-engine pass. Used
    /// when imported annotations carry a review marker of their own.
    ///
    /// The record carries a per-span `Imported:` pattern. The rule engine
    /// never generates that label, so adjudicating an imported span can
    /// never overwrite a precedent derived from engine decisions.
    pub fn record_uncertain(&mut self, key: SpanKey, marker: impl Into<String>) {
        let pattern = StructuralPattern::new(format!("Imported:{key}"));
        self.record(DecisionRecord {
            key: key.clone(),
            ruling: Ruling::Merge,
            segments: vec![key.span],
            class: None,
            justification: RuleId::Default,
            status: DecisionStatus::Uncertain {
                marker: marker.into(),
            },
            pattern,
            alternatives: Vec::new(),
        });
    }

    /// The decision currently in force for a span.
    pub fn latest(&self, key: &SpanKey) -> Option<&DecisionRecord> {
        self.records.get(key).and_then(|h| h.last())
    }

    /// Every decision ever taken on a span, oldest first.
    pub fn history(&self, key: &SpanKey) -> &[DecisionRecord] {
        self.records.get(key).map(Vec::as_slice).unwrap_or(&[])
    }

    /// Whether a span already carries a decision, confident or not.
    pub fn contains(&self, key: &SpanKey) -> bool {
        self.records.contains_key(key)
    }

    /// Spans whose latest decision is still marked uncertain.
    pub fn pending(&self) -> Vec<SpanKey> {
        self.order
            .iter()
            .filter(|key| {
                self.latest(key)
                    .map(|r| r.status.is_uncertain())
                    .unwrap_or(false)
            })
            .cloned()
            .collect()
    }

    /// Appends a human ruling on top of a span's history.
    ///
    /// Adjudicating a span that was already adjudicated is allowed; the
    /// earlier ruling stays in the history as a superseded entry.
    pub fn adjudicate(
        &mut self,
        key: &SpanKey,
        ruling: Ruling,
        segments: Vec<CharSpan>,
        adjudicator: &str,
        rationale: &str,
    ) -> Result<DecisionRecord, SegmentError> {
        let history = self
            .records
            .get_mut(key)
            .filter(|h| !h.is_empty())
            .ok_or_else(|| SegmentError::SpanNotFound { key: key.clone() })?;

        let prior = &history[history.len() - 1];
        if matches!(prior.status, DecisionStatus::Adjudicated { .. }) {
            tracing::info!(span = %key, "superseding an earlier adjudication");
        }

        let record = DecisionRecord {
            key: key.clone(),
            ruling,
            segments,
            class: None,
            justification: RuleId::Default,
            status: DecisionStatus::Adjudicated {
                adjudicator: adjudicator.to_string(),
                rationale: rationale.to_string(),
            },
            pattern: prior.pattern.clone(),
            alternatives: Vec::new(),
        };
        history.push(record.clone());
        Ok(record)
    }

    /// Spans in the order they were first decided.
    pub fn spans(&self) -> impl Iterator<Item = &SpanKey> {
        self.order.iter()
    }

    pub fn len(&self) -> usize {
        self.records.len()
    }

    pub fn is_empty(&self) -> bool {
        self.records.is_empty()
    }
}
