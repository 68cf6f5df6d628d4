//! Inter-annotator boundary agreement and gold-standard drafting.
//!
//! Independent annotators segment the same text with spaces; segmentation
//! is then compared at the level of boundary slots (the gaps between
//! adjacent character cells). Fleiss' kappa measures chance-corrected
//! agreement over those slots, and [`majority_draft`] collapses the
//! annotations into one draft, inserting the review marker wherever the
//! vote ties exactly.

use kanbun_segment::lexicon::{cells_of, Lexicon};
use kanbun_segment::UNCERTAIN_MARKER;

use crate::error::CorpusError;

/// One annotator's segmentation, reduced to cells and boundary slots.
/// Slot `i` sits between cell `i` and cell `i + 1`.
#[derive(Debug, Clone, PartialEq)]
pub struct BoundaryAnnotation {
    cells: Vec<String>,
    slots: Vec<bool>,
}

impl BoundaryAnnotation {
    /// Parses a space-segmented line, e.g. `"子曰 學 而 時習 之"`.
    pub fn parse(segmented: &str) -> Self {
        let mut cells = Vec::new();
        let mut slots = Vec::new();
        for word in segmented.split_whitespace() {
            for (i, cell) in cells_of(word).into_iter().enumerate() {
                if !cells.is_empty() {
                    slots.push(i == 0);
                }
                cells.push(cell);
            }
        }
        Self { cells, slots }
    }

    /// Maps every cell through the lexicon's variant table, so annotators
    /// who typed different variant characters still align.
    pub fn normalized(self, lexicon: &Lexicon) -> Self {
        Self {
            cells: self
                .cells
                .into_iter()
                .map(|c| lexicon.normalize(&c))
                .collect(),
            slots: self.slots,
        }
    }

    pub fn text(&self) -> String {
        self.cells.concat()
    }

    pub fn cells(&self) -> &[String] {
        &self.cells
    }

    pub fn slots(&self) -> &[bool] {
        &self.slots
    }
}

fn check_aligned(annotations: &[BoundaryAnnotation]) -> Result<(), CorpusError> {
    if annotations.len() < 2 {
        return Err(CorpusError::TooFewAnnotators(annotations.len()));
    }
    let expected = annotations[0].text();
    for (index, annotation) in annotations.iter().enumerate().skip(1) {
        let got = annotation.text();
        if got != expected {
            return Err(CorpusError::AnnotatorMisalignment {
                index,
                expected,
                got,
            });
        }
    }
    Ok(())
}

/// Fleiss' kappa over boundary slots, two categories (boundary or not).
///
/// A text too short to have any slot, or one where every annotator marks
/// every slot identically in the same category, is perfect agreement.
pub fn fleiss_kappa(annotations: &[BoundaryAnnotation]) -> Result<f64, CorpusError> {
    check_aligned(annotations)?;

    let n = annotations.len() as f64;
    let slots = annotations[0].slots.len();
    if slots == 0 {
        return Ok(1.0);
    }

    let mut p_sum = 0.0;
    let mut marked = 0u64;
    for slot in 0..slots {
        let b = annotations.iter().filter(|a| a.slots[slot]).count() as f64;
        let o = n - b;
        p_sum += (b * (b - 1.0) + o * (o - 1.0)) / (n * (n - 1.0));
        marked += b as u64;
    }

    let p_bar = p_sum / slots as f64;
    let p_boundary = marked as f64 / (slots as f64 * n);
    let p_chance = p_boundary * p_boundary + (1.0 - p_boundary) * (1.0 - p_boundary);
    if (1.0 - p_chance).abs() < f64::EPSILON {
        return Ok(1.0);
    }
    Ok((p_bar - p_chance) / (1.0 - p_chance))
}

/// Majority vote over boundary slots.
///
/// A strict majority decides each slot; an exact tie inserts the literal
/// review marker between the two cells so an adjudicator can find it.
pub fn majority_draft(annotations: &[BoundaryAnnotation]) -> Result<String, CorpusError> {
    check_aligned(annotations)?;

    let n = annotations.len();
    let mut out = String::new();
    for (i, cell) in annotations[0].cells.iter().enumerate() {
        if i > 0 {
            let marked = annotations.iter().filter(|a| a.slots[i - 1]).count();
            let unmarked = n - marked;
            if marked > unmarked {
                out.push(' ');
            } else if marked == unmarked {
                tracing::debug!(slot = i, "annotators tied, marking for review");
                out.push_str(UNCERTAIN_MARKER);
            }
        }
        out.push_str(cell);
    }
    Ok(out)
}
