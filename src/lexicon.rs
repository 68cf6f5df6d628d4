//! Lexicon store: the read-only word list the engine segments against.
//!
//! Entries carry a [`CohesionClass`] saying *why* a span should stay in one
//! piece (personal name, place, time word, idiom, fixed collocation,
//! transliteration). Lookup is dictionary-keyed by first character for O(1)
//! bucket access, then matched by remaining cells.
//!
//! Graphical variant characters (異体字) are handled with a normalization
//! map: each variant group is collapsed onto its most frequent member, so
//! 爲/為/为 all hit the same entry. The map is built from corpus character
//! frequencies and applied to both entries and queries.
//!
//! A miss is a normal outcome, not an error — callers get an empty slice
//! and fall through to the rule engine's split branches.

use std::collections::HashMap;

use serde::{Deserialize, Serialize};
use unicode_segmentation::UnicodeSegmentation;

use crate::error::SegmentError;

/// Why a lexicon entry should be treated as a single unit.
#[derive(Debug, Clone, Copy, PartialEq, Eq, Hash, Serialize, Deserialize)]
pub enum CohesionClass {
    /// Surnames, given names, courtesy names, full personal names.
    PersonalName,
    /// Place names, offices, temples, institutions.
    PlaceOrInstitution,
    /// Era names (nianhao), cyclical dates, named festivals.
    TimeWord,
    /// Chengyu and other lexicalized idioms.
    Idiom,
    /// Fixed collocations kept whole by convention (e.g. 子曰).
    FixedCollocation,
    /// Phonetic transliterations of foreign words.
    Transliteration,
}

impl CohesionClass {
    /// Stable label used when building structural patterns and exports.
    pub fn label(&self) -> &'static str {
        match self {
            CohesionClass::PersonalName => "PersonalName",
            CohesionClass::PlaceOrInstitution => "PlaceOrInstitution",
            CohesionClass::TimeWord => "TimeWord",
            CohesionClass::Idiom => "Idiom",
            CohesionClass::FixedCollocation => "FixedCollocation",
            CohesionClass::Transliteration => "Transliteration",
        }
    }

    /// True for the classes rule 3 (proper-noun cohesion) covers.
    pub fn is_proper_noun(&self) -> bool {
        matches!(
            self,
            CohesionClass::PersonalName
                | CohesionClass::PlaceOrInstitution
                | CohesionClass::TimeWord
        )
    }
}

/// One curated lexicon record.
#[derive(Debug, Clone, PartialEq, Serialize, Deserialize)]
pub struct LexiconEntry {
    /// Surface form after variant normalization.
    pub text: String,
    pub class: CohesionClass,
    #[serde(default)]
    pub gloss: Option<String>,
}

impl LexiconEntry {
    pub fn new(text: impl Into<String>, class: CohesionClass) -> Self {
        Self {
            text: text.into(),
            class,
            gloss: None,
        }
    }

    pub fn with_gloss(mut self, gloss: impl Into<String>) -> Self {
        self.gloss = Some(gloss.into());
        self
    }
}

/// Splits a string into character cells (extended grapheme clusters).
pub fn cells_of(text: &str) -> Vec<String> {
    text.graphemes(true).map(|g| g.to_string()).collect()
}

/// Parse a variant dictionary file: groups of variant characters
/// separated by `|`, e.g. `爲為为|竜龍`.
pub fn parse_variant_groups(content: &str) -> Vec<Vec<String>> {
    content
        .split('|')
        .map(|part| cells_of(part.trim()))
        .filter(|group| group.len() > 1)
        .collect()
}

/// Builds the variant → canonical map, mapping every group member onto the
/// member with the highest corpus frequency.
pub fn build_variant_map(
    groups: &[Vec<String>],
    char_counts: &HashMap<String, usize>,
) -> HashMap<String, String> {
    let mut map = HashMap::new();
    for group in groups {
        let best = group
            .iter()
            .max_by_key(|c| char_counts.get(c.as_str()).copied().unwrap_or(0))
            .cloned();
        if let Some(best) = best {
            for c in group {
                if *c != best {
                    map.insert(c.clone(), best.clone());
                }
            }
        }
    }
    map
}

/// The lexicon store.
///
/// Read-mostly: curation happens outside the engine; the engine only loads
/// snapshots and queries them.
#[derive(Debug, Clone, Default)]
pub struct Lexicon {
    entries: Vec<LexiconEntry>,
    /// Normalized first cell → (remaining normalized cells, entry index).
    by_first: HashMap<String, Vec<(Vec<String>, usize)>>,
    variant_map: HashMap<String, String>,
    max_len: usize,
}

impl Lexicon {
    pub fn new() -> Self {
        Self::default()
    }

    /// Empty lexicon with a variant normalization map already installed.
    pub fn with_variant_map(variant_map: HashMap<String, String>) -> Self {
        Self {
            variant_map,
            ..Self::default()
        }
    }

    /// Loads a lexicon snapshot in RON format: a list of
    /// `(text: "...", class: ..., gloss: ...)` records.
    pub fn from_ron_str(snapshot: &str) -> Result<Self, SegmentError> {
        let records: Vec<LexiconEntry> = ron::from_str(snapshot)?;
        let mut lexicon = Self::new();
        for entry in records {
            lexicon.add_entry(entry);
        }
        Ok(lexicon)
    }

    pub fn add(&mut self, text: &str, class: CohesionClass) {
        self.add_entry(LexiconEntry::new(text, class));
    }

    pub fn add_entry(&mut self, mut entry: LexiconEntry) {
        let cells: Vec<String> = cells_of(&entry.text)
            .into_iter()
            .map(|c| self.normalize_cell(c))
            .collect();
        if cells.is_empty() {
            return;
        }
        entry.text = cells.concat();
        self.max_len = self.max_len.max(cells.len());

        let idx = self.entries.len();
        let first = cells[0].clone();
        let rest = cells[1..].to_vec();
        self.entries.push(entry);
        self.by_first.entry(first).or_default().push((rest, idx));
    }

    pub fn len(&self) -> usize {
        self.entries.len()
    }

    pub fn is_empty(&self) -> bool {
        self.entries.is_empty()
    }

    /// Length in cells of the longest entry; merges beyond this are never
    /// proposed by the candidate generator.
    pub fn max_entry_len(&self) -> usize {
        self.max_len
    }

    fn normalize_cell(&self, cell: String) -> String {
        self.variant_map.get(&cell).cloned().unwrap_or(cell)
    }

    /// Variant-normalized form of `text`.
    pub fn normalize(&self, text: &str) -> String {
        cells_of(text)
            .into_iter()
            .map(|c| self.normalize_cell(c))
            .collect()
    }

    /// Exact lookup. Returns every entry whose normalized form equals the
    /// normalized query; empty on a miss.
    pub fn lookup(&self, text: &str) -> Vec<&LexiconEntry> {
        let cells: Vec<String> = cells_of(text)
            .into_iter()
            .map(|c| self.normalize_cell(c))
            .collect();
        let Some(first) = cells.first() else {
            return Vec::new();
        };
        let Some(bucket) = self.by_first.get(first) else {
            return Vec::new();
        };
        bucket
            .iter()
            .filter(|(rest, _)| rest.len() == cells.len() - 1 && rest[..] == cells[1..])
            .map(|(_, idx)| &self.entries[*idx])
            .collect()
    }

    /// True if any entry of the given class exactly matches `text`.
    pub fn has_class(&self, text: &str, class: CohesionClass) -> bool {
        self.lookup(text).iter().any(|e| e.class == class)
    }

    /// True if some entry of `class` is strictly longer than `text` and has
    /// it as a prefix. Used to detect transliterations cut off by the end
    /// of a document.
    pub fn has_longer_with_prefix(&self, text: &str, class: CohesionClass) -> bool {
        let cells: Vec<String> = cells_of(text)
            .into_iter()
            .map(|c| self.normalize_cell(c))
            .collect();
        let Some(first) = cells.first() else {
            return false;
        };
        let Some(bucket) = self.by_first.get(first) else {
            return false;
        };
        bucket.iter().any(|(rest, idx)| {
            self.entries[*idx].class == class
                && rest.len() + 1 > cells.len()
                && rest[..cells.len() - 1] == cells[1..]
        })
    }

    /// True if some entry of `class` is strictly longer than `text` and has
    /// it as a suffix. Mirror of [`Self::has_longer_with_prefix`], for
    /// fragments whose leading characters were lost.
    pub fn has_longer_with_suffix(&self, text: &str, class: CohesionClass) -> bool {
        let cells: Vec<String> = cells_of(text)
            .into_iter()
            .map(|c| self.normalize_cell(c))
            .collect();
        if cells.is_empty() {
            return false;
        }
        // An entry of n cells stores n - 1 tail cells, so a strictly longer
        // entry always holds the whole fragment inside its tail.
        self.by_first.values().any(|bucket| {
            bucket.iter().any(|(rest, idx)| {
                self.entries[*idx].class == class
                    && rest.len() >= cells.len()
                    && rest[rest.len() - cells.len()..] == cells[..]
            })
        })
    }

    /// All entries matching a prefix of `cells` starting at `pos`,
    /// as `(length_in_cells, entry)` pairs. Overlapping and nested matches
    /// are all returned; disambiguation is the rule engine's job.
    pub fn matches_at(&self, cells: &[String], pos: usize) -> Vec<(usize, &LexiconEntry)> {
        let Some(first) = cells.get(pos) else {
            return Vec::new();
        };
        let first = self.normalize_cell(first.clone());
        let Some(bucket) = self.by_first.get(&first) else {
            return Vec::new();
        };

        let mut found = Vec::new();
        for (rest, idx) in bucket {
            let end = pos + 1 + rest.len();
            if end > cells.len() {
                continue;
            }
            let matches = rest
                .iter()
                .zip(&cells[pos + 1..end])
                .all(|(want, have)| *want == self.normalize_cell(have.clone()));
            if matches {
                found.push((1 + rest.len(), &self.entries[*idx]));
            }
        }
        // Longest first so callers see the coarsest merge first.
        found.sort_by(|a, b| b.0.cmp(&a.0));
        found
    }
}
