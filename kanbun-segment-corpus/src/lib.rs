//! Corpus statistics and lexicon induction for `kanbun-segment`.
//!
//! The engine crate decides boundaries one span at a time; this crate
//! supplies the corpus-level machinery around it:
//!
//! - [`matching`]: forward, reverse, and bidirectional maximum matching
//!   used to bootstrap a segmentation from a seed lexicon.
//! - [`collocation`]: pointwise and minimum mutual information scores for
//!   extracting multi-character word candidates from raw text.
//! - [`threshold`]: precision profiling of scored candidates against a
//!   reference lexicon and elbow-based cutoff selection.
//! - [`agreement`]: boundary-level inter-annotator agreement (Fleiss'
//!   kappa) and majority-vote drafting of a gold standard.

pub mod agreement;
pub mod collocation;
pub mod error;
pub mod matching;
pub mod threshold;

pub use agreement::{fleiss_kappa, majority_draft, BoundaryAnnotation};
pub use collocation::{CollocationScorer, ScoredNgram};
pub use error::CorpusError;
pub use matching::{
    backward_maximum_match, forward_maximum_match, BidirectionalMatcher, FrequencyTable,
};
pub use threshold::{coverage_profile, elbow_threshold, IntervalStat};
