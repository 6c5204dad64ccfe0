//! Knowledge base and fuzzy question matching
//!
//! - **base**: immutable question/answer pairs loaded from a JSON file
//! - **fuzzy**: closest-question lookup with an edit-similarity ratio

mod base;
mod fuzzy;

pub use base::{KnowledgeBase, KnowledgeEntry};
pub use fuzzy::{FuzzyMatcher, MATCH_THRESHOLD, MatchResult, similarity};
