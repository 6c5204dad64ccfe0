//! Approximate question matching against the knowledge base
//!
//! Similarity is the indel ratio `200 * lcs / (len(a) + len(b))`, rounded to
//! an integer in `0..=100`, where `lcs` is the longest common subsequence of
//! the two lowercased strings counted in `char`s.
//!
//! This is the hot path of the gateway: every domain or unknown utterance is
//! compared with every knowledge entry, costing
//! O(entries x |query| x |question|) time. Each comparison keeps a single DP
//! row, and candidates whose length alone caps them below the current best
//! are skipped without running the DP.

use super::base::KnowledgeEntry;

/// Scores at or below this never produce a match
pub const MATCH_THRESHOLD: u8 = 60;

/// Outcome of matching a query against the knowledge base
#[derive(Debug, Clone, Default, PartialEq, Eq)]
pub struct MatchResult {
    /// Answer of the best qualifying entry
    pub answer: Option<String>,
    /// Best qualifying score, 0 if nothing qualified
    pub score: u8,
    /// Load position of the matched entry
    pub index: Option<usize>,
}

/// Finds the knowledge entry whose question is closest to a query
#[derive(Debug, Clone, Copy)]
pub struct FuzzyMatcher {
    threshold: u8,
}

impl Default for FuzzyMatcher {
    fn default() -> Self {
        Self::new(MATCH_THRESHOLD)
    }
}

impl FuzzyMatcher {
    /// Create a matcher; candidates must score strictly above `threshold`
    #[must_use]
    pub const fn new(threshold: u8) -> Self {
        let threshold = if threshold > 100 { 100 } else { threshold };
        Self { threshold }
    }

    #[must_use]
    pub const fn threshold(&self) -> u8 {
        self.threshold
    }

    /// Best entry scoring strictly above the threshold
    ///
    /// Entries are scanned in load order and a later entry must beat the
    /// current best strictly, so ties keep the first-seen entry
    #[must_use]
    pub fn best_match(&self, query: &str, entries: &[KnowledgeEntry]) -> MatchResult {
        let query: Vec<char> = query.to_lowercase().chars().collect();
        let mut best = MatchResult::default();

        for (index, entry) in entries.iter().enumerate() {
            let floor = best.score.max(self.threshold);
            let question: Vec<char> = entry.question.to_lowercase().chars().collect();

            if ratio_upper_bound(query.len(), question.len()) <= floor {
                continue;
            }

            let score = ratio(&query, &question);
            tracing::trace!(index, score, question = %entry.question, "scored knowledge entry");

            if score > floor {
                best = MatchResult {
                    answer: Some(entry.answer.clone()),
                    score,
                    index: Some(index),
                };
            }
        }

        tracing::debug!(score = best.score, index = ?best.index, "knowledge match");
        best
    }
}

/// Case-insensitive similarity of two strings in `0..=100`
#[must_use]
pub fn similarity(a: &str, b: &str) -> u8 {
    let a: Vec<char> = a.to_lowercase().chars().collect();
    let b: Vec<char> = b.to_lowercase().chars().collect();
    ratio(&a, &b)
}

fn ratio(a: &[char], b: &[char]) -> u8 {
    if a.is_empty() || b.is_empty() {
        return 0;
    }
    scale(lcs_len(a, b), a.len() + b.len())
}

/// Highest score two strings of these lengths could reach
fn ratio_upper_bound(len_a: usize, len_b: usize) -> u8 {
    if len_a == 0 || len_b == 0 {
        return 0;
    }
    scale(len_a.min(len_b), len_a + len_b)
}

/// `round(200 * common / total)`, halves rounded up
fn scale(common: usize, total: usize) -> u8 {
    let rounded = (400 * common + total) / (2 * total);
    u8::try_from(rounded.min(100)).unwrap_or(100)
}

/// Longest common subsequence length with one rolling row
fn lcs_len(a: &[char], b: &[char]) -> usize {
    let (long, short) = if a.len() >= b.len() { (a, b) } else { (b, a) };
    let mut row = vec![0_usize; short.len() + 1];

    for &lc in long {
        let mut diagonal = 0;
        for (j, &sc) in short.iter().enumerate() {
            let above = row[j + 1];
            row[j + 1] = if lc == sc {
                diagonal + 1
            } else {
                above.max(row[j])
            };
            diagonal = above;
        }
    }

    row[short.len()]
}
