//! Immutable question/answer knowledge base

use std::path::Path;

use serde::{Deserialize, Serialize};

use crate::{Error, Result};

/// A single question/answer pair
///
/// Identity is the entry's position in the loaded set
#[derive(Debug, Clone, PartialEq, Eq, Serialize, Deserialize)]
pub struct KnowledgeEntry {
    pub question: String,
    pub answer: String,
}

impl KnowledgeEntry {
    /// Create an entry
    #[must_use]
    pub fn new(question: impl Into<String>, answer: impl Into<String>) -> Self {
        Self {
            question: question.into(),
            answer: answer.into(),
        }
    }
}

/// On-disk layouts accepted by the loader
#[derive(Deserialize)]
#[serde(untagged)]
enum KnowledgeFile {
    /// `{"questions": [...]}`
    Wrapped { questions: Vec<KnowledgeEntry> },
    /// `[...]`
    Bare(Vec<KnowledgeEntry>),
}

/// Question/answer pairs loaded once at startup and shared read-only
#[derive(Debug, Clone, Default, PartialEq, Eq)]
pub struct KnowledgeBase {
    entries: Vec<KnowledgeEntry>,
}

impl KnowledgeBase {
    /// Build a knowledge base, dropping entries with a blank question or answer
    #[must_use]
    pub fn new(entries: Vec<KnowledgeEntry>) -> Self {
        let total = entries.len();
        let entries: Vec<KnowledgeEntry> = entries
            .into_iter()
            .filter(|e| !e.question.trim().is_empty() && !e.answer.trim().is_empty())
            .collect();

        if entries.len() < total {
            tracing::warn!(
                skipped = total - entries.len(),
                "skipped knowledge entries with blank question or answer"
            );
        }

        Self { entries }
    }

    /// An empty knowledge base
    #[must_use]
    pub const fn empty() -> Self {
        Self {
            entries: Vec::new(),
        }
    }

    /// Parse a knowledge base from JSON text
    ///
    /// # Errors
    ///
    /// Returns `KnowledgeBaseUnavailable` if the text is not a supported layout
    pub fn from_json(text: &str) -> Result<Self> {
        let file: KnowledgeFile = serde_json::from_str(text)
            .map_err(|e| Error::KnowledgeBaseUnavailable(format!("malformed knowledge file: {e}")))?;

        let entries = match file {
            KnowledgeFile::Wrapped { questions } => questions,
            KnowledgeFile::Bare(entries) => entries,
        };

        Ok(Self::new(entries))
    }

    /// Read and parse a knowledge file
    ///
    /// # Errors
    ///
    /// Returns `KnowledgeBaseUnavailable` if the file is missing, unreadable or malformed
    pub fn from_file(path: &Path) -> Result<Self> {
        let text = std::fs::read_to_string(path).map_err(|e| {
            Error::KnowledgeBaseUnavailable(format!("{}: {e}", path.display()))
        })?;
        Self::from_json(&text)
    }

    /// Load a knowledge file, degrading to an empty knowledge base on failure
    ///
    /// The failure is logged here once; callers never see it
    #[must_use]
    pub fn load_or_empty(path: &Path) -> Self {
        match Self::from_file(path) {
            Ok(kb) => {
                tracing::info!(
                    path = %path.display(),
                    entries = kb.len(),
                    "loaded knowledge base"
                );
                kb
            }
            Err(e) => {
                tracing::error!(
                    path = %path.display(),
                    error = %e,
                    "knowledge base unavailable, continuing with an empty one"
                );
                Self::empty()
            }
        }
    }

    /// Entries in load order
    #[must_use]
    pub fn entries(&self) -> &[KnowledgeEntry] {
        &self.entries
    }

    #[must_use]
    pub fn len(&self) -> usize {
        self.entries.len()
    }

    #[must_use]
    pub fn is_empty(&self) -> bool {
        self.entries.is_empty()
    }
}
