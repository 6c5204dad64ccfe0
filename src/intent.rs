//! Keyword-based intent classification
//!
//! An utterance is lowercased and tested against an ordered intent table.
//! The first definition with any keyword occurring as a substring wins, so
//! overlapping keywords ("force" is both a stress and a mechanics keyword)
//! are resolved by table order alone.

use std::fmt;
use std::str::FromStr;

use serde::{Deserialize, Serialize};

use crate::Error;

/// Classified purpose of an utterance
#[derive(Debug, Clone, Copy, PartialEq, Eq, Hash, Serialize, Deserialize)]
#[serde(rename_all = "snake_case")]
pub enum IntentLabel {
    Greeting,
    Farewell,
    StressQuery,
    ThermodynamicsQuery,
    MaterialQuery,
    MechanicsQuery,
    FatigueQuery,
    Unknown,
}

impl IntentLabel {
    /// Every label, in declaration order
    pub const ALL: [Self; 8] = [
        Self::Greeting,
        Self::Farewell,
        Self::StressQuery,
        Self::ThermodynamicsQuery,
        Self::MaterialQuery,
        Self::MechanicsQuery,
        Self::FatigueQuery,
        Self::Unknown,
    ];

    /// Wire name of the label
    #[must_use]
    pub const fn as_str(self) -> &'static str {
        match self {
            Self::Greeting => "greeting",
            Self::Farewell => "farewell",
            Self::StressQuery => "stress_query",
            Self::ThermodynamicsQuery => "thermodynamics_query",
            Self::MaterialQuery => "material_query",
            Self::MechanicsQuery => "mechanics_query",
            Self::FatigueQuery => "fatigue_query",
            Self::Unknown => "unknown",
        }
    }
}

impl fmt::Display for IntentLabel {
    fn fmt(&self, f: &mut fmt::Formatter<'_>) -> fmt::Result {
        f.write_str(self.as_str())
    }
}

impl FromStr for IntentLabel {
    type Err = Error;

    fn from_str(s: &str) -> Result<Self, Self::Err> {
        let wanted = s.trim();
        Self::ALL
            .into_iter()
            .find(|label| label.as_str() == wanted)
            .ok_or_else(|| Error::Validation(format!("unrecognized intent: {wanted}")))
    }
}

/// One row of the intent table
#[derive(Debug, Clone, PartialEq, Eq)]
pub struct IntentDefinition {
    pub label: IntentLabel,
    /// Lowercased keywords; any substring hit selects this intent
    pub keywords: Vec<String>,
    /// Whether answers come from the knowledge base and may be augmented
    pub is_domain_query: bool,
}

impl IntentDefinition {
    /// Create a definition, normalizing keywords to lowercase
    #[must_use]
    pub fn new(label: IntentLabel, keywords: &[&str], is_domain_query: bool) -> Self {
        Self {
            label,
            keywords: keywords.iter().map(|k| k.to_lowercase()).collect(),
            is_domain_query,
        }
    }

    fn matches(&self, normalized: &str) -> bool {
        self.keywords
            .iter()
            .any(|keyword| !keyword.is_empty() && normalized.contains(keyword.as_str()))
    }
}

/// Ordered intent definitions; earlier rows take priority
#[derive(Debug, Clone, PartialEq, Eq)]
pub struct IntentTable {
    definitions: Vec<IntentDefinition>,
}

impl IntentTable {
    /// Create a table from definitions in priority order
    #[must_use]
    pub const fn new(definitions: Vec<IntentDefinition>) -> Self {
        Self { definitions }
    }

    /// The mechanical-engineering table the gateway ships with
    #[must_use]
    pub fn mechanical() -> Self {
        Self::new(vec![
            IntentDefinition::new(
                IntentLabel::StressQuery,
                &["stress", "force", "area", "deformation"],
                true,
            ),
            IntentDefinition::new(
                IntentLabel::ThermodynamicsQuery,
                &["thermodynamics", "energy", "heat", "work"],
                true,
            ),
            IntentDefinition::new(
                IntentLabel::MaterialQuery,
                &[
                    "young’s modulus",
                    "stiffness",
                    "elasticity",
                    "material",
                    "young",
                    "modulus",
                ],
                true,
            ),
            IntentDefinition::new(
                IntentLabel::MechanicsQuery,
                &["free body diagram", "force", "moment", "equilibrium"],
                true,
            ),
            IntentDefinition::new(
                IntentLabel::FatigueQuery,
                &["fatigue", "failure", "cyclic loading", "crack"],
                true,
            ),
            IntentDefinition::new(IntentLabel::Greeting, &["hi", "hello", "hey"], false),
            IntentDefinition::new(IntentLabel::Farewell, &["bye", "goodbye"], false),
        ])
    }

    /// Definitions in priority order
    #[must_use]
    pub fn definitions(&self) -> &[IntentDefinition] {
        &self.definitions
    }

    /// Whether `label` is flagged as a domain query in this table
    ///
    /// Labels absent from the table (including `unknown`) are not domain queries
    #[must_use]
    pub fn is_domain_query(&self, label: IntentLabel) -> bool {
        self.definitions
            .iter()
            .find(|d| d.label == label)
            .is_some_and(|d| d.is_domain_query)
    }
}

impl Default for IntentTable {
    fn default() -> Self {
        Self::mechanical()
    }
}

/// Maps raw utterances to intent labels
#[derive(Debug, Clone, Default)]
pub struct IntentClassifier {
    table: IntentTable,
}

impl IntentClassifier {
    /// Create a classifier over an intent table
    #[must_use]
    pub const fn new(table: IntentTable) -> Self {
        Self { table }
    }

    /// Classify an utterance; never fails, `Unknown` is the fallback
    #[must_use]
    pub fn classify(&self, utterance: &str) -> IntentLabel {
        let normalized = utterance.to_lowercase();

        let label = self
            .table
            .definitions()
            .iter()
            .find(|d| d.matches(&normalized))
            .map_or(IntentLabel::Unknown, |d| d.label);

        tracing::debug!(intent = %label, "classified utterance");
        label
    }

    /// The table this classifier consults
    #[must_use]
    pub const fn table(&self) -> &IntentTable {
        &self.table
    }
}
