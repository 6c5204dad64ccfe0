//! Canned replies for social intents and unanswerable questions

use rand::Rng;
use rand::seq::SliceRandom;

use crate::{Error, Result};

const GREETINGS: [&str; 3] = [
    "Hello! Ask me about mechanical engineering topics like stress, thermodynamics, or materials.",
    "Hi! I’m here to help with mechanical engineering questions.",
    "Hey, let’s talk mechanics!",
];

const FAREWELLS: [&str; 3] = [
    "Goodbye! Let me know if you have more mechanical questions!",
    "See you later!",
    "Take care!",
];

const CLARIFICATIONS: [&str; 2] = [
    "Sorry, I’m not sure about that. Can you clarify your question?",
    "Hmm, that’s an interesting one! Could you provide more details?",
];

/// Fixed reply lists, each guaranteed non-empty
#[derive(Debug, Clone, PartialEq, Eq)]
pub struct ResponseCatalog {
    greetings: Vec<String>,
    farewells: Vec<String>,
    clarifications: Vec<String>,
}

impl Default for ResponseCatalog {
    fn default() -> Self {
        let owned = |list: &[&str]| -> Vec<String> { list.iter().map(ToString::to_string).collect() };
        Self {
            greetings: owned(&GREETINGS),
            farewells: owned(&FAREWELLS),
            clarifications: owned(&CLARIFICATIONS),
        }
    }
}

impl ResponseCatalog {
    /// Create a catalog from custom lists
    ///
    /// # Errors
    ///
    /// Returns `Config` if any list is empty or contains a blank reply
    pub fn new(
        greetings: Vec<String>,
        farewells: Vec<String>,
        clarifications: Vec<String>,
    ) -> Result<Self> {
        for (name, list) in [
            ("greetings", &greetings),
            ("farewells", &farewells),
            ("clarifications", &clarifications),
        ] {
            if list.is_empty() || list.iter().any(|r| r.trim().is_empty()) {
                return Err(Error::Config(format!(
                    "{name} must contain at least one non-blank reply"
                )));
            }
        }

        Ok(Self {
            greetings,
            farewells,
            clarifications,
        })
    }

    #[must_use]
    pub fn greetings(&self) -> &[String] {
        &self.greetings
    }

    #[must_use]
    pub fn farewells(&self) -> &[String] {
        &self.farewells
    }

    #[must_use]
    pub fn clarifications(&self) -> &[String] {
        &self.clarifications
    }

    pub(crate) fn greeting<R: Rng + ?Sized>(&self, rng: &mut R) -> &str {
        pick(&self.greetings, rng)
    }

    pub(crate) fn farewell<R: Rng + ?Sized>(&self, rng: &mut R) -> &str {
        pick(&self.farewells, rng)
    }

    pub(crate) fn clarification<R: Rng + ?Sized>(&self, rng: &mut R) -> &str {
        pick(&self.clarifications, rng)
    }
}

/// Uniform pick; lists are validated non-empty at construction
fn pick<'a, R: Rng + ?Sized>(options: &'a [String], rng: &mut R) -> &'a str {
    options.choose(rng).map_or(CLARIFICATIONS[0], String::as_str)
}
