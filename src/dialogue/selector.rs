//! Response selection for a classified utterance

use std::sync::Arc;

use rand::Rng;

use super::context::ContextAugmenter;
use super::history::ConversationTurn;
use super::responses::ResponseCatalog;
use crate::intent::{IntentLabel, IntentTable};
use crate::knowledge::{FuzzyMatcher, KnowledgeBase};

/// A chosen response and how it was reached
#[derive(Debug, Clone, PartialEq, Eq)]
pub struct Selection {
    pub response: String,
    /// Knowledge match score, `None` for social intents
    pub match_score: Option<u8>,
}

/// Chooses the reply for a classified utterance
///
/// Social intents get a canned reply. Everything else is looked up in the
/// knowledge base and falls back to a clarification request; knowledge
/// answers to domain queries may gain a follow-up suggestion.
///
/// Holds only immutable state, so one selector can serve concurrent requests;
/// randomness comes from the caller.
#[derive(Debug, Clone)]
pub struct ResponseSelector {
    knowledge: Arc<KnowledgeBase>,
    intents: IntentTable,
    matcher: FuzzyMatcher,
    augmenter: ContextAugmenter,
    catalog: ResponseCatalog,
}

impl ResponseSelector {
    /// Create a selector with the default intent table, threshold and replies
    #[must_use]
    pub fn new(knowledge: Arc<KnowledgeBase>) -> Self {
        Self {
            knowledge,
            intents: IntentTable::default(),
            matcher: FuzzyMatcher::default(),
            augmenter: ContextAugmenter::default(),
            catalog: ResponseCatalog::default(),
        }
    }

    /// Use a custom intent table for domain-query flags
    #[must_use]
    pub fn intents(mut self, intents: IntentTable) -> Self {
        self.intents = intents;
        self
    }

    /// Use a custom matcher
    #[must_use]
    pub const fn matcher(mut self, matcher: FuzzyMatcher) -> Self {
        self.matcher = matcher;
        self
    }

    /// Use a custom augmenter
    #[must_use]
    pub fn augmenter(mut self, augmenter: ContextAugmenter) -> Self {
        self.augmenter = augmenter;
        self
    }

    /// Use custom canned replies
    #[must_use]
    pub fn catalog(mut self, catalog: ResponseCatalog) -> Self {
        self.catalog = catalog;
        self
    }

    /// The knowledge base consulted for domain answers
    #[must_use]
    pub fn knowledge(&self) -> &KnowledgeBase {
        &self.knowledge
    }

    /// Number of past turns the augmenter looks at
    #[must_use]
    pub const fn history_turns(&self) -> usize {
        self.augmenter.max_turns()
    }

    /// Choose a reply; always non-empty
    #[must_use]
    pub fn select<R: Rng + ?Sized>(
        &self,
        user_id: &str,
        intent: IntentLabel,
        message: &str,
        history: &[ConversationTurn],
        rng: &mut R,
    ) -> String {
        self.select_detailed(user_id, intent, message, history, rng)
            .response
    }

    /// Choose a reply and report the knowledge score behind it
    #[must_use]
    pub fn select_detailed<R: Rng + ?Sized>(
        &self,
        user_id: &str,
        intent: IntentLabel,
        message: &str,
        history: &[ConversationTurn],
        rng: &mut R,
    ) -> Selection {
        match intent {
            IntentLabel::Greeting => Selection {
                response: self.catalog.greeting(rng).to_string(),
                match_score: None,
            },
            IntentLabel::Farewell => Selection {
                response: self.catalog.farewell(rng).to_string(),
                match_score: None,
            },
            _ => self.answer_from_knowledge(user_id, intent, message, history, rng),
        }
    }

    fn answer_from_knowledge<R: Rng + ?Sized>(
        &self,
        user_id: &str,
        intent: IntentLabel,
        message: &str,
        history: &[ConversationTurn],
        rng: &mut R,
    ) -> Selection {
        let result = self.matcher.best_match(message, self.knowledge.entries());
        let is_domain_query = self.intents.is_domain_query(intent);

        let response = match result.answer {
            Some(answer) if is_domain_query => {
                self.augmenter.augment(&answer, message, history, true)
            }
            Some(answer) => answer,
            None => {
                tracing::debug!(user_id, %intent, "no knowledge match, asking for clarification");
                self.catalog.clarification(rng).to_string()
            }
        };

        Selection {
            response,
            match_score: Some(result.score),
        }
    }
}

#[cfg(test)]
mod tests {
    use rand::SeedableRng;
    use rand::rngs::StdRng;

    use super::*;
    use crate::dialogue::context::DEFAULT_FOLLOW_UP;
    use crate::knowledge::KnowledgeEntry;

    fn stress_kb() -> Arc<KnowledgeBase> {
        Arc::new(KnowledgeBase::new(vec![
            KnowledgeEntry::new("What is stress?", "Stress is force per unit area."),
            KnowledgeEntry::new(
                "What is thermodynamics?",
                "Thermodynamics studies heat, work and energy.",
            ),
        ]))
    }

    fn turn(message: &str) -> ConversationTurn {
        ConversationTurn::now("user1", message, "ok")
    }

    #[test]
    fn test_greeting_from_fixed_list() {
        let selector = ResponseSelector::new(stress_kb());
        let catalog = ResponseCatalog::default();
        let mut rng = StdRng::seed_from_u64(1);

        for _ in 0..20 {
            let reply = selector.select("user1", IntentLabel::Greeting, "hello", &[], &mut rng);
            assert!(catalog.greetings().contains(&reply));
        }
    }

    #[test]
    fn test_farewell_from_fixed_list() {
        let selector = ResponseSelector::new(stress_kb());
        let mut rng = StdRng::seed_from_u64(2);
        let reply = selector.select("user1", IntentLabel::Farewell, "bye", &[], &mut rng);
        assert!(ResponseCatalog::default().farewells().contains(&reply));
    }

    #[test]
    fn test_domain_query_uses_knowledge() {
        let selector = ResponseSelector::new(stress_kb());
        let mut rng = StdRng::seed_from_u64(3);
        let selection = selector.select_detailed(
            "user1",
            IntentLabel::StressQuery,
            "what is stress",
            &[],
            &mut rng,
        );
        assert_eq!(selection.response, "Stress is force per unit area.");
        assert!(selection.match_score.unwrap() >= 90);
    }

    #[test]
    fn test_unmatched_query_asks_for_clarification() {
        let selector = ResponseSelector::new(stress_kb());
        let mut rng = StdRng::seed_from_u64(4);
        let reply = selector.select(
            "user1",
            IntentLabel::Unknown,
            "tell me about xyz123",
            &[],
            &mut rng,
        );
        assert!(ResponseCatalog::default().clarifications().contains(&reply));
    }

    #[test]
    fn test_empty_knowledge_base_always_clarifies() {
        let selector = ResponseSelector::new(Arc::new(KnowledgeBase::empty()));
        let clarifications = ResponseCatalog::default();
        let mut rng = StdRng::seed_from_u64(5);

        for _ in 0..20 {
            let reply = selector.select(
                "user1",
                IntentLabel::StressQuery,
                "what is stress",
                &[],
                &mut rng,
            );
            assert!(clarifications.clarifications().contains(&reply));
        }
    }

    #[test]
    fn test_follow_up_on_continued_topic() {
        let selector = ResponseSelector::new(stress_kb());
        let history = vec![turn("explain thermodynamics basics")];
        let mut rng = StdRng::seed_from_u64(6);

        let reply = selector.select(
            "user1",
            IntentLabel::ThermodynamicsQuery,
            "What is thermodynamics?",
            &history,
            &mut rng,
        );
        assert!(reply.starts_with("Thermodynamics studies heat, work and energy."));
        assert!(reply.ends_with(DEFAULT_FOLLOW_UP));
    }

    #[test]
    fn test_unknown_intent_is_never_augmented() {
        let selector = ResponseSelector::new(stress_kb());
        let history = vec![turn("thermodynamics")];
        let mut rng = StdRng::seed_from_u64(7);

        let reply = selector.select(
            "user1",
            IntentLabel::Unknown,
            "What is thermodynamics?",
            &history,
            &mut rng,
        );
        assert_eq!(reply, "Thermodynamics studies heat, work and energy.");
    }

    #[test]
    fn test_same_seed_same_reply() {
        let selector = ResponseSelector::new(stress_kb());
        for intent in [IntentLabel::Greeting, IntentLabel::Farewell, IntentLabel::Unknown] {
            let a = selector.select("u", intent, "zzz", &[], &mut StdRng::seed_from_u64(42));
            let b = selector.select("u", intent, "zzz", &[], &mut StdRng::seed_from_u64(42));
            assert_eq!(a, b);
        }
    }

    #[test]
    fn test_replies_are_never_empty() {
        let selector = ResponseSelector::new(Arc::new(KnowledgeBase::empty()));
        let mut rng = StdRng::seed_from_u64(8);
        for intent in IntentLabel::ALL {
            assert!(!selector.select("u", intent, "", &[], &mut rng).is_empty());
        }
    }
}
