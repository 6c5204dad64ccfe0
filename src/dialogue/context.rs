//! Topical follow-up suggestions drawn from recent history

use super::history::{ConversationTurn, DEFAULT_HISTORY_TURNS};

/// Topic keyword whose repetition triggers a follow-up
pub const DEFAULT_TOPIC_KEYWORD: &str = "thermodynamic";

/// Suggestion appended when the topic continues
pub const DEFAULT_FOLLOW_UP: &str = "By the way, want to dive deeper into thermodynamics laws?";

/// Appends a follow-up when a user keeps returning to the same topic
#[derive(Debug, Clone, PartialEq, Eq)]
pub struct ContextAugmenter {
    topic_keyword: String,
    follow_up: String,
    max_turns: usize,
}

impl Default for ContextAugmenter {
    fn default() -> Self {
        Self::new(DEFAULT_TOPIC_KEYWORD, DEFAULT_FOLLOW_UP, DEFAULT_HISTORY_TURNS)
    }
}

impl ContextAugmenter {
    /// Create an augmenter; the keyword is matched case-insensitively
    #[must_use]
    pub fn new(topic_keyword: &str, follow_up: &str, max_turns: usize) -> Self {
        Self {
            topic_keyword: topic_keyword.to_lowercase(),
            follow_up: follow_up.to_string(),
            max_turns,
        }
    }

    #[must_use]
    pub const fn max_turns(&self) -> usize {
        self.max_turns
    }

    /// Append the follow-up to `base` when the topic continues
    ///
    /// The condition holds when the intent is a domain query, the current
    /// message mentions the topic, and so does at least one of the newest
    /// `max_turns` history messages. Otherwise `base` is returned unchanged.
    #[must_use]
    pub fn augment(
        &self,
        base: &str,
        message: &str,
        history: &[ConversationTurn],
        is_domain_query: bool,
    ) -> String {
        if self.continues_topic(message, history, is_domain_query) {
            tracing::debug!(topic = %self.topic_keyword, "appending follow-up suggestion");
            format!("{base} {}", self.follow_up)
        } else {
            base.to_string()
        }
    }

    fn continues_topic(
        &self,
        message: &str,
        history: &[ConversationTurn],
        is_domain_query: bool,
    ) -> bool {
        if !is_domain_query || self.topic_keyword.is_empty() || self.follow_up.is_empty() {
            return false;
        }

        if !message.to_lowercase().contains(&self.topic_keyword) {
            return false;
        }

        history
            .iter()
            .take(self.max_turns)
            .any(|turn| turn.message.to_lowercase().contains(&self.topic_keyword))
    }
}

#[cfg(test)]
mod tests {
    use super::*;

    fn turn(message: &str) -> ConversationTurn {
        ConversationTurn::now("user1", message, "ok")
    }

    #[test]
    fn test_appends_when_topic_continues() {
        let history = vec![turn("explain thermodynamics basics")];
        let out = ContextAugmenter::default().augment(
            "The first law conserves energy.",
            "more on thermodynamics please",
            &history,
            true,
        );

        assert_eq!(
            out,
            "The first law conserves energy. By the way, want to dive deeper into thermodynamics laws?"
        );
        assert!(out.ends_with(DEFAULT_FOLLOW_UP));
    }

    #[test]
    fn test_no_op_without_history() {
        let out = ContextAugmenter::default().augment("base", "thermodynamics again", &[], true);
        assert_eq!(out, "base");
    }

    #[test]
    fn test_no_op_when_not_domain_query() {
        let history = vec![turn("thermodynamics")];
        let out = ContextAugmenter::default().augment("base", "thermodynamics", &history, false);
        assert_eq!(out, "base");
    }

    #[test]
    fn test_no_op_when_current_message_off_topic() {
        let history = vec![turn("thermodynamics")];
        let out = ContextAugmenter::default().augment("base", "what is stress", &history, true);
        assert_eq!(out, "base");
    }

    #[test]
    fn test_only_newest_turns_are_consulted() {
        let history = vec![
            turn("stress"),
            turn("strain"),
            turn("fatigue"),
            turn("Thermodynamic cycles"),
        ];
        let augmenter = ContextAugmenter::default();

        let out = augmenter.augment("base", "thermodynamics", &history, true);
        assert_eq!(out, "base");

        let wider = ContextAugmenter::new(DEFAULT_TOPIC_KEYWORD, DEFAULT_FOLLOW_UP, 4);
        let out = wider.augment("base", "thermodynamics", &history, true);
        assert_ne!(out, "base");
    }

    #[test]
    fn test_case_insensitive_topic() {
        let history = vec![turn("THERMODYNAMICS")];
        let out = ContextAugmenter::default().augment("base", "ThermoDynamic entropy", &history, true);
        assert!(out.starts_with("base "));
    }

    #[test]
    fn test_only_appends() {
        let history = vec![turn("thermodynamics")];
        let augmenter = ContextAugmenter::default();
        for base in ["", "short", "A longer answer about heat engines."] {
            for msg in ["thermodynamics", "stress"] {
                let out = augmenter.augment(base, msg, &history, true);
                assert!(out.starts_with(base));
                assert!(out.len() >= base.len());
            }
        }
    }

    #[test]
    fn test_history_is_untouched() {
        let history = vec![turn("thermodynamics")];
        let before = history.clone();
        let _ = ContextAugmenter::default().augment("base", "thermodynamics", &history, true);
        assert_eq!(history, before);
    }
}
