//! Request-scoped chat pipeline
//!
//! Wraps the pure classification and selection core with its collaborators:
//! user lookup before, history retrieval around, and turn persistence after.

use std::sync::Arc;

use rand::Rng;
use serde::{Deserialize, Serialize};

use crate::config::Config;
use crate::db::{ConversationRepo, DbPool, UserRepo};
use crate::dialogue::{ConversationTurn, HistoryStore, ResponseSelector};
use crate::intent::{IntentClassifier, IntentLabel, IntentTable};
use crate::knowledge::KnowledgeBase;
use crate::{Error, Result};

/// Incoming chat message
#[derive(Debug, Clone, Default, Deserialize)]
pub struct ChatRequest {
    #[serde(default)]
    pub user_id: String,
    #[serde(default)]
    pub message: String,
}

impl ChatRequest {
    #[must_use]
    pub fn new(user_id: impl Into<String>, message: impl Into<String>) -> Self {
        Self {
            user_id: user_id.into(),
            message: message.into(),
        }
    }
}

/// Reply produced for a chat message
#[derive(Debug, Clone, PartialEq, Eq, Serialize)]
pub struct ChatReply {
    pub response: String,
    pub intent: IntentLabel,
    #[serde(skip_serializing_if = "Option::is_none")]
    pub match_score: Option<u8>,
}

/// Classify, answer and log one message at a time
#[derive(Clone)]
pub struct ChatService {
    classifier: IntentClassifier,
    selector: Arc<ResponseSelector>,
    users: UserRepo,
    history: Arc<dyn HistoryStore>,
}

impl ChatService {
    /// Create a chat service
    #[must_use]
    pub fn new(
        classifier: IntentClassifier,
        selector: Arc<ResponseSelector>,
        users: UserRepo,
        history: Arc<dyn HistoryStore>,
    ) -> Self {
        Self {
            classifier,
            selector,
            users,
            history,
        }
    }

    /// Wire a chat service over `SQLite` storage using configured tuning
    #[must_use]
    pub fn from_config(config: &Config, pool: DbPool, knowledge: Arc<KnowledgeBase>) -> Self {
        let intents = IntentTable::default();
        let selector = ResponseSelector::new(knowledge)
            .intents(intents.clone())
            .matcher(config.fuzzy_matcher())
            .augmenter(config.context_augmenter());

        Self::new(
            IntentClassifier::new(intents),
            Arc::new(selector),
            UserRepo::new(pool.clone()),
            Arc::new(ConversationRepo::new(pool)),
        )
    }

    #[must_use]
    pub const fn classifier(&self) -> &IntentClassifier {
        &self.classifier
    }

    #[must_use]
    pub fn selector(&self) -> &ResponseSelector {
        &self.selector
    }

    #[must_use]
    pub const fn users(&self) -> &UserRepo {
        &self.users
    }

    /// Answer a message from a registered user
    ///
    /// # Errors
    ///
    /// Returns `Validation` for blank fields, `NotFound` for an unknown user,
    /// or `Internal` if the turn cannot be recorded
    pub fn respond<R: Rng + ?Sized>(&self, request: &ChatRequest, rng: &mut R) -> Result<ChatReply> {
        let user_id = required("user_id", &request.user_id)?;
        let message = required("message", &request.message)?;

        if self.users.find(user_id)?.is_none() {
            return Err(Error::NotFound(format!("user {user_id}")));
        }

        let intent = self.classifier.classify(message);
        self.respond_with_intent(user_id, intent, message, rng)
    }

    /// Answer a message whose intent is already known
    ///
    /// # Errors
    ///
    /// Returns `Validation` for blank fields or `Internal` if the turn cannot
    /// be recorded
    pub fn respond_with_intent<R: Rng + ?Sized>(
        &self,
        user_id: &str,
        intent: IntentLabel,
        message: &str,
        rng: &mut R,
    ) -> Result<ChatReply> {
        let user_id = required("user_id", user_id)?;
        let message = required("message", message)?;

        let history = self.load_history(user_id);
        let selection = self
            .selector
            .select_detailed(user_id, intent, message, &history, rng);

        self.history
            .append_turn(user_id, message, &selection.response)
            .map_err(|e| {
                tracing::error!(user_id, error = %e, "failed to record conversation turn");
                Error::Internal(format!("failed to record conversation turn: {e}"))
            })?;

        tracing::info!(
            user_id,
            %intent,
            score = ?selection.match_score,
            history = history.len(),
            "answered message"
        );

        Ok(ChatReply {
            response: selection.response,
            intent,
            match_score: selection.match_score,
        })
    }

    /// Recent turns, or none if the store fails
    fn load_history(&self, user_id: &str) -> Vec<ConversationTurn> {
        match self
            .history
            .recent_turns(user_id, self.selector.history_turns())
        {
            Ok(turns) => turns,
            Err(e) => {
                tracing::warn!(user_id, error = %e, "history unavailable, answering without context");
                Vec::new()
            }
        }
    }
}

/// Reject blank values; the value itself passes through untrimmed
fn required<'a>(field: &str, value: &'a str) -> Result<&'a str> {
    if value.trim().is_empty() {
        return Err(Error::Validation(format!("{field} is required")));
    }
    Ok(value)
}

#[cfg(test)]
mod tests {
    use std::sync::Mutex;

    use rand::SeedableRng;
    use rand::rngs::StdRng;

    use super::*;
    use crate::db::{ConversationRepo, init_memory};
    use crate::dialogue::{DEFAULT_FOLLOW_UP, ResponseCatalog};
    use crate::knowledge::{KnowledgeBase, KnowledgeEntry};

    /// History store whose reads always fail
    struct BrokenHistory {
        appended: Mutex<Vec<String>>,
    }

    impl HistoryStore for BrokenHistory {
        fn recent_turns(&self, _user_id: &str, _limit: usize) -> Result<Vec<ConversationTurn>> {
            Err(Error::HistoryUnavailable("disk on fire".to_string()))
        }

        fn append_turn(
            &self,
            user_id: &str,
            message: &str,
            response: &str,
        ) -> Result<ConversationTurn> {
            self.appended.lock().unwrap().push(message.to_string());
            Ok(ConversationTurn::now(user_id, message, response))
        }
    }

    /// History store whose writes always fail
    struct ReadOnlyHistory;

    impl HistoryStore for ReadOnlyHistory {
        fn recent_turns(&self, _user_id: &str, _limit: usize) -> Result<Vec<ConversationTurn>> {
            Ok(Vec::new())
        }

        fn append_turn(&self, _: &str, _: &str, _: &str) -> Result<ConversationTurn> {
            Err(Error::Database("read-only".to_string()))
        }
    }

    fn knowledge() -> Arc<KnowledgeBase> {
        Arc::new(KnowledgeBase::new(vec![
            KnowledgeEntry::new("What is stress?", "Stress is force per unit area."),
            KnowledgeEntry::new(
                "What is thermodynamics?",
                "Thermodynamics studies heat, work and energy.",
            ),
        ]))
    }

    fn service_with(history: Arc<dyn HistoryStore>) -> ChatService {
        let pool = init_memory().unwrap();
        ChatService::new(
            IntentClassifier::default(),
            Arc::new(ResponseSelector::new(knowledge())),
            UserRepo::new(pool),
            history,
        )
    }

    fn service() -> (ChatService, ConversationRepo) {
        let pool = init_memory().unwrap();
        let conversations = ConversationRepo::new(pool.clone());
        let service = ChatService::new(
            IntentClassifier::default(),
            Arc::new(ResponseSelector::new(knowledge())),
            UserRepo::new(pool),
            Arc::new(conversations.clone()),
        );
        (service, conversations)
    }

    #[test]
    fn test_answers_and_records_turn() {
        let (service, conversations) = service();
        let mut rng = StdRng::seed_from_u64(1);

        let reply = service
            .respond(&ChatRequest::new("user1", "What is stress?"), &mut rng)
            .unwrap();

        assert_eq!(reply.intent, IntentLabel::StressQuery);
        assert_eq!(reply.response, "Stress is force per unit area.");
        assert_eq!(reply.match_score, Some(100));

        let turns = conversations.recent("user1", 3).unwrap();
        assert_eq!(turns.len(), 1);
        assert_eq!(turns[0].response, reply.response);
    }

    #[test]
    fn test_history_drives_follow_up() {
        let (service, _) = service();
        let mut rng = StdRng::seed_from_u64(2);

        service
            .respond(&ChatRequest::new("user1", "explain thermodynamics basics"), &mut rng)
            .unwrap();
        let reply = service
            .respond(&ChatRequest::new("user1", "What is thermodynamics?"), &mut rng)
            .unwrap();

        assert!(reply.response.ends_with(DEFAULT_FOLLOW_UP));
    }

    #[test]
    fn test_validation_errors() {
        let (service, _) = service();
        let mut rng = StdRng::seed_from_u64(3);

        let err = service
            .respond(&ChatRequest::new("", "hello"), &mut rng)
            .unwrap_err();
        assert!(matches!(err, Error::Validation(_)));

        let err = service
            .respond(&ChatRequest::new("user1", "   "), &mut rng)
            .unwrap_err();
        assert!(matches!(err, Error::Validation(_)));
    }

    #[test]
    fn test_message_is_scored_and_stored_verbatim() {
        let (service, conversations) = service();
        let mut rng = StdRng::seed_from_u64(8);

        let reply = service
            .respond(&ChatRequest::new("user1", "  What is stress?  "), &mut rng)
            .unwrap();

        assert_eq!(reply.response, "Stress is force per unit area.");
        assert!(reply.match_score.unwrap() < 100);
        assert_eq!(
            conversations.recent("user1", 1).unwrap()[0].message,
            "  What is stress?  "
        );
    }

    #[test]
    fn test_user_store_failure_is_not_a_client_error() {
        let pool = init_memory().unwrap();
        pool.get().unwrap().execute_batch("DROP TABLE users;").unwrap();

        let service = ChatService::new(
            IntentClassifier::default(),
            Arc::new(ResponseSelector::new(knowledge())),
            UserRepo::new(pool.clone()),
            Arc::new(ConversationRepo::new(pool)),
        );
        let mut rng = StdRng::seed_from_u64(9);

        let err = service
            .respond(&ChatRequest::new("user1", "hello"), &mut rng)
            .unwrap_err();
        assert!(matches!(err, Error::Database(_)));
        assert!(!err.is_client_error());
    }

    #[test]
    fn test_unknown_user_is_not_found() {
        let (service, conversations) = service();
        let mut rng = StdRng::seed_from_u64(4);

        let err = service
            .respond(&ChatRequest::new("stranger", "hello"), &mut rng)
            .unwrap_err();
        assert!(matches!(err, Error::NotFound(_)));
        assert_eq!(conversations.count("stranger").unwrap(), 0);
    }

    #[test]
    fn test_broken_history_degrades() {
        let history = Arc::new(BrokenHistory {
            appended: Mutex::new(Vec::new()),
        });
        let service = service_with(history.clone());
        let mut rng = StdRng::seed_from_u64(5);

        let reply = service
            .respond(&ChatRequest::new("user1", "What is thermodynamics?"), &mut rng)
            .unwrap();

        assert_eq!(reply.response, "Thermodynamics studies heat, work and energy.");
        assert_eq!(history.appended.lock().unwrap().len(), 1);
    }

    #[test]
    fn test_failed_append_is_internal() {
        let service = service_with(Arc::new(ReadOnlyHistory));
        let mut rng = StdRng::seed_from_u64(6);

        let err = service
            .respond(&ChatRequest::new("user1", "hello"), &mut rng)
            .unwrap_err();
        assert!(matches!(err, Error::Internal(_)));
    }

    #[test]
    fn test_respond_with_intent_skips_classification() {
        let (service, _) = service();
        let mut rng = StdRng::seed_from_u64(7);

        let reply = service
            .respond_with_intent("user1", IntentLabel::Farewell, "What is stress?", &mut rng)
            .unwrap();

        assert_eq!(reply.intent, IntentLabel::Farewell);
        assert!(ResponseCatalog::default().farewells().contains(&reply.response));
    }
}
