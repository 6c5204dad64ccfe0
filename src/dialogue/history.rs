//! Conversation turns and the store that serves them

use chrono::{DateTime, Utc};
use serde::Serialize;

use crate::Result;

/// Number of past turns consulted for context
pub const DEFAULT_HISTORY_TURNS: usize = 3;

/// One stored exchange between a user and the gateway
#[derive(Debug, Clone, PartialEq, Eq, Serialize)]
pub struct ConversationTurn {
    pub user_id: String,
    pub message: String,
    pub response: String,
    pub timestamp: DateTime<Utc>,
}

impl ConversationTurn {
    /// Create a turn stamped with the current time
    #[must_use]
    pub fn now(
        user_id: impl Into<String>,
        message: impl Into<String>,
        response: impl Into<String>,
    ) -> Self {
        Self {
            user_id: user_id.into(),
            message: message.into(),
            response: response.into(),
            timestamp: Utc::now(),
        }
    }
}

/// Append-only log of conversation turns
pub trait HistoryStore: Send + Sync {
    /// Most recent turns for a user, newest first
    ///
    /// # Errors
    ///
    /// Returns `HistoryUnavailable` if the store cannot be read
    fn recent_turns(&self, user_id: &str, limit: usize) -> Result<Vec<ConversationTurn>>;

    /// Record a completed turn
    ///
    /// # Errors
    ///
    /// Returns error if the turn cannot be stored
    fn append_turn(&self, user_id: &str, message: &str, response: &str)
        -> Result<ConversationTurn>;
}
