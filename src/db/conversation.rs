//! Conversation log repository

use chrono::{SecondsFormat, Utc};
use uuid::Uuid;

use super::{DbPool, connection, parse_datetime};
use crate::dialogue::{ConversationTurn, HistoryStore};
use crate::{Error, Result};

/// Append-only conversation log backed by `SQLite`
#[derive(Clone)]
pub struct ConversationRepo {
    pool: DbPool,
}

impl ConversationRepo {
    /// Create a new conversation repository
    #[must_use]
    #[allow(clippy::missing_const_for_fn)]
    pub fn new(pool: DbPool) -> Self {
        Self { pool }
    }

    /// Record a turn
    ///
    /// # Errors
    ///
    /// Returns error if database operation fails
    pub fn append(&self, user_id: &str, message: &str, response: &str) -> Result<ConversationTurn> {
        let conn = connection(&self.pool)?;

        let id = Uuid::new_v4().to_string();
        let turn = ConversationTurn::now(user_id, message, response);
        // Fixed-width timestamps keep lexical and chronological order aligned
        let created_at = turn.timestamp.to_rfc3339_opts(SecondsFormat::Nanos, true);

        conn.execute(
            "INSERT INTO conversations (id, user_id, message, response, created_at)
             VALUES (?1, ?2, ?3, ?4, ?5)",
            rusqlite::params![id, user_id, message, response, created_at],
        )
        .map_err(|e| Error::Database(e.to_string()))?;

        Ok(turn)
    }

    /// Most recent turns for a user, newest first
    ///
    /// # Errors
    ///
    /// Returns error if database operation fails
    pub fn recent(&self, user_id: &str, limit: usize) -> Result<Vec<ConversationTurn>> {
        let conn = connection(&self.pool)?;

        let mut stmt = conn
            .prepare(
                "SELECT user_id, message, response, created_at
                 FROM conversations WHERE user_id = ?1
                 ORDER BY created_at DESC, rowid DESC LIMIT ?2",
            )
            .map_err(|e| Error::Database(e.to_string()))?;

        let limit = i64::try_from(limit).unwrap_or(i64::MAX);
        let turns = stmt
            .query_map(rusqlite::params![user_id, limit], |row| {
                Ok(ConversationTurn {
                    user_id: row.get(0)?,
                    message: row.get(1)?,
                    response: row.get(2)?,
                    timestamp: parse_datetime(&row.get::<_, String>(3)?),
                })
            })
            .map_err(|e| Error::Database(e.to_string()))?
            .collect::<rusqlite::Result<Vec<_>>>()
            .map_err(|e| Error::Database(e.to_string()))?;

        Ok(turns)
    }

    /// Count stored turns for a user
    ///
    /// # Errors
    ///
    /// Returns error if database operation fails
    pub fn count(&self, user_id: &str) -> Result<usize> {
        let conn = connection(&self.pool)?;

        let count: i64 = conn
            .query_row(
                "SELECT COUNT(*) FROM conversations WHERE user_id = ?1",
                [user_id],
                |row| row.get(0),
            )
            .map_err(|e| Error::Database(e.to_string()))?;

        Ok(usize::try_from(count).unwrap_or(0))
    }
}

impl HistoryStore for ConversationRepo {
    fn recent_turns(&self, user_id: &str, limit: usize) -> Result<Vec<ConversationTurn>> {
        self.recent(user_id, limit)
            .map_err(|e| Error::HistoryUnavailable(e.to_string()))
    }

    fn append_turn(
        &self,
        user_id: &str,
        message: &str,
        response: &str,
    ) -> Result<ConversationTurn> {
        self.append(user_id, message, response)
    }
}
