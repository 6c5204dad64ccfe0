//! Error types for the mechbot gateway

use thiserror::Error;

/// Result type alias for mechbot operations
pub type Result<T> = std::result::Result<T, Error>;

/// Errors that can occur in the mechbot gateway
#[derive(Debug, Error)]
pub enum Error {
    /// A required request field is missing or empty
    #[error("validation error: {0}")]
    Validation(String),

    /// Knowledge source could not be loaded
    #[error("knowledge base unavailable: {0}")]
    KnowledgeBaseUnavailable(String),

    /// Conversation history could not be read
    #[error("history unavailable: {0}")]
    HistoryUnavailable(String),

    /// Unexpected failure while matching, selecting or persisting
    #[error("internal error: {0}")]
    Internal(String),

    /// Resource not found
    #[error("not found: {0}")]
    NotFound(String),

    /// Configuration error
    #[error("configuration error: {0}")]
    Config(String),

    /// IO error
    #[error("io error: {0}")]
    Io(#[from] std::io::Error),

    /// Database error
    #[error("database error: {0}")]
    Database(String),

    /// `SQLite` error
    #[error("sqlite error: {0}")]
    Sqlite(#[from] rusqlite::Error),
}

impl Error {
    /// Whether the error was caused by the caller rather than the system
    #[must_use]
    pub const fn is_client_error(&self) -> bool {
        matches!(self, Self::Validation(_) | Self::NotFound(_))
    }
}
