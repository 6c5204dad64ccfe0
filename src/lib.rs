//! Mechbot Gateway - mechanical engineering Q&A over HTTP
//!
//! This library provides the core functionality for the mechbot gateway:
//! - Keyword intent classification
//! - Fuzzy question matching against a fixed knowledge base
//! - History-aware response selection
//! - User and conversation persistence
//!
//! # Architecture
//!
//! ```text
//! ┌─────────────────────────────────────────────────────┐
//! │                   HTTP API (axum)                    │
//! │    /chat  │  /process  │  /respond  │  /user/{id}   │
//! └────────────────────┬────────────────────────────────┘
//!                      │
//! ┌────────────────────▼────────────────────────────────┐
//! │                    ChatService                       │
//! │   validate  │  users  │  history  │  persist turn   │
//! └────────────────────┬────────────────────────────────┘
//!                      │
//! ┌────────────────────▼────────────────────────────────┐
//! │                  Pure core                           │
//! │ IntentClassifier │ ResponseSelector │ FuzzyMatcher  │
//! │ ContextAugmenter │ KnowledgeBase                     │
//! └─────────────────────────────────────────────────────┘
//! ```

pub mod api;
pub mod chat;
pub mod config;
pub mod db;
pub mod dialogue;
pub mod error;
pub mod intent;
pub mod knowledge;

pub use api::{ApiServer, ApiState};
pub use chat::{ChatReply, ChatRequest, ChatService};
pub use config::Config;
pub use db::{ConversationRepo, DbConn, DbPool, User, UserRepo};
pub use dialogue::{
    ContextAugmenter, ConversationTurn, HistoryStore, ResponseCatalog, ResponseSelector, Selection,
};
pub use error::{Error, Result};
pub use intent::{IntentClassifier, IntentDefinition, IntentLabel, IntentTable};
pub use knowledge::{FuzzyMatcher, KnowledgeBase, KnowledgeEntry, MATCH_THRESHOLD, MatchResult};
