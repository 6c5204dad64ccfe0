//! Dialogue: response selection with history-aware follow-ups
//!
//! - **history**: conversation turns and the `HistoryStore` seam
//! - **context**: follow-up suggestions on topical continuity
//! - **responses**: canned replies
//! - **selector**: dispatch on intent to pick the final reply

mod context;
mod history;
mod responses;
mod selector;

pub use context::{ContextAugmenter, DEFAULT_FOLLOW_UP, DEFAULT_TOPIC_KEYWORD};
pub use history::{ConversationTurn, DEFAULT_HISTORY_TURNS, HistoryStore};
pub use responses::ResponseCatalog;
pub use selector::{ResponseSelector, Selection};
