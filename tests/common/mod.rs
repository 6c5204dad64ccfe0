//! Shared test utilities

use std::sync::Arc;

use mechbot_gateway::{
    ChatService, Config, DbPool, KnowledgeBase, KnowledgeEntry, db, config::MechbotConfigFile,
};

/// Set up an in-memory test database
#[must_use]
pub fn setup_test_db() -> DbPool {
    db::init_memory().expect("failed to init test db")
}

/// A small mechanical-engineering knowledge base
#[must_use]
pub fn test_knowledge() -> Arc<KnowledgeBase> {
    Arc::new(KnowledgeBase::new(vec![
        KnowledgeEntry::new("What is stress?", "Stress is force per unit area."),
        KnowledgeEntry::new(
            "What is thermodynamics?",
            "Thermodynamics studies heat, work and energy.",
        ),
        KnowledgeEntry::new(
            "What is Young's modulus?",
            "Young's modulus measures a material's stiffness.",
        ),
    ]))
}

/// Default configuration rooted in a scratch directory
#[must_use]
pub fn test_config() -> Config {
    Config::from_sources(&MechbotConfigFile::default(), |key| {
        (key == "MECHBOT_DATA_DIR").then(|| "/tmp/mechbot-test".to_string())
    })
    .expect("failed to build test config")
}

/// Chat service over an in-memory database
#[must_use]
pub fn test_chat_service(db: &DbPool, knowledge: Arc<KnowledgeBase>) -> ChatService {
    ChatService::from_config(&test_config(), db.clone(), knowledge)
}
