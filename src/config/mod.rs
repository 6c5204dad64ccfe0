//! Configuration management for the mechbot gateway
//!
//! Precedence: environment > TOML file > defaults

pub mod file;

use std::path::PathBuf;
use std::str::FromStr;

use crate::dialogue::{
    ContextAugmenter, DEFAULT_FOLLOW_UP, DEFAULT_HISTORY_TURNS, DEFAULT_TOPIC_KEYWORD,
};
use crate::knowledge::{FuzzyMatcher, MATCH_THRESHOLD};
use crate::{Error, Result};

pub use file::MechbotConfigFile;

/// Default HTTP port
pub const DEFAULT_PORT: u16 = 5000;

/// Default database file name inside the data directory
pub const DEFAULT_DATABASE_FILE: &str = "conversations.db";

/// Default knowledge file name inside the data directory
pub const DEFAULT_KNOWLEDGE_FILE: &str = "mechanical_knowledge.json";

/// Mechbot gateway configuration
#[derive(Debug, Clone, PartialEq, Eq)]
pub struct Config {
    /// Path to data directory (database, knowledge file)
    pub data_dir: PathBuf,

    /// `SQLite` database path
    pub database_path: PathBuf,

    /// Knowledge base JSON path
    pub knowledge_path: PathBuf,

    /// HTTP API server configuration
    pub server: ServerConfig,

    /// Knowledge matching configuration
    pub matching: MatchingConfig,

    /// History-based follow-up configuration
    pub context: ContextConfig,
}

/// HTTP API server configuration
#[derive(Debug, Clone, PartialEq, Eq)]
pub struct ServerConfig {
    /// Port to listen on
    pub port: u16,
}

/// Knowledge matching configuration
#[derive(Debug, Clone, PartialEq, Eq)]
pub struct MatchingConfig {
    /// Scores must exceed this to match
    pub threshold: u8,
}

/// History-based follow-up configuration
#[derive(Debug, Clone, PartialEq, Eq)]
pub struct ContextConfig {
    pub history_turns: usize,
    pub topic_keyword: String,
    pub follow_up: String,
}

impl Config {
    /// Load configuration from the environment and the standard config file
    ///
    /// # Errors
    ///
    /// Returns error if an environment override cannot be parsed or a value
    /// is out of range
    pub fn load() -> Result<Self> {
        let fc = file::load_config_file();
        let config = Self::from_sources(&fc, |key| std::env::var(key).ok())?;

        // Ensure data dir exists
        std::fs::create_dir_all(&config.data_dir).ok();

        Ok(config)
    }

    /// Resolve configuration from a parsed file and an environment lookup
    ///
    /// # Errors
    ///
    /// Returns error if an environment override cannot be parsed or a value
    /// is out of range
    pub fn from_sources(
        fc: &MechbotConfigFile,
        env: impl Fn(&str) -> Option<String>,
    ) -> Result<Self> {
        // Determine data directory (~/.local/share/mechbot on Linux)
        let data_dir = env("MECHBOT_DATA_DIR")
            .or_else(|| fc.storage.data_dir.clone())
            .map_or_else(default_data_dir, PathBuf::from);

        let database_path = env("MECHBOT_DB_PATH")
            .or_else(|| fc.storage.database_path.clone())
            .map_or_else(|| data_dir.join(DEFAULT_DATABASE_FILE), PathBuf::from);

        let knowledge_path = env("MECHBOT_KNOWLEDGE_PATH")
            .or_else(|| fc.storage.knowledge_path.clone())
            .map_or_else(|| data_dir.join(DEFAULT_KNOWLEDGE_FILE), PathBuf::from);

        let port_var = env("MECHBOT_PORT")
            .map(|raw| ("MECHBOT_PORT", raw))
            .or_else(|| env("PORT").map(|raw| ("PORT", raw)));
        let port = match port_var {
            Some((key, raw)) => parse_env(key, &raw)?,
            None => fc.server.port.unwrap_or(DEFAULT_PORT),
        };

        let threshold = match env("MECHBOT_MATCH_THRESHOLD") {
            Some(raw) => parse_env("MECHBOT_MATCH_THRESHOLD", &raw)?,
            None => fc.matching.threshold.unwrap_or(MATCH_THRESHOLD),
        };
        if threshold > 100 {
            return Err(Error::Config(format!(
                "match threshold must be between 0 and 100, got {threshold}"
            )));
        }

        let history_turns = match env("MECHBOT_HISTORY_TURNS") {
            Some(raw) => parse_env("MECHBOT_HISTORY_TURNS", &raw)?,
            None => fc.context.history_turns.unwrap_or(DEFAULT_HISTORY_TURNS),
        };

        let context = ContextConfig {
            history_turns,
            topic_keyword: fc
                .context
                .topic_keyword
                .clone()
                .unwrap_or_else(|| DEFAULT_TOPIC_KEYWORD.to_string()),
            follow_up: fc
                .context
                .follow_up
                .clone()
                .unwrap_or_else(|| DEFAULT_FOLLOW_UP.to_string()),
        };

        Ok(Self {
            data_dir,
            database_path,
            knowledge_path,
            server: ServerConfig { port },
            matching: MatchingConfig { threshold },
            context,
        })
    }

    /// Matcher using the configured threshold
    #[must_use]
    pub const fn fuzzy_matcher(&self) -> FuzzyMatcher {
        FuzzyMatcher::new(self.matching.threshold)
    }

    /// Augmenter using the configured topic and lookback
    #[must_use]
    pub fn context_augmenter(&self) -> ContextAugmenter {
        ContextAugmenter::new(
            &self.context.topic_keyword,
            &self.context.follow_up,
            self.context.history_turns,
        )
    }
}

/// Default data directory: `~/.local/share/mechbot/`
fn default_data_dir() -> PathBuf {
    directories::BaseDirs::new()
        .map_or_else(|| PathBuf::from("."), |d| d.data_dir().join("mechbot"))
}

fn parse_env<T: FromStr>(key: &str, raw: &str) -> Result<T>
where
    T::Err: std::fmt::Display,
{
    raw.trim()
        .parse()
        .map_err(|e| Error::Config(format!("invalid {key} value {raw:?}: {e}")))
}
