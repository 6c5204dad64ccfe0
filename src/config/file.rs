//! TOML configuration file loading
//!
//! Supports `~/.config/mechbot/config.toml` as a persistent config source.
//! All fields are optional; the file is a partial overlay on top of defaults.

use std::path::{Path, PathBuf};

use serde::Deserialize;

/// Top-level TOML configuration file schema
#[derive(Debug, Default, Deserialize)]
pub struct MechbotConfigFile {
    /// Server/runtime configuration
    #[serde(default)]
    pub server: ServerFileConfig,

    /// Storage locations
    #[serde(default)]
    pub storage: StorageFileConfig,

    /// Knowledge matching
    #[serde(default)]
    pub matching: MatchingFileConfig,

    /// History-based follow-ups
    #[serde(default)]
    pub context: ContextFileConfig,
}

/// Server/runtime configuration
#[derive(Debug, Default, Deserialize)]
pub struct ServerFileConfig {
    /// API server port
    pub port: Option<u16>,
}

/// Storage locations
#[derive(Debug, Default, Deserialize)]
pub struct StorageFileConfig {
    /// Base directory for the database and knowledge file
    pub data_dir: Option<String>,
    /// `SQLite` database path
    pub database_path: Option<String>,
    /// Knowledge base JSON path
    pub knowledge_path: Option<String>,
}

/// Knowledge matching configuration
#[derive(Debug, Default, Deserialize)]
pub struct MatchingFileConfig {
    /// Minimum score a question must exceed to match (0-100)
    pub threshold: Option<u8>,
}

/// History-based follow-up configuration
#[derive(Debug, Default, Deserialize)]
pub struct ContextFileConfig {
    /// Past turns consulted
    pub history_turns: Option<usize>,
    /// Topic keyword that triggers the follow-up
    pub topic_keyword: Option<String>,
    /// Follow-up text appended to answers
    pub follow_up: Option<String>,
}

/// Load the TOML config file from the standard path
///
/// Returns `MechbotConfigFile::default()` if the file doesn't exist or can't be parsed.
pub fn load_config_file() -> MechbotConfigFile {
    config_file_path().map_or_else(MechbotConfigFile::default, |path| load_from(&path))
}

/// Load a config file from an explicit path, falling back to defaults
pub fn load_from(path: &Path) -> MechbotConfigFile {
    if !path.exists() {
        return MechbotConfigFile::default();
    }

    match std::fs::read_to_string(path) {
        Ok(content) => match toml::from_str(&content) {
            Ok(config) => {
                tracing::info!(path = %path.display(), "loaded config file");
                config
            }
            Err(e) => {
                tracing::warn!(
                    path = %path.display(),
                    error = %e,
                    "failed to parse config file, using defaults"
                );
                MechbotConfigFile::default()
            }
        },
        Err(e) => {
            tracing::warn!(
                path = %path.display(),
                error = %e,
                "failed to read config file"
            );
            MechbotConfigFile::default()
        }
    }
}

/// Return the config file path: `~/.config/mechbot/config.toml`
pub fn config_file_path() -> Option<PathBuf> {
    directories::BaseDirs::new().map(|d| d.config_dir().join("mechbot").join("config.toml"))
}

#[cfg(test)]
mod tests {
    use std::io::Write;

    use super::*;

    #[test]
    fn test_partial_file() {
        let mut file = tempfile::NamedTempFile::new().unwrap();
        writeln!(file, "[matching]\nthreshold = 70\n\n[context]\nhistory_turns = 5").unwrap();

        let config = load_from(file.path());
        assert_eq!(config.matching.threshold, Some(70));
        assert_eq!(config.context.history_turns, Some(5));
        assert!(config.server.port.is_none());
    }

    #[test]
    fn test_invalid_file_falls_back() {
        let mut file = tempfile::NamedTempFile::new().unwrap();
        writeln!(file, "[server]\nport = \"not a port\"").unwrap();

        let config = load_from(file.path());
        assert!(config.server.port.is_none());
    }

    #[test]
    fn test_missing_file_is_default() {
        let config = load_from(Path::new("/nonexistent/mechbot/config.toml"));
        assert!(config.storage.data_dir.is_none());
    }
}
