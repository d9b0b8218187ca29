use crate::error::{Result, TrendzError};
use serde::{Deserialize, Serialize};
use std::fs;
use std::path::Path;
use std::time::Duration;

const CONFIG_FILENAME: &str = "config.json";

const DEFAULT_DB_PATH: &str = "trendz.sqlite";
const DEFAULT_TRENDS_DIR: &str = "trends";
const DEFAULT_STOPWORDS_PATH: &str = "filter.txt";
const DEFAULT_KEY_PREFIX: &str = "trends:";
const DEFAULT_DECAY_INTERVAL_SECS: u64 = 2 * 60 * 60;

/// Configuration for trendz, stored in config.json
#[derive(Debug, Clone, Serialize, Deserialize, PartialEq, Eq)]
pub struct TrendzConfig {
    /// SQLite file for the snapshot store
    #[serde(default = "default_db_path")]
    pub db_path: String,

    /// Root directory of the file-backed live store
    #[serde(default = "default_trends_dir")]
    pub trends_dir: String,

    /// Newline-delimited stopword file
    #[serde(default = "default_stopwords_path")]
    pub stopwords_path: String,

    /// Prefix for live store keys (one key per group)
    #[serde(default = "default_key_prefix")]
    pub key_prefix: String,

    /// Seconds between decay sweeps
    #[serde(default = "default_decay_interval_secs")]
    pub decay_interval_secs: u64,
}

fn default_db_path() -> String {
    DEFAULT_DB_PATH.to_string()
}

fn default_trends_dir() -> String {
    DEFAULT_TRENDS_DIR.to_string()
}

fn default_stopwords_path() -> String {
    DEFAULT_STOPWORDS_PATH.to_string()
}

fn default_key_prefix() -> String {
    DEFAULT_KEY_PREFIX.to_string()
}

fn default_decay_interval_secs() -> u64 {
    DEFAULT_DECAY_INTERVAL_SECS
}

impl Default for TrendzConfig {
    fn default() -> Self {
        Self {
            db_path: default_db_path(),
            trends_dir: default_trends_dir(),
            stopwords_path: default_stopwords_path(),
            key_prefix: default_key_prefix(),
            decay_interval_secs: default_decay_interval_secs(),
        }
    }
}

impl TrendzConfig {
    /// Load config from the given directory, or return defaults if not found
    pub fn load<P: AsRef<Path>>(config_dir: P) -> Result<Self> {
        let config_path = config_dir.as_ref().join(CONFIG_FILENAME);

        if !config_path.exists() {
            return Ok(Self::default());
        }

        let content = fs::read_to_string(&config_path).map_err(TrendzError::Io)?;
        let config: TrendzConfig =
            serde_json::from_str(&content).map_err(TrendzError::Serialization)?;
        Ok(config)
    }

    /// Save config to the given directory
    pub fn save<P: AsRef<Path>>(&self, config_dir: P) -> Result<()> {
        let config_dir = config_dir.as_ref();

        if !config_dir.exists() {
            fs::create_dir_all(config_dir).map_err(TrendzError::Io)?;
        }

        let config_path = config_dir.join(CONFIG_FILENAME);
        let content = serde_json::to_string_pretty(self).map_err(TrendzError::Serialization)?;
        fs::write(config_path, content).map_err(TrendzError::Io)?;
        Ok(())
    }

    pub fn decay_interval(&self) -> Duration {
        Duration::from_secs(self.decay_interval_secs)
    }
}

#[cfg(test)]
mod tests {
    use super::*;

    #[test]
    fn test_default_config() {
        let config = TrendzConfig::default();
        assert_eq!(config.db_path, "trendz.sqlite");
        assert_eq!(config.key_prefix, "trends:");
        assert_eq!(config.decay_interval(), Duration::from_secs(7200));
    }

    #[test]
    fn test_load_missing_config() {
        let temp_dir = tempfile::tempdir().unwrap();
        let config = TrendzConfig::load(temp_dir.path()).unwrap();
        assert_eq!(config, TrendzConfig::default());
    }

    #[test]
    fn test_save_and_load() {
        let temp_dir = tempfile::tempdir().unwrap();

        let mut config = TrendzConfig::default();
        config.decay_interval_secs = 600;
        config.db_path = "custom.sqlite".to_string();
        config.save(temp_dir.path()).unwrap();

        let loaded = TrendzConfig::load(temp_dir.path()).unwrap();
        assert_eq!(loaded, config);
    }

    #[test]
    fn test_partial_config_fills_defaults() {
        let temp_dir = tempfile::tempdir().unwrap();
        let path = temp_dir.path().join("config.json");
        fs::write(&path, r#"{"db_path": "other.sqlite"}"#).unwrap();

        let config = TrendzConfig::load(temp_dir.path()).unwrap();
        assert_eq!(config.db_path, "other.sqlite");
        assert_eq!(config.key_prefix, "trends:");
    }

    #[test]
    fn test_serialization_roundtrip() {
        let config = TrendzConfig {
            db_path: "a.sqlite".to_string(),
            trends_dir: "t".to_string(),
            stopwords_path: "s.txt".to_string(),
            key_prefix: "p:".to_string(),
            decay_interval_secs: 1,
        };

        let json = serde_json::to_string(&config).unwrap();
        let parsed: TrendzConfig = serde_json::from_str(&json).unwrap();
        assert_eq!(config, parsed);
    }
}
