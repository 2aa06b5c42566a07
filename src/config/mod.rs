//! Configuration management for the retrieval core
//!
//! Handles loading, validation and persistence of the TOML configuration
//! driving chunking, document processing and search behavior.

use crate::chunking::ChunkingOptions;
use crate::error::{CellitoError, Result};
use serde::{Deserialize, Serialize};
use std::path::{Path, PathBuf};

mod validator;

pub use validator::ConfigValidator;

/// Main configuration structure
#[derive(Debug, Clone, Serialize, Deserialize)]
pub struct Config {
    #[serde(rename = "_meta")]
    pub meta: MetaConfig,
    #[serde(default)]
    pub chunking: ChunkingOptions,
    #[serde(default)]
    pub processing: ProcessingConfig,
    #[serde(default)]
    pub search: SearchConfig,
}

/// Metadata about the configuration
#[derive(Debug, Clone, Serialize, Deserialize)]
pub struct MetaConfig {
    pub schema_version: String,
    #[serde(default = "current_timestamp")]
    pub created_at: String,
    #[serde(default = "current_timestamp")]
    pub last_modified: String,
}

fn current_timestamp() -> String {
    chrono::Utc::now().to_rfc3339()
}

/// Document processing configuration
#[derive(Debug, Clone, Serialize, Deserialize)]
#[serde(default)]
pub struct ProcessingConfig {
    /// Documents with fewer characters than this are rejected
    pub min_document_chars: usize,
    /// Per-document chunking deadline in seconds
    pub document_timeout_secs: u64,
    /// A pause is inserted after every this many documents
    pub yield_every: usize,
    /// Length of that pause in milliseconds
    pub yield_pause_ms: u64,
}

impl Default for ProcessingConfig {
    fn default() -> Self {
        Self {
            min_document_chars: 50,
            document_timeout_secs: 30,
            yield_every: 10,
            yield_pause_ms: 100,
        }
    }
}

/// Search configuration
#[derive(Debug, Clone, Serialize, Deserialize)]
#[serde(default)]
pub struct SearchConfig {
    /// Default maximum number of chunks returned per query
    pub max_chunks: usize,
    /// Matches scoring below this are dropped
    pub min_score: u32,
    /// Number of search results retained in history
    pub history_limit: usize,
}

impl Default for SearchConfig {
    fn default() -> Self {
        Self {
            max_chunks: 5,
            min_score: 5,
            history_limit: 50,
        }
    }
}

impl Config {
    /// Load configuration from a file
    pub fn load(path: &Path) -> Result<Self> {
        if !path.exists() {
            return Err(CellitoError::ConfigNotFound {
                path: path.to_path_buf(),
            });
        }

        let content = std::fs::read_to_string(path).map_err(|e| CellitoError::Io {
            source: e,
            context: format!("Failed to read config file: {:?}", path),
        })?;
        let mut config: Config = toml::from_str(&content)?;

        // Apply environment variable overrides
        config.apply_env_overrides();

        // Validate configuration
        ConfigValidator::validate(&config)?;

        Ok(config)
    }

    /// Save configuration to a file
    pub fn save(&self, path: &Path) -> Result<()> {
        let content = toml::to_string_pretty(self)?;
        std::fs::write(path, content).map_err(|e| CellitoError::Io {
            source: e,
            context: format!("Failed to write config file: {:?}", path),
        })?;
        Ok(())
    }

    /// Apply environment variable overrides
    /// Environment variables in format: CELLITO_SECTION__KEY=value
    pub fn apply_env_overrides(&mut self) {
        for (key, value) in std::env::vars() {
            if let Some(config_key) = key.strip_prefix("CELLITO_") {
                if let Err(e) = self.set_value_from_env(config_key, &value) {
                    tracing::warn!("Failed to apply env override {}: {}", key, e);
                }
            }
        }
    }

    fn set_value_from_env(&mut self, path: &str, value: &str) -> Result<()> {
        match path {
            "CHUNKING__CHUNK_SIZE" => {
                self.chunking.chunk_size = Self::parse_env(path, value)?;
            }
            "CHUNKING__MIN_CHUNK_SIZE" => {
                self.chunking.min_chunk_size = Self::parse_env(path, value)?;
            }
            "CHUNKING__MAX_CHUNK_SIZE" => {
                self.chunking.max_chunk_size = Self::parse_env(path, value)?;
            }
            "PROCESSING__DOCUMENT_TIMEOUT_SECS" => {
                self.processing.document_timeout_secs = Self::parse_env(path, value)?;
            }
            "SEARCH__MAX_CHUNKS" => {
                self.search.max_chunks = Self::parse_env(path, value)?;
            }
            "SEARCH__MIN_SCORE" => {
                self.search.min_score = Self::parse_env(path, value)?;
            }
            _ => {
                tracing::debug!("Unknown env config key: {}", path);
            }
        }
        Ok(())
    }

    fn parse_env<T: std::str::FromStr>(path: &str, value: &str) -> Result<T> {
        value
            .parse()
            .map_err(|_| CellitoError::InvalidConfigValue {
                path: path.to_string(),
                message: format!("Cannot parse '{}' as a number", value),
            })
    }

    /// Get the default configuration file path
    pub fn default_path() -> Result<PathBuf> {
        let config_dir = dirs::config_dir()
            .ok_or_else(|| CellitoError::Config("Cannot determine config directory".to_string()))?;

        Ok(config_dir.join("cellito").join("config.toml"))
    }
}

impl Default for Config {
    fn default() -> Self {
        Self {
            meta: MetaConfig {
                schema_version: "1.0.0".to_string(),
                created_at: current_timestamp(),
                last_modified: current_timestamp(),
            },
            chunking: ChunkingOptions::default(),
            processing: ProcessingConfig::default(),
            search: SearchConfig::default(),
        }
    }
}

#[cfg(test)]
mod tests {
    use super::*;

    #[test]
    fn test_default_config_is_valid() {
        let config = Config::default();
        assert!(ConfigValidator::validate(&config).is_ok());
    }

    #[test]
    fn test_save_and_load_round_trip() {
        let temp = tempfile::TempDir::new().unwrap();
        let path = temp.path().join("config.toml");

        let config = Config::default();
        config.save(&path).unwrap();

        let loaded = Config::load(&path).unwrap();
        assert_eq!(loaded.chunking.chunk_size, config.chunking.chunk_size);
        assert_eq!(loaded.search.history_limit, config.search.history_limit);
        assert_eq!(
            loaded.processing.document_timeout_secs,
            config.processing.document_timeout_secs
        );
    }

    #[test]
    fn test_load_missing_file() {
        let result = Config::load(Path::new("/nonexistent/cellito.toml"));
        assert!(matches!(result, Err(CellitoError::ConfigNotFound { .. })));
    }

    #[test]
    fn test_partial_file_uses_defaults() {
        let temp = tempfile::TempDir::new().unwrap();
        let path = temp.path().join("config.toml");
        std::fs::write(
            &path,
            "[_meta]\nschema_version = \"1.0.0\"\n\n[search]\nmax_chunks = 8\n",
        )
        .unwrap();

        let loaded = Config::load(&path).unwrap();
        assert_eq!(loaded.search.max_chunks, 8);
        assert_eq!(loaded.chunking.chunk_size, 800);
        assert_eq!(loaded.search.history_limit, 50);
    }
}
