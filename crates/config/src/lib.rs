//! Configuration loading and validation for Quill.
//!
//! Loads `~/.quill/config.toml` with environment variable overrides and
//! validates all settings at startup. Missing file means defaults.

use serde::{Deserialize, Serialize};
use std::path::{Path, PathBuf};

/// The root configuration structure.
///
/// Maps directly to `~/.quill/config.toml`.
#[derive(Debug, Clone, Serialize, Deserialize)]
pub struct AppConfig {
    /// Name the assistant presents itself as.
    #[serde(default = "default_assistant_name")]
    pub assistant_name: String,

    /// Language model settings.
    #[serde(default)]
    pub model: ModelConfig,

    /// Relevance scoring weights and limits.
    #[serde(default)]
    pub scoring: ScoringConfig,

    /// Context store settings.
    #[serde(default)]
    pub context: ContextConfig,
}

fn default_assistant_name() -> String {
    "Quill".into()
}

#[derive(Debug, Clone, Serialize, Deserialize)]
pub struct ModelConfig {
    /// Model name the Ollama daemon serves.
    #[serde(default = "default_model")]
    pub model: String,

    /// Base URL of the Ollama daemon.
    #[serde(default = "default_base_url")]
    pub base_url: String,
}

fn default_model() -> String {
    "llama3".into()
}
fn default_base_url() -> String {
    "http://localhost:11434".into()
}

impl Default for ModelConfig {
    fn default() -> Self {
        Self {
            model: default_model(),
            base_url: default_base_url(),
        }
    }
}

#[derive(Debug, Clone, Serialize, Deserialize)]
pub struct ScoringConfig {
    #[serde(default = "default_keyword_weight")]
    pub keyword_weight: f64,

    #[serde(default = "default_recency_weight")]
    pub recency_weight: f64,

    #[serde(default = "default_importance_weight")]
    pub importance_weight: f64,

    #[serde(default = "default_context_weight")]
    pub context_weight: f64,

    #[serde(default = "default_relevance_threshold")]
    pub relevance_threshold: f64,

    #[serde(default = "default_max_memories")]
    pub max_memories: usize,

    #[serde(default = "default_window_hours")]
    pub window_hours: i64,
}

fn default_keyword_weight() -> f64 {
    0.2
}
fn default_recency_weight() -> f64 {
    0.3
}
fn default_importance_weight() -> f64 {
    0.2
}
fn default_context_weight() -> f64 {
    0.3
}
fn default_relevance_threshold() -> f64 {
    0.3
}
fn default_max_memories() -> usize {
    10
}
fn default_window_hours() -> i64 {
    24
}

impl Default for ScoringConfig {
    fn default() -> Self {
        Self {
            keyword_weight: default_keyword_weight(),
            recency_weight: default_recency_weight(),
            importance_weight: default_importance_weight(),
            context_weight: default_context_weight(),
            relevance_threshold: default_relevance_threshold(),
            max_memories: default_max_memories(),
            window_hours: default_window_hours(),
        }
    }
}

#[derive(Debug, Clone, Serialize, Deserialize)]
pub struct ContextConfig {
    /// Bound on the context history list.
    #[serde(default = "default_max_history")]
    pub max_history: usize,
}

fn default_max_history() -> usize {
    100
}

impl Default for ContextConfig {
    fn default() -> Self {
        Self {
            max_history: default_max_history(),
        }
    }
}

impl AppConfig {
    /// Load configuration from the default path with env overrides.
    pub fn load() -> Result<Self, ConfigError> {
        let config_path = Self::config_dir().join("config.toml");
        let mut config = Self::load_from(&config_path)?;

        if let Ok(model) = std::env::var("QUILL_MODEL") {
            config.model.model = model;
        }
        if let Ok(url) = std::env::var("QUILL_OLLAMA_URL") {
            config.model.base_url = url;
        }

        Ok(config)
    }

    /// Load configuration from a specific file.
    pub fn load_from(path: &Path) -> Result<Self, ConfigError> {
        if !path.exists() {
            tracing::info!("No config file found at {}, using defaults", path.display());
            return Ok(Self::default());
        }

        let content = std::fs::read_to_string(path).map_err(|e| ConfigError::ReadError {
            path: path.to_path_buf(),
            reason: e.to_string(),
        })?;

        let config: Self = toml::from_str(&content).map_err(|e| ConfigError::ParseError {
            path: path.to_path_buf(),
            reason: e.to_string(),
        })?;

        config.validate()?;
        Ok(config)
    }

    /// Get the configuration directory path (`~/.quill`).
    pub fn config_dir() -> PathBuf {
        dirs_home().join(".quill")
    }

    fn validate(&self) -> Result<(), ConfigError> {
        let weights = [
            self.scoring.keyword_weight,
            self.scoring.recency_weight,
            self.scoring.importance_weight,
            self.scoring.context_weight,
        ];
        if weights.iter().any(|w| *w < 0.0) {
            return Err(ConfigError::ValidationError(
                "scoring weights must be non-negative".into(),
            ));
        }
        if weights.iter().sum::<f64>() <= 0.0 {
            return Err(ConfigError::ValidationError(
                "at least one scoring weight must be positive".into(),
            ));
        }
        if self.scoring.window_hours <= 0 {
            return Err(ConfigError::ValidationError(
                "scoring.window_hours must be positive".into(),
            ));
        }
        if self.context.max_history == 0 {
            return Err(ConfigError::ValidationError(
                "context.max_history must be positive".into(),
            ));
        }
        Ok(())
    }

    /// Generate a default config TOML string.
    pub fn default_toml() -> String {
        toml::to_string_pretty(&Self::default()).unwrap_or_default()
    }
}

impl Default for AppConfig {
    fn default() -> Self {
        Self {
            assistant_name: default_assistant_name(),
            model: ModelConfig::default(),
            scoring: ScoringConfig::default(),
            context: ContextConfig::default(),
        }
    }
}

/// Get the user's home directory.
fn dirs_home() -> PathBuf {
    #[cfg(target_os = "windows")]
    {
        std::env::var("USERPROFILE")
            .map(PathBuf::from)
            .unwrap_or_else(|_| PathBuf::from("C:\\Users\\Default"))
    }
    #[cfg(not(target_os = "windows"))]
    {
        std::env::var("HOME")
            .map(PathBuf::from)
            .unwrap_or_else(|_| PathBuf::from("/tmp"))
    }
}

/// Configuration errors.
#[derive(Debug, thiserror::Error)]
pub enum ConfigError {
    #[error("Failed to read config file at {path}: {reason}")]
    ReadError { path: PathBuf, reason: String },

    #[error("Failed to parse config file at {path}: {reason}")]
    ParseError { path: PathBuf, reason: String },

    #[error("Invalid configuration: {0}")]
    ValidationError(String),
}
