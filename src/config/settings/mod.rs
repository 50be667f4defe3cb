
use anyhow::{Context, Result};
use serde::{Deserialize, Serialize};
use std::env;
use std::fmt;
use std::fs;
use std::path::{Path, PathBuf};
use thiserror::Error;
use url::Url;

#[derive(Debug, Clone, Serialize, Deserialize, PartialEq)]
pub struct Config {
    #[serde(default)]
    pub embedding: EmbeddingConfig,
    #[serde(default)]
    pub completion: CompletionConfig,
    #[serde(default)]
    pub index: IndexConfig,
    #[serde(default)]
    pub retrieval: RetrievalConfig,
    #[serde(default)]
    pub chat: ChatConfig,
    #[serde(skip)]
    pub base_dir: PathBuf,
}

#[derive(Debug, Clone, Serialize, Deserialize, PartialEq)]
#[serde(default)]
pub struct EmbeddingConfig {
    pub base_url: String,
    pub model: String,
    pub batch_size: u32,
    pub api_key_env: String,
}

impl Default for EmbeddingConfig {
    fn default() -> Self {
        Self {
            base_url: "https://api.openai.com".to_string(),
            model: "text-embedding-3-small".to_string(),
            batch_size: 64,
            api_key_env: "OPENAI_API_KEY".to_string(),
        }
    }
}

#[derive(Debug, Clone, Serialize, Deserialize, PartialEq)]
#[serde(default)]
pub struct CompletionConfig {
    pub base_url: String,
    pub model: String,
    pub api_key_env: String,
}

impl Default for CompletionConfig {
    fn default() -> Self {
        Self {
            base_url: "https://api.openai.com".to_string(),
            model: "gpt-4o".to_string(),
            api_key_env: "OPENAI_API_KEY".to_string(),
        }
    }
}

#[derive(Debug, Clone, Copy, Serialize, Deserialize, PartialEq, Eq)]
#[serde(rename_all = "lowercase")]
pub enum IndexBackend {
    Memory,
    Qdrant,
}

impl fmt::Display for IndexBackend {
    fn fmt(&self, f: &mut fmt::Formatter<'_>) -> fmt::Result {
        match self {
            Self::Memory => write!(f, "memory"),
            Self::Qdrant => write!(f, "qdrant"),
        }
    }
}

#[derive(Debug, Clone, Serialize, Deserialize, PartialEq)]
#[serde(default)]
pub struct IndexConfig {
    pub backend: IndexBackend,
    pub url: String,
    pub collection: String,
    pub api_key_env: String,
}

impl Default for IndexConfig {
    fn default() -> Self {
        Self {
            backend: IndexBackend::Memory,
            url: "http://localhost:6333".to_string(),
            collection: "game_guide".to_string(),
            api_key_env: String::new(),
        }
    }
}

#[derive(Debug, Clone, Serialize, Deserialize, PartialEq)]
#[serde(default)]
pub struct RetrievalConfig {
    pub top_k: usize,
    pub max_context_words: usize,
    pub score_threshold: f32,
}

impl Default for RetrievalConfig {
    fn default() -> Self {
        Self {
            top_k: 7,
            max_context_words: 1800,
            score_threshold: 0.0,
        }
    }
}

#[derive(Debug, Clone, Serialize, Deserialize, PartialEq)]
#[serde(default)]
pub struct ChatConfig {
    pub max_history_turns: usize,
    pub corpus: String,
}

impl Default for ChatConfig {
    fn default() -> Self {
        Self {
            max_history_turns: 16,
            corpus: String::new(),
        }
    }
}

#[derive(Debug, Error)]
pub enum ConfigError {
    #[error("Configuration directory not found or could not be created")]
    DirectoryError,
    #[error("Invalid URL format: {0}")]
    InvalidUrl(String),
    #[error("Invalid model name: {0} (cannot be empty)")]
    InvalidModel(String),
    #[error("Invalid batch size: {0} (must be between 1 and 1000)")]
    InvalidBatchSize(u32),
    #[error("Invalid collection name: {0} (cannot be empty)")]
    InvalidCollection(String),
    #[error("Invalid top_k: {0} (must be between 1 and 100)")]
    InvalidTopK(usize),
    #[error("Invalid context word budget: {0} (must be between 1 and 100000)")]
    InvalidContextBudget(usize),
    #[error("Invalid score threshold: {0} (must be between 0.0 and 1.0)")]
    InvalidScoreThreshold(f32),
    #[error("Invalid history cap: {0} (must be between 1 and 1000 turns)")]
    InvalidHistoryTurns(usize),
    #[error("Environment variable {0} is not set")]
    MissingApiKey(String),
    #[error("IO error: {0}")]
    Io(#[from] std::io::Error),
    #[error("TOML parsing error: {0}")]
    TomlParse(#[from] toml::de::Error),
    #[error("TOML serialization error: {0}")]
    TomlSerialize(#[from] toml::ser::Error),
}

/// Get the directory where configuration is stored
#[inline]
pub fn config_dir() -> Result<PathBuf, ConfigError> {
    dirs::home_dir()
        .map(|home| home.join(".guide-chat"))
        .ok_or(ConfigError::DirectoryError)
}

/// Resolve an API key from the environment variable named in the config.
/// An empty variable name means the endpoint needs no key.
#[inline]
pub fn resolve_api_key(var_name: &str) -> Result<Option<String>, ConfigError> {
    if var_name.trim().is_empty() {
        return Ok(None);
    }

    match env::var(var_name) {
        Ok(value) if !value.trim().is_empty() => Ok(Some(value)),
        _ => Err(ConfigError::MissingApiKey(var_name.to_string())),
    }
}

fn parse_base_url(raw: &str) -> Result<Url, ConfigError> {
    let url = Url::parse(raw).map_err(|_| ConfigError::InvalidUrl(raw.to_string()))?;
    if url.scheme() != "http" && url.scheme() != "https" {
        return Err(ConfigError::InvalidUrl(raw.to_string()));
    }
    Ok(url)
}

impl Default for Config {
    fn default() -> Self {
        Self {
            embedding: EmbeddingConfig::default(),
            completion: CompletionConfig::default(),
            index: IndexConfig::default(),
            retrieval: RetrievalConfig::default(),
            chat: ChatConfig::default(),
            base_dir: config_dir().unwrap_or_default(),
        }
    }
}

impl Config {
    /// Load configuration from the default config directory
    #[inline]
    pub fn load() -> Result<Self> {
        let dir = config_dir().context("Failed to locate configuration directory")?;
        Self::load_from(dir)
    }

    /// Load configuration from a specific directory
    #[inline]
    pub fn load_from<P: AsRef<Path>>(config_dir: P) -> Result<Self> {
        let config_path = config_dir.as_ref().join("config.toml");

        if !config_path.exists() {
            return Ok(Self {
                base_dir: config_dir.as_ref().to_path_buf(),
                ..Self::default()
            });
        }

        let content = fs::read_to_string(&config_path)
            .with_context(|| format!("Failed to read config file: {}", config_path.display()))?;

        let mut config: Config = toml::from_str(&content)
            .with_context(|| format!("Failed to parse config file: {}", config_path.display()))?;
        config.base_dir = config_dir.as_ref().to_path_buf();

        config
            .validate()
            .with_context(|| "Configuration validation failed")?;

        Ok(config)
    }

    #[inline]
    pub fn save(&self) -> Result<()> {
        self.validate()
            .context("Configuration validation failed before saving")?;

        let config_dir = self.get_base_dir();

        fs::create_dir_all(config_dir).with_context(|| {
            format!(
                "Failed to create config directory: {}",
                config_dir.display()
            )
        })?;

        let config_path = self.config_file_path();
        let content = toml::to_string_pretty(self).context("Failed to serialize config to TOML")?;

        fs::write(&config_path, content)
            .with_context(|| format!("Failed to write config file: {}", config_path.display()))?;

        Ok(())
    }

    /// Get the base directory for the application
    #[inline]
    pub fn get_base_dir(&self) -> &Path {
        &self.base_dir
    }

    #[inline]
    pub fn config_file_path(&self) -> PathBuf {
        self.get_base_dir().join("config.toml")
    }

    #[inline]
    pub fn validate(&self) -> Result<(), ConfigError> {
        self.embedding.validate()?;
        self.completion.validate()?;
        self.index.validate()?;
        self.retrieval.validate()?;
        self.chat.validate()?;
        Ok(())
    }

    /// Parsed base URL of the embedding endpoint
    #[inline]
    pub fn embedding_url(&self) -> Result<Url, ConfigError> {
        parse_base_url(&self.embedding.base_url)
    }

    /// Parsed base URL of the completion endpoint
    #[inline]
    pub fn completion_url(&self) -> Result<Url, ConfigError> {
        parse_base_url(&self.completion.base_url)
    }

    /// Parsed base URL of the remote index
    #[inline]
    pub fn index_url(&self) -> Result<Url, ConfigError> {
        parse_base_url(&self.index.url)
    }
}

impl EmbeddingConfig {
    #[inline]
    pub fn validate(&self) -> Result<(), ConfigError> {
        parse_base_url(&self.base_url)?;

        if self.model.trim().is_empty() {
            return Err(ConfigError::InvalidModel(self.model.clone()));
        }

        if self.batch_size == 0 || self.batch_size > 1000 {
            return Err(ConfigError::InvalidBatchSize(self.batch_size));
        }

        Ok(())
    }
}

impl CompletionConfig {
    #[inline]
    pub fn validate(&self) -> Result<(), ConfigError> {
        parse_base_url(&self.base_url)?;

        if self.model.trim().is_empty() {
            return Err(ConfigError::InvalidModel(self.model.clone()));
        }

        Ok(())
    }
}

impl IndexConfig {
    #[inline]
    pub fn validate(&self) -> Result<(), ConfigError> {
        if self.collection.trim().is_empty() {
            return Err(ConfigError::InvalidCollection(self.collection.clone()));
        }

        if self.backend == IndexBackend::Qdrant {
            parse_base_url(&self.url)?;
        }

        Ok(())
    }
}

impl RetrievalConfig {
    #[inline]
    pub fn validate(&self) -> Result<(), ConfigError> {
        if self.top_k == 0 || self.top_k > 100 {
            return Err(ConfigError::InvalidTopK(self.top_k));
        }

        if self.max_context_words == 0 || self.max_context_words > 100_000 {
            return Err(ConfigError::InvalidContextBudget(self.max_context_words));
        }

        if !(0.0..=1.0).contains(&self.score_threshold) {
            return Err(ConfigError::InvalidScoreThreshold(self.score_threshold));
        }

        Ok(())
    }

    /// Similarity floor as an optional filter; zero disables it
    #[inline]
    pub fn threshold(&self) -> Option<f32> {
        (self.score_threshold > 0.0).then_some(self.score_threshold)
    }
}

impl ChatConfig {
    #[inline]
    pub fn validate(&self) -> Result<(), ConfigError> {
        if self.max_history_turns == 0 || self.max_history_turns > 1000 {
            return Err(ConfigError::InvalidHistoryTurns(self.max_history_turns));
        }

        Ok(())
    }

    /// Optional corpus path used to bootstrap the index at chat startup
    #[inline]
    pub fn corpus_path(&self) -> Option<&Path> {
        (!self.corpus.trim().is_empty()).then(|| Path::new(self.corpus.as_str()))
    }
}
