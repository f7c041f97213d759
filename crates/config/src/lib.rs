//! Configuration loading, validation, and management for Storyweaver.
//!
//! Loads configuration from `~/.storyweaver/config.toml` with environment
//! variable overrides. Validates all settings at startup.

use serde::{Deserialize, Serialize};
use std::path::{Path, PathBuf};

/// The root configuration structure.
///
/// Maps directly to `~/.storyweaver/config.toml`.
#[derive(Clone, Serialize, Deserialize)]
pub struct AppConfig {
    /// API key for the model endpoint
    #[serde(default, skip_serializing_if = "Option::is_none")]
    pub api_key: Option<String>,

    /// OpenAI-compatible endpoint base URL
    #[serde(default = "default_base_url")]
    pub base_url: String,

    /// Generative model identifier
    #[serde(default = "default_model")]
    pub model: String,

    /// Max output tokens per generation call
    #[serde(default = "default_max_tokens")]
    pub max_tokens: u32,

    /// Sampling temperature
    #[serde(default = "default_temperature")]
    pub temperature: f32,

    /// Storyboard pipeline settings
    #[serde(default)]
    pub storyboard: StoryboardConfig,

    /// Embedding capability
    #[serde(default)]
    pub embedding: EmbeddingConfig,

    /// Per-scene image generation
    #[serde(default)]
    pub images: ImageConfig,

    /// Genre background lookup
    #[serde(default)]
    pub background: BackgroundConfig,
}

fn default_base_url() -> String {
    "https://api.openai.com/v1".into()
}
fn default_model() -> String {
    "gpt-4o-mini".into()
}
fn default_max_tokens() -> u32 {
    1024
}
fn default_temperature() -> f32 {
    0.7
}

/// Redact a secret string for Debug output.
fn redact(s: &Option<String>) -> &'static str {
    match s {
        Some(_) => "[REDACTED]",
        None => "None",
    }
}

impl std::fmt::Debug for AppConfig {
    fn fmt(&self, f: &mut std::fmt::Formatter<'_>) -> std::fmt::Result {
        f.debug_struct("AppConfig")
            .field("api_key", &redact(&self.api_key))
            .field("base_url", &self.base_url)
            .field("model", &self.model)
            .field("max_tokens", &self.max_tokens)
            .field("temperature", &self.temperature)
            .field("storyboard", &self.storyboard)
            .field("embedding", &self.embedding)
            .field("images", &self.images)
            .field("background", &self.background)
            .finish()
    }
}

/// Knobs of the generation pipeline itself.
#[derive(Debug, Clone, Serialize, Deserialize)]
pub struct StoryboardConfig {
    /// Upper bound on scenes offered by the front-end (not enforced by the agent)
    #[serde(default = "default_max_scenes")]
    pub max_scenes: u32,

    /// Allowed mood vocabulary
    #[serde(default = "default_moods")]
    pub moods: Vec<String>,

    /// Character budget for genre context in the prompt
    #[serde(default = "default_context_length")]
    pub context_length: usize,

    /// Generation attempts before falling back
    #[serde(default = "default_max_retries")]
    pub max_retries: u32,

    /// Minimum (exclusive) cosine similarity for retrieved plots
    #[serde(default = "default_rag_threshold")]
    pub rag_threshold: f32,

    /// Genre used when no keyword rule matches
    #[serde(default = "default_genre")]
    pub default_genre: String,

    /// Root directory for storyboard output
    #[serde(default = "default_output_dir")]
    pub output_dir: PathBuf,

    /// Knowledge base file name, placed inside each story folder
    #[serde(default = "default_knowledge_base")]
    pub knowledge_base: String,
}

fn default_max_scenes() -> u32 {
    5
}
fn default_moods() -> Vec<String> {
    [
        "tense",
        "joyful",
        "romantic",
        "suspenseful",
        "chaotic",
        "dark",
        "hopeful",
        "neutral",
    ]
    .into_iter()
    .map(String::from)
    .collect()
}
fn default_context_length() -> usize {
    300
}
fn default_max_retries() -> u32 {
    3
}
fn default_rag_threshold() -> f32 {
    0.7
}
fn default_genre() -> String {
    "drama".into()
}
fn default_output_dir() -> PathBuf {
    PathBuf::from("outputs")
}
fn default_knowledge_base() -> String {
    "knowledge_base.json".into()
}

impl Default for StoryboardConfig {
    fn default() -> Self {
        Self {
            max_scenes: default_max_scenes(),
            moods: default_moods(),
            context_length: default_context_length(),
            max_retries: default_max_retries(),
            rag_threshold: default_rag_threshold(),
            default_genre: default_genre(),
            output_dir: default_output_dir(),
            knowledge_base: default_knowledge_base(),
        }
    }
}

#[derive(Debug, Clone, Serialize, Deserialize)]
pub struct EmbeddingConfig {
    /// "none" disables the capability; "openai" uses the configured endpoint
    #[serde(default = "default_embedding_provider")]
    pub provider: String,

    #[serde(default = "default_embedding_model")]
    pub model: String,
}

fn default_embedding_provider() -> String {
    "none".into()
}
fn default_embedding_model() -> String {
    "text-embedding-3-small".into()
}

impl EmbeddingConfig {
    pub fn is_enabled(&self) -> bool {
        !self.provider.eq_ignore_ascii_case("none") && !self.provider.is_empty()
    }
}

impl Default for EmbeddingConfig {
    fn default() -> Self {
        Self {
            provider: default_embedding_provider(),
            model: default_embedding_model(),
        }
    }
}

#[derive(Debug, Clone, Serialize, Deserialize)]
pub struct ImageConfig {
    #[serde(default)]
    pub enabled: bool,

    #[serde(default = "default_image_model")]
    pub model: String,

    #[serde(default = "default_image_size")]
    pub size: String,
}

fn default_image_model() -> String {
    "dall-e-3".into()
}
fn default_image_size() -> String {
    "1024x1024".into()
}

impl Default for ImageConfig {
    fn default() -> Self {
        Self {
            enabled: false,
            model: default_image_model(),
            size: default_image_size(),
        }
    }
}

#[derive(Debug, Clone, Serialize, Deserialize)]
pub struct BackgroundConfig {
    #[serde(default = "default_true")]
    pub enabled: bool,

    /// Timeout for the lookup; the only timed call in the pipeline
    #[serde(default = "default_background_timeout")]
    pub timeout_secs: u64,
}

fn default_true() -> bool {
    true
}
fn default_background_timeout() -> u64 {
    10
}

impl Default for BackgroundConfig {
    fn default() -> Self {
        Self {
            enabled: true,
            timeout_secs: default_background_timeout(),
        }
    }
}

impl AppConfig {
    /// Load configuration from the default path (~/.storyweaver/config.toml).
    ///
    /// Environment variables override the file:
    /// - `STORYWEAVER_API_KEY` (highest priority), then `OPENAI_API_KEY`
    /// - `STORYWEAVER_BASE_URL`
    /// - `STORYWEAVER_MODEL`
    pub fn load() -> Result<Self, ConfigError> {
        let config_path = Self::config_path();
        let mut config = Self::load_from(&config_path)?;

        if config.api_key.is_none() {
            config.api_key = std::env::var("STORYWEAVER_API_KEY")
                .ok()
                .or_else(|| std::env::var("OPENAI_API_KEY").ok());
        }

        if let Ok(base_url) = std::env::var("STORYWEAVER_BASE_URL") {
            config.base_url = base_url;
        }

        if let Ok(model) = std::env::var("STORYWEAVER_MODEL") {
            config.model = model;
        }

        Ok(config)
    }

    /// Load configuration from a specific file path.
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

    /// Get the configuration directory path.
    pub fn config_dir() -> PathBuf {
        dirs_home().join(".storyweaver")
    }

    /// Path of the config file inside [`AppConfig::config_dir`].
    pub fn config_path() -> PathBuf {
        Self::config_dir().join("config.toml")
    }

    /// Validate the configuration.
    pub fn validate(&self) -> Result<(), ConfigError> {
        if self.temperature < 0.0 || self.temperature > 2.0 {
            return Err(ConfigError::ValidationError(
                "temperature must be between 0.0 and 2.0".into(),
            ));
        }

        let sb = &self.storyboard;

        if sb.max_scenes == 0 {
            return Err(ConfigError::ValidationError(
                "storyboard.max_scenes must be at least 1".into(),
            ));
        }

        if sb.context_length == 0 {
            return Err(ConfigError::ValidationError(
                "storyboard.context_length must be > 0".into(),
            ));
        }

        if sb.moods.is_empty() {
            return Err(ConfigError::ValidationError(
                "storyboard.moods must not be empty".into(),
            ));
        }

        // The fallback storyboard is tagged "neutral" and must pass validation.
        if !sb.moods.iter().any(|m| m == "neutral") {
            return Err(ConfigError::ValidationError(
                "storyboard.moods must include \"neutral\"".into(),
            ));
        }

        if !(-1.0..=1.0).contains(&sb.rag_threshold) {
            return Err(ConfigError::ValidationError(
                "storyboard.rag_threshold must be between -1.0 and 1.0".into(),
            ));
        }

        Ok(())
    }

    /// Check if an API key is available (from config or environment).
    pub fn has_api_key(&self) -> bool {
        self.api_key.is_some()
    }

    /// Generate a default config TOML string.
    pub fn default_toml() -> String {
        let config = Self::default();
        toml::to_string_pretty(&config).unwrap_or_default()
    }
}

impl Default for AppConfig {
    fn default() -> Self {
        Self {
            api_key: None,
            base_url: default_base_url(),
            model: default_model(),
            max_tokens: default_max_tokens(),
            temperature: default_temperature(),
            storyboard: StoryboardConfig::default(),
            embedding: EmbeddingConfig::default(),
            images: ImageConfig::default(),
            background: BackgroundConfig::default(),
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

    #[error("Configuration validation failed: {0}")]
    ValidationError(String),
}
