//! Pipeline settings, passed explicitly to every component constructor.

use storyweaver_config::AppConfig;

/// The slice of configuration the generation pipeline reads.
#[derive(Debug, Clone)]
pub struct AgentConfig {
    pub model: String,
    pub max_tokens: u32,
    pub temperature: f32,
    pub moods: Vec<String>,
    pub context_length: usize,
    pub max_retries: u32,
    pub rag_threshold: f32,
    pub default_genre: String,
    pub image_size: String,
}

impl AgentConfig {
    pub fn from_app(config: &AppConfig) -> Self {
        Self {
            model: config.model.clone(),
            max_tokens: config.max_tokens,
            temperature: config.temperature,
            moods: config.storyboard.moods.clone(),
            context_length: config.storyboard.context_length,
            max_retries: config.storyboard.max_retries,
            rag_threshold: config.storyboard.rag_threshold,
            default_genre: config.storyboard.default_genre.clone(),
            image_size: config.images.size.clone(),
        }
    }
}

impl Default for AgentConfig {
    fn default() -> Self {
        Self::from_app(&AppConfig::default())
    }
}
