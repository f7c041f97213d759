//! Backend wiring: builds every collaborator the agent needs from config.
//!
//! Capabilities that are switched off in configuration come back as `None`
//! so the agent can branch on presence once, at construction.

use std::sync::Arc;
use std::time::Duration;
use storyweaver_config::AppConfig;
use storyweaver_core::{BackgroundSource, Embedder, ImageBackend, Provider};
use tracing::info;

use crate::embedder::ProviderEmbedder;
use crate::images::OpenAiImageBackend;
use crate::openai_compat::OpenAiCompatProvider;
use crate::wikipedia::WikipediaBackground;

/// The full set of backends for one session.
pub struct Backends {
    pub provider: Arc<dyn Provider>,
    pub embedder: Option<Arc<dyn Embedder>>,
    pub images: Option<Arc<dyn ImageBackend>>,
    pub background: Option<Arc<dyn BackgroundSource>>,
}

/// Build backends from configuration.
pub fn build_from_config(config: &AppConfig) -> Backends {
    let api_key = config.api_key.clone().unwrap_or_default();
    let name = provider_name(&config.base_url);

    let provider: Arc<dyn Provider> =
        Arc::new(OpenAiCompatProvider::new(name, &config.base_url, &api_key));

    let embedder: Option<Arc<dyn Embedder>> = if config.embedding.is_enabled() {
        Some(Arc::new(ProviderEmbedder::new(
            provider.clone(),
            &config.embedding.model,
        )))
    } else {
        None
    };

    let images: Option<Arc<dyn ImageBackend>> = if config.images.enabled {
        Some(Arc::new(OpenAiImageBackend::new(
            name,
            &config.base_url,
            &api_key,
            &config.images.model,
        )))
    } else {
        None
    };

    let background: Option<Arc<dyn BackgroundSource>> = if config.background.enabled {
        Some(Arc::new(WikipediaBackground::new(
            Duration::from_secs(config.background.timeout_secs),
            config.storyboard.context_length,
        )))
    } else {
        None
    };

    info!(
        provider = name,
        embeddings = embedder.is_some(),
        images = images.is_some(),
        background = background.is_some(),
        "Backends configured"
    );

    Backends {
        provider,
        embedder,
        images,
        background,
    }
}

/// A short provider name derived from well-known endpoints.
fn provider_name(base_url: &str) -> &'static str {
    if base_url.contains("api.openai.com") {
        "openai"
    } else if base_url.contains("deepseek.com") {
        "deepseek"
    } else if base_url.contains("openrouter.ai") {
        "openrouter"
    } else if base_url.contains("azure") || base_url.contains("models.inference.ai") {
        "azure"
    } else if base_url.contains("localhost:11434") {
        "ollama"
    } else {
        "custom"
    }
}

#[cfg(test)]
mod tests {
    use super::*;

    #[test]
    fn default_config_disables_optional_capabilities() {
        let backends = build_from_config(&AppConfig::default());
        assert_eq!(backends.provider.name(), "openai");
        assert!(backends.embedder.is_none());
        assert!(backends.images.is_none());
        assert!(backends.background.is_some());
    }

    #[test]
    fn enabled_capabilities_are_built() {
        let mut config = AppConfig::default();
        config.embedding.provider = "openai".into();
        config.images.enabled = true;
        config.background.enabled = false;

        let backends = build_from_config(&config);
        assert_eq!(backends.embedder.unwrap().model(), "text-embedding-3-small");
        assert!(backends.images.is_some());
        assert!(backends.background.is_none());
    }

    #[test]
    fn provider_names() {
        assert_eq!(provider_name("https://api.deepseek.com/v1"), "deepseek");
        assert_eq!(provider_name("https://models.inference.ai.azure.com"), "azure");
        assert_eq!(provider_name("http://localhost:8000/v1"), "custom");
    }
}
