//! Adapts a [`Provider`]'s embedding endpoint to the single-text [`Embedder`] trait.

use async_trait::async_trait;
use std::sync::Arc;
use storyweaver_core::error::ProviderError;
use storyweaver_core::provider::{EmbeddingRequest, Provider};
use storyweaver_core::Embedder;

pub struct ProviderEmbedder {
    provider: Arc<dyn Provider>,
    model: String,
}

impl ProviderEmbedder {
    pub fn new(provider: Arc<dyn Provider>, model: impl Into<String>) -> Self {
        Self {
            provider,
            model: model.into(),
        }
    }
}

#[async_trait]
impl Embedder for ProviderEmbedder {
    fn model(&self) -> &str {
        &self.model
    }

    async fn embed(&self, text: &str) -> Result<Vec<f32>, ProviderError> {
        let response = self
            .provider
            .embed(EmbeddingRequest {
                model: self.model.clone(),
                inputs: vec![text.to_string()],
            })
            .await?;

        response.embeddings.into_iter().next().ok_or_else(|| ProviderError::ApiError {
            status_code: 200,
            message: "Embedding response contained no vectors".into(),
        })
    }
}
