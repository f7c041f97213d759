//! Embedder trait: turns plot text into a fixed-length vector.
//!
//! Embedding is an optional capability: the agent holds an
//! `Option<Arc<dyn Embedder>>` decided once at construction, and both
//! retrieval and knowledge-base updates branch on its presence.

use async_trait::async_trait;
use crate::error::ProviderError;

#[async_trait]
pub trait Embedder: Send + Sync {
    /// Model identifier, for logging.
    fn model(&self) -> &str;

    /// Embed a single text.
    async fn embed(&self, text: &str) -> std::result::Result<Vec<f32>, ProviderError>;
}
