//! BackgroundSource trait: free-text genre background for prompts.

use async_trait::async_trait;
use crate::error::ProviderError;

#[async_trait]
pub trait BackgroundSource: Send + Sync {
    fn name(&self) -> &str;

    /// Look up background text for a genre tag (e.g., "heist").
    async fn fetch(&self, genre: &str) -> std::result::Result<String, ProviderError>;
}
