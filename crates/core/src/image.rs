//! ImageBackend trait: text-to-image generation.
//!
//! The backend returns a locator for the generated image and a separate
//! call fetches its bytes. A content-policy rejection is reported as
//! [`ImageError::ContentPolicy`] so callers can soften the prompt and retry.

use async_trait::async_trait;
use serde::{Deserialize, Serialize};
use crate::error::ImageError;

/// A single image generation request.
#[derive(Debug, Clone, Serialize, Deserialize)]
pub struct ImageRequest {
    /// The prompt text
    pub prompt: String,

    /// Number of images (always 1 for storyboards)
    #[serde(default = "default_count")]
    pub n: u32,

    /// Size string understood by the backend (e.g., "1024x1024")
    pub size: String,
}

fn default_count() -> u32 {
    1
}

impl ImageRequest {
    pub fn single(prompt: impl Into<String>, size: impl Into<String>) -> Self {
        Self {
            prompt: prompt.into(),
            n: 1,
            size: size.into(),
        }
    }
}

/// A generated image, addressed by URL.
#[derive(Debug, Clone, Serialize, Deserialize)]
pub struct GeneratedImage {
    pub url: String,
}

#[async_trait]
pub trait ImageBackend: Send + Sync {
    fn name(&self) -> &str;

    /// Generate one image for the prompt.
    async fn generate(&self, request: ImageRequest) -> std::result::Result<GeneratedImage, ImageError>;

    /// Fetch the raw bytes behind a generated image locator.
    async fn download(&self, image: &GeneratedImage) -> std::result::Result<Vec<u8>, ImageError>;
}
