//! OpenAI-compatible image generation backend (`/images/generations`).
//!
//! A 400 response carrying a content-policy error code is surfaced as
//! [`ImageError::ContentPolicy`]; every other failure is a backend error.

use async_trait::async_trait;
use serde::Deserialize;
use storyweaver_core::error::{ImageError, ProviderError};
use storyweaver_core::image::{GeneratedImage, ImageBackend, ImageRequest};
use tracing::{debug, warn};

use crate::openai_compat::{check_status, http_client};

pub struct OpenAiImageBackend {
    name: String,
    base_url: String,
    api_key: String,
    model: String,
    client: reqwest::Client,
}

impl OpenAiImageBackend {
    pub fn new(
        name: impl Into<String>,
        base_url: impl Into<String>,
        api_key: impl Into<String>,
        model: impl Into<String>,
    ) -> Self {
        Self {
            name: name.into(),
            base_url: base_url.into().trim_end_matches('/').to_string(),
            api_key: api_key.into(),
            model: model.into(),
            client: http_client(),
        }
    }
}

/// Whether an error body is the backend's content-policy rejection.
pub fn is_content_policy_rejection(body: &str) -> bool {
    if let Ok(parsed) = serde_json::from_str::<ApiErrorEnvelope>(body) {
        let code = parsed.error.code.unwrap_or_default();
        if code == "content_policy_violation" || code == "content_filter" {
            return true;
        }
    }
    let lower = body.to_lowercase();
    lower.contains("content_policy") || lower.contains("content policy") || lower.contains("safety system")
}

#[async_trait]
impl ImageBackend for OpenAiImageBackend {
    fn name(&self) -> &str {
        &self.name
    }

    async fn generate(&self, request: ImageRequest) -> Result<GeneratedImage, ImageError> {
        let url = format!("{}/images/generations", self.base_url);

        let body = serde_json::json!({
            "model": self.model,
            "prompt": request.prompt,
            "n": request.n,
            "size": request.size,
        });

        debug!(backend = %self.name, model = %self.model, "Sending image request");

        let response = self
            .client
            .post(&url)
            .header("Authorization", format!("Bearer {}", self.api_key))
            .header("Content-Type", "application/json")
            .json(&body)
            .send()
            .await
            .map_err(|e| ProviderError::Network(e.to_string()))?;

        let response = match check_status(response).await {
            Ok(r) => r,
            Err(ProviderError::ApiError {
                status_code: 400,
                message,
            }) if is_content_policy_rejection(&message) => {
                warn!(backend = %self.name, "Image prompt rejected by content policy");
                return Err(ImageError::ContentPolicy(message));
            }
            Err(e) => return Err(ImageError::Backend(e)),
        };

        let parsed: ImageApiResponse = response.json().await.map_err(|e| {
            ImageError::Backend(ProviderError::ApiError {
                status_code: 200,
                message: format!("Failed to parse image response: {e}"),
            })
        })?;

        parsed
            .data
            .into_iter()
            .find_map(|d| d.url)
            .map(|url| GeneratedImage { url })
            .ok_or_else(|| {
                ImageError::Backend(ProviderError::ApiError {
                    status_code: 200,
                    message: "No image URL in response".into(),
                })
            })
    }

    async fn download(&self, image: &GeneratedImage) -> Result<Vec<u8>, ImageError> {
        let response = self
            .client
            .get(&image.url)
            .send()
            .await
            .map_err(|e| ImageError::Download(e.to_string()))?;

        if !response.status().is_success() {
            return Err(ImageError::Download(format!(
                "status {} fetching {}",
                response.status().as_u16(),
                image.url
            )));
        }

        let bytes = response
            .bytes()
            .await
            .map_err(|e| ImageError::Download(e.to_string()))?;
        Ok(bytes.to_vec())
    }
}

// --- Image API types ---

#[derive(Debug, Deserialize)]
struct ImageApiResponse {
    data: Vec<ImageData>,
}

#[derive(Debug, Deserialize)]
struct ImageData {
    #[serde(default)]
    url: Option<String>,
}

#[derive(Debug, Deserialize)]
struct ApiErrorEnvelope {
    error: ApiErrorBody,
}

#[derive(Debug, Deserialize)]
struct ApiErrorBody {
    #[serde(default)]
    code: Option<String>,
}
