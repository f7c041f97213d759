//! Wikipedia genre background lookup.
//!
//! Uses the REST summary endpoint for `<Genre>_film` pages and returns the
//! plain-text `extract`. The request carries its own timeout; callers are
//! expected to degrade on any error.

use async_trait::async_trait;
use serde::Deserialize;
use std::time::Duration;
use storyweaver_core::error::ProviderError;
use storyweaver_core::BackgroundSource;
use tracing::debug;

pub struct WikipediaBackground {
    base_url: String,
    max_chars: usize,
    client: reqwest::Client,
}

impl WikipediaBackground {
    pub fn new(timeout: Duration, max_chars: usize) -> Self {
        Self::with_base_url("https://en.wikipedia.org/api/rest_v1/page/summary", timeout, max_chars)
    }

    pub fn with_base_url(base_url: impl Into<String>, timeout: Duration, max_chars: usize) -> Self {
        let client = reqwest::Client::builder()
            .timeout(timeout)
            .user_agent(concat!("storyweaver/", env!("CARGO_PKG_VERSION")))
            .build()
            .expect("Failed to create HTTP client");

        Self {
            base_url: base_url.into().trim_end_matches('/').to_string(),
            max_chars,
            client,
        }
    }

    /// Page title for a genre tag: "sci-fi" → "Sci-fi_film".
    fn page_title(genre: &str) -> String {
        let mut chars = genre.trim().chars();
        let capitalized: String = match chars.next() {
            Some(first) => first.to_uppercase().chain(chars).collect(),
            None => String::new(),
        };
        format!("{}_film", capitalized.replace(' ', "_"))
    }
}

#[async_trait]
impl BackgroundSource for WikipediaBackground {
    fn name(&self) -> &str {
        "wikipedia"
    }

    async fn fetch(&self, genre: &str) -> Result<String, ProviderError> {
        let url = format!("{}/{}", self.base_url, Self::page_title(genre));
        debug!(%url, "Fetching genre background");

        let response = self.client.get(&url).send().await.map_err(|e| {
            if e.is_timeout() {
                ProviderError::Timeout(e.to_string())
            } else {
                ProviderError::Network(e.to_string())
            }
        })?;

        if !response.status().is_success() {
            return Err(ProviderError::ApiError {
                status_code: response.status().as_u16(),
                message: format!("No background page for genre '{genre}'"),
            });
        }

        let summary: SummaryResponse = response.json().await.map_err(|e| ProviderError::ApiError {
            status_code: 200,
            message: format!("Failed to parse summary: {e}"),
        })?;

        let extract = summary.extract.trim();
        if extract.is_empty() {
            return Err(ProviderError::ApiError {
                status_code: 200,
                message: "Summary extract was empty".into(),
            });
        }

        Ok(extract.chars().take(self.max_chars).collect())
    }
}

#[derive(Debug, Deserialize)]
struct SummaryResponse {
    #[serde(default)]
    extract: String,
}
