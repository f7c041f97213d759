//! Call-and-validate loop against the generative backend.
//!
//! Every attempt ends in an [`AttemptOutcome`]; nothing inside the loop
//! propagates. Once the attempt budget is spent the caller gets a
//! deterministic fallback storyboard instead of an error.

use regex_lite::Regex;
use serde_json::Value;
use std::fmt;
use std::sync::Arc;
use storyweaver_core::error::ProviderError;
use storyweaver_core::message::Message;
use storyweaver_core::provider::{Provider, ProviderRequest};
use storyweaver_core::{Scene, Storyboard};
use tracing::{debug, info, warn};

use crate::settings::AgentConfig;
use crate::validate::validate;

const SYSTEM_PROMPT: &str = "You are a precise and creative assistant that generates valid JSON output based on the provided instructions.";

const FALLBACK_SCENES: u32 = 3;
const FALLBACK_MOOD: &str = "neutral";

/// How a single generation attempt ended.
#[derive(Debug)]
pub enum AttemptOutcome {
    Valid(Storyboard),
    BackendFailed(ProviderError),
    NoJson,
    Unparseable(String),
    Invalid,
}

impl fmt::Display for AttemptOutcome {
    fn fmt(&self, f: &mut fmt::Formatter<'_>) -> fmt::Result {
        match self {
            Self::Valid(sb) => write!(f, "valid storyboard '{}'", sb.title),
            Self::BackendFailed(e) => write!(f, "backend failed: {e}"),
            Self::NoJson => write!(f, "no JSON object in output"),
            Self::Unparseable(e) => write!(f, "unparseable JSON: {e}"),
            Self::Invalid => write!(f, "storyboard failed validation"),
        }
    }
}

pub struct GenerationClient {
    provider: Arc<dyn Provider>,
    model: String,
    max_tokens: u32,
    temperature: f32,
    max_retries: u32,
    moods: Vec<String>,
}

impl GenerationClient {
    pub fn new(provider: Arc<dyn Provider>, config: &AgentConfig) -> Self {
        Self {
            provider,
            model: config.model.clone(),
            max_tokens: config.max_tokens,
            temperature: config.temperature,
            max_retries: config.max_retries,
            moods: config.moods.clone(),
        }
    }

    /// Generate a storyboard, or the fallback once every attempt has failed.
    pub async fn generate(&self, prompt: &str) -> Storyboard {
        for attempt in 0..self.max_retries {
            match self.attempt(prompt).await {
                AttemptOutcome::Valid(storyboard) => {
                    info!(
                        attempt = attempt + 1,
                        scenes = storyboard.scenes.len(),
                        title = %storyboard.title,
                        "Storyboard generated"
                    );
                    return storyboard;
                }
                outcome => {
                    warn!(
                        attempt = attempt + 1,
                        max_retries = self.max_retries,
                        reason = %outcome,
                        "Generation attempt failed"
                    );
                }
            }
        }

        warn!(max_retries = self.max_retries, "Generation exhausted, using fallback storyboard");
        fallback_storyboard(excerpt_from_prompt(prompt))
    }

    /// One backend call, classified.
    pub async fn attempt(&self, prompt: &str) -> AttemptOutcome {
        let request = ProviderRequest {
            model: self.model.clone(),
            messages: vec![Message::system(SYSTEM_PROMPT), Message::user(prompt)],
            temperature: self.temperature,
            max_tokens: Some(self.max_tokens),
        };

        let response = match self.provider.complete(request).await {
            Ok(r) => r,
            Err(e) => return AttemptOutcome::BackendFailed(e),
        };
        if let Some(usage) = &response.usage {
            debug!(
                provider = self.provider.name(),
                total_tokens = usage.total_tokens,
                "Generation response received"
            );
        }

        let Some(raw) = extract_json(&response.message.content) else {
            return AttemptOutcome::NoJson;
        };

        let value: Value = match serde_json::from_str(raw) {
            Ok(v) => v,
            Err(e) => return AttemptOutcome::Unparseable(e.to_string()),
        };

        if !validate(&value, &self.moods) {
            return AttemptOutcome::Invalid;
        }

        match serde_json::from_value::<Storyboard>(value) {
            Ok(mut storyboard) => {
                storyboard.renumber();
                AttemptOutcome::Valid(storyboard)
            }
            Err(e) => AttemptOutcome::Unparseable(e.to_string()),
        }
    }
}

/// Greedy match from the first `{` to the last `}`, across newlines.
///
/// Two separate objects in one reply come back as one span that will not
/// parse; that attempt then fails like any other malformed output.
pub fn extract_json(text: &str) -> Option<&str> {
    let re = Regex::new(r"(?s)\{.*\}").ok()?;
    re.find(text).map(|m| m.as_str())
}

/// Text between the first and second `"` of the prompt; the whole prompt
/// when it has no quote at all.
pub fn excerpt_from_prompt(prompt: &str) -> &str {
    prompt.split('"').nth(1).unwrap_or(prompt)
}

pub fn fallback_storyboard(excerpt: &str) -> Storyboard {
    Storyboard {
        title: format!("Untitled {excerpt}"),
        scenes: (1..=FALLBACK_SCENES)
            .map(|i| Scene::new(i, format!("Scene {i} of {excerpt}"), "...", FALLBACK_MOOD))
            .collect(),
    }
}
