//! Shared mock collaborators for agent tests.

use async_trait::async_trait;
use std::collections::VecDeque;
use std::io::Cursor;
use std::sync::Mutex;
use storyweaver_core::error::{ImageError, ProviderError};
use storyweaver_core::message::Message;
use storyweaver_core::provider::{Provider, ProviderRequest, ProviderResponse, Usage};
use storyweaver_core::{BackgroundSource, Embedder, GeneratedImage, ImageBackend, ImageRequest};

/// A mock provider that returns a sequence of scripted responses.
///
/// Each call to `complete` returns the next response in the queue.
/// Panics if more calls are made than responses provided.
pub struct SequentialMockProvider {
    responses: Vec<Result<String, ProviderError>>,
    call_count: Mutex<usize>,
    last_request: Mutex<Option<ProviderRequest>>,
}

impl SequentialMockProvider {
    pub fn new(responses: Vec<Result<String, ProviderError>>) -> Self {
        Self {
            responses,
            call_count: Mutex::new(0),
            last_request: Mutex::new(None),
        }
    }

    pub fn from_texts(texts: &[&str]) -> Self {
        Self::new(texts.iter().map(|t| Ok(t.to_string())).collect())
    }

    pub fn call_count(&self) -> usize {
        *self.call_count.lock().unwrap()
    }

    pub fn last_request(&self) -> Option<ProviderRequest> {
        self.last_request.lock().unwrap().clone()
    }
}

#[async_trait]
impl Provider for SequentialMockProvider {
    fn name(&self) -> &str {
        "sequential_mock"
    }

    async fn complete(&self, request: ProviderRequest) -> Result<ProviderResponse, ProviderError> {
        let mut count = self.call_count.lock().unwrap();
        if *count >= self.responses.len() {
            panic!(
                "SequentialMockProvider: no more responses (call #{}, have {})",
                *count,
                self.responses.len()
            );
        }

        let response = self.responses[*count].clone();
        *count += 1;
        *self.last_request.lock().unwrap() = Some(request);
        response.map(|text| make_text_response(&text))
    }
}

/// A provider whose every call fails with a network error.
pub struct FailingProvider {
    call_count: Mutex<usize>,
}

impl FailingProvider {
    pub fn new() -> Self {
        Self {
            call_count: Mutex::new(0),
        }
    }

    pub fn call_count(&self) -> usize {
        *self.call_count.lock().unwrap()
    }
}

#[async_trait]
impl Provider for FailingProvider {
    fn name(&self) -> &str {
        "failing"
    }

    async fn complete(&self, _request: ProviderRequest) -> Result<ProviderResponse, ProviderError> {
        *self.call_count.lock().unwrap() += 1;
        Err(ProviderError::Network("connection refused".into()))
    }
}

pub fn make_text_response(text: &str) -> ProviderResponse {
    ProviderResponse {
        message: Message::assistant(text),
        usage: Some(Usage {
            prompt_tokens: 10,
            completion_tokens: 5,
            total_tokens: 15,
        }),
        model: "mock-model".into(),
    }
}

/// A model reply wrapping a valid `n`-scene storyboard titled "The Vault".
pub fn valid_storyboard_json(n: u32) -> String {
    let scenes: Vec<serde_json::Value> = (1..=n)
        .map(|i| {
            serde_json::json!({
                "scene_number": i,
                "description": format!("Shot {i}"),
                "dialogue": format!("Line {i}"),
                "mood": if i % 2 == 0 { "joyful" } else { "tense" },
            })
        })
        .collect();
    format!(
        "Here is your storyboard:\n{}\nEnjoy!",
        serde_json::json!({"title": "The Vault", "scenes": scenes})
    )
}

/// What the scripted image backend does on its next `generate` call.
#[derive(Debug, Clone, Copy)]
pub enum ImageScript {
    Ok,
    Policy,
    Error,
    BadDownload,
    Garbage,
}

/// Image backend driven by a script; an exhausted script fails every call.
pub struct ScriptedImageBackend {
    script: Mutex<VecDeque<ImageScript>>,
    prompts: Mutex<Vec<String>>,
}

impl ScriptedImageBackend {
    pub fn new(script: Vec<ImageScript>) -> Self {
        Self {
            script: Mutex::new(script.into()),
            prompts: Mutex::new(Vec::new()),
        }
    }

    pub fn always_error() -> Self {
        Self::new(Vec::new())
    }

    pub fn prompts(&self) -> Vec<String> {
        self.prompts.lock().unwrap().clone()
    }
}

#[async_trait]
impl ImageBackend for ScriptedImageBackend {
    fn name(&self) -> &str {
        "scripted"
    }

    async fn generate(&self, request: ImageRequest) -> Result<GeneratedImage, ImageError> {
        self.prompts.lock().unwrap().push(request.prompt);
        let step = self.script.lock().unwrap().pop_front().unwrap_or(ImageScript::Error);
        let url = match step {
            ImageScript::Ok => "mock://ok",
            ImageScript::BadDownload => "mock://missing",
            ImageScript::Garbage => "mock://garbage",
            ImageScript::Policy => {
                return Err(ImageError::ContentPolicy("safety system".into()));
            }
            ImageScript::Error => {
                return Err(ImageError::Backend(ProviderError::ApiError {
                    status_code: 500,
                    message: "server error".into(),
                }));
            }
        };
        Ok(GeneratedImage { url: url.into() })
    }

    async fn download(&self, image: &GeneratedImage) -> Result<Vec<u8>, ImageError> {
        match image.url.as_str() {
            "mock://ok" => Ok(tiny_png()),
            "mock://garbage" => Ok(b"definitely not an image".to_vec()),
            other => Err(ImageError::Download(format!("404 for {other}"))),
        }
    }
}

/// A valid 2x2 PNG.
pub fn tiny_png() -> Vec<u8> {
    let img = image::RgbaImage::from_pixel(2, 2, image::Rgba([200, 10, 10, 255]));
    let mut buf = Vec::new();
    img.write_to(&mut Cursor::new(&mut buf), image::ImageFormat::Png)
        .unwrap();
    buf
}

pub struct StaticBackground {
    text: String,
}

impl StaticBackground {
    pub fn new(text: &str) -> Self {
        Self { text: text.into() }
    }
}

#[async_trait]
impl BackgroundSource for StaticBackground {
    fn name(&self) -> &str {
        "static"
    }

    async fn fetch(&self, _genre: &str) -> Result<String, ProviderError> {
        Ok(self.text.clone())
    }
}

pub struct FailingBackground;

#[async_trait]
impl BackgroundSource for FailingBackground {
    fn name(&self) -> &str {
        "failing"
    }

    async fn fetch(&self, _genre: &str) -> Result<String, ProviderError> {
        Err(ProviderError::Timeout("10s elapsed".into()))
    }
}

/// Embeds by keyword so tests control similarity; counts calls.
pub struct KeywordEmbedder {
    calls: Mutex<usize>,
}

impl KeywordEmbedder {
    pub fn new() -> Self {
        Self {
            calls: Mutex::new(0),
        }
    }

    pub fn calls(&self) -> usize {
        *self.calls.lock().unwrap()
    }
}

#[async_trait]
impl Embedder for KeywordEmbedder {
    fn model(&self) -> &str {
        "keyword"
    }

    async fn embed(&self, text: &str) -> Result<Vec<f32>, ProviderError> {
        *self.calls.lock().unwrap() += 1;
        let text = text.to_lowercase();
        Ok(vec![
            if text.contains("heist") { 1.0 } else { 0.0 },
            if text.contains("love") { 1.0 } else { 0.0 },
            0.1,
        ])
    }
}
