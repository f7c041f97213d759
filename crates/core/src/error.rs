//! Error types for the Storyweaver domain.
//!
//! Uses `thiserror` for ergonomic error definitions.
//! Each bounded context has its own error variant.

use thiserror::Error;

/// The top-level error type for all Storyweaver operations.
#[derive(Debug, Error)]
pub enum Error {
    // --- Provider errors ---
    #[error("Provider error: {0}")]
    Provider(#[from] ProviderError),

    // --- Knowledge base errors ---
    #[error("Knowledge base error: {0}")]
    Knowledge(#[from] KnowledgeError),

    // --- Image errors ---
    #[error("Image error: {0}")]
    Image(#[from] ImageError),

    // --- Serialization ---
    #[error("Serialization error: {0}")]
    Serialization(#[from] serde_json::Error),

    // --- Dispatch ---
    #[error("Unknown operation: {0}")]
    UnknownOperation(String),

    #[error("Invalid operation arguments: {0}")]
    InvalidArguments(String),

    // --- Generic ---
    #[error("Internal error: {0}")]
    Internal(String),
}

/// Result type alias using our Error.
pub type Result<T> = std::result::Result<T, Error>;

// --- Bounded context errors ---

#[derive(Debug, Clone, Error)]
pub enum ProviderError {
    #[error("API request failed: {message} (status: {status_code})")]
    ApiError {
        status_code: u16,
        message: String,
    },

    #[error("Rate limited by provider, retry after {retry_after_secs}s")]
    RateLimited { retry_after_secs: u64 },

    #[error("Authentication failed: {0}")]
    AuthenticationFailed(String),

    #[error("Provider not configured: {0}")]
    NotConfigured(String),

    #[error("Request timed out: {0}")]
    Timeout(String),

    #[error("Network error: {0}")]
    Network(String),
}

#[derive(Debug, Clone, Error)]
pub enum KnowledgeError {
    #[error("Storage error: {0}")]
    Storage(String),

    #[error("Knowledge base file is corrupt: {0}")]
    Corrupt(String),
}

#[derive(Debug, Clone, Error)]
pub enum ImageError {
    /// The backend refused the prompt on content-policy grounds.
    #[error("Prompt rejected by content policy: {0}")]
    ContentPolicy(String),

    #[error("Image backend failed: {0}")]
    Backend(#[from] ProviderError),

    #[error("Image download failed: {0}")]
    Download(String),

    #[error("Image write failed: {0}")]
    Io(String),

    #[error("Image encoding failed: {0}")]
    Encode(String),
}

impl ImageError {
    /// Whether this failure is the distinguishable content-policy signal.
    pub fn is_content_policy(&self) -> bool {
        matches!(self, ImageError::ContentPolicy(_))
    }
}
