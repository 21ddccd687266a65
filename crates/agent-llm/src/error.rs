//! Error types for LLM operations

use thiserror::Error;

/// Result type for LLM operations
pub type Result<T> = std::result::Result<T, LLMError>;

/// Phrases upstream providers use when they are temporarily unable to serve
const OVERCAPACITY_MARKERS: [&str; 2] = ["over capacity", "503"];

/// Errors that can occur during LLM operations
#[derive(Error, Debug)]
pub enum LLMError {
    /// API request failed
    #[error("API request failed: {0}")]
    RequestFailed(String),

    /// Invalid API key or authentication failed
    #[error("Invalid API key or authentication failed: {0}")]
    AuthenticationFailed(String),

    /// Rate limit exceeded
    #[error("Rate limit exceeded: {0}")]
    RateLimitExceeded(String),

    /// Provider answered HTTP 503
    #[error("Service unavailable (503): {0}")]
    Overloaded(String),

    /// Invalid request
    #[error("Invalid request: {0}")]
    InvalidRequest(String),

    /// Model not found
    #[error("Model not found: {0}")]
    ModelNotFound(String),

    /// Serialization error
    #[error("Serialization error: {0}")]
    SerializationError(#[from] serde_json::Error),

    /// HTTP error
    #[error("HTTP error: {0}")]
    HttpError(#[from] reqwest::Error),

    /// Unexpected response format
    #[error("Unexpected response format: {0}")]
    UnexpectedResponse(String),

    /// Configuration error
    #[error("Configuration error: {0}")]
    ConfigurationError(String),
}

impl LLMError {
    /// Whether the provider signalled a temporary overcapacity condition
    ///
    /// An explicit 503 always counts. Otherwise the error text is scanned for
    /// the overcapacity phrases, case-insensitively.
    pub fn is_overcapacity(&self) -> bool {
        if matches!(self, Self::Overloaded(_)) {
            return true;
        }
        text_signals_overcapacity(&self.to_string())
    }
}

/// Case-insensitive check of an error message for overcapacity phrases
pub fn text_signals_overcapacity(message: &str) -> bool {
    let lower = message.to_lowercase();
    OVERCAPACITY_MARKERS.iter().any(|m| lower.contains(m))
}
