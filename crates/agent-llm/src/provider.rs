//! LLM provider trait definition

use crate::{CompletionRequest, CompletionResponse, Result};
use async_trait::async_trait;

/// Trait for LLM providers
///
/// Implementations translate a [`CompletionRequest`] into a concrete API call
/// and map transport failures onto [`crate::LLMError`] so callers can decide
/// whether a failure is worth retrying.
#[async_trait]
pub trait LLMProvider: Send + Sync {
    /// Generate a completion from the LLM
    async fn complete(&self, request: CompletionRequest) -> Result<CompletionResponse>;

    /// Provider name used in logs (e.g. "openai", "groq")
    fn name(&self) -> &str;
}
