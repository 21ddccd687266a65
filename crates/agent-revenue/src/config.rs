//! Configuration for the revenue growth agent

use crate::error::{Result, RevenueError};
use agent_llm::providers::openai::GROQ_API_BASE;
use std::fmt;

pub const DEFAULT_MODEL: &str = "llama3-8b-8192";

/// Environment variables checked for the API key, in order
pub const API_KEY_VARS: [&str; 2] = ["GROQ_API_KEY", "groq_api"];
pub const MODEL_VAR: &str = "REVENUE_AGENT_MODEL";
pub const API_BASE_VAR: &str = "REVENUE_AGENT_API_BASE";

/// Upper bounds keeping the longest backoff a representable duration
pub const MAX_RETRIES: u32 = 20;
pub const MAX_BASE_BACKOFF_SECONDS: f64 = 600.0;

/// Settings passed to the orchestrator at construction
#[derive(Clone)]
pub struct RevenueAgentConfig {
    /// Secret for the chat completions API
    pub api_key: String,

    pub model_name: String,

    pub temperature: f32,

    /// Total agent attempts when the provider reports overcapacity
    pub max_retries: u32,

    /// Backoff before retry `n` is `base * 2^n` seconds plus up to 1s jitter
    pub base_backoff_seconds: f64,

    /// OpenAI-compatible endpoint
    pub api_base: String,

    /// LLM round trips allowed per agent run
    pub max_iterations: usize,
}

impl Default for RevenueAgentConfig {
    fn default() -> Self {
        Self {
            api_key: String::new(),
            model_name: DEFAULT_MODEL.to_string(),
            temperature: 0.0,
            max_retries: 5,
            base_backoff_seconds: 1.0,
            api_base: GROQ_API_BASE.to_string(),
            max_iterations: 10,
        }
    }
}

impl fmt::Debug for RevenueAgentConfig {
    fn fmt(&self, f: &mut fmt::Formatter<'_>) -> fmt::Result {
        f.debug_struct("RevenueAgentConfig")
            .field("api_key", &"<redacted>")
            .field("model_name", &self.model_name)
            .field("temperature", &self.temperature)
            .field("max_retries", &self.max_retries)
            .field("base_backoff_seconds", &self.base_backoff_seconds)
            .field("api_base", &self.api_base)
            .field("max_iterations", &self.max_iterations)
            .finish()
    }
}

impl RevenueAgentConfig {
    /// Create a new configuration builder
    pub fn builder() -> RevenueAgentConfigBuilder {
        RevenueAgentConfigBuilder::default()
    }

    /// Read settings from the process environment
    pub fn from_env() -> Result<Self> {
        Self::from_vars(|key| std::env::var(key).ok())
    }

    /// Read settings through `var`, which returns the value of a variable
    pub fn from_vars(var: impl Fn(&str) -> Option<String>) -> Result<Self> {
        let present = |key: &str| var(key).map(|v| v.trim().to_string()).filter(|v| !v.is_empty());

        let mut builder = Self::builder();
        if let Some(key) = API_KEY_VARS.iter().find_map(|key| present(key)) {
            builder = builder.api_key(key);
        }
        if let Some(model) = present(MODEL_VAR) {
            builder = builder.model_name(model);
        }
        if let Some(api_base) = present(API_BASE_VAR) {
            builder = builder.api_base(api_base);
        }
        builder.build()
    }

    /// Validate the configuration
    pub fn validate(&self) -> Result<()> {
        if self.api_key.trim().is_empty() {
            return Err(RevenueError::Config(format!(
                "API key is missing; set {} in the environment or a .env file",
                API_KEY_VARS[0]
            )));
        }

        if self.model_name.trim().is_empty() {
            return Err(RevenueError::Config("model_name must not be empty".to_string()));
        }

        if !(0.0..=2.0).contains(&self.temperature) {
            return Err(RevenueError::Config(
                "temperature must be between 0 and 2".to_string(),
            ));
        }

        if !(1..=MAX_RETRIES).contains(&self.max_retries) {
            return Err(RevenueError::Config(format!(
                "max_retries must be between 1 and {MAX_RETRIES}"
            )));
        }

        if !(0.0..=MAX_BASE_BACKOFF_SECONDS).contains(&self.base_backoff_seconds) {
            return Err(RevenueError::Config(format!(
                "base_backoff_seconds must be between 0 and {MAX_BASE_BACKOFF_SECONDS}"
            )));
        }

        if self.max_iterations == 0 {
            return Err(RevenueError::Config(
                "max_iterations must be greater than 0".to_string(),
            ));
        }

        Ok(())
    }
}

/// Builder for RevenueAgentConfig
#[derive(Debug, Default)]
pub struct RevenueAgentConfigBuilder {
    api_key: Option<String>,
    model_name: Option<String>,
    temperature: Option<f32>,
    max_retries: Option<u32>,
    base_backoff_seconds: Option<f64>,
    api_base: Option<String>,
    max_iterations: Option<usize>,
}

impl RevenueAgentConfigBuilder {
    pub fn api_key(mut self, key: impl Into<String>) -> Self {
        self.api_key = Some(key.into());
        self
    }

    pub fn model_name(mut self, model: impl Into<String>) -> Self {
        self.model_name = Some(model.into());
        self
    }

    pub fn temperature(mut self, temperature: f32) -> Self {
        self.temperature = Some(temperature);
        self
    }

    pub fn max_retries(mut self, retries: u32) -> Self {
        self.max_retries = Some(retries);
        self
    }

    pub fn base_backoff_seconds(mut self, seconds: f64) -> Self {
        self.base_backoff_seconds = Some(seconds);
        self
    }

    pub fn api_base(mut self, api_base: impl Into<String>) -> Self {
        self.api_base = Some(api_base.into());
        self
    }

    pub fn max_iterations(mut self, max: usize) -> Self {
        self.max_iterations = Some(max);
        self
    }

    /// Build the configuration
    pub fn build(self) -> Result<RevenueAgentConfig> {
        let defaults = RevenueAgentConfig::default();

        let config = RevenueAgentConfig {
            api_key: self.api_key.unwrap_or(defaults.api_key),
            model_name: self.model_name.unwrap_or(defaults.model_name),
            temperature: self.temperature.unwrap_or(defaults.temperature),
            max_retries: self.max_retries.unwrap_or(defaults.max_retries),
            base_backoff_seconds: self
                .base_backoff_seconds
                .unwrap_or(defaults.base_backoff_seconds),
            api_base: self.api_base.unwrap_or(defaults.api_base),
            max_iterations: self.max_iterations.unwrap_or(defaults.max_iterations),
        };

        config.validate()?;
        Ok(config)
    }
}
