//! Natural-language agent boundary
//!
//! The orchestrator only sees [`GrowthAgent`]: an instruction goes in, free
//! text or a classified [`AgentError`] comes out.

use crate::config::RevenueAgentConfig;
use crate::error::{AgentError, Result, RevenueError};
use crate::lookup::RevenueLookup;
use crate::tools::revenue_tool_registry;
use agent_llm::error::text_signals_overcapacity;
use agent_llm::providers::{OpenAIConfig, OpenAIProvider};
use agent_llm::LLMProvider;
use agent_runtime::{AgentExecutor, ExecutorConfig, ExecutorError};
use async_trait::async_trait;
use std::sync::Arc;
use tracing::{info, instrument};

pub const SYSTEM_PROMPT: &str = "\
You are a financial assistant that reports quarterly revenue growth.

Answer every request in two steps:
1. Call revenue_tool with the company name to get its last 3 quarterly revenues.
2. Call calculation_tool with the exact JSON object revenue_tool returned as `revenues`.

Then reply with the quarterly growth rates and finish with one line of the form
\"Average Growth Rate: <number>%\" copied from the calculation_tool result.
If a tool reports an error, explain it briefly instead of inventing figures.";

/// Runs one instruction through an LLM agent
#[async_trait]
pub trait GrowthAgent: Send + Sync {
    async fn run(&self, instruction: &str) -> std::result::Result<String, AgentError>;
}

/// Tool-calling agent over an OpenAI-compatible chat API
pub struct LlmGrowthAgent {
    executor: AgentExecutor,
}

impl LlmGrowthAgent {
    pub fn new(executor: AgentExecutor) -> Self {
        Self { executor }
    }

    /// Agent with the revenue and calculation tools, talking to `config.api_base`
    pub fn from_config(
        config: &RevenueAgentConfig,
        lookup: Arc<dyn RevenueLookup>,
    ) -> Result<Self> {
        let provider = OpenAIProvider::with_config(
            OpenAIConfig::groq(config.api_key.clone()).with_api_base(config.api_base.clone()),
        )
        .map_err(|e| RevenueError::Config(e.to_string()))?;

        Ok(Self::with_provider(config, Arc::new(provider), lookup))
    }

    /// Same as [`Self::from_config`] with an explicit provider
    pub fn with_provider(
        config: &RevenueAgentConfig,
        provider: Arc<dyn LLMProvider>,
        lookup: Arc<dyn RevenueLookup>,
    ) -> Self {
        let executor = AgentExecutor::new(
            provider,
            Arc::new(revenue_tool_registry(lookup)),
            ExecutorConfig {
                max_iterations: config.max_iterations,
                model: config.model_name.clone(),
                system_prompt: Some(SYSTEM_PROMPT.to_string()),
                temperature: Some(config.temperature),
                ..ExecutorConfig::default()
            },
        );
        Self::new(executor)
    }
}

#[async_trait]
impl GrowthAgent for LlmGrowthAgent {
    #[instrument(skip(self))]
    async fn run(&self, instruction: &str) -> std::result::Result<String, AgentError> {
        let answer = self.executor.run(instruction).await.map_err(classify)?;
        info!(answer_length = answer.len(), "Agent answered");
        Ok(answer)
    }
}

/// Decide once, at the boundary, whether a failed run is worth retrying
pub fn classify(error: ExecutorError) -> AgentError {
    let retryable = match &error {
        ExecutorError::Llm(e) => e.is_overcapacity(),
        other => text_signals_overcapacity(&other.to_string()),
    };

    if retryable {
        AgentError::Retryable(error.to_string())
    } else {
        AgentError::Fatal(error.to_string())
    }
}
