//! Agent executor for running agent loops
//!
//! The AgentExecutor implements the core agent loop pattern:
//! 1. Call LLM with conversation history and available tools
//! 2. Check stop reason
//! 3. If tool use requested, execute tools and loop back
//! 4. If completed, return final response
//!
//! When the iteration budget runs out the executor asks the model once more,
//! without tools, to produce a final answer from what it has gathered.

use agent_core::ToolRegistry;
use agent_llm::{
    CompletionRequest, ContentBlock, LLMError, LLMProvider, Message, StopReason, ToolDefinition,
};
use std::sync::Arc;
use std::time::Instant;
use thiserror::Error;
use tracing::{debug, info, warn};

const DEFAULT_SYSTEM_PROMPT: &str = "You are a helpful assistant.";
const FINAL_ANSWER_PROMPT: &str =
    "You have run out of tool calls. Give your final answer now using the information above.";

/// Errors that end an agent run
#[derive(Error, Debug)]
pub enum ExecutorError {
    /// The LLM provider call failed
    #[error(transparent)]
    Llm(#[from] LLMError),

    /// Builder was finished without a provider
    #[error("Executor initialization failed: {0}")]
    Initialization(String),
}

pub type Result<T> = std::result::Result<T, ExecutorError>;

/// Configuration for agent execution
#[derive(Debug, Clone)]
pub struct ExecutorConfig {
    /// Maximum number of LLM round trips before forcing a final answer
    pub max_iterations: usize,

    pub model: String,

    pub system_prompt: Option<String>,

    /// Max tokens per completion
    pub max_tokens: usize,

    pub temperature: Option<f32>,
}

impl Default for ExecutorConfig {
    fn default() -> Self {
        Self {
            max_iterations: 10,
            model: "llama3-8b-8192".to_string(),
            system_prompt: None,
            max_tokens: 1024,
            temperature: Some(0.0),
        }
    }
}

/// Executes an agent loop: LLM → tool calls → execution → loop back
pub struct AgentExecutor {
    provider: Arc<dyn LLMProvider>,
    tool_registry: Arc<ToolRegistry>,
    config: ExecutorConfig,
}

impl AgentExecutor {
    pub fn new(
        provider: Arc<dyn LLMProvider>,
        tool_registry: Arc<ToolRegistry>,
        config: ExecutorConfig,
    ) -> Self {
        Self {
            provider,
            tool_registry,
            config,
        }
    }

    pub fn builder() -> AgentExecutorBuilder {
        AgentExecutorBuilder::new()
    }

    pub fn config(&self) -> &ExecutorConfig {
        &self.config
    }

    /// Execute the agent loop for a single user message
    ///
    /// Returns the model's final text answer. Provider failures end the run;
    /// tool failures are reported back to the model and the loop continues.
    pub async fn run(&self, user_message: impl Into<String>) -> Result<String> {
        let mut conversation = vec![Message::user(user_message)];
        let tools = self.build_tool_definitions();
        debug!(tool_count = tools.len(), "Available tools");

        for iteration in 1..=self.config.max_iterations {
            info!(
                iteration,
                max_iterations = self.config.max_iterations,
                provider = self.provider.name(),
                "Agent iteration started"
            );

            let request = self
                .request_builder(&conversation)
                .tools(tools.clone())
                .build();
            let response = self.provider.complete(request).await?;

            info!(
                stop_reason = ?response.stop_reason,
                input_tokens = response.usage.input_tokens,
                output_tokens = response.usage.output_tokens,
                "LLM response received"
            );

            let requested_tools = response.message.has_tool_uses();
            conversation.push(response.message.clone());

            match response.stop_reason {
                StopReason::ToolUse if requested_tools => {
                    let results = self.execute_tools(&response.message).await;
                    conversation.extend(results);
                }
                StopReason::MaxTokens => {
                    warn!("Hit max tokens in LLM response");
                    return Ok(response.message.text().unwrap_or_default().to_string());
                }
                _ => {
                    let text = response.message.text().unwrap_or_default().to_string();
                    info!(iteration, response_length = text.len(), "Agent completed");
                    return Ok(text);
                }
            }
        }

        warn!(
            max_iterations = self.config.max_iterations,
            "Max iterations reached, generating final answer"
        );
        conversation.push(Message::user(FINAL_ANSWER_PROMPT));
        let request = self.request_builder(&conversation).build();
        let response = self.provider.complete(request).await?;
        Ok(response.message.text().unwrap_or_default().to_string())
    }

    fn request_builder(&self, conversation: &[Message]) -> agent_llm::completion::CompletionRequestBuilder {
        let mut builder = CompletionRequest::builder(&self.config.model)
            .messages(conversation.to_vec())
            .system(
                self.config
                    .system_prompt
                    .clone()
                    .unwrap_or_else(|| DEFAULT_SYSTEM_PROMPT.to_string()),
            )
            .max_tokens(self.config.max_tokens);
        if let Some(temperature) = self.config.temperature {
            builder = builder.temperature(temperature);
        }
        builder
    }

    /// Build tool definitions from the registry
    fn build_tool_definitions(&self) -> Vec<ToolDefinition> {
        self.tool_registry
            .list_tools()
            .iter()
            .map(|tool| ToolDefinition::new(tool.name(), tool.description(), tool.input_schema()))
            .collect()
    }

    /// Execute every tool call in an assistant message, in order
    async fn execute_tools(&self, message: &Message) -> Vec<Message> {
        let mut results = Vec::new();

        for block in message.tool_uses() {
            let ContentBlock::ToolUse { id, name, input } = block else {
                continue;
            };

            let input_preview: String = input.to_string().chars().take(500).collect();
            info!(tool_name = %name, tool_id = %id, input_preview = %input_preview, "Executing tool");

            let Some(tool) = self.tool_registry.get(name) else {
                warn!(tool_name = %name, "Model requested an unknown tool");
                results.push(Message::tool_error(
                    id.clone(),
                    format!("Error: unknown tool '{name}'"),
                ));
                continue;
            };

            let started = Instant::now();
            match tool.execute(input.clone()).await {
                Ok(value) => {
                    let result_str = match value {
                        serde_json::Value::String(s) => s,
                        other => other.to_string(),
                    };
                    info!(
                        tool_name = %name,
                        duration_ms = started.elapsed().as_millis() as u64,
                        result_length = result_str.len(),
                        "Tool execution succeeded"
                    );
                    results.push(Message::tool_result(id.clone(), result_str));
                }
                Err(e) => {
                    warn!(
                        tool_name = %name,
                        duration_ms = started.elapsed().as_millis() as u64,
                        error = %e,
                        "Tool execution failed"
                    );
                    results.push(Message::tool_error(id.clone(), format!("Error: {e}")));
                }
            }
        }

        results
    }
}

/// Builder for AgentExecutor
pub struct AgentExecutorBuilder {
    provider: Option<Arc<dyn LLMProvider>>,
    tool_registry: Arc<ToolRegistry>,
    config: ExecutorConfig,
}

impl AgentExecutorBuilder {
    pub fn new() -> Self {
        Self {
            provider: None,
            tool_registry: Arc::new(ToolRegistry::new()),
            config: ExecutorConfig::default(),
        }
    }

    pub fn provider(mut self, provider: Arc<dyn LLMProvider>) -> Self {
        self.provider = Some(provider);
        self
    }

    pub fn tool_registry(mut self, registry: Arc<ToolRegistry>) -> Self {
        self.tool_registry = registry;
        self
    }

    pub fn config(mut self, config: ExecutorConfig) -> Self {
        self.config = config;
        self
    }

    pub fn max_iterations(mut self, max: usize) -> Self {
        self.config.max_iterations = max;
        self
    }

    pub fn model(mut self, model: impl Into<String>) -> Self {
        self.config.model = model.into();
        self
    }

    pub fn system_prompt(mut self, prompt: impl Into<String>) -> Self {
        self.config.system_prompt = Some(prompt.into());
        self
    }

    pub fn temperature(mut self, temperature: f32) -> Self {
        self.config.temperature = Some(temperature);
        self
    }

    pub fn build(self) -> Result<AgentExecutor> {
        let provider = self
            .provider
            .ok_or_else(|| ExecutorError::Initialization("Provider not set".to_string()))?;

        Ok(AgentExecutor::new(provider, self.tool_registry, self.config))
    }
}

impl Default for AgentExecutorBuilder {
    fn default() -> Self {
        Self::new()
    }
}

#[cfg(test)]
mod tests {
    use super::*;
    use agent_core::Tool;
    use agent_llm::{CompletionResponse, MessageContent, Role, TokenUsage};
    use async_trait::async_trait;
    use serde_json::{Value, json};
    use std::collections::VecDeque;
    use std::sync::Mutex;

    /// Replays canned responses and records every request it receives
    struct ScriptedProvider {
        responses: Mutex<VecDeque<agent_llm::Result<CompletionResponse>>>,
        requests: Mutex<Vec<CompletionRequest>>,
    }

    impl ScriptedProvider {
        fn new(responses: Vec<agent_llm::Result<CompletionResponse>>) -> Self {
            Self {
                responses: Mutex::new(responses.into()),
                requests: Mutex::new(Vec::new()),
            }
        }
    }

    #[async_trait]
    impl LLMProvider for ScriptedProvider {
        async fn complete(&self, request: CompletionRequest) -> agent_llm::Result<CompletionResponse> {
            self.requests.lock().unwrap().push(request);
            self.responses
                .lock()
                .unwrap()
                .pop_front()
                .unwrap_or_else(|| Err(LLMError::RequestFailed("script exhausted".to_string())))
        }

        fn name(&self) -> &str {
            "scripted"
        }
    }

    struct UpperTool;

    #[async_trait]
    impl Tool for UpperTool {
        async fn execute(&self, params: Value) -> agent_core::Result<Value> {
            let text = params["text"]
                .as_str()
                .ok_or_else(|| agent_core::Error::InvalidParameters("text missing".to_string()))?;
            Ok(Value::String(text.to_uppercase()))
        }

        fn name(&self) -> &str {
            "upper"
        }

        fn description(&self) -> &str {
            "Uppercases text"
        }

        fn input_schema(&self) -> Value {
            json!({ "type": "object", "properties": { "text": { "type": "string" } } })
        }
    }

    fn text_response(text: &str) -> agent_llm::Result<CompletionResponse> {
        Ok(CompletionResponse {
            message: Message::assistant(text),
            stop_reason: StopReason::EndTurn,
            usage: TokenUsage::default(),
        })
    }

    fn tool_response(name: &str, input: Value) -> agent_llm::Result<CompletionResponse> {
        Ok(CompletionResponse {
            message: Message {
                role: Role::Assistant,
                content: MessageContent::Blocks(vec![ContentBlock::ToolUse {
                    id: "call_1".to_string(),
                    name: name.to_string(),
                    input,
                }]),
            },
            stop_reason: StopReason::ToolUse,
            usage: TokenUsage::default(),
        })
    }

    fn executor(provider: Arc<ScriptedProvider>, max_iterations: usize) -> AgentExecutor {
        let registry = Arc::new(ToolRegistry::new());
        registry.register(Arc::new(UpperTool));
        AgentExecutor::builder()
            .provider(provider)
            .tool_registry(registry)
            .max_iterations(max_iterations)
            .build()
            .unwrap()
    }

    #[test]
    fn test_builder_requires_provider() {
        let result = AgentExecutorBuilder::new().model("m").build();
        assert!(matches!(result, Err(ExecutorError::Initialization(_))));
    }

    #[test]
    fn test_default_config() {
        let config = ExecutorConfig::default();
        assert_eq!(config.max_iterations, 10);
        assert_eq!(config.temperature, Some(0.0));
    }

    #[tokio::test]
    async fn test_plain_answer() {
        let provider = Arc::new(ScriptedProvider::new(vec![text_response("done")]));
        let result = executor(provider.clone(), 5).run("hi").await.unwrap();

        assert_eq!(result, "done");
        let requests = provider.requests.lock().unwrap();
        assert_eq!(requests.len(), 1);
        assert_eq!(requests[0].tools.len(), 1);
    }

    #[tokio::test]
    async fn test_tool_result_is_fed_back() {
        let provider = Arc::new(ScriptedProvider::new(vec![
            tool_response("upper", json!({ "text": "abc" })),
            text_response("ABC it is"),
        ]));
        let result = executor(provider.clone(), 5).run("shout abc").await.unwrap();
        assert_eq!(result, "ABC it is");

        let requests = provider.requests.lock().unwrap();
        let last = requests[1].messages.last().unwrap();
        match &last.content {
            MessageContent::Blocks(blocks) => match &blocks[0] {
                ContentBlock::ToolResult {
                    content, is_error, ..
                } => {
                    assert_eq!(content, "ABC");
                    assert!(is_error.is_none());
                }
                _ => panic!("Expected tool result"),
            },
            MessageContent::Text(_) => panic!("Expected blocks"),
        }
    }

    #[tokio::test]
    async fn test_tool_failure_does_not_end_run() {
        let provider = Arc::new(ScriptedProvider::new(vec![
            tool_response("upper", json!({})),
            tool_response("missing_tool", json!({})),
            text_response("gave up"),
        ]));
        let result = executor(provider.clone(), 5).run("x").await.unwrap();
        assert_eq!(result, "gave up");
    }

    #[tokio::test]
    async fn test_provider_error_propagates() {
        let provider = Arc::new(ScriptedProvider::new(vec![Err(LLMError::Overloaded(
            "over capacity".to_string(),
        ))]));
        let err = executor(provider, 5).run("x").await.unwrap_err();
        assert!(matches!(err, ExecutorError::Llm(LLMError::Overloaded(_))));
    }

    #[tokio::test]
    async fn test_final_answer_after_max_iterations() {
        let provider = Arc::new(ScriptedProvider::new(vec![
            tool_response("upper", json!({ "text": "a" })),
            tool_response("upper", json!({ "text": "b" })),
            text_response("final"),
        ]));
        let result = executor(provider.clone(), 2).run("x").await.unwrap();
        assert_eq!(result, "final");

        let requests = provider.requests.lock().unwrap();
        assert_eq!(requests.len(), 3);
        assert!(requests[2].tools.is_empty());
    }
}
