//! Tool trait definition

use crate::Result;
use async_trait::async_trait;
use serde_json::Value;

/// Trait for tools that agents can execute
///
/// A tool is a named function the LLM may request during the agent loop.
/// The name, description and JSON schema are advertised to the model; the
/// executor routes each tool call back to [`Tool::execute`].
#[async_trait]
pub trait Tool: Send + Sync {
    /// Execute the tool with the arguments chosen by the model
    ///
    /// Errors are reported back to the model as error tool results, so a
    /// failing tool does not abort the agent loop.
    async fn execute(&self, params: Value) -> Result<Value>;

    /// Unique tool name within a [`crate::ToolRegistry`]
    fn name(&self) -> &str;

    /// Description that helps the model decide when to call the tool
    fn description(&self) -> &str;

    /// JSON Schema of the expected arguments
    ///
    /// # Example
    ///
    /// ```
    /// use serde_json::json;
    ///
    /// let schema = json!({
    ///     "type": "object",
    ///     "properties": {
    ///         "company_name": { "type": "string" }
    ///     },
    ///     "required": ["company_name"]
    /// });
    /// assert_eq!(schema["type"], "object");
    /// ```
    fn input_schema(&self) -> Value;
}
