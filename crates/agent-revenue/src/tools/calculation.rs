//! Tool for computing QoQ growth from revenue figures

use agent_core::{Result as AgentResult, Tool};
use async_trait::async_trait;
use serde_json::{Value, json};

use crate::growth::compute_growth;
use crate::series::RevenueSeries;

const INVALID_INPUT: &str = "Invalid input format. Expected a dict of revenues by date.";

/// Calculates QoQ growth rates and their average from a dict of revenues by date
#[derive(Debug, Default)]
pub struct CalculationTool;

impl CalculationTool {
    pub fn new() -> Self {
        Self
    }

    /// Accepts `{"revenues": {...}}`, `{"revenues": "<json text>"}`, or the
    /// revenue object/text itself
    fn parse_input(params: &Value) -> AgentResult<RevenueSeries> {
        let data = params.get("revenues").unwrap_or(params);
        let data = match data {
            Value::String(text) => serde_json::from_str::<Value>(&text.trim().replace('\'', "\""))
                .map_err(|e| {
                    agent_core::Error::InvalidParameters(format!("revenues is not valid JSON: {e}"))
                })?,
            other => other.clone(),
        };

        if !data.is_object() {
            return Err(agent_core::Error::Generic(INVALID_INPUT.to_string()));
        }

        RevenueSeries::from_value(&data)
            .map_err(|e| agent_core::Error::InvalidParameters(e.to_string()))
    }
}

#[async_trait]
impl Tool for CalculationTool {
    async fn execute(&self, params: Value) -> AgentResult<Value> {
        let series = Self::parse_input(&params)?;
        let report =
            compute_growth(&series).map_err(|e| agent_core::Error::Generic(e.to_string()))?;
        Ok(Value::String(report.summary()))
    }

    fn name(&self) -> &'static str {
        "calculation_tool"
    }

    fn description(&self) -> &'static str {
        "Calculates QoQ growth rates and average growth from a dict of revenues by date. \
         Pass the JSON object returned by revenue_tool as `revenues`."
    }

    fn input_schema(&self) -> Value {
        json!({
            "type": "object",
            "properties": {
                "revenues": {
                    "type": ["object", "string"],
                    "description": "Mapping of ISO period-end date to revenue, e.g. {\"2024-09-30\": 94930000000}"
                }
            },
            "required": ["revenues"]
        })
    }
}
