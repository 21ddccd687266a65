//! Tool for fetching quarterly revenue of a company

use agent_core::{Result as AgentResult, Tool};
use agent_llm::tools::schema;
use async_trait::async_trait;
use serde::Deserialize;
use serde_json::{Value, json};
use std::sync::Arc;
use tracing::debug;

use crate::lookup::RevenueLookup;

/// Looks up the last three quarterly revenues of a company by name
pub struct RevenueTool {
    lookup: Arc<dyn RevenueLookup>,
}

#[derive(Debug, Deserialize)]
struct RevenueParams {
    company_name: String,
}

impl RevenueTool {
    pub fn new(lookup: Arc<dyn RevenueLookup>) -> Self {
        Self { lookup }
    }
}

#[async_trait]
impl Tool for RevenueTool {
    async fn execute(&self, params: Value) -> AgentResult<Value> {
        // Some models pass the bare company name instead of an object
        let params: RevenueParams = match params {
            Value::String(company_name) => RevenueParams { company_name },
            other => serde_json::from_value(other).map_err(|e| {
                agent_core::Error::InvalidParameters(format!("expected company_name: {e}"))
            })?,
        };

        let series = self
            .lookup
            .fetch(&params.company_name)
            .await
            .map_err(|e| agent_core::Error::ToolFailed(e.to_string()))?;

        debug!(company = %params.company_name, periods = series.len(), "Revenue tool result");
        Ok(series.to_json_value())
    }

    fn name(&self) -> &'static str {
        "revenue_tool"
    }

    fn description(&self) -> &'static str {
        "Get quarterly revenue for any company (e.g., 'apple', 'infosys', 'tcs'). \
         Returns a JSON object mapping period-end dates to total revenue for the last 3 quarters."
    }

    fn input_schema(&self) -> Value {
        schema::object(
            json!({ "company_name": schema::string("Company name, e.g. 'apple' or 'Infosys'") }),
            &["company_name"],
        )
    }
}
