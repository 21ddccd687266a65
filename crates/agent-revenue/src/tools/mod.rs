//! Tools exposed to the LLM agent

pub mod calculation;
pub mod revenue;

pub use calculation::CalculationTool;
pub use revenue::RevenueTool;

use crate::lookup::RevenueLookup;
use agent_core::ToolRegistry;
use std::sync::Arc;

/// Registry holding the revenue and calculation tools
pub fn revenue_tool_registry(lookup: Arc<dyn RevenueLookup>) -> ToolRegistry {
    let registry = ToolRegistry::new();
    registry.register(Arc::new(RevenueTool::new(lookup)));
    registry.register(Arc::new(CalculationTool::new()));
    registry
}
