//! Quarterly revenue growth agent
//!
//! Answers "how is <company>'s revenue trending?" by combining:
//! - a revenue lookup (Yahoo Finance) returning the last three quarterly figures
//! - a quarter-over-quarter growth calculator
//! - an LLM tool-calling agent, retried with jittered backoff when the
//!   provider is over capacity, with direct computation as the fallback
//! - an SVG bar chart of the figures
//!
//! [`QueryOrchestrator`] ties these together for a single query.

pub mod agent;
pub mod api;
pub mod chart;
pub mod config;
pub mod error;
pub mod growth;
pub mod lookup;
pub mod narrative;
pub mod orchestrator;
pub mod prompt;
pub mod retry;
pub mod series;
pub mod tools;

pub use agent::{GrowthAgent, LlmGrowthAgent};
pub use api::YahooRevenueLookup;
pub use chart::{ChartRenderer, SvgBarChartRenderer};
pub use config::{RevenueAgentConfig, RevenueAgentConfigBuilder};
pub use error::{AgentError, GrowthError, LookupError, ParseError, Result, RevenueError};
pub use growth::{GrowthPeriod, GrowthReport, compute_growth};
pub use lookup::RevenueLookup;
pub use narrative::{GrowthInsight, GrowthNarrative};
pub use orchestrator::{
    ChartData, NoopEventHandler, OrchestrationResult, OrchestratorEventHandler, QueryOrchestrator,
};
pub use retry::RetryPolicy;
pub use series::RevenueSeries;
