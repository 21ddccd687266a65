//! End-to-end handling of one company query
//!
//! A query runs two independent halves:
//! - the narrative: the LLM agent (with overcapacity retries), falling back to
//!   a direct lookup and computation when its answer states no average
//! - the chart: a direct lookup and computation, always performed
//!
//! Each half reports its own failure without aborting the other.

use crate::agent::{GrowthAgent, LlmGrowthAgent};
use crate::api::YahooRevenueLookup;
use crate::chart::{ChartRenderer, SvgBarChartRenderer};
use crate::config::RevenueAgentConfig;
use crate::error::{LookupError, Result, RevenueError};
use crate::growth::{GrowthReport, compute_growth};
use crate::lookup::RevenueLookup;
use crate::narrative::{GrowthInsight, GrowthNarrative, select};
use crate::prompt::instruction;
use crate::retry::RetryPolicy;
use crate::series::RevenueSeries;
use std::sync::Arc;
use std::time::Duration;
use tracing::{info, instrument, warn};

/// Progress notifications while a query runs
pub trait OrchestratorEventHandler: Send + Sync {
    /// Attempt `attempt` (1-based) was over capacity; retrying after `delay`
    fn on_retry(&self, _attempt: u32, _delay: Duration) {}

    /// The agent answer carried no average; computing it directly
    fn on_fallback(&self) {}
}

/// Ignores every event
#[derive(Debug, Default, Clone, Copy)]
pub struct NoopEventHandler;

impl OrchestratorEventHandler for NoopEventHandler {}

/// Data for the revenue chart
#[derive(Debug, Clone)]
pub struct ChartData {
    pub series: RevenueSeries,
    pub report: GrowthReport,
    /// Encoded image from the renderer, if it produced one
    pub image_base64: Option<String>,
    pub mime_type: &'static str,
}

/// Everything one query produced
#[derive(Debug)]
pub struct OrchestrationResult {
    pub company: String,
    pub instruction: String,
    /// Raw agent answer
    pub agent_response: Option<String>,
    /// Agent failure after retries; the narrative may still come from the fallback
    pub agent_error: Option<RevenueError>,
    pub narrative: Option<GrowthNarrative>,
    /// Fallback computation failure
    pub narrative_error: Option<RevenueError>,
    pub chart: Option<ChartData>,
    pub chart_error: Option<RevenueError>,
}

impl OrchestrationResult {
    pub fn insight(&self) -> Option<GrowthInsight> {
        self.narrative.as_ref().and_then(GrowthNarrative::insight)
    }

    /// The narrative came from direct computation rather than the agent text
    pub fn used_fallback(&self) -> bool {
        matches!(self.narrative, Some(GrowthNarrative::DirectlyComputed(_)))
    }

    /// Fewer periods than requested fed the chart report
    pub fn is_partial(&self) -> bool {
        self.chart.as_ref().is_some_and(|c| c.report.is_partial())
    }
}

/// Drives agent, lookup, calculation and chart rendering for a query
pub struct QueryOrchestrator {
    agent: Arc<dyn GrowthAgent>,
    lookup: Arc<dyn RevenueLookup>,
    renderer: Arc<dyn ChartRenderer>,
    retry: RetryPolicy,
    events: Arc<dyn OrchestratorEventHandler>,
}

impl QueryOrchestrator {
    pub fn new(
        agent: Arc<dyn GrowthAgent>,
        lookup: Arc<dyn RevenueLookup>,
        renderer: Arc<dyn ChartRenderer>,
        retry: RetryPolicy,
    ) -> Self {
        Self {
            agent,
            lookup,
            renderer,
            retry,
            events: Arc::new(NoopEventHandler),
        }
    }

    /// Yahoo lookup, LLM agent and SVG charts wired from `config`
    pub fn from_config(config: &RevenueAgentConfig) -> Result<Self> {
        config.validate()?;
        let lookup: Arc<dyn RevenueLookup> = Arc::new(YahooRevenueLookup::new());
        let agent = LlmGrowthAgent::from_config(config, lookup.clone())?;

        Ok(Self::new(
            Arc::new(agent),
            lookup,
            Arc::new(SvgBarChartRenderer::new()),
            RetryPolicy::from_config(config)?,
        ))
    }

    pub fn with_events(mut self, events: Arc<dyn OrchestratorEventHandler>) -> Self {
        self.events = events;
        self
    }

    /// Answer a revenue growth query for `company`
    ///
    /// Only an empty company name or an unrenderable instruction fail the
    /// whole call; every other failure lands in the result's error fields.
    #[instrument(skip(self))]
    pub async fn handle(&self, company: &str) -> Result<OrchestrationResult> {
        let company = company.trim();
        if company.is_empty() {
            return Err(LookupError::TickerNotFound(String::new()).into());
        }
        let instruction = instruction(company)?;

        let (agent_response, agent_error) = match self.run_agent(&instruction).await {
            Ok(text) => (Some(text), None),
            Err(e) => {
                warn!(error = %e, "Agent failed");
                (None, Some(e))
            }
        };

        let agent_narrative = agent_response.clone().map(GrowthNarrative::from_agent_text);
        let (narrative, narrative_error) = match agent_narrative {
            Some(narrative) if narrative.is_usable() => (Some(narrative), None),
            agent_narrative => {
                self.events.on_fallback();
                info!(company, "No average in agent answer, computing directly");
                match self.direct_report(company).await {
                    Ok((_, report)) => (select(agent_narrative, Some(report)), None),
                    Err(e) => (None, Some(e)),
                }
            }
        };

        let (chart, chart_error) = match self.chart_data(company).await {
            Ok(chart) => (Some(chart), None),
            Err(e) => {
                warn!(error = %e, "Chart data unavailable");
                (None, Some(e))
            }
        };

        Ok(OrchestrationResult {
            company: company.to_string(),
            instruction,
            agent_response,
            agent_error,
            narrative,
            narrative_error,
            chart,
            chart_error,
        })
    }

    async fn run_agent(&self, instruction: &str) -> Result<String> {
        self.retry
            .execute(
                "growth_agent",
                |attempt, delay| self.events.on_retry(attempt, delay),
                || self.agent.run(instruction),
            )
            .await
    }

    /// Look up revenue and compute growth without the agent
    pub async fn direct_report(&self, company: &str) -> Result<(RevenueSeries, GrowthReport)> {
        let series = self.lookup.fetch(company).await?;
        let report = compute_growth(&series)?;
        Ok((series, report))
    }

    async fn chart_data(&self, company: &str) -> Result<ChartData> {
        let (series, report) = self.direct_report(company).await?;
        let image_base64 = self.renderer.render(company, &series.to_json_string());
        if image_base64.is_none() {
            warn!(company, "Chart renderer produced no image");
        }

        Ok(ChartData {
            series,
            report,
            image_base64,
            mime_type: self.renderer.mime_type(),
        })
    }
}
