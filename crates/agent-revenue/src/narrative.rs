//! Growth narrative: agent text or direct computation, and its insight

use crate::growth::{GrowthReport, fmt_rate};
use regex::Regex;
use std::fmt;
use std::sync::LazyLock;

static AVERAGE_RATE: LazyLock<Option<Regex>> = LazyLock::new(|| {
    Regex::new(r"(?i)average growth rate.*?(-?\d+(?:\.\d+)?)\s*%").ok()
});

/// Where the growth figure of a response came from
#[derive(Debug, Clone, PartialEq)]
pub enum GrowthNarrative {
    /// Free text from the agent, with the average it states (if any)
    AgentDerived {
        text: String,
        parsed_rate: Option<f64>,
    },
    /// Report computed from looked-up revenue figures
    DirectlyComputed(GrowthReport),
}

impl GrowthNarrative {
    /// Wrap an agent answer, extracting its stated average
    pub fn from_agent_text(text: impl Into<String>) -> Self {
        let text = text.into();
        let parsed_rate = extract_average_rate(&text);
        Self::AgentDerived { text, parsed_rate }
    }

    /// Average growth this narrative vouches for
    pub fn average_rate(&self) -> Option<f64> {
        match self {
            Self::AgentDerived { parsed_rate, .. } => parsed_rate.filter(|r| r.is_finite()),
            Self::DirectlyComputed(report) => Some(report.average_rate_percent),
        }
    }

    pub fn insight(&self) -> Option<GrowthInsight> {
        self.average_rate().map(GrowthInsight::from_rate)
    }

    /// The agent text, or the report summary
    pub fn text(&self) -> String {
        match self {
            Self::AgentDerived { text, .. } => text.clone(),
            Self::DirectlyComputed(report) => report.summary(),
        }
    }

    /// Whether this narrative needs no fallback computation
    pub fn is_usable(&self) -> bool {
        self.average_rate().is_some()
    }
}

/// Prefer the agent's narrative when it states a finite average, else the computed one
///
/// Returns `None` when neither side has a usable figure.
pub fn select(
    agent: Option<GrowthNarrative>,
    computed: Option<GrowthReport>,
) -> Option<GrowthNarrative> {
    match agent {
        Some(narrative) if narrative.is_usable() => Some(narrative),
        _ => computed.map(GrowthNarrative::DirectlyComputed),
    }
}

/// Average growth rate stated in free text, e.g. "average growth rate is -3.5%"
pub fn extract_average_rate(text: &str) -> Option<f64> {
    let pattern = AVERAGE_RATE.as_ref()?;
    pattern
        .captures(text)?
        .get(1)?
        .as_str()
        .parse::<f64>()
        .ok()
        .filter(|rate| rate.is_finite())
}

/// Direction of the average growth, with its magnitude
#[derive(Debug, Clone, Copy, PartialEq)]
pub enum GrowthInsight {
    Increasing(f64),
    /// Magnitude is positive
    Decreasing(f64),
    Stable,
}

impl GrowthInsight {
    pub fn from_rate(rate: f64) -> Self {
        if rate > 0.0 {
            Self::Increasing(rate)
        } else if rate < 0.0 {
            Self::Decreasing(rate.abs())
        } else {
            Self::Stable
        }
    }
}

impl fmt::Display for GrowthInsight {
    fn fmt(&self, f: &mut fmt::Formatter<'_>) -> fmt::Result {
        match self {
            Self::Increasing(rate) => write!(
                f,
                "Positive growth: Revenue is increasing by an average of {}%.",
                fmt_rate(*rate)
            ),
            Self::Decreasing(rate) => write!(
                f,
                "Negative growth: Revenue is decreasing by an average of {}%.",
                fmt_rate(*rate)
            ),
            Self::Stable => write!(f, "Stable revenue: The average growth rate is 0%."),
        }
    }
}
