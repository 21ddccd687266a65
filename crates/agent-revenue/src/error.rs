//! Error types for revenue growth operations

use thiserror::Error;

/// Failures while resolving a company and fetching its revenue figures
#[derive(Debug, Error)]
pub enum LookupError {
    /// No ticker symbol matched the company name
    #[error("No ticker symbol found for '{0}'")]
    TickerNotFound(String),

    /// The provider has no total revenue line for the ticker
    #[error("Total revenue data not available for {0}")]
    FieldNotFound(String),

    /// Network or decode failure talking to the data provider
    #[error("Revenue provider failure: {0}")]
    ProviderFailure(String),

    /// The provider answered, but not with dated revenue figures
    #[error(transparent)]
    Malformed(#[from] ParseError),
}

/// Failures of the growth calculation itself
#[derive(Debug, Clone, PartialEq, Eq, Error)]
pub enum GrowthError {
    #[error("Not enough data to calculate growth.")]
    InsufficientData,

    /// An older period reported zero revenue
    #[error("Cannot calculate growth from zero revenue on {0}")]
    DivisionByZero(String),
}

/// Revenue data that does not match the date → number contract
#[derive(Debug, Clone, PartialEq, Eq, Error)]
#[error("Invalid revenue data: {0}")]
pub struct ParseError(pub String);

/// Classified failure of a single agent attempt
#[derive(Debug, Error)]
pub enum AgentError {
    /// Upstream is over capacity; the call may succeed later
    #[error("Agent over capacity: {0}")]
    Retryable(String),

    /// Anything else; retrying will not help
    #[error("{0}")]
    Fatal(String),
}

/// Top-level error for the revenue agent
#[derive(Debug, Error)]
pub enum RevenueError {
    #[error(transparent)]
    Lookup(LookupError),

    #[error(transparent)]
    Growth(#[from] GrowthError),

    #[error(transparent)]
    Parse(#[from] ParseError),

    /// Overcapacity persisted through every attempt
    #[error("Agent unavailable after {attempts} attempts (over capacity)")]
    AgentUnavailable { attempts: u32 },

    /// Non-retryable agent failure, original text preserved
    #[error("Agent error: {0}")]
    Agent(String),

    #[error("Configuration error: {0}")]
    Config(String),

    #[error("Template error: {0}")]
    Template(String),
}

/// Result type alias for revenue operations
pub type Result<T> = std::result::Result<T, RevenueError>;

impl From<LookupError> for RevenueError {
    fn from(err: LookupError) -> Self {
        match err {
            LookupError::Malformed(parse) => RevenueError::Parse(parse),
            other => RevenueError::Lookup(other),
        }
    }
}

impl From<RevenueError> for agent_core::Error {
    fn from(err: RevenueError) -> Self {
        agent_core::Error::ToolFailed(err.to_string())
    }
}

impl From<minijinja::Error> for RevenueError {
    fn from(err: minijinja::Error) -> Self {
        RevenueError::Template(err.to_string())
    }
}

#[cfg(test)]
mod tests {
    use super::*;

    #[test]
    fn test_error_display() {
        let err = LookupError::TickerNotFound("acme widgets".to_string());
        assert_eq!(err.to_string(), "No ticker symbol found for 'acme widgets'");

        let err: RevenueError = GrowthError::InsufficientData.into();
        assert_eq!(err.to_string(), "Not enough data to calculate growth.");

        let err = RevenueError::AgentUnavailable { attempts: 5 };
        assert_eq!(
            err.to_string(),
            "Agent unavailable after 5 attempts (over capacity)"
        );
    }

    #[test]
    fn test_malformed_lookup_is_parse_error() {
        let err: RevenueError =
            LookupError::Malformed(ParseError("bad date 'Q3'".to_string())).into();
        assert!(matches!(err, RevenueError::Parse(ParseError(msg)) if msg.contains("Q3")));

        let err: RevenueError = LookupError::FieldNotFound("XYZ".to_string()).into();
        assert!(matches!(err, RevenueError::Lookup(LookupError::FieldNotFound(_))));
    }

    #[test]
    fn test_error_conversion() {
        let err: RevenueError = ParseError("not an object".to_string()).into();
        let agent_err: agent_core::Error = err.into();

        match agent_err {
            agent_core::Error::ToolFailed(msg) => {
                assert!(msg.contains("not an object"));
            }
            _ => panic!("Expected ToolFailed variant"),
        }
    }
}
