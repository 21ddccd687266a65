//! Error types for agent-core

use thiserror::Error;

/// Result type alias for agent-core
pub type Result<T> = std::result::Result<T, Error>;

/// Error type for tool execution
#[derive(Error, Debug)]
pub enum Error {
    /// Generic error message
    #[error("{0}")]
    Generic(String),

    /// Tool input did not match the expected shape
    #[error("Invalid parameters: {0}")]
    InvalidParameters(String),

    /// Tool ran but could not produce a result
    #[error("Tool execution failed: {0}")]
    ToolFailed(String),

    /// No tool registered under the requested name
    #[error("Tool not found: {0}")]
    ToolNotFound(String),
}
