//! Agent runtime
//!
//! Provides the [`AgentExecutor`], which runs the tool-calling loop between an
//! LLM provider and a registry of tools.

pub mod executor;

pub use executor::{AgentExecutor, AgentExecutorBuilder, ExecutorConfig, ExecutorError};
