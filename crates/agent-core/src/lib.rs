//! Core abstractions shared by the revenue agent crates
//!
//! This crate defines the tool contract that LLM agents call into, the
//! registry that holds those tools, and the common error type.

pub mod error;
pub mod registry;
pub mod tool;

pub use error::{Error, Result};
pub use registry::ToolRegistry;
pub use tool::Tool;
