//! Shared utilities for the revenue agent
//!
//! Logging setup and `.env` loading used by the binaries in this workspace.

pub mod env;
pub mod logging;

pub use env::load_env;
pub use logging::{DEFAULT_FILTER, init_tracing, init_tracing_with};
