//! Instruction sent to the agent for a company

use crate::error::Result;
use minijinja::{Environment, context};

const INSTRUCTION_TEMPLATE: &str =
    "Get {{ company }} last 3 quarterly revenues and calculate the average growth rate.";

/// Natural-language instruction asking for `company`'s revenue growth
pub fn instruction(company: &str) -> Result<String> {
    let env = Environment::new();
    let rendered = env.render_str(INSTRUCTION_TEMPLATE, context! { company => company.trim() })?;
    Ok(rendered)
}
