//! Company name → revenue series lookup

use crate::error::LookupError;
use crate::series::RevenueSeries;
use async_trait::async_trait;

/// Resolves a company and fetches its most recent quarterly revenue figures
///
/// Implementations return at most the three newest periods that carry a
/// total revenue figure. No caching or retry happens at this layer.
#[cfg_attr(test, mockall::automock)]
#[async_trait]
pub trait RevenueLookup: Send + Sync {
    /// `company_name` is free text such as "apple" or "Infosys"
    async fn fetch(&self, company_name: &str) -> Result<RevenueSeries, LookupError>;
}
