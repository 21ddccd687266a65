//! Yahoo Finance revenue lookup

use crate::error::{LookupError, ParseError};
use crate::lookup::RevenueLookup;
use crate::series::RevenueSeries;
use async_trait::async_trait;
use chrono::{Duration, NaiveDate, Utc};
use serde::Deserialize;
use std::time::Duration as StdDuration;
use tracing::{debug, info, instrument, warn};
use yahoo_finance_api as yahoo;

const TIMESERIES_URL: &str =
    "https://query2.finance.yahoo.com/ws/fundamentals-timeseries/v1/finance/timeseries";
const REVENUE_FIELD: &str = "quarterlyTotalRevenue";
const USER_AGENT: &str = "Mozilla/5.0 (compatible; revenue-agent/0.1)";
const HISTORY_DAYS: i64 = 5 * 365;
const PERIODS: usize = 3;

/// Revenue lookup backed by Yahoo symbol search and the fundamentals time series
pub struct YahooRevenueLookup {
    client: reqwest::Client,
}

#[derive(Debug, Deserialize)]
struct TimeseriesResponse {
    timeseries: Timeseries,
}

#[derive(Debug, Deserialize)]
struct Timeseries {
    #[serde(default)]
    result: Option<Vec<TimeseriesResult>>,
    #[serde(default)]
    error: Option<serde_json::Value>,
}

#[derive(Debug, Deserialize)]
#[serde(rename_all = "camelCase")]
struct TimeseriesResult {
    #[serde(default)]
    quarterly_total_revenue: Option<Vec<Option<RevenuePoint>>>,
}

#[derive(Debug, Deserialize)]
#[serde(rename_all = "camelCase")]
struct RevenuePoint {
    as_of_date: String,
    #[serde(default)]
    reported_value: Option<ReportedValue>,
}

#[derive(Debug, Deserialize)]
struct ReportedValue {
    raw: Option<f64>,
}

impl YahooRevenueLookup {
    pub fn new() -> Self {
        Self {
            client: reqwest::Client::builder()
                .user_agent(USER_AGENT)
                .timeout(StdDuration::from_secs(30))
                .build()
                .unwrap_or_else(|_| reqwest::Client::new()),
        }
    }

    /// First ticker symbol Yahoo suggests for `company_name`
    #[instrument(skip(self))]
    pub async fn resolve_ticker(&self, company_name: &str) -> Result<String, LookupError> {
        let connector = yahoo::YahooConnector::new()
            .map_err(|e| LookupError::ProviderFailure(e.to_string()))?;

        let search = connector
            .search_ticker(company_name)
            .await
            .map_err(|e| LookupError::ProviderFailure(e.to_string()))?;

        let symbol = search
            .quotes
            .into_iter()
            .map(|quote| quote.symbol)
            .find(|symbol| !symbol.trim().is_empty())
            .ok_or_else(|| LookupError::TickerNotFound(company_name.to_string()))?;

        debug!(symbol = %symbol, "Resolved ticker");
        Ok(symbol)
    }

    /// Quarterly total revenue for `symbol`, three newest periods
    #[instrument(skip(self))]
    pub async fn quarterly_revenue(&self, symbol: &str) -> Result<RevenueSeries, LookupError> {
        let now = Utc::now();
        let start = now - Duration::days(HISTORY_DAYS);
        let url = format!("{TIMESERIES_URL}/{symbol}");

        let response = self
            .client
            .get(&url)
            .query(&[
                ("symbol", symbol.to_string()),
                ("type", REVENUE_FIELD.to_string()),
                ("period1", start.timestamp().to_string()),
                ("period2", now.timestamp().to_string()),
            ])
            .send()
            .await
            .map_err(|e| LookupError::ProviderFailure(e.to_string()))?;

        let status = response.status();
        if !status.is_success() {
            warn!(status = %status, symbol, "Yahoo time series request failed");
            return Err(LookupError::ProviderFailure(format!(
                "HTTP {status} from Yahoo Finance for {symbol}"
            )));
        }

        let body = response
            .text()
            .await
            .map_err(|e| LookupError::ProviderFailure(e.to_string()))?;

        parse_timeseries(symbol, &body)
    }
}

impl Default for YahooRevenueLookup {
    fn default() -> Self {
        Self::new()
    }
}

#[async_trait]
impl RevenueLookup for YahooRevenueLookup {
    async fn fetch(&self, company_name: &str) -> Result<RevenueSeries, LookupError> {
        let company_name = company_name.trim();
        if company_name.is_empty() {
            return Err(LookupError::TickerNotFound(String::new()));
        }

        let symbol = self.resolve_ticker(company_name).await?;
        let series = self.quarterly_revenue(&symbol).await?;
        info!(company = company_name, symbol = %symbol, periods = series.len(), "Fetched quarterly revenue");
        Ok(series)
    }
}

/// Decode a fundamentals time series body into the newest revenue figures
fn parse_timeseries(symbol: &str, body: &str) -> Result<RevenueSeries, LookupError> {
    let response: TimeseriesResponse = serde_json::from_str(body)
        .map_err(|e| ParseError(format!("undecodable time series for {symbol}: {e}")))?;

    if let Some(error) = response.timeseries.error.filter(|e| !e.is_null()) {
        return Err(LookupError::ProviderFailure(error.to_string()));
    }

    let mut series = RevenueSeries::new();
    let points = response
        .timeseries
        .result
        .unwrap_or_default()
        .into_iter()
        .filter_map(|result| result.quarterly_total_revenue)
        .flatten()
        .flatten();

    for point in points {
        let date = NaiveDate::parse_from_str(&point.as_of_date, "%Y-%m-%d").map_err(|e| {
            ParseError(format!("invalid date '{}' for {symbol}: {e}", point.as_of_date))
        })?;
        // periods without a reported figure are skipped
        let Some(value) = point.reported_value.and_then(|v| v.raw) else {
            continue;
        };
        if !value.is_finite() {
            return Err(ParseError(format!("non-finite revenue on {date} for {symbol}")).into());
        }
        series.insert(date, value);
    }

    if series.is_empty() {
        return Err(LookupError::FieldNotFound(symbol.to_string()));
    }

    Ok(series.most_recent(PERIODS))
}
