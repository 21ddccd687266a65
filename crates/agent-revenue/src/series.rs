//! Date → revenue series and its JSON form

use crate::error::ParseError;
use chrono::NaiveDate;
use serde::{Deserialize, Serialize};
use serde_json::{Map, Value};
use std::collections::BTreeMap;

const DATE_FORMAT: &str = "%Y-%m-%d";

/// Revenue figures keyed by period-end date
///
/// At most one figure per date. Serializes as a JSON object of ISO dates to
/// numbers, e.g. `{"2024-09-30": 94930000000.0}`.
#[derive(Debug, Clone, Default, PartialEq, Serialize, Deserialize)]
#[serde(transparent)]
pub struct RevenueSeries {
    entries: BTreeMap<NaiveDate, f64>,
}

impl RevenueSeries {
    pub fn new() -> Self {
        Self::default()
    }

    /// Insert or replace the figure for `date`
    pub fn insert(&mut self, date: NaiveDate, revenue: f64) {
        self.entries.insert(date, revenue);
    }

    pub fn get(&self, date: NaiveDate) -> Option<f64> {
        self.entries.get(&date).copied()
    }

    pub fn len(&self) -> usize {
        self.entries.len()
    }

    pub fn is_empty(&self) -> bool {
        self.entries.is_empty()
    }

    /// Entries oldest first
    pub fn chronological(&self) -> impl Iterator<Item = (NaiveDate, f64)> + '_ {
        self.entries.iter().map(|(date, value)| (*date, *value))
    }

    /// Entries newest first
    pub fn newest_first(&self) -> impl Iterator<Item = (NaiveDate, f64)> + '_ {
        self.entries.iter().rev().map(|(date, value)| (*date, *value))
    }

    /// Copy holding only the `n` most recent entries
    pub fn most_recent(&self, n: usize) -> Self {
        self.newest_first().take(n).collect()
    }

    /// Parse revenue JSON as produced by a lookup or an LLM tool call
    ///
    /// Single quotes are normalised to double quotes first, so dict-style
    /// text as models often emit it is accepted.
    pub fn from_json(text: &str) -> Result<Self, ParseError> {
        let normalised = text.trim().replace('\'', "\"");
        let value: Value = serde_json::from_str(&normalised)
            .map_err(|e| ParseError(format!("not valid JSON ({e})")))?;
        Self::from_value(&value)
    }

    /// Build from an already-decoded JSON value
    pub fn from_value(value: &Value) -> Result<Self, ParseError> {
        match value {
            Value::Object(map) => Self::from_map(map),
            Value::String(text) => Self::from_json(text),
            other => Err(ParseError(format!(
                "expected an object of dates to revenues, got {}",
                json_kind(other)
            ))),
        }
    }

    fn from_map(map: &Map<String, Value>) -> Result<Self, ParseError> {
        let mut series = Self::new();
        for (key, value) in map {
            let date = NaiveDate::parse_from_str(key.trim(), DATE_FORMAT)
                .map_err(|_| ParseError(format!("'{key}' is not an ISO date")))?;
            let revenue = value
                .as_f64()
                .ok_or_else(|| ParseError(format!("revenue for {key} is not a number")))?;
            series.insert(date, revenue);
        }
        Ok(series)
    }

    /// JSON object text
    pub fn to_json_string(&self) -> String {
        self.to_json_value().to_string()
    }

    pub fn to_json_value(&self) -> Value {
        let map: Map<String, Value> = self
            .chronological()
            .map(|(date, revenue)| (date.format(DATE_FORMAT).to_string(), Value::from(revenue)))
            .collect();
        Value::Object(map)
    }
}

impl FromIterator<(NaiveDate, f64)> for RevenueSeries {
    fn from_iter<I: IntoIterator<Item = (NaiveDate, f64)>>(iter: I) -> Self {
        Self {
            entries: iter.into_iter().collect(),
        }
    }
}

fn json_kind(value: &Value) -> &'static str {
    match value {
        Value::Null => "null",
        Value::Bool(_) => "a boolean",
        Value::Number(_) => "a number",
        Value::String(_) => "a string",
        Value::Array(_) => "an array",
        Value::Object(_) => "an object",
    }
}

#[cfg(test)]
mod tests {
    use super::*;

    fn date(s: &str) -> NaiveDate {
        NaiveDate::parse_from_str(s, DATE_FORMAT).unwrap()
    }

    #[test]
    fn test_from_json_double_quoted() {
        let series =
            RevenueSeries::from_json(r#"{"2024-09-30": 121, "2024-06-30": 110.5}"#).unwrap();
        assert_eq!(series.len(), 2);
        assert_eq!(series.get(date("2024-09-30")), Some(121.0));
        assert_eq!(series.get(date("2024-06-30")), Some(110.5));
    }

    #[test]
    fn test_from_json_single_quoted() {
        let series = RevenueSeries::from_json("{'2024-09-30': 100, '2024-06-30': 110}").unwrap();
        assert_eq!(series.len(), 2);
    }

    #[test]
    fn test_from_json_rejects_bad_input() {
        assert!(RevenueSeries::from_json("Ticker not found for company: acme").is_err());
        assert!(RevenueSeries::from_json("[1, 2, 3]").is_err());

        let err = RevenueSeries::from_json(r#"{"Q3 2024": 100}"#).unwrap_err();
        assert!(err.to_string().contains("not an ISO date"));

        let err = RevenueSeries::from_json(r#"{"2024-09-30": "lots"}"#).unwrap_err();
        assert!(err.to_string().contains("not a number"));
    }

    #[test]
    fn test_from_value_accepts_embedded_string() {
        let value = Value::String("{'2024-09-30': 1}".to_string());
        let series = RevenueSeries::from_value(&value).unwrap();
        assert_eq!(series.len(), 1);
    }

    #[test]
    fn test_ordering_and_most_recent() {
        let series: RevenueSeries = [
            (date("2024-03-31"), 1.0),
            (date("2024-09-30"), 3.0),
            (date("2023-12-31"), 0.5),
            (date("2024-06-30"), 2.0),
        ]
        .into_iter()
        .collect();

        let newest: Vec<_> = series.newest_first().map(|(_, v)| v).collect();
        assert_eq!(newest, vec![3.0, 2.0, 1.0, 0.5]);

        let recent = series.most_recent(3);
        assert_eq!(recent.len(), 3);
        assert_eq!(recent.get(date("2023-12-31")), None);

        let oldest: Vec<_> = recent.chronological().map(|(d, _)| d).collect();
        assert_eq!(oldest[0], date("2024-03-31"));
    }

    #[test]
    fn test_json_output_parses_back() {
        let series: RevenueSeries = [(date("2024-09-30"), 94_930_000_000.0)].into_iter().collect();
        let text = series.to_json_string();
        assert!(text.starts_with("{\"2024-09-30\""));
        assert_eq!(RevenueSeries::from_json(&text).unwrap(), series);
    }
}
