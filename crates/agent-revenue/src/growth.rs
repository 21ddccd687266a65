//! Quarter-over-quarter growth calculation

use crate::error::GrowthError;
use crate::series::RevenueSeries;
use serde::{Deserialize, Serialize};
use std::fmt;

/// Number of most recent periods considered
pub const PERIODS_CONSIDERED: usize = 3;

/// Growth between two adjacent periods
#[derive(Debug, Clone, PartialEq, Serialize, Deserialize)]
pub struct GrowthPeriod {
    /// `"<older date> → <newer date>"`
    pub label: String,
    /// Percent change, rounded to 2 decimals
    pub rate_percent: f64,
}

/// QoQ growth rates of the most recent periods and their average
#[derive(Debug, Clone, PartialEq, Serialize, Deserialize)]
pub struct GrowthReport {
    /// Newest pair first
    pub periods: Vec<GrowthPeriod>,
    /// Mean of the rounded period rates, rounded to 2 decimals
    pub average_rate_percent: f64,
    /// Data points that contributed (2 or 3)
    pub periods_used: usize,
}

impl GrowthReport {
    /// Fewer data points than requested were available
    pub fn is_partial(&self) -> bool {
        self.periods_used < PERIODS_CONSIDERED
    }

    /// Text form handed back to the agent by the calculation tool
    pub fn summary(&self) -> String {
        self.to_string()
    }
}

impl fmt::Display for GrowthReport {
    fn fmt(&self, f: &mut fmt::Formatter<'_>) -> fmt::Result {
        for period in &self.periods {
            writeln!(f, "{}: {}%", period.label, fmt_rate(period.rate_percent))?;
        }
        write!(
            f,
            "\nAverage Growth Rate: {}%",
            fmt_rate(self.average_rate_percent)
        )
    }
}

/// Compute QoQ growth over the three most recent periods of `series`
///
/// Each period rate is `(newer - older) / older * 100` rounded to 2 decimals;
/// the average is taken over the rounded rates and rounded again.
pub fn compute_growth(series: &RevenueSeries) -> Result<GrowthReport, GrowthError> {
    let recent: Vec<_> = series.newest_first().take(PERIODS_CONSIDERED).collect();
    if recent.len() < 2 {
        return Err(GrowthError::InsufficientData);
    }

    let periods = recent
        .windows(2)
        .map(|pair| {
            let (newer_date, newer) = pair[0];
            let (older_date, older) = pair[1];
            if older == 0.0 {
                return Err(GrowthError::DivisionByZero(older_date.to_string()));
            }
            Ok(GrowthPeriod {
                label: format!("{older_date} → {newer_date}"),
                rate_percent: round2((newer - older) / older * 100.0),
            })
        })
        .collect::<Result<Vec<_>, _>>()?;

    let total: f64 = periods.iter().map(|p| p.rate_percent).sum();
    let average_rate_percent = round2(total / periods.len() as f64);

    Ok(GrowthReport {
        periods,
        average_rate_percent,
        periods_used: recent.len(),
    })
}

/// Round to 2 decimals, ties to even on the exact binary value
pub fn round2(value: f64) -> f64 {
    format!("{value:.2}").parse().unwrap_or(value)
}

/// Shortest decimal form that keeps a fractional part (`10.0`, `-9.09`)
pub fn fmt_rate(rate: f64) -> String {
    format!("{rate:?}")
}

#[cfg(test)]
mod tests {
    use super::*;
    use chrono::NaiveDate;

    fn series(entries: &[(&str, f64)]) -> RevenueSeries {
        entries
            .iter()
            .map(|(d, v)| (NaiveDate::parse_from_str(d, "%Y-%m-%d").unwrap(), *v))
            .collect()
    }

    #[test]
    fn test_declining_revenue() {
        let report = compute_growth(&series(&[
            ("2024-09-30", 100.0),
            ("2024-06-30", 110.0),
            ("2024-03-31", 121.0),
        ]))
        .unwrap();

        assert_eq!(report.periods.len(), 2);
        assert_eq!(report.periods[0].label, "2024-06-30 → 2024-09-30");
        assert_eq!(report.periods[0].rate_percent, -9.09);
        assert_eq!(report.periods[1].label, "2024-03-31 → 2024-06-30");
        assert_eq!(report.periods[1].rate_percent, -9.09);
        assert_eq!(report.average_rate_percent, -9.09);
        assert_eq!(report.periods_used, 3);
        assert!(!report.is_partial());
    }

    #[test]
    fn test_growing_revenue() {
        let report = compute_growth(&series(&[
            ("2024-09-30", 121.0),
            ("2024-06-30", 110.0),
            ("2024-03-31", 100.0),
        ]))
        .unwrap();

        assert_eq!(report.periods[0].rate_percent, 10.0);
        assert_eq!(report.periods[1].rate_percent, 10.0);
        assert_eq!(report.average_rate_percent, 10.0);
        assert_eq!(
            report.summary(),
            "2024-06-30 → 2024-09-30: 10.0%\n\
             2024-03-31 → 2024-06-30: 10.0%\n\
             \n\
             Average Growth Rate: 10.0%"
        );
    }

    #[test]
    fn test_only_three_most_recent_used() {
        let base = [
            ("2024-09-30", 121.0),
            ("2024-06-30", 110.0),
            ("2024-03-31", 100.0),
        ];
        let mut with_old = base.to_vec();
        with_old.push(("2023-12-31", 5.0));
        let mut with_other_old = base.to_vec();
        with_other_old.push(("2023-12-31", 9_999.0));
        with_other_old.push(("2023-09-30", 1.0));

        let expected = compute_growth(&series(&base)).unwrap();
        assert_eq!(compute_growth(&series(&with_old)).unwrap(), expected);
        assert_eq!(compute_growth(&series(&with_other_old)).unwrap(), expected);
    }

    #[test]
    fn test_two_entries() {
        let report =
            compute_growth(&series(&[("2024-06-30", 103.0), ("2024-03-31", 97.0)])).unwrap();

        let expected = round2((103.0 - 97.0) / 97.0 * 100.0);
        assert_eq!(report.periods.len(), 1);
        assert_eq!(report.periods[0].rate_percent, expected);
        assert_eq!(report.average_rate_percent, expected);
        assert_eq!(report.periods_used, 2);
        assert!(report.is_partial());
    }

    #[test]
    fn test_insufficient_data() {
        assert_eq!(
            compute_growth(&series(&[("2024-09-30", 100.0)])),
            Err(GrowthError::InsufficientData)
        );
        assert_eq!(
            compute_growth(&RevenueSeries::new()),
            Err(GrowthError::InsufficientData)
        );
    }

    #[test]
    fn test_zero_older_revenue() {
        let err = compute_growth(&series(&[("2024-09-30", 10.0), ("2024-06-30", 0.0)]))
            .unwrap_err();
        assert_eq!(err, GrowthError::DivisionByZero("2024-06-30".to_string()));
    }

    #[test]
    fn test_negative_older_revenue_uses_plain_formula() {
        let report =
            compute_growth(&series(&[("2024-09-30", 50.0), ("2024-06-30", -100.0)])).unwrap();
        assert_eq!(report.average_rate_percent, -150.0);
    }

    #[test]
    fn test_average_uses_rounded_rates() {
        // raw rates ~0.104 and ~0.154: rounded first 0.1 and 0.15 average to 0.12,
        // averaging the raw rates would give 0.13
        let report = compute_growth(&series(&[
            ("2024-09-30", 100_258.16),
            ("2024-06-30", 100_104.0),
            ("2024-03-31", 100_000.0),
        ]))
        .unwrap();

        assert_eq!(report.periods[0].rate_percent, 0.15);
        assert_eq!(report.periods[1].rate_percent, 0.1);
        assert_eq!(report.average_rate_percent, 0.12);
    }

    #[test]
    fn test_idempotent() {
        let input = series(&[
            ("2024-09-30", 94_930_000_000.0),
            ("2024-06-30", 85_777_000_000.0),
            ("2024-03-31", 90_753_000_000.0),
        ]);
        assert_eq!(compute_growth(&input), compute_growth(&input));
    }

    #[test]
    fn test_round2() {
        assert_eq!(round2(-9.090_909), -9.09);
        assert_eq!(round2(10.000_000_001), 10.0);
        assert_eq!(round2(1.005), 1.0);
        assert_eq!(round2(0.125), 0.12);
    }

    #[test]
    fn test_fmt_rate() {
        assert_eq!(fmt_rate(10.0), "10.0");
        assert_eq!(fmt_rate(-9.09), "-9.09");
        assert_eq!(fmt_rate(0.1), "0.1");
    }
}
