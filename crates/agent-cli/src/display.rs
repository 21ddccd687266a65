//! Terminal rendering of query results

use agent_revenue::chart::bar_label;
use agent_revenue::growth::{GrowthReport, PERIODS_CONSIDERED, fmt_rate};
use agent_revenue::{GrowthInsight, OrchestrationResult, RevenueSeries};
use comfy_table::{Cell, Color, Table};
use std::fmt;

const BAR_WIDTH: usize = 40;

/// Full text shown for one query
pub fn render_result(result: &OrchestrationResult) -> String {
    ResultView(result).to_string()
}

struct ResultView<'a>(&'a OrchestrationResult);

impl fmt::Display for ResultView<'_> {
    fn fmt(&self, f: &mut fmt::Formatter<'_>) -> fmt::Result {
        let result = self.0;

        writeln!(f, "=== Response ===")?;
        match (&result.agent_response, &result.agent_error) {
            (Some(text), _) => writeln!(f, "{}", text.trim())?,
            (None, Some(e)) => writeln!(f, "Error: {e}")?,
            (None, None) => {}
        }

        if let Some(insight) = result.insight() {
            if let Some(narrative) = result.narrative.as_ref().filter(|_| result.used_fallback()) {
                writeln!(f, "\n=== Fallback Insight ===\n{}", narrative.text())?;
            } else {
                writeln!(f, "\n=== Insight ===")?;
            }
            writeln!(f, "{}", insight_line(insight))?;
        } else if let Some(e) = &result.narrative_error {
            writeln!(f, "\nCould not extract average growth rate: {e}")?;
        }

        match (&result.chart, &result.chart_error) {
            (Some(chart), _) => {
                writeln!(f, "\n=== Revenue Trend ===")?;
                writeln!(f, "{}", growth_table(&chart.report))?;
                writeln!(f, "{}", bar_chart(&result.company, &chart.series))?;
                if chart.report.is_partial() {
                    writeln!(
                        f,
                        "Note: only {} of the last {PERIODS_CONSIDERED} quarters had revenue data.",
                        chart.report.periods_used
                    )?;
                }
            }
            (None, Some(e)) => writeln!(f, "\nChart unavailable: {e}")?,
            (None, None) => {}
        }

        Ok(())
    }
}

fn insight_line(insight: GrowthInsight) -> String {
    let marker = match insight {
        GrowthInsight::Increasing(_) => "[+]",
        GrowthInsight::Decreasing(_) => "[-]",
        GrowthInsight::Stable => "[=]",
    };
    format!("{marker} {insight}")
}

/// Per-period growth rates and their average
pub fn growth_table(report: &GrowthReport) -> Table {
    let mut table = Table::new();
    table.set_header(vec!["Period", "QoQ Growth"]);

    for period in &report.periods {
        table.add_row(vec![
            Cell::new(&period.label),
            rate_cell(period.rate_percent),
        ]);
    }
    table.add_row(vec![
        Cell::new("Average"),
        rate_cell(report.average_rate_percent),
    ]);
    table
}

fn rate_cell(rate: f64) -> Cell {
    let cell = Cell::new(format!("{}%", fmt_rate(rate)));
    if rate > 0.0 {
        cell.fg(Color::Green)
    } else if rate < 0.0 {
        cell.fg(Color::Red)
    } else {
        cell
    }
}

/// Text bar chart, oldest quarter first
pub fn bar_chart(company: &str, series: &RevenueSeries) -> Table {
    let max = series.chronological().map(|(_, v)| v).fold(0.0_f64, f64::max);

    let mut table = Table::new();
    table.set_header(vec![
        Cell::new("Quarter"),
        Cell::new("Revenue"),
        Cell::new(agent_revenue::chart::chart_title(company)),
    ]);
    for (date, value) in series.chronological() {
        table.add_row(vec![
            Cell::new(date),
            Cell::new(bar_label(value)),
            Cell::new(bar(value, max, BAR_WIDTH)).fg(Color::Cyan),
        ]);
    }
    table
}

/// Horizontal bar scaled so `max` spans `width` blocks
pub fn bar(value: f64, max: f64, width: usize) -> String {
    if max <= 0.0 || value <= 0.0 {
        return String::new();
    }
    let blocks = ((value / max) * width as f64).round() as usize;
    "█".repeat(blocks.clamp(1, width))
}

#[cfg(test)]
mod tests {
    use super::*;
    use agent_revenue::compute_growth;
    use agent_revenue::orchestrator::ChartData;
    use agent_revenue::{GrowthNarrative, LookupError, RevenueError};

    const GROWING: &str = r#"{"2024-09-30": 121000000000, "2024-06-30": 110000000000, "2024-03-31": 100000000000}"#;

    fn result_with_chart(json: &str) -> OrchestrationResult {
        let series = RevenueSeries::from_json(json).unwrap();
        let report = compute_growth(&series).unwrap();
        OrchestrationResult {
            company: "apple".to_string(),
            instruction: String::new(),
            agent_response: Some("I could not work it out.".to_string()),
            agent_error: None,
            narrative: Some(GrowthNarrative::DirectlyComputed(report.clone())),
            narrative_error: None,
            chart: Some(ChartData {
                series,
                report,
                image_base64: None,
                mime_type: "image/svg+xml",
            }),
            chart_error: None,
        }
    }

    #[test]
    fn test_bar_scaling() {
        assert_eq!(bar(10.0, 10.0, 40).chars().count(), 40);
        assert_eq!(bar(5.0, 10.0, 40).chars().count(), 20);
        assert_eq!(bar(0.01, 10.0, 40).chars().count(), 1);
        assert!(bar(-1.0, 10.0, 40).is_empty());
    }

    #[test]
    fn test_render_fallback_result() {
        let text = render_result(&result_with_chart(GROWING));

        assert!(text.contains("I could not work it out."));
        assert!(text.contains("=== Fallback Insight ==="));
        assert!(text.contains("Average Growth Rate: 10.0%"));
        assert!(text.contains("Positive growth: Revenue is increasing by an average of 10.0%."));
        assert!(text.contains("121.00B"));
        assert!(text.contains("Last 3 Quarterly Revenues of Apple"));
        assert!(!text.contains("Note: only"));
    }

    #[test]
    fn test_render_partial_note() {
        let text = render_result(&result_with_chart(
            r#"{"2024-09-30": 110000000000, "2024-06-30": 100000000000}"#,
        ));
        assert!(text.contains("Note: only 2 of the last 3 quarters had revenue data."));
    }

    #[test]
    fn test_render_errors() {
        let result = OrchestrationResult {
            company: "nowhere".to_string(),
            instruction: String::new(),
            agent_response: None,
            agent_error: Some(RevenueError::AgentUnavailable { attempts: 5 }),
            narrative: None,
            narrative_error: Some(LookupError::TickerNotFound("nowhere".to_string()).into()),
            chart: None,
            chart_error: Some(LookupError::TickerNotFound("nowhere".to_string()).into()),
        };
        let text = render_result(&result);

        assert!(text.contains("Error: Agent unavailable after 5 attempts"));
        assert!(text.contains("Could not extract average growth rate: No ticker symbol found"));
        assert!(text.contains("Chart unavailable: No ticker symbol found"));
    }

    #[test]
    fn test_growth_table_rows() {
        let series = RevenueSeries::from_json(GROWING).unwrap();
        let table = growth_table(&compute_growth(&series).unwrap()).to_string();
        assert!(table.contains("2024-06-30 → 2024-09-30"));
        assert!(table.contains("Average"));
        assert!(table.contains("10.0%"));
    }
}
