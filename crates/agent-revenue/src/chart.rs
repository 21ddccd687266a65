//! Revenue bar chart rendering

use crate::series::RevenueSeries;
use base64::{Engine as _, engine::general_purpose};
use std::fmt::{self, Write};
use tracing::warn;

const WIDTH: f64 = 640.0;
const HEIGHT: f64 = 400.0;
const MARGIN_TOP: f64 = 60.0;
const MARGIN_BOTTOM: f64 = 70.0;
const MARGIN_SIDE: f64 = 60.0;
const BAR_FILL: &str = "#87ceeb";

/// Turns a company's revenue JSON into an encoded chart image
pub trait ChartRenderer: Send + Sync {
    /// Base64 image for `revenue_json`, or `None` when nothing can be drawn
    fn render(&self, company: &str, revenue_json: &str) -> Option<String>;

    /// MIME type of the decoded image
    fn mime_type(&self) -> &'static str;
}

/// SVG bar chart, one bar per quarter in chronological order
#[derive(Debug, Default, Clone, Copy)]
pub struct SvgBarChartRenderer;

impl SvgBarChartRenderer {
    pub fn new() -> Self {
        Self
    }

    /// Raw SVG document for `series`
    pub fn render_svg(&self, company: &str, series: &RevenueSeries) -> Option<String> {
        if series.is_empty() {
            return None;
        }

        let mut svg = String::new();
        match write_svg(&mut svg, company, series) {
            Ok(()) => Some(svg),
            Err(e) => {
                warn!(error = %e, "Cannot write chart");
                None
            }
        }
    }
}

fn write_svg(svg: &mut impl Write, company: &str, series: &RevenueSeries) -> fmt::Result {
    let bars: Vec<_> = series.chronological().collect();
    let max = bars.iter().map(|(_, v)| *v).fold(0.0_f64, f64::max);
    let plot_height = HEIGHT - MARGIN_TOP - MARGIN_BOTTOM;
    let slot = (WIDTH - 2.0 * MARGIN_SIDE) / bars.len() as f64;
    let bar_width = slot * 0.6;
    let baseline = HEIGHT - MARGIN_BOTTOM;

    writeln!(
        svg,
        r#"<svg xmlns="http://www.w3.org/2000/svg" width="{WIDTH}" height="{HEIGHT}" viewBox="0 0 {WIDTH} {HEIGHT}" font-family="sans-serif">"#
    )?;
    writeln!(svg, r#"<rect width="100%" height="100%" fill="white"/>"#)?;
    writeln!(
        svg,
        r#"<text x="{}" y="30" text-anchor="middle" font-size="16">{}</text>"#,
        WIDTH / 2.0,
        escape_xml(&chart_title(company))
    )?;

    for (i, (date, value)) in bars.iter().enumerate() {
        let height = if max > 0.0 {
            (value.max(0.0) / max) * plot_height
        } else {
            0.0
        };
        let x = MARGIN_SIDE + slot * i as f64 + (slot - bar_width) / 2.0;
        let y = baseline - height;
        let center = x + bar_width / 2.0;

        writeln!(
            svg,
            r#"<rect x="{x:.1}" y="{y:.1}" width="{bar_width:.1}" height="{height:.1}" fill="{BAR_FILL}" stroke="black"/>"#
        )?;
        writeln!(
            svg,
            r#"<text x="{center:.1}" y="{:.1}" text-anchor="middle" font-size="10">{}</text>"#,
            y - 4.0,
            bar_label(*value)
        )?;
        writeln!(
            svg,
            r#"<text x="{center:.1}" y="{:.1}" text-anchor="middle" font-size="11">{date}</text>"#,
            baseline + 18.0
        )?;
    }

    writeln!(
        svg,
        r#"<line x1="{MARGIN_SIDE}" y1="{baseline}" x2="{}" y2="{baseline}" stroke="black"/>"#,
        WIDTH - MARGIN_SIDE
    )?;
    writeln!(
        svg,
        r#"<text x="{}" y="{}" text-anchor="middle" font-size="12">Quarter</text>"#,
        WIDTH / 2.0,
        HEIGHT - 20.0
    )?;
    writeln!(svg, "</svg>")
}

impl ChartRenderer for SvgBarChartRenderer {
    fn render(&self, company: &str, revenue_json: &str) -> Option<String> {
        let series = match RevenueSeries::from_json(revenue_json) {
            Ok(series) => series,
            Err(e) => {
                warn!(error = %e, "Cannot chart revenue data");
                return None;
            }
        };
        let svg = self.render_svg(company, &series)?;
        Some(general_purpose::STANDARD.encode(svg))
    }

    fn mime_type(&self) -> &'static str {
        "image/svg+xml"
    }
}

/// Per-bar value label, in billions
pub fn bar_label(value: f64) -> String {
    format!("{:.2}B", value / 1e9)
}

pub fn chart_title(company: &str) -> String {
    format!("Last 3 Quarterly Revenues of {}", title_case(company.trim()))
}

/// Uppercase the first letter of every word, lowercase the rest
pub fn title_case(text: &str) -> String {
    let mut out = String::with_capacity(text.len());
    let mut in_word = false;
    for c in text.chars() {
        if c.is_alphabetic() {
            if in_word {
                out.extend(c.to_lowercase());
            } else {
                out.extend(c.to_uppercase());
            }
            in_word = true;
        } else {
            out.push(c);
            in_word = false;
        }
    }
    out
}

fn escape_xml(text: &str) -> String {
    text.replace('&', "&amp;")
        .replace('<', "&lt;")
        .replace('>', "&gt;")
        .replace('"', "&quot;")
}

#[cfg(test)]
mod tests {
    use super::*;

    const JSON: &str = r#"{"2024-09-30": 94930000000, "2024-06-30": 85777000000, "2024-03-31": 90753000000}"#;

    #[test]
    fn test_bar_label() {
        assert_eq!(bar_label(94_930_000_000.0), "94.93B");
        assert_eq!(bar_label(1_234_567.0), "0.00B");
    }

    #[test]
    fn test_title_case() {
        assert_eq!(title_case("apple"), "Apple");
        assert_eq!(title_case("tata CONSULTANCY services"), "Tata Consultancy Services");
        assert_eq!(title_case("at&t"), "At&T");
        assert_eq!(chart_title(" infosys "), "Last 3 Quarterly Revenues of Infosys");
    }

    #[test]
    fn test_render_svg_bars_in_chronological_order() {
        let series = RevenueSeries::from_json(JSON).unwrap();
        let svg = SvgBarChartRenderer::new().render_svg("apple", &series).unwrap();

        assert!(svg.starts_with("<svg"));
        assert!(svg.contains("Last 3 Quarterly Revenues of Apple"));
        let first = svg.find("2024-03-31").unwrap();
        let second = svg.find("2024-06-30").unwrap();
        let third = svg.find("2024-09-30").unwrap();
        assert!(first < second && second < third);
        assert!(svg.contains(">94.93B<"));
        assert!(svg.contains(">85.78B<"));
    }

    #[test]
    fn test_render_base64() {
        let renderer = SvgBarChartRenderer::new();
        let encoded = renderer.render("apple", JSON).unwrap();
        let decoded = general_purpose::STANDARD.decode(encoded).unwrap();
        let svg = String::from_utf8(decoded).unwrap();
        assert!(svg.contains("<svg"));
        assert_eq!(renderer.mime_type(), "image/svg+xml");
    }

    #[test]
    fn test_render_failure_is_none() {
        let renderer = SvgBarChartRenderer::new();
        assert!(renderer.render("apple", "Ticker not found").is_none());
        assert!(renderer.render("apple", "{}").is_none());
    }

    #[test]
    fn test_title_is_escaped() {
        let series = RevenueSeries::from_json(r#"{"2024-09-30": 1}"#).unwrap();
        let svg = SvgBarChartRenderer::new()
            .render_svg("procter & gamble", &series)
            .unwrap();
        assert!(svg.contains("Procter &amp; Gamble"));
    }
}
