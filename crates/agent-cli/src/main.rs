//! Quarterly revenue growth agent CLI
//!
//! # Usage
//!
//! ```bash
//! # API key for the chat completions endpoint (Groq by default)
//! export GROQ_API_KEY="gsk_..."
//!
//! # Interactive prompt
//! cargo run --bin revenue-agent
//!
//! # One-shot query, saving the chart
//! cargo run --bin revenue-agent -- --company apple --chart-out apple.svg
//! ```

mod display;

use agent_revenue::{OrchestratorEventHandler, QueryOrchestrator, RevenueAgentConfig, SvgBarChartRenderer};
use anyhow::Context;
use clap::Parser;
use std::io::{self, BufRead, Write};
use std::path::PathBuf;
use std::sync::Arc;
use std::time::Duration;
use tracing::info;

#[derive(Parser, Debug)]
#[command(name = "revenue-agent")]
#[command(about = "Average QoQ revenue growth over a company's last 3 quarters", long_about = None)]
struct Args {
    /// Company to analyse; omit for an interactive prompt
    #[arg(short, long)]
    company: Option<String>,

    /// Chat model name
    #[arg(short, long)]
    model: Option<String>,

    /// Sampling temperature
    #[arg(short, long)]
    temperature: Option<f32>,

    /// Agent attempts when the provider is over capacity
    #[arg(long)]
    max_retries: Option<u32>,

    /// Write the revenue chart as SVG to this file
    #[arg(long)]
    chart_out: Option<PathBuf>,
}

/// Prints retry and fallback notices as they happen
struct ConsoleEvents;

impl OrchestratorEventHandler for ConsoleEvents {
    fn on_retry(&self, _attempt: u32, delay: Duration) {
        eprintln!(
            "Agent over capacity. Retrying in {:.1} seconds...",
            delay.as_secs_f64()
        );
    }

    fn on_fallback(&self) {
        eprintln!("No average growth rate in the agent response, calculating directly...");
    }
}

fn print_banner() {
    println!(
        r#"
╔══════════════════════════════════════════════════════════════╗
║      Revenue Growth Rate Calculator for the Last 3 Quarters  ║
║                                                              ║
║  Enter a company name, e.g. Apple, Microsoft, Infosys        ║
║  Type /exit to quit                                          ║
╚══════════════════════════════════════════════════════════════╝
"#
    );
}

fn build_config(args: &Args) -> anyhow::Result<RevenueAgentConfig> {
    let mut config = RevenueAgentConfig::from_env()?;
    if let Some(model) = &args.model {
        config.model_name.clone_from(model);
    }
    if let Some(temperature) = args.temperature {
        config.temperature = temperature;
    }
    if let Some(max_retries) = args.max_retries {
        config.max_retries = max_retries;
    }
    config.validate()?;
    Ok(config)
}

async fn run_query(
    orchestrator: &QueryOrchestrator,
    company: &str,
    chart_out: Option<&PathBuf>,
) -> anyhow::Result<()> {
    println!("Processing: {}", agent_revenue::prompt::instruction(company)?);
    let result = orchestrator.handle(company).await?;
    println!("{}", display::render_result(&result));

    if let (Some(path), Some(chart)) = (chart_out, &result.chart) {
        if let Some(svg) = SvgBarChartRenderer::new().render_svg(&result.company, &chart.series) {
            std::fs::write(path, svg)
                .with_context(|| format!("writing chart to {}", path.display()))?;
            println!("Chart saved to {}", path.display());
        }
    }
    Ok(())
}

#[tokio::main]
async fn main() -> anyhow::Result<()> {
    agent_utils::load_env();
    agent_utils::init_tracing();

    let args = Args::parse();
    let config = build_config(&args)?;
    info!(model = %config.model_name, api_base = %config.api_base, "Starting revenue-agent");

    let orchestrator = QueryOrchestrator::from_config(&config)?.with_events(Arc::new(ConsoleEvents));

    if let Some(company) = &args.company {
        return run_query(&orchestrator, company, args.chart_out.as_ref()).await;
    }

    print_banner();
    println!("Model: {}\n", config.model_name);

    let stdin = io::stdin();
    let mut stdout = io::stdout();

    loop {
        print!("Enter company name: ");
        stdout.flush()?;

        let mut input = String::new();
        match stdin.lock().read_line(&mut input) {
            Ok(0) => {
                // EOF
                println!("\nGoodbye!");
                break;
            }
            Ok(_) => {}
            Err(e) => {
                eprintln!("Error reading input: {e}");
                continue;
            }
        }

        let input = input.trim();
        if input.is_empty() {
            println!("Please enter a company name.");
            continue;
        }
        if matches!(input, "/exit" | "/quit") {
            println!("Goodbye!");
            break;
        }

        if let Err(e) = run_query(&orchestrator, input, args.chart_out.as_ref()).await {
            eprintln!("Error: {e}\n");
        }
    }

    Ok(())
}
