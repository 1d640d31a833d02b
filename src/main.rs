//! Cyclone Pricing CLI
//!
//! Command-line interface for pricing and validating parametric wind programs

use std::path::{Path, PathBuf};

use anyhow::{Context, Result};
use clap::{Parser, Subcommand};
use cyclone_pricing::catalog::{load_catalog, loader::DEFAULT_HURDAT_PATH};
use cyclone_pricing::quote::{EngineConfig, QuoteEngine, QuoteRequest, DEFAULT_LAST_YEAR};
use cyclone_pricing::report::{format_currency, write_reports};

#[derive(Parser, Debug)]
#[command(version, about = "Historical exposure and pricing for parametric wind covers")]
struct Cli {
    #[command(subcommand)]
    command: Command,
}

#[derive(Subcommand, Debug)]
enum Command {
    /// Price a program against the historical storm catalog
    Quote {
        /// Quote request (JSON)
        #[arg(long)]
        request: PathBuf,

        /// HURDAT2 best-track file
        #[arg(long, default_value = DEFAULT_HURDAT_PATH)]
        hurdat: PathBuf,

        /// Recent-season tracks (CSV) merged on top of HURDAT2
        #[arg(long)]
        recent: Option<PathBuf>,

        /// Evaluation year
        #[arg(long, default_value_t = DEFAULT_LAST_YEAR)]
        last_year: i32,

        /// Write events.csv and annual_losses.csv here
        #[arg(long)]
        out_dir: Option<PathBuf>,

        /// Print the full result as JSON
        #[arg(long)]
        json: bool,
    },

    /// Check a request without pricing it
    Validate {
        #[arg(long)]
        request: PathBuf,
    },
}

fn load_request(path: &Path) -> Result<QuoteRequest> {
    QuoteRequest::from_path(path).with_context(|| format!("reading request {}", path.display()))
}

fn main() -> Result<()> {
    env_logger::init();

    match Cli::parse().command {
        Command::Quote { request, hurdat, recent, last_year, out_dir, json } => {
            let request = load_request(&request)?;
            let catalog = load_catalog(&hurdat, recent.as_deref())
                .with_context(|| format!("loading storm catalog from {}", hurdat.display()))?;

            let config = EngineConfig { last_year, ..Default::default() };
            let result = QuoteEngine::new(config).quote(&catalog, &request)?;

            if let Some(dir) = &out_dir {
                write_reports(dir, &result.events, &result.annual)
                    .with_context(|| format!("writing reports to {}", dir.display()))?;
            }

            if json {
                println!("{}", serde_json::to_string_pretty(&result)?);
                return Ok(());
            }

            let summary = result.summary();
            println!("Cyclone Pricing v{}", env!("CARGO_PKG_VERSION"));
            println!("======================\n");
            if let Some(client) = &request.client {
                println!("Client: {}", client);
            }
            println!("Storms evaluated: {}", result.storms_evaluated);
            println!("Triggering storms: {}", summary.events.len());
            if summary.no_historical_trigger {
                println!("No historical storm triggered this program.");
            }
            println!();
            println!("{:<12} {:>10} {:>16}", "Scenario", "RoL", "Premium");
            println!("{}", "-".repeat(40));
            println!("{:<12} {:>10} {:>16}", "Aggressive", summary.aggressive.rate_on_line, summary.aggressive.premium);
            println!("{:<12} {:>10} {:>16}", "Traditional", summary.traditional.rate_on_line, summary.traditional.premium);
            println!("Target expected annual loss: {}", summary.target_expected_loss);
            println!("Aggregate limit: {}", format_currency(request.aggregate_limit));

            if !summary.events.is_empty() {
                println!("\nEvents:");
                for event in &summary.events {
                    println!("  {} {} ({}): {}", event.storm_id, event.name, event.year, event.payout);
                    println!("    {}", event.breakdown);
                }
            }
            if let Some(dir) = &out_dir {
                println!("\nReports written to {}", dir.display());
            }
        }

        Command::Validate { request } => {
            let program = load_request(&request)?.to_program()?;
            println!(
                "OK: {} zones, {} payout tiers, event limit {}, aggregate limit {}",
                program.zones().len(),
                program.table().tiers().len(),
                format_currency(program.limits().event),
                format_currency(program.limits().aggregate)
            );
        }
    }

    Ok(())
}
