//! Price every quote request in a directory against one pre-loaded catalog
//!
//! Usage: run_batch <requests_dir> [output.csv]
//! Configured through HURDAT_PATH, RECENT_TRACKS_PATH and LAST_YEAR.

use std::env;
use std::fs;
use std::path::{Path, PathBuf};
use std::time::Instant;

use anyhow::{Context, Result};
use cyclone_pricing::catalog::loader::DEFAULT_HURDAT_PATH;
use cyclone_pricing::quote::{EngineConfig, QuoteRequest, QuoteRunner, DEFAULT_LAST_YEAR};
use log::warn;

/// One line of the summary CSV
#[derive(Debug, serde::Serialize)]
struct SummaryRow {
    request: String,
    client: String,
    status: String,
    storms_evaluated: usize,
    triggering_events: usize,
    target_expected_loss: f64,
    aggressive_rol: String,
    aggressive_premium: f64,
    traditional_rol: String,
    traditional_premium: f64,
}

fn request_files(dir: &Path) -> Result<Vec<PathBuf>> {
    let mut files: Vec<PathBuf> = fs::read_dir(dir)
        .with_context(|| format!("listing {}", dir.display()))?
        .filter_map(|entry| entry.ok().map(|e| e.path()))
        .filter(|path| path.extension().is_some_and(|ext| ext == "json"))
        .collect();
    files.sort();
    Ok(files)
}

fn main() -> Result<()> {
    env_logger::init();

    let mut args = env::args().skip(1);
    let requests_dir = PathBuf::from(args.next().unwrap_or_else(|| "requests".to_string()));
    let output_path = args.next().unwrap_or_else(|| "batch_quotes.csv".to_string());

    // Read config from environment or use defaults
    let hurdat_path = env::var("HURDAT_PATH").unwrap_or_else(|_| DEFAULT_HURDAT_PATH.to_string());
    let recent_path = env::var("RECENT_TRACKS_PATH").ok().map(PathBuf::from);
    let last_year: i32 = env::var("LAST_YEAR")
        .ok()
        .and_then(|s| s.parse().ok())
        .unwrap_or(DEFAULT_LAST_YEAR);

    let start = Instant::now();
    println!("Loading catalog from {}...", hurdat_path);
    let config = EngineConfig { last_year, ..Default::default() };
    let runner = QuoteRunner::from_paths(Path::new(&hurdat_path), recent_path.as_deref(), config)
        .with_context(|| format!("loading storm catalog from {}", hurdat_path))?;
    println!("Loaded {} storms in {:?}", runner.catalog().len(), start.elapsed());

    let files = request_files(&requests_dir)?;
    let mut names = Vec::new();
    let mut requests = Vec::new();
    let mut rows = Vec::new();

    for path in &files {
        let name = path.file_name().map(|n| n.to_string_lossy().into_owned()).unwrap_or_default();
        match QuoteRequest::from_path(path) {
            Ok(request) => {
                names.push(name);
                requests.push(request);
            }
            Err(e) => {
                warn!("Skipping {}: {}", name, e);
                rows.push(SummaryRow {
                    request: name,
                    client: String::new(),
                    status: e.to_string(),
                    storms_evaluated: 0,
                    triggering_events: 0,
                    target_expected_loss: 0.0,
                    aggressive_rol: String::new(),
                    aggressive_premium: 0.0,
                    traditional_rol: String::new(),
                    traditional_premium: 0.0,
                });
            }
        }
    }

    println!("Pricing {} requests...", requests.len());
    let quote_start = Instant::now();

    // Run quotes in parallel
    let results = runner.run_batch(&requests);
    println!("Quotes complete in {:?}", quote_start.elapsed());

    for ((name, request), result) in names.into_iter().zip(&requests).zip(results) {
        let client = request.client.clone().unwrap_or_default();
        let row = match result {
            Ok(result) => SummaryRow {
                request: name,
                client,
                status: if result.no_historical_trigger { "no_historical_trigger".to_string() } else { "ok".to_string() },
                storms_evaluated: result.storms_evaluated,
                triggering_events: result.events.len(),
                target_expected_loss: result.pricing.target_expected_loss,
                aggressive_rol: result.pricing.aggressive.rate_on_line_pct(),
                aggressive_premium: result.pricing.aggressive.premium,
                traditional_rol: result.pricing.traditional.rate_on_line_pct(),
                traditional_premium: result.pricing.traditional.premium,
            },
            Err(e) => {
                warn!("{} failed: {}", name, e);
                SummaryRow {
                    request: name,
                    client,
                    status: e.to_string(),
                    storms_evaluated: 0,
                    triggering_events: 0,
                    target_expected_loss: 0.0,
                    aggressive_rol: String::new(),
                    aggressive_premium: 0.0,
                    traditional_rol: String::new(),
                    traditional_premium: 0.0,
                }
            }
        };
        rows.push(row);
    }
    rows.sort_by(|a, b| a.request.cmp(&b.request));

    // Write output
    let mut writer = csv::Writer::from_path(&output_path).with_context(|| format!("creating {}", output_path))?;
    for row in &rows {
        writer.serialize(row)?;
    }
    writer.flush()?;

    println!("Output written to {}", output_path);
    println!("Total time: {:?}", start.elapsed());
    Ok(())
}
