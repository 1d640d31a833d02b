//! AWS Lambda handler for pricing quote requests
//!
//! Accepts a `QuoteRequest` JSON event and returns the presentation summary
//! together with the full quote result. The storm catalog is loaded once per
//! cold start from HURDAT_PATH (plus RECENT_TRACKS_PATH when set).

use std::env;
use std::path::{Path, PathBuf};
use std::time::Instant;

use cyclone_pricing::catalog::loader::DEFAULT_HURDAT_PATH;
use cyclone_pricing::quote::{EngineConfig, QuoteRequest, QuoteResult, QuoteRunner, QuoteSummary, DEFAULT_LAST_YEAR};
use lambda_runtime::{run, service_fn, Error, LambdaEvent};
use log::info;
use serde::Serialize;

/// Output of one invocation
#[derive(Debug, Serialize)]
pub struct QuoteResponse {
    #[serde(skip_serializing_if = "Option::is_none")]
    pub client: Option<String>,
    pub summary: QuoteSummary,
    pub result: QuoteResult,
    pub execution_time_ms: u64,
}

/// Lambda handler function
async fn handler(runner: &QuoteRunner, event: LambdaEvent<QuoteRequest>) -> Result<QuoteResponse, Error> {
    let start = Instant::now();
    let request = event.payload;

    let result = runner.run(&request)?;
    let summary = result.summary();
    let execution_time_ms = start.elapsed().as_millis() as u64;
    info!("Quote priced in {} ms", execution_time_ms);

    Ok(QuoteResponse {
        client: request.client,
        summary,
        result,
        execution_time_ms,
    })
}

#[tokio::main]
async fn main() -> Result<(), Error> {
    env_logger::init();

    let hurdat_path = env::var("HURDAT_PATH").unwrap_or_else(|_| DEFAULT_HURDAT_PATH.to_string());
    let recent_path = env::var("RECENT_TRACKS_PATH").ok().map(PathBuf::from);
    let last_year: i32 = env::var("LAST_YEAR")
        .ok()
        .and_then(|s| s.parse().ok())
        .unwrap_or(DEFAULT_LAST_YEAR);

    let config = EngineConfig { last_year, ..Default::default() };
    let runner = QuoteRunner::from_paths(Path::new(&hurdat_path), recent_path.as_deref(), config)?;
    info!("Catalog ready: {} storms", runner.catalog().len());

    let runner = &runner;
    run(service_fn(move |event: LambdaEvent<QuoteRequest>| async move { handler(runner, event).await })).await
}
