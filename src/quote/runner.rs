//! Quote runner for batches of requests
//!
//! Loads the storm catalog once, then prices any number of requests against
//! it without re-reading the track files.

use std::path::Path;

use rayon::prelude::*;

use super::engine::{EngineConfig, QuoteEngine, QuoteResult};
use super::request::QuoteRequest;
use crate::catalog::{load_catalog, Catalog};
use crate::error::Result;

/// Pre-loaded catalog plus engine configuration
///
/// # Example
/// ```ignore
/// let runner = QuoteRunner::from_paths(Path::new(DEFAULT_HURDAT_PATH), None, EngineConfig::default())?;
/// for request in &requests {
///     let result = runner.run(request)?;
/// }
/// ```
pub struct QuoteRunner {
    catalog: Catalog,
    engine: QuoteEngine,
}

impl QuoteRunner {
    pub fn new(catalog: Catalog, config: EngineConfig) -> Self {
        Self {
            catalog,
            engine: QuoteEngine::new(config),
        }
    }

    /// Load HURDAT2 and, optionally, a recent-season CSV
    pub fn from_paths(hurdat: &Path, recent: Option<&Path>, config: EngineConfig) -> Result<Self> {
        Ok(Self::new(load_catalog(hurdat, recent)?, config))
    }

    pub fn run(&self, request: &QuoteRequest) -> Result<QuoteResult> {
        self.engine.quote(&self.catalog, request)
    }

    /// Price independent requests in parallel; results keep request order
    pub fn run_batch(&self, requests: &[QuoteRequest]) -> Vec<Result<QuoteResult>> {
        requests.par_iter().map(|request| self.run(request)).collect()
    }

    pub fn catalog(&self) -> &Catalog {
        &self.catalog
    }

    pub fn config(&self) -> &EngineConfig {
        self.engine.config()
    }
}

#[cfg(test)]
mod tests {
    use super::*;
    use crate::catalog::StormTrack;
    use crate::error::Error;
    use crate::program::{FractionMode, PayoutTable, Zone};

    fn request(lat: f64, lon: f64) -> QuoteRequest {
        QuoteRequest {
            zones: vec![Zone::new(1, lat, lon, 50.0, 1_000_000.0)],
            payout_table: PayoutTable::standard(&[1]),
            event_limit: 1_000_000.0,
            aggregate_limit: 1_000_000.0,
            asymmetry_factor: 0.5,
            fraction_mode: FractionMode::Auto,
            client: None,
        }
    }

    fn runner() -> QuoteRunner {
        let storm = StormTrack::from_samples("AL092004", "IVAN", 2004, &[
            (17.0, -65.9, 140.0),
            (18.0, -65.9, 140.0),
            (19.0, -65.9, 140.0),
        ]);
        QuoteRunner::new(Catalog::new(vec![storm]), EngineConfig::default())
    }

    #[test]
    fn test_run_batch_keeps_order() {
        let runner = runner();
        let mut bad = request(18.0, -66.0);
        bad.aggregate_limit = f64::NAN;

        let results = runner.run_batch(&[request(18.0, -66.0), request(-30.0, 150.0), bad]);
        assert_eq!(results.len(), 3);

        let hit = results[0].as_ref().unwrap();
        assert!(!hit.no_historical_trigger);
        // 140 kt = 259.3 km/h: Cat 5 tier pays 100%
        assert_eq!(hit.annual.get(2004), Some(1_000_000.0));

        assert!(results[1].as_ref().unwrap().no_historical_trigger);
        assert!(matches!(results[2], Err(Error::MalformedInput(_))));
    }

    #[test]
    fn test_batch_matches_single_runs() {
        let runner = runner();
        let requests = vec![request(18.0, -66.0), request(18.2, -65.7)];
        let batch = runner.run_batch(&requests);
        for (request, result) in requests.iter().zip(&batch) {
            let single = runner.run(request).unwrap();
            assert_eq!(single.pricing, result.as_ref().unwrap().pricing);
        }
    }
}
