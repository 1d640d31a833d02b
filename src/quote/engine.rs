//! Quote engine: prefilter, per-storm evaluation, annual aggregation, pricing

use log::{debug, info};
use serde::{Deserialize, Serialize};

use super::request::QuoteRequest;
use crate::catalog::Catalog;
use crate::error::{Error, Result};
use crate::exposure::{aggregate_annual, evaluate_event, AnnualSeries, EventResult, DEFAULT_MIN_TRIGGER_KMH, FIRST_YEAR};
use crate::geometry::BoundingBox;
use crate::pricing::{price, PricingResult, Scenario};
use crate::program::{Program, Zone};
use crate::report::format_currency;

/// Evaluation year used when none is configured
pub const DEFAULT_LAST_YEAR: i32 = 2025;

/// Configuration for a quote run
#[derive(Debug, Clone, Serialize, Deserialize)]
pub struct EngineConfig {
    /// First year of the annual series
    pub first_year: i32,

    /// Evaluation year: last year of the series and end of the 25-year window
    pub last_year: i32,

    /// Margin around the zones' extent for the storm prefilter (degrees)
    pub prefilter_margin_deg: f64,

    /// Winds at or below this (km/h) are never candidates
    pub min_trigger_kmh: f64,
}

impl Default for EngineConfig {
    fn default() -> Self {
        Self {
            first_year: FIRST_YEAR,
            last_year: DEFAULT_LAST_YEAR,
            prefilter_margin_deg: 5.0,
            min_trigger_kmh: DEFAULT_MIN_TRIGGER_KMH,
        }
    }
}

/// Full outcome of one quote
#[derive(Debug, Clone, Serialize, Deserialize)]
pub struct QuoteResult {
    pub pricing: PricingResult,

    /// Triggering storms in storm-id order, annual clips applied
    pub events: Vec<EventResult>,

    pub annual: AnnualSeries,

    /// Storms that survived the prefilter and were evaluated
    pub storms_evaluated: usize,

    /// No historical storm ever paid under these terms
    pub no_historical_trigger: bool,
}

/// One priced option, formatted for display
#[derive(Debug, Clone, PartialEq, Serialize, Deserialize)]
pub struct ScenarioSummary {
    pub rate_on_line: String,
    pub premium: String,
}

impl From<&Scenario> for ScenarioSummary {
    fn from(scenario: &Scenario) -> Self {
        Self {
            rate_on_line: scenario.rate_on_line_pct(),
            premium: format_currency(scenario.premium),
        }
    }
}

/// One triggering storm, formatted for display
#[derive(Debug, Clone, PartialEq, Serialize, Deserialize)]
pub struct EventSummary {
    pub storm_id: String,
    pub name: String,
    pub year: i32,
    pub payout: String,
    /// Evidence trail; the only source for any narrative about the storm
    pub breakdown: String,
}

/// Flat, presentation-ready view of a `QuoteResult`
#[derive(Debug, Clone, PartialEq, Serialize, Deserialize)]
pub struct QuoteSummary {
    /// Competitive option, offered as primary
    pub aggressive: ScenarioSummary,
    pub traditional: ScenarioSummary,
    pub target_expected_loss: String,
    pub no_historical_trigger: bool,
    pub events: Vec<EventSummary>,
}

impl QuoteResult {
    pub fn summary(&self) -> QuoteSummary {
        QuoteSummary {
            aggressive: (&self.pricing.aggressive).into(),
            traditional: (&self.pricing.traditional).into(),
            target_expected_loss: format_currency(self.pricing.target_expected_loss),
            no_historical_trigger: self.no_historical_trigger,
            events: self
                .events
                .iter()
                .map(|e| EventSummary {
                    storm_id: e.storm_id.clone(),
                    name: e.name.clone(),
                    year: e.year,
                    payout: format_currency(e.adjusted_payout),
                    breakdown: e.breakdown_text(),
                })
                .collect(),
        }
    }
}

/// Prices programs against a storm catalog
pub struct QuoteEngine {
    config: EngineConfig,
}

impl QuoteEngine {
    pub fn new(config: EngineConfig) -> Self {
        Self { config }
    }

    pub fn config(&self) -> &EngineConfig {
        &self.config
    }

    /// Validate and price a request
    pub fn quote(&self, catalog: &Catalog, request: &QuoteRequest) -> Result<QuoteResult> {
        self.quote_with_cancel(catalog, request, || false)
    }

    /// Like `quote`, polling `should_stop` once per storm
    pub fn quote_with_cancel<F>(&self, catalog: &Catalog, request: &QuoteRequest, should_stop: F) -> Result<QuoteResult>
    where
        F: FnMut() -> bool,
    {
        let program = request.to_program()?;
        self.quote_program(catalog, &program, should_stop)
    }

    /// Price an already validated program
    pub fn quote_program<F>(&self, catalog: &Catalog, program: &Program, mut should_stop: F) -> Result<QuoteResult>
    where
        F: FnMut() -> bool,
    {
        let candidates = match BoundingBox::around(program.zones().iter().map(Zone::center), self.config.prefilter_margin_deg) {
            Some(bbox) => catalog.prefilter(&bbox),
            None => Vec::new(),
        };
        info!("Prefilter kept {} of {} storms", candidates.len(), catalog.len());

        let mut events: Vec<EventResult> = Vec::new();
        for storm in &candidates {
            if should_stop() {
                return Err(Error::Cancelled);
            }
            if let Some(event) = evaluate_event(storm, program, self.config.min_trigger_kmh) {
                debug!("{} {} ({}): {:.0}", event.storm_id, event.name, event.year, event.payout);
                events.push(event);
            }
        }

        let aggregate_limit = program.limits().aggregate;
        let annual = aggregate_annual(&mut events, aggregate_limit, self.config.first_year, self.config.last_year);
        let pricing = price(&annual, aggregate_limit);
        let no_historical_trigger = !pricing.triggered;

        info!(
            "{} triggering storms; aggressive {} / traditional {}",
            events.len(),
            pricing.aggressive.rate_on_line_pct(),
            pricing.traditional.rate_on_line_pct()
        );

        Ok(QuoteResult {
            pricing,
            events,
            annual,
            storms_evaluated: candidates.len(),
            no_historical_trigger,
        })
    }
}

impl Default for QuoteEngine {
    fn default() -> Self {
        Self::new(EngineConfig::default())
    }
}
