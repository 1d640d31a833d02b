//! Cyclone Pricing - historical exposure and pricing engine for parametric wind covers
//!
//! This library provides:
//! - HURDAT2 and recent-season storm catalog loading
//! - Zone, payout table and limit validation
//! - Per-zone wind reconstruction (circle crossings, track side)
//! - Per-storm and per-year payout aggregation with event and aggregate limits
//! - Trend-adjusted rate-on-line pricing (traditional and aggressive scenarios)
//! - Batch quoting over a pre-loaded catalog

pub mod error;
pub mod geometry;
pub mod catalog;
pub mod program;
pub mod exposure;
pub mod pricing;
pub mod quote;
pub mod report;

// Re-export commonly used types
pub use error::{Error, Result};
pub use catalog::{Catalog, StormTrack, TrackPoint};
pub use program::{PayoutTable, Program, Zone};
pub use exposure::{AnnualSeries, EventResult};
pub use pricing::{PricingResult, Scenario};
pub use quote::{EngineConfig, QuoteEngine, QuoteRequest, QuoteResult, QuoteRunner, QuoteSummary};
