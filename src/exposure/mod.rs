//! Historical exposure: per-zone wind, per-storm payouts and the annual loss series

mod evaluator;
mod event;
mod annual;

pub use evaluator::{evaluate_zone, max_wind_in_zone, side_of_track, Side, ZoneExposure, KT_TO_KMH};
pub use event::{evaluate_event, EventResult, DEFAULT_MIN_TRIGGER_KMH};
pub use annual::{aggregate_annual, AnnualSeries, FIRST_YEAR};
