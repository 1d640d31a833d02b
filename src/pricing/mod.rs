//! Trend-adjusted pricing of the annual loss series

mod model;
mod rules;

pub use model::{
    price, price_with_floor, LossStatistics, PricingResult, Scenario, MIN_REFERENCE_LOSS, MODERN_ERA_START,
    RECENT_WINDOW_YEARS,
};
pub use rules::{LossTarget, PricingRule, RateFloor, RatioBand, DECISION_TABLE, RATIO_TOLERANCE};
