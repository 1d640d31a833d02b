//! Expected-loss statistics and the two priced scenarios

use log::info;
use serde::{Deserialize, Serialize};

use super::rules::{LossTarget, PricingRule, RateFloor, RatioBand};
use crate::exposure::AnnualSeries;
use crate::report::format_percent;

/// Start of the modern (reconnaissance aircraft) record
pub const MODERN_ERA_START: i32 = 1949;

/// Window of the recent-trend estimate (years)
pub const RECENT_WINDOW_YEARS: usize = 25;

/// Floor on the 1949-onward mean so the trend ratios stay finite
pub const MIN_REFERENCE_LOSS: f64 = 0.001;

/// Expected annual loss estimates and the trend case they fall into
#[derive(Debug, Clone, Copy, PartialEq, Serialize, Deserialize)]
pub struct LossStatistics {
    pub mean_all_years: f64,
    /// Floored to `MIN_REFERENCE_LOSS`
    pub mean_since_1949: f64,
    pub mean_last_25_years: f64,
    pub ratio_all_years: f64,
    pub ratio_last_25_years: f64,
    pub all_years_band: RatioBand,
    pub last_25_years_band: RatioBand,
}

impl LossStatistics {
    pub fn from_series(annual: &AnnualSeries) -> Self {
        let mean_all_years = annual.mean();
        let mut mean_since_1949 = annual.mean_since(MODERN_ERA_START);
        if mean_since_1949 == 0.0 {
            mean_since_1949 = MIN_REFERENCE_LOSS;
        }
        let mean_last_25_years = annual.mean_last(RECENT_WINDOW_YEARS);

        let ratio_all_years = mean_all_years / mean_since_1949 - 1.0;
        let ratio_last_25_years = mean_last_25_years / mean_since_1949 - 1.0;

        Self {
            mean_all_years,
            mean_since_1949,
            mean_last_25_years,
            ratio_all_years,
            ratio_last_25_years,
            all_years_band: RatioBand::classify(ratio_all_years),
            last_25_years_band: RatioBand::classify(ratio_last_25_years),
        }
    }

    pub fn rule(&self) -> PricingRule {
        PricingRule::lookup(self.all_years_band, self.last_25_years_band)
    }

    pub fn target(&self, target: LossTarget) -> f64 {
        match target {
            LossTarget::Since1949 => self.mean_since_1949,
            LossTarget::Last25Years => self.mean_last_25_years,
        }
    }
}

/// One priced underwriting option
#[derive(Debug, Clone, Copy, PartialEq, Default, Serialize, Deserialize)]
pub struct Scenario {
    /// Premium over aggregate limit
    pub rate_on_line: f64,
    pub premium: f64,
}

impl Scenario {
    fn price(divisor: f64, target_loss: f64, aggregate_limit: f64, floor: &RateFloor) -> Self {
        let raw = if aggregate_limit > 0.0 {
            (1.0 / divisor) * (target_loss / aggregate_limit)
        } else {
            0.0
        };
        let rate_on_line = floor.apply(raw);
        Self {
            rate_on_line,
            premium: rate_on_line * aggregate_limit,
        }
    }

    /// Rate-on-line as `"12.34%"`
    pub fn rate_on_line_pct(&self) -> String {
        format_percent(self.rate_on_line)
    }
}

/// Traditional and aggressive prices for a program
#[derive(Debug, Clone, PartialEq, Serialize, Deserialize)]
pub struct PricingResult {
    /// Conservative option
    pub traditional: Scenario,
    /// Competitive option, offered as primary
    pub aggressive: Scenario,
    /// Expected annual loss the rates are built on
    pub target_expected_loss: f64,
    pub statistics: Option<LossStatistics>,
    pub rule: Option<PricingRule>,
    /// False when no historical storm ever paid
    pub triggered: bool,
}

impl PricingResult {
    /// All-zero result for a program no historical storm triggered
    pub fn untriggered() -> Self {
        Self {
            traditional: Scenario::default(),
            aggressive: Scenario::default(),
            target_expected_loss: 0.0,
            statistics: None,
            rule: None,
            triggered: false,
        }
    }
}

/// Price the program from its annual loss series
pub fn price(annual: &AnnualSeries, aggregate_limit: f64) -> PricingResult {
    price_with_floor(annual, aggregate_limit, &RateFloor::default())
}

pub fn price_with_floor(annual: &AnnualSeries, aggregate_limit: f64, floor: &RateFloor) -> PricingResult {
    if annual.is_empty() || annual.is_all_zero() {
        info!("No historical trigger: pricing is zero");
        return PricingResult::untriggered();
    }

    let statistics = LossStatistics::from_series(annual);
    let rule = statistics.rule();
    let target_expected_loss = statistics.target(rule.target);
    info!(
        "Trend case {:?}/{:?}: divisors {}/{} on {:?} mean {:.2}",
        statistics.all_years_band,
        statistics.last_25_years_band,
        rule.base_divisor,
        rule.aggressive_divisor,
        rule.target,
        target_expected_loss
    );

    PricingResult {
        traditional: Scenario::price(rule.base_divisor, target_expected_loss, aggregate_limit, floor),
        aggressive: Scenario::price(rule.aggressive_divisor, target_expected_loss, aggregate_limit, floor),
        target_expected_loss,
        statistics: Some(statistics),
        rule: Some(rule),
        triggered: true,
    }
}

#[cfg(test)]
mod tests {
    use super::*;
    use crate::exposure::FIRST_YEAR;
    use approx::assert_relative_eq;

    const LAST_YEAR: i32 = 2025;

    fn series(loss_for: impl Fn(i32) -> f64) -> AnnualSeries {
        let losses = (FIRST_YEAR..=LAST_YEAR).map(loss_for).collect();
        AnnualSeries::from_losses(FIRST_YEAR, losses)
    }

    #[test]
    fn test_zero_series_prices_zero() {
        let result = price(&AnnualSeries::zeros(FIRST_YEAR, LAST_YEAR), 1_000_000.0);
        assert!(!result.triggered);
        assert_eq!(result.traditional, Scenario::default());
        assert_eq!(result.aggressive.premium, 0.0);
        assert_eq!(result.target_expected_loss, 0.0);
    }

    #[test]
    fn test_stable_history_uses_default_divisors() {
        let result = price(&series(|_| 100_000.0), 1_000_000.0);
        let stats = result.statistics.unwrap();
        assert_eq!(stats.all_years_band, RatioBand::Flat);
        assert_eq!(stats.last_25_years_band, RatioBand::Flat);
        assert_relative_eq!(result.target_expected_loss, 100_000.0, epsilon = 1e-6);
        assert_relative_eq!(result.traditional.rate_on_line, 0.1 / 0.4, epsilon = 1e-9);
        assert_relative_eq!(result.aggressive.rate_on_line, 0.1 / 0.55, epsilon = 1e-9);
        assert_relative_eq!(result.traditional.premium, 250_000.0, epsilon = 1e-3);
        assert_eq!(result.traditional.rate_on_line_pct(), "25.00%");
        assert_eq!(result.aggressive.rate_on_line_pct(), "18.18%");
    }

    #[test]
    fn test_recent_activity_targets_last_25_years() {
        // Losses only in 2001-2025
        let result = price(&series(|y| if y > 2000 { 100_000.0 } else { 0.0 }), 1_000_000.0);
        let stats = result.statistics.unwrap();
        assert_eq!(stats.all_years_band, RatioBand::Below);
        assert_eq!(stats.last_25_years_band, RatioBand::Above);
        assert_eq!(result.rule.unwrap().target, LossTarget::Last25Years);
        assert_relative_eq!(result.target_expected_loss, 100_000.0, epsilon = 1e-6);
        assert_relative_eq!(result.traditional.rate_on_line, 0.1 / 0.475, epsilon = 1e-9);
        assert_relative_eq!(result.aggressive.rate_on_line, 0.1 / 0.575, epsilon = 1e-9);
    }

    #[test]
    fn test_pre_1949_losses_only_use_floored_reference() {
        // Nothing since 1949: the reference mean is floored
        let result = price(&series(|y| if y == 1900 { 1_000_000.0 } else { 0.0 }), 1_000_000.0);
        let stats = result.statistics.unwrap();
        assert_eq!(stats.mean_since_1949, MIN_REFERENCE_LOSS);
        assert_eq!(stats.all_years_band, RatioBand::Above);
        assert_eq!(stats.last_25_years_band, RatioBand::Below);
        assert_eq!(result.target_expected_loss, MIN_REFERENCE_LOSS);
        // Tiny raw rate: the floor lands just above 2%
        assert!(result.traditional.rate_on_line > 0.02 && result.traditional.rate_on_line < 0.0201);
    }

    #[test]
    fn test_low_loss_is_floored() {
        // 1% of limit per year on a flat history
        let result = price(&series(|_| 4_000.0), 1_000_000.0);
        let raw = (1.0 / 0.4) * 0.004;
        assert_relative_eq!(result.traditional.rate_on_line, RateFloor::default().apply(raw), epsilon = 1e-12);
        assert_relative_eq!(result.traditional.rate_on_line, 0.024285714, epsilon = 1e-8);
        assert_relative_eq!(result.traditional.premium, 24_285.714, epsilon = 1e-3);
    }

    #[test]
    fn test_zero_aggregate_limit() {
        let result = price(&series(|_| 100.0), 0.0);
        assert_relative_eq!(result.traditional.rate_on_line, 0.02, epsilon = 1e-12);
        assert_eq!(result.traditional.premium, 0.0);
    }
}
