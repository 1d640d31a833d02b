//! Underwriting rules: trend bands, the 3x3 divisor table and the rate floor

use serde::{Deserialize, Serialize};

/// Relative difference beyond which a mean counts as materially different
pub const RATIO_TOLERANCE: f64 = 0.10;

/// Position of an expected-loss estimate relative to the 1949-onward mean
#[derive(Debug, Clone, Copy, PartialEq, Eq, Serialize, Deserialize)]
pub enum RatioBand {
    /// More than 10% below
    Below,
    /// Within +/-10%
    Flat,
    /// More than 10% above
    Above,
}

impl RatioBand {
    /// Classify `estimate / reference - 1`
    pub fn classify(ratio: f64) -> Self {
        if ratio < -RATIO_TOLERANCE {
            RatioBand::Below
        } else if ratio > RATIO_TOLERANCE {
            RatioBand::Above
        } else {
            RatioBand::Flat
        }
    }

    fn index(self) -> usize {
        match self {
            RatioBand::Below => 0,
            RatioBand::Flat => 1,
            RatioBand::Above => 2,
        }
    }
}

/// Which expected annual loss the rate is built on
#[derive(Debug, Clone, Copy, PartialEq, Eq, Serialize, Deserialize)]
pub enum LossTarget {
    /// Mean annual loss from 1949 onward
    Since1949,
    /// Mean annual loss over the last 25 years
    Last25Years,
}

/// Divisors and loss target selected for one trend case
#[derive(Debug, Clone, Copy, PartialEq, Serialize, Deserialize)]
pub struct PricingRule {
    /// Divisor of the traditional scenario
    pub base_divisor: f64,
    /// Divisor of the aggressive scenario
    pub aggressive_divisor: f64,
    pub target: LossTarget,
}

const fn rule(base_divisor: f64, aggressive_divisor: f64, target: LossTarget) -> PricingRule {
    PricingRule { base_divisor, aggressive_divisor, target }
}

/// Rows: all-years band. Columns: last-25-years band. Both against the
/// 1949-onward mean, ordered Below, Flat, Above.
pub const DECISION_TABLE: [[PricingRule; 3]; 3] = [
    // All years below
    [
        rule(0.5, 0.6, LossTarget::Since1949),
        rule(0.4, 0.575, LossTarget::Since1949),
        rule(0.475, 0.575, LossTarget::Last25Years),
    ],
    // All years flat
    [
        rule(0.45, 0.6, LossTarget::Since1949),
        rule(0.4, 0.55, LossTarget::Since1949),
        rule(0.45, 0.575, LossTarget::Last25Years),
    ],
    // All years above
    [
        rule(0.425, 0.575, LossTarget::Since1949),
        rule(0.4, 0.525, LossTarget::Since1949),
        rule(0.425, 0.55, LossTarget::Last25Years),
    ],
];

impl PricingRule {
    pub fn lookup(all_years: RatioBand, last_25_years: RatioBand) -> Self {
        DECISION_TABLE[all_years.index()][last_25_years.index()]
    }
}

/// Soft minimum on rate-on-line.
///
/// Rates below `threshold` are pulled up toward it:
/// `threshold - factor * (threshold - raw)` with
/// `factor = (threshold - minimum) / threshold`, so a zero raw rate lands on
/// `minimum` and rates approach `threshold` continuously.
#[derive(Debug, Clone, Copy, PartialEq, Serialize, Deserialize)]
pub struct RateFloor {
    pub minimum: f64,
    pub threshold: f64,
}

impl Default for RateFloor {
    fn default() -> Self {
        Self {
            minimum: 0.02,
            threshold: 0.035,
        }
    }
}

impl RateFloor {
    pub fn factor(&self) -> f64 {
        (self.threshold - self.minimum) / self.threshold
    }

    pub fn apply(&self, raw: f64) -> f64 {
        if raw < self.threshold {
            self.threshold - self.factor() * (self.threshold - raw)
        } else {
            raw
        }
    }
}
