//! Speed-indexed payout tables
//!
//! A table is a step function per zone: a tier's fraction applies to speeds in
//! `[threshold, next_threshold)`, the highest tier is open-ended, and speeds
//! below the lowest threshold pay nothing.

use std::collections::BTreeMap;

use serde::{Deserialize, Serialize};

/// Handling of payout fractions greater than 1
#[derive(Debug, Clone, Copy, Default, PartialEq, Eq, Serialize, Deserialize)]
#[serde(rename_all = "snake_case")]
pub enum FractionMode {
    /// Values above 1 are read as percentages (10 -> 0.10)
    #[default]
    Auto,
    /// Values above 1 are rejected
    Strict,
}

/// Normalize a raw table value to a fraction: values above 1 are percentages
pub fn normalize_fraction(raw: f64) -> f64 {
    if raw > 1.0 {
        raw / 100.0
    } else {
        raw
    }
}

/// One row of the payout table
#[derive(Debug, Clone, PartialEq, Serialize, Deserialize)]
#[serde(try_from = "RawTier", into = "RawTier")]
pub struct PayoutTier {
    /// Lower bound of the tier (km/h, inclusive)
    pub min_speed_kmh: f64,

    /// Raw table value per zone id
    pub fractions: BTreeMap<u32, f64>,

    /// Value of a generic `payout` column, used by zones without their own column
    pub fallback: Option<f64>,
}

impl PayoutTier {
    pub fn new(min_speed_kmh: f64) -> Self {
        Self {
            min_speed_kmh,
            fractions: BTreeMap::new(),
            fallback: None,
        }
    }

    pub fn with_zone(mut self, zone_id: u32, value: f64) -> Self {
        self.fractions.insert(zone_id, value);
        self
    }

    pub fn with_fallback(mut self, value: f64) -> Self {
        self.fallback = Some(value);
        self
    }

    /// Raw value for a zone: its own column, else the generic column, else 0
    pub fn raw_value(&self, zone_id: u32) -> f64 {
        self.fractions
            .get(&zone_id)
            .copied()
            .or(self.fallback)
            .unwrap_or(0.0)
    }

    /// Normalized payout fraction for a zone
    pub fn fraction(&self, zone_id: u32) -> f64 {
        normalize_fraction(self.raw_value(zone_id))
    }

    /// Every raw value in the row, for validation
    pub(crate) fn values(&self) -> impl Iterator<Item = f64> + '_ {
        self.fractions.values().copied().chain(self.fallback)
    }
}

/// Wire shape of a tier: `{"min_speed": 200, "C1": 0.5, "C2": 10, "payout": 0.2}`
#[derive(Debug, Clone, Serialize, Deserialize)]
struct RawTier {
    #[serde(alias = "min_speed_kmh")]
    min_speed: f64,
    #[serde(flatten)]
    columns: BTreeMap<String, serde_json::Value>,
}

/// Zone id of a `C{id}` column name
pub(crate) fn zone_column_id(column: &str) -> Option<u32> {
    let rest = column.strip_prefix('C').or_else(|| column.strip_prefix('c'))?;
    rest.parse().ok()
}

impl TryFrom<RawTier> for PayoutTier {
    type Error = String;

    fn try_from(raw: RawTier) -> Result<Self, Self::Error> {
        let mut tier = PayoutTier::new(raw.min_speed);
        for (column, value) in raw.columns {
            let number = value.as_f64().ok_or_else(|| {
                format!(
                    "tier {} km/h: column {} must be a number, got {}",
                    raw.min_speed, column, value
                )
            })?;
            if column.eq_ignore_ascii_case("payout") {
                tier.fallback = Some(number);
            } else if let Some(zone_id) = zone_column_id(&column) {
                tier.fractions.insert(zone_id, number);
            } else {
                return Err(format!("tier {} km/h: unknown column {:?}", raw.min_speed, column));
            }
        }
        Ok(tier)
    }
}

impl From<PayoutTier> for RawTier {
    fn from(tier: PayoutTier) -> Self {
        let mut columns: BTreeMap<String, serde_json::Value> = tier
            .fractions
            .into_iter()
            .map(|(id, v)| (format!("C{}", id), serde_json::Value::from(v)))
            .collect();
        if let Some(v) = tier.fallback {
            columns.insert("payout".to_string(), serde_json::Value::from(v));
        }
        RawTier {
            min_speed: tier.min_speed_kmh,
            columns,
        }
    }
}

/// Ordered set of payout tiers
#[derive(Debug, Clone, Default, PartialEq, Serialize, Deserialize)]
#[serde(from = "Vec<PayoutTier>", into = "Vec<PayoutTier>")]
pub struct PayoutTable {
    /// Tiers by ascending threshold
    tiers: Vec<PayoutTier>,
}

impl From<Vec<PayoutTier>> for PayoutTable {
    fn from(tiers: Vec<PayoutTier>) -> Self {
        Self::new(tiers)
    }
}

impl From<PayoutTable> for Vec<PayoutTier> {
    fn from(table: PayoutTable) -> Self {
        table.tiers
    }
}

impl PayoutTable {
    pub fn new(mut tiers: Vec<PayoutTier>) -> Self {
        tiers.sort_by(|a, b| a.min_speed_kmh.total_cmp(&b.min_speed_kmh));
        Self { tiers }
    }

    /// Saffir-Simpson based default schedule for the given zones:
    /// Cat 1 (119 km/h) 10%, Cat 2 (154) 25%, Cat 3 (178) 50%, Cat 4 (209) 75%,
    /// Cat 5 (252) 100%, nothing below 119 km/h.
    pub fn standard(zone_ids: &[u32]) -> Self {
        let schedule = [
            (0.0, 0.0),
            (119.0, 0.10),
            (154.0, 0.25),
            (178.0, 0.50),
            (209.0, 0.75),
            (252.0, 1.0),
        ];
        let tiers = schedule
            .iter()
            .map(|&(speed, fraction)| {
                zone_ids
                    .iter()
                    .fold(PayoutTier::new(speed), |tier, &id| tier.with_zone(id, fraction))
            })
            .collect();
        Self::new(tiers)
    }

    pub fn tiers(&self) -> &[PayoutTier] {
        &self.tiers
    }

    pub fn is_empty(&self) -> bool {
        self.tiers.is_empty()
    }

    /// The tier a speed falls into: highest threshold <= speed
    pub fn tier_for(&self, speed_kmh: f64) -> Option<&PayoutTier> {
        self.tiers.iter().rev().find(|t| t.min_speed_kmh <= speed_kmh)
    }

    /// Payout fraction in [0, 1] for a zone at a given speed (km/h)
    pub fn resolve(&self, speed_kmh: f64, zone_id: u32) -> f64 {
        self.tier_for(speed_kmh)
            .map(|t| t.fraction(zone_id))
            .unwrap_or(0.0)
    }

    /// Zone ids named by any tier column
    pub fn referenced_zones(&self) -> impl Iterator<Item = u32> + '_ {
        self.tiers.iter().flat_map(|t| t.fractions.keys().copied())
    }

    pub fn has_fallback(&self) -> bool {
        self.tiers.iter().any(|t| t.fallback.is_some())
    }
}

/// Payout fraction for `zone_id` at `speed_kmh` under `table`
pub fn resolve_payout(speed_kmh: f64, zone_id: u32, table: &PayoutTable) -> f64 {
    table.resolve(speed_kmh, zone_id)
}
