//! Insurance program: zones, payout table, limits and their validation

mod zone;
mod payout;
pub mod loader;

pub use zone::Zone;
pub use payout::{normalize_fraction, resolve_payout, FractionMode, PayoutTable, PayoutTier};
pub use loader::{load_payout_table_csv, load_zones_csv};

use std::collections::HashSet;

use log::warn;
use serde::{Deserialize, Serialize};

use crate::error::{Error, Result};

/// Default discount applied to payouts on the weak (left) side of a track
pub const DEFAULT_ASYMMETRY_FACTOR: f64 = 0.5;

/// Per-event and per-year payout ceilings
#[derive(Debug, Clone, Copy, PartialEq, Serialize, Deserialize)]
pub struct Limits {
    /// Cap on the total payout of one storm
    pub event: f64,
    /// Cap on the total payout within one calendar year
    pub aggregate: f64,
}

/// A validated program, ready for the exposure engine
#[derive(Debug, Clone)]
pub struct Program {
    zones: Vec<Zone>,
    table: PayoutTable,
    limits: Limits,
    asymmetry_factor: f64,
}

fn require_finite_non_negative(value: f64, what: &str) -> Result<()> {
    if !value.is_finite() || value < 0.0 {
        return Err(Error::malformed(format!("{} must be a non-negative number, got {}", what, value)));
    }
    Ok(())
}

impl Program {
    /// Validate inputs and build a program. Any problem fails the whole
    /// calculation; nothing is defaulted silently.
    pub fn new(
        zones: Vec<Zone>,
        table: PayoutTable,
        limits: Limits,
        asymmetry_factor: f64,
        fraction_mode: FractionMode,
    ) -> Result<Self> {
        if zones.is_empty() {
            return Err(Error::malformed("at least one zone is required"));
        }
        if table.is_empty() {
            return Err(Error::malformed("payout table has no tiers"));
        }

        let mut ids = HashSet::new();
        for zone in &zones {
            if zone.id == 0 {
                return Err(Error::malformed("zone ids must be positive integers"));
            }
            if !ids.insert(zone.id) {
                return Err(Error::DuplicateZone { zone_id: zone.id });
            }
            if !zone.lat.is_finite() || !(-90.0..=90.0).contains(&zone.lat) {
                return Err(Error::malformed(format!("zone {}: latitude {} out of range", zone.id, zone.lat)));
            }
            if !zone.lon.is_finite() || !(-180.0..=180.0).contains(&zone.lon) {
                return Err(Error::malformed(format!("zone {}: longitude {} out of range", zone.id, zone.lon)));
            }
            if !zone.radius_km.is_finite() || zone.radius_km <= 0.0 {
                return Err(Error::malformed(format!("zone {}: radius must be > 0 km, got {}", zone.id, zone.radius_km)));
            }
            require_finite_non_negative(zone.limit, &format!("zone {} limit", zone.id))?;
        }

        require_finite_non_negative(limits.event, "event limit")?;
        require_finite_non_negative(limits.aggregate, "aggregate limit")?;
        if !asymmetry_factor.is_finite() || !(0.0..=1.0).contains(&asymmetry_factor) {
            return Err(Error::malformed(format!("asymmetry factor must be within [0, 1], got {}", asymmetry_factor)));
        }

        let mut previous: Option<f64> = None;
        for tier in table.tiers() {
            require_finite_non_negative(tier.min_speed_kmh, "tier threshold")?;
            if previous == Some(tier.min_speed_kmh) {
                return Err(Error::DuplicateThreshold { min_speed_kmh: tier.min_speed_kmh });
            }
            previous = Some(tier.min_speed_kmh);

            for value in tier.values() {
                require_finite_non_negative(value, &format!("payout at {} km/h", tier.min_speed_kmh))?;
                if fraction_mode == FractionMode::Strict && value > 1.0 {
                    return Err(Error::malformed(format!(
                        "payout at {} km/h is {}; fractions must be within [0, 1]",
                        tier.min_speed_kmh, value
                    )));
                }
                if normalize_fraction(value) > 1.0 {
                    return Err(Error::malformed(format!(
                        "payout at {} km/h is {}; more than 100% of the zone limit",
                        tier.min_speed_kmh, value
                    )));
                }
            }
        }

        if let Some(zone_id) = table.referenced_zones().find(|id| !ids.contains(id)) {
            return Err(Error::UnknownZone { zone_id });
        }

        // Zones without a column resolve to 0 in every tier
        if !table.has_fallback() {
            let referenced: HashSet<u32> = table.referenced_zones().collect();
            for zone in zones.iter().filter(|z| !referenced.contains(&z.id)) {
                warn!("Zone {} has no C{} column in the payout table and can never pay", zone.id, zone.id);
            }
        }

        Ok(Self {
            zones,
            table,
            limits,
            asymmetry_factor,
        })
    }

    pub fn zones(&self) -> &[Zone] {
        &self.zones
    }

    pub fn table(&self) -> &PayoutTable {
        &self.table
    }

    pub fn limits(&self) -> Limits {
        self.limits
    }

    pub fn asymmetry_factor(&self) -> f64 {
        self.asymmetry_factor
    }
}

#[cfg(test)]
mod tests {
    use super::*;

    fn zones() -> Vec<Zone> {
        vec![
            Zone::new(1, 18.0, -66.0, 25.0, 1_000_000.0),
            Zone::new(2, 18.0, -66.0, 50.0, 500_000.0),
        ]
    }

    fn table() -> PayoutTable {
        PayoutTable::standard(&[1, 2])
    }

    fn limits() -> Limits {
        Limits { event: 1_000_000.0, aggregate: 2_000_000.0 }
    }

    #[test]
    fn test_valid_program() {
        let program = Program::new(zones(), table(), limits(), 0.5, FractionMode::Auto).unwrap();
        assert_eq!(program.zones().len(), 2);
        assert_eq!(program.asymmetry_factor(), 0.5);
    }

    #[test]
    fn test_duplicate_zone_id() {
        let mut z = zones();
        z[1].id = 1;
        let err = Program::new(z, table(), limits(), 0.5, FractionMode::Auto).unwrap_err();
        assert!(matches!(err, Error::DuplicateZone { zone_id: 1 }));
    }

    #[test]
    fn test_zero_radius_rejected() {
        let mut z = zones();
        z[0].radius_km = 0.0;
        assert!(matches!(
            Program::new(z, table(), limits(), 0.5, FractionMode::Auto),
            Err(Error::MalformedInput(_))
        ));
    }

    #[test]
    fn test_unknown_zone_column() {
        let err = Program::new(zones(), PayoutTable::standard(&[1, 2, 9]), limits(), 0.5, FractionMode::Auto)
            .unwrap_err();
        assert!(matches!(err, Error::UnknownZone { zone_id: 9 }));
    }

    #[test]
    fn test_duplicate_threshold() {
        let table = PayoutTable::new(vec![
            PayoutTier::new(200.0).with_zone(1, 0.5),
            PayoutTier::new(200.0).with_zone(1, 0.6),
        ]);
        let err = Program::new(zones(), table, limits(), 0.5, FractionMode::Auto).unwrap_err();
        assert!(matches!(err, Error::DuplicateThreshold { .. }));
    }

    #[test]
    fn test_negative_limit_rejected() {
        let bad = Limits { event: -1.0, aggregate: 1.0 };
        assert!(Program::new(zones(), table(), bad, 0.5, FractionMode::Auto).is_err());
        let nan = Limits { event: 1.0, aggregate: f64::NAN };
        assert!(Program::new(zones(), table(), nan, 0.5, FractionMode::Auto).is_err());
    }

    #[test]
    fn test_asymmetry_factor_range() {
        assert!(Program::new(zones(), table(), limits(), 1.5, FractionMode::Auto).is_err());
        assert!(Program::new(zones(), table(), limits(), 1.0, FractionMode::Auto).is_ok());
    }

    #[test]
    fn test_strict_mode_rejects_percentages() {
        let table = PayoutTable::new(vec![PayoutTier::new(200.0).with_zone(1, 10.0)]);
        assert!(Program::new(zones(), table.clone(), limits(), 0.5, FractionMode::Auto).is_ok());
        assert!(Program::new(zones(), table, limits(), 0.5, FractionMode::Strict).is_err());
    }

    #[test]
    fn test_value_above_100_percent_rejected() {
        let table = PayoutTable::new(vec![PayoutTier::new(0.0).with_zone(1, 150.0)]);
        assert!(matches!(
            Program::new(zones(), table, limits(), 0.5, FractionMode::Auto),
            Err(Error::MalformedInput(_))
        ));
        let full = PayoutTable::new(vec![PayoutTier::new(0.0).with_zone(1, 100.0).with_fallback(1.0)]);
        assert!(Program::new(zones(), full, limits(), 0.5, FractionMode::Auto).is_ok());
    }

    #[test]
    fn test_empty_inputs_rejected() {
        assert!(Program::new(Vec::new(), table(), limits(), 0.5, FractionMode::Auto).is_err());
        assert!(Program::new(zones(), PayoutTable::default(), limits(), 0.5, FractionMode::Auto).is_err());
    }
}
