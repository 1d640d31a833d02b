//! Per-storm aggregation: one payout per location, then the event cap

use std::collections::HashSet;

use log::debug;
use serde::{Deserialize, Serialize};

use super::evaluator::{evaluate_zone, ZoneExposure};
use crate::catalog::{Category, StormTrack};
use crate::program::Program;
use crate::report::format_currency;

/// Speeds at or below this (km/h) are not recorded as candidates
pub const DEFAULT_MIN_TRIGGER_KMH: f64 = 30.0;

/// Separator between segments of the breakdown trail
pub const BREAKDOWN_SEPARATOR: &str = " || ";

/// Payout of one historical storm against the program
#[derive(Debug, Clone, Serialize, Deserialize)]
pub struct EventResult {
    pub storm_id: String,
    pub name: String,
    pub year: i32,
    pub peak_category: Category,

    /// Highest-paying zone at each location, by descending payout
    pub winners: Vec<ZoneExposure>,

    /// Sum of winning traditional payouts before the event cap
    pub raw_payout: f64,

    /// Traditional payout after the event cap
    pub payout: f64,

    /// Asymmetric payout after the event cap
    pub asymmetric_payout: f64,

    pub event_cap_applied: bool,

    /// Payout after the annual aggregate limit; equals `payout` until the
    /// annual pass runs
    pub adjusted_payout: f64,

    /// Evidence trail, one segment per winning location plus cap notices
    pub breakdown: Vec<String>,
}

impl EventResult {
    /// The evidence trail as a single line
    pub fn breakdown_text(&self) -> String {
        self.breakdown.join(BREAKDOWN_SEPARATOR)
    }
}

fn describe(exposure: &ZoneExposure) -> String {
    if exposure.traditional_payout > 0.0 {
        format!(
            "[Location Lat:{:.2}/Lon:{:.2}] Zone {} ({}km) won: wind {:.1} km/h -> tier {:.0}% = {}",
            exposure.lat,
            exposure.lon,
            exposure.zone_id,
            exposure.radius_km,
            exposure.wind_kmh,
            exposure.fraction * 100.0,
            format_currency(exposure.traditional_payout),
        )
    } else {
        format!(
            "[Location Lat:{:.2}/Lon:{:.2}] Zone {}: wind {:.1} km/h (below trigger)",
            exposure.lat, exposure.lon, exposure.zone_id, exposure.wind_kmh,
        )
    }
}

/// Keep the highest traditional payout per location. Ties keep the zone
/// listed first in the program.
///
/// The winner's own asymmetric payout is carried as-is, even when another
/// zone at the same location would have had a higher asymmetric value.
pub(crate) fn select_location_winners(mut candidates: Vec<(ZoneExposure, (u64, u64))>) -> Vec<ZoneExposure> {
    candidates.sort_by(|a, b| b.0.traditional_payout.total_cmp(&a.0.traditional_payout));
    let mut seen = HashSet::new();
    candidates
        .into_iter()
        .filter(|(_, location)| seen.insert(*location))
        .map(|(exposure, _)| exposure)
        .collect()
}

/// Evaluate one storm against every zone of the program.
///
/// Returns `None` when the storm produces no payout after the event cap.
pub fn evaluate_event(storm: &StormTrack, program: &Program, min_trigger_kmh: f64) -> Option<EventResult> {
    if !storm.is_evaluable() {
        return None;
    }

    let candidates: Vec<(ZoneExposure, (u64, u64))> = program
        .zones()
        .iter()
        .filter_map(|zone| {
            evaluate_zone(storm, zone, program.table(), program.asymmetry_factor())
                .filter(|exposure| exposure.wind_kmh > min_trigger_kmh)
                .map(|exposure| (exposure, zone.location_key()))
        })
        .collect();
    if candidates.is_empty() {
        return None;
    }

    let winners = select_location_winners(candidates);
    let mut breakdown: Vec<String> = winners.iter().map(describe).collect();

    let raw_payout: f64 = winners.iter().map(|w| w.traditional_payout).sum();
    let raw_asymmetric: f64 = winners.iter().map(|w| w.asymmetric_payout).sum();

    let event_limit = program.limits().event;
    let payout = raw_payout.min(event_limit);
    let asymmetric_payout = raw_asymmetric.min(event_limit);
    let event_cap_applied = raw_payout > event_limit;
    if event_cap_applied {
        breakdown.push(format!(
            "[ALERT] Event cap applied ({} -> {})",
            format_currency(raw_payout),
            format_currency(event_limit)
        ));
        debug!("{} {}: event cap {:.0} -> {:.0}", storm.id, storm.name, raw_payout, event_limit);
    }

    if payout <= 0.0 {
        return None;
    }

    Some(EventResult {
        storm_id: storm.id.clone(),
        name: storm.name.clone(),
        year: storm.year,
        peak_category: storm.peak_category(),
        winners,
        raw_payout,
        payout,
        asymmetric_payout,
        event_cap_applied,
        adjusted_payout: payout,
        breakdown,
    })
}
