//! Wind experienced by one zone during one storm

use serde::{Deserialize, Serialize};

use crate::catalog::StormTrack;
use crate::geometry::{distance, segment_circle_crossings, segment_may_reach, GeoPoint};
use crate::program::{PayoutTable, Zone};

/// Knots to km/h
pub const KT_TO_KMH: f64 = 1.852;

/// Side of the storm's forward motion a zone lies on
///
/// In the Atlantic the left side carries the weaker wind field, so left-side
/// payouts are discounted by the asymmetry factor.
#[derive(Debug, Clone, Copy, PartialEq, Eq, Serialize, Deserialize)]
pub enum Side {
    Left,
    Right,
}

/// Highest wind (kt) credited to a zone: fixes inside the circle plus
/// interpolated speeds where the track crosses its boundary. 0 when the
/// track never comes within the radius.
pub fn max_wind_in_zone(track: &StormTrack, zone: &Zone) -> f64 {
    let center = zone.center();
    let mut max_wind: f64 = 0.0;

    for p in &track.points {
        if distance(p.lat, p.lon, zone.lat, zone.lon) <= zone.radius_km {
            max_wind = max_wind.max(p.wind_kt);
        }
    }

    for pair in track.points.windows(2) {
        let (p1, p2) = (&pair[0], &pair[1]);
        if !segment_may_reach(p1, p2, center, zone.radius_km) {
            continue;
        }
        for wind in segment_circle_crossings(p1, p2, center, zone.radius_km) {
            max_wind = max_wind.max(wind);
        }
    }

    max_wind
}

/// Which side of the track a point lies on, judged from the two fixes
/// closest to it taken in track order. Tracks with fewer than two fixes are
/// treated as passing on the right.
pub fn side_of_track(track: &StormTrack, center: GeoPoint) -> Side {
    let mut by_distance: Vec<(usize, f64)> = track
        .points
        .iter()
        .enumerate()
        .map(|(i, p)| (i, distance(p.lat, p.lon, center.lat, center.lon)))
        .collect();
    if by_distance.len() < 2 {
        return Side::Right;
    }
    // Stable: equidistant fixes keep track order
    by_distance.sort_by(|a, b| a.1.total_cmp(&b.1));

    let (a, b) = (by_distance[0].0, by_distance[1].0);
    let (first, second) = if a < b {
        (&track.points[a], &track.points[b])
    } else {
        (&track.points[b], &track.points[a])
    };

    let (v1x, v1y) = (first.lon - center.lon, first.lat - center.lat);
    let (v2x, v2y) = (second.lon - center.lon, second.lat - center.lat);
    let cross = v1x * v2y - v1y * v2x;

    if cross > 0.0 {
        Side::Left
    } else {
        Side::Right
    }
}

/// Exposure of one zone to one storm
#[derive(Debug, Clone, PartialEq, Serialize, Deserialize)]
pub struct ZoneExposure {
    pub zone_id: u32,
    pub lat: f64,
    pub lon: f64,
    pub radius_km: f64,

    /// Maximum wind credited inside the zone
    pub wind_kt: f64,
    pub wind_kmh: f64,

    pub side: Side,

    /// Threshold of the tier matched, if any
    pub tier_min_speed_kmh: Option<f64>,

    /// Payout fraction in [0, 1]
    pub fraction: f64,

    /// fraction x zone limit
    pub traditional_payout: f64,

    /// Traditional payout discounted by the asymmetry factor on the left side
    pub asymmetric_payout: f64,
}

/// Evaluate one zone against one storm. `None` when the storm never reaches it.
pub fn evaluate_zone(
    track: &StormTrack,
    zone: &Zone,
    table: &PayoutTable,
    asymmetry_factor: f64,
) -> Option<ZoneExposure> {
    let wind_kt = max_wind_in_zone(track, zone);
    if wind_kt == 0.0 {
        return None;
    }

    let side = side_of_track(track, zone.center());
    let wind_kmh = wind_kt * KT_TO_KMH;
    let tier = table.tier_for(wind_kmh);
    let fraction = tier.map(|t| t.fraction(zone.id)).unwrap_or(0.0);

    let traditional_payout = fraction * zone.limit;
    let asymmetric_payout = match side {
        Side::Left => traditional_payout * asymmetry_factor,
        Side::Right => traditional_payout,
    };

    Some(ZoneExposure {
        zone_id: zone.id,
        lat: zone.lat,
        lon: zone.lon,
        radius_km: zone.radius_km,
        wind_kt,
        wind_kmh,
        side,
        tier_min_speed_kmh: tier.map(|t| t.min_speed_kmh),
        fraction,
        traditional_payout,
        asymmetric_payout,
    })
}

#[cfg(test)]
mod tests {
    use super::*;
    use crate::program::PayoutTier;
    use approx::assert_relative_eq;

    fn zone() -> Zone {
        Zone::new(1, 18.0, -66.0, 50.0, 1_000_000.0)
    }

    fn table() -> PayoutTable {
        PayoutTable::new(vec![
            PayoutTier::new(0.0).with_zone(1, 0.0),
            PayoutTier::new(200.0).with_zone(1, 0.5),
            PayoutTier::new(280.0).with_zone(1, 1.0),
        ])
    }

    #[test]
    fn test_track_far_away_has_no_wind() {
        let track = StormTrack::from_samples("AL011990", "FAR", 1990, &[
            (25.0, -70.0, 150.0),
            (27.0, -72.0, 150.0),
            (29.0, -74.0, 150.0),
        ]);
        assert_eq!(max_wind_in_zone(&track, &zone()), 0.0);
        assert!(evaluate_zone(&track, &zone(), &table(), 0.5).is_none());
    }

    #[test]
    fn test_single_fix_inside_counts() {
        // Only the middle fix lies inside the circle
        let track = StormTrack::from_samples("AL011990", "IN", 1990, &[
            (18.0, -70.0, 60.0),
            (18.1, -66.1, 120.0),
            (18.0, -62.0, 60.0),
        ]);
        assert!(max_wind_in_zone(&track, &zone()) >= 120.0);
    }

    #[test]
    fn test_crossing_between_fixes_is_credited() {
        // Fixes on either side of the circle, none inside
        let track = StormTrack::from_samples("AL011990", "CROSS", 1990, &[
            (18.0, -68.0, 100.0),
            (18.0, -64.0, 140.0),
        ]);
        let wind = max_wind_in_zone(&track, &zone());
        assert!(wind > 120.0 && wind < 140.0, "wind {}", wind);
    }

    #[test]
    fn test_side_of_track() {
        // Moving north, passing east of the zone: zone is on the left
        let east = StormTrack::from_samples("AL011990", "E", 1990, &[
            (16.0, -65.0, 100.0),
            (17.5, -65.0, 100.0),
            (18.5, -65.0, 100.0),
            (20.0, -65.0, 100.0),
        ]);
        assert_eq!(side_of_track(&east, zone().center()), Side::Left);

        // Moving north, passing west of the zone: zone is on the right
        let west = StormTrack::from_samples("AL021990", "W", 1990, &[
            (16.0, -67.0, 100.0),
            (17.5, -67.0, 100.0),
            (18.5, -67.0, 100.0),
            (20.0, -67.0, 100.0),
        ]);
        assert_eq!(side_of_track(&west, zone().center()), Side::Right);
    }

    #[test]
    fn test_side_defaults_to_right() {
        let single = StormTrack::from_samples("AL011990", "S", 1990, &[(16.0, -65.0, 100.0)]);
        assert_eq!(side_of_track(&single, zone().center()), Side::Right);
    }

    #[test]
    fn test_evaluate_zone_tier_and_asymmetry() {
        // 150 kt heading north just east of the center: zone on the left
        let track = StormTrack::from_samples("AL011990", "T", 1990, &[
            (17.0, -65.95, 150.0),
            (17.8, -65.95, 150.0),
            (18.2, -65.95, 150.0),
            (19.0, -65.95, 150.0),
        ]);
        let exposure = evaluate_zone(&track, &zone(), &table(), 0.5).unwrap();
        assert_relative_eq!(exposure.wind_kt, 150.0);
        assert_relative_eq!(exposure.wind_kmh, 277.8, epsilon = 1e-9);
        assert_eq!(exposure.tier_min_speed_kmh, Some(200.0));
        assert_eq!(exposure.fraction, 0.5);
        assert_eq!(exposure.side, Side::Left);
        assert_relative_eq!(exposure.traditional_payout, 500_000.0);
        assert_relative_eq!(exposure.asymmetric_payout, 250_000.0);
    }
}
