//! Distance and circle-crossing primitives on lat/lon coordinates
//!
//! Distances are great-circle (haversine) on a 6371 km sphere. Crossings use a
//! local flat projection around the segment, which is only valid for the short
//! 6-hourly segments of a best-track record.

use serde::{Deserialize, Serialize};

use crate::catalog::TrackPoint;

/// Mean Earth radius (km)
pub const EARTH_RADIUS_KM: f64 = 6371.0;

/// Kilometres per degree of latitude in the flat projection
pub const KM_PER_DEG_LAT: f64 = 111.32;

/// Degrees-per-km divisor of the coarse segment pre-check
const COARSE_KM_PER_DEG: f64 = 111.0;

/// Tolerance on the segment parameter when accepting a crossing
const T_TOLERANCE: f64 = 1e-5;

/// A latitude/longitude pair in signed degrees
#[derive(Debug, Clone, Copy, PartialEq, Serialize, Deserialize)]
pub struct GeoPoint {
    pub lat: f64,
    pub lon: f64,
}

impl GeoPoint {
    pub fn new(lat: f64, lon: f64) -> Self {
        Self { lat, lon }
    }
}

/// Great-circle distance in km between two points (haversine)
pub fn distance(lat1: f64, lon1: f64, lat2: f64, lon2: f64) -> f64 {
    let dlat = (lat2 - lat1).to_radians();
    let dlon = (lon2 - lon1).to_radians();
    let a = (dlat / 2.0).sin().powi(2)
        + lat1.to_radians().cos() * lat2.to_radians().cos() * (dlon / 2.0).sin().powi(2);
    let c = 2.0 * a.sqrt().atan2((1.0 - a).sqrt());
    EARTH_RADIUS_KM * c
}

/// Wind speeds (same unit as the samples) at the points where the straight
/// segment `p1 -> p2` crosses the circle of `radius_km` around `center`.
///
/// Returns 0, 1 or 2 linearly interpolated speeds. Degenerate segments yield none.
pub fn segment_circle_crossings(
    p1: &TrackPoint,
    p2: &TrackPoint,
    center: GeoPoint,
    radius_km: f64,
) -> Vec<f64> {
    let mid_lat = ((p1.lat + p2.lat) / 2.0).to_radians();
    let km_per_deg_lon = KM_PER_DEG_LAT * mid_lat.cos();

    // Segment direction and center, both relative to p1
    let dx = (p2.lon - p1.lon) * km_per_deg_lon;
    let dy = (p2.lat - p1.lat) * KM_PER_DEG_LAT;
    let cx = (center.lon - p1.lon) * km_per_deg_lon;
    let cy = (center.lat - p1.lat) * KM_PER_DEG_LAT;

    let a = dx * dx + dy * dy;
    if a < 1e-9 {
        return Vec::new();
    }
    let b = -2.0 * (cx * dx + cy * dy);
    let c = cx * cx + cy * cy - radius_km * radius_km;

    let delta = b * b - 4.0 * a * c;
    if delta < 0.0 {
        return Vec::new();
    }

    let sqrt_delta = delta.sqrt();
    [(-b - sqrt_delta) / (2.0 * a), (-b + sqrt_delta) / (2.0 * a)]
        .into_iter()
        .filter(|t| (-T_TOLERANCE..=1.0 + T_TOLERANCE).contains(t))
        .map(|t| {
            let t = t.clamp(0.0, 1.0);
            p1.wind_kt + t * (p2.wind_kt - p1.wind_kt)
        })
        .collect()
}

/// Coarse check that the segment's bounding box comes within
/// `radius_km / 111 + 1` degrees of the center. A `false` here means the
/// segment cannot reach the circle.
pub fn segment_may_reach(p1: &TrackPoint, p2: &TrackPoint, center: GeoPoint, radius_km: f64) -> bool {
    let reach_deg = radius_km / COARSE_KM_PER_DEG + 1.0;
    !(p1.lat.min(p2.lat) > center.lat + reach_deg
        || p1.lat.max(p2.lat) < center.lat - reach_deg
        || p1.lon.min(p2.lon) > center.lon + reach_deg
        || p1.lon.max(p2.lon) < center.lon - reach_deg)
}

/// Axis-aligned lat/lon box
#[derive(Debug, Clone, Copy, PartialEq)]
pub struct BoundingBox {
    pub min_lat: f64,
    pub max_lat: f64,
    pub min_lon: f64,
    pub max_lon: f64,
}

impl BoundingBox {
    /// Box around a set of points, widened by `margin_deg` on every side.
    /// `None` when there are no points.
    pub fn around<I>(points: I, margin_deg: f64) -> Option<Self>
    where
        I: IntoIterator<Item = GeoPoint>,
    {
        let mut iter = points.into_iter();
        let first = iter.next()?;
        let mut bbox = Self {
            min_lat: first.lat,
            max_lat: first.lat,
            min_lon: first.lon,
            max_lon: first.lon,
        };
        for p in iter {
            bbox.min_lat = bbox.min_lat.min(p.lat);
            bbox.max_lat = bbox.max_lat.max(p.lat);
            bbox.min_lon = bbox.min_lon.min(p.lon);
            bbox.max_lon = bbox.max_lon.max(p.lon);
        }
        bbox.min_lat -= margin_deg;
        bbox.max_lat += margin_deg;
        bbox.min_lon -= margin_deg;
        bbox.max_lon += margin_deg;
        Some(bbox)
    }

    /// Inclusive on all edges
    pub fn contains(&self, lat: f64, lon: f64) -> bool {
        lat >= self.min_lat && lat <= self.max_lat && lon >= self.min_lon && lon <= self.max_lon
    }
}
