//! Storm track data structures

use std::collections::HashMap;

use chrono::NaiveDateTime;
use serde::{Deserialize, Serialize};

use crate::geometry::{BoundingBox, GeoPoint};

/// Saffir-Simpson style class of a wind speed in knots
#[derive(Debug, Clone, Copy, PartialEq, Eq, PartialOrd, Ord, Hash, Serialize, Deserialize)]
pub enum Category {
    /// Tropical depression, <= 33 kt
    TD,
    /// Tropical storm, 34-63 kt
    TS,
    H1,
    H2,
    H3,
    H4,
    /// > 135 kt
    H5,
}

impl Category {
    /// Classify a sustained wind speed (kt)
    pub fn from_wind_kt(wind_kt: f64) -> Self {
        if wind_kt <= 33.0 {
            Category::TD
        } else if wind_kt <= 63.0 {
            Category::TS
        } else if wind_kt <= 82.0 {
            Category::H1
        } else if wind_kt <= 95.0 {
            Category::H2
        } else if wind_kt <= 113.0 {
            Category::H3
        } else if wind_kt <= 135.0 {
            Category::H4
        } else {
            Category::H5
        }
    }

    pub fn as_str(&self) -> &'static str {
        match self {
            Category::TD => "TD",
            Category::TS => "TS",
            Category::H1 => "H1",
            Category::H2 => "H2",
            Category::H3 => "H3",
            Category::H4 => "H4",
            Category::H5 => "H5",
        }
    }
}

/// One best-track fix of a storm
#[derive(Debug, Clone, PartialEq, Serialize, Deserialize)]
pub struct TrackPoint {
    /// Storm key (e.g. "AL152017")
    pub storm_id: String,

    /// Position of the fix in the source record
    pub sequence: u32,

    /// Fix time (UTC)
    pub timestamp: NaiveDateTime,

    /// Latitude, signed degrees (north positive)
    pub lat: f64,

    /// Longitude, signed degrees (east positive)
    pub lon: f64,

    /// Maximum sustained wind (kt)
    pub wind_kt: f64,

    /// System status code (HU, TS, EX, ...) when the source has one
    #[serde(default)]
    pub status: Option<String>,
}

impl TrackPoint {
    pub fn new(
        storm_id: impl Into<String>,
        sequence: u32,
        timestamp: NaiveDateTime,
        lat: f64,
        lon: f64,
        wind_kt: f64,
    ) -> Self {
        Self {
            storm_id: storm_id.into(),
            sequence,
            timestamp,
            lat,
            lon,
            wind_kt,
            status: None,
        }
    }

    pub fn with_status(mut self, status: impl Into<String>) -> Self {
        self.status = Some(status.into());
        self
    }

    pub fn position(&self) -> GeoPoint {
        GeoPoint::new(self.lat, self.lon)
    }

    pub fn category(&self) -> Category {
        Category::from_wind_kt(self.wind_kt)
    }
}

/// The full track of one historical storm
#[derive(Debug, Clone, Serialize, Deserialize)]
pub struct StormTrack {
    pub id: String,
    pub name: String,
    pub year: i32,
    /// Fixes in chronological order
    pub points: Vec<TrackPoint>,
}

impl StormTrack {
    pub fn new(id: impl Into<String>, name: impl Into<String>, year: i32) -> Self {
        Self {
            id: id.into(),
            name: name.into(),
            year,
            points: Vec::new(),
        }
    }

    /// Build a 6-hourly track from `(lat, lon, wind_kt)` samples, starting
    /// 1 August of `year` at 00Z. Handy for synthetic what-if tracks.
    pub fn from_samples(
        id: impl Into<String>,
        name: impl Into<String>,
        year: i32,
        samples: &[(f64, f64, f64)],
    ) -> Self {
        let mut track = Self::new(id, name, year);
        let start = chrono::NaiveDate::from_ymd_opt(year, 8, 1)
            .and_then(|d| d.and_hms_opt(0, 0, 0))
            .unwrap_or_default();
        for (i, &(lat, lon, wind_kt)) in samples.iter().enumerate() {
            let timestamp = start + chrono::Duration::hours(6 * i as i64);
            track
                .points
                .push(TrackPoint::new(track.id.clone(), i as u32, timestamp, lat, lon, wind_kt));
        }
        track
    }

    /// Sort fixes by time, falling back to source order for equal times
    pub fn sort_points(&mut self) {
        self.points.sort_by(|a, b| {
            a.timestamp
                .cmp(&b.timestamp)
                .then(a.sequence.cmp(&b.sequence))
        });
    }

    /// Tracks with fewer than two fixes have no segment to test
    pub fn is_evaluable(&self) -> bool {
        self.points.len() >= 2
    }

    pub fn peak_wind_kt(&self) -> f64 {
        self.points.iter().map(|p| p.wind_kt).fold(0.0, f64::max)
    }

    pub fn peak_category(&self) -> Category {
        Category::from_wind_kt(self.peak_wind_kt())
    }

    /// Whether any fix falls inside the box
    pub fn touches(&self, bbox: &BoundingBox) -> bool {
        self.points.iter().any(|p| bbox.contains(p.lat, p.lon))
    }
}

/// A static catalog of historical storm tracks
#[derive(Debug, Clone, Default, Serialize, Deserialize)]
pub struct Catalog {
    storms: Vec<StormTrack>,
}

impl Catalog {
    /// Build from parsed tracks; storms without fixes are dropped and every
    /// track is put in chronological order.
    pub fn new(storms: Vec<StormTrack>) -> Self {
        let mut catalog = Self::default();
        catalog.extend(storms);
        catalog
    }

    /// Add tracks. A storm key already present extends that storm's track.
    pub fn extend(&mut self, storms: Vec<StormTrack>) {
        let mut index: HashMap<String, usize> = self
            .storms
            .iter()
            .enumerate()
            .map(|(i, s)| (s.id.clone(), i))
            .collect();

        for storm in storms {
            if storm.points.is_empty() {
                continue;
            }
            match index.get(&storm.id) {
                Some(&i) => {
                    let existing = &mut self.storms[i];
                    let offset = existing.points.len() as u32;
                    existing.points.extend(storm.points.into_iter().map(|mut p| {
                        p.sequence += offset;
                        p
                    }));
                    existing.sort_points();
                }
                None => {
                    let mut storm = storm;
                    storm.sort_points();
                    index.insert(storm.id.clone(), self.storms.len());
                    self.storms.push(storm);
                }
            }
        }
    }

    /// Append another catalog (e.g. the current season on top of HURDAT2)
    pub fn merge(&mut self, other: Catalog) {
        self.extend(other.storms);
    }

    pub fn storms(&self) -> &[StormTrack] {
        &self.storms
    }

    pub fn get(&self, id: &str) -> Option<&StormTrack> {
        self.storms.iter().find(|s| s.id == id)
    }

    pub fn len(&self) -> usize {
        self.storms.len()
    }

    pub fn is_empty(&self) -> bool {
        self.storms.is_empty()
    }

    pub fn point_count(&self) -> usize {
        self.storms.iter().map(|s| s.points.len()).sum()
    }

    /// Storms with at least one fix inside `bbox`
    pub fn prefilter(&self, bbox: &BoundingBox) -> Vec<&StormTrack> {
        self.storms.iter().filter(|s| s.touches(bbox)).collect()
    }
}

#[cfg(test)]
mod tests {
    use super::*;

    #[test]
    fn test_category_boundaries() {
        assert_eq!(Category::from_wind_kt(33.0), Category::TD);
        assert_eq!(Category::from_wind_kt(34.0), Category::TS);
        assert_eq!(Category::from_wind_kt(64.0), Category::H1);
        assert_eq!(Category::from_wind_kt(95.0), Category::H2);
        assert_eq!(Category::from_wind_kt(113.0), Category::H3);
        assert_eq!(Category::from_wind_kt(135.0), Category::H4);
        assert_eq!(Category::from_wind_kt(150.0), Category::H5);
    }

    #[test]
    fn test_from_samples_is_six_hourly() {
        let track = StormTrack::from_samples("AL092004", "IVAN", 2004, &[
            (12.0, -60.0, 100.0),
            (12.5, -61.0, 120.0),
            (13.0, -62.0, 140.0),
        ]);
        assert_eq!(track.points.len(), 3);
        let dt = track.points[2].timestamp - track.points[0].timestamp;
        assert_eq!(dt.num_hours(), 12);
        assert_eq!(track.peak_wind_kt(), 140.0);
        assert_eq!(track.peak_category(), Category::H5);
        assert!(track.is_evaluable());
    }

    #[test]
    fn test_extend_merges_same_storm_in_time_order() {
        let early = StormTrack::from_samples("AL012025", "ANDREA", 2025, &[(20.0, -60.0, 40.0)]);
        let mut late = StormTrack::from_samples("AL012025", "ANDREA", 2025, &[(21.0, -61.0, 50.0)]);
        late.points[0].timestamp += chrono::Duration::hours(6);

        // Later fix arrives first
        let catalog = Catalog::new(vec![late, early]);
        assert_eq!(catalog.len(), 1);
        let storm = catalog.get("AL012025").unwrap();
        assert_eq!(storm.points.len(), 2);
        assert_eq!(storm.points[0].wind_kt, 40.0);
        assert_eq!(storm.points[1].wind_kt, 50.0);
    }

    #[test]
    fn test_empty_tracks_dropped() {
        let catalog = Catalog::new(vec![StormTrack::new("AL011851", "UNNAMED", 1851)]);
        assert!(catalog.is_empty());
    }

    #[test]
    fn test_prefilter() {
        let near = StormTrack::from_samples("AL011990", "A", 1990, &[(30.0, -70.0, 50.0), (22.0, -66.0, 60.0)]);
        let far = StormTrack::from_samples("AL021990", "B", 1990, &[(40.0, -40.0, 50.0), (41.0, -41.0, 60.0)]);
        let catalog = Catalog::new(vec![near, far]);
        let bbox = BoundingBox::around([GeoPoint::new(18.0, -66.0)], 5.0).unwrap();
        let kept = catalog.prefilter(&bbox);
        assert_eq!(kept.len(), 1);
        assert_eq!(kept[0].id, "AL011990");
    }
}
