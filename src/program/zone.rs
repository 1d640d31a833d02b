//! Insured circular zones

use serde::{Deserialize, Serialize};

use crate::geometry::GeoPoint;

/// An insured circle around a location
///
/// Several zones may share a center (concentric circles at one site); ids are
/// unique across the whole program, not just within a location.
#[derive(Debug, Clone, PartialEq, Serialize, Deserialize)]
pub struct Zone {
    /// Global zone id, referenced as column `C{id}` in the payout table
    pub id: u32,

    /// Center latitude (signed degrees)
    pub lat: f64,

    /// Center longitude (signed degrees)
    pub lon: f64,

    /// Circle radius (km)
    #[serde(alias = "radio", alias = "radius")]
    pub radius_km: f64,

    /// Monetary limit paid at a 100% payout fraction
    #[serde(alias = "limite", alias = "event_limit")]
    pub limit: f64,
}

impl Zone {
    pub fn new(id: u32, lat: f64, lon: f64, radius_km: f64, limit: f64) -> Self {
        Self { id, lat, lon, radius_km, limit }
    }

    pub fn center(&self) -> GeoPoint {
        GeoPoint::new(self.lat, self.lon)
    }

    /// Key identifying the physical location; zones sharing it compete for
    /// a single payout per event.
    pub fn location_key(&self) -> (u64, u64) {
        (self.lat.to_bits(), self.lon.to_bits())
    }
}
