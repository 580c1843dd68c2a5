//! Geographic primitives
//!
//! Coordinates, great-circle distance, and bounding boxes. Everything else
//! in the crate builds on the distance function defined here.

use crate::constants::geo::{EARTH_RADIUS_KM, KM_PER_DEGREE_LAT};
use serde::{Deserialize, Serialize};

/// A geographic coordinate (latitude, longitude)
#[derive(Debug, Clone, Copy, PartialEq, Serialize, Deserialize)]
pub struct Coordinates {
    pub lat: f64,
    pub lon: f64,
}

impl Coordinates {
    /// Create new coordinates
    pub fn new(lat: f64, lon: f64) -> Self {
        Self { lat, lon }
    }

    /// Validate that coordinates are within valid ranges
    ///
    /// Latitude: -90 to 90
    /// Longitude: -180 to 180
    pub fn validate(&self) -> crate::error::Result<()> {
        if !(-90.0..=90.0).contains(&self.lat) {
            return Err(crate::error::Error::InvalidCoordinates(format!(
                "Latitude {} is out of range [-90, 90]",
                self.lat
            )));
        }
        if !(-180.0..=180.0).contains(&self.lon) {
            return Err(crate::error::Error::InvalidCoordinates(format!(
                "Longitude {} is out of range [-180, 180]",
                self.lon
            )));
        }
        Ok(())
    }

    /// Whether both components are finite numbers
    ///
    /// Occurrence records with non-finite coordinates are skipped by the
    /// aggregation and distance passes rather than propagated into results.
    pub fn is_finite(&self) -> bool {
        self.lat.is_finite() && self.lon.is_finite()
    }
}

/// Great-circle distance between two points in kilometers (haversine)
///
/// Commutative, returns 0 for identical points. Non-finite inputs propagate
/// NaN; callers treat a NaN distance as "unknown/excluded".
pub fn distance_km(lat1: f64, lon1: f64, lat2: f64, lon2: f64) -> f64 {
    let d_lat = (lat2 - lat1).to_radians();
    let d_lon = (lon2 - lon1).to_radians();
    let lat1 = lat1.to_radians();
    let lat2 = lat2.to_radians();

    let s1 = (d_lat / 2.0).sin();
    let s2 = (d_lon / 2.0).sin();
    let x = s1 * s1 + lat1.cos() * lat2.cos() * s2 * s2;
    let c = 2.0 * x.sqrt().atan2((1.0 - x).sqrt());

    EARTH_RADIUS_KM * c
}

/// A latitude/longitude bounding box
#[derive(Debug, Clone, Copy, PartialEq, Serialize, Deserialize)]
pub struct BoundingBox {
    pub min_lat: f64,
    pub max_lat: f64,
    pub min_lon: f64,
    pub max_lon: f64,
}

impl BoundingBox {
    /// Rough bounding box around a point
    ///
    /// Longitude degrees shrink with latitude; the box is clamped to valid
    /// coordinate ranges near the poles and the antimeridian.
    pub fn around(lat: f64, lon: f64, radius_km: f64) -> Self {
        let lat_deg = radius_km / KM_PER_DEGREE_LAT;
        let lon_deg = radius_km / (KM_PER_DEGREE_LAT * lat.to_radians().cos());

        Self {
            min_lat: (lat - lat_deg).clamp(-90.0, 90.0),
            max_lat: (lat + lat_deg).clamp(-90.0, 90.0),
            min_lon: (lon - lon_deg).clamp(-180.0, 180.0),
            max_lon: (lon + lon_deg).clamp(-180.0, 180.0),
        }
    }
}
