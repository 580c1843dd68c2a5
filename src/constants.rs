//! Centralized constants for the wilder crate
//!
//! This module consolidates constants that are used across multiple modules
//! to avoid duplication and ensure consistency.

/// Geographic constants
pub mod geo {
    /// Mean Earth radius in kilometers
    pub const EARTH_RADIUS_KM: f64 = 6371.0;

    /// Kilometers per degree of latitude (approximate, varies slightly with latitude)
    pub const KM_PER_DEGREE_LAT: f64 = 111.0;
}

/// External API endpoints
pub mod api {
    /// GBIF species name matching (scientific name -> taxonKey)
    pub const GBIF_MATCH_URL: &str = "https://api.gbif.org/v1/species/match";

    /// GBIF occurrence search
    pub const GBIF_OCCURRENCE_URL: &str = "https://api.gbif.org/v1/occurrence/search";
}
