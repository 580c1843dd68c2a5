//! GBIF occurrence client
//!
//! Resolves scientific names to taxon keys and fetches nearby occurrence
//! records per taxon key. Refreshed occurrence lists replace a species'
//! sample wholesale; superseding of in-flight fetches is handled by the
//! caller (last-writer-wins at the boundary, not here).

use reqwest::Client;
use serde::Deserialize;
use std::collections::HashMap;

use crate::constants::api::{GBIF_MATCH_URL, GBIF_OCCURRENCE_URL};
use crate::error::{Error, Result};
use crate::geo::BoundingBox;
use crate::species::Occurrence;

/// Default page size for occurrence searches
pub const DEFAULT_FETCH_LIMIT: usize = 300;

/// Result of a bounding-box occurrence fetch
#[derive(Debug)]
pub struct OccurrenceFetch {
    pub bounds: BoundingBox,
    /// Occurrences bucketed per requested taxon key
    pub by_taxon_key: HashMap<i64, Vec<Occurrence>>,
    /// Number of records in this page
    pub total: usize,
    /// GBIF's full match count, when reported
    pub gbif_count: Option<u64>,
}

#[derive(Debug, Deserialize)]
struct MatchResponse {
    #[serde(default, rename = "matchType")]
    match_type: Option<String>,
    #[serde(default, rename = "usageKey")]
    usage_key: Option<i64>,
}

#[derive(Debug, Deserialize)]
struct SearchResponse {
    #[serde(default)]
    results: Vec<RawOccurrence>,
    #[serde(default)]
    count: Option<u64>,
}

#[derive(Debug, Deserialize)]
struct RawOccurrence {
    #[serde(default, rename = "taxonKey")]
    taxon_key: Option<i64>,
    #[serde(default, rename = "decimalLatitude")]
    decimal_latitude: Option<f64>,
    #[serde(default, rename = "decimalLongitude")]
    decimal_longitude: Option<f64>,
    #[serde(default, rename = "eventDate")]
    event_date: Option<String>,
    #[serde(default)]
    year: Option<i32>,
    #[serde(default)]
    month: Option<u32>,
}

/// GBIF event dates come as full timestamps or ranges; the leading
/// `YYYY-MM-DD` is what we use
fn parse_event_date(s: &str) -> Option<chrono::NaiveDate> {
    s.get(0..10).and_then(|d| d.parse().ok())
}

impl RawOccurrence {
    fn normalize(&self) -> Occurrence {
        let lat = self.decimal_latitude.unwrap_or(f64::NAN);
        let lon = self.decimal_longitude.unwrap_or(f64::NAN);

        match self.event_date.as_deref().and_then(parse_event_date) {
            Some(date) => {
                let mut o = Occurrence::new(lat, lon, Some(date));
                o.year = self.year.or(o.year);
                o.month = self.month.or(o.month);
                o
            }
            None => Occurrence::from_year_month(lat, lon, self.year, self.month),
        }
    }
}

/// Client for the GBIF REST API
#[derive(Debug, Clone, Default)]
pub struct GbifClient {
    client: Client,
}

impl GbifClient {
    pub fn new() -> Self {
        Self {
            client: Client::new(),
        }
    }

    /// Resolve a scientific name to a GBIF taxon key
    ///
    /// Only EXACT and FUZZY matches are accepted; HIGHERRANK and NONE
    /// resolve to `None` so a bad match never pulls in a wrong taxon.
    pub async fn resolve_taxon_key(&self, scientific_name: &str) -> Result<Option<i64>> {
        if scientific_name.is_empty() {
            return Ok(None);
        }

        let res = self
            .client
            .get(GBIF_MATCH_URL)
            .query(&[("name", scientific_name), ("strict", "true")])
            .send()
            .await?;

        if !res.status().is_success() {
            return Ok(None);
        }

        let data: MatchResponse = res.json().await?;
        let ok = matches!(data.match_type.as_deref(), Some("EXACT") | Some("FUZZY"));
        Ok(if ok { data.usage_key } else { None })
    }

    /// Fetch occurrences around a point for a set of taxon keys
    ///
    /// Searches a bounding box of `radius_km` around the position with the
    /// usual quality filters (coordinates present, no geospatial issues,
    /// status PRESENT). Every requested key gets a bucket, empty when GBIF
    /// returned nothing for it.
    pub async fn fetch_occurrences(
        &self,
        lat: f64,
        lon: f64,
        taxon_keys: &[i64],
        radius_km: f64,
        limit: usize,
    ) -> Result<OccurrenceFetch> {
        let bounds = BoundingBox::around(lat, lon, radius_km);

        let mut by_taxon_key: HashMap<i64, Vec<Occurrence>> =
            taxon_keys.iter().map(|&k| (k, Vec::new())).collect();

        if taxon_keys.is_empty() {
            return Ok(OccurrenceFetch {
                bounds,
                by_taxon_key,
                total: 0,
                gbif_count: None,
            });
        }

        let mut query: Vec<(&str, String)> = taxon_keys
            .iter()
            .map(|k| ("taxonKey", k.to_string()))
            .collect();
        query.push((
            "decimalLatitude",
            format!("{},{}", bounds.min_lat, bounds.max_lat),
        ));
        query.push((
            "decimalLongitude",
            format!("{},{}", bounds.min_lon, bounds.max_lon),
        ));
        query.push(("hasCoordinate", "true".to_string()));
        query.push(("hasGeospatialIssue", "false".to_string()));
        query.push(("occurrenceStatus", "PRESENT".to_string()));
        query.push(("limit", limit.to_string()));
        query.push(("offset", "0".to_string()));

        let res = self
            .client
            .get(GBIF_OCCURRENCE_URL)
            .query(&query)
            .send()
            .await?;

        if !res.status().is_success() {
            return Err(Error::Gbif(format!(
                "occurrence search failed: HTTP {}",
                res.status()
            )));
        }

        let data: SearchResponse = res.json().await?;
        let total = data.results.len();

        for r in &data.results {
            let Some(k) = r.taxon_key else {
                continue;
            };
            by_taxon_key.entry(k).or_default().push(r.normalize());
        }

        Ok(OccurrenceFetch {
            bounds,
            by_taxon_key,
            total,
            gbif_count: data.count,
        })
    }
}

#[cfg(test)]
mod tests {
    use super::*;
    use chrono::NaiveDate;

    #[test]
    fn test_parse_event_date() {
        let expected = NaiveDate::from_ymd_opt(2024, 3, 15);
        assert_eq!(parse_event_date("2024-03-15"), expected);
        assert_eq!(parse_event_date("2024-03-15T10:30:00"), expected);
        assert_eq!(parse_event_date("2024-03-15/2024-03-20"), expected);
        assert_eq!(parse_event_date("2024-03"), None);
        assert_eq!(parse_event_date("garbage"), None);
    }

    #[test]
    fn test_normalize_prefers_event_date() {
        let raw = RawOccurrence {
            taxon_key: Some(1),
            decimal_latitude: Some(52.0),
            decimal_longitude: Some(13.0),
            event_date: Some("2024-03-15T00:00:00".to_string()),
            year: Some(2024),
            month: Some(3),
        };
        let o = raw.normalize();
        assert_eq!(o.event_date, NaiveDate::from_ymd_opt(2024, 3, 15));
        assert_eq!(o.weight, 1.0);
    }

    #[test]
    fn test_normalize_falls_back_to_year_month() {
        let raw = RawOccurrence {
            taxon_key: Some(1),
            decimal_latitude: Some(52.0),
            decimal_longitude: Some(13.0),
            event_date: None,
            year: Some(2024),
            month: Some(3),
        };
        let o = raw.normalize();
        assert_eq!(o.event_date, NaiveDate::from_ymd_opt(2024, 3, 1));
    }

    #[test]
    fn test_normalize_missing_coordinates() {
        let raw = RawOccurrence {
            taxon_key: Some(1),
            decimal_latitude: None,
            decimal_longitude: Some(13.0),
            event_date: None,
            year: None,
            month: None,
        };
        assert!(!raw.normalize().has_valid_coords());
    }
}
