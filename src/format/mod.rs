//! Output formatters
//!
//! Provides trait-based output formatting for selection reports: the ranked
//! shortlist plus the hotspot cells computed for it.

pub mod gpx;
pub mod json;
pub mod text;
pub mod url;

use serde::{Deserialize, Serialize};

use crate::config::Config;
use crate::error::Result;
use crate::hotspot::{DateRange, HotspotSet};
use crate::rank::{self, Ranked, SortMode};
use crate::session::{HotspotScope, Region, Session};
use crate::species::{ImageRef, Rarity};

/// Information about an output format
#[derive(Debug, Clone, Serialize, Deserialize)]
pub struct FormatInfo {
    /// Format name
    pub name: String,
    /// Format description
    pub description: String,
}

/// Echo of the parameters a report was computed with
#[derive(Debug, Clone, Serialize, Deserialize)]
pub struct SelectionRequest {
    pub lat: f64,
    pub lon: f64,
    pub radius_km: f64,
    pub top_n: usize,
    pub sort_mode: SortMode,
    pub grid_km: f64,
    /// 0-11 reference month for the seasonal window
    pub reference_month: usize,
}

/// One ranked shortlist entry
#[derive(Debug, Clone, Serialize, Deserialize)]
pub struct RankedEntry {
    pub rank: usize,
    pub id: String,
    pub common_name: String,
    pub scientific_name: String,
    pub rarity: Rarity,
    pub local_count: u32,
    /// Distance to the nearest occurrence; absent when the species has no
    /// valid-coordinate points at all
    #[serde(skip_serializing_if = "Option::is_none")]
    pub nearest_km: Option<f64>,
    #[serde(skip_serializing_if = "Option::is_none")]
    pub total: Option<u64>,
    pub seasonal_score: u32,
    #[serde(skip_serializing_if = "Option::is_none")]
    pub image: Option<ImageRef>,
}

impl RankedEntry {
    pub(crate) fn new(rank: usize, r: &Ranked<'_>) -> Self {
        Self {
            rank,
            id: r.species.id.clone(),
            common_name: r.species.common_name.clone(),
            scientific_name: r.species.scientific_name.clone(),
            rarity: r.species.rarity,
            local_count: r.species.local_count,
            nearest_km: r.nearest_km.is_finite().then_some(r.nearest_km),
            total: r.species.total,
            seasonal_score: r.seasonal_score,
            image: r.species.image.clone(),
        }
    }
}

/// A complete selection result: shortlist + hotspot cells
#[derive(Debug, Clone, Serialize, Deserialize)]
pub struct SelectionReport {
    /// Unique id for this report
    pub id: String,
    pub generated_at: String,
    pub region: Region,
    pub request: SelectionRequest,
    pub entries: Vec<RankedEntry>,
    pub hotspots: HotspotSet,
}

/// Build a selection report from the current session state
///
/// Ranks with the session's filters, then aggregates hotspot cells over the
/// requested scope. The seasonal transform is applied exactly when the sort
/// mode is `season`.
pub fn build_report(
    session: &Session,
    grid_km: f64,
    range: DateRange,
    scope: HotspotScope,
    reference_month: usize,
) -> SelectionReport {
    let ranked = rank::select(
        &session.species,
        session.filters.top_n,
        session.filters.sort_mode,
        session.user(),
        reference_month,
    );
    let entries = ranked
        .iter()
        .enumerate()
        .map(|(i, r)| RankedEntry::new(i + 1, r))
        .collect();

    let seasonal_month =
        (session.filters.sort_mode == SortMode::Season).then_some(reference_month);
    let hotspots = session.hotspot_set(grid_km, range, scope, seasonal_month);

    SelectionReport {
        id: uuid::Uuid::new_v4().to_string(),
        generated_at: chrono::Utc::now().to_rfc3339(),
        region: session.region.clone(),
        request: SelectionRequest {
            lat: session.user().lat,
            lon: session.user().lon,
            radius_km: session.radius_km,
            top_n: session.filters.top_n,
            sort_mode: session.filters.sort_mode,
            grid_km,
            reference_month,
        },
        entries,
        hotspots,
    }
}

/// Trait for output formatters
pub trait OutputFormatter: Send + Sync {
    /// Get the format name
    fn name(&self) -> &str;

    /// Get the format description
    fn description(&self) -> &str;

    /// Format the selection report
    fn format(&self, report: &SelectionReport, config: &Config) -> Result<String>;
}

/// Get a formatter by name
pub fn get_formatter(name: &str) -> Option<Box<dyn OutputFormatter>> {
    match name.to_lowercase().as_str() {
        "json" => Some(Box::new(json::JsonFormatter)),
        "text" => Some(Box::new(text::TextFormatter)),
        "gpx" => Some(Box::new(gpx::GpxFormatter)),
        "url" => Some(Box::new(url::UrlFormatter)),
        _ => None,
    }
}

/// List all available formatters
pub fn available_formats() -> Vec<FormatInfo> {
    vec![
        FormatInfo {
            name: "json".to_string(),
            description: "Full JSON report".to_string(),
        },
        FormatInfo {
            name: "text".to_string(),
            description: "Human-readable shortlist".to_string(),
        },
        FormatInfo {
            name: "gpx".to_string(),
            description: "GPX waypoint file of hotspot cells".to_string(),
        },
        FormatInfo {
            name: "url".to_string(),
            description: "Map URL for the top hotspot".to_string(),
        },
    ]
}

#[cfg(test)]
pub(crate) mod test_fixtures {
    use super::*;
    use crate::session::Session;
    use crate::species::{Occurrence, Species};

    /// A small deterministic report for formatter tests
    pub fn create_test_report() -> SelectionReport {
        let occ = |lat: f64, lon: f64, m: u32| {
            Occurrence::from_year_month(lat, lon, Some(2024), Some(m))
        };

        let mut a = Species::new(
            "Allium ursinum",
            "Bärlauch",
            vec![occ(52.0, 13.0, 3), occ(52.001, 13.001, 3)],
            2024,
        );
        a.total = Some(1234);
        let mut b = Species::new("Urtica dioica", "Brennnessel", vec![occ(52.02, 13.0, 7)], 2024);
        b.total = Some(80);

        let mut session = Session::new(Region::default(), 10.0, 1.0);
        session.set_species(vec![a, b]);
        session.update_location(52.0, 13.0);

        build_report(
            &session,
            1.0,
            DateRange::unbounded(),
            HotspotScope::Selection,
            2,
        )
    }
}

#[cfg(test)]
mod tests {
    use super::*;
    use test_fixtures::create_test_report;

    #[test]
    fn test_get_formatter() {
        assert!(get_formatter("json").is_some());
        assert!(get_formatter("text").is_some());
        assert!(get_formatter("gpx").is_some());
        assert!(get_formatter("url").is_some());
        assert!(get_formatter("unknown").is_none());
    }

    #[test]
    fn test_get_formatter_case_insensitive() {
        assert!(get_formatter("JSON").is_some());
        assert!(get_formatter("Text").is_some());
        assert!(get_formatter("GPX").is_some());
    }

    #[test]
    fn test_available_formats() {
        let formats = available_formats();
        assert_eq!(formats.len(), 4);
        assert!(formats.iter().any(|f| f.name == "json"));
        assert!(formats.iter().any(|f| f.name == "text"));
        assert!(formats.iter().any(|f| f.name == "gpx"));
        assert!(formats.iter().any(|f| f.name == "url"));
    }

    #[test]
    fn test_build_report_entries_ranked() {
        let report = create_test_report();

        assert_eq!(report.entries.len(), 2);
        assert_eq!(report.entries[0].id, "Allium ursinum");
        assert_eq!(report.entries[0].rank, 1);
        assert_eq!(report.entries[0].local_count, 2);
        assert_eq!(report.entries[1].rank, 2);
        assert!(!report.hotspots.cells.is_empty());
    }

    #[test]
    fn test_build_report_echoes_request() {
        let report = create_test_report();

        assert_eq!(report.request.lat, 52.0);
        assert_eq!(report.request.radius_km, 10.0);
        assert_eq!(report.request.grid_km, 1.0);
        assert_eq!(report.request.sort_mode, SortMode::Timeless);
        assert!(!report.id.is_empty());
    }
}
