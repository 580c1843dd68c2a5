//! Grid aggregation of occurrences into hotspot cells
//!
//! Bins sparse occurrence points into a fixed-size geographic grid with
//! per-cell totals and month histograms, and merges per-species grids into
//! one. Cells are ephemeral: recomputed on every aggregation request, keyed
//! by their snapped grid coordinate rather than object identity.

pub mod season;

use chrono::NaiveDate;
use serde::{Deserialize, Serialize};
use std::collections::BTreeMap;

use crate::constants::geo::KM_PER_DEGREE_LAT;
use crate::species::{Occurrence, MONTH_BUCKETS};

/// Weighted month histogram for hotspot cells
pub type MonthWeights = [f64; MONTH_BUCKETS];

/// Inclusive date filter for aggregation
///
/// Exclusion requires evidence: an occurrence without a parseable date is
/// never filtered out, only one whose date falls outside the range.
#[derive(Debug, Clone, Copy, Default, PartialEq, Eq, Serialize, Deserialize)]
pub struct DateRange {
    #[serde(skip_serializing_if = "Option::is_none")]
    pub start: Option<NaiveDate>,
    #[serde(skip_serializing_if = "Option::is_none")]
    pub end: Option<NaiveDate>,
}

impl DateRange {
    /// An unbounded range that admits everything
    pub fn unbounded() -> Self {
        Self::default()
    }

    /// Whether an occurrence with this (possibly missing) date passes the filter
    pub fn admits(&self, date: Option<NaiveDate>) -> bool {
        let Some(d) = date else {
            return true;
        };
        if self.start.is_some_and(|s| d < s) {
            return false;
        }
        if self.end.is_some_and(|e| d > e) {
            return false;
        }
        true
    }
}

/// Cell identity: the snapped center, compared at 6 decimal places
///
/// Integer microdegrees avoid floating-point key collisions the same way the
/// fixed-precision string key would.
#[derive(Debug, Clone, Copy, PartialEq, Eq, PartialOrd, Ord, Hash)]
struct GridKey {
    lat_micro: i64,
    lon_micro: i64,
}

impl GridKey {
    fn of(lat: f64, lon: f64) -> Self {
        Self {
            lat_micro: (lat * 1e6).round() as i64,
            lon_micro: (lon * 1e6).round() as i64,
        }
    }
}

/// A fixed-size geographic bucket of occurrence density
#[derive(Debug, Clone, PartialEq, Serialize, Deserialize)]
pub struct HotspotCell {
    /// Snapped cell center
    pub lat: f64,
    pub lon: f64,

    /// Primary count driving render intensity/radius. After a seasonal
    /// transform this holds the 3-month window count.
    pub count: f64,

    pub month_counts: MonthWeights,

    /// All-time total, preserved when `count` is replaced by a season count
    #[serde(skip_serializing_if = "Option::is_none")]
    pub total_count: Option<f64>,

    /// 3-month window count, set by the seasonal transform
    #[serde(skip_serializing_if = "Option::is_none")]
    pub season_count: Option<f64>,
}

impl HotspotCell {
    fn empty(lat: f64, lon: f64) -> Self {
        Self {
            lat,
            lon,
            count: 0.0,
            month_counts: [0.0; MONTH_BUCKETS],
            total_count: None,
            season_count: None,
        }
    }
}

/// A freshly aggregated or merged set of hotspot cells
///
/// Never mutated after construction; transforms produce a new set. Cells are
/// sorted descending by count so the densest cells render first (overlapping
/// markers draw smaller-first, larger-on-top).
#[derive(Debug, Clone, Default, PartialEq, Serialize, Deserialize)]
pub struct HotspotSet {
    #[serde(skip_serializing_if = "Option::is_none")]
    pub grid_km: Option<f64>,
    pub cells: Vec<HotspotCell>,
}

/// Aggregate occurrences into grid cells
///
/// Cell edge length is `grid_km` kilometers. The latitude step is
/// `grid_km / 111`; the longitude step is widened by `cos(latitude)` per
/// point so cells stay approximately square at higher latitudes. Each
/// coordinate snaps to the nearest cell center; the cell accumulates the
/// occurrence weight, and the month bucket only when the event date carries
/// a calendar month. Occurrences with invalid coordinates, or with a date
/// outside `range`, are excluded entirely.
pub fn aggregate(occurrences: &[Occurrence], grid_km: f64, range: DateRange) -> HotspotSet {
    let mut cells: BTreeMap<GridKey, HotspotCell> = BTreeMap::new();

    let lat_step = grid_km / KM_PER_DEGREE_LAT;

    for o in occurrences {
        if !o.has_valid_coords() {
            continue;
        }
        if !range.admits(o.event_date) {
            continue;
        }

        let lon_step = grid_km / (KM_PER_DEGREE_LAT * o.latitude.to_radians().cos());

        let lat_cell = (o.latitude / lat_step).round() * lat_step;
        let lon_cell = (o.longitude / lon_step).round() * lon_step;

        let w = if o.weight.is_finite() { o.weight } else { 1.0 };

        let cell = cells
            .entry(GridKey::of(lat_cell, lon_cell))
            .or_insert_with(|| HotspotCell::empty(lat_cell, lon_cell));

        cell.count += w;
        if let Some(mi) = o.month_index() {
            cell.month_counts[mi] += w;
        }
    }

    HotspotSet {
        grid_km: Some(grid_km),
        cells: sorted_by_count(cells),
    }
}

/// Merge multiple hotspot sets (e.g. all species) into one
///
/// Sums counts and month histograms of cells sharing the same snapped
/// coordinate key. Grid sizes of the inputs are not reconciled, so the
/// merged set carries none; the caller is responsible for consistency.
pub fn merge(sets: &[HotspotSet]) -> HotspotSet {
    let mut merged: BTreeMap<GridKey, HotspotCell> = BTreeMap::new();

    for hs in sets {
        for c in &hs.cells {
            let m = merged
                .entry(GridKey::of(c.lat, c.lon))
                .or_insert_with(|| HotspotCell::empty(c.lat, c.lon));
            m.count += c.count;
            for i in 0..MONTH_BUCKETS {
                m.month_counts[i] += c.month_counts[i];
            }
        }
    }

    HotspotSet {
        grid_km: None,
        cells: sorted_by_count(merged),
    }
}

/// Descending by count; equal counts keep the deterministic grid-key order
fn sorted_by_count(cells: BTreeMap<GridKey, HotspotCell>) -> Vec<HotspotCell> {
    let mut out: Vec<HotspotCell> = cells.into_values().collect();
    out.sort_by(|a, b| b.count.total_cmp(&a.count));
    out
}
