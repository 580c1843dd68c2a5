//! Species and occurrence data model
//!
//! A `Species` is the central entity: identity, its occurrence records, the
//! precomputed month histograms, and the per-user-location stats that the
//! ranking layer reads. Instances are created by dataset normalization and
//! mutated only through the session entry points.

pub mod rarity;

use chrono::{Datelike, NaiveDate};
use serde::{Deserialize, Serialize};
use std::collections::BTreeMap;

use crate::geo::Coordinates;

/// Number of buckets in every month histogram (calendar months, index 0 = January)
pub const MONTH_BUCKETS: usize = 12;

/// Per-species month histogram (observation counts)
pub type MonthCounts = [u32; MONTH_BUCKETS];

/// A single observed sighting of a species
///
/// Immutable once created. `weight` is a pre-aggregated observation count
/// and defaults to 1.
#[derive(Debug, Clone, PartialEq, Serialize, Deserialize)]
pub struct Occurrence {
    pub latitude: f64,
    pub longitude: f64,

    /// Event date, when the record carries one that parses
    #[serde(skip_serializing_if = "Option::is_none")]
    pub event_date: Option<NaiveDate>,

    /// Raw year/month as reported by the source; kept separately because the
    /// rolling-3-year histogram requires both to be present
    #[serde(skip_serializing_if = "Option::is_none")]
    pub year: Option<i32>,
    #[serde(skip_serializing_if = "Option::is_none")]
    pub month: Option<u32>,

    #[serde(default = "default_weight")]
    pub weight: f64,
}

fn default_weight() -> f64 {
    1.0
}

impl Occurrence {
    /// Create an occurrence with weight 1
    pub fn new(latitude: f64, longitude: f64, event_date: Option<NaiveDate>) -> Self {
        Self {
            latitude,
            longitude,
            event_date,
            year: event_date.map(|d| d.year()),
            month: event_date.map(|d| d.month()),
            weight: 1.0,
        }
    }

    /// Create an occurrence from a raw (year, month) pair
    ///
    /// A missing month defaults to January so the record still carries an
    /// event date; a missing year, or a month outside 1-12, yields no event
    /// date at all.
    pub fn from_year_month(
        latitude: f64,
        longitude: f64,
        year: Option<i32>,
        month: Option<u32>,
    ) -> Self {
        let event_date = year.and_then(|y| match month {
            Some(m) if !(1..=12).contains(&m) => None,
            m => NaiveDate::from_ymd_opt(y, m.unwrap_or(1), 1),
        });
        Self {
            latitude,
            longitude,
            event_date,
            year,
            month,
            weight: 1.0,
        }
    }

    /// Coordinates of this occurrence
    pub fn coords(&self) -> Coordinates {
        Coordinates::new(self.latitude, self.longitude)
    }

    /// Whether both coordinate components are usable numbers
    pub fn has_valid_coords(&self) -> bool {
        self.coords().is_finite()
    }

    /// Calendar month bucket (0-11) of the event date, if any
    pub fn month_index(&self) -> Option<usize> {
        self.event_date.map(|d| d.month0() as usize)
    }
}

/// Global rarity tier derived from quantiles of total observation counts
#[derive(Debug, Clone, Copy, PartialEq, Eq, Default, Serialize, Deserialize)]
pub enum Rarity {
    #[default]
    Unknown,
    Rare,
    Medium,
    Common,
}

impl std::fmt::Display for Rarity {
    fn fmt(&self, f: &mut std::fmt::Formatter<'_>) -> std::fmt::Result {
        match self {
            Self::Unknown => write!(f, "Unknown"),
            Self::Rare => write!(f, "Rare"),
            Self::Medium => write!(f, "Medium"),
            Self::Common => write!(f, "Common"),
        }
    }
}

impl std::str::FromStr for Rarity {
    type Err = String;

    fn from_str(s: &str) -> Result<Self, Self::Err> {
        match s.to_lowercase().as_str() {
            "unknown" => Ok(Self::Unknown),
            "rare" => Ok(Self::Rare),
            "medium" => Ok(Self::Medium),
            "common" => Ok(Self::Common),
            _ => Err(format!("Unknown rarity tier: {}", s)),
        }
    }
}

/// Reference to a species photo (passthrough for card/detail rendering)
#[derive(Debug, Clone, PartialEq, Serialize, Deserialize)]
pub struct ImageRef {
    #[serde(rename = "filePath")]
    pub file_path: String,
    #[serde(rename = "filePage", skip_serializing_if = "Option::is_none")]
    pub file_page: Option<String>,
    #[serde(skip_serializing_if = "Option::is_none")]
    pub license: Option<String>,
    #[serde(skip_serializing_if = "Option::is_none")]
    pub author: Option<String>,
}

/// Optional culinary and identification notes (passthrough)
#[derive(Debug, Clone, Default, PartialEq, Serialize, Deserialize)]
pub struct CulinaryNotes {
    #[serde(skip_serializing_if = "Option::is_none")]
    pub prep: Option<String>,
    #[serde(skip_serializing_if = "Option::is_none")]
    pub simple: Option<String>,
    #[serde(skip_serializing_if = "Option::is_none")]
    pub pairing: Option<String>,
    #[serde(skip_serializing_if = "Option::is_none")]
    pub id_markers: Option<String>,
    #[serde(skip_serializing_if = "Option::is_none")]
    pub lookalike_warning: Option<String>,
}

/// A plant species with its occurrence records and derived statistics
#[derive(Debug, Clone, Serialize, Deserialize)]
pub struct Species {
    /// Stable identifier (the scientific name)
    pub id: String,
    pub common_name: String,
    pub scientific_name: String,
    #[serde(skip_serializing_if = "Option::is_none")]
    pub taxon_key: Option<i64>,

    /// True global observation count (not capped to the rendered points)
    #[serde(skip_serializing_if = "Option::is_none")]
    pub total: Option<u64>,
    #[serde(default)]
    pub year_counts: BTreeMap<i32, u64>,

    /// Capped point sample for rendering and local statistics
    pub occurrences: Vec<Occurrence>,
    pub frequency: usize,

    #[serde(skip_serializing_if = "Option::is_none")]
    pub image: Option<ImageRef>,
    #[serde(skip_serializing_if = "Option::is_none")]
    pub culinary: Option<CulinaryNotes>,

    /// Computed per user location by the session
    pub local_count: u32,
    pub local_month_counts: MonthCounts,

    /// Seasonality helpers, derived from the occurrence sample
    pub month_counts_all: MonthCounts,
    pub month_counts_last3y: MonthCounts,

    pub rarity: Rarity,
}

impl Species {
    /// Build a species from normalized occurrences
    ///
    /// `now_year` anchors the rolling-3-year histogram.
    pub fn new(
        id: impl Into<String>,
        common_name: impl Into<String>,
        occurrences: Vec<Occurrence>,
        now_year: i32,
    ) -> Self {
        let id = id.into();
        let common_name = common_name.into();
        let month_counts_all = month_histogram(&occurrences);
        let month_counts_last3y = rolling_month_histogram(&occurrences, now_year);

        Self {
            scientific_name: id.clone(),
            common_name: if common_name.is_empty() {
                id.clone()
            } else {
                common_name
            },
            id,
            taxon_key: None,
            total: None,
            year_counts: BTreeMap::new(),
            frequency: occurrences.len(),
            occurrences,
            image: None,
            culinary: None,
            local_count: 0,
            local_month_counts: [0; MONTH_BUCKETS],
            month_counts_all,
            month_counts_last3y,
            rarity: Rarity::Unknown,
        }
    }

    /// Global total usable for rarity classification (positive counts only)
    pub fn usable_total(&self) -> Option<u64> {
        self.total.filter(|t| *t > 0)
    }

    /// Replace the occurrence sample wholesale (e.g. refreshed from GBIF)
    ///
    /// Recomputes `frequency` and the seasonality histograms; local stats are
    /// left to the next proximity recompute.
    pub fn replace_occurrences(&mut self, occurrences: Vec<Occurrence>, now_year: i32) {
        self.frequency = occurrences.len();
        self.month_counts_all = month_histogram(&occurrences);
        self.month_counts_last3y = rolling_month_histogram(&occurrences, now_year);
        self.occurrences = occurrences;
    }
}

/// All-time month histogram over an occurrence sample
pub fn month_histogram(occurrences: &[Occurrence]) -> MonthCounts {
    let mut counts = [0; MONTH_BUCKETS];
    for o in occurrences {
        if let Some(mi) = o.month_index() {
            counts[mi] += 1;
        }
    }
    counts
}

/// Month histogram restricted to the last three calendar years
///
/// Requires both a raw year and a valid raw month on the occurrence; records
/// missing either are left out entirely.
pub fn rolling_month_histogram(occurrences: &[Occurrence], now_year: i32) -> MonthCounts {
    let year_from = now_year - 2;
    let mut counts = [0; MONTH_BUCKETS];
    for o in occurrences {
        let (Some(y), Some(m)) = (o.year, o.month) else {
            continue;
        };
        if y < year_from || y > now_year {
            continue;
        }
        if !(1..=12).contains(&m) {
            continue;
        }
        counts[(m - 1) as usize] += 1;
    }
    counts
}
