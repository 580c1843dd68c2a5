//! Species selection and ranking
//!
//! Orders the full species set by a composite key relative to the user's
//! location and truncates to the top N. Two sort modes share the machinery:
//! `timeless` favors raw local density, `season` favors the 3-month window
//! around the current month.

pub mod local;

use serde::{Deserialize, Serialize};
use std::cmp::Ordering;

use crate::geo::{distance_km, Coordinates};
use crate::hotspot::season::season_window;
use crate::species::{MonthCounts, Species};

/// Active sort mode for the shortlist
#[derive(Debug, Clone, Copy, PartialEq, Eq, Default, Serialize, Deserialize)]
#[serde(rename_all = "snake_case")]
pub enum SortMode {
    /// Local density first, all-time signals as tie-breaks
    #[default]
    Timeless,
    /// Current-season relevance first
    Season,
}

impl std::fmt::Display for SortMode {
    fn fmt(&self, f: &mut std::fmt::Formatter<'_>) -> std::fmt::Result {
        match self {
            Self::Timeless => write!(f, "timeless"),
            Self::Season => write!(f, "season"),
        }
    }
}

impl std::str::FromStr for SortMode {
    type Err = String;

    fn from_str(s: &str) -> Result<Self, Self::Err> {
        match s.to_lowercase().as_str() {
            "timeless" => Ok(Self::Timeless),
            "season" | "seasonal" => Ok(Self::Season),
            _ => Err(format!("Unknown sort mode: {}", s)),
        }
    }
}

/// A species with its per-user ranking signals attached
#[derive(Debug, Clone, Copy)]
pub struct Ranked<'a> {
    pub species: &'a Species,
    /// Distance to the nearest valid-coordinate occurrence; infinite when
    /// the species has none, so it sorts last on that key
    pub nearest_km: f64,
    /// 3-month window count for the season sort
    pub seasonal_score: u32,
}

/// Minimum distance from the user to any of the species' occurrences
pub fn nearest_distance_km(species: &Species, user: Coordinates) -> f64 {
    let mut best = f64::INFINITY;
    for o in &species.occurrences {
        if !o.has_valid_coords() {
            continue;
        }
        let d = distance_km(user.lat, user.lon, o.latitude, o.longitude);
        if d < best {
            best = d;
        }
    }
    best
}

fn all_zero(h: &MonthCounts) -> bool {
    h.iter().all(|&c| c == 0)
}

/// Seasonal score: 3-month window sum around `reference_month`
///
/// Prefers the local month histogram; falls back to the rolling-3-year
/// histogram and then the all-time histogram when the preferred one is
/// all-zero.
pub fn seasonal_score(species: &Species, reference_month: usize) -> u32 {
    let histogram = if !all_zero(&species.local_month_counts) {
        &species.local_month_counts
    } else if !all_zero(&species.month_counts_last3y) {
        &species.month_counts_last3y
    } else {
        &species.month_counts_all
    };

    season_window(reference_month)
        .iter()
        .map(|&i| histogram[i])
        .sum()
}

fn total_of(s: &Species) -> u64 {
    s.total.unwrap_or(0)
}

/// The composite ordering for one sort mode
///
/// Name is the final tie-break in both modes, which makes the sort a total
/// order and the top-N cut deterministic for identical inputs.
fn compare(a: &Ranked<'_>, b: &Ranked<'_>, mode: SortMode) -> Ordering {
    match mode {
        SortMode::Timeless => b
            .species
            .local_count
            .cmp(&a.species.local_count)
            .then_with(|| a.nearest_km.total_cmp(&b.nearest_km))
            .then_with(|| total_of(b.species).cmp(&total_of(a.species)))
            .then_with(|| a.species.common_name.cmp(&b.species.common_name)),
        SortMode::Season => b
            .seasonal_score
            .cmp(&a.seasonal_score)
            .then_with(|| a.nearest_km.total_cmp(&b.nearest_km))
            .then_with(|| b.species.local_count.cmp(&a.species.local_count))
            .then_with(|| total_of(b.species).cmp(&total_of(a.species)))
            .then_with(|| a.species.common_name.cmp(&b.species.common_name)),
    }
}

/// Rank the full species set for display (no truncation)
pub fn rank_for_display<'a>(
    species: &'a [Species],
    mode: SortMode,
    user: Coordinates,
    reference_month: usize,
) -> Vec<Ranked<'a>> {
    let mut ranked: Vec<Ranked<'a>> = species
        .iter()
        .map(|s| Ranked {
            species: s,
            nearest_km: nearest_distance_km(s, user),
            seasonal_score: seasonal_score(s, reference_month),
        })
        .collect();

    ranked.sort_by(|a, b| compare(a, b, mode));
    ranked
}

/// Select the top-N species under the composite ordering
///
/// `top_n` is clamped to a minimum of 1; the result is a strict prefix of
/// the full sorted sequence.
pub fn select<'a>(
    species: &'a [Species],
    top_n: usize,
    mode: SortMode,
    user: Coordinates,
    reference_month: usize,
) -> Vec<Ranked<'a>> {
    let mut ranked = rank_for_display(species, mode, user, reference_month);
    ranked.truncate(top_n.max(1));
    ranked
}
