//! Session state and recomputation pipeline
//!
//! The `Session` is the single owner of all shared mutable state: the
//! species collection, the user's position, filters, and the current
//! selection. Mutation always goes through the entry points here so the
//! derived stats stay consistent — a location update runs, in order,
//! local-proximity recompute, then selection re-ranking.

use chrono::Datelike;
use serde::{Deserialize, Serialize};
use std::collections::HashMap;
use std::path::Path;
use tracing::debug;

use crate::config::Config;
use crate::error::Result;
use crate::species::Occurrence;

use crate::geo::{distance_km, Coordinates};
use crate::hotspot::season::{current_month_index, seasonalize};
use crate::hotspot::{aggregate, merge, DateRange, HotspotSet};
use crate::rank::{self, local::local_stats, SortMode};
use crate::species::{rarity, Species};

/// Which species feed a hotspot aggregation
#[derive(Debug, Clone, Copy, PartialEq, Eq)]
pub enum HotspotScope {
    /// Only the current top-N selection
    Selection,
    /// Every loaded species
    All,
}

/// Named region the dataset covers
#[derive(Debug, Clone, PartialEq, Serialize, Deserialize)]
pub struct Region {
    pub name: String,
    pub center: Coordinates,
}

impl Default for Region {
    fn default() -> Self {
        Self {
            name: "Germany (offline)".to_string(),
            center: Coordinates::new(51.3397, 12.3731),
        }
    }
}

/// Which map visualization is active
#[derive(Debug, Clone, Copy, PartialEq, Eq, Serialize, Deserialize)]
#[serde(rename_all = "snake_case")]
pub enum VizMode {
    Hotspots,
    Points,
}

/// User-facing knobs for selection and visualization
#[derive(Debug, Clone, Copy, PartialEq, Eq, Serialize, Deserialize)]
pub struct Filters {
    /// Size of the shortlist (minimum 1)
    pub top_n: usize,
    pub sort_mode: SortMode,
    pub viz_hotspots: bool,
    pub viz_points: bool,
}

impl Default for Filters {
    fn default() -> Self {
        Self {
            top_n: 12,
            sort_mode: SortMode::Timeless,
            viz_hotspots: true,
            viz_points: false,
        }
    }
}

impl Filters {
    /// Policy rule: never render nothing — with both visualization modes
    /// off, hotspots are forced back on.
    pub fn ensure_viz_visible(&mut self) {
        if !self.viz_hotspots && !self.viz_points {
            self.viz_hotspots = true;
        }
    }

    /// Policy rule: with both visualization modes on, hotspots wins.
    pub fn active_viz(&self) -> VizMode {
        if self.viz_hotspots {
            VizMode::Hotspots
        } else {
            VizMode::Points
        }
    }
}

/// Process-wide session state, re-derived deterministically from the
/// species set, the user position, and the configuration
#[derive(Debug, Clone)]
pub struct Session {
    pub species: Vec<Species>,
    pub region: Region,
    pub filters: Filters,

    /// Radius for local proximity statistics
    pub radius_km: f64,
    /// Minimum displacement before local stats are recomputed
    pub movement_threshold_km: f64,

    user: Coordinates,
    selected: Vec<String>,
    last_stats_location: Option<Coordinates>,
}

impl Session {
    /// Create an empty session centered on the region
    pub fn new(region: Region, radius_km: f64, movement_threshold_km: f64) -> Self {
        let user = region.center;
        Self {
            species: Vec::new(),
            region,
            filters: Filters::default(),
            radius_km,
            movement_threshold_km,
            user,
            selected: Vec::new(),
            last_stats_location: None,
        }
    }

    /// Build a session from configuration, loading the dataset from disk
    ///
    /// A dataset load failure is fatal to boot; the optional images file is
    /// not.
    pub fn from_config(config: &Config) -> Result<Self> {
        let (region, species) = crate::dataset::load_dataset(
            Path::new(&config.data.dataset),
            Some(Path::new(&config.data.images)),
        )?;

        let mut session = Self::new(
            region,
            config.defaults.radius_km,
            config.defaults.movement_threshold_km,
        );
        session.filters.top_n = config.defaults.top_n.max(1);
        session.filters.sort_mode = config
            .defaults
            .sort_mode
            .parse()
            .map_err(crate::error::Error::Config)?;
        session.filters.viz_hotspots = config.viz.hotspots;
        session.filters.viz_points = config.viz.points;
        session.filters.ensure_viz_visible();

        session.set_species(species);
        Ok(session)
    }

    /// Whether a dataset has been loaded
    pub fn is_loaded(&self) -> bool {
        !self.species.is_empty()
    }

    /// Current user position
    pub fn user(&self) -> Coordinates {
        self.user
    }

    /// Ids of the currently selected top-N species, in rank order
    pub fn selection_ids(&self) -> &[String] {
        &self.selected
    }

    /// The currently selected species, in rank order
    pub fn selected_species(&self) -> Vec<&Species> {
        self.selected
            .iter()
            .filter_map(|id| self.find(id))
            .collect()
    }

    /// Look up a species by id
    pub fn find(&self, id: &str) -> Option<&Species> {
        self.species.iter().find(|s| s.id == id)
    }

    /// Replace the whole species set (dataset load or reload)
    ///
    /// Runs the load pipeline: rarity classification, initial local stats,
    /// initial selection.
    pub fn set_species(&mut self, species: Vec<Species>) {
        self.species = species;
        self.last_stats_location = None;

        rarity::classify(&mut self.species);
        self.recompute_local_stats_if_moved();
        self.recompute_selection();

        debug!(
            species = self.species.len(),
            selected = self.selected.len(),
            "dataset loaded into session"
        );
    }

    /// Handle a user location update
    ///
    /// Fixed pipeline: move, recompute local stats (debounced), re-rank.
    /// Returns whether local stats were actually recomputed.
    pub fn update_location(&mut self, lat: f64, lon: f64) -> bool {
        self.user = Coordinates::new(lat, lon);
        let recomputed = self.recompute_local_stats_if_moved();
        self.recompute_selection();
        recomputed
    }

    /// Recompute every species' local stats unless the user has not moved
    /// meaningfully since the last computation
    ///
    /// The debounce compares haversine displacement from the last computed
    /// location against the movement threshold, absorbing GPS jitter.
    /// A recompute fully replaces each species' local count and histogram
    /// and updates the last-computed-location marker.
    pub fn recompute_local_stats_if_moved(&mut self) -> bool {
        if let Some(prev) = self.last_stats_location {
            let moved = distance_km(prev.lat, prev.lon, self.user.lat, self.user.lon);
            if moved < self.movement_threshold_km {
                return false;
            }
        }

        self.last_stats_location = Some(self.user);

        for s in &mut self.species {
            let stats = local_stats(s, self.user, self.radius_km);
            s.local_count = stats.count;
            s.local_month_counts = stats.month_counts;
        }

        debug!(
            lat = self.user.lat,
            lon = self.user.lon,
            radius_km = self.radius_km,
            "recomputed local proximity stats"
        );
        true
    }

    /// Re-rank and cut the selection to the current top-N
    pub fn recompute_selection(&mut self) {
        self.recompute_selection_at(current_month_index());
    }

    /// Re-rank with an explicit reference month (the season sort's window)
    pub fn recompute_selection_at(&mut self, reference_month: usize) {
        let ranked = rank::select(
            &self.species,
            self.filters.top_n,
            self.filters.sort_mode,
            self.user,
            reference_month,
        );
        self.selected = ranked.iter().map(|r| r.species.id.clone()).collect();
    }

    /// Change the shortlist size; values below 1 clamp to 1
    pub fn set_top_n(&mut self, top_n: i64) {
        self.filters.top_n = top_n.max(1) as usize;
        self.recompute_selection();
    }

    /// Change the sort mode and re-rank
    pub fn set_sort_mode(&mut self, mode: SortMode) {
        self.filters.sort_mode = mode;
        self.recompute_selection();
    }

    /// Apply occurrence samples refreshed from a remote source
    ///
    /// Replaces the sample of every species whose taxon key appears in the
    /// map, then re-derives local stats and the selection. Returns how many
    /// species were updated.
    pub fn apply_refreshed_occurrences(
        &mut self,
        by_taxon_key: &HashMap<i64, Vec<Occurrence>>,
    ) -> usize {
        let now_year = chrono::Local::now().year();
        let mut updated = 0;

        for s in &mut self.species {
            let Some(key) = s.taxon_key else {
                continue;
            };
            if let Some(occurrences) = by_taxon_key.get(&key) {
                s.replace_occurrences(occurrences.clone(), now_year);
                updated += 1;
            }
        }

        if updated > 0 {
            // samples changed under the debounce marker: force a rescan
            self.last_stats_location = None;
            self.recompute_local_stats_if_moved();
            self.recompute_selection();
        }

        updated
    }

    /// Aggregate and merge hotspot cells for a render request
    ///
    /// Builds one grid per species, merges them, and applies the seasonal
    /// transform when `seasonal_month` is given. Produced fresh on every
    /// call; nothing is cached.
    pub fn hotspot_set(
        &self,
        grid_km: f64,
        range: DateRange,
        scope: HotspotScope,
        seasonal_month: Option<usize>,
    ) -> HotspotSet {
        let species: Vec<&Species> = match scope {
            HotspotScope::Selection => self.selected_species(),
            HotspotScope::All => self.species.iter().collect(),
        };

        let sets: Vec<HotspotSet> = species
            .iter()
            .map(|s| aggregate(&s.occurrences, grid_km, range))
            .collect();
        let merged = merge(&sets);

        match seasonal_month {
            Some(m) => seasonalize(&merged, m),
            None => merged,
        }
    }
}
