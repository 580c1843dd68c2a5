//! Dataset loading and normalization
//!
//! Reads the compact occurrence dataset (species keyed by scientific name,
//! point tuples, per-year counts) and normalizes it into `Species` records.
//! The loader is a tolerant aggregator: malformed individual fields default
//! to empty/zero; only a missing or structurally broken dataset file is
//! fatal.

pub mod gbif;

use chrono::{Datelike, Local};
use serde::Deserialize;
use std::collections::{BTreeMap, HashMap};
use std::fs;
use std::path::Path;
use tracing::{debug, info};

use crate::error::{Error, Result};
use crate::session::Region;
use crate::species::{CulinaryNotes, ImageRef, Occurrence, Species};

/// Raw compact dataset file shape
#[derive(Debug, Deserialize)]
pub struct RawDataset {
    #[serde(default)]
    pub region: Option<Region>,
    #[serde(default)]
    pub plants: BTreeMap<String, RawPlant>,
}

/// One raw plant entry, all fields optional
#[derive(Debug, Default, Deserialize)]
pub struct RawPlant {
    /// Common (German) display name
    #[serde(default, alias = "german_name")]
    pub de: Option<String>,

    #[serde(default, rename = "taxonKey")]
    pub taxon_key: Option<i64>,

    /// Point tuples: [lat, lon, year, month]
    #[serde(default)]
    pub points: Vec<RawPoint>,

    /// True global observation count (not capped to the point sample)
    #[serde(default)]
    pub total: Option<u64>,

    #[serde(default, alias = "years")]
    pub year_counts: BTreeMap<i32, u64>,

    #[serde(default)]
    pub culinary: Option<CulinaryNotes>,
}

/// A raw occurrence tuple; trailing and non-numeric entries may be absent
#[derive(Debug, Clone, Deserialize)]
pub struct RawPoint(
    #[serde(default)] pub Option<f64>,
    #[serde(default)] pub Option<f64>,
    #[serde(default)] pub Option<i32>,
    #[serde(default)] pub Option<u32>,
);

/// Normalize one raw plant entry into a `Species`
///
/// Missing coordinates become non-finite values so the record survives
/// normalization but is skipped by every distance and aggregation pass.
pub fn normalize_plant(
    sci_name: &str,
    raw: RawPlant,
    image: Option<ImageRef>,
    now_year: i32,
) -> Species {
    let occurrences: Vec<Occurrence> = raw
        .points
        .iter()
        .map(|p| {
            Occurrence::from_year_month(
                p.0.unwrap_or(f64::NAN),
                p.1.unwrap_or(f64::NAN),
                p.2,
                p.3,
            )
        })
        .collect();

    let mut species = Species::new(
        sci_name,
        raw.de.unwrap_or_default(),
        occurrences,
        now_year,
    );
    species.taxon_key = raw.taxon_key;
    species.total = raw.total;
    species.year_counts = raw.year_counts;
    species.image = image;
    species.culinary = raw.culinary;
    species
}

/// Normalize a whole raw dataset into the region and species list
pub fn normalize_dataset(
    raw: RawDataset,
    mut images: HashMap<String, ImageRef>,
    now_year: i32,
) -> (Region, Vec<Species>) {
    let region = raw.region.unwrap_or_default();

    let species = raw
        .plants
        .into_iter()
        .map(|(sci_name, plant)| {
            let image = images.remove(&sci_name);
            normalize_plant(&sci_name, plant, image, now_year)
        })
        .collect();

    (region, species)
}

/// Read an optional auxiliary JSON file, treating any failure as absence
fn read_json_or_none<T: serde::de::DeserializeOwned>(path: &Path) -> Option<T> {
    let content = fs::read_to_string(path).ok()?;
    serde_json::from_str(&content).ok()
}

/// Load and normalize the dataset from disk
///
/// `images_path`, when given, points at the optional Wikimedia image map
/// (`sciName -> image ref`); a missing or malformed images file is skipped
/// so the app still boots without it.
pub fn load_dataset(dataset_path: &Path, images_path: Option<&Path>) -> Result<(Region, Vec<Species>)> {
    let content = fs::read_to_string(dataset_path).map_err(|e| {
        Error::Dataset(format!("Failed to read {}: {}", dataset_path.display(), e))
    })?;

    let raw: RawDataset = serde_json::from_str(&content).map_err(|e| {
        Error::Dataset(format!("Failed to parse {}: {}", dataset_path.display(), e))
    })?;

    let images: HashMap<String, ImageRef> = images_path
        .and_then(read_json_or_none)
        .unwrap_or_default();
    if !images.is_empty() {
        debug!(images = images.len(), "loaded species image metadata");
    }

    let (region, species) = normalize_dataset(raw, images, Local::now().year());

    info!(
        region = %region.name,
        species = species.len(),
        "dataset loaded"
    );

    Ok((region, species))
}

#[cfg(test)]
mod tests {
    use super::*;
    use crate::species::Rarity;

    fn raw_dataset(json: &str) -> RawDataset {
        serde_json::from_str(json).unwrap()
    }

    #[test]
    fn test_normalize_plant_full() {
        let raw: RawPlant = serde_json::from_str(
            r#"{
                "de": "Bärlauch",
                "taxonKey": 2855697,
                "points": [[52.0, 13.0, 2024, 4], [52.1, 13.1, 2023, 5]],
                "total": 1234,
                "year_counts": {"2023": 400, "2024": 500}
            }"#,
        )
        .unwrap();

        let s = normalize_plant("Allium ursinum", raw, None, 2024);

        assert_eq!(s.id, "Allium ursinum");
        assert_eq!(s.common_name, "Bärlauch");
        assert_eq!(s.taxon_key, Some(2855697));
        assert_eq!(s.total, Some(1234));
        assert_eq!(s.year_counts.get(&2023), Some(&400));
        assert_eq!(s.frequency, 2);
        assert_eq!(s.month_counts_all[3], 1);
        assert_eq!(s.month_counts_all[4], 1);
        assert_eq!(s.rarity, Rarity::Unknown);
    }

    #[test]
    fn test_normalize_plant_defaults() {
        let s = normalize_plant("Urtica dioica", RawPlant::default(), None, 2024);

        assert_eq!(s.common_name, "Urtica dioica");
        assert_eq!(s.total, None);
        assert!(s.occurrences.is_empty());
        assert_eq!(s.month_counts_all, [0; 12]);
    }

    #[test]
    fn test_point_with_missing_fields() {
        let raw: RawPlant =
            serde_json::from_str(r#"{"points": [[52.0, 13.0], [null, null, 2024, 3]]}"#).unwrap();
        let s = normalize_plant("x", raw, None, 2024);

        assert_eq!(s.frequency, 2);
        // first point: no year -> no date
        assert_eq!(s.occurrences[0].event_date, None);
        assert!(s.occurrences[0].has_valid_coords());
        // second point: coords missing -> skipped by geometry passes
        assert!(!s.occurrences[1].has_valid_coords());
        assert_eq!(s.occurrences[1].month_index(), Some(2));
    }

    #[test]
    fn test_normalize_dataset_region_default() {
        let raw = raw_dataset(r#"{"plants": {}}"#);
        let (region, species) = normalize_dataset(raw, HashMap::new(), 2024);

        assert_eq!(region, Region::default());
        assert!(species.is_empty());
    }

    #[test]
    fn test_normalize_dataset_with_images() {
        let raw = raw_dataset(
            r#"{
                "region": {"name": "Leipzig", "center": {"lat": 51.34, "lon": 12.37}},
                "plants": {"Allium ursinum": {"de": "Bärlauch"}, "Urtica dioica": {}}
            }"#,
        );
        let mut images = HashMap::new();
        images.insert(
            "Allium ursinum".to_string(),
            ImageRef {
                file_path: "img/allium.jpg".to_string(),
                file_page: None,
                license: None,
                author: None,
            },
        );

        let (region, species) = normalize_dataset(raw, images, 2024);

        assert_eq!(region.name, "Leipzig");
        assert_eq!(species.len(), 2);
        // BTreeMap keys: deterministic alphabetical order
        assert_eq!(species[0].id, "Allium ursinum");
        assert!(species[0].image.is_some());
        assert!(species[1].image.is_none());
    }

    #[test]
    fn test_load_dataset_missing_file_is_fatal() {
        let err = load_dataset(Path::new("/nonexistent/data.json"), None).unwrap_err();
        assert!(matches!(err, Error::Dataset(_)));
    }

    #[test]
    fn test_load_dataset_from_disk() {
        let dir = tempfile::tempdir().unwrap();
        let data_path = dir.path().join("occurrences.json");
        fs::write(
            &data_path,
            r#"{"plants": {"Allium ursinum": {"points": [[52.0, 13.0, 2024, 4]], "total": 10}}}"#,
        )
        .unwrap();

        let (region, species) = load_dataset(&data_path, None).unwrap();
        assert_eq!(region, Region::default());
        assert_eq!(species.len(), 1);
        assert_eq!(species[0].total, Some(10));
    }

    #[test]
    fn test_load_dataset_images_optional() {
        let dir = tempfile::tempdir().unwrap();
        let data_path = dir.path().join("occurrences.json");
        fs::write(&data_path, r#"{"plants": {}}"#).unwrap();

        // images path that does not exist: still boots
        let missing = dir.path().join("images.json");
        assert!(load_dataset(&data_path, Some(&missing)).is_ok());

        // malformed images file: still boots
        fs::write(&missing, "not json").unwrap();
        assert!(load_dataset(&data_path, Some(&missing)).is_ok());
    }
}
