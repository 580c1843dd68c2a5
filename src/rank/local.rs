//! Per-species local proximity statistics
//!
//! The pure scan behind the session's proximity recompute: occurrence count
//! and month histogram within a fixed radius of the user. The debounce and
//! the in-place species mutation live in the session, which owns that state.

use crate::geo::{distance_km, Coordinates};
use crate::species::{Species, MONTH_BUCKETS, MonthCounts};

/// Occurrence statistics within a radius of one position
#[derive(Debug, Clone, Copy, PartialEq, Eq)]
pub struct LocalStats {
    pub count: u32,
    pub month_counts: MonthCounts,
}

impl LocalStats {
    pub fn zero() -> Self {
        Self {
            count: 0,
            month_counts: [0; MONTH_BUCKETS],
        }
    }
}

/// Scan one species' occurrence list for points within `radius_km` of `user`
///
/// Occurrences with invalid coordinates are skipped. The month histogram is
/// accumulated from the same within-radius subset.
pub fn local_stats(species: &Species, user: Coordinates, radius_km: f64) -> LocalStats {
    let mut stats = LocalStats::zero();

    for o in &species.occurrences {
        if !o.has_valid_coords() {
            continue;
        }
        let d = distance_km(user.lat, user.lon, o.latitude, o.longitude);
        if !(d <= radius_km) {
            continue;
        }

        stats.count += 1;
        if let Some(mi) = o.month_index() {
            stats.month_counts[mi] += 1;
        }
    }

    stats
}

#[cfg(test)]
mod tests {
    use super::*;
    use crate::species::Occurrence;

    fn occ(lat: f64, lon: f64, month: u32) -> Occurrence {
        Occurrence::from_year_month(lat, lon, Some(2024), Some(month))
    }

    #[test]
    fn test_counts_points_within_radius() {
        let s = Species::new(
            "a",
            "a",
            vec![occ(52.0, 13.0, 3), occ(52.001, 13.001, 3), occ(10.0, 10.0, 3)],
            2024,
        );
        let stats = local_stats(&s, Coordinates::new(52.0, 13.0), 10.0);

        assert_eq!(stats.count, 2);
        assert_eq!(stats.month_counts[2], 2);
    }

    #[test]
    fn test_radius_is_inclusive() {
        // a point exactly at the user's position is within any radius
        let s = Species::new("a", "a", vec![occ(52.0, 13.0, 3)], 2024);
        let stats = local_stats(&s, Coordinates::new(52.0, 13.0), 0.0);
        assert_eq!(stats.count, 1);
    }

    #[test]
    fn test_invalid_coordinates_skipped() {
        let s = Species::new(
            "a",
            "a",
            vec![
                occ(52.0, 13.0, 3),
                Occurrence::from_year_month(f64::NAN, f64::NAN, Some(2024), Some(3)),
            ],
            2024,
        );
        let stats = local_stats(&s, Coordinates::new(52.0, 13.0), 10.0);
        assert_eq!(stats.count, 1);
    }

    #[test]
    fn test_dateless_points_count_without_month_bucket() {
        let s = Species::new(
            "a",
            "a",
            vec![Occurrence::from_year_month(52.0, 13.0, None, None)],
            2024,
        );
        let stats = local_stats(&s, Coordinates::new(52.0, 13.0), 10.0);

        assert_eq!(stats.count, 1);
        assert_eq!(stats.month_counts.iter().sum::<u32>(), 0);
    }

    #[test]
    fn test_empty_species() {
        let s = Species::new("a", "a", vec![], 2024);
        assert_eq!(local_stats(&s, Coordinates::new(52.0, 13.0), 10.0), LocalStats::zero());
    }
}
