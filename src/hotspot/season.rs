//! Seasonal re-weighting of hotspot cells
//!
//! Replaces each cell's count with a 3-month rolling-window count around a
//! reference month so map intensity reflects current-season relevance
//! instead of all-time volume.

use chrono::{Datelike, Local};

use crate::hotspot::{HotspotCell, HotspotSet};

/// The circular 3-month window around a reference month (indices 0-11)
pub fn season_window(reference_month: usize) -> [usize; 3] {
    let m = reference_month % 12;
    [(m + 11) % 12, m, (m + 1) % 12]
}

/// Current calendar month as a 0-11 bucket index
pub fn current_month_index() -> usize {
    Local::now().month0() as usize
}

/// Re-weight a hotspot set by the 3-month window around `reference_month`
///
/// Each cell's `count` becomes the window sum; the all-time total moves to
/// `total_count` (kept for popup text). Cells with nothing in the window are
/// not dropped, only pushed to the bottom by the re-sort.
pub fn seasonalize(set: &HotspotSet, reference_month: usize) -> HotspotSet {
    let window = season_window(reference_month);

    let mut cells: Vec<HotspotCell> = set
        .cells
        .iter()
        .map(|c| {
            let season: f64 = window.iter().map(|&i| c.month_counts[i]).sum();
            HotspotCell {
                count: season,
                total_count: Some(c.total_count.unwrap_or(c.count)),
                season_count: Some(season),
                ..c.clone()
            }
        })
        .collect();

    cells.sort_by(|a, b| b.count.total_cmp(&a.count));

    HotspotSet {
        grid_km: set.grid_km,
        cells,
    }
}

#[cfg(test)]
mod tests {
    use super::*;
    use crate::hotspot::{aggregate, DateRange};
    use crate::species::Occurrence;
    use approx::assert_relative_eq;

    fn occ(lat: f64, lon: f64, month: u32) -> Occurrence {
        Occurrence::from_year_month(lat, lon, Some(2024), Some(month))
    }

    #[test]
    fn test_season_window_wraps() {
        assert_eq!(season_window(0), [11, 0, 1]); // January
        assert_eq!(season_window(11), [10, 11, 0]); // December
        assert_eq!(season_window(5), [4, 5, 6]); // June
    }

    #[test]
    fn test_seasonalize_replaces_count_and_keeps_total() {
        // one cell: March x2, July x1
        let set = aggregate(
            &[occ(52.0, 13.0, 3), occ(52.0005, 13.0005, 3), occ(52.0003, 13.0003, 7)],
            1.0,
            DateRange::unbounded(),
        );
        assert_eq!(set.cells.len(), 1);

        // reference March (index 2): window Feb-Apr
        let seasonal = seasonalize(&set, 2);
        let cell = &seasonal.cells[0];

        assert_relative_eq!(cell.count, 2.0);
        assert_eq!(cell.season_count, Some(2.0));
        assert_eq!(cell.total_count, Some(3.0));

        // the original set is untouched
        assert_relative_eq!(set.cells[0].count, 3.0);
        assert_eq!(set.cells[0].total_count, None);
    }

    #[test]
    fn test_out_of_season_cells_sink_but_survive() {
        // cell A: 1 point in March; cell B: 3 points in October
        let set = aggregate(
            &[
                occ(52.0, 13.0, 3),
                occ(10.0, 10.0, 10),
                occ(10.0005, 10.0005, 10),
                occ(10.0003, 10.0003, 10),
            ],
            1.0,
            DateRange::unbounded(),
        );
        assert_relative_eq!(set.cells[0].count, 3.0); // October cell on top

        let seasonal = seasonalize(&set, 2); // March window
        assert_eq!(seasonal.cells.len(), 2);
        assert_relative_eq!(seasonal.cells[0].count, 1.0); // March cell now first
        assert_relative_eq!(seasonal.cells[1].count, 0.0); // October cell kept at 0
        assert_eq!(seasonal.cells[1].total_count, Some(3.0));
    }

    #[test]
    fn test_reference_month_out_of_range_wraps() {
        assert_eq!(season_window(12), [11, 0, 1]);
        assert_eq!(season_window(14), [1, 2, 3]);
    }
}
