//! Global rarity classification
//!
//! Assigns each species a rarity tier from quantiles of the total
//! observation counts across the whole species set. This is a full global
//! recompute every time it runs, not an incremental update.

use crate::species::{Rarity, Species};

/// Quantile of a sorted ascending sequence via linear interpolation
///
/// `pos = (n - 1) * q`; interpolates between the order statistics at
/// `floor(pos)` and `ceil(pos)` by the fractional part. Returns 0 for an
/// empty sequence.
pub fn quantile(sorted: &[f64], q: f64) -> f64 {
    if sorted.is_empty() {
        return 0.0;
    }
    let pos = (sorted.len() - 1) as f64 * q;
    let base = pos.floor() as usize;
    let rest = pos - base as f64;
    let a = sorted[base];
    let b = sorted[(base + 1).min(sorted.len() - 1)];
    a + rest * (b - a)
}

/// Classify every species into a rarity tier
///
/// Species below the 25th percentile of usable totals are `Rare`, at or
/// above the 75th are `Common`, in between `Medium`. Species without a
/// positive total are `Unknown`, as is everything when no species has a
/// usable total.
pub fn classify(species: &mut [Species]) {
    let mut totals: Vec<f64> = species
        .iter()
        .filter_map(Species::usable_total)
        .map(|t| t as f64)
        .collect();
    totals.sort_by(f64::total_cmp);

    if totals.is_empty() {
        for s in species.iter_mut() {
            s.rarity = Rarity::Unknown;
        }
        return;
    }

    let p25 = quantile(&totals, 0.25);
    let p75 = quantile(&totals, 0.75);

    for s in species.iter_mut() {
        s.rarity = match s.usable_total() {
            None => Rarity::Unknown,
            Some(t) => {
                let t = t as f64;
                if t < p25 {
                    Rarity::Rare
                } else if t >= p75 {
                    Rarity::Common
                } else {
                    Rarity::Medium
                }
            }
        };
    }
}

#[cfg(test)]
mod tests {
    use super::*;
    use approx::assert_relative_eq;

    fn species_with_total(name: &str, total: Option<u64>) -> Species {
        let mut s = Species::new(name, "", vec![], 2024);
        s.total = total;
        s
    }

    #[test]
    fn test_quantile_interpolation() {
        let totals: Vec<f64> = (1..=10).map(f64::from).collect();
        assert_relative_eq!(quantile(&totals, 0.25), 3.25);
        assert_relative_eq!(quantile(&totals, 0.75), 7.75);
    }

    #[test]
    fn test_quantile_edges() {
        let totals = [4.0];
        assert_eq!(quantile(&totals, 0.25), 4.0);
        assert_eq!(quantile(&totals, 1.0), 4.0);
        assert_eq!(quantile(&[], 0.5), 0.0);
    }

    #[test]
    fn test_classify_boundaries() {
        let mut species: Vec<Species> = (1..=10)
            .map(|t| species_with_total(&format!("sp{}", t), Some(t)))
            .collect();
        classify(&mut species);

        // p25 = 3.25, p75 = 7.75
        assert_eq!(species[2].rarity, Rarity::Rare); // total 3 < 3.25
        assert_eq!(species[4].rarity, Rarity::Medium); // total 5
        assert_eq!(species[7].rarity, Rarity::Common); // total 8 >= 7.75
    }

    #[test]
    fn test_classify_unknown_without_total() {
        let mut species = vec![
            species_with_total("a", Some(5)),
            species_with_total("b", None),
            species_with_total("c", Some(0)),
        ];
        classify(&mut species);
        assert_eq!(species[1].rarity, Rarity::Unknown);
        assert_eq!(species[2].rarity, Rarity::Unknown);
    }

    #[test]
    fn test_classify_all_unknown_when_no_usable_totals() {
        let mut species = vec![species_with_total("a", None), species_with_total("b", Some(0))];
        classify(&mut species);
        assert!(species.iter().all(|s| s.rarity == Rarity::Unknown));
    }

    #[test]
    fn test_classify_is_a_full_recompute() {
        let mut species = vec![species_with_total("a", Some(1)), species_with_total("b", Some(100))];
        classify(&mut species);
        assert_eq!(species[0].rarity, Rarity::Rare);

        // totals change, tiers follow on the next run
        species[0].total = Some(1000);
        classify(&mut species);
        assert_eq!(species[0].rarity, Rarity::Common);
    }
}
