//! Info command handler
//!
//! Prints a dataset summary: region, counts, rarity distribution.

use crate::config::Config;
use crate::error::Result;
use crate::session::Session;
use crate::species::Rarity;
use clap::Args;

/// Info command arguments
#[derive(Args)]
pub struct InfoArgs {
    /// Dataset file (overrides config)
    #[arg(long)]
    pub data: Option<String>,
}

/// Run the info command
pub fn run(args: InfoArgs) -> Result<()> {
    let mut config = Config::load()?;
    if let Some(data) = &args.data {
        config.data.dataset = data.clone();
    }

    let session = Session::from_config(&config)?;

    let occurrences: usize = session.species.iter().map(|s| s.occurrences.len()).sum();
    let with_images = session.species.iter().filter(|s| s.image.is_some()).count();

    println!("Region: {}", session.region.name);
    println!(
        "Center: ({:.4}, {:.4})",
        session.region.center.lat, session.region.center.lon
    );
    println!("Species: {}", session.species.len());
    println!("Occurrence points: {}", occurrences);
    println!("With images: {}", with_images);
    println!();

    println!("Rarity:");
    for tier in [Rarity::Common, Rarity::Medium, Rarity::Rare, Rarity::Unknown] {
        let n = session.species.iter().filter(|s| s.rarity == tier).count();
        println!("  {:8} {}", tier.to_string(), n);
    }
    println!();

    // most observed species, by true global total
    let mut by_total: Vec<_> = session
        .species
        .iter()
        .filter_map(|s| s.total.map(|t| (t, s)))
        .collect();
    by_total.sort_by(|a, b| b.0.cmp(&a.0));

    println!("Most observed:");
    for (total, s) in by_total.iter().take(5) {
        println!("  {:8} {} ({})", total, s.common_name, s.scientific_name);
    }

    Ok(())
}
