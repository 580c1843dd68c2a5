//! Rank command handler
//!
//! Loads the dataset, computes the ranked shortlist for a location, and
//! prints it via a formatter.

use crate::config::Config;
use crate::error::{Error, Result};
use crate::format::{available_formats, build_report, get_formatter};
use crate::geo::Coordinates;
use crate::hotspot::season::current_month_index;
use crate::hotspot::DateRange;
use crate::rank::SortMode;
use crate::session::{HotspotScope, Session};
use clap::Args;

/// Rank command arguments
#[derive(Args)]
pub struct RankArgs {
    /// Latitude (defaults to the dataset region center)
    #[arg(long, requires = "lon")]
    pub lat: Option<f64>,

    /// Longitude
    #[arg(long, requires = "lat")]
    pub lon: Option<f64>,

    /// Shortlist size
    #[arg(long, short = 'n')]
    pub top: Option<i64>,

    /// Sort mode: timeless or season
    #[arg(long, short = 's')]
    pub sort: Option<String>,

    /// Local proximity radius in kilometers
    #[arg(long, short = 'r')]
    pub radius: Option<f64>,

    /// Reference month 1-12 (defaults to the current month)
    #[arg(long, short = 'm')]
    pub month: Option<u32>,

    /// Output format
    #[arg(long, short = 'f')]
    pub format: Option<String>,

    /// Dataset file (overrides config)
    #[arg(long)]
    pub data: Option<String>,

    /// Write output to file
    #[arg(long, short = 'o')]
    pub output: Option<String>,

    /// List available formats
    #[arg(short = 'F', long = "list-formats")]
    pub list_formats: bool,
}

/// Resolve a 1-12 month argument to a 0-11 bucket index
pub(crate) fn resolve_month(month: Option<u32>) -> Result<usize> {
    match month {
        None => Ok(current_month_index()),
        Some(m) if (1..=12).contains(&m) => Ok((m - 1) as usize),
        Some(m) => Err(Error::Config(format!("Month must be 1-12, got {}", m))),
    }
}

/// Run the rank command
pub fn run(args: RankArgs) -> Result<()> {
    if args.list_formats {
        list_formats();
        return Ok(());
    }

    // Load config and apply CLI overrides
    let mut config = Config::load()?;
    if let Some(data) = &args.data {
        config.data.dataset = data.clone();
    }
    if let Some(radius) = args.radius {
        config.defaults.radius_km = radius;
    }
    if let Some(top) = args.top {
        config.defaults.top_n = top.max(1) as usize;
    }
    if let Some(sort) = &args.sort {
        sort.parse::<SortMode>().map_err(Error::Config)?;
        config.defaults.sort_mode = sort.clone();
    }

    let reference_month = resolve_month(args.month)?;
    let format = args.format.unwrap_or(config.defaults.format.clone());

    let mut session = Session::from_config(&config)?;

    if let (Some(lat), Some(lon)) = (args.lat, args.lon) {
        Coordinates::new(lat, lon).validate()?;
        session.update_location(lat, lon);
    }
    session.recompute_selection_at(reference_month);

    let report = build_report(
        &session,
        config.defaults.grid_km,
        DateRange::unbounded(),
        HotspotScope::Selection,
        reference_month,
    );

    // Format output
    let formatter = get_formatter(&format)
        .ok_or_else(|| Error::Config(format!("Unknown format: {}", format)))?;
    let output = formatter.format(&report, &config)?;

    // Write output
    if let Some(path) = args.output {
        std::fs::write(&path, &output)?;
        eprintln!("Output written to {}", path);
    } else {
        println!("{}", output);
    }

    Ok(())
}

/// Print available output formats
pub(crate) fn list_formats() {
    println!("Available output formats:");
    for format in available_formats() {
        println!("  {:6} - {}", format.name, format.description);
    }
}
