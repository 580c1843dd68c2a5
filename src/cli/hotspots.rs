//! Hotspots command handler
//!
//! Aggregates occurrences into grid cells and prints them, optionally
//! seasonally re-weighted or restricted to a date range.

use crate::cli::rank::{list_formats, resolve_month};
use crate::config::Config;
use crate::error::{Error, Result};
use crate::format::{build_report, get_formatter};
use crate::geo::Coordinates;
use crate::hotspot::DateRange;
use crate::rank::SortMode;
use crate::session::{HotspotScope, Session};
use chrono::NaiveDate;
use clap::Args;

/// Hotspots command arguments
#[derive(Args)]
pub struct HotspotsArgs {
    /// Latitude (defaults to the dataset region center)
    #[arg(long, requires = "lon")]
    pub lat: Option<f64>,

    /// Longitude
    #[arg(long, requires = "lat")]
    pub lon: Option<f64>,

    /// Grid cell edge length in kilometers
    #[arg(long, short = 'g')]
    pub grid_km: Option<f64>,

    /// Re-weight cells by the 3-month window around the reference month
    #[arg(long)]
    pub season: bool,

    /// Reference month 1-12 (defaults to the current month)
    #[arg(long, short = 'm')]
    pub month: Option<u32>,

    /// Aggregate every species, not just the top-N selection
    #[arg(long)]
    pub all: bool,

    /// Inclusive start date (YYYY-MM-DD)
    #[arg(long)]
    pub from: Option<NaiveDate>,

    /// Inclusive end date (YYYY-MM-DD)
    #[arg(long)]
    pub to: Option<NaiveDate>,

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

/// Run the hotspots command
pub fn run(args: HotspotsArgs) -> Result<()> {
    if args.list_formats {
        list_formats();
        return Ok(());
    }

    let mut config = Config::load()?;
    if let Some(data) = &args.data {
        config.data.dataset = data.clone();
    }

    let grid_km = args.grid_km.unwrap_or(config.defaults.grid_km);
    if !grid_km.is_finite() || grid_km <= 0.0 {
        return Err(Error::InvalidGridSize(format!(
            "Grid size must be positive, got {}",
            grid_km
        )));
    }

    let reference_month = resolve_month(args.month)?;
    let format = args.format.unwrap_or(config.defaults.format.clone());

    let mut session = Session::from_config(&config)?;

    if let (Some(lat), Some(lon)) = (args.lat, args.lon) {
        Coordinates::new(lat, lon).validate()?;
        session.update_location(lat, lon);
    }
    // the seasonal view uses the season ranking too
    if args.season {
        session.set_sort_mode(SortMode::Season);
    }
    session.recompute_selection_at(reference_month);

    let scope = if args.all {
        HotspotScope::All
    } else {
        HotspotScope::Selection
    };
    let range = DateRange {
        start: args.from,
        end: args.to,
    };

    let report = build_report(&session, grid_km, range, scope, reference_month);

    let formatter = get_formatter(&format)
        .ok_or_else(|| Error::Config(format!("Unknown format: {}", format)))?;
    let output = formatter.format(&report, &config)?;

    if let Some(path) = args.output {
        std::fs::write(&path, &output)?;
        eprintln!("Output written to {}", path);
    } else {
        println!("{}", output);
    }

    Ok(())
}
