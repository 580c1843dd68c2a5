//! Map URL output formatter

use crate::config::Config;
use crate::error::Result;
use crate::format::{OutputFormatter, SelectionReport};

/// URL formatter - outputs a map URL for the densest hotspot cell
///
/// Falls back to the user's position when the report has no cells. The
/// provider template comes from the `[url]` config section.
pub struct UrlFormatter;

impl OutputFormatter for UrlFormatter {
    fn name(&self) -> &str {
        "url"
    }

    fn description(&self) -> &str {
        "Map URL for the top hotspot"
    }

    fn format(&self, report: &SelectionReport, config: &Config) -> Result<String> {
        let (lat, lon) = match report.hotspots.cells.first() {
            Some(cell) => (cell.lat, cell.lon),
            None => (report.request.lat, report.request.lon),
        };

        config.format_url(None, lat, lon)
    }
}
