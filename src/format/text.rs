//! Human-readable text output formatter

use crate::config::Config;
use crate::error::Result;
use crate::format::{OutputFormatter, SelectionReport};

/// Month names for report headers
const MONTH_NAMES: [&str; 12] = [
    "January",
    "February",
    "March",
    "April",
    "May",
    "June",
    "July",
    "August",
    "September",
    "October",
    "November",
    "December",
];

/// How many hotspot cells the text view lists
const MAX_CELLS_SHOWN: usize = 5;

/// Text formatter - outputs a human-readable shortlist
pub struct TextFormatter;

impl OutputFormatter for TextFormatter {
    fn name(&self) -> &str {
        "text"
    }

    fn description(&self) -> &str {
        "Human-readable shortlist"
    }

    fn format(&self, report: &SelectionReport, _config: &Config) -> Result<String> {
        let mut output = String::new();

        let month = MONTH_NAMES[report.request.reference_month % 12];

        output.push_str(&format!("wilder shortlist ({})\n", report.id));
        output.push_str(&format!("Region: {} · {}\n", report.region.name, month));
        output.push_str(&format!(
            "You: ({:.4}, {:.4}) · radius {} km · sort {}\n\n",
            report.request.lat, report.request.lon, report.request.radius_km, report.request.sort_mode
        ));

        for entry in &report.entries {
            let total_text = match entry.total {
                Some(t) => format!("{} total", t),
                None => "total ?".to_string(),
            };
            let nearest_text = match entry.nearest_km {
                Some(d) => format!("{:.1} km", d),
                None => "no points".to_string(),
            };

            output.push_str(&format!(
                "{:3}. {} ({}) [{}]\n",
                entry.rank, entry.common_name, entry.scientific_name, entry.rarity
            ));
            output.push_str(&format!(
                "     Obs: {} near · {} · Nearest: {}\n",
                entry.local_count, total_text, nearest_text
            ));
        }

        output.push_str(&format!(
            "\nHotspots: {} cells",
            report.hotspots.cells.len()
        ));
        if let Some(grid) = report.hotspots.grid_km {
            output.push_str(&format!(" (grid {} km)", grid));
        }
        output.push('\n');

        for cell in report.hotspots.cells.iter().take(MAX_CELLS_SHOWN) {
            output.push_str(&format!(
                "  ({:.6}, {:.6}) count {}\n",
                cell.lat, cell.lon, cell.count
            ));
        }

        Ok(output)
    }
}
