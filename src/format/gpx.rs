//! GPX output formatter

use crate::config::Config;
use crate::error::Result;
use crate::format::{OutputFormatter, SelectionReport};

/// GPX formatter - outputs hotspot cells as a GPX waypoint file
pub struct GpxFormatter;

fn xml_escape(s: &str) -> String {
    s.replace('&', "&amp;")
        .replace('<', "&lt;")
        .replace('>', "&gt;")
        .replace('"', "&quot;")
        .replace('\'', "&#039;")
}

impl OutputFormatter for GpxFormatter {
    fn name(&self) -> &str {
        "gpx"
    }

    fn description(&self) -> &str {
        "GPX waypoint file of hotspot cells"
    }

    fn format(&self, report: &SelectionReport, _config: &Config) -> Result<String> {
        let mut gpx = String::new();

        // XML header
        gpx.push_str(r#"<?xml version="1.0" encoding="UTF-8"?>"#);
        gpx.push('\n');
        gpx.push_str(r#"<gpx version="1.1" creator="wilder">"#);
        gpx.push('\n');

        // Metadata
        gpx.push_str("  <metadata>\n");
        gpx.push_str(&format!(
            "    <name>wilder hotspots {} ({})</name>\n",
            xml_escape(&report.region.name),
            report.id
        ));
        gpx.push_str(&format!("    <time>{}</time>\n", report.generated_at));
        gpx.push_str("  </metadata>\n");

        // User waypoint
        gpx.push_str(&format!(
            r#"  <wpt lat="{}" lon="{}">"#,
            report.request.lat, report.request.lon
        ));
        gpx.push('\n');
        gpx.push_str("    <name>You</name>\n");
        gpx.push_str(&format!(
            "    <desc>Search origin, radius: {} km</desc>\n",
            report.request.radius_km
        ));
        gpx.push_str("  </wpt>\n");

        // One waypoint per hotspot cell, densest first
        for (i, cell) in report.hotspots.cells.iter().enumerate() {
            gpx.push_str(&format!(r#"  <wpt lat="{}" lon="{}">"#, cell.lat, cell.lon));
            gpx.push('\n');
            gpx.push_str(&format!("    <name>Hotspot {}</name>\n", i + 1));

            let mut desc = format!("count: {}", cell.count);
            if let Some(total) = cell.total_count {
                desc.push_str(&format!(", all-time: {}", total));
            }
            gpx.push_str(&format!("    <desc>{}</desc>\n", desc));

            gpx.push_str("  </wpt>\n");
        }

        gpx.push_str("</gpx>\n");
        Ok(gpx)
    }
}

#[cfg(test)]
mod tests {
    use super::*;
    use crate::format::test_fixtures::create_test_report;

    #[test]
    fn test_gpx_format() {
        let formatter = GpxFormatter;
        let report = create_test_report();
        let config = Config::default();

        let output = formatter.format(&report, &config).unwrap();

        assert!(output.contains(r#"<?xml version="1.0""#));
        assert!(output.contains(r#"<gpx version="1.1""#));
        assert!(output.contains("<wpt"));
        assert!(output.contains("<name>You</name>"));
        assert!(output.contains("Hotspot 1"));
        assert!(output.contains("</gpx>"));
    }

    #[test]
    fn test_gpx_escapes_region_name() {
        let mut report = create_test_report();
        report.region.name = "Forest & Meadow <test>".to_string();

        let output = GpxFormatter.format(&report, &Config::default()).unwrap();
        assert!(output.contains("Forest &amp; Meadow &lt;test&gt;"));
        assert!(!output.contains("Meadow <test>"));
    }

    #[test]
    fn test_gpx_formatter_info() {
        let formatter = GpxFormatter;
        assert_eq!(formatter.name(), "gpx");
        assert!(!formatter.description().is_empty());
    }
}
