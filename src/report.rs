//! Persisting and rendering run reports.

use std::path::Path;

use tabled::settings::Style;
use tabled::{Table, Tabled};

use crate::errors::Result;
use crate::models::RunReport;

/// Placeholder shown when a plugin has no failing category.
const NO_FAILURES: &str = "-";

/// One line of the console summary.
#[derive(Debug, Tabled)]
struct SummaryRow {
    #[tabled(rename = "Plugin")]
    plugin: String,
    #[tabled(rename = "Status")]
    status: String,
    #[tabled(rename = "Failed Checks")]
    failed_checks: String,
}

/// Write the report as pretty-printed JSON, creating parent directories.
///
/// # Errors
///
/// Returns an error if the directory cannot be created or the file cannot
/// be written.
pub fn write_report(report: &RunReport, path: &Path) -> Result<()> {
    if let Some(parent) = path.parent().filter(|p| !p.as_os_str().is_empty()) {
        std::fs::create_dir_all(parent)?;
    }
    let mut json = serde_json::to_string_pretty(report)?;
    json.push('\n');
    std::fs::write(path, json)?;
    Ok(())
}

/// Render the `Plugin | Status | Failed Checks` summary table.
#[must_use]
pub fn render_table(report: &RunReport) -> String {
    let rows: Vec<SummaryRow> = report
        .entries
        .iter()
        .map(|entry| {
            let failed: Vec<&str> = entry
                .failed_categories()
                .into_iter()
                .map(|c| c.as_str())
                .collect();
            SummaryRow {
                plugin: entry.plugin.clone(),
                status: entry.status.to_string(),
                failed_checks: if failed.is_empty() {
                    NO_FAILURES.to_string()
                } else {
                    failed.join(", ")
                },
            }
        })
        .collect();

    Table::new(rows).with(Style::markdown()).to_string()
}
