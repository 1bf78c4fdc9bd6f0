//! The `drillrun summary` command.

use std::path::PathBuf;

use anyhow::Result;
use comfy_table::{Cell, Table};

use drillrun_core::report::load_report_directory;
use drillrun_core::statistics::summarize_reports;

pub fn execute(reports_dir: PathBuf) -> Result<()> {
    let reports = load_report_directory(&reports_dir)?;
    if reports.is_empty() {
        println!("No reports found in {}.", reports_dir.display());
        return Ok(());
    }

    let stats = summarize_reports(&reports);

    let mut table = Table::new();
    table.set_header(vec![
        "Scenario",
        "Hazard",
        "Attempts",
        "Best",
        "Mean",
        "Best accuracy",
        "Mean accuracy",
        "Timeouts",
        "Badges",
    ]);
    for s in stats.values() {
        let badges: Vec<String> = s.badges.iter().map(|b| b.to_string()).collect();
        table.add_row(vec![
            Cell::new(&s.scenario_title),
            Cell::new(s.hazard),
            Cell::new(s.attempts),
            Cell::new(s.best_points),
            Cell::new(format!("{:.1}", s.mean_points)),
            Cell::new(format!("{:.1}%", s.best_accuracy)),
            Cell::new(format!("{:.1}%", s.mean_accuracy)),
            Cell::new(s.total_timeouts),
            Cell::new(badges.join(", ")),
        ]);
    }

    println!("{table}");
    println!("{} report(s) across {} scenario(s).", reports.len(), stats.len());
    Ok(())
}
