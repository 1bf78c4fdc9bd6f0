//! The `drillrun list` command.

use std::path::PathBuf;

use anyhow::Result;
use comfy_table::{Cell, Table};

use drillrun_core::parser;

pub fn execute(dir: PathBuf) -> Result<()> {
    let scenarios = parser::load_scenario_directory(&dir)?;

    if scenarios.is_empty() {
        println!("No scenarios found in {}. Run `drillrun init` to create one.", dir.display());
        return Ok(());
    }

    let mut table = Table::new();
    table.set_header(vec!["Id", "Title", "Hazard", "Questions", "Total time"]);
    for s in &scenarios {
        let total_secs: u32 = s.questions.iter().map(|q| q.time_limit_seconds).sum();
        table.add_row(vec![
            Cell::new(&s.id),
            Cell::new(&s.title),
            Cell::new(s.hazard),
            Cell::new(s.questions.len()),
            Cell::new(format!("{total_secs}s")),
        ]);
    }

    println!("{table}");
    Ok(())
}
