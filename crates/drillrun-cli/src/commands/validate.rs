//! The `drillrun validate` command.

use std::path::PathBuf;

use anyhow::Result;

use drillrun_core::parser;

pub fn execute(scenario_path: PathBuf) -> Result<()> {
    let scenarios = if scenario_path.is_dir() {
        parser::load_scenario_directory(&scenario_path)?
    } else {
        vec![parser::parse_scenario(&scenario_path)?]
    };

    if scenarios.is_empty() {
        anyhow::bail!("no valid scenarios found in {}", scenario_path.display());
    }

    let mut total_warnings = 0;

    for scenario in &scenarios {
        println!(
            "Scenario: {} [{}] ({} questions)",
            scenario.title,
            scenario.hazard,
            scenario.questions.len()
        );

        let warnings = parser::lint_scenario(scenario);
        for w in &warnings {
            let prefix = w
                .question_id
                .map(|id| format!("  [q{id}]"))
                .unwrap_or_else(|| "  ".to_string());
            println!("{prefix} WARNING: {}", w.message);
        }
        total_warnings += warnings.len();
    }

    if total_warnings == 0 {
        println!("All scenarios valid.");
    } else {
        println!("\n{total_warnings} warning(s) found.");
    }

    Ok(())
}
