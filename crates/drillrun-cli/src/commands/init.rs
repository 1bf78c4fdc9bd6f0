//! The `drillrun init` command.

use std::path::Path;

use anyhow::Result;

pub fn execute() -> Result<()> {
    // Create drillrun.toml
    if Path::new("drillrun.toml").exists() {
        println!("drillrun.toml already exists, skipping.");
    } else {
        std::fs::write("drillrun.toml", SAMPLE_CONFIG)?;
        println!("Created drillrun.toml");
    }

    // Create example scenario
    std::fs::create_dir_all("scenarios")?;
    let example_path = Path::new("scenarios/example.toml");
    if example_path.exists() {
        println!("scenarios/example.toml already exists, skipping.");
    } else {
        std::fs::write(example_path, EXAMPLE_SCENARIO)?;
        println!("Created scenarios/example.toml");
    }

    println!("\nNext steps:");
    println!("  1. Run: drillrun validate --scenario scenarios/example.toml");
    println!("  2. Run: drillrun run --scenario scenarios/example.toml");
    println!("  3. Run: drillrun summary --reports drillrun-results");

    Ok(())
}

const SAMPLE_CONFIG: &str = r#"# drillrun configuration

sound = true
output_dir = "./drillrun-results"
# seed = 42

[engine]
countdown_ticks = 3
tick_interval_ms = 1000
answer_pause_ms = 1500
timeout_pause_ms = 1000
preload_timeout_ms = 5000
low_time_threshold_secs = 5

[engine.scoring]
correct_points = 50
wrong_penalty = 10
time_bonus_rate = 0.5
speed_badge_ratio = 0.8
"#;

const EXAMPLE_SCENARIO: &str = r#"[scenario]
id = "example-kitchen-fire"
title = "Kitchen Fire"
hazard = "fire"
intro = "A pan of oil on the stove has caught fire."
completion_message = "Practice your home escape plan twice a year."
default_time_limit_secs = 15

[[questions]]
id = 1
prompt = "Flames are rising from a pan of oil. What do you do first?"
options = ["Pour water on it", "Cover it with a lid and turn off the heat", "Carry the pan outside"]
correct = 1
explanation = "Water makes burning oil splatter. Smother the flames and cut the heat."

[[questions]]
id = 2
prompt = "The fire spreads to the cabinets. What now?"
options = ["Get everyone out and call emergency services", "Fetch more water", "Open the windows"]
correct = 0
explanation = "Once a fire spreads beyond the pan, leave and call for help from outside."

[[questions]]
id = 3
prompt = "The hallway is filling with smoke. How do you move?"
options = ["Walk upright quickly", "Crawl low under the smoke", "Wait for the smoke to clear"]
correct = 1
explanation = "Cleaner air is near the floor."
time_limit_secs = 10
"#;
