//! CLI integration tests using assert_cmd.

use assert_cmd::Command;
use chrono::{TimeZone, Utc};
use predicates::prelude::*;
use tempfile::TempDir;

use drillrun_core::model::{Badge, HazardType, Outcome};
use drillrun_core::report::ScoreReport;

fn drillrun() -> Command {
    #[allow(deprecated)]
    Command::cargo_bin("drillrun").unwrap()
}

/// A command isolated from any user or working-directory config.
fn isolated(dir: &TempDir) -> Command {
    let mut cmd = drillrun();
    cmd.current_dir(dir.path())
        .env("HOME", dir.path())
        .env_remove("DRILLRUN_SEED")
        .env_remove("DRILLRUN_SOUND");
    cmd
}

const SCENARIO: &str = r#"
[scenario]
id = "tiny"
title = "Tiny Drill"
hazard = "fire"
intro = "Smoke alarm."

[[questions]]
id = 1
prompt = "Where is the exit?"
options = ["Left", "Right"]
correct = 0
explanation = "The sign points left."
"#;

#[test]
fn validate_earthquake_scenario() {
    drillrun()
        .arg("validate")
        .arg("--scenario")
        .arg("../../scenarios/earthquake.toml")
        .assert()
        .success()
        .stdout(predicate::str::contains("8 questions"))
        .stdout(predicate::str::contains("All scenarios valid"));
}

#[test]
fn validate_directory() {
    drillrun()
        .arg("validate")
        .arg("--scenario")
        .arg("../../scenarios")
        .assert()
        .success()
        .stdout(predicate::str::contains("Earthquake Drop, Cover, Hold Drill"))
        .stdout(predicate::str::contains("Fire Evacuation Drill"))
        .stdout(predicate::str::contains("Flood Response Simulation"))
        .stdout(predicate::str::contains("Cyclone Shelter Drill"))
        .stdout(predicate::str::contains("All scenarios valid"));
}

#[test]
fn validate_reports_lint_warnings() {
    let dir = TempDir::new().unwrap();
    let path = dir.path().join("rushed.toml");
    std::fs::write(
        &path,
        SCENARIO.replace("explanation = \"The sign points left.\"", "time_limit_secs = 2"),
    )
    .unwrap();

    drillrun()
        .arg("validate")
        .arg("--scenario")
        .arg(&path)
        .assert()
        .success()
        .stdout(predicate::str::contains("[q1] WARNING: explanation is empty"))
        .stdout(predicate::str::contains("under 5s"))
        .stdout(predicate::str::contains("2 warning(s) found"));
}

#[test]
fn validate_malformed_scenario() {
    let dir = TempDir::new().unwrap();
    let path = dir.path().join("broken.toml");
    std::fs::write(&path, SCENARIO.replace("correct = 0", "correct = 5")).unwrap();

    drillrun()
        .arg("validate")
        .arg("--scenario")
        .arg(&path)
        .assert()
        .failure()
        .stderr(predicate::str::contains("out of range"));
}

#[test]
fn validate_nonexistent_file() {
    drillrun()
        .arg("validate")
        .arg("--scenario")
        .arg("nonexistent.toml")
        .assert()
        .failure()
        .stderr(predicate::str::contains("Error"));
}

#[test]
fn list_builtin_scenarios() {
    drillrun()
        .arg("list")
        .arg("--scenarios")
        .arg("../../scenarios")
        .assert()
        .success()
        .stdout(predicate::str::contains("earthquake-drop-cover-hold"))
        .stdout(predicate::str::contains("cyclone"));
}

#[test]
fn init_creates_files() {
    let dir = TempDir::new().unwrap();

    isolated(&dir)
        .arg("init")
        .assert()
        .success()
        .stdout(predicate::str::contains("Created drillrun.toml"))
        .stdout(predicate::str::contains("Created scenarios/example.toml"));

    assert!(dir.path().join("drillrun.toml").exists());
    assert!(dir.path().join("scenarios/example.toml").exists());

    isolated(&dir)
        .arg("validate")
        .arg("--scenario")
        .arg("scenarios/example.toml")
        .assert()
        .success()
        .stdout(predicate::str::contains("All scenarios valid"));
}

#[test]
fn init_skips_existing() {
    let dir = TempDir::new().unwrap();

    isolated(&dir).arg("init").assert().success();

    isolated(&dir)
        .arg("init")
        .assert()
        .success()
        .stdout(predicate::str::contains("already exists"));
}

#[test]
fn run_quit_before_start_writes_nothing() {
    let dir = TempDir::new().unwrap();
    std::fs::write(dir.path().join("tiny.toml"), SCENARIO).unwrap();
    let output = dir.path().join("results");

    isolated(&dir)
        .arg("run")
        .arg("--scenario")
        .arg("tiny.toml")
        .arg("--output")
        .arg(&output)
        .arg("--no-sound")
        .write_stdin("b\nq\n")
        .assert()
        .success()
        .stdout(predicate::str::contains("Tiny Drill (fire)"))
        .stdout(predicate::str::contains("Not accepting answers"))
        .stdout(predicate::str::contains("Drill closed."));

    assert!(!output.exists());
}

#[test]
fn run_end_of_input_closes() {
    let dir = TempDir::new().unwrap();
    std::fs::write(dir.path().join("tiny.toml"), SCENARIO).unwrap();

    isolated(&dir)
        .arg("run")
        .arg("--scenario")
        .arg("tiny.toml")
        .write_stdin("")
        .assert()
        .success()
        .stdout(predicate::str::contains("Drill closed."));
}

#[test]
fn run_rejects_unknown_format() {
    let dir = TempDir::new().unwrap();
    std::fs::write(dir.path().join("tiny.toml"), SCENARIO).unwrap();

    isolated(&dir)
        .arg("run")
        .arg("--scenario")
        .arg("tiny.toml")
        .arg("--format")
        .arg("sarif")
        .write_stdin("q\n")
        .assert()
        .failure()
        .stderr(predicate::str::contains("unknown format"));
}

#[test]
fn run_rejects_bad_config() {
    let dir = TempDir::new().unwrap();
    std::fs::write(dir.path().join("tiny.toml"), SCENARIO).unwrap();
    std::fs::write(
        dir.path().join("drillrun.toml"),
        "[engine]\ntick_interval_ms = 0\n",
    )
    .unwrap();

    isolated(&dir)
        .arg("run")
        .arg("--scenario")
        .arg("tiny.toml")
        .write_stdin("q\n")
        .assert()
        .failure()
        .stderr(predicate::str::contains("tick_interval_ms"));
}

#[test]
fn summary_of_saved_reports() {
    let dir = TempDir::new().unwrap();
    let reports = dir.path().join("reports");
    make_test_report("fire-evacuation", 120, 100.0, 1).save_json(&reports.join("a.json")).unwrap();
    make_test_report("fire-evacuation", 40, 50.0, 2).save_json(&reports.join("b.json")).unwrap();
    std::fs::write(reports.join("junk.json"), "not json").unwrap();

    drillrun()
        .arg("summary")
        .arg("--reports")
        .arg(&reports)
        .assert()
        .success()
        .stdout(predicate::str::contains("Fire Evacuation Drill"))
        .stdout(predicate::str::contains("120"))
        .stdout(predicate::str::contains("75.0%"))
        .stdout(predicate::str::contains("2 report(s) across 1 scenario(s)"));
}

#[test]
fn summary_of_empty_directory() {
    let dir = TempDir::new().unwrap();

    drillrun()
        .arg("summary")
        .arg("--reports")
        .arg(dir.path())
        .assert()
        .success()
        .stdout(predicate::str::contains("No reports found"));
}

#[test]
fn help_output() {
    drillrun()
        .arg("--help")
        .assert()
        .success()
        .stdout(predicate::str::contains("disaster-preparedness drills"));
}

#[test]
fn version_output() {
    drillrun()
        .arg("--version")
        .assert()
        .success()
        .stdout(predicate::str::contains("drillrun"));
}

fn make_test_report(scenario_id: &str, total_points: i64, accuracy: f64, minute: u32) -> ScoreReport {
    let completed_at = Utc.with_ymd_and_hms(2025, 1, 1, 12, minute, 0).unwrap();
    ScoreReport {
        session_id: uuid::Uuid::new_v4(),
        scenario_id: scenario_id.into(),
        scenario_title: "Fire Evacuation Drill".into(),
        hazard: HazardType::Fire,
        started_at: completed_at - chrono::Duration::seconds(60),
        completed_at,
        total_points,
        raw_score: total_points,
        time_bonus: 0,
        total_questions: 2,
        correct_count: (accuracy / 50.0) as usize,
        wrong_count: 0,
        timeout_count: 2 - (accuracy / 50.0) as usize,
        accuracy,
        elapsed_seconds: 60,
        avg_seconds_per_question: 30,
        outcomes: vec![Outcome::Correct, Outcome::Timeout],
        question_order: vec![1, 2],
        badges: vec![Badge::FirstStrike],
        completion_message: None,
    }
}
