//! The `drillrun run` command.

use std::io::Write;
use std::path::{Path, PathBuf};
use std::sync::Arc;

use anyhow::{Context, Result};
use tokio::io::{AsyncBufReadExt, BufReader};

use drillrun_core::engine::{AssetStatus, DrillEngine, DrillObserver, FeedbackSink, Phase};
use drillrun_core::error::DrillError;
use drillrun_core::model::{Outcome, Question};
use drillrun_core::parser;
use drillrun_core::report::ScoreReport;
use drillrun_core::scheduler::TokioScheduler;
use drillrun_core::snapshot::Resolution;
use drillrun_report::html::write_html_report;

use crate::config::load_config_from;

/// Console drill renderer.
struct ConsoleObserver {
    low_time_threshold: u32,
}

impl DrillObserver for ConsoleObserver {
    fn on_countdown(&self, remaining: u32) {
        if remaining > 0 {
            println!("  {remaining}...");
        } else {
            println!("  Go!");
        }
    }

    fn on_question_start(&self, position: usize, total: usize, question: &Question) {
        println!();
        println!("Question {}/{} ({}s)", position + 1, total, question.time_limit_seconds);
        println!("  {}", question.prompt);
        for (i, option) in question.options.iter().enumerate() {
            println!("    {}) {}", option_key(i), option);
        }
    }

    fn on_tick(&self, remaining_seconds: u32) {
        if remaining_seconds > 0 && remaining_seconds <= self.low_time_threshold {
            println!("  [{remaining_seconds}s left]");
        }
    }

    fn on_resolved(&self, resolution: &Resolution) {
        match resolution.outcome {
            Outcome::Correct => println!(
                "  Correct! +{} ({} time bonus)",
                resolution.points, resolution.time_bonus
            ),
            Outcome::Wrong => println!(
                "  Wrong. The answer was {}. {}",
                option_key(resolution.correct_index),
                resolution.points
            ),
            Outcome::Timeout => println!(
                "  Time's up. The answer was {}.",
                option_key(resolution.correct_index)
            ),
            Outcome::Pending => {}
        }
        if !resolution.explanation.is_empty() {
            println!("  {}", resolution.explanation);
        }
        for badge in &resolution.new_badges {
            println!("  Badge unlocked: {badge}");
        }
    }

    fn on_complete(&self, report: &ScoreReport) {
        println!();
        println!("Drill complete: {} points", report.total_points);
        if let Some(message) = &report.completion_message {
            println!("  {message}");
        }
    }
}

/// Terminal bell on each resolution.
struct TerminalBell;

impl TerminalBell {
    fn ring(&self, times: usize) {
        let mut stderr = std::io::stderr();
        for _ in 0..times {
            let _ = stderr.write_all(b"\x07");
        }
        let _ = stderr.flush();
    }
}

impl FeedbackSink for TerminalBell {
    fn on_correct(&self) {
        self.ring(1);
    }

    fn on_wrong(&self) {
        self.ring(2);
    }
}

/// One line of participant input.
#[derive(Debug, Clone, Copy, PartialEq, Eq)]
enum Command {
    Select(usize),
    ToggleSound,
    Retry,
    Quit,
    Help,
}

fn parse_command(line: &str) -> Option<Command> {
    let line = line.trim().to_lowercase();
    let mut chars = line.chars();
    let c = chars.next()?;
    if chars.next().is_some() {
        return Some(Command::Help);
    }
    Some(match c {
        'q' => Command::Quit,
        'r' => Command::Retry,
        's' => Command::ToggleSound,
        '1'..='9' => Command::Select(c as usize - '1' as usize),
        'a'..='z' => Command::Select(c as usize - 'a' as usize),
        _ => Command::Help,
    })
}

fn option_key(index: usize) -> char {
    (b'a' + (index % 26) as u8) as char
}

/// Which report files to write after a completed drill.
#[derive(Debug, Clone, Copy, PartialEq, Eq, Default)]
struct OutputFormats {
    json: bool,
    html: bool,
}

fn parse_formats(format: &str) -> Result<OutputFormats> {
    let mut formats = OutputFormats::default();
    for fmt in format.split(',').map(str::trim) {
        match fmt {
            "json" => formats.json = true,
            "html" => formats.html = true,
            "all" => {
                formats.json = true;
                formats.html = true;
            }
            "none" => {}
            other => anyhow::bail!("unknown format: '{other}' (expected json, html, all or none)"),
        }
    }
    Ok(formats)
}

/// Readiness of the scenario background, resolved relative to the scenario file.
fn background_status(scenario_path: &Path, background: &str) -> AssetStatus {
    if background.trim().is_empty() {
        return AssetStatus::Cached;
    }
    let base = scenario_path.parent().unwrap_or_else(|| Path::new("."));
    if base.join(background).is_file() {
        AssetStatus::Loaded
    } else {
        AssetStatus::Failed
    }
}

pub async fn execute(
    scenario_path: PathBuf,
    seed: Option<u64>,
    output: Option<PathBuf>,
    format: String,
    config_path: Option<PathBuf>,
    no_sound: bool,
) -> Result<()> {
    let formats = parse_formats(&format)?;
    let config = load_config_from(config_path.as_deref())?;
    let output = output.unwrap_or_else(|| config.output_dir.clone());

    let scenario = parser::parse_scenario(&scenario_path)?;
    for w in parser::lint_scenario(&scenario) {
        tracing::warn!(question = ?w.question_id, "{}", w.message);
    }
    let asset = background_status(&scenario_path, &scenario.background);

    println!("{} ({})", scenario.title, scenario.hazard);
    if !scenario.intro.is_empty() {
        println!("  {}", scenario.intro);
    }
    if let Some(description) = &scenario.description {
        println!("  {description}");
    }
    println!("Answer with a letter or number. s: sound on/off, r: restart, q: quit.");
    println!();

    let (scheduler, mut timers) = TokioScheduler::new();
    let observer = ConsoleObserver {
        low_time_threshold: config.engine.low_time_threshold_secs,
    };
    let mut engine = DrillEngine::new(Arc::new(scenario), config.engine.clone(), scheduler)
        .context("cannot start drill")?
        .with_observer(Box::new(observer))
        .with_feedback(Box::new(TerminalBell));
    if let Some(seed) = seed.or(config.seed) {
        engine = engine.with_seed(seed);
    }
    engine.set_feedback_enabled(config.sound && !no_sound);
    engine.asset_status(asset);

    let mut lines = BufReader::new(tokio::io::stdin()).lines();
    let mut saved_session = None;

    loop {
        tokio::select! {
            Some(id) = timers.recv() => engine.on_timer(id),
            line = lines.next_line() => {
                let Some(line) = line.context("failed to read input")? else {
                    break;
                };
                match parse_command(&line) {
                    None => continue,
                    Some(Command::Quit) => break,
                    Some(Command::ToggleSound) => {
                        let enabled = !engine.feedback_enabled();
                        engine.set_feedback_enabled(enabled);
                        println!("  Sound {}", if enabled { "on" } else { "off" });
                    }
                    Some(Command::Retry) => {
                        println!("Restarting drill.");
                        engine.retry();
                    }
                    Some(Command::Select(index)) => match engine.select_option(index) {
                        Ok(_) => {}
                        Err(DrillError::NotAccepting { phase }) => {
                            println!("  Not accepting answers while {phase}.");
                        }
                        Err(e) => println!("  {e}"),
                    },
                    Some(Command::Help) => {
                        println!("  Answer with a letter or number. s: sound on/off, r: restart, q: quit.");
                    }
                }
            }
        }

        if engine.phase() == Phase::Completed {
            if let Some(report) = engine.report() {
                if saved_session != Some(report.session_id) {
                    saved_session = Some(report.session_id);
                    print_summary(report);
                    save_report(report, &output, formats)?;
                    println!("r: try again, q: quit");
                }
            }
        }
    }

    if engine.phase() != Phase::Completed {
        println!("Drill closed.");
    }
    engine.close();
    Ok(())
}

fn save_report(report: &ScoreReport, output: &Path, formats: OutputFormats) -> Result<()> {
    let stem = report.default_file_stem();
    if formats.json {
        let path = output.join(format!("{stem}.json"));
        report.save_json(&path)?;
        eprintln!("Results saved to: {}", path.display());
    }
    if formats.html {
        let path = output.join(format!("{stem}.html"));
        write_html_report(report, &path)?;
        eprintln!("HTML report: {}", path.display());
    }
    Ok(())
}

fn print_summary(report: &ScoreReport) {
    use comfy_table::{Cell, Table};

    let mut table = Table::new();
    table.set_header(vec![
        "Points",
        "Accuracy",
        "Correct",
        "Wrong",
        "Timed out",
        "Time bonus",
        "Time",
        "Badges",
    ]);

    let badges: Vec<String> = report.badges.iter().map(|b| b.to_string()).collect();
    table.add_row(vec![
        Cell::new(report.total_points),
        Cell::new(format!("{:.1}%", report.accuracy)),
        Cell::new(report.correct_count),
        Cell::new(report.wrong_count),
        Cell::new(report.timeout_count),
        Cell::new(format!("+{}", report.time_bonus)),
        Cell::new(format!(
            "{}s ({}s avg)",
            report.elapsed_seconds, report.avg_seconds_per_question
        )),
        Cell::new(badges.join(", ")),
    ]);

    eprintln!("\n{table}");
}
