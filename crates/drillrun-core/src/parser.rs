//! TOML scenario parser.
//!
//! Loads scenarios from TOML files and directories, and lints them.

use std::collections::HashSet;
use std::path::Path;

use anyhow::{Context, Result};
use serde::Deserialize;

use crate::model::{HazardType, Question, Scenario};

/// Intermediate TOML structure for parsing scenario files.
#[derive(Debug, Deserialize)]
struct TomlScenarioFile {
    scenario: TomlScenarioHeader,
    #[serde(default)]
    questions: Vec<TomlQuestion>,
}

#[derive(Debug, Deserialize)]
struct TomlScenarioHeader {
    id: String,
    title: String,
    hazard: String,
    #[serde(default)]
    intro: String,
    #[serde(default)]
    description: Option<String>,
    #[serde(default)]
    background: String,
    #[serde(default)]
    completion_message: Option<String>,
    #[serde(default = "default_time_limit")]
    default_time_limit_secs: u32,
}

fn default_time_limit() -> u32 {
    15
}

#[derive(Debug, Deserialize)]
struct TomlQuestion {
    id: u32,
    prompt: String,
    options: Vec<String>,
    correct: usize,
    #[serde(default)]
    explanation: String,
    #[serde(default)]
    time_limit_secs: Option<u32>,
}

/// Parse a single TOML file into a validated `Scenario`.
pub fn parse_scenario(path: &Path) -> Result<Scenario> {
    let content = std::fs::read_to_string(path)
        .with_context(|| format!("failed to read scenario file: {}", path.display()))?;

    parse_scenario_str(&content, path)
}

/// Parse a TOML string into a validated `Scenario`.
pub fn parse_scenario_str(content: &str, source_path: &Path) -> Result<Scenario> {
    let parsed: TomlScenarioFile = toml::from_str(content)
        .with_context(|| format!("failed to parse TOML: {}", source_path.display()))?;

    let header = parsed.scenario;
    let hazard: HazardType = header
        .hazard
        .parse()
        .map_err(|e: String| anyhow::anyhow!("{}", e))?;

    let questions = parsed
        .questions
        .into_iter()
        .map(|q| Question {
            id: q.id,
            prompt: q.prompt,
            options: q.options,
            correct_index: q.correct,
            explanation: q.explanation,
            time_limit_seconds: q.time_limit_secs.unwrap_or(header.default_time_limit_secs),
        })
        .collect();

    let scenario = Scenario {
        id: header.id,
        title: header.title,
        hazard,
        intro: header.intro,
        description: header.description,
        background: header.background,
        completion_message: header.completion_message,
        questions,
    };

    scenario
        .validate()
        .with_context(|| format!("invalid scenario: {}", source_path.display()))?;

    Ok(scenario)
}

/// Recursively load all `.toml` scenario files from a directory.
///
/// Files that fail to parse or validate are logged and skipped.
pub fn load_scenario_directory(dir: &Path) -> Result<Vec<Scenario>> {
    if !dir.is_dir() {
        anyhow::bail!("not a directory: {}", dir.display());
    }

    let mut scenarios = Vec::new();
    let mut entries: Vec<_> = std::fs::read_dir(dir)
        .with_context(|| format!("failed to read directory: {}", dir.display()))?
        .collect::<std::io::Result<_>>()?;
    entries.sort_by_key(|e| e.path());

    for entry in entries {
        let path = entry.path();
        if path.is_dir() {
            scenarios.extend(load_scenario_directory(&path)?);
        } else if path.extension().is_some_and(|ext| ext == "toml") {
            match parse_scenario(&path) {
                Ok(scenario) => scenarios.push(scenario),
                Err(e) => {
                    tracing::warn!("skipping {}: {e:#}", path.display());
                }
            }
        }
    }

    Ok(scenarios)
}

/// A soft issue found while linting a scenario.
#[derive(Debug, Clone, PartialEq, Eq)]
pub struct ValidationWarning {
    /// The question ID (if applicable).
    pub question_id: Option<u32>,
    pub message: String,
}

/// Shortest time limit that does not draw a warning.
pub const MIN_COMFORTABLE_LIMIT_SECS: u32 = 5;

/// Lint a scenario for issues that do not stop a drill from running.
pub fn lint_scenario(scenario: &Scenario) -> Vec<ValidationWarning> {
    let mut warnings = Vec::new();

    if scenario.intro.trim().is_empty() {
        warnings.push(ValidationWarning {
            question_id: None,
            message: "intro is empty".into(),
        });
    }

    for q in &scenario.questions {
        let mut warn = |message: String| {
            warnings.push(ValidationWarning {
                question_id: Some(q.id),
                message,
            })
        };

        if q.prompt.trim().is_empty() {
            warn("prompt is empty".into());
        }
        if q.explanation.trim().is_empty() {
            warn("explanation is empty".into());
        }

        let mut seen = HashSet::new();
        for option in &q.options {
            if !seen.insert(option.trim().to_lowercase()) {
                warn(format!("duplicate option text: {option:?}"));
            }
        }

        if q.time_limit_seconds < MIN_COMFORTABLE_LIMIT_SECS {
            warn(format!(
                "time limit of {}s is under {MIN_COMFORTABLE_LIMIT_SECS}s",
                q.time_limit_seconds
            ));
        }
    }

    warnings
}
