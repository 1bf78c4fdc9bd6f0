//! Final score report with JSON persistence.

use std::path::Path;

use anyhow::{Context, Result};
use chrono::{DateTime, Utc};
use serde::{Deserialize, Serialize};
use uuid::Uuid;

use crate::error::DrillError;
use crate::model::{Badge, HazardType, Outcome, Scenario};
use crate::session::Session;

/// Immutable summary of one completed session.
#[derive(Debug, Clone, PartialEq, Serialize, Deserialize)]
pub struct ScoreReport {
    pub session_id: Uuid,
    pub scenario_id: String,
    pub scenario_title: String,
    pub hazard: HazardType,
    pub started_at: DateTime<Utc>,
    pub completed_at: DateTime<Utc>,
    /// `raw_score + time_bonus`.
    pub total_points: i64,
    pub raw_score: i64,
    pub time_bonus: u64,
    pub total_questions: usize,
    pub correct_count: usize,
    pub wrong_count: usize,
    pub timeout_count: usize,
    /// `correct_count / total_questions * 100`.
    pub accuracy: f64,
    pub elapsed_seconds: u64,
    pub avg_seconds_per_question: u64,
    /// Outcomes in presentation order.
    pub outcomes: Vec<Outcome>,
    /// Question ids in presentation order.
    pub question_order: Vec<u32>,
    pub badges: Vec<Badge>,
    #[serde(default)]
    pub completion_message: Option<String>,
}

impl ScoreReport {
    /// Reduce a completed session into a report.
    ///
    /// Pure: calling it again on the same session yields an identical report.
    pub fn from_session(scenario: &Scenario, session: &Session) -> Result<Self, DrillError> {
        let (Some(completed_at), true) = (session.completed_at(), session.is_complete()) else {
            return Err(DrillError::Incomplete);
        };
        let started_at = session.started_at().unwrap_or(completed_at);

        let total_questions = session.total_questions();
        let correct_count = session.correct_count();
        let elapsed_seconds = rounded_seconds(completed_at - started_at);
        let accuracy = if total_questions == 0 {
            0.0
        } else {
            correct_count as f64 / total_questions as f64 * 100.0
        };
        let avg_seconds_per_question = if total_questions == 0 {
            0
        } else {
            (elapsed_seconds as f64 / total_questions as f64).round() as u64
        };

        Ok(Self {
            session_id: session.id(),
            scenario_id: scenario.id.clone(),
            scenario_title: scenario.title.clone(),
            hazard: scenario.hazard,
            started_at,
            completed_at,
            total_points: session.raw_score() + session.time_bonus() as i64,
            raw_score: session.raw_score(),
            time_bonus: session.time_bonus(),
            total_questions,
            correct_count,
            wrong_count: session.wrong_count(),
            timeout_count: session.timeout_count(),
            accuracy,
            elapsed_seconds,
            avg_seconds_per_question,
            outcomes: session.outcomes().as_slice().to_vec(),
            question_order: session.presentation_order().iter().map(|q| q.id).collect(),
            badges: session.badges().to_vec(),
            completion_message: scenario.completion_message.clone(),
        })
    }

    /// Save the report as JSON to a file.
    pub fn save_json(&self, path: &Path) -> Result<()> {
        let json = serde_json::to_string_pretty(self).context("failed to serialize report")?;
        if let Some(parent) = path.parent() {
            std::fs::create_dir_all(parent)?;
        }
        std::fs::write(path, json)
            .with_context(|| format!("failed to write report to {}", path.display()))?;
        Ok(())
    }

    /// Load a report from a JSON file.
    pub fn load_json(path: &Path) -> Result<Self> {
        let content = std::fs::read_to_string(path)
            .with_context(|| format!("failed to read report from {}", path.display()))?;
        let report: ScoreReport =
            serde_json::from_str(&content).context("failed to parse report JSON")?;
        Ok(report)
    }

    /// File name used when saving into an output directory.
    pub fn default_file_stem(&self) -> String {
        format!(
            "{}-{}",
            self.scenario_id,
            self.completed_at.format("%Y%m%dT%H%M%SZ")
        )
    }
}

/// Load every `.json` report in a directory. Unreadable files are skipped.
pub fn load_report_directory(dir: &Path) -> Result<Vec<ScoreReport>> {
    if !dir.is_dir() {
        anyhow::bail!("not a directory: {}", dir.display());
    }

    let mut reports = Vec::new();
    for entry in std::fs::read_dir(dir)
        .with_context(|| format!("failed to read directory: {}", dir.display()))?
    {
        let path = entry?.path();
        if path.extension().is_some_and(|ext| ext == "json") {
            match ScoreReport::load_json(&path) {
                Ok(report) => reports.push(report),
                Err(e) => tracing::warn!("skipping {}: {e:#}", path.display()),
            }
        }
    }
    reports.sort_by_key(|r| r.completed_at);
    Ok(reports)
}

/// Whole seconds, rounded to nearest and clamped at zero.
fn rounded_seconds(delta: chrono::Duration) -> u64 {
    let millis = delta.num_milliseconds().max(0) as u64;
    (millis + 500) / 1000
}

#[cfg(test)]
mod tests {
    use super::*;
    use crate::model::fixtures::{scenario, shared};
    use crate::scoring::{Answer, ScoringRules};

    fn play(session: &mut Session, answers: &[Answer], remaining: u32) {
        let rules = ScoringRules::default();
        for (position, answer) in answers.iter().enumerate() {
            session.enter_question(position);
            let q = session.current_question().unwrap().clone();
            let eval = rules.evaluate(&q, position, *answer, remaining);
            session.apply(&eval).unwrap();
        }
    }

    fn finished(answers: &[Answer], remaining: u32, elapsed_ms: i64) -> (Scenario, Session) {
        let scenario = scenario(answers.len() as u32);
        let mut session = Session::new(shared(answers.len() as u32));
        let t0 = Utc::now();
        session.mark_started(t0);
        play(&mut session, answers, remaining);
        session.finish(t0 + chrono::Duration::milliseconds(elapsed_ms));
        (scenario, session)
    }

    #[test]
    fn accuracy_six_of_eight() {
        let mut answers = vec![Answer::Selected(1); 6];
        answers.push(Answer::Selected(0));
        answers.push(Answer::TimedOut);
        let (scenario, session) = finished(&answers, 0, 80_000);

        let report = ScoreReport::from_session(&scenario, &session).unwrap();

        assert_eq!(report.accuracy, 75.0);
        assert_eq!(report.correct_count, 6);
        assert_eq!(report.wrong_count, 1);
        assert_eq!(report.timeout_count, 1);
        assert_eq!(report.raw_score, 6 * 50 - 10);
        assert_eq!(report.elapsed_seconds, 80);
        assert_eq!(report.avg_seconds_per_question, 10);
    }

    #[test]
    fn total_points_adds_bonus_on_top_of_raw() {
        let (scenario, session) = finished(&[Answer::Selected(1)], 10, 1_000);
        let report = ScoreReport::from_session(&scenario, &session).unwrap();
        assert_eq!(report.raw_score, 55);
        assert_eq!(report.time_bonus, 5);
        assert_eq!(report.total_points, 60);
    }

    #[test]
    fn all_correct_with_no_time_left() {
        let (scenario, session) = finished(&[Answer::Selected(1); 8], 0, 40_000);
        let report = ScoreReport::from_session(&scenario, &session).unwrap();
        assert_eq!(report.raw_score, 400);
        assert_eq!(report.time_bonus, 0);
        assert_eq!(report.total_points, 400);
        assert_eq!(report.accuracy, 100.0);
        assert_eq!(report.wrong_count, 0);
        assert_eq!(report.timeout_count, 0);
    }

    #[test]
    fn zero_elapsed_is_not_an_error() {
        let (scenario, session) = finished(&[Answer::TimedOut], 0, 0);
        let report = ScoreReport::from_session(&scenario, &session).unwrap();
        assert_eq!(report.elapsed_seconds, 0);
        assert_eq!(report.avg_seconds_per_question, 0);
    }

    #[test]
    fn elapsed_rounds_to_nearest_second() {
        let (scenario, session) = finished(&[Answer::TimedOut, Answer::TimedOut], 0, 12_600);
        let report = ScoreReport::from_session(&scenario, &session).unwrap();
        assert_eq!(report.elapsed_seconds, 13);
        assert_eq!(report.avg_seconds_per_question, 7);
    }

    #[test]
    fn aggregation_is_idempotent() {
        let (scenario, session) = finished(&[Answer::Selected(1), Answer::Selected(2)], 4, 9_000);
        let first = ScoreReport::from_session(&scenario, &session).unwrap();
        let second = ScoreReport::from_session(&scenario, &session).unwrap();
        assert_eq!(first, second);
    }

    #[test]
    fn incomplete_session_rejected() {
        let scenario = scenario(2);
        let session = Session::new(shared(2));
        assert_eq!(
            ScoreReport::from_session(&scenario, &session),
            Err(DrillError::Incomplete)
        );
    }

    #[test]
    fn json_roundtrip_and_directory_load() {
        let (scenario, session) = finished(&[Answer::Selected(1)], 3, 2_000);
        let report = ScoreReport::from_session(&scenario, &session).unwrap();
        let dir = tempfile::tempdir().unwrap();

        report
            .save_json(&dir.path().join(format!("{}.json", report.default_file_stem())))
            .unwrap();
        std::fs::write(dir.path().join("broken.json"), "{ nope").unwrap();
        std::fs::write(dir.path().join("notes.txt"), "ignored").unwrap();

        let loaded = load_report_directory(dir.path()).unwrap();
        assert_eq!(loaded, vec![report]);
    }
}
