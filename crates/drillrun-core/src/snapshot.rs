//! Read model for rendering a drill in progress.

use serde::Serialize;

use crate::engine::Phase;
use crate::model::{Badge, Outcome};

/// What happened when a question resolved.
#[derive(Debug, Clone, PartialEq, Eq, Serialize)]
pub struct Resolution {
    /// Index in presentation order.
    pub position: usize,
    pub question_id: u32,
    /// `None` for a timeout.
    pub selected: Option<usize>,
    pub correct_index: usize,
    pub outcome: Outcome,
    /// Raw score change, time bonus included.
    pub points: i64,
    pub time_bonus: u64,
    pub remaining_seconds: u32,
    /// Badges first unlocked by this resolution.
    pub new_badges: Vec<Badge>,
    pub explanation: String,
}

/// One cell of the segmented progress bar.
#[derive(Debug, Clone, Copy, PartialEq, Eq, Serialize)]
#[serde(rename_all = "lowercase")]
pub enum Segment {
    Pending,
    /// The open, unanswered question.
    Current,
    Correct,
    Wrong,
    Timeout,
}

/// Point-in-time view of the engine, polled after each tick or input.
#[derive(Debug, Clone, PartialEq, Serialize)]
pub struct DrillSnapshot {
    pub phase: Phase,
    /// Lead-in value while counting down.
    pub countdown: Option<u32>,
    pub current_index: usize,
    pub total_questions: usize,
    pub remaining_seconds: u32,
    pub time_limit_seconds: u32,
    pub low_time_threshold_secs: u32,
    pub outcomes: Vec<Outcome>,
    pub raw_score: i64,
    pub time_bonus: u64,
    pub badges: Vec<Badge>,
    /// Feedback for the question being shown in `Resolving`.
    pub last_resolution: Option<Resolution>,
}

impl DrillSnapshot {
    /// Share of questions already passed, `0.0..=100.0`.
    pub fn progress_percent(&self) -> f64 {
        if self.total_questions == 0 {
            return 0.0;
        }
        self.current_index.min(self.total_questions) as f64 / self.total_questions as f64 * 100.0
    }

    /// Remaining share of the current question's budget, `0.0..=1.0`.
    pub fn time_fraction(&self) -> f64 {
        if self.time_limit_seconds == 0 {
            return 0.0;
        }
        (f64::from(self.remaining_seconds) / f64::from(self.time_limit_seconds)).clamp(0.0, 1.0)
    }

    pub fn is_low_time(&self) -> bool {
        self.phase == Phase::Active && self.remaining_seconds <= self.low_time_threshold_secs
    }

    pub fn segments(&self) -> Vec<Segment> {
        self.outcomes
            .iter()
            .enumerate()
            .map(|(i, outcome)| match outcome {
                Outcome::Correct => Segment::Correct,
                Outcome::Wrong => Segment::Wrong,
                Outcome::Timeout => Segment::Timeout,
                Outcome::Pending if i == self.current_index && self.phase == Phase::Active => {
                    Segment::Current
                }
                Outcome::Pending => Segment::Pending,
            })
            .collect()
    }
}
