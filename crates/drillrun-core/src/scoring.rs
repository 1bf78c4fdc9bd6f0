//! Answer scoring and badge rules.
//!
//! Scoring is a pure function of the question, its position in the
//! presentation order, the answer, and the seconds left on the clock.

use serde::{Deserialize, Serialize};

use crate::error::ConfigError;
use crate::model::{Badge, Outcome, Question};

/// Tunable scoring constants.
#[derive(Debug, Clone, PartialEq, Serialize, Deserialize)]
#[serde(default)]
pub struct ScoringRules {
    /// Base points for a correct answer.
    pub correct_points: i64,
    /// Points subtracted for a wrong answer.
    pub wrong_penalty: i64,
    /// Bonus points per remaining second on a correct answer (floored).
    pub time_bonus_rate: f64,
    /// Fraction of the time limit that must remain to earn the speed badge.
    pub speed_badge_ratio: f64,
}

impl Default for ScoringRules {
    fn default() -> Self {
        Self {
            correct_points: 50,
            wrong_penalty: 10,
            time_bonus_rate: 0.5,
            speed_badge_ratio: 0.8,
        }
    }
}

/// How a question was resolved.
#[derive(Debug, Clone, Copy, PartialEq, Eq)]
pub enum Answer {
    Selected(usize),
    TimedOut,
}

/// Point deltas and unlocks produced by one resolution.
#[derive(Debug, Clone, PartialEq, Eq)]
pub struct Evaluation {
    pub outcome: Outcome,
    /// Change to the raw score, time bonus included.
    pub points: i64,
    /// Portion of `points` that came from the time bonus.
    pub time_bonus: u64,
    pub badges: Vec<Badge>,
}

impl ScoringRules {
    pub fn validate(&self) -> Result<(), ConfigError> {
        if self.correct_points < 0 {
            return Err(ConfigError::new("correct_points", "must not be negative"));
        }
        if self.wrong_penalty < 0 {
            return Err(ConfigError::new("wrong_penalty", "must not be negative"));
        }
        if !self.time_bonus_rate.is_finite() || self.time_bonus_rate < 0.0 {
            return Err(ConfigError::new(
                "time_bonus_rate",
                format!("{} is not a non-negative number", self.time_bonus_rate),
            ));
        }
        if !(0.0..=1.0).contains(&self.speed_badge_ratio) {
            return Err(ConfigError::new(
                "speed_badge_ratio",
                format!("{} is outside 0.0..=1.0", self.speed_badge_ratio),
            ));
        }
        Ok(())
    }

    /// Bonus for a correct answer with `remaining_seconds` left.
    pub fn time_bonus(&self, remaining_seconds: u32) -> u64 {
        (f64::from(remaining_seconds) * self.time_bonus_rate).floor() as u64
    }

    /// Score one resolution. `position` is the index in presentation order.
    pub fn evaluate(
        &self,
        question: &Question,
        position: usize,
        answer: Answer,
        remaining_seconds: u32,
    ) -> Evaluation {
        match answer {
            Answer::Selected(index) if question.is_correct(index) => {
                let time_bonus = self.time_bonus(remaining_seconds);
                let mut badges = Vec::new();
                if self.is_speedy(question, remaining_seconds) {
                    badges.push(Badge::SpeedDemon);
                }
                if position == 0 {
                    badges.push(Badge::FirstStrike);
                }
                Evaluation {
                    outcome: Outcome::Correct,
                    points: self.correct_points + time_bonus as i64,
                    time_bonus,
                    badges,
                }
            }
            Answer::Selected(_) => Evaluation {
                outcome: Outcome::Wrong,
                points: -self.wrong_penalty,
                time_bonus: 0,
                badges: Vec::new(),
            },
            Answer::TimedOut => Evaluation {
                outcome: Outcome::Timeout,
                points: 0,
                time_bonus: 0,
                badges: Vec::new(),
            },
        }
    }

    /// Speed badge: `remaining >= ratio * limit`, compared unrounded.
    /// A 12 s question at 0.8 needs 10 s left, since 9 < 9.6.
    fn is_speedy(&self, question: &Question, remaining_seconds: u32) -> bool {
        f64::from(remaining_seconds)
            >= self.speed_badge_ratio * f64::from(question.time_limit_seconds)
    }
}
