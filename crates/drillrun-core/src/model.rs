//! Core data model types for drillrun.
//!
//! A [`Scenario`] is the static, externally authored definition of one drill.
//! The engine reads it but never mutates it.

use std::collections::HashSet;
use std::fmt;
use std::str::FromStr;

use serde::{Deserialize, Serialize};

use crate::error::ScenarioError;

/// A single timed multiple-choice question.
#[derive(Debug, Clone, PartialEq, Eq, Serialize, Deserialize)]
pub struct Question {
    /// Unique identifier within the scenario.
    pub id: u32,
    /// The question text.
    pub prompt: String,
    /// Answer choices, in display order.
    pub options: Vec<String>,
    /// Index into `options` of the correct choice.
    pub correct_index: usize,
    /// Shown once the question has resolved.
    #[serde(default)]
    pub explanation: String,
    /// Countdown budget for this question.
    pub time_limit_seconds: u32,
}

impl Question {
    /// Returns `true` if `index` is the correct option.
    pub fn is_correct(&self, index: usize) -> bool {
        index == self.correct_index
    }

    /// The correct option's text.
    pub fn correct_option(&self) -> Option<&str> {
        self.options.get(self.correct_index).map(String::as_str)
    }

    fn validate(&self) -> Result<(), ScenarioError> {
        if self.options.len() < 2 {
            return Err(ScenarioError::TooFewOptions {
                question_id: self.id,
                count: self.options.len(),
            });
        }
        if self.correct_index >= self.options.len() {
            return Err(ScenarioError::CorrectIndexOutOfRange {
                question_id: self.id,
                index: self.correct_index,
                count: self.options.len(),
            });
        }
        if self.time_limit_seconds == 0 {
            return Err(ScenarioError::ZeroTimeLimit {
                question_id: self.id,
            });
        }
        Ok(())
    }
}

/// The hazard a drill prepares for.
#[derive(Debug, Clone, Copy, PartialEq, Eq, Hash, Serialize, Deserialize)]
#[serde(rename_all = "lowercase")]
pub enum HazardType {
    Earthquake,
    Fire,
    Flood,
    Cyclone,
}

impl fmt::Display for HazardType {
    fn fmt(&self, f: &mut fmt::Formatter<'_>) -> fmt::Result {
        match self {
            HazardType::Earthquake => write!(f, "earthquake"),
            HazardType::Fire => write!(f, "fire"),
            HazardType::Flood => write!(f, "flood"),
            HazardType::Cyclone => write!(f, "cyclone"),
        }
    }
}

impl FromStr for HazardType {
    type Err = String;

    fn from_str(s: &str) -> Result<Self, Self::Err> {
        match s.to_lowercase().as_str() {
            "earthquake" | "quake" => Ok(HazardType::Earthquake),
            "fire" => Ok(HazardType::Fire),
            "flood" => Ok(HazardType::Flood),
            "cyclone" | "hurricane" | "typhoon" => Ok(HazardType::Cyclone),
            other => Err(format!("unknown hazard type: {other}")),
        }
    }
}

/// A complete drill definition.
#[derive(Debug, Clone, PartialEq, Serialize, Deserialize)]
pub struct Scenario {
    pub id: String,
    pub title: String,
    pub hazard: HazardType,
    /// Text shown before the countdown.
    #[serde(default)]
    pub intro: String,
    #[serde(default)]
    pub description: Option<String>,
    /// Reference to the background asset preloaded before the drill.
    #[serde(default)]
    pub background: String,
    #[serde(default)]
    pub completion_message: Option<String>,
    /// Questions in authored order. Presentation order is shuffled per session.
    pub questions: Vec<Question>,
}

impl Scenario {
    /// Check the structural invariants the engine relies on.
    ///
    /// Fails on the first problem found; nothing is coerced.
    pub fn validate(&self) -> Result<(), ScenarioError> {
        if self.questions.is_empty() {
            return Err(ScenarioError::NoQuestions(self.id.clone()));
        }

        let mut seen_ids = HashSet::new();
        for question in &self.questions {
            if !seen_ids.insert(question.id) {
                return Err(ScenarioError::DuplicateQuestionId(question.id));
            }
            question.validate()?;
        }

        Ok(())
    }

    /// Look up a question by id.
    pub fn question(&self, id: u32) -> Option<&Question> {
        self.questions.iter().find(|q| q.id == id)
    }
}

/// The resolved status of one question slot.
#[derive(Debug, Clone, Copy, PartialEq, Eq, Hash, Default, Serialize, Deserialize)]
#[serde(rename_all = "lowercase")]
pub enum Outcome {
    #[default]
    Pending,
    Correct,
    Wrong,
    Timeout,
}

impl Outcome {
    pub fn is_resolved(self) -> bool {
        self != Outcome::Pending
    }
}

impl fmt::Display for Outcome {
    fn fmt(&self, f: &mut fmt::Formatter<'_>) -> fmt::Result {
        match self {
            Outcome::Pending => write!(f, "pending"),
            Outcome::Correct => write!(f, "correct"),
            Outcome::Wrong => write!(f, "wrong"),
            Outcome::Timeout => write!(f, "timeout"),
        }
    }
}

/// Achievements unlocked during a session. Never revoked once earned.
#[derive(Debug, Clone, Copy, PartialEq, Eq, Hash, PartialOrd, Ord, Serialize, Deserialize)]
#[serde(rename_all = "snake_case")]
pub enum Badge {
    /// Correct answer with most of the time budget left.
    SpeedDemon,
    /// The first presented question answered correctly.
    FirstStrike,
}

impl Badge {
    pub fn label(self) -> &'static str {
        match self {
            Badge::SpeedDemon => "⚡ Speed Demon",
            Badge::FirstStrike => "🎯 First Strike",
        }
    }
}

impl fmt::Display for Badge {
    fn fmt(&self, f: &mut fmt::Formatter<'_>) -> fmt::Result {
        f.write_str(self.label())
    }
}


#[cfg(test)]
mod tests {
    use super::fixtures::*;
    use super::*;

    #[test]
    fn hazard_display_and_parse() {
        assert_eq!(HazardType::Flood.to_string(), "flood");
        assert_eq!("Earthquake".parse::<HazardType>().unwrap(), HazardType::Earthquake);
        assert_eq!("typhoon".parse::<HazardType>().unwrap(), HazardType::Cyclone);
        assert!("tornado".parse::<HazardType>().is_err());
    }

    #[test]
    fn valid_scenario_passes() {
        assert!(scenario(8).validate().is_ok());
    }

    #[test]
    fn empty_scenario_rejected() {
        let s = scenario(0);
        assert_eq!(
            s.validate(),
            Err(ScenarioError::NoQuestions("test-drill".into()))
        );
    }

    #[test]
    fn out_of_range_correct_index_rejected() {
        let mut s = scenario(2);
        s.questions[1].correct_index = 4;
        assert!(matches!(
            s.validate(),
            Err(ScenarioError::CorrectIndexOutOfRange {
                question_id: 2,
                index: 4,
                count: 4
            })
        ));
    }

    #[test]
    fn zero_time_limit_rejected() {
        let mut s = scenario(2);
        s.questions[0].time_limit_seconds = 0;
        assert_eq!(
            s.validate(),
            Err(ScenarioError::ZeroTimeLimit { question_id: 1 })
        );
    }

    #[test]
    fn single_option_rejected() {
        let mut s = scenario(1);
        s.questions[0].options.truncate(1);
        s.questions[0].correct_index = 0;
        assert!(matches!(
            s.validate(),
            Err(ScenarioError::TooFewOptions { count: 1, .. })
        ));
    }

    #[test]
    fn duplicate_question_ids_rejected() {
        let mut s = scenario(3);
        s.questions[2].id = 1;
        assert_eq!(s.validate(), Err(ScenarioError::DuplicateQuestionId(1)));
    }

    #[test]
    fn badge_serializes_snake_case() {
        let json = serde_json::to_string(&Badge::SpeedDemon).unwrap();
        assert_eq!(json, "\"speed_demon\"");
        assert_eq!(Badge::FirstStrike.to_string(), "🎯 First Strike");
    }
}
