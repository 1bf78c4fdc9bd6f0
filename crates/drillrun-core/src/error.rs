//! Error types for drill setup and play.
//!
//! Setup errors ([`ScenarioError`], [`ConfigError`]) surface synchronously when a
//! session is constructed. [`DrillError`] covers events the engine refuses at
//! runtime without touching recorded state.

use thiserror::Error;

use crate::engine::Phase;

/// A scenario that violates the engine's structural invariants.
#[derive(Debug, Clone, PartialEq, Eq, Error)]
pub enum ScenarioError {
    #[error("scenario '{0}' has no questions")]
    NoQuestions(String),

    #[error("question {question_id} has {count} option(s); at least 2 are required")]
    TooFewOptions { question_id: u32, count: usize },

    #[error("question {question_id}: correct index {index} is out of range for {count} options")]
    CorrectIndexOutOfRange {
        question_id: u32,
        index: usize,
        count: usize,
    },

    #[error("question {question_id}: time limit must be a positive number of seconds")]
    ZeroTimeLimit { question_id: u32 },

    #[error("duplicate question id: {0}")]
    DuplicateQuestionId(u32),
}

/// An engine or scoring parameter outside its meaningful range.
#[derive(Debug, Clone, PartialEq, Error)]
#[error("invalid {field}: {reason}")]
pub struct ConfigError {
    pub field: &'static str,
    pub reason: String,
}

impl ConfigError {
    pub(crate) fn new(field: &'static str, reason: impl Into<String>) -> Self {
        Self {
            field,
            reason: reason.into(),
        }
    }
}

/// Errors returned by [`DrillEngine::new`](crate::engine::DrillEngine::new).
#[derive(Debug, Clone, PartialEq, Error)]
pub enum SetupError {
    #[error(transparent)]
    Scenario(#[from] ScenarioError),
    #[error(transparent)]
    Config(#[from] ConfigError),
}

/// Events rejected during play.
#[derive(Debug, Clone, PartialEq, Eq, Error)]
pub enum DrillError {
    /// An answer arrived while no question was open.
    #[error("not accepting answers while {phase}")]
    NotAccepting { phase: Phase },

    /// The selected option does not exist on the current question.
    #[error("option {index} does not exist ({count} options)")]
    InvalidOption { index: usize, count: usize },

    /// A second write to an already-resolved outcome slot.
    #[error("question at position {position} has already been resolved")]
    AlreadyResolved { position: usize },

    /// Aggregation requested before every question resolved.
    #[error("session is not complete")]
    Incomplete,
}
