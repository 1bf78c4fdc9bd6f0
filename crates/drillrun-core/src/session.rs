//! One live play-through of a scenario.

use std::sync::Arc;

use chrono::{DateTime, Utc};
use uuid::Uuid;

use crate::error::DrillError;
use crate::model::{Badge, Question};
use crate::outcome::OutcomeTracker;
use crate::scoring::Evaluation;

/// Mutable state of a single session. Owned exclusively by one engine.
///
/// Read access is public; mutation goes through the engine.
#[derive(Debug, Clone)]
pub struct Session {
    id: Uuid,
    presentation_order: Vec<Arc<Question>>,
    current_index: usize,
    remaining_seconds: u32,
    outcomes: OutcomeTracker,
    raw_score: i64,
    time_bonus: u64,
    badges: Vec<Badge>,
    started_at: Option<DateTime<Utc>>,
    completed_at: Option<DateTime<Utc>>,
}

impl Session {
    /// The questions are shared with the scenario's pool, never copied.
    pub(crate) fn new(presentation_order: Vec<Arc<Question>>) -> Self {
        let remaining_seconds = presentation_order
            .first()
            .map(|q| q.time_limit_seconds)
            .unwrap_or(0);
        Self {
            id: Uuid::new_v4(),
            outcomes: OutcomeTracker::new(presentation_order.len()),
            presentation_order,
            current_index: 0,
            remaining_seconds,
            raw_score: 0,
            time_bonus: 0,
            badges: Vec::new(),
            started_at: None,
            completed_at: None,
        }
    }

    pub(crate) fn with_id(mut self, id: Uuid) -> Self {
        self.id = id;
        self
    }

    pub fn id(&self) -> Uuid {
        self.id
    }

    pub fn presentation_order(&self) -> &[Arc<Question>] {
        &self.presentation_order
    }

    pub fn total_questions(&self) -> usize {
        self.presentation_order.len()
    }

    /// Equals `total_questions()` only once the session has completed.
    pub fn current_index(&self) -> usize {
        self.current_index
    }

    pub fn current_question(&self) -> Option<&Question> {
        self.presentation_order.get(self.current_index).map(Arc::as_ref)
    }

    pub fn remaining_seconds(&self) -> u32 {
        self.remaining_seconds
    }

    pub fn outcomes(&self) -> &OutcomeTracker {
        &self.outcomes
    }

    pub fn raw_score(&self) -> i64 {
        self.raw_score
    }

    pub fn time_bonus(&self) -> u64 {
        self.time_bonus
    }

    /// Unlocked badges in unlock order, without duplicates.
    pub fn badges(&self) -> &[Badge] {
        &self.badges
    }

    pub fn started_at(&self) -> Option<DateTime<Utc>> {
        self.started_at
    }

    pub fn completed_at(&self) -> Option<DateTime<Utc>> {
        self.completed_at
    }

    pub fn correct_count(&self) -> usize {
        self.outcomes.correct_count()
    }

    pub fn wrong_count(&self) -> usize {
        self.outcomes.wrong_count()
    }

    pub fn timeout_count(&self) -> usize {
        self.outcomes.timeout_count()
    }

    pub fn is_complete(&self) -> bool {
        self.current_index == self.presentation_order.len() && self.completed_at.is_some()
    }

    /// Make `position` the open question and reset its countdown.
    pub(crate) fn enter_question(&mut self, position: usize) {
        self.current_index = position;
        self.remaining_seconds = self.presentation_order[position].time_limit_seconds;
    }

    /// Decrement the countdown; returns the new value.
    pub(crate) fn tick(&mut self) -> u32 {
        self.remaining_seconds = self.remaining_seconds.saturating_sub(1);
        self.remaining_seconds
    }

    pub(crate) fn mark_started(&mut self, at: DateTime<Utc>) {
        self.started_at.get_or_insert(at);
    }

    /// Apply a scoring result to the current question. The outcome slot is
    /// written first so a refused write leaves every accumulator untouched.
    pub(crate) fn apply(&mut self, evaluation: &Evaluation) -> Result<(), DrillError> {
        self.outcomes
            .record(self.current_index, evaluation.outcome)?;
        self.raw_score += evaluation.points;
        self.time_bonus += evaluation.time_bonus;
        for badge in &evaluation.badges {
            if !self.badges.contains(badge) {
                self.badges.push(*badge);
            }
        }
        Ok(())
    }

    pub(crate) fn finish(&mut self, at: DateTime<Utc>) {
        debug_assert!(self.outcomes.is_complete());
        self.current_index = self.presentation_order.len();
        self.remaining_seconds = 0;
        self.completed_at.get_or_insert(at);
    }
}
