//! Per-question outcome record.
//!
//! The outcome slots are the single source of truth for correct/wrong/timeout
//! counts; every counter is derived from them on demand.

use crate::error::DrillError;
use crate::model::Outcome;

/// Write-once outcome slots, one per presented question.
#[derive(Debug, Clone, PartialEq, Eq)]
pub struct OutcomeTracker {
    slots: Vec<Outcome>,
}

impl OutcomeTracker {
    /// All slots start out pending.
    pub fn new(len: usize) -> Self {
        Self {
            slots: vec![Outcome::Pending; len],
        }
    }

    /// Record the outcome for `position`.
    ///
    /// A slot can be written once. A second write is an engine bug: it trips a
    /// debug assertion and in release builds is refused without touching the
    /// recorded value.
    pub(crate) fn record(&mut self, position: usize, outcome: Outcome) -> Result<(), DrillError> {
        let Some(slot) = self.slots.get_mut(position) else {
            return Err(DrillError::AlreadyResolved { position });
        };
        debug_assert!(
            !slot.is_resolved(),
            "outcome at position {position} written twice"
        );
        if slot.is_resolved() {
            return Err(DrillError::AlreadyResolved { position });
        }
        *slot = outcome;
        Ok(())
    }

    pub fn as_slice(&self) -> &[Outcome] {
        &self.slots
    }

    pub fn get(&self, position: usize) -> Option<Outcome> {
        self.slots.get(position).copied()
    }

    pub fn len(&self) -> usize {
        self.slots.len()
    }

    pub fn is_empty(&self) -> bool {
        self.slots.is_empty()
    }

    pub fn count(&self, outcome: Outcome) -> usize {
        self.slots.iter().filter(|&&s| s == outcome).count()
    }

    pub fn correct_count(&self) -> usize {
        self.count(Outcome::Correct)
    }

    pub fn wrong_count(&self) -> usize {
        self.count(Outcome::Wrong)
    }

    pub fn timeout_count(&self) -> usize {
        self.count(Outcome::Timeout)
    }

    pub fn resolved_count(&self) -> usize {
        self.slots.iter().filter(|s| s.is_resolved()).count()
    }

    pub fn is_complete(&self) -> bool {
        self.slots.iter().all(|s| s.is_resolved())
    }
}

#[cfg(test)]
mod tests {
    use super::*;

    #[test]
    fn starts_pending() {
        let tracker = OutcomeTracker::new(4);
        assert_eq!(tracker.as_slice(), &[Outcome::Pending; 4]);
        assert_eq!(tracker.resolved_count(), 0);
        assert!(!tracker.is_complete());
    }

    #[test]
    fn counts_are_derived_from_slots() {
        let mut tracker = OutcomeTracker::new(4);
        tracker.record(0, Outcome::Correct).unwrap();
        tracker.record(1, Outcome::Wrong).unwrap();
        tracker.record(3, Outcome::Timeout).unwrap();

        assert_eq!(tracker.correct_count(), 1);
        assert_eq!(tracker.wrong_count(), 1);
        assert_eq!(tracker.timeout_count(), 1);
        assert_eq!(tracker.resolved_count(), 3);
        assert!(!tracker.is_complete());

        tracker.record(2, Outcome::Correct).unwrap();
        assert!(tracker.is_complete());
    }

    #[test]
    fn out_of_range_write_rejected() {
        let mut tracker = OutcomeTracker::new(2);
        assert_eq!(
            tracker.record(5, Outcome::Correct),
            Err(DrillError::AlreadyResolved { position: 5 })
        );
    }

    #[test]
    #[should_panic(expected = "written twice")]
    #[cfg(debug_assertions)]
    fn double_write_panics_in_debug() {
        let mut tracker = OutcomeTracker::new(2);
        tracker.record(0, Outcome::Correct).unwrap();
        let _ = tracker.record(0, Outcome::Wrong);
    }
}
