//! Cancellable timer sources.
//!
//! The engine never sleeps. It asks a [`Scheduler`] for timers and is told
//! when they fire through [`DrillEngine::on_timer`](crate::engine::DrillEngine::on_timer).
//! [`ManualScheduler`] keeps simulated time for tests; [`TokioScheduler`]
//! delivers real timers over a channel.

use std::collections::HashMap;
use std::fmt;
use std::time::Duration;

use chrono::{DateTime, Utc};
use tokio::sync::mpsc;
use tokio::task::JoinHandle;
use tokio::time::{Instant, MissedTickBehavior};

/// Handle for a scheduled timer.
#[derive(Debug, Clone, Copy, PartialEq, Eq, Hash, PartialOrd, Ord)]
pub struct TimerId(u64);

impl fmt::Display for TimerId {
    fn fmt(&self, f: &mut fmt::Formatter<'_>) -> fmt::Result {
        write!(f, "timer#{}", self.0)
    }
}

/// A source of one-shot and repeating timers plus a wall clock.
pub trait Scheduler {
    /// Current wall-clock time.
    fn now(&self) -> DateTime<Utc>;

    /// Fire `id` after `delay`, and every `delay` thereafter if `repeat`.
    fn schedule(&mut self, delay: Duration, repeat: bool) -> TimerId;

    /// Stop a timer. Unknown or already-finished ids are ignored.
    fn cancel(&mut self, id: TimerId);
}

#[derive(Debug, Clone)]
struct PendingTimer {
    id: TimerId,
    due: Duration,
    period: Option<Duration>,
}

/// Deterministic scheduler driven by explicit time advances.
#[derive(Debug, Clone)]
pub struct ManualScheduler {
    origin: DateTime<Utc>,
    elapsed: Duration,
    next_id: u64,
    timers: Vec<PendingTimer>,
}

impl Default for ManualScheduler {
    fn default() -> Self {
        Self::new()
    }
}

impl ManualScheduler {
    pub fn new() -> Self {
        Self::starting_at(Utc::now())
    }

    pub fn starting_at(origin: DateTime<Utc>) -> Self {
        Self {
            origin,
            elapsed: Duration::ZERO,
            next_id: 0,
            timers: Vec::new(),
        }
    }

    /// Simulated time since construction.
    pub fn elapsed(&self) -> Duration {
        self.elapsed
    }

    /// Number of timers still armed.
    pub fn pending(&self) -> usize {
        self.timers.len()
    }

    /// Pop the earliest timer due at or before `deadline`, moving the clock to
    /// its due time. Repeating timers are re-armed one period later.
    pub fn pop_due(&mut self, deadline: Duration) -> Option<TimerId> {
        let (slot, _) = self
            .timers
            .iter()
            .enumerate()
            .filter(|(_, t)| t.due <= deadline)
            .min_by_key(|(_, t)| (t.due, t.id))?;

        let PendingTimer { id, due, period } = self.timers[slot].clone();
        self.elapsed = self.elapsed.max(due);
        match period {
            Some(period) => self.timers[slot].due += period,
            None => {
                self.timers.remove(slot);
            }
        }
        Some(id)
    }

    /// Move the clock forward without firing anything.
    pub fn set_elapsed(&mut self, elapsed: Duration) {
        self.elapsed = self.elapsed.max(elapsed);
    }
}

impl Scheduler for ManualScheduler {
    fn now(&self) -> DateTime<Utc> {
        self.origin + chrono::Duration::milliseconds(self.elapsed.as_millis() as i64)
    }

    fn schedule(&mut self, delay: Duration, repeat: bool) -> TimerId {
        let id = TimerId(self.next_id);
        self.next_id += 1;
        self.timers.push(PendingTimer {
            id,
            due: self.elapsed + delay,
            period: repeat.then_some(delay),
        });
        id
    }

    fn cancel(&mut self, id: TimerId) {
        self.timers.retain(|t| t.id != id);
    }
}

/// Scheduler backed by tokio timers.
///
/// Fired ids arrive on the receiver returned by [`TokioScheduler::new`]. An id
/// may still be queued after its timer was cancelled, so consumers must
/// tolerate stale ids. Must be used from within a tokio runtime.
pub struct TokioScheduler {
    tx: mpsc::UnboundedSender<TimerId>,
    tasks: HashMap<TimerId, JoinHandle<()>>,
    next_id: u64,
}

impl TokioScheduler {
    pub fn new() -> (Self, mpsc::UnboundedReceiver<TimerId>) {
        let (tx, rx) = mpsc::unbounded_channel();
        let scheduler = Self {
            tx,
            tasks: HashMap::new(),
            next_id: 0,
        };
        (scheduler, rx)
    }
}

impl Scheduler for TokioScheduler {
    fn now(&self) -> DateTime<Utc> {
        Utc::now()
    }

    fn schedule(&mut self, delay: Duration, repeat: bool) -> TimerId {
        let id = TimerId(self.next_id);
        self.next_id += 1;
        self.tasks.retain(|_, handle| !handle.is_finished());

        let tx = self.tx.clone();
        let handle = if repeat && !delay.is_zero() {
            tokio::spawn(async move {
                let mut interval = tokio::time::interval_at(Instant::now() + delay, delay);
                interval.set_missed_tick_behavior(MissedTickBehavior::Delay);
                loop {
                    interval.tick().await;
                    if tx.send(id).is_err() {
                        break;
                    }
                }
            })
        } else {
            tokio::spawn(async move {
                tokio::time::sleep(delay).await;
                let _ = tx.send(id);
            })
        };
        self.tasks.insert(id, handle);
        id
    }

    fn cancel(&mut self, id: TimerId) {
        if let Some(handle) = self.tasks.remove(&id) {
            handle.abort();
        }
    }
}

impl Drop for TokioScheduler {
    fn drop(&mut self) {
        for handle in self.tasks.values() {
            handle.abort();
        }
    }
}

#[cfg(test)]
mod tests {
    use super::*;

    #[test]
    fn manual_fires_in_due_order() {
        let mut sched = ManualScheduler::new();
        let slow = sched.schedule(Duration::from_secs(3), false);
        let fast = sched.schedule(Duration::from_secs(1), false);

        assert_eq!(sched.pop_due(Duration::from_secs(5)), Some(fast));
        assert_eq!(sched.elapsed(), Duration::from_secs(1));
        assert_eq!(sched.pop_due(Duration::from_secs(5)), Some(slow));
        assert_eq!(sched.pop_due(Duration::from_secs(5)), None);
    }

    #[test]
    fn manual_repeating_rearms() {
        let mut sched = ManualScheduler::new();
        let tick = sched.schedule(Duration::from_secs(1), true);

        let fired: Vec<_> = std::iter::from_fn(|| sched.pop_due(Duration::from_secs(3))).collect();

        assert_eq!(fired, vec![tick, tick, tick]);
        assert_eq!(sched.pending(), 1);
    }

    #[test]
    fn manual_cancel_removes() {
        let mut sched = ManualScheduler::new();
        let id = sched.schedule(Duration::from_secs(1), true);
        sched.cancel(id);
        assert_eq!(sched.pending(), 0);
        assert_eq!(sched.pop_due(Duration::from_secs(10)), None);
    }

    #[test]
    fn manual_clock_tracks_elapsed() {
        let origin = Utc::now();
        let mut sched = ManualScheduler::starting_at(origin);
        sched.set_elapsed(Duration::from_millis(2500));
        assert_eq!(sched.now() - origin, chrono::Duration::milliseconds(2500));
    }

    #[tokio::test(start_paused = true)]
    async fn tokio_repeating_timer_ticks() {
        let (mut sched, mut rx) = TokioScheduler::new();
        let start = Instant::now();
        let id = sched.schedule(Duration::from_secs(1), true);

        for _ in 0..3 {
            assert_eq!(rx.recv().await, Some(id));
        }
        assert_eq!(start.elapsed(), Duration::from_secs(3));
    }

    #[tokio::test(start_paused = true)]
    async fn tokio_cancelled_timer_never_fires() {
        let (mut sched, mut rx) = TokioScheduler::new();
        let first = sched.schedule(Duration::from_secs(1), false);
        let second = sched.schedule(Duration::from_secs(2), false);
        sched.cancel(first);

        assert_eq!(rx.recv().await, Some(second));
    }
}
