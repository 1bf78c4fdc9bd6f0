//! Drill lifecycle controller.
//!
//! Drives a session through `Preloading → Countdown → Active ⇄ Resolving →
//! Completed`. The engine is purely event-driven: callers feed it asset
//! readiness, fired timers, and participant input, and poll
//! [`DrillEngine::snapshot`] or listen through a [`DrillObserver`].
//!
//! At most one timer is live at any moment, and it is cancelled on every
//! transition. A fired id that is not the live timer is stale and ignored.

use std::fmt;
use std::sync::Arc;
use std::time::Duration;

use rand::rngs::StdRng;
use rand::SeedableRng;
use serde::Serialize;

use crate::config::EngineConfig;
use crate::error::{DrillError, SetupError};
use crate::model::{Badge, Outcome, Question, Scenario};
use crate::report::ScoreReport;
use crate::scheduler::{ManualScheduler, Scheduler, TimerId};
use crate::scoring::Answer;
use crate::session::Session;
use crate::shuffle::shuffled;
use crate::snapshot::{DrillSnapshot, Resolution};

/// Lifecycle state of the engine.
#[derive(Debug, Clone, Copy, PartialEq, Eq, Serialize)]
#[serde(rename_all = "lowercase")]
pub enum Phase {
    /// Waiting for the background asset (bounded by a deadline).
    Preloading,
    /// Fixed lead-in before the first question.
    Countdown,
    /// A question is open and its clock is running.
    Active,
    /// Feedback pause after a question resolved.
    Resolving,
    /// Every question resolved; the report has been produced.
    Completed,
}

impl fmt::Display for Phase {
    fn fmt(&self, f: &mut fmt::Formatter<'_>) -> fmt::Result {
        match self {
            Phase::Preloading => write!(f, "preloading"),
            Phase::Countdown => write!(f, "counting down"),
            Phase::Active => write!(f, "active"),
            Phase::Resolving => write!(f, "resolving"),
            Phase::Completed => write!(f, "completed"),
        }
    }
}

/// Readiness signal for the scenario's background asset.
#[derive(Debug, Clone, Copy, PartialEq, Eq)]
pub enum AssetStatus {
    Loaded,
    /// Load failed; the drill proceeds without it.
    Failed,
    /// Already available when the drill opened.
    Cached,
}

#[derive(Debug, Clone, Copy, PartialEq, Eq)]
enum TimerPurpose {
    PreloadDeadline,
    Countdown,
    QuestionTick,
    ResolvePause,
}

/// Lifecycle notifications.
pub trait DrillObserver: Send {
    fn on_countdown(&self, remaining: u32);
    fn on_question_start(&self, position: usize, total: usize, question: &Question);
    fn on_tick(&self, remaining_seconds: u32);
    fn on_resolved(&self, resolution: &Resolution);
    /// Called exactly once per completed session.
    fn on_complete(&self, report: &ScoreReport);
}

/// No-op observer.
pub struct NoopObserver;

impl DrillObserver for NoopObserver {
    fn on_countdown(&self, _: u32) {}
    fn on_question_start(&self, _: usize, _: usize, _: &Question) {}
    fn on_tick(&self, _: u32) {}
    fn on_resolved(&self, _: &Resolution) {}
    fn on_complete(&self, _: &ScoreReport) {}
}

/// Optional correctness feedback (sound, haptics, ...). Scoring never
/// depends on whether one is installed.
pub trait FeedbackSink: Send {
    fn on_correct(&self);
    fn on_wrong(&self);
    fn on_timeout(&self) {}
}

/// The drill state machine for one scenario.
pub struct DrillEngine<S: Scheduler> {
    scenario: Arc<Scenario>,
    questions: Vec<Arc<Question>>,
    config: EngineConfig,
    scheduler: S,
    rng: StdRng,
    session: Session,
    phase: Phase,
    countdown: u32,
    asset_ready: bool,
    live_timer: Option<(TimerId, TimerPurpose)>,
    last_resolution: Option<Resolution>,
    report: Option<ScoreReport>,
    observer: Box<dyn DrillObserver>,
    feedback: Option<Box<dyn FeedbackSink>>,
    feedback_enabled: bool,
}

impl<S: Scheduler> DrillEngine<S> {
    /// Open a session for `scenario` and start waiting for its background asset.
    ///
    /// Rejects malformed scenarios and out-of-range configuration up front.
    pub fn new(scenario: Arc<Scenario>, config: EngineConfig, scheduler: S) -> Result<Self, SetupError> {
        scenario.validate()?;
        config.validate()?;

        let questions: Vec<Arc<Question>> =
            scenario.questions.iter().cloned().map(Arc::new).collect();
        let mut rng = StdRng::from_os_rng();
        let session = Session::new(shuffled(&questions, &mut rng));

        let mut engine = Self {
            scenario,
            questions,
            config,
            scheduler,
            rng,
            session,
            phase: Phase::Preloading,
            countdown: 0,
            asset_ready: false,
            live_timer: None,
            last_resolution: None,
            report: None,
            observer: Box::new(NoopObserver),
            feedback: None,
            feedback_enabled: true,
        };
        engine.arm(engine.config.preload_timeout(), false, TimerPurpose::PreloadDeadline);

        tracing::info!(
            scenario = %engine.scenario.id,
            session = %engine.session.id(),
            questions = engine.session.total_questions(),
            "drill session opened"
        );
        Ok(engine)
    }

    /// Use a seeded RNG and redraw the presentation order with it.
    ///
    /// The session keeps the id it was opened with.
    pub fn with_seed(mut self, seed: u64) -> Self {
        self.rng = StdRng::seed_from_u64(seed);
        if self.phase == Phase::Preloading {
            let id = self.session.id();
            self.session = Session::new(shuffled(&self.questions, &mut self.rng)).with_id(id);
            tracing::debug!(session = %id, seed, "presentation order reseeded");
        }
        self
    }

    pub fn with_observer(mut self, observer: Box<dyn DrillObserver>) -> Self {
        self.observer = observer;
        self
    }

    pub fn with_feedback(mut self, feedback: Box<dyn FeedbackSink>) -> Self {
        self.feedback = Some(feedback);
        self
    }

    pub fn set_feedback_enabled(&mut self, enabled: bool) {
        self.feedback_enabled = enabled;
    }

    pub fn feedback_enabled(&self) -> bool {
        self.feedback_enabled
    }

    pub fn phase(&self) -> Phase {
        self.phase
    }

    pub fn scenario(&self) -> &Scenario {
        &self.scenario
    }

    pub fn config(&self) -> &EngineConfig {
        &self.config
    }

    pub fn session(&self) -> &Session {
        &self.session
    }

    pub fn scheduler(&self) -> &S {
        &self.scheduler
    }

    pub fn scheduler_mut(&mut self) -> &mut S {
        &mut self.scheduler
    }

    /// The final report, once the session has completed.
    pub fn report(&self) -> Option<&ScoreReport> {
        self.report.as_ref()
    }

    /// Background asset readiness. Failure is treated like success.
    pub fn asset_status(&mut self, status: AssetStatus) {
        if status == AssetStatus::Failed {
            tracing::warn!(
                background = %self.scenario.background,
                "background asset failed to load, continuing without it"
            );
        }
        self.asset_ready = true;
        if self.phase == Phase::Preloading {
            self.disarm();
            self.enter_countdown();
        }
    }

    /// Deliver a fired timer.
    pub fn on_timer(&mut self, id: TimerId) {
        let purpose = match self.live_timer {
            Some((live, purpose)) if live == id => purpose,
            _ => {
                tracing::debug!(timer = %id, phase = %self.phase, "ignoring stale timer");
                return;
            }
        };

        match purpose {
            TimerPurpose::PreloadDeadline => {
                self.disarm();
                tracing::warn!(
                    background = %self.scenario.background,
                    timeout_ms = self.config.preload_timeout_ms,
                    "background asset not ready in time, starting anyway"
                );
                self.asset_ready = true;
                self.enter_countdown();
            }
            TimerPurpose::Countdown => {
                self.countdown = self.countdown.saturating_sub(1);
                self.observer.on_countdown(self.countdown);
                if self.countdown == 0 {
                    self.disarm();
                    self.begin();
                }
            }
            TimerPurpose::QuestionTick => {
                let remaining = self.session.tick();
                tracing::debug!(position = self.session.current_index(), remaining, "tick");
                self.observer.on_tick(remaining);
                if remaining == 0 {
                    if let Err(e) = self.resolve(Answer::TimedOut) {
                        tracing::error!("timeout resolution refused: {e}");
                    }
                }
            }
            TimerPurpose::ResolvePause => {
                self.disarm();
                self.advance_question();
            }
        }
    }

    /// Answer the open question with option `index`.
    pub fn select_option(&mut self, index: usize) -> Result<Resolution, DrillError> {
        if self.phase != Phase::Active {
            return Err(DrillError::NotAccepting { phase: self.phase });
        }
        let count = self
            .session
            .current_question()
            .map(|q| q.options.len())
            .unwrap_or(0);
        if index >= count {
            return Err(DrillError::InvalidOption { index, count });
        }
        self.resolve(Answer::Selected(index))
    }

    /// Discard the session and start over with a fresh order.
    pub fn retry(&mut self) {
        self.disarm();
        self.session = Session::new(shuffled(&self.questions, &mut self.rng));
        self.report = None;
        self.last_resolution = None;

        tracing::info!(
            scenario = %self.scenario.id,
            session = %self.session.id(),
            "drill restarted"
        );

        if self.asset_ready {
            self.enter_countdown();
        } else {
            self.phase = Phase::Preloading;
            self.arm(self.config.preload_timeout(), false, TimerPurpose::PreloadDeadline);
        }
    }

    /// Tear the session down. Never produces a report.
    pub fn close(mut self) {
        self.disarm();
        tracing::info!(
            scenario = %self.scenario.id,
            session = %self.session.id(),
            phase = %self.phase,
            resolved = self.session.outcomes().resolved_count(),
            "drill closed"
        );
    }

    pub fn snapshot(&self) -> DrillSnapshot {
        DrillSnapshot {
            phase: self.phase,
            countdown: (self.phase == Phase::Countdown).then_some(self.countdown),
            current_index: self.session.current_index(),
            total_questions: self.session.total_questions(),
            remaining_seconds: self.session.remaining_seconds(),
            time_limit_seconds: self
                .session
                .current_question()
                .map(|q| q.time_limit_seconds)
                .unwrap_or(0),
            low_time_threshold_secs: self.config.low_time_threshold_secs,
            outcomes: self.session.outcomes().as_slice().to_vec(),
            raw_score: self.session.raw_score(),
            time_bonus: self.session.time_bonus(),
            badges: self.session.badges().to_vec(),
            last_resolution: self.last_resolution.clone(),
        }
    }

    fn arm(&mut self, delay: Duration, repeat: bool, purpose: TimerPurpose) {
        self.disarm();
        let id = self.scheduler.schedule(delay, repeat);
        self.live_timer = Some((id, purpose));
    }

    fn disarm(&mut self) {
        if let Some((id, _)) = self.live_timer.take() {
            self.scheduler.cancel(id);
        }
    }

    fn enter_countdown(&mut self) {
        self.phase = Phase::Countdown;
        self.countdown = self.config.countdown_ticks;
        self.observer.on_countdown(self.countdown);
        if self.countdown == 0 {
            self.begin();
        } else {
            self.arm(self.config.tick_interval(), true, TimerPurpose::Countdown);
        }
    }

    fn begin(&mut self) {
        let now = self.scheduler.now();
        self.session.mark_started(now);
        self.start_question(0);
    }

    fn start_question(&mut self, position: usize) {
        self.session.enter_question(position);
        self.phase = Phase::Active;
        self.last_resolution = None;
        if let Some(question) = self.session.current_question() {
            self.observer
                .on_question_start(position, self.session.total_questions(), question);
        }
        self.arm(self.config.tick_interval(), true, TimerPurpose::QuestionTick);
    }

    fn resolve(&mut self, answer: Answer) -> Result<Resolution, DrillError> {
        // The question clock must be dead before anything is recorded.
        self.disarm();

        let position = self.session.current_index();
        let Some(question) = self.session.presentation_order().get(position).cloned() else {
            return Err(DrillError::NotAccepting { phase: self.phase });
        };
        let remaining = self.session.remaining_seconds();
        let evaluation = self
            .config
            .scoring
            .evaluate(&question, position, answer, remaining);
        let new_badges: Vec<Badge> = evaluation
            .badges
            .iter()
            .filter(|b| !self.session.badges().contains(*b))
            .copied()
            .collect();

        self.phase = Phase::Resolving;
        let pause = match evaluation.outcome {
            Outcome::Timeout => self.config.timeout_pause(),
            _ => self.config.answer_pause(),
        };

        if let Err(e) = self.session.apply(&evaluation) {
            tracing::error!(position, "refusing to re-score question: {e}");
            self.arm(pause, false, TimerPurpose::ResolvePause);
            return Err(e);
        }
        self.play_feedback(evaluation.outcome);

        let resolution = Resolution {
            position,
            question_id: question.id,
            selected: match answer {
                Answer::Selected(index) => Some(index),
                Answer::TimedOut => None,
            },
            correct_index: question.correct_index,
            outcome: evaluation.outcome,
            points: evaluation.points,
            time_bonus: evaluation.time_bonus,
            remaining_seconds: remaining,
            new_badges,
            explanation: question.explanation.clone(),
        };
        tracing::debug!(
            position,
            question = resolution.question_id,
            outcome = %resolution.outcome,
            points = resolution.points,
            "question resolved"
        );
        self.observer.on_resolved(&resolution);
        self.last_resolution = Some(resolution.clone());

        self.arm(pause, false, TimerPurpose::ResolvePause);
        Ok(resolution)
    }

    fn play_feedback(&self, outcome: Outcome) {
        if !self.feedback_enabled {
            return;
        }
        let Some(sink) = &self.feedback else {
            return;
        };
        match outcome {
            Outcome::Correct => sink.on_correct(),
            Outcome::Wrong => sink.on_wrong(),
            Outcome::Timeout => sink.on_timeout(),
            Outcome::Pending => {}
        }
    }

    fn advance_question(&mut self) {
        let next = self.session.current_index() + 1;
        if next < self.session.total_questions() {
            self.start_question(next);
        } else {
            self.complete();
        }
    }

    fn complete(&mut self) {
        let now = self.scheduler.now();
        self.session.finish(now);
        self.phase = Phase::Completed;
        self.last_resolution = None;

        match ScoreReport::from_session(&self.scenario, &self.session) {
            Ok(report) => {
                tracing::info!(
                    scenario = %self.scenario.id,
                    session = %self.session.id(),
                    points = report.total_points,
                    accuracy = report.accuracy,
                    "drill completed"
                );
                self.observer.on_complete(&report);
                self.report = Some(report);
            }
            Err(e) => tracing::error!("failed to aggregate completed session: {e}"),
        }
    }
}

impl DrillEngine<ManualScheduler> {
    /// Advance simulated time, delivering every timer that falls due in order.
    pub fn advance(&mut self, by: Duration) {
        let deadline = self.scheduler.elapsed() + by;
        while let Some(id) = self.scheduler.pop_due(deadline) {
            self.on_timer(id);
        }
        self.scheduler.set_elapsed(deadline);
    }
}
