//! Session runner.
//!
//! The runner is a synchronous state machine. It never reads the clock and
//! never performs I/O: every transition takes the current time in epoch
//! milliseconds and returns the [`Effect`]s the caller must carry out, in
//! order.
//!
//! ## State Transitions
//!
//! ```text
//! Idle -> Running <-> Paused
//!         Running | Paused -> Stopped
//!         Running -> Completed
//! ```
//!
//! `Completed` and `Stopped` are terminal until the next `start()`.
//!
//! ## Usage
//!
//! ```ignore
//! let mut runner = SessionRunner::new(RunnerOptions::default());
//! let effects = runner.start(Catalog::eye_gym(), now_ms())?;
//! // In a loop:
//! runner.tick(now_ms());
//! // When narration for utterance `id` finishes:
//! runner.narration_settled(id, now_ms());
//! ```

use serde::{Deserialize, Serialize};
use tracing::{debug, info};
use uuid::Uuid;

use super::state::{NarrationState, SessionState, SessionStatus};
use crate::catalog::{Catalog, ExerciseStep};
use crate::error::SessionError;
use crate::events::Event;
use crate::history::{TrainingHistoryEntry, TrainingStatus};
use crate::storage::Config;

/// Runner settings taken from [`Config`].
#[derive(Debug, Clone, PartialEq)]
pub struct RunnerOptions {
    pub rate: f32,
    /// BCP 47 tag handed to the narrator with every utterance.
    pub language: String,
    pub ms_per_rep: u64,
    pub cancel_on_pause: bool,
}

impl Default for RunnerOptions {
    fn default() -> Self {
        Self::from(&Config::default())
    }
}

impl From<&Config> for RunnerOptions {
    fn from(config: &Config) -> Self {
        Self {
            rate: config.narration.rate,
            language: config.narration.language.clone(),
            ms_per_rep: config.session.ms_per_rep,
            cancel_on_pause: config.narration.cancel_on_pause,
        }
    }
}

/// A narration request for one step.
#[derive(Debug, Clone, PartialEq, Serialize, Deserialize)]
pub struct Utterance {
    pub id: u64,
    pub step_index: usize,
    pub text: String,
    pub language: String,
    pub rate: f32,
}

/// Side effect requested by a transition.
#[derive(Debug, Clone, PartialEq)]
pub enum Effect {
    Speak(Utterance),
    CancelSpeech,
    Persist(TrainingHistoryEntry),
    Emit(Event),
}

/// Drives one training session at a time through an exercise script.
#[derive(Debug, Clone)]
pub struct SessionRunner {
    options: RunnerOptions,
    script: Catalog,
    state: SessionState,
    next_utterance_id: u64,
}

impl SessionRunner {
    pub fn new(options: RunnerOptions) -> Self {
        Self {
            options,
            script: Catalog::new(Vec::new()),
            state: SessionState::idle(),
            next_utterance_id: 1,
        }
    }

    // ── Queries ──────────────────────────────────────────────────────

    pub fn status(&self) -> SessionStatus {
        self.state.status
    }

    pub fn state(&self) -> &SessionState {
        &self.state
    }

    pub fn options(&self) -> &RunnerOptions {
        &self.options
    }

    pub fn script(&self) -> &Catalog {
        &self.script
    }

    pub fn current_step(&self) -> Option<&ExerciseStep> {
        if self.state.status == SessionStatus::Idle {
            return None;
        }
        self.script.steps.get(self.state.step_index)
    }

    /// 0.0 .. 100.0 progress across the whole script, by target time.
    pub fn progress_pct(&self, now_ms: i64) -> f64 {
        if self.state.status == SessionStatus::Completed {
            return 100.0;
        }
        let total = self.script.total_target_ms(self.options.ms_per_rep);
        if total == 0 {
            return 0.0;
        }
        let done: u64 = self
            .script
            .steps
            .iter()
            .take(self.state.completed_steps)
            .filter_map(|s| s.target_ms(self.options.ms_per_rep))
            .sum();
        let current = self.state.elapsed_at(now_ms);
        ((done + current) as f64 / total as f64 * 100.0).min(100.0)
    }

    /// Build a full state snapshot event.
    pub fn snapshot(&self, now_ms: i64) -> Event {
        Event::StateSnapshot {
            status: self.state.status,
            step_index: self.state.step_index,
            total_steps: self.state.total_steps,
            step_name: self
                .current_step()
                .map(|s| s.name.clone())
                .unwrap_or_default(),
            elapsed_ms: self.state.elapsed_at(now_ms),
            target_ms: self.state.target_ms,
            narration_settled: self.state.narration_settled(),
            session_progress_pct: self.progress_pct(now_ms),
            at: now_ms,
        }
    }

    // ── Commands ─────────────────────────────────────────────────────

    /// Begin a run of `script` at step 0.
    ///
    /// An active run is force-stopped first, so its `Persist` comes before
    /// any effect of the new run.
    ///
    /// # Errors
    /// `InvalidScript` if the script is empty or malformed. The current run,
    /// if any, is left untouched.
    pub fn start(&mut self, script: Catalog, now_ms: i64) -> Result<Vec<Effect>, SessionError> {
        script.validate(self.options.ms_per_rep)?;

        let mut effects = Vec::new();
        if self.state.status.is_active() {
            info!("stopping active session before starting a new one");
            self.state.flush_elapsed(now_ms);
            effects.extend(self.finish(TrainingStatus::Stopped, now_ms));
        }

        let total_steps = script.len();
        self.script = script;
        self.state = SessionState {
            status: SessionStatus::Running,
            total_steps,
            started_at: now_ms,
            ..SessionState::idle()
        };
        info!(total_steps, "session started");

        effects.push(Effect::Emit(Event::SessionStarted {
            total_steps,
            at: now_ms,
        }));
        effects.extend(self.enter_step(0, now_ms));
        Ok(effects)
    }

    /// Freeze timing at the point reached.
    ///
    /// Narration keeps playing unless `cancel_on_pause` is set.
    pub fn pause(&mut self, now_ms: i64) -> Result<Vec<Effect>, SessionError> {
        if self.state.status != SessionStatus::Running {
            return Err(self.invalid("pause"));
        }
        self.state.flush_elapsed(now_ms);
        self.state.status = SessionStatus::Paused;
        self.state.last_tick_ms = None;

        let mut effects = Vec::new();
        if self.options.cancel_on_pause {
            if let NarrationState::InFlight { .. } = self.state.narration {
                self.state.narration = NarrationState::Interrupted;
                effects.push(Effect::CancelSpeech);
            }
        }
        debug!(step = self.state.step_index, elapsed_ms = self.state.elapsed_ms, "paused");
        effects.push(Effect::Emit(Event::SessionPaused {
            step_index: self.state.step_index,
            elapsed_ms: self.state.elapsed_ms,
            at: now_ms,
        }));
        Ok(effects)
    }

    /// Continue from the exact elapsed position.
    ///
    /// Narration is re-issued only when it was interrupted by the pause.
    pub fn resume(&mut self, now_ms: i64) -> Result<Vec<Effect>, SessionError> {
        if self.state.status != SessionStatus::Paused {
            return Err(self.invalid("resume"));
        }
        self.state.status = SessionStatus::Running;
        self.state.last_tick_ms = Some(now_ms);

        let mut effects = vec![Effect::Emit(Event::SessionResumed {
            step_index: self.state.step_index,
            elapsed_ms: self.state.elapsed_ms,
            at: now_ms,
        })];
        if self.state.narration == NarrationState::Interrupted {
            effects.push(self.speak_current());
        }
        debug!(step = self.state.step_index, "resumed");

        effects.extend(self.advance(now_ms));
        Ok(effects)
    }

    /// End the run early, recording a `stopped` attempt.
    pub fn stop(&mut self, now_ms: i64) -> Result<Vec<Effect>, SessionError> {
        if !self.state.status.is_active() {
            return Err(self.invalid("stop"));
        }
        self.state.flush_elapsed(now_ms);
        Ok(self.finish(TrainingStatus::Stopped, now_ms))
    }

    /// Call periodically while running.
    pub fn tick(&mut self, now_ms: i64) -> Vec<Effect> {
        if self.state.status != SessionStatus::Running {
            return Vec::new();
        }
        self.state.flush_elapsed(now_ms);
        self.advance(now_ms)
    }

    /// Report that utterance `id` finished, failed, or was cancelled
    /// by the engine. Reports for anything but the in-flight utterance are
    /// ignored.
    pub fn narration_settled(&mut self, id: u64, now_ms: i64) -> Vec<Effect> {
        if !self.state.status.is_active() {
            return Vec::new();
        }
        if self.state.narration != (NarrationState::InFlight { id }) {
            debug!(id, "ignoring stale narration report");
            return Vec::new();
        }
        self.state.narration = NarrationState::Settled;

        if self.state.status == SessionStatus::Running {
            self.state.flush_elapsed(now_ms);
            return self.advance(now_ms);
        }
        Vec::new()
    }

    // ── Internal ─────────────────────────────────────────────────────

    fn invalid(&self, action: &'static str) -> SessionError {
        SessionError::InvalidTransition {
            action,
            status: self.state.status,
        }
    }

    fn enter_step(&mut self, index: usize, now_ms: i64) -> Vec<Effect> {
        let Some(step) = self.script.steps.get(index) else {
            return Vec::new();
        };
        let target_ms = step.target_ms(self.options.ms_per_rep).unwrap_or(0);
        let started = Event::StepStarted {
            step_index: index,
            step_id: step.id.clone(),
            step_name: step.name.clone(),
            kind: step.kind,
            target_ms,
            at: now_ms,
        };
        self.state.step_index = index;
        self.state.elapsed_ms = 0;
        self.state.target_ms = target_ms;
        self.state.last_tick_ms = Some(now_ms);
        debug!(step = index, target_ms, "entering step");

        vec![Effect::Emit(started), self.speak_current()]
    }

    fn speak_current(&mut self) -> Effect {
        let id = self.next_utterance_id;
        self.next_utterance_id += 1;
        self.state.narration = NarrationState::InFlight { id };
        let text = self
            .current_step()
            .map(|s| s.narration_text.clone())
            .unwrap_or_default();
        Effect::Speak(Utterance {
            id,
            step_index: self.state.step_index,
            text,
            language: self.options.language.clone(),
            rate: self.options.rate,
        })
    }

    /// Move past the current step once both its timer and its narration
    /// have settled.
    fn advance(&mut self, now_ms: i64) -> Vec<Effect> {
        if self.state.status != SessionStatus::Running
            || !self.state.timer_settled()
            || !self.state.narration_settled()
        {
            return Vec::new();
        }

        let index = self.state.step_index;
        self.state.completed_steps += 1;
        let mut effects = vec![Effect::Emit(Event::StepCompleted {
            step_index: index,
            step_id: self
                .current_step()
                .map(|s| s.id.clone())
                .unwrap_or_default(),
            at: now_ms,
        })];

        if index + 1 < self.state.total_steps {
            effects.extend(self.enter_step(index + 1, now_ms));
        } else {
            effects.extend(self.finish(TrainingStatus::Completed, now_ms));
        }
        effects
    }

    fn finish(&mut self, status: TrainingStatus, now_ms: i64) -> Vec<Effect> {
        let entry = TrainingHistoryEntry {
            id: Uuid::new_v4().to_string(),
            started_at: self.state.started_at,
            ended_at: now_ms,
            duration_sec: (now_ms.saturating_sub(self.state.started_at).max(0) / 1000) as u64,
            total_exercises: u32::try_from(self.state.total_steps).unwrap_or(u32::MAX),
            completed_exercises: u32::try_from(self.state.completed_steps).unwrap_or(u32::MAX),
            status,
        };
        self.state.last_tick_ms = None;
        info!(
            status = ?status,
            completed = entry.completed_exercises,
            total = entry.total_exercises,
            "session finished"
        );

        match status {
            TrainingStatus::Completed => {
                self.state.status = SessionStatus::Completed;
                vec![
                    Effect::Persist(entry.clone()),
                    Effect::Emit(Event::SessionCompleted { entry }),
                ]
            }
            TrainingStatus::Stopped => {
                self.state.status = SessionStatus::Stopped;
                self.state.narration = NarrationState::Settled;
                vec![
                    Effect::CancelSpeech,
                    Effect::Persist(entry.clone()),
                    Effect::Emit(Event::SessionStopped { entry }),
                ]
            }
        }
    }
}

impl Default for SessionRunner {
    fn default() -> Self {
        Self::new(RunnerOptions::default())
    }
}
