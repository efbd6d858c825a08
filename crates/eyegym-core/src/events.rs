use serde::{Deserialize, Serialize};

use crate::catalog::ExerciseKind;
use crate::history::TrainingHistoryEntry;
use crate::session::SessionStatus;

/// Every state change of a session produces an Event.
/// Presentation layers subscribe to them; timestamps are epoch milliseconds.
#[derive(Debug, Clone, PartialEq, Serialize, Deserialize)]
#[serde(tag = "type", rename_all = "snake_case")]
pub enum Event {
    SessionStarted {
        total_steps: usize,
        at: i64,
    },
    StepStarted {
        step_index: usize,
        step_id: String,
        step_name: String,
        kind: ExerciseKind,
        target_ms: u64,
        at: i64,
    },
    StepCompleted {
        step_index: usize,
        step_id: String,
        at: i64,
    },
    SessionPaused {
        step_index: usize,
        elapsed_ms: u64,
        at: i64,
    },
    SessionResumed {
        step_index: usize,
        elapsed_ms: u64,
        at: i64,
    },
    SessionCompleted {
        entry: TrainingHistoryEntry,
    },
    SessionStopped {
        entry: TrainingHistoryEntry,
    },
    StateSnapshot {
        status: SessionStatus,
        step_index: usize,
        total_steps: usize,
        step_name: String,
        elapsed_ms: u64,
        target_ms: u64,
        narration_settled: bool,
        session_progress_pct: f64,
        at: i64,
    },
}

impl Event {
    /// True for the two events that end a session.
    pub fn is_terminal(&self) -> bool {
        matches!(
            self,
            Event::SessionCompleted { .. } | Event::SessionStopped { .. }
        )
    }
}
