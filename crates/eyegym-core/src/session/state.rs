use serde::{Deserialize, Serialize};
use std::fmt;

#[derive(Debug, Clone, Copy, PartialEq, Eq, Serialize, Deserialize)]
#[serde(rename_all = "lowercase")]
pub enum SessionStatus {
    Idle,
    Running,
    Paused,
    Completed,
    Stopped,
}

impl SessionStatus {
    /// Running or paused.
    pub fn is_active(self) -> bool {
        matches!(self, SessionStatus::Running | SessionStatus::Paused)
    }

    pub fn is_terminal(self) -> bool {
        matches!(self, SessionStatus::Completed | SessionStatus::Stopped)
    }
}

impl fmt::Display for SessionStatus {
    fn fmt(&self, f: &mut fmt::Formatter<'_>) -> fmt::Result {
        let s = match self {
            SessionStatus::Idle => "idle",
            SessionStatus::Running => "running",
            SessionStatus::Paused => "paused",
            SessionStatus::Completed => "completed",
            SessionStatus::Stopped => "stopped",
        };
        f.write_str(s)
    }
}

/// Narration progress of the current step.
#[derive(Debug, Clone, Copy, PartialEq, Eq, Serialize, Deserialize)]
#[serde(tag = "state", rename_all = "snake_case")]
pub enum NarrationState {
    /// Utterance `id` was issued and has not reported back.
    InFlight { id: u64 },
    Settled,
    /// Cancelled on pause before it finished; re-issued on resume.
    Interrupted,
}

/// Transient state of one run. Owned by the runner.
#[derive(Debug, Clone, PartialEq, Serialize, Deserialize)]
pub struct SessionState {
    pub status: SessionStatus,
    pub step_index: usize,
    pub total_steps: usize,
    /// Steps fully finished (timer and narration settled).
    pub completed_steps: usize,
    pub elapsed_ms: u64,
    pub target_ms: u64,
    /// Epoch milliseconds.
    pub started_at: i64,
    pub narration: NarrationState,
    /// Anchor for the next elapsed-time flush; `None` unless running.
    #[serde(default)]
    pub last_tick_ms: Option<i64>,
}

impl SessionState {
    pub fn idle() -> Self {
        Self {
            status: SessionStatus::Idle,
            step_index: 0,
            total_steps: 0,
            completed_steps: 0,
            elapsed_ms: 0,
            target_ms: 0,
            started_at: 0,
            narration: NarrationState::Settled,
            last_tick_ms: None,
        }
    }

    pub fn timer_settled(&self) -> bool {
        self.elapsed_ms >= self.target_ms
    }

    pub fn narration_settled(&self) -> bool {
        self.narration == NarrationState::Settled
    }

    /// Elapsed time as of `now_ms`, without mutating the state.
    pub fn elapsed_at(&self, now_ms: i64) -> u64 {
        let pending = self
            .last_tick_ms
            .map(|last| now_ms.saturating_sub(last).max(0) as u64)
            .unwrap_or(0);
        self.elapsed_ms.saturating_add(pending).min(self.target_ms)
    }

    /// Move the anchor to `now_ms`, accumulating the time since the last flush.
    pub(crate) fn flush_elapsed(&mut self, now_ms: i64) {
        if let Some(last) = self.last_tick_ms {
            if now_ms > last {
                let delta = (now_ms - last) as u64;
                self.elapsed_ms = self.elapsed_ms.saturating_add(delta).min(self.target_ms);
                self.last_tick_ms = Some(now_ms);
            }
        }
    }
}

impl Default for SessionState {
    fn default() -> Self {
        Self::idle()
    }
}

#[cfg(test)]
mod tests {
    use super::*;

    #[test]
    fn flush_accumulates_and_caps_at_target() {
        let mut state = SessionState {
            status: SessionStatus::Running,
            target_ms: 1_000,
            last_tick_ms: Some(0),
            ..SessionState::idle()
        };
        state.flush_elapsed(400);
        assert_eq!(state.elapsed_ms, 400);
        state.flush_elapsed(5_000);
        assert_eq!(state.elapsed_ms, 1_000);
        assert!(state.timer_settled());
    }

    #[test]
    fn flush_without_anchor_is_noop() {
        let mut state = SessionState {
            target_ms: 1_000,
            ..SessionState::idle()
        };
        state.flush_elapsed(400);
        assert_eq!(state.elapsed_ms, 0);
    }

    #[test]
    fn clock_going_backwards_adds_nothing() {
        let mut state = SessionState {
            target_ms: 1_000,
            last_tick_ms: Some(500),
            ..SessionState::idle()
        };
        state.flush_elapsed(100);
        assert_eq!(state.elapsed_ms, 0);
        assert_eq!(state.elapsed_at(100), 0);
    }

    #[test]
    fn status_display_is_lowercase() {
        assert_eq!(SessionStatus::Paused.to_string(), "paused");
    }
}
