use serde::{Deserialize, Serialize};

use super::{TrainingHistoryEntry, TrainingStatus};

/// Totals over a history log.
#[derive(Debug, Clone, Default, PartialEq, Eq, Serialize, Deserialize)]
#[serde(rename_all = "camelCase")]
pub struct HistorySummary {
    pub total_attempts: u64,
    pub completed: u64,
    pub stopped: u64,
    pub total_training_sec: u64,
    pub exercises_done: u64,
    /// `day_timestamp_ms` of the newest attempt.
    pub last_attempt_at: Option<i64>,
}

impl HistorySummary {
    pub fn from_log(log: &[TrainingHistoryEntry]) -> Self {
        log.iter().fold(Self::default(), |mut acc, e| {
            acc.total_attempts += 1;
            match e.status {
                TrainingStatus::Completed => acc.completed += 1,
                TrainingStatus::Stopped => acc.stopped += 1,
            }
            acc.total_training_sec += e.duration_sec;
            acc.exercises_done += e.completed_exercises as u64;
            let ts = e.day_timestamp_ms();
            acc.last_attempt_at = Some(acc.last_attempt_at.map_or(ts, |prev| prev.max(ts)));
            acc
        })
    }
}
