use serde::{Deserialize, Serialize};

#[derive(Debug, Clone, Copy, PartialEq, Eq, Hash, Serialize, Deserialize)]
#[serde(rename_all = "lowercase")]
pub enum TrainingStatus {
    Completed,
    Stopped,
}

/// One finished training attempt. Immutable once written.
#[derive(Debug, Clone, PartialEq, Eq, Serialize, Deserialize)]
#[serde(rename_all = "camelCase")]
pub struct TrainingHistoryEntry {
    pub id: String,
    /// Epoch milliseconds.
    pub started_at: i64,
    /// Epoch milliseconds. Zero means unknown.
    #[serde(default)]
    pub ended_at: i64,
    pub duration_sec: u64,
    pub total_exercises: u32,
    pub completed_exercises: u32,
    pub status: TrainingStatus,
}

impl TrainingHistoryEntry {
    pub fn is_completed(&self) -> bool {
        self.status == TrainingStatus::Completed
    }

    /// Timestamp used for calendar bucketing: `ended_at`, or `started_at`
    /// when the end is missing.
    pub fn day_timestamp_ms(&self) -> i64 {
        if self.ended_at != 0 {
            self.ended_at
        } else {
            self.started_at
        }
    }
}

#[cfg(test)]
mod tests {
    use super::*;

    #[test]
    fn serializes_with_camel_case_fields() {
        let entry = TrainingHistoryEntry {
            id: "a".into(),
            started_at: 1,
            ended_at: 2,
            duration_sec: 0,
            total_exercises: 3,
            completed_exercises: 3,
            status: TrainingStatus::Completed,
        };
        let json = serde_json::to_value(&entry).unwrap();
        assert_eq!(json["startedAt"], 1);
        assert_eq!(json["completedExercises"], 3);
        assert_eq!(json["status"], "completed");
    }

    #[test]
    fn zero_end_falls_back_to_start() {
        let entry: TrainingHistoryEntry = serde_json::from_str(
            r#"{"id":"x","startedAt":500,"endedAt":0,"durationSec":0,
                "totalExercises":1,"completedExercises":1,"status":"completed"}"#,
        )
        .unwrap();
        assert_eq!(entry.day_timestamp_ms(), 500);
    }
}
