use serde::{Deserialize, Serialize};

#[derive(Debug, Clone, Copy, PartialEq, Eq, Serialize, Deserialize)]
#[serde(rename_all = "lowercase")]
pub enum ExerciseKind {
    /// Rep-counted eye movement, paced by time proportional to the rep count.
    Dynamic,
    /// Held exercise, paced by a fixed second count.
    Static,
}

/// One scripted exercise.
///
/// `id` is a reference tag, not a key: the same step (e.g. `blink`) may
/// appear several times in one script.
#[derive(Debug, Clone, PartialEq, Eq, Serialize, Deserialize)]
#[serde(rename_all = "camelCase")]
pub struct ExerciseStep {
    pub id: String,
    pub kind: ExerciseKind,
    pub name: String,
    pub narration_text: String,
    #[serde(default, skip_serializing_if = "Option::is_none")]
    pub reps: Option<u32>,
    #[serde(default, skip_serializing_if = "Option::is_none")]
    pub seconds: Option<u32>,
}

impl ExerciseStep {
    pub fn dynamic(id: &str, name: &str, narration_text: &str, reps: u32) -> Self {
        Self {
            id: id.into(),
            kind: ExerciseKind::Dynamic,
            name: name.into(),
            narration_text: narration_text.into(),
            reps: Some(reps),
            seconds: None,
        }
    }

    pub fn fixed(id: &str, name: &str, narration_text: &str, seconds: u32) -> Self {
        Self {
            id: id.into(),
            kind: ExerciseKind::Static,
            name: name.into(),
            narration_text: narration_text.into(),
            reps: None,
            seconds: Some(seconds),
        }
    }

    /// Time the step must run before it can complete, picked by `kind`.
    ///
    /// Returns `None` when the kind-appropriate amount is missing or zero.
    /// Uses saturating arithmetic so absurd rep counts cannot overflow.
    pub fn target_ms(&self, ms_per_rep: u64) -> Option<u64> {
        match self.kind {
            ExerciseKind::Dynamic => self
                .reps
                .filter(|&r| r > 0)
                .map(|r| (r as u64).saturating_mul(ms_per_rep)),
            ExerciseKind::Static => self
                .seconds
                .filter(|&s| s > 0)
                .map(|s| (s as u64).saturating_mul(1000)),
        }
    }
}
