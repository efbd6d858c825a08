//! Training history: the persisted attempt log and the calendar statistics
//! derived from it.

mod entry;
mod store;
mod streak;
mod summary;

pub use entry::{TrainingHistoryEntry, TrainingStatus};
pub use store::{HistoryStore, KvHistoryStore, DEFAULT_MAX_ENTRIES, HISTORY_KEY};
pub use streak::{
    completed_day_keys, completed_days, compute_training_streak, compute_training_streak_local,
    day_key, local_date, training_week_status, training_week_status_local, WeekDayStatus,
};
pub use summary::HistorySummary;
