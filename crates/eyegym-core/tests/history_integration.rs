//! History log, streak and week view over real stores.

use chrono::{DateTime, FixedOffset, TimeZone};
use eyegym_core::history::{
    compute_training_streak, training_week_status, HistoryStore, HistorySummary, KvHistoryStore,
    TrainingHistoryEntry, TrainingStatus, HISTORY_KEY,
};
use eyegym_core::storage::{KvStore, LazyDatabase, MemoryStore};
use proptest::prelude::*;

fn kyiv() -> FixedOffset {
    FixedOffset::east_opt(3 * 3600).unwrap()
}

fn at(d: u32, h: u32) -> DateTime<FixedOffset> {
    // June 2024: the 3rd is a Monday.
    kyiv().with_ymd_and_hms(2024, 6, d, h, 0, 0).unwrap()
}

fn attempt(ended: DateTime<FixedOffset>, status: TrainingStatus) -> TrainingHistoryEntry {
    let ended = ended.timestamp_millis();
    TrainingHistoryEntry {
        id: format!("{ended}-{status:?}"),
        started_at: ended - 300_000,
        ended_at: ended,
        duration_sec: 300,
        total_exercises: 26,
        completed_exercises: if status == TrainingStatus::Completed { 26 } else { 4 },
        status,
    }
}

#[test]
fn streak_from_persisted_log() {
    let store = KvHistoryStore::new(MemoryStore::new());
    for day in [3, 4, 5, 6] {
        store
            .append(attempt(at(day, 9), TrainingStatus::Completed), 100)
            .unwrap();
    }
    store
        .append(attempt(at(7, 9), TrainingStatus::Stopped), 100)
        .unwrap();

    let log = store.read();
    // Today (7th) only has a stopped attempt, so the streak ends yesterday.
    assert_eq!(compute_training_streak(&log, &at(7, 20)), 4);
    // A gap day breaks it.
    assert_eq!(compute_training_streak(&log, &at(8, 20)), 0);
}

#[test]
fn week_view_marks_completed_days() {
    let log = vec![
        attempt(at(3, 23), TrainingStatus::Completed),
        attempt(at(5, 1), TrainingStatus::Completed),
        attempt(at(6, 12), TrainingStatus::Stopped),
    ];
    let week = training_week_status(&log, &at(6, 15));
    assert_eq!(week.len(), 7);
    assert_eq!(week[0].date_key, "2024-06-03");
    assert_eq!(week[6].date_key, "2024-06-09");

    let completed: Vec<bool> = week.iter().map(|d| d.completed).collect();
    assert_eq!(completed, vec![true, false, true, false, false, false, false]);
    assert!(week[3].is_today);
    assert_eq!(week.iter().filter(|d| d.is_today).count(), 1);
    assert_eq!(week[0].timestamp, at(3, 0).timestamp_millis());
}

#[test]
fn late_evening_attempt_counts_for_local_day() {
    // 23:30 local is 20:30 UTC; still the 4th locally.
    let ended = kyiv().with_ymd_and_hms(2024, 6, 4, 23, 30, 0).unwrap();
    let log = vec![attempt(ended, TrainingStatus::Completed)];
    assert_eq!(compute_training_streak(&log, &at(5, 8)), 1);
    assert_eq!(compute_training_streak(&log, &at(4, 23)), 1);
}

#[test]
fn lazy_database_persists_history() {
    let dir = tempfile::tempdir().unwrap();
    let path = dir.path().join("eyegym.db");

    let store = KvHistoryStore::new(LazyDatabase::at(&path));
    assert!(!store.kv().is_open());
    store
        .append(attempt(at(3, 9), TrainingStatus::Completed), 100)
        .unwrap();
    assert!(store.kv().is_open());
    drop(store);

    let reopened = KvHistoryStore::new(LazyDatabase::at(&path));
    let log = reopened.read();
    assert_eq!(log.len(), 1);
    assert_eq!(HistorySummary::from_log(&log).completed, 1);
}

#[test]
fn corrupt_log_reads_empty_and_streak_is_zero() {
    let kv = MemoryStore::new();
    kv.set(HISTORY_KEY, "not json at all").unwrap();
    let store = KvHistoryStore::new(kv);
    let log = store.read();
    assert!(log.is_empty());
    assert_eq!(compute_training_streak(&log, &at(5, 12)), 0);
    assert!(training_week_status(&log, &at(5, 12))
        .iter()
        .all(|d| !d.completed));
}

#[test]
fn summary_over_mixed_log() {
    let log = vec![
        attempt(at(5, 9), TrainingStatus::Stopped),
        attempt(at(4, 9), TrainingStatus::Completed),
        attempt(at(3, 9), TrainingStatus::Completed),
    ];
    let summary = HistorySummary::from_log(&log);
    assert_eq!(summary.total_attempts, 3);
    assert_eq!(summary.completed, 2);
    assert_eq!(summary.stopped, 1);
    assert_eq!(summary.total_training_sec, 900);
    assert_eq!(summary.exercises_done, 56);
    assert_eq!(summary.last_attempt_at, Some(at(5, 9).timestamp_millis()));
}

proptest! {
    #[test]
    fn log_never_exceeds_cap_and_keeps_newest(n in 0usize..40, cap in 1usize..15) {
        let store = KvHistoryStore::new(MemoryStore::new());
        for i in 0..n {
            let mut entry = attempt(at(3, 9), TrainingStatus::Completed);
            entry.id = i.to_string();
            store.append(entry, cap).unwrap();
        }
        let log = store.read();
        prop_assert_eq!(log.len(), n.min(cap));
        for (pos, entry) in log.iter().enumerate() {
            prop_assert_eq!(entry.id.clone(), (n - 1 - pos).to_string());
        }
    }

    #[test]
    fn streak_counts_trailing_run(run in 1u32..20, gap_before in 1u32..5) {
        // `run` consecutive days ending on the 25th, preceded by a gap and one
        // more completed day that must not count.
        let mut log = Vec::new();
        for offset in 0..run {
            let day = at(25, 10) - chrono::Duration::days(i64::from(offset));
            log.push(attempt(day, TrainingStatus::Completed));
        }
        let isolated = at(25, 10) - chrono::Duration::days(i64::from(run + gap_before));
        log.push(attempt(isolated, TrainingStatus::Completed));

        prop_assert_eq!(compute_training_streak(&log, &at(25, 22)), run);
        prop_assert_eq!(compute_training_streak(&log, &at(26, 8)), run);
    }
}
