//! Calendar statistics over a history log: completed days, streak length
//! and the Monday-first week view.
//!
//! Every function takes the reference time explicitly. Day boundaries are
//! local calendar days in the time zone of `now`, never UTC days.

use chrono::{DateTime, Datelike, Days, Local, NaiveDate, TimeZone};
use serde::{Deserialize, Serialize};
use std::collections::BTreeSet;

use super::TrainingHistoryEntry;

/// One day of the week view.
#[derive(Debug, Clone, PartialEq, Eq, Serialize, Deserialize)]
#[serde(rename_all = "camelCase")]
pub struct WeekDayStatus {
    pub date_key: String,
    /// Epoch milliseconds of local midnight starting this day.
    pub timestamp: i64,
    pub is_today: bool,
    pub completed: bool,
}

/// `YYYY-MM-DD`, zero padded.
pub fn day_key(date: NaiveDate) -> String {
    date.format("%Y-%m-%d").to_string()
}

/// Local calendar day of an epoch-ms timestamp in `tz`.
pub fn local_date<Tz: TimeZone>(timestamp_ms: i64, tz: &Tz) -> Option<NaiveDate> {
    tz.timestamp_millis_opt(timestamp_ms)
        .single()
        .map(|dt| dt.date_naive())
}

/// Set of local days holding at least one completed attempt.
pub fn completed_days<Tz: TimeZone>(log: &[TrainingHistoryEntry], tz: &Tz) -> BTreeSet<NaiveDate> {
    log.iter()
        .filter(|e| e.is_completed())
        .filter_map(|e| local_date(e.day_timestamp_ms(), tz))
        .collect()
}

/// Same as [`completed_days`], rendered as day keys.
pub fn completed_day_keys<Tz: TimeZone>(log: &[TrainingHistoryEntry], tz: &Tz) -> BTreeSet<String> {
    completed_days(log, tz).into_iter().map(day_key).collect()
}

/// Number of consecutive completed days ending today, or ending yesterday
/// when today has no completion yet.
pub fn compute_training_streak<Tz: TimeZone>(log: &[TrainingHistoryEntry], now: &DateTime<Tz>) -> u32 {
    let days = completed_days(log, &now.timezone());
    if days.is_empty() {
        return 0;
    }

    let today = now.date_naive();
    let mut cursor = if days.contains(&today) {
        Some(today)
    } else {
        today.pred_opt()
    };

    let mut streak = 0;
    while let Some(day) = cursor.filter(|d| days.contains(d)) {
        streak += 1;
        cursor = day.pred_opt();
    }
    streak
}

/// Monday..Sunday of the week containing `now`.
pub fn training_week_status<Tz: TimeZone>(
    log: &[TrainingHistoryEntry],
    now: &DateTime<Tz>,
) -> Vec<WeekDayStatus> {
    let tz = now.timezone();
    let days = completed_days(log, &tz);
    let today = now.date_naive();
    let monday = today - Days::new(today.weekday().num_days_from_monday() as u64);

    (0..7)
        .filter_map(|offset| monday.checked_add_days(Days::new(offset)))
        .map(|date| WeekDayStatus {
            date_key: day_key(date),
            timestamp: local_midnight_ms(date, &tz),
            is_today: date == today,
            completed: days.contains(&date),
        })
        .collect()
}

/// [`compute_training_streak`] against the system clock and zone.
pub fn compute_training_streak_local(log: &[TrainingHistoryEntry]) -> u32 {
    compute_training_streak(log, &Local::now())
}

/// [`training_week_status`] against the system clock and zone.
pub fn training_week_status_local(log: &[TrainingHistoryEntry]) -> Vec<WeekDayStatus> {
    training_week_status(log, &Local::now())
}

fn local_midnight_ms<Tz: TimeZone>(date: NaiveDate, tz: &Tz) -> i64 {
    // Midnight can fall into a DST gap; the first hour that exists stands in.
    (0..24)
        .filter_map(|hour| date.and_hms_opt(hour, 0, 0))
        .find_map(|naive| tz.from_local_datetime(&naive).earliest())
        .map(|dt| dt.timestamp_millis())
        .unwrap_or_else(|| date.and_time(chrono::NaiveTime::MIN).and_utc().timestamp_millis())
}
