use chrono::{DateTime, Days, Local, NaiveTime, TimeZone};
use serde::{Deserialize, Serialize};

use super::ReminderSettings;

/// Notification ids are `NOTIFICATION_ID_BASE + index`.
pub const NOTIFICATION_ID_BASE: u32 = 22000;

const TITLE: &str = "Eye Gym";
const BODY: &str = "Час зробити вправи для очей";

/// One daily repeating notification.
#[derive(Debug, Clone, PartialEq, Eq, Serialize, Deserialize)]
#[serde(rename_all = "camelCase")]
pub struct ReminderNotification {
    pub id: u32,
    pub title: String,
    pub body: String,
    pub hour: u32,
    pub minute: u32,
    pub repeats: bool,
}

/// What the platform layer should register after clearing the old schedule.
#[derive(Debug, Clone, PartialEq, Eq, Default, Serialize, Deserialize)]
pub struct ReminderPlan {
    pub notifications: Vec<ReminderNotification>,
}

impl ReminderPlan {
    /// Empty when reminders are disabled.
    pub fn from_settings(settings: &ReminderSettings) -> Self {
        let normalized = settings.normalize();
        if !normalized.enabled {
            return Self::default();
        }
        let notifications = normalized
            .times
            .iter()
            .zip(NOTIFICATION_ID_BASE..)
            .map(|(t, id)| ReminderNotification {
                id,
                title: TITLE.to_string(),
                body: BODY.to_string(),
                hour: t.hour.unsigned_abs(),
                minute: t.minute.unsigned_abs(),
                repeats: true,
            })
            .collect();
        Self { notifications }
    }

    pub fn is_empty(&self) -> bool {
        self.notifications.is_empty()
    }
}

/// Pending notification ids that belong to the reminder schedule.
pub fn reminder_ids_to_cancel(pending: &[u32]) -> Vec<u32> {
    pending
        .iter()
        .copied()
        .filter(|id| *id >= NOTIFICATION_ID_BASE)
        .collect()
}

/// Next moment after `now` a reminder fires, or `None` when disabled.
pub fn next_reminder<Tz: TimeZone>(
    settings: &ReminderSettings,
    now: &DateTime<Tz>,
) -> Option<DateTime<Tz>> {
    let normalized = settings.normalize();
    if !normalized.enabled {
        return None;
    }
    let tz = now.timezone();
    let today = now.date_naive();

    // Two days ahead covers a time skipped by a DST gap.
    (0..=2u64)
        .filter_map(|offset| today.checked_add_days(Days::new(offset)))
        .flat_map(|date| {
            normalized.times.iter().filter_map(move |t| {
                let time = NaiveTime::from_hms_opt(t.hour.unsigned_abs(), t.minute.unsigned_abs(), 0)?;
                Some(date.and_time(time))
            })
        })
        .filter_map(|naive| tz.from_local_datetime(&naive).earliest())
        .filter(|candidate| candidate > now)
        .min()
}

pub fn next_reminder_local(settings: &ReminderSettings) -> Option<DateTime<Local>> {
    next_reminder(settings, &Local::now())
}
