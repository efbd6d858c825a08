//! Daily training reminders.
//!
//! Settings are persisted under [`REMINDER_SETTINGS_KEY`]. Registering the
//! notifications with the operating system is left to the platform layer;
//! this module only produces the [`ReminderPlan`] it should register.

mod plan;
mod store;

pub use plan::{
    next_reminder, next_reminder_local, reminder_ids_to_cancel, ReminderNotification,
    ReminderPlan, NOTIFICATION_ID_BASE,
};
pub use store::{ReminderStore, REMINDER_SETTINGS_KEY};

use serde::{Deserialize, Deserializer, Serialize};
use std::fmt;
use std::str::FromStr;

/// Allowed reminder counts per day.
pub const TIMES_PER_DAY: [u8; 3] = [2, 3, 4];

const FILLER_TIME: ReminderTime = ReminderTime { hour: 12, minute: 0 };

/// Time of day a reminder fires, in local time.
#[derive(Debug, Clone, Copy, PartialEq, Eq, PartialOrd, Ord, Serialize, Deserialize)]
pub struct ReminderTime {
    #[serde(deserialize_with = "floor_number")]
    pub hour: i32,
    #[serde(deserialize_with = "floor_number")]
    pub minute: i32,
}

impl ReminderTime {
    pub fn new(hour: i32, minute: i32) -> Self {
        Self { hour, minute }
    }

    /// Clamp into a valid time of day.
    pub fn clamped(self) -> Self {
        Self {
            hour: self.hour.clamp(0, 23),
            minute: self.minute.clamp(0, 59),
        }
    }
}

impl fmt::Display for ReminderTime {
    fn fmt(&self, f: &mut fmt::Formatter<'_>) -> fmt::Result {
        write!(f, "{:02}:{:02}", self.hour, self.minute)
    }
}

impl FromStr for ReminderTime {
    type Err = String;

    /// Parse `HH:MM`.
    fn from_str(s: &str) -> Result<Self, Self::Err> {
        let (h, m) = s
            .trim()
            .split_once(':')
            .ok_or_else(|| format!("expected HH:MM, got '{s}'"))?;
        let hour: i32 = h.parse().map_err(|_| format!("invalid hour in '{s}'"))?;
        let minute: i32 = m.parse().map_err(|_| format!("invalid minute in '{s}'"))?;
        if !(0..=23).contains(&hour) || !(0..=59).contains(&minute) {
            return Err(format!("time out of range: '{s}'"));
        }
        Ok(Self { hour, minute })
    }
}

/// User's reminder preferences.
#[derive(Debug, Clone, PartialEq, Eq, Serialize, Deserialize)]
#[serde(rename_all = "camelCase")]
pub struct ReminderSettings {
    #[serde(default)]
    pub enabled: bool,
    /// 0 when missing from stored data.
    #[serde(default, deserialize_with = "floor_count")]
    pub times_per_day: u8,
    #[serde(default)]
    pub times: Vec<ReminderTime>,
}

impl Default for ReminderSettings {
    fn default() -> Self {
        Self {
            enabled: false,
            times_per_day: 2,
            times: vec![ReminderTime::new(10, 0), ReminderTime::new(18, 0)],
        }
    }
}

impl ReminderSettings {
    /// Clamp times, coerce the count to an allowed value, and truncate or
    /// pad `times` (with 12:00) to that count.
    pub fn normalize(&self) -> Self {
        let times_per_day = coerce_times_per_day(u32::from(self.times_per_day));
        let mut times: Vec<ReminderTime> = self
            .times
            .iter()
            .take(times_per_day as usize)
            .map(|t| t.clamped())
            .collect();
        times.resize(times_per_day as usize, FILLER_TIME);
        Self {
            enabled: self.enabled,
            times_per_day,
            times,
        }
    }
}

/// Nearest allowed reminder count.
pub fn coerce_times_per_day(n: u32) -> u8 {
    match n {
        0..=2 => 2,
        3 => 3,
        _ => 4,
    }
}

fn floor_number<'de, D: Deserializer<'de>>(deserializer: D) -> Result<i32, D::Error> {
    let value = f64::deserialize(deserializer)?;
    if !value.is_finite() {
        return Err(serde::de::Error::custom("time component must be finite"));
    }
    Ok(value.floor().clamp(i32::MIN as f64, i32::MAX as f64) as i32)
}

fn floor_count<'de, D: Deserializer<'de>>(deserializer: D) -> Result<u8, D::Error> {
    let value = f64::deserialize(deserializer)?;
    if !value.is_finite() || value < 0.0 {
        return Ok(0);
    }
    Ok(value.floor().min(f64::from(u8::MAX)) as u8)
}
