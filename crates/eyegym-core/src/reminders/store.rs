use tracing::warn;

use super::ReminderSettings;
use crate::error::StoreError;
use crate::storage::KvStore;

pub const REMINDER_SETTINGS_KEY: &str = "reminder_settings";

/// Reminder settings persisted as one JSON blob.
pub struct ReminderStore<S> {
    kv: S,
}

impl<S: KvStore> ReminderStore<S> {
    pub fn new(kv: S) -> Self {
        Self { kv }
    }

    /// Stored settings, normalized. Missing, unreadable or count-less data
    /// yields the defaults.
    pub fn load(&self) -> ReminderSettings {
        let raw = match self.kv.get(REMINDER_SETTINGS_KEY) {
            Ok(Some(raw)) if !raw.trim().is_empty() => raw,
            Ok(_) => return ReminderSettings::default(),
            Err(e) => {
                warn!(error = %e, "could not read reminder settings, using defaults");
                return ReminderSettings::default();
            }
        };
        match serde_json::from_str::<ReminderSettings>(&raw) {
            Ok(parsed) if parsed.times_per_day == 0 => ReminderSettings::default(),
            Ok(parsed) => parsed.normalize(),
            Err(e) => {
                warn!(error = %e, "corrupt reminder settings, using defaults");
                ReminderSettings::default()
            }
        }
    }

    /// Normalize and store `settings`, returning what was stored.
    pub fn save(&self, settings: &ReminderSettings) -> Result<ReminderSettings, StoreError> {
        let normalized = settings.normalize();
        let json = serde_json::to_string(&normalized)
            .map_err(|e| StoreError::Unavailable(e.to_string()))?;
        self.kv.set(REMINDER_SETTINGS_KEY, &json)?;
        Ok(normalized)
    }
}

#[cfg(test)]
mod tests {
    use super::*;
    use crate::reminders::ReminderTime;
    use crate::storage::MemoryStore;

    #[test]
    fn missing_settings_load_as_defaults() {
        let store = ReminderStore::new(MemoryStore::new());
        assert_eq!(store.load(), ReminderSettings::default());
    }

    #[test]
    fn save_stores_normalized() {
        let store = ReminderStore::new(MemoryStore::new());
        let saved = store
            .save(&ReminderSettings {
                enabled: true,
                times_per_day: 3,
                times: vec![ReminderTime::new(9, 0)],
            })
            .unwrap();
        assert_eq!(saved.times.len(), 3);
        assert_eq!(store.load(), saved);
    }

    #[test]
    fn corrupt_or_countless_blob_loads_defaults() {
        let kv = MemoryStore::new();
        kv.set(REMINDER_SETTINGS_KEY, "[1,2").unwrap();
        let store = ReminderStore::new(kv);
        assert_eq!(store.load(), ReminderSettings::default());

        store
            .kv
            .set(REMINDER_SETTINGS_KEY, r#"{"enabled":true,"times":[]}"#)
            .unwrap();
        assert_eq!(store.load(), ReminderSettings::default());
    }
}
