use clap::Subcommand;
use eyegym_core::reminders::{next_reminder_local, ReminderPlan, ReminderStore, ReminderTime};
use eyegym_core::storage::LazyDatabase;

use super::{print_json, CmdResult};

#[derive(Subcommand)]
pub enum RemindersAction {
    /// Print current reminder settings
    Show,
    /// Change reminder settings
    Set {
        /// Turn reminders on
        #[arg(long, conflicts_with = "disable")]
        enable: bool,
        /// Turn reminders off
        #[arg(long)]
        disable: bool,
        /// Reminders per day (2, 3 or 4)
        #[arg(long)]
        times_per_day: Option<u8>,
        /// Reminder time as HH:MM, repeatable
        #[arg(long = "time")]
        times: Vec<ReminderTime>,
    },
    /// Notifications the platform should register
    Plan,
    /// When the next reminder fires
    Next,
}

pub fn run(action: RemindersAction) -> CmdResult {
    let store = ReminderStore::new(LazyDatabase::new());

    match action {
        RemindersAction::Show => print_json(&store.load())?,
        RemindersAction::Set {
            enable,
            disable,
            times_per_day,
            times,
        } => {
            let mut settings = store.load();
            if enable {
                settings.enabled = true;
            }
            if disable {
                settings.enabled = false;
            }
            if let Some(n) = times_per_day {
                settings.times_per_day = n;
            }
            if !times.is_empty() {
                settings.times = times;
            }
            print_json(&store.save(&settings)?)?;
        }
        RemindersAction::Plan => print_json(&ReminderPlan::from_settings(&store.load()))?,
        RemindersAction::Next => {
            let next = next_reminder_local(&store.load()).map(|t| t.to_rfc3339());
            print_json(&serde_json::json!({ "next": next }))?;
        }
    }
    Ok(())
}
