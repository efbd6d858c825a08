pub mod config;
pub mod exercises;
pub mod history;
pub mod reminders;
pub mod stats;
pub mod train;

use eyegym_core::history::KvHistoryStore;
use eyegym_core::storage::LazyDatabase;

pub type CmdResult = Result<(), Box<dyn std::error::Error>>;

/// History log in the default database, opened on first access.
pub fn open_history() -> KvHistoryStore<LazyDatabase> {
    KvHistoryStore::new(LazyDatabase::new())
}

pub fn print_json<T: serde::Serialize>(value: &T) -> CmdResult {
    println!("{}", serde_json::to_string_pretty(value)?);
    Ok(())
}
