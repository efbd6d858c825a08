use clap::Subcommand;
use eyegym_core::{
    compute_training_streak_local, training_week_status_local, HistoryStore, HistorySummary,
};

use super::{open_history, print_json, CmdResult};

#[derive(Subcommand)]
pub enum StatsAction {
    /// Consecutive training days
    Streak,
    /// This week, Monday to Sunday
    Week,
    /// All-time totals
    Summary,
}

pub fn run(action: StatsAction) -> CmdResult {
    let log = open_history().read();

    match action {
        StatsAction::Streak => {
            let streak = compute_training_streak_local(&log);
            print_json(&serde_json::json!({ "streak": streak }))?;
        }
        StatsAction::Week => print_json(&training_week_status_local(&log))?,
        StatsAction::Summary => print_json(&HistorySummary::from_log(&log))?,
    }
    Ok(())
}
