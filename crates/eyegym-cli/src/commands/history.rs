use clap::Subcommand;
use eyegym_core::HistoryStore;

use super::{open_history, print_json, CmdResult};

#[derive(Subcommand)]
pub enum HistoryAction {
    /// Print past attempts, newest first
    List {
        /// Show at most N entries
        #[arg(long)]
        limit: Option<usize>,
    },
    /// Delete the whole training history
    Clear,
}

pub fn run(action: HistoryAction) -> CmdResult {
    let history = open_history();

    match action {
        HistoryAction::List { limit } => {
            let mut log = history.read();
            if let Some(limit) = limit {
                log.truncate(limit);
            }
            print_json(&log)?;
        }
        HistoryAction::Clear => {
            history.clear()?;
            println!("history cleared");
        }
    }
    Ok(())
}
