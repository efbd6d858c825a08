use clap::Subcommand;
use eyegym_core::{Catalog, Config};
use serde::Serialize;

use super::{print_json, CmdResult};

#[derive(Subcommand)]
pub enum ExercisesAction {
    /// List the built-in exercise script
    List,
}

#[derive(Serialize)]
#[serde(rename_all = "camelCase")]
struct Listed<'a> {
    index: usize,
    #[serde(flatten)]
    step: &'a eyegym_core::ExerciseStep,
    target_ms: Option<u64>,
}

pub fn run(action: ExercisesAction) -> CmdResult {
    match action {
        ExercisesAction::List => {
            let ms_per_rep = Config::load_or_default().session.ms_per_rep;
            let catalog = Catalog::eye_gym();
            let listed: Vec<Listed<'_>> = catalog
                .steps
                .iter()
                .enumerate()
                .map(|(index, step)| Listed {
                    index,
                    step,
                    target_ms: step.target_ms(ms_per_rep),
                })
                .collect();
            print_json(&listed)?;
        }
    }
    Ok(())
}
