use std::path::PathBuf;

use clap::Args;
use eyegym_core::events::Event;
use eyegym_core::history::HistoryStore;
use eyegym_core::{
    Catalog, Config, ConsoleNarrator, CoreError, Narrator, ServiceOptions, SessionHandle,
    SessionService, SilentNarrator, TrainingHistoryEntry,
};
use tokio::io::{AsyncBufReadExt, BufReader};
use tokio::sync::broadcast::error::RecvError;
use tracing::warn;

use super::{open_history, print_json, CmdResult};

#[derive(Args)]
pub struct TrainArgs {
    /// JSON file with a custom exercise script
    #[arg(long)]
    script: Option<PathBuf>,
    /// Speech rate override (1.0 is normal)
    #[arg(long)]
    rate: Option<f32>,
    /// Skip narration entirely
    #[arg(long)]
    silent: bool,
}

pub fn run(args: TrainArgs) -> CmdResult {
    let mut config = Config::load_or_default();
    if let Some(rate) = args.rate {
        config.apply("narration.rate", &rate.to_string())?;
    }
    let script = match &args.script {
        Some(path) => Catalog::from_json_file(path)?,
        None => Catalog::eye_gym(),
    };
    script.validate(config.session.ms_per_rep)?;

    let options = ServiceOptions::from(&config);
    let history = open_history();

    eprintln!("{} exercises. Type p + Enter to pause, r to resume, s to stop.", script.len());
    let runtime = tokio::runtime::Runtime::new()?;
    let entry = if args.silent {
        runtime.block_on(drive(SilentNarrator, options, history, script))
    } else {
        runtime.block_on(drive(ConsoleNarrator::new(), options, history, script))
    };
    // Stdin is read on a blocking thread that would otherwise hold shutdown.
    runtime.shutdown_background();

    print_json(&entry?)
}

async fn drive<N: Narrator, H: HistoryStore + 'static>(
    narrator: N,
    options: ServiceOptions,
    history: H,
    script: Catalog,
) -> Result<TrainingHistoryEntry, CoreError> {
    let handle = SessionService::spawn(options, narrator, history);
    let mut events = handle.subscribe();
    handle.start(script).await?;

    let mut stdin = BufReader::new(tokio::io::stdin()).lines();
    let mut stdin_open = true;
    let interrupt = tokio::signal::ctrl_c();
    tokio::pin!(interrupt);
    let mut interrupted = false;

    loop {
        tokio::select! {
            event = events.recv() => match event {
                Ok(event) => {
                    report(&event);
                    if event.is_terminal() {
                        break;
                    }
                }
                Err(RecvError::Lagged(skipped)) => warn!(skipped, "dropped session events"),
                Err(RecvError::Closed) => break,
            },
            line = stdin.next_line(), if stdin_open => match line {
                Ok(Some(line)) => control(&handle, line.trim()).await,
                Ok(None) => stdin_open = false,
                Err(e) => {
                    warn!(error = %e, "stdin closed");
                    stdin_open = false;
                }
            },
            _ = &mut interrupt, if !interrupted => {
                interrupted = true;
                eprintln!("stopping");
                if let Err(e) = handle.stop().await {
                    warn!(error = %e, "stop on interrupt failed");
                }
            }
        }
    }

    let entry = handle.wait_finished().await?;
    handle.shutdown().await?;
    Ok(entry)
}

async fn control(handle: &SessionHandle, input: &str) {
    let result = match input {
        "p" | "pause" => handle.pause().await,
        "r" | "resume" => handle.resume().await,
        "s" | "stop" => handle.stop().await,
        "" => return,
        other => {
            eprintln!("unknown input '{other}', use p, r or s");
            return;
        }
    };
    if let Err(e) = result {
        eprintln!("{e}");
    }
}

fn report(event: &Event) {
    match event {
        Event::StepStarted {
            step_index,
            step_name,
            target_ms,
            ..
        } => eprintln!("[{}] {step_name} ({}s)", step_index + 1, target_ms / 1000),
        Event::SessionPaused { .. } => eprintln!("paused"),
        Event::SessionResumed { .. } => eprintln!("resumed"),
        Event::SessionCompleted { .. } => eprintln!("done"),
        Event::SessionStopped { .. } => eprintln!("stopped"),
        _ => {}
    }
}
