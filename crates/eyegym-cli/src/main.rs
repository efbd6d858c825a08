use clap::{Parser, Subcommand};
use tracing_subscriber::EnvFilter;

mod commands;

#[derive(Parser)]
#[command(name = "eyegym", version, about = "Eye Gym CLI")]
struct Cli {
    #[command(subcommand)]
    command: Commands,
}

#[derive(Subcommand)]
enum Commands {
    /// Run a training session
    Train(commands::train::TrainArgs),
    /// Exercise catalog
    Exercises {
        #[command(subcommand)]
        action: commands::exercises::ExercisesAction,
    },
    /// Training history
    History {
        #[command(subcommand)]
        action: commands::history::HistoryAction,
    },
    /// Streak and weekly statistics
    Stats {
        #[command(subcommand)]
        action: commands::stats::StatsAction,
    },
    /// Daily reminder settings
    Reminders {
        #[command(subcommand)]
        action: commands::reminders::RemindersAction,
    },
    /// Configuration management
    Config {
        #[command(subcommand)]
        action: commands::config::ConfigAction,
    },
}

fn init_tracing() {
    let filter = EnvFilter::try_from_env("EYEGYM_LOG").unwrap_or_else(|_| EnvFilter::new("warn"));
    tracing_subscriber::fmt()
        .with_env_filter(filter)
        .with_writer(std::io::stderr)
        .init();
}

fn main() {
    init_tracing();

    let cli = Cli::parse();
    let result = match cli.command {
        Commands::Train(args) => commands::train::run(args),
        Commands::Exercises { action } => commands::exercises::run(action),
        Commands::History { action } => commands::history::run(action),
        Commands::Stats { action } => commands::stats::run(action),
        Commands::Reminders { action } => commands::reminders::run(action),
        Commands::Config { action } => commands::config::run(action),
    };

    if let Err(e) = result {
        eprintln!("error: {e}");
        std::process::exit(1);
    }
}
