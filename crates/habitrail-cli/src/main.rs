use clap::{CommandFactory, Parser, Subcommand};
use tracing_subscriber::EnvFilter;

mod commands;

#[derive(Parser)]
#[command(name = "habitrail", version, about = "Habitrail habit tracker CLI")]
struct Cli {
    #[command(subcommand)]
    command: Commands,
}

#[derive(Subcommand)]
enum Commands {
    /// Habit management and completions
    Habit {
        #[command(subcommand)]
        action: commands::habit::HabitAction,
    },
    /// Task management
    Task {
        #[command(subcommand)]
        action: commands::task::TaskAction,
    },
    /// Daily journal
    Journal {
        #[command(subcommand)]
        action: commands::journal::JournalAction,
    },
    /// Focus session log
    Focus {
        #[command(subcommand)]
        action: commands::focus::FocusAction,
    },
    /// Habit reminders
    Remind {
        #[command(subcommand)]
        action: commands::remind::RemindAction,
    },
    /// Notification history
    Notify {
        #[command(subcommand)]
        action: commands::notify::NotifyAction,
    },
    /// Activity, consistency and mood statistics
    Stats {
        /// Day for the goal-vs-actual figures, YYYY-MM-DD (default: today)
        #[arg(long)]
        date: Option<habitrail_core::DateKey>,
    },
    /// Write a full JSON backup
    Export {
        /// Output file (default: stdout)
        #[arg(long, short)]
        out: Option<std::path::PathBuf>,
    },
    /// Restore a backup, or import habits and tasks from a legacy JSON export
    Import {
        /// Path to the JSON file
        file: std::path::PathBuf,
    },
    /// Configuration management
    Config {
        #[command(subcommand)]
        action: commands::config::ConfigAction,
    },
    /// Print shell completions
    Completions {
        shell: clap_complete::Shell,
    },
}

/// Logs go to stderr so stdout stays machine-readable.
fn init_logging() {
    let filter = EnvFilter::try_from_env("HABITRAIL_LOG").unwrap_or_else(|_| EnvFilter::new("warn"));
    tracing_subscriber::fmt()
        .with_env_filter(filter)
        .with_writer(std::io::stderr)
        .with_target(false)
        .init();
}

fn main() {
    init_logging();

    let cli = Cli::parse();
    let result = match cli.command {
        Commands::Habit { action } => commands::habit::run(action),
        Commands::Task { action } => commands::task::run(action),
        Commands::Journal { action } => commands::journal::run(action),
        Commands::Focus { action } => commands::focus::run(action),
        Commands::Remind { action } => commands::remind::run(action),
        Commands::Notify { action } => commands::notify::run(action),
        Commands::Stats { date } => commands::stats::run(date),
        Commands::Export { out } => commands::export::run(out.as_deref()),
        Commands::Import { file } => commands::import::run(&file),
        Commands::Config { action } => commands::config::run(action),
        Commands::Completions { shell } => {
            clap_complete::generate(shell, &mut Cli::command(), "habitrail", &mut std::io::stdout());
            Ok(())
        }
    };

    if let Err(e) = result {
        eprintln!("error: {e}");
        std::process::exit(1);
    }
}
