//! Reminder commands for CLI.

use chrono::NaiveDateTime;
use clap::Subcommand;
use habitrail_core::reminder::{FixedClock, RecordingNotifier};
use habitrail_core::{Clock, Config, Database, Notifier, NotifyError, ReminderFire, ReminderService, SystemClock};

use super::{print_json, CmdResult};

#[derive(Subcommand)]
pub enum RemindAction {
    /// Evaluate reminders once for the current minute
    Check {
        /// Evaluate at this local time instead, "YYYY-MM-DD HH:MM"
        #[arg(long, value_parser = parse_local_time)]
        at: Option<NaiveDateTime>,
    },
    /// Keep evaluating reminders until interrupted (Ctrl-C)
    Watch,
}

fn parse_local_time(raw: &str) -> Result<NaiveDateTime, String> {
    NaiveDateTime::parse_from_str(raw, "%Y-%m-%d %H:%M")
        .map_err(|e| format!("expected \"YYYY-MM-DD HH:MM\": {e}"))
}

/// Prints each reminder to stdout as one JSON line.
struct StdoutNotifier;

impl Notifier for StdoutNotifier {
    fn notify(&self, fire: &ReminderFire) -> Result<(), NotifyError> {
        let line = serde_json::to_string(fire).map_err(|e| NotifyError::Delivery(e.to_string()))?;
        println!("{line}");
        Ok(())
    }
}

fn check_once<C: Clock>(db: Database, clock: C, config: &Config) -> CmdResult {
    let notifier = RecordingNotifier::new();
    let mut service = ReminderService::new(db, &notifier, clock, config);
    let fires = service.tick_once()?;
    print_json(&fires)
}

pub fn run(action: RemindAction) -> CmdResult {
    let db = Database::open()?;
    let config = Config::load_or_default();

    match action {
        RemindAction::Check { at } => match at {
            Some(at) => check_once(db, FixedClock::new(at), &config)?,
            None => check_once(db, SystemClock, &config)?,
        },
        RemindAction::Watch => {
            let runtime = tokio::runtime::Builder::new_current_thread()
                .enable_all()
                .build()?;
            let mut service = ReminderService::new(db, StdoutNotifier, SystemClock, &config);
            eprintln!(
                "watching reminders every {}s, press Ctrl-C to stop",
                service.period().as_secs()
            );
            runtime.block_on(service.run(async {
                if let Err(e) = tokio::signal::ctrl_c().await {
                    tracing::warn!(error = %e, "cannot listen for Ctrl-C");
                    std::future::pending::<()>().await;
                }
            }));
        }
    }
    Ok(())
}
