//! Focus session commands for CLI.

use chrono::{Duration, Utc};
use clap::Subcommand;
use habitrail_core::{Config, Database, DateKey, FocusRange, FocusSession, FocusStats, SessionKind, SessionStatus};

use super::{print_json, CmdResult};

#[derive(Subcommand)]
pub enum FocusAction {
    /// Log a finished session that ended now
    Log {
        /// Task the session belongs to
        task_id: String,
        /// Length in minutes (default: the configured length for the kind)
        #[arg(long)]
        minutes: Option<u32>,
        /// focus, short_break or long_break
        #[arg(long, default_value = "focus")]
        kind: SessionKind,
        /// Mark the session as interrupted
        #[arg(long)]
        interrupted: bool,
    },
    /// List sessions, newest first
    List {
        /// Only sessions for this task
        #[arg(long)]
        task: Option<String>,
        /// Only sessions from this day on
        #[arg(long)]
        since: Option<DateKey>,
    },
    /// Minute totals over a range
    Totals {
        /// day, week, month, year or all
        #[arg(long, default_value = "week")]
        range: FocusRange,
        /// Only sessions for this task
        #[arg(long)]
        task: Option<String>,
    },
    /// Delete a session
    Delete {
        id: String,
    },
}

pub fn run(action: FocusAction) -> CmdResult {
    let db = Database::open()?;

    match action {
        FocusAction::Log {
            task_id,
            minutes,
            kind,
            interrupted,
        } => {
            db.require_task(&task_id)?;
            let focus = Config::load_or_default().focus;
            let minutes = minutes.unwrap_or(match kind {
                SessionKind::Focus => focus.focus_minutes,
                SessionKind::ShortBreak => focus.short_break_minutes,
                SessionKind::LongBreak => focus.long_break_minutes,
            });
            let ended_at = Utc::now();
            let started_at = ended_at - Duration::minutes(i64::from(minutes));
            let Some(mut session) =
                FocusSession::record(task_id, DateKey::today(), started_at, ended_at, kind)
            else {
                return Err("session too short to log".into());
            };
            if interrupted {
                session.status = SessionStatus::Interrupted;
            }
            db.record_focus_session(&session)?;
            print_json(&session)?;
        }
        FocusAction::List { task, since } => {
            print_json(&db.list_focus_sessions(task.as_deref(), since)?)?;
        }
        FocusAction::Totals { range, task } => {
            let since = range.start(DateKey::today());
            let sessions = db.list_focus_sessions(task.as_deref(), since)?;
            print_json(&FocusStats::from_sessions(&sessions))?;
        }
        FocusAction::Delete { id } => {
            if !db.delete_focus_session(&id)? {
                return Err(format!("Focus session not found: {id}").into());
            }
            println!("Focus session deleted: {id}");
        }
    }
    Ok(())
}
