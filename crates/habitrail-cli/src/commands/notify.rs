//! Notification history commands for CLI.

use clap::Subcommand;
use habitrail_core::Database;

use super::{print_json, CmdResult};

#[derive(Subcommand)]
pub enum NotifyAction {
    /// List notifications, newest first
    List {
        /// Only unread notifications
        #[arg(long)]
        unread: bool,
        /// Show at most this many
        #[arg(long)]
        limit: Option<usize>,
    },
    /// Mark one notification read, or all with --all
    Read {
        /// Notification ID
        #[arg(required_unless_present = "all")]
        id: Option<String>,
        #[arg(long, conflicts_with = "id")]
        all: bool,
    },
    /// Delete every notification
    Clear,
}

pub fn run(action: NotifyAction) -> CmdResult {
    let db = Database::open()?;

    match action {
        NotifyAction::List { unread, limit } => {
            print_json(&db.list_notifications(unread, limit)?)?;
        }
        NotifyAction::Read { id, all } => {
            if all {
                let count = db.mark_all_notifications_read()?;
                println!("{count} notification(s) marked read");
            } else if let Some(id) = id {
                if !db.mark_notification_read(&id)? {
                    return Err(format!("Notification not found: {id}").into());
                }
                println!("Notification marked read: {id}");
            }
        }
        NotifyAction::Clear => {
            let count = db.clear_notifications()?;
            println!("{count} notification(s) cleared");
        }
    }
    Ok(())
}
