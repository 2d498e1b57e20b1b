//! Daily journal commands for CLI.

use clap::Subcommand;
use habitrail_core::journal::DEFAULT_RATING;
use habitrail_core::{Database, DateKey, JournalEntry};

use super::{print_json, CmdResult};

#[derive(Subcommand)]
pub enum JournalAction {
    /// Write (or overwrite) the entry for a day
    Write {
        /// Entry text
        text: String,
        /// Entry title
        #[arg(long, default_value = "")]
        title: String,
        /// Day rating, 1 to 5
        #[arg(long, default_value_t = DEFAULT_RATING)]
        rating: u8,
        /// Day, YYYY-MM-DD (default: today)
        #[arg(long)]
        date: Option<DateKey>,
    },
    /// Show the entry for a day
    Show {
        /// Day, YYYY-MM-DD (default: today)
        date: Option<DateKey>,
    },
    /// List entries in a date range
    List {
        /// First day (default: 30 days ago)
        #[arg(long)]
        from: Option<DateKey>,
        /// Last day (default: today)
        #[arg(long)]
        to: Option<DateKey>,
    },
    /// Delete the entry for a day
    Delete {
        date: DateKey,
    },
}

pub fn run(action: JournalAction) -> CmdResult {
    let db = Database::open()?;

    match action {
        JournalAction::Write {
            text,
            title,
            rating,
            date,
        } => {
            let entry = JournalEntry::new(date.unwrap_or_else(DateKey::today), title, text, rating)?;
            if entry.is_blank() {
                return Err("journal entry is empty".into());
            }
            db.save_journal_entry(&entry)?;
            print_json(&entry)?;
        }
        JournalAction::Show { date } => {
            let date = date.unwrap_or_else(DateKey::today);
            match db.get_journal_entry(date)? {
                Some(entry) => print_json(&entry)?,
                None => return Err(format!("No journal entry for {date}").into()),
            }
        }
        JournalAction::List { from, to } => {
            let to = to.unwrap_or_else(DateKey::today);
            let from = from.unwrap_or_else(|| DateKey::from_date(to.date() - chrono::Days::new(30)));
            print_json(&db.list_journal_entries(from, to)?)?;
        }
        JournalAction::Delete { date } => {
            if !db.delete_journal_entry(date)? {
                return Err(format!("No journal entry for {date}").into());
            }
            println!("Journal entry deleted: {date}");
        }
    }
    Ok(())
}
