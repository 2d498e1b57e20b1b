//! Statistics command for CLI.

use habitrail_core::stats::CONSISTENCY_WINDOW_DAYS;
use habitrail_core::{Database, DateKey, StatsReport, TaskFilter};

use super::{print_json, CmdResult};

pub fn run(date: Option<DateKey>) -> CmdResult {
    let db = Database::open()?;
    let today = DateKey::today();
    let day = date.unwrap_or(today);

    let habits = db.list_habits(false)?;
    let tasks = db.list_tasks(&TaskFilter::default())?;
    let journal = db.list_journal_entries(today.days_back(CONSISTENCY_WINDOW_DAYS - 1), today)?;

    print_json(&StatsReport::compute(&habits, &tasks, &journal, today, day))
}
