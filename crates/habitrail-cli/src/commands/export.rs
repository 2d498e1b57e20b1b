//! Backup export command for CLI.

use std::path::Path;

use habitrail_core::{Backup, Database};
use serde_json::json;

use super::{print_json, CmdResult};

/// Writes the backup to `out`, or to stdout when absent.
pub fn run(out: Option<&Path>) -> CmdResult {
    let db = Database::open()?;
    let backup = Backup::collect(&db)?;
    let json = backup.to_json()?;

    let Some(out) = out else {
        println!("{json}");
        return Ok(());
    };
    std::fs::write(out, json).map_err(|e| format!("cannot write {}: {e}", out.display()))?;
    print_json(&json!({
        "path": out.display().to_string(),
        "habits": backup.habits.len(),
        "tasks": backup.tasks.len(),
        "journal": backup.journal.len(),
        "focus_sessions": backup.focus_sessions.len(),
    }))
}
