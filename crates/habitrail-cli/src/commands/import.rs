//! Backup and legacy JSON import for CLI.

use std::path::Path;

use habitrail_core::legacy;
use habitrail_core::{Backup, Config, Database, DateKey, StreakEngine};

use super::{print_json, CmdResult};

pub fn run(file: &Path) -> CmdResult {
    let raw = std::fs::read_to_string(file)
        .map_err(|e| format!("cannot read {}: {e}", file.display()))?;
    let engine = StreakEngine::with_config(Config::load_or_default().streak_config());
    let today = DateKey::today();
    let db = Database::open()?;

    if let Some(backup) = Backup::from_json(&raw)? {
        let summary = backup.restore(&db, today, &engine)?;
        return print_json(&summary);
    }

    let import = legacy::parse(&raw, today, &engine);
    let summary = legacy::import_into(&db, &import)?;
    print_json(&summary)
}
