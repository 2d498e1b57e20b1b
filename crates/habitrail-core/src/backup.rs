//! Full JSON backups.
//!
//! A [`Backup`] carries every habit, task, journal entry and focus session.
//! Restoring is an upsert keyed by id (by date for the journal), so restoring
//! the same backup twice leaves the database unchanged. The notification log
//! is not part of a backup.

use chrono::{DateTime, Utc};
use serde::{Deserialize, Serialize};
use serde_json::Value;

use crate::date_key::DateKey;
use crate::error::{CoreError, Result, ValidationError};
use crate::focus::FocusSession;
use crate::habit::{Habit, StreakEngine};
use crate::journal::JournalEntry;
use crate::storage::Database;
use crate::task::Task;

/// Version written into every backup. Restore accepts only this version.
pub const BACKUP_FORMAT: u32 = 1;

#[derive(Debug, Clone, PartialEq, Serialize, Deserialize)]
pub struct Backup {
    pub format: u32,
    pub exported_at: DateTime<Utc>,
    #[serde(default)]
    pub habits: Vec<Habit>,
    #[serde(default)]
    pub tasks: Vec<Task>,
    #[serde(default)]
    pub journal: Vec<JournalEntry>,
    #[serde(default)]
    pub focus_sessions: Vec<FocusSession>,
}

/// Counts written by [`Backup::restore`].
#[derive(Debug, Clone, Copy, Default, PartialEq, Eq, Serialize)]
pub struct RestoreSummary {
    pub habits: usize,
    pub tasks: usize,
    pub journal: usize,
    pub focus_sessions: usize,
    pub skipped: usize,
}

impl Backup {
    /// Snapshot everything in `db`, archived habits included.
    pub fn collect(db: &Database) -> Result<Self> {
        let backup = Self {
            format: BACKUP_FORMAT,
            exported_at: Utc::now(),
            habits: db.list_habits(true)?,
            tasks: db.list_tasks(&Default::default())?,
            journal: db.all_journal_entries()?,
            focus_sessions: db.list_focus_sessions(None, None)?,
        };
        tracing::info!(
            habits = backup.habits.len(),
            tasks = backup.tasks.len(),
            journal = backup.journal.len(),
            focus_sessions = backup.focus_sessions.len(),
            "backup collected"
        );
        Ok(backup)
    }

    /// `Ok(None)` when `raw` is not a backup document at all, so callers can
    /// fall back to the legacy importer.
    ///
    /// # Errors
    /// Fails when the document declares a `format` but has another version
    /// or does not decode.
    pub fn from_json(raw: &str) -> Result<Option<Self>> {
        let Ok(value) = serde_json::from_str::<Value>(raw) else {
            return Ok(None);
        };
        let Some(format) = value.get("format") else {
            return Ok(None);
        };
        if format.as_u64() != Some(u64::from(BACKUP_FORMAT)) {
            return Err(ValidationError::InvalidValue {
                field: "format".to_string(),
                message: format!("unsupported backup format {format}, expected {BACKUP_FORMAT}"),
            }
            .into());
        }
        Ok(Some(serde_json::from_value(value)?))
    }

    pub fn to_json(&self) -> Result<String> {
        serde_json::to_string_pretty(self).map_err(CoreError::from)
    }

    /// Write the backup into `db`. Streaks are recomputed for `today`.
    /// Journal entries with a rating outside 1..=5 are skipped.
    pub fn restore(&self, db: &Database, today: DateKey, engine: &StreakEngine) -> Result<RestoreSummary> {
        let mut summary = RestoreSummary::default();

        for habit in &self.habits {
            let mut habit = habit.clone();
            habit.refresh_streak(today, engine);
            db.save_habit(&habit)?;
            summary.habits += 1;
        }

        for task in &self.tasks {
            if db.get_task(&task.id)?.is_some() {
                db.update_task(task)?;
            } else {
                db.create_task(task)?;
            }
            summary.tasks += 1;
        }

        for entry in &self.journal {
            if !(1..=5).contains(&entry.rating) {
                tracing::warn!(date = %entry.date, rating = entry.rating, "skipping journal entry with bad rating");
                summary.skipped += 1;
                continue;
            }
            db.save_journal_entry(entry)?;
            summary.journal += 1;
        }

        for session in &self.focus_sessions {
            db.delete_focus_session(&session.id)?;
            db.record_focus_session(session)?;
            summary.focus_sessions += 1;
        }

        tracing::info!(?summary, "backup restored");
        Ok(summary)
    }
}

#[cfg(test)]
mod tests {
    use super::*;
    use crate::focus::SessionKind;
    use crate::habit::HabitDraft;
    use crate::task::TaskDraft;

    fn key(s: &str) -> DateKey {
        DateKey::parse(s).unwrap()
    }

    fn seeded() -> Database {
        let db = Database::open_memory().unwrap();
        let today = key("2024-06-10");
        let engine = StreakEngine::new();

        let mut habit = Habit::new(HabitDraft::named("Read")).unwrap();
        habit.mark_completed(key("2024-06-09"), today, &engine);
        habit.mark_completed(today, today, &engine);
        db.save_habit(&habit).unwrap();

        let mut archived = Habit::new(HabitDraft::named("Old")).unwrap();
        archived.archived = true;
        db.save_habit(&archived).unwrap();

        db.create_task(&Task::new(TaskDraft::new("Rent", today)).unwrap())
            .unwrap();
        db.save_journal_entry(&JournalEntry::new(today, "Fine", "", 4).unwrap())
            .unwrap();

        let ended = Utc::now();
        let started = ended - chrono::Duration::minutes(25);
        let session =
            FocusSession::record("task-1", today, started, ended, SessionKind::Focus).unwrap();
        db.record_focus_session(&session).unwrap();
        db
    }

    #[test]
    fn collect_and_restore_into_empty_database() {
        let source = seeded();
        let backup = Backup::collect(&source).unwrap();
        assert_eq!(backup.habits.len(), 2);

        let json = backup.to_json().unwrap();
        let parsed = Backup::from_json(&json).unwrap().unwrap();
        assert_eq!(parsed, backup);

        let target = Database::open_memory().unwrap();
        let summary = parsed
            .restore(&target, key("2024-06-10"), &StreakEngine::new())
            .unwrap();
        assert_eq!(
            summary,
            RestoreSummary {
                habits: 2,
                tasks: 1,
                journal: 1,
                focus_sessions: 1,
                skipped: 0
            }
        );
        let restored = Backup::collect(&target).unwrap();
        let ids = |b: &Backup| b.habits.iter().map(|h| h.id.clone()).collect::<Vec<_>>();
        assert_eq!(ids(&restored), ids(&backup));
        assert_eq!(restored.habits[0].completed_dates, backup.habits[0].completed_dates);
        assert_eq!(restored.focus_sessions[0].id, backup.focus_sessions[0].id);
        assert_eq!(restored.journal[0].rating, 4);
    }

    #[test]
    fn restoring_twice_does_not_duplicate() {
        let db = seeded();
        let backup = Backup::collect(&db).unwrap();
        backup
            .restore(&db, key("2024-06-10"), &StreakEngine::new())
            .unwrap();

        assert_eq!(db.list_habits(true).unwrap().len(), 2);
        assert_eq!(db.list_tasks(&Default::default()).unwrap().len(), 1);
        assert_eq!(db.list_focus_sessions(None, None).unwrap().len(), 1);
    }

    #[test]
    fn restore_recomputes_streaks() {
        let db = seeded();
        let backup = Backup::collect(&db).unwrap();
        let later = Database::open_memory().unwrap();
        backup
            .restore(&later, key("2024-06-20"), &StreakEngine::new())
            .unwrap();
        let read = later
            .list_habits(false)
            .unwrap()
            .into_iter()
            .find(|h| h.name == "Read")
            .unwrap();
        assert_eq!((read.streak, read.best_streak), (0, 2));
    }

    #[test]
    fn legacy_documents_are_not_backups() {
        assert!(Backup::from_json(r#"{"habits": {}}"#).unwrap().is_none());
        assert!(Backup::from_json("not json").unwrap().is_none());
    }

    #[test]
    fn unknown_format_is_rejected() {
        let raw = r#"{"format": 99, "exported_at": "2024-06-10T00:00:00Z"}"#;
        assert!(matches!(
            Backup::from_json(raw),
            Err(CoreError::Validation(ValidationError::InvalidValue { .. }))
        ));
    }

    #[test]
    fn bad_journal_rating_is_skipped() {
        let raw = r#"{"format": 1, "exported_at": "2024-06-10T00:00:00Z",
                      "journal": [{"date": "2024-06-01", "rating": 9, "updated_at": "2024-06-01T20:00:00Z"}]}"#;
        let backup = Backup::from_json(raw).unwrap().unwrap();
        let db = Database::open_memory().unwrap();
        let summary = backup
            .restore(&db, key("2024-06-10"), &StreakEngine::new())
            .unwrap();
        assert_eq!((summary.journal, summary.skipped), (0, 1));
        assert!(db.get_journal_entry(key("2024-06-01")).unwrap().is_none());
    }
}
