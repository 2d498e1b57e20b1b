//! SQLite-based storage for habits and their completion sets.
//!
//! Provides persistent storage for:
//! - Habits, with one row per completed day in `habit_completions`
//! - Key-value store for application state
//!
//! Tasks, journal entries, focus sessions and notifications live in the same
//! database; their queries are in sibling modules.

use std::collections::HashMap;
use std::path::Path;

use chrono::{DateTime, Utc};
use rusqlite::{params, Connection, OptionalExtension, Row};

use super::{data_dir, migrations};
use crate::date_key::{CompletionSet, DateKey};
use crate::error::{CoreError, DatabaseError, Result};
use crate::habit::{Frequency, Habit, HabitCategory, HabitGoal, HabitType, StreakEngine};
use crate::reminder::Reminder;

pub const DB_FILE_NAME: &str = "habitrail.db";

/// SQLite database for all habitrail records.
pub struct Database {
    conn: Connection,
}

impl Database {
    /// Get a reference to the underlying SQLite connection.
    pub fn conn(&self) -> &Connection {
        &self.conn
    }

    /// Open the database in the data directory (see [`data_dir`]).
    ///
    /// Creates the database file and schema if they don't exist.
    ///
    /// # Errors
    /// Returns an error if the database cannot be opened or migrated.
    pub fn open() -> Result<Self> {
        let path = data_dir()?.join(DB_FILE_NAME);
        Self::open_at(&path)
    }

    /// Open (or create) the database at an explicit path.
    ///
    /// # Errors
    /// Returns an error if the database cannot be opened or migrated.
    pub fn open_at(path: &Path) -> Result<Self> {
        let conn = Connection::open(path).map_err(|source| DatabaseError::OpenFailed {
            path: path.to_path_buf(),
            source,
        })?;
        tracing::debug!(path = %path.display(), "opened database");
        Self::init(conn)
    }

    /// Open an in-memory database.
    ///
    /// # Errors
    /// Returns an error if the schema cannot be created.
    pub fn open_memory() -> Result<Self> {
        let conn = Connection::open_in_memory()?;
        Self::init(conn)
    }

    fn init(conn: Connection) -> Result<Self> {
        conn.execute_batch("PRAGMA foreign_keys = ON;")?;
        migrations::migrate(&conn).map_err(|e| DatabaseError::MigrationFailed(e.to_string()))?;
        Ok(Self { conn })
    }

    // === Habits ===

    /// Insert or replace a habit. The stored completion set is replaced by
    /// the habit's set in the same transaction.
    ///
    /// # Errors
    /// Returns an error if any statement fails; nothing is written then.
    pub fn save_habit(&self, habit: &Habit) -> Result<()> {
        let reminder = habit.reminder.as_ref().map(serde_json::to_string).transpose()?;
        let goal = habit.goal.as_ref().map(serde_json::to_string).transpose()?;

        let tx = self.conn.unchecked_transaction()?;
        tx.execute(
            "INSERT INTO habits (id, name, habit_type, category, color, icon, start_date, created_at,
                                 archived, frequency, reminder, goal, notes, streak, best_streak, last_completed)
             VALUES (?1, ?2, ?3, ?4, ?5, ?6, ?7, ?8, ?9, ?10, ?11, ?12, ?13, ?14, ?15, ?16)
             ON CONFLICT(id) DO UPDATE SET
                name = excluded.name,
                habit_type = excluded.habit_type,
                category = excluded.category,
                color = excluded.color,
                icon = excluded.icon,
                start_date = excluded.start_date,
                created_at = excluded.created_at,
                archived = excluded.archived,
                frequency = excluded.frequency,
                reminder = excluded.reminder,
                goal = excluded.goal,
                notes = excluded.notes,
                streak = excluded.streak,
                best_streak = excluded.best_streak,
                last_completed = excluded.last_completed",
            params![
                habit.id,
                habit.name,
                habit.habit_type.as_str(),
                habit.category.as_str(),
                habit.color,
                habit.icon,
                habit.start_date.to_string(),
                habit.created_at.to_rfc3339(),
                habit.archived,
                habit.frequency.as_str(),
                reminder,
                goal,
                habit.notes,
                habit.streak,
                habit.best_streak,
                habit.last_completed.map(|t| t.to_rfc3339()),
            ],
        )?;

        tx.execute(
            "DELETE FROM habit_completions WHERE habit_id = ?1",
            params![habit.id],
        )?;
        {
            let mut stmt =
                tx.prepare("INSERT INTO habit_completions (habit_id, date_key) VALUES (?1, ?2)")?;
            for day in &habit.completed_dates {
                stmt.execute(params![habit.id, day.to_string()])?;
            }
        }
        tx.commit()?;
        Ok(())
    }

    /// Load one habit with its completion set.
    pub fn get_habit(&self, id: &str) -> Result<Option<Habit>> {
        let row = self
            .conn
            .query_row(
                &format!("SELECT {HABIT_COLUMNS} FROM habits WHERE id = ?1"),
                params![id],
                HabitRow::from_row,
            )
            .optional()?;
        let Some(row) = row else {
            return Ok(None);
        };
        let completed = self.completion_set(id)?;
        row.into_habit(completed).map(Some)
    }

    /// Load a habit or fail with [`CoreError::NotFound`].
    pub fn require_habit(&self, id: &str) -> Result<Habit> {
        self.get_habit(id)?.ok_or_else(|| CoreError::NotFound {
            kind: "Habit",
            id: id.to_string(),
        })
    }

    /// All habits ordered by creation time.
    pub fn list_habits(&self, include_archived: bool) -> Result<Vec<Habit>> {
        let mut stmt = self.conn.prepare(&format!(
            "SELECT {HABIT_COLUMNS} FROM habits
             WHERE ?1 OR archived = 0
             ORDER BY created_at ASC, id ASC"
        ))?;
        let rows = stmt
            .query_map(params![include_archived], HabitRow::from_row)?
            .collect::<rusqlite::Result<Vec<_>>>()?;

        let mut completions = self.all_completions()?;
        rows.into_iter()
            .map(|row| {
                let completed = completions.remove(&row.id).unwrap_or_default();
                row.into_habit(completed)
            })
            .collect()
    }

    /// Delete a habit and its completion history. Returns `false` if no such habit.
    pub fn delete_habit(&self, id: &str) -> Result<bool> {
        let tx = self.conn.unchecked_transaction()?;
        tx.execute("DELETE FROM habit_completions WHERE habit_id = ?1", params![id])?;
        let deleted = tx.execute("DELETE FROM habits WHERE id = ?1", params![id])?;
        tx.commit()?;
        Ok(deleted > 0)
    }

    /// Toggle `date` for a stored habit, recompute its streaks for `today`
    /// and persist the result.
    pub fn toggle_completion(
        &self,
        id: &str,
        date: DateKey,
        today: DateKey,
        engine: &StreakEngine,
    ) -> Result<Habit> {
        let mut habit = self.require_habit(id)?;
        habit.toggle_completion(date, today, engine);
        self.save_habit(&habit)?;
        Ok(habit)
    }

    /// Recompute and persist streaks of every habit for `today`.
    ///
    /// Returns the refreshed habits.
    pub fn refresh_streaks(&self, today: DateKey, engine: &StreakEngine) -> Result<Vec<Habit>> {
        let mut habits = self.list_habits(true)?;
        for habit in &mut habits {
            let before = (habit.streak, habit.best_streak);
            habit.refresh_streak(today, engine);
            if before != (habit.streak, habit.best_streak) {
                self.save_habit(habit)?;
            }
        }
        Ok(habits)
    }

    fn completion_set(&self, habit_id: &str) -> Result<CompletionSet> {
        let mut stmt = self
            .conn
            .prepare("SELECT date_key FROM habit_completions WHERE habit_id = ?1")?;
        let keys = stmt
            .query_map(params![habit_id], |row| row.get::<_, String>(0))?
            .collect::<rusqlite::Result<Vec<_>>>()?;
        Ok(CompletionSet::from_keys(keys))
    }

    fn all_completions(&self) -> Result<HashMap<String, CompletionSet>> {
        let mut stmt = self
            .conn
            .prepare("SELECT habit_id, date_key FROM habit_completions")?;
        let rows = stmt.query_map([], |row| {
            Ok((row.get::<_, String>(0)?, row.get::<_, String>(1)?))
        })?;

        let mut grouped: HashMap<String, Vec<String>> = HashMap::new();
        for row in rows {
            let (habit_id, key) = row?;
            grouped.entry(habit_id).or_default().push(key);
        }
        Ok(grouped
            .into_iter()
            .map(|(id, keys)| (id, CompletionSet::from_keys(keys)))
            .collect())
    }

    // === Key-value store ===

    /// Get a value from the kv store.
    pub fn kv_get(&self, key: &str) -> Result<Option<String>> {
        let value = self
            .conn
            .query_row("SELECT value FROM kv WHERE key = ?1", params![key], |row| {
                row.get::<_, String>(0)
            })
            .optional()?;
        Ok(value)
    }

    /// Set a value in the kv store.
    pub fn kv_set(&self, key: &str, value: &str) -> Result<()> {
        self.conn.execute(
            "INSERT OR REPLACE INTO kv (key, value) VALUES (?1, ?2)",
            params![key, value],
        )?;
        Ok(())
    }
}

const HABIT_COLUMNS: &str = "id, name, habit_type, category, color, icon, start_date, created_at, \
     archived, frequency, reminder, goal, notes, streak, best_streak, last_completed";

/// Raw `habits` row before decoding into domain types.
struct HabitRow {
    id: String,
    name: String,
    habit_type: String,
    category: String,
    color: String,
    icon: String,
    start_date: String,
    created_at: String,
    archived: bool,
    frequency: String,
    reminder: Option<String>,
    goal: Option<String>,
    notes: Option<String>,
    streak: u32,
    best_streak: u32,
    last_completed: Option<String>,
}

impl HabitRow {
    fn from_row(row: &Row<'_>) -> rusqlite::Result<Self> {
        Ok(Self {
            id: row.get(0)?,
            name: row.get(1)?,
            habit_type: row.get(2)?,
            category: row.get(3)?,
            color: row.get(4)?,
            icon: row.get(5)?,
            start_date: row.get(6)?,
            created_at: row.get(7)?,
            archived: row.get(8)?,
            frequency: row.get(9)?,
            reminder: row.get(10)?,
            goal: row.get(11)?,
            notes: row.get(12)?,
            streak: row.get(13)?,
            best_streak: row.get(14)?,
            last_completed: row.get(15)?,
        })
    }

    fn into_habit(self, completed_dates: CompletionSet) -> Result<Habit> {
        let created_at = parse_timestamp("habits", &self.created_at)?;
        let start_date = DateKey::parse(&self.start_date)
            .unwrap_or_else(|_| DateKey::from_date(created_at.date_naive()));
        let reminder: Option<Reminder> = decode_json_column(&self.id, "reminder", self.reminder);
        let goal: Option<HabitGoal> = decode_json_column(&self.id, "goal", self.goal);
        let last_completed = self
            .last_completed
            .as_deref()
            .and_then(|raw| parse_timestamp("habits", raw).ok());

        Ok(Habit {
            id: self.id,
            name: self.name,
            habit_type: HabitType::parse_lenient(&self.habit_type),
            category: HabitCategory::parse_lenient(&self.category),
            color: self.color,
            icon: self.icon,
            start_date,
            created_at,
            archived: self.archived,
            completed_dates,
            frequency: Frequency::parse_lenient(&self.frequency),
            reminder,
            goal,
            notes: self.notes,
            streak: self.streak,
            // Rows written by other tools may violate the invariant.
            best_streak: self.best_streak.max(self.streak),
            last_completed,
        })
    }
}

/// Malformed JSON columns decode as "no data".
fn decode_json_column<T: serde::de::DeserializeOwned>(
    habit_id: &str,
    column: &str,
    raw: Option<String>,
) -> Option<T> {
    let raw = raw?;
    match serde_json::from_str(&raw) {
        Ok(value) => Some(value),
        Err(e) => {
            tracing::warn!(habit = habit_id, column, error = %e, "ignoring malformed column");
            None
        }
    }
}

pub(crate) fn parse_timestamp(table: &'static str, raw: &str) -> Result<DateTime<Utc>> {
    DateTime::parse_from_rfc3339(raw)
        .map(|t| t.with_timezone(&Utc))
        .map_err(|e| {
            DatabaseError::CorruptRow {
                table,
                message: format!("bad timestamp '{raw}': {e}"),
            }
            .into()
        })
}

#[cfg(test)]
mod tests {
    use super::*;
    use crate::date_key::TimeOfDay;
    use crate::habit::HabitDraft;
    use crate::reminder::WeekdaySet;

    fn key(s: &str) -> DateKey {
        DateKey::parse(s).unwrap()
    }

    fn sample_habit() -> Habit {
        let mut draft = HabitDraft::named("Drink water");
        draft.category = HabitCategory::Health;
        draft.reminder = Some(Reminder::new(
            TimeOfDay::parse("09:00").unwrap(),
            WeekdaySet::WEEKDAYS,
        ));
        let mut habit = Habit::new(draft).unwrap();
        habit.completed_dates = CompletionSet::from_keys(["2024-05-08", "2024-05-09", "2024-05-10"]);
        habit
    }

    #[test]
    fn save_and_load_round_trip() {
        let db = Database::open_memory().unwrap();
        let habit = sample_habit();
        db.save_habit(&habit).unwrap();

        let loaded = db.get_habit(&habit.id).unwrap().unwrap();
        assert_eq!(loaded.completed_dates, habit.completed_dates);
        assert_eq!(loaded.reminder, habit.reminder);
        assert_eq!(loaded.category, HabitCategory::Health);
        assert_eq!(loaded.name, "Drink water");
    }

    #[test]
    fn save_replaces_completion_set() {
        let db = Database::open_memory().unwrap();
        let mut habit = sample_habit();
        db.save_habit(&habit).unwrap();

        habit.completed_dates = CompletionSet::from_keys(["2024-01-01"]);
        db.save_habit(&habit).unwrap();

        let loaded = db.get_habit(&habit.id).unwrap().unwrap();
        assert_eq!(loaded.completed_dates.len(), 1);
        assert!(loaded.is_completed_on(key("2024-01-01")));
    }

    #[test]
    fn toggle_completion_persists_streaks() {
        let db = Database::open_memory().unwrap();
        let engine = StreakEngine::new();
        let habit = sample_habit();
        db.save_habit(&habit).unwrap();

        let today = key("2024-05-11");
        let updated = db.toggle_completion(&habit.id, today, today, &engine).unwrap();
        assert_eq!((updated.streak, updated.best_streak), (4, 4));

        let loaded = db.get_habit(&habit.id).unwrap().unwrap();
        assert_eq!((loaded.streak, loaded.best_streak), (4, 4));
    }

    #[test]
    fn toggle_unknown_habit_is_not_found() {
        let db = Database::open_memory().unwrap();
        let today = key("2024-05-11");
        let err = db
            .toggle_completion("missing", today, today, &StreakEngine::new())
            .unwrap_err();
        assert!(matches!(err, CoreError::NotFound { .. }));
    }

    #[test]
    fn list_hides_archived_unless_asked() {
        let db = Database::open_memory().unwrap();
        let active = sample_habit();
        let mut archived = sample_habit();
        archived.archived = true;
        db.save_habit(&active).unwrap();
        db.save_habit(&archived).unwrap();

        assert_eq!(db.list_habits(false).unwrap().len(), 1);
        let all = db.list_habits(true).unwrap();
        assert_eq!(all.len(), 2);
        assert!(all.iter().all(|h| h.completed_dates.len() == 3));
    }

    #[test]
    fn delete_removes_history() {
        let db = Database::open_memory().unwrap();
        let habit = sample_habit();
        db.save_habit(&habit).unwrap();
        assert!(db.delete_habit(&habit.id).unwrap());
        assert!(!db.delete_habit(&habit.id).unwrap());

        let orphans: i64 = db
            .conn()
            .query_row("SELECT COUNT(*) FROM habit_completions", [], |r| r.get(0))
            .unwrap();
        assert_eq!(orphans, 0);
    }

    #[test]
    fn malformed_rows_degrade_gracefully() {
        let db = Database::open_memory().unwrap();
        let habit = sample_habit();
        db.save_habit(&habit).unwrap();
        db.conn()
            .execute(
                "UPDATE habits SET reminder = '{not json', category = 'gardening' WHERE id = ?1",
                params![habit.id],
            )
            .unwrap();
        db.conn()
            .execute(
                "INSERT INTO habit_completions (habit_id, date_key) VALUES (?1, 'yesterday')",
                params![habit.id],
            )
            .unwrap();

        let loaded = db.get_habit(&habit.id).unwrap().unwrap();
        assert!(loaded.reminder.is_none());
        assert_eq!(loaded.category, HabitCategory::Other);
        assert_eq!(loaded.completed_dates.len(), 3);
    }

    #[test]
    fn refresh_streaks_updates_stale_rows() {
        let db = Database::open_memory().unwrap();
        let habit = sample_habit();
        db.save_habit(&habit).unwrap();

        let refreshed = db
            .refresh_streaks(key("2024-05-10"), &StreakEngine::new())
            .unwrap();
        assert_eq!(refreshed[0].streak, 3);
        assert_eq!(db.get_habit(&habit.id).unwrap().unwrap().best_streak, 3);
    }

    #[test]
    fn kv_store() {
        let db = Database::open_memory().unwrap();
        assert!(db.kv_get("test").unwrap().is_none());
        db.kv_set("test", "hello").unwrap();
        assert_eq!(db.kv_get("test").unwrap().unwrap(), "hello");
    }
}
