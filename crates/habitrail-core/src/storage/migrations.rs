//! Database schema migrations for habitrail.
//!
//! Migrations are versioned and applied automatically when opening the database.
//! The `schema_version` table tracks the current migration version.

use rusqlite::{Connection, Result as SqliteResult};

/// Current schema version.
///
/// Increment this when adding new migrations.
pub const CURRENT_VERSION: i32 = 3;

/// Apply all pending migrations to bring the database to the current schema version.
///
/// # Errors
/// Returns an error if migration fails.
pub fn migrate(conn: &Connection) -> SqliteResult<()> {
    create_schema_version_table(conn)?;

    let current_version = get_schema_version(conn);

    if current_version < 1 {
        migrate_v1(conn)?;
    }
    if current_version < 2 {
        migrate_v2(conn)?;
    }
    if current_version < 3 {
        migrate_v3(conn)?;
    }

    Ok(())
}

fn create_schema_version_table(conn: &Connection) -> SqliteResult<()> {
    conn.execute_batch(
        "CREATE TABLE IF NOT EXISTS schema_version (
            version INTEGER PRIMARY KEY
        );",
    )
}

/// Get the current schema version from the database.
///
/// Returns 0 if no version is set (initial database).
pub fn get_schema_version(conn: &Connection) -> i32 {
    conn.query_row("SELECT version FROM schema_version", [], |row| {
        row.get::<_, i32>(0)
    })
    .unwrap_or_else(|e| {
        if !matches!(e, rusqlite::Error::QueryReturnedNoRows) {
            tracing::warn!(error = %e, "failed to read schema_version");
        }
        0
    })
}

fn set_schema_version(conn: &Connection, version: i32) -> SqliteResult<()> {
    conn.execute("DELETE FROM schema_version", [])?;
    conn.execute("INSERT INTO schema_version (version) VALUES (?1)", [version])?;
    Ok(())
}

/// Migration v1: habits, their completion sets, tasks and the kv store.
fn migrate_v1(conn: &Connection) -> SqliteResult<()> {
    let tx = conn.unchecked_transaction()?;

    tx.execute_batch(
        "CREATE TABLE IF NOT EXISTS habits (
            id             TEXT PRIMARY KEY,
            name           TEXT NOT NULL,
            habit_type     TEXT NOT NULL DEFAULT 'daily',
            category       TEXT NOT NULL DEFAULT 'other',
            color          TEXT NOT NULL,
            icon           TEXT NOT NULL,
            start_date     TEXT NOT NULL,
            created_at     TEXT NOT NULL,
            archived       INTEGER NOT NULL DEFAULT 0,
            frequency      TEXT NOT NULL DEFAULT 'Daily',
            reminder       TEXT,
            goal           TEXT,
            notes          TEXT,
            streak         INTEGER NOT NULL DEFAULT 0,
            best_streak    INTEGER NOT NULL DEFAULT 0,
            last_completed TEXT
        );

        CREATE TABLE IF NOT EXISTS habit_completions (
            habit_id TEXT NOT NULL REFERENCES habits(id) ON DELETE CASCADE,
            date_key TEXT NOT NULL,
            PRIMARY KEY (habit_id, date_key)
        );

        CREATE TABLE IF NOT EXISTS tasks (
            id          TEXT PRIMARY KEY,
            title       TEXT NOT NULL,
            description TEXT NOT NULL DEFAULT '',
            due_date    TEXT NOT NULL,
            priority    TEXT NOT NULL DEFAULT 'Medium',
            status      TEXT NOT NULL DEFAULT 'Pending',
            created_at  TEXT NOT NULL
        );

        CREATE TABLE IF NOT EXISTS kv (
            key   TEXT PRIMARY KEY,
            value TEXT NOT NULL
        );

        CREATE INDEX IF NOT EXISTS idx_tasks_due_date ON tasks(due_date);",
    )?;

    set_schema_version(&tx, 1)?;
    tx.commit()
}

/// Migration v2: task time windows, journal entries and focus sessions.
///
/// Adds `start_time`/`stop_time` (`HH:MM`) to tasks.
fn migrate_v2(conn: &Connection) -> SqliteResult<()> {
    let tx = conn.unchecked_transaction()?;

    tx.execute_batch(
        "ALTER TABLE tasks ADD COLUMN start_time TEXT;
         ALTER TABLE tasks ADD COLUMN stop_time TEXT;

         CREATE TABLE IF NOT EXISTS journal_entries (
             date_key   TEXT PRIMARY KEY,
             title      TEXT NOT NULL DEFAULT '',
             body       TEXT NOT NULL DEFAULT '',
             rating     INTEGER NOT NULL DEFAULT 3,
             updated_at TEXT NOT NULL
         );

         CREATE TABLE IF NOT EXISTS focus_sessions (
             id               TEXT PRIMARY KEY,
             task_id          TEXT NOT NULL,
             date_key         TEXT NOT NULL,
             started_at       TEXT NOT NULL,
             ended_at         TEXT NOT NULL,
             duration_seconds INTEGER NOT NULL,
             kind             TEXT NOT NULL DEFAULT 'focus',
             status           TEXT NOT NULL DEFAULT 'completed'
         );

         CREATE INDEX IF NOT EXISTS idx_focus_sessions_task_date
             ON focus_sessions(task_id, date_key);",
    )?;

    set_schema_version(&tx, 2)?;
    tx.commit()
}

/// Migration v3: in-app notification log.
fn migrate_v3(conn: &Connection) -> SqliteResult<()> {
    let tx = conn.unchecked_transaction()?;

    tx.execute_batch(
        "CREATE TABLE IF NOT EXISTS notifications (
             id        TEXT PRIMARY KEY,
             title     TEXT NOT NULL,
             message   TEXT NOT NULL,
             timestamp TEXT NOT NULL,
             read      INTEGER NOT NULL DEFAULT 0,
             kind      TEXT NOT NULL DEFAULT 'system'
         );

         CREATE INDEX IF NOT EXISTS idx_notifications_timestamp
             ON notifications(timestamp);",
    )?;

    set_schema_version(&tx, 3)?;
    tx.commit()
}
