//! Focus-session queries.

use rusqlite::params;

use super::database::{parse_timestamp, Database};
use crate::date_key::DateKey;
use crate::error::{DatabaseError, Result};
use crate::focus::{FocusSession, SessionKind, SessionStatus};

fn corrupt(table: &'static str, message: impl ToString) -> DatabaseError {
    DatabaseError::CorruptRow {
        table,
        message: message.to_string(),
    }
}

impl Database {
    pub fn record_focus_session(&self, session: &FocusSession) -> Result<()> {
        self.conn().execute(
            "INSERT INTO focus_sessions (id, task_id, date_key, started_at, ended_at,
                                         duration_seconds, kind, status)
             VALUES (?1, ?2, ?3, ?4, ?5, ?6, ?7, ?8)",
            params![
                session.id,
                session.task_id,
                session.date.to_string(),
                session.started_at.to_rfc3339(),
                session.ended_at.to_rfc3339(),
                session.duration_seconds,
                session.kind.as_str(),
                session.status.as_str(),
            ],
        )?;
        Ok(())
    }

    /// Sessions filtered by task and/or first day, newest first.
    pub fn list_focus_sessions(
        &self,
        task_id: Option<&str>,
        since: Option<DateKey>,
    ) -> Result<Vec<FocusSession>> {
        let mut stmt = self.conn().prepare(
            "SELECT id, task_id, date_key, started_at, ended_at, duration_seconds, kind, status
             FROM focus_sessions
             WHERE (?1 IS NULL OR task_id = ?1) AND (?2 IS NULL OR date_key >= ?2)
             ORDER BY started_at DESC",
        )?;
        let rows = stmt
            .query_map(params![task_id, since.map(|d| d.to_string())], |row| {
                Ok((
                    row.get::<_, String>(0)?,
                    row.get::<_, String>(1)?,
                    row.get::<_, String>(2)?,
                    row.get::<_, String>(3)?,
                    row.get::<_, String>(4)?,
                    row.get::<_, u64>(5)?,
                    row.get::<_, String>(6)?,
                    row.get::<_, String>(7)?,
                ))
            })?
            .collect::<rusqlite::Result<Vec<_>>>()?;

        rows.into_iter()
            .map(|(id, task_id, date, started, ended, duration_seconds, kind, status)| {
                Ok(FocusSession {
                    id,
                    task_id,
                    date: DateKey::parse(&date).map_err(|e| corrupt("focus_sessions", e))?,
                    started_at: parse_timestamp("focus_sessions", &started)?,
                    ended_at: parse_timestamp("focus_sessions", &ended)?,
                    duration_seconds,
                    kind: kind.parse().unwrap_or(SessionKind::Focus),
                    status: SessionStatus::parse_lenient(&status),
                })
            })
            .collect()
    }

    pub fn delete_focus_session(&self, id: &str) -> Result<bool> {
        let deleted = self
            .conn()
            .execute("DELETE FROM focus_sessions WHERE id = ?1", params![id])?;
        Ok(deleted > 0)
    }
}
