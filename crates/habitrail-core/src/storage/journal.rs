//! Journal entry queries.

use rusqlite::{params, OptionalExtension};

use super::database::{parse_timestamp, Database};
use crate::date_key::DateKey;
use crate::error::{DatabaseError, Result};
use crate::journal::JournalEntry;

impl Database {
    /// Store the entry for its day, replacing any previous one.
    pub fn save_journal_entry(&self, entry: &JournalEntry) -> Result<()> {
        self.conn().execute(
            "INSERT OR REPLACE INTO journal_entries (date_key, title, body, rating, updated_at)
             VALUES (?1, ?2, ?3, ?4, ?5)",
            params![
                entry.date.to_string(),
                entry.title,
                entry.text,
                entry.rating,
                entry.updated_at.to_rfc3339(),
            ],
        )?;
        Ok(())
    }

    pub fn get_journal_entry(&self, date: DateKey) -> Result<Option<JournalEntry>> {
        let raw = self
            .conn()
            .query_row(
                "SELECT title, body, rating, updated_at FROM journal_entries WHERE date_key = ?1",
                params![date.to_string()],
                |row| {
                    Ok((
                        row.get::<_, String>(0)?,
                        row.get::<_, String>(1)?,
                        row.get::<_, u8>(2)?,
                        row.get::<_, String>(3)?,
                    ))
                },
            )
            .optional()?;

        let Some((title, text, rating, updated_at)) = raw else {
            return Ok(None);
        };
        Ok(Some(JournalEntry {
            date,
            title,
            text,
            rating,
            updated_at: parse_timestamp("journal_entries", &updated_at)?,
        }))
    }

    /// Entries in the inclusive range, oldest first.
    pub fn list_journal_entries(&self, from: DateKey, to: DateKey) -> Result<Vec<JournalEntry>> {
        self.journal_entries_between(Some(from), Some(to))
    }

    /// Every entry, oldest first.
    pub fn all_journal_entries(&self) -> Result<Vec<JournalEntry>> {
        self.journal_entries_between(None, None)
    }

    fn journal_entries_between(
        &self,
        from: Option<DateKey>,
        to: Option<DateKey>,
    ) -> Result<Vec<JournalEntry>> {
        let mut stmt = self.conn().prepare(
            "SELECT date_key, title, body, rating, updated_at FROM journal_entries
             WHERE (?1 IS NULL OR date_key >= ?1) AND (?2 IS NULL OR date_key <= ?2)
             ORDER BY date_key ASC",
        )?;
        let (from, to) = (from.map(|d| d.to_string()), to.map(|d| d.to_string()));
        let rows = stmt
            .query_map(params![from, to], |row| {
                Ok((
                    row.get::<_, String>(0)?,
                    row.get::<_, String>(1)?,
                    row.get::<_, String>(2)?,
                    row.get::<_, u8>(3)?,
                    row.get::<_, String>(4)?,
                ))
            })?
            .collect::<rusqlite::Result<Vec<_>>>()?;

        rows.into_iter()
            .map(|(date, title, text, rating, updated_at)| {
                Ok(JournalEntry {
                    date: DateKey::parse(&date).map_err(|e| DatabaseError::CorruptRow {
                        table: "journal_entries",
                        message: e.to_string(),
                    })?,
                    title,
                    text,
                    rating,
                    updated_at: parse_timestamp("journal_entries", &updated_at)?,
                })
            })
            .collect()
    }

    /// Returns `false` if there was no entry for that day.
    pub fn delete_journal_entry(&self, date: DateKey) -> Result<bool> {
        let deleted = self.conn().execute(
            "DELETE FROM journal_entries WHERE date_key = ?1",
            params![date.to_string()],
        )?;
        Ok(deleted > 0)
    }
}
