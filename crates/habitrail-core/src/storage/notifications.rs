//! Notification history queries.

use rusqlite::params;

use super::database::{parse_timestamp, Database};
use crate::error::Result;
use crate::notifications::{AppNotification, NotificationKind};

impl Database {
    pub fn add_notification(&self, notification: &AppNotification) -> Result<()> {
        self.conn().execute(
            "INSERT INTO notifications (id, title, message, timestamp, read, kind)
             VALUES (?1, ?2, ?3, ?4, ?5, ?6)",
            params![
                notification.id,
                notification.title,
                notification.message,
                notification.timestamp.to_rfc3339(),
                notification.read,
                notification.kind.as_str(),
            ],
        )?;
        Ok(())
    }

    /// Newest first. `limit` of `None` returns everything.
    pub fn list_notifications(&self, unread_only: bool, limit: Option<usize>) -> Result<Vec<AppNotification>> {
        let mut stmt = self.conn().prepare(
            "SELECT id, title, message, timestamp, read, kind FROM notifications
             WHERE (?1 = 0 OR read = 0)
             ORDER BY timestamp DESC, id ASC
             LIMIT ?2",
        )?;
        let limit = limit.map_or(-1, |n| i64::try_from(n).unwrap_or(i64::MAX));
        let rows = stmt
            .query_map(params![unread_only, limit], |row| {
                Ok((
                    row.get::<_, String>(0)?,
                    row.get::<_, String>(1)?,
                    row.get::<_, String>(2)?,
                    row.get::<_, String>(3)?,
                    row.get::<_, bool>(4)?,
                    row.get::<_, String>(5)?,
                ))
            })?
            .collect::<rusqlite::Result<Vec<_>>>()?;

        rows.into_iter()
            .map(|(id, title, message, timestamp, read, kind)| {
                Ok(AppNotification {
                    id,
                    title,
                    message,
                    timestamp: parse_timestamp("notifications", &timestamp)?,
                    read,
                    kind: NotificationKind::parse_lenient(&kind),
                })
            })
            .collect()
    }

    pub fn unread_notification_count(&self) -> Result<u64> {
        let count: u64 = self.conn().query_row(
            "SELECT COUNT(*) FROM notifications WHERE read = 0",
            [],
            |row| row.get(0),
        )?;
        Ok(count)
    }

    /// Returns `false` if no such notification.
    pub fn mark_notification_read(&self, id: &str) -> Result<bool> {
        let changed = self.conn().execute(
            "UPDATE notifications SET read = 1 WHERE id = ?1",
            params![id],
        )?;
        Ok(changed > 0)
    }

    /// Returns how many notifications changed state.
    pub fn mark_all_notifications_read(&self) -> Result<usize> {
        Ok(self
            .conn()
            .execute("UPDATE notifications SET read = 1 WHERE read = 0", [])?)
    }

    pub fn clear_notifications(&self) -> Result<usize> {
        Ok(self.conn().execute("DELETE FROM notifications", [])?)
    }
}

#[cfg(test)]
mod tests {
    use super::*;
    use chrono::Duration;

    #[test]
    fn newest_first_with_unread_filter() {
        let db = Database::open_memory().unwrap();
        let mut old = AppNotification::new("Old", "first", NotificationKind::System);
        old.timestamp = old.timestamp - Duration::hours(1);
        let new = AppNotification::new("New", "second", NotificationKind::Habit);
        db.add_notification(&old).unwrap();
        db.add_notification(&new).unwrap();

        let all = db.list_notifications(false, None).unwrap();
        assert_eq!(all[0].title, "New");
        assert_eq!(all[1].title, "Old");
        assert_eq!(db.list_notifications(false, Some(1)).unwrap().len(), 1);

        assert!(db.mark_notification_read(&new.id).unwrap());
        assert!(!db.mark_notification_read("missing").unwrap());
        let unread = db.list_notifications(true, None).unwrap();
        assert_eq!(unread.len(), 1);
        assert_eq!(unread[0].title, "Old");
        assert_eq!(db.unread_notification_count().unwrap(), 1);
    }

    #[test]
    fn mark_all_and_clear() {
        let db = Database::open_memory().unwrap();
        for i in 0..3 {
            db.add_notification(&AppNotification::new(format!("n{i}"), "", NotificationKind::System))
                .unwrap();
        }
        assert_eq!(db.mark_all_notifications_read().unwrap(), 3);
        assert_eq!(db.unread_notification_count().unwrap(), 0);
        assert_eq!(db.clear_notifications().unwrap(), 3);
        assert!(db.list_notifications(false, None).unwrap().is_empty());
    }
}
