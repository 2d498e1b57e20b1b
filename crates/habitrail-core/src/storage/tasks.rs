//! Task queries.

use rusqlite::{params, OptionalExtension, Row};

use super::database::{parse_timestamp, Database};
use crate::date_key::{DateKey, TimeOfDay};
use crate::error::{CoreError, DatabaseError, Result};
use crate::task::{Priority, Task, TaskFilter, TaskStatus};

const TASK_COLUMNS: &str =
    "id, title, description, due_date, start_time, stop_time, priority, status, created_at";

fn task_from_row(row: &Row<'_>) -> rusqlite::Result<RawTask> {
    Ok(RawTask {
        id: row.get(0)?,
        title: row.get(1)?,
        description: row.get(2)?,
        due_date: row.get(3)?,
        start_time: row.get(4)?,
        stop_time: row.get(5)?,
        priority: row.get(6)?,
        status: row.get(7)?,
        created_at: row.get(8)?,
    })
}

struct RawTask {
    id: String,
    title: String,
    description: String,
    due_date: String,
    start_time: Option<String>,
    stop_time: Option<String>,
    priority: String,
    status: String,
    created_at: String,
}

impl RawTask {
    fn decode(self) -> Result<Task> {
        let due_date = DateKey::parse(&self.due_date).map_err(|e| DatabaseError::CorruptRow {
            table: "tasks",
            message: e.to_string(),
        })?;
        Ok(Task {
            id: self.id,
            title: self.title,
            description: self.description,
            due_date,
            start_time: self.start_time.as_deref().and_then(|t| TimeOfDay::parse(t).ok()),
            stop_time: self.stop_time.as_deref().and_then(|t| TimeOfDay::parse(t).ok()),
            priority: self.priority.parse().unwrap_or(Priority::Medium),
            status: self.status.parse().unwrap_or(TaskStatus::Pending),
            created_at: parse_timestamp("tasks", &self.created_at)?,
        })
    }
}

impl Database {
    pub fn create_task(&self, task: &Task) -> Result<()> {
        self.conn().execute(
            &format!("INSERT INTO tasks ({TASK_COLUMNS}) VALUES (?1, ?2, ?3, ?4, ?5, ?6, ?7, ?8, ?9)"),
            params![
                task.id,
                task.title,
                task.description,
                task.due_date.to_string(),
                task.start_time.map(|t| t.to_string()),
                task.stop_time.map(|t| t.to_string()),
                task.priority.as_str(),
                task.status.as_str(),
                task.created_at.to_rfc3339(),
            ],
        )?;
        Ok(())
    }

    pub fn get_task(&self, id: &str) -> Result<Option<Task>> {
        let raw = self
            .conn()
            .query_row(
                &format!("SELECT {TASK_COLUMNS} FROM tasks WHERE id = ?1"),
                params![id],
                task_from_row,
            )
            .optional()?;
        raw.map(RawTask::decode).transpose()
    }

    pub fn require_task(&self, id: &str) -> Result<Task> {
        self.get_task(id)?.ok_or_else(|| CoreError::NotFound {
            kind: "Task",
            id: id.to_string(),
        })
    }

    /// Tasks matching `filter`, newest first. Rows that fail to decode are
    /// logged and left out.
    pub fn list_tasks(&self, filter: &TaskFilter) -> Result<Vec<Task>> {
        let mut stmt = self.conn().prepare(&format!(
            "SELECT {TASK_COLUMNS} FROM tasks ORDER BY created_at DESC, id ASC"
        ))?;
        let raws = stmt
            .query_map([], task_from_row)?
            .collect::<rusqlite::Result<Vec<_>>>()?;

        let mut tasks = Vec::with_capacity(raws.len());
        for raw in raws {
            let id = raw.id.clone();
            let task = match raw.decode() {
                Ok(task) => task,
                Err(e) => {
                    tracing::warn!(task = %id, error = %e, "skipping unreadable task row");
                    continue;
                }
            };
            if filter.matches(&task) {
                tasks.push(task);
            }
        }
        Ok(tasks)
    }

    /// Last write wins. Fails with `NotFound` if the task does not exist.
    pub fn update_task(&self, task: &Task) -> Result<()> {
        let changed = self.conn().execute(
            "UPDATE tasks SET title = ?2, description = ?3, due_date = ?4, start_time = ?5,
                              stop_time = ?6, priority = ?7, status = ?8
             WHERE id = ?1",
            params![
                task.id,
                task.title,
                task.description,
                task.due_date.to_string(),
                task.start_time.map(|t| t.to_string()),
                task.stop_time.map(|t| t.to_string()),
                task.priority.as_str(),
                task.status.as_str(),
            ],
        )?;
        if changed == 0 {
            return Err(CoreError::NotFound {
                kind: "Task",
                id: task.id.clone(),
            });
        }
        Ok(())
    }

    /// Returns `false` if no such task.
    pub fn delete_task(&self, id: &str) -> Result<bool> {
        let deleted = self
            .conn()
            .execute("DELETE FROM tasks WHERE id = ?1", params![id])?;
        Ok(deleted > 0)
    }
}
