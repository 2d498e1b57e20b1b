//! To-do items with a due date.
//!
//! Tasks are independent of habits: completing a task has no effect on any
//! streak.

use std::fmt;
use std::str::FromStr;

use chrono::{DateTime, Utc};
use serde::{Deserialize, Serialize};
use uuid::Uuid;

use crate::date_key::{DateKey, TimeOfDay};
use crate::error::ValidationError;

#[derive(Debug, Clone, Copy, Default, PartialEq, Eq, PartialOrd, Ord, Serialize, Deserialize)]
pub enum Priority {
    Low,
    #[default]
    Medium,
    High,
}

impl Priority {
    pub fn as_str(self) -> &'static str {
        match self {
            Priority::Low => "Low",
            Priority::Medium => "Medium",
            Priority::High => "High",
        }
    }
}

impl FromStr for Priority {
    type Err = ValidationError;

    fn from_str(s: &str) -> Result<Self, Self::Err> {
        match s.to_ascii_lowercase().as_str() {
            "low" => Ok(Priority::Low),
            "medium" => Ok(Priority::Medium),
            "high" => Ok(Priority::High),
            _ => Err(ValidationError::InvalidValue {
                field: "priority".to_string(),
                message: format!("expected Low, Medium or High, got '{s}'"),
            }),
        }
    }
}

impl fmt::Display for Priority {
    fn fmt(&self, f: &mut fmt::Formatter<'_>) -> fmt::Result {
        f.write_str(self.as_str())
    }
}

#[derive(Debug, Clone, Copy, Default, PartialEq, Eq, Serialize, Deserialize)]
pub enum TaskStatus {
    #[default]
    Pending,
    Completed,
}

impl TaskStatus {
    pub fn as_str(self) -> &'static str {
        match self {
            TaskStatus::Pending => "Pending",
            TaskStatus::Completed => "Completed",
        }
    }
}

impl FromStr for TaskStatus {
    type Err = ValidationError;

    fn from_str(s: &str) -> Result<Self, Self::Err> {
        match s.to_ascii_lowercase().as_str() {
            "pending" => Ok(TaskStatus::Pending),
            "completed" => Ok(TaskStatus::Completed),
            _ => Err(ValidationError::InvalidValue {
                field: "status".to_string(),
                message: format!("expected Pending or Completed, got '{s}'"),
            }),
        }
    }
}

/// User-editable fields of a task.
#[derive(Debug, Clone, PartialEq, Eq, Serialize, Deserialize)]
pub struct TaskDraft {
    pub title: String,
    #[serde(default)]
    pub description: String,
    pub due_date: DateKey,
    #[serde(default)]
    pub start_time: Option<TimeOfDay>,
    #[serde(default)]
    pub stop_time: Option<TimeOfDay>,
    #[serde(default)]
    pub priority: Priority,
}

impl TaskDraft {
    pub fn new(title: impl Into<String>, due_date: DateKey) -> Self {
        Self {
            title: title.into(),
            description: String::new(),
            due_date,
            start_time: None,
            stop_time: None,
            priority: Priority::default(),
        }
    }

    fn validate(&self) -> Result<(), ValidationError> {
        if self.title.trim().is_empty() {
            return Err(ValidationError::InvalidValue {
                field: "title".to_string(),
                message: "task title must not be empty".to_string(),
            });
        }
        if let (Some(start), Some(stop)) = (self.start_time, self.stop_time) {
            if stop <= start {
                return Err(ValidationError::InvalidValue {
                    field: "stop_time".to_string(),
                    message: format!("stop time {stop} must be after start time {start}"),
                });
            }
        }
        Ok(())
    }
}

#[derive(Debug, Clone, PartialEq, Eq, Serialize, Deserialize)]
pub struct Task {
    pub id: String,
    pub title: String,
    pub description: String,
    pub due_date: DateKey,
    pub start_time: Option<TimeOfDay>,
    pub stop_time: Option<TimeOfDay>,
    pub priority: Priority,
    pub status: TaskStatus,
    pub created_at: DateTime<Utc>,
}

impl Task {
    /// # Errors
    /// Returns a validation error for a blank title or an inverted time window.
    pub fn new(draft: TaskDraft) -> Result<Self, ValidationError> {
        draft.validate()?;
        Ok(Self {
            id: Uuid::new_v4().to_string(),
            title: draft.title.trim().to_string(),
            description: draft.description,
            due_date: draft.due_date,
            start_time: draft.start_time,
            stop_time: draft.stop_time,
            priority: draft.priority,
            status: TaskStatus::Pending,
            created_at: Utc::now(),
        })
    }

    pub fn draft(&self) -> TaskDraft {
        TaskDraft {
            title: self.title.clone(),
            description: self.description.clone(),
            due_date: self.due_date,
            start_time: self.start_time,
            stop_time: self.stop_time,
            priority: self.priority,
        }
    }

    /// # Errors
    /// Same rules as [`Task::new`].
    pub fn apply_update(&mut self, draft: TaskDraft) -> Result<(), ValidationError> {
        draft.validate()?;
        self.title = draft.title.trim().to_string();
        self.description = draft.description;
        self.due_date = draft.due_date;
        self.start_time = draft.start_time;
        self.stop_time = draft.stop_time;
        self.priority = draft.priority;
        Ok(())
    }

    /// Flip between pending and completed; returns the new status.
    pub fn toggle_status(&mut self) -> TaskStatus {
        self.status = match self.status {
            TaskStatus::Pending => TaskStatus::Completed,
            TaskStatus::Completed => TaskStatus::Pending,
        };
        self.status
    }

    pub fn is_overdue(&self, today: DateKey) -> bool {
        self.status == TaskStatus::Pending && self.due_date < today
    }
}

/// Selection criteria for task listings.
#[derive(Debug, Clone, Copy, Default, PartialEq, Eq)]
pub struct TaskFilter {
    pub due_date: Option<DateKey>,
    pub status: Option<TaskStatus>,
}

impl TaskFilter {
    pub fn matches(&self, task: &Task) -> bool {
        self.due_date.map_or(true, |d| task.due_date == d)
            && self.status.map_or(true, |s| task.status == s)
    }
}
