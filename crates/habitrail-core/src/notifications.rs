//! In-app notification history.

use chrono::{DateTime, Utc};
use serde::{Deserialize, Serialize};
use uuid::Uuid;

use crate::date_key::TimeOfDay;

#[derive(Debug, Clone, Copy, Default, PartialEq, Eq, Serialize, Deserialize)]
#[serde(rename_all = "lowercase")]
pub enum NotificationKind {
    Habit,
    #[default]
    System,
    Achievement,
}

impl NotificationKind {
    pub fn as_str(self) -> &'static str {
        match self {
            NotificationKind::Habit => "habit",
            NotificationKind::System => "system",
            NotificationKind::Achievement => "achievement",
        }
    }

    pub fn parse_lenient(s: &str) -> Self {
        match s {
            "habit" => NotificationKind::Habit,
            "achievement" => NotificationKind::Achievement,
            _ => NotificationKind::System,
        }
    }
}

#[derive(Debug, Clone, PartialEq, Eq, Serialize, Deserialize)]
pub struct AppNotification {
    pub id: String,
    pub title: String,
    pub message: String,
    pub timestamp: DateTime<Utc>,
    pub read: bool,
    pub kind: NotificationKind,
}

impl AppNotification {
    pub fn new(title: impl Into<String>, message: impl Into<String>, kind: NotificationKind) -> Self {
        Self {
            id: Uuid::new_v4().to_string(),
            title: title.into(),
            message: message.into(),
            timestamp: Utc::now(),
            read: false,
            kind,
        }
    }

    /// Confirmation shown when a habit is created with a reminder.
    pub fn reminder_set(habit_name: &str, time: TimeOfDay) -> Self {
        Self::new(
            "Reminder Set",
            format!("You will be reminded to {habit_name} at {time}"),
            NotificationKind::System,
        )
    }
}

/// Streak lengths that earn an achievement notification.
pub const STREAK_MILESTONES: [u32; 5] = [7, 30, 100, 180, 365];

/// Achievement for a streak that just reached a milestone, if any.
pub fn streak_milestone(habit_name: &str, previous: u32, current: u32) -> Option<AppNotification> {
    let milestone = STREAK_MILESTONES
        .iter()
        .copied()
        .find(|m| previous < *m && current >= *m)?;
    Some(AppNotification::new(
        format!("{milestone}-day streak!"),
        format!("You have completed {habit_name} {milestone} days in a row."),
        NotificationKind::Achievement,
    ))
}
