//! # Habitrail Core Library
//!
//! This library provides the core logic for Habitrail, a personal habit
//! tracker. Everything is available through the standalone `habitrail` CLI,
//! which is a thin layer over this crate.
//!
//! ## Architecture
//!
//! - **Streak Engine**: Computes current and best streaks from a set of
//!   completed `YYYY-MM-DD` date keys
//! - **Reminder Matcher**: Decides, once per calendar minute, which habits are
//!   due for a reminder; a tokio loop drives it on a fixed interval
//! - **Storage**: SQLite persistence for habits, tasks, journal entries, focus
//!   sessions and notifications, plus TOML configuration
//! - **Stats**: Activity, consistency and mood summaries
//! - **Backup**: Versioned JSON export and restore
//! - **Legacy Import**: Reads the browser client's JSON storage blobs
//!
//! ## Key Components
//!
//! - [`StreakEngine`]: Streak computation
//! - [`ReminderMatcher`]: Per-minute reminder evaluation
//! - [`ReminderService`]: Polling loop with a pluggable [`Notifier`]
//! - [`Database`]: Record persistence
//! - [`Config`]: Application configuration management

pub mod backup;
pub mod date_key;
pub mod error;
pub mod focus;
pub mod habit;
pub mod journal;
pub mod legacy;
pub mod notifications;
pub mod reminder;
pub mod stats;
pub mod storage;
pub mod task;

pub use backup::{Backup, RestoreSummary};
pub use date_key::{CompletionSet, DateKey, TimeOfDay};
pub use error::{ConfigError, CoreError, DatabaseError, ValidationError};
pub use focus::{FocusRange, FocusSession, FocusStats, SessionKind, SessionStatus};
pub use habit::{
    DailyProgress, Habit, HabitCategory, HabitDraft, HabitType, StreakConfig, StreakEngine,
    StreakSummary,
};
pub use journal::JournalEntry;
pub use notifications::{AppNotification, NotificationKind};
pub use reminder::{
    Clock, Notifier, NotifyError, Reminder, ReminderFire, ReminderMatcher, ReminderService,
    SystemClock, WeekdaySet,
};
pub use stats::StatsReport;
pub use storage::{Config, Database};
pub use task::{Priority, Task, TaskDraft, TaskFilter, TaskStatus};
