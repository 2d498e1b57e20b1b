//! Import of the browser client's JSON storage blobs.
//!
//! Three shapes are recognised, alone or combined in one document:
//!
//! - the habit store, `{"habits": {"<id>": {..., "history": {"YYYY-MM-DD": true}}}}`
//! - the older habit array, `[{"id", "name", "completedDates": [...], "reminderTime"?}]`
//! - the task store, `{"tasks": [...]}`
//!
//! Anything that cannot be read is treated as "no data": a malformed blob
//! imports nothing and a malformed record is skipped. Both are logged.

use std::collections::BTreeMap;

use chrono::{DateTime, Utc};
use serde::Deserialize;
use serde_json::Value;

use crate::date_key::{CompletionSet, DateKey, TimeOfDay};
use crate::error::Result;
use crate::habit::{
    Frequency, Habit, HabitCategory, HabitDraft, HabitGoal, HabitType, StreakEngine, DEFAULT_COLOR,
    DEFAULT_ICON,
};
use crate::reminder::{Reminder, WeekdaySet};
use crate::storage::Database;
use crate::task::{Priority, Task, TaskStatus};

/// Records recovered from a legacy document.
#[derive(Debug, Clone, Default)]
pub struct LegacyImport {
    pub habits: Vec<Habit>,
    pub tasks: Vec<Task>,
    /// Records that were present but could not be converted.
    pub skipped: usize,
}

/// Counts written by [`import_into`].
#[derive(Debug, Clone, Copy, Default, PartialEq, Eq, serde::Serialize)]
pub struct ImportSummary {
    pub habits: usize,
    pub tasks: usize,
    pub skipped: usize,
}

#[derive(Debug, Deserialize)]
#[serde(rename_all = "camelCase")]
struct HabitRecord {
    name: String,
    #[serde(rename = "type")]
    habit_type: Option<String>,
    category: Option<String>,
    color: Option<String>,
    icon: Option<String>,
    start_date: Option<String>,
    created_at: Option<String>,
    #[serde(default)]
    archived: bool,
    #[serde(default)]
    history: BTreeMap<String, Value>,
    #[serde(default)]
    completed_dates: Option<Value>,
    frequency: Option<String>,
    reminder_time: Option<String>,
    reminder: Option<ReminderRecord>,
    goal: Option<Value>,
    notes: Option<String>,
}

#[derive(Debug, Deserialize)]
struct ReminderRecord {
    #[serde(default = "default_true")]
    enabled: bool,
    time: String,
    #[serde(default)]
    days: Vec<i64>,
}

fn default_true() -> bool {
    true
}

#[derive(Debug, Deserialize)]
#[serde(rename_all = "camelCase")]
struct OldHabitRecord {
    id: String,
    name: String,
    color: Option<String>,
    category: Option<String>,
    #[serde(default)]
    completed_dates: Value,
    frequency: Option<String>,
    reminder_time: Option<String>,
}

#[derive(Debug, Deserialize)]
#[serde(rename_all = "camelCase")]
struct TaskRecord {
    id: String,
    title: String,
    #[serde(default)]
    description: Option<String>,
    due_date: String,
    start_time: Option<String>,
    stop_time: Option<String>,
    priority: Option<String>,
    status: Option<String>,
    created_at: Option<String>,
}

/// Parse a legacy document. Never fails; unreadable input yields an empty import.
pub fn parse(json: &str, today: DateKey, engine: &StreakEngine) -> LegacyImport {
    let root: Value = match serde_json::from_str(json) {
        Ok(v) => v,
        Err(e) => {
            tracing::warn!(error = %e, "legacy data is not valid JSON, importing nothing");
            return LegacyImport::default();
        }
    };

    let mut import = LegacyImport::default();
    match root {
        Value::Array(items) => {
            for item in items {
                push_old_habit(&mut import, item, today, engine);
            }
        }
        Value::Object(mut map) => {
            match map.remove("habits") {
                Some(Value::Object(habits)) => {
                    for (id, record) in habits {
                        push_habit_record(&mut import, id, record, today, engine);
                    }
                }
                Some(Value::Array(items)) => {
                    for item in items {
                        push_old_habit(&mut import, item, today, engine);
                    }
                }
                Some(other) => {
                    tracing::warn!(found = %type_name(&other), "ignoring unexpected 'habits' value");
                }
                None => {}
            }
            if let Some(tasks) = map.remove("tasks") {
                match tasks {
                    Value::Array(items) => {
                        for item in items {
                            push_task(&mut import, item);
                        }
                    }
                    other => {
                        tracing::warn!(found = %type_name(&other), "ignoring unexpected 'tasks' value");
                    }
                }
            }
        }
        other => {
            tracing::warn!(found = %type_name(&other), "legacy data has no habits or tasks");
        }
    }

    if import.skipped > 0 {
        tracing::warn!(skipped = import.skipped, "some legacy records could not be imported");
    }
    import
}

/// Write an import into the database. Existing records with the same id are
/// replaced.
pub fn import_into(db: &Database, import: &LegacyImport) -> Result<ImportSummary> {
    for habit in &import.habits {
        db.save_habit(habit)?;
    }
    for task in &import.tasks {
        if db.get_task(&task.id)?.is_some() {
            db.update_task(task)?;
        } else {
            db.create_task(task)?;
        }
    }
    tracing::info!(
        habits = import.habits.len(),
        tasks = import.tasks.len(),
        "legacy import written"
    );
    Ok(ImportSummary {
        habits: import.habits.len(),
        tasks: import.tasks.len(),
        skipped: import.skipped,
    })
}

fn type_name(value: &Value) -> &'static str {
    match value {
        Value::Null => "null",
        Value::Bool(_) => "bool",
        Value::Number(_) => "number",
        Value::String(_) => "string",
        Value::Array(_) => "array",
        Value::Object(_) => "object",
    }
}

fn push_habit_record(
    import: &mut LegacyImport,
    id: String,
    record: Value,
    today: DateKey,
    engine: &StreakEngine,
) {
    let record: HabitRecord = match serde_json::from_value(record) {
        Ok(r) => r,
        Err(e) => {
            tracing::debug!(habit = %id, error = %e, "skipping unreadable habit record");
            import.skipped += 1;
            return;
        }
    };

    let mut completed: CompletionSet = record
        .history
        .iter()
        .filter(|(_, v)| history_flag(v))
        .filter_map(|(k, _)| DateKey::parse(k).ok())
        .collect();
    if let Some(dates) = &record.completed_dates {
        for key in date_keys(dates) {
            completed.insert(key);
        }
    }

    // An enabled descriptor wins; otherwise a bare reminderTime means "every day".
    let bare = record
        .reminder_time
        .as_deref()
        .and_then(|t| TimeOfDay::parse(t).ok())
        .map(|t| Reminder::new(t, WeekdaySet::EMPTY));
    let reminder = match record.reminder.as_ref().and_then(convert_reminder) {
        Some(r) if r.enabled => Some(r),
        described => bare.or(described),
    };

    let mut draft = HabitDraft::named(record.name);
    draft.habit_type = record
        .habit_type
        .as_deref()
        .map_or(HabitType::Daily, HabitType::parse_lenient);
    draft.category = record
        .category
        .as_deref()
        .map_or(HabitCategory::Other, HabitCategory::parse_lenient);
    draft.color = record.color.unwrap_or_else(|| DEFAULT_COLOR.to_string());
    draft.icon = record.icon.unwrap_or_else(|| DEFAULT_ICON.to_string());
    draft.start_date = record.start_date.as_deref().and_then(date_prefix);
    draft.frequency = record
        .frequency
        .as_deref()
        .map_or(Frequency::Daily, Frequency::parse_lenient);
    draft.reminder = reminder;
    draft.goal = record
        .goal
        .and_then(|g| serde_json::from_value::<HabitGoal>(g).ok());
    draft.notes = record.notes;

    let created_at = record.created_at.as_deref().and_then(parse_instant);
    push_habit(import, id, draft, created_at, record.archived, completed, today, engine);
}

fn push_old_habit(import: &mut LegacyImport, item: Value, today: DateKey, engine: &StreakEngine) {
    // Records that already carry a type are in the newer shape.
    if item.get("type").is_some() {
        let id = item
            .get("id")
            .and_then(Value::as_str)
            .map(str::to_string)
            .unwrap_or_else(|| uuid::Uuid::new_v4().to_string());
        push_habit_record(import, id, item, today, engine);
        return;
    }

    let record: OldHabitRecord = match serde_json::from_value(item) {
        Ok(r) => r,
        Err(e) => {
            tracing::debug!(error = %e, "skipping unreadable old-format habit");
            import.skipped += 1;
            return;
        }
    };

    let mut draft = HabitDraft::named(record.name);
    draft.habit_type = record
        .frequency
        .as_deref()
        .map_or(HabitType::Daily, HabitType::parse_lenient);
    draft.frequency = record
        .frequency
        .as_deref()
        .map_or(Frequency::Daily, Frequency::parse_lenient);
    draft.category = record
        .category
        .as_deref()
        .map_or(HabitCategory::Other, HabitCategory::parse_lenient);
    if let Some(color) = record.color.filter(|c| !c.is_empty()) {
        draft.color = color;
    }
    draft.reminder = record
        .reminder_time
        .as_deref()
        .and_then(|t| TimeOfDay::parse(t).ok())
        .map(|t| Reminder::new(t, WeekdaySet::WEEKDAYS));

    let completed = date_keys(&record.completed_dates).collect();
    push_habit(import, record.id, draft, None, false, completed, today, engine);
}

#[allow(clippy::too_many_arguments)]
fn push_habit(
    import: &mut LegacyImport,
    id: String,
    draft: HabitDraft,
    created_at: Option<DateTime<Utc>>,
    archived: bool,
    completed: CompletionSet,
    today: DateKey,
    engine: &StreakEngine,
) {
    let mut habit = match Habit::new(draft) {
        Ok(h) => h,
        Err(e) => {
            tracing::debug!(habit = %id, error = %e, "skipping invalid habit");
            import.skipped += 1;
            return;
        }
    };
    habit.id = id;
    if let Some(created_at) = created_at {
        habit.created_at = created_at;
    }
    habit.archived = archived;
    habit.completed_dates = completed;
    habit.refresh_streak(today, engine);
    import.habits.push(habit);
}

fn push_task(import: &mut LegacyImport, item: Value) {
    let record: TaskRecord = match serde_json::from_value(item) {
        Ok(r) => r,
        Err(e) => {
            tracing::debug!(error = %e, "skipping unreadable task");
            import.skipped += 1;
            return;
        }
    };
    let Some(due_date) = date_prefix(&record.due_date) else {
        tracing::debug!(task = %record.id, "skipping task without a due date");
        import.skipped += 1;
        return;
    };

    import.tasks.push(Task {
        id: record.id,
        title: record.title,
        description: record.description.unwrap_or_default(),
        due_date,
        start_time: record.start_time.as_deref().and_then(|t| TimeOfDay::parse(t).ok()),
        stop_time: record.stop_time.as_deref().and_then(|t| TimeOfDay::parse(t).ok()),
        priority: record
            .priority
            .and_then(|p| p.parse().ok())
            .unwrap_or(Priority::Medium),
        status: record
            .status
            .and_then(|s| s.parse().ok())
            .unwrap_or(TaskStatus::Pending),
        created_at: record
            .created_at
            .as_deref()
            .and_then(parse_instant)
            .unwrap_or_else(Utc::now),
    });
}

/// History entries are either `true` or `{"completed": true, ...}`.
fn history_flag(value: &Value) -> bool {
    match value {
        Value::Bool(b) => *b,
        Value::Object(map) => map.get("completed").and_then(Value::as_bool).unwrap_or(false),
        _ => false,
    }
}

/// Dates stored as an array of keys, or as an object whose keys are dates.
fn date_keys(value: &Value) -> impl Iterator<Item = DateKey> + '_ {
    let keys: Vec<&str> = match value {
        Value::Array(items) => items.iter().filter_map(Value::as_str).collect(),
        Value::Object(map) => map.keys().map(String::as_str).collect(),
        _ => Vec::new(),
    };
    keys.into_iter().filter_map(|k| DateKey::parse(k).ok())
}

fn convert_reminder(record: &ReminderRecord) -> Option<Reminder> {
    let time = TimeOfDay::parse(&record.time).ok()?;
    let days: Vec<u8> = record
        .days
        .iter()
        .filter_map(|d| u8::try_from(*d).ok())
        .filter(|d| *d <= 6)
        .collect();
    Some(Reminder {
        enabled: record.enabled,
        time,
        days: WeekdaySet::from_days(&days).unwrap_or(WeekdaySet::EMPTY),
    })
}

/// `YYYY-MM-DD` or an ISO timestamp starting with one.
fn date_prefix(raw: &str) -> Option<DateKey> {
    raw.get(..10).and_then(|s| DateKey::parse(s).ok())
}

fn parse_instant(raw: &str) -> Option<DateTime<Utc>> {
    DateTime::parse_from_rfc3339(raw)
        .ok()
        .map(|dt| dt.with_timezone(&Utc))
}
