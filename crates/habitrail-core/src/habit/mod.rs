//! Habit records and the operations that keep their streaks consistent.
//!
//! A [`Habit`] owns its completion set. Every mutation of that set goes
//! through [`Habit::toggle_completion`] or [`Habit::refresh_streak`], which
//! recompute `streak` with the [`StreakEngine`] and keep
//! `best_streak >= streak`.

mod streak;

pub use streak::{StreakConfig, StreakEngine, StreakSummary};

use std::fmt;
use std::str::FromStr;

use chrono::{DateTime, Utc};
use serde::{Deserialize, Serialize};
use uuid::Uuid;

use crate::date_key::{CompletionSet, DateKey};
use crate::error::ValidationError;
use crate::reminder::Reminder;

pub const DEFAULT_COLOR: &str = "#4F46E5";
pub const DEFAULT_ICON: &str = "📝";

/// How often a habit is meant to be performed.
#[derive(Debug, Clone, Copy, Default, PartialEq, Eq, Serialize, Deserialize)]
#[serde(rename_all = "lowercase")]
pub enum HabitType {
    #[default]
    Daily,
    Weekly,
    Monthly,
}

impl HabitType {
    /// Unknown values fall back to `Daily`.
    pub fn parse_lenient(s: &str) -> Self {
        match s.to_ascii_lowercase().as_str() {
            "weekly" => HabitType::Weekly,
            "monthly" => HabitType::Monthly,
            _ => HabitType::Daily,
        }
    }

    pub fn as_str(self) -> &'static str {
        match self {
            HabitType::Daily => "daily",
            HabitType::Weekly => "weekly",
            HabitType::Monthly => "monthly",
        }
    }
}

/// Display frequency label carried alongside the habit type.
#[derive(Debug, Clone, Copy, Default, PartialEq, Eq, Serialize, Deserialize)]
pub enum Frequency {
    #[default]
    Daily,
    Weekly,
    Monthly,
}

impl Frequency {
    pub fn parse_lenient(s: &str) -> Self {
        match s.to_ascii_lowercase().as_str() {
            "weekly" => Frequency::Weekly,
            "monthly" => Frequency::Monthly,
            _ => Frequency::Daily,
        }
    }

    pub fn as_str(self) -> &'static str {
        match self {
            Frequency::Daily => "Daily",
            Frequency::Weekly => "Weekly",
            Frequency::Monthly => "Monthly",
        }
    }
}

#[derive(Debug, Clone, Copy, Default, PartialEq, Eq, Hash, Serialize, Deserialize)]
#[serde(rename_all = "lowercase")]
pub enum HabitCategory {
    Health,
    Study,
    Work,
    Fitness,
    Personal,
    #[default]
    Other,
}

impl HabitCategory {
    pub const ALL: [HabitCategory; 6] = [
        HabitCategory::Health,
        HabitCategory::Study,
        HabitCategory::Work,
        HabitCategory::Fitness,
        HabitCategory::Personal,
        HabitCategory::Other,
    ];

    /// Unknown values fall back to `Other`.
    pub fn parse_lenient(s: &str) -> Self {
        s.parse().unwrap_or_default()
    }

    pub fn as_str(self) -> &'static str {
        match self {
            HabitCategory::Health => "health",
            HabitCategory::Study => "study",
            HabitCategory::Work => "work",
            HabitCategory::Fitness => "fitness",
            HabitCategory::Personal => "personal",
            HabitCategory::Other => "other",
        }
    }
}

impl fmt::Display for HabitCategory {
    fn fmt(&self, f: &mut fmt::Formatter<'_>) -> fmt::Result {
        f.write_str(self.as_str())
    }
}

impl FromStr for HabitCategory {
    type Err = ValidationError;

    fn from_str(s: &str) -> Result<Self, Self::Err> {
        let lower = s.to_ascii_lowercase();
        HabitCategory::ALL
            .into_iter()
            .find(|c| c.as_str() == lower)
            .ok_or_else(|| ValidationError::InvalidValue {
                field: "category".to_string(),
                message: format!("unknown category '{s}'"),
            })
    }
}

#[derive(Debug, Clone, Copy, PartialEq, Eq, Serialize, Deserialize)]
#[serde(rename_all = "lowercase")]
pub enum GoalFrequency {
    Day,
    Week,
    Month,
}

/// Quantified target, e.g. 8 glasses per day.
#[derive(Debug, Clone, PartialEq, Serialize, Deserialize)]
pub struct HabitGoal {
    pub target: f64,
    pub unit: String,
    pub frequency: GoalFrequency,
}

/// User-editable fields of a habit.
#[derive(Debug, Clone, PartialEq, Serialize, Deserialize)]
pub struct HabitDraft {
    pub name: String,
    #[serde(default)]
    pub habit_type: HabitType,
    #[serde(default)]
    pub category: HabitCategory,
    #[serde(default = "default_color")]
    pub color: String,
    #[serde(default = "default_icon")]
    pub icon: String,
    #[serde(default)]
    pub start_date: Option<DateKey>,
    #[serde(default)]
    pub frequency: Frequency,
    #[serde(default)]
    pub reminder: Option<Reminder>,
    #[serde(default)]
    pub goal: Option<HabitGoal>,
    #[serde(default)]
    pub notes: Option<String>,
}

fn default_color() -> String {
    DEFAULT_COLOR.to_string()
}

fn default_icon() -> String {
    DEFAULT_ICON.to_string()
}

impl HabitDraft {
    pub fn named(name: impl Into<String>) -> Self {
        Self {
            name: name.into(),
            habit_type: HabitType::default(),
            category: HabitCategory::default(),
            color: default_color(),
            icon: default_icon(),
            start_date: None,
            frequency: Frequency::default(),
            reminder: None,
            goal: None,
            notes: None,
        }
    }

    fn validate(&self) -> Result<(), ValidationError> {
        if self.name.trim().is_empty() {
            return Err(ValidationError::InvalidValue {
                field: "name".to_string(),
                message: "habit name must not be empty".to_string(),
            });
        }
        Ok(())
    }
}

/// A tracked habit.
#[derive(Debug, Clone, PartialEq, Serialize, Deserialize)]
pub struct Habit {
    pub id: String,
    pub name: String,
    pub habit_type: HabitType,
    pub category: HabitCategory,
    pub color: String,
    pub icon: String,
    pub start_date: DateKey,
    pub created_at: DateTime<Utc>,
    pub archived: bool,
    pub completed_dates: CompletionSet,
    pub frequency: Frequency,
    pub reminder: Option<Reminder>,
    pub goal: Option<HabitGoal>,
    pub notes: Option<String>,
    pub streak: u32,
    pub best_streak: u32,
    pub last_completed: Option<DateTime<Utc>>,
}

impl Habit {
    /// Create a habit with a fresh id and no history.
    ///
    /// # Errors
    /// Returns a validation error if the name is blank.
    pub fn new(draft: HabitDraft) -> Result<Self, ValidationError> {
        draft.validate()?;
        let now = Utc::now();
        Ok(Self {
            id: Uuid::new_v4().to_string(),
            name: draft.name.trim().to_string(),
            habit_type: draft.habit_type,
            category: draft.category,
            color: draft.color,
            icon: draft.icon,
            start_date: draft.start_date.unwrap_or_else(DateKey::today),
            created_at: now,
            archived: false,
            completed_dates: CompletionSet::new(),
            frequency: draft.frequency,
            reminder: draft.reminder,
            goal: draft.goal,
            notes: draft.notes,
            streak: 0,
            best_streak: 0,
            last_completed: None,
        })
    }

    /// Snapshot of the editable fields.
    pub fn draft(&self) -> HabitDraft {
        HabitDraft {
            name: self.name.clone(),
            habit_type: self.habit_type,
            category: self.category,
            color: self.color.clone(),
            icon: self.icon.clone(),
            start_date: Some(self.start_date),
            frequency: self.frequency,
            reminder: self.reminder,
            goal: self.goal.clone(),
            notes: self.notes.clone(),
        }
    }

    /// Replace the editable fields. Identity, history and streaks are kept.
    ///
    /// # Errors
    /// Returns a validation error if the new name is blank.
    pub fn apply_update(&mut self, draft: HabitDraft) -> Result<(), ValidationError> {
        draft.validate()?;
        self.name = draft.name.trim().to_string();
        self.habit_type = draft.habit_type;
        self.category = draft.category;
        self.color = draft.color;
        self.icon = draft.icon;
        if let Some(start) = draft.start_date {
            self.start_date = start;
        }
        self.frequency = draft.frequency;
        self.reminder = draft.reminder;
        self.goal = draft.goal;
        self.notes = draft.notes;
        Ok(())
    }

    pub fn is_completed_on(&self, date: DateKey) -> bool {
        self.completed_dates.contains(&date)
    }

    /// Flip the completion state of `date` and recompute streaks for `today`.
    ///
    /// Returns `true` if the date is completed afterwards.
    pub fn toggle_completion(&mut self, date: DateKey, today: DateKey, engine: &StreakEngine) -> bool {
        let completed = if self.completed_dates.remove(&date) {
            self.last_completed = None;
            false
        } else {
            self.completed_dates.insert(date);
            self.last_completed = Some(Utc::now());
            true
        };
        self.refresh_streak(today, engine);
        completed
    }

    /// Mark `date` completed (idempotent). Returns `true` if it was newly added.
    pub fn mark_completed(&mut self, date: DateKey, today: DateKey, engine: &StreakEngine) -> bool {
        if self.is_completed_on(date) {
            return false;
        }
        self.toggle_completion(date, today, engine)
    }

    /// Clear `date` (idempotent). Returns `true` if it was present.
    pub fn clear_completion(&mut self, date: DateKey, today: DateKey, engine: &StreakEngine) -> bool {
        if !self.is_completed_on(date) {
            return false;
        }
        !self.toggle_completion(date, today, engine)
    }

    /// Recompute `streak` for `today`; `best_streak` never decreases.
    pub fn refresh_streak(&mut self, today: DateKey, engine: &StreakEngine) -> StreakSummary {
        let summary = engine.summarize(&self.completed_dates, today);
        self.streak = summary.current;
        self.best_streak = self.best_streak.max(summary.best);
        StreakSummary {
            current: self.streak,
            best: self.best_streak,
        }
    }

    /// Rounded percentage of days in `[from, to]` that are completed.
    pub fn completion_rate(&self, from: DateKey, to: DateKey) -> u8 {
        let span = from.days_until(to) + 1;
        if span <= 0 {
            return 0;
        }
        let done = self.completed_dates.count_between(from, to) as f64;
        (done / span as f64 * 100.0).round() as u8
    }
}

/// Today's progress across a list of habits.
#[derive(Debug, Clone, Copy, Default, PartialEq, Eq, Serialize, Deserialize)]
pub struct DailyProgress {
    pub total: usize,
    pub completed: usize,
    pub percent: u8,
}

impl DailyProgress {
    /// Progress over non-archived habits, optionally limited to one category.
    pub fn for_day(habits: &[Habit], day: DateKey, category: Option<HabitCategory>) -> Self {
        let relevant: Vec<&Habit> = habits
            .iter()
            .filter(|h| !h.archived)
            .filter(|h| category.map_or(true, |c| h.category == c))
            .collect();
        let total = relevant.len();
        if total == 0 {
            return Self::default();
        }
        let completed = relevant.iter().filter(|h| h.is_completed_on(day)).count();
        let percent = (completed as f64 / total as f64 * 100.0).round() as u8;
        Self {
            total,
            completed,
            percent,
        }
    }
}

#[cfg(test)]
mod tests {
    use super::*;

    fn key(s: &str) -> DateKey {
        DateKey::parse(s).unwrap()
    }

    fn habit(name: &str) -> Habit {
        Habit::new(HabitDraft::named(name)).unwrap()
    }

    #[test]
    fn new_habit_has_defaults() {
        let h = habit("  Read  ");
        assert_eq!(h.name, "Read");
        assert_eq!(h.color, DEFAULT_COLOR);
        assert_eq!(h.category, HabitCategory::Other);
        assert_eq!((h.streak, h.best_streak), (0, 0));
        assert!(h.completed_dates.is_empty());
    }

    #[test]
    fn blank_name_is_rejected() {
        assert!(Habit::new(HabitDraft::named("   ")).is_err());
    }

    #[test]
    fn toggle_updates_streaks_and_last_completed() {
        let engine = StreakEngine::new();
        let today = key("2024-05-10");
        let mut h = habit("Run");

        assert!(h.toggle_completion(today.pred(), today, &engine));
        assert!(h.toggle_completion(today, today, &engine));
        assert_eq!((h.streak, h.best_streak), (2, 2));
        assert!(h.last_completed.is_some());

        assert!(!h.toggle_completion(today, today, &engine));
        assert_eq!(h.streak, 1);
        assert_eq!(h.best_streak, 2);
        assert!(h.last_completed.is_none());
    }

    #[test]
    fn mark_and_clear_are_idempotent() {
        let engine = StreakEngine::new();
        let today = key("2024-05-10");
        let mut h = habit("Stretch");
        assert!(h.mark_completed(today, today, &engine));
        assert!(!h.mark_completed(today, today, &engine));
        assert!(h.clear_completion(today, today, &engine));
        assert!(!h.clear_completion(today, today, &engine));
        assert_eq!(h.streak, 0);
    }

    #[test]
    fn apply_update_keeps_identity_and_history() {
        let engine = StreakEngine::new();
        let today = key("2024-05-10");
        let mut h = habit("Walk");
        h.toggle_completion(today, today, &engine);
        let id = h.id.clone();

        let mut draft = h.draft();
        draft.name = "Long walk".to_string();
        draft.category = HabitCategory::Fitness;
        h.apply_update(draft).unwrap();

        assert_eq!(h.id, id);
        assert_eq!(h.name, "Long walk");
        assert_eq!(h.category, HabitCategory::Fitness);
        assert!(h.is_completed_on(today));
        assert_eq!(h.streak, 1);
    }

    #[test]
    fn completion_rate_rounds() {
        let mut h = habit("Meditate");
        h.completed_dates = CompletionSet::from_keys(["2024-05-01", "2024-05-02"]);
        assert_eq!(h.completion_rate(key("2024-05-01"), key("2024-05-03")), 67);
        assert_eq!(h.completion_rate(key("2024-05-03"), key("2024-05-01")), 0);
    }

    #[test]
    fn category_parsing_is_case_insensitive_with_fallback() {
        assert_eq!("Fitness".parse::<HabitCategory>().unwrap(), HabitCategory::Fitness);
        assert!("gardening".parse::<HabitCategory>().is_err());
        assert_eq!(HabitCategory::parse_lenient("gardening"), HabitCategory::Other);
    }

    #[test]
    fn daily_progress_filters_by_category() {
        let today = key("2024-05-10");
        let engine = StreakEngine::new();
        let mut a = habit("Gym");
        a.category = HabitCategory::Fitness;
        a.toggle_completion(today, today, &engine);
        let mut b = habit("Swim");
        b.category = HabitCategory::Fitness;
        let c = habit("Journal");

        let all = [a, b, c];
        let progress = DailyProgress::for_day(&all, today, None);
        assert_eq!((progress.completed, progress.total, progress.percent), (1, 3, 33));

        let fitness = DailyProgress::for_day(&all, today, Some(HabitCategory::Fitness));
        assert_eq!(fitness.percent, 50);

        assert_eq!(DailyProgress::for_day(&[], today, None).percent, 0);
    }
}
