//! Habit management commands for CLI.

use clap::{Args, Subcommand};
use habitrail_core::habit::{Frequency, GoalFrequency, HabitGoal};
use habitrail_core::notifications::streak_milestone;
use habitrail_core::{
    AppNotification, Config, DailyProgress, Database, DateKey, Habit, HabitCategory, HabitDraft,
    HabitType, Reminder, StreakEngine, TimeOfDay, WeekdaySet,
};
use serde::Serialize;

use super::{date_or_today, print_json, CmdResult};

#[derive(Subcommand)]
pub enum HabitAction {
    /// Create a new habit
    Add {
        /// Habit name
        name: String,
        #[command(flatten)]
        fields: HabitFields,
    },
    /// List habits
    List {
        /// Include archived habits
        #[arg(long)]
        all: bool,
        /// Filter by category
        #[arg(long)]
        category: Option<HabitCategory>,
    },
    /// Show one habit
    Show {
        /// Habit ID
        id: String,
    },
    /// Update a habit
    Edit {
        /// Habit ID
        id: String,
        /// New name
        #[arg(long)]
        name: Option<String>,
        #[command(flatten)]
        fields: HabitFields,
        /// Archive (true) or restore (false)
        #[arg(long)]
        archived: Option<bool>,
        /// Remove the reminder
        #[arg(long, conflicts_with_all = ["remind_at", "days"])]
        no_reminder: bool,
    },
    /// Delete a habit and its history
    Delete {
        /// Habit ID
        id: String,
    },
    /// Mark a day completed (default: today)
    Done {
        /// Habit ID
        id: String,
        /// Day to mark, YYYY-MM-DD
        #[arg(long)]
        date: Option<String>,
    },
    /// Clear a completed day (default: today)
    Undo {
        /// Habit ID
        id: String,
        /// Day to clear, YYYY-MM-DD
        #[arg(long)]
        date: Option<String>,
    },
    /// Recompute and show streaks
    Streak {
        /// Only this habit
        id: Option<String>,
    },
    /// Completion progress for a day
    Progress {
        /// Day, YYYY-MM-DD (default: today)
        #[arg(long)]
        date: Option<String>,
        /// Limit to one category
        #[arg(long)]
        category: Option<HabitCategory>,
    },
}

/// Optional fields shared by `add` and `edit`.
#[derive(Args)]
pub struct HabitFields {
    /// daily, weekly or monthly
    #[arg(long = "type")]
    habit_type: Option<String>,
    /// health, study, work, fitness, personal or other
    #[arg(long)]
    category: Option<HabitCategory>,
    /// Hex colour, e.g. "#4F46E5"
    #[arg(long)]
    color: Option<String>,
    #[arg(long)]
    icon: Option<String>,
    /// First day of the habit, YYYY-MM-DD
    #[arg(long)]
    start: Option<String>,
    /// Daily, Weekly or Monthly
    #[arg(long)]
    frequency: Option<String>,
    /// Reminder time, HH:MM
    #[arg(long)]
    remind_at: Option<TimeOfDay>,
    /// Reminder weekdays, 0 = Sunday, e.g. "1,2,3,4,5" (default: every day)
    #[arg(long)]
    days: Option<String>,
    /// Goal amount, e.g. 8
    #[arg(long, requires = "goal_unit")]
    goal: Option<f64>,
    /// Goal unit, e.g. "glasses"
    #[arg(long, requires = "goal")]
    goal_unit: Option<String>,
    /// Goal period: day, week or month
    #[arg(long, default_value = "day")]
    goal_per: String,
    #[arg(long)]
    notes: Option<String>,
}

impl HabitFields {
    fn apply(self, draft: &mut HabitDraft) -> Result<(), Box<dyn std::error::Error>> {
        if let Some(t) = self.habit_type {
            draft.habit_type = HabitType::parse_lenient(&t);
        }
        if let Some(c) = self.category {
            draft.category = c;
        }
        if let Some(c) = self.color {
            draft.color = c;
        }
        if let Some(i) = self.icon {
            draft.icon = i;
        }
        if let Some(s) = self.start {
            draft.start_date = Some(DateKey::parse(&s)?);
        }
        if let Some(f) = self.frequency {
            draft.frequency = Frequency::parse_lenient(&f);
        }
        let days = self.days.as_deref().map(WeekdaySet::parse_list).transpose()?;
        match (self.remind_at, draft.reminder.as_mut()) {
            (Some(time), Some(existing)) => {
                existing.time = time;
                existing.enabled = true;
            }
            (Some(time), None) => draft.reminder = Some(Reminder::new(time, WeekdaySet::EMPTY)),
            (None, None) if days.is_some() => {
                return Err("--days needs a reminder time (--remind-at)".into());
            }
            _ => {}
        }
        if let (Some(days), Some(reminder)) = (days, draft.reminder.as_mut()) {
            reminder.days = days;
        }
        if let (Some(target), Some(unit)) = (self.goal, self.goal_unit) {
            let frequency = match self.goal_per.to_ascii_lowercase().as_str() {
                "day" => GoalFrequency::Day,
                "week" => GoalFrequency::Week,
                "month" => GoalFrequency::Month,
                other => return Err(format!("unknown goal period '{other}'").into()),
            };
            draft.goal = Some(HabitGoal {
                target,
                unit,
                frequency,
            });
        }
        if let Some(n) = self.notes {
            draft.notes = Some(n);
        }
        Ok(())
    }
}

#[derive(Serialize)]
struct StreakRow<'a> {
    id: &'a str,
    name: &'a str,
    streak: u32,
    best_streak: u32,
    /// Percentage of the last 30 days completed.
    rate_30d: u8,
}

pub fn run(action: HabitAction) -> CmdResult {
    let db = Database::open()?;
    let engine = StreakEngine::with_config(Config::load_or_default().streak_config());
    let today = DateKey::today();

    match action {
        HabitAction::Add { name, fields } => {
            let mut draft = HabitDraft::named(name);
            fields.apply(&mut draft)?;
            let habit = Habit::new(draft)?;
            db.save_habit(&habit)?;
            if let Some(reminder) = habit.reminder.filter(|r| r.enabled) {
                db.add_notification(&AppNotification::reminder_set(&habit.name, reminder.time))?;
            }
            tracing::info!(habit = %habit.id, "habit created");
            print_json(&habit)?;
        }
        HabitAction::List { all, category } => {
            let habits: Vec<Habit> = db
                .list_habits(all)?
                .into_iter()
                .filter(|h| category.map_or(true, |c| h.category == c))
                .collect();
            print_json(&habits)?;
        }
        HabitAction::Show { id } => {
            print_json(&db.require_habit(&id)?)?;
        }
        HabitAction::Edit {
            id,
            name,
            fields,
            archived,
            no_reminder,
        } => {
            let mut habit = db.require_habit(&id)?;
            let mut draft = habit.draft();
            if let Some(n) = name {
                draft.name = n;
            }
            if no_reminder {
                draft.reminder = None;
            }
            fields.apply(&mut draft)?;
            habit.apply_update(draft)?;
            if let Some(a) = archived {
                habit.archived = a;
            }
            db.save_habit(&habit)?;
            print_json(&habit)?;
        }
        HabitAction::Delete { id } => {
            if !db.delete_habit(&id)? {
                return Err(format!("Habit not found: {id}").into());
            }
            println!("Habit deleted: {id}");
        }
        HabitAction::Done { id, date } => {
            let date = date_or_today(date.as_deref())?;
            let habit = db.require_habit(&id)?;
            if habit.is_completed_on(date) {
                print_json(&habit)?;
                return Ok(());
            }
            let previous = habit.streak;
            let habit = db.toggle_completion(&id, date, today, &engine)?;
            if let Some(achievement) = streak_milestone(&habit.name, previous, habit.streak) {
                db.add_notification(&achievement)?;
            }
            print_json(&habit)?;
        }
        HabitAction::Undo { id, date } => {
            let date = date_or_today(date.as_deref())?;
            let habit = db.require_habit(&id)?;
            let habit = if habit.is_completed_on(date) {
                db.toggle_completion(&id, date, today, &engine)?
            } else {
                habit
            };
            print_json(&habit)?;
        }
        HabitAction::Streak { id } => {
            let habits = db.refresh_streaks(today, &engine)?;
            let from = DateKey::from_date(today.date() - chrono::Days::new(29));
            let rows: Vec<StreakRow<'_>> = habits
                .iter()
                .filter(|h| id.as_deref().map_or(!h.archived, |id| h.id == id))
                .map(|h| StreakRow {
                    id: &h.id,
                    name: &h.name,
                    streak: h.streak,
                    best_streak: h.best_streak,
                    rate_30d: h.completion_rate(from, today),
                })
                .collect();
            if let (Some(id), true) = (&id, rows.is_empty()) {
                return Err(format!("Habit not found: {id}").into());
            }
            print_json(&rows)?;
        }
        HabitAction::Progress { date, category } => {
            let day = date_or_today(date.as_deref())?;
            let habits = db.list_habits(false)?;
            print_json(&DailyProgress::for_day(&habits, day, category))?;
        }
    }
    Ok(())
}
