//! Habit reminders.
//!
//! - [`ReminderMatcher`] decides which habits are due at a given minute.
//! - [`Notifier`] delivers a firing to the user.
//! - [`ReminderService`] polls the matcher on a fixed interval.
//!
//! Reminders have no durability: a minute that passes while nothing is
//! polling is never replayed.

mod descriptor;
mod notifier;
mod service;

pub use descriptor::{Reminder, WeekdaySet};
pub use notifier::{deliver, Notifier, NotifyError, RecordingNotifier};
pub use service::{Clock, FixedClock, ReminderService, SystemClock};

use chrono::NaiveDateTime;
use serde::{Deserialize, Serialize};

use crate::date_key::{DateKey, TimeOfDay};
use crate::habit::Habit;

/// A calendar minute: the unit at which reminders fire.
#[derive(Debug, Clone, Copy, PartialEq, Eq, Serialize, Deserialize)]
pub struct MinuteMark {
    pub day: DateKey,
    pub time: TimeOfDay,
}

impl MinuteMark {
    pub fn from_datetime(now: NaiveDateTime) -> Self {
        Self {
            day: DateKey::from_date(now.date()),
            time: TimeOfDay::from_time(now.time()),
        }
    }
}

/// One reminder that should be shown to the user.
#[derive(Debug, Clone, PartialEq, Eq, Serialize, Deserialize)]
pub struct ReminderFire {
    pub habit_id: String,
    pub habit_name: String,
    pub at: MinuteMark,
    pub title: String,
    pub message: String,
}

impl ReminderFire {
    fn for_habit(habit: &Habit, at: MinuteMark) -> Self {
        Self {
            habit_id: habit.id.clone(),
            habit_name: habit.name.clone(),
            at,
            title: format!("Time for {}!", habit.name),
            message: format!(
                "Don't forget to complete your habit: {}. Only {} days streak so far!",
                habit.name, habit.streak
            ),
        }
    }
}

/// Matches habits' reminder descriptors against the wall clock.
///
/// Holds the last minute it evaluated; further ticks inside that minute
/// produce nothing, so each (habit, minute) pair fires at most once.
#[derive(Debug, Clone, Default)]
pub struct ReminderMatcher {
    last_checked: Option<MinuteMark>,
}

impl ReminderMatcher {
    pub fn new() -> Self {
        Self::default()
    }

    /// Start from a minute already evaluated, e.g. by a previous process.
    pub fn resume_from(mark: MinuteMark) -> Self {
        Self {
            last_checked: Some(mark),
        }
    }

    pub fn last_checked(&self) -> Option<MinuteMark> {
        self.last_checked
    }

    /// Evaluate all habits for the minute containing `now`.
    pub fn tick(&mut self, now: NaiveDateTime, habits: &[Habit]) -> Vec<ReminderFire> {
        let mark = MinuteMark::from_datetime(now);
        if self.last_checked == Some(mark) {
            return Vec::new();
        }
        self.last_checked = Some(mark);

        let weekday = mark.day.weekday_from_sunday();
        let fires: Vec<ReminderFire> = habits
            .iter()
            .filter(|h| !h.archived)
            .filter(|h| h.reminder.is_some_and(|r| r.is_due(mark.time, weekday)))
            .filter(|h| !h.is_completed_on(mark.day))
            .map(|h| ReminderFire::for_habit(h, mark))
            .collect();

        if !fires.is_empty() {
            tracing::debug!(minute = %mark.time, day = %mark.day, count = fires.len(), "reminders due");
        }
        fires
    }
}

#[cfg(test)]
mod tests {
    use super::*;
    use crate::habit::HabitDraft;
    use chrono::NaiveDate;

    fn at(date: &str, h: u32, m: u32, s: u32) -> NaiveDateTime {
        NaiveDate::parse_from_str(date, "%Y-%m-%d")
            .unwrap()
            .and_hms_opt(h, m, s)
            .unwrap()
    }

    fn habit_with_reminder(name: &str, time: &str, days: &[u8]) -> Habit {
        let mut draft = HabitDraft::named(name);
        draft.reminder = Some(Reminder::new(
            TimeOfDay::parse(time).unwrap(),
            WeekdaySet::from_days(days).unwrap(),
        ));
        Habit::new(draft).unwrap()
    }

    // 2024-06-03 was a Monday.
    const MONDAY: &str = "2024-06-03";

    #[test]
    fn fires_once_per_minute() {
        let habits = vec![habit_with_reminder("Water", "09:30", &[1])];
        let mut matcher = ReminderMatcher::new();

        let first = matcher.tick(at(MONDAY, 9, 30, 0), &habits);
        assert_eq!(first.len(), 1);
        assert_eq!(first[0].title, "Time for Water!");

        assert!(matcher.tick(at(MONDAY, 9, 30, 10), &habits).is_empty());
        assert!(matcher.tick(at(MONDAY, 9, 30, 50), &habits).is_empty());
        assert!(matcher.tick(at(MONDAY, 9, 31, 0), &habits).is_empty());
    }

    #[test]
    fn same_clock_minute_on_another_day_fires_again() {
        let habits = vec![habit_with_reminder("Water", "09:30", &[])];
        let mut matcher = ReminderMatcher::new();
        assert_eq!(matcher.tick(at(MONDAY, 9, 30, 0), &habits).len(), 1);
        assert_eq!(matcher.tick(at("2024-06-04", 9, 30, 0), &habits).len(), 1);
    }

    #[test]
    fn resumed_matcher_skips_the_stored_minute() {
        let habits = vec![habit_with_reminder("Water", "09:30", &[])];
        let mark = MinuteMark::from_datetime(at(MONDAY, 9, 30, 0));
        let mut matcher = ReminderMatcher::resume_from(mark);
        assert!(matcher.tick(at(MONDAY, 9, 30, 40), &habits).is_empty());
        assert_eq!(matcher.tick(at("2024-06-04", 9, 30, 0), &habits).len(), 1);
    }

    #[test]
    fn skips_wrong_weekday() {
        let habits = vec![habit_with_reminder("Gym", "07:00", &[2, 4])];
        let mut matcher = ReminderMatcher::new();
        assert!(matcher.tick(at(MONDAY, 7, 0, 0), &habits).is_empty());
    }

    #[test]
    fn skips_habits_completed_today() {
        let mut done = habit_with_reminder("Read", "21:00", &[]);
        done.completed_dates.insert(DateKey::parse(MONDAY).unwrap());
        let pending = habit_with_reminder("Write", "21:00", &[]);
        let mut matcher = ReminderMatcher::new();

        let fires = matcher.tick(at(MONDAY, 21, 0, 5), &[done, pending]);
        assert_eq!(fires.len(), 1);
        assert_eq!(fires[0].habit_name, "Write");
    }

    #[test]
    fn skips_disabled_and_archived() {
        let mut disabled = habit_with_reminder("A", "06:15", &[]);
        if let Some(r) = disabled.reminder.as_mut() {
            r.enabled = false;
        }
        let mut archived = habit_with_reminder("B", "06:15", &[]);
        archived.archived = true;
        let plain = Habit::new(HabitDraft::named("C")).unwrap();

        let mut matcher = ReminderMatcher::new();
        assert!(matcher
            .tick(at(MONDAY, 6, 15, 0), &[disabled, archived, plain])
            .is_empty());
    }

    #[test]
    fn message_mentions_current_streak() {
        let mut h = habit_with_reminder("Floss", "22:00", &[]);
        h.streak = 4;
        let mut matcher = ReminderMatcher::new();
        let fires = matcher.tick(at(MONDAY, 22, 0, 0), &[h]);
        assert_eq!(
            fires[0].message,
            "Don't forget to complete your habit: Floss. Only 4 days streak so far!"
        );
    }
}
