//! Progress statistics across habits, tasks and the journal.
//!
//! [`StatsReport::compute`] is a pure function over already-loaded records.
//! It covers:
//! - **Overview**: habits done today, tasks completed overall
//! - **Day**: goal vs. actual for one selected day
//! - **Activity**: per-day counts for the last week and four weekly buckets
//! - **Consistency**: share of the last 30 days with any completion
//! - **Mood**: rating distribution over 30 days and a 10-day trend

use std::collections::{BTreeMap, BTreeSet};

use serde::{Deserialize, Serialize};

use crate::date_key::DateKey;
use crate::habit::Habit;
use crate::journal::JournalEntry;
use crate::task::{Task, TaskStatus};

/// Days covered by the consistency figure and the mood distribution.
pub const CONSISTENCY_WINDOW_DAYS: u64 = 30;
/// Days covered by the mood trend.
pub const MOOD_TREND_DAYS: u64 = 10;

const WEEKDAY_LABELS: [&str; 7] = ["Sun", "Mon", "Tue", "Wed", "Thu", "Fri", "Sat"];
const MOOD_LABELS: [&str; 5] = ["Awful", "Bad", "Meh", "Good", "Rad"];

#[derive(Debug, Clone, Copy, Default, PartialEq, Eq, Serialize, Deserialize)]
pub struct Overview {
    pub habits_total: usize,
    pub habits_done_today: usize,
    pub tasks_total: usize,
    pub tasks_completed: usize,
}

/// Goal vs. actual for one day.
#[derive(Debug, Clone, Copy, PartialEq, Eq, Serialize, Deserialize)]
pub struct DayStats {
    pub date: DateKey,
    pub habits_goal: usize,
    pub habits_done: usize,
    /// Open tasks plus tasks due that day.
    pub tasks_goal: usize,
    /// Completed tasks due that day.
    pub tasks_done: usize,
    pub success_rate: u8,
}

#[derive(Debug, Clone, PartialEq, Eq, Serialize, Deserialize)]
pub struct DayCount {
    pub date: DateKey,
    pub weekday: String,
    pub habits: usize,
    pub tasks: usize,
}

/// Seven days ending at `end`, inclusive.
#[derive(Debug, Clone, PartialEq, Eq, Serialize, Deserialize)]
pub struct WeekBucket {
    pub label: String,
    pub start: DateKey,
    pub end: DateKey,
    pub completions: usize,
}

#[derive(Debug, Clone, Copy, Default, PartialEq, Eq, Serialize, Deserialize)]
pub struct TaskBreakdown {
    pub completed: usize,
    pub pending: usize,
    /// Pending with a due date before today. Also counted in `pending`.
    pub overdue: usize,
}

#[derive(Debug, Clone, PartialEq, Eq, Serialize, Deserialize)]
pub struct MoodCount {
    pub rating: u8,
    pub label: String,
    pub count: usize,
}

/// `rating` is `None` on days without a journal entry.
#[derive(Debug, Clone, PartialEq, Eq, Serialize, Deserialize)]
pub struct MoodPoint {
    pub date: DateKey,
    pub weekday: String,
    pub rating: Option<u8>,
}

#[derive(Debug, Clone, PartialEq, Eq, Serialize, Deserialize)]
pub struct HabitTotal {
    pub id: String,
    pub name: String,
    pub completions: usize,
}

/// Complete statistics snapshot.
#[derive(Debug, Clone, PartialEq, Eq, Serialize, Deserialize)]
pub struct StatsReport {
    pub today: DateKey,
    pub overview: Overview,
    pub day: DayStats,
    /// Oldest first, ending today.
    pub last_7_days: Vec<DayCount>,
    /// `W1` (oldest) to `W4` (ending today).
    pub last_4_weeks: Vec<WeekBucket>,
    /// Percent of the last 30 days with at least one completion.
    pub consistency_30d: u8,
    pub tasks: TaskBreakdown,
    /// Only ratings that occur, lowest first.
    pub mood_distribution: Vec<MoodCount>,
    /// Oldest first, ending today.
    pub mood_trend: Vec<MoodPoint>,
    pub habits: Vec<HabitTotal>,
}

impl StatsReport {
    /// Archived habits are ignored. `day` selects the goal-vs-actual figures;
    /// everything else is relative to `today`.
    pub fn compute(
        habits: &[Habit],
        tasks: &[Task],
        journal: &[JournalEntry],
        today: DateKey,
        day: DateKey,
    ) -> Self {
        let habits: Vec<&Habit> = habits.iter().filter(|h| !h.archived).collect();
        let counter = Counter {
            habits: &habits,
            tasks,
        };

        let overview = Overview {
            habits_total: habits.len(),
            habits_done_today: counter.habits_on(today),
            tasks_total: tasks.len(),
            tasks_completed: tasks.iter().filter(|t| is_done(t)).count(),
        };

        let habits_done = counter.habits_on(day);
        let tasks_done = counter.tasks_on(day);
        let day_stats = DayStats {
            date: day,
            habits_goal: habits.len(),
            habits_done,
            tasks_goal: tasks
                .iter()
                .filter(|t| !is_done(t) || t.due_date == day)
                .count(),
            tasks_done,
            success_rate: percent(habits_done + tasks_done, habits.len() + tasks.len()),
        };

        let last_7_days = (0..7)
            .rev()
            .map(|back| {
                let date = today.days_back(back);
                DayCount {
                    date,
                    weekday: weekday_label(date),
                    habits: counter.habits_on(date),
                    tasks: counter.tasks_on(date),
                }
            })
            .collect();

        let last_4_weeks = (0..4u64)
            .rev()
            .enumerate()
            .map(|(i, back)| {
                let end = today.days_back(back * 7);
                let start = end.days_back(6);
                let completions = (0..7)
                    .map(|d| end.days_back(d))
                    .map(|date| counter.habits_on(date) + counter.tasks_on(date))
                    .sum();
                WeekBucket {
                    label: format!("W{}", i + 1),
                    start,
                    end,
                    completions,
                }
            })
            .collect();

        let window_start = today.days_back(CONSISTENCY_WINDOW_DAYS - 1);
        let active_days: BTreeSet<DateKey> = habits
            .iter()
            .flat_map(|h| h.completed_dates.iter().copied())
            .chain(tasks.iter().filter(|t| is_done(t)).map(|t| t.due_date))
            .filter(|d| *d >= window_start && *d <= today)
            .collect();
        let consistency_30d = percent(active_days.len(), CONSISTENCY_WINDOW_DAYS as usize);

        let task_breakdown = TaskBreakdown {
            completed: overview.tasks_completed,
            pending: tasks.len() - overview.tasks_completed,
            overdue: tasks.iter().filter(|t| t.is_overdue(today)).count(),
        };

        let ratings: BTreeMap<DateKey, u8> = journal
            .iter()
            .filter(|e| (1..=5).contains(&e.rating))
            .map(|e| (e.date, e.rating))
            .collect();

        let mut mood_counts = [0usize; 5];
        for (_, rating) in ratings.range(window_start..=today) {
            mood_counts[usize::from(*rating - 1)] += 1;
        }
        let mood_distribution = mood_counts
            .iter()
            .zip(1u8..)
            .filter(|(count, _)| **count > 0)
            .map(|(count, rating)| MoodCount {
                rating,
                label: MOOD_LABELS[usize::from(rating - 1)].to_string(),
                count: *count,
            })
            .collect();

        let mood_trend = (0..MOOD_TREND_DAYS)
            .rev()
            .map(|back| {
                let date = today.days_back(back);
                MoodPoint {
                    date,
                    weekday: weekday_label(date),
                    rating: ratings.get(&date).copied(),
                }
            })
            .collect();

        let habit_totals = habits
            .iter()
            .map(|h| HabitTotal {
                id: h.id.clone(),
                name: h.name.clone(),
                completions: h.completed_dates.len(),
            })
            .collect();

        Self {
            today,
            overview,
            day: day_stats,
            last_7_days,
            last_4_weeks,
            consistency_30d,
            tasks: task_breakdown,
            mood_distribution,
            mood_trend,
            habits: habit_totals,
        }
    }
}

struct Counter<'a> {
    habits: &'a [&'a Habit],
    tasks: &'a [Task],
}

impl Counter<'_> {
    fn habits_on(&self, date: DateKey) -> usize {
        self.habits.iter().filter(|h| h.is_completed_on(date)).count()
    }

    fn tasks_on(&self, date: DateKey) -> usize {
        self.tasks
            .iter()
            .filter(|t| is_done(t) && t.due_date == date)
            .count()
    }
}

fn is_done(task: &Task) -> bool {
    task.status == TaskStatus::Completed
}

fn percent(part: usize, whole: usize) -> u8 {
    if whole == 0 {
        return 0;
    }
    (part as f64 / whole as f64 * 100.0).round().min(100.0) as u8
}

fn weekday_label(date: DateKey) -> String {
    WEEKDAY_LABELS[usize::from(date.weekday_from_sunday())].to_string()
}

#[cfg(test)]
mod tests {
    use super::*;
    use crate::habit::{HabitDraft, StreakEngine};
    use crate::task::TaskDraft;

    fn key(s: &str) -> DateKey {
        DateKey::parse(s).unwrap()
    }

    // 2024-06-10 was a Monday.
    const TODAY: &str = "2024-06-10";

    fn habit(name: &str, days: &[&str]) -> Habit {
        let engine = StreakEngine::new();
        let mut h = Habit::new(HabitDraft::named(name)).unwrap();
        for d in days {
            h.mark_completed(key(d), key(TODAY), &engine);
        }
        h
    }

    fn task(title: &str, due: &str, done: bool) -> Task {
        let mut t = Task::new(TaskDraft::new(title, key(due))).unwrap();
        if done {
            t.toggle_status();
        }
        t
    }

    fn entry(date: &str, rating: u8) -> JournalEntry {
        JournalEntry::new(key(date), "", "", rating).unwrap()
    }

    #[test]
    fn empty_inputs_give_zeroed_report() {
        let report = StatsReport::compute(&[], &[], &[], key(TODAY), key(TODAY));
        assert_eq!(report.overview, Overview::default());
        assert_eq!(report.day.success_rate, 0);
        assert_eq!(report.consistency_30d, 0);
        assert_eq!(report.last_7_days.len(), 7);
        assert_eq!(report.last_4_weeks.len(), 4);
        assert_eq!(report.mood_trend.len(), 10);
        assert!(report.mood_trend.iter().all(|p| p.rating.is_none()));
        assert!(report.mood_distribution.is_empty());
    }

    #[test]
    fn daily_and_weekly_counts() {
        let habits = vec![
            habit("Read", &["2024-06-10", "2024-06-09", "2024-06-01"]),
            habit("Run", &["2024-06-10"]),
        ];
        let tasks = vec![
            task("Rent", "2024-06-10", true),
            task("Call", "2024-06-12", false),
            task("Old", "2024-06-08", false),
            task("Done early", "2024-05-20", true),
        ];
        let report = StatsReport::compute(&habits, &tasks, &[], key(TODAY), key(TODAY));

        assert_eq!(report.overview.habits_done_today, 2);
        assert_eq!(report.overview.tasks_completed, 2);

        // 2 habits + 1 task done, out of 2 habits + 4 tasks.
        assert_eq!(report.day.habits_done, 2);
        assert_eq!(report.day.tasks_done, 1);
        assert_eq!(report.day.tasks_goal, 3);
        assert_eq!(report.day.success_rate, 50);

        let week = &report.last_7_days;
        assert_eq!(week[0].date, key("2024-06-04"));
        assert_eq!(week[6].date, key(TODAY));
        assert_eq!(week[6].weekday, "Mon");
        assert_eq!((week[6].habits, week[6].tasks), (2, 1));
        assert_eq!((week[5].habits, week[5].tasks), (1, 0));

        let buckets = &report.last_4_weeks;
        assert_eq!(buckets[3].label, "W4");
        assert_eq!(buckets[3].start, key("2024-06-04"));
        assert_eq!(buckets[3].completions, 4);
        assert_eq!(buckets[2].completions, 1);
        assert_eq!(buckets[0].completions, 1);
    }

    #[test]
    fn consistency_counts_distinct_days_in_window() {
        let habits = vec![
            habit("A", &["2024-06-10", "2024-06-09", "2024-05-12", "2024-05-11"]),
            habit("B", &["2024-06-10"]),
        ];
        let tasks = vec![task("T", "2024-06-01", true)];
        let report = StatsReport::compute(&habits, &tasks, &[], key(TODAY), key(TODAY));
        // 06-10, 06-09, 06-01 and 05-12; 05-11 is outside the 30 days.
        assert_eq!(report.consistency_30d, 13);
    }

    #[test]
    fn task_breakdown_counts_overdue_as_pending() {
        let tasks = vec![
            task("Done", "2024-06-01", true),
            task("Late", "2024-06-09", false),
            task("Today", TODAY, false),
        ];
        let report = StatsReport::compute(&[], &tasks, &[], key(TODAY), key(TODAY));
        assert_eq!(
            report.tasks,
            TaskBreakdown {
                completed: 1,
                pending: 2,
                overdue: 1
            }
        );
    }

    #[test]
    fn mood_distribution_and_trend() {
        let journal = vec![
            entry("2024-06-10", 5),
            entry("2024-06-08", 5),
            entry("2024-06-01", 2),
            entry("2024-05-01", 1),
        ];
        let report = StatsReport::compute(&[], &[], &journal, key(TODAY), key(TODAY));

        let dist: Vec<(u8, &str, usize)> = report
            .mood_distribution
            .iter()
            .map(|m| (m.rating, m.label.as_str(), m.count))
            .collect();
        assert_eq!(dist, vec![(2, "Bad", 1), (5, "Rad", 2)]);

        let trend = &report.mood_trend;
        assert_eq!(trend[0].date, key("2024-06-01"));
        assert_eq!(trend[0].rating, Some(2));
        assert_eq!(trend[7].rating, Some(5));
        assert_eq!(trend[8].rating, None);
        assert_eq!(trend[9].rating, Some(5));
    }

    #[test]
    fn selected_day_differs_from_today() {
        let habits = vec![habit("Read", &["2024-06-05"])];
        let report =
            StatsReport::compute(&habits, &[], &[], key(TODAY), key("2024-06-05"));
        assert_eq!(report.overview.habits_done_today, 0);
        assert_eq!(report.day.habits_done, 1);
        assert_eq!(report.day.success_rate, 100);
        assert_eq!(report.habits[0].completions, 1);
    }

    #[test]
    fn archived_habits_are_ignored() {
        let mut archived = habit("Old", &[TODAY]);
        archived.archived = true;
        let report = StatsReport::compute(&[archived], &[], &[], key(TODAY), key(TODAY));
        assert_eq!(report.overview.habits_total, 0);
        assert!(report.habits.is_empty());
    }
}
